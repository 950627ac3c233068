//! Fleet simulation core: vehicle state machines, mission generation,
//! geofence containment and per-tick alerting.

pub mod alerts;
pub mod error;
pub mod fleet;
pub mod geofence;
pub mod mission;
pub mod models;
pub mod rules;
pub mod scenario;
pub mod spatial;
pub mod vehicle;

pub use alerts::evaluate;
pub use error::{FleetError, GeofenceError};
pub use fleet::FleetRegistry;
pub use geofence::GeofenceIndex;
pub use mission::generate_mission;
pub use models::{
    Alert, AlertKind, AlertSeverity, CommsStatus, Geofence, MissionState, PayloadStatus,
    SensorState, ThreatLevel, VehicleClass, VehicleSnapshot, Waypoint,
};
pub use rules::FleetRules;
pub use spatial::{bearing, haversine_distance};
pub use vehicle::Vehicle;
