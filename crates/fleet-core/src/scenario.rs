//! Demo fleet and no-fly zones around the campus airfield.

use crate::error::{FleetError, GeofenceError};
use crate::fleet::FleetRegistry;
use crate::geofence::GeofenceIndex;
use crate::models::VehicleClass;

/// Demo vehicles: (id, class, home lat, home lon, model).
pub const DEMO_FLEET: [(&str, VehicleClass, f64, f64, &str); 6] = [
    ("REAPER-01", VehicleClass::FixedWing, 12.8406, 80.1530, "MQ-9 Reaper"),
    ("PREDATOR-02", VehicleClass::FixedWing, 12.8450, 80.1600, "MQ-1 Predator"),
    ("RAVEN-03", VehicleClass::RotaryWing, 12.8420, 80.1505, "RQ-11 Raven"),
    ("WASP-04", VehicleClass::RotaryWing, 12.8385, 80.1555, "AeroVironment Wasp"),
    ("HAWK-05", VehicleClass::FixedWing, 12.8445, 80.1480, "RQ-21 Blackjack"),
    ("SHADOW-06", VehicleClass::FixedWing, 12.8465, 80.1525, "RQ-7 Shadow"),
];

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Fleet(#[from] FleetError),
    #[error(transparent)]
    Geofence(#[from] GeofenceError),
}

/// Register the demo no-fly zones.
pub fn seed_geofences(geofences: &GeofenceIndex) -> Result<(), GeofenceError> {
    geofences.add_geofence(
        "NFZ-001",
        "Main Academic Block",
        vec![
            [12.8425, 80.1520],
            [12.8425, 80.1540],
            [12.8405, 80.1540],
            [12.8405, 80.1520],
        ],
        "red",
    )?;
    geofences.add_geofence(
        "NFZ-002",
        "Hostel Zone",
        vec![
            [12.8380, 80.1500],
            [12.8380, 80.1520],
            [12.8360, 80.1520],
            [12.8360, 80.1500],
        ],
        "orange",
    )?;
    Ok(())
}

/// Register the demo fleet.
pub fn seed_fleet(fleet: &FleetRegistry) -> Result<(), FleetError> {
    for (id, class, lat, lon, model) in DEMO_FLEET {
        fleet.register(id, class, lat, lon, model)?;
    }
    Ok(())
}

/// Register both the demo fleet and its no-fly zones.
pub fn seed_demo(fleet: &FleetRegistry, geofences: &GeofenceIndex) -> Result<(), ScenarioError> {
    seed_geofences(geofences)?;
    seed_fleet(fleet)?;
    Ok(())
}
