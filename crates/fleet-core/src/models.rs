//! Core data models for the fleet simulation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Airframe class of a simulated vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    /// Multirotor; battery only
    RotaryWing,
    /// Fixed-wing; battery plus fuel
    FixedWing,
}

impl VehicleClass {
    /// Inclusive range of waypoints in a generated mission.
    pub fn waypoint_count_range(self) -> (usize, usize) {
        match self {
            VehicleClass::RotaryWing => (4, 8),
            VehicleClass::FixedWing => (6, 12),
        }
    }

    /// Maximum distance of a generated waypoint from home.
    pub fn mission_radius_m(self) -> f64 {
        match self {
            VehicleClass::RotaryWing => 2_000.0,
            VehicleClass::FixedWing => 10_000.0,
        }
    }

    /// Fraction of max speed flown while transiting.
    pub fn cruise_speed_factor(self) -> f64 {
        match self {
            VehicleClass::RotaryWing => 0.8,
            VehicleClass::FixedWing => 0.9,
        }
    }

    pub fn tracks_fuel(self) -> bool {
        matches!(self, VehicleClass::FixedWing)
    }
}

/// Mission state of a vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionState {
    /// On the ground or parked at home
    #[default]
    Idle,
    /// Flying toward the next waypoint
    EnRoute,
    /// Holding a circular pattern
    Loitering,
    /// Mission complete, heading home
    Returning,
    /// Commanded return to base
    Rtb,
    /// Energy exhausted or killed; sticky
    Emergency,
    /// Frozen by operator command
    Paused,
}

/// Energy-margin indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    #[default]
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadStatus {
    Armed,
    Surveillance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommsStatus {
    Encrypted,
}

/// Availability of an onboard sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorState {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "n/a")]
    NotAvailable,
}

/// A mission waypoint. Immutable once generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64, altitude_m: f64) -> Self {
        Self { lat, lon, altitude_m }
    }
}

/// Point-in-time view of a vehicle, handed to observers.
///
/// Values keep full precision in memory; rounding is applied only when
/// the snapshot is serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub id: String,
    pub class: VehicleClass,
    pub model: String,
    #[serde(serialize_with = "round_6dp")]
    pub lat: f64,
    #[serde(serialize_with = "round_6dp")]
    pub lon: f64,
    #[serde(rename = "altitude", serialize_with = "round_1dp")]
    pub altitude_m: f64,
    #[serde(rename = "speed", serialize_with = "round_1dp")]
    pub speed_mps: f64,
    #[serde(rename = "heading", serialize_with = "round_1dp")]
    pub heading_deg: f64,
    #[serde(rename = "battery", serialize_with = "round_1dp")]
    pub battery_pct: f64,
    /// Absent for rotary-wing vehicles
    #[serde(rename = "fuel", serialize_with = "round_opt_1dp")]
    pub fuel_pct: Option<f64>,
    pub mission_state: MissionState,
    pub paused: bool,
    pub payload_status: PayloadStatus,
    pub communication_status: CommsStatus,
    pub threat_level: ThreatLevel,
    pub last_contact: DateTime<Utc>,
    pub sensors: BTreeMap<String, SensorState>,
    pub home_lat: f64,
    pub home_lon: f64,
    /// Most recent positions as [lat, lon], oldest first
    pub trail: Vec<[f64; 2]>,
    pub waypoints: Vec<Waypoint>,
    pub current_waypoint: usize,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn round_6dp<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 6))
}

fn round_1dp<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 1))
}

fn round_opt_1dp<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&round_to(*v, 1)),
        None => serializer.serialize_none(),
    }
}

// ========== ALERTS ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    GeofenceViolation,
    LowBattery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Medium,
    High,
}

/// Transient alert raised for a single tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub vehicle_id: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Utc>,
}

// ========== GEOFENCE MODELS ==========

/// A named polygon of restricted airspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geofence {
    pub id: String,
    pub name: String,
    /// Polygon vertices as [lat, lon] pairs; the ring closes implicitly
    pub polygon: Vec<[f64; 2]>,
    /// Display color for map clients
    pub color: String,
    /// Whether the geofence is currently enforced
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Geofence {
    /// Check if a point is inside this geofence's polygon.
    ///
    /// Even-odd ray casting along a line of constant latitude. A horizontal
    /// edge skips the crossing computation and falls through to the
    /// comparison against the last crossing computed for an earlier edge;
    /// its latitude band is empty, so in practice it never toggles.
    pub fn contains_point(&self, lat: f64, lon: f64) -> bool {
        let n = self.polygon.len();
        if n < 3 {
            return false;
        }

        let (x, y) = (lon, lat);
        let mut inside = false;
        let mut xinters: Option<f64> = None;

        let [mut p1y, mut p1x] = self.polygon[0];
        for i in 1..=n {
            let [p2y, p2x] = self.polygon[i % n];
            if y > p1y.min(p2y) && y <= p1y.max(p2y) && x <= p1x.max(p2x) {
                if p1y != p2y {
                    xinters = Some((y - p1y) * (p2x - p1x) / (p2y - p1y) + p1x);
                }
                if p1x == p2x || xinters.is_some_and(|crossing| x <= crossing) {
                    inside = !inside;
                }
            }
            p1y = p2y;
            p1x = p2x;
        }

        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fence(polygon: Vec<[f64; 2]>) -> Geofence {
        Geofence {
            id: "NFZ-TEST".to_string(),
            name: "Test".to_string(),
            polygon,
            color: "red".to_string(),
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn square_contains_center_not_outside() {
        let square = fence(vec![[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]]);
        assert!(square.contains_point(5.0, 5.0));
        assert!(!square.contains_point(20.0, 20.0));
        assert!(!square.contains_point(5.0, -1.0));
        assert!(!square.contains_point(-1.0, 5.0));
    }

    #[test]
    fn horizontal_edges_never_toggle() {
        // Points exactly on the latitude of a horizontal edge, to the west of
        // the polygon, must not be counted as inside.
        let square = fence(vec![[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]]);
        assert!(!square.contains_point(0.0, -5.0));
        // The top edge is part of the half-open latitude band of the sides.
        assert!(square.contains_point(10.0, 5.0));
        // The bottom edge is not.
        assert!(!square.contains_point(0.0, 5.0));
    }

    #[test]
    fn concave_polygon_notch_is_outside() {
        // U-shape opening to the north
        let u_shape = fence(vec![
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 3.0],
            [3.0, 3.0],
            [3.0, 7.0],
            [10.0, 7.0],
            [10.0, 10.0],
            [0.0, 10.0],
        ]);
        assert!(u_shape.contains_point(5.0, 1.5));
        assert!(u_shape.contains_point(5.0, 8.5));
        assert!(!u_shape.contains_point(5.0, 5.0));
        assert!(u_shape.contains_point(1.5, 5.0));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let line = fence(vec![[0.0, 0.0], [10.0, 10.0]]);
        assert!(!line.contains_point(5.0, 5.0));
    }

    #[test]
    fn snapshot_serialization_rounds_values() {
        let snapshot = VehicleSnapshot {
            id: "RAVEN-03".to_string(),
            class: VehicleClass::RotaryWing,
            model: "RQ-11 Raven".to_string(),
            lat: 12.842_012_345,
            lon: 80.150_598_765,
            altitude_m: 123.456,
            speed_mps: 21.04,
            heading_deg: 359.96,
            battery_pct: 87.25,
            fuel_pct: None,
            mission_state: MissionState::EnRoute,
            paused: false,
            payload_status: PayloadStatus::Surveillance,
            communication_status: CommsStatus::Encrypted,
            threat_level: ThreatLevel::Green,
            last_contact: Utc::now(),
            sensors: BTreeMap::from([("lidar".to_string(), SensorState::Active)]),
            home_lat: 12.842,
            home_lon: 80.1505,
            trail: vec![[12.842, 80.1505]],
            waypoints: Vec::new(),
            current_waypoint: 0,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["lat"], serde_json::json!(12.842012));
        assert_eq!(json["lon"], serde_json::json!(80.150599));
        assert_eq!(json["altitude"], serde_json::json!(123.5));
        assert_eq!(json["speed"], serde_json::json!(21.0));
        assert_eq!(json["heading"], serde_json::json!(360.0));
        assert_eq!(json["battery"], serde_json::json!(87.3));
        assert!(json["fuel"].is_null());
        assert!(json.get("fuel").is_some());
        for internal in ["altitude_m", "speed_mps", "heading_deg", "battery_pct", "fuel_pct"] {
            assert!(json.get(internal).is_none(), "unexpected key {internal}");
        }
        assert_eq!(json["mission_state"], "en_route");
        assert_eq!(json["class"], "rotary_wing");
        assert_eq!(json["sensors"]["lidar"], "active");
        // In-memory value keeps full precision
        assert!((snapshot.lat - 12.842_012_345).abs() < 1e-12);
    }
}
