//! Alert evaluation over a fleet snapshot.
//!
//! Alerts are recomputed from scratch every tick; nothing is cached between
//! calls and repeated conditions are re-emitted.

use chrono::{DateTime, Utc};

use crate::geofence::GeofenceIndex;
use crate::models::{Alert, AlertKind, AlertSeverity, VehicleSnapshot};
use crate::rules::FleetRules;

/// Produce the alerts for this tick.
///
/// Each vehicle yields at most one geofence alert and one low-battery alert.
pub fn evaluate(
    snapshots: &[VehicleSnapshot],
    geofences: &GeofenceIndex,
    rules: &FleetRules,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for vehicle in snapshots {
        let fences = geofences.violations(vehicle.lat, vehicle.lon);
        if !fences.is_empty() {
            alerts.push(Alert {
                kind: AlertKind::GeofenceViolation,
                vehicle_id: vehicle.id.clone(),
                message: format!(
                    "{} has violated restricted airspace ({})",
                    vehicle.id,
                    fences.join(", ")
                ),
                severity: AlertSeverity::High,
                timestamp: now,
            });
        }

        if vehicle.battery_pct < rules.low_battery_alert_pct {
            alerts.push(Alert {
                kind: AlertKind::LowBattery,
                vehicle_id: vehicle.id.clone(),
                message: format!(
                    "{} battery critically low: {:.1}%",
                    vehicle.id, vehicle.battery_pct
                ),
                severity: AlertSeverity::Medium,
                timestamp: now,
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleClass;
    use crate::vehicle::Vehicle;

    fn snapshot_at(id: &str, lat: f64, lon: f64, battery_pct: f64) -> VehicleSnapshot {
        let mut snap = Vehicle::new(id, VehicleClass::RotaryWing, lat, lon, "Test").snapshot();
        snap.battery_pct = battery_pct;
        snap
    }

    fn index() -> GeofenceIndex {
        let index = GeofenceIndex::new();
        index
            .add_geofence(
                "NFZ-001",
                "Square",
                vec![[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]],
                "red",
            )
            .unwrap();
        index
    }

    #[test]
    fn empty_fleet_no_alerts() {
        let alerts = evaluate(&[], &index(), &FleetRules::default(), Utc::now());
        assert!(alerts.is_empty());
    }

    #[test]
    fn healthy_vehicle_outside_fences_no_alerts() {
        let snaps = [snapshot_at("OK-01", 20.0, 20.0, 90.0)];
        assert!(evaluate(&snaps, &index(), &FleetRules::default(), Utc::now()).is_empty());
    }

    #[test]
    fn vehicle_can_raise_both_alerts() {
        let now = Utc::now();
        let snaps = [
            snapshot_at("BOTH-01", 5.0, 5.0, 12.0),
            snapshot_at("FENCE-02", 5.0, 5.0, 80.0),
            snapshot_at("BATT-03", 20.0, 20.0, 19.9),
        ];
        let alerts = evaluate(&snaps, &index(), &FleetRules::default(), now);

        let summary: Vec<(&str, AlertKind, AlertSeverity)> = alerts
            .iter()
            .map(|a| (a.vehicle_id.as_str(), a.kind, a.severity))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("BOTH-01", AlertKind::GeofenceViolation, AlertSeverity::High),
                ("BOTH-01", AlertKind::LowBattery, AlertSeverity::Medium),
                ("FENCE-02", AlertKind::GeofenceViolation, AlertSeverity::High),
                ("BATT-03", AlertKind::LowBattery, AlertSeverity::Medium),
            ]
        );
        assert!(alerts.iter().all(|a| a.timestamp == now));
        assert_eq!(alerts[3].message, "BATT-03 battery critically low: 19.9%");
    }

    #[test]
    fn inactive_fence_raises_nothing() {
        let index = index();
        index.deactivate("NFZ-001");
        let snaps = [snapshot_at("FENCE-02", 5.0, 5.0, 80.0)];
        assert!(evaluate(&snaps, &index, &FleetRules::default(), Utc::now()).is_empty());
    }

    #[test]
    fn repeated_evaluation_re_emits() {
        let index = index();
        let snaps = [snapshot_at("FENCE-02", 5.0, 5.0, 80.0)];
        let rules = FleetRules::default();
        assert_eq!(evaluate(&snaps, &index, &rules, Utc::now()).len(), 1);
        assert_eq!(evaluate(&snaps, &index, &rules, Utc::now()).len(), 1);
    }
}
