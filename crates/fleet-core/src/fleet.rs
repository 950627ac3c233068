//! Fleet registry: owns every vehicle and fans out ticks and commands.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Mutex, PoisonError};

use crate::error::FleetError;
use crate::models::{VehicleClass, VehicleSnapshot, Waypoint};
use crate::rules::FleetRules;
use crate::vehicle::Vehicle;

/// Thread-safe vehicle store.
///
/// Every mutation of a vehicle (a tick update or a command) runs under the
/// write guard of that vehicle's map shard, so a command can never observe
/// or leave a half-applied update.
pub struct FleetRegistry {
    vehicles: DashMap<String, Vehicle>,
    rules: FleetRules,
    /// Random source for mission re-generation on arrival
    rng: Mutex<StdRng>,
}

impl Default for FleetRegistry {
    fn default() -> Self {
        Self::new(FleetRules::default())
    }
}

impl FleetRegistry {
    /// Create an empty fleet whose random source is seeded from the OS.
    pub fn new(rules: FleetRules) -> Self {
        Self::with_rng(rules, StdRng::from_os_rng())
    }

    /// Create an empty fleet with a reproducible random source.
    pub fn with_seed(rules: FleetRules, seed: u64) -> Self {
        Self::with_rng(rules, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rules: FleetRules, rng: StdRng) -> Self {
        Self {
            vehicles: DashMap::new(),
            rules,
            rng: Mutex::new(rng),
        }
    }

    pub fn rules(&self) -> &FleetRules {
        &self.rules
    }

    /// Create a vehicle with its generated mission.
    pub fn register(
        &self,
        id: impl Into<String>,
        class: VehicleClass,
        home_lat: f64,
        home_lon: f64,
        model: impl Into<String>,
    ) -> Result<VehicleSnapshot, FleetError> {
        let id = id.into();
        let valid_home = home_lat.is_finite()
            && home_lon.is_finite()
            && (-90.0..=90.0).contains(&home_lat)
            && (-180.0..=180.0).contains(&home_lon);
        if !valid_home {
            return Err(FleetError::InvalidHome {
                id,
                lat: home_lat,
                lon: home_lon,
            });
        }

        match self.vehicles.entry(id) {
            Entry::Occupied(entry) => Err(FleetError::DuplicateVehicle(entry.key().clone())),
            Entry::Vacant(entry) => {
                let vehicle = Vehicle::new(entry.key().clone(), class, home_lat, home_lon, model);
                let snapshot = vehicle.snapshot();
                entry.insert(vehicle);
                tracing::info!(
                    vehicle = %snapshot.id,
                    class = ?class,
                    waypoints = snapshot.waypoints.len(),
                    "Registered vehicle"
                );
                Ok(snapshot)
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<VehicleSnapshot> {
        self.vehicles.get(id).map(|entry| entry.snapshot())
    }

    /// Remove a vehicle. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.vehicles.remove(id).is_some();
        if removed {
            tracing::info!(vehicle = %id, "Removed vehicle");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Advance every vehicle by `dt_secs`. Vehicles are independent, so
    /// iteration order does not matter.
    pub fn tick(&self, dt_secs: f64) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        for mut entry in self.vehicles.iter_mut() {
            entry.value_mut().update(dt_secs, &self.rules, &mut *rng);
        }
    }

    /// Snapshots of every vehicle, sorted by id.
    pub fn snapshots(&self) -> Vec<VehicleSnapshot> {
        let mut snapshots: Vec<VehicleSnapshot> =
            self.vehicles.iter().map(|entry| entry.snapshot()).collect();
        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        snapshots
    }

    pub fn pause(&self, id: &str) -> bool {
        self.with_vehicle(id, Vehicle::pause)
    }

    pub fn resume(&self, id: &str) -> bool {
        self.with_vehicle(id, Vehicle::resume)
    }

    pub fn toggle_pause(&self, id: &str) -> bool {
        self.with_vehicle(id, Vehicle::toggle_pause)
    }

    pub fn kill(&self, id: &str) -> bool {
        self.with_vehicle(id, Vehicle::kill)
    }

    pub fn return_to_base(&self, id: &str) -> bool {
        self.with_vehicle(id, Vehicle::return_to_base)
    }

    pub fn loiter(&self, id: &str) -> bool {
        self.with_vehicle(id, Vehicle::loiter_here)
    }

    pub fn assign_mission(&self, id: &str, waypoints: Vec<Waypoint>) -> bool {
        self.with_vehicle(id, move |vehicle| vehicle.assign_mission(waypoints))
    }

    /// Apply `command` to a vehicle under its write guard.
    /// Returns false if the id is unknown.
    fn with_vehicle<F>(&self, id: &str, command: F) -> bool
    where
        F: FnOnce(&mut Vehicle),
    {
        match self.vehicles.get_mut(id) {
            Some(mut entry) => {
                command(entry.value_mut());
                true
            }
            None => {
                tracing::debug!(vehicle = %id, "Command for unknown vehicle");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MissionState;
    use std::sync::Arc;

    fn fleet() -> FleetRegistry {
        FleetRegistry::with_seed(FleetRules::default(), 42)
    }

    #[test]
    fn register_and_get() {
        let fleet = fleet();
        let snap = fleet
            .register("RAVEN-03", VehicleClass::RotaryWing, 12.8420, 80.1505, "RQ-11 Raven")
            .unwrap();
        assert_eq!(snap.mission_state, MissionState::EnRoute);
        assert_eq!(fleet.get("RAVEN-03").unwrap().model, "RQ-11 Raven");
        assert!(fleet.get("GHOST-99").is_none());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let fleet = fleet();
        fleet
            .register("RAVEN-03", VehicleClass::RotaryWing, 12.8420, 80.1505, "RQ-11 Raven")
            .unwrap();
        let err = fleet
            .register("RAVEN-03", VehicleClass::FixedWing, 0.0, 0.0, "Other")
            .unwrap_err();
        assert_eq!(err, FleetError::DuplicateVehicle("RAVEN-03".to_string()));
        assert_eq!(fleet.get("RAVEN-03").unwrap().class, VehicleClass::RotaryWing);
    }

    #[test]
    fn invalid_home_rejected() {
        let fleet = fleet();
        assert!(matches!(
            fleet.register("BAD-01", VehicleClass::RotaryWing, 95.0, 0.0, "X"),
            Err(FleetError::InvalidHome { .. })
        ));
        assert!(matches!(
            fleet.register("BAD-02", VehicleClass::RotaryWing, 0.0, f64::INFINITY, "X"),
            Err(FleetError::InvalidHome { .. })
        ));
        assert!(fleet.is_empty());
    }

    #[test]
    fn remove_reports_existence() {
        let fleet = fleet();
        fleet
            .register("WASP-04", VehicleClass::RotaryWing, 12.8385, 80.1555, "Wasp")
            .unwrap();
        assert!(fleet.remove("WASP-04"));
        assert!(!fleet.remove("WASP-04"));
        assert!(fleet.is_empty());
    }

    #[test]
    fn commands_on_unknown_id_return_false() {
        let fleet = fleet();
        assert!(!fleet.pause("NOPE"));
        assert!(!fleet.resume("NOPE"));
        assert!(!fleet.toggle_pause("NOPE"));
        assert!(!fleet.kill("NOPE"));
        assert!(!fleet.return_to_base("NOPE"));
        assert!(!fleet.loiter("NOPE"));
        assert!(!fleet.assign_mission("NOPE", Vec::new()));
    }

    #[test]
    fn commands_forward_to_vehicle() {
        let fleet = fleet();
        fleet
            .register("HAWK-05", VehicleClass::FixedWing, 12.8445, 80.1480, "RQ-21 Blackjack")
            .unwrap();

        assert!(fleet.pause("HAWK-05"));
        assert_eq!(fleet.get("HAWK-05").unwrap().mission_state, MissionState::Paused);
        assert!(fleet.resume("HAWK-05"));
        assert_eq!(fleet.get("HAWK-05").unwrap().mission_state, MissionState::EnRoute);
        assert!(fleet.return_to_base("HAWK-05"));
        assert_eq!(fleet.get("HAWK-05").unwrap().mission_state, MissionState::Rtb);
        assert!(fleet.kill("HAWK-05"));
        assert_eq!(fleet.get("HAWK-05").unwrap().mission_state, MissionState::Emergency);
    }

    #[test]
    fn tick_on_empty_fleet_is_harmless() {
        let fleet = fleet();
        fleet.tick(1.0);
        assert!(fleet.snapshots().is_empty());
    }

    #[test]
    fn snapshots_sorted_by_id() {
        let fleet = fleet();
        for id in ["WASP-04", "RAVEN-03", "SHADOW-06"] {
            fleet
                .register(id, VehicleClass::RotaryWing, 12.84, 80.15, "Test")
                .unwrap();
        }
        let ids: Vec<String> = fleet.snapshots().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["RAVEN-03", "SHADOW-06", "WASP-04"]);
    }

    #[test]
    fn kill_concurrent_with_ticks_leaves_consistent_state() {
        let fleet = Arc::new(fleet());
        let ids: Vec<String> = (0..32).map(|i| format!("SWARM-{i:02}")).collect();
        for id in &ids {
            fleet
                .register(id.as_str(), VehicleClass::FixedWing, 12.84, 80.15, "Swarm")
                .unwrap();
        }

        std::thread::scope(|scope| {
            let ticker = Arc::clone(&fleet);
            scope.spawn(move || {
                for _ in 0..200 {
                    ticker.tick(0.5);
                }
            });
            for chunk in ids.chunks(8) {
                let fleet = Arc::clone(&fleet);
                scope.spawn(move || {
                    for id in chunk {
                        assert!(fleet.kill(id));
                    }
                });
            }
        });

        for snap in fleet.snapshots() {
            assert_eq!(snap.mission_state, MissionState::Emergency);
            assert_eq!(snap.speed_mps, 0.0);
        }
    }
}
