//! In-memory application state shared by the tick loop and command handlers.

use fleet_core::scenario::{self, ScenarioError};
use fleet_core::{
    FleetError, FleetRegistry, FleetRules, Geofence, GeofenceError, GeofenceIndex, VehicleClass,
    VehicleSnapshot,
};

use crate::broadcast::{Bootstrap, ChannelSink, StreamMessage};
use crate::config::Config;
use tokio::sync::broadcast;

/// Application state: the fleet, its geofences and the stream channel.
pub struct AppState {
    fleet: FleetRegistry,
    geofences: GeofenceIndex,
    sink: ChannelSink,
    config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_rules(config, FleetRules::default())
    }

    pub fn with_rules(config: Config, rules: FleetRules) -> Self {
        let fleet = match config.rng_seed {
            Some(seed) => FleetRegistry::with_seed(rules, seed),
            None => FleetRegistry::new(rules),
        };
        Self {
            fleet,
            geofences: GeofenceIndex::new(),
            sink: ChannelSink::new(config.broadcast_capacity),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fleet(&self) -> &FleetRegistry {
        &self.fleet
    }

    pub fn geofences(&self) -> &GeofenceIndex {
        &self.geofences
    }

    /// Sink the tick loop publishes into.
    pub fn sink(&self) -> ChannelSink {
        self.sink.clone()
    }

    /// Attach a new stream subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamMessage> {
        self.sink.subscribe()
    }

    /// Register the demo fleet and no-fly zones.
    pub fn seed_demo(&self) -> Result<(), ScenarioError> {
        scenario::seed_demo(&self.fleet, &self.geofences)
    }

    pub fn register_vehicle(
        &self,
        id: &str,
        class: VehicleClass,
        home_lat: f64,
        home_lon: f64,
        model: &str,
    ) -> Result<VehicleSnapshot, FleetError> {
        self.fleet.register(id, class, home_lat, home_lon, model)
    }

    pub fn remove_vehicle(&self, id: &str) -> bool {
        self.fleet.remove(id)
    }

    pub fn snapshot(&self, id: &str) -> Option<VehicleSnapshot> {
        self.fleet.get(id)
    }

    pub fn all_snapshots(&self) -> Vec<VehicleSnapshot> {
        self.fleet.snapshots()
    }

    pub fn pause(&self, id: &str) -> bool {
        self.fleet.pause(id)
    }

    pub fn resume(&self, id: &str) -> bool {
        self.fleet.resume(id)
    }

    pub fn kill(&self, id: &str) -> bool {
        self.fleet.kill(id)
    }

    pub fn return_to_base(&self, id: &str) -> bool {
        self.fleet.return_to_base(id)
    }

    pub fn add_geofence(
        &self,
        id: &str,
        name: &str,
        polygon: Vec<[f64; 2]>,
        color: &str,
    ) -> Result<Geofence, GeofenceError> {
        self.geofences.add_geofence(id, name, polygon, color)
    }

    pub fn all_geofences(&self) -> Vec<Geofence> {
        self.geofences.all_active()
    }

    pub fn check_violation(&self, lat: f64, lon: f64) -> bool {
        self.geofences.violates(lat, lon)
    }

    /// Current vehicles and active geofences for a newly connected subscriber.
    pub fn bootstrap(&self) -> Bootstrap {
        Bootstrap {
            vehicles: self.all_snapshots(),
            geofences: self.all_geofences(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
