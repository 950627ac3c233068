//! Per-vehicle kinematic and mission state machine.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::{BTreeMap, VecDeque};

use crate::mission::{cruise_altitude_m, generate_mission, max_speed_mps};
use crate::models::{
    CommsStatus, MissionState, PayloadStatus, SensorState, ThreatLevel, VehicleClass,
    VehicleSnapshot, Waypoint,
};
use crate::rules::FleetRules;
use crate::spatial::{bearing, haversine_distance, offset_equirectangular};

/// Number of trail points included in a snapshot.
const SNAPSHOT_TRAIL_POINTS: usize = 100;
/// Loiter speed as a fraction of max speed.
const LOITER_SPEED_FACTOR: f64 = 0.3;

/// A simulated vehicle. Owned exclusively by the fleet registry.
#[derive(Debug, Clone)]
pub struct Vehicle {
    id: String,
    class: VehicleClass,
    model: String,
    home_lat: f64,
    home_lon: f64,

    lat: f64,
    lon: f64,
    altitude_m: f64,
    cruise_altitude_m: f64,
    max_speed_mps: f64,
    speed_mps: f64,
    heading_deg: f64,

    battery_pct: f64,
    /// Tracked for fixed-wing only
    fuel_pct: Option<f64>,
    state: MissionState,
    paused: bool,
    threat_level: ThreatLevel,
    payload_status: PayloadStatus,
    last_contact: DateTime<Utc>,
    sensors: BTreeMap<String, SensorState>,

    trail: VecDeque<[f64; 2]>,
    waypoints: Vec<Waypoint>,
    waypoint_index: usize,
}

impl Vehicle {
    /// Create a vehicle parked at home and give it its generated mission.
    pub fn new(
        id: impl Into<String>,
        class: VehicleClass,
        home_lat: f64,
        home_lon: f64,
        model: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let cruise_altitude_m = cruise_altitude_m(&id, class);
        let max_speed_mps = max_speed_mps(&id, class);
        let heavy = is_strike_airframe(&id);

        let sensors = BTreeMap::from([
            ("gps".to_string(), SensorState::Active),
            ("radar".to_string(), availability(class == VehicleClass::FixedWing)),
            ("camera".to_string(), SensorState::Active),
            ("thermal".to_string(), availability(heavy)),
            ("lidar".to_string(), availability(class == VehicleClass::RotaryWing)),
        ]);

        let mut vehicle = Self {
            id,
            class,
            model: model.into(),
            home_lat,
            home_lon,
            lat: home_lat,
            lon: home_lon,
            altitude_m: cruise_altitude_m,
            cruise_altitude_m,
            max_speed_mps,
            speed_mps: 0.0,
            heading_deg: 0.0,
            battery_pct: 100.0,
            fuel_pct: class.tracks_fuel().then_some(100.0),
            state: MissionState::Idle,
            paused: false,
            threat_level: ThreatLevel::Green,
            payload_status: if heavy {
                PayloadStatus::Armed
            } else {
                PayloadStatus::Surveillance
            },
            last_contact: Utc::now(),
            sensors,
            trail: VecDeque::from([[home_lat, home_lon]]),
            waypoints: Vec::new(),
            waypoint_index: 0,
        };
        vehicle.regenerate_mission();
        vehicle
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn class(&self) -> VehicleClass {
        self.class
    }

    pub fn state(&self) -> MissionState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current (lat, lon, altitude_m).
    pub fn position(&self) -> (f64, f64, f64) {
        (self.lat, self.lon, self.altitude_m)
    }

    pub fn home(&self) -> (f64, f64) {
        (self.home_lat, self.home_lon)
    }

    pub fn speed_mps(&self) -> f64 {
        self.speed_mps
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    pub fn max_speed_mps(&self) -> f64 {
        self.max_speed_mps
    }

    pub fn battery_pct(&self) -> f64 {
        self.battery_pct
    }

    pub fn fuel_pct(&self) -> Option<f64> {
        self.fuel_pct
    }

    pub fn threat_level(&self) -> ThreatLevel {
        self.threat_level
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Advance the vehicle by `dt_secs` of simulated time.
    ///
    /// `rng` is only consulted when a returning vehicle arrives home and
    /// rolls for a fresh mission.
    pub fn update<R>(&mut self, dt_secs: f64, rules: &FleetRules, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        if self.paused || self.state == MissionState::Emergency {
            return;
        }

        let dt = if dt_secs.is_finite() { dt_secs.max(0.0) } else { 0.0 };
        self.last_contact = Utc::now();

        let moving = self.speed_mps > 0.0;
        let battery_drain = if moving {
            rules.battery_drain_moving
        } else {
            rules.battery_drain_idle
        };
        self.battery_pct = (self.battery_pct - battery_drain * dt).clamp(0.0, 100.0);

        if let Some(fuel) = self.fuel_pct.as_mut() {
            let fuel_drain = if moving {
                rules.fuel_drain_moving
            } else {
                rules.fuel_drain_idle
            };
            *fuel = (*fuel - fuel_drain * dt).clamp(0.0, 100.0);
        }

        let fuel_critical = self
            .fuel_pct
            .is_some_and(|fuel| fuel < rules.emergency_fuel_pct);
        if self.battery_pct < rules.emergency_battery_pct || fuel_critical {
            tracing::warn!(
                vehicle = %self.id,
                battery = self.battery_pct,
                fuel = ?self.fuel_pct,
                "Energy exhausted, declaring emergency"
            );
            self.enter_emergency();
            return;
        }

        self.threat_level = if self.battery_pct < rules.caution_battery_pct {
            ThreatLevel::Yellow
        } else {
            ThreatLevel::Green
        };

        match self.state {
            MissionState::EnRoute => self.fly_mission(dt, rules),
            MissionState::Returning | MissionState::Rtb => self.fly_home(dt, rules, rng),
            MissionState::Loitering => self.loiter(rules),
            MissionState::Idle => {}
            // Both are filtered by the guard at the top of this function.
            MissionState::Paused | MissionState::Emergency => {}
        }
    }

    fn fly_mission(&mut self, dt: f64, rules: &FleetRules) {
        let Some(target) = self.waypoints.get(self.waypoint_index).copied() else {
            self.state = MissionState::Returning;
            return;
        };

        let distance = haversine_distance(self.lat, self.lon, target.lat, target.lon);
        if distance < rules.arrival_radius_m {
            self.waypoint_index += 1;
            tracing::debug!(
                vehicle = %self.id,
                waypoint = self.waypoint_index,
                total = self.waypoints.len(),
                "Waypoint reached"
            );
            if self.waypoint_index >= self.waypoints.len() {
                self.state = MissionState::Returning;
            }
            return;
        }

        self.move_towards(target.lat, target.lon, target.altitude_m, dt, rules);
    }

    fn fly_home<R>(&mut self, dt: f64, rules: &FleetRules, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let distance = haversine_distance(self.lat, self.lon, self.home_lat, self.home_lon);
        if distance < rules.arrival_radius_m {
            self.state = MissionState::Idle;
            self.speed_mps = 0.0;
            self.waypoint_index = 0;
            tracing::info!(vehicle = %self.id, "Arrived home");

            if rng.random::<f64>() < rules.remission_probability {
                self.regenerate_mission();
            }
            return;
        }

        let (home_lat, home_lon, cruise) = (self.home_lat, self.home_lon, self.cruise_altitude_m);
        self.move_towards(home_lat, home_lon, cruise, dt, rules);
    }

    fn loiter(&mut self, rules: &FleetRules) {
        self.speed_mps = self.max_speed_mps * LOITER_SPEED_FACTOR;
        self.heading_deg = (self.heading_deg + rules.loiter_turn_deg).rem_euclid(360.0);
    }

    fn move_towards(
        &mut self,
        target_lat: f64,
        target_lon: f64,
        target_alt_m: f64,
        dt: f64,
        rules: &FleetRules,
    ) {
        self.heading_deg = bearing(self.lat, self.lon, target_lat, target_lon);
        self.speed_mps = self.max_speed_mps * self.class.cruise_speed_factor();

        // Never step past the target; long ticks would otherwise oscillate around it.
        let remaining_m = haversine_distance(self.lat, self.lon, target_lat, target_lon);
        let step_m = (self.speed_mps * dt).min(remaining_m);
        let (lat, lon) = offset_equirectangular(self.lat, self.lon, step_m, self.heading_deg);
        self.lat = lat;
        self.lon = lon;

        self.altitude_m += (target_alt_m - self.altitude_m) * rules.altitude_ease;

        self.trail.push_back([lat, lon]);
        while self.trail.len() > rules.trail_capacity {
            self.trail.pop_front();
        }
    }

    fn enter_emergency(&mut self) {
        self.state = MissionState::Emergency;
        self.threat_level = ThreatLevel::Red;
        self.speed_mps = 0.0;
    }

    fn regenerate_mission(&mut self) {
        let waypoints = generate_mission(
            &self.id,
            self.class,
            self.home_lat,
            self.home_lon,
            self.cruise_altitude_m,
        );
        self.start_mission(waypoints);
    }

    fn start_mission(&mut self, waypoints: Vec<Waypoint>) {
        self.waypoints = waypoints;
        self.waypoint_index = 0;
        self.state = MissionState::EnRoute;
    }

    // ========== COMMANDS ==========

    /// Freeze the vehicle in place. Idempotent.
    pub fn pause(&mut self) {
        if self.state == MissionState::Emergency {
            return;
        }
        self.paused = true;
        self.state = MissionState::Paused;
        self.speed_mps = 0.0;
    }

    /// Release a pause. A paused vehicle resumes its mission.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        if self.state == MissionState::Paused {
            self.state = MissionState::EnRoute;
        }
    }

    /// Pause a flying vehicle or resume a paused one.
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Terminate the flight. There is no way back out of EMERGENCY.
    pub fn kill(&mut self) {
        tracing::warn!(vehicle = %self.id, "Kill command received");
        self.enter_emergency();
    }

    /// Abandon the mission and head home.
    pub fn return_to_base(&mut self) {
        if self.state == MissionState::Emergency {
            return;
        }
        self.state = MissionState::Rtb;
        self.waypoint_index = 0;
    }

    /// Enter the hold pattern at the current position.
    pub fn loiter_here(&mut self) {
        if self.paused || self.state == MissionState::Emergency {
            return;
        }
        self.state = MissionState::Loitering;
    }

    /// Replace the current mission with `waypoints` and start flying it.
    pub fn assign_mission(&mut self, waypoints: Vec<Waypoint>) {
        if self.state == MissionState::Emergency {
            return;
        }
        self.paused = false;
        self.start_mission(waypoints);
    }

    /// Capture the observer-facing view of this vehicle.
    pub fn snapshot(&self) -> VehicleSnapshot {
        let skip = self.trail.len().saturating_sub(SNAPSHOT_TRAIL_POINTS);
        VehicleSnapshot {
            id: self.id.clone(),
            class: self.class,
            model: self.model.clone(),
            lat: self.lat,
            lon: self.lon,
            altitude_m: self.altitude_m,
            speed_mps: self.speed_mps,
            heading_deg: self.heading_deg,
            battery_pct: self.battery_pct,
            fuel_pct: self.fuel_pct,
            mission_state: self.state,
            paused: self.paused,
            payload_status: self.payload_status,
            communication_status: CommsStatus::Encrypted,
            threat_level: self.threat_level,
            last_contact: self.last_contact,
            sensors: self.sensors.clone(),
            home_lat: self.home_lat,
            home_lon: self.home_lon,
            trail: self.trail.iter().skip(skip).copied().collect(),
            waypoints: self.waypoints.clone(),
            current_waypoint: self.waypoint_index,
        }
    }
}

fn is_strike_airframe(id: &str) -> bool {
    id.contains("REAPER") || id.contains("PREDATOR")
}

fn availability(present: bool) -> SensorState {
    if present {
        SensorState::Active
    } else {
        SensorState::NotAvailable
    }
}
