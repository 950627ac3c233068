//! Simulation rules and thresholds for the fleet.

use serde::{Deserialize, Serialize};

/// Configuration for vehicle energy, navigation and alerting thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetRules {
    /// Distance at which a waypoint (or home) counts as reached, in meters
    pub arrival_radius_m: f64,
    /// Battery drain per second while moving (percent)
    pub battery_drain_moving: f64,
    /// Battery drain per second while stationary (percent)
    pub battery_drain_idle: f64,
    /// Fuel drain per second while moving (percent, fixed-wing only)
    pub fuel_drain_moving: f64,
    /// Fuel drain per second while stationary (percent, fixed-wing only)
    pub fuel_drain_idle: f64,
    /// Battery level below which the vehicle declares an emergency
    pub emergency_battery_pct: f64,
    /// Fuel level below which the vehicle declares an emergency
    pub emergency_fuel_pct: f64,
    /// Battery level below which the threat level turns yellow
    pub caution_battery_pct: f64,
    /// Battery level below which a low-battery alert is raised
    pub low_battery_alert_pct: f64,
    /// Probability per arrival tick that a fresh mission is generated
    pub remission_probability: f64,
    /// Heading change per tick while loitering (degrees)
    pub loiter_turn_deg: f64,
    /// Fraction of the remaining altitude difference closed per movement step
    pub altitude_ease: f64,
    /// Maximum number of trail points retained per vehicle
    pub trail_capacity: usize,
}

impl Default for FleetRules {
    fn default() -> Self {
        Self {
            arrival_radius_m: 50.0,
            battery_drain_moving: 0.15,
            battery_drain_idle: 0.03,
            fuel_drain_moving: 0.1,
            fuel_drain_idle: 0.02,
            emergency_battery_pct: 15.0,
            emergency_fuel_pct: 10.0,
            caution_battery_pct: 30.0,
            low_battery_alert_pct: 20.0,
            remission_probability: 0.1,
            loiter_turn_deg: 2.0,
            altitude_ease: 0.05,
            trail_capacity: 200,
        }
    }
}
