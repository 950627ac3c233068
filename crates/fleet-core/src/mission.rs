//! Deterministic mission generation.
//!
//! Every per-vehicle parameter is derived from a stable hash of the vehicle
//! identity, so the same identity produces the same cruise altitude, top
//! speed and waypoint ring on every run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use crate::models::{VehicleClass, Waypoint};
use crate::spatial::{meters_to_lat, meters_to_lon, stable_hash};

/// Maximum angular jitter applied to each waypoint bearing (radians).
const ANGLE_JITTER_RAD: f64 = 0.3;
/// Inner bound of the waypoint ring as a fraction of the class radius.
const MIN_RADIUS_FRACTION: f64 = 0.4;
const ALTITUDE_JITTER_BELOW_M: f64 = 100.0;
const ALTITUDE_JITTER_ABOVE_M: f64 = 200.0;

/// Default cruise altitude for an identity, in meters.
///
/// Rotary-wing: 100-300 m. Fixed-wing: 1000-3000 m.
pub fn cruise_altitude_m(id: &str, class: VehicleClass) -> f64 {
    let h = stable_hash(id);
    match class {
        VehicleClass::RotaryWing => 100.0 + (h % 200) as f64,
        VehicleClass::FixedWing => 1_000.0 + (h % 2_000) as f64,
    }
}

/// Top speed for an identity, in m/s.
///
/// Rotary-wing: 20-35 m/s. Fixed-wing: 80-120 m/s.
pub fn max_speed_mps(id: &str, class: VehicleClass) -> f64 {
    let h = stable_hash(id);
    match class {
        VehicleClass::RotaryWing => 20.0 + (h % 15) as f64,
        VehicleClass::FixedWing => 80.0 + (h % 40) as f64,
    }
}

/// Generate the waypoint ring for a vehicle.
///
/// Waypoints are spread evenly around `home` with bounded jitter in bearing,
/// distance and altitude. The generator is seeded only from `id`, so two calls
/// with the same inputs return identical lists.
pub fn generate_mission(
    id: &str,
    class: VehicleClass,
    home_lat: f64,
    home_lon: f64,
    cruise_altitude_m: f64,
) -> Vec<Waypoint> {
    let mut rng = StdRng::seed_from_u64(stable_hash(id));

    let (min_count, max_count) = class.waypoint_count_range();
    let count = rng.random_range(min_count..=max_count);
    let max_radius_m = class.mission_radius_m();

    (0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64
                + rng.random_range(-ANGLE_JITTER_RAD..=ANGLE_JITTER_RAD);
            let radius_m = rng.random_range(max_radius_m * MIN_RADIUS_FRACTION..=max_radius_m);

            let north_m = radius_m * angle.cos();
            let east_m = radius_m * angle.sin();
            let altitude_m = cruise_altitude_m
                + rng.random_range(-ALTITUDE_JITTER_BELOW_M..=ALTITUDE_JITTER_ABOVE_M);

            Waypoint::new(
                home_lat + meters_to_lat(north_m),
                home_lon + meters_to_lon(east_m, home_lat),
                altitude_m,
            )
        })
        .collect()
}
