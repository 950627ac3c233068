//! Spatial math for vehicle navigation and distance calculations.

/// Mean Earth radius used by the great-circle formulas.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Flat-earth scale used when displacing vehicles: metres per degree of latitude.
pub const METERS_PER_DEG: f64 = 111_000.0;

/// Calculate the great-circle distance between two points (Haversine formula).
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing (forward azimuth) from point 1 to point 2.
/// Returns degrees in `[0, 360)`, 0 = north, 90 = east.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y).to_degrees().rem_euclid(360.0)
}

/// Convert a north/south offset in meters to degrees latitude.
pub fn meters_to_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG
}

/// Convert an east/west offset in meters to degrees longitude.
/// Requires the reference latitude for proper scaling.
pub fn meters_to_lon(meters: f64, ref_lat_deg: f64) -> f64 {
    let meters_per_deg = (METERS_PER_DEG * ref_lat_deg.to_radians().cos()).abs().max(1e-9);
    meters / meters_per_deg
}

/// Offset a position by distance and bearing using the equirectangular
/// approximation.
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `distance_m` - Distance in meters
/// * `bearing_deg` - Bearing in degrees (0 = north, 90 = east)
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_equirectangular(lat: f64, lon: f64, distance_m: f64, bearing_deg: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }
    let bearing_rad = bearing_deg.to_radians();
    let north_m = distance_m * bearing_rad.cos();
    let east_m = distance_m * bearing_rad.sin();
    (lat + meters_to_lat(north_m), lon + meters_to_lon(east_m, lat))
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a hash of an identity string.
///
/// Stable across processes and toolchains, unlike `std`'s randomly keyed hasher,
/// so per-vehicle parameters and missions reproduce on every run.
pub fn stable_hash(value: &str) -> u64 {
    value.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}
