//! Error types for fleet and geofence registration.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeofenceError {
    #[error("geofence {id} has {count} vertices; at least 3 are required")]
    TooFewVertices { id: String, count: usize },
    #[error("geofence {id} vertex {index} is not a valid coordinate")]
    InvalidCoordinate { id: String, index: usize },
}

#[derive(Debug, Error, PartialEq)]
pub enum FleetError {
    #[error("vehicle {0} is already registered")]
    DuplicateVehicle(String),
    #[error("vehicle {id} has an invalid home position ({lat}, {lon})")]
    InvalidHome { id: String, lat: f64, lon: f64 },
}
