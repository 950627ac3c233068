//! Geofence index: restricted polygons and point containment.

use chrono::Utc;
use dashmap::DashMap;

use crate::error::GeofenceError;
use crate::models::Geofence;

/// Thread-safe store of geofences keyed by id.
///
/// Registration and deactivation lock a single shard, so concurrent
/// containment checks keep running against the other fences.
#[derive(Debug, Default)]
pub struct GeofenceIndex {
    fences: DashMap<String, Geofence>,
}

impl GeofenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a geofence, replacing any existing entry with the same id.
    pub fn add_geofence(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        polygon: Vec<[f64; 2]>,
        color: impl Into<String>,
    ) -> Result<Geofence, GeofenceError> {
        let id = id.into();
        validate_polygon(&id, &polygon)?;

        let geofence = Geofence {
            id: id.clone(),
            name: name.into(),
            polygon,
            color: color.into(),
            active: true,
            created_at: Utc::now(),
        };

        if self.fences.insert(id, geofence.clone()).is_some() {
            tracing::info!("Replaced geofence '{}' ({})", geofence.name, geofence.id);
        } else {
            tracing::info!("Registered geofence '{}' ({})", geofence.name, geofence.id);
        }
        Ok(geofence)
    }

    pub fn get(&self, id: &str) -> Option<Geofence> {
        self.fences.get(id).map(|entry| entry.value().clone())
    }

    /// Stop enforcing a geofence. The fence is retained.
    pub fn deactivate(&self, id: &str) -> bool {
        match self.fences.get_mut(id) {
            Some(mut entry) => {
                entry.active = false;
                tracing::info!("Deactivated geofence {}", id);
                true
            }
            None => false,
        }
    }

    /// All active geofences, sorted by id.
    pub fn all_active(&self) -> Vec<Geofence> {
        let mut fences: Vec<Geofence> = self
            .fences
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.value().clone())
            .collect();
        fences.sort_by(|a, b| a.id.cmp(&b.id));
        fences
    }

    /// True if the point lies inside any active geofence.
    pub fn violates(&self, lat: f64, lon: f64) -> bool {
        self.fences
            .iter()
            .any(|entry| entry.active && entry.contains_point(lat, lon))
    }

    /// Ids of the active geofences containing the point, sorted.
    pub fn violations(&self, lat: f64, lon: f64) -> Vec<String> {
        let mut ids: Vec<String> = self
            .fences
            .iter()
            .filter(|entry| entry.active && entry.contains_point(lat, lon))
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.fences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fences.is_empty()
    }
}

fn validate_polygon(id: &str, polygon: &[[f64; 2]]) -> Result<(), GeofenceError> {
    if polygon.len() < 3 {
        return Err(GeofenceError::TooFewVertices {
            id: id.to_string(),
            count: polygon.len(),
        });
    }
    for (index, [lat, lon]) in polygon.iter().enumerate() {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(lat)
            && (-180.0..=180.0).contains(lon);
        if !valid {
            return Err(GeofenceError::InvalidCoordinate {
                id: id.to_string(),
                index,
            });
        }
    }
    Ok(())
}
