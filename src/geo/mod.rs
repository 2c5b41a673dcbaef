use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::job::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;
const AVERAGE_SPEED_KMH: f64 = 40.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Rough drive time between two points at an urban average speed.
pub fn travel_minutes(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_km(a, b) / AVERAGE_SPEED_KMH * 60.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeHit {
    pub point: GeoPoint,
    pub zone_code: Option<String>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the address cannot be resolved.
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeHit>, AppError>;
}

/// Resolves nothing. Used when no provider is configured.
#[derive(Debug, Default, Clone)]
pub struct NoopGeocoder;

#[async_trait]
impl Geocoder for NoopGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<GeocodeHit>, AppError> {
        Ok(None)
    }
}

/// Lookup table geocoder, keyed by the exact address string.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(transparent)]
pub struct StaticGeocoder {
    entries: HashMap<String, GeocodeHit>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn with(mut self, address: &str, point: GeoPoint, zone_code: Option<&str>) -> Self {
        self.entries.insert(
            address.to_string(),
            GeocodeHit {
                point,
                zone_code: zone_code.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeHit>, AppError> {
        Ok(self.entries.get(address).cloned())
    }
}
