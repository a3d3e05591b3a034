//! Startup location resolution.
//!
//! A terminal has no position API, so the default locator asks an IP
//! geolocation service. Any failure falls back to a city name without
//! surfacing an error to the user.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};

use crate::model::{Coordinates, Query};

pub const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";
const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Location lookup failed: {0}")]
    Lookup(String),
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Geolocation disabled: always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocator;

#[async_trait]
impl Geolocator for NoGeolocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unavailable)
    }
}

/// Coordinates supplied up front, e.g. from `--lat/--lon`.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator(pub Coordinates);

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>) -> Result<Self, LocationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LocationError::Lookup(e.to_string()))?;

        Ok(Self { url: url.into(), http })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|_| LocationError::Unavailable)?;

        if res.status() == reqwest::StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if !res.status().is_success() {
            return Err(LocationError::Lookup(format!("status {}", res.status())));
        }

        let body: IpApiResponse =
            res.json().await.map_err(|e| LocationError::Lookup(e.to_string()))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocationError::Lookup(
                body.message.unwrap_or_else(|| "no coordinates in response".to_string()),
            )),
        }
    }
}

/// Coordinates when the locator succeeds, otherwise `fallback_city`.
pub async fn resolve_initial_location(geo: &dyn Geolocator, fallback_city: &str) -> Query {
    match geo.locate().await {
        Ok(coords) => {
            tracing::info!(lat = coords.lat, lon = coords.lon, "resolved current position");
            Query::Coords(coords)
        }
        Err(err) => {
            tracing::info!("Geolocation unavailable ({err}); using '{fallback_city}'");
            Query::City(fallback_city.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Denied;

    #[async_trait]
    impl Geolocator for Denied {
        async fn locate(&self) -> Result<Coordinates, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    #[tokio::test]
    async fn fixed_position_resolves_to_coordinates() {
        let coords = Coordinates::new(38.56, 68.77);
        let query = resolve_initial_location(&FixedGeolocator(coords), "Dushanbe").await;
        assert_eq!(query, Query::Coords(coords));
    }

    #[tokio::test]
    async fn denial_and_unavailability_fall_back_to_city() {
        let query = resolve_initial_location(&Denied, "Dushanbe").await;
        assert_eq!(query, Query::City("Dushanbe".into()));

        let query = resolve_initial_location(&NoGeolocator, "Oslo").await;
        assert_eq!(query, Query::City("Oslo".into()));
    }
}
