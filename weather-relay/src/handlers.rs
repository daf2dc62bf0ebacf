//! HTTP handlers for the relay API.
//!
//! Each handler attaches nothing but the credential (inside the provider) and
//! returns the provider's JSON untouched.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use weather_core::{Coordinates, Units};

use super::error::RelayError;
use super::state::AppState;

/// Result type for pass-through handlers.
pub type HandlerResult = Result<Json<Value>, RelayError>;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CoordQuery {
    pub lat: f64,
    pub lon: f64,
}

impl From<CoordQuery> for Coordinates {
    fn from(q: CoordQuery) -> Self {
        Coordinates::new(q.lat, q.lon)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub units: Units,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Weather API proxy is running".to_string(),
    })
}

/// GET /api/geocode/{city}
///
/// An empty match list is a successful, empty response.
pub async fn geocode(State(state): State<AppState>, Path(city): Path<String>) -> HandlerResult {
    tracing::debug!(city = %city, "geocode");

    state
        .provider
        .geocode(&city)
        .await
        .map(Json)
        .map_err(|e| RelayError::Geocode.upstream(&e))
}

/// GET /api/reverse-geocode?lat=..&lon=..
pub async fn reverse_geocode(
    State(state): State<AppState>,
    query: Result<Query<CoordQuery>, QueryRejection>,
) -> HandlerResult {
    let Query(query) = query.map_err(|e| RelayError::ReverseGeocode.rejected(&e))?;
    tracing::debug!(lat = query.lat, lon = query.lon, "reverse geocode");

    state
        .provider
        .reverse_geocode(query.into())
        .await
        .map(Json)
        .map_err(|e| RelayError::ReverseGeocode.upstream(&e))
}

/// GET /api/weather?lat=..&lon=..&units=metric|imperial
pub async fn weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> HandlerResult {
    let Query(query) = query.map_err(|e| RelayError::Weather.rejected(&e))?;
    tracing::debug!(lat = query.lat, lon = query.lon, units = %query.units, "weather");

    state
        .provider
        .one_call(Coordinates::new(query.lat, query.lon), query.units)
        .await
        .map(Json)
        .map_err(|e| RelayError::Weather.upstream(&e))
}

/// GET /api/air-quality?lat=..&lon=..
pub async fn air_quality(
    State(state): State<AppState>,
    query: Result<Query<CoordQuery>, QueryRejection>,
) -> HandlerResult {
    let Query(query) = query.map_err(|e| RelayError::AirQuality.rejected(&e))?;
    tracing::debug!(lat = query.lat, lon = query.lon, "air quality");

    state
        .provider
        .air_pollution(query.into())
        .await
        .map(Json)
        .map_err(|e| RelayError::AirQuality.upstream(&e))
}
