//! HTTP error handling and response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failure of one relay endpoint.
///
/// Always rendered as a 500 with a fixed message; upstream detail only goes to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("Failed to fetch coordinates")]
    Geocode,
    #[error("Failed to reverse geocode")]
    ReverseGeocode,
    #[error("Failed to fetch weather data")]
    Weather,
    #[error("Failed to fetch air quality data")]
    AirQuality,
}

impl RelayError {
    /// Log `cause` and return the flattened error.
    pub fn upstream(self, cause: &anyhow::Error) -> Self {
        tracing::error!(endpoint = ?self, "{self}: {cause:#}");
        self
    }

    /// Log a malformed request and return the flattened error without calling upstream.
    pub fn rejected(self, rejection: &impl std::fmt::Display) -> Self {
        tracing::warn!(endpoint = ?self, "rejected request: {rejection}");
        self
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
