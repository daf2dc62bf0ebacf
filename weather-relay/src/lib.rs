//! Credential-holding relay between the weather widget and OpenWeather.
//!
//! This crate provides:
//! - Environment-driven configuration (`config`)
//! - Axum handlers that pass provider JSON through untouched (`handlers`)
//! - The router with CORS and request tracing (`router`)
//! - Flattened error responses (`error`)

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::RelayConfig;
pub use error::{ErrorBody, RelayError};
pub use router::create_router;
pub use state::AppState;
