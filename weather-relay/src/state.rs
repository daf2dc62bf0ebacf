//! Application state for the HTTP server.

use std::sync::Arc;
use weather_core::UpstreamProvider;

/// Shared application state passed to all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Credential-holding client for the weather provider
    pub provider: Arc<dyn UpstreamProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn UpstreamProvider>) -> Self {
        Self { provider }
    }
}
