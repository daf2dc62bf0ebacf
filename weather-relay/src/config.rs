//! Process configuration, resolved once at startup.

use anyhow::{Context, Result, anyhow};
use std::{env, net::SocketAddr};

use weather_core::provider::openweather::DEFAULT_BASE_URL;

pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";
pub const BASE_URL_VAR: &str = "OPENWEATHER_BASE_URL";
pub const HOST_VAR: &str = "HOST";
pub const PORT_VAR: &str = "PORT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone)]
pub struct RelayConfig {
    pub api_key: String,
    pub upstream_base_url: String,
    pub host: String,
    pub port: u16,
}

// Keep the credential out of logs.
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &"<redacted>")
            .field("upstream_base_url", &self.upstream_base_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get(API_KEY_VAR).ok_or_else(|| {
            anyhow!(
                "{API_KEY_VAR} is not set.\n\
                 Hint: export {API_KEY_VAR}=<your OpenWeather API key> before starting the relay."
            )
        })?;

        let port = match get(PORT_VAR) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid {PORT_VAR} value '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            upstream_base_url: get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            host: get(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}
