use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::model::{Coordinates, Units};

use super::UpstreamProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Maximum number of direct-geocoding matches requested per search.
pub const GEOCODE_LIMIT: u8 = 7;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenWeather client holding the credential. Only the relay constructs this.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build OpenWeather HTTP client")?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Issue a GET against `path`, attaching the credential, and return the body verbatim.
    async fn fetch(&self, what: &str, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            // The request URL carries the credential.
            .map_err(|err| err.without_url())
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|err| err.without_url())
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse OpenWeather {what} JSON"))
    }
}

#[async_trait]
impl UpstreamProvider for OpenWeatherProvider {
    async fn geocode(&self, city: &str) -> Result<Value> {
        self.fetch(
            "geocoding",
            "/geo/1.0/direct",
            &[("q", city.to_string()), ("limit", GEOCODE_LIMIT.to_string())],
        )
        .await
    }

    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Value> {
        self.fetch(
            "reverse geocoding",
            "/geo/1.0/reverse",
            &[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("limit", "1".to_string()),
            ],
        )
        .await
    }

    async fn one_call(&self, coords: Coordinates, units: Units) -> Result<Value> {
        self.fetch(
            "one call",
            "/data/3.0/onecall",
            &[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("units", units.as_str().to_string()),
            ],
        )
        .await
    }

    async fn air_pollution(&self, coords: Coordinates) -> Result<Value> {
        self.fetch(
            "air pollution",
            "/data/2.5/air_pollution",
            &[("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())],
        )
        .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
