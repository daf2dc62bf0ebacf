//! Client side of the relay: the calls the orchestrator sequences per search.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::{fmt::Debug, time::Duration};

use crate::{
    error::ClientError,
    model::{AirQualityReading, Coordinates, Location, Units, WeatherSnapshot},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[async_trait]
pub trait WeatherBackend: Send + Sync + Debug {
    async fn geocode(&self, city: &str) -> Result<Vec<Location>, ClientError>;

    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Vec<Location>, ClientError>;

    async fn weather(&self, coords: Coordinates, units: Units) -> Result<WeatherSnapshot, ClientError>;

    async fn air_quality(&self, coords: Coordinates) -> Result<AirQualityReading, ClientError>;
}

/// HTTP client for the relay's `/api/*` endpoints.
#[derive(Debug, Clone)]
pub struct RelayClient {
    base_url: Url,
    http: Client,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded as a single segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T, ClientError> {
        tracing::debug!(path = url.path(), "relay request");

        let res = self.http.get(url).query(query).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        Ok(res.json::<T>().await?)
    }
}

fn coord_query(coords: Coordinates) -> Vec<(&'static str, String)> {
    vec![("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())]
}

#[async_trait]
impl WeatherBackend for RelayClient {
    async fn geocode(&self, city: &str) -> Result<Vec<Location>, ClientError> {
        let url = self.endpoint(&["api", "geocode", city])?;
        self.get_json(url, &[]).await
    }

    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Vec<Location>, ClientError> {
        let url = self.endpoint(&["api", "reverse-geocode"])?;
        self.get_json(url, &coord_query(coords)).await
    }

    async fn weather(&self, coords: Coordinates, units: Units) -> Result<WeatherSnapshot, ClientError> {
        let url = self.endpoint(&["api", "weather"])?;
        let mut query = coord_query(coords);
        query.push(("units", units.as_str().to_string()));
        self.get_json(url, &query).await
    }

    async fn air_quality(&self, coords: Coordinates) -> Result<AirQualityReading, ClientError> {
        let url = self.endpoint(&["api", "air-quality"])?;
        self.get_json(url, &coord_query(coords)).await
    }
}
