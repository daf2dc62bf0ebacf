use crate::model::{Coordinates, Units};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Upstream weather/geocoding API as seen by the relay.
///
/// Every method returns the provider's JSON body untouched so the relay can
/// pass it through verbatim.
#[async_trait]
pub trait UpstreamProvider: Send + Sync + Debug {
    /// Direct geocoding by city name, capped at [`openweather::GEOCODE_LIMIT`] matches.
    async fn geocode(&self, city: &str) -> anyhow::Result<Value>;

    /// Single best match for a coordinate pair.
    async fn reverse_geocode(&self, coords: Coordinates) -> anyhow::Result<Value>;

    /// Current conditions, daily forecast and alerts.
    async fn one_call(&self, coords: Coordinates, units: Units) -> anyhow::Result<Value>;

    async fn air_pollution(&self, coords: Coordinates) -> anyhow::Result<Value>;
}
