//! Core library for the weather widget.
//!
//! This crate defines:
//! - Shared domain models (locations, weather snapshots, air quality)
//! - The upstream OpenWeather client used by the relay
//! - The relay client, search history and autocomplete used by front ends
//! - The search orchestrator and its pure view-model layer
//!
//! It is used by `weather-relay` and `weather-cli`.

pub mod backend;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod history;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod suggest;
pub mod view;

pub use backend::{RelayClient, WeatherBackend};
pub use config::Config;
pub use error::{ClientError, GeolocationError, SearchError};
pub use geolocation::{FixedGeolocator, Geolocator};
pub use history::{FileHistoryStore, HistoryStore, MemoryHistoryStore, SearchHistory};
pub use model::{AirQualityReading, Coordinates, Location, Units, WeatherSnapshot};
pub use orchestrator::{Orchestrator, Presenter, SearchState, UiEvent};
pub use provider::{OpenWeatherProvider, UpstreamProvider};
pub use suggest::{Autocomplete, Suggestions};
pub use view::{AirQualityView, AlertView, WeatherView};
