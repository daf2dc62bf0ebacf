//! Client-side search flow: resolve a place, fetch its weather, render, remember.
//!
//! Each search walks `Idle → Loading → {Displayed, Errored}`. The loading
//! indicator is hidden exactly once per search on every path. Air quality is
//! the only step allowed to fail without failing the search.
//!
//! Operations take `&mut self`, so a search always finishes before the next
//! one starts and an older response can never overwrite a newer view.

use chrono::Utc;
use std::{sync::Arc, time::Duration};

use crate::{
    backend::WeatherBackend,
    error::{GeolocationError, SearchError},
    geolocation::Geolocator,
    history::SearchHistory,
    model::{Coordinates, Location, Units},
    suggest::{Autocomplete, Suggestions},
    view::{AirQualityView, AlertView, WeatherView, pick_loading_message},
};

/// How long to wait for the device position.
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

pub const LOCATION_ERROR_TITLE: &str = "Location Error";
pub const LOCATION_FAILED_MESSAGE: &str =
    "Unable to get your location. Please check your location permissions.";
pub const LOCATION_UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported on this device.";

/// Presentation-binding layer. Implementations only place already formatted values.
pub trait Presenter {
    fn show_loading(&mut self, message: &str);
    fn hide_loading(&mut self);
    fn show_error(&mut self, title: &str, message: &str);
    fn hide_error(&mut self);
    fn show_weather(&mut self, view: &WeatherView);
    fn hide_weather(&mut self);
    fn show_air_quality(&mut self, view: &AirQualityView);
    /// An empty slice hides the alerts section.
    fn show_alerts(&mut self, alerts: &[AlertView]);
    fn show_history(&mut self, entries: &[String]);
    fn show_units(&mut self, units: Units);
    fn set_query(&mut self, text: &str);
    fn show_suggestions(&mut self, labels: &[String], highlighted: Option<usize>);
    fn hide_suggestions(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Displayed,
    Errored,
}

/// User actions the front end forwards to [`Orchestrator::handle`].
#[derive(Debug, Clone)]
pub enum UiEvent {
    PageLoaded,
    Submit(String),
    UseLocation,
    ToggleUnits,
    HistorySelected(String),
    SuggestionsReady(Option<Vec<Location>>),
    HighlightNext,
    HighlightPrevious,
    ConfirmHighlighted,
    SuggestionSelected(usize),
    DismissSuggestions,
}

/// Application context shared by every UI event handler.
pub struct Orchestrator<P: Presenter> {
    backend: Arc<dyn WeatherBackend>,
    geolocator: Arc<dyn Geolocator>,
    history: SearchHistory,
    autocomplete: Autocomplete,
    suggestions: Suggestions,
    units: Units,
    state: SearchState,
    current_city: Option<String>,
    presenter: P,
}

impl<P: Presenter> Orchestrator<P> {
    pub fn new(
        backend: Arc<dyn WeatherBackend>,
        geolocator: Arc<dyn Geolocator>,
        history: SearchHistory,
        units: Units,
        presenter: P,
    ) -> Self {
        Self {
            autocomplete: Autocomplete::new(Arc::clone(&backend)),
            backend,
            geolocator,
            history,
            suggestions: Suggestions::default(),
            units,
            state: SearchState::Idle,
            current_city: None,
            presenter,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    /// Name of the place currently on screen.
    pub fn current_city(&self) -> Option<&str> {
        self.current_city.as_deref()
    }

    pub fn suggestions(&self) -> &Suggestions {
        &self.suggestions
    }

    /// Handle for running suggestion lookups outside the orchestrator borrow.
    pub fn autocomplete(&self) -> Autocomplete {
        self.autocomplete.clone()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    pub async fn handle(&mut self, event: UiEvent) -> SearchState {
        match event {
            UiEvent::PageLoaded => self.start().await,
            UiEvent::Submit(input) => self.submit(&input).await,
            UiEvent::UseLocation => self.search_current_location().await,
            UiEvent::ToggleUnits => self.toggle_units().await,
            UiEvent::HistorySelected(city) => self.select_history(&city).await,
            UiEvent::SuggestionsReady(result) => {
                self.apply_suggestions(result);
                self.state
            }
            UiEvent::HighlightNext => {
                self.highlight_next();
                self.state
            }
            UiEvent::HighlightPrevious => {
                self.highlight_previous();
                self.state
            }
            UiEvent::ConfirmHighlighted => match self.confirm_highlighted().await {
                Some(state) => state,
                None => self.state,
            },
            UiEvent::SuggestionSelected(index) => self.select_suggestion(index).await,
            UiEvent::DismissSuggestions => {
                self.dismiss_suggestions();
                self.state
            }
        }
    }

    /// Render the stored history and replay its most recent entry.
    pub async fn start(&mut self) -> SearchState {
        self.presenter.show_units(self.units);
        self.presenter.show_history(self.history.entries());

        match self.history.most_recent().map(str::to_owned) {
            Some(city) => self.search_city(&city).await,
            None => self.state,
        }
    }

    /// Search for typed input.
    pub async fn submit(&mut self, input: &str) -> SearchState {
        let city = input.trim();
        if city.is_empty() {
            let err = SearchError::EmptyQuery;
            self.presenter.show_error(err.title(), &err.to_string());
            self.state = SearchState::Errored;
            return self.state;
        }

        self.search_city(city).await
    }

    pub async fn select_history(&mut self, city: &str) -> SearchState {
        self.search_city(city).await
    }

    pub async fn search_city(&mut self, city: &str) -> SearchState {
        tracing::info!(city, units = %self.units, "searching by city");
        self.begin_loading();

        match self.resolve_city(city).await {
            Ok(location) => match self.render(&location).await {
                Ok(()) => self.complete(city, &location),
                Err(err) => self.fail(err.title(), &err.to_string(), &err),
            },
            Err(err) => self.fail(err.title(), &err.to_string(), &err),
        }

        self.presenter.hide_loading();
        self.state
    }

    pub async fn search_current_location(&mut self) -> SearchState {
        if !self.geolocator.is_supported() {
            self.presenter.show_error(LOCATION_ERROR_TITLE, LOCATION_UNSUPPORTED_MESSAGE);
            self.state = SearchState::Errored;
            return self.state;
        }

        tracing::info!(units = %self.units, "searching by device location");
        self.begin_loading();

        match self.resolve_current_location().await {
            Ok(location) => match self.render(&location).await {
                Ok(()) => {
                    let name = location.name.clone();
                    self.complete(&name, &location);
                }
                Err(err) => self.fail(LOCATION_ERROR_TITLE, LOCATION_FAILED_MESSAGE, &err),
            },
            // The position source can turn out to be missing only once asked.
            Err(err @ SearchError::Geolocation(GeolocationError::Unsupported)) => {
                self.fail(LOCATION_ERROR_TITLE, LOCATION_UNSUPPORTED_MESSAGE, &err)
            }
            Err(err) => self.fail(LOCATION_ERROR_TITLE, LOCATION_FAILED_MESSAGE, &err),
        }

        self.presenter.hide_loading();
        self.state
    }

    /// Switch unit system and, if a place is shown, search it again from scratch.
    pub async fn toggle_units(&mut self) -> SearchState {
        self.units = self.units.toggled();
        self.presenter.show_units(self.units);

        match (self.state, self.current_city.clone()) {
            (SearchState::Displayed, Some(city)) => self.search_city(&city).await,
            _ => self.state,
        }
    }

    /// Show a finished suggestion lookup. `None` means it was superseded.
    pub fn apply_suggestions(&mut self, result: Option<Vec<Location>>) {
        match result {
            None => {}
            Some(locations) if locations.is_empty() => self.dismiss_suggestions(),
            Some(locations) => {
                self.suggestions.set(locations);
                self.presenter.show_suggestions(&self.suggestions.labels(), None);
            }
        }
    }

    /// Debounced lookup for `input`, then show the result.
    pub async fn on_input(&mut self, input: &str) {
        let result = self.autocomplete.suggest(input).await;
        self.apply_suggestions(result);
    }

    pub fn highlight_next(&mut self) {
        if let Some(index) = self.suggestions.highlight_next() {
            self.presenter.show_suggestions(&self.suggestions.labels(), Some(index));
        }
    }

    pub fn highlight_previous(&mut self) {
        if let Some(index) = self.suggestions.highlight_previous() {
            self.presenter.show_suggestions(&self.suggestions.labels(), Some(index));
        }
    }

    /// Search the highlighted suggestion, if any.
    pub async fn confirm_highlighted(&mut self) -> Option<SearchState> {
        let index = self.suggestions.highlighted_index()?;
        Some(self.select_suggestion(index).await)
    }

    /// Fill the query with the suggestion's label and search it.
    pub async fn select_suggestion(&mut self, index: usize) -> SearchState {
        let Some(label) = self.suggestions.get(index).map(Location::suggestion_label) else {
            return self.state;
        };

        self.presenter.set_query(&label);
        self.dismiss_suggestions();
        self.submit(&label).await
    }

    pub fn dismiss_suggestions(&mut self) {
        self.suggestions.clear();
        self.presenter.hide_suggestions();
    }

    fn begin_loading(&mut self) {
        self.state = SearchState::Loading;
        self.presenter.show_loading(pick_loading_message());
        self.presenter.hide_error();
        self.presenter.hide_weather();
    }

    async fn resolve_city(&self, city: &str) -> Result<Location, SearchError> {
        self.backend
            .geocode(city)
            .await
            .map_err(SearchError::Geocode)?
            .into_iter()
            .next()
            .ok_or(SearchError::CityNotFound)
    }

    async fn resolve_current_location(&self) -> Result<Location, SearchError> {
        let coords = self.current_position().await?;

        self.backend
            .reverse_geocode(coords)
            .await
            .map_err(SearchError::ReverseGeocode)?
            .into_iter()
            .next()
            // Keep the device position rather than the geocoder's centroid.
            .map(|location| Location { lat: coords.lat, lon: coords.lon, ..location })
            .ok_or(SearchError::LocationNotFound)
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        tokio::time::timeout(GEOLOCATION_TIMEOUT, self.geolocator.current_position())
            .await
            .map_err(|_| GeolocationError::Timeout)?
    }

    async fn render(&mut self, location: &Location) -> Result<(), SearchError> {
        let coords = location.coordinates();
        let snapshot = self
            .backend
            .weather(coords, self.units)
            .await
            .map_err(SearchError::Weather)?;

        let view = WeatherView::build(&snapshot, &location.display_name(), self.units, Utc::now());
        self.presenter.show_weather(&view);

        let air_quality = self.air_quality(coords).await;
        self.presenter.show_air_quality(&air_quality);

        self.presenter.show_alerts(&view.alerts);
        Ok(())
    }

    /// Never fails: a missing reading becomes the placeholder.
    async fn air_quality(&self, coords: Coordinates) -> AirQualityView {
        match self.backend.air_quality(coords).await {
            Ok(reading) => match reading.index() {
                Some(aqi) => AirQualityView::from_index(aqi),
                None => {
                    tracing::warn!("air quality response carried no samples");
                    AirQualityView::unavailable()
                }
            },
            Err(err) => {
                tracing::warn!("air quality unavailable: {err}");
                AirQualityView::unavailable()
            }
        }
    }

    fn complete(&mut self, remembered: &str, location: &Location) {
        self.history.add(remembered);
        self.presenter.show_history(self.history.entries());
        self.presenter.set_query(remembered);
        self.current_city = Some(location.name.clone());
        self.state = SearchState::Displayed;
    }

    fn fail(&mut self, title: &str, message: &str, cause: &SearchError) {
        tracing::warn!("search failed: {cause}");
        self.presenter.show_error(title, message);
        self.state = SearchState::Errored;
    }
}
