//! Plain-text rendering of orchestrator output.

use std::io::{self, Stdout, Write};

use weather_core::{
    AirQualityView, AlertView, Presenter, Units, WeatherView,
    view::ForecastDayView,
};

/// Writes every visible section to a terminal (or any writer in tests).
#[derive(Debug)]
pub struct TerminalPresenter<W: Write = Stdout> {
    out: W,
    units: Option<Units>,
    query: String,
    history: Vec<String>,
    suggestions: Vec<String>,
}

impl TerminalPresenter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            units: None,
            query: String::new(),
            history: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Text placed in the search box by the last suggestion pick or search.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            tracing::debug!("terminal write failed: {e}");
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn show_loading(&mut self, message: &str) {
        self.write(message);
    }

    fn hide_loading(&mut self) {}

    fn show_error(&mut self, title: &str, message: &str) {
        self.write(&format!("\n{title}: {message}"));
    }

    fn hide_error(&mut self) {}

    fn show_weather(&mut self, view: &WeatherView) {
        self.write(&render_weather(view));
    }

    fn hide_weather(&mut self) {}

    fn show_air_quality(&mut self, view: &AirQualityView) {
        self.write(&format!("Air quality: {} ({})", view.value, view.description));
    }

    fn show_alerts(&mut self, alerts: &[AlertView]) {
        if alerts.is_empty() {
            return;
        }

        let mut text = String::from("\nWeather alerts:");
        for alert in alerts {
            text.push_str(&format!("\n  ! {}: {}", alert.event, alert.description));
        }
        self.write(&text);
    }

    fn show_history(&mut self, entries: &[String]) {
        self.history = entries.to_vec();
    }

    fn show_units(&mut self, units: Units) {
        // Only announce a change, not the initial value.
        if self.units.replace(units).is_some_and(|old| old != units) {
            self.write(&format!("Units: {units}"));
        }
    }

    fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
    }

    fn show_suggestions(&mut self, labels: &[String], highlighted: Option<usize>) {
        self.suggestions = labels.to_vec();
        self.write(&render_suggestions(labels, highlighted));
    }

    fn hide_suggestions(&mut self) {
        self.suggestions.clear();
    }
}

pub fn render_weather(view: &WeatherView) -> String {
    let mut lines = vec![
        String::new(),
        view.title.clone(),
        view.date.clone(),
        format!(
            "{}{}  {} (feels like {}{})",
            view.temperature, view.temperature_unit, view.description, view.feels_like, view.temperature_unit
        ),
        format!(
            "Humidity {}%  Wind {} {}  Visibility {} km",
            view.humidity, view.wind_speed, view.wind_unit, view.visibility
        ),
        format!(
            "Sunrise {}  Sunset {}  High {}  Low {}  UV {}  Pressure {}",
            view.stats.sunrise, view.stats.sunset, view.stats.high, view.stats.low, view.stats.uv_index, view.stats.pressure
        ),
    ];

    if !view.forecast.is_empty() {
        lines.push(String::new());
        lines.extend(view.forecast.iter().map(render_forecast_day));
    }

    lines.join("\n")
}

fn render_forecast_day(day: &ForecastDayView) -> String {
    format!("{:<10} {:>5} / {:<5} {}", day.label, day.high, day.low, day.description)
}

pub fn render_suggestions(labels: &[String], highlighted: Option<usize>) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let marker = if Some(i) == highlighted { '>' } else { ' ' };
            format!("{marker} {}. {label}", i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
