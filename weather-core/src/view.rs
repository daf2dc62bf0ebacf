//! Pure transformation from fetched data to display-ready strings.
//!
//! Nothing here touches the network or a terminal, so the presentation layer
//! only has to place these values.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Offset, Utc};
use rand::seq::SliceRandom;

use crate::model::{Condition, Units, WeatherSnapshot, aqi_description};

/// Number of forecast days shown after today.
pub const FORECAST_DAYS: usize = 5;

pub const PLACEHOLDER: &str = "--";

pub const LOADING_MESSAGES: [&str; 5] = [
    "Checking the skies...",
    "Gathering weather data...",
    "Looking up the forecast...",
    "Getting the latest conditions...",
    "Fetching weather info...",
];

pub fn pick_loading_message() -> &'static str {
    LOADING_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(LOADING_MESSAGES[0])
}

/// Background mood derived from the current condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherTheme {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Stormy,
    Neutral,
}

impl WeatherTheme {
    pub fn from_condition(main: &str, description: &str) -> Self {
        let description = description.to_lowercase();
        if main == "Clear" || description.contains("clear") {
            Self::Sunny
        } else if main == "Clouds" || description.contains("cloud") {
            Self::Cloudy
        } else if main == "Rain" || description.contains("rain") || description.contains("drizzle") {
            Self::Rainy
        } else if main == "Snow" || description.contains("snow") {
            Self::Snowy
        } else if main == "Thunderstorm" || description.contains("thunder") {
            Self::Stormy
        } else {
            Self::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub title: String,
    pub date: String,
    pub temperature: i64,
    pub feels_like: i64,
    pub temperature_unit: &'static str,
    pub humidity: u8,
    pub wind_speed: i64,
    pub wind_unit: &'static str,
    /// Kilometres with one decimal, or [`PLACEHOLDER`].
    pub visibility: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub theme: WeatherTheme,
    pub stats: StatsView,
    pub forecast: Vec<ForecastDayView>,
    pub alerts: Vec<AlertView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsView {
    pub sunrise: String,
    pub sunset: String,
    pub high: String,
    pub low: String,
    pub uv_index: String,
    pub pressure: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDayView {
    pub label: String,
    pub icon_url: Option<String>,
    pub high: String,
    pub low: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertView {
    pub event: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityView {
    pub value: String,
    pub description: String,
}

impl AirQualityView {
    pub fn from_index(aqi: i64) -> Self {
        Self {
            value: aqi.to_string(),
            description: aqi_description(aqi).to_string(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            value: PLACEHOLDER.to_string(),
            description: "AQI unavailable".to_string(),
        }
    }
}

impl WeatherView {
    /// `now` is the render time; dates are shown in the location's UTC offset.
    pub fn build(snapshot: &WeatherSnapshot, title: &str, units: Units, now: DateTime<Utc>) -> Self {
        let offset = FixedOffset::east_opt(snapshot.timezone_offset).unwrap_or_else(|| Utc.fix());
        let current = &snapshot.current;
        let condition = current.condition();
        let suffix = units.temperature_suffix();

        let (main, description) = condition
            .map(|c| (c.main.as_str(), c.description.as_str()))
            .unwrap_or(("", ""));

        let today = snapshot.daily.first();
        let stats = StatsView {
            sunrise: current.sunrise.map_or_else(placeholder, |ts| clock_time(ts, offset)),
            sunset: current.sunset.map_or_else(placeholder, |ts| clock_time(ts, offset)),
            high: today.map_or_else(placeholder, |d| with_suffix(d.temp.max, suffix)),
            low: today.map_or_else(placeholder, |d| with_suffix(d.temp.min, suffix)),
            uv_index: current.uvi.map_or_else(placeholder, |uvi| format!("{uvi:.1}")),
            pressure: current.pressure.map_or_else(placeholder, |p| format!("{} hPa", round(p))),
        };

        let local_today = now.with_timezone(&offset).date_naive();
        let forecast = snapshot
            .daily
            .iter()
            .skip(1)
            .take(FORECAST_DAYS)
            .map(|day| {
                let condition = day.weather.first();
                ForecastDayView {
                    label: day_label(day.dt, offset, local_today),
                    icon_url: condition.and_then(|c| icon_url(c, "")),
                    high: with_suffix(day.temp.max, suffix),
                    low: with_suffix(day.temp.min, suffix),
                    description: condition.map(|c| c.description.clone()).unwrap_or_default(),
                }
            })
            .collect();

        let alerts = snapshot
            .alerts
            .iter()
            .map(|alert| AlertView {
                event: alert.event.clone(),
                description: alert.description.clone(),
            })
            .collect();

        Self {
            title: title.to_string(),
            date: now.with_timezone(&offset).format("%A, %B %-d, %Y").to_string(),
            temperature: round(current.temp),
            feels_like: round(current.feels_like),
            temperature_unit: suffix,
            humidity: current.humidity,
            wind_speed: round(current.wind_speed),
            wind_unit: units.wind_suffix(),
            visibility: match current.visibility {
                Some(metres) if metres > 0.0 => format!("{:.1}", metres / 1000.0),
                _ => placeholder(),
            },
            description: description.to_string(),
            icon_url: condition.and_then(|c| icon_url(c, "@2x")),
            theme: WeatherTheme::from_condition(main, description),
            stats,
            forecast,
            alerts,
        }
    }
}

/// Half-up rounding, so `-2.5` becomes `-2`.
fn round(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn with_suffix(value: f64, suffix: &str) -> String {
    format!("{}{}", round(value), suffix)
}

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}

fn icon_url(condition: &Condition, scale: &str) -> Option<String> {
    if condition.icon.is_empty() {
        return None;
    }
    Some(format!("https://openweathermap.org/img/wn/{}{}.png", condition.icon, scale))
}

fn clock_time(ts: i64, offset: FixedOffset) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&offset).format("%I:%M %p").to_string())
        .unwrap_or_else(placeholder)
}

fn day_label(ts: i64, offset: FixedOffset, today: NaiveDate) -> String {
    let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&offset).date_naive()) else {
        return placeholder();
    };

    if date == today {
        "Today".to_string()
    } else if Some(date) == today.checked_add_days(Days::new(1)) {
        "Tomorrow".to_string()
    } else {
        date.format("%a").to_string()
    }
}
