use reqwest::StatusCode;

/// Failure talking to the relay.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("relay responded with status {0}")]
    Status(StatusCode),
    #[error("invalid relay URL: {0}")]
    InvalidUrl(String),
}

/// Device position could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("location unavailable")]
    Unavailable,
    #[error("geolocation is not supported")]
    Unsupported,
}

/// Errors that abort a search before anything is displayed.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Please enter a city name")]
    EmptyQuery,
    #[error("City not found. Please check the spelling and try again.")]
    CityNotFound,
    #[error("Location not found.")]
    LocationNotFound,
    #[error("Failed to fetch coordinates.")]
    Geocode(#[source] ClientError),
    #[error("Failed to reverse geocode location.")]
    ReverseGeocode(#[source] ClientError),
    #[error("Failed to fetch weather data. Please try again later.")]
    Weather(#[source] ClientError),
    #[error("Unable to get your location. Please check your location permissions.")]
    Geolocation(#[from] GeolocationError),
}

impl SearchError {
    pub fn title(&self) -> &'static str {
        match self {
            SearchError::EmptyQuery => "No City Entered",
            SearchError::Geolocation(_) => "Location Error",
            _ => "Weather Data Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_follow_taxonomy() {
        assert_eq!(SearchError::EmptyQuery.title(), "No City Entered");
        assert_eq!(SearchError::CityNotFound.title(), "Weather Data Error");
        assert_eq!(
            SearchError::Geolocation(GeolocationError::Timeout).title(),
            "Location Error"
        );
    }

    #[test]
    fn not_found_message() {
        assert_eq!(
            SearchError::CityNotFound.to_string(),
            "City not found. Please check the spelling and try again."
        );
    }
}
