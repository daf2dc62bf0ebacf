//! Device position for the terminal: ask the user.

use async_trait::async_trait;
use inquire::{CustomType, InquireError};

use weather_core::{Coordinates, GeolocationError, Geolocator};

/// Prompts for latitude and longitude. Cancelling the prompt denies access.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptGeolocator;

#[async_trait]
impl Geolocator for PromptGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        tokio::task::spawn_blocking(prompt_position)
            .await
            .map_err(|_| GeolocationError::Unavailable)?
    }
}

fn prompt_position() -> Result<Coordinates, GeolocationError> {
    let lat = CustomType::<f64>::new("Latitude:")
        .with_error_message("Please type a number, e.g. 48.85")
        .prompt()
        .map_err(prompt_error)?;
    let lon = CustomType::<f64>::new("Longitude:")
        .with_error_message("Please type a number, e.g. 2.35")
        .prompt()
        .map_err(prompt_error)?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(GeolocationError::Unavailable);
    }

    Ok(Coordinates::new(lat, lon))
}

fn prompt_error(err: InquireError) -> GeolocationError {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => GeolocationError::PermissionDenied,
        InquireError::NotTTY => GeolocationError::Unsupported,
        _ => GeolocationError::Unavailable,
    }
}
