use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::GeolocationError, model::Coordinates};

/// Source of the device position.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;

    /// `false` when no position source exists at all.
    fn is_supported(&self) -> bool {
        true
    }
}

/// A position supplied up front, e.g. from the command line.
///
/// Without one, every lookup reports [`GeolocationError::Unsupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinates>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }

    pub fn unsupported() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.position.ok_or(GeolocationError::Unsupported)
    }

    fn is_supported(&self) -> bool {
        self.position.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_position_is_returned() {
        let geo = FixedGeolocator::new(Some(Coordinates::new(59.91, 10.75)));
        assert_eq!(geo.current_position().await, Ok(Coordinates::new(59.91, 10.75)));
    }

    #[tokio::test]
    async fn missing_position_is_unsupported() {
        let geo = FixedGeolocator::unsupported();
        assert_eq!(geo.current_position().await, Err(GeolocationError::Unsupported));
        assert!(!geo.is_supported());
    }
}
