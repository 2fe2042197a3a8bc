//! Location platform for hosts without positioning hardware

use super::{Accuracy, Fix, FixError, LocationPlatform, Permission};

/// Reports a preconfigured position.
///
/// With no position configured the service reads as disabled, so the
/// session fails with `ServiceDisabled` rather than inventing a location.
/// Permission is always granted.
#[derive(Debug, Clone, Default)]
pub struct StaticLocationPlatform {
    position: Option<Fix>,
}

impl StaticLocationPlatform {
    pub fn new(position: Option<Fix>) -> Self {
        Self { position }
    }

    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::new(Some(Fix::new(latitude, longitude)))
    }
}

impl LocationPlatform for StaticLocationPlatform {
    async fn is_service_enabled(&self) -> bool {
        self.position.is_some()
    }

    async fn check_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Fix, FixError> {
        self.position
            .ok_or_else(|| FixError("no position configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{LocationProvider, PlatformLocationProvider};
    use scout_core::LocationFailure;

    #[tokio::test]
    async fn test_configured_position_resolves() {
        let provider = PlatformLocationProvider::new(StaticLocationPlatform::at(48.8566, 2.3522));

        let coord = provider.current_coordinate().await.unwrap();

        assert_eq!(coord.latitude(), 48.8566);
        assert_eq!(coord.longitude(), 2.3522);
    }

    #[tokio::test]
    async fn test_unconfigured_reads_as_disabled() {
        let provider = PlatformLocationProvider::new(StaticLocationPlatform::default());

        let result = provider.current_coordinate().await;

        assert_eq!(result, Err(LocationFailure::ServiceDisabled));
    }
}
