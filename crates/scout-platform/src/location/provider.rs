//! Permission-checking location provider

use std::time::Duration;

use scout_core::prelude::*;
use scout_core::{Coordinate, LocationFailure};

use super::{Accuracy, LocationPlatform, LocationProvider, Permission};

/// Fallback bound on a single fix request.
pub const DEFAULT_FIX_TIMEOUT: Duration = Duration::from_secs(15);

/// [`LocationProvider`] over a [`LocationPlatform`].
///
/// Checks run in order and the first one that fails decides the result:
/// service switched off, then permission (requesting it once if plainly
/// denied), then a high-accuracy fix bounded by `fix_timeout`.
pub struct PlatformLocationProvider<P> {
    platform: P,
    fix_timeout: Duration,
}

impl<P> PlatformLocationProvider<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            fix_timeout: DEFAULT_FIX_TIMEOUT,
        }
    }

    pub fn with_fix_timeout(mut self, fix_timeout: Duration) -> Self {
        self.fix_timeout = fix_timeout;
        self
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }
}

impl<P> PlatformLocationProvider<P>
where
    P: LocationPlatform + Send + Sync,
{
    async fn ensure_permission(&self) -> std::result::Result<(), LocationFailure> {
        match self.platform.check_permission().await {
            Permission::Granted => Ok(()),
            Permission::DeniedForever => Err(LocationFailure::PermissionPermanentlyDenied),
            Permission::Denied => {
                debug!("Location permission denied, requesting once");
                match self.platform.request_permission().await {
                    Permission::Granted => Ok(()),
                    Permission::Denied => Err(LocationFailure::PermissionDenied),
                    Permission::DeniedForever => {
                        Err(LocationFailure::PermissionPermanentlyDenied)
                    }
                }
            }
        }
    }
}

impl<P> LocationProvider for PlatformLocationProvider<P>
where
    P: LocationPlatform + Send + Sync,
{
    async fn current_coordinate(&self) -> std::result::Result<Coordinate, LocationFailure> {
        if !self.platform.is_service_enabled().await {
            return Err(LocationFailure::ServiceDisabled);
        }

        self.ensure_permission().await?;

        let fix = tokio::time::timeout(
            self.fix_timeout,
            self.platform.current_position(Accuracy::High),
        )
        .await;

        match fix {
            Ok(Ok(fix)) => Coordinate::new(fix.latitude, fix.longitude).map_err(|e| {
                warn!("Platform returned an unusable fix: {}", e);
                LocationFailure::PositionUnavailable
            }),
            Ok(Err(e)) => {
                warn!("{}", e);
                Err(LocationFailure::PositionUnavailable)
            }
            Err(_) => {
                warn!("No position fix within {:?}", self.fix_timeout);
                Err(LocationFailure::PositionUnavailable)
            }
        }
    }
}
