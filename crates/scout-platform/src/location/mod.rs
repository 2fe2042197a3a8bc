//! Location resolution
//!
//! [`LocationPlatform`] is the thin surface over the host's location
//! services. [`LocationProvider`] is what a session talks to: one call, one
//! coordinate or one typed failure.

mod fixed;
mod provider;

pub use fixed::StaticLocationPlatform;
pub use provider::{PlatformLocationProvider, DEFAULT_FIX_TIMEOUT};

use scout_core::{Coordinate, LocationFailure};
use thiserror::Error;

/// Location permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    /// Denied, but the platform may still show a request dialog.
    Denied,
    /// Denied and the platform will not prompt again; only system settings
    /// can change it.
    DeniedForever,
}

/// Requested fix accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accuracy {
    #[default]
    High,
    Balanced,
}

/// Raw position reading before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// The platform could not produce a fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("position fix failed: {0}")]
pub struct FixError(pub String);

/// Host location services.
#[trait_variant::make(LocationPlatform: Send)]
pub trait LocalLocationPlatform {
    /// Whether location services are switched on.
    async fn is_service_enabled(&self) -> bool;

    /// Current permission state, without prompting.
    async fn check_permission(&self) -> Permission;

    /// Show the permission dialog and return the resulting state.
    async fn request_permission(&self) -> Permission;

    /// Request a single position reading.
    async fn current_position(&self, accuracy: Accuracy) -> Result<Fix, FixError>;
}

/// Resolves the device's current coordinate.
///
/// Each call is a single attempt: no internal retries, and at most one
/// permission dialog.
#[trait_variant::make(LocationProvider: Send)]
pub trait LocalLocationProvider {
    async fn current_coordinate(&self) -> Result<Coordinate, LocationFailure>;
}
