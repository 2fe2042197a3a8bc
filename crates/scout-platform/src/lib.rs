//! # scout-platform - Session Collaborators
//!
//! The four external, fallible subsystems a detection session coordinates,
//! each behind an async trait so the session controller can be driven by
//! real platform adapters or by scripted test doubles.
//!
//! Depends on [`scout_core`] for domain types and failures.
//!
//! ## Public API
//!
//! ### Capture
//! - [`CaptureProvider`] - Yields a captured photo or `None` on cancellation
//! - [`FileCaptureProvider`], [`PromptCaptureProvider`] - Desktop adapters
//!
//! ### Location
//! - [`LocationProvider`] - Resolves the current coordinate or a typed failure
//! - [`LocationPlatform`] - Raw platform calls (service state, permission, fix)
//! - [`PlatformLocationProvider`] - Permission sequence over a [`LocationPlatform`]
//! - [`StaticLocationPlatform`] - Fixed position for hosts without GPS
//!
//! ### Detection
//! - [`DetectionService`] - Submits (image, coordinate), returns the processed image
//! - [`DetectionClient`] - Multipart HTTP implementation
//!
//! ### Map
//! - [`MapLauncher`] - Shows a coordinate on a map
//! - [`EmbeddedMapLauncher`], [`ExternalMapLauncher`] - In-app view or system map app
//!
//! Each trait is generated with `trait_variant`: implement the `Send` variant
//! (`CaptureProvider`, ...) and the `Local*` variant comes for free.

pub mod capture;
pub mod detection;
pub mod location;
pub mod map;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use capture::{CaptureProvider, FileCaptureProvider, PromptCaptureProvider};
pub use detection::{DetectionClient, DetectionService, DETECT_PATH};
pub use location::{
    Accuracy, Fix, FixError, LocationPlatform, LocationProvider, Permission,
    PlatformLocationProvider, StaticLocationPlatform,
};
pub use map::{
    EmbeddedMapLauncher, ExternalMapLauncher, MapLauncher, MapView, DEFAULT_MAP_URL,
    DEFAULT_ZOOM,
};
