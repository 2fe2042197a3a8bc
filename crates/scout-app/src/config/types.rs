//! Configuration types for Pothole Scout
//!
//! Defines:
//! - `Settings` - Application settings (`config.toml`)
//! - `DetectionSettings`, `LocationSettings`, `MapSettings` - Per-collaborator sections
//! - `MapMode` - Which map launcher to use

use std::time::Duration;

use serde::{Deserialize, Serialize};

use scout_platform::{Fix, DEFAULT_MAP_URL, DEFAULT_ZOOM};

/// Application settings (config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub detection: DetectionSettings,

    #[serde(default)]
    pub location: LocationSettings,

    #[serde(default)]
    pub map: MapSettings,
}

/// Detection service endpoint and timeouts
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DetectionSettings {
    /// Base URL; `/detect` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl DetectionSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

/// Location fix settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationSettings {
    /// Upper bound on a single fix request in milliseconds
    #[serde(default = "default_fix_timeout_ms")]
    pub timeout_ms: u64,

    /// Fixed position for hosts without a positioning service.
    /// Both must be set; otherwise location services count as disabled.
    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_fix_timeout_ms(),
            latitude: None,
            longitude: None,
        }
    }
}

impl LocationSettings {
    pub fn fix_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn fixed_position(&self) -> Option<Fix> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Fix::new(latitude, longitude)),
            _ => None,
        }
    }
}

fn default_fix_timeout_ms() -> u64 {
    15_000
}

/// Which map launcher handles "show on map"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    /// Publish a map view for the presentation layer to draw
    Embedded,
    /// Hand a map URL to the system opener
    #[default]
    External,
}

impl std::fmt::Display for MapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapMode::Embedded => write!(f, "embedded"),
            MapMode::External => write!(f, "external"),
        }
    }
}

/// Map settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MapSettings {
    #[serde(default)]
    pub mode: MapMode,

    /// Base search URL for external maps; `query=<lat>,<lon>` is appended
    #[serde(default = "default_external_url")]
    pub external_url: String,

    /// Program used to open the URL (empty = platform default)
    #[serde(default)]
    pub opener: String,

    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            mode: MapMode::default(),
            external_url: default_external_url(),
            opener: String::new(),
            zoom: default_zoom(),
        }
    }
}

impl MapSettings {
    /// Configured opener, `None` when the platform default should be used.
    pub fn opener(&self) -> Option<String> {
        let opener = self.opener.trim();
        (!opener.is_empty()).then(|| opener.to_string())
    }
}

fn default_external_url() -> String {
    DEFAULT_MAP_URL.to_string()
}

fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}
