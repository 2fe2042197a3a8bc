//! Settings loading and the default config file

use std::path::{Path, PathBuf};

use url::Url;

use scout_core::prelude::*;
use scout_core::Coordinate;

use super::types::Settings;

pub const CONFIG_FILENAME: &str = "config.toml";

const APP_DIR: &str = "pothole-scout";

/// `<config dir>/pothole-scout/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Load settings from `path`, or from [`default_config_path`] when `None`.
///
/// Never fails: a missing file yields defaults silently, an unreadable or
/// malformed one yields defaults with a warning.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let config_path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            debug!("No config directory on this platform, using defaults");
            return Settings::default();
        }
    };

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Reject settings no collaborator could work with.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    let base = Url::parse(settings.detection.base_url.trim()).map_err(|e| {
        Error::config_invalid(format!(
            "detection.base_url {:?}: {}",
            settings.detection.base_url, e
        ))
    })?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(Error::config_invalid(format!(
            "detection.base_url must be http or https, got {}",
            base.scheme()
        )));
    }

    if settings.detection.timeout_ms == 0 || settings.detection.connect_timeout_ms == 0 {
        return Err(Error::config_invalid("detection timeouts must be non-zero"));
    }

    if settings.location.timeout_ms == 0 {
        return Err(Error::config_invalid("location.timeout_ms must be non-zero"));
    }

    match (settings.location.latitude, settings.location.longitude) {
        (Some(lat), Some(lon)) => {
            Coordinate::new(lat, lon)
                .map_err(|e| Error::config_invalid(format!("location: {e}")))?;
        }
        (None, None) => {}
        _ => {
            return Err(Error::config_invalid(
                "location.latitude and location.longitude must be set together",
            ))
        }
    }

    Url::parse(&settings.map.external_url).map_err(|e| {
        Error::config_invalid(format!(
            "map.external_url {:?}: {}",
            settings.map.external_url, e
        ))
    })?;

    Ok(())
}

/// Write a commented default config file at `path` unless one exists.
///
/// Returns `true` if a file was created.
pub fn init_config_file(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::config(format!("Failed to create {:?}: {}", parent, e)))?;
    }

    let default_content = r#"# Pothole Scout Configuration

[detection]
base_url = "http://127.0.0.1:8000"   # /detect is appended
timeout_ms = 30000
connect_timeout_ms = 10000

[location]
timeout_ms = 15000
# Fixed position for machines without GPS. Leave unset to report
# location services as disabled.
# latitude = 37.421999
# longitude = -122.084

[map]
mode = "external"       # "external" opens the system map, "embedded" renders in-app
external_url = "https://www.google.com/maps/search/?api=1"
opener = ""             # Empty = system default
zoom = 16
"#;

    std::fs::write(path, default_content)
        .map_err(|e| Error::config(format!("Failed to write {:?}: {}", path, e)))?;

    info!("Created default config at {:?}", path);
    Ok(true)
}
