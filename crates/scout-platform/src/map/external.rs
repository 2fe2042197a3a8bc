//! System map application

use std::process::Command;

use url::Url;

use tracing::info;

use scout_core::{Coordinate, Error, LaunchFailure};

use super::MapLauncher;

/// Geo-search URL the coordinate query is appended to.
pub const DEFAULT_MAP_URL: &str = "https://www.google.com/maps/search/?api=1";

/// `base` with `query=<lat>,<lon>` appended, keeping existing parameters.
pub fn map_url(base: &Url, coordinate: Coordinate) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("query", &coordinate.to_string());
    url
}

#[cfg(target_os = "macos")]
const DEFAULT_OPENER: (&str, &[&str]) = ("open", &[]);

#[cfg(target_os = "windows")]
const DEFAULT_OPENER: (&str, &[&str]) = ("cmd", &["/C", "start", ""]);

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const DEFAULT_OPENER: (&str, &[&str]) = ("xdg-open", &[]);

/// Open `url` with `opener` (program plus optional arguments), or the
/// platform default when `opener` is `None`. Fire-and-forget.
pub fn open_with_system(url: &str, opener: Option<&str>) -> Result<(), LaunchFailure> {
    let (program, args): (String, Vec<String>) = match opener {
        Some(custom) => {
            let mut parts = custom.split_whitespace().map(str::to_string);
            let program = parts
                .next()
                .ok_or_else(|| LaunchFailure::launch("empty opener command"))?;
            (program, parts.collect())
        }
        None => (
            DEFAULT_OPENER.0.to_string(),
            DEFAULT_OPENER.1.iter().map(|a| a.to_string()).collect(),
        ),
    };

    let resolved = which::which(&program)
        .map_err(|_| LaunchFailure::launch(format!("{program} not found on PATH")))?;

    Command::new(resolved)
        .args(&args)
        .arg(url)
        .spawn()
        .map_err(|e| LaunchFailure::launch(format!("failed to run {program}: {e}")))?;

    Ok(())
}

/// Hands a geo-search URL to the system's map or browser application.
#[derive(Debug, Clone)]
pub struct ExternalMapLauncher {
    base: Url,
    opener: Option<String>,
}

impl ExternalMapLauncher {
    /// `opener` of `None` (or blank) uses the platform default.
    pub fn new(base_url: &str, opener: Option<String>) -> scout_core::Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::config_invalid(format!("map external_url {base_url:?}: {e}")))?;
        let opener = opener.filter(|o| !o.trim().is_empty());
        Ok(Self { base, opener })
    }

    pub fn url_for(&self, coordinate: Coordinate) -> Url {
        map_url(&self.base, coordinate)
    }
}

impl MapLauncher for ExternalMapLauncher {
    async fn open(&self, coordinate: Coordinate) -> Result<(), LaunchFailure> {
        let url = self.url_for(coordinate);
        info!("Opening map at {}", url);
        open_with_system(url.as_str(), self.opener.as_deref())
    }
}
