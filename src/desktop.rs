//! Desktop collaborators
//!
//! Picks a concrete implementation for each collaborator from the settings
//! and command line: a file or an interactive prompt for the camera, a fixed
//! position for location, the HTTP detection client, and an embedded or
//! external map.

use std::path::PathBuf;

use tokio::sync::mpsc;

use scout_app::config::{MapMode, Settings};
use scout_app::{Collaborators, Engine};
use scout_core::prelude::*;
use scout_core::{CapturedImage, Coordinate, LaunchFailure};
use scout_platform::{
    CaptureProvider, DetectionClient, EmbeddedMapLauncher, ExternalMapLauncher,
    FileCaptureProvider, MapLauncher, MapView, PlatformLocationProvider, PromptCaptureProvider,
    StaticLocationPlatform,
};

/// Camera stand-in for hosts without one.
#[derive(Debug, Clone)]
pub enum DesktopCapture {
    /// Re-read the same file on every capture.
    File(FileCaptureProvider),
    /// Ask for a path on stdin; a blank line cancels.
    Prompt(PromptCaptureProvider),
}

impl CaptureProvider for DesktopCapture {
    async fn capture_image(&self) -> Result<Option<CapturedImage>> {
        match self {
            Self::File(provider) => provider.capture_image().await,
            Self::Prompt(provider) => provider.capture_image().await,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DesktopMap {
    Embedded(EmbeddedMapLauncher),
    External(ExternalMapLauncher),
}

impl MapLauncher for DesktopMap {
    async fn open(&self, coordinate: Coordinate) -> std::result::Result<(), LaunchFailure> {
        match self {
            Self::Embedded(launcher) => launcher.open(coordinate).await,
            Self::External(launcher) => launcher.open(coordinate).await,
        }
    }
}

pub type DesktopLocation = PlatformLocationProvider<StaticLocationPlatform>;

pub type DesktopEngine = Engine<DesktopCapture, DesktopLocation, DetectionClient, DesktopMap>;

/// Command-line choices that shape a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Photo to submit instead of prompting for one
    pub image: Option<PathBuf>,
    /// Where to write the processed image once ready
    pub output: Option<PathBuf>,
    /// Request the map once the detection is ready
    pub open_map: bool,
}

/// Engine plus the embedded map feed, when the map is embedded.
pub struct Desktop {
    pub engine: DesktopEngine,
    pub map_views: Option<mpsc::Receiver<MapView>>,
}

/// Build the engine and its collaborators from validated settings.
pub fn build(settings: &Settings, options: &RunOptions) -> Result<Desktop> {
    let capture = match &options.image {
        Some(path) => DesktopCapture::File(FileCaptureProvider::new(path)),
        None => DesktopCapture::Prompt(PromptCaptureProvider::new()),
    };

    let platform = StaticLocationPlatform::new(settings.location.fixed_position());
    let location =
        PlatformLocationProvider::new(platform).with_fix_timeout(settings.location.fix_timeout());

    let detector = DetectionClient::with_timeouts(
        &settings.detection.base_url,
        settings.detection.request_timeout(),
        settings.detection.connect_timeout(),
    )?;
    info!("Detection endpoint: {}", detector.endpoint());

    let (map, map_views) = match settings.map.mode {
        MapMode::Embedded => {
            let (launcher, rx) = EmbeddedMapLauncher::new(settings.map.zoom);
            (DesktopMap::Embedded(launcher), Some(rx))
        }
        MapMode::External => {
            let launcher =
                ExternalMapLauncher::new(&settings.map.external_url, settings.map.opener())?;
            (DesktopMap::External(launcher), None)
        }
    };

    let engine = Engine::new(Collaborators::new(capture, location, detector, map));
    Ok(Desktop { engine, map_views })
}

/// Write the processed image to `path`.
pub async fn write_output(path: &std::path::Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_app::SessionState;

    #[test]
    fn test_build_external_map_by_default() {
        let desktop = build(&Settings::default(), &RunOptions::default()).unwrap();

        assert!(desktop.map_views.is_none());
        assert!(matches!(
            desktop.engine.collaborators().map,
            DesktopMap::External(_)
        ));
        assert!(matches!(
            desktop.engine.collaborators().capture,
            DesktopCapture::Prompt(_)
        ));
        assert_eq!(desktop.engine.state(), &SessionState::Idle);
    }

    #[test]
    fn test_build_embedded_map_with_image() {
        let mut settings = Settings::default();
        settings.map.mode = MapMode::Embedded;
        let options = RunOptions {
            image: Some(PathBuf::from("road.jpg")),
            ..Default::default()
        };

        let desktop = build(&settings, &options).unwrap();

        assert!(desktop.map_views.is_some());
        assert!(matches!(
            desktop.engine.collaborators().capture,
            DesktopCapture::File(_)
        ));
    }

    #[test]
    fn test_build_rejects_bad_endpoint() {
        let mut settings = Settings::default();
        settings.detection.base_url = "not a url".to_string();

        assert!(build(&settings, &RunOptions::default()).is_err());
    }
}
