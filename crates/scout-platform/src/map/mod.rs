//! Showing a detection on a map
//!
//! Two collaborator flavours: an embedded view the presentation layer
//! renders, or the system's own map application.

mod embedded;
mod external;

pub use embedded::EmbeddedMapLauncher;
pub use external::{map_url, open_with_system, ExternalMapLauncher, DEFAULT_MAP_URL};

use scout_core::{Coordinate, LaunchFailure, MARKER_LABEL};

/// Zoom level used when none is configured.
pub const DEFAULT_ZOOM: u8 = 16;

/// What an embedded map should display.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    /// Label of the single marker placed at `center`.
    pub marker_label: &'static str,
}

impl MapView {
    pub fn centered_on(center: Coordinate, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            marker_label: MARKER_LABEL,
        }
    }
}

/// Opens a map centred on a coordinate.
#[trait_variant::make(MapLauncher: Send)]
pub trait LocalMapLauncher {
    async fn open(&self, coordinate: Coordinate) -> Result<(), LaunchFailure>;
}
