//! In-app map view

use tokio::sync::mpsc;

use scout_core::{Coordinate, LaunchFailure};

use super::{MapLauncher, MapView};

/// Hands a [`MapView`] to whoever renders the embedded map.
#[derive(Debug, Clone)]
pub struct EmbeddedMapLauncher {
    tx: mpsc::Sender<MapView>,
    zoom: u8,
}

impl EmbeddedMapLauncher {
    /// Create the launcher and the receiver the map widget reads from.
    pub fn new(zoom: u8) -> (Self, mpsc::Receiver<MapView>) {
        let (tx, rx) = mpsc::channel(4);
        (Self { tx, zoom }, rx)
    }
}

impl MapLauncher for EmbeddedMapLauncher {
    async fn open(&self, coordinate: Coordinate) -> Result<(), LaunchFailure> {
        self.tx
            .send(MapView::centered_on(coordinate, self.zoom))
            .await
            .map_err(|_| LaunchFailure::launch("map view is closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::MARKER_LABEL;

    #[tokio::test]
    async fn test_open_publishes_centered_view() {
        let (launcher, mut rx) = EmbeddedMapLauncher::new(15);
        let coord = Coordinate::new(51.5074, -0.1278).unwrap();

        tokio_test::assert_ok!(launcher.open(coord).await);

        let view = rx.recv().await.unwrap();
        assert_eq!(view.center, coord);
        assert_eq!(view.zoom, 15);
        assert_eq!(view.marker_label, MARKER_LABEL);
    }

    #[tokio::test]
    async fn test_open_without_view_fails() {
        let (launcher, rx) = EmbeddedMapLauncher::new(15);
        drop(rx);

        let result = launcher.open(Coordinate::new(0.0, 0.0).unwrap()).await;

        assert!(matches!(result, Err(LaunchFailure::Launch { .. })));
    }
}
