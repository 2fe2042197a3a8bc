//! Action handlers: UpdateAction dispatch against the collaborators

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, warn};

use scout_platform::{CaptureProvider, DetectionService, LocationProvider, MapLauncher};

use crate::handler::UpdateAction;
use crate::message::Message;

/// The four subsystems a session coordinates.
pub struct Collaborators<C, L, D, M> {
    pub capture: C,
    pub location: L,
    pub detector: D,
    pub map: M,
}

impl<C, L, D, M> Collaborators<C, L, D, M> {
    pub fn new(capture: C, location: L, detector: D, map: M) -> Self {
        Self {
            capture,
            location,
            detector,
            map,
        }
    }
}

/// Execute an action by spawning a background task.
///
/// Each task reports back with exactly one completion message tagged with
/// the generation it was started under. Tasks are never aborted; when a
/// newer capture supersedes them the controller drops their result.
pub fn handle_action<C, L, D, M>(
    action: UpdateAction,
    msg_tx: mpsc::Sender<Message>,
    collaborators: Arc<Collaborators<C, L, D, M>>,
) where
    C: CaptureProvider + Sync + 'static,
    L: LocationProvider + Sync + 'static,
    D: DetectionService + Sync + 'static,
    M: MapLauncher + Sync + 'static,
{
    match action {
        UpdateAction::Capture { generation } => {
            tokio::spawn(async move {
                let image = match collaborators.capture.capture_image().await {
                    Ok(image) => image,
                    Err(e) if e.is_recoverable() => {
                        warn!("Capture failed, treating as cancelled: {}", e);
                        None
                    }
                    Err(e) => {
                        error!("Camera unavailable, treating as cancelled: {}", e);
                        None
                    }
                };
                deliver(&msg_tx, Message::CaptureCompleted { generation, image }).await;
            });
        }

        UpdateAction::ResolveLocation { generation } => {
            tokio::spawn(async move {
                let result = collaborators.location.current_coordinate().await;
                deliver(&msg_tx, Message::LocationResolved { generation, result }).await;
            });
        }

        UpdateAction::Upload {
            generation,
            image,
            coordinate,
        } => {
            tokio::spawn(async move {
                let result = collaborators.detector.submit(image, coordinate).await;
                deliver(&msg_tx, Message::UploadCompleted { generation, result }).await;
            });
        }

        UpdateAction::LaunchMap {
            generation,
            coordinate,
        } => {
            tokio::spawn(async move {
                let result = collaborators.map.open(coordinate).await;
                deliver(&msg_tx, Message::MapLaunched { generation, result }).await;
            });
        }
    }
}

async fn deliver(msg_tx: &mpsc::Sender<Message>, msg: Message) {
    let kind = msg.kind();
    if msg_tx.send(msg).await.is_err() {
        warn!("Engine gone, dropping {} completion", kind);
    }
}
