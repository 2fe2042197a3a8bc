//! The session state machine

use scout_core::prelude::*;
use scout_core::{FailureKind, LaunchFailure};

use super::{Generation, SessionState};
use crate::handler::{UpdateAction, UpdateResult};
use crate::message::Message;

/// Owns [`SessionState`] and the current [`Generation`].
///
/// `update` is pure: it never touches a collaborator. Side effects come back
/// as an [`UpdateAction`] for the engine to run.
#[derive(Debug, Default)]
pub struct SessionController {
    state: SessionState,
    generation: Generation,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Process a message and return the follow-up action, if any.
    pub fn update(&mut self, msg: Message) -> UpdateResult {
        if let Some(generation) = msg.generation() {
            if generation != self.generation {
                debug!(
                    "Discarding stale {} completion (generation {}, current {})",
                    msg.kind(),
                    generation,
                    self.generation
                );
                return UpdateResult::stale();
            }
        }

        match msg {
            Message::StartCapture => self.start_capture(),
            Message::CaptureCompleted { image, .. } => match (&self.state, image) {
                (SessionState::Capturing, None) => {
                    info!("Capture cancelled");
                    self.state = SessionState::Idle;
                    UpdateResult::none()
                }
                (SessionState::Capturing, Some(image)) => {
                    info!("Captured {} ({} bytes)", image.file_name(), image.len());
                    self.state = SessionState::Locating { image };
                    UpdateResult::action(UpdateAction::ResolveLocation {
                        generation: self.generation,
                    })
                }
                _ => self.mismatched("capture"),
            },
            Message::LocationResolved { result, .. } => {
                let SessionState::Locating { image } = &self.state else {
                    return self.mismatched("location");
                };
                match result {
                    Ok(coordinate) => {
                        let image = image.clone();
                        info!("Resolved coordinate {}", coordinate);
                        self.state = SessionState::Uploading { coordinate };
                        UpdateResult::action(UpdateAction::Upload {
                            generation: self.generation,
                            image,
                            coordinate,
                        })
                    }
                    Err(failure) => {
                        error!("Location failed: {}", failure);
                        self.fail(failure.into())
                    }
                }
            }
            Message::UploadCompleted { result, .. } => {
                let SessionState::Uploading { coordinate } = self.state else {
                    return self.mismatched("upload");
                };
                match result {
                    Ok(image) => {
                        info!("Detection ready: {} bytes of {}", image.len(), image.mime_type());
                        self.state = SessionState::Ready { image, coordinate };
                        UpdateResult::none()
                    }
                    Err(err) => {
                        error!("Detection failed: {}", err);
                        self.fail((&err).into())
                    }
                }
            }
            Message::MapLaunched { result, .. } => {
                if !matches!(self.state, SessionState::Ready { .. }) {
                    return self.mismatched("map launch");
                }
                match result {
                    Ok(()) => UpdateResult::none(),
                    Err(err) => {
                        error!("Map launch failed: {}", err);
                        self.fail((&err).into())
                    }
                }
            }
        }
    }

    /// Ask for the map. Only a `Ready` session has a coordinate to show.
    ///
    /// The state is not modified; the launch outcome comes back later as
    /// [`Message::MapLaunched`].
    pub fn request_map(&self) -> std::result::Result<UpdateAction, LaunchFailure> {
        match self.state.map_coordinate() {
            Some(coordinate) => Ok(UpdateAction::LaunchMap {
                generation: self.generation,
                coordinate,
            }),
            None => {
                warn!("Map requested while {}", self.state.phase());
                Err(LaunchFailure::NoCoordinate)
            }
        }
    }

    fn start_capture(&mut self) -> UpdateResult {
        if matches!(self.state, SessionState::Capturing) {
            debug!("Capture already open, ignoring start");
            return UpdateResult::none();
        }

        if self.state.is_busy() {
            info!(
                "Superseding {} operation of generation {}",
                self.state.phase(),
                self.generation
            );
        }

        self.generation += 1;
        self.state = SessionState::Capturing;
        UpdateResult::action(UpdateAction::Capture {
            generation: self.generation,
        })
    }

    fn fail(&mut self, kind: FailureKind) -> UpdateResult {
        self.state = SessionState::Failed(kind);
        UpdateResult::none()
    }

    fn mismatched(&self, kind: &str) -> UpdateResult {
        warn!(
            "Ignoring {} completion while {} (generation {})",
            kind,
            self.state.phase(),
            self.generation
        );
        UpdateResult::none()
    }
}
