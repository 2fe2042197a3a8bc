//! Update results and the side effects they request

use scout_core::{CapturedImage, Coordinate};

use crate::session::Generation;

/// Work the engine should start after an update.
#[derive(Debug, Clone)]
pub enum UpdateAction {
    /// Open the camera.
    Capture { generation: Generation },

    /// Resolve the current coordinate.
    ResolveLocation { generation: Generation },

    /// Submit the photo and coordinate to the detection service.
    Upload {
        generation: Generation,
        image: CapturedImage,
        coordinate: Coordinate,
    },

    /// Show the coordinate on a map.
    LaunchMap {
        generation: Generation,
        coordinate: Coordinate,
    },
}

impl UpdateAction {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Capture { generation }
            | Self::ResolveLocation { generation }
            | Self::Upload { generation, .. }
            | Self::LaunchMap { generation, .. } => *generation,
        }
    }
}

/// Outcome of feeding one message to the controller.
#[derive(Debug, Clone, Default)]
pub struct UpdateResult {
    /// Optional action for the engine to perform
    pub action: Option<UpdateAction>,
    /// The message belonged to a superseded generation and was dropped
    pub stale: bool,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            action: Some(action),
            stale: false,
        }
    }

    pub fn stale() -> Self {
        Self {
            action: None,
            stale: true,
        }
    }
}
