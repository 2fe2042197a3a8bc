//! Message types for the session controller (TEA pattern)

use scout_core::{CapturedImage, Coordinate, DetectionError, LaunchFailure, LocationFailure, ProcessedImage};

use crate::session::Generation;

/// Everything that can drive the session state machine.
///
/// Completion messages carry the generation of the cycle that started the
/// operation so the controller can drop results nobody is waiting for.
#[derive(Debug, Clone)]
pub enum Message {
    /// User asked for a new photo.
    StartCapture,

    /// Camera returned. `None` means the user cancelled.
    CaptureCompleted {
        generation: Generation,
        image: Option<CapturedImage>,
    },

    /// Location lookup finished.
    LocationResolved {
        generation: Generation,
        result: Result<Coordinate, LocationFailure>,
    },

    /// Detection upload finished.
    UploadCompleted {
        generation: Generation,
        result: Result<ProcessedImage, DetectionError>,
    },

    /// Map launcher finished.
    MapLaunched {
        generation: Generation,
        result: Result<(), LaunchFailure>,
    },
}

impl Message {
    /// Generation a completion belongs to; `None` for user input.
    pub fn generation(&self) -> Option<Generation> {
        match self {
            Self::StartCapture => None,
            Self::CaptureCompleted { generation, .. }
            | Self::LocationResolved { generation, .. }
            | Self::UploadCompleted { generation, .. }
            | Self::MapLaunched { generation, .. } => Some(*generation),
        }
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartCapture => "start_capture",
            Self::CaptureCompleted { .. } => "capture",
            Self::LocationResolved { .. } => "location",
            Self::UploadCompleted { .. } => "upload",
            Self::MapLaunched { .. } => "map_launch",
        }
    }
}
