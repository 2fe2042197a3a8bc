//! Detection session state
//!
//! [`SessionState`] is what the user currently sees. It is replaced wholesale
//! on every transition and only the [`SessionController`] writes it.

mod controller;


pub use controller::SessionController;

use scout_core::{CapturedImage, Coordinate, FailureKind, ProcessedImage};

/// Identifies one capture-through-render cycle.
///
/// Bumped on every accepted capture start. Asynchronous completions carry
/// the generation they were started under, and any completion from an
/// older generation is discarded.
pub type Generation = u64;

/// The session state machine's states.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Camera UI is open.
    Capturing,
    /// Photo taken, waiting for a fix. Holds the photo until upload.
    Locating { image: CapturedImage },
    /// Upload in flight.
    Uploading { coordinate: Coordinate },
    /// Annotated image ready to render; the map can be opened.
    Ready {
        image: ProcessedImage,
        coordinate: Coordinate,
    },
    Failed(FailureKind),
}

/// [`SessionState`] without its payload, for logs and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Idle,
    Capturing,
    Locating,
    Uploading,
    Ready,
    Failed,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            Self::Idle => SessionPhase::Idle,
            Self::Capturing => SessionPhase::Capturing,
            Self::Locating { .. } => SessionPhase::Locating,
            Self::Uploading { .. } => SessionPhase::Uploading,
            Self::Ready { .. } => SessionPhase::Ready,
            Self::Failed(_) => SessionPhase::Failed,
        }
    }

    /// No operation is outstanding; the next move is the user's.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Idle | Self::Ready { .. } | Self::Failed(_))
    }

    /// A capture, fix or upload is outstanding.
    pub fn is_busy(&self) -> bool {
        !self.is_settled()
    }

    /// Coordinate the map can be centred on; only set in `Ready`.
    pub fn map_coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Ready { coordinate, .. } => Some(*coordinate),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            Self::Failed(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Locating => "locating",
            Self::Uploading => "uploading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
