//! Events emitted by the Engine for presentation layers
//!
//! Events are broadcast after each message is processed via
//! `Engine::subscribe()`. The latest state is also available from
//! `Engine::watch_state()` for consumers that only care about "now".

use scout_core::Coordinate;

use crate::session::{Generation, SessionPhase, SessionState};

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The session moved to a new state
    StateChanged {
        generation: Generation,
        from: SessionPhase,
        state: SessionState,
    },

    /// The map launcher was asked to show a detection
    MapRequested {
        generation: Generation,
        coordinate: Coordinate,
    },
}

impl SessionEvent {
    /// Event name for logging and serialization
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::MapRequested { .. } => "map_requested",
        }
    }

    pub fn generation(&self) -> Generation {
        match self {
            Self::StateChanged { generation, .. } | Self::MapRequested { generation, .. } => {
                *generation
            }
        }
    }
}
