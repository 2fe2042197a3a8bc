//! scout-app - Detection session state machine and orchestration
//!
//! Implements the session as a TEA (The Elm Architecture) loop: a pure
//! [`SessionController`] turns [`Message`]s into state transitions and
//! [`UpdateAction`]s, and the [`Engine`] runs those actions against the
//! collaborators and publishes every transition.

pub mod actions;
pub mod config;
pub mod engine;
pub mod engine_event;
pub mod handler;
pub mod message;
pub mod session;

// Re-export primary types
pub use actions::Collaborators;
pub use engine::Engine;
pub use engine_event::SessionEvent;
pub use handler::{UpdateAction, UpdateResult};
pub use message::Message;
pub use session::{Generation, SessionController, SessionPhase, SessionState};
