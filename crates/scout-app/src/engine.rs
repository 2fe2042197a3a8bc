//! Engine - drives one detection session
//!
//! Owns the [`SessionController`], the message channel the collaborator
//! tasks report on, and the outbound state/event channels. Runners (the
//! interactive CLI, headless NDJSON, tests) only talk to the Engine.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info};

use scout_core::LaunchFailure;
use scout_platform::{CaptureProvider, DetectionService, LocationProvider, MapLauncher};

use crate::actions::{handle_action, Collaborators};
use crate::engine_event::SessionEvent;
use crate::handler::UpdateAction;
use crate::message::Message;
use crate::session::{Generation, SessionController, SessionPhase, SessionState};

/// Capacity of the completion channel. At most one operation is outstanding
/// per generation, so this only has to absorb superseded stragglers.
const MESSAGE_CAPACITY: usize = 32;

const EVENT_CAPACITY: usize = 64;

/// Lightweight snapshot of state for change detection.
///
/// Every accepted transition changes the phase or the generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StateSnapshot {
    generation: Generation,
    phase: SessionPhase,
}

impl StateSnapshot {
    fn capture(controller: &SessionController) -> Self {
        Self {
            generation: controller.generation(),
            phase: controller.state().phase(),
        }
    }
}

/// Orchestration engine for a detection session.
pub struct Engine<C, L, D, M> {
    controller: SessionController,
    collaborators: Arc<Collaborators<C, L, D, M>>,

    msg_tx: mpsc::Sender<Message>,
    msg_rx: mpsc::Receiver<Message>,

    state_tx: watch::Sender<SessionState>,
    event_tx: broadcast::Sender<SessionEvent>,

    /// A map launch was dispatched and its completion not yet processed.
    map_pending: bool,
}

impl<C, L, D, M> Engine<C, L, D, M>
where
    C: CaptureProvider + Sync + 'static,
    L: LocationProvider + Sync + 'static,
    D: DetectionService + Sync + 'static,
    M: MapLauncher + Sync + 'static,
{
    pub fn new(collaborators: Collaborators<C, L, D, M>) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(MESSAGE_CAPACITY);
        let (state_tx, _) = watch::channel(SessionState::Idle);
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            controller: SessionController::new(),
            collaborators: Arc::new(collaborators),
            msg_tx,
            msg_rx,
            state_tx,
            event_tx,
            map_pending: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.controller.state()
    }

    pub fn generation(&self) -> Generation {
        self.controller.generation()
    }

    pub fn collaborators(&self) -> &Collaborators<C, L, D, M> {
        &self.collaborators
    }

    /// Get a sender for injecting messages into the engine.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Subscribe to transition events.
    ///
    /// A subscriber that falls behind loses the oldest events and sees
    /// `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Receiver that always holds the latest state.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// User pressed the capture button.
    pub fn start_capture(&mut self) {
        self.process_message(Message::StartCapture);
    }

    /// User asked to see the detection on a map.
    ///
    /// Fails with [`LaunchFailure::NoCoordinate`] unless the session is
    /// `Ready`; the state is left untouched in that case. Otherwise the
    /// launch runs in the background and its outcome arrives as a message.
    pub fn request_map(&mut self) -> Result<(), LaunchFailure> {
        let action = self.controller.request_map()?;

        if let UpdateAction::LaunchMap {
            generation,
            coordinate,
        } = &action
        {
            self.emit(SessionEvent::MapRequested {
                generation: *generation,
                coordinate: *coordinate,
            });
        }

        self.map_pending = true;
        handle_action(action, self.msg_tx.clone(), Arc::clone(&self.collaborators));
        Ok(())
    }

    /// Run one message through the controller, dispatch the resulting
    /// action and publish any transition.
    pub fn process_message(&mut self, msg: Message) {
        if matches!(msg, Message::MapLaunched { .. }) {
            self.map_pending = false;
        }

        let pre = StateSnapshot::capture(&self.controller);
        let result = self.controller.update(msg);
        let post = StateSnapshot::capture(&self.controller);

        if pre != post {
            info!(
                "Session {} -> {} (generation {})",
                pre.phase, post.phase, post.generation
            );
            self.state_tx.send_replace(self.controller.state().clone());
            self.emit(SessionEvent::StateChanged {
                generation: post.generation,
                from: pre.phase,
                state: self.controller.state().clone(),
            });
        }

        if let Some(action) = result.action {
            handle_action(action, self.msg_tx.clone(), Arc::clone(&self.collaborators));
        }
    }

    /// Wait for the next message and process it.
    ///
    /// Returns `false` once the channel is closed.
    pub async fn step(&mut self) -> bool {
        match self.msg_rx.recv().await {
            Some(msg) => {
                self.process_message(msg);
                true
            }
            None => false,
        }
    }

    /// Process any messages already queued without waiting.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Process messages until no capture, fix or upload is outstanding.
    pub async fn run_until_settled(&mut self) -> SessionState {
        while self.controller.state().is_busy() {
            if !self.step().await {
                break;
            }
        }
        self.controller.state().clone()
    }

    /// Request the map and wait for the launcher to report back.
    pub async fn open_map(&mut self) -> Result<(), LaunchFailure> {
        self.request_map()?;
        while self.map_pending {
            if !self.step().await {
                break;
            }
        }

        match self.controller.state() {
            SessionState::Failed(_) => Err(LaunchFailure::launch("map launcher failed")),
            _ => Ok(()),
        }
    }

    /// Broadcast an event. No subscribers is not an error.
    fn emit(&self, event: SessionEvent) {
        debug!("Emitting {}", event.event_type());
        let _ = self.event_tx.send(event);
    }
}
