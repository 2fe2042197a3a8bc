//! Headless mode runner - one detection cycle, NDJSON out

use tokio::sync::broadcast;

use scout_app::config::Settings;
use scout_app::{SessionEvent, SessionState};
use scout_core::prelude::*;

use super::HeadlessEvent;
use crate::desktop::{self, RunOptions};

/// Run one capture-through-detection cycle and report it as JSON events.
///
/// Requires `--image`: there is no one at the keyboard to answer a prompt.
pub async fn run_headless(settings: &Settings, options: &RunOptions) -> Result<SessionState> {
    info!("Pothole Scout starting in HEADLESS mode");

    if options.image.is_none() {
        let err = Error::config_invalid("headless mode needs --image");
        HeadlessEvent::error(err.to_string(), err.is_fatal()).emit();
        return Err(err);
    }

    let desktop = match desktop::build(settings, options) {
        Ok(desktop) => desktop,
        Err(e) => {
            HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
            return Err(e);
        }
    };
    let mut engine = desktop.engine;
    let mut events = engine.subscribe();

    engine.start_capture();
    let state = engine.run_until_settled().await;
    emit_pending(&mut events);

    if state.is_busy() {
        let err = Error::ChannelClosed;
        HeadlessEvent::error(err.to_string(), err.is_fatal()).emit();
        return Err(err);
    }

    if let SessionState::Ready { image, .. } = &state {
        if let Some(path) = &options.output {
            match desktop::write_output(path, image.bytes()).await {
                Ok(()) => HeadlessEvent::output_written(path).emit(),
                Err(e) => HeadlessEvent::error(e.to_string(), e.is_fatal()).emit(),
            }
        }
    }

    if options.open_map {
        if let Err(e) = engine.open_map().await {
            HeadlessEvent::error(e.to_string(), false).emit();
        }
        emit_pending(&mut events);
    }

    info!("Headless run finished in {}", engine.state().phase());
    Ok(engine.state().clone())
}

fn emit_pending(events: &mut broadcast::Receiver<SessionEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => {
                for headless in HeadlessEvent::from_session_event(&event) {
                    headless.emit();
                }
            }
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                warn!("Headless output skipped {} events", n);
            }
            Err(_) => break,
        }
    }
}
