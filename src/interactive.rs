//! Interactive runner - human-readable session output on the terminal

use tokio::sync::{broadcast, mpsc};

use scout_app::config::Settings;
use scout_app::{SessionEvent, SessionPhase, SessionState};
use scout_core::prelude::*;
use scout_platform::MapView;

use crate::desktop::{self, DesktopEngine, RunOptions};

/// What the user typed at the command prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Capture,
    Map,
    Quit,
}

/// Blank input means capture, the most common action.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "c" | "capture" => Some(Command::Capture),
        "m" | "map" => Some(Command::Map),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// One line describing a session event, if it is worth showing.
pub fn describe(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::StateChanged { from, state, .. } => match state {
            SessionState::Idle if *from == SessionPhase::Capturing => {
                Some("Capture cancelled.".to_string())
            }
            SessionState::Idle => None,
            SessionState::Capturing => Some("Capturing photo...".to_string()),
            SessionState::Locating { image } => Some(format!(
                "Got {} ({} bytes), locating...",
                image.file_name(),
                image.len()
            )),
            SessionState::Uploading { coordinate } => {
                Some(format!("Uploading photo taken at {coordinate}..."))
            }
            SessionState::Ready { image, coordinate } => Some(format!(
                "Detection ready: {} bytes of {} at {}",
                image.len(),
                image.mime_type(),
                coordinate
            )),
            SessionState::Failed(kind) => Some(format!("Failed: {}", kind.user_message())),
        },
        SessionEvent::MapRequested { coordinate, .. } => {
            Some(format!("Opening map at {coordinate}"))
        }
    }
}

/// Run the interactive session.
///
/// With `--image` a single cycle runs. Without it the user drives captures
/// from a command prompt until they quit.
pub async fn run_interactive(settings: &Settings, options: &RunOptions) -> Result<SessionState> {
    info!("Pothole Scout starting in interactive mode");

    let desktop = desktop::build(settings, options)?;
    let mut engine = desktop.engine;
    let mut map_views = desktop.map_views;
    let mut events = engine.subscribe();

    if options.image.is_some() {
        run_cycle(&mut engine, &mut events, options).await;
        if options.open_map {
            show_map(&mut engine, &mut events, map_views.as_mut()).await;
        }
        return Ok(engine.state().clone());
    }

    eprintln!("Pothole Scout. Commands: [c]apture (default), [m]ap, [q]uit");
    loop {
        let line = read_line("> ").await?;
        let Some(line) = line else { break };

        match parse_command(&line) {
            Some(Command::Capture) => {
                run_cycle(&mut engine, &mut events, options).await;
                if options.open_map && matches!(engine.state(), SessionState::Ready { .. }) {
                    show_map(&mut engine, &mut events, map_views.as_mut()).await;
                }
            }
            Some(Command::Map) => show_map(&mut engine, &mut events, map_views.as_mut()).await,
            Some(Command::Quit) => break,
            None => eprintln!("Unknown command {:?}", line.trim()),
        }
    }

    Ok(engine.state().clone())
}

async fn run_cycle(
    engine: &mut DesktopEngine,
    events: &mut broadcast::Receiver<SessionEvent>,
    options: &RunOptions,
) {
    engine.start_capture();
    while engine.state().is_busy() {
        if !engine.step().await {
            break;
        }
        print_pending(events);
    }
    print_pending(events);

    if let (SessionState::Ready { image, .. }, Some(path)) = (engine.state(), &options.output) {
        match desktop::write_output(path, image.bytes()).await {
            Ok(()) => eprintln!("Saved processed image to {}", path.display()),
            Err(e) => eprintln!("Could not save processed image: {e}"),
        }
    }
}

async fn show_map(
    engine: &mut DesktopEngine,
    events: &mut broadcast::Receiver<SessionEvent>,
    map_views: Option<&mut mpsc::Receiver<MapView>>,
) {
    let result = engine.open_map().await;
    print_pending(events);

    if let Err(e) = result {
        eprintln!("{e}");
        return;
    }

    if let Some(rx) = map_views {
        while let Ok(view) = rx.try_recv() {
            eprintln!(
                "Map centred on {} at zoom {} with marker \"{}\"",
                view.center, view.zoom, view.marker_label
            );
        }
    }
}

fn print_pending(events: &mut broadcast::Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        if let Some(line) = describe(&event) {
            eprintln!("{line}");
        }
    }
}

/// Read one line from stdin; `None` at end of input.
async fn read_line(prompt: &'static str) -> Result<Option<String>> {
    let line = tokio::task::spawn_blocking(move || {
        use std::io::Write;

        eprint!("{prompt}");
        let _ = std::io::stderr().flush();

        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|n| (n > 0).then_some(line))
    })
    .await
    .map_err(|e| Error::channel_send(format!("stdin task failed: {e}")))??;

    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::{CapturedImage, Coordinate, FailureKind};

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(""), Some(Command::Capture));
        assert_eq!(parse_command("  C \n"), Some(Command::Capture));
        assert_eq!(parse_command("map"), Some(Command::Map));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("reload"), None);
    }

    #[test]
    fn test_describe_cancel_and_idle() {
        let cancelled = SessionEvent::StateChanged {
            generation: 1,
            from: SessionPhase::Capturing,
            state: SessionState::Idle,
        };
        assert_eq!(describe(&cancelled).as_deref(), Some("Capture cancelled."));

        let quiet = SessionEvent::StateChanged {
            generation: 1,
            from: SessionPhase::Failed,
            state: SessionState::Idle,
        };
        assert_eq!(describe(&quiet), None);
    }

    #[test]
    fn test_describe_failure_uses_user_message() {
        let event = SessionEvent::StateChanged {
            generation: 2,
            from: SessionPhase::Locating,
            state: SessionState::Failed(FailureKind::PermissionDenied),
        };

        let line = describe(&event).unwrap();
        assert!(line.starts_with("Failed: "));
        assert!(line.contains(&FailureKind::PermissionDenied.user_message()));
    }

    #[test]
    fn test_describe_locating_and_map() {
        let locating = SessionEvent::StateChanged {
            generation: 1,
            from: SessionPhase::Capturing,
            state: SessionState::Locating {
                image: CapturedImage::new(vec![1u8; 10], "image/jpeg", "road.jpg"),
            },
        };
        assert_eq!(
            describe(&locating).as_deref(),
            Some("Got road.jpg (10 bytes), locating...")
        );

        let map = SessionEvent::MapRequested {
            generation: 1,
            coordinate: Coordinate::new(1.5, -2.25).unwrap(),
        };
        assert_eq!(describe(&map).as_deref(), Some("Opening map at 1.5,-2.25"));
    }
}
