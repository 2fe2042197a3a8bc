//! Headless mode - JSON event output for scripting
//!
//! Runs a single detection cycle and writes one NDJSON event per session
//! transition to stdout, so scripts and E2E tests can follow the session
//! without parsing human-oriented text.
//!
//! # Example Output
//!
//! ```json
//! {"event":"state_changed","generation":1,"from":"idle","to":"capturing","timestamp":1704700001000}
//! {"event":"state_changed","generation":1,"from":"capturing","to":"locating","timestamp":1704700001010}
//! {"event":"detection_failed","generation":1,"failure":{"kind":"service_disabled"},"message":"Location services are disabled. Turn them on and try again.","timestamp":1704700001020}
//! ```

pub mod runner;

pub use runner::run_headless;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use scout_app::{Generation, SessionEvent, SessionState};
use scout_core::{Coordinate, FailureKind};

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Session moved between phases
    StateChanged {
        generation: Generation,
        from: String,
        to: String,
        timestamp: i64,
    },

    /// Annotated image received
    DetectionReady {
        generation: Generation,
        mime_type: String,
        bytes: usize,
        latitude: f64,
        longitude: f64,
        timestamp: i64,
    },

    /// Session ended in `Failed`
    DetectionFailed {
        generation: Generation,
        failure: FailureKind,
        message: String,
        timestamp: i64,
    },

    /// Map launcher asked to show a coordinate
    MapRequested {
        latitude: f64,
        longitude: f64,
        timestamp: i64,
    },

    /// Processed image written to disk
    OutputWritten { path: String, timestamp: i64 },

    /// Error outside the session state machine
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Headless events for one engine event.
    ///
    /// A transition into `Ready` or `Failed` is followed by a summary event.
    pub fn from_session_event(event: &SessionEvent) -> Vec<Self> {
        match event {
            SessionEvent::StateChanged {
                generation,
                from,
                state,
            } => {
                let mut events = vec![Self::StateChanged {
                    generation: *generation,
                    from: from.to_string(),
                    to: state.phase().to_string(),
                    timestamp: Self::now(),
                }];
                match state {
                    SessionState::Ready { image, coordinate } => {
                        events.push(Self::DetectionReady {
                            generation: *generation,
                            mime_type: image.mime_type().to_string(),
                            bytes: image.len(),
                            latitude: coordinate.latitude(),
                            longitude: coordinate.longitude(),
                            timestamp: Self::now(),
                        });
                    }
                    SessionState::Failed(kind) => events.push(Self::failed(*generation, *kind)),
                    _ => {}
                }
                events
            }
            SessionEvent::MapRequested { coordinate, .. } => vec![Self::map_requested(*coordinate)],
        }
    }

    pub fn failed(generation: Generation, failure: FailureKind) -> Self {
        Self::DetectionFailed {
            generation,
            failure,
            message: failure.user_message(),
            timestamp: Self::now(),
        }
    }

    pub fn map_requested(coordinate: Coordinate) -> Self {
        Self::MapRequested {
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            timestamp: Self::now(),
        }
    }

    pub fn output_written(path: &std::path::Path) -> Self {
        Self::OutputWritten {
            path: path.display().to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_app::SessionPhase;
    use scout_core::ProcessedImage;

    fn coordinate() -> Coordinate {
        Coordinate::new(37.421999, -122.084).unwrap()
    }

    #[test]
    fn test_state_changed_serialization() {
        let events = HeadlessEvent::from_session_event(&SessionEvent::StateChanged {
            generation: 1,
            from: SessionPhase::Idle,
            state: SessionState::Capturing,
        });
        assert_eq!(events.len(), 1);

        let json = serde_json::to_string(&events[0]).expect("serialization failed");
        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");

        assert_eq!(value["event"], "state_changed");
        assert_eq!(value["generation"], 1);
        assert_eq!(value["from"], "idle");
        assert_eq!(value["to"], "capturing");
        assert!(value["timestamp"].is_number());
    }

    #[test]
    fn test_ready_adds_detection_summary() {
        let events = HeadlessEvent::from_session_event(&SessionEvent::StateChanged {
            generation: 2,
            from: SessionPhase::Uploading,
            state: SessionState::Ready {
                image: ProcessedImage::new(vec![1u8, 2, 3], "image/png"),
                coordinate: coordinate(),
            },
        });
        assert_eq!(events.len(), 2);

        let value = serde_json::to_value(&events[1]).expect("serialization failed");
        assert_eq!(value["event"], "detection_ready");
        assert_eq!(value["mime_type"], "image/png");
        assert_eq!(value["bytes"], 3);
        assert_eq!(value["latitude"], 37.421999);
        assert_eq!(value["longitude"], -122.084);
    }

    #[test]
    fn test_failed_carries_kind_and_message() {
        let event = HeadlessEvent::failed(3, FailureKind::ServerError { code: 503 });
        let value = serde_json::to_value(&event).expect("serialization failed");

        assert_eq!(value["event"], "detection_failed");
        assert_eq!(value["failure"]["kind"], "server_error");
        assert_eq!(value["failure"]["code"], 503);
        assert_eq!(
            value["message"],
            "The detection service failed with status 503."
        );
    }

    #[test]
    fn test_error_serialization() {
        let event = HeadlessEvent::error("no coordinate".to_string(), false);
        let value = serde_json::to_value(&event).expect("serialization failed");

        assert_eq!(value["event"], "error");
        assert_eq!(value["message"], "no coordinate");
        assert_eq!(value["fatal"], false);
    }
}
