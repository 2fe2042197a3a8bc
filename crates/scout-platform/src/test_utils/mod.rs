//! Test utilities for collaborator types
//!
//! Available to other crates through the `test-helpers` feature.
//!
//! - [`MockDetectionServer`] - In-process HTTP server that records multipart uploads
//! - Scripted collaborators ([`ScriptedCapture`], [`ScriptedLocation`],
//!   [`ScriptedLocationPlatform`], [`ScriptedDetector`], [`RecordingMapLauncher`])
//!   that replay canned results and count calls

mod mock_server;
mod scripted;

pub use mock_server::{MockDetectionServer, MockResponse, RecordedFile, RecordedRequest};
pub use scripted::{
    CaptureStep, RecordingMapLauncher, ScriptedCapture, ScriptedDetector, ScriptedLocation,
    ScriptedLocationPlatform,
};

use scout_core::{CapturedImage, Coordinate, ProcessedImage};

/// PNG file signature, enough for format sniffing.
pub const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Bytes that sniff as PNG, followed by `payload`.
pub fn png_bytes(payload: &[u8]) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

/// A small JPEG-labelled capture.
pub fn test_image() -> CapturedImage {
    CapturedImage::new(
        b"\xff\xd8\xff\xe0road".to_vec(),
        "image/jpeg",
        "road.jpg",
    )
}

/// A processed PNG image carrying `payload`.
pub fn test_processed(payload: &[u8]) -> ProcessedImage {
    ProcessedImage::new(png_bytes(payload), "image/png")
}

/// Googleplex coordinate used across tests.
pub fn test_coordinate() -> Coordinate {
    Coordinate::new(37.421999, -122.084).expect("valid test coordinate")
}
