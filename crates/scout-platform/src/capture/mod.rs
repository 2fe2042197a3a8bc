//! Photo capture
//!
//! A capture either yields an image, or `None` when the user backs out of
//! the camera. Cancellation is not an error.

mod file;

pub use file::{parse_prompt_line, FileCaptureProvider, PromptCaptureProvider};

use scout_core::{CapturedImage, Result};

/// Platform camera access.
#[trait_variant::make(CaptureProvider: Send)]
pub trait LocalCaptureProvider {
    /// Show the camera UI and wait for the user.
    ///
    /// `Ok(None)` means the user cancelled. `Err` means the camera could not
    /// be used at all.
    async fn capture_image(&self) -> Result<Option<CapturedImage>>;
}
