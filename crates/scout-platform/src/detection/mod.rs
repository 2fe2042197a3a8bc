//! Remote detection service

mod client;

pub use client::{DetectionClient, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DETECT_PATH};

use scout_core::{CapturedImage, Coordinate, DetectionError, ProcessedImage};

/// Uploads a photo with its coordinate and returns the annotated image.
///
/// Exactly one request per call; implementations never retry.
#[trait_variant::make(DetectionService: Send)]
pub trait LocalDetectionService {
    async fn submit(
        &self,
        image: CapturedImage,
        coordinate: Coordinate,
    ) -> Result<ProcessedImage, DetectionError>;
}
