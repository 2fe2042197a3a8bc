//! # scout-core - Core Domain Types
//!
//! Foundation crate for Pothole Scout. Provides the data carried through a
//! detection session, the typed failures each collaborator reports, error
//! handling, and logging setup.
//!
//! This crate has **zero internal dependencies**.
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Coordinate`] - Validated latitude/longitude pair
//! - [`CapturedImage`] - Photo bytes with content type and file name
//! - [`ProcessedImage`] - Annotated image returned by the detection service
//!
//! ### Failures (`failure`)
//! - [`LocationFailure`], [`DetectionError`], [`LaunchFailure`] - Per-collaborator failures
//! - [`FailureKind`] - What the `Failed` session state carries
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Infrastructure errors with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context

pub mod error;
pub mod failure;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all Pothole Scout crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

pub use error::{Error, Result, ResultExt};
pub use failure::{DetectionError, FailureKind, LaunchFailure, LocationFailure};
pub use types::{
    content_type_for_path, CapturedImage, Coordinate, InvalidCoordinate, ProcessedImage,
    MARKER_LABEL,
};
