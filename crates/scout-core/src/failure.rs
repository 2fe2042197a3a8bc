//! Failures recovered at the session boundary
//!
//! Each collaborator reports its own typed failure; the session controller
//! folds them into a [`FailureKind`], which is what the presentation layer
//! renders.

use serde::Serialize;
use thiserror::Error;

/// Why a coordinate could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationFailure {
    #[error("location services are disabled")]
    ServiceDisabled,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("location permission permanently denied")]
    PermissionPermanentlyDenied,

    #[error("position unavailable")]
    PositionUnavailable,
}

/// Why an upload to the detection service did not yield an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    /// Connection refused, DNS failure, timeout, or a broken body stream.
    #[error("network error: {message}")]
    Network { message: String },

    #[error("detection service returned HTTP {status}")]
    Server { status: u16 },

    /// 2xx status but the body is not image bytes.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
}

impl DetectionError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }
}

/// Why the map could not be shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchFailure {
    /// Precondition violation: no detection is ready, so there is nothing to
    /// centre the map on.
    #[error("no resolved coordinate to show on the map")]
    NoCoordinate,

    #[error("failed to open map: {reason}")]
    Launch { reason: String },
}

impl LaunchFailure {
    pub fn launch(reason: impl Into<String>) -> Self {
        Self::Launch {
            reason: reason.into(),
        }
    }
}

/// Client-observable failure kinds carried by the `Failed` session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    ServiceDisabled,
    PermissionDenied,
    PermissionPermanentlyDenied,
    PositionUnavailable,
    NetworkError,
    ServerError { code: u16 },
    MalformedResponse,
    LaunchFailure,
}

impl FailureKind {
    /// Human-readable message for the presentation layer.
    pub fn user_message(&self) -> String {
        match self {
            Self::ServiceDisabled => {
                "Location services are disabled. Turn them on and try again.".to_string()
            }
            Self::PermissionDenied => {
                "Location permission was denied. Allow location access to tag the photo."
                    .to_string()
            }
            Self::PermissionPermanentlyDenied => {
                "Location permission is permanently denied. Enable it in system settings."
                    .to_string()
            }
            Self::PositionUnavailable => {
                "Could not determine your position. Move to an open area and retry.".to_string()
            }
            Self::NetworkError => {
                "Could not reach the detection service. Check your connection.".to_string()
            }
            Self::ServerError { code } => {
                format!("The detection service failed with status {code}.")
            }
            Self::MalformedResponse => {
                "The detection service returned something that is not an image.".to_string()
            }
            Self::LaunchFailure => "Could not open the map.".to_string(),
        }
    }

    /// Short label for logs and headless output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ServiceDisabled => "service_disabled",
            Self::PermissionDenied => "permission_denied",
            Self::PermissionPermanentlyDenied => "permission_permanently_denied",
            Self::PositionUnavailable => "position_unavailable",
            Self::NetworkError => "network_error",
            Self::ServerError { .. } => "server_error",
            Self::MalformedResponse => "malformed_response",
            Self::LaunchFailure => "launch_failure",
        }
    }
}

impl From<LocationFailure> for FailureKind {
    fn from(failure: LocationFailure) -> Self {
        match failure {
            LocationFailure::ServiceDisabled => Self::ServiceDisabled,
            LocationFailure::PermissionDenied => Self::PermissionDenied,
            LocationFailure::PermissionPermanentlyDenied => Self::PermissionPermanentlyDenied,
            LocationFailure::PositionUnavailable => Self::PositionUnavailable,
        }
    }
}

impl From<&DetectionError> for FailureKind {
    fn from(err: &DetectionError) -> Self {
        match err {
            DetectionError::Network { .. } => Self::NetworkError,
            DetectionError::Server { status } => Self::ServerError { code: *status },
            DetectionError::MalformedResponse { .. } => Self::MalformedResponse,
        }
    }
}

impl From<DetectionError> for FailureKind {
    fn from(err: DetectionError) -> Self {
        Self::from(&err)
    }
}

impl From<&LaunchFailure> for FailureKind {
    fn from(_: &LaunchFailure) -> Self {
        Self::LaunchFailure
    }
}
