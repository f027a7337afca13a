//! Precondition failures of mode transitions. Each aborts its operation before
//! any state changes.

use rigsync_animation_core::ClipLoadError;
use serde::{Deserialize, Serialize};

/// Why a capture device could not be opened. The display strings are the
/// user-facing status texts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureDeviceError {
    #[error("Camera access denied. Please allow camera access and try again.")]
    Denied,
    #[error("No camera found. Please connect a camera and try again.")]
    NotFound,
    #[error("Error starting camera: {0}")]
    Other(String),
}

impl CaptureDeviceError {
    /// Classify a platform error by its name, e.g. `NotAllowedError`.
    /// Unknown names keep `message` (or the name when empty) as detail.
    pub fn from_platform(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" => Self::Denied,
            "NotFoundError" | "DevicesNotFoundError" => Self::NotFound,
            _ if message.is_empty() => Self::Other(name.to_string()),
            _ => Self::Other(message.to_string()),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ModeError {
    #[error("Please load a model first!")]
    NoModelLoaded,

    #[error("No animation named '{name}'")]
    ClipNotFound { name: String },

    #[error("Error loading model: {reason}")]
    InvalidModel { reason: String },

    #[error("Error loading animation: {0}")]
    Clip(#[from] ClipLoadError),

    #[error(transparent)]
    Capture(#[from] CaptureDeviceError),
}

impl ModeError {
    /// Every mode error leaves the controller usable; retrying is the caller's call.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        true
    }

    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::NoModelLoaded | Self::InvalidModel { .. } => "model",
            Self::ClipNotFound { .. } | Self::Clip(_) => "animation",
            Self::Capture(_) => "capture",
        }
    }
}
