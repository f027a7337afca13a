//! Clip loading errors. Reported per clip; a failing clip never aborts the
//! rest of its batch.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ClipLoadError {
    /// The clip (or its containing file) is not valid JSON for the clip schema.
    #[error("Failed to parse clip: {reason}")]
    Parse { reason: String },

    /// Structurally valid but semantically wrong data.
    #[error("Invalid clip '{clip}': {reason}")]
    Invalid { clip: String, reason: String },

    /// Clip has no tracks and cannot drive a rig.
    #[error("Clip '{clip}' has no tracks")]
    NoTracks { clip: String },
}

impl ClipLoadError {
    pub fn invalid(clip: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            clip: clip.into(),
            reason: reason.into(),
        }
    }

    /// Empty clips are dropped quietly; other failures need the source fixed.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoTracks { .. })
    }

    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "serialization",
            Self::Invalid { .. } => "validation",
            Self::NoTracks { .. } => "data",
        }
    }
}

impl From<serde_json::Error> for ClipLoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
