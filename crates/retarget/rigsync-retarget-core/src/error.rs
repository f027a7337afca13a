//! Error types for the retarget path.
//!
//! Every variant here is contained locally by the frame driver: a failed joint
//! or channel is skipped and the rest of the frame continues.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RetargetError {
    /// Semantic bone has no entry in the mapping table.
    #[error("No mapping for semantic bone: {semantic}")]
    MappingAbsent { semantic: String },

    /// The loaded rig lacks the mapped joint (or no baseline was captured for it).
    #[error("Rig bone not found: {bone} (for {semantic})")]
    BoneNotFound { semantic: String, bone: String },

    /// The estimate lacks the inputs for a sub-computation.
    #[error("Malformed estimate for {part}: {reason}")]
    MalformedEstimate { part: String, reason: String },
}

impl RetargetError {
    pub fn malformed(part: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedEstimate {
            part: part.into(),
            reason: reason.into(),
        }
    }

    /// All retarget errors skip one sub-computation and leave the frame running.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MappingAbsent { .. } | Self::BoneNotFound { .. } | Self::MalformedEstimate { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MappingAbsent { .. } => "mapping",
            Self::BoneNotFound { .. } => "rig",
            Self::MalformedEstimate { .. } => "estimate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_and_recoverability() {
        let absent = RetargetError::MappingAbsent {
            semantic: "Tail".into(),
        };
        assert_eq!(absent.category(), "mapping");
        assert!(absent.is_recoverable());

        let bad = RetargetError::malformed("LeftHand", "17 landmarks");
        assert_eq!(bad.category(), "estimate");
        assert_eq!(bad.to_string(), "Malformed estimate for LeftHand: 17 landmarks");
    }
}
