//! Clip data model: keyframed joint rotation/position tracks.
//!
//! Times are in seconds from clip start. Rotation keys hold unit quaternions,
//! position keys hold rig-space vectors.

use rigsync_api_core::{Value, ValueKind};
use serde::{Deserialize, Serialize};

use crate::error::ClipLoadError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackProperty {
    Rotation,
    Position,
}

impl TrackProperty {
    pub fn value_kind(self) -> ValueKind {
        match self {
            TrackProperty::Rotation => ValueKind::Quat,
            TrackProperty::Position => ValueKind::Vec3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Rig joint name this track drives.
    pub bone: String,
    pub property: TrackProperty,
    pub keyframes: Vec<Keyframe>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds.
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Keys present and ordered, values match their property, duration finite.
    pub fn validate(&self) -> Result<(), ClipLoadError> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ClipLoadError::invalid(
                &self.name,
                format!("duration {} must be finite and non-negative", self.duration),
            ));
        }
        for track in &self.tracks {
            if track.keyframes.is_empty() {
                return Err(ClipLoadError::invalid(
                    &self.name,
                    format!("track for '{}' has no keyframes", track.bone),
                ));
            }
            let mut prev = f32::NEG_INFINITY;
            for key in &track.keyframes {
                if !key.time.is_finite() || key.time < 0.0 || key.time < prev {
                    return Err(ClipLoadError::invalid(
                        &self.name,
                        format!("track '{}' has out-of-order time {}", track.bone, key.time),
                    ));
                }
                prev = key.time;
                if key.value.kind() != track.property.value_kind() {
                    return Err(ClipLoadError::invalid(
                        &self.name,
                        format!("track '{}' value kind {:?} does not match {:?}", track.bone, key.value.kind(), track.property),
                    ));
                }
            }
        }
        Ok(())
    }
}
