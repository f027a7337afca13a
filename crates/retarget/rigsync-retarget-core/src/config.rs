//! Tuning constants for retargeting and smoothing.

use serde::{Deserialize, Serialize};

/// Estimate scale and per-call blend fraction for one joint.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Damping {
    pub dampener: f32,
    pub blend: f32,
}

impl Damping {
    pub const fn new(dampener: f32, blend: f32) -> Self {
        Self { dampener, blend }
    }
}

impl Default for Damping {
    fn default() -> Self {
        Self::new(1.0, 0.3)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyTuning {
    pub neck: Damping,
    pub hips_rotation: Damping,
    pub hips_position: Damping,
    pub chest: Damping,
    pub spine: Damping,
    /// Arms and legs.
    pub limbs: Damping,
}

impl Default for BodyTuning {
    fn default() -> Self {
        Self {
            neck: Damping::new(0.7, 0.3),
            hips_rotation: Damping::new(0.7, 0.3),
            hips_position: Damping::new(1.0, 0.07),
            chest: Damping::new(0.25, 0.3),
            spine: Damping::new(0.45, 0.3),
            limbs: Damping::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandTuning {
    pub finger_blend: f32,
    pub wrist: Damping,
}

impl Default for HandTuning {
    fn default() -> Self {
        Self {
            finger_blend: 0.85,
            wrist: Damping::new(0.7, 0.7),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceTuning {
    pub mouth_smoothing: f32,
    pub eye_smoothing: f32,
    pub eye_bone_blend: f32,
}

impl Default for FaceTuning {
    fn default() -> Self {
        Self {
            mouth_smoothing: 0.6,
            eye_smoothing: 0.5,
            eye_bone_blend: 0.8,
        }
    }
}

/// Top-level retarget configuration. Any section omitted from JSON keeps
/// its defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetConfig {
    pub body: BodyTuning,
    pub hand: HandTuning,
    pub face: FaceTuning,
}

impl RetargetConfig {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
