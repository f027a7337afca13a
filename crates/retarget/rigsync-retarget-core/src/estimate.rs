//! Per-frame estimates delivered by the landmark solver.
//!
//! All types are transient: the frame driver consumes one `FrameEstimate` per
//! solver callback and never retains it. Field names serialize in camelCase to
//! match the solver's JSON output.

use rigsync_api_core::Vec3;
use serde::{Deserialize, Serialize};

use crate::bone_map::{Finger, HandSide};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn to_array(self) -> Vec3 {
        [self.x, self.y, self.z]
    }

    #[inline]
    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vector3> for Vec3 {
    fn from(v: Vector3) -> Self {
        v.to_array()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseEstimate {
    pub hips_rotation: Vector3,
    pub hips_position: Vector3,
    pub chest: Vector3,
    pub spine: Vector3,
    pub right_upper_arm: Vector3,
    pub right_lower_arm: Vector3,
    pub left_upper_arm: Vector3,
    pub left_lower_arm: Vector3,
    #[serde(default)]
    pub left_upper_leg: Option<Vector3>,
    #[serde(default)]
    pub left_lower_leg: Option<Vector3>,
    #[serde(default)]
    pub right_upper_leg: Option<Vector3>,
    #[serde(default)]
    pub right_lower_leg: Option<Vector3>,
}

/// Raw eye openness per side, solver convention (0 = open, 1 = closed).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EyeEstimate {
    #[serde(default)]
    pub l: Option<f32>,
    #[serde(default)]
    pub r: Option<f32>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VowelShapes {
    #[serde(default, rename = "I")]
    pub i: f32,
    #[serde(default, rename = "A")]
    pub a: f32,
    #[serde(default, rename = "E")]
    pub e: f32,
    #[serde(default, rename = "O")]
    pub o: f32,
    #[serde(default, rename = "U")]
    pub u: f32,
}

impl VowelShapes {
    pub fn max(&self) -> f32 {
        [self.i, self.a, self.e, self.o, self.u]
            .into_iter()
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouthEstimate {
    /// Vertical opening; sign depends on the solver, magnitude is used.
    #[serde(default, rename = "y")]
    pub vertical_open: Option<f32>,
    #[serde(default, rename = "mouthOpen")]
    pub open_score: Option<f32>,
    #[serde(default)]
    pub shape: Option<VowelShapes>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceEstimate {
    pub head: Vector3,
    #[serde(default)]
    pub eye: Option<EyeEstimate>,
    #[serde(default)]
    pub mouth: Option<MouthEstimate>,
}

/// Solved hand rotations (wrist plus one rotation per finger).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandEstimate {
    #[serde(default)]
    pub wrist: Option<Vector3>,
    #[serde(default)]
    pub thumb: Option<Vector3>,
    #[serde(default)]
    pub index: Option<Vector3>,
    #[serde(default)]
    pub middle: Option<Vector3>,
    #[serde(default)]
    pub ring: Option<Vector3>,
    #[serde(default)]
    pub pinky: Option<Vector3>,
}

impl HandEstimate {
    pub fn finger(&self, finger: Finger) -> Option<Vector3> {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }
}

/// Normalized landmark coordinate. Missing depth reads as 0.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Number of landmarks in a complete hand.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Raw hand landmarks; `None` marks a point the solver did not report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks(pub Vec<Option<Landmark>>);

impl HandLandmarks {
    pub fn from_points(points: impl IntoIterator<Item = Landmark>) -> Self {
        Self(points.into_iter().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Landmark> {
        self.0.get(idx).and_then(Option::as_ref)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandInput {
    pub solved: HandEstimate,
    pub landmarks: HandLandmarks,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameEstimate {
    #[serde(default)]
    pub face: Option<FaceEstimate>,
    #[serde(default)]
    pub pose: Option<PoseEstimate>,
    #[serde(default)]
    pub left_hand: Option<HandInput>,
    #[serde(default)]
    pub right_hand: Option<HandInput>,
}

impl FrameEstimate {
    pub fn hand(&self, side: HandSide) -> Option<&HandInput> {
        match side {
            HandSide::Left => self.left_hand.as_ref(),
            HandSide::Right => self.right_hand.as_ref(),
        }
    }
}
