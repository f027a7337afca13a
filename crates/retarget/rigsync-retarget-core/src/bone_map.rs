//! Semantic bone → rig joint mapping.
//!
//! The solver reports rotations per abstract skeletal region; each rig names
//! and orients its joints differently. A `BoneMapping` records the concrete
//! joint name, the Euler composition order, and which signed solver axis feeds
//! each rig axis. The Mixamo table is the process-wide default; other rigs can
//! supply a table as JSON.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use rigsync_api_core::{EulerOrder, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SemanticBone {
    Hips,
    Neck,
    Chest,
    Spine,
    RightUpperArm,
    RightLowerArm,
    LeftUpperArm,
    LeftLowerArm,
    LeftUpperLeg,
    LeftLowerLeg,
    RightUpperLeg,
    RightLowerLeg,
}

impl SemanticBone {
    pub const ALL: [SemanticBone; 12] = [
        SemanticBone::Hips,
        SemanticBone::Neck,
        SemanticBone::Chest,
        SemanticBone::Spine,
        SemanticBone::RightUpperArm,
        SemanticBone::RightLowerArm,
        SemanticBone::LeftUpperArm,
        SemanticBone::LeftLowerArm,
        SemanticBone::LeftUpperLeg,
        SemanticBone::LeftLowerLeg,
        SemanticBone::RightUpperLeg,
        SemanticBone::RightLowerLeg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SemanticBone::Hips => "Hips",
            SemanticBone::Neck => "Neck",
            SemanticBone::Chest => "Chest",
            SemanticBone::Spine => "Spine",
            SemanticBone::RightUpperArm => "RightUpperArm",
            SemanticBone::RightLowerArm => "RightLowerArm",
            SemanticBone::LeftUpperArm => "LeftUpperArm",
            SemanticBone::LeftLowerArm => "LeftLowerArm",
            SemanticBone::LeftUpperLeg => "LeftUpperLeg",
            SemanticBone::LeftLowerLeg => "LeftLowerLeg",
            SemanticBone::RightUpperLeg => "RightUpperLeg",
            SemanticBone::RightLowerLeg => "RightLowerLeg",
        }
    }

    pub fn is_leg(self) -> bool {
        matches!(
            self,
            SemanticBone::LeftUpperLeg
                | SemanticBone::LeftLowerLeg
                | SemanticBone::RightUpperLeg
                | SemanticBone::RightLowerLeg
        )
    }
}

impl fmt::Display for SemanticBone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticBone {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemanticBone::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == s)
            .ok_or(())
    }
}

/// Signed solver axis feeding one rig axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisSource {
    #[serde(rename = "x")]
    PosX,
    #[serde(rename = "-x")]
    NegX,
    #[serde(rename = "y")]
    PosY,
    #[serde(rename = "-y")]
    NegY,
    #[serde(rename = "z")]
    PosZ,
    #[serde(rename = "-z")]
    NegZ,
}

impl AxisSource {
    #[inline]
    pub fn pick(self, v: Vec3) -> f32 {
        match self {
            AxisSource::PosX => v[0],
            AxisSource::NegX => -v[0],
            AxisSource::PosY => v[1],
            AxisSource::NegY => -v[1],
            AxisSource::PosZ => v[2],
            AxisSource::NegZ => -v[2],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSignMap {
    pub fx: AxisSource,
    pub fy: AxisSource,
    pub fz: AxisSource,
}

impl AxisSignMap {
    pub const fn new(fx: AxisSource, fy: AxisSource, fz: AxisSource) -> Self {
        Self { fx, fy, fz }
    }

    /// Remap a solver-space vector into rig axes.
    #[inline]
    pub fn apply(&self, v: Vec3) -> Vec3 {
        [self.fx.pick(v), self.fy.pick(v), self.fz.pick(v)]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneMapping {
    pub semantic: SemanticBone,
    pub rig_bone: String,
    #[serde(default)]
    pub order: EulerOrder,
    pub axes: AxisSignMap,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub fn as_str(self) -> &'static str {
        match self {
            HandSide::Left => "Left",
            HandSide::Right => "Right",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Finger::Thumb => "Thumb",
            Finger::Index => "Index",
            Finger::Middle => "Middle",
            Finger::Ring => "Ring",
            Finger::Pinky => "Pinky",
        }
    }
}

fn default_rig_prefix() -> String {
    "mixamorig".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneMappingTable {
    /// Prefix used to build hand and finger joint names.
    #[serde(default = "default_rig_prefix")]
    pub rig_prefix: String,
    pub bones: Vec<BoneMapping>,
}

/// Process-wide default table for Mixamo-rigged characters.
pub static MIXAMO: Lazy<BoneMappingTable> = Lazy::new(BoneMappingTable::mixamo);

impl BoneMappingTable {
    pub fn mixamo() -> Self {
        use AxisSource::*;
        use SemanticBone::*;

        let trunk = AxisSignMap::new(NegX, PosY, NegZ);
        let right_arm = AxisSignMap::new(NegZ, PosX, NegY);
        let left_arm = AxisSignMap::new(PosZ, NegX, NegY);

        let rows: [(SemanticBone, &str, EulerOrder, AxisSignMap); 12] = [
            (Hips, "Hips", EulerOrder::XYZ, trunk),
            (Neck, "Neck", EulerOrder::XYZ, trunk),
            (Chest, "Spine2", EulerOrder::XYZ, trunk),
            (Spine, "Spine", EulerOrder::XYZ, trunk),
            (RightUpperArm, "RightArm", EulerOrder::ZXY, right_arm),
            (RightLowerArm, "RightForeArm", EulerOrder::ZXY, right_arm),
            (LeftUpperArm, "LeftArm", EulerOrder::ZXY, left_arm),
            (LeftLowerArm, "LeftForeArm", EulerOrder::ZXY, left_arm),
            (LeftUpperLeg, "LeftUpLeg", EulerOrder::XYZ, trunk),
            (LeftLowerLeg, "LeftLeg", EulerOrder::XYZ, trunk),
            (RightUpperLeg, "RightUpLeg", EulerOrder::XYZ, trunk),
            (RightLowerLeg, "RightLeg", EulerOrder::XYZ, trunk),
        ];

        let prefix = default_rig_prefix();
        Self {
            bones: rows
                .iter()
                .map(|(semantic, joint, order, axes)| BoneMapping {
                    semantic: *semantic,
                    rig_bone: format!("{prefix}{joint}"),
                    order: *order,
                    axes: *axes,
                })
                .collect(),
            rig_prefix: prefix,
        }
    }

    /// Parse a table from JSON. Entries for the same semantic bone after the
    /// first are ignored by `lookup`.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Absent is a normal outcome: callers skip the joint.
    pub fn lookup(&self, semantic: SemanticBone) -> Option<&BoneMapping> {
        self.bones.iter().find(|m| m.semantic == semantic)
    }

    pub fn lookup_name(&self, semantic: &str) -> Option<&BoneMapping> {
        semantic.parse().ok().and_then(|s| self.lookup(s))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoneMapping> {
        self.bones.iter()
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn hand_bone_name(&self, side: HandSide) -> String {
        format!("{}{}Hand", self.rig_prefix, side.as_str())
    }

    /// Finger joint names from base to tip.
    pub fn finger_bone_names(&self, side: HandSide, finger: Finger) -> [String; 3] {
        let stem = format!("{}{}Hand{}", self.rig_prefix, side.as_str(), finger.as_str());
        [format!("{stem}1"), format!("{stem}2"), format!("{stem}3")]
    }
}

impl Default for BoneMappingTable {
    fn default() -> Self {
        MIXAMO.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixamo_has_twelve_distinct_entries() {
        let t = &*MIXAMO;
        assert_eq!(t.len(), 12);
        for s in SemanticBone::ALL {
            assert!(t.lookup(s).is_some(), "{s} missing");
        }
        assert_eq!(t.lookup(SemanticBone::Chest).unwrap().rig_bone, "mixamorigSpine2");
    }

    #[test]
    fn arms_invert_differently_per_side() {
        let v = [1.0, 2.0, 3.0];
        let right = MIXAMO.lookup(SemanticBone::RightUpperArm).unwrap();
        let left = MIXAMO.lookup(SemanticBone::LeftUpperArm).unwrap();
        assert_eq!(right.axes.apply(v), [-3.0, 1.0, -2.0]);
        assert_eq!(left.axes.apply(v), [3.0, -1.0, -2.0]);
        assert_eq!(right.order, EulerOrder::ZXY);
    }

    #[test]
    fn unknown_semantic_name_is_absent() {
        assert!(MIXAMO.lookup_name("Tail").is_none());
        assert!(MIXAMO.lookup_name("Neck").is_some());
    }

    #[test]
    fn table_from_json_uses_signed_axis_names() {
        let json = r#"{
            "bones": [
                { "semantic": "Neck", "rig_bone": "Head_J", "order": "YXZ",
                  "axes": { "fx": "x", "fy": "-y", "fz": "z" } }
            ]
        }"#;
        let t = BoneMappingTable::from_json(json).unwrap();
        assert_eq!(t.rig_prefix, "mixamorig");
        let m = t.lookup(SemanticBone::Neck).unwrap();
        assert_eq!(m.axes.apply([1.0, 1.0, 1.0]), [1.0, -1.0, 1.0]);
        assert!(t.lookup(SemanticBone::Hips).is_none());
    }

    #[test]
    fn hand_joint_names() {
        assert_eq!(MIXAMO.hand_bone_name(HandSide::Left), "mixamorigLeftHand");
        let names = MIXAMO.finger_bone_names(HandSide::Right, Finger::Pinky);
        assert_eq!(names[2], "mixamorigRightHandPinky3");
    }
}
