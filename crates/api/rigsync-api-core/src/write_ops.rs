//! Write operations produced by the retarget and playback engines to describe
//! what they changed on the rig during one turn.
//!
//! WriteOp serializes to JSON as:
//!   { "kind": "rotation", "bone": "mixamorigNeck", "value": [0, 0, 0, 1] }
//!
//! WriteBatch is a simple Vec<WriteOp> with helpers.

use serde::{Deserialize, Serialize};

use crate::value::{Quat, Vec3};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteOp {
    /// Joint local orientation.
    Rotation { bone: String, value: Quat },
    /// Joint local position.
    Position { bone: String, value: Vec3 },
    /// Mesh deformation channel weight.
    MorphWeight {
        mesh: String,
        channel: String,
        weight: f32,
    },
}

impl WriteOp {
    /// Bone name for joint writes.
    pub fn bone(&self) -> Option<&str> {
        match self {
            WriteOp::Rotation { bone, .. } | WriteOp::Position { bone, .. } => Some(bone),
            WriteOp::MorphWeight { .. } => None,
        }
    }
}

/// A batch of write operations. Engines emit one WriteBatch per turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch(pub Vec<WriteOp>);

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch(Vec::new())
    }

    pub fn push(&mut self, op: WriteOp) {
        self.0.push(op);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = WriteOp>) {
        self.0.extend(other);
    }

    pub fn into_vec(self) -> Vec<WriteOp> {
        self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WriteOp> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Merge another batch in-place (append).
    pub fn append(&mut self, mut other: WriteBatch) {
        self.0.append(&mut other.0);
    }

    /// True if any joint write in the batch targets `bone`.
    pub fn touches_bone(&self, bone: &str) -> bool {
        self.0.iter().any(|op| op.bone() == Some(bone))
    }
}

impl<'a> IntoIterator for &'a WriteBatch {
    type Item = &'a WriteOp;
    type IntoIter = std::slice::Iter<'a, WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
