//! Skeleton arena: bones stored densely and addressed by `BoneId`, with a
//! name → id map built once when the skeleton is loaded.
//!
//! Hosts describe a skeleton with `SkeletonDesc` (ordered bone list, parents by
//! name) and convert it once with `Skeleton::from_desc`. Per-frame code only
//! ever touches bones through ids resolved at load time.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::{Quat, Vec3, QUAT_IDENTITY};
use crate::write_ops::{WriteBatch, WriteOp};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BoneId(pub u32);

impl BoneId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One joint of a loaded skeleton. `rotation`/`position` are local to the parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub parent: Option<BoneId>,
    pub rotation: Quat,
    pub position: Vec3,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SkeletonError {
    #[error("duplicate bone name '{name}'")]
    DuplicateBone { name: String },
    #[error("bone '{bone}' references unknown parent '{parent}' (parents must precede children)")]
    UnknownParent { bone: String, parent: String },
}

fn identity_quat() -> Quat {
    QUAT_IDENTITY
}

/// Serialized bone description (parent referenced by name).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BoneDesc {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "identity_quat")]
    pub rotation: Quat,
    #[serde(default)]
    pub position: Vec3,
}

impl BoneDesc {
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            rotation: QUAT_IDENTITY,
            position: [0.0; 3],
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SkeletonDesc {
    pub bones: Vec<BoneDesc>,
}

#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    by_name: HashMap<String, BoneId>,
}

impl Skeleton {
    /// Build the arena and name index. Bone order is preserved.
    pub fn from_desc(desc: SkeletonDesc) -> Result<Self, SkeletonError> {
        let mut bones = Vec::with_capacity(desc.bones.len());
        let mut by_name: HashMap<String, BoneId> = HashMap::with_capacity(desc.bones.len());

        for bd in desc.bones {
            if by_name.contains_key(&bd.name) {
                return Err(SkeletonError::DuplicateBone { name: bd.name });
            }
            let parent = match bd.parent {
                Some(p) => match by_name.get(&p) {
                    Some(id) => Some(*id),
                    None => {
                        return Err(SkeletonError::UnknownParent {
                            bone: bd.name,
                            parent: p,
                        })
                    }
                },
                None => None,
            };
            let id = BoneId(bones.len() as u32);
            by_name.insert(bd.name.clone(), id);
            bones.push(Bone {
                name: bd.name,
                parent,
                rotation: bd.rotation,
                position: bd.position,
            });
        }

        Ok(Self { bones, by_name })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Look up a bone id by exact name.
    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.by_name.get(name).copied()
    }

    /// First bone (in skeleton order) whose name satisfies `pred`.
    pub fn find_first(&self, mut pred: impl FnMut(&str) -> bool) -> Option<BoneId> {
        self.bones
            .iter()
            .position(|b| pred(&b.name))
            .map(|i| BoneId(i as u32))
    }

    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id.index())
    }

    pub fn bone_mut(&mut self, id: BoneId) -> Option<&mut Bone> {
        self.bones.get_mut(id.index())
    }

    pub fn rotation(&self, id: BoneId) -> Option<Quat> {
        self.bone(id).map(|b| b.rotation)
    }

    pub fn position(&self, id: BoneId) -> Option<Vec3> {
        self.bone(id).map(|b| b.position)
    }

    /// Set a bone's local rotation and record the write.
    pub fn write_rotation(&mut self, id: BoneId, rotation: Quat, out: &mut WriteBatch) -> bool {
        match self.bones.get_mut(id.index()) {
            Some(bone) => {
                bone.rotation = rotation;
                out.push(WriteOp::Rotation {
                    bone: bone.name.clone(),
                    value: rotation,
                });
                true
            }
            None => false,
        }
    }

    /// Set a bone's local position and record the write.
    pub fn write_position(&mut self, id: BoneId, position: Vec3, out: &mut WriteBatch) -> bool {
        match self.bones.get_mut(id.index()) {
            Some(bone) => {
                bone.position = position;
                out.push(WriteOp::Position {
                    bone: bone.name.clone(),
                    value: position,
                });
                true
            }
            None => false,
        }
    }
}
