//! Rest-pose baselines captured once per loaded skeleton.
//!
//! Retargeted rotations are offsets from these baselines. The baseline is
//! decomposed in the mapping's own rotation order so that composing it back
//! with a zero offset reproduces the rest orientation exactly.

use indexmap::IndexMap;
use log::warn;
use rigsync_api_core::{BoneId, Euler, Skeleton};

use crate::bone_map::{BoneMappingTable, SemanticBone};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CachedBone {
    pub bone: BoneId,
    pub baseline: Euler,
}

#[derive(Clone, Debug, Default)]
pub struct InitialPoseCache {
    entries: IndexMap<SemanticBone, CachedBone>,
}

impl InitialPoseCache {
    /// Record the current local rotation of every mapped joint present in
    /// `skeleton`. Joints the rig lacks are logged and omitted.
    pub fn capture(skeleton: &Skeleton, table: &BoneMappingTable) -> Self {
        let mut entries = IndexMap::with_capacity(table.len());
        for mapping in table.iter() {
            if entries.contains_key(&mapping.semantic) {
                continue;
            }
            let Some(id) = skeleton.find(&mapping.rig_bone) else {
                warn!(
                    "rig bone '{}' for {} not found; joint will not be retargeted",
                    mapping.rig_bone, mapping.semantic
                );
                continue;
            };
            let Some(rotation) = skeleton.rotation(id) else {
                continue;
            };
            entries.insert(
                mapping.semantic,
                CachedBone {
                    bone: id,
                    baseline: Euler::from_quat(rotation, mapping.order),
                },
            );
        }
        Self { entries }
    }

    pub fn get(&self, semantic: SemanticBone) -> Option<&CachedBone> {
        self.entries.get(&semantic)
    }

    pub fn contains(&self, semantic: SemanticBone) -> bool {
        self.entries.contains_key(&semantic)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn semantics(&self) -> impl Iterator<Item = SemanticBone> + '_ {
        self.entries.keys().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
