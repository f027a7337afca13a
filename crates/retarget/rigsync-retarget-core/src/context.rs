//! Per-model retarget state, rebuilt wholesale whenever a model is loaded.

use log::info;
use serde::{Deserialize, Serialize};

use crate::blendshape::{BlendShapeSmoother, EyeBones};
use crate::bone_map::{BoneMappingTable, HandSide};
use crate::hand::HandBones;
use crate::model::RigModel;
use crate::morph::MorphTargetIndex;
use crate::pose_cache::InitialPoseCache;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandRig {
    pub left: HandBones,
    pub right: HandBones,
}

impl HandRig {
    pub fn side(&self, side: HandSide) -> &HandBones {
        match side {
            HandSide::Left => &self.left,
            HandSide::Right => &self.right,
        }
    }
}

/// Summary of what a context discovered on its model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub bones: usize,
    pub cached_joints: usize,
    pub morph_channels: Vec<String>,
    pub left_hand: bool,
    pub right_hand: bool,
    pub eye_bones: bool,
}

#[derive(Clone, Debug, Default)]
pub struct RetargetContext {
    pub pose_cache: InitialPoseCache,
    pub morph_index: MorphTargetIndex,
    pub smoother: BlendShapeSmoother,
    pub hands: HandRig,
    pub eye_bones: EyeBones,
}

impl RetargetContext {
    /// Capture baselines, discover morph channels and resolve hand/eye joints
    /// for `model`. Smoothing starts from zero.
    pub fn build(model: &RigModel, table: &BoneMappingTable) -> Self {
        let ctx = Self {
            pose_cache: InitialPoseCache::capture(&model.skeleton, table),
            morph_index: MorphTargetIndex::build(&model.meshes),
            smoother: BlendShapeSmoother::new(),
            hands: HandRig {
                left: HandBones::resolve(&model.skeleton, table, HandSide::Left),
                right: HandBones::resolve(&model.skeleton, table, HandSide::Right),
            },
            eye_bones: EyeBones::resolve(&model.skeleton),
        };
        info!(
            "retarget context: {} bones, {}/{} mapped joints, {} morph channels",
            model.skeleton.len(),
            ctx.pose_cache.len(),
            table.len(),
            ctx.morph_index.len()
        );
        ctx
    }

    pub fn summary(&self, model: &RigModel) -> ContextSummary {
        ContextSummary {
            bones: model.skeleton.len(),
            cached_joints: self.pose_cache.len(),
            morph_channels: self
                .morph_index
                .channels()
                .iter()
                .map(|c| c.name.clone())
                .collect(),
            left_hand: !self.hands.left.is_empty(),
            right_hand: !self.hands.right.is_empty(),
            eye_bones: self.eye_bones.left.is_some() || self.eye_bones.right.is_some(),
        }
    }
}
