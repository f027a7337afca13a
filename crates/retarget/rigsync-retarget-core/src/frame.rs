//! Per-frame driver: applies one `FrameEstimate` to the rig according to the
//! selected tracking target.
//!
//! Every per-joint, per-hand and per-channel failure is collected in the
//! report and the rest of the frame continues.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use log::{debug, trace};
use rigsync_api_core::WriteBatch;
use serde::{Deserialize, Serialize};

use crate::bone_map::{BoneMappingTable, HandSide, SemanticBone};
use crate::config::{Damping, RetargetConfig};
use crate::context::RetargetContext;
use crate::error::RetargetError;
use crate::estimate::{FrameEstimate, PoseEstimate, Vector3};
use crate::hand::apply_hand;
use crate::model::RigModel;
use crate::retarget::RetargetEngine;

/// Retarget breadth.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingTarget {
    /// Head and face only.
    #[default]
    Face,
    /// Upper body and hands.
    Half,
    /// Upper body, legs and hands.
    Full,
}

impl TrackingTarget {
    /// Offset added to the hips position estimate (after negating its z).
    pub fn position_offset(self) -> Vector3 {
        match self {
            TrackingTarget::Face => Vector3::new(0.0, 1.0, 0.0),
            TrackingTarget::Half => Vector3::new(0.0, 1.1, 1.0),
            TrackingTarget::Full => Vector3::new(0.0, 1.4, 2.0),
        }
    }

    pub fn drives_body(self) -> bool {
        !matches!(self, TrackingTarget::Face)
    }

    pub fn drives_legs(self) -> bool {
        matches!(self, TrackingTarget::Full)
    }

    pub fn drives_hands(self) -> bool {
        self.drives_body()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrackingTarget::Face => "face",
            TrackingTarget::Half => "half",
            TrackingTarget::Full => "full",
        }
    }
}

impl fmt::Display for TrackingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackingTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "face" => Ok(TrackingTarget::Face),
            "half" => Ok(TrackingTarget::Half),
            "full" => Ok(TrackingTarget::Full),
            other => Err(format!("unknown tracking target '{other}'")),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub writes: WriteBatch,
    /// Morph channel name → weight written this frame.
    pub weights: IndexMap<String, f32>,
    pub skipped: Vec<RetargetError>,
}

impl FrameReport {
    fn record(&mut self, result: Result<(), RetargetError>) {
        if let Err(err) = result {
            match &err {
                RetargetError::MappingAbsent { .. } => trace!("skip: {err}"),
                _ => debug!("skip: {err}"),
            }
            self.skipped.push(err);
        }
    }
}

/// Retarget one frame onto `model`.
pub fn apply_frame(
    model: &mut RigModel,
    ctx: &mut RetargetContext,
    table: &BoneMappingTable,
    config: &RetargetConfig,
    target: TrackingTarget,
    frame: &FrameEstimate,
) -> FrameReport {
    let mut report = FrameReport::default();
    let engine = RetargetEngine::new(table, &ctx.pose_cache);

    if let Some(face) = &frame.face {
        let res = engine.apply_rotation(
            &mut model.skeleton,
            SemanticBone::Neck,
            face.head,
            config.body.neck,
            &mut report.writes,
        );
        report.record(res);
        let out = ctx.smoother.apply(
            face,
            model,
            &ctx.morph_index,
            &ctx.eye_bones,
            &config.face,
            &mut report.writes,
        );
        report.weights.extend(out.weights);
    }

    if target.drives_body() {
        if let Some(pose) = &frame.pose {
            apply_pose(&engine, model, config, target, pose, &mut report);
        }
    }

    if target.drives_hands() {
        for side in [HandSide::Left, HandSide::Right] {
            let Some(input) = frame.hand(side) else { continue };
            let res = apply_hand(
                &mut model.skeleton,
                ctx.hands.side(side),
                input,
                &config.hand,
                side,
                &mut report.writes,
            );
            report.record(res.map(|_| ()));
        }
    }

    report
}

fn apply_pose(
    engine: &RetargetEngine<'_>,
    model: &mut RigModel,
    config: &RetargetConfig,
    target: TrackingTarget,
    pose: &PoseEstimate,
    report: &mut FrameReport,
) {
    let body = &config.body;
    let sk = &mut model.skeleton;

    let res = engine.apply_rotation(sk, SemanticBone::Hips, pose.hips_rotation, body.hips_rotation, &mut report.writes);
    report.record(res);

    let off = target.position_offset();
    let hips = Vector3::new(
        pose.hips_position.x + off.x,
        pose.hips_position.y + off.y,
        -pose.hips_position.z + off.z,
    );
    let res = engine.apply_position(sk, SemanticBone::Hips, hips, body.hips_position, &mut report.writes);
    report.record(res);

    let upper: [(SemanticBone, Vector3, Damping); 6] = [
        (SemanticBone::Chest, pose.chest, body.chest),
        (SemanticBone::Spine, pose.spine, body.spine),
        (SemanticBone::RightUpperArm, pose.right_upper_arm, body.limbs),
        (SemanticBone::RightLowerArm, pose.right_lower_arm, body.limbs),
        (SemanticBone::LeftUpperArm, pose.left_upper_arm, body.limbs),
        (SemanticBone::LeftLowerArm, pose.left_lower_arm, body.limbs),
    ];
    for (semantic, estimate, damping) in upper {
        let res = engine.apply_rotation(sk, semantic, estimate, damping, &mut report.writes);
        report.record(res);
    }

    if !target.drives_legs() {
        return;
    }
    let legs = [
        (SemanticBone::LeftUpperLeg, pose.left_upper_leg),
        (SemanticBone::LeftLowerLeg, pose.left_lower_leg),
        (SemanticBone::RightUpperLeg, pose.right_upper_leg),
        (SemanticBone::RightLowerLeg, pose.right_lower_leg),
    ];
    for (semantic, estimate) in legs {
        let Some(estimate) = estimate else {
            trace!("{semantic}: no estimate this frame");
            continue;
        };
        let res = engine.apply_rotation(sk, semantic, estimate, body.limbs, &mut report.writes);
        report.record(res);
    }
}
