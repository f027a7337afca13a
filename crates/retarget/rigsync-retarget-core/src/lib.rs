//! rigsync-retarget-core (engine-agnostic)
//!
//! Converts per-frame pose, face and hand estimates into joint transforms and
//! blendshape weights on an externally supplied humanoid rig.
//!
//! Per loaded model, build a [`RetargetContext`] once; then call
//! [`apply_frame`] for each solver result. The context is replaced wholesale
//! when the model changes.

pub mod blendshape;
pub mod bone_map;
pub mod config;
pub mod context;
pub mod error;
pub mod estimate;
pub mod frame;
pub mod hand;
pub mod model;
pub mod morph;
pub mod pose_cache;
pub mod retarget;

pub use blendshape::{BlendShapeSmoother, EyeBones, FaceOutput, SmoothingState};
pub use bone_map::{
    AxisSignMap, AxisSource, BoneMapping, BoneMappingTable, Finger, HandSide, SemanticBone, MIXAMO,
};
pub use config::{BodyTuning, Damping, FaceTuning, HandTuning, RetargetConfig};
pub use context::{ContextSummary, HandRig, RetargetContext};
pub use error::RetargetError;
pub use estimate::{
    EyeEstimate, FaceEstimate, FrameEstimate, HandEstimate, HandInput, HandLandmarks, Landmark,
    MouthEstimate, PoseEstimate, Vector3, VowelShapes,
};
pub use frame::{apply_frame, FrameReport, TrackingTarget};
pub use hand::{HandBones, HandCurl, HandCurlEstimator};
pub use model::{MorphMesh, MorphMeshDesc, RigModel, RigModelDesc};
pub use morph::{MorphChannel, MorphSignal, MorphTargetIndex};
pub use pose_cache::InitialPoseCache;
pub use retarget::RetargetEngine;
