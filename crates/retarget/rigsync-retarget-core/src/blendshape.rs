//! Exponential smoothing of eye-blink and mouth-open signals, written to the
//! discovered morph channels (or eye joints when the rig has no blink channels).

use indexmap::IndexMap;
use log::trace;
use rigsync_api_core::blend::slerp;
use rigsync_api_core::{BoneId, Euler, EulerOrder, Skeleton, WriteBatch};
use serde::{Deserialize, Serialize};

use crate::config::FaceTuning;
use crate::estimate::{FaceEstimate, MouthEstimate};
use crate::hand::clamp01;
use crate::model::RigModel;
use crate::morph::{MorphSignal, MorphTargetIndex};

pub const MOUTH_VERTICAL_GAIN: f32 = 4.5;
pub const MOUTH_OPEN_GAIN: f32 = 2.0;
pub const MOUTH_SHAPE_GAIN: f32 = 2.5;

pub const EYE_GAIN: f32 = 4.0;
pub const EYE_BLINK_THRESHOLD: f32 = 0.2;
pub const EYE_BLINK_SLOPE: f32 = 3.5;
pub const EYE_BLINK_CAP: f32 = 1.3;
pub const EYE_CURVE: f32 = 3.0;
/// Eye-joint pitch (radians) per unit of blink.
pub const EYE_BONE_PITCH: f32 = 0.5;

/// Previous smoothed values, all in [0,1]. Reset to zero on model change.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothingState {
    pub left_blink: f32,
    pub right_blink: f32,
    pub mouth_open: f32,
}

impl SmoothingState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// `previous + (target − previous) × factor`.
#[inline]
pub fn smooth(previous: f32, target: f32, factor: f32) -> f32 {
    previous + (target - previous) * factor
}

/// Max of the three mouth signals, each amplified then clamped to [0,1].
pub fn mouth_target(mouth: &MouthEstimate) -> f32 {
    let vertical = mouth
        .vertical_open
        .map_or(0.0, |y| clamp01(y.abs() * MOUTH_VERTICAL_GAIN));
    let open = mouth
        .open_score
        .map_or(0.0, |o| clamp01(o * MOUTH_OPEN_GAIN));
    let shape = mouth
        .shape
        .map_or(0.0, |s| clamp01(s.max() * MOUTH_SHAPE_GAIN));
    vertical.max(open).max(shape)
}

/// Raw openness (0 = open) → rig blink weight. Polarity is inverted: an open
/// eye drives the weight toward 1.
pub fn eye_target(raw: f32) -> f32 {
    let amplified = if raw > EYE_BLINK_THRESHOLD {
        (1.0 + raw * EYE_BLINK_SLOPE).min(EYE_BLINK_CAP)
    } else {
        raw * EYE_GAIN
    };
    let curved = 1.0 - (-amplified * EYE_CURVE).exp();
    clamp01(1.0 - curved)
}

/// Eye joints used when the rig has no blink channels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EyeBones {
    pub left: Option<BoneId>,
    pub right: Option<BoneId>,
}

impl EyeBones {
    pub fn resolve(skeleton: &Skeleton) -> Self {
        Self {
            left: skeleton.find_first(|n| {
                n.contains("LeftEye") || n.contains("leftEye") || n.contains("Eye_L")
            }),
            right: skeleton.find_first(|n| {
                n.contains("RightEye") || n.contains("rightEye") || n.contains("Eye_R")
            }),
        }
    }
}

/// What a face update produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceOutput {
    /// Channel name → weight written this call.
    pub weights: IndexMap<String, f32>,
    pub eye_bones_driven: bool,
}

#[derive(Clone, Debug, Default)]
pub struct BlendShapeSmoother {
    pub state: SmoothingState,
}

impl BlendShapeSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Advance mouth smoothing; `None` when the face carries no mouth estimate.
    pub fn update_mouth(&mut self, face: &FaceEstimate, tuning: &FaceTuning) -> Option<f32> {
        let mouth = face.mouth.as_ref()?;
        self.state.mouth_open = smooth(self.state.mouth_open, mouth_target(mouth), tuning.mouth_smoothing);
        Some(self.state.mouth_open)
    }

    /// Advance eye smoothing; `None` when the face carries no eye estimate.
    /// A side without a raw value holds its previous smoothed value.
    pub fn update_eyes(&mut self, face: &FaceEstimate, tuning: &FaceTuning) -> Option<(f32, f32)> {
        let eye = face.eye.as_ref()?;
        match eye.l {
            Some(raw) => {
                self.state.left_blink = smooth(self.state.left_blink, eye_target(raw), tuning.eye_smoothing)
            }
            None => trace!("left eye missing; holding {}", self.state.left_blink),
        }
        match eye.r {
            Some(raw) => {
                self.state.right_blink = smooth(self.state.right_blink, eye_target(raw), tuning.eye_smoothing)
            }
            None => trace!("right eye missing; holding {}", self.state.right_blink),
        }
        Some((self.state.left_blink, self.state.right_blink))
    }

    /// Smooth the face signals and write them to the model.
    pub fn apply(
        &mut self,
        face: &FaceEstimate,
        model: &mut RigModel,
        index: &MorphTargetIndex,
        eye_bones: &EyeBones,
        tuning: &FaceTuning,
        out: &mut WriteBatch,
    ) -> FaceOutput {
        let mut result = FaceOutput::default();

        if let Some(mouth) = self.update_mouth(face, tuning) {
            for ch in index.mouth_channels() {
                if model.set_morph_weight(ch.mesh, ch.slot, mouth, out) {
                    result.weights.insert(ch.name.clone(), mouth);
                }
            }
        }

        let Some((left, right)) = self.update_eyes(face, tuning) else {
            return result;
        };

        if index.has_eye_channels() {
            for ch in index.eye_channels() {
                let w = match ch.signal {
                    MorphSignal::LeftBlink => left,
                    MorphSignal::RightBlink => right,
                    _ => (left + right) / 2.0,
                };
                if model.set_morph_weight(ch.mesh, ch.slot, w, out) {
                    result.weights.insert(ch.name.clone(), w);
                }
            }
        } else {
            for (bone, blink) in [(eye_bones.left, left), (eye_bones.right, right)] {
                let Some(id) = bone else { continue };
                let Some(current) = model.skeleton.rotation(id) else { continue };
                let target = Euler::new(blink * EYE_BONE_PITCH, 0.0, 0.0, EulerOrder::XYZ).to_quat();
                model
                    .skeleton
                    .write_rotation(id, slerp(current, target, tuning.eye_bone_blend), out);
                result.eye_bones_driven = true;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::{EyeEstimate, VowelShapes};

    fn eyes(l: Option<f32>, r: Option<f32>) -> FaceEstimate {
        FaceEstimate {
            eye: Some(EyeEstimate { l, r }),
            ..FaceEstimate::default()
        }
    }

    #[test]
    fn smoothing_converges_within_predicted_iterations() {
        for f in [0.5f32, 0.6, 0.07, 0.3] {
            let eps = 1e-3f32;
            let n = (eps.ln() / (1.0 - f).ln()).ceil() as usize;
            let mut v = 0.0f32;
            for _ in 0..n {
                v = smooth(v, 1.0, f);
            }
            assert!((1.0 - v).abs() <= eps * 1.001, "factor {f}: {v} after {n}");
        }
    }

    #[test]
    fn eye_polarity_is_inverted() {
        assert_eq!(eye_target(0.0), 1.0);
        assert!(eye_target(1.0) < 0.03);

        let tuning = FaceTuning::default();
        let mut open = BlendShapeSmoother::new();
        let mut closed = BlendShapeSmoother::new();
        for _ in 0..30 {
            open.update_eyes(&eyes(Some(0.0), Some(0.0)), &tuning);
            closed.update_eyes(&eyes(Some(1.0), Some(1.0)), &tuning);
        }
        assert!((open.state.left_blink - 1.0).abs() < 1e-6);
        assert!(closed.state.right_blink < 0.03);
    }

    #[test]
    fn blink_threshold_switches_amplification() {
        // Just below the threshold the linear gain applies.
        let below = eye_target(0.19);
        let expected = 1.0 - (1.0 - (-0.19f32 * 4.0 * 3.0).exp());
        assert!((below - expected).abs() < 1e-6);
        // Above it the capped curve applies.
        let above = eye_target(0.5);
        assert!((above - (-1.3f32 * 3.0).exp()).abs() < 1e-6);
    }

    #[test]
    fn missing_side_holds_previous_value() {
        let tuning = FaceTuning::default();
        let mut s = BlendShapeSmoother::new();
        s.update_eyes(&eyes(Some(0.0), Some(0.0)), &tuning);
        let held = s.state.right_blink;
        let (l, r) = s.update_eyes(&eyes(Some(0.0), None), &tuning).unwrap();
        assert_eq!(r, held);
        assert!(l > held);
    }

    #[test]
    fn mouth_takes_strongest_signal() {
        let m = MouthEstimate {
            vertical_open: Some(-0.1),
            open_score: Some(0.1),
            shape: Some(VowelShapes {
                a: 0.2,
                ..VowelShapes::default()
            }),
        };
        assert!((mouth_target(&m) - 0.5).abs() < 1e-6);
        let loud = MouthEstimate {
            vertical_open: Some(0.9),
            ..MouthEstimate::default()
        };
        assert_eq!(mouth_target(&loud), 1.0);
        assert_eq!(mouth_target(&MouthEstimate::default()), 0.0);
    }

    #[test]
    fn no_eye_estimate_leaves_state() {
        let mut s = BlendShapeSmoother::new();
        assert!(s.update_eyes(&FaceEstimate::default(), &FaceTuning::default()).is_none());
        assert_eq!(s.state, SmoothingState::default());
    }
}
