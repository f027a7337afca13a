//! Finger curl and wrist orientation from raw hand landmarks.
//!
//! Landmark layout (21 points): 0 = wrist; thumb 1..=4; index 5..=8;
//! middle 9..=12; ring 13..=16; pinky 17..=20 (base to tip).

use log::{debug, trace};
use rigsync_api_core::blend::slerp;
use rigsync_api_core::{BoneId, Euler, EulerOrder, Skeleton, WriteBatch};

use crate::bone_map::{BoneMappingTable, Finger, HandSide};
use crate::config::HandTuning;
use crate::error::RetargetError;
use crate::estimate::{HandInput, HandLandmarks, HAND_LANDMARK_COUNT};

pub const WRIST_LANDMARK: usize = 0;

pub const FINGER_BASE_DISTANCE: f32 = 0.06;
pub const FINGER_SENSITIVITY: f32 = 18.0;
pub const HAND_BASE_DISTANCE: f32 = 0.10;
pub const HAND_SENSITIVITY: f32 = 15.0;
/// Weight of the whole-hand close amount against a finger's own curl.
pub const AGGREGATE_WEIGHT: f32 = 0.7;
/// Radians of extra x rotation per unit of (curl × joint multiplier).
pub const CURL_GAIN: f32 = 2.5;

/// Landmark indices used to measure one finger.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FingerLandmarks {
    pub tip: usize,
    pub mid: usize,
    pub base: usize,
}

pub fn finger_landmarks(finger: Finger) -> FingerLandmarks {
    let (tip, mid, base) = match finger {
        Finger::Thumb => (4, 3, 2),
        Finger::Index => (8, 6, 5),
        Finger::Middle => (12, 10, 9),
        Finger::Ring => (16, 14, 13),
        Finger::Pinky => (20, 18, 17),
    };
    FingerLandmarks { tip, mid, base }
}

/// Curl multipliers from base joint to tip joint.
pub fn joint_multipliers(finger: Finger) -> [f32; 3] {
    match finger {
        Finger::Thumb => [0.4, 0.8, 1.1],
        _ => [0.6, 1.5, 2.2],
    }
}

/// Clamp to [0,1]; NaN maps to 0.
#[inline]
pub fn clamp01(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// `clamp01(1 − (distance − base) × sensitivity)`.
#[inline]
pub fn curl_from_distance(distance: f32, base: f32, sensitivity: f32) -> f32 {
    clamp01(1.0 - (distance - base) * sensitivity)
}

/// Curl amounts for one hand. `fingers[i]` is `None` when that finger's
/// tip or base landmark was missing.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HandCurl {
    pub aggregate: f32,
    pub fingers: [Option<f32>; 5],
}

impl HandCurl {
    pub fn individual(&self, finger: Finger) -> Option<f32> {
        self.fingers[finger as usize]
    }

    /// `max(aggregate × 0.7, individual)`.
    pub fn combined(&self, finger: Finger) -> Option<f32> {
        self.individual(finger)
            .map(|ind| (self.aggregate * AGGREGATE_WEIGHT).max(ind))
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct HandCurlEstimator;

impl HandCurlEstimator {
    /// Average of tip-to-base and tip-to-mid distances. A missing mid joint
    /// reuses the tip-to-base sample.
    pub fn finger_distance(landmarks: &HandLandmarks, finger: Finger) -> Option<f32> {
        let idx = finger_landmarks(finger);
        let tip = landmarks.get(idx.tip)?;
        let base = landmarks.get(idx.base)?;
        let d1 = tip.distance(base);
        let d2 = landmarks.get(idx.mid).map_or(d1, |mid| tip.distance(mid));
        Some((d1 + d2) / 2.0)
    }

    pub fn estimate(&self, landmarks: &HandLandmarks) -> Result<HandCurl, RetargetError> {
        if landmarks.len() < HAND_LANDMARK_COUNT {
            return Err(RetargetError::malformed(
                "hand",
                format!("{} of {HAND_LANDMARK_COUNT} landmarks", landmarks.len()),
            ));
        }
        let wrist = landmarks
            .get(WRIST_LANDMARK)
            .ok_or_else(|| RetargetError::malformed("hand", "wrist landmark missing"))?;

        let (sum, count) = Finger::ALL
            .iter()
            .filter_map(|f| landmarks.get(finger_landmarks(*f).tip))
            .fold((0.0f32, 0u32), |(s, n), tip| (s + tip.distance(wrist), n + 1));
        let aggregate = if count > 0 {
            curl_from_distance(sum / count as f32, HAND_BASE_DISTANCE, HAND_SENSITIVITY)
        } else {
            0.0
        };

        let mut fingers = [None; 5];
        for finger in Finger::ALL {
            fingers[finger as usize] = Self::finger_distance(landmarks, finger)
                .map(|d| curl_from_distance(d, FINGER_BASE_DISTANCE, FINGER_SENSITIVITY));
        }

        Ok(HandCurl { aggregate, fingers })
    }
}

/// Hand and finger joints of one side, resolved once per loaded skeleton.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandBones {
    pub wrist: Option<BoneId>,
    pub fingers: [[Option<BoneId>; 3]; 5],
}

impl HandBones {
    pub fn resolve(skeleton: &Skeleton, table: &BoneMappingTable, side: HandSide) -> Self {
        let mut fingers = [[None; 3]; 5];
        for finger in Finger::ALL {
            let names = table.finger_bone_names(side, finger);
            for (slot, name) in fingers[finger as usize].iter_mut().zip(names.iter()) {
                *slot = skeleton.find(name);
            }
        }
        Self {
            wrist: skeleton.find(&table.hand_bone_name(side)),
            fingers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.wrist.is_none() && self.fingers.iter().flatten().all(Option::is_none)
    }
}

/// Drive one hand's wrist and finger joints. A malformed landmark set or a
/// non-finite solved rotation skips the whole hand; a finger without
/// landmarks or solved rotation is skipped alone.
pub fn apply_hand(
    skeleton: &mut Skeleton,
    bones: &HandBones,
    input: &HandInput,
    tuning: &HandTuning,
    side: HandSide,
    out: &mut WriteBatch,
) -> Result<HandCurl, RetargetError> {
    let part = || format!("{}Hand", side.as_str());
    let curl = HandCurlEstimator.estimate(&input.landmarks).map_err(|e| match e {
        RetargetError::MalformedEstimate { reason, .. } => RetargetError::malformed(part(), reason),
        other => other,
    })?;

    let solved = &input.solved;
    if let Some(bad) = std::iter::once(("wrist", solved.wrist))
        .chain(Finger::ALL.iter().map(|f| (f.as_str(), solved.finger(*f))))
        .find_map(|(name, v)| v.filter(|v| !v.is_finite()).map(|_| name))
    {
        return Err(RetargetError::malformed(part(), format!("non-finite {bad} rotation")));
    }

    if let (Some(id), Some(wrist)) = (bones.wrist, input.solved.wrist) {
        let target = Euler::from_vec3(wrist.scale(tuning.wrist.dampener).to_array(), EulerOrder::XYZ);
        if let Some(current) = skeleton.rotation(id) {
            skeleton.write_rotation(id, slerp(current, target.to_quat(), tuning.wrist.blend), out);
        }
    }

    for finger in Finger::ALL {
        let Some(solved) = input.solved.finger(finger) else {
            trace!("{} {}: no solved rotation", side.as_str(), finger.as_str());
            continue;
        };
        let Some(combined) = curl.combined(finger) else {
            debug!("{} {}: tip or base landmark missing", side.as_str(), finger.as_str());
            continue;
        };
        let multipliers = joint_multipliers(finger);
        for (joint, mult) in bones.fingers[finger as usize].iter().zip(multipliers) {
            let Some(id) = *joint else { continue };
            let Some(current) = skeleton.rotation(id) else { continue };
            let target = Euler::new(
                solved.x + combined * mult * CURL_GAIN,
                solved.y,
                solved.z,
                EulerOrder::XYZ,
            );
            skeleton.write_rotation(id, slerp(current, target.to_quat(), tuning.finger_blend), out);
        }
    }

    Ok(curl)
}
