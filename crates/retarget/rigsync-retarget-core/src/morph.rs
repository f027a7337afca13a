//! One-time discovery of the morph channels that face signals drive.

use serde::{Deserialize, Serialize};

use crate::model::MorphMesh;

/// Mouth-open channel spellings, in application order.
pub const MOUTH_CHANNEL_NAMES: [&str; 16] = [
    "jawOpen",
    "mouthOpen",
    "Mouth_Open",
    "jawOpenY",
    "jawOpenX",
    "Jaw_Open",
    "mouthOpenY",
    "MouthOpen",
    "JawOpen",
    "jaw_open",
    "mouth_open",
    "MouthOpenY",
    "jawOpenZ",
    "JawOpenY",
    "Mouth_Open_Y",
    "jawOpenVertical",
];

/// Eye-blink channel spellings, in application order.
pub const EYE_CHANNEL_NAMES: [&str; 19] = [
    "eyeBlinkLeft",
    "Eye_Blink_Left",
    "blinkLeft",
    "BlinkLeft",
    "EyeBlinkLeft",
    "eyeBlinkRight",
    "Eye_Blink_Right",
    "blinkRight",
    "BlinkRight",
    "EyeBlinkRight",
    "eyeBlink",
    "Eye_Blink",
    "blink",
    "Blink",
    "EyeBlink",
    "LeftEyeBlink",
    "RightEyeBlink",
    "LEyeBlink",
    "REyeBlink",
];

/// Which smoothed signal feeds a channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MorphSignal {
    Mouth,
    LeftBlink,
    RightBlink,
    /// Unqualified blink; receives the average of both eyes.
    Blink,
}

impl MorphSignal {
    pub fn for_eye_channel(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("left") || lower == "leyeblink" {
            MorphSignal::LeftBlink
        } else if lower.contains("right") || lower == "reyeblink" {
            MorphSignal::RightBlink
        } else {
            MorphSignal::Blink
        }
    }

    pub fn is_eye(self) -> bool {
        !matches!(self, MorphSignal::Mouth)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MorphChannel {
    pub name: String,
    pub mesh: usize,
    pub slot: usize,
    pub signal: MorphSignal,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MorphTargetIndex {
    channels: Vec<MorphChannel>,
}

impl MorphTargetIndex {
    pub fn build(meshes: &[MorphMesh]) -> Self {
        let mut channels = Vec::new();
        for (mesh_idx, mesh) in meshes.iter().enumerate() {
            for name in MOUTH_CHANNEL_NAMES {
                if let Some(slot) = mesh.slot(name) {
                    channels.push(MorphChannel {
                        name: name.to_string(),
                        mesh: mesh_idx,
                        slot,
                        signal: MorphSignal::Mouth,
                    });
                }
            }
            for name in EYE_CHANNEL_NAMES {
                if let Some(slot) = mesh.slot(name) {
                    channels.push(MorphChannel {
                        name: name.to_string(),
                        mesh: mesh_idx,
                        slot,
                        signal: MorphSignal::for_eye_channel(name),
                    });
                }
            }
        }
        Self { channels }
    }

    pub fn channels(&self) -> &[MorphChannel] {
        &self.channels
    }

    pub fn mouth_channels(&self) -> impl Iterator<Item = &MorphChannel> {
        self.channels.iter().filter(|c| c.signal == MorphSignal::Mouth)
    }

    pub fn eye_channels(&self) -> impl Iterator<Item = &MorphChannel> {
        self.channels.iter().filter(|c| c.signal.is_eye())
    }

    pub fn has_eye_channels(&self) -> bool {
        self.eye_channels().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
