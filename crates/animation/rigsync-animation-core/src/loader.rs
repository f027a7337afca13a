use serde::Deserialize;

use crate::data::{AnimationClip, Keyframe, Track, TrackProperty};
use crate::error::ClipLoadError;
use rigsync_api_core::blend::normalize_quat;
use rigsync_api_core::Value;

#[derive(Debug, Deserialize)]
struct StoredClip {
    #[serde(default)]
    name: String,
    /// Seconds; defaults to the last key time.
    #[serde(default)]
    duration: Option<f32>,
    #[serde(default)]
    tracks: Vec<StoredTrack>,
}

#[derive(Debug, Deserialize)]
struct StoredTrack {
    bone: String,
    property: TrackProperty,
    keyframes: Vec<StoredKey>,
}

#[derive(Debug, Deserialize)]
struct StoredKey {
    time: f32,
    value: Vec<f32>,
}

/// Clips as delivered by the clip-loading collaborator: either
/// `{ "clips": [...] }`, a bare array, or a single clip object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredClipFile {
    Wrapped { clips: Vec<serde_json::Value> },
    List(Vec<serde_json::Value>),
    Single(serde_json::Value),
}

fn to_value(clip: &str, track: &StoredTrack, raw: &[f32]) -> Result<Value, ClipLoadError> {
    match (track.property, raw) {
        (TrackProperty::Rotation, [x, y, z, w]) => Ok(Value::Quat(normalize_quat([*x, *y, *z, *w]))),
        (TrackProperty::Position, [x, y, z]) => Ok(Value::Vec3([*x, *y, *z])),
        (prop, other) => Err(ClipLoadError::invalid(
            clip,
            format!(
                "track '{}' {:?} key has {} components",
                track.bone,
                prop,
                other.len()
            ),
        )),
    }
}

/// Convert one stored clip into an `AnimationClip` and validate it.
/// The name is kept as stored (possibly empty).
pub fn parse_clip_value(v: serde_json::Value) -> Result<AnimationClip, ClipLoadError> {
    let stored: StoredClip = serde_json::from_value(v)?;

    let mut tracks = Vec::with_capacity(stored.tracks.len());
    let mut last_time = 0.0f32;
    for st in &stored.tracks {
        let mut keyframes = Vec::with_capacity(st.keyframes.len());
        for k in &st.keyframes {
            keyframes.push(Keyframe {
                time: k.time,
                value: to_value(&stored.name, st, &k.value)?,
            });
            last_time = last_time.max(k.time);
        }
        tracks.push(Track {
            bone: st.bone.clone(),
            property: st.property,
            keyframes,
        });
    }

    let clip = AnimationClip {
        duration: stored.duration.unwrap_or(last_time),
        name: stored.name,
        tracks,
    };
    clip.validate()?;
    Ok(clip)
}

pub fn parse_clip_json(s: &str) -> Result<AnimationClip, ClipLoadError> {
    let v: serde_json::Value = serde_json::from_str(s)?;
    parse_clip_value(v)
}

/// Split a clip file into its raw clip entries without parsing them, so each
/// entry can fail independently.
pub fn split_clip_file(s: &str) -> Result<Vec<serde_json::Value>, ClipLoadError> {
    let file: StoredClipFile = serde_json::from_str(s)?;
    Ok(match file {
        StoredClipFile::Wrapped { clips } => clips,
        StoredClipFile::List(list) => list,
        StoredClipFile::Single(one) => vec![one],
    })
}
