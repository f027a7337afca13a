//! Clip playback against a skeleton.
//!
//! One action plays at a time. Selecting a clip stops the previous action,
//! binds the new clip's tracks to the rig and restarts from zero.

use std::sync::Arc;

use log::{debug, info};
use rigsync_api_core::{Skeleton, Value, WriteBatch};
use serde::{Deserialize, Serialize};

use crate::binding::{BindingSet, TargetResolver};
use crate::data::{AnimationClip, TrackProperty};
use crate::sampling::{fmod, sample_track};

/// Frame deltas at or above this many seconds are treated as hitches and skipped.
pub const MAX_FRAME_DT: f32 = 0.1;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub current_clip: Option<String>,
    pub elapsed: f32,
    pub is_playing: bool,
}

#[derive(Debug)]
struct Action {
    clip: Arc<AnimationClip>,
    bindings: BindingSet,
    /// Seconds since selection, unwrapped.
    elapsed: f32,
}

impl Action {
    /// Clip time; the action repeats forever.
    fn local_time(&self) -> f32 {
        fmod(self.elapsed, self.clip.duration)
    }
}

#[derive(Debug, Default)]
pub struct AnimationPlaybackController {
    action: Option<Action>,
    playing: bool,
}

impl AnimationPlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_clip(&self) -> Option<&AnimationClip> {
        self.action.as_ref().map(|a| a.clip.as_ref())
    }

    pub fn state(&self) -> PlaybackState {
        match &self.action {
            Some(a) => PlaybackState {
                current_clip: Some(a.clip.name.clone()),
                elapsed: a.elapsed,
                is_playing: self.playing,
            },
            None => PlaybackState::default(),
        }
    }

    /// Stop any current action, bind `clip` to the rig and start it from zero
    /// with repeat looping, unit time scale and full weight.
    pub fn select(&mut self, clip: Arc<AnimationClip>, resolver: &dyn TargetResolver) {
        self.stop();
        let bindings = BindingSet::bind(&clip, resolver);
        if bindings.unresolved > 0 {
            debug!(
                "clip '{}': {} of {} tracks have no joint on this rig",
                clip.name,
                bindings.unresolved,
                clip.tracks.len()
            );
        }
        info!("playing clip '{}' ({:.2}s, {} bound tracks)", clip.name, clip.duration, bindings.len());
        self.action = Some(Action {
            clip,
            bindings,
            elapsed: 0.0,
        });
        self.playing = true;
    }

    /// Stop and forget the current action. The rig keeps its last pose.
    pub fn stop(&mut self) {
        if let Some(prev) = self.action.take() {
            debug!("stopped clip '{}' at {:.3}s", prev.clip.name, prev.elapsed);
        }
        self.playing = false;
    }

    /// Advance by `dt` seconds and write the sampled pose. Returns false
    /// without touching anything when nothing plays or `dt` is outside
    /// `(0, MAX_FRAME_DT)`.
    pub fn advance(&mut self, dt: f32, skeleton: &mut Skeleton, out: &mut WriteBatch) -> bool {
        if !self.playing || !(dt > 0.0 && dt < MAX_FRAME_DT) {
            return false;
        }
        let Some(action) = self.action.as_mut() else {
            return false;
        };

        action.elapsed += dt;
        let t = action.local_time();

        for row in &action.bindings.rows {
            let Some(track) = action.clip.tracks.get(row.track_idx) else {
                continue;
            };
            let Some(value) = sample_track(track, t) else {
                continue;
            };
            match (track.property, value) {
                (TrackProperty::Rotation, Value::Quat(q)) => {
                    skeleton.write_rotation(row.bone, q, out);
                }
                (TrackProperty::Position, Value::Vec3(p)) => {
                    skeleton.write_position(row.bone, p, out);
                }
                _ => {}
            }
        }
        true
    }
}
