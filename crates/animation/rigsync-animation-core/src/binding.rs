//! Track → joint binding.
//!
//! A clip's tracks name rig joints as strings. Binding resolves them to
//! `BoneId`s once when the clip is selected, so playback never looks up names.

use log::debug;
use rigsync_api_core::{BoneId, Skeleton};

use crate::data::AnimationClip;

/// Resolves joint names to handles. Skeletons implement this directly;
/// hosts with their own naming can supply another resolver.
pub trait TargetResolver {
    fn resolve(&self, bone: &str) -> Option<BoneId>;
}

impl TargetResolver for Skeleton {
    fn resolve(&self, bone: &str) -> Option<BoneId> {
        self.find(bone)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BindingRow {
    pub track_idx: usize,
    pub bone: BoneId,
}

/// Resolved tracks of one clip. Tracks naming joints the rig lacks are left out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindingSet {
    pub rows: Vec<BindingRow>,
    pub unresolved: usize,
}

impl BindingSet {
    pub fn bind(clip: &AnimationClip, resolver: &dyn TargetResolver) -> Self {
        let mut set = BindingSet::default();
        for (track_idx, track) in clip.tracks.iter().enumerate() {
            match resolver.resolve(&track.bone) {
                Some(bone) => set.rows.push(BindingRow { track_idx, bone }),
                None => {
                    debug!("clip '{}': no joint named '{}'", clip.name, track.bone);
                    set.unresolved += 1;
                }
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
