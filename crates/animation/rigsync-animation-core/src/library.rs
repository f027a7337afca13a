//! Named clip library with batch ingest.
//!
//! Each ingested file yields an `IngestReport` listing what happened to every
//! clip in it. Failures are per clip; one bad clip never drops its siblings.

use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::data::AnimationClip;
use crate::error::ClipLoadError;
use crate::ids::{ClipId, IdAllocator};
use crate::loader::{parse_clip_value, split_clip_file};

/// Clip name used by exporters that do not name their takes.
pub const PLACEHOLDER_CLIP_NAME: &str = "mixamo.com";

/// Strip a trailing `.fbx`/`.FBX`, collapse whitespace runs, trim.
pub fn clean_source_name(source: &str) -> String {
    let stem = source
        .strip_suffix(".fbx")
        .or_else(|| source.strip_suffix(".FBX"))
        .unwrap_or(source);
    stem.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClipOutcome {
    Added { name: String, id: ClipId },
    /// A clip with the same name is already in the library.
    Duplicate { name: String },
    Failed { name: String, error: ClipLoadError },
}

impl ClipOutcome {
    pub fn name(&self) -> &str {
        match self {
            ClipOutcome::Added { name, .. }
            | ClipOutcome::Duplicate { name }
            | ClipOutcome::Failed { name, .. } => name,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub source: String,
    /// Clip entries found in the source, whatever became of them.
    pub found: usize,
    pub outcomes: Vec<ClipOutcome>,
}

impl IngestReport {
    pub fn added(&self) -> impl Iterator<Item = ClipId> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            ClipOutcome::Added { id, .. } => Some(*id),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ClipLoadError)> {
        self.outcomes.iter().filter_map(|o| match o {
            ClipOutcome::Failed { name, error } => Some((name.as_str(), error)),
            _ => None,
        })
    }

    pub fn found_any(&self) -> bool {
        self.found > 0
    }

    pub fn message(&self) -> String {
        if self.found_any() {
            format!("Loaded {} animation(s) from {}", self.found, self.source)
        } else {
            format!("No animations found in {}", self.source)
        }
    }
}

#[derive(Debug, Default)]
pub struct ClipLibrary {
    ids: IdAllocator,
    clips: Vec<(ClipId, Arc<AnimationClip>)>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clear(&mut self) {
        self.clips.clear();
    }

    pub fn get(&self, id: ClipId) -> Option<Arc<AnimationClip>> {
        self.clips.iter().find(|(cid, _)| *cid == id).map(|(_, c)| Arc::clone(c))
    }

    pub fn find_by_name(&self, name: &str) -> Option<(ClipId, Arc<AnimationClip>)> {
        self.clips
            .iter()
            .find(|(_, c)| c.name == name)
            .map(|(id, c)| (*id, Arc::clone(c)))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.clips.iter().any(|(_, c)| c.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.clips.iter().map(|(_, c)| c.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClipId, &AnimationClip)> {
        self.clips.iter().map(|(id, c)| (*id, c.as_ref()))
    }

    /// Add one parsed clip unless it is empty or its name is taken.
    pub fn insert(&mut self, clip: AnimationClip) -> ClipOutcome {
        if !clip.has_tracks() {
            return ClipOutcome::Failed {
                error: ClipLoadError::NoTracks {
                    clip: clip.name.clone(),
                },
                name: clip.name,
            };
        }
        if self.contains_name(&clip.name) {
            return ClipOutcome::Duplicate { name: clip.name };
        }
        let id = self.ids.alloc_clip();
        let name = clip.name.clone();
        self.clips.push((id, Arc::new(clip)));
        ClipOutcome::Added { name, id }
    }

    /// Ingest raw clip entries from `source`. Clips with an empty or
    /// placeholder name take the cleaned source name.
    pub fn ingest(&mut self, source: &str, raw: Vec<serde_json::Value>) -> IngestReport {
        let fallback = clean_source_name(source);
        let mut report = IngestReport {
            source: source.to_string(),
            found: raw.len(),
            outcomes: Vec::with_capacity(raw.len()),
        };

        for (idx, entry) in raw.into_iter().enumerate() {
            let stored_name = entry
                .get("name")
                .and_then(serde_json::Value::as_str)
                .filter(|n| !n.is_empty() && *n != PLACEHOLDER_CLIP_NAME)
                .map(str::to_string);
            let outcome = match parse_clip_value(entry) {
                Ok(mut clip) => {
                    if clip.name.is_empty() || clip.name == PLACEHOLDER_CLIP_NAME {
                        clip.name = fallback.clone();
                    }
                    self.insert(clip)
                }
                Err(error) => ClipOutcome::Failed {
                    name: stored_name.unwrap_or_else(|| format!("{fallback}#{idx}")),
                    error,
                },
            };
            if let ClipOutcome::Failed { name, error } = &outcome {
                warn!("{source}: clip '{name}' not loaded: {error}");
            }
            report.outcomes.push(outcome);
        }

        info!(
            "{source}: {} clip(s) found, {} added, library now {}",
            report.found,
            report.added().count(),
            self.len()
        );
        report
    }

    /// Split a clip file and ingest every entry. Only an unreadable file is an
    /// error; bad entries are reported inside the `IngestReport`.
    pub fn ingest_json(&mut self, source: &str, json: &str) -> Result<IngestReport, ClipLoadError> {
        let raw = split_clip_file(json)?;
        Ok(self.ingest(source, raw))
    }
}
