//! rigsync-animation-core (engine-agnostic)
//!
//! Keyframed joint clips, a named clip library with per-clip ingest reports,
//! and a single-action looping player that writes into a rigsync skeleton.

pub mod binding;
pub mod data;
pub mod error;
pub mod ids;
pub mod library;
pub mod loader;
pub mod playback;
pub mod sampling;

// Re-exports for consumers
pub use binding::{BindingRow, BindingSet, TargetResolver};
pub use data::{AnimationClip, Keyframe, Track, TrackProperty};
pub use error::ClipLoadError;
pub use ids::ClipId;
pub use library::{clean_source_name, ClipLibrary, ClipOutcome, IngestReport, PLACEHOLDER_CLIP_NAME};
pub use loader::{parse_clip_json, parse_clip_value, split_clip_file};
pub use playback::{AnimationPlaybackController, PlaybackState, MAX_FRAME_DT};
pub use sampling::sample_track;
