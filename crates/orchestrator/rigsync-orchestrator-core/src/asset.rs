use rigsync_retarget_core::RigModelDesc;
use serde::{Deserialize, Serialize};

/// A loaded model as handed over by the model-loading collaborator: the rig
/// plus any clips embedded in the same file. Clips stay raw so each one can
/// fail on its own during ingest.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelAsset {
    #[serde(flatten)]
    pub rig: RigModelDesc,
    #[serde(default)]
    pub clips: Vec<serde_json::Value>,
}

impl ModelAsset {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
