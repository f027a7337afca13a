use rigsync_retarget_core::{BoneMappingTable, RetargetConfig, TrackingTarget};
use serde::{Deserialize, Serialize};

/// Controller configuration. Omitted sections keep their defaults: face
/// tracking, the documented retarget constants and the Mixamo table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub tracking_target: TrackingTarget,
    pub retarget: RetargetConfig,
    pub mapping: BoneMappingTable,
}

impl OrchestratorConfig {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
