//! Loaded rig: skeleton plus meshes carrying morph target (blendshape) weights.

use rigsync_api_core::{Skeleton, SkeletonDesc, SkeletonError, WriteBatch, WriteOp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MorphMeshDesc {
    pub name: String,
    /// Channel names in slot order.
    pub morph_targets: Vec<String>,
    #[serde(default)]
    pub influences: Vec<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RigModelDesc {
    pub skeleton: SkeletonDesc,
    #[serde(default)]
    pub meshes: Vec<MorphMeshDesc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MorphMesh {
    pub name: String,
    pub morph_targets: Vec<String>,
    pub influences: Vec<f32>,
}

impl MorphMesh {
    fn from_desc(desc: MorphMeshDesc) -> Self {
        let mut influences = desc.influences;
        influences.resize(desc.morph_targets.len(), 0.0);
        Self {
            name: desc.name,
            morph_targets: desc.morph_targets,
            influences,
        }
    }

    pub fn slot(&self, channel: &str) -> Option<usize> {
        self.morph_targets.iter().position(|n| n == channel)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RigModel {
    pub skeleton: Skeleton,
    pub meshes: Vec<MorphMesh>,
}

impl RigModel {
    pub fn from_desc(desc: RigModelDesc) -> Result<Self, SkeletonError> {
        Ok(Self {
            skeleton: Skeleton::from_desc(desc.skeleton)?,
            meshes: desc.meshes.into_iter().map(MorphMesh::from_desc).collect(),
        })
    }

    pub fn from_json(s: &str) -> Result<Self, String> {
        let desc: RigModelDesc = serde_json::from_str(s).map_err(|e| format!("parse error: {e}"))?;
        Self::from_desc(desc).map_err(|e| e.to_string())
    }

    /// Set one morph weight and record the write. Out-of-range slots are ignored.
    pub fn set_morph_weight(&mut self, mesh: usize, slot: usize, weight: f32, out: &mut WriteBatch) -> bool {
        let Some(m) = self.meshes.get_mut(mesh) else {
            return false;
        };
        let (Some(w), Some(channel)) = (m.influences.get_mut(slot), m.morph_targets.get(slot)) else {
            return false;
        };
        *w = weight;
        out.push(WriteOp::MorphWeight {
            mesh: m.name.clone(),
            channel: channel.clone(),
            weight,
        });
        true
    }

    pub fn morph_weight(&self, mesh: &str, channel: &str) -> Option<f32> {
        let m = self.meshes.iter().find(|m| m.name == mesh)?;
        m.slot(channel).and_then(|s| m.influences.get(s).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn influences_are_padded_to_target_count() {
        let model = RigModel::from_json(
            r#"{
                "skeleton": { "bones": [ { "name": "mixamorigHips" } ] },
                "meshes": [ { "name": "Face", "morph_targets": ["jawOpen", "eyeBlinkLeft"] } ]
            }"#,
        )
        .unwrap();
        assert_eq!(model.meshes[0].influences, vec![0.0, 0.0]);
        assert_eq!(model.morph_weight("Face", "eyeBlinkLeft"), Some(0.0));
    }

    #[test]
    fn set_weight_records_write() {
        let mut model = RigModel::from_desc(RigModelDesc {
            skeleton: SkeletonDesc::default(),
            meshes: vec![MorphMeshDesc {
                name: "Face".into(),
                morph_targets: vec!["jawOpen".into()],
                influences: vec![],
            }],
        })
        .unwrap();
        let mut out = WriteBatch::new();
        assert!(model.set_morph_weight(0, 0, 0.4, &mut out));
        assert!(!model.set_morph_weight(0, 3, 0.4, &mut out));
        assert_eq!(out.len(), 1);
        assert_eq!(model.morph_weight("Face", "jawOpen"), Some(0.4));
    }
}
