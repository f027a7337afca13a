//! Damped rotation/position retargeting onto mapped rig joints.
//!
//! Blend factors are the fraction of remaining distance closed per call and
//! are not scaled by elapsed time.

use rigsync_api_core::blend::{lerp_vec3, slerp};
use rigsync_api_core::{Euler, Skeleton, Vec3, WriteBatch};

use crate::bone_map::{BoneMapping, BoneMappingTable, SemanticBone};
use crate::config::Damping;
use crate::error::RetargetError;
use crate::estimate::Vector3;
use crate::pose_cache::{CachedBone, InitialPoseCache};

/// Rig units per solver unit.
pub const POSITION_SCALE: f32 = 100.0;
/// Vertical offset (rig units) applied after scaling.
pub const POSITION_Y_OFFSET: f32 = -120.0;

/// Borrowing view over a mapping table and the baselines captured for the
/// current skeleton.
#[derive(Copy, Clone)]
pub struct RetargetEngine<'a> {
    table: &'a BoneMappingTable,
    cache: &'a InitialPoseCache,
}

impl<'a> RetargetEngine<'a> {
    pub fn new(table: &'a BoneMappingTable, cache: &'a InitialPoseCache) -> Self {
        Self { table, cache }
    }

    fn resolve(&self, semantic: SemanticBone) -> Result<(&'a BoneMapping, &'a CachedBone), RetargetError> {
        let mapping = self
            .table
            .lookup(semantic)
            .ok_or_else(|| RetargetError::MappingAbsent {
                semantic: semantic.to_string(),
            })?;
        let cached = self
            .cache
            .get(semantic)
            .ok_or_else(|| RetargetError::BoneNotFound {
                semantic: semantic.to_string(),
                bone: mapping.rig_bone.clone(),
            })?;
        Ok((mapping, cached))
    }

    fn finite(semantic: SemanticBone, estimate: Vector3) -> Result<Vector3, RetargetError> {
        if estimate.is_finite() {
            Ok(estimate)
        } else {
            Err(RetargetError::malformed(semantic.to_string(), "non-finite component"))
        }
    }

    /// Target orientation for `estimate`: the damped, axis-remapped estimate
    /// added to the baseline in the mapping's rotation order.
    pub fn target_rotation(&self, semantic: SemanticBone, estimate: Vector3, dampener: f32) -> Result<Euler, RetargetError> {
        let (mapping, cached) = self.resolve(semantic)?;
        let estimate = Self::finite(semantic, estimate)?;
        let offset = mapping.axes.apply(estimate.scale(dampener).to_array());
        let base = cached.baseline;
        Ok(Euler::new(
            base.x + offset[0],
            base.y + offset[1],
            base.z + offset[2],
            mapping.order,
        ))
    }

    /// Slerp the joint toward the damped estimate by `damping.blend`.
    pub fn apply_rotation(
        &self,
        skeleton: &mut Skeleton,
        semantic: SemanticBone,
        estimate: Vector3,
        damping: Damping,
        out: &mut WriteBatch,
    ) -> Result<(), RetargetError> {
        let target = self.target_rotation(semantic, estimate, damping.dampener)?;
        let (mapping, cached) = self.resolve(semantic)?;
        let current = skeleton
            .rotation(cached.bone)
            .ok_or_else(|| RetargetError::BoneNotFound {
                semantic: semantic.to_string(),
                bone: mapping.rig_bone.clone(),
            })?;
        let next = slerp(current, target.to_quat(), damping.blend);
        skeleton.write_rotation(cached.bone, next, out);
        Ok(())
    }

    /// Lerp the joint position toward the estimate converted to rig units.
    pub fn apply_position(
        &self,
        skeleton: &mut Skeleton,
        semantic: SemanticBone,
        estimate: Vector3,
        damping: Damping,
        out: &mut WriteBatch,
    ) -> Result<(), RetargetError> {
        let (mapping, cached) = self.resolve(semantic)?;
        let current = skeleton
            .position(cached.bone)
            .ok_or_else(|| RetargetError::BoneNotFound {
                semantic: semantic.to_string(),
                bone: mapping.rig_bone.clone(),
            })?;
        let target = rig_position(Self::finite(semantic, estimate)?, damping.dampener);
        skeleton.write_position(cached.bone, lerp_vec3(current, target, damping.blend), out);
        Ok(())
    }

    /// String-keyed variant of `apply_rotation`; unknown names are `MappingAbsent`.
    pub fn apply_rotation_by_name(
        &self,
        skeleton: &mut Skeleton,
        semantic: &str,
        estimate: Vector3,
        damping: Damping,
        out: &mut WriteBatch,
    ) -> Result<(), RetargetError> {
        let semantic = semantic
            .parse::<SemanticBone>()
            .map_err(|_| RetargetError::MappingAbsent {
                semantic: semantic.to_string(),
            })?;
        self.apply_rotation(skeleton, semantic, estimate, damping, out)
    }
}

/// Solver position → rig units: x·d·100, y·d·100 − 120, −z·d·100.
pub fn rig_position(estimate: Vector3, dampener: f32) -> Vec3 {
    let s = dampener * POSITION_SCALE;
    [
        estimate.x * s,
        estimate.y * s + POSITION_Y_OFFSET,
        -estimate.z * s,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bone_map::MIXAMO;
    use rigsync_api_core::blend::quat_angle;
    use rigsync_api_core::{BoneDesc, EulerOrder, SkeletonDesc};

    fn neck_and_hips() -> Skeleton {
        let rest = Euler::new(0.2, 0.1, -0.05, EulerOrder::XYZ).to_quat();
        Skeleton::from_desc(SkeletonDesc {
            bones: vec![
                BoneDesc::new("mixamorigHips", None).with_position([0.0, 90.0, 0.0]),
                BoneDesc::new("mixamorigNeck", Some("mixamorigHips")).with_rotation(rest),
            ],
        })
        .unwrap()
    }

    #[test]
    fn zero_estimate_full_blend_returns_baseline() {
        let mut sk = neck_and_hips();
        let cache = InitialPoseCache::capture(&sk, &MIXAMO);
        let engine = RetargetEngine::new(&MIXAMO, &cache);
        let neck = sk.find("mixamorigNeck").unwrap();
        let rest = sk.rotation(neck).unwrap();

        let mut out = WriteBatch::new();
        engine
            .apply_rotation(&mut sk, SemanticBone::Neck, Vector3::new(0.4, -0.3, 0.2), Damping::new(1.0, 1.0), &mut out)
            .unwrap();
        assert!(quat_angle(sk.rotation(neck).unwrap(), rest) > 0.1);

        engine
            .apply_rotation(&mut sk, SemanticBone::Neck, Vector3::ZERO, Damping::new(0.7, 1.0), &mut out)
            .unwrap();
        assert!(quat_angle(sk.rotation(neck).unwrap(), rest) < 1e-4);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn absent_bone_is_reported_and_untouched() {
        let mut sk = neck_and_hips();
        let cache = InitialPoseCache::capture(&sk, &MIXAMO);
        let engine = RetargetEngine::new(&MIXAMO, &cache);
        let mut out = WriteBatch::new();
        let err = engine
            .apply_rotation(&mut sk, SemanticBone::Chest, Vector3::new(1.0, 0.0, 0.0), Damping::default(), &mut out)
            .unwrap_err();
        assert!(matches!(err, RetargetError::BoneNotFound { .. }));
        assert!(out.is_empty());

        let err = engine
            .apply_rotation_by_name(&mut sk, "Tail", Vector3::ZERO, Damping::default(), &mut out)
            .unwrap_err();
        assert!(matches!(err, RetargetError::MappingAbsent { .. }));
    }

    #[test]
    fn position_converts_units_and_lerps() {
        let mut sk = neck_and_hips();
        let cache = InitialPoseCache::capture(&sk, &MIXAMO);
        let engine = RetargetEngine::new(&MIXAMO, &cache);
        let mut out = WriteBatch::new();
        engine
            .apply_position(&mut sk, SemanticBone::Hips, Vector3::new(0.1, 1.5, 0.2), Damping::new(1.0, 1.0), &mut out)
            .unwrap();
        let p = sk.position(sk.find("mixamorigHips").unwrap()).unwrap();
        assert!((p[0] - 10.0).abs() < 1e-4);
        assert!((p[1] - 30.0).abs() < 1e-4);
        assert!((p[2] + 20.0).abs() < 1e-4);
    }

    #[test]
    fn partial_blend_closes_fraction_of_angle() {
        let mut sk = neck_and_hips();
        let cache = InitialPoseCache::capture(&sk, &MIXAMO);
        let engine = RetargetEngine::new(&MIXAMO, &cache);
        let neck = sk.find("mixamorigNeck").unwrap();
        let start = sk.rotation(neck).unwrap();
        let target = engine
            .target_rotation(SemanticBone::Neck, Vector3::new(0.5, 0.0, 0.0), 1.0)
            .unwrap()
            .to_quat();
        let total = quat_angle(start, target);

        let mut out = WriteBatch::new();
        engine
            .apply_rotation(&mut sk, SemanticBone::Neck, Vector3::new(0.5, 0.0, 0.0), Damping::new(1.0, 0.3), &mut out)
            .unwrap();
        let moved = quat_angle(start, sk.rotation(neck).unwrap());
        assert!((moved - 0.3 * total).abs() < 1e-3);
    }

    #[test]
    fn non_finite_estimates_are_skipped() {
        let mut sk = neck_and_hips();
        let cache = InitialPoseCache::capture(&sk, &MIXAMO);
        let engine = RetargetEngine::new(&MIXAMO, &cache);
        let hips = sk.find("mixamorigHips").unwrap();
        let neck = sk.find("mixamorigNeck").unwrap();
        let hips_before = sk.position(hips).unwrap();
        let neck_before = sk.rotation(neck).unwrap();

        let mut out = WriteBatch::new();
        let err = engine
            .apply_position(&mut sk, SemanticBone::Hips, Vector3::new(f32::NAN, 0.0, 0.0), Damping::default(), &mut out)
            .unwrap_err();
        assert!(matches!(err, RetargetError::MalformedEstimate { ref part, .. } if part == "Hips"));
        let err = engine
            .apply_rotation(&mut sk, SemanticBone::Neck, Vector3::new(0.0, f32::INFINITY, 0.0), Damping::default(), &mut out)
            .unwrap_err();
        assert!(matches!(err, RetargetError::MalformedEstimate { .. }));
        assert!(out.is_empty());
        assert_eq!(sk.position(hips).unwrap(), hips_before);
        assert_eq!(sk.rotation(neck).unwrap(), neck_before);

        for _ in 0..200 {
            engine
                .apply_position(&mut sk, SemanticBone::Hips, Vector3::new(0.1, 1.5, 0.2), Damping::default(), &mut out)
                .unwrap();
        }
        let p = sk.position(hips).unwrap();
        assert!(p.iter().all(|c| c.is_finite()));
        assert!((p[0] - 0.1 * Damping::default().dampener * POSITION_SCALE).abs() < 1e-2);
    }
}
