use rigsync_api_core::blend::quat_angle;
use rigsync_api_core::{Euler, EulerOrder, WriteBatch, WriteOp};
use rigsync_retarget_core::{
    apply_frame, Damping, FrameEstimate, InitialPoseCache, RetargetConfig, RetargetContext,
    RetargetEngine, RetargetError, RigModel, SemanticBone, TrackingTarget, Vector3, MIXAMO,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn load_model(name: &str) -> anyhow::Result<RigModel> {
    let json = rigsync_test_fixtures::models::json(name)?;
    RigModel::from_json(&json).map_err(anyhow::Error::msg)
}

fn load_frame() -> anyhow::Result<FrameEstimate> {
    rigsync_test_fixtures::estimates::load("upper_body_frame")
}

fn rotation_of(writes: &WriteBatch, bone: &str) -> Option<[f32; 4]> {
    writes.iter().rev().find_map(|op| match op {
        WriteOp::Rotation { bone: b, value } if b == bone => Some(*value),
        _ => None,
    })
}

#[test]
fn cache_holds_one_entry_per_present_mapped_bone() -> anyhow::Result<()> {
    let partial = load_model("neck_and_hips")?;
    let cache = InitialPoseCache::capture(&partial.skeleton, &MIXAMO);
    assert_eq!(cache.len(), 2);
    assert!(cache.contains(SemanticBone::Hips) && cache.contains(SemanticBone::Neck));

    let full = load_model("mixamo_full")?;
    let cache = InitialPoseCache::capture(&full.skeleton, &MIXAMO);
    assert_eq!(cache.len(), 12);
    assert!(cache.len() <= MIXAMO.len());
    Ok(())
}

#[test]
fn chest_is_noop_and_neck_returns_to_baseline_on_partial_rig() -> anyhow::Result<()> {
    let mut model = load_model("neck_and_hips")?;
    let cache = InitialPoseCache::capture(&model.skeleton, &MIXAMO);
    let engine = RetargetEngine::new(&MIXAMO, &cache);
    let neck = model.skeleton.find("mixamorigNeck").expect("neck");
    let rest = model.skeleton.rotation(neck).expect("rest");
    let before: Vec<_> = model.skeleton.bones().to_vec();

    let mut out = WriteBatch::new();
    let err = engine
        .apply_rotation_by_name(
            &mut model.skeleton,
            "Chest",
            Vector3::new(0.5, 0.5, 0.5),
            Damping::default(),
            &mut out,
        )
        .unwrap_err();
    assert!(matches!(err, RetargetError::BoneNotFound { .. }));
    assert!(out.is_empty());
    assert_eq!(model.skeleton.bones(), &before[..]);

    // Push the neck away, then steer it home with a zero estimate.
    engine
        .apply_rotation(
            &mut model.skeleton,
            SemanticBone::Neck,
            Vector3::new(0.6, -0.4, 0.3),
            Damping::new(1.0, 1.0),
            &mut out,
        )
        .unwrap();
    assert!(quat_angle(model.skeleton.rotation(neck).unwrap(), rest) > 0.2);

    engine
        .apply_rotation_by_name(
            &mut model.skeleton,
            "Neck",
            Vector3::ZERO,
            Damping::new(0.7, 1.0),
            &mut out,
        )
        .unwrap();
    assert!(quat_angle(model.skeleton.rotation(neck).unwrap(), rest) < 1e-4);
    assert!(out.touches_bone("mixamorigNeck"));
    Ok(())
}

#[test]
fn hips_position_converges_at_documented_rate() -> anyhow::Result<()> {
    let mut model = load_model("neck_and_hips")?;
    let cache = InitialPoseCache::capture(&model.skeleton, &MIXAMO);
    let engine = RetargetEngine::new(&MIXAMO, &cache);
    let hips = model.skeleton.find("mixamorigHips").unwrap();
    let estimate = Vector3::new(0.2, 1.0, -0.4);
    let target = rigsync_retarget_core::retarget::rig_position(estimate, 1.0);

    let start = model.skeleton.position(hips).unwrap();
    let initial_gap = (start[1] - target[1]).abs();
    let eps = 1e-2f32;
    let n = (eps.ln() / (1.0f32 - 0.07).ln()).ceil() as usize;
    let mut out = WriteBatch::new();
    for _ in 0..n {
        engine
            .apply_position(&mut model.skeleton, SemanticBone::Hips, estimate, Damping::new(1.0, 0.07), &mut out)
            .unwrap();
    }
    let p = model.skeleton.position(hips).unwrap();
    assert!((p[1] - target[1]).abs() <= eps * initial_gap * 1.01);
    assert_eq!(out.len(), n);
    Ok(())
}

#[test]
fn half_body_frame_drives_upper_body_face_and_hands() -> anyhow::Result<()> {
    let mut model = load_model("mixamo_full")?;
    let mut ctx = RetargetContext::build(&model, &MIXAMO);
    let frame = load_frame()?;
    let config = RetargetConfig::default();

    let report = apply_frame(&mut model, &mut ctx, &MIXAMO, &config, TrackingTarget::Half, &frame);

    for bone in [
        "mixamorigNeck",
        "mixamorigHips",
        "mixamorigSpine2",
        "mixamorigSpine",
        "mixamorigRightArm",
        "mixamorigLeftForeArm",
        "mixamorigLeftHand",
        "mixamorigLeftHandIndex3",
    ] {
        assert!(report.writes.touches_bone(bone), "{bone} not written");
    }
    assert!(!report.writes.touches_bone("mixamorigLeftUpLeg"));
    assert!(!report.writes.touches_bone("mixamorigRightHandIndex1"));
    assert!(!report.writes.touches_bone("LeftEye"));

    // Right hand has 15 landmarks and is skipped as a whole.
    assert!(report
        .skipped
        .iter()
        .any(|e| matches!(e, RetargetError::MalformedEstimate { part, .. } if part == "RightHand")));

    // Open hand: the finger target is the solved rotation alone.
    let idx1 = rotation_of(&report.writes, "mixamorigLeftHandIndex1").unwrap();
    let solved = Euler::new(0.2, 0.0, 0.0, EulerOrder::XYZ).to_quat();
    approx(quat_angle([0.0, 0.0, 0.0, 1.0], idx1), 0.85 * 0.2, 1e-3);
    assert!(quat_angle(idx1, solved) < 0.05);

    let w = &report.weights;
    for channel in ["jawOpen", "Mouth_Open", "eyeBlinkLeft", "eyeBlinkRight", "EyeBlink"] {
        assert!(w.contains_key(channel), "{channel} missing");
    }
    // mouth target = max(0.08 × 4.5, 0.3 × 2.5) = 0.75; first step closes 0.6.
    approx(w["jawOpen"], 0.45, 1e-5);
    approx(w["EyeBlink"], (w["eyeBlinkLeft"] + w["eyeBlinkRight"]) / 2.0, 1e-6);
    assert!(w["eyeBlinkLeft"] > w["eyeBlinkRight"]);
    approx(model.morph_weight("Teeth", "Mouth_Open").unwrap(), 0.45, 1e-5);
    Ok(())
}

#[test]
fn face_target_touches_only_neck_and_morphs() -> anyhow::Result<()> {
    let mut model = load_model("mixamo_full")?;
    let mut ctx = RetargetContext::build(&model, &MIXAMO);
    let frame = load_frame()?;
    let report = apply_frame(
        &mut model,
        &mut ctx,
        &MIXAMO,
        &RetargetConfig::default(),
        TrackingTarget::Face,
        &frame,
    );
    let bones: Vec<&str> = report.writes.iter().filter_map(WriteOp::bone).collect();
    assert_eq!(bones, vec!["mixamorigNeck"]);
    assert!(!report.weights.is_empty());
    Ok(())
}

#[test]
fn full_target_adds_present_leg_estimates() -> anyhow::Result<()> {
    let mut model = load_model("mixamo_full")?;
    let mut ctx = RetargetContext::build(&model, &MIXAMO);
    let frame = load_frame()?;
    let report = apply_frame(
        &mut model,
        &mut ctx,
        &MIXAMO,
        &RetargetConfig::default(),
        TrackingTarget::Full,
        &frame,
    );
    assert!(report.writes.touches_bone("mixamorigLeftUpLeg"));
    assert!(report.writes.touches_bone("mixamorigLeftLeg"));
    assert!(!report.writes.touches_bone("mixamorigRightUpLeg"));
    Ok(())
}

#[test]
fn eye_bones_stand_in_for_missing_blink_channels() -> anyhow::Result<()> {
    let mut model = load_model("eye_bones_only")?;
    let mut ctx = RetargetContext::build(&model, &MIXAMO);
    assert!(ctx.pose_cache.is_empty());
    let frame = load_frame()?;
    let report = apply_frame(
        &mut model,
        &mut ctx,
        &MIXAMO,
        &RetargetConfig::default(),
        TrackingTarget::Face,
        &frame,
    );
    assert!(report.writes.touches_bone("Eye_L"));
    assert!(report.writes.touches_bone("Eye_R"));
    assert!(report.weights.contains_key("jawOpen"));
    assert!(!report.weights.keys().any(|k| k.to_lowercase().contains("blink")));
    assert!(report
        .skipped
        .iter()
        .all(|e| e.is_recoverable()));
    Ok(())
}

#[test]
fn context_rebuild_resets_smoothing() -> anyhow::Result<()> {
    let mut model = load_model("mixamo_full")?;
    let mut ctx = RetargetContext::build(&model, &MIXAMO);
    let frame = load_frame()?;
    let config = RetargetConfig::default();
    for _ in 0..5 {
        apply_frame(&mut model, &mut ctx, &MIXAMO, &config, TrackingTarget::Face, &frame);
    }
    assert!(ctx.smoother.state.mouth_open > 0.7);

    let ctx = RetargetContext::build(&model, &MIXAMO);
    assert_eq!(ctx.smoother.state.mouth_open, 0.0);
    let summary = ctx.summary(&model);
    assert_eq!(summary.cached_joints, 12);
    assert!(summary.left_hand && summary.right_hand);
    Ok(())
}
