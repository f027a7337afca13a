use std::cell::Cell;
use std::rc::Rc;

use rigsync_orchestrator::{
    CaptureDevice, CaptureDeviceError, CaptureStream, Mode, ModeController, ModeError, Notification,
    OrchestratorConfig, Severity, StatusMessage,
};
use rigsync_retarget_core::{FrameEstimate, TrackingTarget};

#[derive(Default)]
struct Counters {
    opens: Cell<u32>,
    stops: Cell<u32>,
}

struct FakeStream(Rc<Counters>);

impl CaptureStream for FakeStream {
    fn stop_all_tracks(&mut self) {
        self.0.stops.set(self.0.stops.get() + 1);
    }
}

struct FakeCamera {
    counters: Rc<Counters>,
    fail: Option<CaptureDeviceError>,
}

impl FakeCamera {
    fn working() -> Self {
        Self {
            counters: Rc::new(Counters::default()),
            fail: None,
        }
    }

    fn failing(err: CaptureDeviceError) -> Self {
        Self {
            counters: Rc::new(Counters::default()),
            fail: Some(err),
        }
    }

    fn opens(&self) -> u32 {
        self.counters.opens.get()
    }

    fn stops(&self) -> u32 {
        self.counters.stops.get()
    }
}

impl CaptureDevice for FakeCamera {
    fn open(&mut self) -> Result<Box<dyn CaptureStream>, CaptureDeviceError> {
        self.counters.opens.set(self.counters.opens.get() + 1);
        match &self.fail {
            Some(err) => Err(err.clone()),
            None => Ok(Box::new(FakeStream(Rc::clone(&self.counters)))),
        }
    }
}

fn controller_with_clips() -> anyhow::Result<ModeController> {
    let mut ctl = ModeController::new(OrchestratorConfig::default());
    let model = rigsync_test_fixtures::models::json("mixamo_full")?;
    ctl.load_model_json("Remy.fbx", &model)?;
    let clips = rigsync_test_fixtures::clips::json("dance_pack")?;
    ctl.ingest_clips("Dance Pack.fbx", &clips)?;
    ctl.update(0.0);
    Ok(ctl)
}

fn frame() -> anyhow::Result<FrameEstimate> {
    rigsync_test_fixtures::estimates::load("upper_body_frame")
}

fn status(severity: Severity, text: &str) -> StatusMessage {
    StatusMessage::new(severity, text)
}

#[test]
fn operations_without_a_model_fail_before_side_effects() {
    let mut ctl = ModeController::default();
    let mut cam = FakeCamera::working();

    assert_eq!(ctl.start_tracking(&mut cam), Err(ModeError::NoModelLoaded));
    assert_eq!(cam.opens(), 0);
    assert_eq!(ctl.mode(), Mode::Idle);
    assert_eq!(
        ctl.last_status(),
        Some(&status(Severity::Error, "Please load a model first!"))
    );

    assert_eq!(ctl.start_playback("Wave"), Err(ModeError::NoModelLoaded));
    assert_eq!(ctl.last_status(), Some(&status(Severity::Error, "No animation selected!")));
    assert!(matches!(
        ctl.ingest_clips("Wave.fbx", "{}"),
        Err(ModeError::NoModelLoaded)
    ));
    assert!(!ctl.is_playing());

    let tick = ctl.update(0.016);
    assert!(tick.writes.is_empty());
    assert_eq!(tick.statuses.len(), 3);
}

#[test]
fn tracking_and_playback_exclude_each_other() -> anyhow::Result<()> {
    let mut ctl = controller_with_clips()?;
    let mut cam = FakeCamera::working();

    ctl.start_playback("Wave").expect("wave plays");
    assert_eq!(ctl.mode(), Mode::Playing);
    assert!(ctl.is_playing());

    ctl.start_tracking(&mut cam).expect("tracking starts");
    assert_eq!(ctl.mode(), Mode::Tracking);
    assert!(!ctl.is_playing());
    assert!(ctl.capture_active());
    assert_eq!(ctl.playback_state().current_clip, None);

    ctl.start_playback("Wave").expect("wave plays again");
    assert_eq!(ctl.mode(), Mode::Playing);
    assert!(ctl.is_playing());
    assert!(!ctl.capture_active());
    assert_eq!(cam.stops(), 1);

    let tick = ctl.update(0.016);
    let texts: Vec<&str> = tick.statuses.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Playing: Wave",
            "Animation stopped",
            "Tracking started! Move in front of the camera.",
            "Tracking stopped",
            "Playing: Wave",
        ]
    );
    assert_eq!(
        tick.notifications.last(),
        Some(&Notification {
            mode: Mode::Playing,
            is_playing: true,
            current_clip: Some("Wave".into()),
        })
    );
    Ok(())
}

#[test]
fn duplicate_start_reports_and_changes_nothing() -> anyhow::Result<()> {
    let mut ctl = controller_with_clips()?;
    let mut cam = FakeCamera::working();
    ctl.start_tracking(&mut cam).unwrap();
    assert_eq!(ctl.start_tracking(&mut cam), Ok(()));
    assert_eq!(cam.opens(), 1);
    assert_eq!(
        ctl.last_status(),
        Some(&status(Severity::Info, "Tracking is already running!"))
    );
    assert!(ctl.capture_active());
    Ok(())
}

#[test]
fn camera_failure_keeps_current_mode() -> anyhow::Result<()> {
    let mut ctl = controller_with_clips()?;
    ctl.start_playback("Wave").unwrap();

    let mut denied = FakeCamera::failing(CaptureDeviceError::Denied);
    assert_eq!(
        ctl.start_tracking(&mut denied),
        Err(ModeError::Capture(CaptureDeviceError::Denied))
    );
    assert_eq!(ctl.mode(), Mode::Playing);
    assert!(ctl.is_playing());
    assert_eq!(
        ctl.last_status(),
        Some(&status(
            Severity::Error,
            "Camera access denied. Please allow camera access and try again."
        ))
    );

    let mut other = FakeCamera::failing(CaptureDeviceError::Other("device busy".into()));
    assert!(ctl.start_tracking(&mut other).is_err());
    assert_eq!(
        ctl.last_status().map(|s| s.text.as_str()),
        Some("Error starting camera: device busy")
    );
    Ok(())
}

#[test]
fn one_inference_in_flight_and_applied_on_update() -> anyhow::Result<()> {
    let mut ctl = controller_with_clips()?;
    let mut cam = FakeCamera::working();

    // Not tracking yet.
    assert!(!ctl.begin_inference());
    assert!(!ctl.submit_estimate(frame()?));

    ctl.start_tracking(&mut cam).unwrap();
    assert!(ctl.begin_inference());
    assert!(!ctl.begin_inference());
    assert!(ctl.submit_estimate(frame()?));
    // Result not yet consumed.
    assert!(!ctl.begin_inference());

    let tick = ctl.update(0.016);
    assert_eq!(tick.mode, Mode::Tracking);
    assert!(tick.writes.touches_bone("mixamorigNeck"));
    assert!(!tick.writes.touches_bone("mixamorigHips"), "face target leaves the body alone");
    assert!(tick.weights.contains_key("jawOpen"));

    // Nothing pending: the next tick writes nothing.
    assert!(ctl.update(0.016).writes.is_empty());

    assert!(ctl.begin_inference());
    ctl.abandon_inference();
    assert!(ctl.begin_inference());
    ctl.stop_tracking();
    assert!(!ctl.submit_estimate(frame()?));
    assert!(ctl.update(0.016).writes.is_empty());
    Ok(())
}

#[test]
fn tracking_target_widens_coverage() -> anyhow::Result<()> {
    let mut ctl = controller_with_clips()?;
    let mut cam = FakeCamera::working();
    ctl.set_tracking_target(TrackingTarget::Half);
    ctl.start_tracking(&mut cam).unwrap();
    assert!(ctl.begin_inference());
    ctl.submit_estimate(frame()?);
    let tick = ctl.update(0.016);
    assert!(tick.writes.touches_bone("mixamorigHips"));
    assert!(tick.writes.touches_bone("mixamorigLeftHandIndex1"));
    assert!(!tick.writes.touches_bone("mixamorigLeftUpLeg"));
    assert!(tick.skipped > 0);
    Ok(())
}

#[test]
fn playback_ticks_respect_the_delta_gate() -> anyhow::Result<()> {
    let mut ctl = controller_with_clips()?;
    ctl.start_playback("Wave").unwrap();
    assert!(ctl.update(0.15).writes.is_empty());
    assert!(ctl.update(0.0).writes.is_empty());
    let tick = ctl.update(0.033);
    assert!(tick.writes.touches_bone("mixamorigRightArm"));
    assert!((ctl.playback_state().elapsed - 0.033).abs() < 1e-6);

    ctl.select_clip(None).unwrap();
    assert_eq!(ctl.mode(), Mode::Idle);
    assert_eq!(ctl.last_status(), Some(&status(Severity::Info, "Animation stopped")));
    assert_eq!(
        ctl.start_playback("Nope"),
        Err(ModeError::ClipNotFound { name: "Nope".into() })
    );
    Ok(())
}

#[test]
fn loading_a_model_resets_everything() -> anyhow::Result<()> {
    let mut ctl = controller_with_clips()?;
    let mut cam = FakeCamera::working();
    ctl.start_tracking(&mut cam).unwrap();
    assert!(ctl.begin_inference());

    let model = rigsync_test_fixtures::models::json("eye_bones_only")?;
    let summary = ctl.load_model_json("Eye  Rig.fbx", &model)?;

    assert_eq!(ctl.mode(), Mode::Idle);
    assert!(!ctl.capture_active());
    assert_eq!(cam.stops(), 1);
    assert!(!ctl.inference_in_flight());
    assert_eq!(summary.cached_joints, 0);
    assert!(summary.eye_bones);
    assert_eq!(ctl.library().names(), vec!["Eye Rig".to_string()]);
    assert_eq!(
        ctl.last_status(),
        Some(&status(Severity::Success, "Model loaded successfully!"))
    );

    ctl.start_playback("Eye Rig").unwrap();
    assert!(ctl.update(0.05).writes.touches_bone("Head"));
    Ok(())
}

#[test]
fn broken_model_changes_nothing() -> anyhow::Result<()> {
    let mut ctl = controller_with_clips()?;
    ctl.start_playback("Wave").unwrap();
    let err = ctl.load_model_json("bad.fbx", "{ \"skeleton\": 3 }").unwrap_err();
    assert!(matches!(err, ModeError::InvalidModel { .. }));
    assert_eq!(ctl.mode(), Mode::Playing);
    assert_eq!(ctl.library().len(), 2);
    assert!(ctl
        .last_status()
        .map_or(false, |s| s.severity == Severity::Error && s.text.starts_with("Error loading model:")));
    Ok(())
}

#[test]
fn shutdown_and_drop_release_the_camera() -> anyhow::Result<()> {
    let mut cam = FakeCamera::working();
    {
        let mut ctl = controller_with_clips()?;
        ctl.start_tracking(&mut cam).unwrap();
        ctl.shutdown();
        assert_eq!(cam.stops(), 1);
        assert_eq!(ctl.mode(), Mode::Idle);
        ctl.start_tracking(&mut cam).unwrap();
    }
    assert_eq!(cam.stops(), 2);
    Ok(())
}
