//! Tracking/playback state machine.
//!
//! The controller owns the rig and everything derived from it. Hosts drive it
//! from one thread: commands at any time, estimates through the inference
//! gate, and one `update(dt)` per display tick. Skeletal writes happen only
//! inside `update`, so the renderer reads a settled rig after it returns.

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use rigsync_animation_core::{AnimationPlaybackController, ClipLibrary, IngestReport, PlaybackState};
use rigsync_api_core::WriteBatch;
use rigsync_retarget_core::{
    apply_frame, ContextSummary, FrameEstimate, RetargetContext, RigModel, TrackingTarget,
};

use crate::asset::ModelAsset;
use crate::capture::{CaptureDevice, CaptureSession};
use crate::config::OrchestratorConfig;
use crate::error::ModeError;
use crate::status::{Mode, Notification, Severity, StatusMessage, StatusQueue};

/// Everything one `update` produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickFrame {
    pub epoch: u64,
    pub dt: f32,
    pub mode: Mode,
    /// Joint and morph writes in application order.
    pub writes: WriteBatch,
    /// Blendshape weights keyed by channel name (tracking only).
    pub weights: IndexMap<String, f32>,
    /// Sub-computations skipped this tick (absent bones, malformed input).
    pub skipped: usize,
    pub statuses: Vec<StatusMessage>,
    pub notifications: Vec<Notification>,
}

#[derive(Debug)]
struct LoadedRig {
    model: RigModel,
    context: RetargetContext,
}

#[derive(Debug)]
pub struct ModeController {
    config: OrchestratorConfig,
    rig: Option<LoadedRig>,
    library: ClipLibrary,
    playback: AnimationPlaybackController,
    capture: Option<CaptureSession>,
    mode: Mode,
    inference_in_flight: bool,
    pending: Option<FrameEstimate>,
    epoch: u64,
    status: StatusQueue,
}

impl ModeController {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            config,
            rig: None,
            library: ClipLibrary::new(),
            playback: AnimationPlaybackController::new(),
            capture: None,
            mode: Mode::Idle,
            inference_in_flight: false,
            pending: None,
            epoch: 0,
            status: StatusQueue::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_tracking(&self) -> bool {
        self.mode == Mode::Tracking
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn has_model(&self) -> bool {
        self.rig.is_some()
    }

    pub fn model(&self) -> Option<&RigModel> {
        self.rig.as_ref().map(|r| &r.model)
    }

    pub fn context_summary(&self) -> Option<ContextSummary> {
        self.rig.as_ref().map(|r| r.context.summary(&r.model))
    }

    pub fn library(&self) -> &ClipLibrary {
        &self.library
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn tracking_target(&self) -> TrackingTarget {
        self.config.tracking_target
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn capture_active(&self) -> bool {
        self.capture.as_ref().map_or(false, CaptureSession::is_active)
    }

    pub fn inference_in_flight(&self) -> bool {
        self.inference_in_flight
    }

    /// Messages queued since the last `update`.
    pub fn statuses(&self) -> &[StatusMessage] {
        self.status.messages()
    }

    pub fn last_status(&self) -> Option<&StatusMessage> {
        self.status.last_message()
    }

    pub fn notification(&self) -> Notification {
        Notification::new(self.mode, &self.playback.state())
    }

    fn notify(&mut self) {
        let n = self.notification();
        self.status.notify(n);
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            info!("mode {} -> {}", self.mode.as_str(), mode.as_str());
            self.mode = mode;
        }
    }

    // ---------- model ----------

    /// Replace the rig. Stops tracking and playback, rebuilds the retarget
    /// context, replaces the clip library with the asset's clips and returns
    /// to `Idle`. A rig that fails to build changes nothing.
    pub fn load_model(&mut self, source: &str, asset: ModelAsset) -> Result<ContextSummary, ModeError> {
        let model = match RigModel::from_desc(asset.rig) {
            Ok(model) => model,
            Err(err) => return Err(self.model_error(err.to_string())),
        };

        self.stop_tracking();
        self.stop_playback();

        let context = RetargetContext::build(&model, &self.config.mapping);
        let summary = context.summary(&model);
        self.rig = Some(LoadedRig { model, context });

        self.library.clear();
        if !asset.clips.is_empty() {
            let report = self.library.ingest(source, asset.clips);
            debug!("{source}: {} embedded clip(s) available", report.added().count());
        }

        self.set_mode(Mode::Idle);
        self.status.push(Severity::Success, "Model loaded successfully!");
        self.notify();
        Ok(summary)
    }

    pub fn load_model_json(&mut self, source: &str, json: &str) -> Result<ContextSummary, ModeError> {
        match ModelAsset::from_json(json) {
            Ok(asset) => self.load_model(source, asset),
            Err(err) => Err(self.model_error(err.to_string())),
        }
    }

    fn model_error(&mut self, reason: String) -> ModeError {
        self.precondition(ModeError::InvalidModel { reason })
    }

    /// Add clips from a clip file to the library. Requires a loaded model.
    pub fn ingest_clips(&mut self, source: &str, json: &str) -> Result<IngestReport, ModeError> {
        if self.rig.is_none() {
            return Err(self.precondition(ModeError::NoModelLoaded));
        }
        match self.library.ingest_json(source, json) {
            Ok(report) => {
                let severity = if report.found_any() {
                    Severity::Success
                } else {
                    Severity::Error
                };
                self.status.push(severity, report.message());
                Ok(report)
            }
            Err(err) => Err(self.precondition(ModeError::Clip(err))),
        }
    }

    fn precondition(&mut self, err: ModeError) -> ModeError {
        self.status.push(Severity::Error, err.to_string());
        err
    }

    // ---------- tracking ----------

    /// Enter `Tracking`. The device is opened before playback is stopped, so
    /// a camera failure leaves playback running.
    pub fn start_tracking(&mut self, device: &mut dyn CaptureDevice) -> Result<(), ModeError> {
        if self.mode == Mode::Tracking {
            self.status.push(Severity::Info, "Tracking is already running!");
            return Ok(());
        }
        if self.rig.is_none() {
            return Err(self.precondition(ModeError::NoModelLoaded));
        }
        let session = match CaptureSession::acquire(device) {
            Ok(session) => session,
            Err(err) => return Err(self.precondition(ModeError::Capture(err))),
        };

        if self.mode == Mode::Playing || self.playback.is_playing() {
            self.stop_playback();
        }

        self.capture = Some(session);
        self.inference_in_flight = false;
        self.pending = None;
        self.set_mode(Mode::Tracking);
        self.status
            .push(Severity::Success, "Tracking started! Move in front of the camera.");
        self.notify();
        Ok(())
    }

    /// Leave `Tracking` and release the camera. Returns false when not tracking.
    pub fn stop_tracking(&mut self) -> bool {
        let released = self.capture.as_mut().map_or(false, CaptureSession::release);
        self.capture = None;
        self.inference_in_flight = false;
        self.pending = None;
        if self.mode != Mode::Tracking && !released {
            return false;
        }
        if self.mode == Mode::Tracking {
            self.set_mode(Mode::Idle);
        }
        self.status.push(Severity::Info, "Tracking stopped");
        self.notify();
        true
    }

    pub fn set_tracking_target(&mut self, target: TrackingTarget) {
        if self.config.tracking_target != target {
            info!("tracking target -> {target}");
            self.config.tracking_target = target;
        }
    }

    /// Admit the next capture frame to the solver. At most one inference is
    /// in flight, and only while tracking with no unconsumed result.
    pub fn begin_inference(&mut self) -> bool {
        if self.mode != Mode::Tracking || self.inference_in_flight || self.pending.is_some() {
            return false;
        }
        self.inference_in_flight = true;
        true
    }

    /// Hand over a solver result for the next `update`. Results arriving
    /// after tracking stopped, or without an admitted inference, are dropped.
    pub fn submit_estimate(&mut self, frame: FrameEstimate) -> bool {
        if !self.inference_in_flight {
            debug!("dropping estimate: no inference in flight");
            return false;
        }
        self.inference_in_flight = false;
        if self.mode != Mode::Tracking {
            debug!("dropping estimate: tracking stopped");
            return false;
        }
        self.pending = Some(frame);
        true
    }

    /// The solver failed on the admitted frame; allow the next one.
    pub fn abandon_inference(&mut self) {
        self.inference_in_flight = false;
    }

    // ---------- playback ----------

    /// Play the named library clip from the start, looping. Leaves
    /// `Tracking` first if needed.
    pub fn start_playback(&mut self, name: &str) -> Result<(), ModeError> {
        if self.rig.is_none() {
            self.status.push(Severity::Error, "No animation selected!");
            return Err(ModeError::NoModelLoaded);
        }
        let Some((_, clip)) = self.library.find_by_name(name) else {
            self.status.push(Severity::Error, "No animation selected!");
            return Err(ModeError::ClipNotFound { name: name.to_string() });
        };

        if self.mode == Mode::Tracking {
            self.stop_tracking();
        }

        let Some(rig) = self.rig.as_ref() else {
            return Err(ModeError::NoModelLoaded);
        };
        self.playback.select(clip, &rig.model.skeleton);
        self.set_mode(Mode::Playing);
        self.status.push(Severity::Success, format!("Playing: {name}"));
        self.notify();
        Ok(())
    }

    /// Select a clip by name, or clear the selection (stopping playback).
    pub fn select_clip(&mut self, name: Option<&str>) -> Result<(), ModeError> {
        match name {
            Some(name) => self.start_playback(name),
            None => {
                self.stop_playback();
                Ok(())
            }
        }
    }

    /// Stop playback and clear the current clip. Returns false when nothing played.
    pub fn stop_playback(&mut self) -> bool {
        let had_action = self.playback.current_clip().is_some();
        self.playback.stop();
        if !had_action && self.mode != Mode::Playing {
            return false;
        }
        if self.mode == Mode::Playing {
            self.set_mode(Mode::Idle);
        }
        self.status.push(Severity::Info, "Animation stopped");
        self.notify();
        true
    }

    // ---------- tick ----------

    /// Advance one display tick: apply the pending estimate while tracking,
    /// or advance the clip while playing. Drains queued statuses.
    pub fn update(&mut self, dt: f32) -> TickFrame {
        self.epoch = self.epoch.wrapping_add(1);
        let mut frame = TickFrame {
            epoch: self.epoch,
            dt,
            ..TickFrame::default()
        };

        match (self.mode, self.rig.as_mut()) {
            (Mode::Tracking, Some(rig)) => {
                if let Some(estimate) = self.pending.take() {
                    let report = apply_frame(
                        &mut rig.model,
                        &mut rig.context,
                        &self.config.mapping,
                        &self.config.retarget,
                        self.config.tracking_target,
                        &estimate,
                    );
                    frame.writes = report.writes;
                    frame.weights = report.weights;
                    frame.skipped = report.skipped.len();
                }
            }
            (Mode::Playing, Some(rig)) => {
                self.playback
                    .advance(dt, &mut rig.model.skeleton, &mut frame.writes);
            }
            _ => {}
        }

        frame.mode = self.mode;
        let (statuses, notifications) = self.status.drain();
        frame.statuses = statuses;
        frame.notifications = notifications;
        frame
    }

    /// Stop tracking and playback and release the camera.
    pub fn shutdown(&mut self) {
        self.stop_tracking();
        self.stop_playback();
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

impl Drop for ModeController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
