//! rigsync-orchestrator
//!
//! Coordinates live retargeting and clip playback on one loaded rig. Tracking
//! and playback are mutually exclusive; [`ModeController`] enforces that,
//! scopes the camera to the `Tracking` mode and turns solver results and
//! display ticks into one [`TickFrame`] per `update`.

pub mod asset;
pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod status;

pub use crate::asset::ModelAsset;
pub use crate::capture::{CaptureDevice, CaptureSession, CaptureStream};
pub use crate::config::OrchestratorConfig;
pub use crate::controller::{ModeController, TickFrame};
pub use crate::error::{CaptureDeviceError, ModeError};
pub use crate::status::{Mode, Notification, Severity, StatusMessage, StatusQueue};
