//! User-facing status messages and mode notifications.

use log::{error, info};
use serde::{Deserialize, Serialize};

use rigsync_animation_core::PlaybackState;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Idle,
    Tracking,
    Playing,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Tracking => "tracking",
            Mode::Playing => "playing",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub severity: Severity,
    pub text: String,
}

impl StatusMessage {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

/// Emitted whenever mode, playing flag or current clip may have changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub mode: Mode,
    pub is_playing: bool,
    pub current_clip: Option<String>,
}

impl Notification {
    pub fn new(mode: Mode, playback: &PlaybackState) -> Self {
        Self {
            mode,
            is_playing: playback.is_playing,
            current_clip: playback.current_clip.clone(),
        }
    }
}

/// Pending messages and notifications, drained once per tick.
#[derive(Debug, Default)]
pub struct StatusQueue {
    messages: Vec<StatusMessage>,
    notifications: Vec<Notification>,
    last: Option<Notification>,
}

impl StatusQueue {
    /// Queue a message and mirror it to the log.
    pub fn push(&mut self, severity: Severity, text: impl Into<String>) {
        let msg = StatusMessage::new(severity, text);
        match msg.severity {
            Severity::Error => error!("{}", msg.text),
            Severity::Info | Severity::Success => info!("{}", msg.text),
        }
        self.messages.push(msg);
    }

    /// Queue `n` unless it equals the last notification queued.
    pub fn notify(&mut self, n: Notification) {
        if self.last.as_ref() == Some(&n) {
            return;
        }
        self.last = Some(n.clone());
        self.notifications.push(n);
    }

    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&StatusMessage> {
        self.messages.last()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn drain(&mut self) -> (Vec<StatusMessage>, Vec<Notification>) {
        (
            std::mem::take(&mut self.messages),
            std::mem::take(&mut self.notifications),
        )
    }
}
