//! Camera acquisition as a scoped resource.
//!
//! A `CaptureSession` owns an open stream and stops all of its tracks when
//! released or dropped, so leaving `Tracking` by any path frees the device.

use std::fmt;

use log::{debug, warn};

use crate::error::CaptureDeviceError;

/// An open capture stream (one or more device tracks).
pub trait CaptureStream {
    fn stop_all_tracks(&mut self);
}

/// Something that can open a capture stream: a webcam, a file, a test double.
pub trait CaptureDevice {
    fn open(&mut self) -> Result<Box<dyn CaptureStream>, CaptureDeviceError>;
}

pub struct CaptureSession {
    stream: Option<Box<dyn CaptureStream>>,
}

impl CaptureSession {
    pub fn acquire(device: &mut dyn CaptureDevice) -> Result<Self, CaptureDeviceError> {
        match device.open() {
            Ok(stream) => {
                debug!("capture stream opened");
                Ok(Self {
                    stream: Some(stream),
                })
            }
            Err(err) => {
                warn!("capture device unavailable: {err}");
                Err(err)
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Stop all tracks. Returns false if already released.
    pub fn release(&mut self) -> bool {
        match self.stream.take() {
            Some(mut stream) => {
                stream.stop_all_tracks();
                debug!("capture stream released");
                true
            }
            None => false,
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("active", &self.is_active())
            .finish()
    }
}
