//! Capture context: camera frames in, landmark detections out.
//!
//! Provides:
//! - `mailbox`: single-slot, latest-value-wins handoff to the consumer
//! - `source`: frame source and detector traits, frame preprocessing
//! - `pipeline`: the capture thread
//! - `pointer`: consumer façade that drains the mailbox once per frame

pub mod mailbox;
pub mod pipeline;
pub mod pointer;
pub mod source;

pub use mailbox::DetectionMailbox;
pub use pipeline::CapturePipeline;
pub use pointer::GesturePointer;
pub use source::{CameraFrame, DetectionCallback, FrameSource, LandmarkDetector, PixelFormat};

use std::time::Instant;

/// Capture device errors.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to open capture device {device}: {reason}")]
    DeviceOpen { device: String, reason: String },

    #[error("capture device read failed: {0}")]
    DeviceRead(String),

    #[error("capture pipeline already started")]
    AlreadyStarted,

    #[error("failed to spawn capture thread: {0}")]
    Spawn(std::io::Error),
}

/// Capture-side settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Mirror frames horizontally before detection, so moving the hand
    /// right moves the cursor right when facing the camera.
    pub horizontal_flip: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            horizontal_flip: true,
        }
    }
}

/// Monotonic millisecond clock shared by the capture thread and the
/// consumer loop, so detection and frame timestamps are comparable.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    epoch: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Milliseconds since the clock was created.
    pub fn now_ms(&self) -> i64 {
        i64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
