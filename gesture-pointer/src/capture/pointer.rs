//! Consumer façade tying the capture thread to the hand tracker.

use std::sync::Arc;
use tracing::info;

use super::mailbox::DetectionMailbox;
use super::pipeline::CapturePipeline;
use super::source::{FrameSource, LandmarkDetector};
use super::{CaptureConfig, CaptureError, Clock};
use crate::hand::{GestureOutput, HandTracker, TrackerConfig};

/// Gesture input device.  Call `process` once per rendered frame.
pub struct GesturePointer {
    tracker: HandTracker,
    mailbox: Arc<DetectionMailbox>,
    pipeline: Option<CapturePipeline>,
    capture: CaptureConfig,
}

impl GesturePointer {
    pub fn new(tracker: TrackerConfig, capture: CaptureConfig) -> Self {
        Self {
            tracker: HandTracker::new(tracker),
            mailbox: Arc::new(DetectionMailbox::new()),
            pipeline: None,
            capture,
        }
    }

    /// Start capturing.  Tracking restarts from scratch: the first hand
    /// seen snaps the cursor.
    pub fn start<S, D>(&mut self, source: S, detector: D, clock: Clock) -> Result<(), CaptureError>
    where
        S: FrameSource + 'static,
        D: LandmarkDetector + 'static,
    {
        if self.pipeline.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        self.tracker.clear();
        self.tracker.request_reset();
        let pipeline = CapturePipeline::start(
            source,
            detector,
            Arc::clone(&self.mailbox),
            self.capture.clone(),
            clock,
        )?;
        self.pipeline = Some(pipeline);
        Ok(())
    }

    /// Stop capturing and drop the tracked hand.  Returns true if a click
    /// was in progress and downstream is owed a release.
    pub fn stop(&mut self) -> bool {
        if let Some(mut pipeline) = self.pipeline.take() {
            pipeline.stop();
        }
        let owed = self.tracker.clear();
        if owed {
            info!("gesture pointer stopped mid-click");
        }
        owed
    }

    /// Fold in the newest detection, if any, then advance to `now_ms`.
    pub fn process(&mut self, now_ms: i64) -> GestureOutput {
        if let Some(detection) = self.mailbox.take_latest() {
            self.tracker.ingest(&detection);
        }
        self.tracker.process(now_ms)
    }

    /// The mailbox detections are delivered through.  Lets callers feed
    /// detections from their own producer instead of a `CapturePipeline`.
    pub fn mailbox(&self) -> Arc<DetectionMailbox> {
        Arc::clone(&self.mailbox)
    }

    pub fn tracker(&self) -> &HandTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut HandTracker {
        &mut self.tracker
    }

    pub fn pipeline(&self) -> Option<&CapturePipeline> {
        self.pipeline.as_ref()
    }

    /// Whether the capture thread is still producing frames.
    pub fn is_capturing(&self) -> bool {
        self.pipeline.as_ref().is_some_and(|p| p.is_running())
    }

    /// Whether capture has ended and every detection it produced has been
    /// read: nothing is in flight and the mailbox slot is empty.
    pub fn is_drained(&self) -> bool {
        !self.is_capturing() && !self.mailbox.is_busy() && self.mailbox.is_empty()
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        let capture = match &self.pipeline {
            Some(p) => format!(
                "(:running {} :read {} :submitted {} :skipped {})",
                if p.is_running() { "t" } else { "nil" },
                p.frames_read(),
                p.frames_submitted(),
                p.frames_skipped(),
            ),
            None => "nil".to_string(),
        };
        format!(
            "(:tracker {} :capture {} :posted {} :overwritten {})",
            self.tracker.status_sexp(),
            capture,
            self.mailbox.posted(),
            self.mailbox.overwritten(),
        )
    }
}

impl Default for GesturePointer {
    fn default() -> Self {
        Self::new(TrackerConfig::default(), CaptureConfig::default())
    }
}
