//! The capture thread.
//!
//! Owns the frame source and the detector.  Each frame read while no
//! detection is in flight is preprocessed, stamped with the shared clock
//! and submitted; frames read while the detector is busy are dropped.
//! A read error or end of stream ends the thread; the consumer notices
//! only through the tracking timeout.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

use super::mailbox::DetectionMailbox;
use super::source::{FrameSource, LandmarkDetector};
use super::{CaptureConfig, CaptureError, Clock};

/// Counters shared with the capture thread.
#[derive(Debug, Default)]
struct CaptureCounters {
    frames_read: AtomicU64,
    frames_submitted: AtomicU64,
    frames_skipped: AtomicU64,
}

/// Handle on a running capture thread.
pub struct CapturePipeline {
    mailbox: Arc<DetectionMailbox>,
    running: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    counters: Arc<CaptureCounters>,
    handle: Option<JoinHandle<()>>,
}

impl CapturePipeline {
    /// Open `source` and start capturing into `mailbox`.
    ///
    /// The device is opened on the calling thread so a missing camera is
    /// reported here rather than lost inside the capture thread.
    pub fn start<S, D>(
        mut source: S,
        mut detector: D,
        mailbox: Arc<DetectionMailbox>,
        config: CaptureConfig,
        clock: Clock,
    ) -> Result<Self, CaptureError>
    where
        S: FrameSource + 'static,
        D: LandmarkDetector + 'static,
    {
        let name = source.name();
        if let Err(e) = source.open() {
            error!("capture device {} failed to open: {}", name, e);
            return Err(e);
        }
        info!(
            "capture started on {} (flip: {})",
            name, config.horizontal_flip
        );

        mailbox.reopen();
        let running = Arc::new(AtomicBool::new(true));
        let finished = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(CaptureCounters::default());

        let handle = {
            let mailbox = Arc::clone(&mailbox);
            let running = Arc::clone(&running);
            let finished = Arc::clone(&finished);
            let counters = Arc::clone(&counters);
            std::thread::Builder::new()
                .name("gesture-capture".into())
                .spawn(move || {
                    while running.load(Ordering::Acquire) {
                        let mut frame = match source.read() {
                            Ok(Some(f)) => f,
                            Ok(None) => {
                                info!("capture stream {} ended", name);
                                break;
                            }
                            Err(e) => {
                                warn!("capture stopped: {}", e);
                                break;
                            }
                        };
                        frame.sequence = counters.frames_read.fetch_add(1, Ordering::Relaxed);

                        let Some(generation) = mailbox.try_begin() else {
                            counters.frames_skipped.fetch_add(1, Ordering::Relaxed);
                            continue;
                        };

                        let timestamp_ms = clock.now_ms();
                        let frame = frame.preprocess(config.horizontal_flip);
                        let sink = Arc::clone(&mailbox);
                        detector.detect_async(
                            frame,
                            timestamp_ms,
                            Box::new(move |detection| {
                                sink.post(generation, detection);
                            }),
                        );
                        counters.frames_submitted.fetch_add(1, Ordering::Relaxed);
                    }
                    source.close();
                    finished.store(true, Ordering::Release);
                    debug!("capture thread exiting");
                })
                .map_err(CaptureError::Spawn)?
        };

        Ok(Self {
            mailbox,
            running,
            finished,
            counters,
            handle: Some(handle),
        })
    }

    /// Halt the capture loop and release the device.  Blocks until the
    /// capture thread has exited.  Detections still in flight are
    /// discarded when they arrive.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.running.store(false, Ordering::Release);
        self.mailbox.stop();
        if handle.join().is_err() {
            error!("capture thread panicked");
        }
        info!(
            "capture stopped: {} read, {} submitted, {} skipped",
            self.frames_read(),
            self.frames_submitted(),
            self.frames_skipped()
        );
    }

    /// Whether the capture thread is still reading frames.
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.finished.load(Ordering::Acquire)
    }

    pub fn frames_read(&self) -> u64 {
        self.counters.frames_read.load(Ordering::Relaxed)
    }

    pub fn frames_submitted(&self) -> u64 {
        self.counters.frames_submitted.load(Ordering::Relaxed)
    }

    /// Frames dropped because a detection was still in flight.
    pub fn frames_skipped(&self) -> u64 {
        self.counters.frames_skipped.load(Ordering::Relaxed)
    }
}

impl Drop for CapturePipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Tests ──────────────────────────────────────────────────
