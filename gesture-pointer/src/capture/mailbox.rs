//! Single-slot detection mailbox between the capture thread and the
//! consumer loop.
//!
//! The detector callback writes the newest detection into the slot,
//! overwriting anything unread.  The consumer takes it without blocking on
//! new results.  A busy flag keeps at most one detection request in flight.
//!
//! Every capture session gets its own generation.  `try_begin` hands the
//! current generation to the request it admits, and the callback passes it
//! back to `post`.  Stopping or reopening moves to a new generation, so a
//! callback from an earlier session is discarded and cannot clear the busy
//! flag of the session that replaced it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

use crate::hand::RawDetection;

#[derive(Debug, Default)]
pub struct DetectionMailbox {
    slot: Mutex<Option<RawDetection>>,
    generation: AtomicU64,
    busy: AtomicBool,
    stopped: AtomicBool,
    posted: AtomicU64,
    overwritten: AtomicU64,
    discarded: AtomicU64,
}

impl DetectionMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<RawDetection>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the in-flight slot for the current session.  Returns the
    /// session generation to hand back to `post`, or `None` if a request is
    /// already outstanding or the mailbox is stopped.
    pub fn try_begin(&self) -> Option<u64> {
        let _slot = self.lock();
        if self.stopped.load(Ordering::Acquire) {
            return None;
        }
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(self.generation.load(Ordering::Acquire))
    }

    /// Deliver a detection for the request admitted under `generation` and
    /// release the in-flight slot.  Returns false if the mailbox was stopped
    /// or has moved on to a later session; the detection is discarded and
    /// the busy flag is left to the current session.
    pub fn post(&self, generation: u64, detection: RawDetection) -> bool {
        {
            let mut slot = self.lock();
            if self.stopped.load(Ordering::Acquire)
                || self.generation.load(Ordering::Acquire) != generation
            {
                trace!(
                    "late detection at {} from generation {} discarded",
                    detection.timestamp_ms,
                    generation
                );
                self.discarded.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            if slot.is_some() {
                self.overwritten.fetch_add(1, Ordering::Relaxed);
            }
            *slot = Some(detection);
            self.busy.store(false, Ordering::Release);
        }
        self.posted.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Deliver a detection into the current session without going through
    /// `try_begin`.  For producers that do their own pacing.
    pub fn publish(&self, detection: RawDetection) -> bool {
        self.post(self.generation(), detection)
    }

    /// Take the newest unread detection, if any.
    pub fn take_latest(&self) -> Option<RawDetection> {
        self.lock().take()
    }

    /// Stop accepting detections and drop anything unread.  Requests still
    /// in flight belong to a finished session from here on.
    pub fn stop(&self) {
        let mut slot = self.lock();
        if !self.stopped.swap(true, Ordering::AcqRel) {
            self.generation.fetch_add(1, Ordering::AcqRel);
            debug!("detection mailbox stopped");
        }
        self.busy.store(false, Ordering::Release);
        slot.take();
    }

    /// Start a new session: accept detections again with an empty slot and
    /// no request in flight.
    pub fn reopen(&self) {
        let mut slot = self.lock();
        slot.take();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.busy.store(false, Ordering::Release);
        self.stopped.store(false, Ordering::Release);
        debug!("detection mailbox opened (generation {})", generation);
    }

    /// Generation of the current session.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Whether no detection is waiting to be read.
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    /// Detections delivered.
    pub fn posted(&self) -> u64 {
        self.posted.load(Ordering::Relaxed)
    }

    /// Detections replaced before the consumer read them.
    pub fn overwritten(&self) -> u64 {
        self.overwritten.load(Ordering::Relaxed)
    }

    /// Detections that arrived after stop or from an earlier session.
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}
