//! Recorded detections played back through the capture pipeline.
//!
//! A replay file holds one `RawDetection` per line as JSON.  The frame
//! source paces blank frames by the recorded timestamps; the detector
//! answers each frame with the recorded hand for that frame, after an
//! optional simulated latency, stamped with the submission time.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::capture::{
    CameraFrame, CaptureError, DetectionCallback, FrameSource, LandmarkDetector, PixelFormat,
};
use crate::hand::{RawDetection, LANDMARK_COUNT};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read replay {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("replay line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Parse a JSON-lines replay.  Blank lines are skipped.
pub fn parse_replay<R: BufRead>(reader: R) -> Result<Vec<RawDetection>, ReplayError> {
    let mut detections = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.map_err(|e| ReplayError::Parse {
            line: line_no,
            reason: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let detection: RawDetection =
            serde_json::from_str(&line).map_err(|e| ReplayError::Parse {
                line: line_no,
                reason: e.to_string(),
            })?;
        if let Some(hand) = &detection.hand {
            if hand.landmarks.len() != LANDMARK_COUNT {
                return Err(ReplayError::Parse {
                    line: line_no,
                    reason: format!(
                        "expected {} landmarks, got {}",
                        LANDMARK_COUNT,
                        hand.landmarks.len()
                    ),
                });
            }
        }
        detections.push(detection);
    }
    Ok(detections)
}

/// Load a replay file.
pub fn load_replay(path: &Path) -> Result<Vec<RawDetection>, ReplayError> {
    let file = File::open(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let detections = parse_replay(BufReader::new(file))?;
    info!("loaded {} detections from {}", detections.len(), path.display());
    Ok(detections)
}

/// Split a replay into a paced frame source and its matching detector.
pub fn replay_pair(
    detections: Vec<RawDetection>,
    latency: Duration,
) -> (ReplayFrameSource, ReplayDetector) {
    let detections: Arc<[RawDetection]> = detections.into();
    let source = ReplayFrameSource {
        gaps: frame_gaps(&detections),
        next: 0,
        pace: true,
        opened: false,
    };
    let detector = ReplayDetector {
        detections,
        latency,
    };
    (source, detector)
}

/// Delay before each frame: the gap since the previous recorded timestamp.
fn frame_gaps(detections: &[RawDetection]) -> Vec<Duration> {
    let mut last = detections.first().map_or(0, |d| d.timestamp_ms);
    detections
        .iter()
        .map(|d| {
            let gap = (d.timestamp_ms - last).max(0);
            last = last.max(d.timestamp_ms);
            Duration::from_millis(gap.unsigned_abs())
        })
        .collect()
}

/// Blank frames at the recorded rate.
pub struct ReplayFrameSource {
    gaps: Vec<Duration>,
    next: usize,
    pace: bool,
    opened: bool,
}

impl ReplayFrameSource {
    /// Emit frames back to back instead of at the recorded rate.
    pub fn unpaced(mut self) -> Self {
        self.pace = false;
        self
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }
}

impl FrameSource for ReplayFrameSource {
    fn name(&self) -> String {
        format!("replay ({} frames)", self.gaps.len())
    }

    fn open(&mut self) -> Result<(), CaptureError> {
        if self.opened {
            return Err(CaptureError::DeviceOpen {
                device: self.name(),
                reason: "already open".into(),
            });
        }
        self.opened = true;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<CameraFrame>, CaptureError> {
        let Some(gap) = self.gaps.get(self.next).copied() else {
            return Ok(None);
        };
        self.next += 1;
        if self.pace && !gap.is_zero() {
            std::thread::sleep(gap);
        }
        Ok(Some(CameraFrame::blank(4, 4, PixelFormat::Bgr)))
    }

    fn close(&mut self) {
        debug!("replay source closed after {} frames", self.next);
    }
}

/// Answers frame `n` with the `n`th recorded detection.
pub struct ReplayDetector {
    detections: Arc<[RawDetection]>,
    latency: Duration,
}

impl ReplayDetector {
    fn answer(&self, sequence: u64, timestamp_ms: i64) -> RawDetection {
        let hand = usize::try_from(sequence)
            .ok()
            .and_then(|i| self.detections.get(i))
            .and_then(|d| d.hand.clone());
        RawDetection { timestamp_ms, hand }
    }
}

impl LandmarkDetector for ReplayDetector {
    fn detect_async(&mut self, frame: CameraFrame, timestamp_ms: i64, on_result: DetectionCallback) {
        let detection = self.answer(frame.sequence, timestamp_ms);
        if self.latency.is_zero() {
            on_result(detection);
            return;
        }
        let latency = self.latency;
        std::thread::spawn(move || {
            std::thread::sleep(latency);
            on_result(detection);
        });
    }
}

// ── Tests ──────────────────────────────────────────────────
