//! Hand identity and pinch classification.
//!
//! `is_same_hand` decides whether two frames plausibly come from the same
//! physical hand, so a handoff to a different hand drops stale history.
//! `classify_click` decides whether a frame shows a thumb/index pinch, with
//! separate enter and hold thresholds so a pinch held at the boundary does
//! not flicker.

use super::frame::{distance, dot, norm, scale, HandFrame, GEOMETRY_EPSILON};
use super::landmarks::{HandLandmark, LANDMARK_COUNT};

// ── Config ─────────────────────────────────────────────────

/// One pair of pinch thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickThresholds {
    /// Minimum cosine between the thumb-tip and index-tip directions.
    pub min_dot: f32,
    /// Maximum thumb-tip to index-tip distance, in palm widths.
    pub max_distance: f32,
}

impl ClickThresholds {
    pub fn new(min_dot: f32, max_distance: f32) -> Self {
        Self {
            min_dot,
            max_distance,
        }
    }

    fn accepts(&self, metrics: &PinchMetrics) -> bool {
        metrics.dot >= self.min_dot && metrics.distance <= self.max_distance
    }
}

/// Pinch thresholds with hysteresis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickConfig {
    /// Thresholds to start clicking from the released state.
    pub enter: ClickThresholds,
    /// Thresholds to keep clicking once a click has started.
    pub hold: ClickThresholds,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            enter: ClickThresholds::new(0.8, 0.8),
            hold: ClickThresholds::new(0.8, 0.8),
        }
    }
}

/// Limits for treating two frames as the same physical hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentityConfig {
    /// Maximum palm-width change, as a fraction of the smaller width.
    pub max_width_change: f32,
    /// Maximum palm-origin displacement, in multiples of the smaller width.
    pub max_displacement_widths: f32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            max_width_change: 0.10,
            max_displacement_widths: 10.0,
        }
    }
}

// ── Identity ───────────────────────────────────────────────

/// Whether `a` and `b` look like the same physical hand.
pub fn is_same_hand(a: &HandFrame, b: &HandFrame, config: &IdentityConfig) -> bool {
    if a.handedness != b.handedness {
        return false;
    }

    let smaller = a.palm_width.min(b.palm_width);
    if (a.palm_width - b.palm_width).abs() > config.max_width_change * smaller {
        return false;
    }

    distance(a.origin, b.origin) <= config.max_displacement_widths * smaller
}

// ── Pinch ──────────────────────────────────────────────────

/// Thumb-tip / index-tip relationship in palm-normalized space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchMetrics {
    /// Cosine of the angle between the two tip directions.
    pub dot: f32,
    /// Distance between the tips, in palm widths.
    pub distance: f32,
}

/// Compute pinch metrics, or `None` if either tip sits on the palm origin.
pub fn pinch_metrics(landmarks: &[[f32; 3]; LANDMARK_COUNT]) -> Option<PinchMetrics> {
    let thumb = landmarks[HandLandmark::ThumbTip.index()];
    let index = landmarks[HandLandmark::IndexTip.index()];

    let thumb_len = norm(thumb);
    let index_len = norm(index);
    if thumb_len < GEOMETRY_EPSILON || index_len < GEOMETRY_EPSILON {
        return None;
    }

    Some(PinchMetrics {
        dot: dot(scale(thumb, 1.0 / thumb_len), scale(index, 1.0 / index_len)),
        distance: distance(thumb, index),
    })
}

/// Classify a frame's palm-normalized landmarks as clicking or not.
pub fn classify_click(
    landmarks: &[[f32; 3]; LANDMARK_COUNT],
    previously_clicking: bool,
    config: &ClickConfig,
) -> bool {
    let thresholds = if previously_clicking {
        &config.hold
    } else {
        &config.enter
    };
    pinch_metrics(landmarks).is_some_and(|m| thresholds.accepts(&m))
}

// ── Tests ──────────────────────────────────────────────────
