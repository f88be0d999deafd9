//! Tracked-hand lifecycle: first sight, continuous tracking, timeout.
//!
//! The tracker owns the hand currently driving the cursor, the one before
//! it, the click debounce window and the cursor estimate.  Detections are
//! fed in with `ingest` whenever the detector produces them; `process` is
//! called once per rendered frame and advances the cursor in time.

use tracing::{debug, info, trace};

use super::classifier::{classify_click, is_same_hand, ClickConfig, IdentityConfig};
use super::cursor::{step_fraction, step_linear, step_quadratic, Point2, ScaleRect};
use super::debounce::{ClickDebouncer, ClickEdge};
use super::frame::HandFrame;
use super::landmarks::RawDetection;

/// Freshness reported while no hand is tracked.  Older than any real
/// timestamp, so an absent hand never wins arbitration.
pub const NO_HAND_TIMESTAMP: i64 = i64::MIN;

// ── Config ─────────────────────────────────────────────────

/// Tuning for cursor motion, click debouncing and tracking timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Cursor chase speed in screen units per second.
    pub cursor_speed: f32,
    /// Click debounce window in milliseconds.
    pub delete_gesture_ms: u32,
    /// Silence after which the tracked hand is dropped, in milliseconds.
    pub end_tracking_ms: u32,
    /// Below this distance a previous hand position is not worth curving
    /// through.
    pub min_cursor_movement: f32,
    /// Camera sub-region mapped onto the whole screen.
    pub scale_rect: ScaleRect,
    pub click: ClickConfig,
    pub identity: IdentityConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            cursor_speed: 1.5,
            delete_gesture_ms: 200,
            end_tracking_ms: 700,
            min_cursor_movement: 0.005,
            scale_rect: ScaleRect::default(),
            click: ClickConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

// ── Output ─────────────────────────────────────────────────

/// Result of one `process` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureOutput {
    /// Cursor in normalized screen space, `None` when no hand is tracked.
    pub cursor: Option<Point2>,
    /// Debounced click started this frame.
    pub click: bool,
    /// Debounced click ended this frame.
    pub release: bool,
    /// Timestamp of the detection behind `cursor`, or `NO_HAND_TIMESTAMP`.
    pub freshness_ms: i64,
}

impl GestureOutput {
    fn no_hand(release: bool) -> Self {
        Self {
            cursor: None,
            click: false,
            release,
            freshness_ms: NO_HAND_TIMESTAMP,
        }
    }
}

// ── State ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct TrackedHand {
    current: HandFrame,
    previous: Option<HandFrame>,
    debouncer: ClickDebouncer,
    cursor: Point2,
}

#[derive(Debug, Clone)]
enum TrackingState {
    NoHand,
    Tracking(Box<TrackedHand>),
}

/// Running totals, mostly for status output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Detections accepted as hand frames.
    pub accepted: u64,
    /// Detections discarded for degenerate geometry.
    pub degenerate: u64,
    /// Detections discarded as older than the current frame.
    pub stale: u64,
    /// Times a different hand took over mid-tracking.
    pub handoffs: u64,
    /// Times tracking ended on timeout.
    pub timeouts: u64,
}

/// Single-hand tracker.
pub struct HandTracker {
    /// Configuration.
    pub config: TrackerConfig,
    state: TrackingState,
    /// Next accepted detection snaps the cursor instead of chasing.
    reset: bool,
    last_call_ms: Option<i64>,
    stats: TrackerStats,
}

impl HandTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            state: TrackingState::NoHand,
            reset: true,
            last_call_ms: None,
            stats: TrackerStats::default(),
        }
    }

    /// Feed one detection.  Returns true if it became the current frame.
    ///
    /// Detections without a hand, with degenerate geometry, or older than
    /// the current frame are ignored; the timeout in `process` takes care
    /// of a hand that stops showing up.
    pub fn ingest(&mut self, detection: &RawDetection) -> bool {
        if !detection.present() {
            trace!("no hand at {}", detection.timestamp_ms);
            return false;
        }

        let tracked = match &mut self.state {
            TrackingState::Tracking(t) => Some(t),
            TrackingState::NoHand => None,
        };

        if let Some(t) = &tracked {
            if detection.timestamp_ms < t.current.timestamp_ms {
                debug!(
                    "detection at {} older than current frame {}, dropped",
                    detection.timestamp_ms, t.current.timestamp_ms
                );
                self.stats.stale += 1;
                return false;
            }
        }

        // A snap restarts click hysteresis like a new hand does.
        let previously_clicking =
            !self.reset && tracked.as_ref().map_or(false, |t| t.current.is_clicking);
        let mut frame = match HandFrame::build(detection, &self.config.click, previously_clicking) {
            Ok(f) => f,
            Err(e) => {
                debug!("discarding detection at {}: {}", detection.timestamp_ms, e);
                self.stats.degenerate += 1;
                return false;
            }
        };
        self.stats.accepted += 1;

        let snap_to = self
            .config
            .scale_rect
            .map(frame.origin[0], frame.origin[1]);

        match tracked {
            Some(t) if !self.reset => {
                if is_same_hand(&t.current, &frame, &self.config.identity) {
                    let old = std::mem::replace(&mut t.current, frame);
                    t.previous = Some(old);
                } else {
                    // A different hand: its click state starts fresh and the
                    // old hand's positions are not worth curving through.
                    frame.is_clicking =
                        classify_click(&frame.normalized_landmarks, false, &self.config.click);
                    debug!(
                        "hand handoff at {}: {} -> {}",
                        frame.timestamp_ms,
                        t.current.handedness.as_str(),
                        frame.handedness.as_str()
                    );
                    self.stats.handoffs += 1;
                    t.current = frame;
                    t.previous = None;
                }
                t.debouncer.push(t.current.is_clicking, t.current.timestamp_ms);
            }
            Some(t) => {
                info!(
                    "tracking reset: snapping to {} hand at ({:.3}, {:.3})",
                    frame.handedness.as_str(),
                    snap_to.x,
                    snap_to.y
                );
                t.debouncer.push(frame.is_clicking, frame.timestamp_ms);
                t.current = frame;
                t.previous = None;
                t.cursor = snap_to;
            }
            None => {
                info!(
                    "tracking {} hand at ({:.3}, {:.3})",
                    frame.handedness.as_str(),
                    snap_to.x,
                    snap_to.y
                );
                let mut debouncer = ClickDebouncer::new(self.config.delete_gesture_ms);
                debouncer.push(frame.is_clicking, frame.timestamp_ms);
                self.state = TrackingState::Tracking(Box::new(TrackedHand {
                    current: frame,
                    previous: None,
                    debouncer,
                    cursor: snap_to,
                }));
            }
        }

        self.reset = false;
        true
    }

    /// Advance to `now_ms`: check the timeout, update the debounced click
    /// state and move the cursor.
    pub fn process(&mut self, now_ms: i64) -> GestureOutput {
        let dt_ms = self.last_call_ms.map_or(0, |last| now_ms.saturating_sub(last));
        self.last_call_ms = Some(now_ms);

        let end_tracking_ms = i64::from(self.config.end_tracking_ms);
        let t = match &mut self.state {
            TrackingState::NoHand => return GestureOutput::no_hand(false),
            TrackingState::Tracking(t) => t,
        };

        if t.current.timestamp_ms.saturating_add(end_tracking_ms) < now_ms {
            let edge = t.debouncer.clear();
            info!(
                "tracking lost: last hand at {}, now {}",
                t.current.timestamp_ms, now_ms
            );
            self.state = TrackingState::NoHand;
            self.stats.timeouts += 1;
            return GestureOutput::no_hand(edge == Some(ClickEdge::Release));
        }

        let edge = t.debouncer.update(now_ms);

        let rect = &self.config.scale_rect;
        let target = rect.map(t.current.origin[0], t.current.origin[1]);
        let fraction = step_fraction(t.cursor, target, self.config.cursor_speed, dt_ms);
        let via = t
            .previous
            .as_ref()
            .map(|p| rect.map(p.origin[0], p.origin[1]))
            .filter(|p| p.distance(t.cursor) > self.config.min_cursor_movement);

        t.cursor = match via {
            Some(previous) => step_quadratic(t.cursor, previous, target, fraction),
            None => step_linear(t.cursor, target, fraction),
        };

        GestureOutput {
            cursor: Some(t.cursor),
            click: edge == Some(ClickEdge::Click),
            release: edge == Some(ClickEdge::Release),
            freshness_ms: t.current.timestamp_ms,
        }
    }

    /// Force the next accepted detection to snap the cursor.
    pub fn request_reset(&mut self) {
        self.reset = true;
    }

    /// Drop the tracked hand.  Returns true if a click was in progress, in
    /// which case the caller owes downstream a release.
    pub fn clear(&mut self) -> bool {
        let was_clicking = match &mut self.state {
            TrackingState::Tracking(t) => t.debouncer.clear() == Some(ClickEdge::Release),
            TrackingState::NoHand => false,
        };
        self.state = TrackingState::NoHand;
        self.reset = true;
        was_clicking
    }

    /// Whether a hand is being tracked.
    pub fn is_tracking(&self) -> bool {
        matches!(self.state, TrackingState::Tracking(_))
    }

    /// Current cursor estimate, if tracking.
    pub fn cursor(&self) -> Option<Point2> {
        match &self.state {
            TrackingState::Tracking(t) => Some(t.cursor),
            TrackingState::NoHand => None,
        }
    }

    /// The frame currently driving the cursor.
    pub fn current(&self) -> Option<&HandFrame> {
        match &self.state {
            TrackingState::Tracking(t) => Some(&t.current),
            TrackingState::NoHand => None,
        }
    }

    /// The frame before `current`, if it belongs to the same hand.
    pub fn previous(&self) -> Option<&HandFrame> {
        match &self.state {
            TrackingState::Tracking(t) => t.previous.as_ref(),
            TrackingState::NoHand => None,
        }
    }

    /// Debounced click state.
    pub fn is_clicking(&self) -> bool {
        match &self.state {
            TrackingState::Tracking(t) => t.debouncer.is_clicking(),
            TrackingState::NoHand => false,
        }
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        let stats = format!(
            ":accepted {} :degenerate {} :stale {} :handoffs {} :timeouts {}",
            self.stats.accepted,
            self.stats.degenerate,
            self.stats.stale,
            self.stats.handoffs,
            self.stats.timeouts,
        );
        match &self.state {
            TrackingState::NoHand => format!("(:state :no-hand {})", stats),
            TrackingState::Tracking(t) => format!(
                "(:state :tracking :hand :{} :cursor (:x {:.4} :y {:.4}) :clicking {} :timestamp {} {})",
                t.current.handedness.as_str(),
                t.cursor.x,
                t.cursor.y,
                if t.debouncer.is_clicking() { "t" } else { "nil" },
                t.current.timestamp_ms,
                stats,
            ),
        }
    }
}

impl Default for HandTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

// ── Tests ──────────────────────────────────────────────────
