//! Click debouncing over a trailing time window.
//!
//! Per-frame pinch classifications are OR-ed over the last
//! `window_ms` milliseconds, so a single dropped frame in the middle of a
//! pinch does not produce a release/click pair.

use std::collections::VecDeque;
use tracing::debug;

/// Edge of the debounced click state, emitted at most once per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickEdge {
    /// Debounced state went from released to clicking.
    Click,
    /// Debounced state went from clicking to released.
    Release,
}

impl ClickEdge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Release => "release",
        }
    }
}

/// Trailing window of `(is_clicking, timestamp_ms)` samples.
#[derive(Debug, Clone)]
pub struct ClickDebouncer {
    /// Samples in timestamp order; evicted from the front, never mutated.
    window: VecDeque<(bool, i64)>,
    /// Horizon in milliseconds.
    window_ms: u32,
    /// Debounced state as of the last query.
    state: bool,
}

impl ClickDebouncer {
    pub fn new(window_ms: u32) -> Self {
        Self {
            window: VecDeque::with_capacity(32),
            window_ms,
            state: false,
        }
    }

    /// Append a classification.  Samples older than the newest one already
    /// held are dropped to keep the window ordered.
    pub fn push(&mut self, is_clicking: bool, timestamp_ms: i64) {
        if let Some(&(_, last)) = self.window.back() {
            if timestamp_ms < last {
                debug!(
                    "click sample at {} older than window tail {}, dropped",
                    timestamp_ms, last
                );
                return;
            }
        }
        self.window.push_back((is_clicking, timestamp_ms));
    }

    /// Evict samples older than `now_ms - window_ms`, recompute the
    /// debounced state, and report an edge if it changed.
    pub fn update(&mut self, now_ms: i64) -> Option<ClickEdge> {
        let horizon = now_ms.saturating_sub(i64::from(self.window_ms));
        while let Some(&(_, ts)) = self.window.front() {
            if ts >= horizon {
                break;
            }
            self.window.pop_front();
        }

        let aggregated = self.window.iter().any(|&(clicking, _)| clicking);
        self.transition(aggregated)
    }

    /// Drop every sample and force the released state.
    ///
    /// Returns `Release` if the debounced state was clicking.
    pub fn clear(&mut self) -> Option<ClickEdge> {
        self.window.clear();
        self.transition(false)
    }

    fn transition(&mut self, aggregated: bool) -> Option<ClickEdge> {
        let edge = match (self.state, aggregated) {
            (false, true) => Some(ClickEdge::Click),
            (true, false) => Some(ClickEdge::Release),
            _ => None,
        };
        self.state = aggregated;
        if let Some(e) = edge {
            debug!("debounced {}", e.as_str());
        }
        edge
    }

    /// Current debounced state.
    pub fn is_clicking(&self) -> bool {
        self.state
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn window_ms(&self) -> u32 {
        self.window_ms
    }
}

// ── Tests ──────────────────────────────────────────────────
