//! Pointer/gesture input arbitration.
//!
//! Each frame exactly one source drives the cursor: whichever moved most
//! recently.  A physical pointer counts as active only when its position
//! changes.  Gesture clicks are translated into the same press/release
//! edges a pointer button produces, so downstream sees one input stream.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hand::{GestureOutput, Point2, NO_HAND_TIMESTAMP};

/// Which device drove the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    Pointer,
    Gesture,
}

impl InputSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pointer => "pointer",
            Self::Gesture => "gesture",
        }
    }
}

/// One poll of the physical pointer, in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    pub position: Point2,
    /// Primary button went down since the last poll.
    pub pressed: bool,
    /// Primary button went up since the last poll.
    pub released: bool,
}

impl PointerSample {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            ..Self::default()
        }
    }
}

/// The merged input for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbitratedInput {
    pub source: InputSource,
    /// Cursor in screen pixels.
    pub cursor: Point2,
    pub press: bool,
    pub release: bool,
    /// The physical pointer moved this frame.
    pub pointer_moved: bool,
}

pub struct InputArbiter {
    screen_width: u32,
    screen_height: u32,
    pointer_position: Option<Point2>,
    /// Last time the pointer position changed.
    pointer_timestamp: i64,
    /// A gesture press has been forwarded without its release.
    gesture_down: bool,
    last_source: Option<InputSource>,
    switches: u64,
}

impl InputArbiter {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            screen_width,
            screen_height,
            pointer_position: None,
            pointer_timestamp: NO_HAND_TIMESTAMP,
            gesture_down: false,
            last_source: None,
            switches: 0,
        }
    }

    /// Scale a normalized cursor to screen pixels.
    pub fn to_screen(&self, p: Point2) -> Point2 {
        Point2::new(
            p.x * self.screen_width as f32,
            p.y * self.screen_height as f32,
        )
    }

    /// Merge this frame's pointer poll and gesture output.
    ///
    /// Pointer button edges always pass through.  Gesture edges are
    /// forwarded only while the gesture wins, except that a forwarded press
    /// is always balanced by a release, either the gesture's own or a
    /// synthesized one when the pointer takes over.
    pub fn arbitrate(
        &mut self,
        now_ms: i64,
        pointer: PointerSample,
        gesture: &GestureOutput,
    ) -> ArbitratedInput {
        let pointer_moved = match self.pointer_position {
            Some(last) => last != pointer.position,
            None => false,
        };
        if pointer_moved {
            self.pointer_timestamp = now_ms;
        }
        self.pointer_position = Some(pointer.position);

        let gesture_cursor = gesture
            .cursor
            .filter(|_| gesture.freshness_ms > self.pointer_timestamp);

        let mut press = pointer.pressed;
        let mut release = pointer.released;

        let (source, cursor) = match gesture_cursor {
            Some(c) => {
                if gesture.click {
                    press = true;
                    self.gesture_down = true;
                }
                if gesture.release && self.gesture_down {
                    release = true;
                    self.gesture_down = false;
                }
                (InputSource::Gesture, self.to_screen(c))
            }
            None => {
                if self.gesture_down {
                    release = true;
                    self.gesture_down = false;
                }
                (InputSource::Pointer, pointer.position)
            }
        };

        if self.last_source != Some(source) {
            if self.last_source.is_some() {
                self.switches += 1;
            }
            debug!("input source: {} at {}", source.as_str(), now_ms);
            self.last_source = Some(source);
        }

        ArbitratedInput {
            source,
            cursor,
            press,
            release,
            pointer_moved,
        }
    }

    /// Last time the physical pointer moved.
    pub fn pointer_timestamp(&self) -> i64 {
        self.pointer_timestamp
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    /// Number of source changes so far.
    pub fn switches(&self) -> u64 {
        self.switches
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:source {} :pointer-timestamp {} :gesture-down {} :switches {})",
            self.last_source.map_or("nil", |s| s.as_str()),
            self.pointer_timestamp,
            if self.gesture_down { "t" } else { "nil" },
            self.switches,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
