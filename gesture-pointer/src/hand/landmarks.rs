//! Hand landmark definitions and raw detector output.
//!
//! Models the 21 landmarks per hand produced by a MediaPipe-style hand
//! landmarker.  A `RawDetection` is what the detector hands back for one
//! submitted camera frame; it is immutable once produced.

use serde::{Deserialize, Serialize};

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Short name used in logs and status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// The four knuckles that, with the wrist, define the palm.
    pub fn knuckles() -> [HandLandmark; 4] {
        [Self::IndexMcp, Self::MiddleMcp, Self::RingMcp, Self::PinkyMcp]
    }
}

// ── Handedness ─────────────────────────────────────────────

/// Which hand the detector believes it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn is_right(&self) -> bool {
        matches!(self, Self::Right)
    }
}

// ── Landmark point ─────────────────────────────────────────

/// One landmark: `x`/`y` normalized to the image, `z` in detector depth units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Landmark {
    fn from(p: [f32; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl From<Landmark> for [f32; 3] {
    fn from(l: Landmark) -> Self {
        l.to_array()
    }
}

// ── Detector output ────────────────────────────────────────

/// A single detected hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedHand {
    /// Landmarks indexed by `HandLandmark`.  Anything other than 21 entries
    /// is rejected when the hand frame is built.
    pub landmarks: Vec<Landmark>,
    pub handedness: Handedness,
}

impl DetectedHand {
    /// Position of one landmark, if present.
    pub fn landmark(&self, which: HandLandmark) -> Option<Landmark> {
        self.landmarks.get(which.index()).copied()
    }
}

/// Result of running the detector on one submitted frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Timestamp the frame was submitted with, in milliseconds.
    pub timestamp_ms: i64,
    /// The tracked hand, or `None` if the detector found nothing.
    pub hand: Option<DetectedHand>,
}

impl RawDetection {
    pub fn present(&self) -> bool {
        self.hand.is_some()
    }

    /// Detection with no hand in view.
    pub fn empty(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            hand: None,
        }
    }
}

// ── Test fixtures ──────────────────────────────────────────

/// A plausible right hand lying flat, palm toward the camera, centered on
/// `(cx, cy)` with a palm width of `width` image units.  Thumb and index
/// tips are spread apart (not pinching).
#[cfg(test)]
pub(crate) fn test_hand(handedness: Handedness, cx: f32, cy: f32, width: f32) -> DetectedHand {
    // Unit-width template in image space (y grows downward).
    // Origin = 0.5*wrist + 0.125*(index+middle+ring+pinky mcp) = (0, 0, 0).
    let template: [[f32; 3]; LANDMARK_COUNT] = [
        [0.0, 1.0, 0.0],    // wrist
        [-0.4, 0.8, 0.0],   // thumb cmc
        [-0.7, 0.5, 0.0],   // thumb mcp
        [-0.9, 0.2, 0.0],   // thumb ip
        [-1.1, 0.0, 0.0],   // thumb tip
        [-0.5, -1.0, 0.0],  // index mcp
        [-0.55, -1.5, 0.0], // index pip
        [-0.6, -1.9, 0.0],  // index dip
        [-0.6, -2.2, 0.0],  // index tip
        [-0.15, -1.05, 0.0], // middle mcp
        [-0.15, -1.6, 0.0], // middle pip
        [-0.15, -2.0, 0.0], // middle dip
        [-0.15, -2.3, 0.0], // middle tip
        [0.15, -1.0, 0.0],  // ring mcp
        [0.2, -1.5, 0.0],   // ring pip
        [0.2, -1.9, 0.0],   // ring dip
        [0.2, -2.1, 0.0],   // ring tip
        [0.5, -0.95, 0.0],  // pinky mcp
        [0.55, -1.3, 0.0],  // pinky pip
        [0.6, -1.6, 0.0],   // pinky dip
        [0.6, -1.8, 0.0],   // pinky tip
    ];
    let landmarks = template
        .iter()
        .map(|p| Landmark::new(cx + p[0] * width, cy + p[1] * width, p[2] * width))
        .collect();
    DetectedHand {
        landmarks,
        handedness,
    }
}

/// Like `test_hand`, but with the thumb tip touching the index tip.
#[cfg(test)]
pub(crate) fn test_pinching_hand(
    handedness: Handedness,
    cx: f32,
    cy: f32,
    width: f32,
) -> DetectedHand {
    let mut hand = test_hand(handedness, cx, cy, width);
    let index_tip = hand.landmarks[HandLandmark::IndexTip.index()];
    hand.landmarks[HandLandmark::ThumbTip.index()] =
        Landmark::new(index_tip.x + 0.05 * width, index_tip.y + 0.05 * width, index_tip.z);
    hand
}

// ── Tests ──────────────────────────────────────────────────
