//! Palm-relative hand frames.
//!
//! A `HandFrame` re-expresses one detection in a coordinate system anchored
//! on the palm: origin at the palm center, unit length equal to the palm
//! width, axes along the pinky direction, the fingers and the palm normal.
//! Gesture math done in this frame does not care how far the hand is from
//! the camera or how it is rotated.

use tracing::trace;

use super::classifier::{classify_click, ClickConfig};
use super::landmarks::{HandLandmark, Handedness, RawDetection, LANDMARK_COUNT};

/// Magnitudes below this are treated as degenerate geometry.
pub const GEOMETRY_EPSILON: f32 = 1e-6;

/// Weight of the wrist in the palm center; the four knuckles share the rest.
const WRIST_WEIGHT: f32 = 0.5;
const KNUCKLE_WEIGHT: f32 = 0.125;

// ── Errors ─────────────────────────────────────────────────

/// Why a detection could not be turned into a hand frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("detection has no hand")]
    NoHand,

    #[error("expected {expected} landmarks, got {got}")]
    MissingLandmarks { expected: usize, got: usize },

    #[error("degenerate hand geometry: {what} has magnitude {magnitude:e}")]
    Degenerate { what: &'static str, magnitude: f32 },
}

// ── Vector helpers ─────────────────────────────────────────

pub(crate) fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn norm(a: [f32; 3]) -> f32 {
    dot(a, a).sqrt()
}

pub(crate) fn scale(a: [f32; 3], s: f32) -> [f32; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

/// Euclidean distance between two 3D points.
pub(crate) fn distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    norm(sub(a, b))
}

/// Unit vector along `a`, or `Degenerate` if `a` is (nearly) zero.
fn normalize(a: [f32; 3], what: &'static str) -> Result<[f32; 3], GeometryError> {
    let n = norm(a);
    if !(n >= GEOMETRY_EPSILON) {
        return Err(GeometryError::Degenerate { what, magnitude: n });
    }
    Ok(scale(a, 1.0 / n))
}

// ── Hand frame ─────────────────────────────────────────────

/// One detection expressed in palm-relative coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    /// Palm center in detector coordinates.
    pub origin: [f32; 3],
    /// Index-knuckle to pinky-knuckle distance; the frame's unit of scale.
    pub palm_width: f32,
    /// Orthonormal axes: `[pinky_axis, fingers_axis, palm_normal]`.
    pub basis: [[f32; 3]; 3],
    /// All landmarks as `(raw - origin) / palm_width` projected onto `basis`.
    pub normalized_landmarks: [[f32; 3]; LANDMARK_COUNT],
    pub handedness: Handedness,
    /// Pinch classification, with hysteresis against the prior frame.
    pub is_clicking: bool,
    pub timestamp_ms: i64,
}

impl HandFrame {
    /// Build a hand frame from a raw detection.
    ///
    /// `previously_clicking` is the click state of the frame this one
    /// follows on the same hand; it selects which click thresholds apply.
    pub fn build(
        detection: &RawDetection,
        click: &ClickConfig,
        previously_clicking: bool,
    ) -> Result<Self, GeometryError> {
        let hand = detection.hand.as_ref().ok_or(GeometryError::NoHand)?;
        if hand.landmarks.len() != LANDMARK_COUNT {
            return Err(GeometryError::MissingLandmarks {
                expected: LANDMARK_COUNT,
                got: hand.landmarks.len(),
            });
        }

        let raw: Vec<[f32; 3]> = hand.landmarks.iter().map(|l| l.to_array()).collect();
        let at = |j: HandLandmark| raw[j.index()];

        let wrist = at(HandLandmark::Wrist);
        let mut origin = scale(wrist, WRIST_WEIGHT);
        for knuckle in HandLandmark::knuckles() {
            let p = scale(at(knuckle), KNUCKLE_WEIGHT);
            origin = [origin[0] + p[0], origin[1] + p[1], origin[2] + p[2]];
        }

        let palm_width = distance(at(HandLandmark::IndexMcp), at(HandLandmark::PinkyMcp));
        if !(palm_width >= GEOMETRY_EPSILON) {
            return Err(GeometryError::Degenerate {
                what: "palm width",
                magnitude: palm_width,
            });
        }

        let basis = palm_basis(
            wrist,
            at(HandLandmark::IndexMcp),
            at(HandLandmark::MiddleMcp),
            at(HandLandmark::PinkyMcp),
            hand.handedness,
        )?;

        let mut normalized_landmarks = [[0.0f32; 3]; LANDMARK_COUNT];
        for (out, p) in normalized_landmarks.iter_mut().zip(raw.iter()) {
            let rel = scale(sub(*p, origin), 1.0 / palm_width);
            *out = [dot(rel, basis[0]), dot(rel, basis[1]), dot(rel, basis[2])];
        }

        let is_clicking = classify_click(&normalized_landmarks, previously_clicking, click);

        trace!(
            "hand frame: {} width={:.4} clicking={} ts={}",
            hand.handedness.as_str(),
            palm_width,
            is_clicking,
            detection.timestamp_ms,
        );

        Ok(Self {
            origin,
            palm_width,
            basis,
            normalized_landmarks,
            handedness: hand.handedness,
            is_clicking,
            timestamp_ms: detection.timestamp_ms,
        })
    }

    /// Whether this is a right hand.
    pub fn is_right(&self) -> bool {
        self.handedness.is_right()
    }

    /// Palm-normalized position of one landmark.
    pub fn landmark(&self, which: HandLandmark) -> [f32; 3] {
        self.normalized_landmarks[which.index()]
    }
}

/// Build the `[pinky_axis, fingers_axis, palm_normal]` basis.
///
/// Left hands get the normal and the pinky axis flipped, so a left hand and
/// its mirror-image right hand produce the same normalized landmarks.
fn palm_basis(
    wrist: [f32; 3],
    index_mcp: [f32; 3],
    middle_mcp: [f32; 3],
    pinky_mcp: [f32; 3],
    handedness: Handedness,
) -> Result<[[f32; 3]; 3], GeometryError> {
    let flip = if handedness.is_right() { 1.0 } else { -1.0 };

    let palm_normal = normalize(
        cross(sub(index_mcp, wrist), sub(pinky_mcp, wrist)),
        "palm normal",
    )?;
    let palm_normal = scale(palm_normal, flip);

    let pinky_axis = normalize(cross(palm_normal, sub(middle_mcp, wrist)), "pinky axis")?;
    let fingers_axis = normalize(cross(pinky_axis, palm_normal), "fingers axis")?;
    let pinky_axis = scale(pinky_axis, flip);

    Ok([pinky_axis, fingers_axis, palm_normal])
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::landmarks::{test_hand, DetectedHand, Landmark};

    fn detection(hand: DetectedHand, ts: i64) -> RawDetection {
        RawDetection {
            timestamp_ms: ts,
            hand: Some(hand),
        }
    }

    fn assert_orthonormal(basis: &[[f32; 3]; 3]) {
        for i in 0..3 {
            assert!(
                (norm(basis[i]) - 1.0).abs() < 1e-4,
                "axis {} not unit: {}",
                i,
                norm(basis[i])
            );
            for j in (i + 1)..3 {
                let d = dot(basis[i], basis[j]);
                assert!(d.abs() < 1e-4, "axes {} and {} not orthogonal: {}", i, j, d);
            }
        }
    }

    #[test]
    fn test_origin_and_width() {
        let det = detection(test_hand(Handedness::Right, 0.4, 0.6, 0.1), 10);
        let frame = HandFrame::build(&det, &ClickConfig::default(), false).unwrap();
        assert!((frame.origin[0] - 0.4).abs() < 1e-5);
        assert!((frame.origin[1] - 0.6).abs() < 1e-5);
        // index mcp (-0.5, -1.0) to pinky mcp (0.5, -0.95), scaled by 0.1
        let expected = (1.0f32 + 0.05 * 0.05).sqrt() * 0.1;
        assert!((frame.palm_width - expected).abs() < 1e-5);
        assert_eq!(frame.timestamp_ms, 10);
        assert!(frame.is_right());
    }

    #[test]
    fn test_basis_orthonormal_both_hands() {
        for handedness in [Handedness::Left, Handedness::Right] {
            let det = detection(test_hand(handedness, 0.5, 0.5, 0.2), 0);
            let frame = HandFrame::build(&det, &ClickConfig::default(), false).unwrap();
            assert_orthonormal(&frame.basis);
        }
    }

    #[test]
    fn test_basis_orthonormal_tilted_hand() {
        let mut hand = test_hand(Handedness::Right, 0.5, 0.5, 0.1);
        // Tilt the hand out of the image plane.
        for (i, l) in hand.landmarks.iter_mut().enumerate() {
            l.z = 0.03 * (i as f32 % 5.0) - 0.5 * (l.y - 0.5);
        }
        let frame = HandFrame::build(&detection(hand, 0), &ClickConfig::default(), false).unwrap();
        assert_orthonormal(&frame.basis);
    }

    #[test]
    fn test_mirrored_left_hand_matches_right() {
        let right = test_hand(Handedness::Right, 0.5, 0.5, 0.1);
        let mut left = right.clone();
        left.handedness = Handedness::Left;
        for l in left.landmarks.iter_mut() {
            l.x = 1.0 - l.x;
        }
        let a = HandFrame::build(&detection(right, 0), &ClickConfig::default(), false).unwrap();
        let b = HandFrame::build(&detection(left, 0), &ClickConfig::default(), false).unwrap();
        for i in 0..LANDMARK_COUNT {
            for k in 0..3 {
                assert!(
                    (a.normalized_landmarks[i][k] - b.normalized_landmarks[i][k]).abs() < 1e-4,
                    "landmark {} axis {}: {} vs {}",
                    i,
                    k,
                    a.normalized_landmarks[i][k],
                    b.normalized_landmarks[i][k]
                );
            }
        }
    }

    #[test]
    fn test_normalized_landmarks_scale_invariant() {
        let small = detection(test_hand(Handedness::Right, 0.3, 0.3, 0.05), 0);
        let large = detection(test_hand(Handedness::Right, 0.7, 0.6, 0.2), 0);
        let a = HandFrame::build(&small, &ClickConfig::default(), false).unwrap();
        let b = HandFrame::build(&large, &ClickConfig::default(), false).unwrap();
        for i in 0..LANDMARK_COUNT {
            for k in 0..3 {
                assert!(
                    (a.normalized_landmarks[i][k] - b.normalized_landmarks[i][k]).abs() < 1e-3,
                    "landmark {} axis {} differs",
                    i,
                    k
                );
            }
        }
    }

    #[test]
    fn test_normalized_knuckle_span_is_unit() {
        let det = detection(test_hand(Handedness::Left, 0.5, 0.5, 0.1), 0);
        let frame = HandFrame::build(&det, &ClickConfig::default(), false).unwrap();
        let span = distance(
            frame.landmark(HandLandmark::IndexMcp),
            frame.landmark(HandLandmark::PinkyMcp),
        );
        assert!((span - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_palm_width_is_error() {
        let mut hand = test_hand(Handedness::Right, 0.5, 0.5, 0.1);
        hand.landmarks[HandLandmark::PinkyMcp.index()] = hand.landmarks[HandLandmark::IndexMcp.index()];
        let err = HandFrame::build(&detection(hand, 0), &ClickConfig::default(), false).unwrap_err();
        assert!(matches!(err, GeometryError::Degenerate { what: "palm width", .. }));
    }

    #[test]
    fn test_collinear_palm_is_error() {
        let mut hand = test_hand(Handedness::Right, 0.5, 0.5, 0.1);
        // Wrist, index knuckle and pinky knuckle on one line: no normal.
        hand.landmarks[HandLandmark::Wrist.index()] = Landmark::new(0.4, 0.5, 0.0);
        hand.landmarks[HandLandmark::IndexMcp.index()] = Landmark::new(0.5, 0.5, 0.0);
        hand.landmarks[HandLandmark::PinkyMcp.index()] = Landmark::new(0.6, 0.5, 0.0);
        let err = HandFrame::build(&detection(hand, 0), &ClickConfig::default(), false).unwrap_err();
        assert!(matches!(err, GeometryError::Degenerate { what: "palm normal", .. }));
    }

    #[test]
    fn test_wrong_landmark_count_is_error() {
        let mut hand = test_hand(Handedness::Right, 0.5, 0.5, 0.1);
        hand.landmarks.truncate(10);
        let err = HandFrame::build(&detection(hand, 0), &ClickConfig::default(), false).unwrap_err();
        assert_eq!(
            err,
            GeometryError::MissingLandmarks {
                expected: 21,
                got: 10
            }
        );
    }

    #[test]
    fn test_absent_hand_is_error() {
        let err = HandFrame::build(&RawDetection::empty(0), &ClickConfig::default(), false)
            .unwrap_err();
        assert_eq!(err, GeometryError::NoHand);
    }

    #[test]
    fn test_nan_landmark_is_degenerate() {
        let mut hand = test_hand(Handedness::Right, 0.5, 0.5, 0.1);
        hand.landmarks[HandLandmark::IndexMcp.index()].x = f32::NAN;
        assert!(HandFrame::build(&detection(hand, 0), &ClickConfig::default(), false).is_err());
    }

    #[test]
    fn test_build_is_deterministic() {
        let det = detection(test_hand(Handedness::Left, 0.45, 0.55, 0.12), 7);
        let a = HandFrame::build(&det, &ClickConfig::default(), false).unwrap();
        let b = HandFrame::build(&det, &ClickConfig::default(), false).unwrap();
        assert_eq!(a, b);
    }
}
