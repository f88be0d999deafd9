use gesture_pointer::hand::{DetectedHand, Handedness, Landmark, RawDetection};

/// Open right-or-left hand, palm centred at (cx, cy), `width` across the
/// knuckles.
pub fn hand(handedness: Handedness, cx: f32, cy: f32, width: f32, pinching: bool) -> DetectedHand {
    let template: [[f32; 3]; 21] = [
        [0.0, 1.0, 0.0],
        [-0.4, 0.8, 0.0],
        [-0.7, 0.5, 0.0],
        [-0.9, 0.2, 0.0],
        [-1.1, 0.0, 0.0],
        [-0.5, -1.0, 0.0],
        [-0.55, -1.5, 0.0],
        [-0.6, -1.9, 0.0],
        [-0.6, -2.2, 0.0],
        [-0.15, -1.05, 0.0],
        [-0.15, -1.6, 0.0],
        [-0.15, -2.0, 0.0],
        [-0.15, -2.3, 0.0],
        [0.15, -1.0, 0.0],
        [0.2, -1.5, 0.0],
        [0.2, -1.9, 0.0],
        [0.2, -2.1, 0.0],
        [0.5, -0.95, 0.0],
        [0.55, -1.3, 0.0],
        [0.6, -1.6, 0.0],
        [0.6, -1.8, 0.0],
    ];
    let mut landmarks: Vec<Landmark> = template
        .iter()
        .map(|p| Landmark::new(cx + p[0] * width, cy + p[1] * width, p[2] * width))
        .collect();
    if pinching {
        let tip = landmarks[8];
        landmarks[4] = Landmark::new(tip.x + 0.05 * width, tip.y + 0.05 * width, tip.z);
    }
    DetectedHand {
        landmarks,
        handedness,
    }
}

pub fn detection(x: f32, y: f32, pinching: bool, ts: i64) -> RawDetection {
    RawDetection {
        timestamp_ms: ts,
        hand: Some(hand(Handedness::Right, x, y, 0.1, pinching)),
    }
}
