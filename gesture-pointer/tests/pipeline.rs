mod common;

use common::detection;
use gesture_pointer::hand::ScaleRect;
use gesture_pointer::{
    CaptureConfig, GesturePointer, InputArbiter, InputSource, InteractionRecorder, PointerSample,
    TrackerConfig, NO_HAND_TIMESTAMP,
};

fn full_screen_pointer() -> GesturePointer {
    GesturePointer::new(
        TrackerConfig {
            scale_rect: ScaleRect::full(),
            ..TrackerConfig::default()
        },
        CaptureConfig::default(),
    )
}

#[test]
fn test_pointer_then_gesture_session() {
    let mut pointer = full_screen_pointer();
    let mailbox = pointer.mailbox();
    let mut arbiter = InputArbiter::new(1000, 500);
    let mut recorder = InteractionRecorder::new();

    let mut presses = Vec::new();
    let mut releases = Vec::new();
    let mut sources = Vec::new();
    let mut lost_at = None;

    for now in (0..=1400).step_by(20) {
        // The physical pointer moves for the first 100ms, then rests.
        let px = now.min(100) as f32;
        if (200..=600).contains(&now) {
            let pinching = (300..=360).contains(&now);
            mailbox.publish(detection(0.5, 0.5, pinching, now));
        }

        let gesture = pointer.process(now);
        if now > 600 && gesture.cursor.is_none() && lost_at.is_none() {
            lost_at = Some(now);
            assert_eq!(gesture.freshness_ms, NO_HAND_TIMESTAMP);
        }

        let input = arbiter.arbitrate(now, PointerSample::at(px, 10.0), &gesture);
        if input.press {
            presses.push(now);
        }
        if input.release {
            releases.push(now);
        }
        sources.push((now, input.source));
        if input.source == InputSource::Gesture {
            assert!((input.cursor.x - 500.0).abs() < 1.0);
            assert!((input.cursor.y - 250.0).abs() < 1.0);
        }
        recorder.record(now, &input);
    }

    assert_eq!(presses, vec![300]);
    assert_eq!(releases, vec![580]);
    assert_eq!(lost_at, Some(1320));

    for &(now, source) in &sources {
        let expected = if (200..1320).contains(&now) {
            InputSource::Gesture
        } else {
            InputSource::Pointer
        };
        assert_eq!(source, expected, "at {}", now);
    }

    let recording = recorder.finish(1400);
    assert_eq!(recording.segments.len(), 2);
    let p = &recording.segments[0];
    assert_eq!(p.source, InputSource::Pointer);
    assert_eq!((p.start_ms, p.end_ms), (20, 200));
    let g = &recording.segments[1];
    assert_eq!(g.source, InputSource::Gesture);
    assert_eq!((g.presses, g.releases), (1, 1));
    assert_eq!(g.end_ms, 1400);

    let summary = recording.summary(InputSource::Pointer).unwrap();
    assert!((summary.total_distance - 100.0).abs() < 1e-3);
}

#[test]
fn test_slow_detector_reuses_frames() {
    let mut pointer = full_screen_pointer();
    let mailbox = pointer.mailbox();
    let mut freshness = Vec::new();

    for frame in 0..12 {
        let now = frame * 16;
        if frame % 3 == 0 {
            mailbox.publish(detection(0.3 + 0.01 * frame as f32, 0.5, false, now));
        }
        let out = pointer.process(now);
        assert!(out.cursor.is_some());
        freshness.push(out.freshness_ms);
    }

    assert!(freshness.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(&freshness[..4], &[0, 0, 0, 48]);
    assert_eq!(pointer.tracker().stats().accepted, 4);
}

#[test]
fn test_overwritten_and_stale_detections() {
    let mut pointer = full_screen_pointer();
    let mailbox = pointer.mailbox();

    mailbox.publish(detection(0.4, 0.5, false, 100));
    pointer.process(100);

    // Two results land between renders; only the newest is seen.
    mailbox.publish(detection(0.45, 0.5, false, 110));
    mailbox.publish(detection(0.5, 0.5, false, 120));
    pointer.process(125);
    assert_eq!(pointer.tracker().current().unwrap().timestamp_ms, 120);
    assert_eq!(mailbox.overwritten(), 1);

    // A result older than the current frame is ignored.
    mailbox.publish(detection(0.9, 0.5, false, 115));
    pointer.process(130);
    assert_eq!(pointer.tracker().current().unwrap().timestamp_ms, 120);
    assert_eq!(pointer.tracker().stats().stale, 1);
}
