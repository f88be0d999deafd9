//! Interaction session recording.
//!
//! Splits a session into contiguous segments by the source driving the
//! cursor, accumulating travel distance and button edges per segment, and
//! summarizes them per source.  A frame counts toward the pointer only if
//! the pointer actually moved; otherwise it extends the current segment.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::arbiter::{ArbitratedInput, InputSource};
use crate::hand::Point2;

/// A run of frames driven by one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub source: InputSource,
    pub start_ms: i64,
    pub end_ms: i64,
    /// Cursor travel in screen pixels.
    pub distance: f64,
    pub presses: u32,
    pub releases: u32,
}

impl Segment {
    fn new(source: InputSource, start_ms: i64) -> Self {
        Self {
            source,
            start_ms,
            end_ms: start_ms,
            distance: 0.0,
            presses: 0,
            releases: 0,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// Totals over every segment of one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source: InputSource,
    pub segments: usize,
    pub total_distance: f64,
    pub presses: u32,
    pub releases: u32,
    pub total_duration_ms: i64,
    pub mean_duration_ms: f64,
}

/// A finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub start_ms: i64,
    pub end_ms: i64,
    pub segments: Vec<Segment>,
    pub summaries: Vec<SourceSummary>,
}

impl Recording {
    pub fn summary(&self, source: InputSource) -> Option<&SourceSummary> {
        self.summaries.iter().find(|s| s.source == source)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the recording as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!(
            "recording saved to {} ({} segments)",
            path.display(),
            self.segments.len()
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InteractionRecorder {
    start_ms: Option<i64>,
    segments: Vec<Segment>,
    current: Option<Segment>,
    last_cursor: Option<Point2>,
}

impl InteractionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one frame of merged input.
    pub fn record(&mut self, now_ms: i64, input: &ArbitratedInput) {
        self.start_ms.get_or_insert(now_ms);

        let step = self
            .last_cursor
            .map_or(0.0, |last| f64::from(last.distance(input.cursor)));
        self.last_cursor = Some(input.cursor);

        let attributed = match input.source {
            InputSource::Gesture => Some(InputSource::Gesture),
            InputSource::Pointer if input.pointer_moved || input.press || input.release => {
                Some(InputSource::Pointer)
            }
            InputSource::Pointer => None,
        };

        if let Some(source) = attributed {
            if self.current.as_ref().map(|s| s.source) != Some(source) {
                if let Some(mut done) = self.current.take() {
                    done.end_ms = now_ms;
                    debug!(
                        "{} segment closed after {}ms",
                        done.source.as_str(),
                        done.duration_ms()
                    );
                    self.segments.push(done);
                }
                self.current = Some(Segment::new(source, now_ms));
            }
        }

        if let Some(seg) = self.current.as_mut() {
            seg.distance += step;
            seg.presses += u32::from(input.press);
            seg.releases += u32::from(input.release);
            seg.end_ms = now_ms;
        }
    }

    /// Segments closed so far, not counting the one in progress.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Close the session at `now_ms`.
    pub fn finish(mut self, now_ms: i64) -> Recording {
        if let Some(mut last) = self.current.take() {
            last.end_ms = now_ms;
            self.segments.push(last);
        }
        let summaries = [InputSource::Pointer, InputSource::Gesture]
            .into_iter()
            .map(|source| summarize(&self.segments, source))
            .collect();
        Recording {
            start_ms: self.start_ms.unwrap_or(now_ms),
            end_ms: now_ms,
            segments: self.segments,
            summaries,
        }
    }
}

fn summarize(segments: &[Segment], source: InputSource) -> SourceSummary {
    let mut summary = SourceSummary {
        source,
        segments: 0,
        total_distance: 0.0,
        presses: 0,
        releases: 0,
        total_duration_ms: 0,
        mean_duration_ms: 0.0,
    };
    for seg in segments.iter().filter(|s| s.source == source) {
        summary.segments += 1;
        summary.total_distance += seg.distance;
        summary.presses += seg.presses;
        summary.releases += seg.releases;
        summary.total_duration_ms += seg.duration_ms();
    }
    if summary.segments > 0 {
        summary.mean_duration_ms = summary.total_duration_ms as f64 / summary.segments as f64;
    }
    summary
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn input(source: InputSource, x: f32, moved: bool) -> ArbitratedInput {
        ArbitratedInput {
            source,
            cursor: Point2::new(x, 0.0),
            press: false,
            release: false,
            pointer_moved: moved,
        }
    }

    #[test]
    fn test_empty_session() {
        let r = InteractionRecorder::new().finish(100);
        assert!(r.segments.is_empty());
        assert_eq!(r.start_ms, 100);
        let s = r.summary(InputSource::Gesture).unwrap();
        assert_eq!(s.segments, 0);
        assert_eq!(s.mean_duration_ms, 0.0);
    }

    #[test]
    fn test_idle_pointer_opens_no_segment() {
        let mut rec = InteractionRecorder::new();
        for t in 0..5 {
            rec.record(t * 10, &input(InputSource::Pointer, 0.0, false));
        }
        assert!(rec.finish(50).segments.is_empty());
    }

    #[test]
    fn test_segments_split_by_source() {
        let mut rec = InteractionRecorder::new();
        rec.record(0, &input(InputSource::Pointer, 0.0, true));
        rec.record(10, &input(InputSource::Pointer, 10.0, true));
        rec.record(20, &input(InputSource::Gesture, 30.0, false));
        let mut click = input(InputSource::Gesture, 30.0, false);
        click.press = true;
        rec.record(30, &click);
        let mut up = input(InputSource::Gesture, 34.0, false);
        up.release = true;
        rec.record(40, &up);
        // Idle pointer poll extends the gesture segment.
        rec.record(50, &input(InputSource::Pointer, 34.0, false));
        assert_eq!(rec.segments().len(), 1);

        let r = rec.finish(60);
        assert_eq!(r.segments.len(), 2);

        let p = &r.segments[0];
        assert_eq!(p.source, InputSource::Pointer);
        assert_eq!((p.start_ms, p.end_ms), (0, 20));
        assert!((p.distance - 10.0).abs() < 1e-6);

        let g = &r.segments[1];
        assert_eq!(g.source, InputSource::Gesture);
        assert_eq!((g.start_ms, g.end_ms), (20, 60));
        assert!((g.distance - 24.0).abs() < 1e-6);
        assert_eq!((g.presses, g.releases), (1, 1));

        let gs = r.summary(InputSource::Gesture).unwrap();
        assert_eq!(gs.segments, 1);
        assert_eq!(gs.total_duration_ms, 40);
        assert!((gs.mean_duration_ms - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_duration_over_segments() {
        let mut rec = InteractionRecorder::new();
        rec.record(0, &input(InputSource::Gesture, 0.0, false));
        rec.record(100, &input(InputSource::Pointer, 0.0, true));
        rec.record(150, &input(InputSource::Gesture, 0.0, false));
        let r = rec.finish(450);
        let gs = r.summary(InputSource::Gesture).unwrap();
        assert_eq!(gs.segments, 2);
        assert_eq!(gs.total_duration_ms, 400);
        assert!((gs.mean_duration_ms - 200.0).abs() < 1e-9);
        let ps = r.summary(InputSource::Pointer).unwrap();
        assert_eq!(ps.total_duration_ms, 50);
    }

    #[test]
    fn test_json_shape() {
        let mut rec = InteractionRecorder::new();
        rec.record(0, &input(InputSource::Gesture, 0.0, false));
        let json = rec.finish(10).to_json().unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["segments"][0]["source"], "gesture");
        assert_eq!(v["summaries"][0]["source"], "pointer");
        assert_eq!(v["end_ms"], 10);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut rec = InteractionRecorder::new();
        rec.record(0, &input(InputSource::Pointer, 0.0, true));
        rec.record(5, &input(InputSource::Pointer, 3.0, true));
        let r = rec.finish(10);
        r.save(&path).unwrap();
        let back: Recording =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, r);
    }
}
