//! Headless runner: replayed detections through the full pipeline.
//!
//! There is no physical pointer, so the pointer is a stationary sample at
//! the screen centre and the gesture wins whenever a hand is tracked.

use anyhow::Context;
use gesture_pointer::replay::{load_replay, replay_pair};
use gesture_pointer::{
    Clock, GesturePointer, InputArbiter, InteractionRecorder, PointerConfig, PointerSample,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Headless run configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Replay file of recorded detections.
    pub replay: PathBuf,
    /// Where to write the interaction recording, if anywhere.
    pub record: Option<PathBuf>,
    /// Virtual screen width in pixels.
    pub width: u32,
    /// Virtual screen height in pixels.
    pub height: u32,
    /// Consumer frames per second.
    pub fps: u32,
    /// Simulated detector latency in milliseconds.
    pub latency_ms: u64,
    /// Exit after this long even if the replay has not finished.
    pub exit_after: Option<Duration>,
    /// Interval between status log lines.
    pub status_interval: Duration,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            replay: PathBuf::new(),
            record: None,
            width: 1920,
            height: 1080,
            fps: 60,
            latency_ms: 0,
            exit_after: None,
            status_interval: Duration::from_secs(5),
        }
    }
}

impl HeadlessConfig {
    /// Parse a "WxH" resolution string. Returns (width, height) or None.
    pub fn parse_resolution(s: &str) -> Option<(u32, u32)> {
        let (w, h) = s.split_once('x')?;
        let w = w.parse::<u32>().ok()?;
        let h = h.parse::<u32>().ok()?;
        if w > 0 && h > 0 {
            Some((w, h))
        } else {
            None
        }
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

/// Install SIGTERM/SIGINT handlers that set the shutdown flag.
fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Run until the replay is exhausted and the hand has timed out, the exit
/// timer fires, or a signal arrives.
pub fn run(config: HeadlessConfig, pointer_config: PointerConfig) -> anyhow::Result<()> {
    let detections = load_replay(&config.replay)?;
    let (source, detector) = replay_pair(detections, Duration::from_millis(config.latency_ms));

    install_signal_handlers();

    let clock = Clock::new();
    let mut pointer = GesturePointer::new(pointer_config.tracker, pointer_config.capture);
    pointer
        .start(source, detector, clock)
        .context("starting capture")?;

    let mut arbiter = InputArbiter::new(config.width, config.height);
    let mut recorder = config.record.as_ref().map(|_| InteractionRecorder::new());
    let idle_pointer = PointerSample::at(config.width as f32 / 2.0, config.height as f32 / 2.0);

    let start_time = Instant::now();
    let frame_interval = config.frame_interval();
    let mut last_status_log = Instant::now();
    let mut frames: u64 = 0;
    let mut presses: u64 = 0;

    info!(
        "headless run at {}x{}, {} fps, entering frame loop",
        config.width, config.height, config.fps
    );

    loop {
        if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
            info!("Shutdown signal received, exiting");
            break;
        }
        if let Some(dur) = config.exit_after {
            if start_time.elapsed() >= dur {
                info!("exit timer fired after {}s", dur.as_secs());
                break;
            }
        }

        let now = clock.now_ms();
        let gesture = pointer.process(now);
        let input = arbiter.arbitrate(now, idle_pointer, &gesture);
        frames += 1;

        if input.press {
            presses += 1;
            info!(
                "press at ({:.0}, {:.0}) via {}",
                input.cursor.x,
                input.cursor.y,
                input.source.as_str()
            );
        }
        if input.release {
            info!("release at ({:.0}, {:.0})", input.cursor.x, input.cursor.y);
        }
        if let Some(rec) = recorder.as_mut() {
            rec.record(now, &input);
        }

        if last_status_log.elapsed() >= config.status_interval {
            info!("status: {}", pointer.status_sexp());
            debug!("arbiter: {}", arbiter.status_sexp());
            last_status_log = Instant::now();
        }

        if pointer.is_drained() && !pointer.tracker().is_tracking() {
            info!("replay finished");
            break;
        }

        std::thread::sleep(frame_interval);
    }

    if pointer.stop() {
        info!("released click still held at shutdown");
    }
    let end = clock.now_ms();

    if let (Some(rec), Some(path)) = (recorder, config.record.as_ref()) {
        rec.finish(end)
            .save(path)
            .with_context(|| format!("writing recording to {}", path.display()))?;
    }

    info!(
        "headless run done: {} frames, {} presses, {}",
        frames,
        presses,
        pointer.tracker().status_sexp()
    );
    Ok(())
}
