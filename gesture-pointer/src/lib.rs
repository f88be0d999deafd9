//! Gesture pointer: turns an asynchronous hand-landmark stream into a
//! stable cursor with pinch clicks, and arbitrates it against a physical
//! pointer.
//!
//! Provides:
//! - `hand`: palm frames, pinch classification, debouncing, cursor tracking
//! - `capture`: capture thread, detector plumbing, consumer façade
//! - `arbiter`: pointer/gesture arbitration
//! - `config`: plist configuration files
//! - `recorder`: interaction session recording
//! - `replay`: recorded detections as a capture source

pub mod arbiter;
pub mod capture;
pub mod config;
pub mod hand;
pub mod recorder;
pub mod replay;

pub use arbiter::{ArbitratedInput, InputArbiter, InputSource, PointerSample};
pub use capture::{CaptureConfig, CaptureError, Clock, GesturePointer};
pub use config::{ConfigError, PointerConfig};
pub use hand::{GestureOutput, HandTracker, RawDetection, TrackerConfig, NO_HAND_TIMESTAMP};
pub use recorder::{InteractionRecorder, Recording};
pub use replay::ReplayError;
