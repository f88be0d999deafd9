//! Hand landmark processing, from raw detections to a debounced cursor.
//!
//! Provides:
//! - `landmarks`: landmark indices and the raw detection types
//! - `frame`: palm-relative coordinate frame per detection
//! - `classifier`: hand identity and pinch classification
//! - `debounce`: click debouncing over a trailing window
//! - `cursor`: cursor interpolation math
//! - `tracker`: tracking lifecycle and per-frame output

pub mod classifier;
pub mod cursor;
pub mod debounce;
pub mod frame;
pub mod landmarks;
pub mod tracker;

pub use classifier::{ClickConfig, ClickThresholds, IdentityConfig};
pub use cursor::{Point2, ScaleRect};
pub use debounce::{ClickDebouncer, ClickEdge};
pub use frame::{GeometryError, HandFrame};
pub use landmarks::{DetectedHand, HandLandmark, Handedness, Landmark, RawDetection, LANDMARK_COUNT};
pub use tracker::{GestureOutput, HandTracker, TrackerConfig, TrackerStats, NO_HAND_TIMESTAMP};
