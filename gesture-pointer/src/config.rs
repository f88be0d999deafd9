//! Configuration files.
//!
//! Configuration is an s-expression plist, the same shape the status
//! output uses:
//!
//! ```text
//! (:cursor-speed 1.5
//!  :delete-gesture-ms 200
//!  :end-tracking-ms 700
//!  :scale-rect (0.25 0.25 0.75 0.75)
//!  :click-enter-dot 0.8
//!  :horizontal-flip t)
//! ```
//!
//! Missing keys keep their defaults and unknown keys are ignored.

use lexpr::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::capture::CaptureConfig;
use crate::hand::{ClickThresholds, ScaleRect, TrackerConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config is not a valid plist: {0}")]
    Parse(String),

    #[error("invalid value for :{key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Everything the gesture pointer can be configured with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerConfig {
    pub tracker: TrackerConfig,
    pub capture: CaptureConfig,
}

impl PointerConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_sexp(&text)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a config plist.
    pub fn from_sexp(text: &str) -> Result<Self, ConfigError> {
        let value = lexpr::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if !matches!(value, Value::Cons(_) | Value::Null) {
            return Err(ConfigError::Parse(format!("expected a list, got {}", value)));
        }

        let mut config = Self::default();
        let t = &mut config.tracker;

        if let Some(v) = get_f32(&value, "cursor-speed")? {
            t.cursor_speed = v;
        }
        if let Some(v) = get_ms(&value, "delete-gesture-ms")? {
            t.delete_gesture_ms = v;
        }
        if let Some(v) = get_ms(&value, "end-tracking-ms")? {
            t.end_tracking_ms = v;
        }
        if let Some(v) = get_f32(&value, "min-cursor-movement")? {
            t.min_cursor_movement = v;
        }
        if let Some(rect) = get_scale_rect(&value)? {
            t.scale_rect = rect;
        }

        let click = &mut t.click;
        set_thresholds(&value, "click-enter-dot", "click-enter-distance", &mut click.enter)?;
        set_thresholds(&value, "click-hold-dot", "click-hold-distance", &mut click.hold)?;

        if let Some(v) = get_f32(&value, "identity-max-width-change")? {
            t.identity.max_width_change = v;
        }
        if let Some(v) = get_f32(&value, "identity-max-displacement")? {
            t.identity.max_displacement_widths = v;
        }

        if let Some(v) = get_bool(&value, "horizontal-flip") {
            config.capture.horizontal_flip = v;
        }

        config.validate()?;
        debug!("config: {}", config.config_sexp());
        Ok(config)
    }

    /// Reject values the tracker cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tracker;
        if !(t.cursor_speed.is_finite() && t.cursor_speed > 0.0) {
            return Err(invalid("cursor-speed", "must be positive"));
        }
        if t.end_tracking_ms == 0 {
            return Err(invalid("end-tracking-ms", "must be positive"));
        }
        if !(t.min_cursor_movement >= 0.0) {
            return Err(invalid("min-cursor-movement", "must not be negative"));
        }
        if !t.scale_rect.is_valid() {
            return Err(invalid("scale-rect", "needs min < max on both axes"));
        }
        for (dot_key, dist_key, th) in [
            ("click-enter-dot", "click-enter-distance", &t.click.enter),
            ("click-hold-dot", "click-hold-distance", &t.click.hold),
        ] {
            if !(-1.0..=1.0).contains(&th.min_dot) {
                return Err(invalid(dot_key, "must be within [-1, 1]"));
            }
            if !(th.max_distance >= 0.0) {
                return Err(invalid(dist_key, "must not be negative"));
            }
        }
        if !(t.identity.max_width_change >= 0.0) {
            return Err(invalid("identity-max-width-change", "must not be negative"));
        }
        if !(t.identity.max_displacement_widths > 0.0) {
            return Err(invalid("identity-max-displacement", "must be positive"));
        }
        Ok(())
    }

    /// Generate s-expression for the active configuration.  Parses back
    /// to the same config.
    pub fn config_sexp(&self) -> String {
        let t = &self.tracker;
        let r = &t.scale_rect;
        format!(
            "(:cursor-speed {} :delete-gesture-ms {} :end-tracking-ms {} :min-cursor-movement {} :scale-rect ({} {} {} {}) :click-enter-dot {} :click-enter-distance {} :click-hold-dot {} :click-hold-distance {} :identity-max-width-change {} :identity-max-displacement {} :horizontal-flip {})",
            t.cursor_speed,
            t.delete_gesture_ms,
            t.end_tracking_ms,
            t.min_cursor_movement,
            r.min.x,
            r.min.y,
            r.max.x,
            r.max.y,
            t.click.enter.min_dot,
            t.click.enter.max_distance,
            t.click.hold.min_dot,
            t.click.hold.max_distance,
            t.identity.max_width_change,
            t.identity.max_displacement_widths,
            if self.capture.horizontal_flip { "t" } else { "nil" },
        )
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    }
}

// ── Plist helpers ──────────────────────────────────────────

/// Find the value following `:key` in a plist.
///
/// Handles both `Value::Keyword("key")` and `Value::Symbol(":key")`
/// forms, depending on the parser's keyword syntax.
fn get_value<'a>(plist: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = plist;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Get a value as a string, with symbols and keywords unprefixed.
fn get_keyword(plist: &Value, key: &str) -> Option<String> {
    let val = get_value(plist, key)?;
    Some(match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s: &str = v;
            s.strip_prefix(':').unwrap_or(s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => if *b { "t" } else { "nil" }.to_string(),
        Value::Null | Value::Nil => "nil".to_string(),
        _ => val.to_string(),
    })
}

fn get_f32(plist: &Value, key: &'static str) -> Result<Option<f32>, ConfigError> {
    match get_keyword(plist, key) {
        None => Ok(None),
        Some(s) => s
            .parse::<f32>()
            .map(Some)
            .map_err(|_| invalid(key, &format!("expected a number, got {}", s))),
    }
}

fn get_ms(plist: &Value, key: &'static str) -> Result<Option<u32>, ConfigError> {
    match get_keyword(plist, key) {
        None => Ok(None),
        Some(s) => s
            .parse::<u32>()
            .map(Some)
            .map_err(|_| invalid(key, &format!("expected milliseconds, got {}", s))),
    }
}

fn get_bool(plist: &Value, key: &str) -> Option<bool> {
    get_keyword(plist, key).map(|s| s != "nil")
}

/// `:scale-rect (min-x min-y max-x max-y)`.
fn get_scale_rect(plist: &Value) -> Result<Option<ScaleRect>, ConfigError> {
    const KEY: &str = "scale-rect";
    let Some(list) = get_value(plist, KEY) else {
        return Ok(None);
    };

    let mut numbers = Vec::with_capacity(4);
    let mut current = list;
    while let Value::Cons(pair) = current {
        let n = match pair.car() {
            Value::Number(n) => n.to_string().parse::<f32>().ok(),
            _ => None,
        }
        .ok_or_else(|| invalid(KEY, &format!("expected numbers, got {}", pair.car())))?;
        numbers.push(n);
        current = pair.cdr();
    }

    match numbers[..] {
        [min_x, min_y, max_x, max_y] => Ok(Some(ScaleRect::new((min_x, min_y), (max_x, max_y)))),
        _ => Err(invalid(
            KEY,
            &format!("expected 4 numbers, got {}", numbers.len()),
        )),
    }
}

fn set_thresholds(
    plist: &Value,
    dot_key: &'static str,
    distance_key: &'static str,
    thresholds: &mut ClickThresholds,
) -> Result<(), ConfigError> {
    if let Some(v) = get_f32(plist, dot_key)? {
        thresholds.min_dot = v;
    }
    if let Some(v) = get_f32(plist, distance_key)? {
        thresholds.max_distance = v;
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────
