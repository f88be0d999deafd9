//! Cursor interpolation in normalized screen space.
//!
//! The cursor chases the tracked hand at a bounded speed.  When a distinct
//! previous hand position is known, the chase bends through it as a
//! quadratic Bezier step instead of cutting straight across.

/// A point in normalized `[0,1]²` screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Clamp both coordinates into `[0,1]`.
    pub fn clamped(&self) -> Point2 {
        Point2::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }

    pub fn as_tuple(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

impl From<(f32, f32)> for Point2 {
    fn from(p: (f32, f32)) -> Self {
        Point2::new(p.0, p.1)
    }
}

/// Linear interpolation from `a` to `b` by `t`.
pub fn lerp(a: Point2, b: Point2, t: f32) -> Point2 {
    Point2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

// ── Scale rect ─────────────────────────────────────────────

/// Sub-region of camera space stretched over the whole screen, so a small
/// range of hand motion covers every corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRect {
    pub min: Point2,
    pub max: Point2,
}

impl ScaleRect {
    pub fn new(min: (f32, f32), max: (f32, f32)) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// The identity mapping.
    pub fn full() -> Self {
        Self::new((0.0, 0.0), (1.0, 1.0))
    }

    /// Whether the rect has positive extent on both axes.
    pub fn is_valid(&self) -> bool {
        self.max.x - self.min.x > 0.0 && self.max.y - self.min.y > 0.0
    }

    /// Map a camera-normalized point to screen space, clamped to `[0,1]²`.
    pub fn map(&self, x: f32, y: f32) -> Point2 {
        Point2::new(
            (x - self.min.x) / (self.max.x - self.min.x),
            (y - self.min.y) / (self.max.y - self.min.y),
        )
        .clamped()
    }
}

impl Default for ScaleRect {
    fn default() -> Self {
        Self::new((0.25, 0.25), (0.75, 0.75))
    }
}

// ── Stepping ───────────────────────────────────────────────

/// Fraction of the remaining distance covered this step.
///
/// `speed` is in screen units per second, `dt_ms` in milliseconds.  A zero
/// distance yields 1 so the cursor settles exactly on the target.
pub fn step_fraction(cursor: Point2, target: Point2, speed: f32, dt_ms: i64) -> f32 {
    let dist = cursor.distance(target);
    if dist <= f32::EPSILON {
        return 1.0;
    }
    let dt_s = dt_ms.max(0) as f32 / 1000.0;
    (speed * dt_s / dist).clamp(0.0, 1.0)
}

/// Move straight toward `target` by `t` of the remaining distance.
pub fn step_linear(cursor: Point2, target: Point2, t: f32) -> Point2 {
    lerp(cursor, target, t).clamped()
}

/// De Casteljau step of the quadratic curve `cursor → previous → target`.
pub fn step_quadratic(cursor: Point2, previous: Point2, target: Point2, t: f32) -> Point2 {
    let a = lerp(cursor, previous, t);
    let b = lerp(previous, target, t);
    lerp(a, b, t).clamped()
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point2, b: Point2) -> bool {
        a.distance(b) < 1e-5
    }

    #[test]
    fn test_scale_rect_map() {
        let r = ScaleRect::default();
        assert!(close(r.map(0.5, 0.5), Point2::new(0.5, 0.5)));
        assert!(close(r.map(0.25, 0.75), Point2::new(0.0, 1.0)));
        // Outside the rect clamps to the screen edge.
        assert!(close(r.map(0.1, 0.9), Point2::new(0.0, 1.0)));
        assert!(close(ScaleRect::full().map(0.3, 0.6), Point2::new(0.3, 0.6)));
    }

    #[test]
    fn test_scale_rect_validity() {
        assert!(ScaleRect::default().is_valid());
        assert!(!ScaleRect::new((0.5, 0.2), (0.5, 0.8)).is_valid());
        assert!(!ScaleRect::new((0.6, 0.2), (0.4, 0.8)).is_valid());
    }

    #[test]
    fn test_step_fraction() {
        let a = Point2::new(0.5, 0.5);
        let b = Point2::new(0.6, 0.5);
        assert!((step_fraction(a, b, 0.5, 50) - 0.25).abs() < 1e-4);
        // Capped at the target.
        assert!((step_fraction(a, b, 10.0, 50) - 1.0).abs() < f32::EPSILON);
        // Zero or negative time makes no progress.
        assert_eq!(step_fraction(a, b, 0.5, 0), 0.0);
        assert_eq!(step_fraction(a, b, 0.5, -20), 0.0);
        // At rest.
        assert_eq!(step_fraction(a, a, 0.5, 50), 1.0);
    }

    #[test]
    fn test_step_linear() {
        let p = step_linear(Point2::new(0.5, 0.5), Point2::new(0.6, 0.5), 0.25);
        assert!(close(p, Point2::new(0.525, 0.5)));
    }

    #[test]
    fn test_step_quadratic_endpoints() {
        let c = Point2::new(0.2, 0.2);
        let p = Point2::new(0.5, 0.8);
        let t = Point2::new(0.8, 0.2);
        assert!(close(step_quadratic(c, p, t, 0.0), c));
        assert!(close(step_quadratic(c, p, t, 1.0), t));
        let mid = step_quadratic(c, p, t, 0.5);
        // Bezier midpoint: 0.25*c + 0.5*p + 0.25*t.
        assert!(close(mid, Point2::new(0.5, 0.5)));
    }

    #[test]
    fn test_steps_stay_on_screen() {
        let p = step_quadratic(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 1.0),
            1.0,
        );
        assert!(p.x <= 1.0 && p.y <= 1.0);
        let q = step_linear(Point2::new(0.9, 0.9), Point2::new(1.0, 1.0), 1.0);
        assert!(close(q, Point2::new(1.0, 1.0)));
    }
}
