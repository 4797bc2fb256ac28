//! Cubic Bézier curves with cached polynomial coefficients.
//!
//! A curve is described by four control points and evaluated in power form:
//!
//! ```text
//! c = 3 (P1 - P0)
//! b = 3 (P2 - P1) - c
//! a = P3 - P0 - c - b
//! B(t) = a t³ + b t² + c t + P0
//! ```
//!
//! Coefficients are computed once in [`CubicCurve::new`]; evaluating a
//! position costs a handful of multiply-adds.

use glam::Vec2;

/// The four points of a cubic Bézier curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoints {
    /// Start anchor.
    pub p0: Vec2,
    /// First handle.
    pub p1: Vec2,
    /// Second handle.
    pub p2: Vec2,
    /// End anchor.
    pub p3: Vec2,
}

/// Power-basis form of a cubic Bézier curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicCurve {
    a: Vec2,
    b: Vec2,
    c: Vec2,
    start: Vec2,
    end: Vec2,
}

impl CubicCurve {
    pub fn new(points: ControlPoints) -> Self {
        let c = 3.0 * (points.p1 - points.p0);
        let b = 3.0 * (points.p2 - points.p1) - c;
        let a = points.p3 - points.p0 - c - b;
        Self {
            a,
            b,
            c,
            start: points.p0,
            end: points.p3,
        }
    }

    /// Position at parameter `t`. No clamping is applied.
    #[inline]
    pub fn at(&self, t: f32) -> Vec2 {
        let t2 = t * t;
        let t3 = t2 * t;
        self.a * t3 + self.b * t2 + self.c * t + self.start
    }

    #[inline]
    pub fn start(&self) -> Vec2 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Vec2 {
        self.end
    }

    /// Cached `(a, b, c)` coefficients.
    pub fn coefficients(&self) -> (Vec2, Vec2, Vec2) {
        (self.a, self.b, self.c)
    }
}

impl From<ControlPoints> for CubicCurve {
    fn from(points: ControlPoints) -> Self {
        CubicCurve::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ControlPoints {
        ControlPoints {
            p0: Vec2::new(-350.0, 910.0),
            p1: Vec2::new(120.5, -40.0),
            p2: Vec2::new(800.0, 333.3),
            p3: Vec2::new(64.0, 17.0),
        }
    }

    #[test]
    fn test_endpoints() {
        let curve = CubicCurve::new(sample());
        assert_eq!(curve.at(0.0), sample().p0);
        assert!(curve.at(1.0).abs_diff_eq(sample().p3, 1e-3));
    }

    #[test]
    fn test_matches_bernstein_form() {
        let pts = sample();
        let curve = CubicCurve::new(pts);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let u = 1.0 - t;
            let expected = pts.p0 * u * u * u
                + pts.p1 * 3.0 * u * u * t
                + pts.p2 * 3.0 * u * t * t
                + pts.p3 * t * t * t;
            assert!(curve.at(t).abs_diff_eq(expected, 1e-2), "t = {t}");
        }
    }

    #[test]
    fn test_straight_line_is_linear() {
        let curve = CubicCurve::new(ControlPoints {
            p0: Vec2::ZERO,
            p1: Vec2::new(1.0, 0.0),
            p2: Vec2::new(2.0, 0.0),
            p3: Vec2::new(3.0, 0.0),
        });
        let (a, b, c) = curve.coefficients();
        assert_eq!(a, Vec2::ZERO);
        assert_eq!(b, Vec2::ZERO);
        assert_eq!(c, Vec2::new(3.0, 0.0));
        assert!(curve.at(0.5).abs_diff_eq(Vec2::new(1.5, 0.0), 1e-6));
    }
}
