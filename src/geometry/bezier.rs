//! Cubic Bézier curves and the cubic-equation solver behind their
//! intersection queries.
//!
//! The solver covers the full real-root cases: Cardano's formula when the
//! discriminant is non-negative, Viète's trigonometric form for the casus
//! irreducibilis, with quadratic and linear fallbacks for vanishing leading
//! coefficients.

use super::{approx_eq, LineSegment, Point, Rectangle, EPSILON};

/// A cubic Bézier curve: start point, two control points, end point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BezierCurve {
    pub start: Point,
    pub first_control: Point,
    pub second_control: Point,
    pub end: Point,
}

impl BezierCurve {
    pub const fn new(start: Point, first_control: Point, second_control: Point, end: Point) -> Self {
        Self {
            start,
            first_control,
            second_control,
            end,
        }
    }

    /// Evaluate the curve at parameter t in [0, 1].
    pub fn point_at(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let t2 = t * t;
        let (w0, w1, w2, w3) = (mt2 * mt, 3.0 * mt2 * t, 3.0 * mt * t2, t2 * t);
        Point::new(
            w0 * self.start.x + w1 * self.first_control.x + w2 * self.second_control.x + w3 * self.end.x,
            w0 * self.start.y + w1 * self.first_control.y + w2 * self.second_control.y + w3 * self.end.y,
        )
    }

    /// Split the curve at parameter tau by the de Casteljau triangular
    /// interpolation scheme. Concatenating the halves reproduces the
    /// original curve.
    pub fn split(&self, tau: f64) -> (BezierCurve, BezierCurve) {
        let lerp = |a: Point, b: Point| Point::new(a.x + (b.x - a.x) * tau, a.y + (b.y - a.y) * tau);

        let p01 = lerp(self.start, self.first_control);
        let p12 = lerp(self.first_control, self.second_control);
        let p23 = lerp(self.second_control, self.end);
        let p012 = lerp(p01, p12);
        let p123 = lerp(p12, p23);
        let split_point = lerp(p012, p123);

        (
            BezierCurve::new(self.start, p01, p012, split_point),
            BezierCurve::new(split_point, p123, p23, self.end),
        )
    }

    /// Axis-aligned bounds of the control polygon; contains the curve.
    pub(crate) fn control_bounds(&self) -> Rectangle {
        let xs = [self.start.x, self.first_control.x, self.second_control.x, self.end.x];
        let ys = [self.start.y, self.first_control.y, self.second_control.y, self.end.y];
        Rectangle::new(
            Point::new(
                xs.iter().copied().fold(f64::INFINITY, f64::min),
                ys.iter().copied().fold(f64::INFINITY, f64::min),
            ),
            Point::new(
                xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            ),
        )
    }

    /// Points where the curve crosses the line segment.
    ///
    /// The segment's carrying line is taken implicitly as Ax + By + C = 0
    /// and substituted into the parametric cubic; real roots with t in
    /// [-eps, 1 + eps] whose evaluated points lie on the segment itself are
    /// returned. A bounding-box pre-filter skips curves that cannot touch
    /// the segment.
    pub fn intersections_with_segment(&self, segment: &LineSegment) -> Vec<Point> {
        let seg_bounds = Rectangle::new(
            Point::new(
                segment.from.x.min(segment.to.x),
                segment.from.y.min(segment.to.y),
            ),
            Point::new(
                segment.from.x.max(segment.to.x),
                segment.from.y.max(segment.to.y),
            ),
        );
        if !self.control_bounds().intersects_with(&seg_bounds) {
            return Vec::new();
        }

        // Implicit line through the segment.
        let a_l = segment.to.y - segment.from.y;
        let b_l = segment.from.x - segment.to.x;
        let c_l = segment.to.x * segment.from.y - segment.from.x * segment.to.y;

        // Power-basis coefficients of the parametric cubic.
        let coeffs = |p0: f64, p1: f64, p2: f64, p3: f64| {
            (
                -p0 + 3.0 * p1 - 3.0 * p2 + p3,
                3.0 * p0 - 6.0 * p1 + 3.0 * p2,
                -3.0 * p0 + 3.0 * p1,
                p0,
            )
        };
        let (ax, bx, cx, dx) = coeffs(self.start.x, self.first_control.x, self.second_control.x, self.end.x);
        let (ay, by, cy, dy) = coeffs(self.start.y, self.first_control.y, self.second_control.y, self.end.y);

        let roots = solve_cubic(
            a_l * ax + b_l * ay,
            a_l * bx + b_l * by,
            a_l * cx + b_l * cy,
            a_l * dx + b_l * dy + c_l,
        );

        let mut points = Vec::new();
        for t in roots {
            if !(-EPSILON..=1.0 + EPSILON).contains(&t) {
                continue;
            }
            let p = self.point_at(t.clamp(0.0, 1.0));
            if segment.contains_point(p) {
                points.push(p);
            }
        }
        points
    }
}

/// Real roots of a*x^3 + b*x^2 + c*x + d = 0.
///
/// Falls back to the quadratic (and linear) formula when the leading
/// coefficients vanish. With a genuine cubic, a non-negative discriminant
/// goes through Cardano's radicals and yields one real root (two when the
/// imaginary part of the conjugate pair cancels); a negative discriminant is
/// the casus irreducibilis and yields three real roots through Viète's
/// trigonometric form.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a.abs() < EPSILON {
        return solve_quadratic(b, c, d);
    }

    let q = (3.0 * a * c - b * b) / (9.0 * a * a);
    let r = (9.0 * a * b * c - 27.0 * a * a * d - 2.0 * b * b * b) / (54.0 * a * a * a);
    let det = q * q * q + r * r;
    let shift = -b / (3.0 * a);

    if det >= 0.0 {
        let sqrt_det = det.sqrt();
        let s = (r + sqrt_det).cbrt();
        let t = (r - sqrt_det).cbrt();
        let mut roots = vec![s + t + shift];
        // The conjugate pair is real when its imaginary part cancels.
        if approx_eq(3.0_f64.sqrt() / 2.0 * (s - t), 0.0, EPSILON) {
            roots.push(-(s + t) / 2.0 + shift);
        }
        roots
    } else {
        let theta = (r / (-q * q * q).sqrt()).clamp(-1.0, 1.0).acos();
        let magnitude = 2.0 * (-q).sqrt();
        (0..3)
            .map(|k| {
                magnitude * ((theta - 2.0 * std::f64::consts::PI * k as f64) / 3.0).cos() + shift
            })
            .collect()
    }
}

fn solve_quadratic(b: f64, c: f64, d: f64) -> Vec<f64> {
    if b.abs() < EPSILON {
        if c.abs() < EPSILON {
            return Vec::new();
        }
        return vec![-d / c];
    }
    let discriminant = c * c - 4.0 * b * d;
    if discriminant < 0.0 {
        return Vec::new();
    }
    let sqrt_disc = discriminant.sqrt();
    vec![(-c + sqrt_disc) / (2.0 * b), (-c - sqrt_disc) / (2.0 * b)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roots(mut got: Vec<f64>, expected: &[f64]) {
        got.sort_by(f64::total_cmp);
        assert_eq!(got.len(), expected.len(), "roots {got:?}");
        for (g, e) in got.iter().zip(expected) {
            assert!((g - e).abs() < 1e-9, "got {g}, expected {e}");
        }
    }

    #[test]
    fn cubic_three_real_roots() {
        assert_roots(solve_cubic(1.0, -6.0, 11.0, -6.0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn cubic_single_real_root() {
        // x^3 - 1 has one real root; the conjugate pair is complex.
        assert_roots(solve_cubic(1.0, 0.0, 0.0, -1.0), &[1.0]);
    }

    #[test]
    fn cubic_repeated_root() {
        // (x - 1)^2 (x + 2) = x^3 - 3x + 2: det == 0, two distinct values.
        assert_roots(solve_cubic(1.0, 0.0, -3.0, 2.0), &[-2.0, 1.0]);
    }

    #[test]
    fn quadratic_fallback() {
        assert_roots(solve_cubic(0.0, 1.0, -3.0, 2.0), &[1.0, 2.0]);
        assert_roots(solve_cubic(0.0, 1.0, 0.0, 1.0), &[]);
        assert_roots(solve_cubic(0.0, 0.0, 2.0, -4.0), &[2.0]);
    }

    #[test]
    fn residual_bound_on_random_cubics() {
        // Deterministic pseudo-random coefficients.
        let mut state = 0x9E37_79B9_7F4A_7C15_u64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state as f64 / u64::MAX as f64) * 20.0 - 10.0
        };
        for _ in 0..200 {
            let (a, b, c, d) = (next(), next(), next(), next());
            if a.abs() < 1e-3 {
                continue;
            }
            let scale = a.abs() + b.abs() + c.abs() + d.abs();
            for r in solve_cubic(a, b, c, d) {
                let residual = a * r * r * r + b * r * r + c * r + d;
                assert!(residual.abs() < 1e-6 * scale, "residual {residual} for root {r}");
            }
        }
    }

    #[test]
    fn split_halves_reproduce_curve() {
        let curve = BezierCurve::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 3.0),
            Point::new(3.0, 3.0),
            Point::new(4.0, 0.0),
        );
        let tau = 0.3;
        let (left, right) = curve.split(tau);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let original = curve.point_at(t);
            let sampled = if t <= tau {
                left.point_at(t / tau)
            } else {
                right.point_at((t - tau) / (1.0 - tau))
            };
            assert!((original.x - sampled.x).abs() < 1e-9);
            assert!((original.y - sampled.y).abs() < 1e-9);
        }
    }

    #[test]
    fn curve_segment_intersections() {
        // An arch over the x-axis crosses a horizontal segment twice.
        let curve = BezierCurve::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 4.0),
            Point::new(3.0, 4.0),
            Point::new(4.0, 0.0),
        );
        let segment = LineSegment::new(Point::new(0.0, 1.5), Point::new(4.0, 1.5));
        let hits = curve.intersections_with_segment(&segment);
        assert_eq!(hits.len(), 2);
        for p in &hits {
            assert!((p.y - 1.5).abs() < 1e-9);
        }

        // The same segment far above the curve misses entirely, and the
        // bounding-box pre-filter rejects a distant segment outright.
        let above = LineSegment::new(Point::new(0.0, 5.0), Point::new(4.0, 5.0));
        assert!(curve.intersections_with_segment(&above).is_empty());
        let far = LineSegment::new(Point::new(50.0, 50.0), Point::new(60.0, 50.0));
        assert!(curve.intersections_with_segment(&far).is_empty());
    }

    #[test]
    fn segment_shorter_than_line_filters_hits() {
        // The carrying line crosses, the segment itself stops short.
        let curve = BezierCurve::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 4.0),
            Point::new(3.0, 4.0),
            Point::new(4.0, 0.0),
        );
        let short = LineSegment::new(Point::new(0.0, 1.5), Point::new(0.2, 1.5));
        assert!(curve.intersections_with_segment(&short).is_empty());
    }
}
