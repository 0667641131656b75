//! Geometric primitives for layout analysis.
//!
//! Provides points, axis-aligned and oriented rectangles, line segments and
//! affine transformation matrices, together with the containment and
//! intersection predicates the clustering and table subsystems are built on.
//!
//! Constructors do not validate their input: callers must supply finite
//! coordinates.

pub mod bezier;
pub mod clipping;
pub mod distance;
pub mod hull;
pub mod kdtree;

/// Small epsilon for floating-point comparisons.
pub(crate) const EPSILON: f64 = 1e-9;

/// Tolerance below which a rectangle's rotation counts as axis-aligned.
pub(crate) const AXIS_ALIGNED_TOLERANCE: f64 = 1e-5;

/// Compares two floats for approximate equality.
#[inline]
pub(crate) fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// A 2D point (x, y). Immutable.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn add(&self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    #[inline]
    pub fn subtract(&self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    #[inline]
    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the cross product of two points taken as vectors.
    #[inline]
    pub(crate) fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

/// True iff the three points make a strict counter-clockwise turn.
#[inline]
pub(crate) fn ccw(p1: Point, p2: Point, p3: Point) -> bool {
    (p2.x - p1.x) * (p3.y - p1.y) > (p2.y - p1.y) * (p3.x - p1.x)
}

/// Orientation of the turn p1 -> p2 -> p3: positive is counter-clockwise,
/// negative clockwise, zero collinear (within EPSILON).
#[inline]
pub(crate) fn orientation(p1: Point, p2: Point, p3: Point) -> i8 {
    let v = (p2.x - p1.x) * (p3.y - p1.y) - (p2.y - p1.y) * (p3.x - p1.x);
    if v > EPSILON {
        1
    } else if v < -EPSILON {
        -1
    } else {
        0
    }
}

/// A rectangle given by its four corner points.
///
/// Corners may be rotated around the origin; a rectangle whose rotation is
/// zero within a small tolerance is treated as axis-aligned and gets the
/// cheaper coordinate-comparison predicates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle {
    pub bottom_left: Point,
    pub bottom_right: Point,
    pub top_left: Point,
    pub top_right: Point,
}

impl Rectangle {
    /// Axis-aligned rectangle from its bottom-left and top-right corners.
    pub fn new(bottom_left: Point, top_right: Point) -> Self {
        Self {
            bottom_left,
            bottom_right: Point::new(top_right.x, bottom_left.y),
            top_left: Point::new(bottom_left.x, top_right.y),
            top_right,
        }
    }

    /// Rectangle from four explicit corners, possibly rotated.
    pub const fn from_corners(
        bottom_left: Point,
        bottom_right: Point,
        top_left: Point,
        top_right: Point,
    ) -> Self {
        Self {
            bottom_left,
            bottom_right,
            top_left,
            top_right,
        }
    }

    /// Length of the bottom edge.
    pub fn width(&self) -> f64 {
        let d = self.bottom_right.subtract(self.bottom_left);
        d.dot(d).sqrt()
    }

    /// Length of the left edge.
    pub fn height(&self) -> f64 {
        let d = self.top_left.subtract(self.bottom_left);
        d.dot(d).sqrt()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Rotation of the bottom edge in radians, in (-pi, pi].
    pub fn rotation(&self) -> f64 {
        (self.bottom_right.y - self.bottom_left.y).atan2(self.bottom_right.x - self.bottom_left.x)
    }

    pub fn is_axis_aligned(&self) -> bool {
        self.rotation().abs() < AXIS_ALIGNED_TOLERANCE
    }

    /// Smallest x coordinate over all corners.
    pub fn left(&self) -> f64 {
        self.corners().iter().map(|p| p.x).fold(f64::INFINITY, f64::min)
    }

    pub fn right(&self) -> f64 {
        self.corners()
            .iter()
            .map(|p| p.x)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn bottom(&self) -> f64 {
        self.corners().iter().map(|p| p.y).fold(f64::INFINITY, f64::min)
    }

    pub fn top(&self) -> f64 {
        self.corners()
            .iter()
            .map(|p| p.y)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn centroid(&self) -> Point {
        Point::new(
            (self.bottom_left.x + self.bottom_right.x + self.top_left.x + self.top_right.x) / 4.0,
            (self.bottom_left.y + self.bottom_right.y + self.top_left.y + self.top_right.y) / 4.0,
        )
    }

    /// Corners in perimeter order: bottom-left, bottom-right, top-right, top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.bottom_left,
            self.bottom_right,
            self.top_right,
            self.top_left,
        ]
    }

    /// The smallest axis-aligned rectangle containing all four corners.
    pub fn normalise(&self) -> Rectangle {
        Rectangle::new(
            Point::new(self.left(), self.bottom()),
            Point::new(self.right(), self.top()),
        )
    }

    /// The smallest axis-aligned rectangle containing both rectangles.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle::new(
            Point::new(self.left().min(other.left()), self.bottom().min(other.bottom())),
            Point::new(self.right().max(other.right()), self.top().max(other.top())),
        )
    }

    /// Whether the point lies inside the rectangle.
    ///
    /// Axis-aligned rectangles compare coordinates, strictly unless
    /// `include_border` is set. Rotated rectangles use the sum-of-triangle
    /// areas test: the point is inside iff the four triangles it forms with
    /// the corners sum to the rectangle area, and on the border iff any
    /// triangle is degenerate.
    pub fn contains_point(&self, point: Point, include_border: bool) -> bool {
        if self.is_axis_aligned() {
            let (l, r, b, t) = (self.left(), self.right(), self.bottom(), self.top());
            return if include_border {
                point.x >= l && point.x <= r && point.y >= b && point.y <= t
            } else {
                point.x > l && point.x < r && point.y > b && point.y < t
            };
        }

        let corners = self.corners();
        let mut sum = 0.0;
        let mut on_edge = false;
        for i in 0..4 {
            let a = triangle_area(point, corners[i], corners[(i + 1) % 4]);
            if a < AXIS_ALIGNED_TOLERANCE {
                on_edge = true;
            }
            sum += a;
        }
        // Points beyond the rectangle also degenerate one triangle when
        // collinear with an edge; the area sum rules them out first.
        if !approx_eq(sum, self.area(), AXIS_ALIGNED_TOLERANCE) {
            return false;
        }
        if on_edge {
            return include_border;
        }
        true
    }

    /// Whether every corner of `other` lies inside this rectangle.
    pub fn contains_rect(&self, other: &Rectangle, include_border: bool) -> bool {
        other
            .corners()
            .iter()
            .all(|&c| self.contains_point(c, include_border))
    }

    /// Whether the two rectangles overlap or touch.
    pub fn intersects_with(&self, other: &Rectangle) -> bool {
        if self.is_axis_aligned() && other.is_axis_aligned() {
            return self.left() <= other.right()
                && other.left() <= self.right()
                && self.bottom() <= other.top()
                && other.bottom() <= self.top();
        }

        // Cheap reject on the normalised boxes first.
        if !self.normalise().intersects_with(&other.normalise()) {
            return false;
        }
        if other.corners().iter().any(|&c| self.contains_point(c, true))
            || self.corners().iter().any(|&c| other.contains_point(c, true))
        {
            return true;
        }
        let own = self.edges();
        let theirs = other.edges();
        own.iter()
            .any(|e1| theirs.iter().any(|e2| e1.intersects(e2)))
    }

    /// Intersection of the two rectangles as an axis-aligned rectangle, or
    /// `None` when they do not overlap. Rotated inputs are normalised first.
    pub fn intersect(&self, other: &Rectangle) -> Option<Rectangle> {
        let a = self.normalise();
        let b = other.normalise();
        let left = a.left().max(b.left());
        let right = a.right().min(b.right());
        let bottom = a.bottom().max(b.bottom());
        let top = a.top().min(b.top());
        if left > right || bottom > top {
            return None;
        }
        Some(Rectangle::new(Point::new(left, bottom), Point::new(right, top)))
    }

    /// The four edges in perimeter order.
    pub fn edges(&self) -> [LineSegment; 4] {
        let c = self.corners();
        [
            LineSegment::new(c[0], c[1]),
            LineSegment::new(c[1], c[2]),
            LineSegment::new(c[2], c[3]),
            LineSegment::new(c[3], c[0]),
        ]
    }
}

fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    (b.subtract(a).cross(c.subtract(a))).abs() / 2.0
}

/// An ordered pair of points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    pub from: Point,
    pub to: Point,
}

impl LineSegment {
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn is_vertical(&self) -> bool {
        self.from.x == self.to.x
    }

    pub fn is_horizontal(&self) -> bool {
        self.from.y == self.to.y
    }

    pub fn length(&self) -> f64 {
        let d = self.to.subtract(self.from);
        d.dot(d).sqrt()
    }

    /// Slope of the carrying line; NaN for vertical segments.
    pub fn slope(&self) -> f64 {
        if self.is_vertical() {
            f64::NAN
        } else {
            (self.to.y - self.from.y) / (self.to.x - self.from.x)
        }
    }

    /// Y-intercept of the carrying line; for vertical segments this is the
    /// shared x-value instead.
    pub fn intercept(&self) -> f64 {
        if self.is_vertical() {
            self.from.x
        } else {
            self.from.y - self.slope() * self.from.x
        }
    }

    pub fn is_parallel_to(&self, other: &LineSegment) -> bool {
        if self.is_vertical() || other.is_vertical() {
            return self.is_vertical() && other.is_vertical();
        }
        approx_eq(self.slope(), other.slope(), EPSILON)
    }

    /// Whether the point lies on the segment (collinear and within bounds).
    pub fn contains_point(&self, point: Point) -> bool {
        if orientation(self.from, self.to, point) != 0 {
            return false;
        }
        within_bounds(self, point)
    }

    /// Segment/segment crossing test using turn signs, including touching
    /// and collinear-overlap configurations.
    pub fn intersects(&self, other: &LineSegment) -> bool {
        let o1 = orientation(self.from, self.to, other.from);
        let o2 = orientation(self.from, self.to, other.to);
        let o3 = orientation(other.from, other.to, self.from);
        let o4 = orientation(other.from, other.to, self.to);

        if o1 != o2 && o3 != o4 {
            return true;
        }
        (o1 == 0 && within_bounds(self, other.from))
            || (o2 == 0 && within_bounds(self, other.to))
            || (o3 == 0 && within_bounds(other, self.from))
            || (o4 == 0 && within_bounds(other, self.to))
    }

    /// The crossing point of the two segments, if any.
    ///
    /// Computed from slope and intercept of the carrying lines, with a
    /// special-case path for vertical segments. Parallel segments return
    /// `None` even when they overlap: there is no unique crossing.
    pub fn intersection_with(&self, other: &LineSegment) -> Option<Point> {
        if !self.intersects(other) {
            return None;
        }
        if self.is_parallel_to(other) {
            return None;
        }

        let point = if self.is_vertical() {
            let x = self.from.x;
            Point::new(x, other.slope() * x + other.intercept())
        } else if other.is_vertical() {
            let x = other.from.x;
            Point::new(x, self.slope() * x + self.intercept())
        } else {
            let x = (other.intercept() - self.intercept()) / (self.slope() - other.slope());
            Point::new(x, self.slope() * x + self.intercept())
        };
        Some(point)
    }
}

fn within_bounds(segment: &LineSegment, point: Point) -> bool {
    point.x >= segment.from.x.min(segment.to.x) - EPSILON
        && point.x <= segment.from.x.max(segment.to.x) + EPSILON
        && point.y >= segment.from.y.min(segment.to.y) - EPSILON
        && point.y <= segment.from.y.max(segment.to.y) + EPSILON
}

/// A 6-element affine transformation matrix (a, b, c, d, e, f).
/// Transforms point (x, y) to (ax + cy + e, bx + dy + f).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub const fn translation(tx: f64, ty: f64) -> Matrix {
        Matrix {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: tx,
            f: ty,
        }
    }

    pub const fn scale(sx: f64, sy: f64) -> Matrix {
        Matrix {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Counter-clockwise rotation about the origin.
    pub fn rotation(radians: f64) -> Matrix {
        let (sin, cos) = radians.sin_cos();
        Matrix {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Matrix product `self * other` (apply `self`, then `other`).
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    #[inline]
    pub fn transform(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Transforms all four corners.
    pub fn transform_rectangle(&self, rect: &Rectangle) -> Rectangle {
        Rectangle::from_corners(
            self.transform(rect.bottom_left),
            self.transform(rect.bottom_right),
            self.transform(rect.top_left),
            self.transform(rect.top_right),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rectangle {
        Rectangle::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn axis_aligned_contains_point() {
        let r = rect(0.0, 0.0, 10.0, 5.0);
        assert!(r.contains_point(Point::new(5.0, 2.5), false));
        assert!(!r.contains_point(Point::new(0.0, 0.0), false));
        assert!(r.contains_point(Point::new(0.0, 0.0), true));
        assert!(!r.contains_point(Point::new(10.1, 2.0), true));
    }

    #[test]
    fn rotated_contains_point_by_triangle_areas() {
        // Unit square rotated 45 degrees about its centre (0.5, 0.5).
        let m = Matrix::translation(-0.5, -0.5)
            .multiply(&Matrix::rotation(std::f64::consts::FRAC_PI_4))
            .multiply(&Matrix::translation(0.5, 0.5));
        let r = m.transform_rectangle(&rect(0.0, 0.0, 1.0, 1.0));
        assert!(!r.is_axis_aligned());
        assert!(r.contains_point(Point::new(0.5, 0.5), false));
        // A corner of the unrotated square is now outside.
        assert!(!r.contains_point(Point::new(0.99, 0.99), false));
    }

    #[test]
    fn rectangle_intersection_interval_overlap() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        let i = a.intersect(&b).unwrap();
        assert_eq!(i, rect(5.0, 5.0, 10.0, 10.0));
        assert!(a.intersect(&rect(11.0, 11.0, 12.0, 12.0)).is_none());
    }

    #[test]
    fn normalise_recovers_aabb_of_rotated_rect() {
        let m = Matrix::rotation(std::f64::consts::FRAC_PI_2);
        let r = m.transform_rectangle(&rect(0.0, 0.0, 4.0, 2.0));
        let n = r.normalise();
        assert!(approx_eq(n.left(), -2.0, 1e-9));
        assert!(approx_eq(n.right(), 0.0, 1e-9));
        assert!(approx_eq(n.bottom(), 0.0, 1e-9));
        assert!(approx_eq(n.top(), 4.0, 1e-9));
        assert!(approx_eq(r.area(), 8.0, 1e-9));
    }

    #[test]
    fn segment_intersection_crossing() {
        let a = LineSegment::new(Point::new(0.0, 0.0), Point::new(4.0, 4.0));
        let b = LineSegment::new(Point::new(0.0, 4.0), Point::new(4.0, 0.0));
        let p = a.intersection_with(&b).unwrap();
        assert!(approx_eq(p.x, 2.0, 1e-9));
        assert!(approx_eq(p.y, 2.0, 1e-9));
    }

    #[test]
    fn segment_intersection_vertical_special_case() {
        let v = LineSegment::new(Point::new(2.0, -1.0), Point::new(2.0, 5.0));
        let h = LineSegment::new(Point::new(0.0, 1.0), Point::new(4.0, 1.0));
        assert!(v.slope().is_nan());
        assert_eq!(v.intercept(), 2.0);
        let p = v.intersection_with(&h).unwrap();
        assert_eq!(p, Point::new(2.0, 1.0));
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        let a = LineSegment::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        let b = LineSegment::new(Point::new(0.0, 1.0), Point::new(1.0, 1.0));
        assert!(!a.intersects(&b));
        assert!(a.intersection_with(&b).is_none());
        assert!(a.is_parallel_to(&b));
    }

    #[test]
    fn segment_contains_point() {
        let s = LineSegment::new(Point::new(0.0, 0.0), Point::new(4.0, 2.0));
        assert!(s.contains_point(Point::new(2.0, 1.0)));
        assert!(!s.contains_point(Point::new(2.0, 1.2)));
        assert!(!s.contains_point(Point::new(6.0, 3.0)));
    }

    #[test]
    fn matrix_rotation_roundtrip() {
        let m = Matrix::rotation(0.3);
        let inv = Matrix::rotation(-0.3);
        let p = Point::new(3.0, -2.0);
        let q = inv.transform(m.transform(p));
        assert!(approx_eq(q.x, p.x, 1e-12));
        assert!(approx_eq(q.y, p.y, 1e-12));
    }
}
