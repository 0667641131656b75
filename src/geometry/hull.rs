//! Convex hull and bounding rectangles.
//!
//! Graham scan, the minimum-area bounding rectangle over the hull (Den
//! Boer's rotating projection), and a cheaper oriented bounding box from a
//! least-squares fit.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

use super::distance::euclidean;
use super::{ccw, Matrix, Point, Rectangle, EPSILON};
use crate::error::{LayoutError, Result};

/// Convex hull of a point set, counter-clockwise starting at the pivot.
///
/// Points are grouped by polar angle modulo pi around the pivot, which is
/// sound only because the pivot is the minimum-(y, x) point: every other
/// point then lies in the closed upper half-plane, so opposite directions
/// cannot collide. Duplicate coordinates are removed before sorting.
///
/// Degenerate inputs: an empty slice is an error, one or two distinct
/// points are returned as-is.
pub fn graham_scan(points: &[Point]) -> Result<Vec<Point>> {
    if points.is_empty() {
        return Err(LayoutError::invalid("graham_scan", "empty point set"));
    }

    let mut unique: Vec<Point> = Vec::with_capacity(points.len());
    let mut seen = std::collections::HashSet::new();
    for &p in points {
        if seen.insert((OrderedFloat(p.x), OrderedFloat(p.y))) {
            unique.push(p);
        }
    }
    if unique.len() <= 2 {
        unique.sort_by(|a, b| (OrderedFloat(a.y), OrderedFloat(a.x)).cmp(&(OrderedFloat(b.y), OrderedFloat(b.x))));
        return Ok(unique);
    }

    unique.sort_by(|a, b| (OrderedFloat(a.y), OrderedFloat(a.x)).cmp(&(OrderedFloat(b.y), OrderedFloat(b.x))));
    let pivot = unique[0];

    // One representative per polar angle: the farthest from the pivot.
    let mut by_angle: BTreeMap<OrderedFloat<f64>, Point> = BTreeMap::new();
    for &p in &unique[1..] {
        let mut angle = (p.y - pivot.y).atan2(p.x - pivot.x);
        if angle < 0.0 {
            angle += std::f64::consts::PI;
        }
        match by_angle.entry(OrderedFloat(angle)) {
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(p);
            }
            std::collections::btree_map::Entry::Occupied(mut e) => {
                if euclidean(pivot, p) > euclidean(pivot, *e.get()) {
                    e.insert(p);
                }
            }
        }
    }

    let mut stack: Vec<Point> = vec![pivot];
    for (_, p) in by_angle {
        while stack.len() >= 2 && !ccw(stack[stack.len() - 2], stack[stack.len() - 1], p) {
            stack.pop();
        }
        stack.push(p);
    }
    Ok(stack)
}

/// Minimum-area rectangle enclosing the point set.
///
/// One side of the optimum lies along a hull edge, so each edge is tried in
/// turn: every hull vertex is projected onto the edge parametrically to get
/// the extent along it, and the farthest perpendicular distance gives the
/// other side. The smallest-area candidate wins.
pub fn minimum_area_rectangle(points: &[Point]) -> Result<Rectangle> {
    let hull = match graham_scan(points) {
        Ok(hull) => hull,
        Err(LayoutError::InvalidArgument { message, .. }) => {
            return Err(LayoutError::invalid("minimum_area_rectangle", message))
        }
        Err(e) => return Err(e),
    };
    if hull.len() == 1 {
        return Ok(Rectangle::new(hull[0], hull[0]));
    }

    let mut best: Option<(f64, Rectangle)> = None;
    let n = hull.len();
    for k in 0..n {
        let origin = hull[k];
        let v = hull[(k + 1) % n].subtract(origin);
        let len2 = v.dot(v);
        if len2 < EPSILON {
            continue;
        }
        let len = len2.sqrt();

        let mut t_min = f64::INFINITY;
        let mut t_max = f64::NEG_INFINITY;
        let mut s_max: f64 = 0.0;
        for &p in &hull {
            let r = p.subtract(origin);
            let t = r.dot(v) / len2;
            t_min = t_min.min(t);
            t_max = t_max.max(t);
            // Hull is counter-clockwise, so every vertex is on the left of
            // the edge; the cross product is its perpendicular distance.
            s_max = s_max.max(v.cross(r) / len);
        }

        let area = (t_max - t_min) * len * s_max;
        if best.as_ref().is_some_and(|(a, _)| *a <= area) {
            continue;
        }

        let along = |t: f64| Point::new(origin.x + t * v.x, origin.y + t * v.y);
        let normal = Point::new(-v.y / len, v.x / len);
        let base_start = along(t_min);
        let base_end = along(t_max);
        let rect = Rectangle::from_corners(
            base_start,
            base_end,
            Point::new(base_start.x + s_max * normal.x, base_start.y + s_max * normal.y),
            Point::new(base_end.x + s_max * normal.x, base_end.y + s_max * normal.y),
        );
        best = Some((area, rect));
    }

    best.map(|(_, r)| r)
        .ok_or_else(|| LayoutError::invalid("minimum_area_rectangle", "all hull edges degenerate"))
}

/// Oriented bounding box from a least-squares line fit.
///
/// Fits a regression line through the points, rotates everything into the
/// line's frame, takes the axis-aligned box there and rotates it back.
/// Requires at least two points.
pub fn oriented_bounding_box(points: &[Point]) -> Result<Rectangle> {
    if points.len() < 2 {
        return Err(LayoutError::invalid(
            "oriented_bounding_box",
            format!("requires at least 2 points, got {}", points.len()),
        ));
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;
    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    for p in points {
        covariance += (p.x - mean_x) * (p.y - mean_y);
        variance_x += (p.x - mean_x) * (p.x - mean_x);
    }

    let angle = if variance_x.abs() < EPSILON {
        std::f64::consts::FRAC_PI_2
    } else {
        (covariance / variance_x).atan()
    };

    let to_frame = Matrix::rotation(-angle);
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &p in points {
        let q = to_frame.transform(p);
        min_x = min_x.min(q.x);
        min_y = min_y.min(q.y);
        max_x = max_x.max(q.x);
        max_y = max_y.max(q.y);
    }

    let back = Matrix::rotation(angle);
    Ok(back.transform_rectangle(&Rectangle::new(
        Point::new(min_x, min_y),
        Point::new(max_x, max_y),
    )))
}
