//! Polygon clipping.
//!
//! Two clippers: Sutherland–Hodgman for convex clip regions, and
//! Greiner–Hormann for general polygons under either filling rule. The
//! Greiner–Hormann vertex lists are plain vectors addressed by index; the
//! cross-list twin reference is an `(list, index)` pair, which keeps the
//! classic doubly-linked structure acyclic for ownership while preserving
//! O(1) twin lookup. Lists are logically circular: stepping past the end
//! wraps to the start.

use log::debug;

use super::{approx_eq, orientation, LineSegment, Point, Rectangle, EPSILON};
use crate::error::{LayoutError, Result};
use crate::model::path::{FillingRule, PdfPath};

/// Signed crossing count of the polygon's edges over the upward ray from
/// `point`.
pub fn winding_number(ring: &[Point], point: Point) -> i32 {
    let mut winding = 0;
    let n = ring.len();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        if a.y <= point.y {
            if b.y > point.y && orientation(a, b, point) > 0 {
                winding += 1;
            }
        } else if b.y <= point.y && orientation(a, b, point) < 0 {
            winding -= 1;
        }
    }
    winding
}

/// Point-in-polygon under the chosen filling rule: winding parity for
/// even-odd, non-zero winding count otherwise.
pub fn point_inside(ring: &[Point], point: Point, rule: FillingRule) -> bool {
    let winding = winding_number(ring, point);
    match rule {
        FillingRule::EvenOdd => winding % 2 != 0,
        FillingRule::NonZeroWinding => winding != 0,
    }
}

/// Unsigned area of a polygon ring (shoelace formula).
pub fn polygon_area(ring: &[Point]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut doubled = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        doubled += a.cross(b);
    }
    doubled.abs() / 2.0
}

/// Crossing point of the two infinite lines through (p1, p2) and (p3, p4).
fn line_line_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let denominator = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if denominator.abs() < EPSILON {
        return None;
    }
    let d12 = p1.cross(p2);
    let d34 = p3.cross(p4);
    Some(Point::new(
        (d12 * (p3.x - p4.x) - (p1.x - p2.x) * d34) / denominator,
        (d12 * (p3.y - p4.y) - (p1.y - p2.y) * d34) / denominator,
    ))
}

/// Clips `subject` against a convex counter-clockwise `clipper`.
///
/// Walks the subject once per clipping edge, keeping vertices on the inner
/// side of the edge's half-plane and inserting the edge crossing whenever
/// the side changes between consecutive vertices.
pub fn sutherland_hodgman(clipper: &[Point], subject: &[Point]) -> Vec<Point> {
    let mut output: Vec<Point> = subject.to_vec();
    let n = clipper.len();
    for i in 0..n {
        if output.is_empty() {
            break;
        }
        let edge_from = clipper[i];
        let edge_to = clipper[(i + 1) % n];
        let inside = |p: Point| orientation(edge_from, edge_to, p) >= 0;

        let input = std::mem::take(&mut output);
        let m = input.len();
        for j in 0..m {
            let current = input[j];
            let previous = input[(j + m - 1) % m];
            let current_inside = inside(current);
            if current_inside != inside(previous) {
                if let Some(crossing) =
                    line_line_intersection(previous, current, edge_from, edge_to)
                {
                    output.push(crossing);
                }
            }
            if current_inside {
                output.push(current);
            }
        }
    }
    output
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListId {
    Subject,
    Clip,
}

/// One entry of a Greiner–Hormann vertex list. Lives only for the duration
/// of a single clipping run.
#[derive(Clone, Debug)]
struct Vertex {
    point: Point,
    intersect: bool,
    /// Valid only when `intersect`: true means the traversal enters the
    /// other polygon here, false means it leaves.
    entry: bool,
    /// Normalised squared distance from the start of the edge the
    /// intersection was inserted on; orders insertions along that edge.
    #[allow(dead_code)]
    alpha: f32,
    /// Twin vertex in the other polygon's list.
    neighbour: Option<(ListId, u32)>,
    processed: bool,
    /// Intersections on a synthetic closing edge: processed, never emitted.
    is_fake: bool,
}

impl Vertex {
    fn original(point: Point) -> Self {
        Self {
            point,
            intersect: false,
            entry: false,
            alpha: 0.0,
            neighbour: None,
            processed: false,
            is_fake: false,
        }
    }

    fn intersection(point: Point, alpha: f32, is_fake: bool) -> Self {
        Self {
            point,
            intersect: true,
            entry: false,
            alpha,
            neighbour: None,
            processed: false,
            is_fake,
        }
    }
}

struct PendingIntersection {
    point: Point,
    subject_edge: usize,
    subject_alpha: f32,
    clip_edge: usize,
    clip_alpha: f32,
    is_fake: bool,
}

/// Clips `subject` against `clip` with the Greiner–Hormann algorithm.
///
/// Both polygons are rings without a repeated closing point. When
/// `subject_open` is set, the synthetic edge closing the subject is marked
/// fake: intersections on it participate in the traversal but are never
/// emitted, so the output follows the drawn part of the subject only.
/// Each emitted ring is one output polygon; no containment relation
/// between rings is computed.
///
/// Edges are assumed to cross properly: polygons whose edges only graze
/// each other (shared corners, coincident edge runs) break the entry/exit
/// alternation and produce unreliable rings.
pub fn greiner_hormann(
    subject: &[Point],
    clip: &[Point],
    rule: FillingRule,
    subject_open: bool,
) -> Vec<Vec<Point>> {
    if subject.len() < 3 || clip.len() < 3 {
        return Vec::new();
    }

    // Phase 1: find every subject-edge/clip-edge crossing.
    let mut pending: Vec<PendingIntersection> = Vec::new();
    let subject_count = subject.len();
    let clip_count = clip.len();
    for i in 0..subject_count {
        let s_from = subject[i];
        let s_to = subject[(i + 1) % subject_count];
        let edge_fake = subject_open && i == subject_count - 1;
        let s_len2 = s_to.subtract(s_from).dot(s_to.subtract(s_from));
        if s_len2 < EPSILON {
            continue;
        }
        for j in 0..clip_count {
            let c_from = clip[j];
            let c_to = clip[(j + 1) % clip_count];
            let c_len2 = c_to.subtract(c_from).dot(c_to.subtract(c_from));
            if c_len2 < EPSILON {
                continue;
            }
            let s_segment = LineSegment::new(s_from, s_to);
            let c_segment = LineSegment::new(c_from, c_to);
            if let Some(point) = s_segment.intersection_with(&c_segment) {
                let sd = point.subtract(s_from);
                let cd = point.subtract(c_from);
                pending.push(PendingIntersection {
                    point,
                    subject_edge: i,
                    subject_alpha: (sd.dot(sd) / s_len2) as f32,
                    clip_edge: j,
                    clip_alpha: (cd.dot(cd) / c_len2) as f32,
                    is_fake: edge_fake,
                });
            }
        }
    }

    if pending.iter().all(|p| p.is_fake) {
        // No real crossings: one polygon is inside the other, or they are
        // disjoint.
        if point_inside(clip, subject[0], rule) {
            return vec![subject.to_vec()];
        }
        if point_inside(subject, clip[0], rule) {
            return vec![clip.to_vec()];
        }
        return Vec::new();
    }

    // Insert twin vertices into both lists ordered by alpha along each edge.
    let (mut subject_list, subject_positions) = assemble_list(
        subject,
        &pending,
        |p| (p.subject_edge, p.subject_alpha),
    );
    let (mut clip_list, clip_positions) =
        assemble_list(clip, &pending, |p| (p.clip_edge, p.clip_alpha));
    for k in 0..pending.len() {
        subject_list[subject_positions[k]].neighbour = Some((ListId::Clip, clip_positions[k] as u32));
        clip_list[clip_positions[k]].neighbour = Some((ListId::Subject, subject_positions[k] as u32));
    }

    // Phase 2: alternate entry/exit flags, seeded by whether each list
    // starts inside the other polygon.
    label_entries(&mut subject_list, clip, rule);
    label_entries(&mut clip_list, subject, rule);

    // Phase 3: walk the lists, switching to the twin at each intersection.
    // An open subject can legitimately produce a two-point run (a clipped
    // polyline); a closed one needs at least a triangle.
    let min_points = if subject_open { 2 } else { 3 };
    traverse(&mut subject_list, &mut clip_list, min_points)
}

fn assemble_list(
    ring: &[Point],
    pending: &[PendingIntersection],
    edge_alpha: impl Fn(&PendingIntersection) -> (usize, f32),
) -> (Vec<Vertex>, Vec<usize>) {
    let mut on_edge: Vec<Vec<(f32, usize)>> = vec![Vec::new(); ring.len()];
    for (k, p) in pending.iter().enumerate() {
        let (edge, alpha) = edge_alpha(p);
        on_edge[edge].push((alpha, k));
    }

    let mut list: Vec<Vertex> = Vec::with_capacity(ring.len() + pending.len());
    let mut positions = vec![0usize; pending.len()];
    for (i, &point) in ring.iter().enumerate() {
        list.push(Vertex::original(point));
        on_edge[i].sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for &(alpha, k) in &on_edge[i] {
            positions[k] = list.len();
            list.push(Vertex::intersection(pending[k].point, alpha, pending[k].is_fake));
        }
    }
    (list, positions)
}

fn label_entries(list: &mut [Vertex], other_ring: &[Point], rule: FillingRule) {
    let mut entry = !point_inside(other_ring, list[0].point, rule);
    for vertex in list.iter_mut() {
        if vertex.intersect {
            vertex.entry = entry;
            entry = !entry;
        }
    }
}

fn traverse(
    subject_list: &mut [Vertex],
    clip_list: &mut [Vertex],
    min_points: usize,
) -> Vec<Vec<Point>> {
    let total = subject_list.len() + clip_list.len();
    let mut rings: Vec<Vec<Point>> = Vec::new();

    loop {
        let Some(start) = subject_list
            .iter()
            .position(|v| v.intersect && !v.is_fake && !v.processed)
        else {
            break;
        };

        let mut ring: Vec<Point> = Vec::new();
        let mut list_id = ListId::Subject;
        let mut index = start;
        let mut steps = 0usize;

        loop {
            steps += 1;
            if steps > 4 * total {
                debug!("clipping traversal did not close, abandoning ring");
                break;
            }

            let (current_list, other_list): (&mut [Vertex], &mut [Vertex]) = match list_id {
                ListId::Subject => (&mut *subject_list, &mut *clip_list),
                ListId::Clip => (&mut *clip_list, &mut *subject_list),
            };
            let vertex = &mut current_list[index];
            if vertex.processed {
                break;
            }
            vertex.processed = true;
            if !vertex.is_fake {
                ring.push(vertex.point);
            }
            let forward = vertex.entry;
            if let Some((_, twin)) = vertex.neighbour {
                other_list[twin as usize].processed = true;
            }

            // Walk to the next intersection, emitting the plain vertices
            // passed on the way.
            let len = current_list.len();
            loop {
                index = if forward {
                    (index + 1) % len
                } else {
                    (index + len - 1) % len
                };
                let passed = &current_list[index];
                if passed.intersect {
                    break;
                }
                if !passed.is_fake {
                    ring.push(passed.point);
                }
            }

            // Jump across to the twin in the other list.
            let Some((twin_list, twin_index)) = current_list[index].neighbour else {
                debug!("clipping intersection without twin, abandoning ring");
                break;
            };
            list_id = twin_list;
            index = twin_index as usize;
        }

        dedup_ring(&mut ring);
        if ring.len() >= min_points {
            rings.push(ring);
        }
    }
    rings
}

fn dedup_ring(ring: &mut Vec<Point>) {
    ring.dedup_by(|a, b| {
        approx_eq(a.x, b.x, EPSILON) && approx_eq(a.y, b.y, EPSILON)
    });
    if ring.len() > 1 {
        let first = ring[0];
        let last = ring[ring.len() - 1];
        if approx_eq(first.x, last.x, EPSILON) && approx_eq(first.y, last.y, EPSILON) {
            ring.pop();
        }
    }
}

/// Clips `subject` against a clipping path.
///
/// The clipping path must carry its clipping flag and is clipped under its
/// own filling rule. Rectangle-on-rectangle inputs short-circuit through
/// plain interval intersection. Open subjects that are not drawn
/// rectangles are unsupported: simplifying them correctly needs
/// polyline-aware clipping, and silently treating them as closed would
/// fabricate geometry.
pub fn clip(clipping: &PdfPath, subject: &PdfPath) -> Result<Vec<PdfPath>> {
    const ALGORITHM: &str = "clip";

    if !clipping.is_clipping {
        return Err(LayoutError::invalid(
            ALGORITHM,
            "clipping path does not have its clipping flag set",
        ));
    }

    if let (Some(clip_rect), Some(subject_rect)) =
        (clipping.drawn_rectangle(), subject.drawn_rectangle())
    {
        return Ok(match clip_rect.intersect(&subject_rect) {
            Some(r) if r.area() > EPSILON => vec![rectangle_path(subject, &r)],
            _ => Vec::new(),
        });
    }

    if !subject.is_closed() && !subject.is_drawn_as_rectangle() {
        return Err(LayoutError::unsupported(
            ALGORITHM,
            "cannot clip an open path that is not drawn as a rectangle",
        ));
    }

    let clip_ring = clipping.polygon();
    if clip_ring.len() < 3 {
        return Err(LayoutError::invalid(
            ALGORITHM,
            "clipping path has fewer than 3 distinct points",
        ));
    }
    let subject_ring = subject.polygon();
    if subject_ring.len() < 3 {
        return Ok(Vec::new());
    }

    let rings = greiner_hormann(&subject_ring, &clip_ring, clipping.filling_rule, false);
    Ok(rings
        .into_iter()
        .map(|ring| ring_path(subject, &ring))
        .collect())
}

fn rectangle_path(template: &PdfPath, rect: &Rectangle) -> PdfPath {
    let mut path = template.clone_empty();
    path.rect(rect.left(), rect.bottom(), rect.width(), rect.height());
    path
}

fn ring_path(template: &PdfPath, ring: &[Point]) -> PdfPath {
    let mut path = template.clone_empty();
    path.move_to(ring[0].x, ring[0].y);
    for p in &ring[1..] {
        path.line_to(p.x, p.y);
    }
    path.close();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x0 + size, y0),
            Point::new(x0 + size, y0 + size),
            Point::new(x0, y0 + size),
        ]
    }

    #[test]
    fn winding_numbers() {
        let ring = square(0.0, 0.0, 2.0);
        assert_eq!(winding_number(&ring, Point::new(1.0, 1.0)), 1);
        assert_eq!(winding_number(&ring, Point::new(3.0, 1.0)), 0);
        let reversed: Vec<Point> = ring.iter().rev().copied().collect();
        assert_eq!(winding_number(&reversed, Point::new(1.0, 1.0)), -1);
        assert!(point_inside(&reversed, Point::new(1.0, 1.0), FillingRule::NonZeroWinding));
        assert!(point_inside(&reversed, Point::new(1.0, 1.0), FillingRule::EvenOdd));
    }

    #[test]
    fn sutherland_hodgman_offset_squares() {
        let clipped = sutherland_hodgman(&square(5.0, 5.0, 10.0), &square(0.0, 0.0, 10.0));
        assert!((polygon_area(&clipped) - 25.0).abs() < 1e-9);
        for p in &clipped {
            assert!(p.x >= 5.0 - 1e-9 && p.x <= 10.0 + 1e-9);
            assert!(p.y >= 5.0 - 1e-9 && p.y <= 10.0 + 1e-9);
        }
    }

    #[test]
    fn sutherland_hodgman_disjoint_is_empty() {
        let clipped = sutherland_hodgman(&square(20.0, 20.0, 2.0), &square(0.0, 0.0, 10.0));
        assert!(polygon_area(&clipped) < 1e-9);
    }

    #[test]
    fn greiner_hormann_offset_unit_squares() {
        let rings = greiner_hormann(
            &square(0.0, 0.0, 1.0),
            &square(0.5, 0.5, 1.0),
            FillingRule::NonZeroWinding,
            false,
        );
        assert_eq!(rings.len(), 1);
        assert!((polygon_area(&rings[0]) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn greiner_hormann_subject_inside_clip() {
        let rings = greiner_hormann(
            &square(2.0, 2.0, 1.0),
            &square(0.0, 0.0, 10.0),
            FillingRule::EvenOdd,
            false,
        );
        assert_eq!(rings.len(), 1);
        assert!((polygon_area(&rings[0]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn greiner_hormann_disjoint_is_empty() {
        let rings = greiner_hormann(
            &square(20.0, 0.0, 1.0),
            &square(0.0, 0.0, 10.0),
            FillingRule::NonZeroWinding,
            false,
        );
        assert!(rings.is_empty());
    }

    #[test]
    fn matches_sutherland_hodgman_on_axis_aligned_boxes() {
        let subject = square(0.0, 0.0, 10.0);
        let clip_ring = square(5.0, 5.0, 10.0);
        let gh = greiner_hormann(&subject, &clip_ring, FillingRule::NonZeroWinding, false);
        let sh = sutherland_hodgman(&clip_ring, &subject);
        assert_eq!(gh.len(), 1);
        assert!((polygon_area(&gh[0]) - polygon_area(&sh)).abs() < 1e-9);
    }

    #[test]
    fn clip_requires_clipping_flag() {
        let mut not_clipping = PdfPath::new();
        not_clipping.rect(0.0, 0.0, 1.0, 1.0);
        let mut subject = PdfPath::new();
        subject.rect(0.0, 0.0, 1.0, 1.0);
        let err = clip(&not_clipping, &subject).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidArgument { .. }));
    }

    #[test]
    fn clip_open_subject_is_unsupported() {
        let mut clipping = PdfPath::new();
        clipping.rect(0.0, 0.0, 10.0, 10.0);
        clipping.set_clipping(FillingRule::NonZeroWinding);
        let mut subject = PdfPath::new();
        subject.move_to(0.0, 0.0);
        subject.line_to(5.0, 5.0);
        let err = clip(&clipping, &subject).unwrap_err();
        assert!(matches!(err, LayoutError::Unsupported { .. }));
    }

    #[test]
    fn open_subject_fake_edge_is_not_emitted() {
        // An open polyline whose synthetic closing edge crosses the clip
        // region: the crossings on that edge steer the traversal but must
        // not contribute output points, leaving only the drawn run.
        let subject = vec![
            Point::new(-5.0, 1.0),
            Point::new(5.0, 1.0),
            Point::new(5.0, 3.0),
        ];
        let clip_ring = square(0.0, 0.0, 4.0);
        let rings = greiner_hormann(&subject, &clip_ring, FillingRule::NonZeroWinding, true);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 2);
        assert!((rings[0][0].x - 0.0).abs() < 1e-9 && (rings[0][0].y - 1.0).abs() < 1e-9);
        assert!((rings[0][1].x - 4.0).abs() < 1e-9 && (rings[0][1].y - 1.0).abs() < 1e-9);
    }
}
