//! Vector paths as produced by the content-stream interpreter.
//!
//! A path is an ordered sequence of move/line/curve/close commands plus the
//! paint flags the interpreter saw. Whether the path draws an axis-aligned
//! rectangle is detected structurally and memoised whenever the command
//! list changes, so downstream consumers (ruling extraction, clipping fast
//! paths) get it for free.

use crate::geometry::bezier::BezierCurve;
use crate::geometry::{approx_eq, LineSegment, Point, Rectangle, EPSILON};

/// Number of chords a Bézier command contributes when a path is flattened
/// to a polygon.
const BEZIER_CHORDS: usize = 10;

/// Rule deciding which regions a path encloses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillingRule {
    EvenOdd,
    #[default]
    NonZeroWinding,
}

/// One drawing command of a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    Move(Point),
    Line(LineSegment),
    Bezier(BezierCurve),
    Close,
}

/// A decoded vector path with its paint flags.
#[derive(Clone, Debug, PartialEq)]
pub struct PdfPath {
    commands: Vec<PathCommand>,
    pub is_clipping: bool,
    pub is_filled: bool,
    pub filling_rule: FillingRule,
    drawn_rectangle: Option<Rectangle>,
    current_position: Option<Point>,
    subpath_start: Option<Point>,
}

impl Default for PdfPath {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfPath {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            is_clipping: false,
            is_filled: false,
            filling_rule: FillingRule::default(),
            drawn_rectangle: None,
            current_position: None,
            subpath_start: None,
        }
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Marks the path as a clipping path with the given rule.
    pub fn set_clipping(&mut self, rule: FillingRule) {
        self.is_clipping = true;
        self.filling_rule = rule;
    }

    pub fn set_filled(&mut self, rule: FillingRule) {
        self.is_filled = true;
        self.filling_rule = rule;
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = Point::new(x, y);
        self.commands.push(PathCommand::Move(p));
        self.current_position = Some(p);
        self.subpath_start = Some(p);
        self.refresh_drawn_rectangle();
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        if let Some(from) = self.current_position {
            let to = Point::new(x, y);
            self.commands.push(PathCommand::Line(LineSegment::new(from, to)));
            self.current_position = Some(to);
            self.refresh_drawn_rectangle();
        }
    }

    pub fn bezier_curve_to(&mut self, c1: Point, c2: Point, end: Point) {
        if let Some(start) = self.current_position {
            self.commands
                .push(PathCommand::Bezier(BezierCurve::new(start, c1, c2, end)));
            self.current_position = Some(end);
            self.refresh_drawn_rectangle();
        }
    }

    /// Appends a full axis-aligned rectangle subpath.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close();
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
        self.current_position = self.subpath_start;
        self.refresh_drawn_rectangle();
    }

    /// Whether the path ends where it started, explicitly or implicitly.
    pub fn is_closed(&self) -> bool {
        if matches!(self.commands.last(), Some(PathCommand::Close)) {
            return true;
        }
        match (self.first_point(), self.last_point()) {
            (Some(first), Some(last)) => {
                approx_eq(first.x, last.x, EPSILON) && approx_eq(first.y, last.y, EPSILON)
            }
            _ => false,
        }
    }

    pub fn is_drawn_as_rectangle(&self) -> bool {
        self.drawn_rectangle.is_some()
    }

    /// The rectangle this path draws, when it is four axis-aligned line
    /// commands forming a closed loop.
    pub fn drawn_rectangle(&self) -> Option<Rectangle> {
        self.drawn_rectangle
    }

    /// Axis-aligned bounds over every command point; Bézier commands
    /// contribute their control polygon. `None` for an empty path.
    pub fn bounding_rectangle(&self) -> Option<Rectangle> {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut any = false;
        let mut cover = |p: Point| {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        };
        for command in &self.commands {
            match command {
                PathCommand::Move(p) => {
                    cover(*p);
                    any = true;
                }
                PathCommand::Line(segment) => {
                    cover(segment.from);
                    cover(segment.to);
                    any = true;
                }
                PathCommand::Bezier(curve) => {
                    let bounds = curve.control_bounds();
                    cover(bounds.bottom_left);
                    cover(bounds.top_right);
                    any = true;
                }
                PathCommand::Close => {}
            }
        }
        any.then(|| Rectangle::new(min, max))
    }

    /// A copy with the same flags and no commands.
    pub fn clone_empty(&self) -> PdfPath {
        PdfPath {
            commands: Vec::new(),
            is_clipping: self.is_clipping,
            is_filled: self.is_filled,
            filling_rule: self.filling_rule,
            drawn_rectangle: None,
            current_position: None,
            subpath_start: None,
        }
    }

    /// Flattens the first subpath to a polygon ring; Bézier commands are
    /// sampled into chords. The closing point is not repeated.
    pub fn polygon(&self) -> Vec<Point> {
        let mut points: Vec<Point> = Vec::new();
        for command in &self.commands {
            match command {
                PathCommand::Move(p) => {
                    if points.is_empty() {
                        points.push(*p);
                    } else {
                        break;
                    }
                }
                PathCommand::Line(segment) => {
                    if points.is_empty() {
                        points.push(segment.from);
                    }
                    points.push(segment.to);
                }
                PathCommand::Bezier(curve) => {
                    if points.is_empty() {
                        points.push(curve.start);
                    }
                    for i in 1..=BEZIER_CHORDS {
                        points.push(curve.point_at(i as f64 / BEZIER_CHORDS as f64));
                    }
                }
                PathCommand::Close => break,
            }
        }
        if points.len() > 1 {
            let first = points[0];
            let last = points[points.len() - 1];
            if approx_eq(first.x, last.x, EPSILON) && approx_eq(first.y, last.y, EPSILON) {
                points.pop();
            }
        }
        points
    }

    pub fn contains_bezier(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, PathCommand::Bezier(_)))
    }

    fn first_point(&self) -> Option<Point> {
        self.commands.iter().find_map(|c| match c {
            PathCommand::Move(p) => Some(*p),
            PathCommand::Line(s) => Some(s.from),
            PathCommand::Bezier(b) => Some(b.start),
            PathCommand::Close => None,
        })
    }

    fn last_point(&self) -> Option<Point> {
        self.commands.iter().rev().find_map(|c| match c {
            PathCommand::Move(p) => Some(*p),
            PathCommand::Line(s) => Some(s.to),
            PathCommand::Bezier(b) => Some(b.end),
            PathCommand::Close => None,
        })
    }

    fn refresh_drawn_rectangle(&mut self) {
        self.drawn_rectangle = detect_rectangle(&self.commands);
    }
}

/// Structural check for "four axis-aligned line commands forming a closed
/// rectangle": a single subpath whose ring has exactly four corners, each
/// edge horizontal or vertical, matching its own bounding box.
fn detect_rectangle(commands: &[PathCommand]) -> Option<Rectangle> {
    let mut ring: Vec<Point> = Vec::with_capacity(5);
    let mut closed = false;
    for command in commands {
        match command {
            PathCommand::Move(p) => {
                if !ring.is_empty() {
                    return None;
                }
                ring.push(*p);
            }
            PathCommand::Line(segment) => {
                if ring.is_empty() || closed {
                    return None;
                }
                ring.push(segment.to);
            }
            PathCommand::Bezier(_) => return None,
            PathCommand::Close => {
                if closed {
                    return None;
                }
                closed = true;
            }
        }
    }

    if ring.len() > 1 {
        let first = ring[0];
        let last = ring[ring.len() - 1];
        if approx_eq(first.x, last.x, EPSILON) && approx_eq(first.y, last.y, EPSILON) {
            ring.pop();
            closed = true;
        }
    }
    if !closed || ring.len() != 4 {
        return None;
    }

    for i in 0..4 {
        let a = ring[i];
        let b = ring[(i + 1) % 4];
        let horizontal = approx_eq(a.y, b.y, EPSILON) && !approx_eq(a.x, b.x, EPSILON);
        let vertical = approx_eq(a.x, b.x, EPSILON) && !approx_eq(a.y, b.y, EPSILON);
        if !horizontal && !vertical {
            return None;
        }
    }

    let min = Point::new(
        ring.iter().map(|p| p.x).fold(f64::INFINITY, f64::min),
        ring.iter().map(|p| p.y).fold(f64::INFINITY, f64::min),
    );
    let max = Point::new(
        ring.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max),
        ring.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max),
    );
    Some(Rectangle::new(min, max))
}
