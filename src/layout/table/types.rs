//! Table extraction types and settings.

use ordered_float::OrderedFloat;

use crate::geometry::{LineSegment, Point};

// Key types for ordered float maps
pub(crate) type KeyF64 = OrderedFloat<f64>;
pub(crate) type KeyPoint = (KeyF64, KeyF64);

pub(crate) fn key_f64(v: f64) -> KeyF64 {
    OrderedFloat(v)
}

pub(crate) fn key_point(p: Point) -> KeyPoint {
    (OrderedFloat(p.x), OrderedFloat(p.y))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A strictly horizontal or vertical segment taken from a drawn path,
/// candidate table border.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ruling {
    pub segment: LineSegment,
    pub orientation: Orientation,
}

impl Ruling {
    /// Horizontal ruling at `y` spanning the given x interval, endpoints
    /// ordered ascending.
    pub fn horizontal(y: f64, x0: f64, x1: f64) -> Self {
        Self {
            segment: LineSegment::new(
                Point::new(x0.min(x1), y),
                Point::new(x0.max(x1), y),
            ),
            orientation: Orientation::Horizontal,
        }
    }

    /// Vertical ruling at `x` spanning the given y interval.
    pub fn vertical(x: f64, y0: f64, y1: f64) -> Self {
        Self {
            segment: LineSegment::new(
                Point::new(x, y0.min(y1)),
                Point::new(x, y0.max(y1)),
            ),
            orientation: Orientation::Vertical,
        }
    }

    /// Builds a ruling from any strictly axis-aligned segment.
    pub fn from_segment(segment: LineSegment) -> Option<Self> {
        if segment.is_vertical() && segment.length() > 0.0 {
            Some(Self::vertical(segment.from.x, segment.from.y, segment.to.y))
        } else if segment.is_horizontal() && segment.length() > 0.0 {
            Some(Self::horizontal(segment.from.y, segment.from.x, segment.to.x))
        } else {
            None
        }
    }

    /// The coordinate shared by both endpoints: y for horizontal rulings,
    /// x for vertical ones.
    pub fn shared_coordinate(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.segment.from.y,
            Orientation::Vertical => self.segment.from.x,
        }
    }

    /// Start and end along the varying axis, ascending.
    pub fn span(&self) -> (f64, f64) {
        match self.orientation {
            Orientation::Horizontal => (self.segment.from.x, self.segment.to.x),
            Orientation::Vertical => (self.segment.from.y, self.segment.to.y),
        }
    }

    pub fn length(&self) -> f64 {
        let (start, end) = self.span();
        end - start
    }

    /// The same ruling with both endpoints pushed outward.
    pub fn extended(&self, by: f64) -> Self {
        let (start, end) = self.span();
        match self.orientation {
            Orientation::Horizontal => {
                Self::horizontal(self.shared_coordinate(), start - by, end + by)
            }
            Orientation::Vertical => {
                Self::vertical(self.shared_coordinate(), start - by, end + by)
            }
        }
    }
}

/// Parameters for ruling-based table detection.
#[derive(Debug, Clone, PartialEq)]
pub struct TableParams {
    /// Rulings are extended by this much at both ends so that borders
    /// meeting at a corner reliably cross.
    pub ruling_extension: f64,

    /// A path drawn as a rectangle thinner than this fraction of the mode
    /// letter width (or height) is a filled bar and collapses to its
    /// centerline.
    pub thin_bar_ratio: f64,

    /// Two cells sharing a corner within this distance belong to the same
    /// table.
    pub corner_tolerance: f64,
}

impl Default for TableParams {
    fn default() -> Self {
        Self {
            ruling_extension: 2.0,
            thin_bar_ratio: 0.7,
            corner_tolerance: 1.0,
        }
    }
}
