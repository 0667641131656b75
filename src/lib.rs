//! folio - document layout analysis core for PDF content extraction.
//!
//! Given a page's already-decoded primitives (letters with glyph boxes,
//! stroked and filled path commands), this crate reconstructs higher-level
//! structure: convex hulls and oriented bounding rectangles, polygon
//! clipping, nearest-neighbour clustering of text fragments, and
//! ruling-based table detection. Parsing, decryption, rendering and fonts
//! live in collaborating crates; the [`model`] module defines the
//! interface this core consumes from them.

pub mod error;
pub mod geometry;
pub mod layout;
pub mod model;

pub use error::{LayoutError, Result};
pub use geometry::bezier::{solve_cubic, BezierCurve};
pub use geometry::clipping::{clip, greiner_hormann, sutherland_hodgman};
pub use geometry::hull::{graham_scan, minimum_area_rectangle, oriented_bounding_box};
pub use geometry::kdtree::{KdTree, Neighbour};
pub use geometry::{LineSegment, Matrix, Point, Rectangle};
pub use layout::clustering::{
    cluster_k_nearest_neighbours, cluster_nearest_neighbours, cluster_nearest_neighbours_lines,
    coalesce_axis_aligned,
};
pub use layout::{
    extract_words, get_table_candidates, ClusteringOptions, TableCandidate, TableParams, Word,
    WordExtractorOptions,
};
pub use model::{Color, FillingRule, Letter, Page, PathCommand, PdfPath, RgbColor};
