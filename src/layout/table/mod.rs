//! Ruling-based table detection.
//!
//! Pipeline, one page at a time: extract rulings from the drawn paths
//! (scaled against the page's mode glyph size), merge collinear runs,
//! intersect horizontal against vertical rulings, discover the rectangular
//! cells the crossings enclose, and group corner-sharing cells into
//! candidate tables. Every phase is total: a page without rulings simply
//! produces no candidates.
//!
//! Candidates are geometric only. A recovered grid of cells corresponds to
//! closed rectangles formed by ruling lines, not necessarily to a table in
//! the document's logical sense.

mod cells;
mod rulings;
mod types;

pub use types::{Orientation, Ruling, TableParams};

use log::debug;
use ordered_float::OrderedFloat;

use crate::geometry::{Point, Rectangle};
use crate::model::Page;

/// A candidate table: the cell rectangles of one connected ruling grid.
#[derive(Clone, Debug, PartialEq)]
pub struct TableCandidate {
    pub cells: Vec<Rectangle>,
}

impl TableCandidate {
    /// Bounding rectangle over every cell.
    pub fn bounds(&self) -> Rectangle {
        let mut left = f64::INFINITY;
        let mut bottom = f64::INFINITY;
        let mut right = f64::NEG_INFINITY;
        let mut top = f64::NEG_INFINITY;
        for c in &self.cells {
            left = left.min(c.left());
            bottom = bottom.min(c.bottom());
            right = right.max(c.right());
            top = top.max(c.top());
        }
        Rectangle::new(Point::new(left, bottom), Point::new(right, top))
    }

    /// Cells grouped into rows, top row first, cells left to right.
    /// Cells sharing a top coordinate share a row.
    pub fn rows(&self) -> Vec<Vec<Rectangle>> {
        let mut sorted = self.cells.clone();
        sorted.sort_by(|a, b| {
            b.top()
                .total_cmp(&a.top())
                .then(a.left().total_cmp(&b.left()))
        });

        let mut rows: Vec<Vec<Rectangle>> = Vec::new();
        let mut current_top: Option<f64> = None;
        for cell in sorted {
            match current_top {
                Some(top) if (top - cell.top()).abs() < f64::EPSILON => {
                    rows.last_mut().unwrap().push(cell);
                }
                _ => {
                    current_top = Some(cell.top());
                    rows.push(vec![cell]);
                }
            }
        }
        rows
    }
}

/// Detects candidate tables on a page.
///
/// Returns one candidate per connected grid of cells, ordered top to
/// bottom then left to right. A page without usable rulings yields an
/// empty list.
pub fn get_table_candidates(page: &Page, params: &TableParams) -> Vec<TableCandidate> {
    let (mode_width, mode_height) = rulings::mode_letter_size(&page.letters);
    let extracted = rulings::extract_rulings(&page.paths, mode_width, mode_height, params);
    if extracted.is_empty() {
        return Vec::new();
    }
    let merged = rulings::merge_rulings(&extracted);

    let horizontal: Vec<Ruling> = merged
        .iter()
        .filter(|r| r.orientation == Orientation::Horizontal)
        .copied()
        .collect();
    let vertical: Vec<Ruling> = merged
        .iter()
        .filter(|r| r.orientation == Orientation::Vertical)
        .copied()
        .collect();

    let intersections = cells::find_intersections(&horizontal, &vertical);
    let cell_rects = cells::find_cells(&intersections);
    debug!(
        "page {}: {} rulings, {} crossings, {} cells",
        page.number,
        merged.len(),
        intersections.len(),
        cell_rects.len()
    );

    let mut candidates: Vec<TableCandidate> = cells::group_cells(&cell_rects, params)
        .into_iter()
        .map(|cells| TableCandidate { cells })
        .collect();
    candidates.sort_by_key(|t| {
        let bounds = t.bounds();
        (OrderedFloat(-bounds.top()), OrderedFloat(bounds.left()))
    });
    candidates
}
