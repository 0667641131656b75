//! Cell discovery from ruling intersections.
//!
//! Crossings between horizontal and vertical rulings are mapped by point,
//! then scanned top-to-bottom, left-to-right: each crossing is the
//! potential top-left corner of exactly one cell, confirmed when the three
//! remaining corners exist and all four sides run along shared rulings.
//! Cells touching at corners are finally grouped into candidate tables.

use rustc_hash::FxHashMap;

use super::types::{key_point, KeyPoint, Ruling, TableParams};
use crate::geometry::distance::euclidean;
use crate::geometry::{Point, Rectangle};
use crate::layout::clustering::connected_components;

/// The pair of rulings crossing at a point: indices into the horizontal
/// and vertical ruling lists. Multiple crossings at the same point
/// overwrite each other, which is harmless once collinear rulings are
/// merged.
pub(crate) type IntersectionMap = FxHashMap<KeyPoint, (usize, usize)>;

/// Computes every crossing between a horizontal and a vertical ruling.
pub(crate) fn find_intersections(
    horizontal: &[Ruling],
    vertical: &[Ruling],
) -> IntersectionMap {
    let mut intersections = IntersectionMap::default();
    for (h_index, h) in horizontal.iter().enumerate() {
        for (v_index, v) in vertical.iter().enumerate() {
            if let Some(point) = h.segment.intersection_with(&v.segment) {
                intersections.insert(key_point(point), (h_index, v_index));
            }
        }
    }
    intersections
}

#[derive(Clone, Copy)]
struct Crossing {
    point: Point,
    h_index: usize,
    v_index: usize,
}

/// Finds the rectangular cells formed by the crossings.
///
/// Crossings are processed in a top-to-bottom, left-to-right stack order.
/// For each one, the candidates directly below on the same vertical ruling
/// and directly right on the same horizontal ruling are tried nearest
/// first; the first pair whose opposite corner exists in the map with both
/// connecting rulings shared yields the cell, and the scan moves on: a
/// crossing is the top-left corner of at most one cell.
pub(crate) fn find_cells(intersections: &IntersectionMap) -> Vec<Rectangle> {
    let mut crossings: Vec<Crossing> = intersections
        .iter()
        .map(|(&(x, y), &(h_index, v_index))| Crossing {
            point: Point::new(x.into_inner(), y.into_inner()),
            h_index,
            v_index,
        })
        .collect();
    crossings.sort_by(|a, b| {
        b.point
            .y
            .total_cmp(&a.point.y)
            .then(a.point.x.total_cmp(&b.point.x))
    });

    let mut cells = Vec::new();
    for (i, c) in crossings.iter().enumerate() {
        // Everything after i is still on the stack: lower, or right on the
        // same row.
        let mut below: Vec<&Crossing> = crossings[i + 1..]
            .iter()
            .filter(|o| o.v_index == c.v_index && o.point.y < c.point.y)
            .collect();
        below.sort_by(|a, b| b.point.y.total_cmp(&a.point.y));
        let mut right: Vec<&Crossing> = crossings[i + 1..]
            .iter()
            .filter(|o| o.h_index == c.h_index && o.point.x > c.point.x)
            .collect();
        right.sort_by(|a, b| a.point.x.total_cmp(&b.point.x));

        'search: for b in &below {
            for r in &right {
                let opposite = Point::new(r.point.x, b.point.y);
                if let Some(&(h_index, v_index)) = intersections.get(&key_point(opposite)) {
                    if v_index == r.v_index && h_index == b.h_index {
                        cells.push(Rectangle::new(
                            Point::new(c.point.x, b.point.y),
                            Point::new(r.point.x, c.point.y),
                        ));
                        break 'search;
                    }
                }
            }
        }
    }
    cells
}

/// Groups cells into candidate tables: two cells belong together when any
/// of their corners coincide within `corner_tolerance`.
pub(crate) fn group_cells(cells: &[Rectangle], params: &TableParams) -> Vec<Vec<Rectangle>> {
    let corners: Vec<[Point; 4]> = cells.iter().map(|c| c.corners()).collect();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); cells.len()];
    for i in 0..cells.len() {
        for j in i + 1..cells.len() {
            let touching = corners[i].iter().any(|&a| {
                corners[j]
                    .iter()
                    .any(|&b| euclidean(a, b) <= params.corner_tolerance)
            });
            if touching {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    connected_components(&adjacency)
        .into_iter()
        .map(|component| component.into_iter().map(|i| cells[i]).collect())
        .collect()
}
