//! Ruling extraction and merging.
//!
//! Turns a page's drawn paths into deduplicated horizontal and vertical
//! rulings: thin filled bars collapse to their centerlines (scaled against
//! the mode glyph size), every other axis-aligned line survives as drawn,
//! and collinear runs that touch are merged into single segments.

use std::collections::HashSet;

use log::debug;

use super::types::{key_f64, KeyF64, Orientation, Ruling, TableParams};
use crate::layout::clustering::group_indices_by_edges;
use crate::model::{Letter, PathCommand, PdfPath};

/// Most frequent glyph width and height over the non-whitespace letters.
///
/// Ties go to the smaller value; `(0, 0)` for a page without usable
/// letters, which disables the thin-bar reduction.
pub(crate) fn mode_letter_size(letters: &[Letter]) -> (f64, f64) {
    fn mode(values: impl Iterator<Item = f64>) -> f64 {
        let mut counts: std::collections::HashMap<KeyF64, usize> = std::collections::HashMap::new();
        for v in values {
            *counts.entry(key_f64(v)).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(v, _)| v.into_inner())
            .unwrap_or(0.0)
    }

    let visible: Vec<&Letter> = letters.iter().filter(|l| !l.is_whitespace()).collect();
    (
        mode(visible.iter().map(|l| l.glyph_rectangle.width())),
        mode(visible.iter().map(|l| l.glyph_rectangle.height())),
    )
}

/// Extracts candidate rulings from the page's paths.
///
/// Clipping paths and paths containing Bézier commands contribute nothing.
/// Every ruling is extended at both ends so that borders meeting at a
/// corner cross instead of merely touching, then exact duplicates are
/// dropped.
pub(crate) fn extract_rulings(
    paths: &[PdfPath],
    mode_width: f64,
    mode_height: f64,
    params: &TableParams,
) -> Vec<Ruling> {
    let mut rulings: Vec<Ruling> = Vec::new();
    let mut push = |r: Ruling| rulings.push(r.extended(params.ruling_extension));

    for path in paths {
        if path.is_clipping || path.contains_bezier() {
            continue;
        }

        if let Some(rect) = path.drawn_rectangle() {
            let thin_width = rect.width() < params.thin_bar_ratio * mode_width;
            let thin_height = rect.height() < params.thin_bar_ratio * mode_height;
            if thin_width || thin_height {
                // A thin filled bar is a drawn line: keep its centerline(s).
                let centre = rect.centroid();
                if thin_height {
                    push(Ruling::horizontal(centre.y, rect.left(), rect.right()));
                }
                if thin_width {
                    push(Ruling::vertical(centre.x, rect.bottom(), rect.top()));
                }
                continue;
            }
            // A full-size rectangle contributes its four borders.
            push(Ruling::horizontal(rect.bottom(), rect.left(), rect.right()));
            push(Ruling::horizontal(rect.top(), rect.left(), rect.right()));
            push(Ruling::vertical(rect.left(), rect.bottom(), rect.top()));
            push(Ruling::vertical(rect.right(), rect.bottom(), rect.top()));
            continue;
        }

        for command in path.commands() {
            if let PathCommand::Line(segment) = command {
                if let Some(ruling) = Ruling::from_segment(*segment) {
                    push(ruling);
                }
            }
        }
    }

    let mut seen = HashSet::new();
    rulings.retain(|r| {
        seen.insert((
            r.orientation,
            key_f64(r.segment.from.x),
            key_f64(r.segment.from.y),
            key_f64(r.segment.to.x),
            key_f64(r.segment.to.y),
        ))
    });
    rulings
}

/// Merges collinear rulings that overlap or touch.
///
/// Rulings sharing an orientation and an axis coordinate are chained into
/// an edge array (each linked to one mergeable neighbour) and grouped by
/// the clustering component sweep; every group collapses to the segment
/// spanning its union.
pub(crate) fn merge_rulings(rulings: &[Ruling]) -> Vec<Ruling> {
    let mut by_line: std::collections::HashMap<(Orientation, KeyF64), Vec<usize>> =
        std::collections::HashMap::new();
    for (i, r) in rulings.iter().enumerate() {
        by_line
            .entry((r.orientation, key_f64(r.shared_coordinate())))
            .or_default()
            .push(i);
    }

    let mut keys: Vec<(Orientation, KeyF64)> = by_line.keys().copied().collect();
    keys.sort();

    let mut merged = Vec::with_capacity(by_line.len());
    for key in keys {
        let mut members = by_line.remove(&key).unwrap();
        members.sort_by(|&a, &b| {
            rulings[a]
                .span()
                .0
                .total_cmp(&rulings[b].span().0)
                .then(a.cmp(&b))
        });

        // Sorted by start: linking each ruling to an overlapping successor
        // chains whole runs together.
        let mut edges: Vec<Option<usize>> = vec![None; members.len()];
        for i in 0..members.len().saturating_sub(1) {
            let (_, end) = rulings[members[i]].span();
            let (next_start, _) = rulings[members[i + 1]].span();
            if next_start <= end {
                edges[i] = Some(i + 1);
            }
        }

        for group in group_indices_by_edges(&edges) {
            let mut start = f64::INFINITY;
            let mut end = f64::NEG_INFINITY;
            for &local in &group {
                let (s, e) = rulings[members[local]].span();
                start = start.min(s);
                end = end.max(e);
            }
            let (orientation, coordinate) = key;
            let ruling = match orientation {
                Orientation::Horizontal => Ruling::horizontal(coordinate.into_inner(), start, end),
                Orientation::Vertical => Ruling::vertical(coordinate.into_inner(), start, end),
            };
            // A union of segments can never be shorter than any input.
            debug_assert!(group
                .iter()
                .all(|&local| rulings[members[local]].length() <= ruling.length() + 1e-9));
            merged.push(ruling);
        }
    }

    debug!(
        "merged {} rulings into {} segments",
        rulings.len(),
        merged.len()
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rectangle};

    fn letter(w: f64, h: f64) -> Letter {
        Letter::new(
            "a",
            Rectangle::new(Point::new(0.0, 0.0), Point::new(w, h)),
        )
    }

    #[test]
    fn mode_size_ignores_whitespace() {
        let mut letters = vec![letter(5.0, 8.0), letter(5.0, 8.0), letter(7.0, 9.0)];
        letters.push(Letter::new(
            " ",
            Rectangle::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0)),
        ));
        assert_eq!(mode_letter_size(&letters), (5.0, 8.0));
        assert_eq!(mode_letter_size(&[]), (0.0, 0.0));
    }

    #[test]
    fn thin_bar_collapses_to_centerline() {
        let mut bar = PdfPath::new();
        bar.rect(10.0, 50.0, 80.0, 1.0);
        let rulings = extract_rulings(&[bar], 5.0, 8.0, &TableParams::default());
        assert_eq!(rulings.len(), 1);
        let r = rulings[0];
        assert_eq!(r.orientation, Orientation::Horizontal);
        assert!((r.shared_coordinate() - 50.5).abs() < 1e-9);
        // Extended by 2 at both ends.
        assert!((r.span().0 - 8.0).abs() < 1e-9);
        assert!((r.span().1 - 92.0).abs() < 1e-9);
    }

    #[test]
    fn full_rectangle_contributes_borders() {
        let mut cell = PdfPath::new();
        cell.rect(0.0, 0.0, 100.0, 40.0);
        let rulings = extract_rulings(&[cell], 5.0, 8.0, &TableParams::default());
        assert_eq!(rulings.len(), 4);
        assert_eq!(
            rulings
                .iter()
                .filter(|r| r.orientation == Orientation::Vertical)
                .count(),
            2
        );
    }

    #[test]
    fn diagonals_beziers_and_clipping_are_skipped() {
        let mut diagonal = PdfPath::new();
        diagonal.move_to(0.0, 0.0);
        diagonal.line_to(10.0, 10.0);

        let mut curved = PdfPath::new();
        curved.move_to(0.0, 0.0);
        curved.line_to(10.0, 0.0);
        curved.bezier_curve_to(
            Point::new(12.0, 2.0),
            Point::new(12.0, 8.0),
            Point::new(10.0, 10.0),
        );

        let mut clip = PdfPath::new();
        clip.rect(0.0, 0.0, 10.0, 10.0);
        clip.set_clipping(Default::default());

        let rulings = extract_rulings(&[diagonal, curved, clip], 5.0, 8.0, &TableParams::default());
        assert!(rulings.is_empty());
    }

    #[test]
    fn duplicate_rulings_are_dropped() {
        let mut a = PdfPath::new();
        a.move_to(0.0, 5.0);
        a.line_to(50.0, 5.0);
        let b = a.clone();
        let rulings = extract_rulings(&[a, b], 5.0, 8.0, &TableParams::default());
        assert_eq!(rulings.len(), 1);
    }

    #[test]
    fn collinear_touching_rulings_merge() {
        let rulings = [
            Ruling::horizontal(5.0, 0.0, 10.0),
            Ruling::horizontal(5.0, 8.0, 20.0),
            Ruling::horizontal(5.0, 30.0, 40.0),
            Ruling::horizontal(6.0, 0.0, 10.0),
        ];
        let merged = merge_rulings(&rulings);
        assert_eq!(merged.len(), 3);
        let spans: Vec<(f64, f64)> = merged
            .iter()
            .filter(|r| r.shared_coordinate() == 5.0)
            .map(|r| r.span())
            .collect();
        assert!(spans.contains(&(0.0, 20.0)));
        assert!(spans.contains(&(30.0, 40.0)));
    }

    #[test]
    fn merge_is_orientation_aware() {
        let rulings = [
            Ruling::horizontal(5.0, 0.0, 10.0),
            Ruling::vertical(5.0, 0.0, 10.0),
        ];
        assert_eq!(merge_rulings(&rulings).len(), 2);
    }
}
