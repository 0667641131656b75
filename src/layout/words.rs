//! Nearest-neighbour word extraction.
//!
//! Joins letters into words by clustering on the gap between one glyph's
//! bottom-right and the next glyph's bottom-left corner. Whitespace never
//! starts an edge, so words split at spaces without any text inspection.

use super::clustering::cluster_nearest_neighbours;
use super::params::{ClusteringOptions, WordExtractorOptions};
use crate::geometry::distance::manhattan;
use crate::geometry::Rectangle;
use crate::model::Letter;

/// A run of letters read as one word.
#[derive(Clone, Debug, PartialEq)]
pub struct Word {
    pub text: String,
    pub bounding_box: Rectangle,
    pub letters: Vec<Letter>,
}

/// Groups letters into words.
///
/// Whitespace letters are dropped up front: the gap they leave splits
/// words by distance alone. Letters joined into a word are ordered left to
/// right; words come out in the order of their first letter in the input.
pub fn extract_words(letters: &[Letter], options: &WordExtractorOptions) -> Vec<Word> {
    let letters: Vec<&Letter> = letters.iter().filter(|l| !l.is_whitespace()).collect();
    if letters.is_empty() {
        return Vec::new();
    }

    let multiplier = options.maximum_distance_multiplier;
    let groups = cluster_nearest_neighbours(
        &letters,
        manhattan,
        |l1: &&Letter, l2: &&Letter| {
            let g1 = &l1.glyph_rectangle;
            let g2 = &l2.glyph_rectangle;
            multiplier
                * g1.width()
                    .max(g2.width())
                    .max(g1.height())
                    .max(g2.height())
        },
        |l: &&Letter| l.glyph_rectangle.bottom_right,
        |l: &&Letter| l.glyph_rectangle.bottom_left,
        |_: &&Letter| true,
        |l1: &&Letter, l2: &&Letter| vertical_overlap(l1, l2),
        &ClusteringOptions {
            max_workers: options.max_workers,
        },
    );

    let mut words = Vec::with_capacity(groups.len());
    for group in groups {
        let mut members: Vec<&Letter> = group.iter().map(|&i| letters[i]).collect();
        members.sort_by(|a, b| {
            a.glyph_rectangle
                .left()
                .total_cmp(&b.glyph_rectangle.left())
                .then(
                    b.glyph_rectangle
                        .bottom()
                        .total_cmp(&a.glyph_rectangle.bottom()),
                )
        });

        let text: String = members.iter().map(|l| l.value.as_str()).collect();
        let bounding_box = members
            .iter()
            .skip(1)
            .fold(members[0].glyph_rectangle, |acc, l| {
                acc.union(&l.glyph_rectangle)
            });
        words.push(Word {
            text,
            bounding_box,
            letters: members.into_iter().cloned().collect(),
        });
    }
    words
}

/// Whether the two glyphs share any vertical extent; letters on different
/// lines never join a word.
fn vertical_overlap(l1: &Letter, l2: &Letter) -> bool {
    let g1 = &l1.glyph_rectangle;
    let g2 = &l2.glyph_rectangle;
    g1.bottom() <= g2.top() && g2.bottom() <= g1.top()
}
