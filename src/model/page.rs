//! Page content as handed over by the parser.

use super::path::PdfPath;
use crate::geometry::Rectangle;

/// A positioned glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct Letter {
    /// Text rendered by the glyph, usually a single character.
    pub value: String,
    /// Bounding box of the drawn glyph on the page.
    pub glyph_rectangle: Rectangle,
}

impl Letter {
    pub fn new(value: impl Into<String>, glyph_rectangle: Rectangle) -> Self {
        Self {
            value: value.into(),
            glyph_rectangle,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.value.chars().all(char::is_whitespace)
    }
}

/// One page of decoded content: crop bounds, letters and vector paths.
#[derive(Clone, Debug, Default)]
pub struct Page {
    /// Page number, 1-based.
    pub number: usize,
    /// Bounds of the crop box.
    pub crop_bounds: Option<Rectangle>,
    pub letters: Vec<Letter>,
    pub paths: Vec<PdfPath>,
}

impl Page {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    pub fn add_letter(&mut self, letter: Letter) {
        self.letters.push(letter);
    }

    pub fn add_path(&mut self, path: PdfPath) {
        self.paths.push(path);
    }
}
