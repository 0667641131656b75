//! End-to-end tests for ruling-based table detection.

use folio::{get_table_candidates, Letter, Page, PdfPath, Point, Rectangle, TableParams};

fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> PdfPath {
    let mut path = PdfPath::new();
    path.move_to(x0, y0);
    path.line_to(x1, y1);
    path
}

fn letter(value: &str, x: f64, y: f64) -> Letter {
    Letter::new(
        value,
        Rectangle::new(Point::new(x, y), Point::new(x + 5.0, y + 8.0)),
    )
}

/// A page drawing a 2 x 2 ruled grid over [0, 100] x [0, 100].
fn grid_page() -> Page {
    let mut page = Page::new(1);
    for y in [0.0, 50.0, 100.0] {
        page.add_path(line(0.0, y, 100.0, y));
    }
    for x in [0.0, 50.0, 100.0] {
        page.add_path(line(x, 0.0, x, 100.0));
    }
    page.add_letter(letter("a", 10.0, 60.0));
    page.add_letter(letter("b", 60.0, 60.0));
    page.add_letter(letter("c", 10.0, 10.0));
    page.add_letter(letter("d", 60.0, 10.0));
    page
}

#[test]
fn test_grid_yields_one_table_of_four_cells() {
    let candidates = get_table_candidates(&grid_page(), &TableParams::default());
    assert_eq!(candidates.len(), 1);
    let table = &candidates[0];
    assert_eq!(table.cells.len(), 4);

    // The cells tile the grid exactly.
    let total: f64 = table.cells.iter().map(|c| c.area()).sum();
    assert!((total - 100.0 * 100.0).abs() < 1e-6);
    let bounds = table.bounds();
    assert!((bounds.area() - 100.0 * 100.0).abs() < 1e-6);
    for cell in &table.cells {
        assert!((cell.width() - 50.0).abs() < 1e-6);
        assert!((cell.height() - 50.0).abs() < 1e-6);
    }
}

#[test]
fn test_table_rows_read_top_down() {
    let candidates = get_table_candidates(&grid_page(), &TableParams::default());
    let rows = candidates[0].rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 2);
    assert!(rows[0][0].top() > rows[1][0].top());
    assert!(rows[0][0].left() < rows[0][1].left());
}

#[test]
fn test_page_without_rulings_is_empty() {
    let mut page = Page::new(1);
    page.add_letter(letter("x", 0.0, 0.0));
    assert!(get_table_candidates(&page, &TableParams::default()).is_empty());

    let empty = Page::new(2);
    assert!(get_table_candidates(&empty, &TableParams::default()).is_empty());
}

#[test]
fn test_fragmented_rulings_still_form_grid() {
    // Each horizontal border is drawn as two touching halves; the merge
    // phase must stitch them before intersection.
    let mut page = Page::new(1);
    for y in [0.0, 50.0, 100.0] {
        page.add_path(line(0.0, y, 55.0, y));
        page.add_path(line(55.0, y, 100.0, y));
    }
    for x in [0.0, 50.0, 100.0] {
        page.add_path(line(x, 0.0, x, 100.0));
    }
    let candidates = get_table_candidates(&page, &TableParams::default());
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].cells.len(), 4);
}

#[test]
fn test_thin_bars_act_as_rulings() {
    // Borders drawn as thin filled rectangles instead of stroked lines.
    let mut page = Page::new(1);
    for y in [0.0, 50.0, 100.0] {
        let mut bar = PdfPath::new();
        bar.rect(0.0, y - 0.4, 100.0, 0.8);
        page.add_path(bar);
    }
    for x in [0.0, 50.0, 100.0] {
        let mut bar = PdfPath::new();
        bar.rect(x - 0.4, 0.0, 0.8, 100.0);
        page.add_path(bar);
    }
    page.add_letter(letter("a", 10.0, 60.0));
    let candidates = get_table_candidates(&page, &TableParams::default());
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].cells.len(), 4);
}

#[test]
fn test_two_separate_grids_give_two_tables() {
    let mut page = grid_page();
    for y in [300.0, 350.0] {
        page.add_path(line(0.0, y, 50.0, y));
    }
    for x in [0.0, 50.0] {
        page.add_path(line(x, 300.0, x, 350.0));
    }
    let candidates = get_table_candidates(&page, &TableParams::default());
    assert_eq!(candidates.len(), 2);
    // Ordered top to bottom: the single-cell grid sits higher.
    assert_eq!(candidates[0].cells.len(), 1);
    assert_eq!(candidates[1].cells.len(), 4);
}

#[test]
fn test_diagonal_strokes_do_not_produce_tables() {
    let mut page = Page::new(1);
    page.add_path(line(0.0, 0.0, 100.0, 100.0));
    page.add_path(line(0.0, 100.0, 100.0, 0.0));
    assert!(get_table_candidates(&page, &TableParams::default()).is_empty());
}

#[test]
fn test_clipping_paths_are_ignored() {
    let mut page = grid_page();
    let before = get_table_candidates(&page, &TableParams::default());
    let mut clip = PdfPath::new();
    clip.rect(0.0, 200.0, 40.0, 40.0);
    clip.set_clipping(Default::default());
    page.add_path(clip);
    let after = get_table_candidates(&page, &TableParams::default());
    assert_eq!(before.len(), after.len());
    assert_eq!(before[0].cells.len(), after[0].cells.len());
}
