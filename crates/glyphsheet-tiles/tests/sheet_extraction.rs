use glyphsheet_core::{Correspondence, Quad, Sheet};
use glyphsheet_tiles::{
    ExtractParams, GridExtractor, RejectionReason, TileGeometry, TileLabel, TileOutcome,
    TilePipeline,
};
use image::{Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([10, 10, 10]);
const HIGHLIGHTER: Rgb<u8> = Rgb([250, 240, 40]);

fn small_geometry() -> TileGeometry {
    TileGeometry {
        origin_row: 10,
        origin_col: 12,
        cell_rows: 57,
        cell_cols: 50,
        stride_rows: 60,
        stride_cols: 55,
    }
}

fn small_params() -> ExtractParams {
    ExtractParams {
        structuring_radius: 1,
        morph_iterations: 1,
        geometry: Some(small_geometry()),
        ..ExtractParams::default()
    }
}

fn paint(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.put_pixel(x, y, color);
        }
    }
}

/// Canonical sheet with a 14 × 10 stroke centered in every cell except
/// `blank`, plus a highlighter smear over `tinted`.
fn synthetic_sheet(blank: TileLabel, tinted: TileLabel) -> RgbImage {
    let g = small_geometry();
    let (rows, cols) = g.extent();
    let mut img = RgbImage::from_pixel(cols as u32, rows as u32, WHITE);
    for letter in 0..26u8 {
        for replicate in 0..20u8 {
            let (row, col) = g.cell_origin(letter, replicate);
            if (letter, replicate) != (blank.letter, blank.replicate) {
                paint(&mut img, col + 20, row + 21, 10, 14, INK);
            }
            if (letter, replicate) == (tinted.letter, tinted.replicate) {
                paint(&mut img, col, row, 50, 8, HIGHLIGHTER);
            }
        }
    }
    img
}

fn run_sheet(sheet: &Sheet, params: &ExtractParams) -> Vec<(TileLabel, TileOutcome)> {
    let pipeline = TilePipeline::new(params);
    GridExtractor::new(sheet, params.tile_geometry(), 3)
        .expect("grid fits")
        .map(|tile| {
            let outcome = pipeline.process_raw(&tile);
            (tile.label, outcome)
        })
        .collect()
}

#[test]
fn canonical_sheet_yields_expected_outcomes() {
    let blank = TileLabel::new(3, 5, 0);
    let tinted = TileLabel::new(3, 3, 4);
    let sheet = Sheet::from_canonical(synthetic_sheet(blank, tinted));

    let outcomes = run_sheet(&sheet, &small_params());
    assert_eq!(outcomes.len(), 520);

    for (label, outcome) in &outcomes {
        if *label == blank {
            assert_eq!(outcome.rejection(), Some(RejectionReason::EmptyGlyph));
        } else if *label == tinted {
            assert_eq!(outcome.rejection(), Some(RejectionReason::ColorContamination));
        } else {
            let TileOutcome::Accepted(mask) = outcome else {
                panic!("{label} rejected: {outcome:?}");
            };
            assert_eq!(mask.dimensions(), (50, 57));
            assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        }
    }
}

#[test]
fn shifted_scan_is_rectified_before_extraction() {
    let blank = TileLabel::new(3, 25, 19);
    let tinted = TileLabel::new(3, 0, 0);
    let canonical = synthetic_sheet(blank, tinted);
    let (w, h) = canonical.dimensions();

    // Scan content sits 7 px right and 5 px down of where it belongs.
    let mut page = RgbImage::from_pixel(w + 7, h + 5, WHITE);
    image::imageops::replace(&mut page, &canonical, 7, 5);

    let target = Quad::frame(w as f64, h as f64);
    let correspondence = Correspondence::new(target.translated(7.0, 5.0), target);
    let sheet = Sheet::rectify(&page, &correspondence).expect("rectify");
    assert_eq!(sheet.image.dimensions(), (w + 7, h + 5));
    assert_eq!(
        image::imageops::crop_imm(&sheet.image, 0, 0, w, h).to_image(),
        canonical
    );

    let outcomes = run_sheet(&sheet, &small_params());
    let accepted = outcomes.iter().filter(|(_, o)| o.is_accepted()).count();
    assert_eq!(accepted, 518);
}

#[test]
fn default_params_need_a_full_size_sheet() {
    let sheet = Sheet::from_canonical(RgbImage::new(1000, 1000));
    let params = ExtractParams::default();
    assert!(GridExtractor::new(&sheet, params.tile_geometry(), 0).is_err());
}
