#![allow(dead_code)]

use glyphsheet::{ExtractParams, Quad, TileGeometry};
use image::{Rgb, RgbImage};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([20, 20, 20]);
const HIGHLIGHTER: Rgb<u8> = Rgb([250, 240, 40]);

/// Where the canonical content sits on the synthetic scan.
pub const SCAN_OFFSET: (u32, u32) = (7, 5);

pub fn small_geometry() -> TileGeometry {
    TileGeometry {
        origin_row: 10,
        origin_col: 12,
        cell_rows: 57,
        cell_cols: 50,
        stride_rows: 60,
        stride_cols: 55,
    }
}

pub fn reference_quad() -> Quad {
    Quad::from_clockwise([(12.0, 10.0), (1100.0, 10.0), (1100.0, 1560.0), (12.0, 1560.0)])
}

/// Settings scaled down for 57 × 50 cells.
pub fn small_params() -> ExtractParams {
    ExtractParams {
        structuring_radius: 1,
        morph_iterations: 1,
        reference_quad: reference_quad(),
        geometry: Some(small_geometry()),
        ..ExtractParams::default()
    }
}

/// Corners of the reference quad as they appear on the synthetic scan.
pub fn scan_corners() -> [[f64; 2]; 4] {
    let (dx, dy) = (SCAN_OFFSET.0 as f64, SCAN_OFFSET.1 as f64);
    reference_quad()
        .corners()
        .map(|p| [p.x + dx, p.y + dy])
}

fn paint(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.put_pixel(x, y, color);
        }
    }
}

/// A scan whose every cell holds a centered 14 × 10 stroke, except the
/// `blank` cell (left empty) and the `tinted` cell (highlighter smear).
/// Cells are `(letter, replicate)`.
pub fn synthetic_scan(blank: (u8, u8), tinted: (u8, u8)) -> RgbImage {
    let g = small_geometry();
    let (rows, cols) = g.extent();
    let (dx, dy) = SCAN_OFFSET;
    let mut img = RgbImage::from_pixel(cols as u32 + dx, rows as u32 + dy, WHITE);
    for letter in 0..26u8 {
        for replicate in 0..20u8 {
            let (row, col) = g.cell_origin(letter, replicate);
            let (x, y) = (col + dx, row + dy);
            if (letter, replicate) != blank {
                paint(&mut img, x + 20, y + 21, 10, 14, INK);
            }
            if (letter, replicate) == tinted {
                paint(&mut img, x, y, 50, 8, HIGHLIGHTER);
            }
        }
    }
    img
}
