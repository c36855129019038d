use std::fmt;

use glyphsheet_core::Sheet;
use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};

use crate::TileError;

/// Letters per sheet (grid rows).
pub const LETTERS: u8 = 26;
/// Samples of each letter per sheet (grid columns).
pub const REPLICATES: u8 = 20;

const FILE_PREFIX: &str = "ritcis";

/// Placement of the letter × replicate grid in the canonical sheet frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGeometry {
    /// Upper-left pixel of the first cell.
    pub origin_row: u32,
    pub origin_col: u32,
    /// Size of one cell.
    pub cell_rows: u32,
    pub cell_cols: u32,
    /// Offset between the upper-left corners of neighbouring cells.
    pub stride_rows: u32,
    pub stride_cols: u32,
}

impl Default for TileGeometry {
    fn default() -> Self {
        Self {
            origin_row: 503,
            origin_col: 765,
            cell_rows: 228,
            cell_cols: 200,
            stride_rows: 221,
            stride_cols: 196,
        }
    }
}

impl TileGeometry {
    /// Square cells: trimmed by 14 px top and bottom.
    pub fn square() -> Self {
        let base = Self::default();
        Self {
            origin_row: base.origin_row + 14,
            cell_rows: base.cell_rows - 28,
            ..base
        }
    }

    pub fn for_mode(square: bool) -> Self {
        if square {
            Self::square()
        } else {
            Self::default()
        }
    }

    /// Upper-left `(row, col)` of a cell.
    #[inline]
    pub fn cell_origin(&self, letter: u8, replicate: u8) -> (u32, u32) {
        (
            self.origin_row + letter as u32 * self.stride_rows,
            self.origin_col + replicate as u32 * self.stride_cols,
        )
    }

    /// Rows and columns the full grid spans, measured from the sheet origin.
    pub fn extent(&self) -> (u64, u64) {
        let rows = self.origin_row as u64
            + (LETTERS as u64 - 1) * self.stride_rows as u64
            + self.cell_rows as u64;
        let cols = self.origin_col as u64
            + (REPLICATES as u64 - 1) * self.stride_cols as u64
            + self.cell_cols as u64;
        (rows, cols)
    }

    /// Check that every cell window lies inside a `width` × `height` sheet.
    pub fn validate(&self, width: u32, height: u32) -> Result<(), TileError> {
        if self.cell_rows == 0 || self.cell_cols == 0 {
            return Err(TileError::EmptyCell {
                rows: self.cell_rows,
                cols: self.cell_cols,
            });
        }
        let (rows, cols) = self.extent();
        if rows > height as u64 || cols > width as u64 {
            return Err(TileError::GridOutOfBounds {
                needed_rows: rows,
                needed_cols: cols,
                sheet_rows: height,
                sheet_cols: width,
            });
        }
        Ok(())
    }
}

/// Identity of one handwriting sample: sheet number, letter and replicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileLabel {
    pub sample: u32,
    /// 0-based letter index, `0 == 'A'`.
    pub letter: u8,
    pub replicate: u8,
}

impl TileLabel {
    pub fn new(sample: u32, letter: u8, replicate: u8) -> Self {
        Self {
            sample,
            letter,
            replicate,
        }
    }

    #[inline]
    pub fn letter_char(&self) -> char {
        (b'A' + self.letter) as char
    }

    /// Parse a file stem such as `ritcis_007_C_04`.
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        let mut parts = stem.split('_');
        if parts.next()? != FILE_PREFIX {
            return None;
        }
        let sample = parts.next()?.parse().ok()?;
        let letter = match parts.next()?.as_bytes() {
            [c @ b'A'..=b'Z'] => c - b'A',
            _ => return None,
        };
        let replicate: u8 = parts.next()?.parse().ok()?;
        if parts.next().is_some() || replicate >= REPLICATES {
            return None;
        }
        Some(Self::new(sample, letter, replicate))
    }
}

impl fmt::Display for TileLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{FILE_PREFIX}_{:03}_{}_{:02}",
            self.sample,
            self.letter_char(),
            self.replicate
        )
    }
}

/// A cell cut from the sheet, still in color.
#[derive(Clone, Debug)]
pub struct RawTile {
    pub label: TileLabel,
    pub image: RgbImage,
}

/// Lazily cuts the 520 cells of a sheet, letter-major, replicate-minor.
pub struct GridExtractor<'a> {
    sheet: &'a Sheet,
    geometry: TileGeometry,
    sample: u32,
    next: usize,
}

impl<'a> GridExtractor<'a> {
    pub fn new(sheet: &'a Sheet, geometry: TileGeometry, sample: u32) -> Result<Self, TileError> {
        geometry.validate(sheet.width(), sheet.height())?;
        Ok(Self {
            sheet,
            geometry,
            sample,
            next: 0,
        })
    }

    const TOTAL: usize = LETTERS as usize * REPLICATES as usize;
}

impl Iterator for GridExtractor<'_> {
    type Item = RawTile;

    fn next(&mut self) -> Option<RawTile> {
        if self.next >= Self::TOTAL {
            return None;
        }
        let letter = (self.next / REPLICATES as usize) as u8;
        let replicate = (self.next % REPLICATES as usize) as u8;
        self.next += 1;

        let (row, col) = self.geometry.cell_origin(letter, replicate);
        let image = imageops::crop_imm(
            &self.sheet.image,
            col,
            row,
            self.geometry.cell_cols,
            self.geometry.cell_rows,
        )
        .to_image();

        Some(RawTile {
            label: TileLabel::new(self.sample, letter, replicate),
            image,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = Self::TOTAL - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for GridExtractor<'_> {}
