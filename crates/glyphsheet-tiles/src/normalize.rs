use image::{GrayImage, Luma};

use crate::{BoundingBox, Centering, Centroid, Sizing};

/// Shift followed by an isotropic scale about the tile center.
///
/// The pivot is the glyph's alignment point after the shift, in continuous
/// pixel coordinates (pixel `i` spans `[i, i + 1)`). It lies within one
/// pixel of `(rows / 2, cols / 2)`; odd-sized boxes put it on a pixel center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub shift_rows: i64,
    pub shift_cols: i64,
    pub scale: f64,
    pub pivot_row: f64,
    pub pivot_col: f64,
}

impl Placement {
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.shift_rows == 0 && self.shift_cols == 0 && self.scale == 1.0
    }
}

/// Centers a glyph mask in its tile and optionally rescales it to the fill ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphNormalizer {
    pub centering: Centering,
    pub sizing: Sizing,
    pub fill_ratio: f64,
}

impl GlyphNormalizer {
    pub fn new(centering: Centering, sizing: Sizing, fill_ratio: f64) -> Self {
        Self {
            centering,
            sizing,
            fill_ratio,
        }
    }

    /// Placement for a `rows` × `cols` tile given the glyph's measurements.
    ///
    /// A glyph already within one pixel of the target extent keeps scale 1,
    /// so normalizing a normalized glyph changes nothing.
    pub fn placement(
        &self,
        rows: u32,
        cols: u32,
        centroid: &Centroid,
        bbox: &BoundingBox,
    ) -> Placement {
        let (center_row, center_col) = match self.centering {
            Centering::Centroid => (centroid.row.trunc() as i64, centroid.col.trunc() as i64),
            Centering::BoundingBox => {
                let (r, c) = bbox.center();
                (r as i64, c as i64)
            }
        };
        let shift_rows = (rows / 2) as i64 - center_row;
        let shift_cols = (cols / 2) as i64 - center_col;

        let (pivot_row, pivot_col) = match self.centering {
            Centering::Centroid => (
                centroid.row + shift_rows as f64 + 0.5,
                centroid.col + shift_cols as f64 + 0.5,
            ),
            Centering::BoundingBox => (
                (bbox.row as i64 + shift_rows) as f64 + bbox.height as f64 / 2.0,
                (bbox.col as i64 + shift_cols) as f64 + bbox.width as f64 / 2.0,
            ),
        };

        let (target, extent) = if bbox.height >= bbox.width {
            (self.fill_ratio * rows as f64, bbox.height as f64)
        } else {
            (self.fill_ratio * cols as f64, bbox.width as f64)
        };
        let scale = match self.sizing {
            Sizing::Original => 1.0,
            Sizing::Normalize if (target - extent).abs() < 1.0 => 1.0,
            Sizing::Normalize => target / extent,
        };

        Placement {
            shift_rows,
            shift_cols,
            scale,
            pivot_row,
            pivot_col,
        }
    }

    /// Shift into a same-size canvas, then scale about the placement pivot.
    ///
    /// Nearest-neighbour sampling at pixel centers keeps the mask binary.
    /// Pixels pulled from outside the tile are background.
    pub fn apply(&self, mask: &GrayImage, placement: &Placement) -> GrayImage {
        if placement.is_identity() {
            return mask.clone();
        }
        let shifted = shift(mask, placement.shift_rows, placement.shift_cols);
        if placement.scale == 1.0 {
            return shifted;
        }
        scale_about(
            &shifted,
            placement.scale,
            placement.pivot_row,
            placement.pivot_col,
        )
    }

    /// Measure, place and transform in one go. `None` for an empty mask.
    pub fn normalize(&self, mask: &GrayImage) -> Option<GrayImage> {
        let centroid = Centroid::of(mask)?;
        let bbox = BoundingBox::of(mask)?;
        let placement = self.placement(mask.height(), mask.width(), &centroid, &bbox);
        Some(self.apply(mask, &placement))
    }
}

fn shift(mask: &GrayImage, rows: i64, cols: i64) -> GrayImage {
    let (w, h) = mask.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let sx = x as i64 - cols;
        let sy = y as i64 - rows;
        if sx < 0 || sy < 0 || sx >= w as i64 || sy >= h as i64 {
            Luma([0])
        } else {
            *mask.get_pixel(sx as u32, sy as u32)
        }
    })
}

fn scale_about(mask: &GrayImage, scale: f64, pivot_row: f64, pivot_col: f64) -> GrayImage {
    let (w, h) = mask.dimensions();
    if !(scale.is_finite() && scale > 0.0) {
        return GrayImage::new(w, h);
    }
    let inv = 1.0 / scale;
    GrayImage::from_fn(w, h, |x, y| {
        let sx = (pivot_col + (x as f64 + 0.5 - pivot_col) * inv).floor();
        let sy = (pivot_row + (y as f64 + 0.5 - pivot_row) * inv).floor();
        if sx < 0.0 || sy < 0.0 || sx >= w as f64 || sy >= h as f64 {
            Luma([0])
        } else {
            *mask.get_pixel(sx as u32, sy as u32)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_mask(w: u32, h: u32, row: u32, col: u32, side: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let inside = (col..col + side).contains(&x) && (row..row + side).contains(&y);
            Luma([if inside { 255 } else { 0 }])
        })
    }

    fn normalizer() -> GlyphNormalizer {
        GlyphNormalizer::new(Centering::BoundingBox, Sizing::Normalize, 0.7)
    }

    #[test]
    fn placement_uses_longer_side() {
        let n = normalizer();
        let c = Centroid { row: 0.0, col: 0.0 };
        let tall = BoundingBox {
            row: 0,
            col: 0,
            height: 100,
            width: 40,
        };
        let wide = BoundingBox {
            row: 0,
            col: 0,
            height: 40,
            width: 100,
        };
        let p = n.placement(228, 200, &c, &tall);
        assert_relative_eq!(p.scale, 0.7 * 228.0 / 100.0);
        let p = n.placement(228, 200, &c, &wide);
        assert_relative_eq!(p.scale, 0.7 * 200.0 / 100.0);
    }

    #[test]
    fn centroid_mode_truncates() {
        let n = GlyphNormalizer::new(Centering::Centroid, Sizing::Original, 0.7);
        let c = Centroid {
            row: 113.9,
            col: 99.2,
        };
        let bbox = BoundingBox {
            row: 0,
            col: 0,
            height: 1,
            width: 1,
        };
        let p = n.placement(228, 200, &c, &bbox);
        assert_eq!((p.shift_rows, p.shift_cols, p.scale), (1, 1, 1.0));
    }

    #[test]
    fn shift_moves_glyph_and_drops_overflow() {
        let n = GlyphNormalizer::new(Centering::BoundingBox, Sizing::Original, 0.7);
        let m = square_mask(20, 20, 2, 2, 4);
        let p = Placement {
            shift_rows: 10,
            shift_cols: -1,
            scale: 1.0,
            pivot_row: 10.0,
            pivot_col: 10.0,
        };
        let out = n.apply(&m, &p);
        assert_eq!(out.get_pixel(1, 12).0[0], 255);
        assert_eq!(out.get_pixel(4, 15).0[0], 255);
        assert_eq!(out.get_pixel(5, 12).0[0], 0);
        assert_eq!(out.get_pixel(2, 2).0[0], 0);
    }

    #[test]
    fn off_center_square_is_centered() {
        let n = GlyphNormalizer::new(Centering::BoundingBox, Sizing::Original, 0.7);
        let m = square_mask(100, 100, 10, 20, 30);
        let out = n.normalize(&m).expect("non-empty");
        let b = BoundingBox::of(&out).expect("contour");
        assert_eq!(b.center(), (50, 50));
        assert_eq!((b.height, b.width), (30, 30));
    }

    #[test]
    fn normalized_glyph_is_a_fixed_point() {
        let n = normalizer();
        // 140 = 0.7 * 200, already centered
        let m = square_mask(200, 200, 30, 30, 140);
        let once = n.normalize(&m).expect("non-empty");
        assert_eq!(once, m);
        let twice = n.normalize(&once).expect("non-empty");
        assert_eq!(twice, once);
    }

    #[test]
    fn scaling_grows_square_to_fill_ratio() {
        let n = normalizer();
        let m = square_mask(200, 228, 89, 75, 50);
        let out = n.normalize(&m).expect("non-empty");
        let b = BoundingBox::of(&out).expect("contour");
        assert_eq!((b.row, b.col, b.height, b.width), (34, 20, 160, 160));
        assert_eq!(b.center(), (114, 100));
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    fn rect_mask(w: u32, h: u32, row: u32, col: u32, height: u32, width: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let inside = (col..col + width).contains(&x) && (row..row + height).contains(&y);
            Luma([if inside { 255 } else { 0 }])
        })
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let n = normalizer();
        let shapes = [
            (89, 75, 50, 50),
            (40, 10, 60, 30),
            (20, 50, 81, 37),
            (100, 20, 30, 60),
        ];
        for (row, col, height, width) in shapes {
            let m = rect_mask(200, 228, row, col, height, width);
            let once = n.normalize(&m).expect("non-empty");
            let b = BoundingBox::of(&once).expect("contour");
            assert_eq!(b.center(), (114, 100), "{height}x{width}: {b:?}");

            let c = Centroid::of(&once).expect("non-empty");
            assert!(n.placement(228, 200, &c, &b).is_identity(), "{height}x{width}");
            assert_eq!(n.normalize(&once).expect("non-empty"), once);
        }
    }

    #[test]
    fn centroid_mode_keeps_centroid_on_center() {
        let n = GlyphNormalizer::new(Centering::Centroid, Sizing::Normalize, 0.7);
        let m = square_mask(200, 228, 89, 75, 50);
        let once = n.normalize(&m).expect("non-empty");
        let c = Centroid::of(&once).expect("non-empty");
        assert_eq!((c.row.trunc(), c.col.trunc()), (114.0, 100.0));
        assert_eq!(n.normalize(&once).expect("non-empty"), once);
    }

    #[test]
    fn near_target_extent_keeps_scale_one() {
        let n = normalizer();
        let c = Centroid { row: 0.0, col: 0.0 };
        let bbox = BoundingBox {
            row: 34,
            col: 20,
            height: 160,
            width: 160,
        };
        assert_eq!(n.placement(228, 200, &c, &bbox).scale, 1.0);
    }

    #[test]
    fn empty_mask_is_not_normalized() {
        assert_eq!(normalizer().normalize(&GrayImage::new(10, 10)), None);
    }
}
