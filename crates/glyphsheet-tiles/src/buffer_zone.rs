use image::GrayImage;

/// Half-open pixel window `[top, bottom) × [left, right)` a glyph must stay inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferWindow {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

impl BufferWindow {
    #[inline]
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.top..self.bottom).contains(&row) && (self.left..self.right).contains(&col)
    }
}

/// Rejects normalized glyphs with ink in the margin band around the fill region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BufferZoneGate {
    pub fill_ratio: f64,
    pub buffer_ratio: f64,
}

impl Default for BufferZoneGate {
    fn default() -> Self {
        Self {
            fill_ratio: 0.7,
            buffer_ratio: 0.5,
        }
    }
}

impl BufferZoneGate {
    pub fn new(fill_ratio: f64, buffer_ratio: f64) -> Self {
        Self {
            fill_ratio,
            buffer_ratio,
        }
    }

    /// Window for a `rows` × `cols` tile.
    pub fn window(&self, rows: u32, cols: u32) -> BufferWindow {
        let (top, bottom) = self.span(rows);
        let (left, right) = self.span(cols);
        BufferWindow {
            top,
            left,
            bottom,
            right,
        }
    }

    fn span(&self, extent: u32) -> (u32, u32) {
        let unfilled = 1.0 - self.fill_ratio;
        let margin = (extent as f64 * unfilled / 2.0) as u32;
        let buffer = (self.buffer_ratio * margin as f64) as u32;
        let end = (extent as f64 * (self.fill_ratio + unfilled / 2.0)) as u32;
        (
            margin.saturating_sub(buffer),
            end.saturating_add(buffer).min(extent),
        )
    }

    /// On-pixels of `mask` that fall outside the window.
    pub fn impinging_pixels(&self, mask: &GrayImage) -> u64 {
        let window = self.window(mask.height(), mask.width());
        let total = mask.pixels().filter(|p| p.0[0] > 0).count() as u64;
        let inside = mask
            .enumerate_pixels()
            .filter(|(x, y, p)| p.0[0] > 0 && window.contains(*y, *x))
            .count() as u64;
        total - inside
    }

    pub fn admits(&self, mask: &GrayImage) -> bool {
        self.impinging_pixels(mask) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn confined(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let inside = (40..160).contains(&x) && (40..180).contains(&y);
            Luma([if inside { 255 } else { 0 }])
        })
    }

    #[test]
    fn default_window_for_standard_tile() {
        let g = BufferZoneGate::default();
        assert_eq!(
            g.window(228, 200),
            BufferWindow {
                top: 17,
                left: 15,
                bottom: 210,
                right: 185
            }
        );
        let w = g.window(200, 200);
        assert_eq!((w.top, w.bottom, w.left, w.right), (15, 185, 15, 185));
    }

    #[test]
    fn confined_glyph_is_admitted() {
        let g = BufferZoneGate::default();
        assert!(g.admits(&confined(200, 228)));
        assert!(g.admits(&GrayImage::new(200, 228)));
    }

    #[test]
    fn single_margin_pixel_is_rejected() {
        let g = BufferZoneGate::default();
        let mut m = confined(200, 228);
        m.put_pixel(100, 5, Luma([255]));
        assert_eq!(g.impinging_pixels(&m), 1);
        assert!(!g.admits(&m));
    }

    #[test]
    fn window_edges_are_half_open() {
        let g = BufferZoneGate::default();
        let mut m = GrayImage::new(200, 228);
        m.put_pixel(15, 17, Luma([255]));
        m.put_pixel(184, 209, Luma([255]));
        assert!(g.admits(&m));
        m.put_pixel(185, 100, Luma([255]));
        assert!(!g.admits(&m));
    }

    #[test]
    fn zero_buffer_ratio_narrows_to_fill_region() {
        let g = BufferZoneGate::new(0.7, 0.0);
        let w = g.window(228, 200);
        assert_eq!((w.top, w.bottom), (34, 193));
        assert_eq!((w.left, w.right), (30, 170));
    }
}
