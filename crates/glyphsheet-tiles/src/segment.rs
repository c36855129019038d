use std::fmt;

use image::{GrayImage, Luma, RgbImage};
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};

/// Disk-shaped structuring element, built once per run and shared read-only.
pub struct StructuringElement {
    radius: u32,
    mask: Mask,
}

impl StructuringElement {
    pub fn disk(radius: u32) -> Self {
        let radius = radius.min(u8::MAX as u32);
        Self {
            radius,
            mask: Mask::disk(radius as u8),
        }
    }

    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn erode(&self, mask: &GrayImage) -> GrayImage {
        grayscale_erode(mask, &self.mask)
    }

    pub fn dilate(&self, mask: &GrayImage) -> GrayImage {
        grayscale_dilate(mask, &self.mask)
    }
}

impl fmt::Debug for StructuringElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuringElement")
            .field("radius", &self.radius)
            .finish()
    }
}

/// Turns a color tile into a clean binary ink mask (ink = 255).
#[derive(Debug)]
pub struct GlyphSegmenter {
    pub threshold: u8,
    pub iterations: u32,
    pub element: StructuringElement,
}

impl GlyphSegmenter {
    pub fn new(threshold: u8, iterations: u32, element: StructuringElement) -> Self {
        Self {
            threshold,
            iterations,
            element,
        }
    }

    /// Inverted luminance thresholded at `threshold`: `> threshold` → 255, else 0.
    pub fn binarize(&self, tile: &RgbImage) -> GrayImage {
        let mut out = GrayImage::new(tile.width(), tile.height());
        for (dst, src) in out.pixels_mut().zip(tile.pixels()) {
            let [r, g, b] = src.0;
            let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
            let ink = 255 - luma.min(255) as u8;
            *dst = Luma([if ink > self.threshold { 255 } else { 0 }]);
        }
        out
    }

    /// Opening (drops specks) followed by closing (fills pinholes and gaps).
    pub fn clean(&self, mask: &GrayImage) -> GrayImage {
        let mut m = self.repeat(mask, |m| self.element.erode(m));
        m = self.repeat(&m, |m| self.element.dilate(m));
        m = self.repeat(&m, |m| self.element.dilate(m));
        self.repeat(&m, |m| self.element.erode(m))
    }

    pub fn segment(&self, tile: &RgbImage) -> GrayImage {
        self.clean(&self.binarize(tile))
    }

    fn repeat(&self, mask: &GrayImage, op: impl Fn(&GrayImage) -> GrayImage) -> GrayImage {
        let mut out = mask.clone();
        for _ in 0..self.iterations {
            out = op(&out);
        }
        out
    }
}
