use crate::{sample_bilinear_rgb, CoordinateMap, Correspondence, GeometryError, ProjectiveTransform};
use image::RgbImage;
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A page resampled into the canonical sheet frame.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub image: RgbImage,
    /// Canonical-frame → scan-frame transform that produced `image`.
    pub transform: ProjectiveTransform,
}

impl Sheet {
    /// Wrap an image that is already in canonical coordinates.
    pub fn from_canonical(image: RgbImage) -> Self {
        Self {
            image,
            transform: ProjectiveTransform::identity(),
        }
    }

    /// Rectify `page` onto a canonical frame of the same size.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(width = page.width(), height = page.height()))
    )]
    pub fn rectify(page: &RgbImage, correspondence: &Correspondence) -> Result<Self, GeometryError> {
        let transform = ProjectiveTransform::from_correspondence(correspondence)?;
        debug!("rectification transform: {:?}", transform.to_array());

        let map = transform.coordinate_map(page.width() as usize, page.height() as usize);
        Ok(Self {
            image: resample_sheet(page, &map),
            transform,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Resample `src` through `map`: output pixel `(r, c)` is the bilinear sample
/// of `src` at `map.at(r, c)`, with black outside the source.
pub fn resample_sheet(src: &RgbImage, map: &CoordinateMap) -> RgbImage {
    let mut out = RgbImage::new(map.width as u32, map.height as u32);
    for (col, row, px) in out.enumerate_pixels_mut() {
        let (x, y) = map.at(row as usize, col as usize);
        *px = sample_bilinear_rgb(src, x, y);
    }
    out
}
