//! Geometric core for specimen-sheet processing.
//!
//! A scanned page is brought into the canonical sheet frame in two steps:
//!
//! 1. [`ProjectiveTransform::from_correspondence`] solves for the 3×3
//!    projective transform that carries the four reference corners of the
//!    canonical frame onto the four corners picked on the scan, and
//!    [`ProjectiveTransform::coordinate_map`] expands it into a dense
//!    per-pixel [`CoordinateMap`].
//! 2. [`resample_sheet`] pulls every canonical pixel out of the scan with
//!    bilinear interpolation, producing a [`Sheet`].
//!
//! ```
//! use glyphsheet_core::{Correspondence, GeometryError, Quad, Sheet};
//! use image::RgbImage;
//!
//! # fn main() -> Result<(), GeometryError> {
//! let page = RgbImage::new(64, 48);
//! let frame = Quad::frame(64.0, 48.0);
//! let sheet = Sheet::rectify(&page, &Correspondence::new(frame, frame))?;
//! assert_eq!(sheet.image.dimensions(), (64, 48));
//! # Ok(())
//! # }
//! ```
//!
//! This crate knows nothing about letters or tiles; grid extraction and glyph
//! handling live in `glyphsheet-tiles`.

mod error;
mod homography;
mod logger;
mod quad;
mod rectify;
mod sampling;

pub use error::{GeometryError, QuadRole};
pub use homography::{rectification_map, CoordinateMap, ProjectiveTransform};
pub use quad::{Correspondence, Quad};
pub use rectify::{resample_sheet, Sheet};
pub use sampling::{sample_bilinear, sample_bilinear_rgb};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
