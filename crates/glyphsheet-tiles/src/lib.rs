//! Per-tile processing for rectified specimen sheets.
//!
//! A [`Sheet`](glyphsheet_core::Sheet) is cut into a fixed 26 × 20 grid of
//! cells (letter × replicate) by [`GridExtractor`]. Each [`RawTile`] then runs
//! through [`TilePipeline`]:
//!
//! 1. [`TileQualityGate`] rejects tiles whose color channels disagree
//!    (highlighter, colored pen).
//! 2. [`GlyphSegmenter`] inverts, thresholds and cleans the tile with an
//!    open/close pass using a disk-shaped [`StructuringElement`].
//! 3. [`Centroid`] / [`BoundingBox`] locate the glyph; an empty mask is
//!    rejected as [`RejectionReason::EmptyGlyph`].
//! 4. [`GlyphNormalizer`] centers the glyph and scales it to the fill ratio.
//! 5. [`BufferZoneGate`] rejects glyphs that reach into the tile margin.
//!
//! ```
//! use glyphsheet_tiles::{ExtractParams, TileOutcome, TilePipeline};
//! use image::{Rgb, RgbImage};
//!
//! let pipeline = TilePipeline::new(&ExtractParams::default());
//! let mut tile = RgbImage::from_pixel(200, 228, Rgb([255, 255, 255]));
//! for y in 89..139 {
//!     for x in 75..125 {
//!         tile.put_pixel(x, y, Rgb([0, 0, 0]));
//!     }
//! }
//! assert!(matches!(pipeline.process(&tile), TileOutcome::Accepted(_)));
//! ```

mod buffer_zone;
mod error;
mod grid;
mod localize;
mod normalize;
mod params;
mod pipeline;
mod quality;
mod segment;

pub use buffer_zone::{BufferWindow, BufferZoneGate};
pub use error::{ParamsError, TileError};
pub use grid::{GridExtractor, RawTile, TileGeometry, TileLabel, LETTERS, REPLICATES};
pub use localize::{BoundingBox, Centroid};
pub use normalize::{GlyphNormalizer, Placement};
pub use params::{Centering, ExtractParams, Sizing};
pub use pipeline::{RejectionReason, TileOutcome, TilePipeline};
pub use quality::{ColorHistogram, TileQualityGate};
pub use segment::{GlyphSegmenter, StructuringElement};
