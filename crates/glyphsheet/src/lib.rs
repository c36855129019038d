//! Turn scanned handwriting specimen sheets into labeled glyph tiles.
//!
//! Each specimen sheet holds 20 handwritten samples of each of the 26
//! letters in a fixed grid. For every scanned page:
//!
//! 1. a [`CorrespondenceSource`] supplies the four page corners (from a
//!    [`PointFile`] or interactively through a [`ClickCollector`]),
//! 2. the page is rectified into the canonical sheet frame
//!    ([`glyphsheet_core`]),
//! 3. the grid is cut into 520 tiles and each tile is gated, segmented,
//!    centered and scaled ([`glyphsheet_tiles`]),
//! 4. accepted tiles go to a [`TileSink`], usually a [`DirectorySink`].
//!
//! [`dataset::pack_dataset`] then bundles a tile tree into MNIST-style IDX
//! files.
//!
//! ## Quickstart
//!
//! ```no_run
//! use glyphsheet::{run_extraction, DirectoryPages, DirectorySink, ExtractParams, PointFile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let params = ExtractParams::default();
//! let pages = DirectoryPages::open("scans")?;
//! let mut points = PointFile::load("corners.json")?;
//! let mut sink = DirectorySink::for_mode("tiles", params.square);
//!
//! let summary = run_extraction(pages, &mut points, &mut sink, &params, 0)?;
//! println!("kept {} tiles, rejected {}", summary.accepted, summary.rejected());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `glyphsheet::core`: quads, projective transforms, sheet rectification.
//! - `glyphsheet::tiles`: grid extraction and the per-tile pipeline.
//! - `glyphsheet::session`: pointer decoding and interactive corner picking.
//! - `glyphsheet::dataset`: IDX packing with gzip copies.

pub use glyphsheet_core as core;
pub use glyphsheet_tiles as tiles;

pub use glyphsheet_core::{Correspondence, GeometryError, Quad, Sheet};
pub use glyphsheet_tiles::{
    Centering, ExtractParams, ParamsError, RejectionReason, Sizing, TileGeometry, TileLabel,
    TileOutcome, TilePipeline,
};

pub mod dataset;
mod error;
mod run;
pub mod session;
mod sink;

pub use error::RunError;
pub use run::{
    run_extraction, CorrespondenceSource, DirectoryPages, PageAction, PageSource, PointEntry,
    PointFile, PointRequest, RunSummary, TileSink,
};
pub use session::{ClickCollector, EventFeed, EventTranscript};
pub use sink::{DirectorySink, STANDARD_RESOLUTIONS};
