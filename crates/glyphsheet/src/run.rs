//! The page-by-page extraction loop and its external collaborators.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use glyphsheet_core::{Correspondence, Quad, Sheet};
use glyphsheet_tiles::{
    ExtractParams, GridExtractor, RejectionReason, TileError, TileLabel, TileOutcome,
    TilePipeline,
};
use image::{GrayImage, RgbImage};
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::RunError;

const PAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp", "pnm"];

/// Scanned pages in processing order.
pub trait PageSource: Iterator<Item = Result<RgbImage, RunError>> {}

impl<T: Iterator<Item = Result<RgbImage, RunError>>> PageSource for T {}

/// Page images of one directory, in lexical file-name order.
#[derive(Clone, Debug)]
pub struct DirectoryPages {
    paths: std::vec::IntoIter<PathBuf>,
}

impl DirectoryPages {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, RunError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(RunError::io(dir))? {
            let path = entry.map_err(RunError::io(dir))?.path();
            let is_page = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| PAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if is_page && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        info!("{} page image(s) in {}", paths.len(), dir.display());
        Ok(Self {
            paths: paths.into_iter(),
        })
    }
}

impl Iterator for DirectoryPages {
    type Item = Result<RgbImage, RunError>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        Some(
            image::open(&path)
                .map(|img| img.to_rgb8())
                .map_err(RunError::image(&path)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.paths.size_hint()
    }
}

/// Answer to a request for one page's corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointRequest {
    /// Page corners on the scan, clockwise from the upper left.
    Points(Quad),
    /// Skip this page; the sample number still advances.
    Skip,
    /// Abort the whole run.
    Quit,
}

/// Provides the four page corners of each scan.
pub trait CorrespondenceSource {
    fn request_points(&mut self, page: &RgbImage, sample: u32) -> Result<PointRequest, RunError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageAction {
    Skip,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointEntry {
    Corners([[f64; 2]; 4]),
    Action(PageAction),
}

/// Corners recorded ahead of time, keyed by sample number.
///
/// ```json
/// { "0": [[12, 30], [5090, 41], [5075, 6570], [8, 6555]], "1": "skip" }
/// ```
///
/// Samples without an entry are skipped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointFile {
    pub entries: BTreeMap<u32, PointEntry>,
}

impl PointFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RunError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(RunError::io(path))?;
        serde_json::from_str(&text).map_err(|source| RunError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl CorrespondenceSource for PointFile {
    fn request_points(&mut self, _page: &RgbImage, sample: u32) -> Result<PointRequest, RunError> {
        Ok(match self.entries.get(&sample) {
            Some(PointEntry::Corners([ul, ur, lr, ll])) => PointRequest::Points(
                Quad::from_clockwise([
                    (ul[0], ul[1]),
                    (ur[0], ur[1]),
                    (lr[0], lr[1]),
                    (ll[0], ll[1]),
                ]),
            ),
            Some(PointEntry::Action(PageAction::Quit)) => PointRequest::Quit,
            Some(PointEntry::Action(PageAction::Skip)) => PointRequest::Skip,
            None => {
                warn!("no corners recorded for sample {sample:03}");
                PointRequest::Skip
            }
        })
    }
}

/// Receives accepted tiles.
pub trait TileSink {
    /// A new page is about to deliver tiles.
    fn begin_sample(&mut self, sample: u32) -> Result<(), RunError>;

    fn accept(&mut self, label: &TileLabel, tile: &GrayImage) -> Result<(), RunError>;
}

/// Counts from one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub pages_processed: usize,
    pub pages_skipped: usize,
    pub accepted: usize,
    pub color_contamination: usize,
    pub empty_glyph: usize,
    pub buffer_impingement: usize,
    /// The run was aborted by a quit request.
    pub cancelled: bool,
    /// Sample number the next page would have received.
    pub next_sample: u32,
}

impl RunSummary {
    fn record(&mut self, reason: RejectionReason) {
        match reason {
            RejectionReason::ColorContamination => self.color_contamination += 1,
            RejectionReason::EmptyGlyph => self.empty_glyph += 1,
            RejectionReason::BufferImpingement => self.buffer_impingement += 1,
        }
    }

    pub fn rejected(&self) -> usize {
        self.color_contamination + self.empty_glyph + self.buffer_impingement
    }
}

fn next_sample(sample: u32) -> Result<u32, RunError> {
    sample
        .checked_add(1)
        .ok_or(RunError::SampleOverflow { last: sample })
}

/// Rectify each page, cut it into tiles and hand the accepted ones to `sink`.
///
/// Pages are numbered from `first_sample`. A degenerate corner set or a grid
/// that does not fit the page skips that page; a quit request stops the run
/// with [`RunSummary::cancelled`] set. Invalid settings, I/O and decoding
/// errors, a tile geometry with empty cells and a sample counter past
/// `u32::MAX` are returned.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(first_sample = first_sample))
)]
pub fn run_extraction<P, C, S>(
    pages: P,
    points: &mut C,
    sink: &mut S,
    params: &ExtractParams,
    first_sample: u32,
) -> Result<RunSummary, RunError>
where
    P: PageSource,
    C: CorrespondenceSource + ?Sized,
    S: TileSink + ?Sized,
{
    params.validate()?;
    let pipeline = TilePipeline::new(params);
    let geometry = params.tile_geometry();
    let mut summary = RunSummary::default();
    let mut sample = first_sample;

    for page in pages {
        let page = page?;

        let corners = match points.request_points(&page, sample)? {
            PointRequest::Points(quad) => quad,
            PointRequest::Skip => {
                info!("Skipping sample {sample:03}");
                summary.pages_skipped += 1;
                sample = next_sample(sample)?;
                continue;
            }
            PointRequest::Quit => {
                info!("Quit requested at sample {sample:03}");
                summary.cancelled = true;
                break;
            }
        };

        let correspondence = Correspondence::new(corners, params.reference_quad);
        let sheet = match Sheet::rectify(&page, &correspondence) {
            Ok(sheet) => sheet,
            Err(e) => {
                warn!("Skipping sample {sample:03}: {e}");
                summary.pages_skipped += 1;
                sample = next_sample(sample)?;
                continue;
            }
        };
        let tiles = match GridExtractor::new(&sheet, geometry, sample) {
            Ok(tiles) => tiles,
            // a page-size problem; an empty cell would fail on every page
            Err(e @ TileError::GridOutOfBounds { .. }) => {
                warn!("Skipping sample {sample:03}: {e}");
                summary.pages_skipped += 1;
                sample = next_sample(sample)?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        sink.begin_sample(sample)?;
        let mut kept = 0usize;
        for tile in tiles {
            match pipeline.process_raw(&tile) {
                TileOutcome::Accepted(glyph) => {
                    sink.accept(&tile.label, &glyph)?;
                    kept += 1;
                }
                TileOutcome::Rejected(reason) => summary.record(reason),
            }
        }
        info!("Sample {sample:03}: kept {kept} tile(s)");
        summary.accepted += kept;
        summary.pages_processed += 1;
        sample = next_sample(sample)?;
    }

    summary.next_sample = sample;
    Ok(summary)
}
