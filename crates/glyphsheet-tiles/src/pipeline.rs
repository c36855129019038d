use std::fmt;

use image::{GrayImage, RgbImage};
use log::{debug, info};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BoundingBox, BufferZoneGate, Centroid, ExtractParams, GlyphNormalizer, GlyphSegmenter,
    RawTile, StructuringElement, TileQualityGate,
};

/// Why a tile was dropped. These are expected outcomes, not errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// Channel histograms disagree: highlighter or colored ink.
    ColorContamination,
    /// Nothing left after segmentation.
    EmptyGlyph,
    /// The normalized glyph reaches into the margin band.
    BufferImpingement,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RejectionReason::ColorContamination => "color contamination",
            RejectionReason::EmptyGlyph => "empty glyph",
            RejectionReason::BufferImpingement => "buffer impingement",
        })
    }
}

/// Terminal state of one tile.
#[derive(Clone, Debug, PartialEq)]
pub enum TileOutcome {
    /// Normalized binary glyph, same size as the raw tile.
    Accepted(GrayImage),
    Rejected(RejectionReason),
}

impl TileOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TileOutcome::Accepted(_))
    }

    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            TileOutcome::Rejected(reason) => Some(*reason),
            TileOutcome::Accepted(_) => None,
        }
    }
}

/// Quality gate → segmentation → localization → normalization → buffer gate.
///
/// Built once per run; the structuring element inside is reused for every
/// tile. A rejection short-circuits the remaining stages.
#[derive(Debug)]
pub struct TilePipeline {
    pub quality: TileQualityGate,
    pub segmenter: GlyphSegmenter,
    pub normalizer: GlyphNormalizer,
    pub buffer: BufferZoneGate,
}

impl TilePipeline {
    pub fn new(params: &ExtractParams) -> Self {
        Self {
            quality: TileQualityGate::new(params.histogram_tolerance),
            segmenter: GlyphSegmenter::new(
                params.threshold,
                params.morph_iterations,
                StructuringElement::disk(params.structuring_radius),
            ),
            normalizer: GlyphNormalizer::new(params.centering, params.sizing, params.fill_ratio),
            buffer: BufferZoneGate::new(params.fill_ratio, params.buffer_ratio),
        }
    }

    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn process(&self, tile: &RgbImage) -> TileOutcome {
        if !self.quality.is_neutral(tile) {
            return TileOutcome::Rejected(RejectionReason::ColorContamination);
        }

        let mask = self.segmenter.segment(tile);

        let (Some(centroid), Some(bbox)) = (Centroid::of(&mask), BoundingBox::of(&mask)) else {
            return TileOutcome::Rejected(RejectionReason::EmptyGlyph);
        };

        let placement = self
            .normalizer
            .placement(mask.height(), mask.width(), &centroid, &bbox);
        debug!(
            "glyph centroid=({:.1}, {:.1}) bbox={:?} placement={:?}",
            centroid.row, centroid.col, bbox, placement
        );
        let normalized = self.normalizer.apply(&mask, &placement);

        let stray = self.buffer.impinging_pixels(&normalized);
        if stray > 0 {
            debug!("{stray} on-pixels outside the buffer window");
            return TileOutcome::Rejected(RejectionReason::BufferImpingement);
        }
        TileOutcome::Accepted(normalized)
    }

    /// [`process`](Self::process) with the rejection logged under the tile's label.
    pub fn process_raw(&self, tile: &RawTile) -> TileOutcome {
        let outcome = self.process(&tile.image);
        if let TileOutcome::Rejected(reason) = outcome {
            info!("Rejecting {} ({reason})", tile.label);
        }
        outcome
    }
}
