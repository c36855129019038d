use glyphsheet_core::Quad;
use serde::{Deserialize, Serialize};

use crate::{ParamsError, TileGeometry};

/// Which glyph center is moved onto the tile center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Centering {
    /// Center of the largest external contour's bounding box.
    #[default]
    BoundingBox,
    /// First-moment center of mass of the mask.
    Centroid,
}

/// Whether glyphs are rescaled to the fill ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sizing {
    /// Scale so the longer bounding-box side spans `fill_ratio` of the tile.
    #[default]
    Normalize,
    /// Keep the glyph at its scanned size.
    Original,
}

/// Settings for one extraction run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractParams {
    pub centering: Centering,
    pub sizing: Sizing,
    /// Use square (200 × 200) cells instead of 228 × 200.
    pub square: bool,
    /// Radius of the disk used for morphological cleanup.
    pub structuring_radius: u32,
    /// Per-bin absolute tolerance when comparing channel histograms.
    pub histogram_tolerance: f64,
    /// Fraction of the tile extent a normalized glyph should span.
    pub fill_ratio: f64,
    /// Fraction of the unfilled border that must stay empty.
    pub buffer_ratio: f64,
    /// Inverted-luminance level above which a pixel counts as ink.
    pub threshold: u8,
    /// Repetitions of each erode/dilate step.
    pub morph_iterations: u32,
    /// Where the four picked page corners belong in the canonical frame.
    pub reference_quad: Quad,
    /// Explicit grid placement; overrides the `square` preset.
    pub geometry: Option<TileGeometry>,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            centering: Centering::default(),
            sizing: Sizing::default(),
            square: false,
            structuring_radius: 3,
            histogram_tolerance: 0.025,
            fill_ratio: 0.7,
            buffer_ratio: 0.5,
            threshold: 127,
            morph_iterations: 2,
            reference_quad: Quad::from_clockwise([
                (660.0, 425.0),
                (4800.0, 425.0),
                (4800.0, 6300.0),
                (660.0, 6300.0),
            ]),
            geometry: None,
        }
    }
}

impl ExtractParams {
    /// Grid placement in effect for these settings.
    pub fn tile_geometry(&self) -> TileGeometry {
        self.geometry
            .unwrap_or_else(|| TileGeometry::for_mode(self.square))
    }

    /// Reject ratios and tolerances the pipeline cannot honor. NaN fails
    /// every check.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.fill_ratio > 0.0 && self.fill_ratio <= 1.0) {
            return Err(ParamsError::FillRatio(self.fill_ratio));
        }
        if !(0.0..=1.0).contains(&self.buffer_ratio) {
            return Err(ParamsError::BufferRatio(self.buffer_ratio));
        }
        if !(self.histogram_tolerance.is_finite() && self.histogram_tolerance >= 0.0) {
            return Err(ParamsError::HistogramTolerance(self.histogram_tolerance));
        }
        Ok(())
    }
}
