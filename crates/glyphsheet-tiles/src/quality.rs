//! Color-neutrality check on raw tiles.
//!
//! Samples are written in black ink, so all three channel histograms of a
//! clean tile agree. Highlighter or colored annotations pull one channel
//! away from the others.

use image::RgbImage;

/// Per-channel 256-bin intensity histograms.
///
/// Normalized by (sum of all three histograms) / 3, so each bin holds the
/// fraction of the tile's pixels at that level and identical channels give
/// identical histograms.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorHistogram {
    pub bins: [[f64; 256]; 3],
}

impl ColorHistogram {
    pub fn of(tile: &RgbImage) -> Self {
        let mut counts = [[0u64; 256]; 3];
        for px in tile.pixels() {
            for (channel, &v) in px.0.iter().enumerate() {
                counts[channel][v as usize] += 1;
            }
        }

        let total: u64 = counts.iter().flatten().sum();
        let norm = total as f64 / 3.0;

        let mut bins = [[0.0f64; 256]; 3];
        if norm > 0.0 {
            for (dst, src) in bins.iter_mut().zip(&counts) {
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d = s as f64 / norm;
                }
            }
        }
        Self { bins }
    }

    /// Largest absolute bin difference between channels `a` and `b`.
    pub fn divergence(&self, a: usize, b: usize) -> f64 {
        self.bins[a]
            .iter()
            .zip(&self.bins[b])
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    /// Largest divergence over the three channel pairs.
    pub fn max_divergence(&self) -> f64 {
        [(0, 1), (1, 2), (2, 0)]
            .iter()
            .map(|&(a, b)| self.divergence(a, b))
            .fold(0.0, f64::max)
    }
}

/// Accepts tiles whose channel histograms agree within `tolerance`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileQualityGate {
    pub tolerance: f64,
}

impl Default for TileQualityGate {
    fn default() -> Self {
        Self { tolerance: 0.025 }
    }
}

impl TileQualityGate {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn is_neutral(&self, tile: &RgbImage) -> bool {
        self.is_neutral_histogram(&ColorHistogram::of(tile))
    }

    pub fn is_neutral_histogram(&self, hist: &ColorHistogram) -> bool {
        [(0, 1), (1, 2), (2, 0)]
            .iter()
            .all(|&(a, b)| hist.divergence(a, b) <= self.tolerance)
    }
}
