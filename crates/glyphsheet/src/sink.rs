use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glyphsheet_tiles::TileLabel;
use image::imageops::{self, FilterType};
use image::GrayImage;
use log::{debug, info};

use crate::{RunError, TileSink};

/// Square sizes written next to the full-resolution tile in square mode.
pub const STANDARD_RESOLUTIONS: [u32; 4] = [28, 56, 112, 224];

const FULL_DIR: &str = "full";
const TILE_EXTENSION: &str = "png";

/// Writes tiles as `<base>/full/<SSS>/<label>.png`, plus
/// `<base>/<NNN>/<SSS>/<label>.png` for each extra resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectorySink {
    pub base: PathBuf,
    pub resolutions: Vec<u32>,
}

impl DirectorySink {
    pub fn new(base: impl Into<PathBuf>, resolutions: Vec<u32>) -> Self {
        Self {
            base: base.into(),
            resolutions,
        }
    }

    /// Square tiles get the standard resolution ladder; tall ones are kept at
    /// full size only.
    pub fn for_mode(base: impl Into<PathBuf>, square: bool) -> Self {
        let resolutions = if square {
            STANDARD_RESOLUTIONS.to_vec()
        } else {
            Vec::new()
        };
        Self::new(base, resolutions)
    }

    /// Directory for one sample at `resolution` (`None` = full size).
    pub fn sample_dir(&self, resolution: Option<u32>, sample: u32) -> PathBuf {
        let level = match resolution {
            Some(size) => format!("{size:03}"),
            None => FULL_DIR.to_string(),
        };
        self.base.join(level).join(format!("{sample:03}"))
    }

    pub fn tile_path(&self, resolution: Option<u32>, label: &TileLabel) -> PathBuf {
        self.sample_dir(resolution, label.sample)
            .join(format!("{label}.{TILE_EXTENSION}"))
    }

    fn levels(&self) -> impl Iterator<Item = Option<u32>> + '_ {
        std::iter::once(None).chain(self.resolutions.iter().copied().map(Some))
    }

    /// Remove every resolution of one tile. Returns how many files were deleted.
    pub fn discard(&self, label: &TileLabel) -> Result<usize, RunError> {
        let mut removed = 0;
        for level in self.levels() {
            let path = self.tile_path(level, label);
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("removed {}", path.display());
                    removed += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(RunError::io(&path)(e)),
            }
        }
        info!("Removed {removed} file(s) for {label}");
        Ok(removed)
    }
}

fn recreate_dir(dir: &Path) -> Result<(), RunError> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(RunError::io(dir))?;
    }
    fs::create_dir_all(dir).map_err(RunError::io(dir))
}

impl TileSink for DirectorySink {
    fn begin_sample(&mut self, sample: u32) -> Result<(), RunError> {
        for level in self.levels() {
            recreate_dir(&self.sample_dir(level, sample))?;
        }
        Ok(())
    }

    fn accept(&mut self, label: &TileLabel, tile: &GrayImage) -> Result<(), RunError> {
        for level in self.levels() {
            let path = self.tile_path(level, label);
            let saved = match level {
                None => tile.save(&path),
                Some(size) => imageops::resize(tile, size, size, FilterType::Triangle).save(&path),
            };
            saved.map_err(RunError::image(&path))?;
        }
        Ok(())
    }
}
