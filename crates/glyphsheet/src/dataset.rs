//! MNIST-style dataset packing.
//!
//! Tiles are gathered from a directory tree, shuffled with a fixed seed and
//! split 70 / 30 into training and test sets. Each set is written as a pair
//! of IDX files (big-endian header, then raw bytes), and each file also gets
//! a gzip-compressed copy.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use glyphsheet_tiles::TileLabel;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// IDX magic for `u8` rank-3 data (images).
pub const IMAGES_MAGIC: u32 = 2051;
/// IDX magic for `u8` rank-1 data (labels).
pub const LABELS_MAGIC: u32 = 2049;
pub const SHUFFLE_SEED: u64 = 42;
pub const TRAINING_FRACTION: f64 = 0.7;

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no .{extension} tiles under {}", root.display())]
    NoTiles { root: PathBuf, extension: String },
    #[error("{} is not a tile name like ritcis_007_C_04", path.display())]
    UnlabeledTile { path: PathBuf },
    #[error("{} is {width}x{height}, expected {expected_width}x{expected_height}", path.display())]
    MixedDimensions {
        path: PathBuf,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> DatasetError + '_ {
    move |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// What [`pack_dataset`] wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetSummary {
    pub train: usize,
    pub test: usize,
    pub rows: u32,
    pub cols: u32,
    /// Every file written, raw and gzip.
    pub files: Vec<PathBuf>,
}

/// Tile files under `root` with the given extension, sorted by path.
pub fn collect_tiles(root: &Path, extension: &str) -> Result<Vec<PathBuf>, DatasetError> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).map_err(io_err(&dir))? {
            let path = entry.map_err(io_err(&dir))?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some(extension) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Label byte (`letter - 'A'`) encoded in a tile's file name.
pub fn label_of(path: &Path) -> Result<u8, DatasetError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(TileLabel::from_file_stem)
        .map(|label| label.letter)
        .ok_or_else(|| DatasetError::UnlabeledTile {
            path: path.to_path_buf(),
        })
}

/// Deterministic 70 / 30 split of `files` (sorted first, then shuffled).
pub fn split_dataset(mut files: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
    files.sort();
    files.shuffle(&mut StdRng::seed_from_u64(SHUFFLE_SEED));
    let n_train = (TRAINING_FRACTION * files.len() as f64) as usize;
    let test = files.split_off(n_train);
    (files, test)
}

/// Pack every tile under `tiles` into IDX files in `out`.
///
/// File names carry the tile height: `train-images-028-ubyte`,
/// `train-labels-028-ubyte`, `test-images-028-ubyte`,
/// `test-labels-028-ubyte`, each with a `.gz` sibling. All tiles must have
/// the same dimensions, so point this at a single resolution directory.
pub fn pack_dataset(
    tiles: &Path,
    out: &Path,
    extension: &str,
) -> Result<DatasetSummary, DatasetError> {
    let files = collect_tiles(tiles, extension)?;
    let Some(first) = files.first() else {
        return Err(DatasetError::NoTiles {
            root: tiles.to_path_buf(),
            extension: extension.to_string(),
        });
    };
    let (cols, rows) = image::image_dimensions(first).map_err(|source| DatasetError::Image {
        path: first.clone(),
        source,
    })?;

    let (train, test) = split_dataset(files);
    info!(
        "Packing {} training and {} test tiles ({rows}x{cols})",
        train.len(),
        test.len()
    );

    fs::create_dir_all(out).map_err(io_err(out))?;
    let mut written = Vec::new();
    for (set, members) in [("train", &train), ("test", &test)] {
        let images = out.join(format!("{set}-images-{rows:03}-ubyte"));
        write_images(&images, members, rows, cols)?;
        let images_gz = gzip_alongside(&images)?;
        written.extend([images, images_gz]);

        let labels = out.join(format!("{set}-labels-{rows:03}-ubyte"));
        write_labels(&labels, members)?;
        let labels_gz = gzip_alongside(&labels)?;
        written.extend([labels, labels_gz]);
    }

    Ok(DatasetSummary {
        train: train.len(),
        test: test.len(),
        rows,
        cols,
        files: written,
    })
}

fn create(path: &Path) -> Result<BufWriter<File>, DatasetError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(io_err(path))
}

fn write_images(
    path: &Path,
    members: &[PathBuf],
    rows: u32,
    cols: u32,
) -> Result<(), DatasetError> {
    let mut w = create(path)?;
    let header = [IMAGES_MAGIC, members.len() as u32, rows, cols];
    for v in header {
        w.write_all(&v.to_be_bytes()).map_err(io_err(path))?;
    }
    for tile in members {
        let img = image::open(tile)
            .map_err(|source| DatasetError::Image {
                path: tile.clone(),
                source,
            })?
            .to_luma8();
        if img.dimensions() != (cols, rows) {
            return Err(DatasetError::MixedDimensions {
                path: tile.clone(),
                width: img.width(),
                height: img.height(),
                expected_width: cols,
                expected_height: rows,
            });
        }
        w.write_all(img.as_raw()).map_err(io_err(path))?;
    }
    w.flush().map_err(io_err(path))?;
    debug!("wrote {}", path.display());
    Ok(())
}

fn write_labels(path: &Path, members: &[PathBuf]) -> Result<(), DatasetError> {
    let labels = members
        .iter()
        .map(|p| label_of(p))
        .collect::<Result<Vec<u8>, _>>()?;
    let mut w = create(path)?;
    for v in [LABELS_MAGIC, labels.len() as u32] {
        w.write_all(&v.to_be_bytes()).map_err(io_err(path))?;
    }
    w.write_all(&labels).map_err(io_err(path))?;
    w.flush().map_err(io_err(path))?;
    debug!("wrote {}", path.display());
    Ok(())
}

/// Write `<path>.gz` next to `path` and return its location.
pub fn gzip_alongside(path: &Path) -> Result<PathBuf, DatasetError> {
    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(".gz");
    let gz_path = PathBuf::from(gz_name);

    let mut input = File::open(path).map_err(io_err(path))?;
    let mut encoder = GzEncoder::new(create(&gz_path)?, Compression::default());
    io::copy(&mut input, &mut encoder).map_err(io_err(&gz_path))?;
    encoder
        .finish()
        .and_then(|mut w| w.flush())
        .map_err(io_err(&gz_path))?;
    Ok(gz_path)
}
