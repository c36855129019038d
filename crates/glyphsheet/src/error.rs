use std::io;
use std::path::{Path, PathBuf};

use glyphsheet_tiles::{ParamsError, TileError};

/// Errors that stop an extraction run or a point-capture session.
///
/// Per-tile rejections are not errors; see
/// [`RejectionReason`](glyphsheet_tiles::RejectionReason).
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("image error on {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Tile(#[from] TileError),
    #[error("invalid settings: {0}")]
    Params(#[from] ParamsError),
    #[error("sample number overflowed after {last}")]
    SampleOverflow { last: u32 },
    #[error("unrecognized pointer event code {0}")]
    UnknownPointerEvent(i32),
    #[error("event transcript line {line}: {message}")]
    Transcript { line: usize, message: String },
    #[error("input ended before four points were picked for sample {sample:03}")]
    FeedClosed { sample: u32 },
}

impl RunError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> RunError + '_ {
        move |source| RunError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn image(path: &Path) -> impl FnOnce(image::ImageError) -> RunError + '_ {
        move |source| RunError::Image {
            path: path.to_path_buf(),
            source,
        }
    }
}
