/// Errors raised while cutting a sheet into tiles.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TileError {
    #[error(
        "tile grid needs {needed_cols}x{needed_rows} px but the sheet is {sheet_cols}x{sheet_rows} px"
    )]
    GridOutOfBounds {
        needed_rows: u64,
        needed_cols: u64,
        sheet_rows: u32,
        sheet_cols: u32,
    },
    #[error("tile geometry has an empty cell ({rows}x{cols})")]
    EmptyCell { rows: u32, cols: u32 },
}

/// Out-of-range [`ExtractParams`](crate::ExtractParams) values.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("fill_ratio must be in (0, 1], got {0}")]
    FillRatio(f64),
    #[error("buffer_ratio must be in [0, 1], got {0}")]
    BufferRatio(f64),
    #[error("histogram_tolerance must be finite and non-negative, got {0}")]
    HistogramTolerance(f64),
}
