//! glyphsheet CLI: extract glyph tiles from scanned sheets and pack datasets.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use glyphsheet::dataset::pack_dataset;
use glyphsheet::{
    run_extraction, Centering, ClickCollector, DirectoryPages, DirectorySink, EventTranscript,
    ExtractParams, PointFile, RunError, RunSummary, Sizing, TileLabel,
};
use log::info;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "glyphsheet")]
#[command(about = "Extract labeled handwriting glyph tiles from scanned specimen sheets")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON log lines (requires the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rectify scanned pages and write accepted tiles.
    Extract(ExtractArgs),

    /// Pack a tile directory into MNIST-style IDX files.
    Pack(PackArgs),

    /// Delete every resolution of one tile.
    Discard(DiscardArgs),

    /// Print the effective extraction settings as JSON.
    PrintConfig(SettingsArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CenteringArg {
    BoundingBox,
    Centroid,
}

#[derive(Debug, Args)]
struct SettingsArgs {
    /// JSON settings file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extract square 200x200 tiles and the 28/56/112/224 px copies.
    #[arg(long)]
    square: bool,

    /// Glyph center used for alignment.
    #[arg(long, value_enum)]
    centering: Option<CenteringArg>,

    /// Keep glyphs at their scanned size.
    #[arg(long)]
    original_size: bool,

    /// Radius of the disk used for morphological cleanup.
    #[arg(short, long)]
    radius: Option<u32>,

    /// Per-bin tolerance when comparing color channel histograms.
    #[arg(short, long)]
    tolerance: Option<f64>,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Directory of page images, processed in file-name order.
    #[arg(long)]
    pages: PathBuf,

    /// Base directory for tiles (`full/`, `028/`, ... are created inside).
    #[arg(long)]
    out: PathBuf,

    /// JSON file with the four page corners per sample.
    #[arg(long, conflicts_with = "clicks", required_unless_present = "clicks")]
    points: Option<PathBuf>,

    /// Recorded pointer/key events to pick corners from.
    #[arg(long)]
    clicks: Option<PathBuf>,

    /// Sample number of the first page.
    #[arg(long, default_value_t = 0)]
    start: u32,

    /// Write the run summary as JSON to this path.
    #[arg(long)]
    summary: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Debug, Args)]
struct PackArgs {
    /// Directory tree of tiles of one resolution.
    #[arg(long)]
    tiles: PathBuf,

    /// Output directory for the IDX files.
    #[arg(long)]
    out: PathBuf,

    /// Tile file extension.
    #[arg(long, default_value = "png")]
    extension: String,
}

#[derive(Debug, Args)]
struct DiscardArgs {
    /// Base tile directory (the one containing `full/`).
    #[arg(long)]
    tiles: PathBuf,

    /// Tile name, e.g. ritcis_007_C_04.
    tile: String,

    /// Also remove the 28/56/112/224 px copies.
    #[arg(long)]
    square: bool,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json)?;

    match cli.command {
        Commands::Extract(args) => run_extract(&args),
        Commands::Pack(args) => run_pack(&args),
        Commands::Discard(args) => run_discard(&args),
        Commands::PrintConfig(args) => run_print_config(&args),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8, json: bool) -> CliResult<()> {
    // Route `log` records into the subscriber; ignore a second install.
    let _ = tracing_log::LogTracer::init();
    glyphsheet::core::init_tracing(json);
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8, json: bool) -> CliResult<()> {
    if json {
        eprintln!("--log-json needs the `tracing` feature; using plain logs");
    }
    glyphsheet::core::init_with_level(glyphsheet::core::level_from_verbosity(verbose))?;
    Ok(())
}

// ── extract ────────────────────────────────────────────────────────────

fn load_params(args: &SettingsArgs) -> CliResult<ExtractParams> {
    let mut params = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| -> CliError { format!("{}: {e}", path.display()).into() })?;
            serde_json::from_str(&text)
                .map_err(|e| -> CliError { format!("{}: {e}", path.display()).into() })?
        }
        None => ExtractParams::default(),
    };
    if args.square {
        params.square = true;
    }
    if let Some(centering) = args.centering {
        params.centering = match centering {
            CenteringArg::BoundingBox => Centering::BoundingBox,
            CenteringArg::Centroid => Centering::Centroid,
        };
    }
    if args.original_size {
        params.sizing = Sizing::Original;
    }
    if let Some(radius) = args.radius {
        params.structuring_radius = radius;
    }
    if let Some(tolerance) = args.tolerance {
        params.histogram_tolerance = tolerance;
    }
    params.validate()?;
    Ok(params)
}

fn run_extract(args: &ExtractArgs) -> CliResult<()> {
    let params = load_params(&args.settings)?;
    let pages = DirectoryPages::open(&args.pages)?;
    let mut sink = DirectorySink::for_mode(&args.out, params.square);

    let summary = match (&args.points, &args.clicks) {
        (Some(path), _) => {
            let mut points = PointFile::load(path)?;
            run_extraction(pages, &mut points, &mut sink, &params, args.start)?
        }
        (None, Some(path)) => {
            let text = fs::read_to_string(path).map_err(|source| RunError::Io {
                path: path.clone(),
                source,
            })?;
            let mut clicks = ClickCollector::new(EventTranscript::parse(&text)?);
            run_extraction(pages, &mut clicks, &mut sink, &params, args.start)?
        }
        (None, None) => return Err("either --points or --clicks is required".into()),
    };

    report(&summary);
    if let Some(path) = &args.summary {
        fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        info!("Summary written to {}", path.display());
    }
    Ok(())
}

fn report(summary: &RunSummary) {
    info!(
        "Pages: {} processed, {} skipped{}",
        summary.pages_processed,
        summary.pages_skipped,
        if summary.cancelled { " (cancelled)" } else { "" }
    );
    info!(
        "Tiles: {} kept, {} rejected ({} color, {} empty, {} buffer)",
        summary.accepted,
        summary.rejected(),
        summary.color_contamination,
        summary.empty_glyph,
        summary.buffer_impingement
    );
    info!("Next sample number: {:03}", summary.next_sample);
}

// ── pack ───────────────────────────────────────────────────────────────

fn run_pack(args: &PackArgs) -> CliResult<()> {
    let summary = pack_dataset(&args.tiles, &args.out, &args.extension)?;
    println!(
        "{} training / {} test images ({}x{})",
        summary.train, summary.test, summary.rows, summary.cols
    );
    for file in &summary.files {
        println!("  {}", file.display());
    }
    Ok(())
}

// ── discard ────────────────────────────────────────────────────────────

fn run_discard(args: &DiscardArgs) -> CliResult<()> {
    let stem = Path::new(&args.tile)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&args.tile);
    let label = TileLabel::from_file_stem(stem)
        .ok_or_else(|| -> CliError { format!("not a tile name: {}", args.tile).into() })?;

    let sink = DirectorySink::for_mode(&args.tiles, args.square);
    let removed = sink.discard(&label)?;
    println!("removed {removed} file(s) for {label}");
    Ok(())
}

// ── print-config ───────────────────────────────────────────────────────

fn run_print_config(args: &SettingsArgs) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&load_params(args)?)?);
    Ok(())
}
