mod common;

use std::collections::BTreeMap;

use common::{scan_corners, small_params, synthetic_scan};
use glyphsheet::dataset::pack_dataset;
use glyphsheet::{
    run_extraction, ClickCollector, DirectoryPages, DirectorySink, EventTranscript, ExtractParams,
    PageAction, ParamsError, PointEntry, PointFile, RunError, TileLabel, TileSink,
};
use image::{GrayImage, RgbImage};

#[derive(Default)]
struct MemorySink {
    begun: Vec<u32>,
    tiles: Vec<(TileLabel, GrayImage)>,
}

impl TileSink for MemorySink {
    fn begin_sample(&mut self, sample: u32) -> Result<(), RunError> {
        self.begun.push(sample);
        Ok(())
    }

    fn accept(&mut self, label: &TileLabel, tile: &GrayImage) -> Result<(), RunError> {
        self.tiles.push((*label, tile.clone()));
        Ok(())
    }
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pages(n: usize, page: &RgbImage) -> impl Iterator<Item = Result<RgbImage, RunError>> + '_ {
    (0..n).map(move |_| Ok(page.clone()))
}

#[test]
fn pages_are_rectified_cut_and_sunk() {
    init_logs();
    let scan = synthetic_scan((5, 0), (3, 4));
    let collinear = [[0.0, 0.0], [10.0, 10.0], [20.0, 20.0], [0.0, 50.0]];
    let mut points = PointFile {
        entries: BTreeMap::from([
            (10, PointEntry::Corners(scan_corners())),
            (11, PointEntry::Corners(collinear)),
            (12, PointEntry::Action(PageAction::Skip)),
        ]),
    };
    let mut sink = MemorySink::default();

    let summary =
        run_extraction(pages(4, &scan), &mut points, &mut sink, &small_params(), 10).unwrap();

    assert_eq!(summary.pages_processed, 1);
    // degenerate corners, explicit skip, and no entry for sample 13
    assert_eq!(summary.pages_skipped, 3);
    assert_eq!(summary.accepted, 518);
    assert_eq!(summary.color_contamination, 1);
    assert_eq!(summary.empty_glyph, 1);
    assert_eq!(summary.buffer_impingement, 0);
    assert!(!summary.cancelled);
    assert_eq!(summary.next_sample, 14);

    assert_eq!(sink.begun, vec![10]);
    assert_eq!(sink.tiles.len(), 518);
    assert!(sink.tiles.iter().all(|(label, _)| label.sample == 10));
    assert!(!sink.tiles.iter().any(|(label, _)| *label == TileLabel::new(10, 5, 0)));
    assert!(!sink.tiles.iter().any(|(label, _)| *label == TileLabel::new(10, 3, 4)));
    assert!(sink.tiles.iter().all(|(_, tile)| tile.dimensions() == (50, 57)));
}

#[test]
fn quit_aborts_the_whole_run() {
    let scan = synthetic_scan((0, 0), (0, 1));
    let mut points = PointFile {
        entries: BTreeMap::from([
            (0, PointEntry::Action(PageAction::Skip)),
            (1, PointEntry::Action(PageAction::Quit)),
            (2, PointEntry::Corners(scan_corners())),
        ]),
    };
    let mut sink = MemorySink::default();
    let summary = run_extraction(pages(3, &scan), &mut points, &mut sink, &small_params(), 0).unwrap();

    assert!(summary.cancelled);
    assert_eq!((summary.pages_processed, summary.pages_skipped), (0, 1));
    assert_eq!(summary.next_sample, 1);
    assert!(sink.begun.is_empty());
}

#[test]
fn recorded_clicks_pick_the_corners() {
    let scan = synthetic_scan((25, 19), (0, 0));
    let mut transcript = String::from("# sample 0: four clicks with some motion\n");
    for [x, y] in scan_corners() {
        let (x, y) = (x as i32, y as i32);
        transcript.push_str(&format!("mouse 0 {} {} 0\n", x - 3, y + 2));
        transcript.push_str(&format!("mouse 1 {x} {y} 1\nmouse 4 {x} {y} 0\n"));
    }
    transcript.push_str("# sample 1: skipped\nkey 27\n");

    let mut clicks = ClickCollector::new(EventTranscript::parse(&transcript).unwrap());
    let mut sink = MemorySink::default();
    let summary = run_extraction(pages(2, &scan), &mut clicks, &mut sink, &small_params(), 0).unwrap();

    assert_eq!(summary.accepted, 518);
    assert_eq!(summary.pages_skipped, 1);
    assert_eq!(summary.next_sample, 2);
    assert!(clicks.into_feed().is_empty());
}

#[test]
fn running_out_of_clicks_is_an_error() {
    let scan = synthetic_scan((0, 0), (0, 1));
    let mut clicks = ClickCollector::new(EventTranscript::parse("mouse 1 5 5 1\n").unwrap());
    let mut sink = MemorySink::default();
    let err = run_extraction(pages(1, &scan), &mut clicks, &mut sink, &small_params(), 3)
        .unwrap_err();
    assert!(matches!(err, RunError::FeedClosed { sample: 3 }));
}

#[test]
fn directory_round_trip_into_a_dataset() {
    init_logs();
    let scans = tempfile::tempdir().unwrap();
    let tiles = tempfile::tempdir().unwrap();
    let dataset = tempfile::tempdir().unwrap();

    synthetic_scan((5, 0), (3, 4))
        .save(scans.path().join("page_000.png"))
        .unwrap();
    std::fs::write(scans.path().join("README.txt"), "not a page").unwrap();

    let pages = DirectoryPages::open(scans.path()).unwrap();
    assert_eq!(pages.size_hint(), (1, Some(1)));

    let params = small_params();
    let mut points = PointFile {
        entries: BTreeMap::from([(0, PointEntry::Corners(scan_corners()))]),
    };
    let mut sink = DirectorySink::for_mode(tiles.path(), params.square);
    let summary = run_extraction(pages, &mut points, &mut sink, &params, 0).unwrap();
    assert_eq!(summary.accepted, 518);

    let kept = sink.tile_path(None, &TileLabel::new(0, 0, 0));
    assert!(kept.is_file());
    assert!(!sink.tile_path(None, &TileLabel::new(0, 5, 0)).exists());

    let packed = pack_dataset(&tiles.path().join("full"), dataset.path(), "png").unwrap();
    assert_eq!((packed.train, packed.test), (362, 156));
    assert_eq!((packed.rows, packed.cols), (57, 50));
    assert!(dataset.path().join("train-images-057-ubyte.gz").is_file());
}

#[test]
fn undersized_page_is_skipped_but_empty_cells_abort() {
    let tiny = RgbImage::from_pixel(100, 80, common::WHITE);
    let corners = [[5.0, 5.0], [95.0, 5.0], [95.0, 75.0], [5.0, 75.0]];
    let mut points = PointFile {
        entries: BTreeMap::from([(0, PointEntry::Corners(corners))]),
    };
    let mut sink = MemorySink::default();
    let summary =
        run_extraction(pages(1, &tiny), &mut points, &mut sink, &small_params(), 0).unwrap();
    assert_eq!((summary.pages_processed, summary.pages_skipped), (0, 1));

    let mut params = small_params();
    if let Some(g) = params.geometry.as_mut() {
        g.cell_rows = 0;
    }
    let err = run_extraction(pages(1, &tiny), &mut points, &mut sink, &params, 0).unwrap_err();
    assert!(matches!(err, RunError::Tile(_)));
}

#[test]
fn invalid_settings_are_refused_before_any_page() {
    let scan = synthetic_scan((0, 0), (0, 1));
    let mut points = PointFile {
        entries: BTreeMap::from([(0, PointEntry::Corners(scan_corners()))]),
    };
    let params = ExtractParams {
        fill_ratio: 0.0,
        ..small_params()
    };
    let mut sink = MemorySink::default();
    let err = run_extraction(pages(1, &scan), &mut points, &mut sink, &params, 0).unwrap_err();
    assert!(matches!(err, RunError::Params(ParamsError::FillRatio(_))));
    assert!(sink.begun.is_empty());
}

#[test]
fn sample_counter_does_not_wrap() {
    let page = RgbImage::new(4, 4);
    let mut points = PointFile::default();
    let mut sink = MemorySink::default();
    let err = run_extraction(pages(1, &page), &mut points, &mut sink, &small_params(), u32::MAX)
        .unwrap_err();
    assert!(matches!(err, RunError::SampleOverflow { last: u32::MAX }));
}
