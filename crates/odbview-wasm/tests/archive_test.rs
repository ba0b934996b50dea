//! Integration tests for whole-archive parsing (IT-001 through IT-006).

use odbview_wasm::archive::MemoryArchive;
use odbview_wasm::config::ParseOptions;
use odbview_wasm::error::DiagnosticKind;
use odbview_wasm::layer::{LayerType, Side};
use odbview_wasm::pipeline::parse_archive;
use odbview_wasm::{get_layer_internal, parse_archive_internal};

const TOP_COPPER: &str = include_str!("fixtures/board/top_copper.features");
const SILK_TOP: &str = include_str!("fixtures/board/silk_top.features");
const DRILL: &str = include_str!("fixtures/board/drill.features");
const BROKEN: &str = include_str!("fixtures/board/broken.features");
const PROFILE: &str = include_str!("fixtures/board/profile");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_test_writer()
        .try_init();
}

fn board_archive(root: &str) -> MemoryArchive {
    let mut archive = MemoryArchive::new();
    archive.add_directory(&format!("{root}steps/pcb/layers/"));
    archive.add_file(&format!("{root}steps/pcb/layers/top_copper/features"), TOP_COPPER);
    archive.add_file(&format!("{root}steps/pcb/layers/top_copper/attrlist"), "");
    archive.add_file(&format!("{root}steps/pcb/layers/silk_top/features"), SILK_TOP);
    archive.add_file(&format!("{root}steps/pcb/layers/drill/features"), DRILL);
    archive.add_file(&format!("{root}steps/pcb/layers/broken/features"), BROKEN);
    archive.add_file(&format!("{root}steps/pcb/profile"), PROFILE);
    archive.add_file(&format!("{root}matrix/matrix"), "STEP {\nNAME=PCB\n}\n");
    archive
}

/// IT-001: Full board → every layer classified and filled.
#[test]
fn it_001_full_board_layers_are_classified() {
    init_tracing();
    let board = parse_archive(&board_archive("odb/"), &ParseOptions::default());
    let names: Vec<&str> = board.layers.iter().map(|p| p.layer.name.as_str()).collect();
    assert_eq!(names, vec!["broken", "drill", "silk_top", "top_copper"]);

    let top = board.layer("top_copper");
    assert!(top.is_some(), "top_copper should be parsed");
    let Some(top) = top else {
        return;
    };
    assert_eq!((top.kind, top.side), (LayerType::Copper, Side::Top));
    assert_eq!(top.circles.len(), 4);
    assert_eq!(top.polygons.len(), 5);
    assert_eq!(top.lines.len(), 19);

    let silk = board.layer("silk_top");
    assert_eq!(silk.map(|l| (l.kind, l.texts.len())), Some((LayerType::Silkscreen, 2)));
    let drill = board.layer("drill");
    assert_eq!(drill.map(|l| (l.kind, l.circles.len())), Some((LayerType::Drill, 3)));
}

/// IT-002: Only keyword-matched files are parsed for a layer.
#[test]
fn it_002_keyword_files_are_the_sources() {
    let board = parse_archive(&board_archive("odb/"), &ParseOptions::default());
    let top = board.layers.iter().find(|p| p.layer.name == "top_copper");
    assert_eq!(
        top.map(|p| p.sources.clone()),
        Some(vec!["odb/steps/pcb/layers/top_copper/features".to_string()])
    );
    assert!(top.is_some_and(|p| p.diagnostics.is_empty()));
}

/// IT-003: Surface profile with a contour arc → 50 × 50 outline.
#[test]
fn it_003_surface_profile_with_arc() {
    let board = parse_archive(&board_archive(""), &ParseOptions::default());
    assert_eq!(board.profile_source.as_deref(), Some("steps/pcb/profile"));
    assert_eq!(board.profile.outline.len(), 1);
    assert_eq!(board.profile.outline[0].points.len(), 21);
    assert!(board.profile.outline[0].is_closed());
    assert!((board.profile.width - 50.0).abs() < 1e-9);
    assert!((board.profile.height - 50.0).abs() < 1e-9);
    assert!(board.diagnostics.is_empty(), "{:?}", board.diagnostics);
}

/// IT-004: A malformed layer keeps its good records and reports the rest.
#[test]
fn it_004_broken_layer_is_isolated() {
    let board = parse_archive(&board_archive("odb/"), &ParseOptions::default());
    let broken = board.layers.iter().find(|p| p.layer.name == "broken");
    assert!(broken.is_some());
    let Some(broken) = broken else {
        return;
    };
    let lines: Vec<Option<usize>> = broken.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![Some(2), Some(4), Some(5), Some(6), Some(7), Some(8)]);
    let unresolved = broken
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::UnresolvedSymbolReference)
        .count();
    assert_eq!(unresolved, 2);
    assert_eq!(broken.layer.circles.len(), 3);
    assert_eq!(broken.layer.lines.len(), 1);
}

/// IT-005: Parsing the same archive twice yields identical results.
#[test]
fn it_005_parse_is_idempotent() {
    let archive = board_archive("odb/");
    let first = parse_archive(&archive, &ParseOptions::default());
    let second = parse_archive(&archive, &ParseOptions::default());
    assert_eq!(first, second);
}

/// IT-006: The wasm entry point summarizes and stores the board.
#[test]
fn it_006_internal_entry_point_stores_board() {
    let result = parse_archive_internal(&board_archive("odb/"), &ParseOptions::default());
    assert!(result.is_ok(), "expected Ok, got Err: {:?}", result.as_ref().err());
    let Some(meta) = result.ok() else {
        return;
    };
    assert_eq!(meta.layers.len(), 4);
    let broken = meta.layers.iter().find(|l| l.name == "broken");
    assert_eq!(broken.map(|l| l.diagnostic_count), Some(6));
    assert!(get_layer_internal("silk_top").is_some_and(|l| l.texts[1].content == "R5"));
}

/// IT-007: Archives without a steps tree fall back to any layers directory.
#[test]
fn it_007_layers_directory_without_steps() {
    let mut archive = MemoryArchive::new();
    archive.add_file("export/layers/top_copper/features.txt", TOP_COPPER);
    archive.add_file("export/outline.txt", include_str!("fixtures/profile_pairs.txt"));
    let board = parse_archive(&archive, &ParseOptions::default());
    assert_eq!(board.layers.len(), 1);
    assert_eq!(board.profile_source.as_deref(), Some("export/outline.txt"));
    assert!((board.profile.width - 80.5).abs() < 1e-9);
}
