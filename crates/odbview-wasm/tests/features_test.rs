//! Integration tests for single-file feature and profile parsing.

use odbview_wasm::config::ParseOptions;
use odbview_wasm::error::DiagnosticKind;
use odbview_wasm::features::{parse_features, Units};
use odbview_wasm::geometry::{Point, POINT_EPSILON};
use odbview_wasm::layer::Layer;
use odbview_wasm::profile::parse_profile;
use odbview_wasm::{parse_features_internal, parse_profile_internal};

const TOP_COPPER: &str = include_str!("fixtures/board/top_copper.features");

/// Every assembled polygon is closed and has at least three distinct points.
#[test]
fn it_feat_001_polygons_are_closed() {
    let mut layer = Layer::new("top_copper");
    let report = parse_features(TOP_COPPER, &mut layer, &ParseOptions::default());
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(report.symbols, 6);
    assert_eq!(report.header.units, Some(Units::Mm));
    for polygon in &layer.polygons {
        assert!(polygon.points.len() >= 4);
        let first = polygon.points.first().copied().unwrap_or_default();
        let last = polygon.points.last().copied().unwrap_or_default();
        assert!(first.approx_eq(last, POINT_EPSILON));
    }
}

/// Every pad resolves to a shape, defined or not.
#[test]
fn it_feat_002_every_pad_resolves() {
    let text = "$1 r1\nP 0 0 $1 0\nP 1 1 $2 0\nP 2 2 3 0\n";
    let mut layer = Layer::new("top_copper");
    let report = parse_features(text, &mut layer, &ParseOptions::default());
    assert_eq!(layer.circles.len() + layer.polygons.len(), 3);
    assert_eq!(
        report
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::UnresolvedSymbolReference)
            .count(),
        2
    );
}

/// Every primitive lies inside the layer's bounding box.
#[test]
fn it_feat_003_bounds_contain_every_primitive() {
    let mut layer = Layer::new("top_copper");
    parse_features(TOP_COPPER, &mut layer, &ParseOptions::default());
    let bounds = layer.bounds();
    let inside = |p: Point| {
        p.x >= bounds.min_x - 1e-9
            && p.x <= bounds.max_x + 1e-9
            && p.y >= bounds.min_y - 1e-9
            && p.y <= bounds.max_y + 1e-9
    };
    assert!(layer.lines.iter().all(|l| inside(l.start) && inside(l.end)));
    assert!(layer.circles.iter().all(|c| inside(c.center)));
    assert!(layer.polygons.iter().all(|p| p.points.iter().all(|q| inside(*q))));
}

/// Symbol scale shrinks pad dimensions declared in microns.
#[test]
fn it_feat_004_symbol_scale_applies_to_pads() {
    let options = ParseOptions { symbol_scale: 0.001 };
    let result = parse_features_internal("top_copper", b"$0 r500\nP 1 1 $0 0\n", &options);
    assert!(result.is_ok());
    let Some(result) = result.ok() else {
        return;
    };
    assert_eq!(result.layer.circles.len(), 1);
    assert!((result.layer.circles[0].radius - 0.5).abs() < 1e-12);
}

/// Profile files in line, pair and surface form all recover an outline.
#[test]
fn it_feat_005_profile_dialects() {
    let lines = parse_profile(include_str!("fixtures/profile_lines.txt"));
    assert!(lines.recovered);
    assert_eq!(lines.profile.outline[0].points.len(), 4);
    assert!((lines.profile.width - 60.0).abs() < 1e-9);
    assert!((lines.profile.height - 40.0).abs() < 1e-9);

    let pairs = parse_profile(include_str!("fixtures/profile_pairs.txt"));
    assert!(pairs.recovered);
    assert_eq!(pairs.profile.min, Point::new(0.0, 0.0));
    assert_eq!(pairs.profile.max, Point::new(80.5, 60.0));

    let surface = parse_profile_internal(include_bytes!("fixtures/board/profile"));
    assert!(surface.is_ok_and(|parse| parse.recovered && parse.profile.outline.len() == 1));
}

/// Arcs always become exactly sixteen connected segments.
#[test]
fn it_feat_006_arc_is_sixteen_connected_segments() {
    let mut layer = Layer::new("top_copper");
    parse_features("A 0 0 10 0 5 0 0.2\n", &mut layer, &ParseOptions::default());
    assert_eq!(layer.lines.len(), 16);
    for pair in layer.lines.windows(2) {
        assert!(pair[0].end.approx_eq(pair[1].start, 1e-9));
    }
}
