//! Integration tests for projection and SVG rendering.

use odbview_wasm::archive::MemoryArchive;
use odbview_wasm::config::{Canvas, ParseOptions};
use odbview_wasm::parse_archive_internal;
use odbview_wasm::pipeline::parse_archive;
use odbview_wasm::render::{project, svg::to_svg, DrawCommand};
use odbview_wasm::render_board_svg_internal;

fn archive() -> MemoryArchive {
    let mut archive = MemoryArchive::new();
    archive.add_file(
        "odb/steps/pcb/layers/top_copper/features",
        include_str!("fixtures/board/top_copper.features"),
    );
    archive.add_file(
        "odb/steps/pcb/layers/silk_top/features",
        include_str!("fixtures/board/silk_top.features"),
    );
    archive.add_file("odb/steps/pcb/profile", include_str!("fixtures/board/profile"));
    archive
}

/// Every projected point lies inside the padded canvas.
#[test]
fn it_render_001_projection_fits_the_canvas() {
    let board = parse_archive(&archive(), &ParseOptions::default());
    let canvas = Canvas {
        width: 400.0,
        height: 300.0,
        padding: 10.0,
    };
    let projection = project(board.iter_layers(), Some(&board.profile), &canvas);
    // 50 × 50 board in a 380 × 280 area.
    assert!((projection.transform.scale - 5.6).abs() < 1e-9);

    for command in &projection.outline {
        let DrawCommand::DrawPolygon { points, .. } = command else {
            continue;
        };
        for p in points {
            assert!(p.x >= 10.0 - 1e-9 && p.x <= 390.0 + 1e-9);
            assert!(p.y >= 10.0 - 1e-9 && p.y <= 290.0 + 1e-9);
        }
    }
}

/// Copper is drawn before silkscreen regardless of discovery order.
#[test]
fn it_render_002_draw_order_follows_layer_rank() {
    let board = parse_archive(&archive(), &ParseOptions::default());
    assert_eq!(board.layers[0].layer.name, "silk_top");
    let projection = project(board.iter_layers(), Some(&board.profile), &Canvas::default());
    let first_text = projection
        .commands
        .iter()
        .position(|c| matches!(c, DrawCommand::DrawText { .. }));
    let last_copper = projection
        .commands
        .iter()
        .rposition(|c| matches!(c, DrawCommand::DrawLine { color, .. } if color == "#c87137"));
    assert!(first_text > last_copper);
}

/// The stored board renders to a complete SVG document.
#[test]
fn it_render_003_svg_of_stored_board() {
    assert!(parse_archive_internal(&archive(), &ParseOptions::default()).is_ok());
    let svg = render_board_svg_internal(&Canvas::default());
    assert!(svg.is_ok(), "expected Ok, got Err: {:?}", svg.as_ref().err());
    let Some(svg) = svg.ok() else {
        return;
    };
    assert!(svg.starts_with("<svg "));
    assert!(svg.contains("data-type=\"board-outline\""));
    assert!(svg.contains(">U1</text>"));
    assert!(svg.trim_end().ends_with("</svg>"));
}

/// Without a profile no outline is drawn and the layers set the extent.
#[test]
fn it_render_004_projection_without_profile() {
    let projection = project(
        parse_archive(&archive(), &ParseOptions::default()).iter_layers(),
        None,
        &Canvas::default(),
    );
    let svg = to_svg(&projection);
    assert!(!svg.contains("board-outline"));
    assert!(projection.commands.iter().any(|c| matches!(c, DrawCommand::DrawCircle { .. })));
}
