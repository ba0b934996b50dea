//! JSON layer files.
//!
//! ```json
//! {
//!   "lines": [{ "x1": 0, "y1": 0, "x2": 5, "y2": 0, "width": 0.2 }],
//!   "circles": [{ "cx": 1, "cy": 1, "r": 0.5 }],
//!   "polygons": [{ "points": [{ "x": 0, "y": 0 }, { "x": 1, "y": 0 }, { "x": 1, "y": 1 }] }],
//!   "texts": [{ "x": 0, "y": 0, "content": "U1", "size": 1.2 }]
//! }
//! ```
//!
//! Every array is optional. An element that does not fit its shape is
//! reported and skipped while the rest of the file still loads.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Diagnostic, OdbError};
use crate::features::FeatureParse;
use crate::geometry::{Circle, Line, Point, Polygon, TextLabel};
use crate::layer::Layer;

/// Stroke width of a JSON line without `width`.
pub const DEFAULT_JSON_LINE_WIDTH: f64 = 1.0;
/// Size of a JSON text without `size`.
pub const DEFAULT_JSON_TEXT_SIZE: f64 = 10.0;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LayerDocument {
    lines: Vec<Value>,
    circles: Vec<Value>,
    polygons: Vec<Value>,
    texts: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct JsonLine {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    width: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct JsonCircle {
    cx: f64,
    cy: f64,
    r: f64,
}

#[derive(Debug, Deserialize)]
struct JsonPoint {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct JsonPolygon {
    points: Vec<JsonPoint>,
}

#[derive(Debug, Deserialize)]
struct JsonText {
    x: f64,
    y: f64,
    #[serde(default)]
    content: String,
    size: Option<f64>,
}

/// Parses a JSON layer document and appends its primitives to `layer`.
pub fn parse_json_features(text: &str, layer: &mut Layer) -> FeatureParse {
    let before = layer.primitive_count();
    let mut diagnostics = Vec::new();

    let document: LayerDocument = match serde_json::from_str(text) {
        Ok(document) => document,
        Err(err) => {
            diagnostics.push(Diagnostic::from_error(
                &OdbError::MalformedRecord(format!("invalid JSON layer: {err}")),
                Some(err.line()),
            ));
            return FeatureParse {
                diagnostics,
                ..FeatureParse::default()
            };
        }
    };

    for line in elements::<JsonLine>("lines", document.lines, &mut diagnostics) {
        layer.lines.push(Line {
            start: Point::new(line.x1, line.y1),
            end: Point::new(line.x2, line.y2),
            width: line.width.unwrap_or(DEFAULT_JSON_LINE_WIDTH),
        });
    }

    for circle in elements::<JsonCircle>("circles", document.circles, &mut diagnostics) {
        layer.circles.push(Circle {
            center: Point::new(circle.cx, circle.cy),
            radius: circle.r,
        });
    }

    let polygons = elements::<JsonPolygon>("polygons", document.polygons, &mut diagnostics);
    for (index, polygon) in polygons.into_iter().enumerate() {
        let points = polygon.points.into_iter().map(|p| Point::new(p.x, p.y)).collect();
        match Polygon::closed(points) {
            Some(polygon) => layer.polygons.push(polygon),
            None => diagnostics.push(Diagnostic::from_error(
                &OdbError::MalformedRecord(format!("`polygons[{index}]` has fewer than three points")),
                None,
            )),
        }
    }

    for text in elements::<JsonText>("texts", document.texts, &mut diagnostics) {
        layer.texts.push(TextLabel {
            position: Point::new(text.x, text.y),
            content: text.content,
            size: text.size.unwrap_or(DEFAULT_JSON_TEXT_SIZE),
        });
    }

    let primitives = layer.primitive_count().saturating_sub(before);
    debug!(layer = %layer.name, primitives, diagnostics = diagnostics.len(), "parsed JSON layer");
    FeatureParse {
        primitives,
        diagnostics,
        ..FeatureParse::default()
    }
}

/// Deserializes each element of `values`, reporting and dropping misfits.
fn elements<T: DeserializeOwned>(key: &str, values: Vec<Value>, diagnostics: &mut Vec<Diagnostic>) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(element) => Some(element),
            Err(err) => {
                diagnostics.push(Diagnostic::from_error(
                    &OdbError::MalformedRecord(format!("`{key}[{index}]`: {err}")),
                    None,
                ));
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::DiagnosticKind;

    fn parse(text: &str) -> (Layer, FeatureParse) {
        let mut layer = Layer::new("top_copper");
        let report = parse_json_features(text, &mut layer);
        (layer, report)
    }

    #[test]
    fn ut_json_001_every_array_becomes_primitives() {
        let (layer, report) = parse(
            r#"{
                "lines": [{"x1": 0, "y1": 0, "x2": 5, "y2": 0, "width": 0.2}, {"x1": 1, "y1": 1, "x2": 2, "y2": 2}],
                "circles": [{"cx": 1, "cy": 2, "r": 0.5}],
                "polygons": [{"points": [{"x": 0, "y": 0}, {"x": 4, "y": 0}, {"x": 4, "y": 3}]}],
                "texts": [{"x": 1, "y": 1, "content": "U1"}]
            }"#,
        );
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        assert_eq!(report.primitives, 5);
        assert!((layer.lines[0].width - 0.2).abs() < f64::EPSILON);
        assert!((layer.lines[1].width - DEFAULT_JSON_LINE_WIDTH).abs() < f64::EPSILON);
        assert_eq!(layer.circles[0].center, Point::new(1.0, 2.0));
        assert_eq!(layer.polygons[0].points.len(), 4);
        assert_eq!(layer.texts[0].content, "U1");
        assert!((layer.texts[0].size - DEFAULT_JSON_TEXT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn ut_json_002_missing_arrays_and_unknown_keys_are_fine() {
        let (layer, report) = parse(r#"{"circles": [{"cx": 0, "cy": 0, "r": 1}], "name": "top"}"#);
        assert_eq!(layer.circles.len(), 1);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn bc_json_001_bad_elements_are_skipped_and_reported() {
        let (layer, report) = parse(
            r#"{"circles": [{"cx": 0, "cy": 0}, {"cx": 1, "cy": 1, "r": 2}],
                "polygons": [{"points": [{"x": 0, "y": 0}, {"x": 1, "y": 0}]}]}"#,
        );
        assert_eq!(layer.circles.len(), 1);
        assert!(layer.polygons.is_empty());
        assert_eq!(report.diagnostics.len(), 2);
        assert!(report.diagnostics[0].message.contains("circles[0]"));
        assert!(report.diagnostics[1].message.contains("polygons[0]"));
    }

    #[test]
    fn bc_json_002_invalid_document_is_one_diagnostic_with_line() {
        let (layer, report) = parse("{\n  \"lines\": [\n    oops\n  ]\n}");
        assert!(layer.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::MalformedRecord);
        assert_eq!(report.diagnostics[0].line, Some(3));
    }
}
