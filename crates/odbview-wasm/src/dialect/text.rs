//! Free-form keyword text.
//!
//! ```text
//! POLYGON
//! 0 0
//! 10 0
//! 10 5
//! END
//! PAD 5 5 0.3
//! PAD 8 5 0.4 0.2
//! VIA 2 2 0.15
//! RECT 10 10 0.5 0.25 45
//! ```
//!
//! `POLYGON`, `SHAPE` and `AREA` open a block of `x y` rows, closed by `END`
//! or a lone `.`. Pad, via and rectangle sizes are multiplied by
//! [`ParseOptions::symbol_scale`], like symbol dimensions.

use tracing::{debug, trace};

use crate::config::ParseOptions;
use crate::error::{Diagnostic, OdbError};
use crate::features::{parse_number, FeatureParse};
use crate::geometry::{rect_polygon, Circle, Point, Polygon};
use crate::layer::Layer;

struct TextState<'a> {
    layer: &'a mut Layer,
    scale: f64,
    block: Option<Vec<Point>>,
    diagnostics: Vec<Diagnostic>,
    line: usize,
}

impl TextState<'_> {
    fn record(&mut self, error: &OdbError) {
        self.diagnostics.push(Diagnostic::from_error(error, Some(self.line)));
    }

    fn close_block(&mut self) {
        let Some(points) = self.block.take() else {
            return;
        };
        let count = points.len();
        match Polygon::closed(points) {
            Some(polygon) => self.layer.polygons.push(polygon),
            None => trace!(line = self.line, count, "block with fewer than three points discarded"),
        }
    }
}

/// Parses free-form keyword text and appends its primitives to `layer`.
pub fn parse_text_features(text: &str, layer: &mut Layer, options: &ParseOptions) -> FeatureParse {
    let before = layer.primitive_count();
    let mut state = TextState {
        layer,
        scale: options.symbol_scale,
        block: None,
        diagnostics: Vec::new(),
        line: 0,
    };

    for (index, raw_line) in text.lines().enumerate() {
        state.line = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let keyword = tokens.first().copied().unwrap_or_default();

        if let Some(points) = state.block.as_mut() {
            if keyword == "END" || line == "." {
                state.close_block();
                continue;
            }
            if !is_block_keyword(keyword) {
                match row_point(&tokens) {
                    Some(point) => points.push(point),
                    None => trace!(line = state.line, "non-coordinate row in block ignored"),
                }
                continue;
            }
            state.close_block();
        }

        let result = match keyword {
            _ if is_block_keyword(keyword) => {
                state.block = Some(Vec::new());
                Ok(())
            }
            "PAD" => parse_pad(&tokens, &mut state),
            "VIA" => parse_via(&tokens, &mut state),
            "RECT" | "R" => parse_rect(&tokens, &mut state),
            _ => {
                trace!(line = state.line, "unrecognized text record ignored");
                Ok(())
            }
        };
        if let Err(err) = result {
            state.record(&err);
        }
    }
    state.close_block();

    let primitives = state.layer.primitive_count().saturating_sub(before);
    debug!(
        layer = %state.layer.name,
        primitives,
        diagnostics = state.diagnostics.len(),
        "parsed free-form text"
    );
    FeatureParse {
        primitives,
        diagnostics: state.diagnostics,
        ..FeatureParse::default()
    }
}

fn is_block_keyword(keyword: &str) -> bool {
    matches!(keyword, "POLYGON" | "SHAPE" | "AREA")
}

fn row_point(tokens: &[&str]) -> Option<Point> {
    match tokens {
        [x, y, ..] => Some(Point::new(parse_number(x).ok()?, parse_number(y).ok()?)),
        _ => None,
    }
}

/// `PAD x y size [height]`: a round pad of radius `size`, or a `size` ×
/// `height` rectangle when a height is given.
fn parse_pad(tokens: &[&str], state: &mut TextState<'_>) -> Result<(), OdbError> {
    let center = point_at(tokens, 1, "PAD")?;
    let size = number_at(tokens, 3, "PAD")? * state.scale;
    match tokens.get(4).map(|token| parse_number(token)).transpose()? {
        Some(height) => push_rect(state, center, size, height * state.scale, 0.0),
        None => {
            state.layer.circles.push(Circle { center, radius: size });
            Ok(())
        }
    }
}

/// `VIA x y radius`.
fn parse_via(tokens: &[&str], state: &mut TextState<'_>) -> Result<(), OdbError> {
    let center = point_at(tokens, 1, "VIA")?;
    let radius = number_at(tokens, 3, "VIA")? * state.scale;
    state.layer.circles.push(Circle { center, radius });
    Ok(())
}

/// `RECT x y width height [rotation]`, centered on `x y`.
fn parse_rect(tokens: &[&str], state: &mut TextState<'_>) -> Result<(), OdbError> {
    let center = point_at(tokens, 1, "RECT")?;
    let width = number_at(tokens, 3, "RECT")? * state.scale;
    let height = number_at(tokens, 4, "RECT")? * state.scale;
    let rotation = tokens
        .get(5)
        .and_then(|token| parse_number(token).ok())
        .unwrap_or(0.0);
    push_rect(state, center, width, height, rotation)
}

fn push_rect(state: &mut TextState<'_>, center: Point, width: f64, height: f64, rotation: f64) -> Result<(), OdbError> {
    let polygon = rect_polygon(center, width, height, rotation)
        .ok_or_else(|| OdbError::MalformedRecord(format!("rectangle {width}x{height} has no area")))?;
    state.layer.polygons.push(polygon);
    Ok(())
}

fn number_at(tokens: &[&str], index: usize, keyword: &str) -> Result<f64, OdbError> {
    let token = tokens.get(index).ok_or_else(|| {
        OdbError::MalformedRecord(format!("`{keyword}` record is missing field {index}"))
    })?;
    parse_number(token)
}

fn point_at(tokens: &[&str], index: usize, keyword: &str) -> Result<Point, OdbError> {
    Ok(Point::new(
        number_at(tokens, index, keyword)?,
        number_at(tokens, index + 1, keyword)?,
    ))
}
