//! Feature stream parser.
//!
//! Walks a feature file line by line and appends the resulting primitives to
//! a [`Layer`]. Every recoverable problem becomes a [`Diagnostic`] and the
//! line is skipped; nothing here aborts the file.

use tracing::{debug, trace};

use crate::config::ParseOptions;
use crate::error::{Diagnostic, OdbError};
use crate::geometry::{flash_pad, tessellate_three_point, Circle, Line, PadShape, Point, TextLabel};
use crate::layer::Layer;

use super::polygon::{PolygonAssembler, StructureEvent};
use super::symbols::{parse_symbol_line, parse_symbols, SymbolTable};
use super::{parse_header, parse_number, FileHeader};

/// Stroke width used when a line or arc record gives none.
pub const DEFAULT_LINE_WIDTH: f64 = 0.1;

const DEFAULT_TEXT_SIZE: f64 = 1.0;

/// Outcome of parsing one feature file into a layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureParse {
    /// Header metadata found at the top of the file.
    pub header: FileHeader,
    /// Number of symbols defined by the file.
    pub symbols: usize,
    /// Number of primitives appended to the layer.
    pub primitives: usize,
    /// Problems found along the way, in line order.
    pub diagnostics: Vec<Diagnostic>,
}

struct ParserState<'a> {
    layer: &'a mut Layer,
    symbols: SymbolTable,
    assembler: PolygonAssembler,
    diagnostics: Vec<Diagnostic>,
    line: usize,
}

impl ParserState<'_> {
    fn record(&mut self, error: &OdbError) {
        self.diagnostics.push(Diagnostic::from_error(error, Some(self.line)));
    }
}

/// Parses `text` and appends its primitives to `layer` in file order.
///
/// Symbols are collected in a first pass, so a pad may reference a symbol
/// defined further down the file.
pub fn parse_features(text: &str, layer: &mut Layer, options: &ParseOptions) -> FeatureParse {
    let before = layer.primitive_count();
    let symbols = parse_symbols(text, options);
    let symbol_count = symbols.len();

    let mut state = ParserState {
        layer,
        symbols,
        assembler: PolygonAssembler::new(),
        diagnostics: Vec::new(),
        line: 0,
    };

    for (index, raw_line) in text.lines().enumerate() {
        state.line = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(['#', '@', '&']) {
            continue;
        }

        if line.starts_with('$') {
            if let Err(err) = parse_symbol_line(line, options) {
                state.record(&err);
            }
            continue;
        }

        if let Err(err) = parse_record(strip_attributes(line), &mut state) {
            state.record(&err);
        }
    }

    if let Some(polygon) = state.assembler.finish() {
        state.layer.polygons.push(polygon);
    }

    let primitives = state.layer.primitive_count().saturating_sub(before);
    debug!(
        layer = %state.layer.name,
        symbols = symbol_count,
        primitives,
        diagnostics = state.diagnostics.len(),
        "parsed feature file"
    );

    FeatureParse {
        header: parse_header(text),
        symbols: symbol_count,
        primitives,
        diagnostics: state.diagnostics,
    }
}

fn parse_record(line: &str, state: &mut ParserState<'_>) -> Result<(), OdbError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match state.assembler.feed(&tokens)? {
        StructureEvent::Closed(polygon) => {
            state.layer.polygons.push(polygon);
            return Ok(());
        }
        StructureEvent::Consumed => return Ok(()),
        StructureEvent::NotHandled => {}
    }

    match tokens.first().copied() {
        Some("P") if state.assembler.in_structure() => {
            trace!("pad inside a surface ignored");
            Ok(())
        }
        Some("P") => parse_pad(&tokens, state),
        Some("L") => parse_line(&tokens, state),
        Some("A") => parse_arc(&tokens, state),
        Some("C") => parse_circle(&tokens, state),
        Some("T") => {
            parse_text(&tokens, state);
            Ok(())
        }
        _ => {
            trace!(line, "unrecognized record ignored");
            Ok(())
        }
    }
}

fn parse_pad(tokens: &[&str], state: &mut ParserState<'_>) -> Result<(), OdbError> {
    let position = point_at(tokens, 1, "P")?;
    let symbol_id = tokens
        .get(3)
        .ok_or_else(|| OdbError::MalformedRecord("`P` record has no symbol".to_string()))?;
    let rotation = tokens
        .get(4)
        .and_then(|token| parse_number(token).ok())
        .unwrap_or(0.0);

    let id = symbol_id.strip_prefix('$').unwrap_or(symbol_id);
    let symbol = state.symbols.get(id);
    let shape = flash_pad(symbol, position, rotation);
    if symbol.is_none() {
        state.record(&OdbError::UnresolvedSymbolReference(id.to_string()));
    }

    match shape {
        PadShape::Circle(circle) => state.layer.circles.push(circle),
        PadShape::Polygon(polygon) => state.layer.polygons.push(polygon),
    }
    Ok(())
}

fn parse_line(tokens: &[&str], state: &mut ParserState<'_>) -> Result<(), OdbError> {
    let start = point_at(tokens, 1, "L")?;
    let end = point_at(tokens, 3, "L")?;
    let width = resolve_width(tokens.get(5).copied(), state);
    state.layer.lines.push(Line { start, end, width });
    Ok(())
}

fn parse_arc(tokens: &[&str], state: &mut ParserState<'_>) -> Result<(), OdbError> {
    let start = point_at(tokens, 1, "A")?;
    let end = point_at(tokens, 3, "A")?;
    let center = point_at(tokens, 5, "A")?;
    let width = resolve_width(tokens.get(7).copied(), state);
    state
        .layer
        .lines
        .extend(tessellate_three_point(start, end, center, width));
    Ok(())
}

fn parse_circle(tokens: &[&str], state: &mut ParserState<'_>) -> Result<(), OdbError> {
    let center = point_at(tokens, 1, "C")?;
    let radius = number_at(tokens, 3, "C")?;
    state.layer.circles.push(Circle { center, radius });
    Ok(())
}

/// `T x y size text…`; a non-numeric size means the text starts at once.
fn parse_text(tokens: &[&str], state: &mut ParserState<'_>) {
    let Ok(position) = point_at(tokens, 1, "T") else {
        trace!("text without a position ignored");
        return;
    };
    let (size, first_word) = match tokens.get(3).map(|token| parse_number(token)) {
        Some(Ok(size)) => (size, 4),
        _ => (DEFAULT_TEXT_SIZE, 3),
    };
    let content = tokens.get(first_word..).unwrap_or_default().join(" ");
    let content = content
        .strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
        .unwrap_or(content.as_str())
        .to_string();
    state.layer.texts.push(TextLabel {
        position,
        content,
        size,
    });
}

/// Width token of an `L` or `A` record: a literal number, a `$` symbol
/// reference, or absent (a polarity flag counts as absent).
fn resolve_width(token: Option<&str>, state: &mut ParserState<'_>) -> f64 {
    let Some(token) = token else {
        return DEFAULT_LINE_WIDTH;
    };
    if let Ok(width) = parse_number(token) {
        return width;
    }
    let Some(id) = token.strip_prefix('$') else {
        return DEFAULT_LINE_WIDTH;
    };
    match state.symbols.get(id) {
        Some(symbol) => symbol.stroke_width().unwrap_or(DEFAULT_LINE_WIDTH),
        None => {
            state.record(&OdbError::UnresolvedSymbolReference(id.to_string()));
            DEFAULT_LINE_WIDTH
        }
    }
}

/// Drops a trailing `;attr=value,...` suffix that is not inside quotes.
fn strip_attributes(line: &str) -> &str {
    let mut quoted = false;
    for (index, c) in line.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            ';' if !quoted => return line.get(..index).unwrap_or(line).trim_end(),
            _ => {}
        }
    }
    line
}

fn number_at(tokens: &[&str], index: usize, command: &str) -> Result<f64, OdbError> {
    let token = tokens.get(index).ok_or_else(|| {
        OdbError::MalformedRecord(format!("`{command}` record is missing field {index}"))
    })?;
    parse_number(token)
}

fn point_at(tokens: &[&str], index: usize, command: &str) -> Result<Point, OdbError> {
    Ok(Point::new(
        number_at(tokens, index, command)?,
        number_at(tokens, index + 1, command)?,
    ))
}
