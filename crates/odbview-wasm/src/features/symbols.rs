//! Symbol (pad aperture) table.
//!
//! A feature file declares its reusable pad shapes up front, one per line:
//!
//! ```text
//! $0 r2.5
//! $1 rect4x2xr0.25
//! $2=oval3x1
//! ```
//!
//! Pad and line records later refer to them by id, with or without `$`.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::ParseOptions;
use crate::error::OdbError;

use super::parse_number;

/// Shape family of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// `r<radius>[=<secondary>]`; the secondary value is kept but unused.
    Circle,
    /// `s<side>[x<h>]`.
    Square,
    /// `oval<w>x<h>` or `o<w>[x<h>]`.
    Oval,
    /// `rect<w>x<h>[xr<corner>]`.
    Rect,
    /// Any other descriptor; drawn as the fallback pad.
    Unknown,
}

/// A parsed symbol definition. Dimensions are already scaled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolDefinition {
    /// Id without the leading `$`.
    pub id: String,
    /// Shape family.
    pub kind: SymbolKind,
    /// Radius for circles, side or width otherwise; `0` for unknown shapes.
    pub primary: f64,
    /// Height, when the descriptor gives one.
    pub secondary: Option<f64>,
    /// Corner radius of rounded rectangles.
    pub corner_radius: Option<f64>,
    /// Descriptor text as written.
    pub raw: String,
}

impl SymbolDefinition {
    /// Stroke width used when this symbol is a line's width reference:
    /// the diameter of a circle, the side of a square, the smaller
    /// dimension of a rectangle or oval.
    pub fn stroke_width(&self) -> Option<f64> {
        match self.kind {
            SymbolKind::Circle => Some(self.primary * 2.0),
            SymbolKind::Square => Some(self.primary),
            SymbolKind::Rect | SymbolKind::Oval => {
                Some(self.secondary.map_or(self.primary, |h| self.primary.min(h)))
            }
            SymbolKind::Unknown => None,
        }
    }
}

/// Symbols of one feature file, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: HashMap<String, SymbolDefinition>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a definition, replacing an earlier one with the same id.
    pub fn insert(&mut self, symbol: SymbolDefinition) {
        self.symbols.insert(symbol.id.clone(), symbol);
    }

    /// Looks a symbol up by id; a leading `$` is ignored.
    pub fn get(&self, id: &str) -> Option<&SymbolDefinition> {
        self.symbols.get(id.strip_prefix('$').unwrap_or(id))
    }

    /// Number of defined symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` when no symbol is defined.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Collects every well-formed `$` definition in `text`.
///
/// Malformed definitions are skipped here; the feature stream parser
/// reports them with their line numbers.
pub fn parse_symbols(text: &str, options: &ParseOptions) -> SymbolTable {
    let mut table = SymbolTable::new();
    for line in text.lines() {
        if let Ok(Some(symbol)) = parse_symbol_line(line, options) {
            table.insert(symbol);
        }
    }
    table
}

/// Parses one `$id <descriptor>` or `$id=<descriptor>` line.
///
/// Returns `Ok(None)` for lines that are not symbol definitions or carry no
/// descriptor.
///
/// # Errors
///
/// Returns [`OdbError::MalformedRecord`] when the descriptor names a known
/// shape but its dimensions do not parse.
pub fn parse_symbol_line(line: &str, options: &ParseOptions) -> Result<Option<SymbolDefinition>, OdbError> {
    let Some(body) = line.trim().strip_prefix('$') else {
        return Ok(None);
    };

    let (id, rest) = match body.split_once('=') {
        Some((id, rest)) if !id.contains(char::is_whitespace) => (id, rest),
        _ => body
            .split_once(char::is_whitespace)
            .unwrap_or((body, "")),
    };
    let id = id.trim();
    let Some(raw) = rest.split_whitespace().next() else {
        return Ok(None);
    };
    if id.is_empty() {
        return Ok(None);
    }

    let mut symbol = parse_descriptor(raw).map_err(|_| {
        OdbError::MalformedRecord(format!("symbol `${id}` has unparseable descriptor `{raw}`"))
    })?;
    symbol.id = id.to_string();
    symbol.primary *= options.symbol_scale;
    symbol.secondary = symbol.secondary.map(|h| h * options.symbol_scale);
    symbol.corner_radius = symbol.corner_radius.map(|r| r * options.symbol_scale);
    Ok(Some(symbol))
}

fn parse_descriptor(raw: &str) -> Result<SymbolDefinition, OdbError> {
    let lower = raw.to_lowercase();

    let shaped = |kind, primary, secondary, corner_radius| SymbolDefinition {
        id: String::new(),
        kind,
        primary,
        secondary,
        corner_radius,
        raw: raw.to_string(),
    };

    if let Some(dims) = numeric_tail(&lower, "rect") {
        let mut parts = dims.split('x');
        let width = parse_number(parts.next().unwrap_or_default())?;
        let height = parse_number(parts.next().unwrap_or_default())?;
        let corner = parts
            .next()
            .map(|part| parse_number(part.strip_prefix('r').unwrap_or(part)))
            .transpose()?;
        return Ok(shaped(SymbolKind::Rect, width, Some(height), corner));
    }
    if let Some(dims) = numeric_tail(&lower, "oval") {
        let (width, height) = split_pair(dims)?;
        return Ok(shaped(SymbolKind::Oval, width, Some(height.unwrap_or(width)), None));
    }
    if let Some(dims) = numeric_tail(&lower, "r") {
        let (radius, secondary) = split_pair(dims)?;
        return Ok(shaped(SymbolKind::Circle, radius, secondary, None));
    }
    if let Some(dims) = numeric_tail(&lower, "s") {
        let (side, height) = split_pair(dims)?;
        return Ok(shaped(SymbolKind::Square, side, height, None));
    }
    if let Some(dims) = numeric_tail(&lower, "o") {
        let (width, height) = split_pair(dims)?;
        return Ok(shaped(SymbolKind::Oval, width, height, None));
    }

    Ok(shaped(SymbolKind::Unknown, 0.0, None, None))
}

/// The remainder after `prefix` when it starts with a digit or `.`.
fn numeric_tail<'a>(descriptor: &'a str, prefix: &str) -> Option<&'a str> {
    descriptor
        .strip_prefix(prefix)
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit() || c == '.'))
}

/// `<a>`, `<a>x<b>` or `<a>=<b>`.
fn split_pair(dims: &str) -> Result<(f64, Option<f64>), OdbError> {
    match dims.split_once(['x', '=']) {
        Some((first, second)) => Ok((parse_number(first)?, Some(parse_number(second)?))),
        None => Ok((parse_number(dims)?, None)),
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Option<SymbolDefinition> {
        parse_symbol_line(line, &ParseOptions::default()).ok().flatten()
    }

    #[test]
    fn ut_sym_001_circle() {
        let symbol = parse("$1 r2.5");
        assert_eq!(symbol.as_ref().map(|s| s.kind), Some(SymbolKind::Circle));
        assert_eq!(symbol.as_ref().map(|s| s.id.as_str()), Some("1"));
        assert_eq!(symbol.map(|s| s.primary), Some(2.5));
    }

    #[test]
    fn ut_sym_002_rect_with_corner_radius() {
        let symbol = parse("$7 rect4x2xr0.25");
        assert!(symbol.is_some());
        let Some(symbol) = symbol else {
            return;
        };
        assert_eq!(symbol.kind, SymbolKind::Rect);
        assert!((symbol.primary - 4.0).abs() < f64::EPSILON);
        assert_eq!(symbol.secondary, Some(2.0));
        assert_eq!(symbol.corner_radius, Some(0.25));
    }

    #[test]
    fn ut_sym_003_square_and_oval_forms() {
        assert_eq!(parse("$2 s1.5").map(|s| (s.kind, s.secondary)), Some((SymbolKind::Square, None)));
        assert_eq!(
            parse("$3 o2x1").map(|s| (s.kind, s.primary, s.secondary)),
            Some((SymbolKind::Oval, 2.0, Some(1.0)))
        );
        assert_eq!(
            parse("$4 oval3x1").map(|s| (s.kind, s.primary, s.secondary)),
            Some((SymbolKind::Oval, 3.0, Some(1.0)))
        );
        assert_eq!(
            parse("$5 s2=3").map(|s| (s.kind, s.secondary)),
            Some((SymbolKind::Square, Some(3.0)))
        );
    }

    #[test]
    fn ut_sym_004_equals_form_and_trailing_tokens() {
        assert_eq!(parse("$12=r3").map(|s| (s.id, s.primary)), Some(("12".to_string(), 3.0)));
        assert_eq!(parse("$0 r10 M").map(|s| s.primary), Some(10.0));
    }

    #[test]
    fn ut_sym_005_unknown_kind_keeps_raw() {
        let symbol = parse("$9 donut_r30x20");
        assert_eq!(
            symbol.map(|s| (s.kind, s.raw, s.primary)),
            Some((SymbolKind::Unknown, "donut_r30x20".to_string(), 0.0))
        );
    }

    #[test]
    fn ut_sym_006_symbol_scale_applies_to_all_dimensions() {
        let options = ParseOptions { symbol_scale: 0.001 };
        let symbol = parse_symbol_line("$1 rect1000x500xr100", &options).ok().flatten();
        assert!(symbol.is_some());
        let Some(symbol) = symbol else {
            return;
        };
        assert!((symbol.primary - 1.0).abs() < 1e-12);
        assert!(symbol.secondary.is_some_and(|h| (h - 0.5).abs() < 1e-12));
        assert!(symbol.corner_radius.is_some_and(|r| (r - 0.1).abs() < 1e-12));
    }

    #[test]
    fn ut_sym_007_stroke_width_per_kind() {
        assert_eq!(parse("$1 r2").and_then(|s| s.stroke_width()), Some(4.0));
        assert_eq!(parse("$1 s3").and_then(|s| s.stroke_width()), Some(3.0));
        assert_eq!(parse("$1 rect4x2").and_then(|s| s.stroke_width()), Some(2.0));
        assert_eq!(parse("$1 foo").and_then(|s| s.stroke_width()), None);
    }

    #[test]
    fn ut_sym_008_table_lookup_ignores_dollar() {
        let table = parse_symbols("$1 r2\n$2 s1\nP 0 0 $1\n", &ParseOptions::default());
        assert_eq!(table.len(), 2);
        assert!(table.get("$1").is_some());
        assert!(table.get("2").is_some());
        assert!(table.get("3").is_none());
    }

    #[test]
    fn ut_sym_009_circle_accepts_secondary_value() {
        let symbol = parse("$1 r2.5=3");
        assert_eq!(
            symbol.as_ref().map(|s| (s.kind, s.primary, s.secondary)),
            Some((SymbolKind::Circle, 2.5, Some(3.0)))
        );
        assert_eq!(symbol.and_then(|s| s.stroke_width()), Some(5.0));
    }

    #[test]
    fn bc_sym_001_bad_number_is_malformed() {
        let result = parse_symbol_line("$1 r1.2.3", &ParseOptions::default());
        assert!(matches!(result, Err(OdbError::MalformedRecord(_))));
        let result = parse_symbol_line("$1 rect4", &ParseOptions::default());
        assert!(matches!(result, Err(OdbError::MalformedRecord(_))));
    }

    #[test]
    fn bc_sym_002_non_definitions_are_none() {
        assert!(matches!(parse_symbol_line("P 1 2 $1", &ParseOptions::default()), Ok(None)));
        assert!(matches!(parse_symbol_line("$1", &ParseOptions::default()), Ok(None)));
    }
}
