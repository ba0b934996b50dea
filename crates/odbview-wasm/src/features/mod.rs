//! ODB++ feature file parsing.
//!
//! A feature file is a line-oriented command stream: a symbol table, then
//! pads (`P`), lines (`L`), arcs (`A`), circles (`C`), text (`T`) and
//! surfaces (`SE` … `S` … `OB`/`OS`/`OC` … `OE` … `SE`).

pub mod parser;
pub mod polygon;
pub mod symbols;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::OdbError;

pub use parser::{parse_features, FeatureParse};
pub use polygon::{PolygonAssembler, StructureEvent};
pub use symbols::{parse_symbols, SymbolDefinition, SymbolKind, SymbolTable};

/// Number of leading lines scanned for `KEY=VALUE` header metadata.
pub const HEADER_SCAN_LINES: usize = 20;

/// Coordinate units declared by a file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    /// Millimeters.
    Mm,
    /// Inches.
    Inch,
}

/// `KEY=VALUE` metadata found at the top of a feature file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    /// Every key/value pair, keys as written.
    pub entries: BTreeMap<String, String>,
    /// Declared units, when a `UNITS` key holds `MM` or `INCH`.
    pub units: Option<Units>,
}

/// Collects `KEY=VALUE` and `#KEY=VALUE` lines from the first
/// [`HEADER_SCAN_LINES`] lines. Symbol definitions are not metadata.
pub fn parse_header(text: &str) -> FileHeader {
    let mut header = FileHeader::default();
    for line in text.lines().take(HEADER_SCAN_LINES) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('$') {
            continue;
        }
        let body = line.strip_prefix('#').unwrap_or(line);
        let Some((key, value)) = body.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();
        if key.eq_ignore_ascii_case("units") {
            header.units = match value.to_ascii_uppercase().as_str() {
                "MM" => Some(Units::Mm),
                "INCH" => Some(Units::Inch),
                _ => header.units,
            };
        }
        header.entries.insert(key.to_string(), value.to_string());
    }
    header
}

/// Parses a finite `f64` token.
///
/// # Errors
///
/// Returns [`OdbError::MalformedRecord`] for unparseable, NaN or infinite
/// values.
pub(crate) fn parse_number(token: &str) -> Result<f64, OdbError> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| OdbError::MalformedRecord(format!("`{token}` is not a number")))
}
