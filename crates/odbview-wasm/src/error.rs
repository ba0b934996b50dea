//! Error types and the per-parse diagnostic trail.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while locating or parsing archive data.
///
/// None of these abort a whole-archive parse. Each one is converted into a
/// [`Diagnostic`] and attached to the layer or board it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OdbError {
    /// An expected directory or file is absent from the archive.
    #[error("not found: {0}")]
    NotFound(String),

    /// A command line matched a known prefix but failed numeric parsing.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A pad referenced a symbol id that was never defined.
    #[error("unresolved symbol reference `${0}`")]
    UnresolvedSymbolReference(String),

    /// No layers or no profile could be found at all.
    #[error("nothing found: {0}")]
    EmptyResult(String),

    /// File content was not valid UTF-8 and was decoded lossily.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// A layer file uses a format this parser does not read.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl OdbError {
    /// Returns the serializable category of this error.
    pub const fn kind(&self) -> DiagnosticKind {
        match self {
            Self::NotFound(_) => DiagnosticKind::NotFound,
            Self::MalformedRecord(_) => DiagnosticKind::MalformedRecord,
            Self::UnresolvedSymbolReference(_) => DiagnosticKind::UnresolvedSymbolReference,
            Self::EmptyResult(_) => DiagnosticKind::EmptyResult,
            Self::InvalidEncoding(_) => DiagnosticKind::InvalidEncoding,
            Self::UnsupportedFormat(_) => DiagnosticKind::UnsupportedFormat,
        }
    }
}

/// Category of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// See [`OdbError::NotFound`].
    NotFound,
    /// See [`OdbError::MalformedRecord`].
    MalformedRecord,
    /// See [`OdbError::UnresolvedSymbolReference`].
    UnresolvedSymbolReference,
    /// See [`OdbError::EmptyResult`].
    EmptyResult,
    /// See [`OdbError::InvalidEncoding`].
    InvalidEncoding,
    /// See [`OdbError::UnsupportedFormat`].
    UnsupportedFormat,
}

/// A recoverable problem recorded during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Error category.
    pub kind: DiagnosticKind,
    /// One-based line number within the source file, when known.
    pub line: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Builds a diagnostic from an error, optionally tagged with a line number.
    pub fn from_error(error: &OdbError, line: Option<usize>) -> Self {
        Self {
            kind: error.kind(),
            line,
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}
