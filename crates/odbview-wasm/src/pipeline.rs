//! Whole-archive parse: locate, classify, parse every layer, extract the
//! profile.
//!
//! Nothing here fails. Every problem becomes a [`Diagnostic`] on the layer
//! or board it concerns, and one broken layer never affects another.

use std::borrow::Cow;

use serde::Serialize;
use tracing::debug;

use crate::archive::resolve::{find_files_in_directory, find_profile_file, locate_layer_directories, LAYER_FILE_KEYWORDS};
use crate::archive::ArchiveView;
use crate::config::ParseOptions;
use crate::dialect::{parse_layer_text, LayerFormat};
use crate::error::{Diagnostic, OdbError};
use crate::layer::Layer;
use crate::profile::{parse_profile, BoardProfile};

/// A layer together with where it came from and what went wrong.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedLayer {
    /// The parsed geometry.
    pub layer: Layer,
    /// Archive paths of the files that were parsed, in order.
    pub sources: Vec<String>,
    /// Problems found in this layer's files.
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything recovered from one archive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardParse {
    /// Layers in discovery order.
    pub layers: Vec<ParsedLayer>,
    /// The board outline, or the default rectangle.
    pub profile: BoardProfile,
    /// Path of the file the outline came from; `None` for the default.
    pub profile_source: Option<String>,
    /// Board-level problems: missing directories, profile issues.
    pub diagnostics: Vec<Diagnostic>,
}

impl BoardParse {
    /// Looks a layer up by name.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers
            .iter()
            .map(|parsed| &parsed.layer)
            .find(|layer| layer.name == name)
    }

    /// Iterates over the parsed layers.
    pub fn iter_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().map(|parsed| &parsed.layer)
    }
}

/// Parses every layer and the profile of an archive.
pub fn parse_archive(view: &dyn ArchiveView, options: &ParseOptions) -> BoardParse {
    let mut diagnostics = Vec::new();
    let mut layers = Vec::new();

    match locate_layer_directories(view) {
        Some(found) => {
            debug!(layers_dir = %found.layers_dir, count = found.layer_dirs.len(), "layer directories located");
            for dir in &found.layer_dirs {
                let name = last_segment(dir);
                let files = find_files_in_directory(view, dir, &LAYER_FILE_KEYWORDS);
                if files.is_empty() {
                    diagnostics.push(Diagnostic::from_error(
                        &OdbError::NotFound(format!("no feature files for layer `{name}`")),
                        None,
                    ));
                    continue;
                }
                layers.push(parse_layer(view, name, &files, options));
            }
        }
        None => diagnostics.push(Diagnostic::from_error(
            &OdbError::NotFound("no steps or layers directory".to_string()),
            None,
        )),
    }

    if layers.is_empty() {
        diagnostics.push(Diagnostic::from_error(
            &OdbError::EmptyResult("no layers in archive".to_string()),
            None,
        ));
    }

    let (profile, profile_source) = extract_profile(view, &mut diagnostics);

    debug!(
        layers = layers.len(),
        diagnostics = diagnostics.len(),
        profile = profile_source.as_deref().unwrap_or("<default>"),
        "archive parsed"
    );

    BoardParse {
        layers,
        profile,
        profile_source,
        diagnostics,
    }
}

/// Parses the files of one layer, in order, into a single layer. Each
/// file is read in the dialect its extension names.
pub fn parse_layer(view: &dyn ArchiveView, name: &str, files: &[String], options: &ParseOptions) -> ParsedLayer {
    let mut layer = Layer::new(name);
    let mut sources = Vec::new();
    let mut diagnostics = Vec::new();

    for path in files {
        let format = LayerFormat::from_path(path);
        if format == LayerFormat::Unsupported {
            diagnostics.push(Diagnostic::from_error(
                &OdbError::UnsupportedFormat(format!("`{path}` skipped")),
                None,
            ));
            continue;
        }
        let text = match read_text(view, path, &mut diagnostics) {
            Ok(text) => text,
            Err(err) => {
                diagnostics.push(Diagnostic::from_error(&err, None));
                continue;
            }
        };
        let parse = parse_layer_text(format, &text, &mut layer, options);
        diagnostics.extend(parse.diagnostics);
        sources.push(path.clone());
    }

    ParsedLayer {
        layer,
        sources,
        diagnostics,
    }
}

fn extract_profile(view: &dyn ArchiveView, diagnostics: &mut Vec<Diagnostic>) -> (BoardProfile, Option<String>) {
    let Some(path) = find_profile_file(view) else {
        diagnostics.push(Diagnostic::from_error(
            &OdbError::NotFound("profile file; using default outline".to_string()),
            None,
        ));
        return (BoardProfile::default_profile(), None);
    };

    let text = match read_text(view, &path, diagnostics) {
        Ok(text) => text,
        Err(err) => {
            diagnostics.push(Diagnostic::from_error(&err, None));
            return (BoardProfile::default_profile(), None);
        }
    };

    let parse = parse_profile(&text);
    diagnostics.extend(parse.diagnostics);
    let source = parse.recovered.then_some(path);
    (parse.profile, source)
}

/// Reads a file as text. Invalid UTF-8 is replaced and reported.
fn read_text(view: &dyn ArchiveView, path: &str, diagnostics: &mut Vec<Diagnostic>) -> Result<String, OdbError> {
    let bytes = view.read_bytes(path)?;
    let text = match String::from_utf8_lossy(&bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            diagnostics.push(Diagnostic::from_error(
                &OdbError::InvalidEncoding(format!("`{path}` is not valid UTF-8")),
                None,
            ));
            text
        }
    };
    Ok(text)
}

fn last_segment(dir: &str) -> &str {
    dir.trim_end_matches('/').rsplit('/').next().unwrap_or(dir)
}
