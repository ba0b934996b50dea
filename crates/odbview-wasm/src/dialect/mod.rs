//! Layer file dialects.
//!
//! Most layer files are ODB++ feature streams, but exports also carry JSON
//! and XML renditions of the same primitives, and some older tools write a
//! loose keyword text format. The file extension picks the reader:
//!
//! - `.json` → [`json::parse_json_features`];
//! - `.xml` → [`xml::parse_xml_features`];
//! - compressed or archived content (`.z`, `.gz`, `.tgz`, `.zip`) is never
//!   read;
//! - anything else is a feature stream. A stream the feature grammar draws
//!   nothing from is read again as free-form text
//!   ([`text::parse_text_features`]).

pub mod json;
pub mod text;
pub mod xml;

use tracing::debug;

use crate::config::ParseOptions;
use crate::error::{Diagnostic, OdbError};
use crate::features::{parse_features, FeatureParse};
use crate::layer::Layer;

const UNSUPPORTED_EXTENSIONS: [&str; 4] = ["z", "gz", "tgz", "zip"];

/// How a layer file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerFormat {
    /// ODB++ feature stream, with the free-form text fallback.
    Features,
    /// JSON object of `lines`, `circles`, `polygons` and `texts` arrays.
    Json,
    /// XML markup with SVG-like `line`, `circle`, `rect`, `polygon`,
    /// `path` and `text` elements.
    Xml,
    /// Compressed or archived content.
    Unsupported,
}

impl LayerFormat {
    /// Picks the format from the extension of `path`, ignoring case.
    pub fn from_path(path: &str) -> Self {
        let file = path.rsplit('/').next().unwrap_or(path);
        let Some((_, extension)) = file.rsplit_once('.') else {
            return Self::Features;
        };
        let extension = extension.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Self::Json,
            "xml" => Self::Xml,
            other if UNSUPPORTED_EXTENSIONS.contains(&other) => Self::Unsupported,
            _ => Self::Features,
        }
    }
}

/// Parses the text of one layer file in `format` and appends its primitives
/// to `layer`.
///
/// [`LayerFormat::Unsupported`] appends nothing and reports
/// [`OdbError::UnsupportedFormat`].
pub fn parse_layer_text(format: LayerFormat, text: &str, layer: &mut Layer, options: &ParseOptions) -> FeatureParse {
    match format {
        LayerFormat::Features => parse_stream(text, layer, options),
        LayerFormat::Json => json::parse_json_features(text, layer),
        LayerFormat::Xml => xml::parse_xml_features(text, layer),
        LayerFormat::Unsupported => FeatureParse {
            diagnostics: vec![Diagnostic::from_error(
                &OdbError::UnsupportedFormat(format!("layer `{}` file is compressed or binary", layer.name)),
                None,
            )],
            ..FeatureParse::default()
        },
    }
}

fn parse_stream(text: &str, layer: &mut Layer, options: &ParseOptions) -> FeatureParse {
    let parse = parse_features(text, layer, options);
    if parse.primitives > 0 {
        return parse;
    }

    let fallback = text::parse_text_features(text, layer, options);
    if fallback.primitives == 0 {
        return parse;
    }
    debug!(layer = %layer.name, primitives = fallback.primitives, "read as free-form text");
    FeatureParse {
        header: parse.header,
        ..fallback
    }
}
