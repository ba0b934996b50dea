#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::indexing_slicing)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `OdbView` WASM module: ODB++ layer and profile geometry extraction.

pub mod archive;
pub mod config;
pub mod dialect;
pub mod error;
pub mod features;
pub mod geometry;
pub mod layer;
pub mod pipeline;
pub mod profile;
pub mod render;

use std::cell::RefCell;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::archive::MemoryArchive;
use crate::config::{Canvas, ParseOptions};
use crate::error::Diagnostic;
use crate::features::FileHeader;
use crate::layer::{Layer, LayerType, Side};
use crate::pipeline::BoardParse;
use crate::profile::{BoardProfile, ProfileParse};
use crate::render::Projection;

thread_local! {
    static LAST_BOARD: RefCell<Option<BoardParse>> = const { RefCell::new(None) };
}

fn store_board(board: BoardParse) {
    LAST_BOARD.with(|b| {
        *b.borrow_mut() = Some(board);
    });
}

/// Summary of one parsed layer, without its geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSummary {
    /// Layer directory name.
    pub name: String,
    /// Manufacturing role.
    #[serde(rename = "type")]
    pub kind: LayerType,
    /// Board side.
    pub side: Side,
    /// Display color.
    pub color: String,
    /// Number of lines, circles, polygons and texts.
    pub primitive_count: usize,
    /// Number of diagnostics recorded for the layer.
    pub diagnostic_count: usize,
}

/// What [`parse_archive`] hands back to JS. Geometry stays in the module;
/// fetch it with [`get_layer`] or render it with [`render_board`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardMeta {
    /// One summary per layer, in discovery order.
    pub layers: Vec<LayerSummary>,
    /// Board outline.
    pub profile: BoardProfile,
    /// Archive path of the outline, `None` for the default rectangle.
    pub profile_source: Option<String>,
    /// Board-level diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl BoardMeta {
    fn from_board(board: &BoardParse) -> Self {
        Self {
            layers: board
                .layers
                .iter()
                .map(|parsed| LayerSummary {
                    name: parsed.layer.name.clone(),
                    kind: parsed.layer.kind,
                    side: parsed.layer.side,
                    color: parsed.layer.color.clone(),
                    primitive_count: parsed.layer.primitive_count(),
                    diagnostic_count: parsed.diagnostics.len(),
                })
                .collect(),
            profile: board.profile.clone(),
            profile_source: board.profile_source.clone(),
            diagnostics: board.diagnostics.clone(),
        }
    }
}

/// Result of parsing a single feature file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureResult {
    /// The parsed layer.
    pub layer: Layer,
    /// Header metadata.
    pub header: FileHeader,
    /// Problems found, in line order.
    pub diagnostics: Vec<Diagnostic>,
}

/// An archive assembled from JS, one entry at a time.
#[wasm_bindgen]
#[derive(Debug, Clone, Default)]
pub struct OdbArchive {
    inner: MemoryArchive,
}

#[wasm_bindgen]
impl OdbArchive {
    /// Creates an empty archive.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file entry with its raw bytes.
    pub fn add_file(&mut self, path: &str, data: &[u8]) {
        self.inner.add_file(path, data);
    }

    /// Adds an explicit directory entry.
    pub fn add_directory(&mut self, path: &str) {
        self.inner.add_directory(path);
    }

    /// Number of entries added so far.
    #[wasm_bindgen(getter)]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` when nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl OdbArchive {
    /// The underlying in-memory archive.
    pub const fn as_memory(&self) -> &MemoryArchive {
        &self.inner
    }
}

/// Initialize the WASM module. Sets up the panic hook for debugging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn options_from<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse every layer and the profile of an archive.
///
/// Returns `BoardMeta` as a `JsValue` via `serde-wasm-bindgen`. The parsed
/// board is stored internally; retrieve layers with [`get_layer`] and
/// draw with [`render_board`] or [`render_board_svg`].
///
/// # Errors
///
/// Returns an error for an empty archive or unreadable options.
#[wasm_bindgen]
pub fn parse_archive(archive: &OdbArchive, options: JsValue) -> Result<JsValue, JsValue> {
    let options: ParseOptions = options_from(options)?;
    let meta = parse_archive_internal(archive.as_memory(), &options).map_err(|e| JsValue::from_str(&e))?;
    to_js(&meta)
}

/// Internal archive parse shared between the wasm export and native tests.
#[doc(hidden)]
pub fn parse_archive_internal(archive: &MemoryArchive, options: &ParseOptions) -> Result<BoardMeta, String> {
    if archive.is_empty() {
        return Err("empty archive".to_string());
    }
    let board = pipeline::parse_archive(archive, options);
    let meta = BoardMeta::from_board(&board);
    store_board(board);
    Ok(meta)
}

/// Parse one feature file into a layer named `name`.
///
/// # Errors
///
/// Returns an error for empty input or unreadable options.
#[wasm_bindgen]
pub fn parse_features(name: &str, data: &[u8], options: JsValue) -> Result<JsValue, JsValue> {
    let options: ParseOptions = options_from(options)?;
    let result = parse_features_internal(name, data, &options).map_err(|e| JsValue::from_str(&e))?;
    to_js(&result)
}

/// Internal feature parse shared between the wasm export and native tests.
#[doc(hidden)]
pub fn parse_features_internal(name: &str, data: &[u8], options: &ParseOptions) -> Result<FeatureResult, String> {
    if data.is_empty() {
        return Err("empty input".to_string());
    }
    let text = String::from_utf8_lossy(data);
    let mut layer = Layer::new(name);
    let parse = dialect::parse_layer_text(dialect::LayerFormat::Features, &text, &mut layer, options);
    Ok(FeatureResult {
        layer,
        header: parse.header,
        diagnostics: parse.diagnostics,
    })
}

/// Parse one profile file into a board outline.
///
/// # Errors
///
/// Returns an error for empty input.
#[wasm_bindgen]
pub fn parse_profile(data: &[u8]) -> Result<JsValue, JsValue> {
    let result = parse_profile_internal(data).map_err(|e| JsValue::from_str(&e))?;
    to_js(&result)
}

/// Internal profile parse shared between the wasm export and native tests.
#[doc(hidden)]
pub fn parse_profile_internal(data: &[u8]) -> Result<ProfileParse, String> {
    if data.is_empty() {
        return Err("empty input".to_string());
    }
    Ok(profile::parse_profile(&String::from_utf8_lossy(data)))
}

/// Retrieve a layer of the last parsed archive by name.
///
/// Returns `null` when no archive has been parsed or the layer is unknown.
///
/// # Errors
///
/// Returns an error when the layer cannot be serialized.
#[wasm_bindgen]
pub fn get_layer(name: &str) -> Result<JsValue, JsValue> {
    get_layer_internal(name).map_or(Ok(JsValue::NULL), |layer| to_js(&layer))
}

/// Internal layer lookup shared between the wasm export and native tests.
#[doc(hidden)]
pub fn get_layer_internal(name: &str) -> Option<Layer> {
    LAST_BOARD.with(|b| b.borrow().as_ref().and_then(|board| board.layer(name).cloned()))
}

/// Project the last parsed archive into draw commands.
///
/// # Errors
///
/// Returns an error when no archive has been parsed yet.
#[wasm_bindgen]
pub fn render_board(canvas: JsValue) -> Result<JsValue, JsValue> {
    let canvas: Canvas = options_from(canvas)?;
    let projection = render_board_internal(&canvas).map_err(|e| JsValue::from_str(&e))?;
    to_js(&projection)
}

/// Internal projection shared between the wasm export and native tests.
#[doc(hidden)]
pub fn render_board_internal(canvas: &Canvas) -> Result<Projection, String> {
    LAST_BOARD.with(|b| {
        b.borrow()
            .as_ref()
            .map(|board| render::project(board.iter_layers(), Some(&board.profile), canvas))
            .ok_or_else(|| "no archive parsed".to_string())
    })
}

/// Render the last parsed archive as an SVG document.
///
/// # Errors
///
/// Returns an error when no archive has been parsed yet.
#[wasm_bindgen]
pub fn render_board_svg(canvas: JsValue) -> Result<String, JsValue> {
    let canvas: Canvas = options_from(canvas)?;
    render_board_svg_internal(&canvas).map_err(|e| JsValue::from_str(&e))
}

/// Internal SVG rendering shared between the wasm export and native tests.
#[doc(hidden)]
pub fn render_board_svg_internal(canvas: &Canvas) -> Result<String, String> {
    render_board_internal(canvas).map(|projection| render::svg::to_svg(&projection))
}
