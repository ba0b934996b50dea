//! Caller-tunable parse and render options.
//!
//! Both structs deserialize from partial JS objects via `serde-wasm-bindgen`;
//! missing fields take their defaults.

use serde::Deserialize;

const DEFAULT_CANVAS_WIDTH: f64 = 800.0;
const DEFAULT_CANVAS_HEIGHT: f64 = 600.0;
const DEFAULT_CANVAS_PADDING: f64 = 20.0;

/// Options applied while parsing feature files.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Multiplier applied to every symbol dimension (radius, side, corner
    /// radius) at definition time. Use `0.001` when symbols are declared in
    /// microns or mils while coordinates are in millimeters or inches.
    pub symbol_scale: f64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { symbol_scale: 1.0 }
    }
}

/// Target drawing surface for the projector.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Canvas {
    /// Canvas width in output units.
    pub width: f64,
    /// Canvas height in output units.
    pub height: f64,
    /// Empty margin kept on every side.
    pub padding: f64,
}

impl Canvas {
    /// Width available for geometry once padding is removed on both sides.
    pub fn available_width(&self) -> f64 {
        2.0f64.mul_add(-self.padding, self.width).max(0.0)
    }

    /// Height available for geometry once padding is removed on both sides.
    pub fn available_height(&self) -> f64 {
        2.0f64.mul_add(-self.padding, self.height).max(0.0)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            padding: DEFAULT_CANVAS_PADDING,
        }
    }
}
