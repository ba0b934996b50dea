//! Manufacturing layers and their display attributes.

pub mod classify;

use serde::Serialize;

use crate::geometry::{BoundingBox, Circle, Line, Polygon, TextLabel};

pub use classify::classify;

/// Manufacturing role of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerType {
    /// Conductive copper.
    Copper,
    /// Solder mask openings.
    SolderMask,
    /// Silkscreen legend.
    Silkscreen,
    /// Board outline or contour.
    Outline,
    /// Drilled holes and vias.
    Drill,
    /// Solder paste stencil.
    Paste,
    /// Keep-out areas.
    Keepout,
    /// Routing paths.
    Route,
    /// Anything unclassified.
    Other,
}

impl LayerType {
    /// Draw order rank; lower ranks are drawn first.
    pub const fn draw_rank(self) -> u8 {
        match self {
            Self::Outline => 1,
            Self::Copper => 2,
            Self::SolderMask => 3,
            Self::Silkscreen => 4,
            Self::Paste => 5,
            Self::Drill => 6,
            Self::Keepout | Self::Route | Self::Other => 99,
        }
    }
}

/// Board side a layer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Component side.
    Top,
    /// Solder side.
    Bottom,
    /// Inner stack-up layer.
    Internal,
    /// Not side specific.
    Both,
}

/// Display color for a layer of the given type on the given side.
pub const fn color_for(kind: LayerType, side: Side) -> &'static str {
    match (kind, side) {
        (LayerType::Copper, Side::Top | Side::Both) => "#c87137",
        (LayerType::Copper, Side::Bottom) => "#b36530",
        (LayerType::Copper, Side::Internal) => "#a35a2a",
        (LayerType::SolderMask, Side::Top | Side::Both) => "#0f766e",
        (LayerType::SolderMask, Side::Bottom) => "#0e7490",
        (LayerType::SolderMask, Side::Internal) => "#0c4a6e",
        (LayerType::Silkscreen, Side::Top | Side::Both) => "#ffffff",
        (LayerType::Silkscreen, Side::Bottom) => "#e5e5e5",
        (LayerType::Silkscreen, Side::Internal) => "#d4d4d4",
        (LayerType::Drill, Side::Top | Side::Both) => "#000000",
        (LayerType::Drill, Side::Bottom) => "#1a1a1a",
        (LayerType::Drill, Side::Internal) => "#333333",
        (LayerType::Outline, _) => "#0c4a6e",
        (LayerType::Paste, Side::Top | Side::Both) => "#c0c0c0",
        (LayerType::Paste, Side::Bottom) => "#a0a0a0",
        (LayerType::Paste, Side::Internal) => "#808080",
        (LayerType::Keepout, Side::Top | Side::Both) => "#ff69b4",
        (LayerType::Keepout, Side::Bottom) => "#ff1493",
        (LayerType::Keepout, Side::Internal) => "#c71585",
        (LayerType::Route, Side::Top | Side::Both) => "#9932cc",
        (LayerType::Route, Side::Bottom) => "#8a2be2",
        (LayerType::Route, Side::Internal) => "#9400d3",
        (LayerType::Other, Side::Top | Side::Both) => "#888888",
        (LayerType::Other, Side::Bottom) => "#666666",
        (LayerType::Other, Side::Internal) => "#444444",
    }
}

/// One manufacturing layer and the geometry parsed from its feature files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    /// Layer directory name.
    pub name: String,
    /// Manufacturing role.
    #[serde(rename = "type")]
    pub kind: LayerType,
    /// Board side.
    pub side: Side,
    /// Stroked segments, including tessellated arcs.
    pub lines: Vec<Line>,
    /// Round pads and circles.
    pub circles: Vec<Circle>,
    /// Surfaces and polygonal pads.
    pub polygons: Vec<Polygon>,
    /// Text annotations.
    pub texts: Vec<TextLabel>,
    /// Display color as `#rrggbb`.
    pub color: String,
    /// Whether the projector draws this layer.
    pub visible: bool,
}

impl Layer {
    /// Creates an empty, visible layer classified and colored from its name.
    pub fn new(name: &str) -> Self {
        let (kind, side) = classify(name);
        Self::with_class(name, kind, side)
    }

    /// Creates an empty, visible layer with an explicit classification.
    pub fn with_class(name: &str, kind: LayerType, side: Side) -> Self {
        Self {
            name: name.to_string(),
            kind,
            side,
            lines: Vec::new(),
            circles: Vec::new(),
            polygons: Vec::new(),
            texts: Vec::new(),
            color: color_for(kind, side).to_string(),
            visible: true,
        }
    }

    /// Total number of primitives across all four collections.
    pub fn primitive_count(&self) -> usize {
        self.lines.len() + self.circles.len() + self.polygons.len() + self.texts.len()
    }

    /// Returns `true` when the layer holds no primitives.
    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }

    /// Extent of the layer's geometry, text anchors included.
    ///
    /// Text is measured with an estimated glyph box of `0.6 * size` per
    /// character by `size`.
    pub fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::new();
        self.extend_bounds(&mut bounds);
        bounds
    }

    /// Grows `bounds` to cover this layer's geometry.
    pub fn extend_bounds(&self, bounds: &mut BoundingBox) {
        for line in &self.lines {
            bounds.include(line.start);
            bounds.include(line.end);
        }
        for circle in &self.circles {
            bounds.update(circle.center.x - circle.radius, circle.center.y - circle.radius);
            bounds.update(circle.center.x + circle.radius, circle.center.y + circle.radius);
        }
        for polygon in &self.polygons {
            for point in &polygon.points {
                bounds.include(*point);
            }
        }
        for text in &self.texts {
            #[allow(clippy::cast_precision_loss)]
            let chars = text.content.chars().count() as f64;
            bounds.include(text.position);
            bounds.update(
                (0.6 * text.size).mul_add(chars, text.position.x),
                text.position.y + text.size,
            );
        }
    }
}
