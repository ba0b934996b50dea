//! Projection of parsed layers into a fixed-size drawing space.
//!
//! [`project`] scales every visible layer uniformly into a [`Canvas`] and
//! emits backend-neutral [`DrawCommand`]s. [`svg::to_svg`] turns a
//! [`Projection`] into an SVG document.

pub mod svg;

use serde::Serialize;

use crate::config::Canvas;
use crate::geometry::{BoundingBox, Point};
use crate::layer::Layer;
use crate::profile::BoardProfile;

/// Stroke color of the board outline.
pub const OUTLINE_COLOR: &str = "#000000";

const EMPTY_EXTENT: f64 = 100.0;

/// One backend-neutral drawing instruction, already in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DrawCommand {
    /// Stroked segment.
    DrawLine {
        /// Start X.
        x1: f64,
        /// Start Y.
        y1: f64,
        /// End X.
        x2: f64,
        /// End Y.
        y2: f64,
        /// Stroke width.
        width: f64,
        /// Stroke color.
        color: String,
    },
    /// Filled circle.
    DrawCircle {
        /// Center X.
        cx: f64,
        /// Center Y.
        cy: f64,
        /// Radius.
        r: f64,
        /// Fill color.
        color: String,
    },
    /// Filled polygon, or a stroked ring in the outline list.
    DrawPolygon {
        /// Boundary points.
        points: Vec<Point>,
        /// Fill or stroke color.
        color: String,
    },
    /// Text anchored at a point.
    DrawText {
        /// Anchor X.
        x: f64,
        /// Anchor Y.
        y: f64,
        /// Font size.
        size: f64,
        /// Text content.
        content: String,
        /// Fill color.
        color: String,
    },
}

/// Uniform scale plus translation from design units to canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    /// Canvas units per design unit.
    pub scale: f64,
    /// X translation applied after scaling.
    pub offset_x: f64,
    /// Y translation applied after scaling.
    pub offset_y: f64,
}

impl Transform {
    /// Maps a design-space point into canvas space.
    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            point.x.mul_add(self.scale, self.offset_x),
            point.y.mul_add(self.scale, self.offset_y),
        )
    }

    /// Scales a length (width, radius, font size).
    pub fn length(&self, value: f64) -> f64 {
        value * self.scale
    }
}

/// Draw commands for one canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    /// Canvas width.
    pub width: f64,
    /// Canvas height.
    pub height: f64,
    /// Design-to-canvas mapping used for every command.
    pub transform: Transform,
    /// Board outline rings, drawn unfilled.
    pub outline: Vec<DrawCommand>,
    /// Layer geometry in draw order.
    pub commands: Vec<DrawCommand>,
}

/// Projects visible layers, and the board outline when given, into `canvas`.
///
/// With a profile the board extent drives the scale and the board is
/// centered in the padded area. Without one the union of the layers' bounds
/// is used and anchored at the top-left padding corner.
pub fn project<'a>(
    layers: impl IntoIterator<Item = &'a Layer>,
    profile: Option<&BoardProfile>,
    canvas: &Canvas,
) -> Projection {
    let mut visible: Vec<&Layer> = layers.into_iter().filter(|layer| layer.visible).collect();
    visible.sort_by_key(|layer| layer.kind.draw_rank());

    let transform = profile.map_or_else(
        || {
            let mut bounds = BoundingBox::new();
            for layer in &visible {
                layer.extend_bounds(&mut bounds);
            }
            if bounds.is_empty() {
                bounds = BoundingBox::from_corners(Point::new(0.0, 0.0), Point::new(EMPTY_EXTENT, EMPTY_EXTENT));
            }
            anchored(&bounds, canvas)
        },
        |profile| centered(&profile.bounds(), canvas),
    );

    let outline = profile
        .map(|profile| {
            profile
                .outline
                .iter()
                .map(|ring| DrawCommand::DrawPolygon {
                    points: ring.points.iter().map(|p| transform.apply(*p)).collect(),
                    color: OUTLINE_COLOR.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let mut commands = Vec::new();
    for layer in visible {
        push_layer(&mut commands, layer, &transform);
    }

    Projection {
        width: canvas.width,
        height: canvas.height,
        transform,
        outline,
        commands,
    }
}

fn push_layer(commands: &mut Vec<DrawCommand>, layer: &Layer, transform: &Transform) {
    let color = &layer.color;
    commands.reserve(layer.primitive_count());
    for line in &layer.lines {
        let start = transform.apply(line.start);
        let end = transform.apply(line.end);
        commands.push(DrawCommand::DrawLine {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            width: transform.length(line.width),
            color: color.clone(),
        });
    }
    for circle in &layer.circles {
        let center = transform.apply(circle.center);
        commands.push(DrawCommand::DrawCircle {
            cx: center.x,
            cy: center.y,
            r: transform.length(circle.radius),
            color: color.clone(),
        });
    }
    for polygon in &layer.polygons {
        commands.push(DrawCommand::DrawPolygon {
            points: polygon.points.iter().map(|p| transform.apply(*p)).collect(),
            color: color.clone(),
        });
    }
    for text in &layer.texts {
        let anchor = transform.apply(text.position);
        commands.push(DrawCommand::DrawText {
            x: anchor.x,
            y: anchor.y,
            size: transform.length(text.size),
            content: text.content.clone(),
            color: color.clone(),
        });
    }
}

/// Largest uniform scale fitting `width` × `height` into the available area.
///
/// A zero-extent axis is ignored; when both are zero the scale is `1`.
fn fit_scale(width: f64, height: f64, canvas: &Canvas) -> f64 {
    let scale_x = (width > f64::EPSILON).then(|| canvas.available_width() / width);
    let scale_y = (height > f64::EPSILON).then(|| canvas.available_height() / height);
    match (scale_x, scale_y) {
        (Some(x), Some(y)) => x.min(y),
        (Some(scale), None) | (None, Some(scale)) => scale,
        (None, None) => 1.0,
    }
}

fn anchored(bounds: &BoundingBox, canvas: &Canvas) -> Transform {
    let scale = fit_scale(bounds.width(), bounds.height(), canvas);
    Transform {
        scale,
        offset_x: bounds.min_x.mul_add(-scale, canvas.padding),
        offset_y: bounds.min_y.mul_add(-scale, canvas.padding),
    }
}

fn centered(bounds: &BoundingBox, canvas: &Canvas) -> Transform {
    let scale = fit_scale(bounds.width(), bounds.height(), canvas);
    let slack_x = bounds.width().mul_add(-scale, canvas.available_width()) / 2.0;
    let slack_y = bounds.height().mul_add(-scale, canvas.available_height()) / 2.0;
    Transform {
        scale,
        offset_x: bounds.min_x.mul_add(-scale, canvas.padding) + slack_x,
        offset_y: bounds.min_y.mul_add(-scale, canvas.padding) + slack_y,
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Line, Polygon, TextLabel};
    use crate::layer::{LayerType, Side};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn copper_with_line() -> Layer {
        let mut layer = Layer::with_class("top", LayerType::Copper, Side::Top);
        layer.lines.push(Line {
            start: Point::new(0.0, 0.0),
            end: Point::new(10.0, 5.0),
            width: 1.0,
        });
        layer
    }

    #[test]
    fn ut_proj_001_profile_scale_and_centering() {
        let profile = BoardProfile::default_profile();
        let projection = project(&[], Some(&profile), &Canvas::default());
        // min(760 / 300, 560 / 200) = 2.5333…
        let scale = 760.0 / 300.0;
        assert!(close(projection.transform.scale, scale));
        assert!(close(projection.transform.offset_x, 20.0));
        let expected_y = 20.0 + (560.0 - 200.0 * scale) / 2.0;
        assert!(close(projection.transform.offset_y, expected_y));
        assert_eq!(projection.outline.len(), 1);
        assert!(projection.commands.is_empty());
    }

    #[test]
    fn ut_proj_002_without_profile_uses_layer_bounds() {
        let projection = project(&[copper_with_line()], None, &Canvas::default());
        // min(760 / 10, 560 / 5) = 76
        assert!(close(projection.transform.scale, 76.0));
        assert!(projection.outline.is_empty());
        assert_eq!(
            projection.commands,
            vec![DrawCommand::DrawLine {
                x1: 20.0,
                y1: 20.0,
                x2: 780.0,
                y2: 400.0,
                width: 76.0,
                color: "#c87137".to_string(),
            }]
        );
    }

    #[test]
    fn ut_proj_003_layers_sorted_by_rank_and_stable() {
        let mut silk = Layer::with_class("silk", LayerType::Silkscreen, Side::Top);
        silk.circles.push(Circle {
            center: Point::new(1.0, 1.0),
            radius: 1.0,
        });
        let mut outline = Layer::with_class("outline", LayerType::Outline, Side::Both);
        outline.polygons.push(Polygon {
            points: vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(4.0, 4.0), Point::new(0.0, 0.0)],
        });
        let mut other_a = Layer::with_class("a", LayerType::Other, Side::Both);
        other_a.texts.push(TextLabel {
            position: Point::new(0.0, 0.0),
            content: "A".to_string(),
            size: 1.0,
        });
        let mut keepout = Layer::with_class("b", LayerType::Keepout, Side::Both);
        keepout.circles.push(Circle {
            center: Point::new(2.0, 2.0),
            radius: 0.5,
        });

        let projection = project(&[other_a, silk, keepout, outline], None, &Canvas::default());
        let kinds: Vec<&str> = projection
            .commands
            .iter()
            .map(|command| match command {
                DrawCommand::DrawLine { .. } => "line",
                DrawCommand::DrawCircle { .. } => "circle",
                DrawCommand::DrawPolygon { .. } => "polygon",
                DrawCommand::DrawText { .. } => "text",
            })
            .collect();
        assert_eq!(kinds, vec!["polygon", "circle", "text", "circle"]);
    }

    #[test]
    fn ut_proj_004_invisible_layers_are_skipped() {
        let mut hidden = copper_with_line();
        hidden.visible = false;
        let projection = project(&[hidden], None, &Canvas::default());
        assert!(projection.commands.is_empty());
        // Falls back to the 0..100 extent.
        assert!(close(projection.transform.scale, 5.6));
    }

    #[test]
    fn ut_proj_005_lengths_scale_uniformly() {
        let mut layer = Layer::with_class("x", LayerType::Copper, Side::Top);
        layer.circles.push(Circle {
            center: Point::new(0.0, 0.0),
            radius: 10.0,
        });
        layer.texts.push(TextLabel {
            position: Point::new(0.0, 0.0),
            content: "U1".to_string(),
            size: 2.0,
        });
        let projection = project(&[layer], None, &Canvas::default());
        let scale = projection.transform.scale;
        assert!(matches!(projection.commands[0], DrawCommand::DrawCircle { r, .. } if close(r, 10.0 * scale)));
        assert!(matches!(projection.commands[1], DrawCommand::DrawText { size, .. } if close(size, 2.0 * scale)));
    }

    #[test]
    fn bc_proj_001_degenerate_extents_never_divide_by_zero() {
        let mut flat = Layer::with_class("x", LayerType::Copper, Side::Top);
        flat.lines.push(Line {
            start: Point::new(0.0, 3.0),
            end: Point::new(20.0, 3.0),
            width: 0.0,
        });
        let projection = project(&[flat], None, &Canvas::default());
        assert!(close(projection.transform.scale, 38.0));

        let mut point = Layer::with_class("y", LayerType::Copper, Side::Top);
        point.lines.push(Line {
            start: Point::new(5.0, 5.0),
            end: Point::new(5.0, 5.0),
            width: 0.0,
        });
        let projection = project(&[point], None, &Canvas::default());
        assert!(close(projection.transform.scale, 1.0));
        assert!(projection.transform.offset_x.is_finite());
    }

    #[test]
    fn bc_proj_002_projected_points_stay_inside_padded_canvas() {
        let profile = BoardProfile::default_profile();
        let canvas = Canvas::default();
        let projection = project(&[], Some(&profile), &canvas);
        for command in &projection.outline {
            if let DrawCommand::DrawPolygon { points, .. } = command {
                for p in points {
                    assert!(p.x >= canvas.padding - 1e-9 && p.x <= canvas.width - canvas.padding + 1e-9);
                    assert!(p.y >= canvas.padding - 1e-9 && p.y <= canvas.height - canvas.padding + 1e-9);
                }
            }
        }
    }
}
