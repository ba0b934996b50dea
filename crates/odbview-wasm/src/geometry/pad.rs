//! Pad flash expansion.
//!
//! Converts a `P` record's resolved symbol into a circle or a closed polygon
//! placed at the pad position.

use crate::features::symbols::{SymbolDefinition, SymbolKind};

use super::types::{Circle, Point, Polygon};

/// Radius of the circle drawn for unknown or unresolved symbols.
pub const FALLBACK_PAD_RADIUS: f64 = 0.5;

/// Geometry produced by a single pad flash.
#[derive(Debug, Clone, PartialEq)]
pub enum PadShape {
    /// Round pad, oval approximation, or fallback marker.
    Circle(Circle),
    /// Square, rectangle, or rounded rectangle outline.
    Polygon(Polygon),
}

/// Expand a pad flash at `position`.
///
/// `symbol` is `None` when the pad referenced an undefined id; the caller
/// records the diagnostic, this function only draws the fallback circle.
/// `rotation` is in degrees, counter-clockwise, and only affects polygons.
pub fn flash_pad(symbol: Option<&SymbolDefinition>, position: Point, rotation: f64) -> PadShape {
    let Some(symbol) = symbol else {
        return fallback(position);
    };

    match symbol.kind {
        SymbolKind::Circle => PadShape::Circle(Circle {
            center: position,
            radius: symbol.primary,
        }),
        SymbolKind::Oval => {
            let height = symbol.secondary.unwrap_or(symbol.primary);
            PadShape::Circle(Circle {
                center: position,
                radius: symbol.primary.max(height) / 2.0,
            })
        }
        SymbolKind::Square | SymbolKind::Rect => {
            let width = symbol.primary;
            let height = symbol.secondary.unwrap_or(width);
            let corner = symbol.corner_radius.unwrap_or(0.0);
            let outline = if corner > 0.0 {
                rounded_rect_outline(position, width, height, corner)
            } else {
                rect_outline(position, width, height)
            };
            let rotated = outline
                .into_iter()
                .map(|point| point.rotated_about(position, rotation))
                .collect();
            Polygon::closed(rotated).map_or_else(|| fallback(position), PadShape::Polygon)
        }
        SymbolKind::Unknown => fallback(position),
    }
}

/// A closed `width` × `height` rectangle centered on `center`, rotated by
/// `rotation` degrees counter-clockwise. Returns `None` for a non-positive
/// side.
pub fn rect_polygon(center: Point, width: f64, height: f64, rotation: f64) -> Option<Polygon> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let outline = rect_outline(center, width, height)
        .into_iter()
        .map(|point| point.rotated_about(center, rotation))
        .collect();
    Polygon::closed(outline)
}

const fn fallback(position: Point) -> PadShape {
    PadShape::Circle(Circle {
        center: position,
        radius: FALLBACK_PAD_RADIUS,
    })
}

fn rect_outline(center: Point, width: f64, height: f64) -> Vec<Point> {
    let hw = width / 2.0;
    let hh = height / 2.0;
    vec![
        Point::new(center.x - hw, center.y - hh),
        Point::new(center.x + hw, center.y - hh),
        Point::new(center.x + hw, center.y + hh),
        Point::new(center.x - hw, center.y + hh),
    ]
}

/// Octagonal approximation of a rounded rectangle: each corner is cut by a
/// chamfer of length `corner` along both edges.
fn rounded_rect_outline(center: Point, width: f64, height: f64, corner: f64) -> Vec<Point> {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let r = corner.min(hw).min(hh);
    vec![
        Point::new(center.x - hw + r, center.y - hh),
        Point::new(center.x + hw - r, center.y - hh),
        Point::new(center.x + hw, center.y - hh + r),
        Point::new(center.x + hw, center.y + hh - r),
        Point::new(center.x + hw - r, center.y + hh),
        Point::new(center.x - hw + r, center.y + hh),
        Point::new(center.x - hw, center.y + hh - r),
        Point::new(center.x - hw, center.y - hh + r),
    ]
}
