//! Core geometry primitives shared by the parsers and the projector.

use serde::Serialize;

/// Tolerance, in design units, for treating two points as coincident.
pub const POINT_EPSILON: f64 = 1e-3;

/// 2D point in design-unit coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` when both coordinates differ by at most `epsilon`.
    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy).sqrt()
    }

    /// Rotates this point counter-clockwise about `center` by `degrees`.
    pub fn rotated_about(self, center: Self, degrees: f64) -> Self {
        if degrees.abs() < f64::EPSILON {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Self {
            x: dx.mul_add(cos, -(dy * sin)) + center.x,
            y: dx.mul_add(sin, dy * cos) + center.y,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Minimum X coordinate.
    pub min_x: f64,
    /// Minimum Y coordinate.
    pub min_y: f64,
    /// Maximum X coordinate.
    pub max_x: f64,
    /// Maximum Y coordinate.
    pub max_y: f64,
}

impl BoundingBox {
    /// Creates an empty bounding box that will expand with the first `update` call.
    pub const fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Creates a bounding box spanning two corners.
    pub const fn from_corners(min: Point, max: Point) -> Self {
        Self {
            min_x: min.x,
            min_y: min.y,
            max_x: max.x,
            max_y: max.y,
        }
    }

    /// Expands the bounding box to include the given point.
    pub fn update(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Expands the bounding box to include `point`.
    pub fn include(&mut self, point: Point) {
        self.update(point.x, point.y);
    }

    /// Returns `true` until the first point has been included.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Lower-left corner.
    pub const fn min(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Upper-right corner.
    pub const fn max(&self) -> Point {
        Point::new(self.max_x, self.max_y)
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

/// A stroked straight segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Line {
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
    /// Stroke width.
    pub width: f64,
}

/// A filled circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    /// Center point.
    pub center: Point,
    /// Radius.
    pub radius: f64,
}

/// A filled polygon given by its boundary points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    /// Boundary points in order.
    pub points: Vec<Point>,
}

impl Polygon {
    /// Builds a closed polygon, appending a copy of the first point when the
    /// ring is not already closed within [`POINT_EPSILON`].
    ///
    /// Returns `None` unless the result holds at least three distinct points
    /// plus the closing point.
    pub fn closed(mut points: Vec<Point>) -> Option<Self> {
        let (first, last) = (points.first().copied()?, points.last().copied()?);
        if !first.approx_eq(last, POINT_EPSILON) {
            points.push(first);
        }
        (points.len() >= 4).then_some(Self { points })
    }

    /// Builds an open ring, dropping a trailing point that duplicates the
    /// first one. Returns `None` when fewer than three points remain.
    pub fn open_ring(mut points: Vec<Point>) -> Option<Self> {
        if points.len() > 1 {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                if first.approx_eq(*last, POINT_EPSILON) {
                    points.pop();
                }
            }
        }
        (points.len() >= 3).then_some(Self { points })
    }

    /// Returns `true` when the first and last points coincide.
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => self.points.len() > 1 && first.approx_eq(*last, POINT_EPSILON),
            _ => false,
        }
    }
}

/// A text annotation anchored at a point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLabel {
    /// Anchor point.
    pub position: Point,
    /// Text content.
    pub content: String,
    /// Glyph height.
    pub size: f64,
}
