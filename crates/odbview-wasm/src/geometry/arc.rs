//! Fixed-resolution arc tessellation.
//!
//! Every arc, whatever its radius or sweep, becomes [`ARC_SEGMENTS`]
//! connected straight segments.

use std::f64::consts::{PI, TAU};

use super::types::{Line, Point};

/// Number of straight segments emitted per arc.
pub const ARC_SEGMENTS: u32 = 16;

/// Arc sweep direction for contour curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    /// Negative sweep.
    Clockwise,
    /// Positive sweep.
    CounterClockwise,
}

impl ArcDirection {
    /// Maps the `Y`/`N` clockwise flag of an `OC` record.
    pub fn from_cw_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(flag) if flag.eq_ignore_ascii_case("y") => Self::Clockwise,
            _ => Self::CounterClockwise,
        }
    }
}

/// Tessellates the shortest arc from `start_angle` to `end_angle` (radians)
/// around `center` into [`ARC_SEGMENTS`] lines of the given `width`.
///
/// The signed sweep is normalized to `(-PI, PI]`, so a pair of angles half a
/// turn apart always sweeps counter-clockwise.
pub fn tessellate(
    center: Point,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    width: f64,
) -> Vec<Line> {
    let sweep = shortest_sweep(start_angle, end_angle);
    let points = arc_points(center, radius, start_angle, sweep, ARC_SEGMENTS);
    connect(&points, width)
}

/// Tessellates an arc given by its endpoints and center.
///
/// The radius is measured from `center` to `start`; the end point only fixes
/// the end angle.
pub fn tessellate_three_point(start: Point, end: Point, center: Point, width: f64) -> Vec<Line> {
    let radius = start.distance(center);
    tessellate(
        center,
        radius,
        angle_of(center, start),
        angle_of(center, end),
        width,
    )
}

/// Points of a directed contour arc from `start` to `end` around `center`,
/// excluding `start` itself.
///
/// Coincident start and end points describe a full circle in `direction`.
pub fn contour_arc(start: Point, end: Point, center: Point, direction: ArcDirection) -> Vec<Point> {
    let radius = start.distance(center);
    let start_angle = angle_of(center, start);
    let sweep = if start.approx_eq(end, super::types::POINT_EPSILON) {
        match direction {
            ArcDirection::Clockwise => -TAU,
            ArcDirection::CounterClockwise => TAU,
        }
    } else {
        compute_sweep(start_angle, angle_of(center, end), direction)
    };
    let mut points = arc_points(center, radius, start_angle, sweep, ARC_SEGMENTS);
    if !points.is_empty() {
        points.remove(0);
    }
    // Snap onto the recorded end point so the next contour segment starts exactly there.
    if let Some(last) = points.last_mut() {
        *last = end;
    }
    points
}

/// `segments + 1` points along a circle starting at `start_angle` and
/// covering the signed `sweep`.
pub fn arc_points(
    center: Point,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    segments: u32,
) -> Vec<Point> {
    let segment_count = segments.max(1);
    (0..=segment_count)
        .map(|step| {
            let t = f64::from(step) / f64::from(segment_count);
            let angle = sweep.mul_add(t, start_angle);
            Point::new(
                radius.mul_add(angle.cos(), center.x),
                radius.mul_add(angle.sin(), center.y),
            )
        })
        .collect()
}

fn connect(points: &[Point], width: f64) -> Vec<Line> {
    points
        .windows(2)
        .filter_map(|pair| match pair {
            [start, end] => Some(Line {
                start: *start,
                end: *end,
                width,
            }),
            _ => None,
        })
        .collect()
}

fn angle_of(center: Point, point: Point) -> f64 {
    (point.y - center.y).atan2(point.x - center.x)
}

fn shortest_sweep(start_angle: f64, end_angle: f64) -> f64 {
    let wrapped = (end_angle - start_angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

fn compute_sweep(start_angle: f64, end_angle: f64, direction: ArcDirection) -> f64 {
    let delta = end_angle - start_angle;
    match direction {
        ArcDirection::Clockwise => {
            if delta >= 0.0 {
                delta - TAU
            } else {
                delta
            }
        }
        ArcDirection::CounterClockwise => {
            if delta <= 0.0 {
                delta + TAU
            } else {
                delta
            }
        }
    }
}
