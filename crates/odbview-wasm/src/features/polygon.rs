//! Surface (`SE`/`S`/`OB`/`OS`/`OC`/`OE`) assembly.
//!
//! The point accumulator lives inside [`State::InPolygon`], so a point can
//! only be appended while a polygon is open.

use tracing::trace;

use crate::error::OdbError;
use crate::geometry::{contour_arc, ArcDirection, Point, Polygon};

use super::parse_number;

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    InComplexStructure,
    InPolygon { points: Vec<Point>, polarity: String },
}

/// What the assembler did with a record.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureEvent {
    /// Not a surface command; the caller should handle it.
    NotHandled,
    /// A surface command that changed state but completed nothing.
    Consumed,
    /// A surface command that closed a polygon.
    Closed(Polygon),
}

/// Surface state machine shared by the feature and profile parsers.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonAssembler {
    state: State,
}

impl Default for PolygonAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PolygonAssembler {
    /// Creates an assembler in the idle state.
    pub const fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Returns `true` between an opening and a closing `SE`, or while a
    /// polygon opened by a bare `S` is still accumulating.
    pub const fn in_structure(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// Returns `true` while a polygon is accumulating points.
    pub const fn in_polygon(&self) -> bool {
        matches!(self.state, State::InPolygon { .. })
    }

    /// Feeds one whitespace-split record.
    ///
    /// # Errors
    ///
    /// Returns [`OdbError::MalformedRecord`] when an `OB`, `OS` or `OC`
    /// record has unparseable coordinates. The state is left unchanged.
    pub fn feed(&mut self, tokens: &[&str]) -> Result<StructureEvent, OdbError> {
        let Some(command) = tokens.first() else {
            return Ok(StructureEvent::NotHandled);
        };
        match *command {
            "SE" => Ok(self.toggle_structure()),
            "S" => Ok(self.open_polygon(tokens.get(1).copied().unwrap_or("P"))),
            "OB" => {
                let point = point_at(tokens, 1)?;
                Ok(self.begin_contour(point))
            }
            "OS" => {
                let point = point_at(tokens, 1)?;
                self.push_points(std::iter::once(point));
                Ok(StructureEvent::Consumed)
            }
            "OC" => {
                let end = point_at(tokens, 1)?;
                let center = point_at(tokens, 3)?;
                let direction = ArcDirection::from_cw_flag(tokens.get(5).copied());
                self.push_curve(end, center, direction);
                Ok(StructureEvent::Consumed)
            }
            "OE" => Ok(self.end_contour()),
            _ => Ok(StructureEvent::NotHandled),
        }
    }

    /// Flushes an open polygon at end of input and returns to idle.
    pub fn finish(&mut self) -> Option<Polygon> {
        let state = std::mem::replace(&mut self.state, State::Idle);
        match state {
            State::InPolygon { points, .. } => close(points),
            State::Idle | State::InComplexStructure => None,
        }
    }

    fn toggle_structure(&mut self) -> StructureEvent {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {
                self.state = State::InComplexStructure;
                StructureEvent::Consumed
            }
            State::InComplexStructure => StructureEvent::Consumed,
            State::InPolygon { points, .. } => completed(close(points)),
        }
    }

    fn open_polygon(&mut self, polarity: &str) -> StructureEvent {
        let previous = std::mem::replace(
            &mut self.state,
            State::InPolygon {
                points: Vec::new(),
                polarity: polarity.to_string(),
            },
        );
        match previous {
            State::InPolygon { points, .. } => completed(close(points)),
            State::Idle | State::InComplexStructure => StructureEvent::Consumed,
        }
    }

    fn begin_contour(&mut self, point: Point) -> StructureEvent {
        match &mut self.state {
            State::Idle => {
                trace!("OB outside a surface ignored");
                StructureEvent::Consumed
            }
            State::InComplexStructure => {
                self.state = State::InPolygon {
                    points: vec![point],
                    polarity: "P".to_string(),
                };
                StructureEvent::Consumed
            }
            State::InPolygon { points, .. } if points.is_empty() => {
                points.push(point);
                StructureEvent::Consumed
            }
            State::InPolygon { points, .. } => {
                let finished = std::mem::replace(points, vec![point]);
                completed(close(finished))
            }
        }
    }

    fn push_points(&mut self, new_points: impl IntoIterator<Item = Point>) {
        if let State::InPolygon { points, .. } = &mut self.state {
            points.extend(new_points);
        } else {
            trace!("contour point outside a polygon ignored");
        }
    }

    fn push_curve(&mut self, end: Point, center: Point, direction: ArcDirection) {
        let State::InPolygon { points, .. } = &mut self.state else {
            trace!("contour curve outside a polygon ignored");
            return;
        };
        match points.last().copied() {
            Some(start) => points.extend(contour_arc(start, end, center, direction)),
            None => points.push(end),
        }
    }

    fn end_contour(&mut self) -> StructureEvent {
        match std::mem::replace(&mut self.state, State::InComplexStructure) {
            State::InPolygon { points, polarity } => {
                trace!(%polarity, points = points.len(), "contour closed");
                completed(close(points))
            }
            State::Idle => {
                self.state = State::Idle;
                StructureEvent::Consumed
            }
            State::InComplexStructure => StructureEvent::Consumed,
        }
    }
}

fn close(points: Vec<Point>) -> Option<Polygon> {
    let count = points.len();
    if count < 3 {
        trace!(count, "polygon with fewer than three points discarded");
        return None;
    }
    let polygon = Polygon::closed(points);
    if polygon.is_none() {
        trace!(count, "degenerate polygon discarded");
    }
    polygon
}

fn completed(polygon: Option<Polygon>) -> StructureEvent {
    polygon.map_or(StructureEvent::Consumed, StructureEvent::Closed)
}

fn point_at(tokens: &[&str], index: usize) -> Result<Point, OdbError> {
    let x = tokens.get(index).copied().unwrap_or_default();
    let y = tokens.get(index + 1).copied().unwrap_or_default();
    Ok(Point::new(parse_number(x)?, parse_number(y)?))
}
