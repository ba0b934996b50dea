//! Board outline ("profile") extraction.
//!
//! Profile files come in several dialects. All of them are read in one pass:
//!
//! - surfaces (`SE`/`S`/`OB`/`OS`/`OC`/`OE`), assembled exactly as in a
//!   feature file;
//! - direct polygons: a `P` or `OB` line outside a surface followed by
//!   numeric continuation lines, ended by `;` or by the next non-numeric
//!   line;
//! - coordinate pairs on one line: `(0,0) (10,0) (10,5)`;
//! - loose `L` segments, stitched into a ring only when nothing else
//!   produced an outline;
//! - as a last resort, every adjacent pair of numbers in the file, read as
//!   one `x y` ring.
//!
//! When no outline is recovered the board falls back to a
//! [`DEFAULT_PROFILE_WIDTH`] × [`DEFAULT_PROFILE_HEIGHT`] rectangle.

pub mod stitch;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Diagnostic, OdbError};
use crate::features::{parse_number, PolygonAssembler, StructureEvent};
use crate::geometry::{BoundingBox, Point, Polygon};

use stitch::{stitch, Edge};

/// Width of the fallback board outline.
pub const DEFAULT_PROFILE_WIDTH: f64 = 300.0;
/// Height of the fallback board outline.
pub const DEFAULT_PROFILE_HEIGHT: f64 = 200.0;

const MIN_COORDINATE_PAIRS: usize = 3;
const MIN_LOOSE_PAIRS: usize = 6;

/// The board outline and its extent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardProfile {
    /// Outline rings.
    ///
    /// Surface and direct `P`/`OB` polygons are closed like feature
    /// polygons: the last point repeats the first. Stitched rings and
    /// coordinate-pair rings are stored open, without the closing point.
    pub outline: Vec<Polygon>,
    /// Lower-left corner of every parsed profile point.
    pub min: Point,
    /// Upper-right corner of every parsed profile point.
    pub max: Point,
    /// `max.x - min.x`.
    pub width: f64,
    /// `max.y - min.y`.
    pub height: f64,
}

impl BoardProfile {
    /// The fallback 300 × 200 rectangle anchored at the origin.
    pub fn default_profile() -> Self {
        let corners = vec![
            Point::new(0.0, 0.0),
            Point::new(DEFAULT_PROFILE_WIDTH, 0.0),
            Point::new(DEFAULT_PROFILE_WIDTH, DEFAULT_PROFILE_HEIGHT),
            Point::new(0.0, DEFAULT_PROFILE_HEIGHT),
        ];
        Self::from_parts(
            vec![Polygon { points: corners }],
            BoundingBox::from_corners(
                Point::new(0.0, 0.0),
                Point::new(DEFAULT_PROFILE_WIDTH, DEFAULT_PROFILE_HEIGHT),
            ),
        )
    }

    fn from_parts(outline: Vec<Polygon>, bounds: BoundingBox) -> Self {
        Self {
            outline,
            min: bounds.min(),
            max: bounds.max(),
            width: bounds.width(),
            height: bounds.height(),
        }
    }

    /// The extent as a bounding box.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_corners(self.min, self.max)
    }
}

impl Default for BoardProfile {
    fn default() -> Self {
        Self::default_profile()
    }
}

/// Result of parsing one profile file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileParse {
    /// The recovered outline, or the fallback rectangle.
    pub profile: BoardProfile,
    /// `true` when the outline came from the file rather than the fallback.
    pub recovered: bool,
    /// Problems met along the way.
    pub diagnostics: Vec<Diagnostic>,
}

struct Extractor {
    assembler: PolygonAssembler,
    direct: Option<Vec<Point>>,
    outline: Vec<Polygon>,
    edges: Vec<Edge>,
    bounds: BoundingBox,
    diagnostics: Vec<Diagnostic>,
    line: usize,
}

impl Extractor {
    const fn new() -> Self {
        Self {
            assembler: PolygonAssembler::new(),
            direct: None,
            outline: Vec::new(),
            edges: Vec::new(),
            bounds: BoundingBox::new(),
            diagnostics: Vec::new(),
            line: 0,
        }
    }

    fn record(&mut self, error: &OdbError) {
        self.diagnostics.push(Diagnostic::from_error(error, Some(self.line)));
    }

    fn process(&mut self, line: &str) {
        if self.direct.is_some() {
            if line == ";" || is_numeric_row(line) {
                self.extend_direct(line);
                return;
            }
            self.close_direct();
        }

        if line.starts_with('$') {
            return;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let command = tokens.first().copied().unwrap_or_default();

        if command == "P" || (command == "OB" && !self.assembler.in_structure()) {
            self.direct = Some(Vec::new());
            self.extend_direct(line.get(command.len()..).unwrap_or_default());
            return;
        }

        match self.assembler.feed(&tokens) {
            Ok(StructureEvent::Closed(polygon)) => self.push_closed(polygon.points),
            Ok(StructureEvent::Consumed) => {}
            Ok(StructureEvent::NotHandled) => self.process_loose(command, &tokens, line),
            Err(err) => self.record(&err),
        }
    }

    fn process_loose(&mut self, command: &str, tokens: &[&str], line: &str) {
        if command == "L" {
            match edge_from(tokens) {
                Ok(edge) => {
                    self.bounds.include(edge.start);
                    self.bounds.include(edge.end);
                    self.edges.push(edge);
                }
                Err(err) => self.record(&err),
            }
            return;
        }

        let pairs = coordinate_pairs(line);
        if pairs.len() >= MIN_COORDINATE_PAIRS {
            self.push_ring(pairs);
        } else {
            trace!(line = self.line, "profile line ignored");
        }
    }

    fn extend_direct(&mut self, row: &str) {
        let Some(points) = self.direct.as_mut() else {
            return;
        };
        let body = row.trim().trim_end_matches(';');
        let tokens: Vec<&str> = body.split_whitespace().collect();
        for pair in tokens.chunks_exact(2) {
            if let [x, y] = pair {
                if let (Ok(x), Ok(y)) = (parse_number(x), parse_number(y)) {
                    let point = Point::new(x, y);
                    self.bounds.include(point);
                    points.push(point);
                }
            }
        }
        if row.trim_end().ends_with(';') {
            self.close_direct();
        }
    }

    fn close_direct(&mut self) {
        if let Some(points) = self.direct.take() {
            self.push_closed(points);
        }
    }

    fn push_closed(&mut self, points: Vec<Point>) {
        for point in &points {
            self.bounds.include(*point);
        }
        let count = points.len();
        match Polygon::closed(points) {
            Some(polygon) => self.outline.push(polygon),
            None => trace!(line = self.line, count, "outline with fewer than three points discarded"),
        }
    }

    fn push_ring(&mut self, points: Vec<Point>) {
        for point in &points {
            self.bounds.include(*point);
        }
        match Polygon::open_ring(points) {
            Some(ring) => self.outline.push(ring),
            None => trace!(line = self.line, "outline with fewer than three points discarded"),
        }
    }

    fn finish(mut self, text: &str) -> ProfileParse {
        self.close_direct();
        if let Some(polygon) = self.assembler.finish() {
            self.push_closed(polygon.points);
        }

        if self.outline.is_empty() && !self.edges.is_empty() {
            let stitched = stitch(&self.edges);
            if stitched.leftover > 0 {
                self.diagnostics.push(Diagnostic::from_error(
                    &OdbError::MalformedRecord(format!(
                        "{} outline segment(s) not connected to the stitched ring",
                        stitched.leftover
                    )),
                    None,
                ));
            }
            if let Some(ring) = stitched.polygon {
                self.outline.push(ring);
            }
        }

        if self.outline.is_empty() {
            let pairs = loose_pairs(text);
            if pairs.len() >= MIN_LOOSE_PAIRS {
                debug!(pairs = pairs.len(), "outline read from loose coordinate pairs");
                self.push_ring(pairs);
            }
        }

        if self.outline.is_empty() || self.bounds.is_empty() {
            self.diagnostics.push(Diagnostic::from_error(
                &OdbError::EmptyResult(format!(
                    "no outline in profile; using {DEFAULT_PROFILE_WIDTH}x{DEFAULT_PROFILE_HEIGHT} default"
                )),
                None,
            ));
            return ProfileParse {
                profile: BoardProfile::default_profile(),
                recovered: false,
                diagnostics: self.diagnostics,
            };
        }

        ProfileParse {
            profile: BoardProfile::from_parts(self.outline, self.bounds),
            recovered: true,
            diagnostics: self.diagnostics,
        }
    }
}

/// Parses a profile file into a board outline.
///
/// Never fails: unusable input yields the default outline plus an
/// [`OdbError::EmptyResult`] diagnostic.
pub fn parse_profile(text: &str) -> ProfileParse {
    let mut extractor = Extractor::new();
    for (index, raw) in text.lines().enumerate() {
        extractor.line = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        extractor.process(line);
    }

    let parse = extractor.finish(text);
    debug!(
        polygons = parse.profile.outline.len(),
        width = parse.profile.width,
        height = parse.profile.height,
        recovered = parse.recovered,
        "profile parsed"
    );
    parse
}

/// `true` when every token (ignoring a trailing `;`) is a number.
fn is_numeric_row(line: &str) -> bool {
    let mut tokens = line.trim_end_matches(';').split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|token| parse_number(token).is_ok())
}

fn edge_from(tokens: &[&str]) -> Result<Edge, OdbError> {
    let number = |index: usize| {
        tokens
            .get(index)
            .ok_or_else(|| OdbError::MalformedRecord(format!("`L` needs 4 coordinates, got {}", tokens.len() - 1)))
            .and_then(|token| parse_number(token))
    };
    Ok(Edge::new(
        Point::new(number(1)?, number(2)?),
        Point::new(number(3)?, number(4)?),
    ))
}

/// Adjacent numeric tokens across the whole text, paired left to right.
/// A non-numeric token breaks a pair.
fn loose_pairs(text: &str) -> Vec<Point> {
    let mut points = Vec::new();
    let mut pending = None;
    for token in text.split_whitespace() {
        match (parse_number(token.trim_end_matches(';')).ok(), pending.take()) {
            (Some(y), Some(x)) => points.push(Point::new(x, y)),
            (Some(x), None) => pending = Some(x),
            (None, _) => {}
        }
    }
    points
}

/// Every `(x,y)` group on the line, in order.
fn coordinate_pairs(line: &str) -> Vec<Point> {
    line.split('(')
        .skip(1)
        .filter_map(|chunk| {
            let (inner, _) = chunk.split_once(')')?;
            let (x, y) = inner.split_once(',')?;
            Some(Point::new(parse_number(x).ok()?, parse_number(y).ok()?))
        })
        .collect()
}
