//! XML layer files.
//!
//! Elements are matched by local name anywhere in the document:
//!
//! | element | attributes | primitive |
//! |---|---|---|
//! | `line` | `x1 y1 x2 y2 [width]` | line |
//! | `circle` | `cx cy r` | circle |
//! | `rect` | `x y width height` | polygon centered on `x y` |
//! | `polygon` | `points="x,y x,y …"` | polygon |
//! | `path` | `d` with `M L H V Z` (either case) | one polygon per subpath |
//! | `text` | `x y [size]`, text content | text label |
//!
//! A bad element is reported with its line and skipped.

use roxmltree::{Document, Node};
use tracing::{debug, trace};

use crate::error::{Diagnostic, OdbError};
use crate::features::parser::DEFAULT_LINE_WIDTH;
use crate::features::{parse_number, FeatureParse};
use crate::geometry::{rect_polygon, Circle, Line, Point, Polygon, TextLabel};
use crate::layer::Layer;

/// Size of an XML text without `size` or `font-size`.
pub const DEFAULT_XML_TEXT_SIZE: f64 = 10.0;

/// Parses an XML layer document and appends its primitives to `layer`.
pub fn parse_xml_features(text: &str, layer: &mut Layer) -> FeatureParse {
    let before = layer.primitive_count();
    let mut diagnostics = Vec::new();

    let document = match Document::parse(text) {
        Ok(document) => document,
        Err(err) => {
            diagnostics.push(Diagnostic::from_error(
                &OdbError::MalformedRecord(format!("invalid XML layer: {err}")),
                usize::try_from(err.pos().row).ok(),
            ));
            return FeatureParse {
                diagnostics,
                ..FeatureParse::default()
            };
        }
    };

    for node in document.descendants().filter(Node::is_element) {
        if let Err(err) = parse_element(node, layer) {
            let row = document.text_pos_at(node.range().start).row;
            diagnostics.push(Diagnostic::from_error(&err, usize::try_from(row).ok()));
        }
    }

    let primitives = layer.primitive_count().saturating_sub(before);
    debug!(layer = %layer.name, primitives, diagnostics = diagnostics.len(), "parsed XML layer");
    FeatureParse {
        primitives,
        diagnostics,
        ..FeatureParse::default()
    }
}

fn parse_element(node: Node<'_, '_>, layer: &mut Layer) -> Result<(), OdbError> {
    match node.tag_name().name().to_ascii_lowercase().as_str() {
        "line" => {
            layer.lines.push(Line {
                start: Point::new(number(node, "x1")?, number(node, "y1")?),
                end: Point::new(number(node, "x2")?, number(node, "y2")?),
                width: optional_number(node, "width")?.unwrap_or(DEFAULT_LINE_WIDTH),
            });
        }
        "circle" => {
            layer.circles.push(Circle {
                center: Point::new(number(node, "cx")?, number(node, "cy")?),
                radius: number(node, "r")?,
            });
        }
        "rect" => {
            let center = Point::new(number(node, "x")?, number(node, "y")?);
            let (width, height) = (number(node, "width")?, number(node, "height")?);
            let polygon = rect_polygon(center, width, height, 0.0)
                .ok_or_else(|| OdbError::MalformedRecord(format!("<rect> {width}x{height} has no area")))?;
            layer.polygons.push(polygon);
        }
        "polygon" => {
            let points = point_list(attribute(node, "points")?)?;
            let polygon = Polygon::closed(points)
                .ok_or_else(|| OdbError::MalformedRecord("<polygon> has fewer than three points".to_string()))?;
            layer.polygons.push(polygon);
        }
        "path" => {
            for subpath in path_subpaths(attribute(node, "d")?)? {
                match Polygon::closed(subpath) {
                    Some(polygon) => layer.polygons.push(polygon),
                    None => trace!("subpath with fewer than three points discarded"),
                }
            }
        }
        "text" => {
            let size = match optional_number(node, "size")? {
                Some(size) => Some(size),
                None => optional_number(node, "font-size")?,
            };
            layer.texts.push(TextLabel {
                position: Point::new(number(node, "x")?, number(node, "y")?),
                content: node.text().unwrap_or_default().trim().to_string(),
                size: size.unwrap_or(DEFAULT_XML_TEXT_SIZE),
            });
        }
        _ => {}
    }
    Ok(())
}

fn attribute<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str, OdbError> {
    node.attribute(name).ok_or_else(|| {
        OdbError::MalformedRecord(format!("<{}> has no `{name}` attribute", node.tag_name().name()))
    })
}

fn number(node: Node<'_, '_>, name: &str) -> Result<f64, OdbError> {
    parse_number(attribute(node, name)?)
}

fn optional_number(node: Node<'_, '_>, name: &str) -> Result<Option<f64>, OdbError> {
    node.attribute(name).map(parse_number).transpose()
}

/// `x,y x,y …`; commas and whitespace both separate values.
fn point_list(text: &str) -> Result<Vec<Point>, OdbError> {
    let values = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(parse_number)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(values
        .chunks_exact(2)
        .filter_map(|pair| match pair {
            [x, y] => Some(Point::new(*x, *y)),
            _ => None,
        })
        .collect())
}

/// Straight-segment subpaths of SVG path data. Curve and arc commands are
/// skipped.
fn path_subpaths(data: &str) -> Result<Vec<Vec<Point>>, OdbError> {
    let mut subpaths = Vec::new();
    let mut points: Vec<Point> = Vec::new();
    let mut current = Point::new(0.0, 0.0);

    for (command, args) in path_commands(data) {
        let values = args.iter().map(|arg| parse_number(arg)).collect::<Result<Vec<_>, _>>()?;
        let relative = command.is_ascii_lowercase();
        match command.to_ascii_uppercase() {
            'M' | 'L' => {
                if command.eq_ignore_ascii_case(&'M') && !points.is_empty() {
                    subpaths.push(std::mem::take(&mut points));
                }
                for pair in values.chunks_exact(2) {
                    if let [x, y] = pair {
                        current = if relative {
                            Point::new(current.x + x, current.y + y)
                        } else {
                            Point::new(*x, *y)
                        };
                        points.push(current);
                    }
                }
            }
            'H' => {
                for x in values {
                    current.x = if relative { current.x + x } else { x };
                    points.push(current);
                }
            }
            'V' => {
                for y in values {
                    current.y = if relative { current.y + y } else { y };
                    points.push(current);
                }
            }
            'Z' => {
                if let Some(start) = points.first().copied() {
                    current = start;
                    subpaths.push(std::mem::take(&mut points));
                }
            }
            _ => trace!(%command, "curve path command skipped"),
        }
    }
    if !points.is_empty() {
        subpaths.push(points);
    }
    Ok(subpaths)
}

/// Splits path data into commands and their argument tokens.
fn path_commands(data: &str) -> Vec<(char, Vec<String>)> {
    let mut commands: Vec<(char, Vec<String>)> = Vec::new();
    let mut token = String::new();
    let mut previous = ' ';

    for c in data.chars() {
        let is_command = c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E');
        let is_separator = c == ',' || c.is_whitespace();
        let splits_number = c == '-' && !token.is_empty() && !matches!(previous, 'e' | 'E');
        if is_command || is_separator || splits_number {
            if let Some((_, args)) = commands.last_mut() {
                if !token.is_empty() {
                    args.push(std::mem::take(&mut token));
                }
            }
            token.clear();
        }
        if is_command {
            commands.push((c, Vec::new()));
        } else if !is_separator {
            token.push(c);
        }
        previous = c;
    }
    if let Some((_, args)) = commands.last_mut() {
        if !token.is_empty() {
            args.push(token);
        }
    }
    commands
}
