//! SVG backend for a [`Projection`].

use std::fmt::{self, Write};

use crate::geometry::Point;

use super::{DrawCommand, Projection};

/// Renders a projection as a standalone SVG document.
pub fn to_svg(projection: &Projection) -> String {
    let mut out = String::new();
    // fmt::Write for String never returns an error.
    let _ = write_svg(&mut out, projection);
    out
}

/// Writes a projection as SVG into any [`fmt::Write`] sink.
///
/// # Errors
///
/// Propagates errors from the sink.
pub fn write_svg(out: &mut impl Write, projection: &Projection) -> fmt::Result {
    let width = num(projection.width);
    let height = num(projection.height);
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )?;

    if !projection.outline.is_empty() {
        writeln!(out, r#"<g data-type="board-outline" fill="none" stroke-width="1">"#)?;
        for command in &projection.outline {
            if let DrawCommand::DrawPolygon { points, color } = command {
                writeln!(
                    out,
                    r#"<polygon points="{}" stroke="{}"/>"#,
                    point_list(points),
                    escape(color)
                )?;
            }
        }
        writeln!(out, "</g>")?;
    }

    writeln!(out, r#"<g data-type="layers">"#)?;
    for command in &projection.commands {
        write_command(out, command)?;
    }
    writeln!(out, "</g>")?;
    writeln!(out, "</svg>")
}

fn write_command(out: &mut impl Write, command: &DrawCommand) -> fmt::Result {
    match command {
        DrawCommand::DrawLine {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        } => writeln!(
            out,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-linecap="round"/>"#,
            num(*x1),
            num(*y1),
            num(*x2),
            num(*y2),
            escape(color),
            num(*width)
        ),
        DrawCommand::DrawCircle { cx, cy, r, color } => writeln!(
            out,
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
            num(*cx),
            num(*cy),
            num(*r),
            escape(color)
        ),
        DrawCommand::DrawPolygon { points, color } => writeln!(
            out,
            r#"<polygon points="{}" fill="{}"/>"#,
            point_list(points),
            escape(color)
        ),
        DrawCommand::DrawText {
            x,
            y,
            size,
            content,
            color,
        } => writeln!(
            out,
            r#"<text x="{}" y="{}" font-size="{}" fill="{}">{}</text>"#,
            num(*x),
            num(*y),
            num(*size),
            escape(color),
            escape(content)
        ),
    }
}

fn point_list(points: &[Point]) -> String {
    let mut list = String::new();
    for (index, point) in points.iter().enumerate() {
        if index > 0 {
            list.push(' ');
        }
        let _ = write!(list, "{},{}", num(point.x), num(point.y));
    }
    list
}

/// Shortest round-trip form, three decimals at most, no `-0`.
fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.abs() < f64::EPSILON || !rounded.is_finite() {
        return "0".to_string();
    }
    let mut buf = ryu::Buffer::new();
    let text = buf.format_finite(rounded);
    text.strip_suffix(".0").unwrap_or(text).to_string()
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
