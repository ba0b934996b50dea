//! Greedy joining of undirected outline edges into one ring.

use crate::geometry::{Point, Polygon, POINT_EPSILON};

/// An undirected outline segment taken from an `L` record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// One endpoint.
    pub start: Point,
    /// The other endpoint.
    pub end: Point,
}

impl Edge {
    /// Creates an edge.
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// The endpoint opposite `point`, when `point` touches this edge.
    fn other_end(&self, point: Point) -> Option<Point> {
        if self.start.approx_eq(point, POINT_EPSILON) {
            Some(self.end)
        } else if self.end.approx_eq(point, POINT_EPSILON) {
            Some(self.start)
        } else {
            None
        }
    }
}

/// Result of a stitch.
#[derive(Debug, Clone, PartialEq)]
pub struct Stitched {
    /// The ring, stored open. `None` when fewer than three points chained.
    pub polygon: Option<Polygon>,
    /// Edges that never touched the chain.
    pub leftover: usize,
}

/// Chains edges starting from the first one.
///
/// Each step extends from the last point with the first remaining edge that
/// has an endpoint within [`POINT_EPSILON`] of it, and stops when none does.
/// Disjoint loops are not followed; their edges count as leftovers.
pub fn stitch(edges: &[Edge]) -> Stitched {
    let Some((first, rest)) = edges.split_first() else {
        return Stitched {
            polygon: None,
            leftover: 0,
        };
    };

    let mut remaining = rest.to_vec();
    let mut points = vec![first.start, first.end];
    let mut tail = first.end;

    while let Some((index, next)) = remaining
        .iter()
        .enumerate()
        .find_map(|(index, edge)| edge.other_end(tail).map(|next| (index, next)))
    {
        remaining.remove(index);
        points.push(next);
        tail = next;
    }

    Stitched {
        polygon: Polygon::open_ring(points),
        leftover: remaining.len(),
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn edge(x1: f64, y1: f64, x2: f64, y2: f64) -> Edge {
        Edge::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn ut_stitch_001_shuffled_square_forms_open_ring() {
        let edges = [
            edge(0.0, 0.0, 10.0, 0.0),
            edge(10.0, 10.0, 0.0, 10.0),
            edge(10.0, 0.0, 10.0, 10.0),
            edge(0.0, 10.0, 0.0, 0.0),
        ];
        let stitched = stitch(&edges);
        assert_eq!(stitched.leftover, 0);
        assert!(stitched.polygon.is_some());
        let Some(polygon) = stitched.polygon else {
            return;
        };
        assert_eq!(
            polygon.points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0)
            ]
        );
    }

    #[test]
    fn ut_stitch_002_reversed_edges_and_tolerance() {
        let edges = [
            edge(0.0, 0.0, 5.0, 0.0),
            edge(5.0, 5.0, 5.0005, 0.0),
            edge(0.0, 0.0, 5.0, 5.0),
        ];
        let stitched = stitch(&edges);
        assert_eq!(stitched.leftover, 0);
        assert_eq!(stitched.polygon.map(|p| p.points.len()), Some(3));
    }

    #[test]
    fn ut_stitch_003_disjoint_loop_is_left_over() {
        let edges = [
            edge(0.0, 0.0, 1.0, 0.0),
            edge(1.0, 0.0, 1.0, 1.0),
            edge(1.0, 1.0, 0.0, 0.0),
            edge(5.0, 5.0, 6.0, 5.0),
            edge(6.0, 5.0, 6.0, 6.0),
        ];
        let stitched = stitch(&edges);
        assert_eq!(stitched.leftover, 2);
        assert_eq!(stitched.polygon.map(|p| p.points.len()), Some(3));
    }

    #[test]
    fn bc_stitch_001_too_few_edges() {
        assert_eq!(
            stitch(&[]),
            Stitched {
                polygon: None,
                leftover: 0
            }
        );
        assert!(stitch(&[edge(0.0, 0.0, 1.0, 1.0)]).polygon.is_none());
    }
}
