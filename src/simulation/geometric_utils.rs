//! Planar geometry kernel: segment intersection and polygon overlap tests.
//!
//! Everything here is stateless. Angles follow the road convention used by
//! the rest of the crate: a heading of `0` faces screen-up (negative y) and
//! positive headings turn toward negative x.

use geo::{Coord, Line};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::error::{Error, Result};

/// A point in the plane.
pub type Point = Coord<f32>;

/// A line segment, undirected for intersection purposes.
pub type Segment = Line<f32>;

/// Determinant magnitude below which two segments count as parallel.
pub const EPSILON: f32 = 1e-6;

/// Where two segments cross.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Crossing point.
    pub point: Point,
    /// Parameter along the first segment, in `[0, 1]`.
    pub offset: f32,
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Unit vector pointing along `angle`.
#[inline]
pub fn direction(angle: f32) -> Point {
    Coord {
        x: -angle.sin(),
        y: -angle.cos(),
    }
}

/// Intersects segment `a`–`b` with segment `c`–`d`.
///
/// # Arguments
///
/// * `a`, `b` - Endpoints of the first segment
/// * `c`, `d` - Endpoints of the second segment
///
/// # Returns
///
/// The crossing point and its parameter along `a`–`b`, or `None` when the
/// segments are parallel, degenerate, or cross outside either segment.
pub fn segment_intersect(a: Point, b: Point, c: Point, d: Point) -> Option<Intersection> {
    let r = b - a;
    let s = d - c;
    let det = r.x * s.y - r.y * s.x;
    if det.abs() < EPSILON {
        return None;
    }

    let ac = c - a;
    let t = (ac.x * s.y - ac.y * s.x) / det;
    let u = (ac.x * r.y - ac.y * r.x) / det;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(Intersection {
        point: Coord {
            x: lerp(a.x, b.x, t),
            y: lerp(a.y, b.y, t),
        },
        offset: t,
    })
}

/// [`segment_intersect`] for two [`Segment`] values.
#[inline]
pub fn line_intersect(first: &Segment, second: &Segment) -> Option<Intersection> {
    segment_intersect(first.start, first.end, second.start, second.end)
}

/// Closed polygon given by its vertices in order.
///
/// The last vertex connects back to the first. Self-intersection is not
/// checked; fewer than three vertices makes the polygon degenerate, and a
/// degenerate polygon has no edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon from its vertices.
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Returns the vertices in order.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Whether the polygon has fewer than three vertices.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Iterates over the edges, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = if self.is_degenerate() {
            0
        } else {
            self.vertices.len()
        };
        (0..n).map(move |i| Line::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Reports a degenerate polygon as an error.
    pub fn validate(&self) -> Result<()> {
        if self.is_degenerate() {
            return Err(Error::DegenerateGeometry(format!(
                "polygon has {} vertices, at least 3 required",
                self.vertices.len()
            )));
        }
        Ok(())
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(vertices: Vec<Point>) -> Self {
        Self::new(vertices)
    }
}

/// Reports a zero-length segment as an error.
pub fn validate_segment(segment: &Segment) -> Result<()> {
    let delta = segment.delta();
    if delta.x.abs() < EPSILON && delta.y.abs() < EPSILON {
        return Err(Error::DegenerateGeometry(
            "segment has zero length".to_string(),
        ));
    }
    Ok(())
}

/// Whether any edge of `p` crosses any edge of `q`.
///
/// All edge pairs are tested; a polygon fully contained in the other without
/// crossing edges is not detected. Degenerate polygons never intersect.
pub fn polygons_intersect(p: &Polygon, q: &Polygon) -> bool {
    if p.is_degenerate() || q.is_degenerate() {
        trace!(
            p = p.vertices.len(),
            q = q.vertices.len(),
            "degenerate polygon treated as no intersection"
        );
        return false;
    }

    p.edges()
        .any(|edge| q.edges().any(|other| line_intersect(&edge, &other).is_some()))
}

/// Whether any edge of `polygon` crosses `segment`.
pub fn polygon_segment_intersect(polygon: &Polygon, segment: &Segment) -> bool {
    polygon
        .edges()
        .any(|edge| line_intersect(&edge, segment).is_some())
}

/// Position and heading of an agent, supplied by the vehicle layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Heading in radians.
    pub heading: f32,
}

impl Pose {
    /// Creates a pose.
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self { x, y, heading }
    }

    /// Position as a point.
    pub fn position(&self) -> Point {
        Coord {
            x: self.x,
            y: self.y,
        }
    }

    /// Rectangle occupied by a `width` × `height` body centered on the pose.
    ///
    /// # Returns
    ///
    /// A four-vertex polygon rotated by the heading, front corners first.
    pub fn footprint(&self, width: f32, height: f32) -> Polygon {
        let radius = width.hypot(height) / 2.0;
        let alpha = width.atan2(height);
        let corner = |angle: f32| {
            let d = direction(angle);
            Coord {
                x: self.x + d.x * radius,
                y: self.y + d.y * radius,
            }
        };

        Polygon::new(vec![
            corner(self.heading - alpha),
            corner(self.heading + alpha),
            corner(std::f32::consts::PI + self.heading - alpha),
            corner(std::f32::consts::PI + self.heading + alpha),
        ])
    }
}
