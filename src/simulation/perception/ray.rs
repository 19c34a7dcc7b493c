//! A single sensor ray and its nearest-hit cast.

use geo::{Coord, Line};

use super::super::geometric_utils::{Point, Polygon, Segment, direction, line_intersect};

/// Nearest hit along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Normalized distance to the hit, `0` at the origin and `1` at full length.
    pub offset: f32,
    /// Where the ray hit.
    pub point: Point,
}

/// A ray cast from an origin along an angle, up to a maximum length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start of the ray.
    pub origin: Point,
    /// Direction in radians, same convention as a pose heading.
    pub angle: f32,
    /// Maximum reach.
    pub length: f32,
}

impl Ray {
    /// Creates a ray.
    pub fn new(origin: Point, angle: f32, length: f32) -> Self {
        Self {
            origin,
            angle,
            length,
        }
    }

    /// Far end of the ray.
    pub fn end(&self) -> Point {
        let d = direction(self.angle);
        Coord {
            x: self.origin.x + d.x * self.length,
            y: self.origin.y + d.y * self.length,
        }
    }

    /// The ray as a segment from origin to end.
    pub fn segment(&self) -> Segment {
        Line::new(self.origin, self.end())
    }

    /// Casts the ray against borders and obstacle edges.
    ///
    /// # Returns
    ///
    /// The hit with the smallest offset, or `None` if nothing is in range.
    pub fn cast(&self, borders: &[Segment], obstacles: &[Polygon]) -> Option<SensorReading> {
        let ray = self.segment();

        borders
            .iter()
            .copied()
            .chain(obstacles.iter().flat_map(Polygon::edges))
            .filter_map(|segment| line_intersect(&ray, &segment))
            .min_by(|a, b| a.offset.total_cmp(&b.offset))
            .map(|hit| SensorReading {
                offset: hit.offset,
                point: hit.point,
            })
    }
}
