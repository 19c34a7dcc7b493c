//! Collision detection between a vehicle footprint and the scene.

use super::geometric_utils::{Polygon, Segment, polygon_segment_intersect, polygons_intersect};

/// Geometry an agent can see and crash into during one tick.
///
/// Supplied fresh by the world layer every tick and never cached.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Road borders.
    pub borders: Vec<Segment>,
    /// Traffic, obstacles and pedestrians as closed polygons.
    pub obstacles: Vec<Polygon>,
}

impl Scene {
    /// Creates a scene from borders and obstacle outlines.
    pub fn new(borders: Vec<Segment>, obstacles: Vec<Polygon>) -> Self {
        Self { borders, obstacles }
    }
}

/// Whether `footprint` touches a border or overlaps an obstacle.
///
/// Degenerate borders and polygons never count as a hit.
pub fn is_damaged(footprint: &Polygon, scene: &Scene) -> bool {
    scene
        .borders
        .iter()
        .any(|border| polygon_segment_intersect(footprint, border))
        || scene
            .obstacles
            .iter()
            .any(|obstacle| polygons_intersect(footprint, obstacle))
}
