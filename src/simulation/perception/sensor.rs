//! Fan of rays centered on an agent's heading.

use ndarray::Array1;

use super::super::error::{Error, Result};
use super::super::geometric_utils::{Polygon, Pose, Segment, lerp};
use super::super::params::SensorParams;
use super::ray::{Ray, SensorReading};

/// Ranged sensor casting `ray_count` rays spread over `ray_spread` radians.
///
/// Reading `i` always belongs to ray `i`; ray `0` sits at `+spread / 2`
/// relative to the heading and the last ray at `-spread / 2`. The network
/// consumes the readings positionally, so this order is part of the contract.
#[derive(Debug, Clone)]
pub struct Sensor {
    ray_count: usize,
    ray_spread: f32,
    ray_length: f32,
    rays: Vec<Ray>,
    readings: Vec<Option<SensorReading>>,
}

impl Sensor {
    /// Creates a sensor.
    ///
    /// # Arguments
    ///
    /// * `ray_count` - Number of rays, at least one
    /// * `ray_spread` - Total field of view in radians
    /// * `ray_length` - Maximum ray length, strictly positive
    pub fn new(ray_count: usize, ray_spread: f32, ray_length: f32) -> Result<Self> {
        if ray_count == 0 {
            return Err(Error::Configuration(
                "sensor needs at least one ray".to_string(),
            ));
        }
        if !ray_spread.is_finite() {
            return Err(Error::Configuration(format!(
                "ray spread must be finite, got {ray_spread}"
            )));
        }
        if !(ray_length.is_finite() && ray_length > 0.0) {
            return Err(Error::Configuration(format!(
                "ray length must be positive, got {ray_length}"
            )));
        }

        Ok(Self {
            ray_count,
            ray_spread,
            ray_length,
            rays: Vec::with_capacity(ray_count),
            readings: vec![None; ray_count],
        })
    }

    /// Creates a sensor from its configuration block.
    pub fn from_params(params: &SensorParams) -> Result<Self> {
        Self::new(params.ray_count, params.ray_spread, params.ray_length)
    }

    /// Number of rays, and so the number of network inputs.
    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    /// Maximum length of each ray.
    pub fn ray_length(&self) -> f32 {
        self.ray_length
    }

    fn ray_angle(&self, index: usize, heading: f32) -> f32 {
        let t = if self.ray_count == 1 {
            0.5
        } else {
            index as f32 / (self.ray_count - 1) as f32
        };
        heading + lerp(self.ray_spread / 2.0, -self.ray_spread / 2.0, t)
    }

    /// Recasts every ray from `pose`.
    ///
    /// # Returns
    ///
    /// One reading per ray, in ray order.
    pub fn update(
        &mut self,
        borders: &[Segment],
        obstacles: &[Polygon],
        pose: &Pose,
    ) -> &[Option<SensorReading>] {
        let origin = pose.position();
        self.rays = (0..self.ray_count)
            .map(|i| Ray::new(origin, self.ray_angle(i, pose.heading), self.ray_length))
            .collect();
        self.readings = self
            .rays
            .iter()
            .map(|ray| ray.cast(borders, obstacles))
            .collect();

        &self.readings
    }

    /// Drops the rays and readings of the last update.
    pub fn clear(&mut self) {
        self.rays.clear();
        self.readings.fill(None);
    }

    /// Rays cast by the last update.
    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    /// Readings from the last update.
    pub fn readings(&self) -> &[Option<SensorReading>] {
        &self.readings
    }

    /// Network inputs for the last update.
    ///
    /// A hit becomes `1 - offset`, so nearer obstacles give larger values;
    /// an empty ray gives `0`.
    pub fn inputs(&self) -> Array1<f32> {
        self.readings
            .iter()
            .map(|reading| reading.map_or(0.0, |r| 1.0 - r.offset))
            .collect()
    }
}
