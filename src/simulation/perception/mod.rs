//! Ray-casting perception: turns scene geometry into ordered sensor readings.

mod ray;
mod sensor;

pub use ray::{Ray, SensorReading};
pub use sensor::Sensor;
