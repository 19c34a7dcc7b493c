//! # Drive Evo - Neuroevolution Core for Simulated Driving
//!
//! The decision-making and collision engine of a driving simulation: cars see
//! the road through a fan of rays, a small feedforward network turns those
//! readings into controls, and a generational optimizer improves the networks
//! without labeled data.
//!
//! ## Features
//!
//! - Segment intersection and polygon overlap tests
//! - Ray-casting sensor producing ordered, normalized readings
//! - Feedforward network with binary step activation
//! - Elitism plus decaying mutation, no crossover
//! - Seedable random source for reproducible runs
//! - JSON persistence of champion networks and parameters
//!
//! ## Core Modules
//!
//! - [`simulation::geometric_utils`] - Geometry kernel
//! - [`simulation::perception`] - Ray-casting sensor
//! - [`simulation::brain`] - Feedforward network
//! - [`simulation::evolution`] - Ranking, elitism and mutation
//! - [`simulation::fleet`] - Tick and generation driver
//!
//! Vehicle physics, world generation and rendering belong to the caller.

/// Core simulation logic and data structures.
pub mod simulation {
    /// Feedforward network used as an agent's brain.
    pub mod brain;
    /// Collision detection against borders and obstacles.
    pub mod collision;
    /// Control decisions and controller variants.
    pub mod controls;
    /// Error type shared by the simulation core.
    pub mod error;
    /// Selection and mutation between generations.
    pub mod evolution;
    /// Tick and generation driver for learning agents.
    pub mod fleet;
    /// Geometry kernel: points, segments, polygons and poses.
    pub mod geometric_utils;
    /// Simulation parameters.
    pub mod params;
    /// Ray-casting perception.
    pub mod perception;
    /// Per-generation fitness statistics.
    pub mod stats;
}

pub use simulation::error::{Error, Result};
