//! Control decisions and the agents that make them.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::brain::Network;
use super::collision::Scene;
use super::error::{Error, Result};
use super::geometric_utils::Pose;
use super::perception::Sensor;

/// Driving controls for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    /// Accelerate.
    pub forward: bool,
    /// Steer left.
    pub left: bool,
    /// Steer right.
    pub right: bool,
    /// Brake or reverse.
    pub reverse: bool,
}

impl Controls {
    /// Controls that only accelerate.
    pub fn forward_only() -> Self {
        Self {
            forward: true,
            ..Self::default()
        }
    }

    /// Decodes network outputs in `[forward, left, right, reverse]` order.
    ///
    /// An output counts as pressed only when it equals `1`, which is what the
    /// step activation emits. Missing outputs stay released.
    pub fn from_outputs(outputs: &Array1<f32>) -> Self {
        #[allow(clippy::float_cmp)]
        let pressed = |i: usize| outputs.get(i).is_some_and(|&v| v == 1.0);
        Self {
            forward: pressed(0),
            left: pressed(1),
            right: pressed(2),
            reverse: pressed(3),
        }
    }
}

/// Who decides an agent's controls.
///
/// Perception and inference only run for [`Controller::Learned`].
#[derive(Debug, Clone)]
pub enum Controller {
    /// Controls come from an operator each tick.
    Manual,
    /// Fixed controls, e.g. background traffic that always drives forward.
    Scripted(Controls),
    /// Controls come from a sensor feeding a network.
    Learned {
        /// Ray fan fitted to the agent.
        sensor: Sensor,
        /// The agent's brain.
        network: Network,
    },
}

impl Controller {
    /// Creates a learning controller, checking that the sensor feeds the network.
    pub fn learned(sensor: Sensor, network: Network) -> Result<Self> {
        if sensor.ray_count() != network.input_count() {
            return Err(Error::DimensionMismatch {
                expected: network.input_count(),
                actual: sensor.ray_count(),
            });
        }
        Ok(Controller::Learned { sensor, network })
    }

    /// Decides the controls for this tick.
    ///
    /// # Arguments
    ///
    /// * `scene` - Borders and obstacles visible this tick
    /// * `pose` - Agent pose from the vehicle layer
    /// * `manual` - Operator input, used only by [`Controller::Manual`]
    pub fn decide(&mut self, scene: &Scene, pose: &Pose, manual: Controls) -> Result<Controls> {
        match self {
            Controller::Manual => Ok(manual),
            Controller::Scripted(controls) => Ok(*controls),
            Controller::Learned { sensor, network } => {
                sensor.update(&scene.borders, &scene.obstacles, pose);
                let outputs = network.feed_forward(&sensor.inputs())?;
                Ok(Controls::from_outputs(&outputs))
            }
        }
    }

    /// The network, for learning controllers.
    pub fn network(&self) -> Option<&Network> {
        match self {
            Controller::Learned { network, .. } => Some(network),
            _ => None,
        }
    }

    /// The sensor, for learning controllers.
    pub fn sensor(&self) -> Option<&Sensor> {
        match self {
            Controller::Learned { sensor, .. } => Some(sensor),
            _ => None,
        }
    }

    /// Clears the sensor of a learning controller; other variants have none.
    pub fn clear_sensor(&mut self) {
        if let Controller::Learned { sensor, .. } = self {
            sensor.clear();
        }
    }

    /// Swaps in a new network, returning the old one.
    pub fn replace_network(&mut self, replacement: Network) -> Result<Network> {
        match self {
            Controller::Learned { network, .. } => Ok(std::mem::replace(network, replacement)),
            _ => Err(Error::InvalidState("controller has no network")),
        }
    }
}
