//! Tick-driven driver for a generation of learning agents.
//!
//! A fleet runs its agents until every one of them has crashed or been
//! terminated by the caller, then evaluates the generation and swaps every
//! network at once:
//!
//! ```text
//! Running(n) --all terminated--> Evaluating --evolve--> Running(n + 1)
//! ```

use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::info;

use super::brain::Network;
use super::collision::{Scene, is_damaged};
use super::controls::{Controller, Controls};
use super::error::{Error, Result};
use super::evolution::{self, AgentId, Population};
use super::geometric_utils::Pose;
use super::params::Params;
use super::perception::Sensor;
use super::stats::{GenerationHistory, GenerationSummary};

/// Where the fleet is in its generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Agents are driving and accumulating fitness.
    Running,
    /// Every agent has stopped; the generation awaits [`Fleet::evolve`].
    Evaluating,
}

/// A learning agent and its episode state.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    controller: Controller,
    fitness: f32,
    terminated: bool,
}

impl Agent {
    /// Handle of this agent.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The agent's controller.
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// The agent's network.
    pub fn network(&self) -> Option<&Network> {
        self.controller.network()
    }

    /// The agent's sensor, holding the readings of the last tick.
    ///
    /// A terminated agent no longer senses, so its readings are all `None`.
    pub fn sensor(&self) -> Option<&Sensor> {
        self.controller.sensor()
    }

    /// Fitness accumulated this generation.
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Whether the agent has stopped for this generation.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

/// A generation of learning agents plus the state needed to evolve it.
#[derive(Debug)]
pub struct Fleet {
    params: Params,
    agents: Vec<Agent>,
    generation: u32,
    phase: Phase,
    rng: StdRng,
    history: GenerationHistory,
    champion: Option<Network>,
}

impl Fleet {
    /// Creates a fleet of random networks, seeded from [`Params::seed`].
    pub fn new(params: Params) -> Result<Self> {
        let rng = params.rng();
        Self::with_rng(params, rng)
    }

    /// Creates a fleet of random networks drawing from `rng`.
    pub fn with_rng(params: Params, mut rng: StdRng) -> Result<Self> {
        params.validate()?;
        let population = Population::random(
            params.population_size,
            &params.topology(),
            params.weight_scale,
            &mut rng,
        )?;
        Self::from_population(params, population, rng)
    }

    /// Creates a fleet seeded from a saved champion.
    ///
    /// Agent `0` drives the champion itself; the others drive mutated copies.
    pub fn from_champion(params: Params, champion: &Network, mut rng: StdRng) -> Result<Self> {
        params.validate()?;
        let population = Population::from_champion(
            champion,
            params.population_size,
            params.evolution.champion_mutation_rate,
            &mut rng,
        )?;
        Self::from_population(params, population, rng)
    }

    fn from_population(params: Params, population: Population, rng: StdRng) -> Result<Self> {
        let agents = population
            .into_members()
            .into_iter()
            .enumerate()
            .map(|(i, member)| -> Result<Agent> {
                let sensor = Sensor::from_params(&params.sensor)?;
                Ok(Agent {
                    id: AgentId(i),
                    controller: Controller::learned(sensor, member.network)?,
                    fitness: 0.0,
                    terminated: false,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(agents = agents.len(), topology = ?params.topology(), "fleet ready");
        Ok(Self {
            params,
            agents,
            generation: 1,
            phase: Phase::Running,
            rng,
            history: GenerationHistory::default(),
            champion: None,
        })
    }

    /// Runs perception, collision and inference for every live agent.
    ///
    /// An agent whose footprint touches the scene is terminated and returns
    /// released controls, as do agents that were already terminated. Once no
    /// agent is left running the fleet moves to [`Phase::Evaluating`].
    ///
    /// # Arguments
    ///
    /// * `scene` - Borders and obstacles for this tick
    /// * `poses` - One pose per agent, in agent order
    pub fn tick(&mut self, scene: &Scene, poses: &[Pose]) -> Result<Vec<Controls>> {
        if self.phase == Phase::Evaluating {
            return Err(Error::InvalidState("generation is awaiting evolution"));
        }
        if poses.len() != self.agents.len() {
            return Err(Error::DimensionMismatch {
                expected: self.agents.len(),
                actual: poses.len(),
            });
        }

        let (width, height) = (self.params.body_width, self.params.body_height);
        let controls = self
            .agents
            .par_iter_mut()
            .zip(poses.par_iter())
            .map(|(agent, pose)| {
                if agent.terminated {
                    return Ok(Controls::default());
                }
                if is_damaged(&pose.footprint(width, height), scene) {
                    agent.terminated = true;
                    agent.controller.clear_sensor();
                    return Ok(Controls::default());
                }
                agent.controller.decide(scene, pose, Controls::default())
            })
            .collect::<Result<Vec<_>>>()?;

        self.refresh_phase();
        Ok(controls)
    }

    fn agent_mut(&mut self, id: AgentId) -> Result<&mut Agent> {
        self.agents
            .get_mut(id.0)
            .ok_or(Error::UnknownAgent(id.0))
    }

    fn refresh_phase(&mut self) {
        if self.phase == Phase::Running && self.agents.iter().all(|a| a.terminated) {
            self.phase = Phase::Evaluating;
        }
    }

    /// Adds `delta` to an agent's fitness for this generation.
    pub fn record_fitness(&mut self, id: AgentId, delta: f32) -> Result<()> {
        self.agent_mut(id)?.fitness += delta;
        Ok(())
    }

    /// Overwrites an agent's fitness for this generation.
    pub fn set_fitness(&mut self, id: AgentId, fitness: f32) -> Result<()> {
        self.agent_mut(id)?.fitness = fitness;
        Ok(())
    }

    /// Stops an agent for the rest of this generation.
    pub fn terminate(&mut self, id: AgentId) -> Result<()> {
        let agent = self.agent_mut(id)?;
        agent.terminated = true;
        agent.controller.clear_sensor();
        self.refresh_phase();
        Ok(())
    }

    /// Whether every agent has stopped.
    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Evaluating
    }

    /// Ranks the finished generation and replaces every network.
    ///
    /// Nothing is swapped unless the whole next generation was built, so a
    /// failure leaves the fleet exactly as it was.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if agents are still running.
    pub fn evolve(&mut self) -> Result<GenerationSummary> {
        if self.phase != Phase::Evaluating {
            return Err(Error::InvalidState("generation is still running"));
        }

        let fitness = self.fitness();
        let population = Population::from_members(
            self.agents
                .iter()
                .filter_map(|agent| {
                    agent.network().map(|network| evolution::Member {
                        agent: agent.id,
                        network: network.clone(),
                    })
                })
                .collect(),
        );

        let ranked = evolution::rank(&population, &fitness)?;
        let next = evolution::step_generation(
            &ranked,
            self.generation + 1,
            &self.params.evolution,
            &mut self.rng,
        )?;

        let summary = GenerationSummary::from_fitness(
            self.generation,
            &fitness,
            evolution::elite_count(ranked.len(), self.params.evolution.elite_fraction),
            evolution::mutation_rate(self.generation + 1, &self.params.evolution),
        );
        self.champion = ranked.members().first().map(|m| m.network.clone());

        for member in next.into_members() {
            let agent = &mut self.agents[member.agent.0];
            agent.controller.replace_network(member.network)?;
            agent.fitness = 0.0;
            agent.terminated = false;
        }

        info!(
            generation = summary.generation,
            best = summary.best,
            mean = summary.mean,
            worst = summary.worst,
            mutation_rate = summary.mutation_rate,
            "generation evaluated"
        );

        self.generation += 1;
        self.phase = Phase::Running;
        self.history.record(summary.clone());
        Ok(summary)
    }

    /// Agents in handle order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Fitness of every agent, in handle order.
    pub fn fitness(&self) -> Vec<f32> {
        self.agents.iter().map(|agent| agent.fitness).collect()
    }

    /// Network of the agent with the highest fitness so far this generation.
    ///
    /// Ties go to the lower handle; NaN scores never lead.
    pub fn leader(&self) -> Option<&Network> {
        self.agents
            .iter()
            .filter(|agent| !agent.fitness.is_nan())
            .fold(None::<&Agent>, |best, agent| match best {
                Some(b) if b.fitness >= agent.fitness => Some(b),
                _ => Some(agent),
            })
            .and_then(Agent::network)
    }

    /// Best network of the last evaluated generation.
    ///
    /// Before the first evaluation this is the current [`Fleet::leader`].
    pub fn champion(&self) -> Option<&Network> {
        self.champion.as_ref().or_else(|| self.leader())
    }

    /// Current generation, starting at 1.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Summaries of evaluated generations.
    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }

    /// Parameters the fleet was built with.
    pub fn params(&self) -> &Params {
        &self.params
    }
}
