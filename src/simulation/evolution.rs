//! Generational selection: ranking, elitism and mutation.
//!
//! Every function here is pure apart from the random source it is handed, so
//! a generation step is fully determined by the ranked networks, the
//! generation index and the RNG state. No crossover is performed; variation
//! comes only from mutation accumulated along each lineage.

use std::cmp::Ordering;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::brain::{DEFAULT_WEIGHT_SCALE, Network};
use super::error::{Error, Result};
use super::params::{EvolutionParams, check_rate};

/// Handle of the agent that owns a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub usize);

/// One slot of a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Agent driving with this network.
    pub agent: AgentId,
    /// The genome.
    pub network: Network,
}

/// Fixed-size ordered set of genomes.
///
/// Order matters only for breaking fitness ties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    members: Vec<Member>,
}

impl Population {
    /// Creates a population, assigning agent `i` to network `i`.
    pub fn from_networks(networks: Vec<Network>) -> Self {
        let members = networks
            .into_iter()
            .enumerate()
            .map(|(i, network)| Member {
                agent: AgentId(i),
                network,
            })
            .collect();
        Self { members }
    }

    /// Creates a population from explicit members.
    pub fn from_members(members: Vec<Member>) -> Self {
        Self { members }
    }

    /// Creates `size` random networks with weights in `[-scale, scale]`.
    pub fn random<R: Rng + ?Sized>(
        size: usize,
        topology: &[usize],
        scale: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::Configuration(
                "population size must be positive".to_string(),
            ));
        }

        let mut networks = Vec::with_capacity(size);
        for _ in 0..size {
            networks.push(Network::with_scale(topology, scale, rng)?);
        }
        debug!(size, ?topology, "initialized random population");
        Ok(Self::from_networks(networks))
    }

    /// Seeds a population from a saved champion.
    ///
    /// Slot `0` gets the champion untouched; every other slot gets a copy
    /// mutated by `mutation`, which must lie in `[0, 1]`.
    pub fn from_champion<R: Rng + ?Sized>(
        champion: &Network,
        size: usize,
        mutation: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::Configuration(
                "population size must be positive".to_string(),
            ));
        }
        check_rate("champion mutation rate", mutation)?;

        let mut networks = Vec::with_capacity(size);
        networks.push(champion.clone());
        for _ in 1..size {
            let mut copy = champion.clone();
            copy.mutate(mutation, rng);
            networks.push(copy);
        }
        debug!(size, mutation, "seeded population from champion");
        Ok(Self::from_networks(networks))
    }

    /// Members in order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Consumes the population, returning its members.
    pub fn into_members(self) -> Vec<Member> {
        self.members
    }

    /// Networks in order.
    pub fn networks(&self) -> impl Iterator<Item = &Network> {
        self.members.iter().map(|member| &member.network)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the population has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Creates a population of `size` networks with weights in `[-1, 1]`.
pub fn initialize_population<R: Rng + ?Sized>(
    size: usize,
    topology: &[usize],
    rng: &mut R,
) -> Result<Population> {
    Population::random(size, topology, DEFAULT_WEIGHT_SCALE, rng)
}

/// Highest first; NaN sorts after every number.
fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Orders a population by descending fitness.
///
/// Ties keep their original relative order. NaN scores rank last.
///
/// # Errors
///
/// [`Error::DimensionMismatch`] when `fitness` does not have one score per member.
pub fn rank(population: &Population, fitness: &[f32]) -> Result<Population> {
    if fitness.len() != population.len() {
        return Err(Error::DimensionMismatch {
            expected: population.len(),
            actual: fitness.len(),
        });
    }

    let nan_count = fitness.iter().filter(|f| f.is_nan()).count();
    if nan_count > 0 {
        warn!(nan_count, "NaN fitness ranked last");
    }

    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| descending(fitness[a], fitness[b]));

    Ok(Population {
        members: order
            .into_iter()
            .map(|i| population.members[i].clone())
            .collect(),
    })
}

/// Number of genomes kept unmutated: `ceil(size * fraction)`, at least one.
pub fn elite_count(size: usize, fraction: f32) -> usize {
    if size == 0 {
        return 0;
    }
    let exact = size as f64 * f64::from(fraction);
    // A decimal fraction is stored within half an f32 ulp, at most
    // `fraction * 2^-24`; only that much is forgiven, so 10 * 0.3f32 is 3.
    let representation_error = exact * f64::from(f32::EPSILON) / 2.0;
    let count = (exact - representation_error).ceil() as usize;
    count.clamp(1, size)
}

/// Mutation amount for `generation`, never below the configured floor.
pub fn mutation_rate(generation: u32, params: &EvolutionParams) -> f32 {
    (params.base_mutation_rate - generation as f32 * params.decay_per_generation)
        .max(params.min_mutation_rate)
}

/// Builds the next generation from a ranked population.
///
/// Slots below the elite count receive an exact copy of the same-rank elite.
/// Every other slot receives a copy of a uniformly chosen elite mutated at
/// [`mutation_rate`]. Each slot keeps the agent handle of the member that
/// held that rank.
///
/// # Arguments
///
/// * `ranked` - Population ordered best first, e.g. by [`rank`]
/// * `generation` - Index of the generation being built
/// * `params` - Elite fraction and mutation schedule
/// * `rng` - Random source for parent choice and mutation
pub fn step_generation<R: Rng + ?Sized>(
    ranked: &Population,
    generation: u32,
    params: &EvolutionParams,
    rng: &mut R,
) -> Result<Population> {
    params.validate()?;
    if ranked.is_empty() {
        return Err(Error::Configuration(
            "cannot evolve an empty population".to_string(),
        ));
    }

    let elites = elite_count(ranked.len(), params.elite_fraction);
    let rate = mutation_rate(generation, params);
    debug!(generation, elites, rate, "stepping generation");

    let mut members = Vec::with_capacity(ranked.len());
    for (i, slot) in ranked.members.iter().enumerate() {
        let network = if i < elites {
            slot.network.clone()
        } else {
            let parent = rng.random_range(0..elites);
            let mut child = ranked.members[parent].network.clone();
            child.mutate(rate, rng);
            child
        };
        members.push(Member {
            agent: slot.agent,
            network,
        });
    }

    Ok(Population { members })
}
