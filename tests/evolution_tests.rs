#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use drive_evo::Error;
use drive_evo::simulation::brain::Network;
use drive_evo::simulation::evolution::{
    AgentId, Population, elite_count, initialize_population, mutation_rate, rank,
    step_generation,
};
use drive_evo::simulation::params::EvolutionParams;
use rand::SeedableRng;
use rand::rngs::StdRng;

const TOPOLOGY: [usize; 4] = [5, 16, 8, 4];

fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[test]
fn test_initialize_population() {
    let population = initialize_population(10, &TOPOLOGY, &mut seeded(1)).unwrap();

    assert_eq!(population.len(), 10);
    for (i, member) in population.members().iter().enumerate() {
        assert_eq!(member.agent, AgentId(i));
        assert_eq!(member.network.topology(), TOPOLOGY.to_vec());
    }
    // Independently drawn networks
    assert_ne!(population.members()[0].network, population.members()[1].network);
}

#[test]
fn test_initialize_population_rejects_bad_input() {
    assert!(matches!(
        initialize_population(0, &TOPOLOGY, &mut seeded(1)),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        initialize_population(5, &[5], &mut seeded(1)),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_elite_count_rounds_up() {
    assert_eq!(elite_count(10, 0.3), 3);
    assert_eq!(elite_count(30, 0.3), 9);
    assert_eq!(elite_count(10, 0.25), 3);
    assert_eq!(elite_count(7, 0.5), 4);
    assert_eq!(elite_count(5, 0.01), 1);
    assert_eq!(elite_count(4, 1.0), 4);
    assert_eq!(elite_count(0, 0.3), 0);
}

#[test]
fn test_elite_count_just_above_boundary() {
    assert_eq!(elite_count(1_000_000, 0.300_000_1), 300_001);
    assert_eq!(elite_count(1_000_000, 0.3), 300_000);
    assert_eq!(elite_count(100, 0.31), 31);
}

#[test]
fn test_mutation_rate_decays_to_floor() {
    let params = EvolutionParams::default();

    assert!((mutation_rate(0, &params) - 0.1).abs() < 1e-6);
    assert!((mutation_rate(2, &params) - 0.09).abs() < 1e-6);
    assert!((mutation_rate(10, &params) - 0.05).abs() < 1e-6);
    assert_eq!(mutation_rate(100, &params), params.min_mutation_rate);

    for generation in 0..10_000 {
        assert!(mutation_rate(generation, &params) >= params.min_mutation_rate);
    }
}

#[test]
fn test_rank_orders_by_descending_fitness() {
    let population = initialize_population(5, &[2, 2], &mut seeded(2)).unwrap();
    let ranked = rank(&population, &[1.0, 3.0, f32::NAN, 3.0, 2.0]).unwrap();

    let order: Vec<usize> = ranked.members().iter().map(|m| m.agent.0).collect();
    // Ties keep index order, NaN goes last
    assert_eq!(order, vec![1, 3, 4, 0, 2]);
    assert_eq!(ranked.members()[0].network, population.members()[1].network);
}

#[test]
fn test_rank_needs_one_score_per_member() {
    let population = initialize_population(3, &[2, 2], &mut seeded(3)).unwrap();
    assert!(matches!(
        rank(&population, &[1.0, 2.0]),
        Err(Error::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));
}

#[test]
fn test_step_generation_keeps_elites_and_mutates_rest() {
    let mut rng = seeded(4);
    let population = initialize_population(10, &TOPOLOGY, &mut rng).unwrap();
    // Same scores as [9, 7, 5, 4, 3, 2, 2, 1, 1, 0], shuffled across slots
    let fitness = [2.0, 9.0, 1.0, 5.0, 0.0, 7.0, 3.0, 1.0, 4.0, 2.0];
    let ranked = rank(&population, &fitness).unwrap();
    let params = EvolutionParams {
        elite_fraction: 0.3,
        ..EvolutionParams::default()
    };

    let next = step_generation(&ranked, 2, &params, &mut rng).unwrap();
    assert_eq!(next.len(), 10);

    let elites: Vec<&Network> = ranked.networks().take(3).collect();
    for (i, elite) in elites.iter().enumerate() {
        assert_eq!(next.members()[i].network.to_flat_vector(), elite.to_flat_vector());
    }
    for member in &next.members()[3..] {
        for elite in &elites {
            assert_ne!(&member.network, *elite);
        }
        // One mutation at rate 0.09 stays close to its parent
        let nearest = elites
            .iter()
            .map(|elite| Network::distance(&member.network, elite))
            .fold(f32::INFINITY, f32::min);
        assert!(nearest > 0.0);
        assert!(nearest <= 0.09 * (member.network.parameter_count() as f32).sqrt() + 1e-4);
    }

    // Each slot keeps the handle of the agent that held that rank
    let handles: Vec<AgentId> = next.members().iter().map(|m| m.agent).collect();
    let ranked_handles: Vec<AgentId> = ranked.members().iter().map(|m| m.agent).collect();
    assert_eq!(handles, ranked_handles);
}

#[test]
fn test_step_generation_is_reproducible() {
    let population = initialize_population(8, &TOPOLOGY, &mut seeded(5)).unwrap();
    let params = EvolutionParams::default();

    let a = step_generation(&population, 3, &params, &mut seeded(6)).unwrap();
    let b = step_generation(&population, 3, &params, &mut seeded(6)).unwrap();
    assert_eq!(a, b);

    let c = step_generation(&population, 3, &params, &mut seeded(7)).unwrap();
    assert_ne!(a, c);
}

#[test]
fn test_step_generation_leaves_input_untouched() {
    let population = initialize_population(6, &TOPOLOGY, &mut seeded(8)).unwrap();
    let before = population.clone();
    step_generation(&population, 1, &EvolutionParams::default(), &mut seeded(9)).unwrap();
    assert_eq!(population, before);
}

#[test]
fn test_step_generation_rejects_bad_input() {
    let population = initialize_population(4, &[2, 2], &mut seeded(10)).unwrap();
    let no_elites = EvolutionParams {
        elite_fraction: 0.0,
        ..EvolutionParams::default()
    };
    assert!(matches!(
        step_generation(&population, 1, &no_elites, &mut seeded(11)),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        step_generation(&Population::default(), 1, &EvolutionParams::default(), &mut seeded(11)),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_population_from_champion() {
    let mut rng = seeded(12);
    let champion = Network::new(&TOPOLOGY, &mut rng).unwrap();
    let population = Population::from_champion(&champion, 5, 0.05, &mut rng).unwrap();

    assert_eq!(population.len(), 5);
    assert_eq!(population.members()[0].network, champion);

    let reference = champion.to_flat_vector();
    for member in &population.members()[1..] {
        assert_ne!(member.network, champion);
        for (a, b) in member.network.to_flat_vector().iter().zip(&reference) {
            assert!((a - b).abs() <= 0.05 + 1e-6);
        }
    }

    assert!(matches!(
        Population::from_champion(&champion, 0, 0.05, &mut rng),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_population_from_champion_rejects_bad_mutation() {
    let mut rng = seeded(15);
    let champion = Network::new(&[3, 2], &mut rng).unwrap();

    for mutation in [f32::NAN, f32::INFINITY, -0.1, 1.5] {
        assert!(
            matches!(
                Population::from_champion(&champion, 3, mutation, &mut rng),
                Err(Error::Configuration(_))
            ),
            "mutation {mutation} was accepted"
        );
    }
    assert!(Population::from_champion(&champion, 3, 1.0, &mut rng).is_ok());
    assert!(Population::from_champion(&champion, 3, 0.0, &mut rng).is_ok());
}

#[test]
fn test_single_member_population() {
    let population = initialize_population(1, &[3, 2], &mut seeded(13)).unwrap();
    let next = step_generation(&population, 1, &EvolutionParams::default(), &mut seeded(14)).unwrap();
    assert_eq!(next, population);
}
