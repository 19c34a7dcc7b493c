#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use drive_evo::Error;
use drive_evo::simulation::brain::{Activation, Layer, Network};
use ndarray::{Array1, Array2, array};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[test]
fn test_malformed_topology_is_rejected() {
    let mut rng = seeded(1);
    for topology in [&[][..], &[3][..], &[3, 0, 2][..], &[0, 4][..]] {
        assert!(
            matches!(
                Network::new(topology, &mut rng),
                Err(Error::Configuration(_))
            ),
            "{topology:?} should be rejected"
        );
    }
}

#[test]
fn test_construction_follows_topology() {
    let network = Network::new(&[5, 16, 8, 4], &mut seeded(2)).unwrap();

    assert_eq!(network.layers().len(), 3);
    assert_eq!(network.topology(), vec![5, 16, 8, 4]);
    assert_eq!(network.input_count(), 5);
    assert_eq!(network.output_count(), 4);
    assert_eq!(network.parameter_count(), 5 * 16 + 16 + 16 * 8 + 8 + 8 * 4 + 4);
    assert_eq!(network.activation(), Activation::Step);

    let first = &network.layers()[0];
    assert_eq!(first.weights.dim(), (16, 5));
    assert_eq!(first.biases.len(), 16);
}

#[test]
fn test_initial_parameters_stay_in_range() {
    let network = Network::new(&[6, 10, 3], &mut seeded(3)).unwrap();
    assert!(network.to_flat_vector().iter().all(|p| (-1.0..=1.0).contains(p)));

    let narrow = Network::with_scale(&[6, 10, 3], 0.1, &mut seeded(3)).unwrap();
    assert!(narrow.to_flat_vector().iter().all(|p| (-0.1..=0.1).contains(p)));

    assert!(matches!(
        Network::with_scale(&[6, 3], -1.0, &mut seeded(3)),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_same_seed_builds_same_network() {
    let a = Network::new(&[4, 6, 2], &mut seeded(42)).unwrap();
    let b = Network::new(&[4, 6, 2], &mut seeded(42)).unwrap();
    let c = Network::new(&[4, 6, 2], &mut seeded(43)).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_feed_forward_output_length() {
    let network = Network::new(&[3, 4, 2], &mut seeded(4)).unwrap();

    let outputs = network.feed_forward(&array![0.2, 0.0, 0.9]).unwrap();
    assert_eq!(outputs.len(), 2);

    match network.feed_forward(&array![0.2, 0.9]) {
        Err(Error::DimensionMismatch { expected, actual }) => {
            assert_eq!(expected, 3);
            assert_eq!(actual, 2);
        }
        other => panic!("expected dimension mismatch, got {other:?}"),
    }
}

#[test]
fn test_feed_forward_is_deterministic() {
    let network = Network::new(&[5, 16, 8, 4], &mut seeded(5)).unwrap();
    let before = network.clone();
    let inputs = array![0.0, 0.3, 0.5, 0.0, 0.9];

    let first = network.feed_forward(&inputs).unwrap();
    for _ in 0..10 {
        assert_eq!(network.feed_forward(&inputs).unwrap(), first);
    }
    assert_eq!(network, before);
}

#[test]
fn test_step_activation_outputs_are_binary() {
    for seed in 0..20 {
        let network = Network::new(&[5, 16, 8, 4], &mut seeded(seed)).unwrap();
        let outputs = network
            .feed_forward(&array![0.1, 0.7, 0.0, 0.4, 1.0])
            .unwrap();
        assert!(outputs.iter().all(|&o| o == 0.0 || o == 1.0));
    }
}

#[test]
fn test_step_applies_to_hidden_layers() {
    // Hidden pre-activation 0.5 becomes 1; tanh would give ~0.46 and the
    // output unit (1 * h - 0.9) would then stay negative.
    let hidden = Layer {
        weights: Array2::from_elem((1, 1), 1.0),
        biases: array![0.0],
    };
    let output = Layer {
        weights: Array2::from_elem((1, 1), 1.0),
        biases: array![-0.9],
    };
    let network = Network::from_layers(vec![hidden, output], Activation::Step).unwrap();

    assert_eq!(network.feed_forward(&array![0.5]).unwrap(), array![1.0_f32]);
    assert_eq!(network.feed_forward(&array![-0.5]).unwrap(), array![0.0_f32]);

    let smooth = network.with_activation(Activation::Tanh);
    let expected = (0.5_f32.tanh() - 0.9).tanh();
    assert!((smooth.feed_forward(&array![0.5]).unwrap()[0] - expected).abs() < 1e-6);
}

#[test]
fn test_zero_pre_activation_is_off() {
    let layer = Layer {
        weights: Array2::zeros((2, 3)),
        biases: Array1::zeros(2),
    };
    let network = Network::from_layers(vec![layer], Activation::Step).unwrap();
    assert_eq!(
        network.feed_forward(&array![1.0, 1.0, 1.0]).unwrap(),
        array![0.0_f32, 0.0]
    );
}

#[test]
fn test_unchained_layers_are_rejected() {
    let mut rng = seeded(6);
    let first = Layer::new_random(3, 4, 1.0, &mut rng);
    let second = Layer::new_random(5, 2, 1.0, &mut rng);

    match Network::from_layers(vec![first.clone(), second], Activation::Step) {
        Err(Error::DimensionMismatch { expected, actual }) => {
            assert_eq!(expected, 4);
            assert_eq!(actual, 5);
        }
        other => panic!("expected dimension mismatch, got {other:?}"),
    }

    let bad_bias = Layer {
        weights: Array2::zeros((2, 4)),
        biases: Array1::zeros(3),
    };
    assert!(matches!(
        Network::from_layers(vec![first, bad_bias], Activation::Step),
        Err(Error::DimensionMismatch { .. })
    ));
    assert!(matches!(
        Network::from_layers(vec![], Activation::Step),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_mutating_a_clone_leaves_original_alone() {
    let mut rng = seeded(7);
    let original = Network::new(&[5, 16, 8, 4], &mut rng).unwrap();
    let snapshot = original.to_flat_vector();

    let mut clone = original.clone();
    clone.mutate(0.5, &mut rng);

    assert_eq!(original.to_flat_vector(), snapshot);
    assert_ne!(clone.to_flat_vector(), snapshot);
    assert!(Network::distance(&original, &clone) > 0.0);
}

#[test]
fn test_mutation_is_a_bounded_step_from_current_value() {
    let mut rng = seeded(8);
    let original = Network::new(&[4, 6, 2], &mut rng).unwrap();

    let mut mutated = original.clone();
    mutated.mutate(0.05, &mut rng);

    let before = original.to_flat_vector();
    let after = mutated.to_flat_vector();
    let mut moved = 0;
    for (b, a) in before.iter().zip(&after) {
        assert!((a - b).abs() <= 0.05 + 1e-6);
        if a != b {
            moved += 1;
        }
    }
    // Every parameter is perturbed, not a sampled subset
    assert_eq!(moved, before.len());
}

#[test]
fn test_zero_mutation_changes_nothing() {
    let mut rng = seeded(9);
    let original = Network::new(&[4, 6, 2], &mut rng).unwrap();
    let mut copy = original.clone();
    copy.mutate(0.0, &mut rng);
    assert_eq!(copy, original);
}

#[test]
fn test_mutation_is_reproducible() {
    let base = Network::new(&[4, 6, 2], &mut seeded(10)).unwrap();

    let mut a = base.clone();
    a.mutate(0.1, &mut seeded(11));
    let mut b = base.clone();
    b.mutate(0.1, &mut seeded(11));

    assert_eq!(a, b);
}

#[test]
fn test_distance_between_topologies() {
    let a = Network::new(&[4, 6, 2], &mut seeded(12)).unwrap();
    let b = Network::new(&[4, 5, 2], &mut seeded(12)).unwrap();

    assert_eq!(Network::distance(&a, &a), 0.0);
    assert!(Network::distance(&a, &b).is_infinite());
}
