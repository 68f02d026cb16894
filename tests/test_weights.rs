//! Normalization and randomization tests.
//!
//! Tests cover:
//! - Per-neuron and group-wide L1 normalization
//! - Randomized strength draws (range, determinism under a seed)
//! - The randomize-then-normalize composite
//! - The documented zero-divisor policy (non-finite propagation)
//! - Property tests for winner determinism and unit sums

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wtanet::{CompetitiveConfig, GroupId, LineLayout, Network, NeuronId, SynapseId};

/// Group of `size` members, each wired from `fan_in` shared input neurons.
///
/// Strengths are taken row-major from `strengths` (one row per member).
fn fan_in_net(
    size: usize,
    fan_in: usize,
    strengths: &[f64],
) -> (Network, GroupId, Vec<NeuronId>, Vec<Vec<SynapseId>>) {
    assert_eq!(strengths.len(), size * fan_in);

    let mut net = Network::new();
    let config = CompetitiveConfig {
        size,
        ..CompetitiveConfig::default()
    };
    let group = net.add_competitive(config, &LineLayout::default()).unwrap();
    let members = net.group(group).unwrap().neurons().as_slice().to_vec();

    let inputs: Vec<NeuronId> = (0..fan_in).map(|_| net.add_neuron(Default::default())).collect();

    let mut synapses = Vec::new();
    for (m, &member) in members.iter().enumerate() {
        let mut row = Vec::new();
        for (i, &input) in inputs.iter().enumerate() {
            row.push(net.connect(input, member, strengths[m * fan_in + i]).unwrap());
        }
        synapses.push(row);
    }

    (net, group, members, synapses)
}

fn incoming_sum(net: &Network, row: &[SynapseId]) -> f64 {
    row.iter().map(|&sid| net.synapse(sid).unwrap().strength()).sum()
}

#[test]
fn test_normalize_incoming_weights_per_neuron() {
    let (mut net, group, _, synapses) = fan_in_net(
        3,
        3,
        &[0.5, 1.5, 2.0, 0.1, 0.2, 0.7, 4.0, 4.0, 2.0],
    );

    net.normalize_incoming_weights(group).unwrap();

    for row in &synapses {
        assert_abs_diff_eq!(incoming_sum(&net, row), 1.0, epsilon = 1e-9);
    }

    // Relative proportions survive: 0.5 of a 4.0 total becomes 0.125
    assert_abs_diff_eq!(
        net.synapse(synapses[0][0]).unwrap().strength(),
        0.125,
        epsilon = 1e-9
    );
}

#[test]
fn test_normalize_all_incoming_weights_group_wide() {
    let (mut net, group, _, synapses) = fan_in_net(2, 2, &[1.0, 3.0, 2.0, 2.0]);

    net.normalize_all_incoming_weights(group).unwrap();

    // One global divisor (8.0), not one per member
    assert_abs_diff_eq!(
        net.synapse(synapses[0][0]).unwrap().strength(),
        0.125,
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        net.synapse(synapses[0][1]).unwrap().strength(),
        0.375,
        epsilon = 1e-9
    );

    let total: f64 = synapses.iter().map(|row| incoming_sum(&net, row)).sum();
    assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
}

#[test]
fn test_randomize_incoming_weights_in_range() {
    let (mut net, group, _, synapses) = fan_in_net(3, 4, &[9.0; 12]);
    let mut rng = StdRng::seed_from_u64(11);

    net.randomize_incoming_weights(group, &mut rng).unwrap();

    for row in &synapses {
        for &sid in row {
            let s = net.synapse(sid).unwrap().strength();
            assert!((0.0..=1.0).contains(&s), "strength {} out of range", s);
        }
    }
}

#[test]
fn test_randomize_is_deterministic_under_seed() {
    let run = |seed: u64| {
        let (mut net, group, _, synapses) = fan_in_net(2, 3, &[0.0; 6]);
        let mut rng = StdRng::seed_from_u64(seed);
        net.randomize_incoming_weights(group, &mut rng).unwrap();
        synapses
            .iter()
            .flatten()
            .map(|&sid| net.synapse(sid).unwrap().strength())
            .collect::<Vec<_>>()
    };

    assert_eq!(run(42), run(42));
    assert_ne!(run(42), run(43));
}

#[test]
fn test_randomize_leaves_unit_sums() {
    let (mut net, group, _, synapses) = fan_in_net(4, 5, &[2.0; 20]);
    let mut rng = StdRng::seed_from_u64(3);

    net.randomize_group(group, &mut rng).unwrap();

    for row in &synapses {
        assert_abs_diff_eq!(incoming_sum(&net, row), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_zero_divisor_propagates_non_finite() {
    // Incoming strengths that cancel exactly make the per-neuron divisor
    // zero; the documented policy is silent non-finite propagation
    let (mut net, group, _, synapses) = fan_in_net(1, 2, &[1.0, -1.0]);

    net.normalize_incoming_weights(group).unwrap();

    for &sid in &synapses[0] {
        assert!(!net.synapse(sid).unwrap().strength().is_finite());
    }
}

/// Reference winner scan: strict >, running max starting at 0.
fn expected_winner(activations: &[f64]) -> usize {
    let mut max = 0.0;
    let mut winner = 0;
    for (i, &a) in activations.iter().enumerate() {
        if a > max {
            max = a;
            winner = i;
        }
    }
    winner
}

proptest! {
    #[test]
    fn prop_winner_matches_reference_scan(
        activations in prop::collection::vec(-1.0f64..1.0, 1..12)
    ) {
        let size = activations.len();
        let mut net = Network::new();
        let config = CompetitiveConfig {
            size,
            normalize_inputs: false,
            ..CompetitiveConfig::default()
        };
        let group = net.add_competitive(config, &LineLayout::default()).unwrap();
        let members = net.group(group).unwrap().neurons().as_slice().to_vec();

        for (i, &member) in members.iter().enumerate() {
            let input = net.add_neuron(Default::default());
            net.set_activation(input, activations[i]);
            net.connect(input, member, 1.0).unwrap();
        }

        // Freeze strengths so both passes see the same weighted inputs
        net.set_clamp_weights(true);

        net.update_group(group).unwrap();
        let first = net.group(group).unwrap().winner();
        prop_assert_eq!(first, expected_winner(&activations));

        // Same vector, same index
        net.update_group(group).unwrap();
        prop_assert_eq!(net.group(group).unwrap().winner(), first);
    }

    #[test]
    fn prop_normalize_yields_unit_sums(
        strengths in prop::collection::vec(0.01f64..10.0, 9)
    ) {
        let (mut net, group, _, synapses) = fan_in_net(3, 3, &strengths);

        net.normalize_incoming_weights(group).unwrap();

        for row in &synapses {
            let sum = incoming_sum(&net, row);
            prop_assert!((sum - 1.0).abs() < 1e-9, "sum was {}", sum);
        }
    }
}
