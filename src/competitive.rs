//! Competitive - Winner-take-all learning over a fixed group of neurons.
//!
//! This module provides the [`Competitive`] engine: a small, fixed-topology
//! group of neurons whose incoming weights adapt by competitive learning.
//! One update cycle runs winner selection, activation clamping, and the
//! learning rule over the group's neurons in a fixed order.
//!
//! # Algorithm
//!
//! 1. Recompute each member's activation from its linear rule over the total
//!    weighted input
//! 2. Scan members in order tracking a running max (initialized to 0); a
//!    member wins iff its activation is strictly greater than the max, so
//!    ties keep the earliest index and all-negative vectors leave index 0
//! 3. Per member, in the same order: the winner is forced to the win value
//!    and each incoming strength moves toward the (optionally normalized)
//!    source activation by `epsilon`; losers are forced to the lose value
//!    and, under leaky learning, adapt at `leaky_epsilon`
//!
//! If a member with no strictly-positive input is reached in step 3, the
//! rest of the cycle is abandoned: no later member is clamped or adapted.
//! Callers relying on full passes must keep every member's fan-in active.
//!
//! # Numeric faults
//!
//! Degenerate normalization is not guarded: a zero total input under
//! `normalize_inputs`, or a zero strength sum under the normalize
//! operations, divides by zero and propagates non-finite strengths. Callers
//! detect divergence downstream; only construction validates.
//!
//! # Examples
//!
//! ```
//! use wtanet::{CompetitiveConfig, LineLayout, Network};
//!
//! let mut net = Network::new();
//! let config = CompetitiveConfig {
//!     size: 3,
//!     normalize_inputs: false,
//!     ..CompetitiveConfig::default()
//! };
//! let group = net.add_competitive(config, &LineLayout::default()).unwrap();
//!
//! // One input neuron per member
//! let members = net.group(group).unwrap().neurons().as_slice().to_vec();
//! for (i, &m) in members.iter().enumerate() {
//!     let input = net.add_neuron(Default::default());
//!     net.set_activation(input, [0.2, 0.9, 0.5][i]);
//!     net.connect(input, m, 0.5).unwrap();
//! }
//!
//! net.update().unwrap();
//! assert_eq!(net.group(group).unwrap().winner(), 1);
//! ```

use crate::error::{Result, WtanetError};
use crate::group::{NeuronGroup, SynapseGroup};
use crate::layout::Layout;
use crate::neuron::{LinearRule, Neuron, NeuronArena, NeuronId};
use crate::synapse::{StrengthRange, SynapseArena};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Parameters of a competitive group.
///
/// `leaky_epsilon` defaults to a quarter of the learning rate, the ratio the
/// defaults have always used together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveConfig {
    /// Number of neurons in the group
    pub size: usize,
    /// Learning rate applied to the winner
    pub epsilon: f64,
    /// Learning rate applied to losers under leaky learning
    pub leaky_epsilon: f64,
    /// Activation forced onto the winner
    pub win_value: f64,
    /// Activation forced onto losers
    pub lose_value: f64,
    /// Divide source activations by the total input before adapting
    pub normalize_inputs: bool,
    /// Adapt losing neurons at the leaky rate
    pub use_leaky_learning: bool,
    /// Uniform range for randomized strengths
    pub strength_range: StrengthRange,
}

impl Default for CompetitiveConfig {
    fn default() -> Self {
        Self {
            size: 5,
            epsilon: 0.1,
            leaky_epsilon: 0.025,
            win_value: 1.0,
            lose_value: 0.0,
            normalize_inputs: true,
            use_leaky_learning: false,
            strength_range: StrengthRange::default(),
        }
    }
}

impl CompetitiveConfig {
    /// Check that the parameters describe a usable group.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(WtanetError::InvalidConfiguration(
                "size must be > 0".to_string(),
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(WtanetError::InvalidConfiguration(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        if !self.leaky_epsilon.is_finite() || self.leaky_epsilon < 0.0 {
            return Err(WtanetError::InvalidConfiguration(format!(
                "leaky_epsilon must be finite and non-negative, got {}",
                self.leaky_epsilon
            )));
        }
        if !self.win_value.is_finite() || !self.lose_value.is_finite() {
            return Err(WtanetError::InvalidConfiguration(
                "win_value and lose_value must be finite".to_string(),
            ));
        }
        if !self.strength_range.low.is_finite()
            || !self.strength_range.high.is_finite()
            || self.strength_range.low > self.strength_range.high
        {
            return Err(WtanetError::InvalidConfiguration(format!(
                "strength range [{}, {}] is not a valid interval",
                self.strength_range.low, self.strength_range.high
            )));
        }
        Ok(())
    }
}

/// Winner-take-all competitive learning engine.
///
/// Owns the membership of its neuron and synapse collections; the neurons
/// and synapses themselves live in the network's arenas and are passed into
/// each operation. The transient `winner` and `max_activation` reflect the
/// most recent update cycle.
#[derive(Debug, Clone)]
pub struct Competitive {
    label: String,
    config: CompetitiveConfig,
    neurons: NeuronGroup,
    synapses: SynapseGroup,
    winner: usize,
    max_activation: f64,
}

impl Competitive {
    /// Build a group of `config.size` neurons, positioned by `layout`.
    ///
    /// Neurons are allocated once into `arena` and never resized afterwards.
    /// Fails with [`WtanetError::InvalidConfiguration`] if the config does
    /// not validate.
    pub fn new(
        config: CompetitiveConfig,
        arena: &mut NeuronArena,
        layout: &dyn Layout,
    ) -> Result<Self> {
        config.validate()?;

        let mut neurons = NeuronGroup::new();
        for i in 0..config.size {
            let mut neuron = Neuron::new(LinearRule::default());
            neuron.set_position(layout.place(i));
            neurons.push(arena.insert(neuron));
        }

        Ok(Self {
            label: "competitive".to_string(),
            config,
            neurons,
            synapses: SynapseGroup::new(),
            winner: 0,
            max_activation: 0.0,
        })
    }

    /// Rebuild a group from an existing membership (config restore path).
    pub(crate) fn restore(
        config: CompetitiveConfig,
        label: String,
        neurons: NeuronGroup,
    ) -> Result<Self> {
        config.validate()?;
        if neurons.len() != config.size {
            return Err(WtanetError::InvalidConfiguration(format!(
                "group of size {} restored with {} members",
                config.size,
                neurons.len()
            )));
        }
        Ok(Self {
            label,
            config,
            neurons,
            synapses: SynapseGroup::new(),
            winner: 0,
            max_activation: 0.0,
        })
    }

    /// Run one update cycle over the group.
    ///
    /// `clamp_neurons` suppresses the win/lose activation writes and
    /// `clamp_weights` suppresses strength adaptation; aggregation and
    /// winner selection run regardless.
    pub fn update(
        &mut self,
        neurons: &mut NeuronArena,
        synapses: &mut SynapseArena,
        clamp_neurons: bool,
        clamp_weights: bool,
    ) {
        // Aggregation pass: activation from the linear rule over total input
        for &nid in self.neurons.as_slice() {
            let total = neurons[nid].total_input(neurons, synapses);
            let activation = neurons[nid].rule().apply(total);
            neurons[nid].set_activation(activation);
        }

        // Winner scan: strict >, max starts at 0, earliest index on ties
        self.max_activation = 0.0;
        self.winner = 0;
        for (i, &nid) in self.neurons.as_slice().iter().enumerate() {
            let activation = neurons[nid].activation();
            if activation > self.max_activation {
                self.max_activation = activation;
                self.winner = i;
            }
        }
        trace!(
            winner = self.winner,
            max_activation = self.max_activation,
            "winner selected"
        );

        // Learning pass
        for (i, &nid) in self.neurons.as_slice().iter().enumerate() {
            let sum_of_inputs = neurons[nid].total_input(neurons, synapses);

            // A member with no active input abandons the rest of the cycle
            if neurons[nid].active_inputs(0.0, neurons, synapses) == 0 {
                return;
            }

            if i == self.winner {
                if !clamp_neurons {
                    neurons[nid].set_activation(self.config.win_value);
                }
                if !clamp_weights {
                    self.adapt(nid, sum_of_inputs, self.config.epsilon, neurons, synapses);
                }
            } else {
                if !clamp_neurons {
                    neurons[nid].set_activation(self.config.lose_value);
                }
                if self.config.use_leaky_learning && !clamp_weights {
                    self.adapt(
                        nid,
                        sum_of_inputs,
                        self.config.leaky_epsilon,
                        neurons,
                        synapses,
                    );
                }
            }
        }
    }

    /// Move each incoming strength of `nid` toward its source activation.
    fn adapt(
        &self,
        nid: NeuronId,
        sum_of_inputs: f64,
        rate: f64,
        neurons: &NeuronArena,
        synapses: &mut SynapseArena,
    ) {
        for &sid in neurons[nid].fan_in() {
            let source = synapses[sid].source();
            let mut activation = neurons[source].activation();
            if self.config.normalize_inputs {
                activation /= sum_of_inputs;
            }
            let syn = &mut synapses[sid];
            let strength = syn.strength() + rate * (activation - syn.strength());
            syn.set_strength(strength);
        }
    }

    /// Normalize each member's incoming strengths to sum to 1.
    ///
    /// The divisor is the member's own strength sum; a zero sum divides by
    /// zero and propagates non-finite strengths.
    pub fn normalize_incoming_weights(&self, neurons: &NeuronArena, synapses: &mut SynapseArena) {
        for &nid in self.neurons.as_slice() {
            let norm = neurons[nid].summed_incoming_weights(synapses);
            for &sid in neurons[nid].fan_in() {
                let syn = &mut synapses[sid];
                let strength = syn.strength() / norm;
                syn.set_strength(strength);
            }
        }
    }

    /// Normalize every incoming strength by the group-wide total.
    pub fn normalize_all_incoming_weights(
        &self,
        neurons: &NeuronArena,
        synapses: &mut SynapseArena,
    ) {
        let norm = self.summed_incoming_weights(neurons, synapses);
        for &nid in self.neurons.as_slice() {
            for &sid in neurons[nid].fan_in() {
                let syn = &mut synapses[sid];
                let strength = syn.strength() / norm;
                syn.set_strength(strength);
            }
        }
    }

    /// Redraw every incoming strength from the configured range.
    pub fn randomize_incoming_weights(
        &self,
        neurons: &NeuronArena,
        synapses: &mut SynapseArena,
        rng: &mut StdRng,
    ) {
        for &nid in self.neurons.as_slice() {
            for &sid in neurons[nid].fan_in() {
                synapses[sid].randomize(&self.config.strength_range, rng);
            }
        }
    }

    /// Randomize then normalize, leaving each member's incoming strengths
    /// summing to 1.
    pub fn randomize(&self, neurons: &NeuronArena, synapses: &mut SynapseArena, rng: &mut StdRng) {
        self.randomize_incoming_weights(neurons, synapses, rng);
        self.normalize_incoming_weights(neurons, synapses);
    }

    /// Sum of all incoming strengths across the group.
    fn summed_incoming_weights(&self, neurons: &NeuronArena, synapses: &SynapseArena) -> f64 {
        self.neurons
            .as_slice()
            .iter()
            .map(|&nid| neurons[nid].summed_incoming_weights(synapses))
            .sum()
    }

    /// Membership test used by the wiring bus.
    pub fn contains(&self, neuron: NeuronId) -> bool {
        self.neurons.contains(neuron)
    }

    /// Member neurons, in update order.
    #[inline]
    pub fn neurons(&self) -> &NeuronGroup {
        &self.neurons
    }

    /// Synapses owned by this group.
    #[inline]
    pub fn synapses(&self) -> &SynapseGroup {
        &self.synapses
    }

    pub(crate) fn synapses_mut(&mut self) -> &mut SynapseGroup {
        &mut self.synapses
    }

    /// Winner index of the most recent cycle.
    #[inline]
    pub fn winner(&self) -> usize {
        self.winner
    }

    /// Running max of the most recent winner scan. Stays 0 when no member
    /// activation exceeded the initial threshold.
    #[inline]
    pub fn max_activation(&self) -> f64 {
        self.max_activation
    }

    /// Number of member neurons.
    #[inline]
    pub fn size(&self) -> usize {
        self.config.size
    }

    /// Full parameter set.
    #[inline]
    pub fn config(&self) -> &CompetitiveConfig {
        &self.config
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Learning rate.
    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.config.epsilon
    }

    /// Set the learning rate.
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.config.epsilon = epsilon;
    }

    /// Leaky learning rate.
    #[inline]
    pub fn leaky_epsilon(&self) -> f64 {
        self.config.leaky_epsilon
    }

    /// Set the leaky learning rate.
    pub fn set_leaky_epsilon(&mut self, leaky_epsilon: f64) {
        self.config.leaky_epsilon = leaky_epsilon;
    }

    /// Winner activation value.
    #[inline]
    pub fn win_value(&self) -> f64 {
        self.config.win_value
    }

    /// Set the winner activation value.
    pub fn set_win_value(&mut self, win_value: f64) {
        self.config.win_value = win_value;
    }

    /// Loser activation value.
    #[inline]
    pub fn lose_value(&self) -> f64 {
        self.config.lose_value
    }

    /// Set the loser activation value.
    pub fn set_lose_value(&mut self, lose_value: f64) {
        self.config.lose_value = lose_value;
    }

    /// Whether source activations are normalized before adaptation.
    #[inline]
    pub fn normalize_inputs(&self) -> bool {
        self.config.normalize_inputs
    }

    /// Set input normalization.
    pub fn set_normalize_inputs(&mut self, normalize_inputs: bool) {
        self.config.normalize_inputs = normalize_inputs;
    }

    /// Whether losers adapt at the leaky rate.
    #[inline]
    pub fn use_leaky_learning(&self) -> bool {
        self.config.use_leaky_learning
    }

    /// Set leaky learning.
    pub fn set_use_leaky_learning(&mut self, use_leaky_learning: bool) {
        self.config.use_leaky_learning = use_leaky_learning;
    }
}
