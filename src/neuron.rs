//! Neuron - Activation state, fan-in, and input aggregation.
//!
//! A [`Neuron`] holds a scalar activation, a spatial position assigned once at
//! construction, and an ordered fan-in of [`SynapseId`]s referencing the
//! synapses that terminate at it. The fan-in is held by reference only; the
//! synapses themselves are owned by the [`crate::synapse::SynapseArena`].
//!
//! Activation is recomputed from the total weighted input through a
//! [`LinearRule`] (slope and bias, identity by default).
//!
//! Neurons live in a [`NeuronArena`]: an owned slot collection with stable
//! ids. Removal leaves a tombstone, so ids are never reused.
//!
//! # Examples
//!
//! ```
//! use wtanet::{LinearRule, Neuron, NeuronArena};
//!
//! let mut arena = NeuronArena::new();
//! let id = arena.insert(Neuron::new(LinearRule::default()));
//!
//! arena[id].set_activation(0.5);
//! assert_eq!(arena[id].activation(), 0.5);
//! ```

use crate::synapse::{SynapseArena, SynapseId};
use serde::{Deserialize, Serialize};

/// Linear activation rule: `activation = slope * total_input + bias`.
///
/// The default rule (slope 1, bias 0) passes the summed weighted input
/// through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRule {
    /// Multiplier applied to the total input
    pub slope: f64,
    /// Constant added after scaling
    pub bias: f64,
}

impl Default for LinearRule {
    fn default() -> Self {
        Self {
            slope: 1.0,
            bias: 0.0,
        }
    }
}

impl LinearRule {
    /// Apply the rule to a total input value.
    #[inline]
    pub fn apply(&self, total_input: f64) -> f64 {
        self.slope * total_input + self.bias
    }
}

/// Unique identifier for a neuron in a [`NeuronArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeuronId(u32);

impl NeuronId {
    /// Create a NeuronId from a raw u32 value (for testing).
    #[doc(hidden)]
    pub fn from_raw(id: u32) -> Self {
        NeuronId(id)
    }

    /// Get the raw value as an index.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// A single neural unit.
#[derive(Debug, Clone)]
pub struct Neuron {
    /// Current activation value
    activation: f64,
    /// Spatial position, assigned by a layout at construction
    position: [f64; 2],
    /// Aggregation rule turning total input into activation
    rule: LinearRule,
    /// Incoming synapses, in attachment order (referenced, not owned)
    fan_in: Vec<SynapseId>,
}

impl Neuron {
    /// Create a neuron with the given activation rule.
    ///
    /// Activation starts at 0 and the position at the origin.
    pub fn new(rule: LinearRule) -> Self {
        Self {
            activation: 0.0,
            position: [0.0, 0.0],
            rule,
            fan_in: Vec::new(),
        }
    }

    /// Get the current activation.
    #[inline]
    pub fn activation(&self) -> f64 {
        self.activation
    }

    /// Set the activation directly.
    #[inline]
    pub fn set_activation(&mut self, activation: f64) {
        self.activation = activation;
    }

    /// Get the spatial position.
    #[inline]
    pub fn position(&self) -> [f64; 2] {
        self.position
    }

    /// Set the spatial position.
    pub fn set_position(&mut self, position: [f64; 2]) {
        self.position = position;
    }

    /// Get the activation rule.
    #[inline]
    pub fn rule(&self) -> LinearRule {
        self.rule
    }

    /// Incoming synapses in attachment order.
    #[inline]
    pub fn fan_in(&self) -> &[SynapseId] {
        &self.fan_in
    }

    pub(crate) fn push_fan_in(&mut self, synapse: SynapseId) {
        self.fan_in.push(synapse);
    }

    pub(crate) fn remove_fan_in(&mut self, synapse: SynapseId) {
        self.fan_in.retain(|s| *s != synapse);
    }

    /// Total weighted input: the sum over the fan-in of
    /// `source activation * strength`.
    pub fn total_input(&self, neurons: &NeuronArena, synapses: &SynapseArena) -> f64 {
        let mut sum = 0.0;
        for &sid in &self.fan_in {
            let syn = &synapses[sid];
            sum += neurons[syn.source()].activation() * syn.strength();
        }
        sum
    }

    /// Count fan-in synapses whose source activation is strictly greater
    /// than `threshold`.
    pub fn active_inputs(
        &self,
        threshold: f64,
        neurons: &NeuronArena,
        synapses: &SynapseArena,
    ) -> usize {
        self.fan_in
            .iter()
            .filter(|&&sid| neurons[synapses[sid].source()].activation() > threshold)
            .count()
    }

    /// Sum of incoming synapse strengths.
    pub fn summed_incoming_weights(&self, synapses: &SynapseArena) -> f64 {
        self.fan_in.iter().map(|&sid| synapses[sid].strength()).sum()
    }
}

/// Owned, indexed collection of neurons with stable ids.
///
/// Slots are never reused: removing a neuron leaves a tombstone, so stale
/// ids fail loudly instead of silently aliasing a newer neuron.
#[derive(Debug, Clone, Default)]
pub struct NeuronArena {
    slots: Vec<Option<Neuron>>,
}

impl NeuronArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a neuron, returning its id.
    pub fn insert(&mut self, neuron: Neuron) -> NeuronId {
        let id = NeuronId(self.slots.len() as u32);
        self.slots.push(Some(neuron));
        id
    }

    /// Remove a neuron, returning it if the id was live.
    pub fn remove(&mut self, id: NeuronId) -> Option<Neuron> {
        self.slots.get_mut(id.as_usize()).and_then(Option::take)
    }

    /// Get a neuron by id.
    pub fn get(&self, id: NeuronId) -> Option<&Neuron> {
        self.slots.get(id.as_usize()).and_then(Option::as_ref)
    }

    /// Get a neuron mutably by id.
    pub fn get_mut(&mut self, id: NeuronId) -> Option<&mut Neuron> {
        self.slots.get_mut(id.as_usize()).and_then(Option::as_mut)
    }

    /// Number of live neurons.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True if no live neurons remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate live neurons in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NeuronId, &Neuron)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (NeuronId(i as u32), n)))
    }
}

impl std::ops::Index<NeuronId> for NeuronArena {
    type Output = Neuron;

    fn index(&self, id: NeuronId) -> &Neuron {
        self.slots[id.as_usize()].as_ref().expect("stale neuron id")
    }
}

impl std::ops::IndexMut<NeuronId> for NeuronArena {
    fn index_mut(&mut self, id: NeuronId) -> &mut Neuron {
        self.slots[id.as_usize()].as_mut().expect("stale neuron id")
    }
}
