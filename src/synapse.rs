//! Synapse - Weighted connections between neurons.
//!
//! A [`Synapse`] carries a scalar strength from a source neuron to a target
//! neuron. Every synapse is owned by exactly one collection at a time: either
//! a group's synapse collection or the network's loose (root) collection.
//! Ownership is tracked by the `owner` field and transferred only by the
//! network, as an explicit detach-then-attach.
//!
//! Strengths can be redrawn from a [`StrengthRange`], the uniform
//! distribution used by the randomize operations. The rng is passed in by
//! the caller so runs stay reproducible under a fixed seed.

use crate::network::GroupId;
use crate::neuron::NeuronId;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique identifier for a synapse in a [`SynapseArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SynapseId(u32);

impl SynapseId {
    /// Create a SynapseId from a raw u32 value (for testing).
    #[doc(hidden)]
    pub fn from_raw(id: u32) -> Self {
        SynapseId(id)
    }

    /// Get the raw value as an index.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Uniform range for randomized synapse strengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthRange {
    /// Lower bound (inclusive)
    pub low: f64,
    /// Upper bound (inclusive)
    pub high: f64,
}

impl Default for StrengthRange {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 1.0,
        }
    }
}

impl StrengthRange {
    /// Draw a strength from the range.
    #[inline]
    pub fn sample(&self, rng: &mut StdRng) -> f64 {
        rng.gen_range(self.low..=self.high)
    }
}

/// A weighted connection from a source neuron to a target neuron.
#[derive(Debug, Clone)]
pub struct Synapse {
    source: NeuronId,
    target: NeuronId,
    strength: f64,
    owner: Option<GroupId>,
}

impl Synapse {
    /// Create a synapse. New synapses are loose (owned by the network root)
    /// until a group claims them.
    pub fn new(source: NeuronId, target: NeuronId, strength: f64) -> Self {
        Self {
            source,
            target,
            strength,
            owner: None,
        }
    }

    /// Source neuron.
    #[inline]
    pub fn source(&self) -> NeuronId {
        self.source
    }

    /// Target neuron.
    #[inline]
    pub fn target(&self) -> NeuronId {
        self.target
    }

    /// Current strength.
    #[inline]
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Set the strength.
    #[inline]
    pub fn set_strength(&mut self, strength: f64) {
        self.strength = strength;
    }

    /// Owning group, or None when loose.
    #[inline]
    pub fn owner(&self) -> Option<GroupId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<GroupId>) {
        self.owner = owner;
    }

    /// Replace the strength with a draw from `range`.
    pub fn randomize(&mut self, range: &StrengthRange, rng: &mut StdRng) {
        self.strength = range.sample(rng);
    }
}

/// Owned, indexed collection of synapses with stable ids.
///
/// Same slot discipline as [`crate::neuron::NeuronArena`]: removal leaves a
/// tombstone and ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct SynapseArena {
    slots: Vec<Option<Synapse>>,
}

impl SynapseArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a synapse, returning its id.
    pub fn insert(&mut self, synapse: Synapse) -> SynapseId {
        let id = SynapseId(self.slots.len() as u32);
        self.slots.push(Some(synapse));
        id
    }

    /// Remove a synapse, returning it if the id was live.
    pub fn remove(&mut self, id: SynapseId) -> Option<Synapse> {
        self.slots.get_mut(id.as_usize()).and_then(Option::take)
    }

    /// Get a synapse by id.
    pub fn get(&self, id: SynapseId) -> Option<&Synapse> {
        self.slots.get(id.as_usize()).and_then(Option::as_ref)
    }

    /// Get a synapse mutably by id.
    pub fn get_mut(&mut self, id: SynapseId) -> Option<&mut Synapse> {
        self.slots.get_mut(id.as_usize()).and_then(Option::as_mut)
    }

    /// Number of live synapses.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True if no live synapses remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate live synapses in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SynapseId, &Synapse)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (SynapseId(i as u32), s)))
    }
}

impl std::ops::Index<SynapseId> for SynapseArena {
    type Output = Synapse;

    fn index(&self, id: SynapseId) -> &Synapse {
        self.slots[id.as_usize()].as_ref().expect("stale synapse id")
    }
}

impl std::ops::IndexMut<SynapseId> for SynapseArena {
    fn index_mut(&mut self, id: SynapseId) -> &mut Synapse {
        self.slots[id.as_usize()].as_mut().expect("stale synapse id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn ids() -> (NeuronId, NeuronId) {
        (NeuronId::from_raw(0), NeuronId::from_raw(1))
    }

    #[test]
    fn test_new_synapse_is_loose() {
        let (src, tgt) = ids();
        let syn = Synapse::new(src, tgt, 0.5);
        assert_eq!(syn.owner(), None);
        assert_eq!(syn.strength(), 0.5);
        assert_eq!(syn.source(), src);
        assert_eq!(syn.target(), tgt);
    }

    #[test]
    fn test_randomize_within_range() {
        let (src, tgt) = ids();
        let mut syn = Synapse::new(src, tgt, 99.0);
        let range = StrengthRange {
            low: 0.25,
            high: 0.75,
        };
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            syn.randomize(&range, &mut rng);
            assert!(syn.strength() >= 0.25 && syn.strength() <= 0.75);
        }
    }

    #[test]
    fn test_randomize_deterministic() {
        let (src, tgt) = ids();
        let range = StrengthRange::default();

        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let mut a = Synapse::new(src, tgt, 0.0);
        let mut b = Synapse::new(src, tgt, 1.0);
        a.randomize(&range, &mut rng1);
        b.randomize(&range, &mut rng2);

        assert_eq!(a.strength(), b.strength());
    }

    #[test]
    fn test_arena_tombstones() {
        let (src, tgt) = ids();
        let mut arena = SynapseArena::new();
        let a = arena.insert(Synapse::new(src, tgt, 0.1));
        let b = arena.insert(Synapse::new(src, tgt, 0.2));

        assert_eq!(arena.len(), 2);
        let removed = arena.remove(a).unwrap();
        assert_eq!(removed.strength(), 0.1);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.len(), 1);
        assert_eq!(arena[b].strength(), 0.2);

        let c = arena.insert(Synapse::new(src, tgt, 0.3));
        assert_ne!(c, a);
        assert_eq!(arena.iter().count(), 2);
    }
}
