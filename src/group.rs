//! Ordered membership collections for neurons and synapses.
//!
//! Groups are thin, insertion-order-significant id lists. The arenas own the
//! actual neurons and synapses; a group only records which of them belong to
//! it and in what order. Iteration order is the order members were added,
//! which is the order every update cycle scans them in.

use crate::neuron::NeuronId;
use crate::synapse::SynapseId;
use serde::{Deserialize, Serialize};

/// Ordered collection of neuron ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeuronGroup {
    members: Vec<NeuronId>,
}

impl NeuronGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member.
    pub fn push(&mut self, id: NeuronId) {
        self.members.push(id);
    }

    /// Remove a member, returning true if it was present.
    pub fn remove(&mut self, id: NeuronId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        self.members.len() != before
    }

    /// Membership test.
    pub fn contains(&self, id: NeuronId) -> bool {
        self.members.contains(&id)
    }

    /// Members in insertion order.
    #[inline]
    pub fn as_slice(&self) -> &[NeuronId] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Ordered collection of synapse ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynapseGroup {
    members: Vec<SynapseId>,
}

impl SynapseGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member.
    pub fn push(&mut self, id: SynapseId) {
        self.members.push(id);
    }

    /// Remove a member, returning true if it was present.
    pub fn remove(&mut self, id: SynapseId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        self.members.len() != before
    }

    /// Membership test.
    pub fn contains(&self, id: SynapseId) -> bool {
        self.members.contains(&id)
    }

    /// Members in insertion order.
    #[inline]
    pub fn as_slice(&self) -> &[SynapseId] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neuron_group_order() {
        let mut group = NeuronGroup::new();
        let ids: Vec<_> = (0..5).map(NeuronId::from_raw).collect();
        for &id in &ids {
            group.push(id);
        }

        assert_eq!(group.as_slice(), ids.as_slice());
        assert!(group.contains(ids[3]));

        assert!(group.remove(ids[2]));
        assert!(!group.remove(ids[2]));
        assert_eq!(group.as_slice(), &[ids[0], ids[1], ids[3], ids[4]]);
    }

    #[test]
    fn test_synapse_group_order() {
        let mut group = SynapseGroup::new();
        let a = SynapseId::from_raw(0);
        let b = SynapseId::from_raw(1);

        group.push(a);
        group.push(b);
        assert_eq!(group.len(), 2);
        assert!(group.remove(a));
        assert_eq!(group.as_slice(), &[b]);
        assert!(!group.contains(a));
    }
}
