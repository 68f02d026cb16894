//! Network - Arena ownership, wiring bus, and the tick entry point.
//!
//! The [`Network`] owns everything the engines operate on: the neuron and
//! synapse arenas, the loose (root-owned) synapse collection, the competitive
//! groups themselves, and the global clamp flags. An external scheduler calls
//! [`Network::update`] once per tick; all mutation happens synchronously
//! inside that call.
//!
//! # Wiring bus
//!
//! Groups register on the bus when they are added and deregister when they
//! are removed. [`Network::connect`] creates a synapse loose, then announces
//! it: every registered group whose membership contains the target claims the
//! synapse, detaching it from its current owner, attaching it to the group's
//! collection, and queueing a [`NetworkEvent::SynapseAdded`]. A target outside
//! every registered group is a silent no-op and the synapse stays loose.
//!
//! # Examples
//!
//! ```
//! use wtanet::{CompetitiveConfig, LineLayout, Network, NetworkEvent};
//!
//! let mut net = Network::new();
//! let config = CompetitiveConfig { size: 2, ..CompetitiveConfig::default() };
//! let group = net.add_competitive(config, &LineLayout::default()).unwrap();
//!
//! let input = net.add_neuron(Default::default());
//! let member = net.group(group).unwrap().neurons().as_slice()[0];
//! let syn = net.connect(input, member, 0.5).unwrap();
//!
//! // The group claimed the new synapse
//! assert!(net.group(group).unwrap().synapses().contains(syn));
//! let events = net.drain_events();
//! assert!(events.contains(&NetworkEvent::SynapseAdded { group, synapse: syn }));
//! ```

use crate::competitive::{Competitive, CompetitiveConfig};
use crate::error::{Result, WtanetError};
use crate::group::SynapseGroup;
use crate::layout::Layout;
use crate::neuron::{LinearRule, Neuron, NeuronArena, NeuronId};
use crate::synapse::{Synapse, SynapseArena, SynapseId};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace};

/// Unique identifier for a group in a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(u32);

impl GroupId {
    /// Create a GroupId from a raw u32 value (for testing).
    #[doc(hidden)]
    pub fn from_raw(id: u32) -> Self {
        GroupId(id)
    }

    /// Get the raw value as an index.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Notifications published by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    /// A synapse was created (still loose at this point)
    SynapseCreated {
        /// The new synapse
        synapse: SynapseId,
    },
    /// A group claimed a synapse targeting one of its members
    SynapseAdded {
        /// The claiming group
        group: GroupId,
        /// The claimed synapse
        synapse: SynapseId,
    },
}

/// Owns the arenas, the groups, and the wiring bus.
#[derive(Debug, Default)]
pub struct Network {
    neurons: NeuronArena,
    synapses: SynapseArena,
    /// Synapses owned by the network root (claimed by no group)
    loose: SynapseGroup,
    /// Group slots; removal leaves a tombstone so ids stay stable
    groups: Vec<Option<Competitive>>,
    /// Wiring-bus registrations, walked in order when a synapse is announced
    registrations: Vec<GroupId>,
    clamp_neurons: bool,
    clamp_weights: bool,
    events: VecDeque<NetworkEvent>,
}

impl Network {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a free-standing neuron (typically an input layer neuron).
    pub fn add_neuron(&mut self, rule: LinearRule) -> NeuronId {
        self.neurons.insert(Neuron::new(rule))
    }

    /// Read a neuron's activation.
    ///
    /// # Panics
    ///
    /// Panics on a stale id, like arena indexing.
    pub fn activation(&self, neuron: NeuronId) -> f64 {
        self.neurons[neuron].activation()
    }

    /// Write a neuron's activation.
    pub fn set_activation(&mut self, neuron: NeuronId, activation: f64) {
        self.neurons[neuron].set_activation(activation);
    }

    /// Get a neuron by id.
    pub fn neuron(&self, neuron: NeuronId) -> Option<&Neuron> {
        self.neurons.get(neuron)
    }

    /// Get a synapse by id.
    pub fn synapse(&self, synapse: SynapseId) -> Option<&Synapse> {
        self.synapses.get(synapse)
    }

    /// Number of live neurons.
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Number of live synapses.
    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    /// Synapses owned by the network root.
    pub fn loose_synapses(&self) -> &SynapseGroup {
        &self.loose
    }

    /// Build a competitive group and register it on the wiring bus.
    pub fn add_competitive(
        &mut self,
        config: CompetitiveConfig,
        layout: &dyn Layout,
    ) -> Result<GroupId> {
        let group = Competitive::new(config, &mut self.neurons, layout)?;
        let id = GroupId(self.groups.len() as u32);
        debug!(group = id.as_usize(), size = group.size(), "group added");
        self.groups.push(Some(group));
        self.registrations.push(id);
        Ok(id)
    }

    pub(crate) fn install_group(&mut self, group: Competitive) -> GroupId {
        let id = GroupId(self.groups.len() as u32);
        self.groups.push(Some(group));
        self.registrations.push(id);
        id
    }

    /// Get a group by id.
    pub fn group(&self, group: GroupId) -> Option<&Competitive> {
        self.groups.get(group.as_usize()).and_then(Option::as_ref)
    }

    /// Get a group mutably by id (parameter setters live on the group).
    pub fn group_mut(&mut self, group: GroupId) -> Option<&mut Competitive> {
        self.groups.get_mut(group.as_usize()).and_then(Option::as_mut)
    }

    /// Ids of live groups, in creation order.
    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| GroupId(i as u32)))
            .collect()
    }

    /// Create a synapse and announce it on the wiring bus.
    ///
    /// The synapse starts loose and is appended to the target's fan-in; a
    /// registered group containing the target then claims it.
    pub fn connect(
        &mut self,
        source: NeuronId,
        target: NeuronId,
        strength: f64,
    ) -> Result<SynapseId> {
        if self.neurons.get(source).is_none() {
            return Err(WtanetError::UnknownNeuron {
                index: source.as_usize(),
            });
        }
        if self.neurons.get(target).is_none() {
            return Err(WtanetError::UnknownNeuron {
                index: target.as_usize(),
            });
        }

        let id = self.synapses.insert(Synapse::new(source, target, strength));
        self.loose.push(id);
        self.neurons[target].push_fan_in(id);
        self.events.push_back(NetworkEvent::SynapseCreated { synapse: id });
        self.announce_synapse(id);
        Ok(id)
    }

    /// Announce a synapse to every registered group.
    ///
    /// Each registered group whose membership contains the synapse's target
    /// claims it; all other registrations ignore it. Announcing a stale id
    /// is a no-op.
    pub fn announce_synapse(&mut self, synapse: SynapseId) {
        let target = match self.synapses.get(synapse) {
            Some(syn) => syn.target(),
            None => return,
        };

        let claims: Vec<GroupId> = self
            .registrations
            .iter()
            .copied()
            .filter(|gid| {
                self.groups
                    .get(gid.as_usize())
                    .and_then(Option::as_ref)
                    .map_or(false, |g| g.contains(target))
            })
            .collect();

        for gid in claims {
            if self.attach_synapse(gid, synapse).is_ok() {
                trace!(
                    synapse = synapse.as_usize(),
                    group = gid.as_usize(),
                    "synapse claimed"
                );
                self.events.push_back(NetworkEvent::SynapseAdded {
                    group: gid,
                    synapse,
                });
            }
        }
    }

    /// Transfer a synapse into a group's collection.
    ///
    /// Explicit detach-then-attach: the synapse leaves its current owner
    /// (another group or the loose collection) before joining the new one.
    pub fn attach_synapse(&mut self, group: GroupId, synapse: SynapseId) -> Result<()> {
        if self
            .groups
            .get(group.as_usize())
            .and_then(Option::as_ref)
            .is_none()
        {
            return Err(WtanetError::UnknownGroup {
                index: group.as_usize(),
            });
        }
        if self.synapses.get(synapse).is_none() {
            return Err(WtanetError::UnknownSynapse {
                index: synapse.as_usize(),
            });
        }

        self.detach_synapse(synapse);
        let engine = self
            .groups
            .get_mut(group.as_usize())
            .and_then(Option::as_mut)
            .ok_or(WtanetError::UnknownGroup {
                index: group.as_usize(),
            })?;
        engine.synapses_mut().push(synapse);
        self.synapses[synapse].set_owner(Some(group));
        Ok(())
    }

    /// Remove a synapse from its current owning collection.
    fn detach_synapse(&mut self, synapse: SynapseId) {
        let owner = match self.synapses.get(synapse) {
            Some(syn) => syn.owner(),
            None => return,
        };
        match owner {
            Some(gid) => {
                if let Some(engine) = self.groups.get_mut(gid.as_usize()).and_then(Option::as_mut)
                {
                    engine.synapses_mut().remove(synapse);
                }
            }
            None => {
                self.loose.remove(synapse);
            }
        }
        self.synapses[synapse].set_owner(None);
    }

    /// Tick every registered group, in registration order.
    pub fn update(&mut self) -> Result<()> {
        for gid in self.registrations.clone() {
            self.update_group(gid)?;
        }
        Ok(())
    }

    /// Tick a single group.
    pub fn update_group(&mut self, group: GroupId) -> Result<()> {
        let clamp_neurons = self.clamp_neurons;
        let clamp_weights = self.clamp_weights;
        let engine = self
            .groups
            .get_mut(group.as_usize())
            .and_then(Option::as_mut)
            .ok_or(WtanetError::UnknownGroup {
                index: group.as_usize(),
            })?;
        engine.update(
            &mut self.neurons,
            &mut self.synapses,
            clamp_neurons,
            clamp_weights,
        );
        Ok(())
    }

    /// Normalize a group's incoming strengths per neuron.
    pub fn normalize_incoming_weights(&mut self, group: GroupId) -> Result<()> {
        let engine = self
            .groups
            .get(group.as_usize())
            .and_then(Option::as_ref)
            .ok_or(WtanetError::UnknownGroup {
                index: group.as_usize(),
            })?;
        engine.normalize_incoming_weights(&self.neurons, &mut self.synapses);
        Ok(())
    }

    /// Normalize a group's incoming strengths by the group-wide total.
    pub fn normalize_all_incoming_weights(&mut self, group: GroupId) -> Result<()> {
        let engine = self
            .groups
            .get(group.as_usize())
            .and_then(Option::as_ref)
            .ok_or(WtanetError::UnknownGroup {
                index: group.as_usize(),
            })?;
        engine.normalize_all_incoming_weights(&self.neurons, &mut self.synapses);
        Ok(())
    }

    /// Redraw a group's incoming strengths from its configured range.
    pub fn randomize_incoming_weights(&mut self, group: GroupId, rng: &mut StdRng) -> Result<()> {
        let engine = self
            .groups
            .get(group.as_usize())
            .and_then(Option::as_ref)
            .ok_or(WtanetError::UnknownGroup {
                index: group.as_usize(),
            })?;
        engine.randomize_incoming_weights(&self.neurons, &mut self.synapses, rng);
        Ok(())
    }

    /// Randomize then normalize a group's incoming strengths.
    pub fn randomize_group(&mut self, group: GroupId, rng: &mut StdRng) -> Result<()> {
        let engine = self
            .groups
            .get(group.as_usize())
            .and_then(Option::as_ref)
            .ok_or(WtanetError::UnknownGroup {
                index: group.as_usize(),
            })?;
        engine.randomize(&self.neurons, &mut self.synapses, rng);
        Ok(())
    }

    /// Remove a group: deregister it from the wiring bus and delete its
    /// neurons, its owned synapses, and every synapse referencing a deleted
    /// neuron.
    pub fn remove_group(&mut self, group: GroupId) -> Result<()> {
        let engine = self
            .groups
            .get_mut(group.as_usize())
            .and_then(|slot| slot.take())
            .ok_or(WtanetError::UnknownGroup {
                index: group.as_usize(),
            })?;
        self.registrations.retain(|g| *g != group);

        // Owned synapses go first, keeping surviving fan-ins consistent
        for &sid in engine.synapses().as_slice() {
            if let Some(syn) = self.synapses.remove(sid) {
                if let Some(target) = self.neurons.get_mut(syn.target()) {
                    target.remove_fan_in(sid);
                }
            }
        }

        // Then the member neurons and anything still wired to them
        let members: HashSet<NeuronId> = engine.neurons().as_slice().iter().copied().collect();
        for &nid in engine.neurons().as_slice() {
            self.neurons.remove(nid);
        }

        let orphaned: Vec<SynapseId> = self
            .synapses
            .iter()
            .filter(|(_, syn)| members.contains(&syn.source()) || members.contains(&syn.target()))
            .map(|(sid, _)| sid)
            .collect();
        for sid in orphaned {
            if let Some(syn) = self.synapses.remove(sid) {
                match syn.owner() {
                    Some(gid) => {
                        if let Some(other) =
                            self.groups.get_mut(gid.as_usize()).and_then(Option::as_mut)
                        {
                            other.synapses_mut().remove(sid);
                        }
                    }
                    None => {
                        self.loose.remove(sid);
                    }
                }
                if let Some(target) = self.neurons.get_mut(syn.target()) {
                    target.remove_fan_in(sid);
                }
            }
        }

        debug!(group = group.as_usize(), "group removed");
        Ok(())
    }

    /// Whether activation clamping is on.
    #[inline]
    pub fn clamp_neurons(&self) -> bool {
        self.clamp_neurons
    }

    /// Suppress win/lose activation writes during updates.
    pub fn set_clamp_neurons(&mut self, clamp: bool) {
        self.clamp_neurons = clamp;
    }

    /// Whether weight clamping is on.
    #[inline]
    pub fn clamp_weights(&self) -> bool {
        self.clamp_weights
    }

    /// Suppress strength adaptation during updates.
    pub fn set_clamp_weights(&mut self, clamp: bool) {
        self.clamp_weights = clamp;
    }

    /// Drain all queued notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<NetworkEvent> {
        self.events.drain(..).collect()
    }

    pub(crate) fn neurons(&self) -> &NeuronArena {
        &self.neurons
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut NeuronArena {
        &mut self.neurons
    }

    pub(crate) fn synapses_arena(&self) -> &SynapseArena {
        &self.synapses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LineLayout;

    fn small_config(size: usize) -> CompetitiveConfig {
        CompetitiveConfig {
            size,
            ..CompetitiveConfig::default()
        }
    }

    #[test]
    fn test_connect_unknown_neuron() {
        let mut net = Network::new();
        let a = net.add_neuron(LinearRule::default());
        let ghost = NeuronId::from_raw(99);
        assert!(matches!(
            net.connect(a, ghost, 0.5),
            Err(WtanetError::UnknownNeuron { index: 99 })
        ));
    }

    #[test]
    fn test_connect_outside_groups_stays_loose() {
        let mut net = Network::new();
        let a = net.add_neuron(LinearRule::default());
        let b = net.add_neuron(LinearRule::default());
        let syn = net.connect(a, b, 0.5).unwrap();

        assert!(net.loose_synapses().contains(syn));
        assert_eq!(net.synapse(syn).unwrap().owner(), None);
        assert_eq!(
            net.drain_events(),
            vec![NetworkEvent::SynapseCreated { synapse: syn }]
        );
    }

    #[test]
    fn test_fan_in_records_connection() {
        let mut net = Network::new();
        let a = net.add_neuron(LinearRule::default());
        let b = net.add_neuron(LinearRule::default());
        let syn = net.connect(a, b, 0.5).unwrap();

        assert_eq!(net.neuron(b).unwrap().fan_in(), &[syn]);
        assert!(net.neuron(a).unwrap().fan_in().is_empty());
    }

    #[test]
    fn test_group_ids_skip_removed() {
        let mut net = Network::new();
        let a = net
            .add_competitive(small_config(2), &LineLayout::default())
            .unwrap();
        let b = net
            .add_competitive(small_config(2), &LineLayout::default())
            .unwrap();

        net.remove_group(a).unwrap();
        assert_eq!(net.group_ids(), vec![b]);
        assert!(net.group(a).is_none());
        assert!(matches!(
            net.update_group(a),
            Err(WtanetError::UnknownGroup { .. })
        ));
    }

    #[test]
    fn test_update_unknown_group() {
        let mut net = Network::new();
        assert!(matches!(
            net.update_group(GroupId::from_raw(3)),
            Err(WtanetError::UnknownGroup { index: 3 })
        ));
    }
}
