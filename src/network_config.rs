//! Network configuration serialization.
//!
//! This module provides types and methods for serializing and deserializing
//! network architectures: group parameters, free neurons, and connection
//! topology with current strengths. Supports JSON (human-readable) and
//! bincode (compact binary) formats.
//!
//! Reloading replays the captured connections through the wiring bus, so
//! group ownership of synapses is re-derived from membership rather than
//! stored. Transient state (activations, winner indices) is not captured.
//!
//! # Example
//!
//! ```
//! use wtanet::{CompetitiveConfig, LineLayout, Network, NetworkConfig};
//!
//! let mut net = Network::new();
//! net.add_competitive(CompetitiveConfig::default(), &LineLayout::default())
//!     .unwrap();
//!
//! let config = net.to_config();
//! let json = config.to_json().unwrap();
//!
//! let restored = Network::from_config(&NetworkConfig::from_json(&json).unwrap()).unwrap();
//! assert_eq!(restored.group_ids().len(), 1);
//! ```

use crate::competitive::{Competitive, CompetitiveConfig};
use crate::error::{Result, WtanetError};
use crate::group::NeuronGroup;
use crate::network::Network;
use crate::neuron::{LinearRule, Neuron, NeuronId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One neuron in a captured network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronEntry {
    /// Activation rule
    pub rule: LinearRule,
    /// Spatial position
    pub position: [f64; 2],
    /// Index into [`NetworkConfig::groups`], or None for a free neuron
    pub group: Option<usize>,
}

/// One competitive group in a captured network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    /// Human-readable label
    pub label: String,
    /// Group parameters
    pub config: CompetitiveConfig,
}

/// One synapse in a captured network.
///
/// Indices refer to positions in [`NetworkConfig::neurons`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionEntry {
    /// Source neuron index
    pub source: usize,
    /// Target neuron index
    pub target: usize,
    /// Strength at capture time
    pub strength: f64,
}

/// Complete network configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Version of the serialization format
    pub version: String,

    /// Neurons in arena order; group members reference their group
    pub neurons: Vec<NeuronEntry>,

    /// Groups in creation order
    pub groups: Vec<GroupEntry>,

    /// Connections in creation order
    pub connections: Vec<ConnectionEntry>,

    /// Optional metadata (name, description, etc.)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl NetworkConfig {
    /// Add metadata to the configuration.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| WtanetError::Other(e.to_string()))
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| WtanetError::Other(e.to_string()))
    }

    /// Serialize to binary (bincode).
    pub fn to_binary(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from binary (bincode).
    pub fn from_binary(data: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(data)?)
    }

    /// Check internal index consistency.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.neurons {
            if let Some(g) = entry.group {
                if g >= self.groups.len() {
                    return Err(WtanetError::InvalidConfiguration(format!(
                        "neuron references group {} of {}",
                        g,
                        self.groups.len()
                    )));
                }
            }
        }
        for conn in &self.connections {
            if conn.source >= self.neurons.len() || conn.target >= self.neurons.len() {
                return Err(WtanetError::InvalidConfiguration(format!(
                    "connection {} -> {} references a neuron out of {}",
                    conn.source,
                    conn.target,
                    self.neurons.len()
                )));
            }
        }
        Ok(())
    }
}

impl Network {
    /// Capture the network's architecture and current strengths.
    pub fn to_config(&self) -> NetworkConfig {
        let group_ids = self.group_ids();
        let mut groups = Vec::with_capacity(group_ids.len());
        let mut membership: HashMap<NeuronId, usize> = HashMap::new();

        for (index, &gid) in group_ids.iter().enumerate() {
            let engine = self.group(gid).expect("live group id");
            groups.push(GroupEntry {
                label: engine.label().to_string(),
                config: *engine.config(),
            });
            for &nid in engine.neurons().as_slice() {
                membership.insert(nid, index);
            }
        }

        let mut neurons = Vec::new();
        let mut neuron_index: HashMap<NeuronId, usize> = HashMap::new();
        for (nid, neuron) in self.neurons().iter() {
            neuron_index.insert(nid, neurons.len());
            neurons.push(NeuronEntry {
                rule: neuron.rule(),
                position: neuron.position(),
                group: membership.get(&nid).copied(),
            });
        }

        let connections = self
            .synapses_arena()
            .iter()
            .map(|(_, syn)| ConnectionEntry {
                source: neuron_index[&syn.source()],
                target: neuron_index[&syn.target()],
                strength: syn.strength(),
            })
            .collect();

        NetworkConfig {
            version: env!("CARGO_PKG_VERSION").to_string(),
            neurons,
            groups,
            connections,
            metadata: HashMap::new(),
        }
    }

    /// Rebuild a network from a captured configuration.
    ///
    /// Connections are replayed through the wiring bus, so groups claim
    /// their synapses exactly as they would have live.
    pub fn from_config(config: &NetworkConfig) -> Result<Network> {
        config.validate()?;

        let mut net = Network::new();
        let mut created: Vec<NeuronId> = Vec::with_capacity(config.neurons.len());
        let mut members: Vec<NeuronGroup> = config.groups.iter().map(|_| NeuronGroup::new()).collect();

        for entry in &config.neurons {
            let mut neuron = Neuron::new(entry.rule);
            neuron.set_position(entry.position);
            let nid = net.neurons_mut().insert(neuron);
            if let Some(g) = entry.group {
                members[g].push(nid);
            }
            created.push(nid);
        }

        for (entry, membership) in config.groups.iter().zip(members) {
            let engine = Competitive::restore(entry.config, entry.label.clone(), membership)?;
            net.install_group(engine);
        }

        for conn in &config.connections {
            net.connect(created[conn.source], created[conn.target], conn.strength)?;
        }

        // Replay produced creation/claim notifications nobody subscribed to
        net.drain_events();
        Ok(net)
    }

    /// Save the captured configuration to a binary file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = self.to_config().to_binary()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Load a network from a binary file written by [`Network::save`].
    pub fn load(path: &Path) -> Result<Network> {
        let data = std::fs::read(path)?;
        Network::from_config(&NetworkConfig::from_binary(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LineLayout;

    fn sample_config() -> NetworkConfig {
        NetworkConfig {
            version: env!("CARGO_PKG_VERSION").to_string(),
            neurons: vec![
                NeuronEntry {
                    rule: LinearRule::default(),
                    position: [0.0, 0.0],
                    group: Some(0),
                },
                NeuronEntry {
                    rule: LinearRule::default(),
                    position: [45.0, 0.0],
                    group: Some(0),
                },
                NeuronEntry {
                    rule: LinearRule::default(),
                    position: [0.0, 100.0],
                    group: None,
                },
            ],
            groups: vec![GroupEntry {
                label: "competitive".to_string(),
                config: CompetitiveConfig {
                    size: 2,
                    ..CompetitiveConfig::default()
                },
            }],
            connections: vec![ConnectionEntry {
                source: 2,
                target: 0,
                strength: 0.5,
            }],
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let config = sample_config();
        let json = config.to_json().unwrap();
        let restored = NetworkConfig::from_json(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_binary_round_trip() {
        let config = sample_config();
        let binary = config.to_binary().unwrap();
        let restored = NetworkConfig::from_binary(&binary).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_validate_rejects_bad_indices() {
        let mut config = sample_config();
        config.connections[0].target = 17;
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.neurons[0].group = Some(9);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metadata() {
        let config = sample_config()
            .with_metadata("name", "test network")
            .with_metadata("author", "test user");
        assert_eq!(config.metadata.get("name").unwrap(), "test network");
        assert_eq!(config.metadata.get("author").unwrap(), "test user");
    }

    #[test]
    fn test_from_config_rebuilds_and_claims() {
        let net = Network::from_config(&sample_config()).unwrap();

        assert_eq!(net.neuron_count(), 3);
        assert_eq!(net.synapse_count(), 1);

        let gids = net.group_ids();
        assert_eq!(gids.len(), 1);
        let engine = net.group(gids[0]).unwrap();
        assert_eq!(engine.size(), 2);
        // The replayed connection targets a member, so the group owns it
        assert_eq!(engine.synapses().len(), 1);
    }

    #[test]
    fn test_capture_matches_rebuild() {
        let mut net = Network::new();
        let group = net
            .add_competitive(
                CompetitiveConfig {
                    size: 3,
                    ..CompetitiveConfig::default()
                },
                &LineLayout::default(),
            )
            .unwrap();
        let input = net.add_neuron(LinearRule::default());
        let member = net.group(group).unwrap().neurons().as_slice()[0];
        net.connect(input, member, 0.25).unwrap();

        let config = net.to_config();
        let restored = Network::from_config(&config).unwrap();
        assert_eq!(restored.to_config(), config);
    }
}
