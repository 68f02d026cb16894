//! Wtanet - Competitive learning networks with winner-take-all dynamics.
//!
//! Wtanet implements unsupervised competitive learning over small,
//! fixed-topology neuron groups. Each update cycle selects a single winner
//! by activation, clamps winners and losers to configured values, and moves
//! the winner's incoming weights toward its (optionally normalized) input
//! pattern. Synapses created anywhere in the network are claimed dynamically
//! by the group that contains their target.
//!
//! # Architecture
//!
//! The crate is built around a few core components:
//!
//! - **Neuron / Synapse**: activation and strength state, held in indexed
//!   arenas with stable ids
//! - **NeuronGroup / SynapseGroup**: ordered membership collections; scan
//!   order is insertion order
//! - **Competitive**: the winner-take-all engine running one update cycle of
//!   winner selection, clamping, and weight adaptation
//! - **Network**: owns the arenas and groups, carries the global clamp
//!   flags, and runs the wiring bus that routes new synapses to the group
//!   containing their target
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
//! // Wire one input neuron to each member
//! let members = net.group(group).unwrap().neurons().as_slice().to_vec();
//! for (i, &member) in members.iter().enumerate() {
//!     let input = net.add_neuron(Default::default());
//!     net.set_activation(input, [0.2, 0.9, 0.5][i]);
//!     net.connect(input, member, 0.5).unwrap();
//! }
//!
//! // One tick: the strongest input wins and its weight adapts
//! net.update().unwrap();
//! let engine = net.group(group).unwrap();
//! assert_eq!(engine.winner(), 1);
//!
//! let won = members[1];
//! assert_eq!(net.activation(won), 1.0);
//! ```
//!
//! # Determinism
//!
//! Winner selection is a pure scan over the member order: re-running it on
//! an unchanged activation vector yields the same index, and ties resolve to
//! the earliest member. Randomized weight draws take a caller-seeded rng, so
//! whole runs are reproducible.
//!
//! # Concurrency
//!
//! Single-threaded by design. An external scheduler invokes one update per
//! tick; every cycle either completes synchronously or stops early at the
//! zero-input guard (see the `competitive` module docs). Hosts with their
//! own concurrency must serialize ticks per group.

pub mod competitive;
pub mod error;
pub mod group;
pub mod layout;
pub mod network;
pub mod network_config;
pub mod neuron;
pub mod synapse;

// Re-exports for convenient access
pub use competitive::{Competitive, CompetitiveConfig};
pub use error::{Result, WtanetError};
pub use group::{NeuronGroup, SynapseGroup};
pub use layout::{GridLayout, Layout, LineLayout};
pub use network::{GroupId, Network, NetworkEvent};
pub use network_config::{ConnectionEntry, GroupEntry, NetworkConfig, NeuronEntry};
pub use neuron::{LinearRule, Neuron, NeuronArena, NeuronId};
pub use synapse::{StrengthRange, Synapse, SynapseArena, SynapseId};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "wtanet";

/// Get version string
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}
