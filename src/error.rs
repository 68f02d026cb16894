//! Error types for the wtanet crate.
//!
//! This module provides a unified error type for all operations in wtanet,
//! using the `thiserror` crate for ergonomic error handling.
//!
//! Numeric degeneracy is deliberately not an error: a zero divisor during
//! weight normalization propagates non-finite strengths to the caller (see
//! the `competitive` module docs). Errors are reserved for invalid
//! construction, unknown ids handed to the network, and I/O.

use thiserror::Error;

/// The main error type for wtanet operations.
#[derive(Error, Debug)]
pub enum WtanetError {
    /// Construction parameters do not describe a usable group or network
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Group id does not name a live group
    #[error("unknown group id {index}")]
    UnknownGroup {
        /// The raw id that failed to resolve
        index: usize,
    },

    /// Neuron id does not name a live neuron
    #[error("unknown neuron id {index}")]
    UnknownNeuron {
        /// The raw id that failed to resolve
        index: usize,
    },

    /// Synapse id does not name a live synapse
    #[error("unknown synapse id {index}")]
    UnknownSynapse {
        /// The raw id that failed to resolve
        index: usize,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error occurred
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

/// A specialized `Result` type for wtanet operations.
///
/// This is a type alias for `Result<T, WtanetError>` and is used
/// throughout the crate for consistency.
pub type Result<T> = std::result::Result<T, WtanetError>;
