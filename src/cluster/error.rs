//! Error types for community detection

use thiserror::Error;

/// Errors raised while setting up a clustering run
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClusterError {
    /// Edges were supplied before the node set
    #[error("graph nodes must be provided before edges")]
    MissingNodes,

    /// An edge or partition hint refers to a node that is not in the node set
    #[error("unknown node {node}")]
    UnknownNode { node: usize },

    /// Edge weights must be finite and strictly positive
    #[error("edge {from} -- {to} has non-positive weight {weight}; use positive weights")]
    NonPositiveWeight { from: usize, to: usize, weight: f64 },
}

impl ClusterError {
    /// Create a non-positive weight error
    pub fn non_positive(from: usize, to: usize, weight: f64) -> Self {
        Self::NonPositiveWeight { from, to, weight }
    }
}
