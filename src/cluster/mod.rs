//! Community detection on weighted undirected graphs
//!
//! The clusterer knows nothing about scenes or characters. It takes plain
//! `usize` node keys and weighted edges, and returns a [`Partition`] mapping
//! every node to a community.

pub mod error;
pub mod louvain;

pub use error::ClusterError;
pub use louvain::{Dendrogram, Edge, Louvain, Partition};
