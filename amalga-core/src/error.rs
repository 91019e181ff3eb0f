//! Error types for the Amalga core library.
//!
//! Defines the error enum produced by [`crate::Graph`] operations together
//! with stable machine-readable error codes.

use thiserror::Error;

use crate::graph::NodeKey;

/// An error produced by [`crate::Graph`] construction or mutation.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError<K: NodeKey> {
    /// A key was not registered when the graph was constructed.
    #[error("node {node:?} is not registered in the graph")]
    UnknownNode {
        /// The key that failed the position lookup.
        node: K,
    },
    /// The node was already merged away and only its weight slot remains.
    #[error("node {node:?} has already been merged away")]
    Tombstoned {
        /// The tombstoned key.
        node: K,
    },
    /// A contraction named the same node as destination and origin.
    #[error("cannot merge node {node:?} into itself")]
    SelfMerge {
        /// The offending key.
        node: K,
    },
    /// The weight sequence contained the same key twice.
    #[error("duplicate weight entry for node {node:?}")]
    DuplicateNode {
        /// The duplicated key.
        node: K,
    },
    /// An adjacency key had no corresponding weight entry.
    #[error("node {node:?} appears in the adjacency but has no weight entry")]
    MissingWeight {
        /// The key without a weight.
        node: K,
    },
    /// A weighted key had no corresponding adjacency entry.
    #[error("node {node:?} has a weight entry but no adjacency entry")]
    MissingAdjacency {
        /// The key without an adjacency set.
        node: K,
    },
    /// An adjacency set referenced a key that is not a node.
    #[error("adjacency for {node:?} references unregistered neighbour {neighbour:?}")]
    UnknownNeighbour {
        /// The node whose adjacency set is invalid.
        node: K,
        /// The unregistered neighbour it referenced.
        neighbour: K,
    },
    /// A node weight was negative or non-finite at construction.
    #[error("node {node:?} has invalid weight {weight} (must be finite and non-negative)")]
    InvalidWeight {
        /// The node carrying the invalid weight.
        node: K,
        /// The rejected weight value.
        weight: f64,
    },
}

impl<K: NodeKey> GraphError<K> {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> GraphErrorCode {
        match self {
            Self::UnknownNode { .. } => GraphErrorCode::UnknownNode,
            Self::Tombstoned { .. } => GraphErrorCode::Tombstoned,
            Self::SelfMerge { .. } => GraphErrorCode::SelfMerge,
            Self::DuplicateNode { .. } => GraphErrorCode::DuplicateNode,
            Self::MissingWeight { .. } => GraphErrorCode::MissingWeight,
            Self::MissingAdjacency { .. } => GraphErrorCode::MissingAdjacency,
            Self::UnknownNeighbour { .. } => GraphErrorCode::UnknownNeighbour,
            Self::InvalidWeight { .. } => GraphErrorCode::InvalidWeight,
        }
    }
}

/// Machine-readable error codes for [`GraphError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GraphErrorCode {
    /// A key was not registered when the graph was constructed.
    UnknownNode,
    /// The node was already merged away.
    Tombstoned,
    /// A contraction named the same node twice.
    SelfMerge,
    /// The weight sequence contained the same key twice.
    DuplicateNode,
    /// An adjacency key had no corresponding weight entry.
    MissingWeight,
    /// A weighted key had no corresponding adjacency entry.
    MissingAdjacency,
    /// An adjacency set referenced a key that is not a node.
    UnknownNeighbour,
    /// A node weight was negative or non-finite at construction.
    InvalidWeight,
}

impl GraphErrorCode {
    /// Returns the symbolic identifier for logging surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownNode => "UNKNOWN_NODE",
            Self::Tombstoned => "TOMBSTONED_NODE",
            Self::SelfMerge => "SELF_MERGE",
            Self::DuplicateNode => "DUPLICATE_NODE",
            Self::MissingWeight => "MISSING_WEIGHT",
            Self::MissingAdjacency => "MISSING_ADJACENCY",
            Self::UnknownNeighbour => "UNKNOWN_NEIGHBOUR",
            Self::InvalidWeight => "INVALID_WEIGHT",
        }
    }
}
