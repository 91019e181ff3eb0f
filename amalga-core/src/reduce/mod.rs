//! Threshold-driven graph reduction.
//!
//! The reducer makes a single ascending-weight pass over the graph,
//! contracting each node still under the threshold into a neighbour chosen
//! by the configured [`Strategy`]. Processing lighter nodes first
//! front-loads the nodes most likely to need merging, but a merge can push
//! a later node over the threshold, so each node's weight is re-read at its
//! turn rather than trusted from the snapshot.
//!
//! A single [`Reducer::merge_all`] call is deliberately one pass, not a
//! fixpoint loop; [`Reducer::run_to_fixpoint`] wraps it for callers that
//! want to drive the graph until no live node can be reduced further.

use rand::Rng;
use thiserror::Error;
use tracing::instrument;

use crate::{
    error::GraphError,
    graph::{Graph, NodeKey},
    parents::{CycleError, ParentMap},
    strategy::Strategy,
};

/// An error produced while configuring or running a reduction.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ReduceError<K: NodeKey> {
    /// A graph operation failed mid-pass; the graph may hold a partial
    /// merge and must not be retried.
    #[error(transparent)]
    Graph(#[from] GraphError<K>),
    /// The accumulated parent map contained a cycle.
    #[error(transparent)]
    Cycle(#[from] CycleError<K>),
}

impl<K: NodeKey> ReduceError<K> {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> ReduceErrorCode {
        match self {
            Self::Graph { .. } => ReduceErrorCode::Graph,
            Self::Cycle { .. } => ReduceErrorCode::Cycle,
        }
    }
}

/// Machine-readable error codes for [`ReduceError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReduceErrorCode {
    /// A graph operation failed mid-pass.
    Graph,
    /// The accumulated parent map contained a cycle.
    Cycle,
}

impl ReduceErrorCode {
    /// Returns the symbolic identifier for logging surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Graph => "GRAPH_FAILURE",
            Self::Cycle => "PARENT_CYCLE",
        }
    }
}

/// Error returned when a reducer is configured with a non-finite threshold.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("merge threshold must be finite, got {threshold}")]
pub struct ThresholdError {
    /// The rejected threshold value.
    pub threshold: f64,
}

/// Configures and constructs [`Reducer`] instances.
///
/// # Examples
/// ```
/// use amalga_core::{ReducerBuilder, Strategy};
///
/// let reducer = ReducerBuilder::new()
///     .with_threshold(2.0)
///     .with_strategy(Strategy::MaxWeight)
///     .build()
///     .expect("threshold is finite");
/// assert_eq!(reducer.threshold(), 2.0);
/// assert_eq!(reducer.strategy(), Strategy::MaxWeight);
/// ```
#[derive(Debug, Clone)]
pub struct ReducerBuilder {
    threshold: f64,
    strategy: Strategy,
}

impl Default for ReducerBuilder {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            strategy: Strategy::default(),
        }
    }
}

impl ReducerBuilder {
    /// Creates a builder with the default threshold (`0.0`, which merges
    /// nothing) and the default min-weight strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the weight threshold below which nodes are merged.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the configured threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Sets the neighbour selection strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Returns the configured strategy.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Validates the configuration and constructs a [`Reducer`].
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError`] when the threshold is NaN or infinite. A
    /// finite threshold guarantees tombstoned slots (weight `+inf`) can
    /// never be re-selected for merging.
    pub fn build(self) -> Result<Reducer, ThresholdError> {
        if !self.threshold.is_finite() {
            return Err(ThresholdError {
                threshold: self.threshold,
            });
        }
        Ok(Reducer {
            threshold: self.threshold,
            strategy: self.strategy,
        })
    }
}

/// Drives edge contraction over a [`Graph`].
///
/// # Examples
/// ```
/// use std::collections::{HashMap, HashSet};
/// use rand::{SeedableRng, rngs::SmallRng};
/// use amalga_core::{Graph, ReducerBuilder};
///
/// let adjacency = HashMap::from([
///     ("a", HashSet::from(["b"])),
///     ("b", HashSet::from(["a"])),
/// ]);
/// let mut graph = Graph::new(adjacency, [("a", 1.0), ("b", 3.0)])
///     .expect("graph input is well-formed");
/// let reducer = ReducerBuilder::new()
///     .with_threshold(2.0)
///     .build()
///     .expect("threshold is finite");
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let parents = reducer
///     .merge_all(&mut graph, &mut rng)
///     .expect("merge pass succeeds");
/// assert_eq!(parents.get(&"a"), Some(&"b"));
/// assert_eq!(graph.weight_of(&"b").expect("b is registered"), 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct Reducer {
    threshold: f64,
    strategy: Strategy,
}

impl Reducer {
    /// Returns the weight threshold below which nodes are merged.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the neighbour selection strategy.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Makes one ascending-weight pass, merging every node whose *current*
    /// weight is under the threshold into a neighbour chosen by the
    /// strategy.
    ///
    /// The iteration order is fixed when the pass starts: live nodes sorted
    /// by snapshot weight, ties kept in registration order. Weights are
    /// re-read at each turn because earlier merges in the pass may have
    /// grown a node past the threshold; such nodes are skipped. A node with
    /// no live neighbours is left as-is, which is an accepted terminal state.
    ///
    /// Returns the parent entries recorded during this pass.
    ///
    /// # Errors
    ///
    /// Propagates [`GraphError`] failures from weight lookups or
    /// contraction. A failed contraction aborts the pass; the graph must
    /// then be considered inconsistent.
    #[instrument(
        level = "debug",
        skip(self, graph, rng),
        fields(threshold = self.threshold, strategy = %self.strategy)
    )]
    pub fn merge_all<K: NodeKey, R: Rng + ?Sized>(
        &self,
        graph: &mut Graph<K>,
        rng: &mut R,
    ) -> Result<ParentMap<K>, ReduceError<K>> {
        let mut snapshot = graph.live_key_weights();
        // Stable sort: equal weights keep registration order.
        snapshot.sort_by(|left, right| left.1.total_cmp(&right.1));

        let mut parents = ParentMap::new();
        for (node, _) in snapshot {
            let current = graph.weight_of(&node)?;
            if current >= self.threshold {
                // Either over threshold from the start, grown past it by an
                // earlier merge in this pass, or tombstoned (+inf).
                continue;
            }
            let neighbours = graph.ordered_neighbours(&node)?;
            match self.strategy.select(&neighbours, graph, rng)? {
                Some(target) => {
                    tracing::debug!(node = ?node, target = ?target, weight = current, "contracting edge");
                    parents.record(node.clone(), target.clone());
                    graph.join_node(&target, &node)?;
                }
                None => {
                    tracing::debug!(node = ?node, weight = current, "no neighbour to merge into");
                }
            }
        }
        tracing::info!(
            merges = parents.len(),
            live = graph.live_count(),
            "merge pass finished"
        );
        Ok(parents)
    }

    /// Repeats [`Reducer::merge_all`] until a pass records no merges, then
    /// resolves the accumulated parent map to final representatives.
    ///
    /// Terminates because every productive pass strictly reduces the live
    /// node count. On return, every live node is either at or above the
    /// threshold or has no live neighbour left to merge into.
    ///
    /// # Errors
    ///
    /// Propagates [`GraphError`] failures from the underlying passes;
    /// [`ReduceError::Cycle`] is unreachable for maps built by this driver
    /// but surfaces defensively from resolution.
    #[instrument(level = "debug", skip(self, graph, rng))]
    pub fn run_to_fixpoint<K: NodeKey, R: Rng + ?Sized>(
        &self,
        graph: &mut Graph<K>,
        rng: &mut R,
    ) -> Result<ParentMap<K>, ReduceError<K>> {
        let mut all = ParentMap::new();
        loop {
            let pass = self.merge_all(graph, rng)?;
            if pass.is_empty() {
                break;
            }
            all.merge_from(pass);
        }
        Ok(all.resolve()?)
    }
}

#[cfg(test)]
mod property;
