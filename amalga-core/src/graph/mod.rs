//! Weighted undirected graph with in-place edge contraction.
//!
//! The graph pairs a hash-based adjacency with a dense weight buffer. Node
//! keys are mapped to fixed positions in the buffer when the graph is built
//! and the mapping is never re-indexed: merged-away nodes keep their slot
//! with the weight set to `+inf` (a tombstone), so positions held by callers
//! stay valid for the lifetime of the graph.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    hash::Hash,
};

use crate::error::GraphError;

/// Marker trait for types usable as node keys.
///
/// Blanket-implemented for every type that is cloneable, hashable, and
/// debug-printable, so callers can use `&str`, `String`, integers, or their
/// own id newtypes without further ceremony.
pub trait NodeKey: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> NodeKey for T {}

/// A weighted undirected graph supporting edge contraction.
///
/// Construction establishes a bijection between node keys and positions in a
/// dense weight buffer, in the insertion order of the weight sequence.
/// Contraction via [`Graph::join_node`] folds one node's weight and edges
/// into a surviving neighbour and tombstones the merged-away slot.
///
/// # Examples
/// ```
/// use std::collections::{HashMap, HashSet};
/// use amalga_core::Graph;
///
/// let adjacency = HashMap::from([
///     ("a", HashSet::from(["b"])),
///     ("b", HashSet::from(["a", "c"])),
///     ("c", HashSet::new()),
/// ]);
/// let mut graph = Graph::new(adjacency, [("a", 1.0), ("b", 2.0), ("c", 10.0)])?;
///
/// graph.join_node(&"b", &"a")?;
/// assert_eq!(graph.weight_of(&"b")?, 3.0);
/// assert!(graph.weight_of(&"a")?.is_infinite());
/// assert!(!graph.is_live(&"a"));
/// # Ok::<(), amalga_core::GraphError<&'static str>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Graph<K> {
    adjacency: HashMap<K, HashSet<K>>,
    weights: Vec<f64>,
    index: HashMap<K, usize>,
    keys: Vec<K>,
}

impl<K: NodeKey> Graph<K> {
    /// Builds a graph from an adjacency mapping and an ordered weight
    /// sequence.
    ///
    /// The weight sequence fixes each key's position in the dense buffer, so
    /// the caller controls iteration order downstream. The adjacency is
    /// normalised on entry: self-loops are stripped and every edge is made
    /// symmetric.
    ///
    /// # Errors
    ///
    /// Returns an error when:
    /// - a weight key appears twice ([`GraphError::DuplicateNode`]),
    /// - a weight is negative or non-finite ([`GraphError::InvalidWeight`]),
    /// - the adjacency and weight key sets differ
    ///   ([`GraphError::MissingWeight`], [`GraphError::MissingAdjacency`]),
    /// - an adjacency set references an unregistered key
    ///   ([`GraphError::UnknownNeighbour`]).
    pub fn new(
        adjacency: HashMap<K, HashSet<K>>,
        weights: impl IntoIterator<Item = (K, f64)>,
    ) -> Result<Self, GraphError<K>> {
        let mut keys = Vec::new();
        let mut index = HashMap::new();
        let mut buffer = Vec::new();
        for (key, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(GraphError::InvalidWeight { node: key, weight });
            }
            if index.insert(key.clone(), keys.len()).is_some() {
                return Err(GraphError::DuplicateNode { node: key });
            }
            keys.push(key);
            buffer.push(weight);
        }

        for node in adjacency.keys() {
            if !index.contains_key(node) {
                return Err(GraphError::MissingWeight { node: node.clone() });
            }
        }
        for key in &keys {
            if !adjacency.contains_key(key) {
                return Err(GraphError::MissingAdjacency { node: key.clone() });
            }
        }

        let mut normalised: HashMap<K, HashSet<K>> = keys
            .iter()
            .map(|key| (key.clone(), HashSet::new()))
            .collect();
        for (node, neighbours) in &adjacency {
            for neighbour in neighbours {
                if !index.contains_key(neighbour) {
                    return Err(GraphError::UnknownNeighbour {
                        node: node.clone(),
                        neighbour: neighbour.clone(),
                    });
                }
                if neighbour == node {
                    continue;
                }
                normalised
                    .entry(node.clone())
                    .or_default()
                    .insert(neighbour.clone());
                normalised
                    .entry(neighbour.clone())
                    .or_default()
                    .insert(node.clone());
            }
        }

        Ok(Self {
            adjacency: normalised,
            weights: buffer,
            index,
            keys,
        })
    }

    /// Contracts the edge between `destination` and `origin`, folding
    /// `origin` into `destination`.
    ///
    /// Effects, in order: origin's neighbours (minus the destination) are
    /// relinked to the destination, origin's adjacency entry is deleted,
    /// origin's weight accumulates onto the destination, and origin's slot
    /// is tombstoned to `+inf`. Partial failure is impossible once the
    /// preconditions below pass; there are no rollback semantics.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::SelfMerge`] when both keys are equal,
    /// [`GraphError::UnknownNode`] when either key was never registered, and
    /// [`GraphError::Tombstoned`] when either node was already merged away.
    pub fn join_node(&mut self, destination: &K, origin: &K) -> Result<(), GraphError<K>> {
        if destination == origin {
            return Err(GraphError::SelfMerge {
                node: origin.clone(),
            });
        }
        let destination_position = self.require_live(destination)?;
        let origin_position = self.require_live(origin)?;

        // Origin's neighbours, excluding the destination itself so the merge
        // cannot introduce a self-loop.
        let mut relink = self.adjacency.remove(origin).unwrap_or_default();
        relink.remove(destination);

        if let Some(neighbours) = self.adjacency.get_mut(destination) {
            neighbours.extend(relink.iter().cloned());
            neighbours.remove(origin);
        }
        for neighbour in &relink {
            if let Some(neighbours) = self.adjacency.get_mut(neighbour) {
                neighbours.remove(origin);
                neighbours.insert(destination.clone());
            }
        }

        self.weights[destination_position] += self.weights[origin_position];
        self.weights[origin_position] = f64::INFINITY;
        Ok(())
    }

    /// Returns the position-ordered keys and the full weight buffer.
    ///
    /// Tombstoned slots are included (with weight `+inf`); the two slices
    /// share indices.
    #[must_use]
    pub fn key_weights(&self) -> (&[K], &[f64]) {
        (&self.keys, &self.weights)
    }

    /// Looks up the weights for a sequence of keys, in the same order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] for any key that was never
    /// registered.
    pub fn weights_by_keys<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a K>,
    ) -> Result<Vec<f64>, GraphError<K>>
    where
        K: 'a,
    {
        keys.into_iter().map(|key| self.weight_of(key)).collect()
    }

    /// Returns the current weight of a node.
    ///
    /// Tombstoned nodes report `+inf`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] when the key was never registered.
    pub fn weight_of(&self, node: &K) -> Result<f64, GraphError<K>> {
        let position = self.position(node)?;
        Ok(self.weights[position])
    }

    /// Returns the current neighbour set of a live node, or `None` when the
    /// node is tombstoned or unknown.
    #[must_use]
    pub fn neighbours(&self, node: &K) -> Option<&HashSet<K>> {
        self.adjacency.get(node)
    }

    /// Returns a node's live neighbours, ordered by registration position.
    ///
    /// Hash-set iteration order is unstable across runs; ordering candidates
    /// by position keeps selection strategies deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] for unregistered keys and
    /// [`GraphError::Tombstoned`] for merged-away nodes.
    pub fn ordered_neighbours(&self, node: &K) -> Result<Vec<K>, GraphError<K>> {
        self.require_live(node)?;
        let mut out: Vec<K> = self
            .adjacency
            .get(node)
            .map(|neighbours| neighbours.iter().cloned().collect())
            .unwrap_or_default();
        out.sort_by_key(|key| self.index.get(key).copied().unwrap_or(usize::MAX));
        Ok(out)
    }

    /// Returns the live `(key, weight)` pairs in registration order.
    #[must_use]
    pub fn live_key_weights(&self) -> Vec<(K, f64)> {
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, key)| self.adjacency.contains_key(*key))
            .map(|(position, key)| (key.clone(), self.weights[position]))
            .collect()
    }

    /// Returns `true` when the key was registered at construction, whether
    /// or not it has since been merged away.
    #[must_use]
    pub fn contains(&self, node: &K) -> bool {
        self.index.contains_key(node)
    }

    /// Returns `true` when the node is present and not tombstoned.
    #[must_use]
    pub fn is_live(&self, node: &K) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Number of nodes registered at construction, including tombstones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` when the graph was built with no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of live (non-tombstoned) nodes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.adjacency.len()
    }

    fn position(&self, node: &K) -> Result<usize, GraphError<K>> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode { node: node.clone() })
    }

    fn require_live(&self, node: &K) -> Result<usize, GraphError<K>> {
        let position = self.position(node)?;
        if !self.adjacency.contains_key(node) {
            return Err(GraphError::Tombstoned { node: node.clone() });
        }
        Ok(position)
    }
}
