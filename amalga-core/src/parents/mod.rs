//! Parent tracking for merged-away nodes.
//!
//! Each contraction records which surviving node absorbed the merged-away
//! node. Entries chain when a survivor is itself merged later, so the map
//! must be resolved to final representatives before downstream relabelling.

use std::collections::{HashMap, HashSet, hash_map};

use thiserror::Error;

use crate::graph::NodeKey;

/// Error returned when a parent chain revisits a node during resolution.
///
/// A well-formed map produced by the reduction driver is acyclic; a cycle
/// indicates the map was corrupted or hand-built incorrectly, and resolution
/// refuses to loop on it.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("parent chain starting at {start:?} revisits {node:?}")]
pub struct CycleError<K: NodeKey> {
    /// The key whose chain was being followed.
    pub start: K,
    /// The first key seen twice along the chain.
    pub node: K,
}

/// Records, for each merged-away key, the node it was folded into.
///
/// [`ParentMap::record`] stores the *immediate* merge target; use
/// [`ParentMap::resolve`] to rewrite every entry to its final representative.
///
/// # Examples
/// ```
/// use amalga_core::ParentMap;
///
/// let mut parents = ParentMap::new();
/// parents.record("x", "y");
/// parents.record("y", "z");
///
/// let resolved = parents.resolve()?;
/// assert_eq!(resolved.get(&"x"), Some(&"z"));
/// assert_eq!(resolved.get(&"y"), Some(&"z"));
/// # Ok::<(), amalga_core::CycleError<&'static str>>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParentMap<K: NodeKey> {
    entries: HashMap<K, K>,
}

impl<K: NodeKey> ParentMap<K> {
    /// Creates an empty parent map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Records that `child` was merged into `parent`.
    pub fn record(&mut self, child: K, parent: K) {
        self.entries.insert(child, parent);
    }

    /// Returns the recorded target for a merged-away key, if any.
    #[must_use]
    pub fn get(&self, child: &K) -> Option<&K> {
        self.entries.get(child)
    }

    /// Returns `true` when the key was merged away.
    #[must_use]
    pub fn contains(&self, child: &K) -> bool {
        self.entries.contains_key(child)
    }

    /// Number of merged-away keys recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no merges have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(child, parent)` entries in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, K, K> {
        self.entries.iter()
    }

    /// Moves every entry of `other` into this map.
    ///
    /// Used by the fixpoint driver to accumulate entries across passes; keys
    /// never repeat across passes because a merged-away node is never merged
    /// again.
    pub fn merge_from(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Rewrites every entry to point directly at its final representative.
    ///
    /// For each key the chain `parent[parent[..]]` is followed until a value
    /// that is not itself a key, and that terminal value is assigned to the
    /// key (full path compression). Resolution is idempotent: resolving an
    /// already-resolved map returns an equal map.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] when a chain revisits a key, instead of
    /// looping forever on a malformed map.
    pub fn resolve(&self) -> Result<Self, CycleError<K>> {
        let mut resolved: HashMap<K, K> = HashMap::with_capacity(self.entries.len());
        for start in self.entries.keys() {
            if resolved.contains_key(start) {
                continue;
            }
            let mut trail: Vec<K> = Vec::new();
            let mut seen: HashSet<K> = HashSet::new();
            seen.insert(start.clone());
            let mut current = start.clone();
            let root = loop {
                match self.entries.get(&current) {
                    // Not a key: this is the final representative.
                    None => break current,
                    Some(next) => {
                        trail.push(current);
                        if let Some(cached) = resolved.get(next) {
                            break cached.clone();
                        }
                        if !seen.insert(next.clone()) {
                            return Err(CycleError {
                                start: start.clone(),
                                node: next.clone(),
                            });
                        }
                        current = next.clone();
                    }
                }
            };
            for node in trail {
                resolved.insert(node, root.clone());
            }
        }
        Ok(Self { entries: resolved })
    }
}

impl<K: NodeKey> IntoIterator for ParentMap<K> {
    type Item = (K, K);
    type IntoIter = hash_map::IntoIter<K, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: NodeKey> FromIterator<(K, K)> for ParentMap<K> {
    fn from_iter<I: IntoIterator<Item = (K, K)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
