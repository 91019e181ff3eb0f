//! Neighbour selection strategies for edge contraction.
//!
//! A strategy decides which neighbour an under-threshold node is folded
//! into. The random strategy draws from a caller-supplied RNG handle rather
//! than a process-global source, so outcomes are reproducible under a fixed
//! seed.

use std::{fmt, str::FromStr};

use rand::{Rng, seq::SliceRandom};
use thiserror::Error;

use crate::{
    error::GraphError,
    graph::{Graph, NodeKey},
};

/// Policy for choosing the merge target among a node's neighbours.
///
/// # Examples
/// ```
/// use amalga_core::Strategy;
///
/// let strategy: Strategy = "max-weight".parse()?;
/// assert_eq!(strategy, Strategy::MaxWeight);
/// assert_eq!(strategy.as_str(), "max-weight");
/// # Ok::<(), amalga_core::ParseStrategyError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Strategy {
    /// Prefer the neighbour with the smallest current weight.
    #[default]
    MinWeight,
    /// Prefer the neighbour with the largest current weight.
    MaxWeight,
    /// Pick uniformly at random among the neighbours.
    Random,
}

impl Strategy {
    /// Returns the stable name used for parsing and display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MinWeight => "min-weight",
            Self::MaxWeight => "max-weight",
            Self::Random => "random",
        }
    }

    /// Chooses a merge target among `neighbours` using the graph's current
    /// weights.
    ///
    /// Returns `Ok(None)` when the neighbour list is empty; that is the
    /// normal terminal state of an isolated node, not an error. Weight ties
    /// are broken by the first occurrence in the input order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] when a neighbour key was never
    /// registered in the graph.
    pub fn select<K: NodeKey, R: Rng + ?Sized>(
        &self,
        neighbours: &[K],
        graph: &Graph<K>,
        rng: &mut R,
    ) -> Result<Option<K>, GraphError<K>> {
        if neighbours.is_empty() {
            return Ok(None);
        }
        match self {
            Self::MinWeight => Ok(extreme_by_weight(neighbours, graph, true)?),
            Self::MaxWeight => Ok(extreme_by_weight(neighbours, graph, false)?),
            Self::Random => Ok(neighbours.choose(rng).cloned()),
        }
    }
}

/// Returns the neighbour with the smallest (`ascending`) or largest current
/// weight, keeping the first of equals.
fn extreme_by_weight<K: NodeKey>(
    neighbours: &[K],
    graph: &Graph<K>,
    ascending: bool,
) -> Result<Option<K>, GraphError<K>> {
    let weights = graph.weights_by_keys(neighbours)?;
    let mut best = 0;
    for (candidate, weight) in weights.iter().enumerate().skip(1) {
        // Strict comparison: ties keep the earliest candidate.
        let improves = if ascending {
            weight.total_cmp(&weights[best]).is_lt()
        } else {
            weight.total_cmp(&weights[best]).is_gt()
        };
        if improves {
            best = candidate;
        }
    }
    Ok(neighbours.get(best).cloned())
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a strategy name is not recognised.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown selection strategy `{name}`; expected one of min-weight, max-weight, random")]
pub struct ParseStrategyError {
    /// The rejected strategy name.
    pub name: String,
}

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "min-weight" => Ok(Self::MinWeight),
            "max-weight" => Ok(Self::MaxWeight),
            "random" => Ok(Self::Random),
            _ => Err(ParseStrategyError {
                name: name.to_owned(),
            }),
        }
    }
}
