//! Amalga core library.
//!
//! A weighted undirected graph contraction engine: repeatedly folds
//! under-threshold nodes into a chosen neighbour until the graph settles,
//! tracking which surviving node absorbed each merged-away node.

mod error;
mod graph;
mod parents;
mod reduce;
mod strategy;

pub use crate::{
    error::{GraphError, GraphErrorCode},
    graph::{Graph, NodeKey},
    parents::{CycleError, ParentMap},
    reduce::{ReduceError, ReduceErrorCode, Reducer, ReducerBuilder, ThresholdError},
    strategy::{ParseStrategyError, Strategy},
};
