//! Property tests for reduction invariants.
//!
//! Drives randomly generated graphs to a fixpoint and verifies the
//! structural invariants that every contraction sequence must preserve:
//!
//! - **Symmetry** — the live adjacency stays undirected with no self-loops.
//! - **No dangling tombstones** — no adjacency set references a merged node.
//! - **Weight conservation** — total live weight is invariant.
//! - **Parent totality** — merged-away nodes, and only those, appear in the
//!   parent map, and every resolved root is a live survivor.
//! - **Fixpoint** — every live node ends at or above the threshold or with
//!   no neighbour left to merge into.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use rand::{SeedableRng, rngs::SmallRng};

use crate::{graph::Graph, reduce::ReducerBuilder, strategy::Strategy as Selection};

#[derive(Clone, Debug)]
struct Fixture {
    weights: Vec<f64>,
    edges: Vec<(usize, usize)>,
    threshold: f64,
    selection: Selection,
    seed: u64,
}

fn arb_fixture() -> impl Strategy<Value = Fixture> {
    (2usize..12)
        .prop_flat_map(|node_count| {
            (
                proptest::collection::vec(0.0f64..10.0, node_count),
                proptest::collection::vec((0..node_count, 0..node_count), 0..node_count * 2),
                0.0f64..25.0,
                prop_oneof![
                    Just(Selection::MinWeight),
                    Just(Selection::MaxWeight),
                    Just(Selection::Random),
                ],
                any::<u64>(),
            )
        })
        .prop_map(|(weights, edges, threshold, selection, seed)| Fixture {
            weights,
            edges,
            threshold,
            selection,
            seed,
        })
}

fn build(fixture: &Fixture) -> Graph<usize> {
    let node_count = fixture.weights.len();
    let mut adjacency: HashMap<usize, HashSet<usize>> =
        (0..node_count).map(|node| (node, HashSet::new())).collect();
    for &(left, right) in &fixture.edges {
        adjacency.entry(left).or_default().insert(right);
    }
    Graph::new(adjacency, fixture.weights.iter().copied().enumerate())
        .expect("generated input is well-formed")
}

fn total_live_weight(graph: &Graph<usize>) -> f64 {
    graph
        .live_key_weights()
        .iter()
        .map(|(_, weight)| weight)
        .sum()
}

fn check_live_adjacency(graph: &Graph<usize>) -> Result<(), TestCaseError> {
    for (node, _) in graph.live_key_weights() {
        let Some(neighbours) = graph.neighbours(&node) else {
            continue;
        };
        for neighbour in neighbours {
            prop_assert_ne!(*neighbour, node, "self-loop on {}", node);
            prop_assert!(
                graph.is_live(neighbour),
                "live node {} references tombstoned {}",
                node,
                neighbour
            );
            let reciprocal = graph
                .neighbours(neighbour)
                .is_some_and(|back| back.contains(&node));
            prop_assert!(reciprocal, "edge {}–{} is not symmetric", node, neighbour);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn fixpoint_preserves_structural_invariants(fixture in arb_fixture()) {
        let mut graph = build(&fixture);
        let before = total_live_weight(&graph);
        let reducer = ReducerBuilder::new()
            .with_threshold(fixture.threshold)
            .with_strategy(fixture.selection)
            .build()
            .expect("generated threshold is finite");
        let mut rng = SmallRng::seed_from_u64(fixture.seed);

        let parents = reducer
            .run_to_fixpoint(&mut graph, &mut rng)
            .expect("reduction must not fail on valid input");

        // Weight conservation (modulo summation order).
        let after = total_live_weight(&graph);
        prop_assert!(
            (before - after).abs() <= 1e-9 * before.max(1.0),
            "total live weight drifted: {before} -> {after}"
        );

        check_live_adjacency(&graph)?;

        // Exactly the merged-away nodes carry parent entries, and every
        // resolved root is a live survivor.
        let (keys, _) = graph.key_weights();
        for key in keys {
            prop_assert_eq!(parents.contains(key), !graph.is_live(key));
        }
        for (_, root) in parents.iter() {
            prop_assert!(graph.is_live(root), "root {} is not live", root);
        }

        // Resolution is idempotent on the driver's output.
        let resolved_again = parents.resolve().expect("driver output is acyclic");
        prop_assert_eq!(&resolved_again, &parents);

        // Fixpoint: no live node is still reducible.
        for (node, weight) in graph.live_key_weights() {
            let isolated = graph
                .neighbours(&node)
                .is_none_or(|neighbours| neighbours.is_empty());
            prop_assert!(
                weight >= fixture.threshold || isolated,
                "node {} still reducible at weight {}",
                node,
                weight
            );
        }
    }

    #[test]
    fn single_pass_never_merges_over_threshold_nodes(fixture in arb_fixture()) {
        let mut graph = build(&fixture);
        let start_weights: Vec<f64> = graph.key_weights().1.to_vec();
        let reducer = ReducerBuilder::new()
            .with_threshold(fixture.threshold)
            .with_strategy(fixture.selection)
            .build()
            .expect("generated threshold is finite");
        let mut rng = SmallRng::seed_from_u64(fixture.seed);

        let parents = reducer
            .merge_all(&mut graph, &mut rng)
            .expect("pass must not fail on valid input");

        // Only nodes that started under the threshold can have merged in a
        // single pass: weights grow monotonically, so a node at or above
        // the threshold at snapshot time stays unmergeable for the pass.
        let (keys, _) = graph.key_weights();
        for (position, key) in keys.iter().enumerate() {
            if parents.contains(key) {
                prop_assert!(
                    start_weights[position] < fixture.threshold,
                    "node {} merged despite starting at {}",
                    key,
                    start_weights[position]
                );
            }
        }
    }
}
