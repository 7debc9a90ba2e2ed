//! End-to-end pipeline tests
//!
//! Exercise the full chain (fixture backend, normalizer, validator, layout,
//! sequence builder) the way the visualizer drives it, and pin down the
//! engine's core guarantees: exactly-once sequences, BFS depth ordering,
//! cycle safety, and validator idempotence over real search output.

use std::collections::HashSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use alchetree_core::{
    build_sequence, Algorithm, EngineConfig, FixtureBackend, HierarchyValidator, LayoutEngine,
    NodeId, PositionedTree, RawPathNode, RecordingSurface, SearchBackend, TreeNormalizer,
    Visualizer,
};

async fn positioned_brick() -> PositionedTree {
    let backend = FixtureBackend::new();
    let raw = backend.run_search("Brick", Algorithm::Bfs, 1).await.unwrap();
    let trees = TreeNormalizer::new().normalize(&raw, "Brick");
    let mut tree = PositionedTree::from_ingredient_tree(&trees[0]);
    LayoutEngine::new().layout(&mut tree, (1200.0, 500.0));
    tree
}

fn names(tree: &PositionedTree, sequence: &[NodeId]) -> Vec<String> {
    sequence.iter().map(|&id| tree.node(id).name.clone()).collect()
}

#[tokio::test]
async fn reference_sequences_for_brick() {
    let tree = positioned_brick().await;

    assert_eq!(
        names(&tree, &build_sequence(&tree, Algorithm::Bfs)),
        vec!["Brick", "Mud", "Fire", "Water", "Earth"]
    );
    assert_eq!(
        names(&tree, &build_sequence(&tree, Algorithm::Dfs)),
        vec!["Water", "Mud", "Brick", "Earth", "Fire"]
    );
    assert_eq!(
        names(&tree, &build_sequence(&tree, Algorithm::Bidirectional)),
        vec!["Brick", "Water", "Earth", "Fire", "Mud"]
    );
}

#[tokio::test]
async fn every_algorithm_covers_every_node_exactly_once() {
    let backend = FixtureBackend::new();
    for target in ["Brick", "House", "Metal", "Plant", "Water"] {
        let raw = backend.run_search(target, Algorithm::Bfs, 1).await.unwrap();
        let trees = TreeNormalizer::new().normalize(&raw, target);
        let mut tree = PositionedTree::from_ingredient_tree(&trees[0]);
        LayoutEngine::new().layout(&mut tree, (1200.0, 500.0));

        for algorithm in [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Bidirectional] {
            let sequence = build_sequence(&tree, algorithm);
            assert_eq!(sequence.len(), tree.len(), "{target}/{algorithm}: length");
            let unique: HashSet<NodeId> = sequence.iter().copied().collect();
            assert_eq!(unique.len(), tree.len(), "{target}/{algorithm}: duplicates");
        }
    }
}

#[tokio::test]
async fn bfs_respects_depth_order_on_deep_trees() {
    let backend = FixtureBackend::new();
    let raw = backend.run_search("House", Algorithm::Bfs, 1).await.unwrap();
    let trees = TreeNormalizer::new().normalize(&raw, "House");
    let tree = PositionedTree::from_ingredient_tree(&trees[0]);

    let sequence = build_sequence(&tree, Algorithm::Bfs);
    for pair in sequence.windows(2) {
        assert!(
            tree.node(pair[0]).depth <= tree.node(pair[1]).depth,
            "BFS emitted depth {} before depth {}",
            tree.node(pair[0]).depth,
            tree.node(pair[1]).depth
        );
    }
}

#[test]
fn cyclic_recipes_terminate_with_marker() {
    // A requires B requires A, straight from a path-shaped payload.
    let path = vec![
        RawPathNode::new("A", vec!["B"]),
        RawPathNode::new("B", vec!["A"]),
    ];
    let tree = TreeNormalizer::new().normalize_path(&path, "A");

    let marker = &tree.children[0].children[0];
    assert_eq!(marker.name, "A");
    assert!(marker.is_circular_reference);
    assert!(marker.children.is_empty());

    // Sequence building over the cut tree terminates and covers every node.
    let arena = PositionedTree::from_ingredient_tree(&tree);
    for algorithm in [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Bidirectional] {
        let sequence = build_sequence(&arena, algorithm);
        assert_eq!(sequence.len(), 3, "{algorithm}");
    }
}

#[tokio::test]
async fn validator_is_idempotent_on_real_output() {
    let mut tree = positioned_brick().await;
    let validator = HierarchyValidator::new();

    // Already validated by the layout pass; a further run must be a no-op.
    let snapshot = tree.clone();
    let report = validator.validate_and_repair(&mut tree);
    assert!(report.is_clean(), "unexpected repairs: {report:?}");
    assert_eq!(tree, snapshot);
}

#[tokio::test]
async fn layout_produces_finite_top_down_coordinates() {
    let tree = positioned_brick().await;
    for node in tree.nodes() {
        assert!(node.x.is_finite() && node.y.is_finite(), "{}", node.name);
        if let Some(parent) = node.parent {
            assert!(node.y > tree.node(parent).y, "{} not below its parent", node.name);
        }
    }
}

#[tokio::test]
async fn single_node_trees_flow_through_the_whole_pipeline() {
    // A base element, and a craftable element whose recipe list is empty
    // (which normalizes to a childless no-recipe node).
    let mut recipes = std::collections::HashMap::new();
    recipes.insert("Mystery".to_string(), Vec::new());

    let surface = Arc::new(RecordingSurface::new());
    let mut viz = Visualizer::new(
        FixtureBackend::with_recipes(recipes),
        surface.clone(),
        EngineConfig::default(),
    );

    assert_eq!(viz.run_search("Fire", Algorithm::Dfs, 1).await, 1);
    viz.visualize(0, false).unwrap();
    assert_eq!(surface.drawn_nodes(), vec!["Fire"]);
    assert!(surface.drawn_links().is_empty());

    assert_eq!(viz.run_search("Mystery", Algorithm::Bfs, 1).await, 1);
    viz.visualize(0, false).unwrap();
    assert!(viz.trees()[0].has_no_recipe);
    assert!(viz.trees()[0].is_leaf());
}
