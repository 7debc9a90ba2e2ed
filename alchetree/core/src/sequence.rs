//! Animation Sequence Builder
//!
//! Produces the deterministic reveal order for one tree + algorithm pair.
//! Every node appears in the sequence exactly once, by identity: two nodes
//! sharing a name (a circular-reference marker and its original) are distinct
//! entries.
//!
//! The three orders model how each search algorithm "thinks":
//!
//! - **BFS**: level order from the root; within a level, sibling order
//!   follows each parent's ingredient order.
//! - **DFS**: for each root-to-leaf path in depth-first order, unseen nodes
//!   are appended leaf-to-root: explain the deepest dependency first, then
//!   walk back up.
//! - **Bidirectional**: the root, then every base-element leaf, then
//!   alternately the shallowest and deepest still-unvisited levels until the
//!   two fronts meet.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::tree::{NodeId, PositionedTree};

/// Search algorithm whose reveal pacing and order is being modeled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Breadth-first search
    #[default]
    Bfs,
    /// Depth-first search
    Dfs,
    /// Bidirectional search
    Bidirectional,
}

impl Algorithm {
    /// Parse an algorithm from its wire spelling (unknown input maps to BFS)
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "dfs" => Self::Dfs,
            "bidirectional" | "bidire" | "bidi" => Self::Bidirectional,
            _ => Self::Bfs,
        }
    }

    /// Canonical wire spelling
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
            Self::Bidirectional => "bidirectional",
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bfs => "Breadth-First",
            Self::Dfs => "Depth-First",
            Self::Bidirectional => "Bidirectional",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the reveal sequence for a tree under the given algorithm
///
/// Deterministic; returns each node id exactly once. A single-node tree
/// yields a one-element sequence for every algorithm.
#[must_use]
pub fn build_sequence(tree: &PositionedTree, algorithm: Algorithm) -> Vec<NodeId> {
    if tree.is_empty() {
        return Vec::new();
    }
    match algorithm {
        Algorithm::Bfs => breadth_first(tree),
        Algorithm::Dfs => depth_first(tree),
        Algorithm::Bidirectional => bidirectional(tree),
    }
}

/// Level order, root first, siblings in ingredient order.
fn breadth_first(tree: &PositionedTree) -> Vec<NodeId> {
    let mut sequence = Vec::with_capacity(tree.len());
    let mut queue = VecDeque::new();
    queue.push_back(tree.root());
    while let Some(id) = queue.pop_front() {
        sequence.push(id);
        queue.extend(tree.node(id).children.iter().copied());
    }
    sequence
}

/// Leaf-to-root per root-to-leaf path, skipping already-placed nodes.
fn depth_first(tree: &PositionedTree) -> Vec<NodeId> {
    let mut sequence = Vec::with_capacity(tree.len());
    let mut seen = HashSet::with_capacity(tree.len());
    let mut path = Vec::new();
    descend(tree, tree.root(), &mut path, &mut seen, &mut sequence);
    sequence
}

fn descend(
    tree: &PositionedTree,
    id: NodeId,
    path: &mut Vec<NodeId>,
    seen: &mut HashSet<NodeId>,
    sequence: &mut Vec<NodeId>,
) {
    path.push(id);
    let children = &tree.node(id).children;
    if children.is_empty() {
        // Reached a leaf: emit the whole path bottom-up, newest first.
        for &node in path.iter().rev() {
            if seen.insert(node) {
                sequence.push(node);
            }
        }
    } else {
        for &child in children {
            descend(tree, child, path, seen, sequence);
        }
    }
    path.pop();
}

/// Root, base-element leaves, then alternating shallow/deep fronts.
fn bidirectional(tree: &PositionedTree) -> Vec<NodeId> {
    let root = tree.root();
    let mut sequence = Vec::with_capacity(tree.len());
    let mut seen = HashSet::with_capacity(tree.len());

    sequence.push(root);
    seen.insert(root);

    // All base-element leaves in pre-order.
    for id in preorder(tree) {
        if tree.node(id).is_base_element && seen.insert(id) {
            sequence.push(id);
        }
    }

    // Remaining nodes grouped by level, in breadth-first order within each.
    let mut levels: Vec<Vec<NodeId>> = vec![Vec::new(); tree.max_depth() + 1];
    for id in breadth_first(tree) {
        if !seen.contains(&id) {
            levels[tree.node(id).depth].push(id);
        }
    }
    let mut fronts: VecDeque<Vec<NodeId>> =
        levels.into_iter().filter(|l| !l.is_empty()).collect();

    // Fold in the shallowest, then the deepest, until the fronts meet.
    loop {
        match fronts.pop_front() {
            Some(level) => sequence.extend(level),
            None => break,
        }
        match fronts.pop_back() {
            Some(level) => sequence.extend(level),
            None => break,
        }
    }

    sequence
}

fn preorder(tree: &PositionedTree) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(tree.len());
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        order.push(id);
        // Reverse so the first ingredient is visited first.
        for &child in tree.node(id).children.iter().rev() {
            stack.push(child);
        }
    }
    order
}
