//! Tree Data Model
//!
//! Canonical tree shapes for the visualization engine:
//!
//! - [`IngredientNode`]: the recursive, exclusively-owned tree produced by the
//!   normalizer. Children are the only ownership edge.
//! - [`PositionedTree`]: a flat arena of [`PositionedNode`]s indexed by
//!   [`NodeId`], used by the validator, layout engine, sequence builder, and
//!   playback driver. Parent back-references are plain indices, lookup-only and
//!   never owning, so the structure cannot form ownership cycles.
//!
//! A fresh tree is built per search result and discarded on re-search or
//! result switch; nothing here is shared across runs.

pub mod normalize;
pub mod raw;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use normalize::TreeNormalizer;
pub use raw::{RawPathNode, RawSearchResult, RawTreeNode};
pub use validate::{HierarchyValidator, RepairReport};

// ============================================================================
// Ingredient Node
// ============================================================================

/// One node of a canonical recipe derivation tree
///
/// Produced by the [`TreeNormalizer`]; every downstream component consumes
/// this shape and never inspects alternate field spellings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientNode {
    /// Element name (string identity; may recur across branches)
    pub name: String,

    /// Member of the closed base-element set
    #[serde(default)]
    pub is_base_element: bool,

    /// A repeat of an ancestor on the same root-to-node path, cut into a
    /// terminal marker to guarantee termination
    #[serde(default)]
    pub is_circular_reference: bool,

    /// The source had no recipe data for this element
    #[serde(default)]
    pub has_no_recipe: bool,

    /// Optional image reference
    #[serde(default)]
    pub image_ref: Option<String>,

    /// Ingredient subtrees, in recipe order (the sole ownership edge)
    #[serde(default)]
    pub children: Vec<IngredientNode>,
}

impl IngredientNode {
    /// Create a plain node with no flags and no children
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_base_element: false,
            is_circular_reference: false,
            has_no_recipe: false,
            image_ref: None,
            children: Vec::new(),
        }
    }

    /// Whether this node terminates its branch
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total node count of this subtree (including self)
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(IngredientNode::node_count).sum::<usize>()
    }

    /// Depth of this subtree (a lone node has depth 0)
    #[must_use]
    pub fn subtree_depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.subtree_depth())
            .max()
            .unwrap_or(0)
    }
}

// ============================================================================
// Positioned Arena
// ============================================================================

/// Identity of a node within one [`PositionedTree`]
///
/// Plain arena index. Identities are per-tree: two trees may both have a
/// `NodeId(0)`, and two nodes with equal names always have distinct ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The underlying arena index
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node with layout coordinates and a weak parent back-reference
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedNode {
    /// Arena identity of this node
    pub id: NodeId,

    /// Element name
    pub name: String,

    /// Member of the closed base-element set
    pub is_base_element: bool,

    /// Terminal circular-reference marker
    pub is_circular_reference: bool,

    /// No recipe data was available
    pub has_no_recipe: bool,

    /// Optional image reference
    pub image_ref: Option<String>,

    /// Horizontal coordinate (assigned by the layout engine)
    pub x: f64,

    /// Vertical coordinate (assigned by the layout engine)
    pub y: f64,

    /// Distance from the root
    pub depth: usize,

    /// Lookup-only back-reference; `None` for the root
    pub parent: Option<NodeId>,

    /// Child ids in ingredient order (the sole ownership edge)
    pub children: Vec<NodeId>,
}

impl PositionedNode {
    /// Whether this node terminates its branch
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Flat arena holding one positioned hierarchy
///
/// Exactly one root per tree: the requested target element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionedTree {
    nodes: Vec<PositionedNode>,
    root: usize,
}

impl PositionedTree {
    /// Flatten an [`IngredientNode`] tree into an arena
    ///
    /// Depths and parent/children links are assigned here; coordinates start
    /// at zero and are filled in by the layout engine.
    #[must_use]
    pub fn from_ingredient_tree(tree: &IngredientNode) -> Self {
        let mut arena = Self {
            nodes: Vec::with_capacity(tree.node_count()),
            root: 0,
        };
        arena.push_subtree(tree, None, 0);
        arena
    }

    fn push_subtree(
        &mut self,
        node: &IngredientNode,
        parent: Option<NodeId>,
        depth: usize,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(PositionedNode {
            id,
            name: node.name.clone(),
            is_base_element: node.is_base_element,
            is_circular_reference: node.is_circular_reference,
            has_no_recipe: node.has_no_recipe,
            image_ref: node.image_ref.clone(),
            x: 0.0,
            y: 0.0,
            depth,
            parent,
            children: Vec::with_capacity(node.children.len()),
        });

        for child in &node.children {
            let child_id = self.push_subtree(child, Some(id), depth + 1);
            self.nodes[id.0].children.push(child_id);
        }

        id
    }

    /// Id of the root node
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(self.root)
    }

    /// Number of nodes in the arena
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node by id
    ///
    /// # Panics
    ///
    /// Panics if `id` is not an id of this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &PositionedNode {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node by id
    ///
    /// # Panics
    ///
    /// Panics if `id` is not an id of this tree.
    pub fn node_mut(&mut self, id: NodeId) -> &mut PositionedNode {
        &mut self.nodes[id.0]
    }

    /// Iterate all nodes in arena order
    pub fn nodes(&self) -> impl Iterator<Item = &PositionedNode> {
        self.nodes.iter()
    }

    /// Iterate all node ids in arena order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// All parent→child edges in arena order
    #[must_use]
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        for node in &self.nodes {
            for &child in &node.children {
                edges.push((node.id, child));
            }
        }
        edges
    }

    /// First node (in arena order) with the given name
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    /// Maximum depth over all nodes
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Number of leaf nodes
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }
}
