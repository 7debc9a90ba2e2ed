//! Layout Engine
//!
//! Assigns `(x, y)` coordinates to a [`PositionedTree`] with a standard
//! top-down layered layout: leaves take successive horizontal slots, interior
//! nodes center over their children, and `y` grows with depth.
//!
//! Per-node spacing is sized from the host canvas with a floor minimum, so a
//! tiny canvas cannot collapse the layout to overlapping nodes. The hierarchy
//! validator runs twice per pass: before coordinates (so the walk sees a
//! consistent tree) and after (so repairs never ship inconsistent output).
//!
//! Any coordinate that is non-finite after assignment is replaced with the
//! deterministic default `(0, depth × fallback_level_spacing)`; the repair is
//! counted but not surfaced to the user.

use serde::{Deserialize, Serialize};

use crate::tree::{HierarchyValidator, NodeId, PositionedTree, RepairReport};

/// Canvas size assumed when the surface reports nothing usable
const DEFAULT_CANVAS: (f64, f64) = (1200.0, 500.0);

/// Layout spacing configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Floor for horizontal spacing between leaf slots
    pub min_h_spacing: f64,
    /// Floor for vertical spacing between levels
    pub min_v_spacing: f64,
    /// Level spacing used when repairing invalid coordinates
    pub fallback_level_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_h_spacing: 80.0,
            min_v_spacing: 90.0,
            fallback_level_spacing: 100.0,
        }
    }
}

/// Outcome of one layout pass
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutSummary {
    /// Repairs applied before coordinate assignment
    pub pre_repair: RepairReport,
    /// Repairs applied after coordinate assignment
    pub post_repair: RepairReport,
    /// Coordinates replaced with the deterministic default
    pub repaired_coordinates: usize,
    /// Effective layout width after flooring
    pub width: f64,
    /// Effective layout height after flooring
    pub height: f64,
}

/// Top-down tree layout engine
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create an engine with default spacing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom spacing
    #[must_use]
    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// The active spacing configuration
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Run one full layout pass over the tree
    ///
    /// Validates, assigns coordinates sized from `canvas`, repairs any
    /// non-finite coordinate, and validates again.
    pub fn layout(&self, tree: &mut PositionedTree, canvas: (f64, f64)) -> LayoutSummary {
        let validator = HierarchyValidator::new();
        let mut summary = LayoutSummary {
            pre_repair: validator.validate_and_repair(tree),
            ..LayoutSummary::default()
        };

        if tree.is_empty() {
            return summary;
        }

        let (width, height) = self.assign_coordinates(tree, canvas);
        summary.width = width;
        summary.height = height;
        summary.repaired_coordinates = self.repair_coordinates(tree);
        summary.post_repair = validator.validate_and_repair(tree);

        if summary.repaired_coordinates > 0 {
            tracing::debug!(
                repaired = summary.repaired_coordinates,
                "replaced non-finite layout coordinates"
            );
        }
        summary
    }

    /// Assign slot-based coordinates; returns the effective layout size.
    fn assign_coordinates(&self, tree: &mut PositionedTree, canvas: (f64, f64)) -> (f64, f64) {
        let (canvas_w, canvas_h) = sanitize_canvas(canvas);
        let leaf_count = tree.leaf_count().max(1) as f64;
        let levels = (tree.max_depth() + 1) as f64;

        let h_spacing = (canvas_w / leaf_count).max(self.config.min_h_spacing);
        let v_spacing = (canvas_h / levels).max(self.config.min_v_spacing);

        let mut next_leaf = 0usize;
        let root = tree.root();
        self.place_subtree(tree, root, h_spacing, v_spacing, &mut next_leaf);

        (h_spacing * leaf_count, v_spacing * levels)
    }

    /// Post-order placement: leaves take slots, parents center over children.
    fn place_subtree(
        &self,
        tree: &mut PositionedTree,
        id: NodeId,
        h_spacing: f64,
        v_spacing: f64,
        next_leaf: &mut usize,
    ) -> f64 {
        let children = tree.node(id).children.clone();
        let x = if children.is_empty() {
            let slot = *next_leaf as f64;
            *next_leaf += 1;
            (slot + 0.5) * h_spacing
        } else {
            let first = self.place_subtree(tree, children[0], h_spacing, v_spacing, next_leaf);
            let mut last = first;
            for &child in &children[1..] {
                last = self.place_subtree(tree, child, h_spacing, v_spacing, next_leaf);
            }
            (first + last) / 2.0
        };

        let node = tree.node_mut(id);
        node.x = x;
        node.y = node.depth as f64 * v_spacing;
        x
    }

    /// Replace any non-finite coordinate with `(0, depth × fallback)`.
    ///
    /// Returns the number of nodes repaired.
    pub fn repair_coordinates(&self, tree: &mut PositionedTree) -> usize {
        let mut repaired = 0;
        for id in tree.ids().collect::<Vec<_>>() {
            let node = tree.node_mut(id);
            if !node.x.is_finite() || !node.y.is_finite() {
                node.x = 0.0;
                node.y = node.depth as f64 * self.config.fallback_level_spacing;
                repaired += 1;
            }
        }
        repaired
    }
}

fn sanitize_canvas((w, h): (f64, f64)) -> (f64, f64) {
    let w = if w.is_finite() && w > 0.0 { w } else { DEFAULT_CANVAS.0 };
    let h = if h.is_finite() && h > 0.0 { h } else { DEFAULT_CANVAS.1 };
    (w, h)
}
