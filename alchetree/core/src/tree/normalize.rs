//! Tree Normalizer
//!
//! Converts raw backend output (linear ingredient paths, nested trees, or a
//! bare single tree) into canonical [`IngredientNode`] hierarchies.
//!
//! # Termination
//!
//! Cycle handling is path-local: only the *first* occurrence of an element
//! name along a root-to-node path expands its ingredients. A deeper
//! occurrence of the same name on that path becomes a terminal
//! `is_circular_reference` leaf with no children, so normalization always
//! terminates even on mutually-recursive recipe data.
//!
//! # Degradation
//!
//! Nothing in this module returns an error. Missing or empty input yields a
//! single placeholder node named after the requested target with
//! `has_no_recipe` set; a node missing a name degrades to a placeholder
//! node. The tree-build boundary never raises.

use std::collections::HashSet;

use crate::catalog::is_base_element;

use super::raw::{RawPathNode, RawSearchResult, RawTreeNode};
use super::IngredientNode;

/// Label used for nodes whose source entry carried no name
const UNKNOWN_ELEMENT: &str = "Unknown";

/// Normalizer for raw search results
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeNormalizer;

impl TreeNormalizer {
    /// Create a normalizer
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Normalize a complete search result into canonical trees
    ///
    /// Accepts all three result shapes. An empty or unusable result yields a
    /// single placeholder tree for `target` rather than an empty list.
    #[must_use]
    pub fn normalize(&self, raw: &RawSearchResult, target: &str) -> Vec<IngredientNode> {
        if let Some(paths) = raw.paths.as_ref().filter(|p| !p.is_empty()) {
            return paths
                .iter()
                .map(|path| self.normalize_path(path, target))
                .collect();
        }

        if let Some(trees) = raw.trees.as_ref().filter(|t| !t.is_empty()) {
            return trees
                .iter()
                .map(|tree| self.normalize_tree(tree, target))
                .collect();
        }

        if raw.name.is_some() {
            // Bare single-tree shape: the result object itself is the root.
            let root = RawTreeNode {
                name: raw.name.clone(),
                image_path: raw.image_path.clone(),
                is_base_element: false,
                is_circular_reference: false,
                no_recipe: false,
                ingredients: raw.ingredients.clone(),
            };
            return vec![self.normalize_tree(&root, target)];
        }

        tracing::debug!(target_element = target, "empty search result, using placeholder");
        vec![Self::placeholder(target)]
    }

    /// Convert one linear ingredient path into a canonical tree
    ///
    /// The root is the path entry matching `target` (falling back to the
    /// final entry); ingredients expand by name lookup within the same path.
    /// Elements absent from the path become childless `has_no_recipe` nodes.
    #[must_use]
    pub fn normalize_path(&self, path: &[RawPathNode], target: &str) -> IngredientNode {
        let entries: Vec<&RawPathNode> = path
            .iter()
            .filter(|e| e.name.as_deref().is_some_and(|n| !n.is_empty()))
            .collect();

        if entries.is_empty() {
            return Self::placeholder(target);
        }

        let root_name = entries
            .iter()
            .find(|e| e.name.as_deref() == Some(target))
            .or_else(|| entries.last())
            .and_then(|e| e.name.clone())
            .unwrap_or_else(|| target.to_string());

        let mut visited = HashSet::new();
        Self::expand_path_element(&root_name, &entries, &mut visited)
    }

    fn expand_path_element(
        name: &str,
        entries: &[&RawPathNode],
        visited: &mut HashSet<String>,
    ) -> IngredientNode {
        let entry = entries.iter().find(|e| e.name.as_deref() == Some(name));
        let image_ref = entry.and_then(|e| e.image_path.clone());

        // A repeat along this path terminates the branch.
        if visited.contains(name) {
            let mut node = IngredientNode::named(name);
            node.is_circular_reference = true;
            node.image_ref = image_ref;
            return node;
        }

        // Base elements are leaves regardless of supplied ingredients.
        if is_base_element(name) {
            let mut node = IngredientNode::named(name);
            node.is_base_element = true;
            node.image_ref = image_ref;
            return node;
        }

        let Some(entry) = entry else {
            let mut node = IngredientNode::named(name);
            node.has_no_recipe = true;
            return node;
        };

        visited.insert(name.to_string());
        let children = entry
            .ingredients
            .iter()
            .map(|ingredient| Self::expand_path_element(ingredient, entries, visited))
            .collect();
        visited.remove(name);

        let mut node = IngredientNode::named(name);
        node.image_ref = image_ref;
        node.children = children;
        node.has_no_recipe = entry.ingredients.is_empty();
        node
    }

    /// Convert a nested raw tree into a canonical tree
    ///
    /// Field spellings were already resolved at ingestion; this walk enforces
    /// the structural rules: path-local cycle cutting, base elements as
    /// leaves, and placeholder degradation for nameless nodes.
    #[must_use]
    pub fn normalize_tree(&self, raw: &RawTreeNode, target: &str) -> IngredientNode {
        let mut visited = HashSet::new();
        Self::expand_tree_node(raw, target, true, &mut visited)
    }

    fn expand_tree_node(
        raw: &RawTreeNode,
        target: &str,
        is_root: bool,
        visited: &mut HashSet<String>,
    ) -> IngredientNode {
        let name = match raw.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None if is_root => {
                tracing::debug!(target_element = target, "nameless root, using placeholder");
                return Self::placeholder(target);
            }
            None => {
                tracing::debug!("nameless node degraded to placeholder");
                let mut node = IngredientNode::named(UNKNOWN_ELEMENT);
                node.has_no_recipe = true;
                return node;
            }
        };

        let mut node = IngredientNode::named(&name);
        node.image_ref = raw.image_path.clone();
        node.has_no_recipe = raw.no_recipe;

        if visited.contains(&name) || raw.is_circular_reference {
            node.is_circular_reference = true;
            return node;
        }

        if is_base_element(&name) {
            node.is_base_element = true;
            return node;
        }

        visited.insert(name.clone());
        node.children = raw
            .ingredients
            .iter()
            .map(|child| Self::expand_tree_node(child, target, false, visited))
            .collect();
        visited.remove(&name);

        node
    }

    /// The "no data" placeholder for a target with no usable result
    #[must_use]
    pub fn placeholder(target: &str) -> IngredientNode {
        let name = if target.is_empty() {
            UNKNOWN_ELEMENT
        } else {
            target
        };
        let mut node = IngredientNode::named(name);
        node.is_base_element = is_base_element(name);
        node.has_no_recipe = true;
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brick_path() -> Vec<RawPathNode> {
        vec![
            RawPathNode::new("Water", Vec::<String>::new()),
            RawPathNode::new("Earth", Vec::<String>::new()),
            RawPathNode::new("Fire", Vec::<String>::new()),
            RawPathNode::new("Mud", vec!["Water", "Earth"]),
            RawPathNode::new("Brick", vec!["Mud", "Fire"]),
        ]
    }

    #[test]
    fn test_path_to_tree_brick() {
        let tree = TreeNormalizer::new().normalize_path(&brick_path(), "Brick");

        assert_eq!(tree.name, "Brick");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].name, "Mud");
        assert_eq!(tree.children[1].name, "Fire");
        assert!(tree.children[1].is_base_element);
        assert!(tree.children[1].is_leaf());

        let mud = &tree.children[0];
        assert_eq!(mud.children.len(), 2);
        assert_eq!(mud.children[0].name, "Water");
        assert_eq!(mud.children[1].name, "Earth");
        assert!(mud.children.iter().all(|c| c.is_base_element && c.is_leaf()));
    }

    #[test]
    fn test_path_root_falls_back_to_last_entry() {
        let path = vec![
            RawPathNode::new("Water", Vec::<String>::new()),
            RawPathNode::new("Steam", vec!["Water", "Fire"]),
        ];
        let tree = TreeNormalizer::new().normalize_path(&path, "Cloud");
        assert_eq!(tree.name, "Steam");
    }

    #[test]
    fn test_cycle_becomes_terminal_marker() {
        // A requires B requires A.
        let path = vec![
            RawPathNode::new("A", vec!["B"]),
            RawPathNode::new("B", vec!["A"]),
        ];
        let tree = TreeNormalizer::new().normalize_path(&path, "A");

        assert_eq!(tree.name, "A");
        assert!(!tree.is_circular_reference);
        let b = &tree.children[0];
        assert_eq!(b.name, "B");
        let inner_a = &b.children[0];
        assert_eq!(inner_a.name, "A");
        assert!(inner_a.is_circular_reference);
        assert!(inner_a.is_leaf());
    }

    #[test]
    fn test_repeat_across_branches_is_not_a_cycle() {
        // Water appears under both Mud and Rain; neither occurrence is on the
        // other's root path, so both expand normally.
        let path = vec![
            RawPathNode::new("Water", Vec::<String>::new()),
            RawPathNode::new("Earth", Vec::<String>::new()),
            RawPathNode::new("Air", Vec::<String>::new()),
            RawPathNode::new("Mud", vec!["Water", "Earth"]),
            RawPathNode::new("Rain", vec!["Water", "Air"]),
            RawPathNode::new("Plant", vec!["Mud", "Rain"]),
        ];
        let tree = TreeNormalizer::new().normalize_path(&path, "Plant");

        let mud_water = &tree.children[0].children[0];
        let rain_water = &tree.children[1].children[0];
        assert!(!mud_water.is_circular_reference);
        assert!(!rain_water.is_circular_reference);
    }

    #[test]
    fn test_base_element_never_expands() {
        // Malicious/buggy source supplies ingredients for Water.
        let path = vec![
            RawPathNode::new("Water", vec!["Steam"]),
            RawPathNode::new("Mud", vec!["Water", "Earth"]),
        ];
        let tree = TreeNormalizer::new().normalize_path(&path, "Mud");
        let water = &tree.children[0];
        assert!(water.is_base_element);
        assert!(water.is_leaf());
    }

    #[test]
    fn test_missing_recipe_marks_no_recipe() {
        let path = vec![RawPathNode::new("Brick", vec!["Mud", "Fire"])];
        let tree = TreeNormalizer::new().normalize_path(&path, "Brick");
        // Mud is not in the path and is not base: childless, no recipe.
        let mud = &tree.children[0];
        assert!(mud.has_no_recipe);
        assert!(mud.is_leaf());
    }

    #[test]
    fn test_empty_input_yields_placeholder() {
        let trees = TreeNormalizer::new().normalize(&RawSearchResult::default(), "Brick");
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].name, "Brick");
        assert!(trees[0].has_no_recipe);
        assert!(trees[0].is_leaf());
    }

    #[test]
    fn test_nested_tree_normalization() {
        let raw = RawTreeNode::named("Brick").with_ingredients(vec![
            RawTreeNode::named("Mud").with_ingredients(vec![
                RawTreeNode::named("Water"),
                RawTreeNode::named("Earth"),
            ]),
            RawTreeNode::named("Fire"),
        ]);
        let tree = TreeNormalizer::new().normalize_tree(&raw, "Brick");

        assert_eq!(tree.node_count(), 5);
        assert!(tree.children[1].is_base_element);
        assert!(tree.children[0].children[0].is_base_element);
    }

    #[test]
    fn test_nested_tree_cycle_cut() {
        let raw = RawTreeNode::named("A").with_ingredients(vec![RawTreeNode::named("B")
            .with_ingredients(vec![RawTreeNode::named("A")
                .with_ingredients(vec![RawTreeNode::named("B")])])]);
        let tree = TreeNormalizer::new().normalize_tree(&raw, "A");

        let inner_a = &tree.children[0].children[0];
        assert!(inner_a.is_circular_reference);
        assert!(inner_a.is_leaf());
    }

    #[test]
    fn test_nameless_nodes_degrade() {
        let nameless_root = RawTreeNode::default();
        let tree = TreeNormalizer::new().normalize_tree(&nameless_root, "Brick");
        assert_eq!(tree.name, "Brick");
        assert!(tree.has_no_recipe);

        let raw =
            RawTreeNode::named("Brick").with_ingredients(vec![RawTreeNode::default()]);
        let tree = TreeNormalizer::new().normalize_tree(&raw, "Brick");
        assert_eq!(tree.children[0].name, "Unknown");
        assert!(tree.children[0].has_no_recipe);
    }

    #[test]
    fn test_bare_single_tree_shape() {
        let raw: RawSearchResult = serde_json::from_str(
            r#"{"name": "Brick", "ingredients": [{"name": "Mud"}, {"name": "Fire"}]}"#,
        )
        .unwrap();
        let trees = TreeNormalizer::new().normalize(&raw, "Brick");
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].children.len(), 2);
    }
}
