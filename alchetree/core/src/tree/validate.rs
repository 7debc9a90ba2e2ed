//! Hierarchy Validator/Repairer
//!
//! Enforces the structural contract of a [`PositionedTree`]:
//!
//! - For every non-root node, `parent.children` must include it and its
//!   parent pointer must match. On mismatch, children-ownership is
//!   authoritative and the parent pointer is corrected.
//! - A node listed in more than one children list keeps its first owner
//!   (arena order); later listings are dropped.
//! - Any node unreachable from the root by parent chain is reattached
//!   directly under the root.
//!
//! The repairer is idempotent: a second consecutive run changes nothing. It
//! runs twice per layout pass, before and after coordinate assignment.

use super::{NodeId, PositionedTree};

/// Counts of repairs applied in one validator run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Parent pointers rewritten to match children-ownership
    pub corrected_parents: usize,
    /// Nodes reattached directly under the root
    pub reattached_orphans: usize,
    /// Child entries dropped (self-references, root listings, repeat owners)
    pub dropped_children: usize,
}

impl RepairReport {
    /// Whether the run found nothing to repair
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.corrected_parents == 0 && self.reattached_orphans == 0 && self.dropped_children == 0
    }

    /// Total number of repairs applied
    #[must_use]
    pub fn total(&self) -> usize {
        self.corrected_parents + self.reattached_orphans + self.dropped_children
    }
}

/// Validator/repairer for positioned hierarchies
#[derive(Clone, Copy, Debug, Default)]
pub struct HierarchyValidator;

impl HierarchyValidator {
    /// Create a validator
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate the hierarchy and repair every violation in place
    ///
    /// Returns the repair counts; callers log a non-clean report at `debug`.
    pub fn validate_and_repair(&self, tree: &mut PositionedTree) -> RepairReport {
        let mut report = RepairReport::default();
        if tree.is_empty() {
            return report;
        }
        let root = tree.root();

        let owner = self.claim_ownership(tree, root, &mut report);
        self.align_parents(tree, root, &owner, &mut report);
        self.reattach_orphans(tree, root, &mut report);
        self.break_parent_cycles(tree, root, &mut report);
        self.recompute_depths(tree, root);

        if !report.is_clean() {
            tracing::debug!(
                corrected_parents = report.corrected_parents,
                reattached_orphans = report.reattached_orphans,
                dropped_children = report.dropped_children,
                "hierarchy repaired"
            );
        }
        report
    }

    /// First pass: children lists claim ownership in arena order.
    ///
    /// Self-references, listings of the root, and second claims are dropped.
    fn claim_ownership(
        &self,
        tree: &mut PositionedTree,
        root: NodeId,
        report: &mut RepairReport,
    ) -> Vec<Option<NodeId>> {
        let mut owner: Vec<Option<NodeId>> = vec![None; tree.len()];

        for pid in tree.ids().collect::<Vec<_>>() {
            let children = tree.node(pid).children.clone();
            let mut kept = Vec::with_capacity(children.len());
            for child in children {
                if child == pid || child == root || owner[child.index()].is_some() {
                    report.dropped_children += 1;
                    continue;
                }
                owner[child.index()] = Some(pid);
                kept.push(child);
            }
            if kept.len() != tree.node(pid).children.len() {
                tree.node_mut(pid).children = kept;
            }
        }

        owner
    }

    /// Second pass: rewrite every parent pointer to its owning children list.
    fn align_parents(
        &self,
        tree: &mut PositionedTree,
        root: NodeId,
        owner: &[Option<NodeId>],
        report: &mut RepairReport,
    ) {
        for id in tree.ids().collect::<Vec<_>>() {
            let expected = if id == root { None } else { owner[id.index()] };
            if tree.node(id).parent != expected {
                tree.node_mut(id).parent = expected;
                report.corrected_parents += 1;
            }
        }
    }

    /// Third pass: unowned non-root nodes go directly under the root.
    fn reattach_orphans(&self, tree: &mut PositionedTree, root: NodeId, report: &mut RepairReport) {
        for id in tree.ids().collect::<Vec<_>>() {
            if id != root && tree.node(id).parent.is_none() {
                tree.node_mut(id).parent = Some(root);
                tree.node_mut(root).children.push(id);
                report.reattached_orphans += 1;
            }
        }
    }

    /// Fourth pass: components whose parent chain loops without reaching the
    /// root are broken by reattaching their lowest-index member.
    fn break_parent_cycles(
        &self,
        tree: &mut PositionedTree,
        root: NodeId,
        report: &mut RepairReport,
    ) {
        loop {
            let Some(member) = self.find_cycle_member(tree, root) else {
                return;
            };
            if let Some(old_parent) = tree.node(member).parent {
                tree.node_mut(old_parent).children.retain(|&c| c != member);
            }
            tree.node_mut(member).parent = Some(root);
            tree.node_mut(root).children.push(member);
            report.reattached_orphans += 1;
        }
    }

    /// Lowest-index node whose parent chain never reaches the root.
    fn find_cycle_member(&self, tree: &PositionedTree, root: NodeId) -> Option<NodeId> {
        let bound = tree.len();
        for id in tree.ids() {
            if id == root {
                continue;
            }
            let mut current = id;
            let mut steps = 0;
            loop {
                match tree.node(current).parent {
                    Some(p) if p == root => break,
                    Some(p) if steps < bound => {
                        current = p;
                        steps += 1;
                    }
                    // Bound exceeded: the chain loops.
                    Some(_) => return Some(id),
                    // Chain broken; orphan pass already handled these, but a
                    // stale None here still means unreachable.
                    None => return Some(id),
                }
            }
        }
        None
    }

    /// Final pass: depths follow the (now consistent) children lists.
    fn recompute_depths(&self, tree: &mut PositionedTree, root: NodeId) {
        let mut queue = std::collections::VecDeque::new();
        tree.node_mut(root).depth = 0;
        queue.push_back(root);
        while let Some(id) = queue.pop_front() {
            let depth = tree.node(id).depth;
            for child in tree.node(id).children.clone() {
                tree.node_mut(child).depth = depth + 1;
                queue.push_back(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::IngredientNode;

    fn brick_arena() -> PositionedTree {
        let mut mud = IngredientNode::named("Mud");
        mud.children = vec![IngredientNode::named("Water"), IngredientNode::named("Earth")];
        let mut brick = IngredientNode::named("Brick");
        brick.children = vec![mud, IngredientNode::named("Fire")];
        PositionedTree::from_ingredient_tree(&brick)
    }

    #[test]
    fn test_valid_tree_is_untouched() {
        let mut tree = brick_arena();
        let before = tree.clone();
        let report = HierarchyValidator::new().validate_and_repair(&mut tree);
        assert!(report.is_clean());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_corrupted_parent_pointer_is_corrected() {
        let mut tree = brick_arena();
        let water = tree.find_by_name("Water").unwrap();
        let fire = tree.find_by_name("Fire").unwrap();
        let mud = tree.find_by_name("Mud").unwrap();

        // Water claims Fire as its parent, but Mud's children list still owns it.
        tree.node_mut(water).parent = Some(fire);

        let report = HierarchyValidator::new().validate_and_repair(&mut tree);
        assert_eq!(report.corrected_parents, 1);
        assert_eq!(tree.node(water).parent, Some(mud));
    }

    #[test]
    fn test_orphan_is_reattached_under_root() {
        let mut tree = brick_arena();
        let mud = tree.find_by_name("Mud").unwrap();
        let water = tree.find_by_name("Water").unwrap();
        let root = tree.root();

        // Remove Water from Mud's children entirely: no owner anywhere.
        tree.node_mut(mud).children.retain(|&c| c != water);

        let report = HierarchyValidator::new().validate_and_repair(&mut tree);
        assert_eq!(report.reattached_orphans, 1);
        assert_eq!(tree.node(water).parent, Some(root));
        assert!(tree.node(root).children.contains(&water));
        assert_eq!(tree.node(water).depth, 1);
    }

    #[test]
    fn test_duplicate_listing_keeps_first_owner() {
        let mut tree = brick_arena();
        let water = tree.find_by_name("Water").unwrap();
        let fire = tree.find_by_name("Fire").unwrap();
        let mud = tree.find_by_name("Mud").unwrap();

        // Fire also lists Water; Mud's (earlier) listing wins.
        tree.node_mut(fire).children.push(water);

        let report = HierarchyValidator::new().validate_and_repair(&mut tree);
        assert_eq!(report.dropped_children, 1);
        assert_eq!(tree.node(water).parent, Some(mud));
        assert!(tree.node(fire).children.is_empty());
    }

    #[test]
    fn test_self_reference_is_dropped() {
        let mut tree = brick_arena();
        let mud = tree.find_by_name("Mud").unwrap();
        tree.node_mut(mud).children.push(mud);

        let report = HierarchyValidator::new().validate_and_repair(&mut tree);
        assert_eq!(report.dropped_children, 1);
        assert!(!tree.node(mud).children.contains(&mud));
    }

    #[test]
    fn test_idempotence_after_repair() {
        let mut tree = brick_arena();
        let water = tree.find_by_name("Water").unwrap();
        let fire = tree.find_by_name("Fire").unwrap();
        let mud = tree.find_by_name("Mud").unwrap();

        tree.node_mut(water).parent = Some(fire);
        tree.node_mut(mud).children.push(mud);
        tree.node_mut(fire).children.push(water);

        let validator = HierarchyValidator::new();
        let first = validator.validate_and_repair(&mut tree);
        assert!(!first.is_clean());

        let snapshot = tree.clone();
        let second = validator.validate_and_repair(&mut tree);
        assert!(second.is_clean(), "second run must change nothing: {second:?}");
        assert_eq!(tree, snapshot);
    }

    #[test]
    fn test_parent_cycle_is_broken() {
        let mut tree = brick_arena();
        let mud = tree.find_by_name("Mud").unwrap();
        let water = tree.find_by_name("Water").unwrap();
        let earth = tree.find_by_name("Earth").unwrap();
        let root = tree.root();

        // Detach Mud's subtree from the root and wire Water to own Mud:
        // Mud -> Water -> Mud parent cycle, unreachable from the root.
        tree.node_mut(root).children.retain(|&c| c != mud);
        tree.node_mut(mud).parent = Some(water);
        tree.node_mut(water).children.push(mud);

        let validator = HierarchyValidator::new();
        let report = validator.validate_and_repair(&mut tree);
        assert!(report.reattached_orphans >= 1);

        // Every node must now reach the root by parent chain.
        for id in tree.ids() {
            let mut current = id;
            let mut steps = 0;
            while let Some(p) = tree.node(current).parent {
                current = p;
                steps += 1;
                assert!(steps <= tree.len(), "parent chain loops at {id}");
            }
            assert_eq!(current, root);
        }

        // Earth stayed inside Mud's subtree.
        assert_eq!(tree.node(earth).parent, Some(mud));

        // And the repair settled in one run.
        let snapshot = tree.clone();
        assert!(validator.validate_and_repair(&mut tree).is_clean());
        assert_eq!(tree, snapshot);
    }
}
