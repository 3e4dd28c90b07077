//! Reachability
//!
//! The mark phase of a sweep: every node identity reachable from the root by
//! following links.
//!
//! # Algorithm
//!
//! An explicit worklist seeded with the root replaces recursion, so deep
//! chains and cycles cost heap, not stack.
//!
//! 1. Pop a node. If it was already visited, skip it.
//! 2. Mark it visited.
//! 3. Push every outgoing target not yet visited.
//!
//! Parallel links to one target push it at most once per visit of the source,
//! and a target popped a second time is skipped at step 1, so each node is
//! expanded exactly once. Visitation order does not affect the result.

use std::collections::HashSet;

use super::links::LinkTable;
use super::node::NodeId;

/// Collect every node reachable from `root` through `links`.
///
/// With no root the result is empty.
pub(crate) fn reachable_from(links: &LinkTable, root: Option<NodeId>) -> HashSet<NodeId> {
    let mut visited = HashSet::new();
    let Some(root) = root else {
        return visited;
    };

    let mut worklist = vec![root];
    while let Some(node_id) = worklist.pop() {
        if !visited.insert(node_id) {
            continue;
        }

        let mut last = None;
        for &target in links.targets(node_id) {
            // Collapse runs of parallel links
            if last == Some(target) || visited.contains(&target) {
                continue;
            }
            last = Some(target);
            worklist.push(target);
        }
    }

    visited
}
