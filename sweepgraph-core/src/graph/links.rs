//! Link Table
//!
//! Directed edges between node identities, kept apart from node ownership.
//! The same ordered pair may be linked any number of times; each link is an
//! independent entry and is removed independently.

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::node::NodeId;

/// Outgoing targets of one source, in insertion order.
type Targets = SmallVec<[NodeId; 4]>;

/// A multi-valued relation from source node to target nodes.
#[derive(Debug, Default)]
pub(crate) struct LinkTable {
    /// Outgoing links per source. Sources with no links have no entry.
    links: IndexMap<NodeId, Targets>,

    /// Total number of links, counting parallel ones.
    len: usize,
}

impl LinkTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            links: IndexMap::with_capacity(capacity),
            len: 0,
        }
    }

    /// Add a link `from -> to`, even if one already exists.
    pub(crate) fn insert(&mut self, from: NodeId, to: NodeId) {
        self.links.entry(from).or_default().push(to);
        self.len += 1;
    }

    /// Remove the oldest remaining link `from -> to`.
    ///
    /// Returns `false` if there was no such link.
    pub(crate) fn remove_one(&mut self, from: NodeId, to: NodeId) -> bool {
        let Some(targets) = self.links.get_mut(&from) else {
            return false;
        };
        let Some(pos) = targets.iter().position(|&t| t == to) else {
            return false;
        };

        targets.remove(pos);
        if targets.is_empty() {
            self.links.swap_remove(&from);
        }
        self.len -= 1;
        true
    }

    /// Outgoing targets of `from`, parallel links repeated.
    pub(crate) fn targets(&self, from: NodeId) -> &[NodeId] {
        self.links.get(&from).map(|t| t.as_slice()).unwrap_or(&[])
    }

    /// Number of links `from -> to`.
    pub(crate) fn count(&self, from: NodeId, to: NodeId) -> usize {
        self.targets(from).iter().filter(|&&t| t == to).count()
    }

    /// Total number of links.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Drop every link whose source fails `keep`.
    ///
    /// Returns how many links were dropped.
    pub(crate) fn retain_sources<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&NodeId) -> bool,
    {
        let mut pruned = 0;
        self.links.retain(|from, targets| {
            if keep(from) {
                true
            } else {
                pruned += targets.len();
                false
            }
        });
        self.len -= pruned;
        pruned
    }
}
