//! Node Lifetime Observation
//!
//! The graph never exposes an "is this node alive" query. Embedders that need
//! to see reclamation install a [`NodeObserver`] when building the graph; every
//! node made by that graph reports its creation and its release.
//!
//! [`LiveCounter`] is the stock observer: it keeps a running count of nodes
//! that have been created but not yet released.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::graph::NodeId;

/// Hook notified when nodes come into and go out of existence.
///
/// `on_release` fires from the node's `Drop`, which for attached nodes only
/// happens inside a sweep or when the owning graph is dropped.
pub trait NodeObserver: Send + Sync {
    /// A node was created by `Graph::make_node`.
    fn on_create(&self, id: NodeId);

    /// A node's storage was released.
    fn on_release(&self, id: NodeId);
}

/// Counts live nodes.
#[derive(Debug, Default)]
pub struct LiveCounter {
    created: AtomicUsize,
    released: AtomicUsize,
}

impl LiveCounter {
    /// Create a counter with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes created and not yet released.
    pub fn live(&self) -> usize {
        self.created().saturating_sub(self.released())
    }

    /// Total nodes created.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// Total nodes released.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::Relaxed)
    }
}

impl NodeObserver for LiveCounter {
    fn on_create(&self, _id: NodeId) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    fn on_release(&self, _id: NodeId) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }
}
