//! Graph Nodes
//!
//! This module defines node identity, the owned node storage, and the handles
//! callers use to refer to nodes once a graph owns them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{GraphError, GraphResult};
use crate::observe::NodeObserver;

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Unique identifier for a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GraphId(u64);

impl GraphId {
    /// Generate a new unique graph ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u64> for GraphId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Storage for a single node.
///
/// A `Node` starts out detached. Attaching it (as root or as a child) moves it
/// into the graph, which owns it from then on. The node holds no edges; those
/// live in the graph's link table.
pub struct Node {
    /// Unique identifier for this node.
    id: NodeId,

    /// The graph that owns this node. Set once, on attach.
    owner: Option<GraphId>,

    /// Notified when this node is created and dropped.
    observer: Option<Arc<dyn NodeObserver>>,
}

impl Node {
    /// Create a detached node with no observer.
    pub fn new() -> Self {
        Self::observed(None)
    }

    /// Create a detached node that reports its lifetime to `observer`.
    pub(crate) fn observed(observer: Option<Arc<dyn NodeObserver>>) -> Self {
        let id = NodeId::new();
        if let Some(observer) = &observer {
            observer.on_create(id);
        }
        Self {
            id,
            owner: None,
            observer,
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The graph that owns this node, if any.
    pub fn owner(&self) -> Option<GraphId> {
        self.owner
    }

    /// Check whether a graph owns this node.
    pub fn is_attached(&self) -> bool {
        self.owner.is_some()
    }

    /// Record `graph` as this node's owner.
    ///
    /// Adopting into the graph that already owns the node is a no-op.
    pub(crate) fn adopt(&mut self, graph: GraphId) -> GraphResult<()> {
        match self.owner {
            Some(owner) if owner != graph => Err(GraphError::CrossGraphOwnership {
                node: self.id,
                owner,
                graph,
            }),
            _ => {
                self.owner = Some(graph);
                Ok(())
            }
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        if let Some(observer) = &self.observer {
            observer.on_release(self.id);
        }
    }
}

/// Handle to a node owned by a graph.
///
/// Handles are cheap to copy and compare by identity. A handle stays valid
/// until a sweep reclaims its node; operations on a reclaimed handle fail with
/// [`GraphError::NotAttached`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    id: NodeId,
    graph: GraphId,
}

impl NodeRef {
    pub(crate) fn new(id: NodeId, graph: GraphId) -> Self {
        Self { id, graph }
    }

    /// The node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The graph that owns the node.
    pub fn graph(&self) -> GraphId {
        self.graph
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.graph, self.id)
    }
}

/// A node being attached to a graph.
#[derive(Debug)]
pub enum Child {
    /// A fresh node whose ownership moves into the graph.
    Detached(Node),

    /// A node some graph already owns.
    Owned(NodeRef),
}

impl Child {
    /// The ID of the node being attached.
    pub fn id(&self) -> NodeId {
        match self {
            Child::Detached(node) => node.id(),
            Child::Owned(node_ref) => node_ref.id(),
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Detached(node)
    }
}

impl From<NodeRef> for Child {
    fn from(node_ref: NodeRef) -> Self {
        Child::Owned(node_ref)
    }
}
