//! Graph Arena
//!
//! The graph owns every node attached to it and every link between them.
//! Ownership and connectivity are tracked separately:
//!
//! - `nodes` holds node storage, indexed by ID. A node enters it the first
//!   time it is attached, as root or as someone's child.
//! - `links` holds directed edges between IDs. Adding or removing a link never
//!   allocates or frees a node.
//!
//! Storage is released in exactly one place, [`Graph::shrink_to_fit`], which
//! drops every node the root can no longer reach. Cycles get no special
//! treatment: a cycle the root cannot reach is reclaimed like anything else.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::links::LinkTable;
use super::node::{Child, GraphId, Node, NodeId, NodeRef};
use super::sweep;
use crate::error::{GraphError, GraphResult};
use crate::observe::NodeObserver;

/// Outcome of a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Nodes dropped because the root could not reach them.
    pub reclaimed: usize,

    /// Nodes still owned after the sweep.
    pub survivors: usize,

    /// Links dropped because their source was reclaimed.
    pub links_pruned: usize,
}

/// Configures a [`Graph`] before it is built.
#[derive(Default)]
pub struct GraphBuilder {
    capacity: usize,
    observer: Option<Arc<dyn NodeObserver>>,
}

impl GraphBuilder {
    /// Pre-size node and link storage.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Report the lifetime of every node this graph makes to `observer`.
    pub fn observer(mut self, observer: Arc<dyn NodeObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> Graph {
        Graph {
            id: GraphId::new(),
            root: None,
            nodes: IndexMap::with_capacity(self.capacity),
            links: LinkTable::with_capacity(self.capacity),
            observer: self.observer,
        }
    }
}

/// A directed graph that owns its nodes and reclaims them by reachability.
pub struct Graph {
    /// Unique identifier for this graph.
    id: GraphId,

    /// Traversal entry point. Set at most once.
    root: Option<NodeId>,

    /// Every node this graph owns, reachable or not.
    nodes: IndexMap<NodeId, Node>,

    /// Directed links, parallel ones included.
    links: LinkTable,

    /// Handed to every node made by this graph.
    observer: Option<Arc<dyn NodeObserver>>,
}

impl Graph {
    /// Create an empty graph with no observer.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Get the graph's ID.
    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Make a detached node. Nothing changes in the graph until it is attached.
    pub fn make_node(&self) -> Node {
        Node::observed(self.observer.clone())
    }

    /// Designate `node` as the traversal root, taking ownership of it.
    ///
    /// The root can only be set once.
    pub fn set_root(&mut self, node: impl Into<Child>) -> GraphResult<NodeRef> {
        if let Some(root) = self.root {
            return Err(self.reject(GraphError::RootAlreadySet { root }));
        }

        let id = self.adopt(node.into())?;
        self.root = Some(id);
        debug!(graph = %self.id, root = %id, "root set");
        Ok(self.handle(id))
    }

    /// The root, if one has been set.
    pub fn root(&self) -> Option<NodeRef> {
        self.root.map(|id| self.handle(id))
    }

    /// Link `parent -> child`, taking ownership of `child` if it is detached.
    ///
    /// Linking the same pair again adds a parallel link.
    pub fn add_child(&mut self, parent: NodeRef, child: impl Into<Child>) -> GraphResult<NodeRef> {
        self.check_owned(parent)?;
        let child_id = self.adopt(child.into())?;
        self.link(parent.id(), child_id);
        Ok(self.handle(child_id))
    }

    /// Remove one link `parent -> child`.
    ///
    /// Returns `Ok(false)` if there was no such link. The child stays owned
    /// until a sweep finds it unreachable.
    pub fn remove_child(&mut self, parent: NodeRef, child: NodeRef) -> GraphResult<bool> {
        self.check_owned(parent)?;
        Ok(self.unlink(parent.id(), child.id()))
    }

    /// Borrow an owned node for edge mutation.
    pub fn node_mut(&mut self, node: NodeRef) -> GraphResult<NodeMut<'_>> {
        self.check_owned(node)?;
        Ok(NodeMut { graph: self, node })
    }

    /// Drop every node the root cannot reach.
    ///
    /// Links out of dropped nodes are pruned with them. Without a root, every
    /// node is dropped.
    pub fn shrink_to_fit(&mut self) -> SweepReport {
        let reachable = self.reachable();
        let before = self.nodes.len();

        self.nodes.retain(|id, _| reachable.contains(id));
        let links_pruned = self.links.retain_sources(|id| reachable.contains(id));

        let report = SweepReport {
            reclaimed: before - self.nodes.len(),
            survivors: self.nodes.len(),
            links_pruned,
        };
        debug!(
            graph = %self.id,
            reclaimed = report.reclaimed,
            survivors = report.survivors,
            links_pruned = report.links_pruned,
            "sweep finished"
        );
        report
    }

    /// IDs of every node reachable from the root right now.
    pub fn reachable(&self) -> HashSet<NodeId> {
        sweep::reachable_from(&self.links, self.root)
    }

    /// Check whether `node` is reachable from the root right now.
    pub fn is_reachable(&self, node: NodeRef) -> bool {
        self.contains(node) && self.reachable().contains(&node.id())
    }

    /// Check whether this graph currently owns `node`.
    pub fn contains(&self, node: NodeRef) -> bool {
        node.graph() == self.id && self.nodes.contains_key(&node.id())
    }

    /// Get an owned node's storage.
    pub fn node(&self, node: NodeRef) -> Option<&Node> {
        if node.graph() != self.id {
            return None;
        }
        self.nodes.get(&node.id())
    }

    /// Handles to every owned node, in attach order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.nodes.keys().map(move |&id| self.handle(id))
    }

    /// Targets of `node`'s outgoing links, in link order, parallel links repeated.
    pub fn children(&self, node: NodeRef) -> impl Iterator<Item = NodeRef> + '_ {
        let targets = if node.graph() == self.id {
            self.links.targets(node.id())
        } else {
            &[]
        };
        targets.iter().map(move |&id| self.handle(id))
    }

    /// Number of links `from -> to`.
    pub fn edge_count(&self, from: NodeRef, to: NodeRef) -> usize {
        if from.graph() != self.id || to.graph() != self.id {
            return 0;
        }
        self.links.count(from.id(), to.id())
    }

    /// Number of owned nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links, counting parallel ones.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Check whether the graph owns no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn handle(&self, id: NodeId) -> NodeRef {
        NodeRef::new(id, self.id)
    }

    /// Fail unless `node` belongs to this graph and has not been reclaimed.
    fn check_owned(&self, node: NodeRef) -> GraphResult<()> {
        if node.graph() != self.id {
            return Err(self.reject(GraphError::CrossGraphOwnership {
                node: node.id(),
                owner: node.graph(),
                graph: self.id,
            }));
        }
        if !self.nodes.contains_key(&node.id()) {
            return Err(self.reject(GraphError::NotAttached(node.id())));
        }
        Ok(())
    }

    /// Take ownership of a detached node, or confirm an owned one is ours.
    fn adopt(&mut self, child: Child) -> GraphResult<NodeId> {
        match child {
            Child::Detached(mut node) => {
                if let Err(err) = node.adopt(self.id) {
                    return Err(self.reject(err));
                }
                let id = node.id();
                self.nodes.entry(id).or_insert(node);
                trace!(graph = %self.id, node = %id, "node adopted");
                Ok(id)
            }
            Child::Owned(node_ref) => {
                self.check_owned(node_ref)?;
                Ok(node_ref.id())
            }
        }
    }

    fn link(&mut self, from: NodeId, to: NodeId) {
        self.links.insert(from, to);
        trace!(graph = %self.id, %from, %to, "link added");
    }

    fn unlink(&mut self, from: NodeId, to: NodeId) -> bool {
        let removed = self.links.remove_one(from, to);
        trace!(graph = %self.id, %from, %to, removed, "link removal");
        removed
    }

    fn reject(&self, err: GraphError) -> GraphError {
        warn!(graph = %self.id, error = %err, "graph operation rejected");
        err
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("root", &self.root)
            .field("node_count", &self.nodes.len())
            .field("link_count", &self.links.len())
            .finish()
    }
}

/// An owned node, borrowed together with its graph.
///
/// The node cannot be reclaimed while this borrow is alive, so its edge
/// operations only fail on the child side.
pub struct NodeMut<'g> {
    graph: &'g mut Graph,
    node: NodeRef,
}

impl NodeMut<'_> {
    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Get a copyable handle to the node.
    pub fn node_ref(&self) -> NodeRef {
        self.node
    }

    /// Link this node to `child`, taking ownership of `child` if detached.
    pub fn add_child(&mut self, child: impl Into<Child>) -> GraphResult<NodeRef> {
        let child_id = self.graph.adopt(child.into())?;
        self.graph.link(self.node.id(), child_id);
        Ok(self.graph.handle(child_id))
    }

    /// Remove one link from this node to `child`. Returns `false` if there was none.
    pub fn remove_child(&mut self, child: NodeRef) -> bool {
        self.graph.unlink(self.node.id(), child.id())
    }

    /// Targets of this node's outgoing links.
    pub fn children(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.graph.children(self.node)
    }
}

impl fmt::Debug for NodeMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeMut").field("node", &self.node).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::LiveCounter;

    fn observed_graph() -> (Graph, Arc<LiveCounter>) {
        let counter = Arc::new(LiveCounter::new());
        let graph = Graph::builder().observer(counter.clone()).build();
        (graph, counter)
    }

    #[test]
    fn make_node_has_no_graph_side_effects() {
        let (graph, counter) = observed_graph();
        let node = graph.make_node();

        assert!(!node.is_attached());
        assert!(graph.is_empty());
        assert_eq!(counter.live(), 1);
    }

    #[test]
    fn set_root_takes_ownership() {
        let mut graph = Graph::new();
        let root = graph.set_root(graph.make_node()).unwrap();

        assert_eq!(graph.root(), Some(root));
        assert!(graph.contains(root));
        assert_eq!(graph.node(root).unwrap().owner(), Some(graph.id()));
    }

    #[test]
    fn root_is_set_once() {
        let (mut graph, counter) = observed_graph();
        let root = graph.set_root(graph.make_node()).unwrap();

        let err = graph.set_root(graph.make_node()).unwrap_err();
        assert_eq!(err, GraphError::RootAlreadySet { root: root.id() });
        assert_eq!(graph.root(), Some(root));
        assert_eq!(graph.node_count(), 1);
        // The rejected node was dropped with the call
        assert_eq!(counter.live(), 1);
    }

    #[test]
    fn set_root_keeps_node_identity() {
        let mut graph = Graph::new();
        let a = graph.make_node();
        let a_id = a.id();

        let root = graph.set_root(a).unwrap();
        assert_eq!(root.id(), a_id);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn add_child_adopts_and_links() {
        let mut graph = Graph::new();
        let root = graph.set_root(graph.make_node()).unwrap();
        let child = graph.add_child(root, graph.make_node()).unwrap();

        assert!(graph.contains(child));
        assert_eq!(graph.node(child).unwrap().owner(), Some(graph.id()));
        assert_eq!(graph.children(root).collect::<Vec<_>>(), vec![child]);
        assert_eq!(graph.link_count(), 1);
    }

    #[test]
    fn reattaching_owned_node_only_adds_a_link() {
        let mut graph = Graph::new();
        let root = graph.set_root(graph.make_node()).unwrap();
        let a = graph.add_child(root, graph.make_node()).unwrap();
        let b = graph.add_child(root, graph.make_node()).unwrap();

        graph.add_child(b, a).unwrap();
        graph.add_child(root, a).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(root, a), 2);
        assert_eq!(graph.edge_count(b, a), 1);
    }

    #[test]
    fn remove_child_missing_link_is_ok_false() {
        let mut graph = Graph::new();
        let root = graph.set_root(graph.make_node()).unwrap();
        let a = graph.add_child(root, graph.make_node()).unwrap();

        assert_eq!(graph.remove_child(a, root), Ok(false));
        assert_eq!(graph.remove_child(root, a), Ok(true));
        assert_eq!(graph.remove_child(root, a), Ok(false));
    }

    #[test]
    fn removing_link_keeps_node_until_sweep() {
        let (mut graph, counter) = observed_graph();
        let root = graph.set_root(graph.make_node()).unwrap();
        let a = graph.add_child(root, graph.make_node()).unwrap();

        graph.remove_child(root, a).unwrap();
        assert!(graph.contains(a));
        assert_eq!(counter.live(), 2);

        let report = graph.shrink_to_fit();
        assert_eq!(report.reclaimed, 1);
        assert!(!graph.contains(a));
        assert_eq!(counter.live(), 1);
    }

    #[test]
    fn foreign_parent_is_rejected() {
        let mut home = Graph::new();
        let mut away = Graph::new();
        let away_root = away.set_root(away.make_node()).unwrap();
        home.set_root(home.make_node()).unwrap();

        let err = home.add_child(away_root, home.make_node()).unwrap_err();
        assert_eq!(
            err,
            GraphError::CrossGraphOwnership {
                node: away_root.id(),
                owner: away.id(),
                graph: home.id(),
            }
        );
        assert_eq!(home.node_count(), 1);
        assert_eq!(home.link_count(), 0);
    }

    #[test]
    fn foreign_child_is_rejected() {
        let mut home = Graph::new();
        let mut away = Graph::new();
        let home_root = home.set_root(home.make_node()).unwrap();
        let away_root = away.set_root(away.make_node()).unwrap();

        let err = home.add_child(home_root, away_root).unwrap_err();
        assert!(matches!(err, GraphError::CrossGraphOwnership { node, .. } if node == away_root.id()));
        assert_eq!(home.link_count(), 0);

        let err = home.set_root(away_root);
        assert!(matches!(err, Err(GraphError::RootAlreadySet { .. })));
    }

    #[test]
    fn foreign_root_is_rejected() {
        let mut home = Graph::new();
        let mut away = Graph::new();
        let away_root = away.set_root(away.make_node()).unwrap();

        let err = home.set_root(away_root).unwrap_err();
        assert!(matches!(err, GraphError::CrossGraphOwnership { .. }));
        assert_eq!(home.root(), None);
    }

    #[test]
    fn reclaimed_handle_is_not_attached() {
        let mut graph = Graph::new();
        let root = graph.set_root(graph.make_node()).unwrap();
        let a = graph.add_child(root, graph.make_node()).unwrap();
        graph.remove_child(root, a).unwrap();
        graph.shrink_to_fit();

        assert_eq!(
            graph.add_child(a, graph.make_node()),
            Err(GraphError::NotAttached(a.id()))
        );
        assert_eq!(graph.add_child(root, a), Err(GraphError::NotAttached(a.id())));
        assert_eq!(graph.remove_child(a, root), Err(GraphError::NotAttached(a.id())));
        assert!(graph.node_mut(a).is_err());
    }

    #[test]
    fn sweep_without_root_is_empty() {
        // Parents must already be owned, so nothing can join a graph before its root
        let (mut graph, counter) = observed_graph();
        let _detached = graph.make_node();

        let report = graph.shrink_to_fit();
        assert_eq!(report, SweepReport::default());
        assert!(graph.reachable().is_empty());
        assert!(graph.is_empty());
        // Detached nodes belong to the caller, not the graph
        assert_eq!(counter.live(), 1);
    }

    #[test]
    fn sweep_prunes_links_of_reclaimed_sources() {
        let mut graph = Graph::new();
        let root = graph.set_root(graph.make_node()).unwrap();
        let a = graph.add_child(root, graph.make_node()).unwrap();
        let b = graph.add_child(a, graph.make_node()).unwrap();
        graph.add_child(b, a).unwrap();
        graph.remove_child(root, a).unwrap();

        let report = graph.shrink_to_fit();
        assert_eq!(
            report,
            SweepReport {
                reclaimed: 2,
                survivors: 1,
                links_pruned: 2,
            }
        );
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn node_mut_delegates_to_graph() {
        let mut graph = Graph::new();
        let root = graph.set_root(graph.make_node()).unwrap();
        let fresh = graph.make_node();

        let mut node = graph.node_mut(root).unwrap();
        assert_eq!(node.id(), root.id());
        let a = node.add_child(fresh).unwrap();
        node.add_child(a).unwrap();
        assert_eq!(node.children().count(), 2);
        assert!(node.remove_child(a));
        assert_eq!(node.node_ref(), root);

        assert_eq!(graph.edge_count(root, a), 1);
        assert!(graph.is_reachable(a));
    }

    #[test]
    fn nodes_iterate_in_attach_order() {
        let mut graph = Graph::builder().capacity(8).build();
        let root = graph.set_root(graph.make_node()).unwrap();
        let a = graph.add_child(root, graph.make_node()).unwrap();
        let b = graph.add_child(a, graph.make_node()).unwrap();

        assert_eq!(graph.nodes().collect::<Vec<_>>(), vec![root, a, b]);
    }

    #[test]
    fn dropping_graph_releases_all_nodes() {
        let (mut graph, counter) = observed_graph();
        let root = graph.set_root(graph.make_node()).unwrap();
        let a = graph.add_child(root, graph.make_node()).unwrap();
        graph.add_child(a, root).unwrap();
        assert_eq!(counter.live(), 2);

        drop(graph);
        assert_eq!(counter.live(), 0);
    }
}
