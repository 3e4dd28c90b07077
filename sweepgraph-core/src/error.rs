//! Graph Errors
//!
//! Every error here is a broken caller contract rather than an environmental
//! failure. Operations that return one leave the graph exactly as it was.

use thiserror::Error;

use crate::graph::{GraphId, NodeId};

/// Errors returned by edge-mutating and root-setting operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The node acting as a parent is not part of the graph (it was never
    /// attached here, or a sweep has already reclaimed it).
    #[error("node {0} is not attached to a graph")]
    NotAttached(NodeId),

    /// The node is owned by a different graph than the one being mutated.
    #[error("node {node} is owned by graph {owner}, not graph {graph}")]
    CrossGraphOwnership {
        node: NodeId,
        owner: GraphId,
        graph: GraphId,
    },

    /// The graph already has a root.
    #[error("root is already set to node {root}")]
    RootAlreadySet { root: NodeId },
}

pub type GraphResult<T> = Result<T, GraphError>;
