//! Owned Graph
//!
//! This module implements a directed graph that owns its nodes collectively
//! and reclaims them by reachability from a single root.
//!
//! # Overview
//!
//! - Nodes are owned by the graph, never by each other. A node joins the graph
//!   the first time it is attached, either as the root or as a child of a node
//!   the graph already owns.
//! - Links are directed edges between node IDs. They may repeat and may form
//!   cycles. They carry no ownership.
//! - `shrink_to_fit` marks everything reachable from the root and drops the
//!   rest, cycles included.
//!
//! # Design Decisions
//!
//! 1. Nodes live in an arena indexed by ID. Callers hold `NodeRef` handles,
//!    which name a node and the graph that owns it, so a handle used against
//!    the wrong graph is caught rather than silently misread.
//!
//! 2. Links live in one table keyed by source ID instead of inside nodes, so
//!    edge changes never touch node storage.
//!
//! 3. The mark phase walks an explicit worklist, so graph depth is bounded
//!    by memory rather than the call stack.

mod arena;
mod links;
mod node;
mod sweep;

pub use arena::{Graph, GraphBuilder, NodeMut, SweepReport};
pub use node::{Child, GraphId, Node, NodeId, NodeRef};
