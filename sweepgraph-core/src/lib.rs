//! SweepGraph Core
//!
//! A directed graph whose nodes belong to the graph rather than to the edges
//! that point at them, with an explicit mark-and-sweep pass that reclaims
//! every node the root can no longer reach.
//!
//! Reference counting alone cannot free two nodes that point at each other.
//! Here edges are plain metadata in a link table, so a detached cycle is just
//! another set of unreachable nodes and is dropped by the next sweep.
//!
//! # Architecture
//!
//! - `graph`: node identity and handles, the link table, the reachability
//!   walk, and the `Graph` arena tying them together
//! - `observe`: hooks for watching node creation and release
//! - `error`: contract violations reported by graph operations
//!
//! Everything is single-threaded and synchronous. Storage is released only
//! by `Graph::shrink_to_fit` or by dropping the graph.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use sweepgraph_core::{Graph, LiveCounter};
//!
//! let live = Arc::new(LiveCounter::new());
//! let mut graph = Graph::builder().observer(live.clone()).build();
//!
//! let a = graph.set_root(graph.make_node()).unwrap();
//! let b = graph.add_child(a, graph.make_node()).unwrap();
//! let c = graph.add_child(b, graph.make_node()).unwrap();
//! graph.add_child(c, b).unwrap(); // cycle b <-> c
//!
//! graph.remove_child(a, b).unwrap();
//! assert_eq!(live.live(), 3); // unlinking frees nothing
//!
//! let report = graph.shrink_to_fit();
//! assert_eq!(report.reclaimed, 2);
//! assert_eq!(live.live(), 1);
//! ```

pub mod error;
pub mod graph;
pub mod observe;

pub use error::{GraphError, GraphResult};
pub use graph::{Child, Graph, GraphBuilder, GraphId, Node, NodeId, NodeMut, NodeRef, SweepReport};
pub use observe::{LiveCounter, NodeObserver};
