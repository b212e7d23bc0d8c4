//! Flag-driven graph storage with swappable backends.
//!
//! A graph is requested through packed type and access words and bound at
//! construction to one of four storage engines: a fixed-degree flat array,
//! a linked adjacency list, a hash-indexed adjacency table, or a
//! memory-mapped persistent array. All engines answer to the same
//! [`GraphOps`] operation contract, so callers never branch on the
//! representation.
//!
//! ```no_run
//! use graphstore::{Graph, GraphOps, TypeFlags, DIRECTED, HASHED};
//!
//! # fn main() -> graphstore::Result<()> {
//! let mut g = Graph::create(TypeFlags(DIRECTED | HASHED), 0, None)?;
//! g.ops_mut().add_node(1)?;
//! g.ops_mut().add_node(2)?;
//! g.ops_mut().add_edge(1, 2, 10.0)?;
//! assert_eq!(g.ops().get_capacity(1, 2)?, 10.0);
//! g.close()?;
//! # Ok(())
//! # }
//! ```

pub mod cartesian;
pub mod engine;
pub mod error;
pub mod flags;
pub mod graph;
pub mod hashing;
pub mod hashtable;
pub mod logging;
pub mod model;
pub mod paths;

pub use cartesian::Dimensions;
pub use engine::{Backend, GraphOps, ResetHook};
pub use error::{GraphError, Result};
pub use flags::{AccessFlags, TypeFlags};
pub use flags::{
    ARRAY, CREATE_NEW, DIRECTED, FILE_BASED, GENERIC, GRAPH_READ, GRAPH_WRITE,
    HASHED, LABELED, LINKED, MEMORY_BASED, PRIVATE, SAVED, SHARED, SPATIAL,
    UNDIRECTED, UNLABELED,
};
pub use graph::Graph;
pub use hashtable::{ChainTable, TableKey};
pub use logging::init_logging;
pub use model::{Attribute, Edge, Labels, Node, NodeId};
