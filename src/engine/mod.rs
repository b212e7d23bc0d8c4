//! Storage engines implementing the uniform graph operation contract.
//!
//! Each engine owns its backing representation outright; the surrounding
//! [`Graph`](crate::graph::Graph) handle never interprets engine storage
//! itself. Dispatch is bound once per handle through the [`GraphOps`]
//! trait and cannot be rebound entry by entry.

pub mod array;
pub mod hash;
pub mod link;
pub mod mmap;

use crate::error::Result;
use crate::flags::Direction;
use crate::model::{Edge, Node, NodeId};

pub use array::ArrayEngine;
pub use hash::HashEngine;
pub use link::LinkEngine;
pub use mmap::MMapEngine;

/// Completion hook invoked synchronously, in line, at the end of
/// [`GraphOps::reset_graph`].
pub type ResetHook<'a> = &'a mut dyn FnMut();

/// The uniform operation contract every engine implements.
///
/// All failures surface through the returned `Result`; no operation
/// panics on bad caller input.
pub trait GraphOps {
    /// Number of nodes in the graph.
    fn node_count(&self) -> usize;
    /// Number of edges (for array-backed engines: edge rows, which equal
    /// the node count by construction).
    fn edge_count(&self) -> usize;

    /// Detached copy of the node with the given id.
    fn get_node(&self, id: NodeId) -> Result<Node>;
    /// Detached copy of the edge (u, v), canonicalized for undirected
    /// graphs.
    fn get_edge(&self, u: NodeId, v: NodeId) -> Result<Edge>;
    /// Detached copies of the nodes recorded as outgoing neighbors of `id`.
    fn get_neighbors(&self, id: NodeId) -> Result<Vec<Node>>;
    /// Detached copies of the outgoing edges of `id`.
    fn get_edges(&self, id: NodeId) -> Result<Vec<Edge>>;

    fn add_node(&mut self, id: NodeId) -> Result<()>;
    fn remove_node(&mut self, id: NodeId) -> Result<()>;
    fn add_edge(&mut self, u: NodeId, v: NodeId, capacity: f64) -> Result<()>;
    fn remove_edge(&mut self, u: NodeId, v: NodeId) -> Result<()>;

    fn get_capacity(&self, u: NodeId, v: NodeId) -> Result<f64>;
    fn set_capacity(&mut self, u: NodeId, v: NodeId, capacity: f64) -> Result<()>;
    fn add_capacity(&mut self, u: NodeId, v: NodeId, delta: f64) -> Result<()>;
    fn get_flow(&self, u: NodeId, v: NodeId) -> Result<f64>;
    fn set_flow(&mut self, u: NodeId, v: NodeId, flow: f64) -> Result<()>;
    fn add_flow(&mut self, u: NodeId, v: NodeId, delta: f64) -> Result<()>;

    /// Zero every capacity and flow without touching topology, then invoke
    /// the hook before returning. Idempotent.
    fn reset_graph(&mut self, hook: Option<ResetHook<'_>>) -> Result<()>;
}

/// Canonical storage order for an edge: undirected graphs store (u, v)
/// exactly once, as (min(u, v), max(u, v)).
pub(crate) fn canonical_pair(direction: Direction, u: NodeId, v: NodeId) -> (NodeId, NodeId) {
    match direction {
        Direction::Directed => (u, v),
        Direction::Undirected => (u.min(v), u.max(v)),
    }
}

/// The backend payload of a graph handle. Only the variant's own engine
/// code interprets the contents; there is no cross-engine aliasing.
#[derive(Debug)]
pub enum Backend {
    Array(ArrayEngine),
    Linked(LinkEngine),
    Hashed(HashEngine),
    MemMapped(MMapEngine),
}

impl Backend {
    pub(crate) fn ops(&self) -> &dyn GraphOps {
        match self {
            Backend::Array(e) => e,
            Backend::Linked(e) => e,
            Backend::Hashed(e) => e,
            Backend::MemMapped(e) => e,
        }
    }

    pub(crate) fn ops_mut(&mut self) -> &mut dyn GraphOps {
        match self {
            Backend::Array(e) => e,
            Backend::Linked(e) => e,
            Backend::Hashed(e) => e,
            Backend::MemMapped(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_orders_undirected_edges() {
        assert_eq!(canonical_pair(Direction::Undirected, 9, 2), (2, 9));
        assert_eq!(canonical_pair(Direction::Undirected, 2, 9), (2, 9));
        assert_eq!(canonical_pair(Direction::Directed, 9, 2), (9, 2));
    }
}
