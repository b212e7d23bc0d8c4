//! Hash-indexed adjacency backend.
//!
//! Same edge semantics as the linked engine, but the node index is a
//! [`ChainTable`] keyed by node id, so node lookup is amortized O(1) and
//! the node set can grow far beyond what linear scans tolerate. The
//! engine owns the growth policy: it checks the table's headroom before
//! every insert and rebuilds at the next viable prime when tight.

use tracing::trace;

use crate::engine::{canonical_pair, GraphOps, ResetHook};
use crate::error::{GraphError, Result};
use crate::flags::Direction;
use crate::hashtable::ChainTable;
use crate::model::{Attribute, Edge, Node, NodeId};

#[derive(Debug)]
struct Adjacency {
    attrs: Vec<Attribute>,
    edges: Vec<Edge>,
}

/// Sparse, dynamically sized storage engine.
#[derive(Debug)]
pub struct HashEngine {
    direction: Direction,
    index: ChainTable<u64, Adjacency>,
}

impl HashEngine {
    /// Build an engine expecting roughly `expected_nodes` nodes; the
    /// index still grows past that on demand.
    pub fn new(direction: Direction, expected_nodes: usize) -> Self {
        trace!(?direction, expected_nodes, "initializing hashed graph");
        Self {
            direction,
            index: ChainTable::with_expected_capacity(expected_nodes),
        }
    }

    fn adjacency(&self, id: NodeId) -> Option<&Adjacency> {
        self.index.get(&id)
    }

    fn find_edge(&self, u: NodeId, v: NodeId) -> Option<&Edge> {
        let (cu, cv) = canonical_pair(self.direction, u, v);
        self.adjacency(cu)?.edges.iter().find(|e| e.v == cv)
    }

    fn find_edge_mut(&mut self, u: NodeId, v: NodeId) -> Result<&mut Edge> {
        let (cu, cv) = canonical_pair(self.direction, u, v);
        self.index
            .get_mut(&cu)
            .ok_or(GraphError::NotFound("edge"))?
            .edges
            .iter_mut()
            .find(|e| e.v == cv)
            .ok_or(GraphError::NotFound("edge"))
    }
}

impl GraphOps for HashEngine {
    fn node_count(&self) -> usize {
        self.index.count()
    }

    fn edge_count(&self) -> usize {
        self.index.iter().map(|(_, adj)| adj.edges.len()).sum()
    }

    fn get_node(&self, id: NodeId) -> Result<Node> {
        self.adjacency(id)
            .map(|adj| Node {
                id,
                attrs: adj.attrs.clone(),
            })
            .ok_or(GraphError::NotFound("node"))
    }

    fn get_edge(&self, u: NodeId, v: NodeId) -> Result<Edge> {
        self.find_edge(u, v)
            .cloned()
            .ok_or(GraphError::NotFound("edge"))
    }

    fn get_neighbors(&self, id: NodeId) -> Result<Vec<Node>> {
        let adj = self.adjacency(id).ok_or(GraphError::NotFound("node"))?;
        Ok(adj.edges.iter().map(|e| Node::new(e.v)).collect())
    }

    fn get_edges(&self, id: NodeId) -> Result<Vec<Edge>> {
        let adj = self.adjacency(id).ok_or(GraphError::NotFound("node"))?;
        Ok(adj.edges.clone())
    }

    fn add_node(&mut self, id: NodeId) -> Result<()> {
        if self.index.contains_key(&id) {
            return Err(GraphError::InvalidArgument(format!(
                "node {id} already exists"
            )));
        }
        if !self.index.has_headroom() {
            self.index.grow_in_place();
        }
        self.index.insert(
            id,
            Adjacency {
                attrs: Vec::new(),
                edges: Vec::new(),
            },
        )
    }

    fn remove_node(&mut self, id: NodeId) -> Result<()> {
        self.index
            .remove(&id)
            .ok_or(GraphError::NotFound("node"))?;
        for adj in self.index.values_mut() {
            adj.edges.retain(|e| e.v != id);
        }
        Ok(())
    }

    fn add_edge(&mut self, u: NodeId, v: NodeId, capacity: f64) -> Result<()> {
        let (cu, cv) = canonical_pair(self.direction, u, v);
        if self.find_edge(cu, cv).is_some() {
            return Err(GraphError::InvalidArgument(format!(
                "edge ({u}, {v}) already exists"
            )));
        }
        let adj = self.index.get_mut(&cu).ok_or(GraphError::NotFound("node"))?;
        adj.edges.push(Edge::new(cu, cv, capacity));
        Ok(())
    }

    fn remove_edge(&mut self, u: NodeId, v: NodeId) -> Result<()> {
        let (cu, cv) = canonical_pair(self.direction, u, v);
        let adj = self.index.get_mut(&cu).ok_or(GraphError::NotFound("edge"))?;
        let pos = adj
            .edges
            .iter()
            .position(|e| e.v == cv)
            .ok_or(GraphError::NotFound("edge"))?;
        adj.edges.remove(pos);
        Ok(())
    }

    fn get_capacity(&self, u: NodeId, v: NodeId) -> Result<f64> {
        self.find_edge(u, v)
            .map(|e| e.capacity)
            .ok_or(GraphError::NotFound("edge"))
    }

    fn set_capacity(&mut self, u: NodeId, v: NodeId, capacity: f64) -> Result<()> {
        self.find_edge_mut(u, v)?.capacity = capacity;
        Ok(())
    }

    fn add_capacity(&mut self, u: NodeId, v: NodeId, delta: f64) -> Result<()> {
        self.find_edge_mut(u, v)?.capacity += delta;
        Ok(())
    }

    fn get_flow(&self, u: NodeId, v: NodeId) -> Result<f64> {
        self.find_edge(u, v)
            .map(|e| e.flow)
            .ok_or(GraphError::NotFound("edge"))
    }

    fn set_flow(&mut self, u: NodeId, v: NodeId, flow: f64) -> Result<()> {
        self.find_edge_mut(u, v)?.flow = flow;
        Ok(())
    }

    fn add_flow(&mut self, u: NodeId, v: NodeId, delta: f64) -> Result<()> {
        self.find_edge_mut(u, v)?.flow += delta;
        Ok(())
    }

    fn reset_graph(&mut self, hook: Option<ResetHook<'_>>) -> Result<()> {
        for adj in self.index.values_mut() {
            for edge in &mut adj.edges {
                edge.capacity = 0.0;
                edge.flow = 0.0;
            }
        }
        if let Some(hook) = hook {
            hook();
        }
        Ok(())
    }
}
