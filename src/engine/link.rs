//! General-purpose adjacency-list backend.
//!
//! Nodes live in insertion order, each owning its list of outgoing edge
//! records. Nothing is indexed and no counter is cached: lookups are
//! linear scans by id and the counts are recomputed on demand, which is
//! the intended trade-off for small, freely mutating graphs.

use tracing::trace;

use crate::engine::{canonical_pair, GraphOps, ResetHook};
use crate::error::{GraphError, Result};
use crate::flags::Direction;
use crate::model::{Attribute, Edge, Node, NodeId};

#[derive(Debug)]
struct LinkNode {
    id: NodeId,
    attrs: Vec<Attribute>,
    edges: Vec<Edge>,
}

/// Dynamically growing and shrinking storage engine.
#[derive(Debug)]
pub struct LinkEngine {
    direction: Direction,
    nodes: Vec<LinkNode>,
}

impl LinkEngine {
    pub fn new(direction: Direction) -> Self {
        trace!(?direction, "initializing linked graph");
        Self {
            direction,
            nodes: Vec::new(),
        }
    }

    fn find(&self, id: NodeId) -> Option<&LinkNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn find_mut(&mut self, id: NodeId) -> Option<&mut LinkNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn find_edge(&self, u: NodeId, v: NodeId) -> Option<&Edge> {
        let (cu, cv) = canonical_pair(self.direction, u, v);
        self.find(cu)?.edges.iter().find(|e| e.v == cv)
    }

    fn find_edge_mut(&mut self, u: NodeId, v: NodeId) -> Result<&mut Edge> {
        let (cu, cv) = canonical_pair(self.direction, u, v);
        self.find_mut(cu)
            .ok_or(GraphError::NotFound("edge"))?
            .edges
            .iter_mut()
            .find(|e| e.v == cv)
            .ok_or(GraphError::NotFound("edge"))
    }
}

impl GraphOps for LinkEngine {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    fn get_node(&self, id: NodeId) -> Result<Node> {
        self.find(id)
            .map(|n| Node {
                id: n.id,
                attrs: n.attrs.clone(),
            })
            .ok_or(GraphError::NotFound("node"))
    }

    fn get_edge(&self, u: NodeId, v: NodeId) -> Result<Edge> {
        self.find_edge(u, v)
            .cloned()
            .ok_or(GraphError::NotFound("edge"))
    }

    fn get_neighbors(&self, id: NodeId) -> Result<Vec<Node>> {
        let node = self.find(id).ok_or(GraphError::NotFound("node"))?;
        Ok(node.edges.iter().map(|e| Node::new(e.v)).collect())
    }

    fn get_edges(&self, id: NodeId) -> Result<Vec<Edge>> {
        let node = self.find(id).ok_or(GraphError::NotFound("node"))?;
        Ok(node.edges.clone())
    }

    fn add_node(&mut self, id: NodeId) -> Result<()> {
        if self.find(id).is_some() {
            return Err(GraphError::InvalidArgument(format!(
                "node {id} already exists"
            )));
        }
        self.nodes.push(LinkNode {
            id,
            attrs: Vec::new(),
            edges: Vec::new(),
        });
        Ok(())
    }

    fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let pos = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or(GraphError::NotFound("node"))?;
        // every other node's edge list may reference the removed id
        for node in &mut self.nodes {
            node.edges.retain(|e| e.v != id);
        }
        self.nodes.remove(pos);
        Ok(())
    }

    fn add_edge(&mut self, u: NodeId, v: NodeId, capacity: f64) -> Result<()> {
        let (cu, cv) = canonical_pair(self.direction, u, v);
        if self.find_edge(cu, cv).is_some() {
            return Err(GraphError::InvalidArgument(format!(
                "edge ({u}, {v}) already exists"
            )));
        }
        let node = self.find_mut(cu).ok_or(GraphError::NotFound("node"))?;
        node.edges.push(Edge::new(cu, cv, capacity));
        Ok(())
    }

    fn remove_edge(&mut self, u: NodeId, v: NodeId) -> Result<()> {
        let (cu, cv) = canonical_pair(self.direction, u, v);
        let node = self.find_mut(cu).ok_or(GraphError::NotFound("edge"))?;
        let pos = node
            .edges
            .iter()
            .position(|e| e.v == cv)
            .ok_or(GraphError::NotFound("edge"))?;
        node.edges.remove(pos);
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
        for node in &mut self.nodes {
            for edge in &mut node.edges {
                edge.capacity = 0.0;
                edge.flow = 0.0;
            }
        }
        // the hook runs in line, before reset returns
        if let Some(hook) = hook {
            hook();
        }
        Ok(())
    }
}
