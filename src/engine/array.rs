//! Fixed-degree dense backend over flat parallel arrays.
//!
//! The node set is exactly the cartesian product of a dimension tuple
//! (times the label count when labeled) and is fixed at construction.
//! Three parallel arrays of length `node_len * degree` hold neighbor ids,
//! capacities, and flows; row `u` holds the out-edges of node `u`.
//!
//! A neighbor slot holding 0 is empty. That makes node id 0 unusable as
//! an edge target: for undirected graphs the canonical payload max(u, v)
//! is 0 only for the degenerate edge (0, 0), but directed graphs must
//! reject any edge pointing at node 0.

use tracing::trace;

use crate::cartesian::Dimensions;
use crate::engine::{canonical_pair, GraphOps, ResetHook};
use crate::error::{GraphError, Result};
use crate::flags::Direction;
use crate::model::{Edge, Node, NodeId};

/// Structural metadata of an array-backed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayMeta {
    /// Number of nodes (rows).
    pub node_len: usize,
    /// Number of edge rows; equals `node_len` by construction.
    pub edge_len: usize,
    /// Out-edge slots per node: the dimension count, doubled if directed.
    pub degree: usize,
    /// Total slot count, `node_len * degree`.
    pub total_len: usize,
}

impl ArrayMeta {
    pub(crate) fn derive(direction: Direction, dims: &Dimensions, label_count: usize) -> ArrayMeta {
        let mut node_len = dims.index_length();
        if label_count > 0 {
            node_len *= label_count;
        }
        let mut degree = dims.count();
        if direction == Direction::Directed {
            degree *= 2;
        }
        ArrayMeta {
            node_len,
            edge_len: node_len,
            degree,
            total_len: node_len * degree,
        }
    }
}

/// Dense fixed-topology storage engine.
#[derive(Debug)]
pub struct ArrayEngine {
    direction: Direction,
    meta: ArrayMeta,
    neighbors: Vec<u64>,
    capacities: Vec<f64>,
    flows: Vec<f64>,
}

impl ArrayEngine {
    /// Allocate the three parallel arrays for the given shape, zeroed.
    pub fn new(direction: Direction, dims: &Dimensions, label_count: usize) -> Result<Self> {
        let meta = ArrayMeta::derive(direction, dims, label_count);
        if meta.total_len == 0 {
            return Err(GraphError::InvalidArgument(
                "array graph would have no slots".into(),
            ));
        }
        trace!(
            nodes = meta.node_len,
            degree = meta.degree,
            "initializing array graph"
        );
        Ok(Self {
            direction,
            meta,
            neighbors: vec![0; meta.total_len],
            capacities: vec![0.0; meta.total_len],
            flows: vec![0.0; meta.total_len],
        })
    }

    pub fn meta(&self) -> &ArrayMeta {
        &self.meta
    }

    fn check_id(&self, id: NodeId) -> Result<()> {
        if (id as usize) < self.meta.node_len {
            Ok(())
        } else {
            Err(GraphError::InvalidArgument(format!(
                "node id {id} out of range (node count {})",
                self.meta.node_len
            )))
        }
    }

    /// Slot index of edge (u, v), scanning u's row. Inputs must already
    /// be canonical.
    fn find_slot(&self, u: NodeId, v: NodeId) -> Option<usize> {
        let row = u as usize * self.meta.degree;
        self.neighbors[row..row + self.meta.degree]
            .iter()
            .position(|&n| n == v)
            .map(|offset| row + offset)
    }

    fn locate(&self, u: NodeId, v: NodeId) -> Result<usize> {
        let (cu, cv) = canonical_pair(self.direction, u, v);
        self.check_id(cu)?;
        self.check_id(cv)?;
        self.find_slot(cu, cv).ok_or(GraphError::NotFound("edge"))
    }
}

impl GraphOps for ArrayEngine {
    fn node_count(&self) -> usize {
        self.meta.node_len
    }

    fn edge_count(&self) -> usize {
        self.meta.edge_len
    }

    fn get_node(&self, id: NodeId) -> Result<Node> {
        self.check_id(id)?;
        Ok(Node::new(id))
    }

    fn get_edge(&self, u: NodeId, v: NodeId) -> Result<Edge> {
        let slot = self.locate(u, v)?;
        let (cu, cv) = canonical_pair(self.direction, u, v);
        let mut edge = Edge::new(cu, cv, self.capacities[slot]);
        edge.flow = self.flows[slot];
        Ok(edge)
    }

    fn get_neighbors(&self, id: NodeId) -> Result<Vec<Node>> {
        self.check_id(id)?;
        let row = id as usize * self.meta.degree;
        Ok(self.neighbors[row..row + self.meta.degree]
            .iter()
            .filter(|&&n| n != 0)
            .map(|&n| Node::new(n))
            .collect())
    }

    fn get_edges(&self, id: NodeId) -> Result<Vec<Edge>> {
        self.check_id(id)?;
        let row = id as usize * self.meta.degree;
        Ok((row..row + self.meta.degree)
            .filter(|&slot| self.neighbors[slot] != 0)
            .map(|slot| {
                let mut edge = Edge::new(id, self.neighbors[slot], self.capacities[slot]);
                edge.flow = self.flows[slot];
                edge
            })
            .collect())
    }

    fn add_node(&mut self, _id: NodeId) -> Result<()> {
        Err(GraphError::InvalidArgument(
            "array-backed graphs have a fixed node set".into(),
        ))
    }

    fn remove_node(&mut self, _id: NodeId) -> Result<()> {
        Err(GraphError::InvalidArgument(
            "array-backed graphs have a fixed node set".into(),
        ))
    }

    fn add_edge(&mut self, u: NodeId, v: NodeId, capacity: f64) -> Result<()> {
        let (cu, cv) = canonical_pair(self.direction, u, v);
        self.check_id(cu)?;
        self.check_id(cv)?;
        if cv == 0 {
            return Err(GraphError::InvalidArgument(
                "node id 0 is reserved as the empty-slot sentinel and cannot be an edge target"
                    .into(),
            ));
        }
        if self.find_slot(cu, cv).is_some() {
            return Err(GraphError::InvalidArgument(format!(
                "edge ({u}, {v}) already exists"
            )));
        }
        let row = cu as usize * self.meta.degree;
        match self.neighbors[row..row + self.meta.degree]
            .iter()
            .position(|&n| n == 0)
        {
            Some(offset) => {
                let slot = row + offset;
                self.neighbors[slot] = cv;
                self.capacities[slot] = capacity;
                self.flows[slot] = 0.0;
                Ok(())
            }
            None => Err(GraphError::CapacityExceeded(format!(
                "node {cu} already has {} edges",
                self.meta.degree
            ))),
        }
    }

    fn remove_edge(&mut self, u: NodeId, v: NodeId) -> Result<()> {
        let slot = self.locate(u, v)?;
        self.neighbors[slot] = 0;
        self.capacities[slot] = 0.0;
        self.flows[slot] = 0.0;
        Ok(())
    }

    fn get_capacity(&self, u: NodeId, v: NodeId) -> Result<f64> {
        Ok(self.capacities[self.locate(u, v)?])
    }

    fn set_capacity(&mut self, u: NodeId, v: NodeId, capacity: f64) -> Result<()> {
        let slot = self.locate(u, v)?;
        self.capacities[slot] = capacity;
        Ok(())
    }

    fn add_capacity(&mut self, u: NodeId, v: NodeId, delta: f64) -> Result<()> {
        let slot = self.locate(u, v)?;
        self.capacities[slot] += delta;
        Ok(())
    }

    fn get_flow(&self, u: NodeId, v: NodeId) -> Result<f64> {
        Ok(self.flows[self.locate(u, v)?])
    }

    fn set_flow(&mut self, u: NodeId, v: NodeId, flow: f64) -> Result<()> {
        let slot = self.locate(u, v)?;
        self.flows[slot] = flow;
        Ok(())
    }

    fn add_flow(&mut self, u: NodeId, v: NodeId, delta: f64) -> Result<()> {
        let slot = self.locate(u, v)?;
        self.flows[slot] += delta;
        Ok(())
    }

    fn reset_graph(&mut self, hook: Option<ResetHook<'_>>) -> Result<()> {
        self.capacities.fill(0.0);
        self.flows.fill(0.0);
        if let Some(hook) = hook {
            hook();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undirected(extents: &[usize]) -> ArrayEngine {
        let dims = Dimensions::new(extents).unwrap();
        ArrayEngine::new(Direction::Undirected, &dims, 0).unwrap()
    }

    #[test]
    fn spatial_cube_has_expected_shape() {
        let g = undirected(&[10, 10, 10]);
        assert_eq!(g.node_count(), 1000);
        assert_eq!(g.meta().degree, 3);
        assert_eq!(g.edge_count(), 1000);
    }

    #[test]
    fn directed_graphs_double_the_degree() {
        let dims = Dimensions::new(&[10, 10, 10]).unwrap();
        let g = ArrayEngine::new(Direction::Directed, &dims, 0).unwrap();
        assert_eq!(g.meta().degree, 6);
    }

    #[test]
    fn label_count_scales_the_node_set() {
        let dims = Dimensions::new(&[10, 10]).unwrap();
        let g = ArrayEngine::new(Direction::Undirected, &dims, 3).unwrap();
        assert_eq!(g.node_count(), 300);
    }

    #[test]
    fn undirected_capacity_is_symmetric() {
        let mut g = undirected(&[10, 10, 10]);
        g.add_edge(0, 5, 1.0).unwrap();
        assert_eq!(g.get_capacity(0, 5).unwrap(), 1.0);
        assert_eq!(g.get_capacity(5, 0).unwrap(), 1.0);
        g.set_flow(5, 0, 0.5).unwrap();
        assert_eq!(g.get_flow(0, 5).unwrap(), 0.5);
    }

    #[test]
    fn duplicate_edges_are_rejected() {
        let mut g = undirected(&[10, 10]);
        g.add_edge(3, 7, 2.0).unwrap();
        assert!(matches!(
            g.add_edge(7, 3, 9.0),
            Err(GraphError::InvalidArgument(_))
        ));
        assert_eq!(g.get_capacity(3, 7).unwrap(), 2.0);
    }

    #[test]
    fn full_row_reports_capacity_exceeded() {
        // degree 2: node 1's row fills after two edges
        let mut g = undirected(&[4, 4]);
        g.add_edge(1, 2, 1.0).unwrap();
        g.add_edge(1, 3, 1.0).unwrap();
        assert!(matches!(
            g.add_edge(1, 4, 1.0),
            Err(GraphError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn removed_slot_is_reusable() {
        let mut g = undirected(&[4, 4]);
        g.add_edge(1, 2, 1.0).unwrap();
        g.add_edge(1, 3, 1.0).unwrap();
        g.remove_edge(2, 1).unwrap();
        assert!(matches!(g.get_edge(1, 2), Err(GraphError::NotFound(_))));
        g.add_edge(1, 4, 5.0).unwrap();
        assert_eq!(g.get_capacity(1, 4).unwrap(), 5.0);
    }

    #[test]
    fn directed_edges_to_node_zero_are_rejected() {
        let dims = Dimensions::new(&[4, 4]).unwrap();
        let mut g = ArrayEngine::new(Direction::Directed, &dims, 0).unwrap();
        assert!(matches!(
            g.add_edge(5, 0, 1.0),
            Err(GraphError::InvalidArgument(_))
        ));
        g.add_edge(0, 5, 1.0).unwrap();
    }

    #[test]
    fn out_of_range_ids_are_rejected() {
        let mut g = undirected(&[4, 4]);
        assert!(g.add_edge(16, 1, 1.0).is_err());
        // a fixed node set classifies every out-of-range id the same way
        assert!(matches!(
            g.get_node(16),
            Err(GraphError::InvalidArgument(_))
        ));
        assert!(matches!(
            g.get_neighbors(16),
            Err(GraphError::InvalidArgument(_))
        ));
        assert!(matches!(
            g.get_edges(16),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn node_mutation_is_unsupported() {
        let mut g = undirected(&[4, 4]);
        assert!(g.add_node(99).is_err());
        assert!(g.remove_node(1).is_err());
    }

    #[test]
    fn reset_zeroes_values_but_keeps_topology() {
        let mut g = undirected(&[4, 4]);
        g.add_edge(1, 2, 3.0).unwrap();
        g.set_flow(1, 2, 2.0).unwrap();
        let mut calls = 0;
        g.reset_graph(Some(&mut || calls += 1)).unwrap();
        assert_eq!(calls, 1);
        assert_eq!(g.get_capacity(1, 2).unwrap(), 0.0);
        assert_eq!(g.get_flow(1, 2).unwrap(), 0.0);
        // second reset is equivalent to the first
        g.reset_graph(None).unwrap();
        assert_eq!(g.get_capacity(1, 2).unwrap(), 0.0);
        // topology survives: the slot still holds the edge
        g.set_capacity(1, 2, 7.0).unwrap();
        assert_eq!(g.get_capacity(2, 1).unwrap(), 7.0);
    }

    #[test]
    fn neighbors_reflect_row_contents() {
        let mut g = undirected(&[10, 10]);
        g.add_edge(2, 5, 1.0).unwrap();
        g.add_edge(2, 9, 1.0).unwrap();
        let ids: Vec<u64> = g.get_neighbors(2).unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![5, 9]);
        let edges = g.get_edges(2).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].u, 2);
        assert_eq!(edges[0].v, 5);
    }
}
