//! Memory-mapped persistent variant of the array engine.
//!
//! The neighbor and label arrays live in files mapped into memory, so a
//! graph's topology outlives the process or can be shared between
//! processes; capacities and flows stay in volatile heap arrays. Three
//! region files hang off one basename: `<base>.nodes`, `<base>.labels`,
//! and `<base>.meta`.
//!
//! Regions are raw native-endian element arrays with no header. A file
//! written on one machine is not portable to a machine with a different
//! word width or byte order.
//!
//! Reopening is the safety-critical path: the metadata region is mapped
//! and validated against the caller's dimension-derived expectations
//! before the data region is touched, because trusting a mapping of the
//! wrong length would read and write unrelated memory. Each mapping is
//! an owned object that unmaps itself with its exact original length.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapMut, MmapOptions};
use tracing::{debug, warn};

use crate::cartesian::Dimensions;
use crate::engine::array::ArrayMeta;
use crate::engine::{canonical_pair, GraphOps, ResetHook};
use crate::error::{GraphError, Result};
use crate::flags::{AccessAxes, Direction, Mode, Persistence, Sharing};
use crate::model::{Edge, Node, NodeId};
use crate::paths::is_file;

const ELEM_SIZE: usize = std::mem::size_of::<u64>();

// metadata region layout, in u64 elements
const META_NODE_LEN: usize = 0;
const META_EDGE_LEN: usize = 1;
const META_DEGREE: usize = 2;
const META_TOTAL_LEN: usize = 3;
const META_FIELDS: usize = 4;

/// One mapped region. The mapping object owns both the address and the
/// exact length it was created with; dropping it unmaps that length.
#[derive(Debug)]
enum Region {
    ReadOnly(Mmap),
    Writable(MmapMut),
}

impl Region {
    fn bytes(&self) -> &[u8] {
        match self {
            Region::ReadOnly(map) => map,
            Region::Writable(map) => map,
        }
    }

    fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        match self {
            Region::ReadOnly(_) => Err(GraphError::InvalidArgument(
                "graph is mapped read-only".into(),
            )),
            Region::Writable(map) => Ok(map),
        }
    }

    fn get(&self, index: usize) -> u64 {
        let mut buf = [0u8; ELEM_SIZE];
        buf.copy_from_slice(&self.bytes()[index * ELEM_SIZE..(index + 1) * ELEM_SIZE]);
        u64::from_ne_bytes(buf)
    }

    fn set(&mut self, index: usize, value: u64) -> Result<()> {
        self.bytes_mut()?[index * ELEM_SIZE..(index + 1) * ELEM_SIZE]
            .copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Region::Writable(map) = self {
            map.flush()?;
        }
        Ok(())
    }
}

/// Map the region file at `path`, sized for `elements` u64 values.
///
/// On creation the file is truncated, resized, and the fresh mapping is
/// explicitly zero-filled. On reopen the existing file's length must
/// already match, and its contents are taken as-is.
fn map_region(path: &Path, elements: usize, axes: &AccessAxes, reopen: bool) -> Result<Region> {
    let byte_len = elements * ELEM_SIZE;
    if reopen {
        if !is_file(path) {
            return Err(GraphError::StructuralMismatch(format!(
                "persisted region {} does not exist",
                path.display()
            )));
        }
        let writable = axes.mode == Mode::ReadWrite;
        let file = OpenOptions::new().read(true).write(writable).open(path)?;
        let found = file.metadata()?.len();
        if found != byte_len as u64 {
            return Err(GraphError::StructuralMismatch(format!(
                "region {} is {found} bytes, expected {byte_len}",
                path.display()
            )));
        }
        let region = match (axes.mode, axes.sharing) {
            (Mode::ReadOnly, _) => Region::ReadOnly(unsafe {
                Mmap::map(&file).map_err(|e| mapping_failure(path, e))?
            }),
            (Mode::ReadWrite, Sharing::Private) => Region::Writable(unsafe {
                MmapOptions::new()
                    .map_copy(&file)
                    .map_err(|e| mapping_failure(path, e))?
            }),
            (Mode::ReadWrite, Sharing::Shared) => Region::Writable(unsafe {
                MmapMut::map_mut(&file).map_err(|e| mapping_failure(path, e))?
            }),
        };
        Ok(region)
    } else {
        if axes.mode == Mode::ReadOnly {
            return Err(GraphError::InvalidArgument(
                "a fresh graph cannot be mapped read-only".into(),
            ));
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(byte_len as u64)?;
        let mut map = match axes.sharing {
            Sharing::Private => unsafe {
                MmapOptions::new()
                    .map_copy(&file)
                    .map_err(|e| mapping_failure(path, e))?
            },
            Sharing::Shared => unsafe {
                MmapMut::map_mut(&file).map_err(|e| mapping_failure(path, e))?
            },
        };
        map.fill(0);
        Ok(Region::Writable(map))
    }
}

fn mapping_failure(path: &Path, e: std::io::Error) -> GraphError {
    GraphError::AllocationFailure(format!("cannot map {}: {e}", path.display()))
}

/// Persistent fixed-topology storage engine.
#[derive(Debug)]
pub struct MMapEngine {
    direction: Direction,
    meta: ArrayMeta,
    base: PathBuf,
    node_region: Region,
    label_region: Option<Region>,
    meta_region: Region,
    capacities: Vec<f64>,
    flows: Vec<f64>,
}

impl MMapEngine {
    /// Create or reopen a persisted graph at `base`, per the decoded
    /// access axes. The dimension tuple is mandatory: on reopen it is
    /// the caller's expectation that the persisted metadata must match.
    pub fn new(
        direction: Direction,
        dims: &Dimensions,
        label_count: usize,
        axes: AccessAxes,
        base: PathBuf,
    ) -> Result<Self> {
        let expected = ArrayMeta::derive(direction, dims, label_count);
        if expected.total_len == 0 {
            return Err(GraphError::InvalidArgument(
                "memory-mapped graph would have no slots".into(),
            ));
        }
        let reopen = axes.persistence == Persistence::ReopenSaved;
        let meta_path = base.with_extension("meta");
        let node_path = base.with_extension("nodes");
        let label_path = base.with_extension("labels");

        // Metadata region first: on reopen nothing else may be mapped
        // until the recorded shape has been checked.
        let mut meta_region = map_region(&meta_path, META_FIELDS, &axes, reopen)?;
        if reopen {
            Self::validate_meta(&meta_region, &expected)?;
            debug!(base = %base.display(), nodes = expected.node_len, "reopening persisted graph");
        } else {
            meta_region.set(META_NODE_LEN, expected.node_len as u64)?;
            meta_region.set(META_EDGE_LEN, expected.edge_len as u64)?;
            meta_region.set(META_DEGREE, expected.degree as u64)?;
            meta_region.set(META_TOTAL_LEN, expected.total_len as u64)?;
            debug!(base = %base.display(), nodes = expected.node_len, "creating persisted graph");
        }

        let node_region = map_region(&node_path, expected.total_len, &axes, reopen)?;
        let label_region = if label_count > 0 {
            Some(map_region(&label_path, label_count, &axes, reopen)?)
        } else {
            None
        };

        Ok(Self {
            direction,
            meta: expected,
            base,
            node_region,
            label_region,
            meta_region,
            capacities: vec![0.0; expected.total_len],
            flows: vec![0.0; expected.total_len],
        })
    }

    fn validate_meta(region: &Region, expected: &ArrayMeta) -> Result<()> {
        let found = ArrayMeta {
            node_len: region.get(META_NODE_LEN) as usize,
            edge_len: region.get(META_EDGE_LEN) as usize,
            degree: region.get(META_DEGREE) as usize,
            total_len: region.get(META_TOTAL_LEN) as usize,
        };
        if found != *expected {
            return Err(GraphError::StructuralMismatch(format!(
                "persisted graph has {} nodes of degree {} ({} slots), caller expects {} nodes of degree {} ({} slots)",
                found.node_len,
                found.degree,
                found.total_len,
                expected.node_len,
                expected.degree,
                expected.total_len
            )));
        }
        Ok(())
    }

    /// Basename the region files hang off.
    pub fn base_path(&self) -> &Path {
        &self.base
    }

    pub fn meta(&self) -> &ArrayMeta {
        &self.meta
    }

    /// Persisted label identifiers, if this graph is labeled.
    pub fn label_ids(&self) -> Option<Vec<u64>> {
        self.label_region.as_ref().map(|region| {
            (0..region.bytes().len() / ELEM_SIZE)
                .map(|i| region.get(i))
                .collect()
        })
    }

    /// Flush writable regions back to their files.
    pub fn flush(&self) -> Result<()> {
        self.node_region.flush()?;
        self.meta_region.flush()?;
        if let Some(region) = &self.label_region {
            region.flush()?;
        }
        Ok(())
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

    fn find_slot(&self, u: NodeId, v: NodeId) -> Option<usize> {
        let row = u as usize * self.meta.degree;
        (row..row + self.meta.degree).find(|&slot| self.node_region.get(slot) == v)
    }

    fn locate(&self, u: NodeId, v: NodeId) -> Result<usize> {
        let (cu, cv) = canonical_pair(self.direction, u, v);
        self.check_id(cu)?;
        self.check_id(cv)?;
        self.find_slot(cu, cv).ok_or(GraphError::NotFound("edge"))
    }
}

impl Drop for MMapEngine {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(base = %self.base.display(), error = %e, "flush on teardown failed");
        }
    }
}

impl GraphOps for MMapEngine {
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
        Ok((row..row + self.meta.degree)
            .map(|slot| self.node_region.get(slot))
            .filter(|&n| n != 0)
            .map(Node::new)
            .collect())
    }

    fn get_edges(&self, id: NodeId) -> Result<Vec<Edge>> {
        self.check_id(id)?;
        let row = id as usize * self.meta.degree;
        Ok((row..row + self.meta.degree)
            .filter(|&slot| self.node_region.get(slot) != 0)
            .map(|slot| {
                let mut edge = Edge::new(id, self.node_region.get(slot), self.capacities[slot]);
                edge.flow = self.flows[slot];
                edge
            })
            .collect())
    }

    fn add_node(&mut self, _id: NodeId) -> Result<()> {
        Err(GraphError::InvalidArgument(
            "memory-mapped graphs have a fixed node set".into(),
        ))
    }

    fn remove_node(&mut self, _id: NodeId) -> Result<()> {
        Err(GraphError::InvalidArgument(
            "memory-mapped graphs have a fixed node set".into(),
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
        match (row..row + self.meta.degree).find(|&slot| self.node_region.get(slot) == 0) {
            Some(slot) => {
                self.node_region.set(slot, cv)?;
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
        self.node_region.set(slot, 0)?;
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
    use crate::flags::AccessFlags;

    fn rw_axes() -> AccessAxes {
        AccessFlags(0).decode().1
    }

    fn saved_axes() -> AccessAxes {
        let (_, mut axes) = AccessFlags(0).decode();
        axes.persistence = Persistence::ReopenSaved;
        axes
    }

    #[test]
    fn create_zero_fills_and_supports_array_semantics() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("g");
        let dims = Dimensions::new(&[10, 10]).unwrap();
        let mut g = MMapEngine::new(Direction::Undirected, &dims, 0, rw_axes(), base).unwrap();
        assert_eq!(g.node_count(), 100);
        assert!(g.get_neighbors(7).unwrap().is_empty());
        g.add_edge(7, 3, 2.5).unwrap();
        assert_eq!(g.get_capacity(3, 7).unwrap(), 2.5);
        assert!(g.add_edge(3, 7, 1.0).is_err());
        assert!(matches!(
            g.get_node(100),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn topology_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("g");
        let dims = Dimensions::new(&[8, 8]).unwrap();
        {
            let mut g =
                MMapEngine::new(Direction::Undirected, &dims, 0, rw_axes(), base.clone()).unwrap();
            g.add_edge(1, 5, 4.0).unwrap();
            g.flush().unwrap();
        }
        let g = MMapEngine::new(Direction::Undirected, &dims, 0, saved_axes(), base).unwrap();
        let ids: Vec<u64> = g.get_neighbors(1).unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![5]);
        // capacities are volatile and come back zeroed
        assert_eq!(g.get_capacity(1, 5).unwrap(), 0.0);
    }

    #[test]
    fn reopen_rejects_mismatched_shape() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("g");
        let dims = Dimensions::new(&[8, 8]).unwrap();
        drop(MMapEngine::new(Direction::Undirected, &dims, 0, rw_axes(), base.clone()).unwrap());

        let other = Dimensions::new(&[16, 16]).unwrap();
        let err = MMapEngine::new(Direction::Undirected, &other, 0, saved_axes(), base.clone())
            .unwrap_err();
        assert!(matches!(err, GraphError::StructuralMismatch(_)));

        // doubling the degree via direction must also be caught
        let err =
            MMapEngine::new(Direction::Directed, &dims, 0, saved_axes(), base).unwrap_err();
        assert!(matches!(err, GraphError::StructuralMismatch(_)));
    }

    #[test]
    fn reopen_of_missing_files_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dims = Dimensions::new(&[4, 4]).unwrap();
        let err = MMapEngine::new(
            Direction::Undirected,
            &dims,
            0,
            saved_axes(),
            dir.path().join("absent"),
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::StructuralMismatch(_)));
    }

    #[test]
    fn read_only_reopen_refuses_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("g");
        let dims = Dimensions::new(&[8, 8]).unwrap();
        {
            let mut g =
                MMapEngine::new(Direction::Undirected, &dims, 0, rw_axes(), base.clone()).unwrap();
            g.add_edge(2, 6, 1.0).unwrap();
            g.flush().unwrap();
        }
        let mut axes = saved_axes();
        axes.mode = Mode::ReadOnly;
        let mut g = MMapEngine::new(Direction::Undirected, &dims, 0, axes, base).unwrap();
        assert_eq!(
            g.get_neighbors(2).unwrap().iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![6]
        );
        assert!(matches!(
            g.add_edge(3, 7, 1.0),
            Err(GraphError::InvalidArgument(_))
        ));
        assert!(g.remove_edge(2, 6).is_err());
    }

    #[test]
    fn fresh_read_only_mapping_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dims = Dimensions::new(&[4, 4]).unwrap();
        let mut axes = rw_axes();
        axes.mode = Mode::ReadOnly;
        let err = MMapEngine::new(
            Direction::Undirected,
            &dims,
            0,
            axes,
            dir.path().join("g"),
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
    }
}
