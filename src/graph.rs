//! The graph handle: flag decoding, backend selection, and teardown.
//!
//! A [`Graph`] is constructed once from a type word (and, for shared
//! graphs, an access word), binds its storage engine at that moment, and
//! never rebinds it. All graph operations go through [`Graph::ops`] and
//! [`Graph::ops_mut`], which hand out the engine behind the uniform
//! [`GraphOps`] contract.
//!
//! Construction validates its preconditions before allocating anything:
//! an array-shaped graph without dimensions, or a labeled graph without a
//! label count, is rejected up front.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::cartesian::Dimensions;
use crate::engine::{
    ArrayEngine, Backend, GraphOps, HashEngine, LinkEngine, MMapEngine,
};
use crate::error::{GraphError, Result};
use crate::flags::{
    AccessFlags, BackendKind, LabelMode, Medium, TypeAxes, TypeFlags,
};
use crate::model::{Labels, NodeId};
use crate::paths::unique_basename;

/// Default index sizing for hashed graphs constructed without dimensions.
const DEFAULT_EXPECTED_NODES: usize = 64;

/// A fully constructed graph bound to one storage engine.
#[derive(Debug)]
pub struct Graph {
    type_flags: TypeFlags,
    access_flags: Option<AccessFlags>,
    dims: Option<Dimensions>,
    labels: Option<Labels>,
    backend: Backend,
}

impl Graph {
    /// Build a process-private, heap-backed graph from a type word.
    ///
    /// Dimensions are mandatory for the array backend and optional
    /// elsewhere (a hashed graph uses them to size its index; a linked
    /// graph ignores them). A labeled graph must state how many label
    /// slots to reserve.
    pub fn create(
        type_flags: TypeFlags,
        label_count: usize,
        dims: Option<Dimensions>,
    ) -> Result<Self> {
        let (normalized, axes) = type_flags.decode();
        let label_count = Self::effective_label_count(&axes, label_count)?;
        let backend = Self::memory_backend(&axes, label_count, dims.as_ref())?;
        info!(flags = normalized.0, "created graph");
        Ok(Self {
            type_flags: normalized,
            access_flags: None,
            dims,
            labels: Self::label_table(label_count),
            backend,
        })
    }

    /// Build a graph whose memory behavior is chosen by an access word.
    ///
    /// A file-backed medium persists the graph under `base` (a fresh
    /// unique basename in the system temporary directory when `None`)
    /// and requires the array shape; a memory medium behaves like
    /// [`Graph::create`]. Unlike the private constructor, dimensions are
    /// mandatory here for every backend.
    pub fn create_shared(
        type_flags: TypeFlags,
        access_flags: AccessFlags,
        label_count: usize,
        dims: Dimensions,
        base: Option<&Path>,
    ) -> Result<Self> {
        let (normalized_type, axes) = type_flags.decode();
        let (normalized_access, access) = access_flags.decode();
        let label_count = Self::effective_label_count(&axes, label_count)?;

        let backend = match access.medium {
            Medium::Memory => Self::memory_backend(&axes, label_count, Some(&dims))?,
            Medium::FileBacked => {
                if axes.backend != BackendKind::Array {
                    return Err(GraphError::InvalidArgument(
                        "only array-shaped graphs can be file-backed".into(),
                    ));
                }
                let base: PathBuf = match base {
                    Some(path) => path.to_path_buf(),
                    None => unique_basename(&std::env::temp_dir()),
                };
                Backend::MemMapped(MMapEngine::new(
                    axes.direction,
                    &dims,
                    label_count,
                    access,
                    base,
                )?)
            }
        };
        info!(
            flags = normalized_type.0,
            access = normalized_access.0,
            "created shared graph"
        );
        Ok(Self {
            type_flags: normalized_type,
            access_flags: Some(normalized_access),
            dims: Some(dims),
            labels: Self::label_table(label_count),
            backend,
        })
    }

    fn effective_label_count(axes: &TypeAxes, label_count: usize) -> Result<usize> {
        match axes.labels {
            LabelMode::Labeled if label_count == 0 => Err(GraphError::InvalidArgument(
                "labeled graphs require a non-zero label count".into(),
            )),
            LabelMode::Labeled => Ok(label_count),
            LabelMode::Unlabeled => Ok(0),
        }
    }

    fn label_table(label_count: usize) -> Option<Labels> {
        (label_count > 0).then(|| Labels::new(label_count))
    }

    fn memory_backend(
        axes: &TypeAxes,
        label_count: usize,
        dims: Option<&Dimensions>,
    ) -> Result<Backend> {
        Ok(match axes.backend {
            BackendKind::Array => {
                let dims = dims.ok_or_else(|| {
                    GraphError::InvalidArgument(
                        "array graphs require dimensions".into(),
                    )
                })?;
                Backend::Array(ArrayEngine::new(axes.direction, dims, label_count)?)
            }
            BackendKind::Linked => Backend::Linked(LinkEngine::new(axes.direction)),
            BackendKind::Hashed => {
                let expected = dims
                    .map(|d| d.index_length())
                    .unwrap_or(DEFAULT_EXPECTED_NODES);
                Backend::Hashed(HashEngine::new(axes.direction, expected))
            }
        })
    }

    /// The normalized type word this graph was built from.
    pub fn type_flags(&self) -> TypeFlags {
        self.type_flags
    }

    /// The normalized access word, present only for shared graphs.
    pub fn access_flags(&self) -> Option<AccessFlags> {
        self.access_flags
    }

    pub fn dimensions(&self) -> Option<&Dimensions> {
        self.dims.as_ref()
    }

    pub fn labels(&self) -> Option<&Labels> {
        self.labels.as_ref()
    }

    pub fn labels_mut(&mut self) -> Option<&mut Labels> {
        self.labels.as_mut()
    }

    /// Basename of the region files, for persisted graphs.
    pub fn base_path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::MemMapped(engine) => Some(engine.base_path()),
            _ => None,
        }
    }

    /// The bound storage engine, read-only.
    pub fn ops(&self) -> &dyn GraphOps {
        self.backend.ops()
    }

    /// The bound storage engine, mutable.
    pub fn ops_mut(&mut self) -> &mut dyn GraphOps {
        self.backend.ops_mut()
    }

    /// Node id of the given spatial coordinate.
    pub fn node_at(&self, coords: &[usize]) -> Result<NodeId> {
        let dims = self.dims.as_ref().ok_or_else(|| {
            GraphError::InvalidArgument("graph has no dimensions".into())
        })?;
        Ok(dims.index_of(coords)? as NodeId)
    }

    /// Spatial coordinate of the given node id.
    pub fn coords_at(&self, id: NodeId) -> Result<Vec<usize>> {
        let dims = self.dims.as_ref().ok_or_else(|| {
            GraphError::InvalidArgument("graph has no dimensions".into())
        })?;
        dims.coords_of(id as usize)
    }

    /// Tear the graph down, consuming the handle.
    ///
    /// Persisted graphs flush their mappings first; region files stay on
    /// disk for a later reopen. Errors surface here rather than being
    /// swallowed by `Drop`.
    pub fn close(self) -> Result<()> {
        if let Backend::MemMapped(engine) = &self.backend {
            engine.flush()?;
        }
        Ok(())
    }
}
