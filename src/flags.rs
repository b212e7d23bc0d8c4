//! Composite flag words and their decoding.
//!
//! A graph is requested through two packed words: a type word choosing the
//! shape of the graph (direction, backing structure, label presence, domain)
//! and an access word choosing how its memory behaves (sharing, persistence,
//! storage medium, read/write mode). Each axis occupies a disjoint group of
//! bits; a zero sub-selector self-heals to a documented default.
//!
//! [`TypeFlags::decode`] is the single seam every construction path goes
//! through, so defaulting can never diverge between call sites. Decoding
//! always succeeds and performs no cross-axis validation.

/// Directed graph: edges are ordered pairs.
pub const DIRECTED: u32 = 1 << 0;
/// Undirected graph: edges are canonicalized to (min, max). Default.
pub const UNDIRECTED: u32 = 1 << 1;
/// Fixed-degree flat-array backend; requires dimensions.
pub const ARRAY: u32 = 1 << 2;
/// Linked adjacency-list backend. Default.
pub const LINKED: u32 = 1 << 3;
/// Hash-indexed adjacency backend.
pub const HASHED: u32 = 1 << 4;
/// Reserve label nodes beyond the coordinate space; requires a label count.
pub const LABELED: u32 = 1 << 5;
/// No label nodes. Default.
pub const UNLABELED: u32 = 1 << 6;
/// General-purpose domain. Default.
pub const GENERIC: u32 = 1 << 7;
/// Spatial domain: node ids are cartesian indices.
pub const SPATIAL: u32 = 1 << 8;

const DIR_SELECT: u32 = DIRECTED | UNDIRECTED;
const IMPL_SELECT: u32 = ARRAY | LINKED | HASHED;
const LABEL_SELECT: u32 = LABELED | UNLABELED;
const DOMAIN_SELECT: u32 = GENERIC | SPATIAL;

/// Graph structure shared between processes.  Default.
pub const SHARED: u32 = 1 << 0;
/// Graph structure private to this process (copy-on-write when mapped).
pub const PRIVATE: u32 = 1 << 1;
/// Start from a zeroed structure. Default.
pub const CREATE_NEW: u32 = 1 << 2;
/// Revive a previously persisted structure; implies metadata validation.
pub const SAVED: u32 = 1 << 3;
/// Plain heap memory.
pub const MEMORY_BASED: u32 = 1 << 4;
/// Backed by memory-mapped files. Default.
pub const FILE_BASED: u32 = 1 << 5;
/// Mappings are established read-only.
pub const GRAPH_READ: u32 = 1 << 6;
/// Mappings are established read-write. Default.
pub const GRAPH_WRITE: u32 = 1 << 7;

const SHARE_SELECT: u32 = SHARED | PRIVATE;
const PERSIST_SELECT: u32 = CREATE_NEW | SAVED;
const MEDIUM_SELECT: u32 = MEMORY_BASED | FILE_BASED;
const RW_SELECT: u32 = GRAPH_READ | GRAPH_WRITE;

/// Edge directionality axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Directed,
    Undirected,
}

/// Backing representation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Array,
    Linked,
    Hashed,
}

/// Label-node presence axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    Labeled,
    Unlabeled,
}

/// Domain axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainKind {
    Generic,
    Spatial,
}

/// The four decoded type axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeAxes {
    pub direction: Direction,
    pub backend: BackendKind,
    pub labels: LabelMode,
    pub domain: DomainKind,
}

/// Packed graph-type word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeFlags(pub u32);

impl TypeFlags {
    /// Decode the word into its four axes, substituting defaults for any
    /// zero sub-selector, and return the normalized word alongside.
    ///
    /// An empty word decodes to undirected, linked, unlabeled, generic.
    pub fn decode(self) -> (TypeFlags, TypeAxes) {
        let direction = match self.0 & DIR_SELECT {
            DIRECTED => Direction::Directed,
            _ => Direction::Undirected,
        };
        let backend = match self.0 & IMPL_SELECT {
            ARRAY => BackendKind::Array,
            HASHED => BackendKind::Hashed,
            _ => BackendKind::Linked,
        };
        let labels = match self.0 & LABEL_SELECT {
            LABELED => LabelMode::Labeled,
            _ => LabelMode::Unlabeled,
        };
        let domain = match self.0 & DOMAIN_SELECT {
            SPATIAL => DomainKind::Spatial,
            _ => DomainKind::Generic,
        };
        let axes = TypeAxes {
            direction,
            backend,
            labels,
            domain,
        };
        (TypeFlags::encode(axes), axes)
    }

    fn encode(axes: TypeAxes) -> TypeFlags {
        let mut word = 0;
        word |= match axes.direction {
            Direction::Directed => DIRECTED,
            Direction::Undirected => UNDIRECTED,
        };
        word |= match axes.backend {
            BackendKind::Array => ARRAY,
            BackendKind::Linked => LINKED,
            BackendKind::Hashed => HASHED,
        };
        word |= match axes.labels {
            LabelMode::Labeled => LABELED,
            LabelMode::Unlabeled => UNLABELED,
        };
        word |= match axes.domain {
            DomainKind::Generic => GENERIC,
            DomainKind::Spatial => SPATIAL,
        };
        TypeFlags(word)
    }
}

impl Default for TypeFlags {
    fn default() -> Self {
        TypeFlags(0)
    }
}

/// Sharing axis of the access word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharing {
    Shared,
    Private,
}

/// Persistence axis: fresh structure or revive a saved one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    CreateNew,
    ReopenSaved,
}

/// Storage-medium axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medium {
    Memory,
    FileBacked,
}

/// Read/write axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ReadOnly,
    ReadWrite,
}

/// The four decoded access axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessAxes {
    pub sharing: Sharing,
    pub persistence: Persistence,
    pub medium: Medium,
    pub mode: Mode,
}

/// Packed access-control word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessFlags(pub u32);

impl AccessFlags {
    /// Decode the access word, defaulting each empty axis to shared,
    /// create-new, file-backed, read-write.
    pub fn decode(self) -> (AccessFlags, AccessAxes) {
        let sharing = match self.0 & SHARE_SELECT {
            PRIVATE => Sharing::Private,
            _ => Sharing::Shared,
        };
        let persistence = match self.0 & PERSIST_SELECT {
            SAVED => Persistence::ReopenSaved,
            _ => Persistence::CreateNew,
        };
        let medium = match self.0 & MEDIUM_SELECT {
            MEMORY_BASED => Medium::Memory,
            _ => Medium::FileBacked,
        };
        let mode = match self.0 & RW_SELECT {
            GRAPH_READ => Mode::ReadOnly,
            _ => Mode::ReadWrite,
        };
        let axes = AccessAxes {
            sharing,
            persistence,
            medium,
            mode,
        };
        let mut word = 0;
        word |= match sharing {
            Sharing::Shared => SHARED,
            Sharing::Private => PRIVATE,
        };
        word |= match persistence {
            Persistence::CreateNew => CREATE_NEW,
            Persistence::ReopenSaved => SAVED,
        };
        word |= match medium {
            Medium::Memory => MEMORY_BASED,
            Medium::FileBacked => FILE_BASED,
        };
        word |= match mode {
            Mode::ReadOnly => GRAPH_READ,
            Mode::ReadWrite => GRAPH_WRITE,
        };
        (AccessFlags(word), axes)
    }
}

impl Default for AccessFlags {
    fn default() -> Self {
        AccessFlags(0)
    }
}
