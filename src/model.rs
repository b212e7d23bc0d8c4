//! Detached record types handed across the operation boundary.
//!
//! Nodes and edges returned by the engines are copies owned by the caller,
//! never references into engine storage. Mutating them has no effect on the
//! underlying graph.

/// Numeric node identifier.
///
/// The array-backed engines reserve id 0 as the empty-slot sentinel in their
/// neighbor arrays, so 0 can never appear as an edge target there.
pub type NodeId = u64;

/// One named attribute attached to a node or edge.
///
/// The `attrs` vectors on [`Node`] and [`Edge`] are the record's
/// attribute slots: the linked and hashed engines carry them alongside
/// the adjacency data and return them with every detached copy. No
/// engine operation populates them itself; callers build attributes
/// here and attach them to the records they own.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub hash: u64,
    pub value: f64,
}

impl Attribute {
    /// Build an attribute, deriving its lookup hash from the name.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        let hash = crate::hashing::super_fast_hash(name.as_bytes());
        Self { name, hash, value }
    }
}

/// A detached node record.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub attrs: Vec<Attribute>,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            attrs: Vec::new(),
        }
    }
}

/// A detached edge record.
///
/// By convention `flow <= capacity`; the engines do not enforce it.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
    pub capacity: f64,
    pub flow: f64,
    pub attrs: Vec<Attribute>,
}

impl Edge {
    pub fn new(u: NodeId, v: NodeId, capacity: f64) -> Self {
        Self {
            u,
            v,
            capacity,
            flow: 0.0,
            attrs: Vec::new(),
        }
    }
}

/// Fixed-size identifier table appended to the coordinate space for
/// non-spatial entities sharing the graph's adjacency structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    ids: Vec<u64>,
}

impl Labels {
    pub fn new(count: usize) -> Self {
        Self { ids: vec![0; count] }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn ids_mut(&mut self) -> &mut [u64] {
        &mut self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::super_fast_hash;

    #[test]
    fn attribute_hash_derives_from_the_name() {
        let weight = Attribute::new("weight", 2.5);
        assert_eq!(weight.hash, super_fast_hash(b"weight"));
        assert_eq!(weight.value, 2.5);
        assert_ne!(weight.hash, Attribute::new("cost", 2.5).hash);
    }

    #[test]
    fn records_carry_their_attribute_slots() {
        let mut node = Node::new(7);
        node.attrs.push(Attribute::new("weight", 2.5));
        let copy = node.clone();
        assert_eq!(copy.attrs.len(), 1);
        assert_eq!(copy.attrs[0].name, "weight");

        let mut edge = Edge::new(1, 2, 10.0);
        edge.attrs.push(Attribute::new("length", 4.0));
        assert_eq!(edge.attrs[0].value, 4.0);
    }
}
