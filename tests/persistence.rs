//! Persisted-graph lifecycle: create, tear down, reopen, validate.

use graphstore::{
    Dimensions, Graph, GraphError, GraphOps, AccessFlags, TypeFlags, ARRAY,
    DIRECTED, FILE_BASED, GRAPH_READ, SAVED,
};

fn persisted(
    type_word: u32,
    access_word: u32,
    dims: &[usize],
    base: &std::path::Path,
) -> graphstore::Result<Graph> {
    Graph::create_shared(
        TypeFlags(type_word),
        AccessFlags(access_word),
        0,
        Dimensions::new(dims)?,
        Some(base),
    )
}

#[test]
fn topology_survives_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("lattice");

    let mut g = persisted(ARRAY, FILE_BASED, &[16, 16], &base).unwrap();
    g.ops_mut().add_edge(3, 19, 7.0).unwrap();
    g.ops_mut().add_edge(3, 35, 2.0).unwrap();
    g.close().unwrap();

    let g = persisted(ARRAY, FILE_BASED | SAVED, &[16, 16], &base).unwrap();
    let mut ids: Vec<u64> = g
        .ops()
        .get_neighbors(3)
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![19, 35]);
    // capacities and flows are volatile and come back zeroed
    assert_eq!(g.ops().get_capacity(3, 19).unwrap(), 0.0);
    g.close().unwrap();
}

#[test]
fn reopen_with_wrong_shape_is_a_structural_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("g");
    persisted(ARRAY, FILE_BASED, &[16, 16], &base)
        .unwrap()
        .close()
        .unwrap();

    // wrong node count
    let err = persisted(ARRAY, FILE_BASED | SAVED, &[32, 32], &base).unwrap_err();
    assert!(matches!(err, GraphError::StructuralMismatch(_)));

    // wrong degree: directionality doubles the per-node slot count
    let err = persisted(ARRAY | DIRECTED, FILE_BASED | SAVED, &[16, 16], &base).unwrap_err();
    assert!(matches!(err, GraphError::StructuralMismatch(_)));

    // matching shape still opens
    persisted(ARRAY, FILE_BASED | SAVED, &[16, 16], &base)
        .unwrap()
        .close()
        .unwrap();
}

#[test]
fn reopen_without_region_files_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = persisted(ARRAY, FILE_BASED | SAVED, &[8, 8], &dir.path().join("absent"))
        .unwrap_err();
    assert!(matches!(err, GraphError::StructuralMismatch(_)));
}

#[test]
fn read_only_reopen_serves_queries_and_refuses_writes() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("g");
    let mut g = persisted(ARRAY, FILE_BASED, &[8, 8], &base).unwrap();
    g.ops_mut().add_edge(2, 6, 1.0).unwrap();
    g.close().unwrap();

    let mut g = persisted(ARRAY, FILE_BASED | SAVED | GRAPH_READ, &[8, 8], &base).unwrap();
    let ids: Vec<u64> = g
        .ops()
        .get_neighbors(2)
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, vec![6]);
    assert!(matches!(
        g.ops_mut().add_edge(1, 5, 1.0),
        Err(GraphError::InvalidArgument(_))
    ));
    assert!(g.ops_mut().remove_edge(2, 6).is_err());
    g.close().unwrap();
}

#[test]
fn fresh_read_only_graph_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = persisted(ARRAY, FILE_BASED | GRAPH_READ, &[8, 8], &dir.path().join("g"))
        .unwrap_err();
    assert!(matches!(err, GraphError::InvalidArgument(_)));
}

#[test]
fn omitted_basename_is_invented_and_unique() {
    let dims = Dimensions::new(&[4, 4]).unwrap();
    let g1 = Graph::create_shared(
        TypeFlags(ARRAY),
        AccessFlags(FILE_BASED),
        0,
        dims.clone(),
        None,
    )
    .unwrap();
    let g2 = Graph::create_shared(TypeFlags(ARRAY), AccessFlags(FILE_BASED), 0, dims, None)
        .unwrap();
    let b1 = g1.base_path().unwrap().to_path_buf();
    let b2 = g2.base_path().unwrap().to_path_buf();
    assert_ne!(b1, b2);
    assert!(b1.with_extension("nodes").is_file());
    g1.close().unwrap();
    g2.close().unwrap();
    for base in [b1, b2] {
        for ext in ["nodes", "meta"] {
            let _ = std::fs::remove_file(base.with_extension(ext));
        }
    }
}

#[test]
fn labeled_persisted_graph_round_trips_its_label_region() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("g");
    let dims = Dimensions::new(&[8, 8]).unwrap();
    let g = Graph::create_shared(
        TypeFlags(ARRAY | graphstore::LABELED),
        AccessFlags(FILE_BASED),
        3,
        dims.clone(),
        Some(&base),
    )
    .unwrap();
    assert_eq!(g.ops().node_count(), 192);
    g.close().unwrap();
    assert!(base.with_extension("labels").is_file());

    let g = Graph::create_shared(
        TypeFlags(ARRAY | graphstore::LABELED),
        AccessFlags(FILE_BASED | SAVED),
        3,
        dims,
        Some(&base),
    )
    .unwrap();
    assert_eq!(g.ops().node_count(), 192);
    g.close().unwrap();
}
