//! Property-based tests for lib3mf-audit
//!
//! These tests use proptest to generate meshes and archive bytes and verify
//! invariants of the topology analysis and the diagnostic log.

mod common;

use common::PackageBuilder;
use lib3mf_audit::validator::{EdgeTable, TopologyDefect, analyze_mesh};
use lib3mf_audit::{Log, Mesh, Package, Triangle, ValidatorConfig, Vertex};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

/// Outward-wound octahedron around the origin
fn octahedron(labels: &[usize]) -> Mesh {
    let positions = [
        (1.0, 0.0, 0.0),
        (-1.0, 0.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, -1.0, 0.0),
        (0.0, 0.0, 1.0),
        (0.0, 0.0, -1.0),
    ];
    let faces = [
        (0, 2, 4),
        (2, 1, 4),
        (1, 3, 4),
        (3, 0, 4),
        (2, 0, 5),
        (1, 2, 5),
        (3, 1, 5),
        (0, 3, 5),
    ];

    // Vertex `i` of the octahedron is stored at index `labels[i]`
    let mut vertices = vec![Vertex::new(0.0, 0.0, 0.0); 6];
    for (i, &(x, y, z)) in positions.iter().enumerate() {
        vertices[labels[i]] = Vertex::new(x, y, z);
    }
    let triangles = faces
        .iter()
        .map(|&(a, b, c)| Triangle::new(labels[a], labels[b], labels[c]))
        .collect();
    Mesh::from_parts(vertices, triangles)
}

fn labels_strategy() -> impl Strategy<Value = Vec<usize>> {
    Just((0..6).collect::<Vec<usize>>()).prop_shuffle()
}

fn triangle_strategy(vertex_count: usize) -> impl Strategy<Value = Triangle> {
    (0..vertex_count, 0..vertex_count, 0..vertex_count)
        .prop_map(|(v1, v2, v3)| Triangle::new(v1, v2, v3))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn relabelled_octahedron_is_clean(labels in labels_strategy()) {
        let report = analyze_mesh(&octahedron(&labels), 1_000).unwrap();
        prop_assert!(report.is_clean(), "defects: {:?}", report.defects);
        prop_assert_eq!(report.edge_count, 12);
    }

    #[test]
    fn one_flipped_face_is_reported_alone(labels in labels_strategy(), face in 0usize..8) {
        let mut mesh = octahedron(&labels);
        if let Some(triangles) = mesh.triangles.as_mut() {
            let t = &mut triangles[face];
            std::mem::swap(&mut t.v2, &mut t.v3);
        }

        let report = analyze_mesh(&mesh, 1_000).unwrap();
        prop_assert_eq!(report.defects.len(), 1);
        match &report.defects[0] {
            TopologyDefect::InconsistentOrientation { triangle, edges, neighbours } => {
                prop_assert_eq!(*triangle, face);
                prop_assert_eq!(edges.len(), 3);
                prop_assert_eq!(neighbours.len(), 3);
            }
            other => prop_assert!(false, "unexpected defect {:?}", other),
        }
    }

    #[test]
    fn edge_incidence_matches_triangle_count(
        triangles in prop::collection::vec(triangle_strategy(12), 0..60)
    ) {
        let table = EdgeTable::build(&triangles);
        let proper = triangles.iter().filter(|t| !t.is_degenerate()).count();

        let mut incidence = 0;
        for (_, record) in table.iter() {
            prop_assert_eq!(record.incidence, record.forward + record.backward);
            prop_assert_eq!(record.incidence, record.triangles.len());
            incidence += record.incidence;
        }
        prop_assert_eq!(incidence, proper * 3);
        prop_assert_eq!(
            table.boundary_edges().count() + table.manifold_edges().count()
                + table.non_manifold_edges().len(),
            table.len()
        );
    }

    #[test]
    fn analysis_never_panics(
        vertex_count in 0usize..10,
        triangles in prop::collection::vec(triangle_strategy(12), 0..40)
    ) {
        let mesh = Mesh::from_parts(vec![Vertex::new(0.0, 0.0, 0.0); vertex_count], triangles);
        let _ = analyze_mesh(&mesh, 1_000);
    }

    #[test]
    fn arbitrary_bytes_leave_no_open_scope(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut log = Log::new();
        let package = Package::from_bytes(bytes, &ValidatorConfig::default(), &mut log);

        prop_assert!(log.current_context().is_empty());
        prop_assert_eq!(package.is_none(), log.has_fatal());
    }

    #[test]
    fn truncated_packages_leave_no_open_scope(cut in 0usize..1_000) {
        let bytes = PackageBuilder::minimal().build();
        let cut = cut.min(bytes.len());
        let mut log = Log::new();
        let package = Package::from_bytes(bytes[..cut].to_vec(), &ValidatorConfig::default(), &mut log);

        prop_assert!(log.current_context().is_empty());
        prop_assert_eq!(package.is_none(), log.has_fatal());
    }
}
