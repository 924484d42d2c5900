#![no_main]

use lib3mf_audit::validator::analyze_mesh;
use lib3mf_audit::{Mesh, Triangle, Vertex};
use libfuzzer_sys::arbitrary::{Arbitrary, Result, Unstructured};
use libfuzzer_sys::fuzz_target;

#[derive(Debug)]
struct FuzzMesh {
    vertex_count: usize,
    triangles: Vec<(usize, usize, usize)>,
}

impl<'a> Arbitrary<'a> for FuzzMesh {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let vertex_count = u.int_in_range(0..=64)?;

        // Indices may run one past the vertex list to reach the bounds check
        let triangle_count = u.int_in_range(0..=128)?;
        let mut triangles = Vec::with_capacity(triangle_count);
        for _ in 0..triangle_count {
            let v1 = u.int_in_range(0..=vertex_count)?;
            let v2 = u.int_in_range(0..=vertex_count)?;
            let v3 = u.int_in_range(0..=vertex_count)?;
            triangles.push((v1, v2, v3));
        }

        Ok(FuzzMesh { vertex_count, triangles })
    }
}

fuzz_target!(|data: FuzzMesh| {
    let vertices = (0..data.vertex_count)
        .map(|i| Vertex::new(i as f64, (i * i) as f64, (i % 7) as f64))
        .collect();
    let triangles = data
        .triangles
        .iter()
        .map(|&(v1, v2, v3)| Triangle::new(v1, v2, v3))
        .collect();
    let mesh = Mesh::from_parts(vertices, triangles);

    if let Ok(report) = analyze_mesh(&mesh, 1_000) {
        assert!(report.boundary_edges <= report.edge_count);
    }
});
