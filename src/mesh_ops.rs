//! Geometric measures of triangle meshes using nalgebra
//!
//! Used by the topology validator to tell whether a closed mesh is wound
//! outward. Only compiled with the `mesh-ops` feature.

use crate::model::{Mesh, Vertex};
use nalgebra::Point3;

/// An axis-aligned bounding box as (min corner, max corner)
pub type BoundingBox = (Point3<f64>, Point3<f64>);

fn point(v: &Vertex) -> Point3<f64> {
    Point3::new(v.x, v.y, v.z)
}

/// Compute the signed volume of a mesh using the divergence theorem
///
/// For a closed mesh wound counter-clockwise when seen from outside the
/// volume is positive; a negative volume means the normals point inward.
/// Triangles with an out-of-range index are skipped, and a mesh without
/// triangles has volume zero.
pub fn signed_volume(mesh: &Mesh) -> f64 {
    let Some(triangles) = mesh.triangles.as_ref() else {
        return 0.0;
    };

    let sum: f64 = triangles
        .iter()
        .filter_map(|t| {
            let a = mesh.vertices.get(t.v1)?;
            let b = mesh.vertices.get(t.v2)?;
            let c = mesh.vertices.get(t.v3)?;
            Some(point(a).coords.dot(&point(b).coords.cross(&point(c).coords)))
        })
        .sum();

    sum / 6.0
}

/// Bounding box of the mesh vertices, `None` for a mesh without vertices
pub fn aabb(mesh: &Mesh) -> Option<BoundingBox> {
    let mut vertices = mesh.vertices.iter().map(point);
    let first = vertices.next()?;

    Some(vertices.fold((first, first), |(min, max), p| {
        (min.inf(&p), max.sup(&p))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Triangle;

    fn unit_tetrahedron(flip: bool) -> Mesh {
        let vertices = vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(0.0, 1.0, 0.0),
            Vertex::new(0.0, 0.0, 1.0),
        ];
        let mut triangles = vec![
            Triangle::new(0, 2, 1),
            Triangle::new(0, 1, 3),
            Triangle::new(1, 2, 3),
            Triangle::new(0, 3, 2),
        ];
        if flip {
            for t in &mut triangles {
                std::mem::swap(&mut t.v2, &mut t.v3);
            }
        }
        Mesh::from_parts(vertices, triangles)
    }

    #[test]
    fn test_signed_volume() {
        let outward = signed_volume(&unit_tetrahedron(false));
        assert!((outward - 1.0 / 6.0).abs() < 1e-12);

        let inward = signed_volume(&unit_tetrahedron(true));
        assert!((inward + 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_signed_volume_without_triangles() {
        let mesh = Mesh {
            vertices: vec![Vertex::new(1.0, 1.0, 1.0)],
            triangles: None,
            malformed: None,
        };
        assert_eq!(signed_volume(&mesh), 0.0);
    }

    #[test]
    fn test_aabb() {
        let (min, max) = aabb(&unit_tetrahedron(false)).unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 1.0));
        assert!(aabb(&Mesh::new()).is_none());
    }
}
