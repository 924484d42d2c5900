//! Mesh topology analysis
//!
//! Builds an edge table for each mesh and checks that the surface is a
//! consistently oriented 2-manifold: every interior edge is shared by
//! exactly two triangles that traverse it in opposite directions.

use crate::config::ValidatorConfig;
use crate::diagnostics::{Code, Log, Message};
use crate::error::Result;
use crate::model::{Mesh, Triangle};
use crate::package::Package;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use thiserror::Error;

/// An undirected edge as its sorted vertex pair
pub type Edge = (usize, usize);

fn edge_key(a: usize, b: usize) -> Edge {
    if a < b { (a, b) } else { (b, a) }
}

/// Usage of one undirected edge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeRecord {
    /// Number of triangles using the edge
    pub incidence: usize,
    /// Traversals from the lower to the higher vertex index
    pub forward: usize,
    /// Traversals from the higher to the lower vertex index
    pub backward: usize,
    /// Indices of the triangles using the edge, ascending
    pub triangles: Vec<usize>,
}

impl EdgeRecord {
    /// Whether two incident triangles traverse the edge the same way
    pub fn is_same_direction(&self) -> bool {
        self.incidence == 2 && (self.forward == 2 || self.backward == 2)
    }
}

/// Edge table of a triangle list, keyed by sorted vertex pair
#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    edges: HashMap<Edge, EdgeRecord>,
}

impl EdgeTable {
    /// Build the table; degenerate triangles contribute no edges
    pub fn build(triangles: &[Triangle]) -> Self {
        let mut edges: HashMap<Edge, EdgeRecord> = HashMap::with_capacity(triangles.len() * 3 / 2);

        for (index, triangle) in triangles.iter().enumerate() {
            if triangle.is_degenerate() {
                continue;
            }
            for (a, b) in triangle.directed_edges() {
                let record = edges.entry(edge_key(a, b)).or_default();
                record.incidence += 1;
                if a < b {
                    record.forward += 1;
                } else {
                    record.backward += 1;
                }
                record.triangles.push(index);
            }
        }

        Self { edges }
    }

    /// Record of an edge, in either vertex order
    pub fn get(&self, a: usize, b: usize) -> Option<&EdgeRecord> {
        self.edges.get(&edge_key(a, b))
    }

    /// Number of distinct edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the table has no edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// All edges with their records, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&Edge, &EdgeRecord)> + '_ {
        self.edges.iter()
    }

    /// Edges used by a single triangle
    pub fn boundary_edges(&self) -> impl Iterator<Item = (&Edge, &EdgeRecord)> + '_ {
        self.edges.iter().filter(|(_, r)| r.incidence == 1)
    }

    /// Edges used by more than two triangles, sorted by edge
    pub fn non_manifold_edges(&self) -> Vec<(Edge, &EdgeRecord)> {
        let mut edges: Vec<_> = self
            .edges
            .iter()
            .filter(|(_, r)| r.incidence > 2)
            .map(|(e, r)| (*e, r))
            .collect();
        edges.sort_by_key(|(e, _)| *e);
        edges
    }

    /// Edges shared by exactly two triangles
    pub fn manifold_edges(&self) -> impl Iterator<Item = (&Edge, &EdgeRecord)> + '_ {
        self.edges.iter().filter(|(_, r)| r.incidence == 2)
    }
}

/// A defect found in a mesh
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyDefect {
    /// An edge used by more than two triangles
    NonManifoldEdge {
        /// The edge
        edge: Edge,
        /// Triangles using it
        triangles: Vec<usize>,
    },
    /// A triangle wound against the majority of its connected surface
    InconsistentOrientation {
        /// The inverted triangle
        triangle: usize,
        /// Edges it traverses in the same direction as a neighbour
        edges: Vec<Edge>,
        /// Those neighbours
        neighbours: Vec<usize>,
    },
    /// An edge at which orientation propagation contradicts itself
    NonOrientable {
        /// The edge
        edge: Edge,
        /// The two triangles sharing it
        triangles: Vec<usize>,
    },
    /// A triangle that repeats a vertex
    DegenerateTriangle {
        /// The triangle
        triangle: usize,
    },
    /// A closed, consistently wound mesh whose normals point inward
    InvertedMesh {
        /// Signed volume of the mesh
        volume: f64,
    },
}

impl TopologyDefect {
    /// Diagnostic code of the defect
    pub fn code(&self) -> Code {
        match self {
            TopologyDefect::NonManifoldEdge { .. } => Code::NonManifoldEdge,
            TopologyDefect::InconsistentOrientation { .. } => Code::InconsistentOrientation,
            TopologyDefect::NonOrientable { .. } => Code::NonOrientableSurface,
            TopologyDefect::DegenerateTriangle { .. } => Code::DegenerateTriangle,
            TopologyDefect::InvertedMesh { .. } => Code::InvertedMesh,
        }
    }
}

impl fmt::Display for TopologyDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyDefect::NonManifoldEdge { edge, triangles } => write!(
                f,
                "edge {}-{} is shared by {} triangles: {:?}",
                edge.0,
                edge.1,
                triangles.len(),
                triangles
            ),
            TopologyDefect::InconsistentOrientation {
                triangle,
                edges,
                neighbours,
            } => {
                let edges: Vec<String> = edges.iter().map(|(a, b)| format!("{}-{}", a, b)).collect();
                write!(
                    f,
                    "triangle {} is wound against neighbours {:?} across edges {}",
                    triangle,
                    neighbours,
                    edges.join(", ")
                )
            }
            TopologyDefect::NonOrientable { edge, triangles } => write!(
                f,
                "orientation contradicts itself at edge {}-{} between triangles {:?}",
                edge.0, edge.1, triangles
            ),
            TopologyDefect::DegenerateTriangle { triangle } => {
                write!(f, "triangle {} repeats a vertex", triangle)
            }
            TopologyDefect::InvertedMesh { volume } => {
                write!(f, "signed volume {}", volume)
            }
        }
    }
}

/// Reasons a mesh could not be analysed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The mesh has no `<triangles>` element
    #[error("mesh has no triangles element")]
    MissingTriangles,

    /// A `<triangle>` element failed to parse
    #[error("{reason}")]
    MalformedTriangles {
        /// Parse failure of the first bad triangle
        reason: String,
    },

    /// A triangle refers to a vertex that does not exist
    #[error("triangle {triangle} refers to vertex {index}, but the mesh has {vertex_count} vertices")]
    VertexOutOfBounds {
        /// Triangle index
        triangle: usize,
        /// Offending vertex index
        index: usize,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },

    /// The mesh is larger than the configured limit
    #[error("{count} triangles, limit is {limit}")]
    TooManyTriangles {
        /// Triangles in the mesh
        count: usize,
        /// Configured limit
        limit: usize,
    },
}

impl AnalysisError {
    /// Diagnostic code of the failure
    pub fn code(&self) -> Code {
        match self {
            AnalysisError::MissingTriangles => Code::MissingTriangles,
            AnalysisError::MalformedTriangles { .. } => Code::MalformedTriangles,
            AnalysisError::VertexOutOfBounds { .. } => Code::VertexOutOfBounds,
            AnalysisError::TooManyTriangles { .. } => Code::TooManyTriangles,
        }
    }
}

/// Result of analysing one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshReport {
    /// Number of distinct edges
    pub edge_count: usize,
    /// Number of edges used by a single triangle
    pub boundary_edges: usize,
    /// Defects in detection order
    pub defects: Vec<TopologyDefect>,
}

impl MeshReport {
    /// Whether the mesh is a closed, consistently oriented manifold
    pub fn is_clean(&self) -> bool {
        self.boundary_edges == 0 && self.defects.is_empty()
    }
}

/// Analyse the topology of one mesh
///
/// Fails without partial results when the triangle list is absent or
/// malformed, when any triangle refers to a missing vertex, or when the mesh
/// is larger than `max_triangles`.
pub fn analyze_mesh(mesh: &Mesh, max_triangles: usize) -> std::result::Result<MeshReport, AnalysisError> {
    if let Some(reason) = &mesh.malformed {
        return Err(AnalysisError::MalformedTriangles {
            reason: reason.clone(),
        });
    }

    let triangles = mesh
        .triangles
        .as_deref()
        .ok_or(AnalysisError::MissingTriangles)?;

    if triangles.len() > max_triangles {
        return Err(AnalysisError::TooManyTriangles {
            count: triangles.len(),
            limit: max_triangles,
        });
    }

    let vertex_count = mesh.vertices.len();
    for (triangle, t) in triangles.iter().enumerate() {
        if let Some(&index) = t.indices().iter().find(|&&i| i >= vertex_count) {
            return Err(AnalysisError::VertexOutOfBounds {
                triangle,
                index,
                vertex_count,
            });
        }
    }

    let mut defects: Vec<TopologyDefect> = triangles
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_degenerate())
        .map(|(triangle, _)| TopologyDefect::DegenerateTriangle { triangle })
        .collect();

    let table = EdgeTable::build(triangles);

    defects.extend(
        table
            .non_manifold_edges()
            .into_iter()
            .map(|(edge, record)| TopologyDefect::NonManifoldEdge {
                edge,
                triangles: record.triangles.clone(),
            }),
    );

    defects.extend(orientation_defects(triangles.len(), &table));

    #[cfg_attr(not(feature = "mesh-ops"), allow(unused_mut))]
    let mut report = MeshReport {
        edge_count: table.len(),
        boundary_edges: table.boundary_edges().count(),
        defects,
    };

    #[cfg(feature = "mesh-ops")]
    if report.is_clean() && !triangles.is_empty() {
        let volume = crate::mesh_ops::signed_volume(mesh);
        if volume < 0.0 {
            report.defects.push(TopologyDefect::InvertedMesh { volume });
        }
    }

    Ok(report)
}

/// Neighbour across a manifold edge; `flip` is set when both triangles
/// traverse the edge the same way
struct Link {
    neighbour: usize,
    flip: bool,
    edge: Edge,
}

fn orientation_defects(triangle_count: usize, table: &EdgeTable) -> Vec<TopologyDefect> {
    let mut links: Vec<Vec<Link>> = (0..triangle_count).map(|_| Vec::new()).collect();
    for (edge, record) in table.manifold_edges() {
        let (a, b) = (record.triangles[0], record.triangles[1]);
        let flip = record.is_same_direction();
        links[a].push(Link { neighbour: b, flip, edge: *edge });
        links[b].push(Link { neighbour: a, flip, edge: *edge });
    }
    for list in &mut links {
        list.sort_by_key(|l| (l.neighbour, l.edge));
    }

    let mut defects = Vec::new();
    let mut orientation: Vec<Option<bool>> = vec![None; triangle_count];
    let mut contradictions: HashSet<Edge> = HashSet::new();

    for start in 0..triangle_count {
        if orientation[start].is_some() || links[start].is_empty() {
            continue;
        }

        // `false` keeps the winding of `start`, `true` is inverted relative to it
        orientation[start] = Some(false);
        let mut component = vec![start];
        let mut contradictory = Vec::new();
        let mut queue = VecDeque::from([start]);

        while let Some(t) = queue.pop_front() {
            let current = orientation[t].unwrap_or(false);
            for link in &links[t] {
                let expected = current ^ link.flip;
                match orientation[link.neighbour] {
                    None => {
                        orientation[link.neighbour] = Some(expected);
                        component.push(link.neighbour);
                        queue.push_back(link.neighbour);
                    }
                    Some(actual) if actual != expected => {
                        if contradictions.insert(link.edge) {
                            let mut pair = vec![t, link.neighbour];
                            pair.sort_unstable();
                            contradictory.push(TopologyDefect::NonOrientable {
                                edge: link.edge,
                                triangles: pair,
                            });
                        }
                    }
                    Some(_) => {}
                }
            }
        }

        if !contradictory.is_empty() {
            contradictory.sort_by_key(|d| match d {
                TopologyDefect::NonOrientable { edge, .. } => *edge,
                _ => (0, 0),
            });
            defects.extend(contradictory);
            continue;
        }

        let inverted = component
            .iter()
            .filter(|&&t| orientation[t] == Some(true))
            .count();
        let kept = component.len() - inverted;
        // The smaller group is reported; on a tie the reference triangle's group is kept
        let report_group = inverted <= kept;

        component.sort_unstable();
        for &t in &component {
            if orientation[t] != Some(report_group) {
                continue;
            }
            let (edges, neighbours): (Vec<Edge>, Vec<usize>) = links[t]
                .iter()
                .filter(|l| l.flip)
                .map(|l| (l.edge, l.neighbour))
                .unzip();
            defects.push(TopologyDefect::InconsistentOrientation {
                triangle: t,
                edges,
                neighbours,
            });
        }
    }

    defects
}

/// Analyse every mesh of every resolved model and log the findings
///
/// Each model is logged under its relationship target and each mesh under
/// `object <id>`.
pub fn check_models(log: &mut Log, package: &Package, config: &ValidatorConfig) -> Result<()> {
    for resolved in &package.models {
        log.context(resolved.target.as_str(), |log| {
            for (object, mesh) in resolved.object.meshes() {
                log.context(format!("object {}", object.id), |log| {
                    check_mesh(log, mesh, config);
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn check_mesh(log: &mut Log, mesh: &Mesh, config: &ValidatorConfig) {
    let report = match analyze_mesh(mesh, config.max_triangles()) {
        Ok(report) => report,
        Err(e) => {
            log.error(Message::code(e.code()).detail(&e));
            return;
        }
    };

    #[cfg(feature = "mesh-ops")]
    if let Some((min, max)) = crate::mesh_ops::aabb(mesh) {
        tracing::debug!(
            edges = report.edge_count,
            min = ?min.coords.as_slice(),
            max = ?max.coords.as_slice(),
            "mesh analysed"
        );
    }

    if report.boundary_edges > 0 {
        log.warning(
            Message::code(Code::BoundaryEdges)
                .detail(format!("{} boundary edges", report.boundary_edges)),
        );
    }

    for defect in &report.defects {
        log.error(Message::code(defect.code()).detail(defect));
    }
}
