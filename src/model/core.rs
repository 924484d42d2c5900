//! Core 3MF model records: objects, meshes and build items

/// Units a model may declare
pub const VALID_UNITS: [&str; 6] = ["micron", "millimeter", "centimeter", "inch", "foot", "meter"];

/// A vertex in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Vertex {
    /// Create a new vertex
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    /// Index of first vertex
    pub v1: usize,
    /// Index of second vertex
    pub v2: usize,
    /// Index of third vertex
    pub v3: usize,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v1: usize, v2: usize, v3: usize) -> Self {
        Self { v1, v2, v3 }
    }

    /// Vertex indices in winding order
    pub fn indices(&self) -> [usize; 3] {
        [self.v1, self.v2, self.v3]
    }

    /// The three directed edges in winding order
    pub fn directed_edges(&self) -> [(usize, usize); 3] {
        [(self.v1, self.v2), (self.v2, self.v3), (self.v3, self.v1)]
    }

    /// Whether two or more corners share a vertex
    pub fn is_degenerate(&self) -> bool {
        self.v1 == self.v2 || self.v2 == self.v3 || self.v1 == self.v3
    }
}

/// A triangle mesh
///
/// `triangles` is `None` when the mesh element carries no `<triangles>`
/// child, which is distinct from an empty triangle list. A triangle that
/// fails to parse leaves its reason in `malformed` and the list unusable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// List of vertices
    pub vertices: Vec<Vertex>,
    /// List of triangles, if the mesh declares any
    pub triangles: Option<Vec<Triangle>>,
    /// First triangle parse failure, if any
    pub malformed: Option<String>,
}

impl Mesh {
    /// Create a new empty mesh with an empty triangle list
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Some(Vec::new()),
            malformed: None,
        }
    }

    /// Create a mesh from vertices and triangles
    pub fn from_parts(vertices: Vec<Vertex>, triangles: Vec<Triangle>) -> Self {
        Self {
            vertices,
            triangles: Some(triangles),
            malformed: None,
        }
    }

    /// Number of triangles, zero when the list is absent
    pub fn triangle_count(&self) -> usize {
        self.triangles.as_ref().map_or(0, Vec::len)
    }
}

/// An object resource of a model
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Resource id
    pub id: usize,
    /// Optional display name
    pub name: Option<String>,
    /// Object type attribute (`model`, `support`, ...), if given
    pub object_type: Option<String>,
    /// Mesh geometry, absent for component-only objects
    pub mesh: Option<Mesh>,
    /// Ids of objects referenced through components
    pub components: Vec<usize>,
}

impl Object {
    /// Create a new object without geometry
    pub fn new(id: usize) -> Self {
        Self {
            id,
            name: None,
            object_type: None,
            mesh: None,
            components: Vec::new(),
        }
    }
}

/// An item of the build section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildItem {
    /// Referenced object id
    pub objectid: usize,
}

/// A parsed 3D model part
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    /// Unit attribute, defaults to millimeter when absent
    pub unit: String,
    /// Space separated list of required extension prefixes
    pub required_extensions: Vec<String>,
    /// Metadata name/value pairs
    pub metadata: Vec<(String, String)>,
    /// Object resources
    pub objects: Vec<Object>,
    /// Build items
    pub build: Vec<BuildItem>,
}

impl Model {
    /// Create an empty model in millimeters
    pub fn new() -> Self {
        Self {
            unit: "millimeter".to_string(),
            ..Default::default()
        }
    }

    /// Look up an object by id
    pub fn object(&self, id: usize) -> Option<&Object> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Objects that carry mesh geometry
    pub fn meshes(&self) -> impl Iterator<Item = (&Object, &Mesh)> + '_ {
        self.objects
            .iter()
            .filter_map(|o| o.mesh.as_ref().map(|m| (o, m)))
    }
}
