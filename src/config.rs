//! Resource limits for validation runs
//!
//! Package contents are untrusted. The ceilings here bound the work a single
//! run performs on pathological inputs.

/// Default maximum number of archive entries
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Default maximum number of relationships resolved per package
pub const DEFAULT_MAX_RELATIONSHIPS: usize = 10_000;

/// Default maximum uncompressed size of a single parsed part (256 MiB)
pub const DEFAULT_MAX_PART_SIZE: u64 = 256 * 1024 * 1024;

/// Default maximum number of triangles analysed per mesh
pub const DEFAULT_MAX_TRIANGLES: usize = 10_000_000;

/// Configuration for validating 3MF packages
///
/// # Example
///
/// ```
/// use lib3mf_audit::ValidatorConfig;
///
/// let config = ValidatorConfig::new()
///     .with_max_entries(500)
///     .with_max_triangles(1_000_000);
///
/// assert_eq!(config.max_entries(), 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    max_entries: usize,
    max_relationships: usize,
    max_part_size: u64,
    max_triangles: usize,
    check_mesh_topology: bool,
}

impl ValidatorConfig {
    /// Create a configuration with the default limits
    pub fn new() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_relationships: DEFAULT_MAX_RELATIONSHIPS,
            max_part_size: DEFAULT_MAX_PART_SIZE,
            max_triangles: DEFAULT_MAX_TRIANGLES,
            check_mesh_topology: true,
        }
    }

    /// Limit the number of archive entries; larger archives are rejected
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Limit the number of relationships resolved
    pub fn with_max_relationships(mut self, max_relationships: usize) -> Self {
        self.max_relationships = max_relationships;
        self
    }

    /// Limit the uncompressed size of a part handed to a parser
    pub fn with_max_part_size(mut self, max_part_size: u64) -> Self {
        self.max_part_size = max_part_size;
        self
    }

    /// Limit the number of triangles analysed per mesh
    pub fn with_max_triangles(mut self, max_triangles: usize) -> Self {
        self.max_triangles = max_triangles;
        self
    }

    /// Enable or disable mesh topology analysis
    pub fn with_mesh_topology(mut self, enabled: bool) -> Self {
        self.check_mesh_topology = enabled;
        self
    }

    /// Maximum number of archive entries
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Maximum number of relationships resolved
    pub fn max_relationships(&self) -> usize {
        self.max_relationships
    }

    /// Maximum uncompressed part size
    pub fn max_part_size(&self) -> u64 {
        self.max_part_size
    }

    /// Maximum triangles per mesh
    pub fn max_triangles(&self) -> usize {
        self.max_triangles
    }

    /// Whether mesh topology analysis runs
    pub fn checks_mesh_topology(&self) -> bool {
        self.check_mesh_topology
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::new()
    }
}
