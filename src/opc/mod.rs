//! OPC (Open Packaging Conventions) handling for 3MF files
//!
//! 3MF files are ZIP archives following the OPC standard. This module holds
//! the archive access layer, the content-type and relationship part parsers,
//! part name rules, and the archive rewriter.

mod archive;
mod content_types;
mod relationships;
mod validation;
mod writer;

pub use archive::{Archive, ArchiveEntry};
pub use content_types::{ContentTypes, parse_content_types};
pub use relationships::{
    MODEL_REL_TYPE, PRINT_TICKET_REL_TYPE, Relationship, RelationshipKind, TEXTURE_REL_TYPE,
    THUMBNAIL_REL_TYPE, parse_relationships,
};
pub use validation::{
    decode_part_name, extension_key, hidden_segments, is_well_formed_uri, normalize_path,
    target_violations,
};
pub use writer::rewrite;

/// Content types file path
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Relationships file path
pub const RELS_PATH: &str = "_rels/.rels";

/// Suffix of every relationships part
pub const RELS_SUFFIX: &str = ".rels";

/// Content type of relationships parts
pub const RELS_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Content type of 3D model parts
pub const MODEL_CONTENT_TYPE: &str = "application/vnd.ms-package.3dmanufacturing-3dmodel+xml";

/// Content types that mark a part as a texture
pub const TEXTURE_CONTENT_TYPES: [&str; 3] = [
    "image/jpeg",
    "image/png",
    "application/vnd.ms-package.3dmanufacturing-3dmodeltexture",
];

/// Whether a content type marks a part as a texture
pub fn is_texture_content_type(content_type: &str) -> bool {
    TEXTURE_CONTENT_TYPES.contains(&content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_constants() {
        assert_eq!(CONTENT_TYPES_PATH, "[Content_Types].xml");
        assert_eq!(RELS_PATH, "_rels/.rels");
        assert!(RELS_PATH.ends_with(RELS_SUFFIX));
    }

    #[test]
    fn test_texture_content_types() {
        assert!(is_texture_content_type("image/png"));
        assert!(is_texture_content_type(
            "application/vnd.ms-package.3dmanufacturing-3dmodeltexture"
        ));
        assert!(!is_texture_content_type(MODEL_CONTENT_TYPE));
    }
}
