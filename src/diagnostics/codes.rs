//! Symbolic diagnostic codes
//!
//! Each code names one conformance rule. It carries the canonical message
//! shown to users and, where the rule is stated in the 3MF core
//! specification, the page of `3MFcoreSpec_1.1.pdf` that governs it.

use std::fmt;

/// A named conformance rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// Part name or relationship target is not a well-formed URI
    ErrUriBad,
    /// Relationship target is not an absolute path, or climbs with `..`
    ErrUriRelativePath,
    /// Relationship target contains an empty path segment
    ErrUriEmptySegment,
    /// Part name has a segment starting with `.`
    ErrUriHiddenFile,
    /// Relationship type is not one the core specification defines
    InvalidRelationshipType,
    /// More than one print ticket relationship in the package
    MultiplePrintTickets,
    /// Texture part not targeted by a texture or thumbnail relationship
    TextureWithoutRelationship,
    /// Same extension declared twice in `[Content_Types].xml`
    DuplicateContentType,
    /// No `Default` for the `rels` extension
    MissingRelsContentType,
    /// No content type for 3D model parts
    MissingModelContentType,
    /// Two relationships in one file share an `Id`
    DuplicateRelationshipId,
    /// `Relationship` element lacks `Id`, `Type` or `Target`
    RelationshipMissingAttribute,
    /// Model `unit` attribute is not one of the defined units
    InvalidUnit,
    /// Build item references an object that does not exist
    InvalidBuildReference,
    /// Thumbnail content type is neither PNG nor JPEG
    ThumbnailContentType,
    /// Image bytes do not match the declared content type
    ImageContentMismatch,
    /// JPEG thumbnail uses a CMYK colour space
    ThumbnailCmykJpeg,
    /// Edge shared by more than two triangles
    NonManifoldEdge,
    /// Triangle wound against its neighbours
    InconsistentOrientation,
    /// Surface admits no consistent orientation
    NonOrientableSurface,
    /// Triangle repeats a vertex
    DegenerateTriangle,
    /// Mesh has edges used by a single triangle
    BoundaryEdges,
    /// Mesh declares no `<triangles>` element
    MissingTriangles,
    /// A `<triangle>` element could not be parsed
    MalformedTriangles,
    /// Triangle references a vertex index past the end of the vertex list
    VertexOutOfBounds,
    /// Closed mesh encloses negative volume, its normals point inward
    InvertedMesh,
    /// Mesh exceeds the configured triangle ceiling
    TooManyTriangles,
    /// Package exceeds the configured relationship ceiling
    TooManyRelationships,
    /// Part exceeds the configured size ceiling
    PartTooLarge,
}

impl Code {
    /// Stable snake_case identifier of the rule
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::ErrUriBad => "err_uri_bad",
            Code::ErrUriRelativePath => "err_uri_relative_path",
            Code::ErrUriEmptySegment => "err_uri_empty_segment",
            Code::ErrUriHiddenFile => "err_uri_hidden_file",
            Code::InvalidRelationshipType => "invalid_relationship_type",
            Code::MultiplePrintTickets => "multiple_print_tickets",
            Code::TextureWithoutRelationship => "texture_without_relationship",
            Code::DuplicateContentType => "duplicate_content_type",
            Code::MissingRelsContentType => "missing_rels_content_type",
            Code::MissingModelContentType => "missing_model_content_type",
            Code::DuplicateRelationshipId => "duplicate_relationship_id",
            Code::RelationshipMissingAttribute => "relationship_missing_attribute",
            Code::InvalidUnit => "invalid_unit",
            Code::InvalidBuildReference => "invalid_build_reference",
            Code::ThumbnailContentType => "thumbnail_content_type",
            Code::ImageContentMismatch => "image_content_mismatch",
            Code::ThumbnailCmykJpeg => "thumbnail_cmyk_jpeg",
            Code::NonManifoldEdge => "non_manifold_edge",
            Code::InconsistentOrientation => "inconsistent_orientation",
            Code::NonOrientableSurface => "non_orientable_surface",
            Code::DegenerateTriangle => "degenerate_triangle",
            Code::BoundaryEdges => "boundary_edges",
            Code::MissingTriangles => "missing_triangles",
            Code::MalformedTriangles => "malformed_triangles",
            Code::VertexOutOfBounds => "vertex_out_of_bounds",
            Code::InvertedMesh => "inverted_mesh",
            Code::TooManyTriangles => "too_many_triangles",
            Code::TooManyRelationships => "too_many_relationships",
            Code::PartTooLarge => "part_too_large",
        }
    }

    /// Canonical user-facing message
    pub fn message(&self) -> &'static str {
        match self {
            Code::ErrUriBad => "Part name is not a well-formed URI",
            Code::ErrUriRelativePath => "Part name must be an absolute path without relative segments",
            Code::ErrUriEmptySegment => "Part name must not contain empty path segments",
            Code::ErrUriHiddenFile => "Part name segments must not start with '.'",
            Code::InvalidRelationshipType => "Relationship type is not defined by the 3MF specification",
            Code::MultiplePrintTickets => "A package may contain at most one print ticket",
            Code::TextureWithoutRelationship => {
                "Texture part is not the target of any texture or thumbnail relationship"
            }
            Code::DuplicateContentType => "Extension is declared more than once in [Content_Types].xml",
            Code::MissingRelsContentType => {
                "[Content_Types].xml has no Default for the 'rels' extension"
            }
            Code::MissingModelContentType => {
                "[Content_Types].xml declares no 3D model content type"
            }
            Code::DuplicateRelationshipId => "Relationship Id is not unique within its relationships part",
            Code::RelationshipMissingAttribute => "Relationship is missing a required attribute",
            Code::InvalidUnit => "Model unit must be micron, millimeter, centimeter, inch, foot or meter",
            Code::InvalidBuildReference => "Build item references an undefined object",
            Code::ThumbnailContentType => "Thumbnail must be a PNG or JPEG image",
            Code::ImageContentMismatch => "Image data does not match its declared content type",
            Code::ThumbnailCmykJpeg => "JPEG thumbnail uses CMYK color space, only RGB is allowed",
            Code::NonManifoldEdge => "Non-manifold edge",
            Code::InconsistentOrientation => "Triangle orientation is inconsistent with its neighbours",
            Code::NonOrientableSurface => "Mesh surface cannot be consistently oriented",
            Code::DegenerateTriangle => "Degenerate triangle",
            Code::BoundaryEdges => "Mesh is not closed",
            Code::MissingTriangles => "Mesh has no triangles element",
            Code::MalformedTriangles => "Mesh triangle list is malformed",
            Code::VertexOutOfBounds => "Triangle vertex index is out of bounds",
            Code::InvertedMesh => "Mesh normals point inward",
            Code::TooManyTriangles => "Mesh exceeds the triangle limit and was not analysed",
            Code::TooManyRelationships => "Package exceeds the relationship limit",
            Code::PartTooLarge => "Part exceeds the size limit and was not parsed",
        }
    }

    /// Page of the core specification that states the rule, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            Code::ErrUriBad
            | Code::ErrUriRelativePath
            | Code::ErrUriEmptySegment
            | Code::ErrUriHiddenFile => Some(10),
            Code::InvalidRelationshipType | Code::DuplicateRelationshipId => Some(11),
            Code::RelationshipMissingAttribute => Some(11),
            Code::MultiplePrintTickets => Some(12),
            Code::TextureWithoutRelationship => Some(13),
            Code::ThumbnailContentType | Code::ThumbnailCmykJpeg => Some(13),
            Code::DuplicateContentType
            | Code::MissingRelsContentType
            | Code::MissingModelContentType => Some(9),
            Code::InvalidUnit => Some(15),
            Code::InvalidBuildReference => Some(28),
            Code::NonManifoldEdge
            | Code::InconsistentOrientation
            | Code::NonOrientableSurface
            | Code::DegenerateTriangle
            | Code::BoundaryEdges
            | Code::MissingTriangles
            | Code::MalformedTriangles
            | Code::VertexOutOfBounds
            | Code::InvertedMesh => Some(22),
            Code::ImageContentMismatch
            | Code::TooManyTriangles
            | Code::TooManyRelationships
            | Code::PartTooLarge => None,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
