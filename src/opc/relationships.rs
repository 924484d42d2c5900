//! Relationship parts and the relationship type registry

use crate::diagnostics::{Code, Log, Message};
use crate::error::Result;
use crate::parser::{get_local_name, parse_attributes, reject_doctype};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::{HashMap, HashSet};

/// 3D model relationship type
pub const MODEL_REL_TYPE: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel";

/// Thumbnail relationship type (OPC standard)
pub const THUMBNAIL_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/thumbnail";

/// Texture relationship type
pub const TEXTURE_REL_TYPE: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dtexture";

/// Print ticket relationship type
pub const PRINT_TICKET_REL_TYPE: &str =
    "http://schemas.microsoft.com/3dmanufacturing/2013/01/printticket";

/// A relationship read from a `.rels` part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// `Id` attribute, unique within its relationships part
    pub id: String,
    /// `Type` attribute, a URI naming the kind of link
    pub rel_type: String,
    /// `Target` attribute as written
    pub target: String,
    /// Archive name of the `.rels` part the relationship came from
    pub source: String,
}

impl Relationship {
    /// Create a relationship record
    pub fn new(
        id: impl Into<String>,
        rel_type: impl Into<String>,
        target: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            target: target.into(),
            source: source.into(),
        }
    }

    /// Kind of the relationship, if its type is one the core defines
    pub fn kind(&self) -> Option<RelationshipKind> {
        RelationshipKind::from_type_uri(&self.rel_type)
    }
}

/// Relationship types the core specification defines
///
/// Every kind but [`RelationshipKind::PrintTicket`] collects its target into
/// one of the package's typed collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// Target is a 3D model part
    Model,
    /// Target is a package or model thumbnail image
    Thumbnail,
    /// Target is a texture image
    Texture,
    /// Target is a print ticket; accepted without further checks
    PrintTicket,
}

impl RelationshipKind {
    /// Select the kind for a relationship type URI
    pub fn from_type_uri(uri: &str) -> Option<Self> {
        match uri {
            MODEL_REL_TYPE => Some(RelationshipKind::Model),
            THUMBNAIL_REL_TYPE => Some(RelationshipKind::Thumbnail),
            TEXTURE_REL_TYPE => Some(RelationshipKind::Texture),
            PRINT_TICKET_REL_TYPE => Some(RelationshipKind::PrintTicket),
            _ => None,
        }
    }

    /// Type URI of the kind
    pub fn type_uri(&self) -> &'static str {
        match self {
            RelationshipKind::Model => MODEL_REL_TYPE,
            RelationshipKind::Thumbnail => THUMBNAIL_REL_TYPE,
            RelationshipKind::Texture => TEXTURE_REL_TYPE,
            RelationshipKind::PrintTicket => PRINT_TICKET_REL_TYPE,
        }
    }

    /// Whether targets of this kind are parsed into a collection
    pub fn is_collecting(&self) -> bool {
        !matches!(self, RelationshipKind::PrintTicket)
    }
}

/// Parse a relationships part
///
/// `source` is the archive name of the part and is recorded on every
/// relationship. Elements missing `Id`, `Type` or `Target` are logged and
/// skipped; a repeated `Id` is logged but the relationship is kept.
pub fn parse_relationships(log: &mut Log, source: &str, xml: &[u8]) -> Result<Vec<Relationship>> {
    let xml = std::str::from_utf8(xml)?;
    reject_doctype(xml)?;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut relationships = Vec::new();
    let mut seen_ids = HashSet::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = e.name();
                let name_str = std::str::from_utf8(name.as_ref())?;
                if get_local_name(name_str) == "Relationship" {
                    let attrs = parse_attributes(e)?;
                    if let Some(rel) = relationship_from_attrs(log, source, &attrs, &mut seen_ids) {
                        relationships.push(rel);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

fn relationship_from_attrs(
    log: &mut Log,
    source: &str,
    attrs: &HashMap<String, String>,
    seen_ids: &mut HashSet<String>,
) -> Option<Relationship> {
    let (Some(id), Some(rel_type), Some(target)) =
        (attrs.get("Id"), attrs.get("Type"), attrs.get("Target"))
    else {
        let missing: Vec<&str> = ["Id", "Type", "Target"]
            .into_iter()
            .filter(|a| !attrs.contains_key(*a))
            .collect();
        log.error(Message::code(Code::RelationshipMissingAttribute).detail(missing.join(", ")));
        return None;
    };

    if !seen_ids.insert(id.clone()) {
        log.error(Message::code(Code::DuplicateRelationshipId).detail(id));
    }

    Some(Relationship::new(
        id.as_str(),
        rel_type.as_str(),
        target.as_str(),
        source,
    ))
}
