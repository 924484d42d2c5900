//! `[Content_Types].xml` parsing and lookup

use super::validation::{extension_key, normalize_path};
use super::{MODEL_CONTENT_TYPE, RELS_CONTENT_TYPE};
use crate::diagnostics::{Code, Log, Message};
use crate::error::Result;
use crate::parser::{get_local_name, parse_attributes, reject_doctype};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;

/// The package content-type table
///
/// `Default` rows map an extension to a MIME type; `Override` rows map one
/// part name. Extensions are stored lowercase without the leading dot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `Default` row, returning the type it replaced
    pub fn insert_default(&mut self, extension: &str, content_type: impl Into<String>) -> Option<String> {
        self.defaults
            .insert(normalize_extension(extension), content_type.into())
    }

    /// Add an `Override` row for a part name
    pub fn insert_override(&mut self, part_name: &str, content_type: impl Into<String>) {
        self.overrides
            .insert(normalize_path(part_name).to_ascii_lowercase(), content_type.into());
    }

    /// Content type declared for an extension
    ///
    /// The lookup ignores case and a leading dot, so `"PNG"`, `".png"` and
    /// `"png"` are the same key.
    pub fn get(&self, extension: &str) -> Option<&str> {
        self.defaults
            .get(&normalize_extension(extension))
            .map(String::as_str)
    }

    /// Content type of a part: its override, else its extension's default
    pub fn content_type_for(&self, part_name: &str) -> Option<&str> {
        let key = normalize_path(part_name).to_ascii_lowercase();
        self.overrides
            .get(&key)
            .map(String::as_str)
            .or_else(|| extension_key(part_name).and_then(|ext| self.get(&ext)))
    }

    /// Whether the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty() && self.overrides.is_empty()
    }

    /// Number of `Default` rows
    pub fn len(&self) -> usize {
        self.defaults.len()
    }

    /// Whether any row declares `content_type`
    pub fn declares(&self, content_type: &str) -> bool {
        self.defaults
            .values()
            .chain(self.overrides.values())
            .any(|ct| ct == content_type)
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

/// Parse `[Content_Types].xml`
///
/// Rows missing an attribute are skipped. Duplicate extensions and a missing
/// `rels` or model content type are logged as errors.
pub fn parse_content_types(log: &mut Log, xml: &[u8]) -> Result<ContentTypes> {
    let xml = std::str::from_utf8(xml)?;
    reject_doctype(xml)?;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut types = ContentTypes::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = e.name();
                let name_str = std::str::from_utf8(name.as_ref())?;

                match get_local_name(name_str) {
                    "Default" => {
                        let attrs = parse_attributes(e)?;
                        if let (Some(ext), Some(ct)) = (attrs.get("Extension"), attrs.get("ContentType")) {
                            if types.insert_default(ext, ct.as_str()).is_some() {
                                log.error(Message::code(Code::DuplicateContentType).detail(ext));
                            }
                        } else {
                            log.warning("Default element is missing Extension or ContentType");
                        }
                    }
                    "Override" => {
                        let attrs = parse_attributes(e)?;
                        if let (Some(part), Some(ct)) = (attrs.get("PartName"), attrs.get("ContentType")) {
                            types.insert_override(part, ct.as_str());
                        } else {
                            log.warning("Override element is missing PartName or ContentType");
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if types.get("rels") != Some(RELS_CONTENT_TYPE) {
        log.error(Code::MissingRelsContentType);
    }
    if !types.declares(MODEL_CONTENT_TYPE) {
        log.error(Code::MissingModelContentType);
    }

    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    const TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
  <Default Extension="JPEG" ContentType="image/jpeg"/>
  <Override PartName="/Metadata/thumb.bin" ContentType="image/png"/>
</Types>"#;

    #[test]
    fn test_parse_defaults_and_overrides() {
        let mut log = Log::new();
        let types = parse_content_types(&mut log, TYPES.as_bytes()).unwrap();

        assert!(log.is_empty());
        assert_eq!(types.len(), 3);
        assert_eq!(types.get("jpeg"), Some("image/jpeg"));
        assert_eq!(types.content_type_for("/Metadata/thumb.bin"), Some("image/png"));
        assert_eq!(types.content_type_for("/3D/3dmodel.model"), Some(MODEL_CONTENT_TYPE));
        assert_eq!(types.content_type_for("/Metadata/notes.txt"), None);
    }

    #[test]
    fn test_lookup_ignores_case_and_leading_dot() {
        let mut types = ContentTypes::new();
        types.insert_default("Png", "image/png");
        assert_eq!(types.get("png"), Some("image/png"));
        assert_eq!(types.get(".PNG"), Some("image/png"));
        assert_eq!(types.content_type_for("/Textures/wood.PnG"), Some("image/png"));
    }

    #[test]
    fn test_duplicate_and_missing_rows_logged() {
        let xml = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="png" ContentType="image/png"/>
  <Default Extension="PNG" ContentType="image/png"/>
</Types>"#;
        let mut log = Log::new();
        parse_content_types(&mut log, xml.as_bytes()).unwrap();

        assert_eq!(log.count_code(Code::DuplicateContentType), 1);
        assert_eq!(log.count_code(Code::MissingRelsContentType), 1);
        assert_eq!(log.count_code(Code::MissingModelContentType), 1);
        assert_eq!(log.count(Severity::Error), 3);
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let mut log = Log::new();
        assert!(parse_content_types(&mut log, b"<Types><Default></Types>").is_err());
    }
}
