//! Part parsers
//!
//! Each parser turns the bytes of one part into a typed record. Parsers run
//! inside the log context of the relationship that targets the part and may
//! record findings there. A returned `Err` means the part could not be read
//! at all; the caller logs it against that relationship and moves on.

mod image;
mod model;

pub use image::{jpeg_is_cmyk, parse_texture, parse_thumbnail};
pub use model::{parse_model, parse_model_xml};

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Initial capacity of XML event buffers
pub(crate) const XML_BUFFER_CAPACITY: usize = 4096;

/// Extract local name from potentially namespaced XML element name
///
/// - `"m:colorgroup"` returns `"colorgroup"`
/// - `"object"` returns `"object"`
pub(crate) fn get_local_name(name_str: &str) -> &str {
    if let Some(pos) = name_str.rfind(':') {
        &name_str[pos + 1..]
    } else {
        name_str
    }
}

/// Collect the attributes of an element into a map keyed by qualified name
pub(crate) fn parse_attributes(e: &quick_xml::events::BytesStart) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::with_capacity(8);

    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;
        attrs.insert(key.to_string(), value.to_string());
    }

    Ok(attrs)
}

/// Reject documents carrying a DTD
///
/// DTD declarations can lead to XXE (XML External Entity) attacks and are
/// not allowed in 3MF parts. Only the first 2000 bytes are inspected, where
/// a DOCTYPE has to appear.
pub(crate) fn reject_doctype(xml: &str) -> Result<()> {
    let head = xml.get(..xml.len().min(2000)).unwrap_or(xml);
    if head.to_ascii_lowercase().contains("<!doctype") {
        return Err(Error::InvalidXml(
            "DTD declarations are not allowed in 3MF files for security reasons".to_string(),
        ));
    }
    Ok(())
}
