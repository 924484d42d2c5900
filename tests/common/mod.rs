//! Shared utilities for package tests
//!
//! Builds 3MF archives in memory with `zip::ZipWriter`. The minimal package
//! holds a closed tetrahedron and passes every check.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTENT_TYPES: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Default Extension="jpg" ContentType="image/jpeg"/>
</Types>"##;

pub const MODEL_REL: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel";
pub const THUMBNAIL_REL: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/thumbnail";
pub const TEXTURE_REL: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dtexture";
pub const PRINT_TICKET_REL: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/printticket";

/// Outward-facing faces of the tetrahedron built by [`tetrahedron_model`]
pub const GOOD_FACES: [(usize, usize, usize); 4] = [(0, 2, 1), (0, 1, 3), (1, 2, 3), (0, 3, 2)];

/// A relationships part from (id, type, target) triples
pub fn rels(relationships: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for (id, rel_type, target) in relationships {
        xml.push_str(&format!(
            "  <Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"/>\n",
            id, rel_type, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// A model part holding one tetrahedron object with the given faces
pub fn tetrahedron_model(faces: &[(usize, usize, usize)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xml:lang="en-US" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02">
  <resources>
    <object id="1" type="model">
      <mesh>
        <vertices>
          <vertex x="0" y="0" z="0"/>
          <vertex x="10" y="0" z="0"/>
          <vertex x="0" y="10" z="0"/>
          <vertex x="0" y="0" z="10"/>
        </vertices>
        <triangles>
"#,
    );
    for (v1, v2, v3) in faces {
        xml.push_str(&format!(
            "          <triangle v1=\"{}\" v2=\"{}\" v3=\"{}\"/>\n",
            v1, v2, v3
        ));
    }
    xml.push_str(
        r#"        </triangles>
      </mesh>
    </object>
  </resources>
  <build>
    <item objectid="1"/>
  </build>
</model>"#,
    );
    xml
}

/// Smallest PNG: signature and an IHDR chunk header
pub fn png_bytes() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00,
    ]
}

/// JPEG stream with an APP0 segment and one baseline frame header
pub fn jpeg_bytes(components: u8) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x06, b'J', b'F', b'I', b'F']);
    let len = 8 + 3 * u16::from(components);
    data.extend_from_slice(&[0xFF, 0xC0]);
    data.extend_from_slice(&len.to_be_bytes());
    data.extend_from_slice(&[8, 0, 1, 0, 1, components]);
    for c in 0..components {
        data.extend_from_slice(&[c + 1, 0x11, 0]);
    }
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// In-memory 3MF archive builder
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
    files: Vec<(String, Vec<u8>)>,
}

impl PackageBuilder {
    /// An archive with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Content types, root relationships and a closed tetrahedron model
    pub fn minimal() -> Self {
        Self::empty()
            .file("[Content_Types].xml", CONTENT_TYPES)
            .file("_rels/.rels", rels(&[("rel0", MODEL_REL, "/3D/3dmodel.model")]))
            .file("3D/3dmodel.model", tetrahedron_model(&GOOD_FACES))
    }

    /// Add or replace an entry
    pub fn file(mut self, name: &str, data: impl AsRef<[u8]>) -> Self {
        self.files.retain(|(n, _)| n != name);
        self.files.push((name.to_string(), data.as_ref().to_vec()));
        self
    }

    /// Remove an entry
    pub fn without(mut self, name: &str) -> Self {
        self.files.retain(|(n, _)| n != name);
        self
    }

    /// Write the archive
    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in &self.files {
            if name.ends_with('/') {
                zip.add_directory(name.as_str(), options).unwrap();
            } else {
                zip.start_file(name.as_str(), options).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        zip.finish().unwrap().into_inner()
    }
}
