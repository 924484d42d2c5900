//! Read access to the ZIP container of a package

use super::validation::{decode_part_name, normalize_path};
use crate::error::{Error, Result};
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

/// Largest buffer reserved up front for an entry
pub const MAX_PREALLOCATION: u64 = 1 << 20;

/// One entry of the archive's central directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name as stored, without a leading slash
    pub name: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
    /// Uncompressed size in bytes
    pub size: u64,
}

/// An opened package archive, held in memory by default
pub struct Archive<R = Cursor<Vec<u8>>> {
    zip: ZipArchive<R>,
    entries: Vec<ArchiveEntry>,
}

impl<R> std::fmt::Debug for Archive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Archive {
    /// Open a ZIP archive from raw bytes
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        Self::new(Cursor::new(bytes))
    }

    /// Give back the archive bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.zip.into_inner().into_inner()
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Open a ZIP archive from any seekable reader
    pub fn new(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let file = zip.by_index_raw(i)?;
            entries.push(ArchiveEntry {
                name: file.name().to_string(),
                is_dir: file.is_dir(),
                size: file.size(),
            });
        }
        Ok(Self { zip, entries })
    }

    /// Entries in central directory order
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the archive is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the file entry a part name or relationship target refers to
    ///
    /// The leading slash is ignored. The name is tried as stored, then
    /// percent-decoded, then compared ASCII case-insensitively since OPC part
    /// names are case-insensitive.
    pub fn find(&self, part_name: &str) -> Option<&ArchiveEntry> {
        let name = normalize_path(part_name);
        let decoded = decode_part_name(name);
        let files = || self.entries.iter().filter(|e| !e.is_dir);

        files()
            .find(|e| e.name == name)
            .or_else(|| {
                decoded
                    .as_deref()
                    .and_then(|d| files().find(|e| e.name == d))
            })
            .or_else(|| {
                let wanted = decoded.as_deref().unwrap_or(name);
                files().find(|e| e.name.eq_ignore_ascii_case(wanted))
            })
    }

    /// Check if a file exists in the archive
    pub fn has_file(&self, part_name: &str) -> bool {
        self.find(part_name).is_some()
    }

    /// File entries whose name ends with `suffix`, in archive order
    pub fn files_ending_with(&self, suffix: &str) -> Vec<&ArchiveEntry> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir && e.name.ends_with(suffix))
            .collect()
    }

    /// Read an entry's bytes by its exact stored name
    pub fn read(&mut self, name: &str) -> Result<Vec<u8>> {
        self.read_limited(name, u64::MAX)
    }

    /// Read an entry's bytes, failing once more than `limit` bytes come out
    ///
    /// The declared size in the archive header is not trusted: the buffer
    /// is never preallocated past `limit` or [`MAX_PREALLOCATION`], and the
    /// stream itself is cut off one byte past the limit.
    pub fn read_limited(&mut self, name: &str, limit: u64) -> Result<Vec<u8>> {
        let file = self
            .zip
            .by_name(name)
            .map_err(|_| Error::MissingFile(name.to_string()))?;
        let capacity = file.size().min(limit).min(MAX_PREALLOCATION);
        let mut content = Vec::with_capacity(capacity as usize);
        file.take(limit.saturating_add(1)).read_to_end(&mut content)?;
        if content.len() as u64 > limit {
            return Err(Error::PartTooLarge {
                name: name.to_string(),
                limit,
            });
        }
        Ok(content)
    }

    /// Read a part located with [`Archive::find`]
    pub fn read_part(&mut self, part_name: &str) -> Result<Vec<u8>> {
        let name = self
            .find(part_name)
            .map(|e| e.name.clone())
            .ok_or_else(|| Error::MissingFile(part_name.to_string()))?;
        self.read(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn archive_with(files: &[(&str, &[u8])]) -> Archive {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.add_directory("3D/", options).unwrap();
        for (name, data) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        let bytes = zip.finish().unwrap().into_inner();
        Archive::open(bytes).unwrap()
    }

    #[test]
    fn test_open_rejects_non_zip() {
        assert!(matches!(
            Archive::open(b"definitely not a zip".to_vec()),
            Err(Error::Zip(_))
        ));
    }

    #[test]
    fn test_entries_include_directories() {
        let archive = archive_with(&[("3D/3dmodel.model", b"<model/>")]);
        assert_eq!(archive.len(), 2);
        assert!(archive.entries()[0].is_dir);
        assert_eq!(archive.entries()[1].size, 8);
    }

    #[test]
    fn test_find_variants() {
        let archive = archive_with(&[("2D/testÆfile.png", b"x"), ("3D/Model.model", b"y")]);
        assert!(archive.has_file("/2D/testÆfile.png"));
        assert!(archive.has_file("/2D/test%C3%86file.png"));
        assert!(archive.has_file("/3d/model.MODEL"));
        assert!(!archive.has_file("/3D/"));
        assert!(!archive.has_file("/missing.model"));
    }

    #[test]
    fn test_read_limited() {
        let mut archive = archive_with(&[("Metadata/blob.bin", &[7u8; 64])]);
        assert_eq!(archive.read_limited("Metadata/blob.bin", 64).unwrap().len(), 64);
        assert!(matches!(
            archive.read_limited("Metadata/blob.bin", 63),
            Err(Error::PartTooLarge { limit: 63, .. })
        ));
        assert_eq!(archive.read("Metadata/blob.bin").unwrap().len(), 64);
    }

    #[test]
    fn test_read_part() {
        let mut archive = archive_with(&[("_rels/.rels", b"<Relationships/>")]);
        assert_eq!(archive.read_part("/_rels/.rels").unwrap(), b"<Relationships/>");
        assert!(matches!(
            archive.read_part("/nope"),
            Err(Error::MissingFile(_))
        ));
    }
}
