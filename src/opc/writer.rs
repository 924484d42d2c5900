//! Package rewriting: copy an archive, substituting replaced parts

use crate::error::Result;
use crate::package::Package;
use std::io::{Read, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Copy every entry of `source` into a new archive written to `sink`
///
/// Directory entries and files without pending content are copied raw, so
/// their compressed bytes and metadata are unchanged. Files with pending
/// content in `package` are written with that content, deflated. No
/// validation is performed.
///
/// # Arguments
///
/// * `package` - The package whose pending part content is applied
/// * `source` - The original archive
/// * `sink` - Where the new archive is written
///
/// # Returns
///
/// Returns the sink after finishing the ZIP archive
pub fn rewrite<R, W>(package: &Package, source: R, sink: W) -> Result<W>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut input = ZipArchive::new(source)?;
    let mut zip = ZipWriter::new(sink);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..input.len() {
        let entry = input.by_index_raw(i)?;
        let replacement = if entry.is_dir() {
            None
        } else {
            package.pending_for_entry(entry.name())
        };

        match replacement {
            Some(content) => {
                let name = entry.name().to_string();
                drop(entry);
                zip.start_file(name, options)?;
                zip.write_all(content)?;
            }
            None => zip.raw_copy_file(entry)?,
        }
    }

    Ok(zip.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source_archive() -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.add_directory("3D/", options).unwrap();
        zip.start_file("3D/3dmodel.model", options).unwrap();
        zip.write_all(b"<model/>").unwrap();
        zip.start_file("Metadata/notes.txt", options).unwrap();
        zip.write_all(b"hello").unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn read_all(bytes: &[u8]) -> Vec<(String, bool, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), file.is_dir(), data)
            })
            .collect()
    }

    #[test]
    fn test_rewrite_without_changes_copies_entries() {
        let source = source_archive();
        let package = Package::default();
        let out = rewrite(&package, Cursor::new(source.clone()), Cursor::new(Vec::new())).unwrap();

        assert_eq!(read_all(&source), read_all(&out.into_inner()));
    }

    #[test]
    fn test_rewrite_substitutes_pending_content() {
        let source = source_archive();
        let mut package = Package::default();
        package.set_part_content("/Metadata/notes.txt", b"replaced".to_vec());

        let out = rewrite(&package, Cursor::new(source), Cursor::new(Vec::new())).unwrap();
        let entries = read_all(&out.into_inner());

        assert_eq!(entries.len(), 3);
        assert!(entries[0].1);
        assert_eq!(entries[1].2, b"<model/>");
        assert_eq!(entries[2].0, "Metadata/notes.txt");
        assert_eq!(entries[2].2, b"replaced");
    }
}
