//! The validated package record
//!
//! A [`Package`] is produced by a validation run that ended without a fatal
//! diagnostic. It keeps the archive bytes it was read from, so part contents
//! can be read back, replaced and written out again.

use crate::config::ValidatorConfig;
use crate::diagnostics::{Log, Message};
use crate::error::{Error, Result};
use crate::model::{Model, Texture, Thumbnail};
use crate::opc::{self, ContentTypes, Relationship, normalize_path};
use crate::validator::validate_bytes;
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// A part parsed on behalf of the relationship that targets it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    /// `Id` of the relationship
    pub rel_id: String,
    /// Relationship target as written
    pub target: String,
    /// The parsed part
    pub object: T,
}

/// A 3MF package that passed validation without a fatal diagnostic
///
/// Errors and warnings found along the way are in the [`Log`] of the run,
/// not in the package.
#[derive(Debug, Default)]
pub struct Package {
    /// File the package was read from, `None` for in-memory input
    pub source: Option<PathBuf>,
    /// Absolute part names of all file entries, in archive order
    pub parts: Vec<String>,
    /// Content-type table
    pub types: ContentTypes,
    /// Relationships from every `.rels` part
    pub relationships: Vec<Relationship>,
    /// Parts targeted by model relationships
    pub models: Vec<Resolved<Model>>,
    /// Parts targeted by thumbnail relationships
    pub thumbnails: Vec<Resolved<Thumbnail>>,
    /// Parts targeted by texture relationships
    pub textures: Vec<Resolved<Texture>>,
    data: Vec<u8>,
    pending: HashMap<String, Vec<u8>>,
}

impl Package {
    /// Validate the 3MF file at `path` with default limits
    ///
    /// Returns `None` when the run hit a fatal diagnostic. All findings are
    /// appended to `log`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lib3mf_audit::{Log, Package};
    ///
    /// let mut log = Log::new();
    /// match Package::read("part.3mf", &mut log) {
    ///     Some(package) => println!("{} models", package.models.len()),
    ///     None => println!("{}", log.to_json().unwrap()),
    /// }
    /// ```
    pub fn read(path: impl AsRef<Path>, log: &mut Log) -> Option<Package> {
        Self::read_with_config(path, &ValidatorConfig::default(), log)
    }

    /// Validate the 3MF file at `path` with the given limits
    pub fn read_with_config(
        path: impl AsRef<Path>,
        config: &ValidatorConfig,
        log: &mut Log,
    ) -> Option<Package> {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = log.context("zip", |log| -> Result<()> {
                    Err(log.fatal(
                        Message::new("Unable to read file").detail(format!("{}: {}", path.display(), e)),
                    ))
                });
                return None;
            }
        };

        let mut package = Self::from_bytes(bytes, config, log)?;
        package.source = Some(path.to_path_buf());
        Some(package)
    }

    /// Validate a 3MF package held in memory
    pub fn from_bytes(bytes: Vec<u8>, config: &ValidatorConfig, log: &mut Log) -> Option<Package> {
        match validate_bytes(bytes, config, log) {
            Ok(package) => Some(package),
            Err(e) => {
                tracing::debug!(error = %e, "validation halted");
                None
            }
        }
    }

    /// Attach the archive bytes the package was validated from
    pub(crate) fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Bytes of a part
    ///
    /// Replaced content set with [`Package::set_part_content`] is returned
    /// in preference to the archive's. Part names match the way relationship
    /// targets do: leading slash optional, percent-decoded, case-insensitive.
    pub fn contents_for(&self, path: &str) -> Result<Vec<u8>> {
        if let Some(content) = self.pending_content(path) {
            return Ok(content.to_vec());
        }

        let mut archive = opc::Archive::new(Cursor::new(self.data.as_slice()))?;
        archive.read_part(path)
    }

    /// Replace the content of a part for the next [`Package::write`]
    ///
    /// The part is matched like [`Package::contents_for`]. A name with no
    /// archive entry is kept as given, and [`Package::write`] only ever
    /// replaces existing entries.
    pub fn set_part_content(&mut self, path: &str, content: Vec<u8>) {
        let key = self.entry_name(path);
        self.pending.insert(key, content);
    }

    /// Replacement content staged for a part
    pub fn pending_content(&self, path: &str) -> Option<&[u8]> {
        self.pending.get(&self.entry_name(path)).map(Vec::as_slice)
    }

    /// Replacement content staged under an exact stored entry name
    pub(crate) fn pending_for_entry(&self, name: &str) -> Option<&[u8]> {
        self.pending.get(name).map(Vec::as_slice)
    }

    /// Stored archive name of the entry `path` refers to
    fn entry_name(&self, path: &str) -> String {
        opc::Archive::new(Cursor::new(self.data.as_slice()))
            .ok()
            .and_then(|archive| archive.find(path).map(|entry| entry.name.clone()))
            .unwrap_or_else(|| normalize_path(path).to_string())
    }

    /// Write the package, with replaced parts, to `output`
    ///
    /// With no output path the file the package was read from is
    /// overwritten. The archive is built in memory first, so writing over
    /// the source is safe.
    pub fn write(&self, output: Option<&Path>) -> Result<()> {
        let target = output
            .or(self.source.as_deref())
            .ok_or_else(|| Error::MissingFile("no output path and no source file".to_string()))?;

        let buffer = opc::rewrite(self, Cursor::new(self.data.as_slice()), Cursor::new(Vec::new()))?;
        fs::write(target, buffer.into_inner())?;
        Ok(())
    }
}
