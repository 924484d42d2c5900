//! Package conformance validation
//!
//! [`validate_bytes`] runs the checks of one package in a fixed order:
//! archive integrity, part names, content types, relationships, print
//! tickets, texture coverage and mesh topology. Findings go to the caller's
//! [`Log`]; only a fatal diagnostic ends the run early.

mod resolver;
pub mod topology;

pub use resolver::resolve_relationships;
pub use topology::{
    AnalysisError, EdgeRecord, EdgeTable, MeshReport, TopologyDefect, analyze_mesh, check_models,
};

use crate::config::ValidatorConfig;
use crate::diagnostics::{Code, Log, Message};
use crate::error::Result;
use crate::opc::{
    self, Archive, CONTENT_TYPES_PATH, RELS_PATH, RELS_SUFFIX, RelationshipKind, decode_part_name,
    hidden_segments, is_well_formed_uri, normalize_path, parse_content_types, parse_relationships,
};
use crate::package::Package;
use tracing::debug;

/// Offset of the low byte of the general purpose flags in the first local
/// file header
const GP_FLAG_OFFSET: usize = 6;

/// Flag bit 3: sizes and CRC follow the entry data in a data descriptor
const DATA_DESCRIPTOR_FLAG: u8 = 0x08;

/// Whether the first entry of the archive is written with a data descriptor
///
/// Some consumers cannot read such archives. Only the exact byte value is
/// tested, so archives with further flag bits set pass unnoticed.
pub fn uses_data_descriptor(bytes: &[u8]) -> bool {
    bytes.get(GP_FLAG_OFFSET) == Some(&DATA_DESCRIPTOR_FLAG)
}

/// Validate a 3MF package held in memory
///
/// Returns the package when the run ended without a fatal diagnostic, and
/// [`crate::Error::Fatal`] otherwise. Errors and warnings that do not stop
/// the run are only in `log`.
pub fn validate_bytes(bytes: Vec<u8>, config: &ValidatorConfig, log: &mut Log) -> Result<Package> {
    log.context("zip", |log| {
        let data_descriptor = uses_data_descriptor(&bytes);

        let mut archive = match Archive::open(bytes) {
            Ok(archive) => archive,
            Err(e) => {
                debug!(error = %e, "archive rejected");
                return Err(log.fatal("File provided is not a valid ZIP archive"));
            }
        };
        log.info("Zip file is valid");

        if data_descriptor {
            log.warning("File format: this file may not open on all systems");
        }

        if archive.len() > config.max_entries() {
            return Err(log.fatal(format!(
                "Archive has {} entries, limit is {}",
                archive.len(),
                config.max_entries()
            )));
        }

        let mut package = Package::default();
        check_part_names(log, &archive, &mut package)?;

        log.context("content types", |log| {
            read_content_types(log, &mut archive, &mut package, config)
        })?;

        log.context("relationships", |log| {
            read_relationships(log, &mut archive, &mut package, config)
        })?;

        log.context("relationship elements", |log| {
            resolve_relationships(log, &mut archive, &mut package, config)
        })?;

        log.context("print tickets", |log| {
            check_print_tickets(log, &package);
            Ok(())
        })?;

        check_texture_parts(log, &package)?;

        if config.checks_mesh_topology() {
            log.context("mesh topology", |log| {
                check_models(log, &package, config)
            })?;
        }

        debug!(
            parts = package.parts.len(),
            relationships = package.relationships.len(),
            "package validated"
        );
        package.set_data(archive.into_bytes());
        Ok(package)
    })
}

fn check_part_names(log: &mut Log, archive: &Archive, package: &mut Package) -> Result<()> {
    for entry in archive.entries() {
        log.context(format!("part names /{}", entry.name), |log| {
            if entry.name.ends_with(CONTENT_TYPES_PATH) {
                return Ok(());
            }
            if !is_well_formed_uri(&entry.name) {
                log.error(Code::ErrUriBad);
                return Ok(());
            }
            for _ in hidden_segments(&entry.name) {
                log.error(Code::ErrUriHiddenFile);
            }
            if !entry.is_dir {
                package.parts.push(format!("/{}", entry.name));
            }
            Ok(())
        })?;
    }
    Ok(())
}

/// Log a part whose declared size is over the ceiling; such parts are not read
fn part_too_large(log: &mut Log, size: u64, config: &ValidatorConfig) -> bool {
    if size <= config.max_part_size() {
        return false;
    }
    log.error(Message::code(Code::PartTooLarge).detail(format!(
        "{} bytes, limit is {}",
        size,
        config.max_part_size()
    )));
    true
}

fn read_content_types(
    log: &mut Log,
    archive: &mut Archive,
    package: &mut Package,
    config: &ValidatorConfig,
) -> Result<()> {
    let Some(entry) = archive.find(CONTENT_TYPES_PATH).cloned() else {
        log.error(Message::new(format!("Missing required file: {}", CONTENT_TYPES_PATH)).page(4));
        return Ok(());
    };

    if part_too_large(log, entry.size, config) {
        return Ok(());
    }

    let parsed = archive
        .read_limited(&entry.name, config.max_part_size())
        .and_then(|xml| parse_content_types(log, &xml));
    match parsed {
        Ok(types) => package.types = types,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => log.error(Message::new(format!("Unable to parse {}", CONTENT_TYPES_PATH)).detail(e)),
    }
    Ok(())
}

fn read_relationships(
    log: &mut Log,
    archive: &mut Archive,
    package: &mut Package,
    config: &ValidatorConfig,
) -> Result<()> {
    if !archive.has_file(RELS_PATH) {
        return Err(log.fatal(Message::new(format!("Missing required file {}", RELS_PATH)).page(4)));
    }

    let entries: Vec<(String, u64)> = archive
        .files_ending_with(RELS_SUFFIX)
        .into_iter()
        .map(|entry| (entry.name.clone(), entry.size))
        .collect();

    for (name, size) in entries {
        if part_too_large(log, size, config) {
            continue;
        }
        let parsed = archive
            .read_limited(&name, config.max_part_size())
            .and_then(|xml| parse_relationships(log, &name, &xml));
        match parsed {
            Ok(relationships) => package.relationships.extend(relationships),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => log.error(Message::new(format!("Unable to parse {}", name)).detail(e)),
        }
    }
    Ok(())
}

fn check_print_tickets(log: &mut Log, package: &Package) {
    let tickets = package
        .relationships
        .iter()
        .filter(|rel| rel.kind() == Some(RelationshipKind::PrintTicket))
        .count();
    if tickets > 1 {
        log.error(Code::MultiplePrintTickets);
    }
}

/// Report texture parts no texture or thumbnail relationship points at
///
/// Skipped when the package declares no content types, since no part can
/// then be recognised as a texture.
pub fn check_texture_parts(log: &mut Log, package: &Package) -> Result<()> {
    if package.types.is_empty() {
        return Ok(());
    }

    let targets: Vec<String> = package
        .textures
        .iter()
        .map(|t| part_key(&t.target))
        .chain(package.thumbnails.iter().map(|t| part_key(&t.target)))
        .collect();

    for part in &package.parts {
        let is_texture = package
            .types
            .content_type_for(part)
            .is_some_and(opc::is_texture_content_type);
        if !is_texture || targets.contains(&part_key(part)) {
            continue;
        }

        log.context(format!("part names {}", part), |log| {
            log.error(Code::TextureWithoutRelationship);
            Ok(())
        })?;
    }
    Ok(())
}

/// Comparison key of a part name: no leading slash, decoded, lowercase
fn part_key(name: &str) -> String {
    let name = normalize_path(name);
    decode_part_name(name)
        .unwrap_or_else(|| name.to_string())
        .to_lowercase()
}
