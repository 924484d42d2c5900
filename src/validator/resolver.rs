//! Relationship resolution
//!
//! Checks every relationship target, locates the part it names and hands
//! the part to the parser its relationship kind selects.

use crate::config::ValidatorConfig;
use crate::diagnostics::{Code, Log, Message};
use crate::error::{Error, Result};
use crate::opc::{Archive, Relationship, RelationshipKind, is_well_formed_uri, target_violations};
use crate::package::{Package, Resolved};
use crate::parser::{parse_model, parse_texture, parse_thumbnail};
use tracing::debug;

/// Resolve all relationships recorded in `package`
///
/// Each relationship is handled inside a log scope named after its target.
/// Only a fatal diagnostic stops the walk; unreadable parts are logged as
/// errors against their relationship.
pub fn resolve_relationships(
    log: &mut Log,
    archive: &mut Archive,
    package: &mut Package,
    config: &ValidatorConfig,
) -> Result<()> {
    let limit = config.max_relationships();
    if package.relationships.len() > limit {
        log.error(Message::code(Code::TooManyRelationships).detail(format!(
            "{} relationships, only the first {} are checked",
            package.relationships.len(),
            limit
        )));
    }

    let relationships: Vec<Relationship> =
        package.relationships.iter().take(limit).cloned().collect();

    for rel in &relationships {
        log.context(rel.target.as_str(), |log| {
            resolve_one(log, archive, package, config, rel)
        })?;
    }

    debug!(
        models = package.models.len(),
        thumbnails = package.thumbnails.len(),
        textures = package.textures.len(),
        "relationships resolved"
    );
    Ok(())
}

fn resolve_one(
    log: &mut Log,
    archive: &mut Archive,
    package: &mut Package,
    config: &ValidatorConfig,
    rel: &Relationship,
) -> Result<()> {
    if !is_well_formed_uri(&rel.target) {
        log.error(Code::ErrUriBad);
        return Ok(());
    }

    for violation in target_violations(&rel.target) {
        log.error(violation);
    }

    let Some(entry) = archive.find(&rel.target).cloned() else {
        log.error(Message::new(format!("Relationship Target file {} not found", rel.target)).page(11));
        return Ok(());
    };

    let Some(kind) = rel.kind() else {
        log.error(Message::code(Code::InvalidRelationshipType).detail(&rel.rel_type));
        return Ok(());
    };

    if !kind.is_collecting() {
        return Ok(());
    }

    if super::part_too_large(log, entry.size, config) {
        return Ok(());
    }

    let data = match archive.read_limited(&entry.name, config.max_part_size()) {
        Ok(data) => data,
        Err(e) => return recover(log, &rel.target, e),
    };
    let path = format!("/{}", entry.name);

    let parsed = match kind {
        RelationshipKind::Model => parse_model(package, log, &path, &data).map(|model| {
            package.models.push(resolved(rel, model));
        }),
        RelationshipKind::Thumbnail => parse_thumbnail(package, log, &path, &data).map(|thumb| {
            package.thumbnails.push(resolved(rel, thumb));
        }),
        RelationshipKind::Texture => parse_texture(package, log, &path, &data).map(|texture| {
            package.textures.push(resolved(rel, texture));
        }),
        RelationshipKind::PrintTicket => Ok(()),
    };

    match parsed {
        Ok(()) => Ok(()),
        Err(e) => recover(log, &rel.target, e),
    }
}

fn resolved<T>(rel: &Relationship, object: T) -> Resolved<T> {
    Resolved {
        rel_id: rel.id.clone(),
        target: rel.target.clone(),
        object,
    }
}

/// Log a part failure against the current relationship, passing fatals on
fn recover(log: &mut Log, target: &str, error: Error) -> Result<()> {
    if error.is_fatal() {
        return Err(error);
    }
    log.error(Message::new(format!("Unable to read part {}", target)).detail(&error));
    Ok(())
}
