//! 3D model part parsing
//!
//! Reads objects, meshes, components and build items from a model part.
//! Material, slice and other extension elements are skipped.

use super::{XML_BUFFER_CAPACITY, get_local_name, parse_attributes, reject_doctype};
use crate::diagnostics::{Code, Log, Message};
use crate::error::{Error, Result};
use crate::model::{BuildItem, Mesh, Model, Object, Triangle, VALID_UNITS, Vertex};
use crate::package::Package;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Parse a model part targeted by a model relationship
///
/// Structural problems that leave the part unreadable are returned as
/// errors. Rule violations in readable content (unknown unit, dangling build
/// references) are logged and the model is still returned.
pub fn parse_model(_package: &Package, log: &mut Log, path: &str, data: &[u8]) -> Result<Model> {
    let xml = std::str::from_utf8(data)
        .map_err(|e| Error::InvalidXml(format!("{}: {}", path, e)))?;
    let model = parse_model_xml(xml)?;

    if !VALID_UNITS.contains(&model.unit.as_str()) {
        log.error(Message::code(Code::InvalidUnit).detail(&model.unit));
    }

    for item in &model.build {
        if model.object(item.objectid).is_none() {
            log.error(
                Message::code(Code::InvalidBuildReference)
                    .detail(format!("objectid {}", item.objectid)),
            );
        }
    }

    Ok(model)
}

/// Parse model XML into a [`Model`] without rule checks
pub fn parse_model_xml(xml: &str) -> Result<Model> {
    reject_doctype(xml)?;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::with_capacity(XML_BUFFER_CAPACITY);

    let mut model = Model::new();
    let mut current_object: Option<Object> = None;
    let mut current_mesh: Option<Mesh> = None;
    let mut current_metadata: Option<(String, String)> = None;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        let is_empty = matches!(event, Event::Empty(_));

        match event {
            Event::DocType(_) => {
                return Err(Error::InvalidXml(
                    "DTD declarations are not allowed in 3MF files for security reasons"
                        .to_string(),
                ));
            }
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = e.name();
                let name_str = std::str::from_utf8(name.as_ref())?;

                match get_local_name(name_str) {
                    "model" => {
                        let attrs = parse_attributes(e)?;
                        if let Some(unit) = attrs.get("unit") {
                            model.unit = unit.clone();
                        }
                        if let Some(required) = attrs.get("requiredextensions") {
                            model.required_extensions =
                                required.split_whitespace().map(str::to_string).collect();
                        }
                    }
                    "metadata" => {
                        let attrs = parse_attributes(e)?;
                        let key = attrs.get("name").cloned().unwrap_or_default();
                        if is_empty {
                            model.metadata.push((key, String::new()));
                        } else {
                            current_metadata = Some((key, String::new()));
                        }
                    }
                    "object" => {
                        let object = parse_object(e)?;
                        if is_empty {
                            model.objects.push(object);
                        } else {
                            current_object = Some(object);
                        }
                    }
                    "mesh" => {
                        let mesh = Mesh::default();
                        if is_empty {
                            if let Some(ref mut obj) = current_object {
                                obj.mesh = Some(mesh);
                            }
                        } else {
                            current_mesh = Some(mesh);
                        }
                    }
                    "vertex" => {
                        if let Some(ref mut mesh) = current_mesh {
                            mesh.vertices.push(parse_vertex(e)?);
                        }
                    }
                    "triangles" => {
                        if let Some(ref mut mesh) = current_mesh {
                            mesh.triangles.get_or_insert_with(Vec::new);
                        }
                    }
                    "triangle" => {
                        // A bad triangle spoils only its own mesh; the rest
                        // of the list is ignored once one fails.
                        if let Some(ref mut mesh) = current_mesh {
                            if mesh.malformed.is_none() {
                                match parse_triangle(e) {
                                    Ok(triangle) => {
                                        mesh.triangles.get_or_insert_with(Vec::new).push(triangle)
                                    }
                                    Err(err) => mesh.malformed = Some(err.to_string()),
                                }
                            }
                        }
                    }
                    "component" => {
                        if let Some(ref mut obj) = current_object {
                            obj.components.push(required_usize(e, "component", "objectid")?);
                        }
                    }
                    "item" => {
                        model.build.push(BuildItem {
                            objectid: required_usize(e, "item", "objectid")?,
                        });
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                if let Some((_, ref mut value)) = current_metadata {
                    value.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                let name_str = std::str::from_utf8(name.as_ref())?;

                match get_local_name(name_str) {
                    "metadata" => {
                        if let Some(entry) = current_metadata.take() {
                            model.metadata.push(entry);
                        }
                    }
                    "mesh" => {
                        if let (Some(mesh), Some(obj)) =
                            (current_mesh.take(), current_object.as_mut())
                        {
                            obj.mesh = Some(mesh);
                        }
                    }
                    "object" => {
                        if let Some(obj) = current_object.take() {
                            model.objects.push(obj);
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

    Ok(model)
}

fn parse_object(e: &BytesStart) -> Result<Object> {
    let attrs = parse_attributes(e)?;
    let id_str = attrs
        .get("id")
        .ok_or_else(|| Error::missing_attribute("object", "id"))?;
    let id = id_str
        .parse::<usize>()
        .map_err(|_| Error::parse_error_with_context("object id", id_str, "non-negative integer"))?;

    let mut object = Object::new(id);
    object.name = attrs.get("name").cloned();
    object.object_type = attrs.get("type").cloned();
    Ok(object)
}

fn parse_vertex(e: &BytesStart) -> Result<Vertex> {
    let attrs = parse_attributes(e)?;
    let coord = |axis: &str| -> Result<f64> {
        let value = attrs
            .get(axis)
            .ok_or_else(|| Error::missing_attribute("vertex", axis))?;
        let parsed = value.trim().parse::<f64>().map_err(|_| {
            Error::parse_error_with_context(&format!("vertex {} coordinate", axis), value, "number")
        })?;
        if !parsed.is_finite() {
            return Err(Error::InvalidModel(format!(
                "Vertex {} coordinate '{}' is not a finite number",
                axis, value
            )));
        }
        Ok(parsed)
    };
    Ok(Vertex::new(coord("x")?, coord("y")?, coord("z")?))
}

fn parse_triangle(e: &BytesStart) -> Result<Triangle> {
    let attrs = parse_attributes(e)?;
    let index = |attr: &str| -> Result<usize> {
        let value = attrs
            .get(attr)
            .ok_or_else(|| Error::missing_attribute("triangle", attr))?;
        value.trim().parse::<usize>().map_err(|_| {
            Error::parse_error_with_context(&format!("triangle {}", attr), value, "vertex index")
        })
    };
    Ok(Triangle::new(index("v1")?, index("v2")?, index("v3")?))
}

fn required_usize(e: &BytesStart, element: &str, attr: &str) -> Result<usize> {
    let attrs = parse_attributes(e)?;
    let value = attrs
        .get(attr)
        .ok_or_else(|| Error::missing_attribute(element, attr))?;
    value
        .parse::<usize>()
        .map_err(|_| Error::parse_error_with_context(attr, value, "non-negative integer"))
}
