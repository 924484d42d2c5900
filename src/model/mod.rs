//! Typed records produced by the part parsers

mod core;
mod image;

pub use self::core::{BuildItem, Mesh, Model, Object, Triangle, VALID_UNITS, Vertex};
pub use self::image::{ImageFormat, Texture, Thumbnail};
