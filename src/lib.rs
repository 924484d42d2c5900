//! # lib3mf-audit
//!
//! A pure Rust conformance checker for 3MF (3D Manufacturing Format) packages.
//!
//! 3MF files are ZIP-based containers following the Open Packaging
//! Conventions (OPC) standard. This library opens a package, checks its
//! content-type table, relationships and part names against the 3MF core
//! specification, parses the parts those relationships point at, and checks
//! that every mesh is a closed, consistently oriented manifold. Each finding
//! is recorded in a [`Log`] together with the specification page it rests on.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Every diagnostic carries its log context and a specification reference
//! - Diagnostics export as JSON records
//! - Rewriting a package with replaced part contents
//! - `mesh-ops` (default): detects inward-facing closed meshes with nalgebra
//!
//! ## Example
//!
//! ```no_run
//! use lib3mf_audit::{Log, Package, Severity};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut log = Log::new();
//! let package = Package::read("model.3mf", &mut log);
//!
//! for entry in log.entries_with(Severity::Error) {
//!     println!("{}: {}", entry.context_path(), entry.message);
//! }
//! if let Some(package) = package {
//!     println!("{} model parts", package.models.len());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod diagnostics;
pub mod error;
#[cfg(feature = "mesh-ops")]
pub mod mesh_ops;
pub mod model;
pub mod opc;
pub mod package;
pub mod parser;
pub mod validator;

pub use config::ValidatorConfig;
pub use diagnostics::{Code, Entry, Log, Message, Record, Severity, SpecDocument};
pub use error::{Error, Result};
pub use model::{BuildItem, ImageFormat, Mesh, Model, Object, Texture, Thumbnail, Triangle, Vertex};
pub use package::{Package, Resolved};
