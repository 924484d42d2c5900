//! Error types for 3MF package auditing
//!
//! Conformance findings are not errors: they are recorded as entries in the
//! [`Log`](crate::diagnostics::Log). The types in this module describe the
//! failures that stop a piece of work outright, such as an unreadable part or
//! the terminal signal raised by a fatal diagnostic.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and archive errors
//! - **E2xxx**: XML parsing and structure errors
//! - **E3xxx**: Model content errors
//! - **E5xxx**: Run control and export
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading file
//! - `E1002`: ZIP archive format error
//! - `E1003`: Missing file in archive
//! - `E1004`: Part larger than the read limit
//! - `E2001`: XML parsing error
//! - `E2002`: XML attribute error
//! - `E2003`: Invalid XML structure
//! - `E3001`: Invalid model content
//! - `E3002`: Numeric parse error
//! - `E5001`: Fatal diagnostic raised, the run was aborted
//! - `E5002`: Diagnostic export failed

use std::io;
use thiserror::Error;

/// Result type for 3MF audit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while auditing or rewriting a 3MF package
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading or writing a file
    ///
    /// **Error Code**: E1001
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Corrupted ZIP file
    /// - Unsupported compression method
    /// - Truncated archive
    #[error("[E1002] ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Missing file in the 3MF archive
    ///
    /// **Error Code**: E1003
    #[error("[E1003] Missing file: {0}")]
    MissingFile(String),

    /// Part data ran past the read limit
    ///
    /// **Error Code**: E1004
    #[error("[E1004] Part {name} exceeds the read limit of {limit} bytes")]
    PartTooLarge {
        /// Entry name
        name: String,
        /// Limit in bytes
        limit: u64,
    },

    /// XML parsing error
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - Malformed XML syntax
    /// - Invalid character encoding
    /// - Unclosed tags
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// Invalid XML structure
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - Missing required XML elements or attributes
    /// - DTD declarations
    #[error("[E2003] Invalid XML structure: {0}")]
    InvalidXml(String),

    /// Invalid model content
    ///
    /// **Error Code**: E3001
    #[error("[E3001] Invalid model: {0}")]
    InvalidModel(String),

    /// Numeric parse error
    ///
    /// **Error Code**: E3002
    #[error("[E3002] Parse error: {0}")]
    ParseError(String),

    /// A fatal diagnostic was logged and the run must stop
    ///
    /// **Error Code**: E5001
    ///
    /// This is the terminal signal of a validation run. It is produced by
    /// [`Log::fatal`](crate::diagnostics::Log::fatal) and travels up through
    /// every open context until the top-level entry point turns it into an
    /// absent result. The diagnostic itself is already in the log.
    #[error("[E5001] Fatal: {0}")]
    Fatal(String),

    /// Diagnostic export failed
    ///
    /// **Error Code**: E5002
    #[error("[E5002] Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Self {
        Error::ParseError(format!("Failed to parse floating-point number: {}", err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::ParseError(format!("Failed to parse integer: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(format!("Attribute parsing failed: {}", err))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::InvalidXml(format!("Invalid UTF-8: {}", err))
    }
}

impl Error {
    /// Returns true for the terminal signal raised by a fatal diagnostic
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal(_))
    }

    /// Create an error for a required attribute missing from an element
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Error::InvalidXml(format!(
            "Element '<{}>' is missing required attribute '{}'",
            element, attribute
        ))
    }

    /// Create a parse error naming the field and the offending value
    pub fn parse_error_with_context(field_name: &str, value: &str, expected_type: &str) -> Self {
        Error::ParseError(format!(
            "Failed to parse '{}': expected {}, got '{}'",
            field_name, expected_type, value
        ))
    }
}
