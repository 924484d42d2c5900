//! Diagnostic log for conformance runs
//!
//! A [`Log`] collects everything a validation run finds. Work is grouped into
//! nested scopes with [`Log::context`]; each [`Entry`] remembers the chain of
//! scope labels that was open when it was recorded, so a finding can be traced
//! back to the part, relationship or mesh it concerns.
//!
//! Logging at [`Severity::Fatal`] returns [`Error::Fatal`], which callers
//! propagate with `?`. Scopes close on the way out, and the entries recorded
//! before the abort stay in the log.
//!
//! ## Example
//!
//! ```
//! use lib3mf_audit::diagnostics::{Log, Message, Severity};
//!
//! let mut log = Log::new();
//! let result: lib3mf_audit::Result<()> = log.context("zip", |log| {
//!     log.warning("File format: this file may not open on all systems");
//!     log.context("relationships", |log| {
//!         Err(log.fatal(Message::new("Missing required file _rels/.rels").page(4)))
//!     })
//! });
//!
//! assert!(result.is_err());
//! assert_eq!(log.count(Severity::Fatal), 1);
//! assert_eq!(log.entries()[1].context_path(), "zip/relationships");
//! assert!(log.current_context().is_empty());
//! ```

mod codes;

pub use codes::Code;

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Severity of a diagnostic, from most to least serious
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The run cannot continue
    Fatal,
    /// The package violates a rule
    Error,
    /// The package may cause problems for some consumers
    Warning,
    /// Progress information
    Info,
    /// Detail for troubleshooting
    Debug,
}

impl Severity {
    /// All severities in descending priority
    pub const ALL: [Severity; 5] = [
        Severity::Fatal,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Debug,
    ];

    /// Numeric priority, higher is more serious
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Fatal => 4,
            Severity::Error => 3,
            Severity::Warning => 2,
            Severity::Info => 1,
            Severity::Debug => 0,
        }
    }

    /// Lowercase name, as used in exported records
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specification document a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpecDocument {
    /// 3MF Core Specification 1.1
    #[default]
    Core,
    /// 3MF Materials and Properties Extension 1.0.1
    Material,
    /// 3MF Production Extension
    Production,
    /// 3MF Slice Extension
    Slice,
}

impl SpecDocument {
    /// Published location of the document
    pub fn url(&self) -> &'static str {
        match self {
            SpecDocument::Core => "http://3mf.io/wp-content/uploads/2016/03/3MFcoreSpec_1.1.pdf",
            SpecDocument::Material => {
                "http://3mf.io/wp-content/uploads/2015/04/3MFmaterialsSpec_1.0.1.pdf"
            }
            SpecDocument::Production => {
                "http://3mf.io/wp-content/uploads/2016/07/3MFproductionSpec.pdf"
            }
            SpecDocument::Slice => "http://3mf.io/wp-content/uploads/2016/07/3MFsliceSpec.pdf",
        }
    }

    /// Link to a page of the document
    pub fn page_ref(&self, page: u32) -> String {
        format!("{}#page={}", self.url(), page)
    }
}

/// Content of one diagnostic before it is placed in the log
///
/// Built from a plain string, a [`Code`], or explicitly with the builder
/// methods. A page reference is only produced when a page is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    code: Option<Code>,
    page: Option<u32>,
    spec: SpecDocument,
}

impl Message {
    /// Create an uncoded message without a page reference
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
            page: None,
            spec: SpecDocument::Core,
        }
    }

    /// Create a message for a rule, with its canonical text and page
    pub fn code(code: Code) -> Self {
        Self {
            text: code.message().to_string(),
            code: Some(code),
            page: code.page(),
            spec: SpecDocument::Core,
        }
    }

    /// Append detail to the message text
    pub fn detail(mut self, detail: impl fmt::Display) -> Self {
        self.text = format!("{} ({})", self.text, detail);
        self
    }

    /// Cite a page of the specification document
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Select the specification document cited
    pub fn spec(mut self, spec: SpecDocument) -> Self {
        self.spec = spec;
        self
    }

    /// Message text
    pub fn text(&self) -> &str {
        &self.text
    }

    fn spec_ref(&self) -> Option<String> {
        self.page.map(|page| self.spec.page_ref(page))
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::new(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::new(text)
    }
}

impl From<Code> for Message {
    fn from(code: Code) -> Self {
        Message::code(code)
    }
}

/// A recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Scope labels open when the entry was recorded, outermost first
    pub context: Vec<String>,
    /// Severity of the finding
    pub severity: Severity,
    /// Human readable message
    pub message: String,
    /// Link to the governing specification page
    pub spec_ref: Option<String>,
    /// Rule the entry reports, if it reports a named rule
    pub code: Option<Code>,
}

impl Entry {
    /// Context labels joined with `/`
    pub fn context_path(&self) -> String {
        self.context.join("/")
    }

    /// Exported form of the entry
    pub fn to_record(&self) -> Record {
        Record {
            context: self.context_path(),
            severity: self.severity,
            message: self.message.clone(),
            spec_ref: self.spec_ref.clone(),
        }
    }
}

/// Exported diagnostic, the shape of each element of [`Log::to_json`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Context labels joined with `/`
    pub context: String,
    /// Severity of the finding
    pub severity: Severity,
    /// Human readable message
    pub message: String,
    /// Link to the governing specification page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_ref: Option<String>,
}

/// Diagnostic log of one validation run
///
/// Create one per run. Reusing a log across runs without [`Log::reset`]
/// mixes their findings.
#[derive(Debug, Default, Clone)]
pub struct Log {
    context: Vec<String>,
    entries: Vec<Entry>,
}

impl Log {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `body` inside a scope labelled `label`
    ///
    /// The label is removed again however `body` returns, including when it
    /// propagates a fatal signal.
    pub fn context<T, F>(&mut self, label: impl Into<String>, body: F) -> Result<T>
    where
        F: FnOnce(&mut Log) -> Result<T>,
    {
        self.context.push(label.into());
        let result = body(self);
        self.context.pop();
        result
    }

    /// Labels of the currently open scopes, outermost first
    pub fn current_context(&self) -> &[String] {
        &self.context
    }

    /// Record a fatal diagnostic and return the signal that aborts the run
    #[must_use = "the fatal signal must be propagated to stop the run"]
    pub fn fatal(&mut self, message: impl Into<Message>) -> Error {
        let text = self.record(Severity::Fatal, message.into());
        Error::Fatal(text)
    }

    /// Record an error
    pub fn error(&mut self, message: impl Into<Message>) {
        self.record(Severity::Error, message.into());
    }

    /// Record a warning
    pub fn warning(&mut self, message: impl Into<Message>) {
        self.record(Severity::Warning, message.into());
    }

    /// Record an informational entry
    pub fn info(&mut self, message: impl Into<Message>) {
        self.record(Severity::Info, message.into());
    }

    /// Record a debug entry
    pub fn debug(&mut self, message: impl Into<Message>) {
        self.record(Severity::Debug, message.into());
    }

    fn record(&mut self, severity: Severity, message: Message) -> String {
        let context = self.context.join("/");
        match severity {
            Severity::Fatal | Severity::Error => {
                tracing::error!(context = %context, severity = %severity, "{}", message.text)
            }
            Severity::Warning => tracing::warn!(context = %context, "{}", message.text),
            Severity::Info => tracing::info!(context = %context, "{}", message.text),
            Severity::Debug => tracing::debug!(context = %context, "{}", message.text),
        }

        let spec_ref = message.spec_ref();
        self.entries.push(Entry {
            context: self.context.clone(),
            severity,
            message: message.text.clone(),
            spec_ref,
            code: message.code,
        });
        message.text
    }

    /// All entries in the order they were recorded
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries of one severity
    pub fn entries_with(&self, severity: Severity) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.iter().filter(move |e| e.severity == severity)
    }

    /// Entries reporting one rule
    pub fn entries_with_code(&self, code: Code) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.iter().filter(move |e| e.code == Some(code))
    }

    /// Number of entries of one severity
    pub fn count(&self, severity: Severity) -> usize {
        self.entries_with(severity).count()
    }

    /// Number of entries reporting one rule
    pub fn count_code(&self, code: Code) -> usize {
        self.entries_with_code(code).count()
    }

    /// Whether a fatal diagnostic was recorded
    pub fn has_fatal(&self) -> bool {
        self.count(Severity::Fatal) > 0
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export all entries as records
    pub fn to_records(&self) -> Vec<Record> {
        self.entries.iter().map(Entry::to_record).collect()
    }

    /// Export all entries as a JSON array of records
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_records())?)
    }

    /// Clear entries and scopes so the log can serve another run
    pub fn reset(&mut self) {
        self.context.clear();
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE: &str = "http://3mf.io/wp-content/uploads/2016/03/3MFcoreSpec_1.1.pdf";

    #[test]
    fn test_fatal_returns_signal_and_records_entry() {
        let mut log = Log::new();
        let result: Result<()> = log.context("context for fatal test", |log| {
            Err(log.fatal("Fatal Error"))
        });

        assert!(matches!(result, Err(Error::Fatal(ref m)) if m == "Fatal Error"));
        assert_eq!(log.count(Severity::Fatal), 1);
        assert!(log.current_context().is_empty());
    }

    #[test]
    fn test_all_levels_recorded() {
        let mut log = Log::new();
        log.context("levels", |log| {
            let _ = log.fatal("fatal");
            log.error("error");
            log.warning("warning");
            log.info("info");
            log.debug("debug");
            Ok(())
        })
        .unwrap();

        for severity in Severity::ALL {
            assert_eq!(log.count(severity), 1, "{severity}");
        }
    }

    #[test]
    fn test_context_nests_and_pops() {
        let mut log = Log::new();
        log.context("zip", |log| {
            log.context("part names /3D/3dmodel.model", |log| {
                log.error(Code::ErrUriBad);
                Ok(())
            })?;
            log.info("after");
            Ok(())
        })
        .unwrap();

        assert_eq!(
            log.entries()[0].context,
            vec!["zip".to_string(), "part names /3D/3dmodel.model".to_string()]
        );
        assert_eq!(log.entries()[1].context_path(), "zip");
        assert!(log.current_context().is_empty());
    }

    #[test]
    fn test_spec_ref_defaults_to_core() {
        let mut log = Log::new();
        log.error(Message::new("Fatal Error").page(11));
        assert_eq!(
            log.entries()[0].spec_ref.as_deref(),
            Some(format!("{CORE}#page=11").as_str())
        );
    }

    #[test]
    fn test_spec_ref_uses_requested_document() {
        for spec in [
            SpecDocument::Core,
            SpecDocument::Material,
            SpecDocument::Production,
            SpecDocument::Slice,
        ] {
            let mut log = Log::new();
            log.error(Message::new("Fatal Error").spec(spec).page(1));
            assert_eq!(
                log.entries()[0].spec_ref,
                Some(format!("{}#page=1", spec.url()))
            );
        }
    }

    #[test]
    fn test_no_page_no_spec_ref() {
        let mut log = Log::new();
        log.warning(Message::new("plain").spec(SpecDocument::Slice));
        assert_eq!(log.entries()[0].spec_ref, None);
    }

    #[test]
    fn test_code_carries_page_and_text() {
        let mut log = Log::new();
        log.error(Message::code(Code::InvalidRelationshipType).detail("http://example.com/x"));

        let entry = &log.entries()[0];
        assert_eq!(entry.code, Some(Code::InvalidRelationshipType));
        assert!(entry.message.contains("http://example.com/x"));
        assert_eq!(entry.spec_ref, Some(format!("{CORE}#page=11")));
        assert_eq!(log.count_code(Code::InvalidRelationshipType), 1);
    }

    #[test]
    fn test_records_and_json() {
        let mut log = Log::new();
        log.context("context for to_hash spec", |log| {
            log.error(Message::new("This is an error").page(14));
            log.warning(Message::new("This is a Warning").page(15));
            log.info("This is just Info");
            Ok(())
        })
        .unwrap();

        let records = log.to_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].context, "context for to_hash spec");
        assert_eq!(records[1].severity, Severity::Warning);

        let json: serde_json::Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();
        let items = json.as_array().unwrap();
        assert_eq!(items[0]["severity"], "error");
        assert_eq!(items[0]["spec_ref"], format!("{CORE}#page=14"));
        assert!(items[2].get("spec_ref").is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut log = Log::new();
        let _ = log.context("run one", |log| -> Result<()> { Err(log.fatal("boom")) });
        log.reset();

        assert!(log.is_empty());
        assert!(log.current_context().is_empty());
        assert_eq!(log.to_json().unwrap(), "[]");
    }

    #[test]
    fn test_priority_order() {
        let priorities: Vec<u8> = Severity::ALL.iter().map(Severity::priority).collect();
        assert!(priorities.windows(2).all(|w| w[0] > w[1]));
    }
}
