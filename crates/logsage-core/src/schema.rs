//! Static schema catalog for the telemetry workspace.
//!
//! The catalog is an immutable text document enumerating the queryable
//! tables, their columns, and the closed value sets of enumerated columns.
//! It exists purely to be embedded verbatim into generation prompts; there
//! is no parsing or validation logic. The document lives in its own file
//! (`schema/email_tables.md`) so its content can be revised and versioned
//! without touching orchestration code.

/// Version of the embedded schema document, bumped on content changes.
pub const SCHEMA_VERSION: &str = "2024-11-01";

const EMAIL_TABLES: &str = include_str!("schema/email_tables.md");

/// Read-only accessor over the embedded schema document.
#[derive(Debug, Clone, Copy)]
pub struct SchemaCatalog;

impl SchemaCatalog {
    /// The full schema text, embedded verbatim into generation prompts.
    pub fn text(&self) -> &'static str {
        EMAIL_TABLES
    }

    /// The catalog version string.
    pub fn version(&self) -> &'static str {
        SCHEMA_VERSION
    }
}
