//! Fatal error taxonomy for skein.
//!
//! Only conditions that indicate a violated corpus or configuration
//! assumption are errors; everything recoverable (unterminated spans,
//! dangling links, unresolved cycles, accounting mismatches) is surfaced
//! as a [`crate::diagnostics::Diagnostic`] instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a split run.
#[derive(Debug, Error)]
pub enum SkeinError {
    /// A link-bearing macro (`display`/`click`) had the wrong argument
    /// shape. Guessing a target here would silently corrupt the link
    /// graph, so the whole run fails.
    #[error("malformed <<{name}>> macro: {details} (in passage '{passage}')")]
    MacroShape {
        /// The macro name (`display` or `click`).
        name: String,
        /// What was wrong with the argument list.
        details: String,
        /// The passage whose body contained the macro.
        passage: String,
    },

    /// A passage header line could not be parsed.
    #[error("malformed passage header '{line}': {details}")]
    Header {
        /// The offending header line.
        line: String,
        /// What was wrong with it.
        details: String,
    },

    /// The trailing metadata object on a passage header was not valid JSON.
    #[error("invalid metadata JSON on header '{line}': {source}")]
    Metadata {
        /// The offending header line.
        line: String,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A config file could not be parsed as TOML.
    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// The underlying TOML error.
        source: toml::de::Error,
    },
}
