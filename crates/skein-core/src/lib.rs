#![forbid(unsafe_code)]
//! skein-core library.
//!
//! Splits a Twee hypertext-fiction corpus into ordered output files:
//! link extraction, link-graph construction, bounded subgraph selection,
//! and deterministic topological ordering with named cycle-breaking.
//!
//! # Conventions
//!
//! - **Errors**: fatal contract violations are [`SkeinError`];
//!   recoverable oddities accumulate as [`Diagnostic`] values.
//! - **Logging**: `tracing` macros (`warn!`, `debug!`) at recovery
//!   sites; the library never prints.

pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod graph;
pub mod passage;
pub mod split;

pub use config::SplitConfig;
pub use diagnostics::Diagnostic;
pub use error::SkeinError;
pub use passage::{Passage, parse_corpus};
pub use split::{SplitOutput, split_corpus};
