//! Structured diagnostics collected during a split run.
//!
//! The core never prints. Every recoverable anomaly is pushed onto a
//! shared `Vec<Diagnostic>` that travels with the result, and the caller
//! decides how to surface it (console, JSON report, log). Emission sites
//! also log via `tracing::warn!` so anomalies show up in ambient logs
//! even when the caller drops the collected list.

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// A recoverable anomaly observed while extracting links, ordering
/// passages, or accounting for output placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A `<<` marker with no matching `>>` before end of body.
    /// Scanning of that body stopped at the marker.
    IncompleteMacro {
        /// Passage whose body contained the marker.
        passage: String,
        /// The unterminated remainder, starting at the open marker.
        rest: String,
    },

    /// A `[[` marker with no matching `]]` before end of the text span.
    IncompleteLink {
        /// Passage whose body contained the marker.
        passage: String,
        /// The unterminated remainder, starting at the open marker.
        rest: String,
    },

    /// Two passages in the source corpus share a name. The later
    /// definition wins.
    DuplicatePassage {
        /// The repeated passage name.
        name: String,
    },

    /// A partition start name does not exist in the group's link graph.
    UnknownStart {
        /// The configured start name.
        name: String,
    },

    /// A configured cycle breaker was force-readied to unblock ordering.
    /// Its remaining incoming edges were discarded, not enforced.
    CycleBroken {
        /// Output file being ordered.
        file: String,
        /// The breaker passage name.
        name: String,
    },

    /// Ordering could not complete via the configured cycle breakers.
    /// The unreachable remainder was appended in lexicographic order.
    UnresolvedCycle {
        /// Output file whose ordering was degraded.
        file: String,
        /// Names ordered before the algorithm got stuck.
        ordered: Vec<String>,
        /// Each stuck name with its remaining incoming links.
        stuck: Vec<(String, Vec<String>)>,
    },

    /// A source passage ended up in zero output files.
    LostPassage {
        /// The lost passage name.
        name: String,
    },

    /// A source passage ended up in more than one output file.
    DuplicatedPassage {
        /// The duplicated passage name.
        name: String,
        /// Sorted list of output files containing it.
        files: Vec<String>,
    },
}

impl Diagnostic {
    /// Short stable identifier for machine consumption.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::IncompleteMacro { .. } => "incomplete_macro",
            Self::IncompleteLink { .. } => "incomplete_link",
            Self::DuplicatePassage { .. } => "duplicate_passage",
            Self::UnknownStart { .. } => "unknown_start",
            Self::CycleBroken { .. } => "cycle_broken",
            Self::UnresolvedCycle { .. } => "unresolved_cycle",
            Self::LostPassage { .. } => "lost_passage",
            Self::DuplicatedPassage { .. } => "duplicated_passage",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompleteMacro { passage, rest } => {
                write!(f, "incomplete macro in '{passage}': {rest}")
            }
            Self::IncompleteLink { passage, rest } => {
                write!(f, "incomplete link in '{passage}': {rest}")
            }
            Self::DuplicatePassage { name } => {
                write!(f, "duplicate passage name: '{name}'")
            }
            Self::UnknownStart { name } => {
                write!(f, "partition start '{name}' is not in the link graph")
            }
            Self::CycleBroken { file, name } => {
                write!(f, "cycle broken at '{name}' while ordering {file}")
            }
            Self::UnresolvedCycle {
                file,
                ordered,
                stuck,
            } => {
                writeln!(f, "unresolved cycle in {file}:")?;
                writeln!(f, "  reachable ({}):", ordered.len())?;
                for name in ordered {
                    writeln!(f, "    '{name}'")?;
                }
                writeln!(f, "  unreachable ({}):", stuck.len())?;
                for (name, waiting_on) in stuck {
                    writeln!(f, "    '{name}' <- {waiting_on:?}")?;
                }
                Ok(())
            }
            Self::LostPassage { name } => {
                write!(f, "passage '{name}' landed in no output file")
            }
            Self::DuplicatedPassage { name, files } => {
                write!(
                    f,
                    "passage '{name}' landed in multiple output files: {}",
                    files.join(", ")
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
