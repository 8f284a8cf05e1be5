//! Twee container format: passage model, header parsing, corpus splitting.
//!
//! A corpus is a single text document of passages. Each passage starts
//! with a header line:
//!
//! ```text
//! :: Passage Name [tag tag] {"optional": "metadata"}
//! ```
//!
//! Inside the name/tag portion, `\` escapes the next character, so names
//! may contain literal `[`, `]`, `{`, `}`, and `\`. An unescaped `[`
//! switches from name to tags, an unescaped `]` ends the tag block, and
//! an unescaped `{` begins a trailing JSON metadata object that runs to
//! the end of the line.
//!
//! Body lines follow the header until the next header or end of input.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::diagnostics::Diagnostic;
use crate::error::SkeinError;

// ---------------------------------------------------------------------------
// Passage
// ---------------------------------------------------------------------------

/// One named, tagged passage with its body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    /// Unique name within a corpus. Case- and whitespace-sensitive
    /// (surrounding whitespace in the header is trimmed).
    pub name: String,
    /// Deduplicated tags in first-seen order.
    pub tags: Vec<String>,
    /// Optional trailing JSON metadata from the header line.
    pub metadata: Option<Value>,
    /// Body lines, right-trimmed, with trailing blank lines removed.
    pub body: Vec<String>,
}

impl Passage {
    /// Returns `true` if the passage carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

// ---------------------------------------------------------------------------
// Header parsing
// ---------------------------------------------------------------------------

/// Parse a `::` header line into `(name, tags, metadata)`.
///
/// # Errors
///
/// Returns [`SkeinError::Header`] when the line does not start with `::`,
/// when a second unescaped `[` appears inside the tag block, or when a
/// trailing `\` has nothing to escape. Returns [`SkeinError::Metadata`]
/// when the trailing object is not valid JSON.
pub fn parse_header(line: &str) -> Result<(String, Vec<String>, Option<Value>), SkeinError> {
    let Some(rest) = line.strip_prefix("::") else {
        return Err(SkeinError::Header {
            line: line.to_string(),
            details: "header must start with '::'".to_string(),
        });
    };

    let mut name = String::new();
    let mut tags_raw = String::new();
    let mut in_tags = false;
    // Where the trailing JSON object starts, if any.
    let mut tail_start = rest.len();

    let mut chars = rest.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '[' if !in_tags => in_tags = true,
            '[' => {
                return Err(SkeinError::Header {
                    line: line.to_string(),
                    details: "unexpected '[' inside tag block".to_string(),
                });
            }
            ']' => {
                tail_start = idx + 1;
                break;
            }
            '{' => {
                tail_start = idx;
                break;
            }
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    return Err(SkeinError::Header {
                        line: line.to_string(),
                        details: "trailing '\\' escapes nothing".to_string(),
                    });
                };
                if in_tags {
                    tags_raw.push(escaped);
                } else {
                    name.push(escaped);
                }
            }
            _ => {
                if in_tags {
                    tags_raw.push(ch);
                } else {
                    name.push(ch);
                }
            }
        }
    }

    let metadata = if tail_start < rest.len() {
        let tail = &rest[tail_start..];
        if tail.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(tail).map_err(|source| SkeinError::Metadata {
                    line: line.to_string(),
                    source,
                })?,
            )
        }
    } else {
        None
    };

    let mut tags: Vec<String> = Vec::new();
    for tag in tags_raw.split_whitespace() {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    Ok((name.trim().to_string(), tags, metadata))
}

/// Backslash-escape the characters that are structural in header lines.
#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '[' | ']' | '{' | '}') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Corpus splitting
// ---------------------------------------------------------------------------

/// Split a whole corpus document into passages keyed by name, in source
/// order.
///
/// Lines are right-trimmed. Text before the first header is ignored.
/// Trailing blank lines are removed from each body. A repeated passage
/// name is reported as [`Diagnostic::DuplicatePassage`]; the later
/// definition wins (at the original position).
///
/// # Errors
///
/// Propagates header and metadata parse failures.
pub fn parse_corpus(
    text: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<IndexMap<String, Passage>, SkeinError> {
    fn finish(
        mut passage: Passage,
        passages: &mut IndexMap<String, Passage>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        while passage.body.last().is_some_and(|l| l.is_empty()) {
            passage.body.pop();
        }
        if passages.contains_key(&passage.name) {
            warn!(name = %passage.name, "duplicate passage name; later definition wins");
            diagnostics.push(Diagnostic::DuplicatePassage {
                name: passage.name.clone(),
            });
        }
        passages.insert(passage.name.clone(), passage);
    }

    let mut passages: IndexMap<String, Passage> = IndexMap::new();
    let mut current: Option<Passage> = None;

    for raw in text.lines() {
        let line = raw.trim_end();
        if line.starts_with("::") {
            if let Some(done) = current.take() {
                finish(done, &mut passages, diagnostics);
            }
            let (name, tags, metadata) = parse_header(line)?;
            current = Some(Passage {
                name,
                tags,
                metadata,
                body: Vec::new(),
            });
        } else if let Some(passage) = current.as_mut() {
            passage.body.push(line.to_string());
        }
    }
    if let Some(done) = current.take() {
        finish(done, &mut passages, diagnostics);
    }

    Ok(passages)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
