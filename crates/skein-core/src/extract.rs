//! Link extraction from passage bodies.
//!
//! Passage bodies embed two link-bearing constructs:
//!
//! - bracketed links: `[[Target]]` or `[[Label|Target]]`
//! - macros: `<<display "Target">>`, `<<click "Target">>`,
//!   `<<click [[Label|Target]]>>`, `<<click "Label" "Target">>`
//!
//! # Span scanning
//!
//! Both macro and link spans are found with first-marker-wins,
//! non-nesting scans: the first end marker after an open marker
//! terminates the span, even if the marker text occurs inside a quoted
//! argument. This matches a known limitation of the source format and is
//! preserved deliberately — "fixing" it would change which links some
//! corpora produce. An open marker with no end marker is reported as a
//! diagnostic and truncates scanning of that body.
//!
//! # Contract violations
//!
//! A `display` or `click` macro with the wrong argument shape is a fatal
//! [`SkeinError::MacroShape`]: the corpus is assumed well-formed here,
//! and guessing a target would silently corrupt the link graph.

use tracing::warn;

use crate::diagnostics::Diagnostic;
use crate::error::SkeinError;

/// Macro span open marker.
pub const MACRO_OPEN: &str = "<<";
/// Macro span end marker.
pub const MACRO_CLOSE: &str = ">>";
/// Link span open marker.
pub const LINK_OPEN: &str = "[[";
/// Link span end marker.
pub const LINK_CLOSE: &str = "]]";

// ---------------------------------------------------------------------------
// Segment scanning
// ---------------------------------------------------------------------------

/// One span of passage body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Plain text between macro spans.
    Text(&'a str),
    /// A complete `<<...>>` macro span, markers included.
    Macro(&'a str),
}

/// Lazy iterator over the macro/text segments of a body blob.
///
/// Stops at an unterminated macro span; the remainder is then available
/// from [`Segments::unterminated`].
#[derive(Debug)]
pub struct Segments<'a> {
    text: &'a str,
    pos: usize,
    unterminated: Option<&'a str>,
}

impl<'a> Segments<'a> {
    /// Create a segment scanner over `text`.
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            unterminated: None,
        }
    }

    /// The unterminated macro remainder, if scanning was truncated.
    #[must_use]
    pub const fn unterminated(&self) -> Option<&'a str> {
        self.unterminated
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() || self.unterminated.is_some() {
            return None;
        }
        let rest = &self.text[self.pos..];
        match rest.find(MACRO_OPEN) {
            None => {
                self.pos = self.text.len();
                Some(Segment::Text(rest))
            }
            Some(0) => match rest.find(MACRO_CLOSE) {
                Some(end) => {
                    let span = &rest[..end + MACRO_CLOSE.len()];
                    self.pos += span.len();
                    Some(Segment::Macro(span))
                }
                None => {
                    self.unterminated = Some(rest);
                    None
                }
            },
            Some(start) => {
                self.pos += start;
                Some(Segment::Text(&rest[..start]))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bracketed links
// ---------------------------------------------------------------------------

/// Scan plain text for `[[...]]` spans and push each target onto `out`.
///
/// A pipe splits label from target: only text after the *first* pipe is
/// the target. An unterminated span is reported and stops the scan.
fn links_in_text(
    text: &str,
    passage: &str,
    out: &mut Vec<String>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut pos = 0;
    while let Some(start) = text[pos..].find(LINK_OPEN) {
        let start = pos + start;
        let Some(end) = text[start..].find(LINK_CLOSE) else {
            warn!(passage, rest = &text[start..], "incomplete link span");
            diagnostics.push(Diagnostic::IncompleteLink {
                passage: passage.to_string(),
                rest: text[start..].to_string(),
            });
            return;
        };
        let end = start + end;
        let link = &text[start + LINK_OPEN.len()..end];
        let target = link.find('|').map_or(link, |sep| &link[sep + 1..]);
        out.push(target.to_string());
        pos = end + LINK_CLOSE.len();
    }
}

// ---------------------------------------------------------------------------
// Macro arguments
// ---------------------------------------------------------------------------

/// Tokenize the inside of a macro span.
///
/// Tokens are split on whitespace, except that a double-quoted run is
/// one token (quotes kept) and a `[[...]]` span with no interior `]` is
/// one token. Characters that cannot start a token (`"` with no closing
/// quote, a stray `[`) are skipped.
fn macro_tokens(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
        } else if c == b'"' {
            match inner[i + 1..].find('"') {
                Some(close) => {
                    let end = i + 1 + close + 1;
                    tokens.push(&inner[i..end]);
                    i = end;
                }
                None => i += 1,
            }
        } else if c == b'[' {
            // Only a full [[...]] span (no interior ']') forms a token.
            let span_end = inner[i..]
                .strip_prefix(LINK_OPEN)
                .and_then(|rest| rest.find(']').map(|j| (rest, j)))
                .filter(|(rest, j)| rest[*j..].starts_with(LINK_CLOSE))
                .map(|(_, j)| i + LINK_OPEN.len() + j + LINK_CLOSE.len());
            match span_end {
                Some(end) => {
                    tokens.push(&inner[i..end]);
                    i = end;
                }
                None => i += 1,
            }
        } else {
            let start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && bytes[i] != b'"'
                && bytes[i] != b'['
            {
                i += 1;
            }
            tokens.push(&inner[start..i]);
        }
    }
    tokens
}

/// Strip surrounding double quotes, or `None` if the token is not a
/// quoted string.
fn unquote(token: &str) -> Option<&str> {
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .filter(|_| token.len() >= 2)
}

/// Extract link targets from one complete macro span.
///
/// Only `display` and `click` carry link semantics; every other macro
/// contributes nothing.
///
/// # Errors
///
/// Returns [`SkeinError::MacroShape`] for a `display`/`click` with the
/// wrong argument count or an unquoted target.
fn links_in_macro(
    span: &str,
    passage: &str,
    out: &mut Vec<String>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), SkeinError> {
    let inner = span
        .strip_prefix(MACRO_OPEN)
        .and_then(|s| s.strip_suffix(MACRO_CLOSE))
        .unwrap_or(span);
    let tokens = macro_tokens(inner);
    let Some((&name, args)) = tokens.split_first() else {
        return Ok(());
    };

    let shape_error = |details: &str| SkeinError::MacroShape {
        name: name.to_string(),
        details: details.to_string(),
        passage: passage.to_string(),
    };

    match name {
        "display" => {
            let first = args
                .first()
                .ok_or_else(|| shape_error("expected a quoted passage name argument"))?;
            let target = unquote(first)
                .ok_or_else(|| shape_error("first argument must be a quoted string"))?;
            out.push(target.to_string());
        }
        "click" => {
            let first = args
                .first()
                .ok_or_else(|| shape_error("expected at least one argument"))?;
            if first.starts_with('[') {
                links_in_text(first, passage, out, diagnostics);
            } else {
                let link = match args.len() {
                    1 => args[0],
                    2 => args[1],
                    n => return Err(shape_error(&format!("unexpected arity {n}"))),
                };
                let target = unquote(link)
                    .ok_or_else(|| shape_error("link target must be a quoted string"))?;
                out.push(target.to_string());
            }
        }
        _ => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Body scanning
// ---------------------------------------------------------------------------

/// Extract every referenced passage name from a body, in occurrence
/// order. Duplicates are kept; the graph builder deduplicates.
///
/// # Errors
///
/// Returns [`SkeinError::MacroShape`] when a link-bearing macro violates
/// its argument contract.
pub fn scan_links(
    passage: &str,
    body: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<String>, SkeinError> {
    let blob = body.join("\n");
    let mut out = Vec::new();

    let mut segments = Segments::new(&blob);
    for segment in segments.by_ref() {
        match segment {
            Segment::Macro(span) => links_in_macro(span, passage, &mut out, diagnostics)?,
            Segment::Text(text) => links_in_text(text, passage, &mut out, diagnostics),
        }
    }
    if let Some(rest) = segments.unterminated() {
        warn!(passage, rest, "incomplete macro span");
        diagnostics.push(Diagnostic::IncompleteMacro {
            passage: passage.to_string(),
            rest: rest.to_string(),
        });
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
