//! Classification policy: which output file does a passage belong to?
//!
//! The policy is pure data — an ordered rule table loaded from config —
//! so the core stays corpus-agnostic. A rule matches when *all* of its
//! present criteria hold; alternatives are expressed as multiple rules
//! targeting the same file. The first matching rule wins; passages
//! matching no rule go to the configured default file.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// One classification rule. All present criteria must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyRule {
    /// Output file this rule assigns matching passages to.
    pub file: String,

    /// Exact-name alternatives: matches when the passage name is any of
    /// these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,

    /// Matches when the passage name starts with this prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,

    /// Matches when the passage name ends with this suffix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_suffix: Option<String>,

    /// Matches when the passage carries this tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl ClassifyRule {
    /// Returns `true` if this rule matches the passage. A rule with no
    /// criteria matches nothing.
    #[must_use]
    pub fn matches(&self, name: &str, tags: &[String]) -> bool {
        let has_criteria = !self.names.is_empty()
            || self.name_prefix.is_some()
            || self.name_suffix.is_some()
            || self.tag.is_some();
        if !has_criteria {
            return false;
        }
        if !self.names.is_empty() && !self.names.iter().any(|n| n == name) {
            return false;
        }
        if let Some(prefix) = &self.name_prefix {
            if !name.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(suffix) = &self.name_suffix {
            if !name.ends_with(suffix.as_str()) {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// The full classification policy: ordered rules plus a default file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyPolicy<'a> {
    /// Rules tried in order; first match wins.
    pub rules: &'a [ClassifyRule],
    /// File for passages no rule claims.
    pub default_file: &'a str,
}

impl ClassifyPolicy<'_> {
    /// Classify a passage into an output file name.
    #[must_use]
    pub fn classify(&self, name: &str, tags: &[String]) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(name, tags))
            .map_or(self.default_file, |rule| rule.file.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
