//! Split configuration: classification rules, cycle breakers, and the
//! partition specification, loaded from a TOML file.
//!
//! Everything story-specific lives here as data. A missing config file
//! (or any missing section) degrades to "one unsorted output, no
//! partitions, no breakers".

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::{ClassifyPolicy, ClassifyRule};
use crate::error::SkeinError;

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level split configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Output file for passages no classification rule claims.
    #[serde(default = "default_file")]
    pub default_file: String,

    /// Ordered classification rules; first match wins.
    #[serde(default)]
    pub rules: Vec<ClassifyRule>,

    /// Ordering options.
    #[serde(default)]
    pub ordering: OrderingConfig,

    /// Optional further partitioning of one output file.
    #[serde(default)]
    pub partition: Option<PartitionConfig>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            default_file: default_file(),
            rules: Vec::new(),
            ordering: OrderingConfig::default(),
            partition: None,
        }
    }
}

/// Topological-ordering options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Passage names expected to close intentional cycles, in priority
    /// order. The orderer force-readies the first of these still
    /// blocked when its ready stack runs dry.
    #[serde(default)]
    pub cycle_breakers: Vec<String>,
}

/// Partition specification: one classified output file is carved into
/// bounded subgraphs, each written as its own file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// The classified output file to partition (its own name is not
    /// written; only the group files are).
    pub file: String,

    /// The bounded groups, applied in order.
    #[serde(default)]
    pub groups: Vec<PartitionGroup>,
}

/// One `(output-file, starts, limits)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionGroup {
    /// Output file for this group.
    pub file: String,

    /// Passage names seeding the reachability closure.
    #[serde(default)]
    pub starts: Vec<String>,

    /// Passage names acting as walls: edges into them are cut, and the
    /// traversal never enters them.
    #[serde(default)]
    pub limits: Vec<String>,
}

fn default_file() -> String {
    "unsorted.twee".to_string()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl SplitConfig {
    /// Load a config file.
    ///
    /// # Errors
    ///
    /// Returns [`SkeinError::ConfigRead`] / [`SkeinError::ConfigParse`]
    /// on I/O or TOML failure.
    pub fn load(path: &Path) -> Result<Self, SkeinError> {
        let content = std::fs::read_to_string(path).map_err(|source| SkeinError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SkeinError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The classification policy view over this config.
    #[must_use]
    pub fn policy(&self) -> ClassifyPolicy<'_> {
        ClassifyPolicy {
            rules: &self.rules,
            default_file: &self.default_file,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_unsorted_passthrough() {
        let config = SplitConfig::default();
        assert_eq!(config.default_file, "unsorted.twee");
        assert!(config.rules.is_empty());
        assert!(config.ordering.cycle_breakers.is_empty());
        assert!(config.partition.is_none());
    }

    #[test]
    fn empty_toml_parses_to_default() {
        let config: SplitConfig = toml::from_str("").expect("parse");
        assert_eq!(config, SplitConfig::default());
    }

    #[test]
    fn full_config_round_trip() {
        let text = r#"
default_file = "story.twee"

[[rules]]
file = "metadata.twee"
names = ["StoryTitle", "StoryData"]

[[rules]]
file = "stylesheet.css"
tag = "stylesheet"

[ordering]
cycle_breakers = ["Hub Menu", "Arcade"]

[partition]
file = "story.twee"

[[partition.groups]]
file = "day1.twee"
starts = ["Monday Morning"]
limits = ["Tuesday Morning"]

[[partition.groups]]
file = "day2.twee"
starts = ["Tuesday Morning"]
"#;
        let config: SplitConfig = toml::from_str(text).expect("parse");
        assert_eq!(config.default_file, "story.twee");
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[1].tag.as_deref(), Some("stylesheet"));
        assert_eq!(config.ordering.cycle_breakers, ["Hub Menu", "Arcade"]);

        let partition = config.partition.as_ref().expect("partition");
        assert_eq!(partition.file, "story.twee");
        assert_eq!(partition.groups.len(), 2);
        assert_eq!(partition.groups[0].limits, ["Tuesday Morning"]);
        assert!(partition.groups[1].limits.is_empty());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let err = SplitConfig::load(Path::new("/nonexistent/split.toml"))
            .expect_err("missing file must error");
        assert!(matches!(err, SkeinError::ConfigRead { .. }));
    }

    #[test]
    fn load_reads_a_real_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("split.toml");
        std::fs::write(&path, "default_file = \"all.twee\"\n").expect("write");
        let config = SplitConfig::load(&path).expect("load");
        assert_eq!(config.default_file, "all.twee");
    }

    #[test]
    fn policy_view_uses_rules_and_default() {
        let config: SplitConfig = toml::from_str(
            r#"
[[rules]]
file = "widgets.twee"
tag = "widget"
"#,
        )
        .expect("parse");
        let policy = config.policy();
        assert_eq!(policy.classify("W", &["widget".to_string()]), "widgets.twee");
        assert_eq!(policy.classify("W", &[]), "unsorted.twee");
    }
}
