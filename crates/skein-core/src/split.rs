//! The split pipeline: classify → graph → partition → order → account.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::SplitConfig;
use crate::diagnostics::Diagnostic;
use crate::error::SkeinError;
use crate::graph::{build_link_graph, order, subgraph};
use crate::passage::Passage;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The result of splitting a corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutput {
    /// Ordered passage names per output file, in production order.
    pub files: IndexMap<String, Vec<String>>,
    /// Everything recoverable that went wrong along the way.
    pub diagnostics: Vec<Diagnostic>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Split a corpus into ordered output files per `config`.
///
/// 1. Classify every passage into an output file (corpus order is
///    preserved within each file).
/// 2. The configured partition file, if any, is carved into bounded
///    subgraphs — one output file per partition group — each ordered
///    topologically. The partition file itself is not emitted.
/// 3. Every other `.twee` file is ordered topologically over its own
///    link graph; non-Twee files (scripts, stylesheets) keep corpus
///    order.
/// 4. Accounting: every source passage must land in exactly one output
///    file; violations become [`Diagnostic::LostPassage`] /
///    [`Diagnostic::DuplicatedPassage`] and the run still completes.
///
/// # Errors
///
/// Propagates fatal macro-shape contract violations from extraction.
pub fn split_corpus(
    passages: &IndexMap<String, Passage>,
    config: &SplitConfig,
) -> Result<SplitOutput, SkeinError> {
    let mut diagnostics = Vec::new();
    let policy = config.policy();
    let breakers = &config.ordering.cycle_breakers;

    // Classify, preserving corpus order within each file.
    let mut grouped: IndexMap<String, IndexMap<String, Passage>> = IndexMap::new();
    for (name, passage) in passages {
        let file = policy.classify(name, &passage.tags).to_string();
        grouped
            .entry(file)
            .or_default()
            .insert(name.clone(), passage.clone());
    }

    let mut files: IndexMap<String, Vec<String>> = IndexMap::new();
    for (file, group) in &grouped {
        let partitioned = config
            .partition
            .as_ref()
            .filter(|partition| &partition.file == file);

        if let Some(partition) = partitioned {
            // Build the link graph once; every group carves from it.
            let graph = build_link_graph(group, &mut diagnostics)?;
            debug!(file = %file, groups = partition.groups.len(), "partitioning");
            for rule in &partition.groups {
                let sub = subgraph(&graph, &rule.starts, &rule.limits, &mut diagnostics);
                let ordered = order(&sub, breakers, &rule.file, &mut diagnostics);
                files.insert(rule.file.clone(), ordered);
            }
        } else if file.ends_with(".twee") {
            let graph = build_link_graph(group, &mut diagnostics)?;
            let ordered = order(&graph, breakers, file, &mut diagnostics);
            files.insert(file.clone(), ordered);
        } else {
            // Scripts and stylesheets have no link semantics.
            files.insert(file.clone(), group.keys().cloned().collect());
        }
    }

    account(passages, &files, &mut diagnostics);

    Ok(SplitOutput { files, diagnostics })
}

/// Check that every source passage landed in exactly one output file.
fn account(
    passages: &IndexMap<String, Passage>,
    files: &IndexMap<String, Vec<String>>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut placement: IndexMap<&str, Vec<&str>> = passages
        .keys()
        .map(|name| (name.as_str(), Vec::new()))
        .collect();
    for (file, names) in files {
        for name in names {
            if let Some(seen_in) = placement.get_mut(name.as_str()) {
                seen_in.push(file.as_str());
            }
        }
    }

    let mut lost: Vec<&str> = placement
        .iter()
        .filter(|(_, seen_in)| seen_in.is_empty())
        .map(|(name, _)| *name)
        .collect();
    lost.sort_unstable();
    for name in lost {
        warn!(passage = name, "passage landed in no output file");
        diagnostics.push(Diagnostic::LostPassage {
            name: name.to_string(),
        });
    }

    let mut duplicated: Vec<(&str, &Vec<&str>)> = placement
        .iter()
        .filter(|(_, seen_in)| seen_in.len() > 1)
        .map(|(name, seen_in)| (*name, seen_in))
        .collect();
    duplicated.sort_unstable_by_key(|(name, _)| *name);
    for (name, seen_in) in duplicated {
        let mut seen_in: Vec<String> = seen_in.iter().map(|f| (*f).to_string()).collect();
        seen_in.sort_unstable();
        warn!(passage = name, files = ?seen_in, "passage landed in multiple output files");
        diagnostics.push(Diagnostic::DuplicatedPassage {
            name: name.to_string(),
            files: seen_in,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassifyRule;
    use crate::config::{PartitionConfig, PartitionGroup};

    fn passage(name: &str, tags: &[&str], body: &[&str]) -> (String, Passage) {
        (
            name.to_string(),
            Passage {
                name: name.to_string(),
                tags: tags.iter().map(|t| (*t).to_string()).collect(),
                metadata: None,
                body: body.iter().map(|l| (*l).to_string()).collect(),
            },
        )
    }

    fn names_rule(file: &str, names: &[&str]) -> ClassifyRule {
        ClassifyRule {
            file: file.to_string(),
            names: names.iter().map(|n| (*n).to_string()).collect(),
            name_prefix: None,
            name_suffix: None,
            tag: None,
        }
    }

    fn tag_rule(file: &str, tag: &str) -> ClassifyRule {
        ClassifyRule {
            file: file.to_string(),
            names: Vec::new(),
            name_prefix: None,
            name_suffix: None,
            tag: Some(tag.to_string()),
        }
    }

    #[test]
    fn default_config_single_ordered_file() {
        let passages: IndexMap<String, Passage> = [
            passage("Start", &[], &["[[Middle]]"]),
            passage("Middle", &[], &["[[End]]"]),
            passage("End", &[], &[]),
        ]
        .into_iter()
        .collect();

        let out = split_corpus(&passages, &SplitConfig::default()).expect("split");
        assert_eq!(out.files.len(), 1);
        assert_eq!(out.files["unsorted.twee"], ["Start", "Middle", "End"]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn classification_routes_by_tag_and_name() {
        let passages: IndexMap<String, Passage> = [
            passage("StoryTitle", &[], &["My Story"]),
            passage("styles", &["stylesheet"], &["body {}"]),
            passage("Start", &[], &[]),
        ]
        .into_iter()
        .collect();

        let config = SplitConfig {
            rules: vec![
                names_rule("metadata.twee", &["StoryTitle"]),
                tag_rule("stylesheet.css", "stylesheet"),
            ],
            ..SplitConfig::default()
        };

        let out = split_corpus(&passages, &config).expect("split");
        assert_eq!(out.files["metadata.twee"], ["StoryTitle"]);
        assert_eq!(out.files["stylesheet.css"], ["styles"]);
        assert_eq!(out.files["unsorted.twee"], ["Start"]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn non_twee_files_keep_corpus_order() {
        // Two scripts that "link" to each other textually; no ordering
        // applies because scripts have no link semantics.
        let passages: IndexMap<String, Passage> = [
            passage("b-script", &["script"], &["[[a-script]]"]),
            passage("a-script", &["script"], &[]),
        ]
        .into_iter()
        .collect();

        let config = SplitConfig {
            rules: vec![tag_rule("scripts.js", "script")],
            ..SplitConfig::default()
        };

        let out = split_corpus(&passages, &config).expect("split");
        assert_eq!(out.files["scripts.js"], ["b-script", "a-script"]);
    }

    #[test]
    fn partition_carves_bounded_groups() {
        let passages: IndexMap<String, Passage> = [
            passage("Intro", &[], &["[[Day One]]"]),
            passage("Day One", &[], &["[[Sleep]]"]),
            passage("Sleep", &[], &["[[Day Two]]"]),
            passage("Day Two", &[], &[]),
        ]
        .into_iter()
        .collect();

        let config = SplitConfig {
            partition: Some(PartitionConfig {
                file: "unsorted.twee".to_string(),
                groups: vec![
                    PartitionGroup {
                        file: "day1.twee".to_string(),
                        starts: vec!["Intro".to_string()],
                        limits: vec!["Day Two".to_string()],
                    },
                    PartitionGroup {
                        file: "day2.twee".to_string(),
                        starts: vec!["Day Two".to_string()],
                        limits: vec![],
                    },
                ],
            }),
            ..SplitConfig::default()
        };

        let out = split_corpus(&passages, &config).expect("split");
        assert_eq!(out.files["day1.twee"], ["Intro", "Day One", "Sleep"]);
        assert_eq!(out.files["day2.twee"], ["Day Two"]);
        assert!(!out.files.contains_key("unsorted.twee"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn passage_missed_by_every_partition_group_is_lost() {
        let passages: IndexMap<String, Passage> = [
            passage("Start", &[], &[]),
            passage("Orphan", &[], &[]),
        ]
        .into_iter()
        .collect();

        let config = SplitConfig {
            partition: Some(PartitionConfig {
                file: "unsorted.twee".to_string(),
                groups: vec![PartitionGroup {
                    file: "main.twee".to_string(),
                    starts: vec!["Start".to_string()],
                    limits: vec![],
                }],
            }),
            ..SplitConfig::default()
        };

        let out = split_corpus(&passages, &config).expect("split");
        assert_eq!(out.files["main.twee"], ["Start"]);
        assert!(out.diagnostics.contains(&Diagnostic::LostPassage {
            name: "Orphan".to_string()
        }));
    }

    #[test]
    fn overlapping_partition_groups_report_duplicates() {
        let passages: IndexMap<String, Passage> = [
            passage("A", &[], &["[[Shared]]"]),
            passage("B", &[], &["[[Shared]]"]),
            passage("Shared", &[], &[]),
        ]
        .into_iter()
        .collect();

        let config = SplitConfig {
            partition: Some(PartitionConfig {
                file: "unsorted.twee".to_string(),
                groups: vec![
                    PartitionGroup {
                        file: "a.twee".to_string(),
                        starts: vec!["A".to_string()],
                        limits: vec![],
                    },
                    PartitionGroup {
                        file: "b.twee".to_string(),
                        starts: vec!["B".to_string()],
                        limits: vec![],
                    },
                ],
            }),
            ..SplitConfig::default()
        };

        let out = split_corpus(&passages, &config).expect("split");
        assert!(out.diagnostics.contains(&Diagnostic::DuplicatedPassage {
            name: "Shared".to_string(),
            files: vec!["a.twee".to_string(), "b.twee".to_string()],
        }));
    }

    #[test]
    fn cycle_breakers_flow_into_partition_ordering() {
        let passages: IndexMap<String, Passage> = [
            passage("Hub", &[], &["[[Room]]"]),
            passage("Room", &[], &["[[Hub]]"]),
        ]
        .into_iter()
        .collect();

        let mut config = SplitConfig::default();
        config.ordering.cycle_breakers = vec!["Hub".to_string()];

        let out = split_corpus(&passages, &config).expect("split");
        assert_eq!(out.files["unsorted.twee"], ["Hub", "Room"]);
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::CycleBroken {
                file: "unsorted.twee".to_string(),
                name: "Hub".to_string(),
            }]
        );
    }

    #[test]
    fn fatal_extraction_error_aborts_the_run() {
        let passages: IndexMap<String, Passage> =
            [passage("Bad", &[], &["<<display unquoted>>"])]
                .into_iter()
                .collect();
        assert!(split_corpus(&passages, &SplitConfig::default()).is_err());
    }

    #[test]
    fn identical_inputs_produce_identical_outputs() {
        let passages: IndexMap<String, Passage> = [
            passage("S", &[], &["[[B]] [[A]]"]),
            passage("A", &[], &["[[E]]"]),
            passage("B", &[], &["[[E]]"]),
            passage("E", &[], &[]),
        ]
        .into_iter()
        .collect();

        let first = split_corpus(&passages, &SplitConfig::default()).expect("split");
        for _ in 0..5 {
            let again = split_corpus(&passages, &SplitConfig::default()).expect("split");
            assert_eq!(again, first);
        }
    }
}
