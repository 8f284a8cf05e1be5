//! Link graph construction from a passage map.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::diagnostics::Diagnostic;
use crate::error::SkeinError;
use crate::extract::scan_links;
use crate::passage::Passage;

/// Directed link graph: passage name → ordered set of unique outgoing
/// targets, in first-seen order.
pub type LinkGraph = IndexMap<String, IndexSet<String>>;

/// Build the link graph for a passage map.
///
/// Runs the link extractor over every body, deduplicates targets while
/// preserving first-seen order, and drops any target that is not a key
/// of `passages` — links to passages outside this set are not
/// representable and are discarded silently.
///
/// # Errors
///
/// Propagates fatal [`SkeinError::MacroShape`] contract violations.
pub fn build_link_graph(
    passages: &IndexMap<String, Passage>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<LinkGraph, SkeinError> {
    let mut graph = LinkGraph::with_capacity(passages.len());
    for (name, passage) in passages {
        let mut targets = IndexSet::new();
        for target in scan_links(name, &passage.body, diagnostics)? {
            if passages.contains_key(&target) {
                targets.insert(target);
            }
        }
        debug!(passage = %name, out = targets.len(), "linked");
        graph.insert(name.clone(), targets);
    }
    Ok(graph)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
