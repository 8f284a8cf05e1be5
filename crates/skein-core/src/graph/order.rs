//! Topological ordering with explicit, named cycle-breaking.
//!
//! Story graphs are not DAGs: a handful of intentional back-references
//! ("return to the hub") would block any total order. Rather than
//! silently accepting an arbitrary order or failing the run, the orderer
//! takes a configuration-supplied priority list of names expected to
//! close cycles and force-readies the first one found when the ready
//! stack runs dry. Only a genuinely unexpected cycle falls through to a
//! lexicographic dump, surfaced as a diagnostic for human review.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use crate::diagnostics::Diagnostic;
use crate::graph::LinkGraph;

/// Order the keys of `graph` so that, wherever satisfiable, every link
/// `A → B` places `A` before `B`.
///
/// Kahn-style with a deterministic tie-break:
///
/// 1. Build the reverse graph (ordered incoming-source set per node).
/// 2. Seed a ready stack with zero-incoming nodes in original relative
///    order, reversed — so among simultaneously-ready nodes the most
///    recently readied is emitted next (LIFO).
/// 3. Pop, emit, and relax the popped node's outgoing edges in reverse
///    insertion order; targets whose incoming set empties are pushed.
/// 4. When the stack empties with nodes remaining, force-ready the first
///    `cycle_breakers` entry still remaining, discarding its incoming
///    bookkeeping and recording [`Diagnostic::CycleBroken`]; with no
///    breaker applicable, stop.
/// 5. Any remainder is appended in lexicographic order and reported as
///    [`Diagnostic::UnresolvedCycle`] under `file`.
///
/// The output is always a permutation of the graph's keys.
#[must_use]
pub fn order(
    graph: &LinkGraph,
    cycle_breakers: &[String],
    file: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<String> {
    // Reverse graph: incoming link sources per node.
    let mut incoming: IndexMap<String, IndexSet<String>> = graph
        .keys()
        .map(|name| (name.clone(), IndexSet::new()))
        .collect();
    for (name, links) in graph {
        for link in links {
            if let Some(sources) = incoming.get_mut(link) {
                sources.insert(name.clone());
            }
        }
    }

    // Ready stack: zero-incoming nodes, first original node on top.
    let mut ready: Vec<String> = incoming
        .iter()
        .filter(|(_, sources)| sources.is_empty())
        .map(|(name, _)| name.clone())
        .collect();
    ready.reverse();
    for name in &ready {
        incoming.shift_remove(name);
    }

    let mut ordered: Vec<String> = Vec::with_capacity(graph.len());
    loop {
        let name = match ready.pop() {
            Some(name) => name,
            None => {
                let Some(breaker) = cycle_breakers
                    .iter()
                    .find(|name| incoming.contains_key(name.as_str()))
                else {
                    break;
                };
                debug!(breaker = %breaker, "forcing cycle breaker ready");
                incoming.shift_remove(breaker.as_str());
                diagnostics.push(Diagnostic::CycleBroken {
                    file: file.to_string(),
                    name: breaker.clone(),
                });
                breaker.clone()
            }
        };

        // Relax outgoing edges of the emitted node.
        if let Some(links) = graph.get(&name) {
            for link in links.iter().rev() {
                if let Some(waiting_on) = incoming.get_mut(link) {
                    waiting_on.shift_remove(&name);
                    if waiting_on.is_empty() {
                        incoming.shift_remove(link);
                        ready.push(link.clone());
                    }
                }
            }
        }
        ordered.push(name);
    }

    if !incoming.is_empty() {
        let stuck: Vec<(String, Vec<String>)> = incoming
            .iter()
            .map(|(name, sources)| (name.clone(), sources.iter().cloned().collect()))
            .collect();
        warn!(
            file,
            reachable = ordered.len(),
            unreachable = stuck.len(),
            "ordering left unresolved cycles"
        );
        diagnostics.push(Diagnostic::UnresolvedCycle {
            file: file.to_string(),
            ordered: ordered.clone(),
            stuck,
        });

        let mut leftovers: Vec<String> = incoming.keys().cloned().collect();
        leftovers.sort_unstable();
        ordered.extend(leftovers);
    }

    ordered
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
