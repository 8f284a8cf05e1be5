//! Cycle detection over the link graph.
//!
//! The orderer breaks cycles only at configured names; this module is
//! the discovery side — it reports every strongly connected component
//! so a corpus owner can decide which passage to name as a breaker.

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::LinkGraph;

/// Find all cycles in the link graph.
///
/// Each entry is a sorted list of passage names forming one strongly
/// connected component. Self-loops are reported as one-element cycles.
/// Output is sorted for determinism.
#[must_use]
pub fn find_all_cycles(graph: &LinkGraph) -> Vec<Vec<String>> {
    let mut pg: DiGraph<&str, ()> = DiGraph::new();
    let indices: IndexMap<&str, NodeIndex> = graph
        .keys()
        .map(|name| (name.as_str(), pg.add_node(name.as_str())))
        .collect();
    for (name, links) in graph {
        for link in links {
            if let (Some(&from), Some(&to)) =
                (indices.get(name.as_str()), indices.get(link.as_str()))
            {
                pg.add_edge(from, to, ());
            }
        }
    }

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&pg)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&node| pg.find_edge(node, node).is_some())
        })
        .map(|component| {
            let mut names: Vec<String> = component
                .into_iter()
                .map(|idx| pg[idx].to_string())
                .collect();
            names.sort_unstable();
            names
        })
        .collect();

    cycles.sort_unstable();
    cycles
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
