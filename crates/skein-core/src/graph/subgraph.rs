//! Bounded reachable-subgraph selection.

use indexmap::IndexSet;
use tracing::warn;

use crate::diagnostics::Diagnostic;
use crate::graph::LinkGraph;

/// Carve the subgraph reachable from `starts`, bounded by `limits`.
///
/// Closure traversal over a pending-work ordered map: `starts` seed the
/// frontier; each node's outgoing links are filtered to drop any target
/// in `limits`, so limit nodes act as walls — edges *into* them are cut
/// and the traversal never enters them. A limit that is itself a start
/// still appears, with its own limit-filtered edges.
///
/// The result covers exactly the discovered node set, in discovery
/// order, with the limit-filtered edge sets. The input graph is never
/// mutated. Discovery order is deterministic for identical inputs.
///
/// A start name missing from `graph` is skipped and reported as
/// [`Diagnostic::UnknownStart`].
#[must_use]
pub fn subgraph(
    graph: &LinkGraph,
    starts: &[String],
    limits: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> LinkGraph {
    let limit_set: IndexSet<&str> = limits.iter().map(String::as_str).collect();
    let filter = |links: &IndexSet<String>| -> IndexSet<String> {
        links
            .iter()
            .filter(|link| !limit_set.contains(link.as_str()))
            .cloned()
            .collect()
    };

    let mut pending = LinkGraph::new();
    for name in starts {
        if let Some(links) = graph.get(name) {
            pending.insert(name.clone(), filter(links));
        } else {
            warn!(start = %name, "subgraph start is not in the link graph");
            diagnostics.push(Diagnostic::UnknownStart { name: name.clone() });
        }
    }

    let mut reached = LinkGraph::new();
    while let Some((name, links)) = pending.shift_remove_index(0) {
        for link in &links {
            if !reached.contains_key(link) && link != &name {
                if let Some(out) = graph.get(link) {
                    pending.insert(link.clone(), filter(out));
                }
            }
        }
        reached.insert(name, links);
    }
    reached
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> LinkGraph {
        edges
            .iter()
            .map(|(name, links)| {
                (
                    (*name).to_string(),
                    links.iter().map(|l| (*l).to_string()).collect(),
                )
            })
            .collect()
    }

    fn names(g: &LinkGraph) -> Vec<&str> {
        g.keys().map(String::as_str).collect()
    }

    fn targets<'a>(g: &'a LinkGraph, name: &str) -> Vec<&'a str> {
        g[name].iter().map(String::as_str).collect()
    }

    #[test]
    fn limits_act_as_walls() {
        // S -> {M, X}, M -> E, X -> E; limit X.
        let g = graph(&[
            ("S", &["M", "X"]),
            ("M", &["E"]),
            ("X", &["E"]),
            ("E", &[]),
        ]);
        let mut diags = Vec::new();
        let sub = subgraph(&g, &["S".into()], &["X".into()], &mut diags);

        assert_eq!(names(&sub), ["S", "M", "E"]);
        assert_eq!(targets(&sub, "S"), ["M"], "edge to the limit is cut");
        assert!(diags.is_empty());
    }

    #[test]
    fn no_limits_reproduces_reachable_graph() {
        let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]);
        let mut diags = Vec::new();
        let sub = subgraph(&g, &["A".into()], &[], &mut diags);
        assert_eq!(sub, g);
    }

    #[test]
    fn all_starts_no_limits_is_identity() {
        let g = graph(&[("A", &["B"]), ("B", &[]), ("Z", &["A"])]);
        let starts: Vec<String> = g.keys().cloned().collect();
        let mut diags = Vec::new();
        let sub = subgraph(&g, &starts, &[], &mut diags);
        assert_eq!(sub, g);
    }

    #[test]
    fn disconnected_nodes_not_discovered() {
        let g = graph(&[("A", &["B"]), ("B", &[]), ("Island", &[])]);
        let mut diags = Vec::new();
        let sub = subgraph(&g, &["A".into()], &[], &mut diags);
        assert!(!sub.contains_key("Island"));
    }

    #[test]
    fn limit_used_as_start_keeps_its_filtered_edges() {
        let g = graph(&[("X", &["A", "Y"]), ("A", &[]), ("Y", &[])]);
        let mut diags = Vec::new();
        let sub = subgraph(&g, &["X".into()], &["X".into(), "Y".into()], &mut diags);
        // X itself is a start, so it is in the set, with Y filtered out.
        assert_eq!(names(&sub), ["X", "A"]);
        assert_eq!(targets(&sub, "X"), ["A"]);
    }

    #[test]
    fn cycles_terminate() {
        let g = graph(&[("A", &["B"]), ("B", &["A"])]);
        let mut diags = Vec::new();
        let sub = subgraph(&g, &["A".into()], &[], &mut diags);
        assert_eq!(names(&sub), ["A", "B"]);
    }

    #[test]
    fn unknown_start_is_reported_and_skipped() {
        let g = graph(&[("A", &[])]);
        let mut diags = Vec::new();
        let sub = subgraph(&g, &["Missing".into(), "A".into()], &[], &mut diags);
        assert_eq!(names(&sub), ["A"]);
        assert_eq!(
            diags,
            vec![Diagnostic::UnknownStart {
                name: "Missing".into()
            }]
        );
    }

    #[test]
    fn discovery_order_is_breadth_first_by_insertion() {
        let g = graph(&[
            ("S", &["B", "A"]),
            ("A", &["C"]),
            ("B", &["D"]),
            ("C", &[]),
            ("D", &[]),
        ]);
        let mut diags = Vec::new();
        let sub = subgraph(&g, &["S".into()], &[], &mut diags);
        assert_eq!(names(&sub), ["S", "B", "A", "D", "C"]);
    }

    #[test]
    fn input_graph_is_not_mutated() {
        let g = graph(&[("S", &["X"]), ("X", &["S"])]);
        let before = g.clone();
        let mut diags = Vec::new();
        let _ = subgraph(&g, &["S".into()], &["X".into()], &mut diags);
        assert_eq!(g, before);
    }
}
