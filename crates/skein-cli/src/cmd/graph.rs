//! `skein graph` — link-graph inspection.
//!
//! - `skein graph <input>`                  — corpus summary with cycle report
//! - `skein graph <input> --links <name>`   — one passage's outgoing links
//!
//! The cycle report marks each strongly connected component as covered
//! when a configured cycle breaker sits inside it, so a corpus owner
//! can see which intentional back-references still need a breaker
//! before `split` falls back to a lexicographic dump.

use std::fs;
use std::io::Write as IoWrite;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::json;

use skein_core::graph::{build_link_graph, find_all_cycles};
use skein_core::{SplitConfig, parse_corpus};

use crate::output::{CliError, OutputMode, render, render_error};

/// Arguments for `skein graph`.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Input corpus file.
    pub input: PathBuf,

    /// Split configuration; supplies the cycle breakers the report
    /// checks coverage against.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show the outgoing links of one passage instead of the summary.
    #[arg(long, value_name = "PASSAGE")]
    pub links: Option<String>,
}

pub fn run_graph(args: &GraphArgs, output: OutputMode) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading corpus {}", args.input.display()))?;
    let config = match &args.config {
        Some(path) => SplitConfig::load(path)?,
        None => SplitConfig::default(),
    };

    let mut diagnostics = Vec::new();
    let passages = parse_corpus(&text, &mut diagnostics)?;
    let graph = build_link_graph(&passages, &mut diagnostics)?;

    if let Some(name) = &args.links {
        let Some(links) = graph.get(name.as_str()) else {
            render_error(
                output,
                &CliError::with_suggestion(
                    format!("passage not found: {name}"),
                    "run `skein graph` without --links to list the corpus summary",
                ),
            )?;
            anyhow::bail!("passage not found: {name}");
        };
        let targets: Vec<&String> = links.iter().collect();
        let val = json!({ "passage": name, "links": targets });
        return render(output, &val, |_, w| {
            writeln!(w, "{name}")?;
            if targets.is_empty() {
                writeln!(w, "  (no outgoing links)")?;
            }
            for target in &targets {
                writeln!(w, "  -> {target}")?;
            }
            Ok(())
        });
    }

    let breakers = &config.ordering.cycle_breakers;
    let cycles = find_all_cycles(&graph);
    let edge_count: usize = graph.values().map(indexmap::IndexSet::len).sum();
    let cycle_report: Vec<serde_json::Value> = cycles
        .iter()
        .map(|members| {
            let covered = members.iter().any(|m| breakers.contains(m));
            json!({ "members": members, "covered": covered })
        })
        .collect();

    let val = json!({
        "passages": graph.len(),
        "links": edge_count,
        "cycles": cycle_report,
        "diagnostics": diagnostics,
    });
    render(output, &val, |_, w| {
        writeln!(w, "Corpus link graph")?;
        writeln!(w, "  passages: {}", graph.len())?;
        writeln!(w, "  links:    {edge_count}")?;
        writeln!(w, "  cycles:   {}", cycles.len())?;
        for members in &cycles {
            let covered = members.iter().any(|m| breakers.contains(m));
            let mark = if covered { "covered" } else { "NEEDS BREAKER" };
            writeln!(w, "    [{mark}] {}", members.join(" <-> "))?;
        }
        for diag in &diagnostics {
            writeln!(w, "warning: {diag}")?;
        }
        Ok(())
    })
}
