//! `skein split` — run the full pipeline and write output files.

use std::fs;
use std::io::Write as IoWrite;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::json;

use skein_core::{SplitConfig, SplitOutput, parse_corpus, split_corpus};

use crate::output::{OutputMode, render};
use crate::writer;

/// Arguments for `skein split`.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Input corpus file.
    pub input: PathBuf,

    /// Split configuration (TOML). Defaults apply when omitted: one
    /// unsorted output, no partitions, no cycle breakers.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output directory for the split files.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Compute and report the split without writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run_split(args: &SplitArgs, output: OutputMode, quiet: bool) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading corpus {}", args.input.display()))?;
    let config = match &args.config {
        Some(path) => SplitConfig::load(path)?,
        None => SplitConfig::default(),
    };

    let mut diagnostics = Vec::new();
    let passages = parse_corpus(&text, &mut diagnostics)?;
    let SplitOutput {
        files,
        diagnostics: split_diagnostics,
    } = split_corpus(&passages, &config)?;
    diagnostics.extend(split_diagnostics);

    if !args.dry_run {
        writer::write_split(&args.out, &files, &passages)?;
    }

    let summary = json!({
        "input": args.input.display().to_string(),
        "passages": passages.len(),
        "files": files
            .iter()
            .map(|(file, names)| json!({ "file": file, "passages": names.len() }))
            .collect::<Vec<_>>(),
        "diagnostics": diagnostics,
        "dry_run": args.dry_run,
    });
    render(output, &summary, |_, w| {
        if !quiet {
            for (file, names) in &files {
                writeln!(w, "{file}: {} passages", names.len())?;
            }
        }
        for diag in &diagnostics {
            writeln!(w, "warning: {diag}")?;
        }
        Ok(())
    })
}
