#![forbid(unsafe_code)]

mod cmd;
mod output;
mod writer;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "skein: deterministic Twee story splitter",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Split a corpus into ordered output files",
        long_about = "Run the full pipeline: parse the corpus, classify passages, carve partition subgraphs, order each Twee file topologically, and write the output files.",
        after_help = "EXAMPLES:\n    # Split using a config\n    skein split story.tw --config split.toml --out out/\n\n    # Preview without writing files\n    skein split story.tw --config split.toml --dry-run\n\n    # Emit machine-readable output\n    skein split story.tw --json"
    )]
    Split(cmd::split::SplitArgs),

    #[command(
        about = "Inspect the corpus link graph",
        long_about = "Diagnostic view of the link graph: passage and link counts, cycle detection with breaker coverage, and per-passage outgoing links.",
        after_help = "EXAMPLES:\n    # Corpus summary with cycle report\n    skein graph story.tw --config split.toml\n\n    # One passage's outgoing links\n    skein graph story.tw --links \"Hub Menu\"\n\n    # Emit machine-readable output\n    skein graph story.tw --json"
    )]
    Graph(cmd::graph::GraphArgs),

    #[command(
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    skein completions bash\n\n    # Generate zsh completions\n    skein completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SKEIN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "skein=debug,skein_core=debug,info"
        } else {
            "skein=info,skein_core=info,warn"
        })
    });

    let format = env::var("SKEIN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays machine-parseable.
    match format.as_str() {
        "json" => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();

    match cli.command {
        Commands::Split(ref args) => cmd::split::run_split(args, output, cli.quiet),
        Commands::Graph(ref args) => cmd::graph::run_graph(args, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
