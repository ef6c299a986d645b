#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "netx: interaction networks from chat transcripts",
    long_about = None
)]
struct Cli {
    /// Output format: pretty, text or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for --format json.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file to use instead of ./netxplore.toml or the user config.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Inspect",
        about = "Parse a transcript and report recognized messages",
        long_about = "Detect the transcript format, parse it, and report messages, participants and skipped lines.",
        after_help = "EXAMPLES:\n    # Summarize a chat export\n    netx parse chat.txt\n\n    # Force the talk-page grammar and list every message\n    netx parse talk.txt --as talk --messages\n\n    # Emit machine-readable output\n    netx parse chat.txt --json"
    )]
    Parse(cmd::parse::ParseArgs),

    #[command(
        next_help_heading = "Analyze",
        about = "Build the interaction network and centrality scores",
        long_about = "Filter a transcript, build its interaction graph, and score every participant.",
        after_help = "EXAMPLES:\n    # Analyze a whole transcript\n    netx analyze chat.txt\n\n    # Restrict to a week and the ten most active participants\n    netx analyze chat.txt --start-date 2024-01-01 --end-date 2024-01-07 --active-users 10\n\n    # Anonymize participants in JSON output\n    netx analyze chat.txt --anonymize --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Analyze",
        about = "Detect communities in the interaction network",
        long_about = "Partition the interaction graph with Louvain, Girvan-Newman or greedy modularity.",
        after_help = "EXAMPLES:\n    # Louvain communities (default)\n    netx communities chat.txt\n\n    # Girvan-Newman on messages containing a keyword\n    netx communities chat.txt --algorithm girvan_newman --keywords release\n\n    # Emit machine-readable output\n    netx communities chat.txt --json"
    )]
    Communities(cmd::communities::CommunitiesArgs),

    #[command(
        next_help_heading = "Analyze",
        about = "Compare the networks of two transcripts",
        long_about = "Analyze two transcripts with the same filters and compare nodes, links and metrics.",
        after_help = "EXAMPLES:\n    # Mark participants present in both networks\n    netx compare january.txt february.txt --mark-common\n\n    # Compare density and total weight of strong links\n    netx compare a.txt b.txt --min-weight 3 --metrics density,total_weight --json"
    )]
    Compare(cmd::compare::CompareArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    netx completions bash\n\n    # Generate zsh completions\n    netx completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NETXPLORE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "netxplore=debug,info"
        } else {
            "netxplore=info,warn"
        })
    });

    let format = env::var("NETXPLORE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
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
    init_tracing();

    let cli = Cli::parse();
    let output = cli.output_mode();
    debug!(?output, "resolved output mode");

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = env::current_dir()?;
    let config = cmd::load_config(cli.config.as_deref(), &project_root)?;

    match &cli.command {
        Commands::Parse(args) => cmd::parse::run_parse(args, &config, output),
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, &config, output),
        Commands::Communities(args) => cmd::communities::run_communities(args, &config, output),
        Commands::Compare(args) => cmd::compare::run_compare(args, &config, output),
        Commands::Completions(_) => Ok(()),
    }
}
