//! `netx communities`: detect communities in the interaction graph.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use netxplore_core::config::AnalysisConfig;
use netxplore_graph::community::{Algorithm, CommunityReport};

use crate::cmd::{FilterArgs, analyze_or_report};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode, score};

#[derive(Args, Debug)]
pub struct CommunitiesArgs {
    /// Transcript file to analyze.
    pub file: PathBuf,

    /// louvain, girvan_newman or greedy_modularity. Defaults to
    /// `community.default_algorithm` from the config.
    #[arg(long, short = 'a', value_name = "NAME")]
    pub algorithm: Option<String>,

    #[command(flatten)]
    pub filters: FilterArgs,
}

/// Execute `netx communities <file>`.
///
/// # Errors
///
/// Returns an error for an unknown algorithm, invalid filter flags, a
/// missing or unreadable transcript, or an output failure.
pub fn run_communities(
    args: &CommunitiesArgs,
    config: &AnalysisConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let name = args
        .algorithm
        .as_deref()
        .unwrap_or(&config.community.default_algorithm);
    let algorithm: Algorithm = match name.parse() {
        Ok(alg) => alg,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            anyhow::bail!("{err}");
        }
    };

    let spec = args.filters.to_spec(output)?;
    let analysis = analyze_or_report(&args.file, &spec, config, output)?;
    let report = analysis.communities(algorithm);

    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &CommunityReport, w: &mut dyn Write) -> std::io::Result<()> {
    for community in &report.communities {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            community.id,
            community.size,
            community.avg_betweenness,
            community.avg_pagerank,
            community.members.join(",")
        )?;
    }
    Ok(())
}

fn render_pretty(report: &CommunityReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Communities ({})", report.algorithm))?;
    pretty_kv(w, "Communities", report.num_communities.to_string())?;
    pretty_kv(w, "Modularity", score(report.modularity))?;

    for community in &report.communities {
        writeln!(w)?;
        writeln!(
            w,
            "#{}  size {}  avg betweenness {:.4}  avg pagerank {:.4}",
            community.id, community.size, community.avg_betweenness, community.avg_pagerank
        )?;
        for member in &community.members {
            writeln!(w, "  {member}")?;
        }
    }
    Ok(())
}
