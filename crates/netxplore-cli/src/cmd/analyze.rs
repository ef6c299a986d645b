//! `netx analyze`: build the interaction graph and score every participant.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use netxplore_core::config::AnalysisConfig;
use netxplore_graph::CentralityError;
use netxplore_graph::analysis::AnalysisStats;
use netxplore_graph::view::NetworkView;
use serde::Serialize;
use tracing::warn;

use crate::cmd::{FilterArgs, analyze_or_report};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode, score};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Transcript file to analyze.
    pub file: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,
}

/// `analyze` output: run statistics plus the `{nodes, links}` view.
#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    pub stats: AnalysisStats,
    #[serde(flatten)]
    pub network: NetworkView,
    /// Iterative metrics that did not converge; their scores are null.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CentralityError>,
}

/// Execute `netx analyze <file>`.
///
/// # Errors
///
/// Returns an error for invalid filter flags, a missing or unreadable
/// transcript, or an output failure.
pub fn run_analyze(
    args: &AnalyzeArgs,
    config: &AnalysisConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let spec = args.filters.to_spec(output)?;
    let analysis = analyze_or_report(&args.file, &spec, config, output)?;
    for err in &analysis.centrality.errors {
        warn!(code = %err.code(), "{err}");
    }

    let result = AnalyzeOutput {
        network: analysis.view(),
        errors: analysis.centrality.errors.clone(),
        stats: analysis.stats,
    };
    render_mode(output, &result, render_text, render_pretty)
}

fn render_text(result: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for node in &result.network.nodes {
        writeln!(
            w,
            "node\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            node.id,
            node.messages,
            node.degree,
            node.betweenness,
            score(node.closeness),
            score(node.eigenvector),
            score(node.pagerank)
        )?;
    }
    for link in &result.network.links {
        writeln!(w, "link\t{}\t{}\t{}", link.source, link.target, link.weight)?;
    }
    Ok(())
}

fn render_pretty(result: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let stats = &result.stats;
    pretty_section(w, "Analysis")?;
    pretty_kv(w, "Format", stats.format.to_string())?;
    pretty_kv(w, "Source", &stats.source_hash)?;
    pretty_kv(
        w,
        "Messages",
        format!("{} parsed, {} retained", stats.parsed_messages, stats.retained_messages),
    )?;
    pretty_kv(
        w,
        "Network",
        format!(
            "{} participants, {} links",
            result.network.nodes.len(),
            result.network.links.len()
        ),
    )?;
    for err in &result.errors {
        pretty_kv(w, "Warning", err.to_string())?;
    }

    writeln!(w)?;
    pretty_section(w, "Participants")?;
    writeln!(
        w,
        "{:<24} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "ID", "MSGS", "DEGREE", "BETWEEN", "CLOSE", "EIGEN", "RANK"
    )?;
    for node in &result.network.nodes {
        writeln!(
            w,
            "{:<24} {:>6} {:>8.4} {:>8.4} {:>8} {:>8} {:>8}",
            node.id,
            node.messages,
            node.degree,
            node.betweenness,
            score(node.closeness),
            score(node.eigenvector),
            score(node.pagerank)
        )?;
    }

    if !result.network.links.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Links")?;
        for link in &result.network.links {
            writeln!(w, "{} <-> {}  ({})", link.source, link.target, link.weight)?;
        }
    }
    Ok(())
}
