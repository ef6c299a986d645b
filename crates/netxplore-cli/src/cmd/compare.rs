//! `netx compare`: compare the networks of two transcripts.
//!
//! Both transcripts go through the same filter flags and are analyzed
//! independently before the comparison filters apply.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use netxplore_core::config::AnalysisConfig;
use netxplore_core::error::ParamError;
use netxplore_graph::compare::{
    ComparedNetwork, ComparisonReport, CompareParams, RawCompareParams, compare,
};

use crate::cmd::{FilterArgs, analyze_or_report};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Baseline transcript.
    pub original: PathBuf,

    /// Transcript compared against the baseline.
    pub comparison: Option<PathBuf>,

    /// Keep only nodes whose id contains this text (case-insensitive).
    #[arg(long, value_name = "TEXT")]
    pub node_filter: Option<String>,

    /// Drop links lighter than this weight.
    #[arg(long, value_name = "N")]
    pub min_weight: Option<u32>,

    /// Flag nodes present in both networks.
    #[arg(long)]
    pub mark_common: bool,

    /// Comma-separated metrics: node_count, link_count, density,
    /// total_weight, average_degree.
    #[arg(long, value_name = "LIST")]
    pub metrics: Option<String>,

    #[command(flatten)]
    pub filters: FilterArgs,
}

impl CompareArgs {
    fn to_raw(&self) -> RawCompareParams {
        RawCompareParams {
            node_filter: self.node_filter.clone(),
            min_weight: self.min_weight,
            mark_common: self.mark_common,
            metrics: self.metrics.clone(),
        }
    }
}

fn reject<T>(output: OutputMode, err: &ParamError) -> anyhow::Result<T> {
    render_error(output, &CliError::from(err))?;
    anyhow::bail!("{err}")
}

/// Execute `netx compare <original> <comparison>`.
///
/// # Errors
///
/// Returns an error for a missing comparison transcript, invalid
/// comparison or filter parameters, an unreadable transcript, or an
/// output failure.
pub fn run_compare(
    args: &CompareArgs,
    config: &AnalysisConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let Some(comparison_path) = args.comparison.as_deref() else {
        return reject(output, &ParamError::Missing("comparison"));
    };
    let params = CompareParams::from_raw(&args.to_raw()).or_else(|err| reject(output, &err))?;
    let spec = args.filters.to_spec(output)?;

    let original = analyze_or_report(&args.original, &spec, config, output)?;
    let comparison = analyze_or_report(comparison_path, &spec, config, output)?;
    let report = compare(&original.view(), &comparison.view(), &params);

    render_mode(output, &report, render_text, render_pretty)
}

fn write_side_text(w: &mut dyn Write, side: &str, network: &ComparedNetwork) -> std::io::Result<()> {
    for node in &network.nodes {
        let common = node
            .is_common
            .map_or("", |common| if common { "\tcommon" } else { "" });
        writeln!(w, "{side}\tnode\t{}\t{}{common}", node.node.id, node.node.messages)?;
    }
    for link in &network.links {
        writeln!(w, "{side}\tlink\t{}\t{}\t{}", link.source, link.target, link.weight)?;
    }
    Ok(())
}

fn render_text(report: &ComparisonReport, w: &mut dyn Write) -> std::io::Result<()> {
    write_side_text(w, "original", &report.original)?;
    write_side_text(w, "comparison", &report.comparison)?;
    for (name, delta) in &report.metrics {
        writeln!(
            w,
            "metric\t{name}\t{}\t{}\t{}\t{}",
            delta.original_count, delta.comparison_count, delta.difference, delta.percent_change
        )?;
    }
    Ok(())
}

fn write_side_pretty(w: &mut dyn Write, heading: &str, network: &ComparedNetwork) -> std::io::Result<()> {
    pretty_section(w, heading)?;
    pretty_kv(
        w,
        "Network",
        format!("{} nodes, {} links", network.nodes.len(), network.links.len()),
    )?;
    for node in &network.nodes {
        let marker = if node.is_common == Some(true) { "*" } else { " " };
        writeln!(w, "{marker} {:<32} {:>6}", node.node.id, node.node.messages)?;
    }
    Ok(())
}

fn render_pretty(report: &ComparisonReport, w: &mut dyn Write) -> std::io::Result<()> {
    write_side_pretty(w, "Original", &report.original)?;
    writeln!(w)?;
    write_side_pretty(w, "Comparison", &report.comparison)?;

    if !report.metrics.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Metrics")?;
        writeln!(
            w,
            "{:<16} {:>10} {:>10} {:>10} {:>10}",
            "METRIC", "ORIGINAL", "COMPARED", "DIFF", "CHANGE%"
        )?;
        for (name, delta) in &report.metrics {
            writeln!(
                w,
                "{name:<16} {:>10} {:>10} {:>10} {:>10}",
                delta.original_count, delta.comparison_count, delta.difference, delta.percent_change
            )?;
        }
    }
    Ok(())
}
