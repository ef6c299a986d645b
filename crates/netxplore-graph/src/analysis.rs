//! End-to-end analysis: transcript → parse → filter → graph → centrality.

use std::collections::BTreeMap;
use std::path::Path;

use netxplore_core::config::AnalysisConfig;
use netxplore_core::error::AnalysisError;
use netxplore_core::filter::{self, FilterSpec};
use netxplore_core::model::TranscriptFormat;
use netxplore_core::parser::{SkipReason, parse_transcript};
use netxplore_core::source::{read_transcript, source_hash};
use serde::Serialize;
use tracing::{info, instrument};

use crate::community::{Algorithm, CommunityReport, detect_communities};
use crate::graph::InteractionGraph;
use crate::metrics::{CentralityResult, compute_centrality};
use crate::view::NetworkView;

/// Parse and filter statistics for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    pub format: TranscriptFormat,
    pub source_hash: String,
    pub total_lines: usize,
    pub parsed_messages: usize,
    pub retained_messages: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

/// A finished analysis of one transcript.
#[derive(Debug, Clone)]
pub struct NetworkAnalysis {
    pub stats: AnalysisStats,
    pub graph: InteractionGraph,
    pub centrality: CentralityResult,
}

impl NetworkAnalysis {
    /// `{nodes, links}` view with rounded scores.
    #[must_use]
    pub fn view(&self) -> NetworkView {
        NetworkView::new(&self.graph, &self.centrality)
    }

    /// Community detection over the analyzed graph.
    #[must_use]
    pub fn communities(&self, algorithm: Algorithm) -> CommunityReport {
        detect_communities(&self.graph, &self.centrality, algorithm)
    }
}

/// Analyze transcript text already in memory.
#[must_use]
#[instrument(skip_all, fields(bytes = text.len()))]
pub fn analyze_text(text: &str, spec: &FilterSpec, config: &AnalysisConfig) -> NetworkAnalysis {
    run(text, source_hash(text.as_bytes()), spec, config)
}

/// Read, decode and analyze the transcript at `path`.
///
/// # Errors
///
/// Returns [`AnalysisError::NotFound`] when the file does not exist and
/// [`AnalysisError::Read`] when it cannot be read.
#[instrument(skip(spec, config))]
pub fn analyze_file(
    path: &Path,
    spec: &FilterSpec,
    config: &AnalysisConfig,
) -> Result<NetworkAnalysis, AnalysisError> {
    let transcript = read_transcript(path)?;
    Ok(run(&transcript.text, transcript.source_hash, spec, config))
}

fn run(
    text: &str,
    source_hash: String,
    spec: &FilterSpec,
    config: &AnalysisConfig,
) -> NetworkAnalysis {
    let report = parse_transcript(text, &config.parser);
    let outcome = filter::run(&report.messages, spec);
    let graph = InteractionGraph::from_outcome(&outcome);
    let centrality = compute_centrality(&graph, &config.centrality);

    let stats = AnalysisStats {
        format: report.format,
        source_hash,
        total_lines: report.total_lines,
        parsed_messages: report.messages.len(),
        retained_messages: outcome.retained.len(),
        skipped: report.skip_counts(),
    };
    info!(
        format = %stats.format,
        messages = stats.parsed_messages,
        nodes = graph.node_count(),
        links = graph.edge_count(),
        "analysis complete"
    );

    NetworkAnalysis {
        stats,
        graph,
        centrality,
    }
}
