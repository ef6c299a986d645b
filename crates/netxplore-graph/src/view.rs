//! Serializable `{nodes, links}` projection of an analysis.
//!
//! Scores are rounded to 4 decimals here and nowhere earlier.

use serde::{Deserialize, Serialize};

use crate::graph::InteractionGraph;
use crate::metrics::CentralityResult;

/// Round to 4 decimal places.
#[must_use]
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// One participant with its scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    pub messages: usize,
    pub degree: f64,
    pub betweenness: f64,
    pub closeness: Option<f64>,
    pub eigenvector: Option<f64>,
    pub pagerank: Option<f64>,
}

/// One weighted interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkView {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// The graph as exposed to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkView {
    pub nodes: Vec<NodeView>,
    pub links: Vec<LinkView>,
}

impl NetworkView {
    /// Project a graph and its centrality into node and link lists.
    #[must_use]
    pub fn new(g: &InteractionGraph, centrality: &CentralityResult) -> Self {
        let nodes = g
            .graph
            .node_indices()
            .map(|idx| {
                let p = g.participant(idx);
                let s = centrality.get(idx).copied().unwrap_or_default();
                NodeView {
                    id: p.id.clone(),
                    messages: p.messages,
                    degree: round4(s.degree),
                    betweenness: round4(s.betweenness),
                    closeness: s.closeness.map(round4),
                    eigenvector: s.eigenvector.map(round4),
                    pagerank: s.pagerank.map(round4),
                }
            })
            .collect();

        let links = g
            .links()
            .map(|(source, target, weight)| LinkView {
                source: source.to_string(),
                target: target.to_string(),
                weight,
            })
            .collect();

        Self { nodes, links }
    }
}
