//! Centrality measures for the interaction graph.
//!
//! # Overview
//!
//! - **Degree** (`degree`): share of other participants a node talks to.
//! - **Betweenness** (`betweenness`): how often a node sits on weighted
//!   shortest paths between others.
//! - **Closeness** (`closeness`): inverse mean hop distance to everyone else.
//! - **Eigenvector** (`eigenvector`): links to well-linked participants
//!   count for more.
//! - **PageRank** (`pagerank`): stationary share of a damped random walk
//!   over weighted links.
//!
//! # Disconnected graphs
//!
//! Degree and betweenness are computed over the whole graph. Closeness,
//! eigenvector and PageRank are only meaningful within one component, so
//! they run on the largest connected component (ties go to the component
//! holding the earliest node) and every other node gets no score.

pub mod betweenness;
pub mod closeness;
pub mod degree;
pub mod eigenvector;
pub mod pagerank;

use netxplore_core::config::CentralityConfig;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::CentralityError;
use crate::graph::{InteractionGraph, largest_component};

use self::betweenness::betweenness_centrality;
use self::closeness::closeness_centrality;
use self::degree::degree_centrality;
use self::eigenvector::eigenvector_centrality;
use self::pagerank::{PageRankConfig, pagerank};

// ---------------------------------------------------------------------------
// Subgraph
// ---------------------------------------------------------------------------

/// A node subset with its induced weighted adjacency, renumbered `0..m`.
#[derive(Debug, Clone, Default)]
pub struct Subgraph {
    /// Graph node index for each local position.
    pub nodes: Vec<NodeIndex>,
    /// Local adjacency: `(neighbor position, weight)`.
    pub adj: Vec<Vec<(usize, f64)>>,
}

impl Subgraph {
    /// The subgraph induced by `members`, in the order given.
    #[must_use]
    pub fn induced(g: &InteractionGraph, members: &[NodeIndex]) -> Self {
        let mut position = vec![None; g.node_count()];
        for (local, idx) in members.iter().enumerate() {
            position[idx.index()] = Some(local);
        }
        let full = g.weighted_adjacency();
        let adj = members
            .iter()
            .map(|idx| {
                full[idx.index()]
                    .iter()
                    .filter_map(|&(w, weight)| position[w].map(|local| (local, weight)))
                    .collect()
            })
            .collect();
        Self {
            nodes: members.to_vec(),
            adj,
        }
    }

    /// A free-standing subgraph from local adjacency lists.
    #[must_use]
    pub fn from_adjacency(adj: Vec<Vec<(usize, f64)>>) -> Self {
        Self {
            nodes: (0..adj.len()).map(NodeIndex::new).collect(),
            adj,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// All five scores for one participant, at full precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NodeCentrality {
    pub degree: f64,
    pub betweenness: f64,
    /// `None` outside the largest component.
    pub closeness: Option<f64>,
    /// `None` outside the largest component or when the iteration failed.
    pub eigenvector: Option<f64>,
    /// `None` outside the largest component or when the iteration failed.
    pub pagerank: Option<f64>,
}

/// Centrality for every node of an [`InteractionGraph`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CentralityResult {
    /// Scores by node index.
    pub scores: Vec<NodeCentrality>,
    /// Nodes of the component the component-scoped measures ran on.
    #[serde(skip)]
    pub component: Vec<NodeIndex>,
    /// Measures that did not converge.
    pub errors: Vec<CentralityError>,
}

impl CentralityResult {
    /// Scores for one node.
    #[must_use]
    pub fn get(&self, idx: NodeIndex) -> Option<&NodeCentrality> {
        self.scores.get(idx.index())
    }

    /// Whether any measure is missing because it failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Compute every centrality measure.
#[must_use]
#[instrument(skip_all, fields(nodes = g.node_count(), edges = g.edge_count()))]
pub fn compute_centrality(g: &InteractionGraph, config: &CentralityConfig) -> CentralityResult {
    let degree = degree_centrality(g);
    let betweenness = betweenness_centrality(g);

    let mut scores: Vec<NodeCentrality> = degree
        .iter()
        .zip(&betweenness)
        .map(|(&degree, &betweenness)| NodeCentrality {
            degree,
            betweenness,
            ..NodeCentrality::default()
        })
        .collect();

    let component = largest_component(&g.graph);
    let sub = Subgraph::induced(g, &component);
    debug!(
        component = sub.len(),
        total = g.node_count(),
        "scoring largest component"
    );

    for (local, value) in closeness_centrality(&sub).into_iter().enumerate() {
        scores[sub.nodes[local].index()].closeness = Some(value);
    }

    let mut errors = Vec::new();

    let eigen = eigenvector_centrality(
        &sub,
        config.eigenvector_max_iter,
        config.eigenvector_tolerance,
    );
    if eigen.converged {
        for (local, value) in eigen.scores.into_iter().enumerate() {
            scores[sub.nodes[local].index()].eigenvector = Some(value);
        }
    } else {
        warn!(iterations = eigen.iterations, "eigenvector centrality did not converge");
        errors.push(CentralityError::Eigenvector {
            iterations: eigen.iterations,
        });
    }

    let pr_config = PageRankConfig {
        tolerance: config.pagerank_tolerance,
        max_iter: config.pagerank_max_iter,
        ..PageRankConfig::default()
    };
    let pr = pagerank(&sub, &pr_config);
    if pr.converged {
        for (local, value) in pr.scores.into_iter().enumerate() {
            scores[sub.nodes[local].index()].pagerank = Some(value);
        }
    } else {
        warn!(iterations = pr.iterations, "pagerank did not converge");
        errors.push(CentralityError::PageRank {
            iterations: pr.iterations,
        });
    }

    CentralityResult {
        scores,
        component,
        errors,
    }
}
