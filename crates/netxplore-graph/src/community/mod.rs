//! Community detection over the interaction graph.
//!
//! Three interchangeable algorithms implement [`CommunityDetection`]:
//!
//! - [`Louvain`]: multi-level local modularity optimization.
//! - [`GirvanNewman`]: divisive edge-betweenness removal, first split only.
//! - [`GreedyModularity`]: Clauset-Newman-Moore agglomeration.
//!
//! Each returns one label per node. [`detect_communities`] turns the labels
//! into a [`CommunityReport`] with per-community centrality averages and the
//! partition's modularity.
//!
//! Community ids follow discovery order (the order of each community's
//! earliest node). The list is sorted by descending size; equal sizes keep
//! discovery order.

mod girvan_newman;
mod greedy;
mod louvain;
pub mod modularity;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use netxplore_core::error::ParamError;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::InteractionGraph;
use crate::metrics::CentralityResult;
use crate::view::round4;

pub use girvan_newman::GirvanNewman;
pub use greedy::GreedyModularity;
pub use louvain::Louvain;
pub use modularity::modularity;

/// A community detection algorithm.
pub trait CommunityDetection {
    /// Stable algorithm name as accepted by [`Algorithm::from_str`].
    fn name(&self) -> &'static str;

    /// One community label per node index. Labels need not be contiguous.
    fn detect(&self, g: &InteractionGraph) -> Vec<usize>;
}

/// Selectable algorithm names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    Louvain,
    GirvanNewman,
    GreedyModularity,
}

impl Algorithm {
    pub const ALL: [Self; 3] = [Self::Louvain, Self::GirvanNewman, Self::GreedyModularity];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Louvain => "louvain",
            Self::GirvanNewman => "girvan_newman",
            Self::GreedyModularity => "greedy_modularity",
        }
    }

    /// The implementation behind this name.
    #[must_use]
    pub fn detector(self) -> Box<dyn CommunityDetection> {
        match self {
            Self::Louvain => Box::new(Louvain),
            Self::GirvanNewman => Box::new(GirvanNewman),
            Self::GreedyModularity => Box::new(GreedyModularity),
        }
    }
}

impl FromStr for Algorithm {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == wanted)
            .ok_or_else(|| ParamError::UnknownAlgorithm(s.to_string()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected community.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Community {
    pub id: usize,
    pub size: usize,
    /// Member ids in node order.
    pub members: Vec<String>,
    /// Mean betweenness over members, rounded to 4 decimals.
    pub avg_betweenness: f64,
    /// Mean PageRank over members that have one, 0 when none do.
    pub avg_pagerank: f64,
}

/// Result of community detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityReport {
    pub communities: Vec<Community>,
    /// Participant id to community id.
    pub node_communities: BTreeMap<String, usize>,
    pub algorithm: Algorithm,
    pub num_communities: usize,
    /// `None` for a graph without edges.
    pub modularity: Option<f64>,
}

/// Map arbitrary labels to `0..count` in order of first appearance.
pub(crate) fn renumber(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let renumbered = labels
        .iter()
        .map(|label| {
            let next = mapping.len();
            *mapping.entry(*label).or_insert(next)
        })
        .collect();
    (renumbered, mapping.len())
}

/// Run `algorithm` and aggregate the result.
#[must_use]
#[instrument(skip(g, centrality), fields(nodes = g.node_count()))]
pub fn detect_communities(
    g: &InteractionGraph,
    centrality: &CentralityResult,
    algorithm: Algorithm,
) -> CommunityReport {
    let detector = algorithm.detector();
    let raw = detector.detect(g);
    let (labels, count) = renumber(&raw);

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (node, &label) in labels.iter().enumerate() {
        members[label].push(node);
    }

    let mut communities: Vec<Community> = members
        .iter()
        .enumerate()
        .map(|(id, nodes)| summarize(g, centrality, id, nodes))
        .collect();
    communities.sort_by(|a, b| b.size.cmp(&a.size));

    let node_communities = g
        .participants()
        .zip(&labels)
        .map(|(p, &label)| (p.id.clone(), label))
        .collect();

    let modularity = modularity(g, &labels).map(round4);
    debug!(
        algorithm = detector.name(),
        communities = count,
        ?modularity,
        "communities detected"
    );

    CommunityReport {
        communities,
        node_communities,
        algorithm,
        num_communities: count,
        modularity,
    }
}

#[allow(clippy::cast_precision_loss)]
fn summarize(
    g: &InteractionGraph,
    centrality: &CentralityResult,
    id: usize,
    nodes: &[usize],
) -> Community {
    let mean = |values: Vec<f64>| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };
    let scores = || nodes.iter().filter_map(|&n| centrality.scores.get(n));

    Community {
        id,
        size: nodes.len(),
        members: nodes
            .iter()
            .map(|&n| g.participant(NodeIndex::new(n)).id.clone())
            .collect(),
        avg_betweenness: round4(mean(scores().map(|s| s.betweenness).collect())),
        avg_pagerank: round4(mean(scores().filter_map(|s| s.pagerank).collect())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_centrality;
    use netxplore_core::config::CentralityConfig;

    fn build(ids: &[&str], edges: &[(&str, &str)]) -> InteractionGraph {
        InteractionGraph::from_parts(
            ids.iter().map(|id| ((*id).to_string(), 1)),
            edges
                .iter()
                .map(|(a, b)| ((*a).to_string(), (*b).to_string(), 1)),
        )
    }

    #[test]
    fn algorithm_names_parse() {
        assert_eq!("louvain".parse::<Algorithm>(), Ok(Algorithm::Louvain));
        assert_eq!("Girvan-Newman".parse::<Algorithm>(), Ok(Algorithm::GirvanNewman));
        assert_eq!(
            "greedy_modularity".parse::<Algorithm>(),
            Ok(Algorithm::GreedyModularity)
        );
        assert_eq!(
            "spectral".parse::<Algorithm>(),
            Err(ParamError::UnknownAlgorithm("spectral".into()))
        );
    }

    #[test]
    fn detectors_report_their_registry_name() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.detector().name(), algorithm.as_str());
            assert_eq!(algorithm.as_str().parse::<Algorithm>(), Ok(algorithm));
        }
    }

    #[test]
    fn renumber_follows_first_appearance() {
        assert_eq!(renumber(&[7, 3, 7, 9]), (vec![0, 1, 0, 2], 3));
    }

    #[test]
    fn report_is_sorted_by_size_with_discovery_ids() {
        let g = build(
            &["Solo", "A", "B", "C"],
            &[("A", "B"), ("B", "C"), ("A", "C")],
        );
        let centrality = compute_centrality(&g, &CentralityConfig::default());
        for algorithm in [Algorithm::Louvain, Algorithm::GreedyModularity] {
            let report = detect_communities(&g, &centrality, algorithm);
            assert_eq!(report.num_communities, 2, "{algorithm}");
            assert_eq!(report.communities[0].size, 3);
            assert_eq!(report.communities[0].id, 1);
            assert_eq!(report.communities[1].members, vec!["Solo"]);
            assert_eq!(report.node_communities["Solo"], 0);
            assert!(report.modularity.is_some());
        }
    }

    #[test]
    fn girvan_newman_splits_beyond_existing_components() {
        let g = build(
            &["Solo", "A", "B", "C"],
            &[("A", "B"), ("B", "C"), ("A", "C")],
        );
        let centrality = compute_centrality(&g, &CentralityConfig::default());
        let report = detect_communities(&g, &centrality, Algorithm::GirvanNewman);
        assert_eq!(report.num_communities, 3);
    }

    #[test]
    fn averages_skip_missing_pagerank() {
        let g = build(&["A", "B", "C", "D", "E"], &[("A", "B"), ("B", "C"), ("D", "E")]);
        let centrality = compute_centrality(&g, &CentralityConfig::default());
        let report = detect_communities(&g, &centrality, Algorithm::GirvanNewman);
        let small = report
            .communities
            .iter()
            .find(|c| c.members.contains(&"D".to_string()))
            .expect("D's community");
        assert!(small.avg_pagerank.abs() < f64::EPSILON);
    }

    #[test]
    fn edgeless_graph_has_no_modularity() {
        let g = build(&["A", "B"], &[]);
        let centrality = compute_centrality(&g, &CentralityConfig::default());
        let report = detect_communities(&g, &centrality, Algorithm::Louvain);
        assert_eq!(report.num_communities, 2);
        assert_eq!(report.modularity, None);
    }
}
