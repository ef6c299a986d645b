//! Interaction graph construction from a filter run.
//!
//! # Overview
//!
//! Nodes are the participants that survived the population filters, keyed
//! by their display identifier (the pseudonym when anonymization is on).
//! Each node carries its message count. An undirected edge joins two
//! participants whenever one's message directly followed the other's; the
//! edge weight is the number of such hand-offs.
//!
//! ## Ordering
//!
//! Node indices follow first-seen order in the transcript, and edges are
//! inserted in the order their pair was first seen. Every downstream
//! iteration goes through indices, so output order is deterministic.

use std::collections::HashMap;

use netxplore_core::filter::FilterOutcome;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::{debug, instrument};

/// A graph node: one participant and how many messages they sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: String,
    pub messages: usize,
}

/// Undirected, weighted, loop-free interaction graph.
#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    /// Nodes are participants; edge weights count consecutive hand-offs.
    pub graph: UnGraph<Participant, u32>,
    /// Participant id to node index.
    pub node_map: HashMap<String, NodeIndex>,
}

impl InteractionGraph {
    /// Build the graph for one filter run.
    #[must_use]
    #[instrument(skip_all, fields(participants = outcome.participants.len()))]
    pub fn from_outcome(outcome: &FilterOutcome) -> Self {
        let nodes = outcome.participants.iter().map(|sender| {
            (
                outcome.display_name(sender).to_string(),
                outcome.message_count(sender),
            )
        });
        let edges = outcome.kept_edges().map(|edge| {
            (
                outcome.display_name(&edge.source).to_string(),
                outcome.display_name(&edge.target).to_string(),
                edge.weight,
            )
        });
        let built = Self::from_parts(nodes, edges);
        debug!(
            nodes = built.node_count(),
            edges = built.edge_count(),
            "interaction graph built"
        );
        built
    }

    /// Build from explicit node and edge lists.
    ///
    /// Edges naming an unknown node and self-loops are ignored. A repeated
    /// pair adds its weight to the existing edge.
    #[must_use]
    pub fn from_parts<N, E>(nodes: N, edges: E) -> Self
    where
        N: IntoIterator<Item = (String, usize)>,
        E: IntoIterator<Item = (String, String, u32)>,
    {
        let mut graph = UnGraph::<Participant, u32>::default();
        let mut node_map = HashMap::new();

        for (id, messages) in nodes {
            if node_map.contains_key(&id) {
                continue;
            }
            let idx = graph.add_node(Participant {
                id: id.clone(),
                messages,
            });
            node_map.insert(id, idx);
        }

        for (source, target, weight) in edges {
            let (Some(&a), Some(&b)) = (node_map.get(&source), node_map.get(&target)) else {
                continue;
            };
            if a == b || weight == 0 {
                continue;
            }
            if let Some(existing) = graph.find_edge(a, b) {
                graph[existing] += weight;
            } else {
                graph.add_edge(a, b, weight);
            }
        }

        Self { graph, node_map }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node index for a participant id.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Participant at `idx`.
    #[must_use]
    pub fn participant(&self, idx: NodeIndex) -> &Participant {
        &self.graph[idx]
    }

    /// Participants in node-index (first-seen) order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.graph.node_weights()
    }

    /// `(source id, target id, weight)` in insertion order.
    pub fn links(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.graph.edge_indices().filter_map(|e| self.link(e))
    }

    fn link(&self, e: EdgeIndex) -> Option<(&str, &str, u32)> {
        let (a, b) = self.graph.edge_endpoints(e)?;
        Some((
            self.graph[a].id.as_str(),
            self.graph[b].id.as_str(),
            self.graph[e],
        ))
    }

    /// Sum of all edge weights.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.graph.edge_weights().map(|&w| u64::from(w)).sum()
    }

    /// Weighted degree (strength) of every node, by index.
    #[must_use]
    pub fn strengths(&self) -> Vec<f64> {
        let mut strength = vec![0.0; self.node_count()];
        for edge in self.graph.edge_references() {
            let w = f64::from(*edge.weight());
            strength[edge.source().index()] += w;
            strength[edge.target().index()] += w;
        }
        strength
    }

    /// Weighted adjacency lists by node index.
    #[must_use]
    pub fn weighted_adjacency(&self) -> Vec<Vec<(usize, f64)>> {
        let mut adj = vec![Vec::new(); self.node_count()];
        for edge in self.graph.edge_references() {
            let (a, b) = (edge.source().index(), edge.target().index());
            let w = f64::from(*edge.weight());
            adj[a].push((b, w));
            adj[b].push((a, w));
        }
        adj
    }
}
