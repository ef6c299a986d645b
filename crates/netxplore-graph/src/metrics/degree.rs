//! Degree centrality.

use crate::graph::InteractionGraph;

/// Fraction of other participants each node is linked to, by node index.
///
/// Computed over the full graph: `deg / (n - 1)`. A single-node graph
/// scores 1.0 for its only node.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn degree_centrality(g: &InteractionGraph) -> Vec<f64> {
    let n = g.node_count();
    if n == 1 {
        return vec![1.0];
    }
    let scale = 1.0 / (n.saturating_sub(1)) as f64;
    g.graph
        .node_indices()
        .map(|idx| g.graph.neighbors(idx).count() as f64 * scale)
        .collect()
}
