//! Weighted modularity of a partition.
//!
//! ```text
//! Q = Σ_c [ L_c / m - (D_c / 2m)^2 ]
//! ```
//!
//! `m` is the total edge weight, `L_c` the weight inside community `c` and
//! `D_c` the summed weighted degree of its members.

use std::collections::HashMap;

use petgraph::visit::EdgeRef;

use crate::graph::InteractionGraph;

/// Modularity of `labels` (one community label per node index).
///
/// `None` when the graph has no edges, where modularity is undefined.
#[must_use]
pub fn modularity(g: &InteractionGraph, labels: &[usize]) -> Option<f64> {
    let m = g.total_weight();
    if m == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let m = m as f64;

    let mut internal: HashMap<usize, f64> = HashMap::new();
    let mut degree: HashMap<usize, f64> = HashMap::new();
    for edge in g.graph.edge_references() {
        let w = f64::from(*edge.weight());
        let (a, b) = (labels[edge.source().index()], labels[edge.target().index()]);
        if a == b {
            *internal.entry(a).or_default() += w;
        }
        *degree.entry(a).or_default() += w;
        *degree.entry(b).or_default() += w;
    }

    let q = degree
        .iter()
        .map(|(c, &d)| {
            let l = internal.get(c).copied().unwrap_or_default();
            l / m - (d / (2.0 * m)).powi(2)
        })
        .sum();
    Some(q)
}
