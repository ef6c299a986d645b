//! Closeness centrality over hop distance.

use std::collections::VecDeque;

use super::Subgraph;

/// Closeness for each node of a connected subgraph, by local position.
///
/// `(m - 1) / Σ d(v, u)` where `m` is the subgraph size and `d` counts
/// hops. A lone node scores 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn closeness_centrality(sub: &Subgraph) -> Vec<f64> {
    let m = sub.len();
    let mut scores = vec![0.0; m];

    for (source, score) in scores.iter_mut().enumerate() {
        let mut dist: Vec<Option<usize>> = vec![None; m];
        let mut queue = VecDeque::from([source]);
        dist[source] = Some(0);
        let mut total = 0usize;
        let mut reached = 0usize;

        while let Some(v) = queue.pop_front() {
            let d = dist[v].unwrap_or_default();
            for &(w, _) in &sub.adj[v] {
                if dist[w].is_none() {
                    dist[w] = Some(d + 1);
                    total += d + 1;
                    reached += 1;
                    queue.push_back(w);
                }
            }
        }

        if total > 0 {
            *score = reached as f64 / total as f64;
        }
    }
    scores
}
