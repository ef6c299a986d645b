//! Betweenness centrality via Brandes' algorithm.
//!
//! # Algorithm
//!
//! Brandes (2001) with Dijkstra in place of BFS, since edge weights are
//! treated as distances:
//!
//! 1. For each source `s`, run Dijkstra to get shortest-path counts
//!    (`sigma`) and predecessor lists.
//! 2. Accumulate dependencies in reverse settle order.
//! 3. Sum dependencies over all sources.
//!
//! Weights are integers, so distances are compared exactly and equal-length
//! paths are never lost to rounding.
//!
//! # Normalization
//!
//! Sums run over ordered `(s, t)` pairs, so each undirected path is counted
//! twice. Scaling by `1 / ((n-1)(n-2))` maps the result into `[0, 1]`.
//! Graphs with two or fewer nodes have no intermediate nodes and score 0.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::visit::EdgeRef;
use tracing::instrument;

use crate::graph::InteractionGraph;

/// Normalized betweenness for every node, by index.
#[must_use]
#[instrument(skip(g), fields(nodes = g.node_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn betweenness_centrality(g: &InteractionGraph) -> Vec<f64> {
    let n = g.node_count();
    let mut bc = vec![0.0_f64; n];
    if n <= 2 {
        return bc;
    }

    let adj: Vec<Vec<(usize, u64)>> = {
        let mut adj = vec![Vec::new(); n];
        for edge in g.graph.edge_references() {
            let (a, b) = (edge.source().index(), edge.target().index());
            let w = u64::from(*edge.weight());
            adj[a].push((b, w));
            adj[b].push((a, w));
        }
        adj
    };

    for s in 0..n {
        let mut settled: Vec<usize> = Vec::with_capacity(n);
        let mut done = vec![false; n];
        let mut pred: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist: Vec<Option<u64>> = vec![None; n];
        let mut heap = BinaryHeap::new();

        sigma[s] = 1.0;
        dist[s] = Some(0);
        heap.push(Reverse((0_u64, s)));

        while let Some(Reverse((d, v))) = heap.pop() {
            if done[v] {
                continue;
            }
            done[v] = true;
            settled.push(v);

            for &(w, weight) in &adj[v] {
                if done[w] {
                    continue;
                }
                let candidate = d + weight;
                match dist[w] {
                    Some(current) if candidate > current => {}
                    Some(current) if candidate == current => {
                        sigma[w] += sigma[v];
                        pred[w].push(v);
                    }
                    _ => {
                        dist[w] = Some(candidate);
                        sigma[w] = sigma[v];
                        pred[w].clear();
                        pred[w].push(v);
                        heap.push(Reverse((candidate, w)));
                    }
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = settled.pop() {
            for &v in &pred[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                bc[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    for score in &mut bc {
        *score *= scale;
    }
    bc
}
