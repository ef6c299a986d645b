//! Clauset-Newman-Moore greedy modularity maximization.
//!
//! Start from singletons and repeatedly merge the pair of linked
//! communities with the largest modularity gain
//!
//! ```text
//! ΔQ(i, j) = 2 (e_ij - a_i a_j)
//! ```
//!
//! where `e_ij` is the fraction of edge weight between `i` and `j` (counted
//! once per direction) and `a_i` the fraction of edge ends in `i`. Merging
//! stops when no pair improves modularity. Ties go to the pair with the
//! lowest community indices.

use std::collections::BTreeMap;

use petgraph::visit::EdgeRef;

use super::CommunityDetection;
use crate::graph::InteractionGraph;

const MIN_GAIN: f64 = 1e-12;

/// Weighted CNM agglomerative community detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyModularity;

impl CommunityDetection for GreedyModularity {
    fn name(&self) -> &'static str {
        "greedy_modularity"
    }

    #[allow(clippy::cast_precision_loss)]
    fn detect(&self, g: &InteractionGraph) -> Vec<usize> {
        let n = g.node_count();
        let mut owner: Vec<usize> = (0..n).collect();
        let total = g.total_weight();
        if total == 0 {
            return owner;
        }
        let m2 = 2.0 * total as f64;

        let mut a: Vec<f64> = g.strengths().into_iter().map(|s| s / m2).collect();
        let mut e: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        for edge in g.graph.edge_references() {
            let (i, j) = (edge.source().index(), edge.target().index());
            let w = f64::from(*edge.weight()) / m2;
            *e[i].entry(j).or_default() += w;
            *e[j].entry(i).or_default() += w;
        }

        loop {
            let mut best: Option<(usize, usize, f64)> = None;
            for (i, row) in e.iter().enumerate() {
                for (&j, &eij) in row.range(i + 1..) {
                    let dq = 2.0 * (eij - a[i] * a[j]);
                    if best.is_none_or(|(_, _, top)| dq > top + MIN_GAIN) {
                        best = Some((i, j, dq));
                    }
                }
            }

            match best {
                Some((i, j, dq)) if dq > MIN_GAIN => {
                    merge(&mut e, &mut a, i, j);
                    for community in &mut owner {
                        if *community == j {
                            *community = i;
                        }
                    }
                }
                _ => break,
            }
        }

        owner
    }
}

/// Fold community `j` into `i`.
fn merge(e: &mut [BTreeMap<usize, f64>], a: &mut [f64], i: usize, j: usize) {
    let row = std::mem::take(&mut e[j]);
    for (k, ejk) in row {
        e[k].remove(&j);
        if k == i {
            continue;
        }
        *e[i].entry(k).or_default() += ejk;
        *e[k].entry(i).or_default() += ejk;
    }
    a[i] += a[j];
    a[j] = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(n: usize, edges: &[(usize, usize)]) -> InteractionGraph {
        InteractionGraph::from_parts(
            (0..n).map(|i| (i.to_string(), 1)),
            edges.iter().map(|(a, b)| (a.to_string(), b.to_string(), 1)),
        )
    }

    #[test]
    fn no_edges_keeps_singletons() {
        assert_eq!(GreedyModularity.detect(&build(2, &[])), vec![0, 1]);
    }

    #[test]
    fn two_triangles_merge_into_two_groups() {
        let g = build(6, &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)]);
        let labels = GreedyModularity.detect(&g);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[3], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn disjoint_pairs_never_merge_across() {
        let g = build(4, &[(0, 1), (2, 3)]);
        let labels = GreedyModularity.detect(&g);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }
}
