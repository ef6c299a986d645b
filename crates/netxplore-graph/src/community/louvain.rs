//! Louvain method (Blondel et al. 2008).
//!
//! Two phases, repeated until nothing moves:
//!
//! 1. **Local moving**: visit nodes in index order and move each one to the
//!    neighboring community with the largest modularity gain, until a full
//!    pass makes no move.
//! 2. **Aggregation**: collapse every community into one node. Internal
//!    weight becomes a self-loop, parallel edges are summed.
//!
//! Node visits and candidate communities follow index order, and a move
//! needs a strictly positive gain over staying put, so the result is
//! deterministic for a given graph.

use std::collections::BTreeMap;

use super::{CommunityDetection, renumber};
use crate::graph::InteractionGraph;

const MIN_GAIN: f64 = 1e-12;

/// Weighted, deterministic Louvain community detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Louvain;

impl CommunityDetection for Louvain {
    fn name(&self) -> &'static str {
        "louvain"
    }

    fn detect(&self, g: &InteractionGraph) -> Vec<usize> {
        let mut membership: Vec<usize> = (0..g.node_count()).collect();
        let mut level = Level::from_adjacency(g.weighted_adjacency());

        loop {
            let Some(labels) = level.local_moving() else {
                break;
            };
            let (labels, count) = renumber(&labels);
            for community in &mut membership {
                *community = labels[*community];
            }
            if count == level.len() {
                break;
            }
            level = level.aggregate(&labels, count);
        }

        membership
    }
}

/// One level of the hierarchy: a weighted graph whose nodes may carry
/// self-loop weight from earlier aggregation.
struct Level {
    adj: Vec<Vec<(usize, f64)>>,
    self_loops: Vec<f64>,
}

impl Level {
    fn from_adjacency(adj: Vec<Vec<(usize, f64)>>) -> Self {
        let self_loops = vec![0.0; adj.len()];
        Self { adj, self_loops }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    fn strengths(&self) -> Vec<f64> {
        self.adj
            .iter()
            .zip(&self.self_loops)
            .map(|(nbrs, &loop_w)| nbrs.iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * loop_w)
            .collect()
    }

    /// Community label per node, or `None` if no node moved.
    fn local_moving(&self) -> Option<Vec<usize>> {
        let n = self.len();
        let k = self.strengths();
        let m2: f64 = k.iter().sum();
        if m2 <= 0.0 {
            return None;
        }

        let mut community: Vec<usize> = (0..n).collect();
        let mut tot = k.clone();
        let mut moved_any = false;

        loop {
            let mut moved = false;
            for i in 0..n {
                let current = community[i];

                let mut links: Vec<(usize, f64)> = Vec::new();
                for &(j, w) in &self.adj[i] {
                    let c = community[j];
                    match links.iter_mut().find(|(seen, _)| *seen == c) {
                        Some(entry) => entry.1 += w,
                        None => links.push((c, w)),
                    }
                }

                tot[current] -= k[i];
                let own = links
                    .iter()
                    .find(|(c, _)| *c == current)
                    .map_or(0.0, |&(_, w)| w);
                let mut best = current;
                let mut best_gain = own - tot[current] * k[i] / m2;
                for &(c, w) in &links {
                    let gain = w - tot[c] * k[i] / m2;
                    if gain > best_gain + MIN_GAIN {
                        best = c;
                        best_gain = gain;
                    }
                }
                tot[best] += k[i];
                community[i] = best;

                if best != current {
                    moved = true;
                    moved_any = true;
                }
            }
            if !moved {
                break;
            }
        }

        moved_any.then_some(community)
    }

    fn aggregate(&self, labels: &[usize], count: usize) -> Self {
        let mut self_loops = vec![0.0; count];
        let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];

        for (i, nbrs) in self.adj.iter().enumerate() {
            let a = labels[i];
            self_loops[a] += self.self_loops[i];
            for &(j, w) in nbrs {
                let b = labels[j];
                if a == b {
                    if i < j {
                        self_loops[a] += w;
                    }
                } else {
                    *links[a].entry(b).or_default() += w;
                }
            }
        }

        Self {
            adj: links.into_iter().map(|m| m.into_iter().collect()).collect(),
            self_loops,
        }
    }
}
