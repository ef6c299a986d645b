//! PageRank with weighted transitions.
//!
//! # Algorithm
//!
//! ```text
//! PR(v) = (1 - d) / m + d * Σ PR(u) * w(u, v) / s(u)
//! ```
//!
//! where `d` is the damping factor, `w` the edge weight and `s(u)` the
//! weighted degree of `u`. A node with no edges spreads its rank uniformly.
//! Iteration stops once the L1 change drops below `m · tolerance`.

use tracing::instrument;

use super::Subgraph;

/// Configuration for PageRank computation.
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Probability of following a link instead of teleporting.
    /// Default: 0.85.
    pub damping: f64,
    /// Per-node convergence threshold. Default: 1e-6.
    pub tolerance: f64,
    /// Default: 100.
    pub max_iter: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iter: 100,
        }
    }
}

/// Result of a PageRank computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankResult {
    /// Scores by local position; they sum to 1.
    pub scores: Vec<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged within `max_iter`.
    pub converged: bool,
}

/// Compute PageRank over a connected subgraph.
#[must_use]
#[instrument(skip(sub, config), fields(nodes = sub.len()))]
#[allow(clippy::cast_precision_loss)]
pub fn pagerank(sub: &Subgraph, config: &PageRankConfig) -> PageRankResult {
    let m = sub.len();
    if m == 0 {
        return PageRankResult {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }

    let m_f64 = m as f64;
    let teleport = (1.0 - config.damping) / m_f64;
    let strength: Vec<f64> = sub
        .adj
        .iter()
        .map(|nbrs| nbrs.iter().map(|&(_, w)| w).sum())
        .collect();

    let mut ranks = vec![1.0 / m_f64; m];
    let mut next = vec![0.0_f64; m];

    for iter in 1..=config.max_iter {
        let dangling: f64 = ranks
            .iter()
            .zip(&strength)
            .filter(|&(_, &s)| s == 0.0)
            .map(|(r, _)| r)
            .sum();
        let base = teleport + config.damping * dangling / m_f64;
        next.fill(base);

        for (v, nbrs) in sub.adj.iter().enumerate() {
            if strength[v] == 0.0 {
                continue;
            }
            let share = config.damping * ranks[v] / strength[v];
            for &(w, weight) in nbrs {
                next[w] += share * weight;
            }
        }

        let delta: f64 = ranks.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut ranks, &mut next);

        if delta < m_f64 * config.tolerance {
            return PageRankResult {
                scores: ranks,
                iterations: iter,
                converged: true,
            };
        }
    }

    PageRankResult {
        scores: ranks,
        iterations: config.max_iter,
        converged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted(adj: Vec<Vec<(usize, f64)>>) -> Subgraph {
        Subgraph::from_adjacency(adj)
    }

    #[test]
    fn single_node_holds_all_rank() {
        let result = pagerank(&weighted(vec![vec![]]), &PageRankConfig::default());
        assert!(result.converged);
        assert!((result.scores[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scores_sum_to_one() {
        let g = weighted(vec![
            vec![(1, 1.0), (2, 3.0)],
            vec![(0, 1.0)],
            vec![(0, 3.0), (3, 1.0)],
            vec![(2, 1.0)],
        ]);
        let result = pagerank(&g, &PageRankConfig::default());
        assert!(result.converged);
        let total: f64 = result.scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(result.scores.iter().all(|&s| s > 0.0 && s < 1.0));
    }

    #[test]
    fn symmetric_pair_splits_evenly() {
        let g = weighted(vec![vec![(1, 4.0)], vec![(0, 4.0)]]);
        let result = pagerank(&g, &PageRankConfig::default());
        assert!((result.scores[0] - 0.5).abs() < 1e-9);
        assert!((result.scores[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn heavier_link_attracts_rank() {
        // Hub 0 links to 1 with weight 5 and to 2 with weight 1.
        let g = weighted(vec![
            vec![(1, 5.0), (2, 1.0)],
            vec![(0, 5.0)],
            vec![(0, 1.0)],
        ]);
        let result = pagerank(&g, &PageRankConfig::default());
        assert!(result.scores[1] > result.scores[2]);
    }

    #[test]
    fn zero_iterations_never_converge() {
        let g = weighted(vec![vec![(1, 1.0)], vec![(0, 1.0)]]);
        let config = PageRankConfig {
            max_iter: 0,
            ..PageRankConfig::default()
        };
        let result = pagerank(&g, &config);
        assert!(!result.converged);
    }
}
