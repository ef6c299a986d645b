//! Eigenvector centrality via power iteration.
//!
//! # Algorithm
//!
//! Power iteration on `A + I`, where `A` is the weighted adjacency matrix.
//! Adding the identity shifts the spectrum so bipartite graphs (a plain
//! star, a single edge) converge instead of oscillating:
//!
//! 1. Start from a uniform vector summing to 1.
//! 2. `x' = x + A x`.
//! 3. Normalize `x'` to unit L2 norm.
//! 4. Stop once `Σ |x' - x| < m · tolerance`.
//!
//! Running out of iterations is reported through `converged`; callers
//! decide whether a partial answer is acceptable.

use tracing::instrument;

use super::Subgraph;

/// Result of eigenvector centrality computation.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenvectorResult {
    /// Scores by local position in the subgraph.
    pub scores: Vec<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged within `max_iter`.
    pub converged: bool,
}

/// Compute eigenvector centrality for a connected subgraph.
#[must_use]
#[instrument(skip(sub), fields(nodes = sub.len()))]
#[allow(clippy::cast_precision_loss)]
pub fn eigenvector_centrality(sub: &Subgraph, max_iter: usize, tolerance: f64) -> EigenvectorResult {
    let m = sub.len();
    if m == 0 {
        return EigenvectorResult {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }

    let mut x = vec![1.0 / m as f64; m];
    let threshold = m as f64 * tolerance;

    for iter in 1..=max_iter {
        let last = x.clone();
        for (v, nbrs) in sub.adj.iter().enumerate() {
            for &(w, weight) in nbrs {
                x[w] += last[v] * weight;
            }
        }

        let norm = x.iter().map(|s| s * s).sum::<f64>().sqrt();
        let norm = if norm > 0.0 { norm } else { 1.0 };
        for s in &mut x {
            *s /= norm;
        }

        let diff: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if diff < threshold {
            return EigenvectorResult {
                scores: x,
                iterations: iter,
                converged: true,
            };
        }
    }

    EigenvectorResult {
        scores: x,
        iterations: max_iter,
        converged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(adj: Vec<Vec<usize>>) -> Subgraph {
        Subgraph::from_adjacency(
            adj.into_iter()
                .map(|nbrs| nbrs.into_iter().map(|w| (w, 1.0)).collect())
                .collect(),
        )
    }

    #[test]
    fn empty_subgraph_converges_trivially() {
        let result = eigenvector_centrality(&Subgraph::default(), 100, 1e-6);
        assert!(result.converged);
        assert!(result.scores.is_empty());
    }

    #[test]
    fn single_node_is_one() {
        let result = eigenvector_centrality(&unit(vec![vec![]]), 100, 1e-6);
        assert!(result.converged);
        assert!((result.scores[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn star_center_dominates() {
        let star = unit(vec![vec![1, 2, 3], vec![0], vec![0], vec![0]]);
        let result = eigenvector_centrality(&star, 100, 1e-6);
        assert!(result.converged);
        // Principal eigenvector of a 3-leaf star: center sqrt(1/2), leaves sqrt(1/6).
        assert!((result.scores[0] - 0.5_f64.sqrt()).abs() < 1e-4);
        for leaf in &result.scores[1..] {
            assert!((leaf - (1.0_f64 / 6.0).sqrt()).abs() < 1e-4);
        }
    }

    #[test]
    fn triangle_is_uniform() {
        let tri = unit(vec![vec![1, 2], vec![0, 2], vec![0, 1]]);
        let result = eigenvector_centrality(&tri, 100, 1e-6);
        assert!(result.converged);
        for s in result.scores {
            assert!((s - (1.0_f64 / 3.0).sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn iteration_budget_is_respected() {
        let path = unit(vec![vec![1], vec![0, 2], vec![1, 3], vec![2]]);
        let result = eigenvector_centrality(&path, 1, 1e-12);
        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
    }
}
