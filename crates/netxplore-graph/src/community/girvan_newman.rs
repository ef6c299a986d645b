//! Girvan-Newman divisive clustering, first split only.
//!
//! Repeatedly remove the edge with the highest (unweighted) edge
//! betweenness until the number of connected components grows, then report
//! the components. Ties between edges go to the earliest inserted one.

use std::collections::{HashMap, VecDeque};

use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;

use super::CommunityDetection;
use crate::graph::InteractionGraph;

/// First-level Girvan-Newman split.
#[derive(Debug, Clone, Copy, Default)]
pub struct GirvanNewman;

impl CommunityDetection for GirvanNewman {
    fn name(&self) -> &'static str {
        "girvan_newman"
    }

    fn detect(&self, g: &InteractionGraph) -> Vec<usize> {
        let n = g.node_count();
        let edges: Vec<(usize, usize)> = g
            .graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect();
        let mut alive = vec![true; edges.len()];

        let (mut labels, initial) = components(n, &edges, &alive);

        while alive.iter().any(|&a| a) {
            let scores = edge_betweenness(n, &edges, &alive);
            let mut best: Option<(usize, f64)> = None;
            for (id, &score) in scores.iter().enumerate() {
                if !alive[id] {
                    continue;
                }
                if best.is_none_or(|(_, top)| score > top + 1e-12) {
                    best = Some((id, score));
                }
            }
            let Some((removed, _)) = best else {
                break;
            };
            alive[removed] = false;

            let (split, count) = components(n, &edges, &alive);
            if count > initial {
                labels = split;
                break;
            }
        }

        labels
    }
}

fn adjacency(n: usize, edges: &[(usize, usize)], alive: &[bool]) -> Vec<Vec<(usize, usize)>> {
    let mut adj = vec![Vec::new(); n];
    for (id, &(a, b)) in edges.iter().enumerate() {
        if alive[id] {
            adj[a].push((b, id));
            adj[b].push((a, id));
        }
    }
    adj
}

/// Component label per node (discovery order) and the component count.
fn components(n: usize, edges: &[(usize, usize)], alive: &[bool]) -> (Vec<usize>, usize) {
    let mut sets = UnionFind::<usize>::new(n);
    for (&(a, b), _) in edges.iter().zip(alive).filter(|(_, live)| **live) {
        sets.union(a, b);
    }
    let mut roots: HashMap<usize, usize> = HashMap::new();
    let labels = (0..n)
        .map(|v| {
            let next = roots.len();
            *roots.entry(sets.find(v)).or_insert(next)
        })
        .collect();
    (labels, roots.len())
}

/// Brandes edge betweenness over hop distance, by edge id.
fn edge_betweenness(n: usize, edges: &[(usize, usize)], alive: &[bool]) -> Vec<f64> {
    let adj = adjacency(n, edges, alive);
    let mut scores = vec![0.0_f64; edges.len()];

    for s in 0..n {
        let mut order = Vec::with_capacity(n);
        let mut pred: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        let mut queue = VecDeque::from([s]);
        sigma[s] = 1.0;
        dist[s] = Some(0);

        while let Some(v) = queue.pop_front() {
            order.push(v);
            let dv = dist[v].unwrap_or_default();
            for &(w, id) in &adj[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    pred[w].push((v, id));
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = order.pop() {
            for &(v, id) in &pred[w] {
                let share = sigma[v] / sigma[w] * (1.0 + delta[w]);
                scores[id] += share;
                delta[v] += share;
            }
        }
    }
    scores
}
