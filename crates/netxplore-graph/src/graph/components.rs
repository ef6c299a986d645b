//! Connected components.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{NodeIndex, UnGraph};

/// Connected components in discovery order.
///
/// On an undirected graph every strongly connected component is a
/// connected component. Each one is listed in the order of its earliest
/// node and its members are sorted by index.
#[must_use]
pub fn connected_components<N, E>(graph: &UnGraph<N, E>) -> Vec<Vec<NodeIndex>> {
    let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(graph)
        .into_iter()
        .map(|mut members| {
            members.sort_unstable();
            members
        })
        .collect();
    components.sort_unstable_by_key(|members| members.first().copied());
    components
}

/// The largest connected component. Equal sizes go to the component that
/// contains the earliest node. Empty for an empty graph.
#[must_use]
pub fn largest_component<N, E>(graph: &UnGraph<N, E>) -> Vec<NodeIndex> {
    let mut best: Vec<NodeIndex> = Vec::new();
    for component in connected_components(graph) {
        if component.len() > best.len() {
            best = component;
        }
    }
    best
}
