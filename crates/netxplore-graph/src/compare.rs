//! Side-by-side comparison of two analyzed networks.
//!
//! Both views are re-filtered the same way: nodes by a case-insensitive
//! substring on their id, links by minimum weight with both endpoints
//! kept. Common nodes can be flagged, and requested metrics are reported as
//! `{original_count, comparison_count, difference, percent_change}`.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use netxplore_core::error::ParamError;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::view::{LinkView, NetworkView, NodeView, round4};

/// A metric that can be compared between two networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMetric {
    NodeCount,
    LinkCount,
    Density,
    TotalWeight,
    AverageDegree,
}

impl ComparisonMetric {
    pub const ALL: [Self; 5] = [
        Self::NodeCount,
        Self::LinkCount,
        Self::Density,
        Self::TotalWeight,
        Self::AverageDegree,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NodeCount => "node_count",
            Self::LinkCount => "link_count",
            Self::Density => "density",
            Self::TotalWeight => "total_weight",
            Self::AverageDegree => "average_degree",
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn measure(self, nodes: &[ComparedNode], links: &[LinkView]) -> MetricValue {
        let n = nodes.len() as f64;
        let l = links.len() as f64;
        match self {
            Self::NodeCount => MetricValue::count(nodes.len()),
            Self::LinkCount => MetricValue::count(links.len()),
            Self::TotalWeight => {
                MetricValue::Count(links.iter().map(|link| i64::from(link.weight)).sum())
            }
            Self::Density => MetricValue::Real(if nodes.len() < 2 {
                0.0
            } else {
                2.0 * l / (n * (n - 1.0))
            }),
            Self::AverageDegree => {
                MetricValue::Real(if nodes.is_empty() { 0.0 } else { 2.0 * l / n })
            }
        }
    }
}

impl FromStr for ComparisonMetric {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_str() == wanted)
            .ok_or_else(|| ParamError::UnknownMetric(s.to_string()))
    }
}

impl fmt::Display for ComparisonMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated comparison parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCompareParams {
    pub node_filter: Option<String>,
    pub min_weight: Option<u32>,
    pub mark_common: bool,
    /// Comma-separated metric names.
    pub metrics: Option<String>,
}

/// Validated comparison parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareParams {
    /// Lowercased substring; `None` keeps every node.
    pub node_filter: Option<String>,
    pub min_weight: u32,
    pub mark_common: bool,
    /// Requested metrics. When non-empty, node and link counts are always
    /// included.
    pub metrics: Vec<ComparisonMetric>,
}

impl Default for CompareParams {
    fn default() -> Self {
        Self {
            node_filter: None,
            min_weight: 1,
            mark_common: false,
            metrics: Vec::new(),
        }
    }
}

impl CompareParams {
    /// Validate raw parameters.
    ///
    /// # Errors
    ///
    /// [`ParamError::Zero`] for a zero `min_weight`, and
    /// [`ParamError::UnknownMetric`] for an unrecognized metric name.
    pub fn from_raw(raw: &RawCompareParams) -> Result<Self, ParamError> {
        if raw.min_weight == Some(0) {
            return Err(ParamError::Zero {
                field: "min_weight",
            });
        }

        let mut metrics: Vec<ComparisonMetric> = raw
            .metrics
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse::<ComparisonMetric>)
            .collect::<Result<_, _>>()?;
        if !metrics.is_empty() {
            metrics.extend([ComparisonMetric::NodeCount, ComparisonMetric::LinkCount]);
            metrics.sort_unstable();
            metrics.dedup();
        }

        Ok(Self {
            node_filter: raw
                .node_filter
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_lowercase),
            min_weight: raw.min_weight.unwrap_or(1),
            mark_common: raw.mark_common,
            metrics,
        })
    }
}

/// A node in a compared network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparedNode {
    #[serde(flatten)]
    pub node: NodeView,
    /// Present only when common-node marking was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_common: Option<bool>,
}

/// One side of a comparison after filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparedNetwork {
    pub nodes: Vec<ComparedNode>,
    pub links: Vec<LinkView>,
}

/// A measured metric. Counts stay integral; ratios are rounded to 4
/// decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(i64),
    Real(f64),
}

impl MetricValue {
    fn count(n: usize) -> Self {
        Self::Count(i64::try_from(n).unwrap_or(i64::MAX))
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Count(n) => n as f64,
            Self::Real(x) => x,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => fmt::Display::fmt(n, f),
            Self::Real(x) => fmt::Display::fmt(x, f),
        }
    }
}

/// Change in one metric between the two networks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    pub original_count: MetricValue,
    pub comparison_count: MetricValue,
    pub difference: MetricValue,
    /// `difference / original_count * 100`, 0 when `original_count` is 0.
    pub percent_change: f64,
}

impl MetricDelta {
    #[must_use]
    pub fn between(original: MetricValue, comparison: MetricValue) -> Self {
        let (base, target) = (original.as_f64(), comparison.as_f64());
        let percent_change = if base == 0.0 {
            0.0
        } else {
            round4((target - base) / base * 100.0)
        };
        match (original, comparison) {
            (MetricValue::Count(o), MetricValue::Count(c)) => Self {
                original_count: original,
                comparison_count: comparison,
                difference: MetricValue::Count(c.saturating_sub(o)),
                percent_change,
            },
            _ => Self {
                original_count: MetricValue::Real(round4(base)),
                comparison_count: MetricValue::Real(round4(target)),
                difference: MetricValue::Real(round4(target - base)),
                percent_change,
            },
        }
    }
}

/// Result of comparing two networks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub original: ComparedNetwork,
    pub comparison: ComparedNetwork,
    pub metrics: BTreeMap<String, MetricDelta>,
}

/// Compare `original` against `comparison`.
#[must_use]
#[instrument(skip_all, fields(original = original.nodes.len(), comparison = comparison.nodes.len()))]
pub fn compare(
    original: &NetworkView,
    comparison: &NetworkView,
    params: &CompareParams,
) -> ComparisonReport {
    let mut left = filter_network(original, params);
    let mut right = filter_network(comparison, params);

    if params.mark_common {
        let left_ids: HashSet<String> = left.nodes.iter().map(|n| n.node.id.clone()).collect();
        let right_ids: HashSet<String> = right.nodes.iter().map(|n| n.node.id.clone()).collect();
        for node in &mut left.nodes {
            node.is_common = Some(right_ids.contains(&node.node.id));
        }
        for node in &mut right.nodes {
            node.is_common = Some(left_ids.contains(&node.node.id));
        }
    }

    let metrics = params
        .metrics
        .iter()
        .map(|&metric| {
            let delta = MetricDelta::between(
                metric.measure(&left.nodes, &left.links),
                metric.measure(&right.nodes, &right.links),
            );
            (metric.as_str().to_string(), delta)
        })
        .collect();

    debug!(
        original_nodes = left.nodes.len(),
        comparison_nodes = right.nodes.len(),
        "comparison filtered"
    );

    ComparisonReport {
        original: left,
        comparison: right,
        metrics,
    }
}

fn filter_network(view: &NetworkView, params: &CompareParams) -> ComparedNetwork {
    let nodes: Vec<ComparedNode> = view
        .nodes
        .iter()
        .filter(|node| {
            params
                .node_filter
                .as_deref()
                .is_none_or(|needle| node.id.to_lowercase().contains(needle))
        })
        .map(|node| ComparedNode {
            node: node.clone(),
            is_common: None,
        })
        .collect();

    let kept: HashSet<&str> = nodes.iter().map(|n| n.node.id.as_str()).collect();
    let links = view
        .links
        .iter()
        .filter(|link| {
            link.weight >= params.min_weight
                && kept.contains(link.source.as_str())
                && kept.contains(link.target.as_str())
        })
        .cloned()
        .collect();

    ComparedNetwork { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> NodeView {
        NodeView {
            id: id.to_string(),
            messages: 1,
            degree: 0.0,
            betweenness: 0.0,
            closeness: None,
            eigenvector: None,
            pagerank: None,
        }
    }

    fn link(source: &str, target: &str, weight: u32) -> LinkView {
        LinkView {
            source: source.to_string(),
            target: target.to_string(),
            weight,
        }
    }

    fn view(ids: &[&str], links: &[(&str, &str, u32)]) -> NetworkView {
        NetworkView {
            nodes: ids.iter().map(|id| node(id)).collect(),
            links: links.iter().map(|(a, b, w)| link(a, b, *w)).collect(),
        }
    }

    #[test]
    fn metric_names_parse_and_counts_are_implied() {
        let params = CompareParams::from_raw(&RawCompareParams {
            metrics: Some("density".into()),
            ..RawCompareParams::default()
        })
        .expect("valid");
        assert_eq!(
            params.metrics,
            vec![
                ComparisonMetric::NodeCount,
                ComparisonMetric::LinkCount,
                ComparisonMetric::Density
            ]
        );

        let err = CompareParams::from_raw(&RawCompareParams {
            metrics: Some("node_count,diameter".into()),
            ..RawCompareParams::default()
        })
        .expect_err("unknown metric");
        assert_eq!(err, ParamError::UnknownMetric("diameter".into()));
    }

    #[test]
    fn zero_min_weight_is_rejected() {
        let err = CompareParams::from_raw(&RawCompareParams {
            min_weight: Some(0),
            ..RawCompareParams::default()
        })
        .expect_err("zero");
        assert_eq!(err, ParamError::Zero { field: "min_weight" });
    }

    #[test]
    fn common_nodes_are_marked_on_both_sides() {
        let a = view(&["A", "B", "C"], &[("A", "B", 1), ("B", "C", 1)]);
        let b = view(&["B", "C", "D"], &[("B", "C", 1), ("C", "D", 1)]);
        let params = CompareParams {
            mark_common: true,
            ..CompareParams::default()
        };
        let report = compare(&a, &b, &params);

        let common = |net: &ComparedNetwork| -> Vec<(String, Option<bool>)> {
            net.nodes
                .iter()
                .map(|n| (n.node.id.clone(), n.is_common))
                .collect()
        };
        assert_eq!(
            common(&report.original),
            vec![
                ("A".to_string(), Some(false)),
                ("B".to_string(), Some(true)),
                ("C".to_string(), Some(true)),
            ]
        );
        assert_eq!(
            common(&report.comparison),
            vec![
                ("B".to_string(), Some(true)),
                ("C".to_string(), Some(true)),
                ("D".to_string(), Some(false)),
            ]
        );
        assert!(report.metrics.is_empty());
    }

    #[test]
    fn node_filter_and_min_weight_prune_links() {
        let a = view(
            &["alice", "ALBERT", "bob"],
            &[("alice", "ALBERT", 3), ("alice", "bob", 5), ("ALBERT", "bob", 1)],
        );
        let params = CompareParams::from_raw(&RawCompareParams {
            node_filter: Some("Al".into()),
            min_weight: Some(2),
            ..RawCompareParams::default()
        })
        .expect("valid");
        let report = compare(&a, &a, &params);
        let ids: Vec<&str> = report.original.nodes.iter().map(|n| n.node.id.as_str()).collect();
        assert_eq!(ids, vec!["alice", "ALBERT"]);
        assert_eq!(report.original.links, vec![link("alice", "ALBERT", 3)]);
    }

    #[test]
    fn deltas_and_zero_baseline() {
        let empty = view(&[], &[]);
        let full = view(&["A", "B"], &[("A", "B", 4)]);
        let params = CompareParams::from_raw(&RawCompareParams {
            metrics: Some("total_weight".into()),
            ..RawCompareParams::default()
        })
        .expect("valid");

        let report = compare(&empty, &full, &params);
        let nodes = report.metrics["node_count"];
        assert_eq!(nodes.difference, MetricValue::Count(2));
        assert!(nodes.percent_change.abs() < f64::EPSILON);

        let back = compare(&full, &empty, &params);
        let weight = back.metrics["total_weight"];
        assert_eq!(weight.original_count, MetricValue::Count(4));
        assert_eq!(weight.difference, MetricValue::Count(-4));
        assert!((weight.percent_change + 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn counts_serialize_as_integers_and_ratios_as_floats() {
        let a = view(&["A", "B", "C"], &[("A", "B", 1), ("B", "C", 2)]);
        let b = view(&["A", "B"], &[("A", "B", 1)]);
        let params = CompareParams::from_raw(&RawCompareParams {
            metrics: Some("density".into()),
            ..RawCompareParams::default()
        })
        .expect("valid");
        let json = serde_json::to_value(compare(&a, &b, &params)).expect("serialize");
        let nodes = &json["metrics"]["node_count"];
        assert_eq!(nodes["original_count"].as_i64(), Some(3));
        assert_eq!(nodes["difference"].as_i64(), Some(-1));
        assert!(json["metrics"]["link_count"]["comparison_count"].is_i64());

        let density = &json["metrics"]["density"];
        assert!(density["original_count"].is_f64());
        assert_eq!(density["original_count"].as_f64(), Some(0.6667));
        assert_eq!(density["comparison_count"].as_f64(), Some(1.0));
        assert_eq!(density["percent_change"].as_f64(), Some(50.0));
    }

    #[test]
    fn is_common_is_omitted_unless_requested() {
        let a = view(&["A"], &[]);
        let report = compare(&a, &a, &CompareParams::default());
        let json = serde_json::to_value(&report).expect("serialize");
        assert!(json["original"]["nodes"][0].get("is_common").is_none());
        assert_eq!(json["original"]["nodes"][0]["id"], "A");
    }
}
