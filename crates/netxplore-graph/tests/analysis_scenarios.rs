//! End-to-end scenarios from transcript text to views and comparisons.

use netxplore_core::config::AnalysisConfig;
use netxplore_core::error::{AnalysisError, ErrorCode};
use netxplore_core::filter::{FilterSpec, RawFilterParams};
use netxplore_core::model::TranscriptFormat;
use netxplore_graph::compare::{CompareParams, MetricValue, RawCompareParams, compare};
use netxplore_graph::community::Algorithm;
use netxplore_graph::{analyze_file, analyze_text};
use tempfile::TempDir;

const ALICE_BOB: &str = "[01.01.2024, 10:00:00] Alice: hi\n\
[01.01.2024, 10:01:00] Bob: hello\n\
[01.01.2024, 10:02:00] Alice: bye\n";

fn spec(raw: RawFilterParams) -> FilterSpec {
    FilterSpec::from_params(&raw).expect("valid params")
}

#[test]
fn alice_and_bob_view() {
    let analysis = analyze_text(ALICE_BOB, &FilterSpec::default(), &AnalysisConfig::default());
    let view = analysis.view();

    assert_eq!(view.nodes.len(), 2);
    assert_eq!(view.nodes[0].id, "Alice");
    assert_eq!(view.nodes[0].messages, 2);
    assert_eq!(view.nodes[1].id, "Bob");
    assert_eq!(view.nodes[1].messages, 1);
    assert_eq!(view.links.len(), 1);
    assert_eq!(view.links[0].weight, 2);
    assert!((view.nodes[0].degree - 1.0).abs() < f64::EPSILON);
    assert!((view.nodes[0].pagerank.expect("pagerank") - 0.5).abs() < 1e-4);
}

#[test]
fn keyword_hello_leaves_single_node() {
    let analysis = analyze_text(
        ALICE_BOB,
        &spec(RawFilterParams {
            keywords: Some("hello".into()),
            ..RawFilterParams::default()
        }),
        &AnalysisConfig::default(),
    );
    let view = analysis.view();
    assert_eq!(view.nodes.len(), 1);
    assert_eq!(view.nodes[0].id, "Bob");
    assert!(view.links.is_empty());
    assert!((view.nodes[0].degree - 1.0).abs() < f64::EPSILON);
}

#[test]
fn limit_first_and_last_pick_disjoint_messages() {
    let text: String = (0..6)
        .map(|i| {
            let sender = ["Ann", "Ben", "Cat", "Dov", "Eli", "Fay"][i];
            format!("[01.01.2024, 10:0{i}:00] {sender}: message {i}\n")
        })
        .collect();
    let config = AnalysisConfig::default();

    let first = analyze_text(
        &text,
        &spec(RawFilterParams {
            limit: Some(3),
            ..RawFilterParams::default()
        }),
        &config,
    );
    let last = analyze_text(
        &text,
        &spec(RawFilterParams {
            limit: Some(3),
            limit_type: Some("last".into()),
            ..RawFilterParams::default()
        }),
        &config,
    );

    let ids = |a: &netxplore_graph::NetworkAnalysis| -> Vec<String> {
        a.view().nodes.into_iter().map(|n| n.id).collect()
    };
    assert_eq!(ids(&first), vec!["Ann", "Ben", "Cat"]);
    assert_eq!(ids(&last), vec!["Dov", "Eli", "Fay"]);
    assert_eq!(first.stats.retained_messages, 3);
}

#[test]
fn comparison_marks_common_participants() {
    let original = analyze_text(
        "[01.01.2024, 10:00:00] A: x\n[01.01.2024, 10:01:00] B: x\n[01.01.2024, 10:02:00] C: x\n",
        &FilterSpec::default(),
        &AnalysisConfig::default(),
    );
    let comparison = analyze_text(
        "[02.01.2024, 10:00:00] B: x\n[02.01.2024, 10:01:00] C: x\n[02.01.2024, 10:02:00] D: x\n",
        &FilterSpec::default(),
        &AnalysisConfig::default(),
    );
    let params = CompareParams::from_raw(&RawCompareParams {
        mark_common: true,
        metrics: Some("node_count".into()),
        ..RawCompareParams::default()
    })
    .expect("valid");

    let report = compare(&original.view(), &comparison.view(), &params);
    let common: Vec<&str> = report
        .original
        .nodes
        .iter()
        .filter(|n| n.is_common == Some(true))
        .map(|n| n.node.id.as_str())
        .collect();
    assert_eq!(common, vec!["B", "C"]);

    let nodes = report.metrics["node_count"];
    assert_eq!(nodes.difference, MetricValue::Count(0));
    assert!(report.metrics.contains_key("link_count"));
}

#[test]
fn talk_page_analysis() {
    let text = "== Proposal ==\n\
Support. [[User:Alice|Alice]] 10:00, 1 January 2024 (UTC)\n\
:Oppose. [[User:Bob|Bob]] 11:00, 1 January 2024 (UTC)\n\
::Why? [[User:Alice|Alice]] 12:00, 1 January 2024 (UTC)\n";
    let analysis = analyze_text(text, &FilterSpec::default(), &AnalysisConfig::default());
    assert_eq!(analysis.stats.format, TranscriptFormat::TalkPage);
    assert_eq!(analysis.stats.parsed_messages, 3);
    let view = analysis.view();
    assert_eq!(view.links.len(), 1);
    assert_eq!(view.links[0].weight, 2);

    let communities = analysis.communities(Algorithm::Louvain);
    assert_eq!(communities.num_communities, 1);
}

#[test]
fn analysis_from_disk_and_missing_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("chat.txt");
    std::fs::write(&path, ALICE_BOB).expect("write");

    let analysis =
        analyze_file(&path, &FilterSpec::default(), &AnalysisConfig::default()).expect("analyze");
    assert!(analysis.stats.source_hash.starts_with("blake3:"));
    assert_eq!(analysis.graph.node_count(), 2);

    let err = analyze_file(
        &dir.path().join("missing.txt"),
        &FilterSpec::default(),
        &AnalysisConfig::default(),
    )
    .expect_err("missing");
    assert!(matches!(err, AnalysisError::NotFound(_)));
    assert_eq!(err.code(), ErrorCode::TranscriptNotFound);
}

#[test]
fn repeated_analysis_is_identical() {
    let text = "[01.01.2024, 10:00:00] Ann: a\n\
[01.01.2024, 10:01:00] Ben: b\n\
[01.01.2024, 10:02:00] Cat: c\n\
[01.01.2024, 10:03:00] Ann: d\n\
[01.01.2024, 10:04:00] Dov: e\n\
[01.01.2024, 10:05:00] Eli: f\n\
[01.01.2024, 10:06:00] Fay: g\n\
[01.01.2024, 10:07:00] Dov: h\n\
[01.01.2024, 10:08:00] Cat: i\n\
[01.01.2024, 10:09:00] Ben: j\n";
    let spec = spec(RawFilterParams {
        anonymize: true,
        ..RawFilterParams::default()
    });
    let config = AnalysisConfig::default();

    let first = analyze_text(text, &spec, &config);
    let second = analyze_text(text, &spec, &config);
    assert_eq!(first.stats, second.stats);
    assert_eq!(first.view(), second.view());
    assert_eq!(
        serde_json::to_string(&first.view()).expect("json"),
        serde_json::to_string(&second.view()).expect("json")
    );

    for algorithm in Algorithm::ALL {
        let a = first.communities(algorithm);
        let b = second.communities(algorithm);
        assert_eq!(a, b, "{algorithm}");
        assert_eq!(
            serde_json::to_string(&a).expect("json"),
            serde_json::to_string(&b).expect("json"),
            "{algorithm}"
        );
    }
}
