use netxplore_core::config::ParserConfig;
use netxplore_core::filter::{self, AnonymizationMap, FilterSpec, LimitType};
use netxplore_core::model::{IdentityKind, TranscriptFormat};
use netxplore_core::parser::{parse_as, parse_transcript};
use proptest::prelude::*;
use std::collections::HashSet;

const SENDERS: &[&str] = &["Alice", "Bob", "Carol", "+972 50-123-4567", "~ Dana"];

fn arb_text() -> impl Strategy<Value = String> {
    proptest::collection::vec("\\PC{0,60}", 0..30).prop_map(|lines| lines.join("\n"))
}

/// Chat-export lines built from (sender index, body) pairs.
fn arb_chat() -> impl Strategy<Value = Vec<(usize, String)>> {
    proptest::collection::vec(
        (0..SENDERS.len(), "[a-z]{1,6}( [a-z]{1,6}){0,2}"),
        0..40,
    )
}

fn render_chat(lines: &[(usize, String)]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, (sender, body))| {
            format!(
                "[01.01.2024, {:02}:{:02}:00] {}: {}",
                i / 60,
                i % 60,
                SENDERS[*sender],
                body
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn never_more_messages_than_lines(text in arb_text()) {
        let report = parse_transcript(&text, &ParserConfig::default());
        prop_assert!(report.messages.len() + report.skipped.len() <= report.total_lines);
        for msg in &report.messages {
            prop_assert!(!msg.sender.is_empty());
            prop_assert!(msg.line_no >= 1 && msg.line_no <= report.total_lines);
        }
    }

    #[test]
    fn talk_page_parse_never_panics_and_keeps_line_order(text in arb_text()) {
        let report = parse_as(&text, TranscriptFormat::TalkPage);
        let lines: Vec<usize> = report.messages.iter().map(|m| m.line_no).collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        prop_assert_eq!(lines, sorted);
    }

    #[test]
    fn well_formed_chat_parses_every_line(lines in arb_chat()) {
        let text = render_chat(&lines);
        let report = parse_transcript(&text, &ParserConfig::default());
        prop_assert_eq!(report.format, TranscriptFormat::ChatExport);
        prop_assert_eq!(report.messages.len(), lines.len());
        prop_assert!(report.skipped.is_empty());
        for (msg, (sender, body)) in report.messages.iter().zip(&lines) {
            prop_assert_eq!(&msg.content, body);
            prop_assert_eq!(msg.sender.as_str(), SENDERS[*sender].trim_start_matches("~ "));
        }
    }

    #[test]
    fn counts_and_edges_are_consistent(lines in arb_chat()) {
        let report = parse_transcript(&render_chat(&lines), &ParserConfig::default());
        let out = filter::run(&report.messages, &FilterSpec::default());

        let total: usize = out.counts.iter().map(|s| s.message_count).sum();
        prop_assert_eq!(total, out.retained.len());

        let weight: u32 = out.edges.iter().map(|e| e.weight).sum();
        prop_assert!(weight as usize <= out.retained.len().saturating_sub(1));
        for edge in &out.edges {
            prop_assert_ne!(&edge.source, &edge.target);
        }
    }

    #[test]
    fn limit_keeps_at_most_limit_from_the_right_end(lines in arb_chat(), limit in 1usize..20) {
        let report = parse_transcript(&render_chat(&lines), &ParserConfig::default());
        let first = filter::run(&report.messages, &FilterSpec { limit: Some(limit), ..FilterSpec::default() });
        let last = filter::run(&report.messages, &FilterSpec {
            limit: Some(limit),
            limit_type: LimitType::Last,
            ..FilterSpec::default()
        });
        prop_assert_eq!(first.retained.len(), limit.min(lines.len()));
        prop_assert_eq!(last.retained.len(), limit.min(lines.len()));
        if lines.len() >= 2 * limit {
            let first_lines: HashSet<usize> = first.retained.iter().map(|m| m.line_no).collect();
            prop_assert!(last.retained.iter().all(|m| !first_lines.contains(&m.line_no)));
        }
    }

    #[test]
    fn anonymization_is_injective_and_kind_preserving(
        names in proptest::collection::hash_set("\\+?[0-9A-Za-z ]{1,12}", 0..30)
    ) {
        let map = AnonymizationMap::from_senders(names.iter().map(String::as_str));
        let mut seen = HashSet::new();
        for name in &names {
            let pseudonym = map.get(name).expect("assigned");
            prop_assert!(seen.insert(pseudonym.to_string()));
            match IdentityKind::of(name) {
                IdentityKind::Phone => prop_assert!(pseudonym.starts_with("Phone_")),
                IdentityKind::Name => prop_assert!(pseudonym.starts_with("User_")),
            }
        }
    }
}
