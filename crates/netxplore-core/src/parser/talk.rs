//! Wiki talk-page grammar.
//!
//! A line names its author through a user link (`[[User:Name|...]]`,
//! `[[משתמש:Name]]`), a bare `User:Name`, or a bold leading token. Leading
//! colons give the reply depth. Lines without an author marker inherit one:
//! at the same or a deeper depth they keep the current author; when the
//! depth decreases they take the author of the nearest earlier message at
//! that depth within the current section. This is an approximation of the
//! real reply tree, which the markup does not encode.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::model::{Language, Message, TranscriptFormat};
use crate::parser::{ParseReport, SkipReason, normalize_sender, strip_bidi};

static USER_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[\s*(?:(?i:user(?:[ _]talk)?)|שיחת משתמש|משתמש)\s*:\s*([^\]|/#]+)")
        .expect("user link regex is valid")
});

static BARE_USER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:User|משתמש):([^\s\]|,()]+)").expect("bare user regex is valid")
});

static BOLD_LEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:'''(?P<q>[^']+?)'''|<b>(?P<b>.+?)</b>|<strong>(?P<s>.+?)</strong>)\s*:?\s*")
        .expect("bold lead regex is valid")
});

static SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}:\d{2}), (\d{1,2} \p{L}+ \d{4}) \(UTC\)")
        .expect("signature regex is valid")
});

struct Attribution {
    sender: String,
    content: String,
}

pub(super) fn parse(text: &str) -> ParseReport {
    let mut report = ParseReport::new(TranscriptFormat::TalkPage);
    let mut current: Option<String> = None;
    let mut prev_depth = 0usize;
    // Index of the first message in the current section.
    let mut section_start = 0usize;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        report.total_lines = line_no;

        let line = strip_bidi(raw).trim();
        if line.is_empty() {
            continue;
        }
        if is_heading(line) {
            current = None;
            prev_depth = 0;
            section_start = report.messages.len();
            report.skip(line_no, SkipReason::Heading);
            continue;
        }

        let depth = line.chars().take_while(|&c| c == ':').count();
        let body = line[depth..].trim_start_matches(['*', '#']).trim();

        let attribution = match find_author(body) {
            Some(found) => {
                if found.sender.is_empty() {
                    report.skip(line_no, SkipReason::EmptySender);
                    continue;
                }
                current = Some(found.sender.clone());
                prev_depth = depth;
                found
            }
            None => {
                let Some(current_sender) = current.as_ref() else {
                    report.skip(line_no, SkipReason::Unattributed);
                    continue;
                };
                let sender = if depth >= prev_depth {
                    current_sender.clone()
                } else {
                    prev_depth = depth;
                    report.messages[section_start..]
                        .iter()
                        .rev()
                        .find(|msg| msg.depth == depth)
                        .map_or_else(|| current_sender.clone(), |msg| msg.sender.clone())
                };
                Attribution {
                    sender,
                    content: body.to_string(),
                }
            }
        };

        report.messages.push(Message {
            timestamp: signature_time(body),
            sender: attribution.sender,
            language: Language::detect(&attribution.content),
            content: attribution.content,
            depth,
            line_no,
            raw_line: raw.to_string(),
        });
    }
    report
}

fn is_heading(line: &str) -> bool {
    line.len() >= 2 && line.starts_with('=') && line.ends_with('=')
}

/// Author named on this line, if any. The last user link wins since the
/// signature closes the comment.
fn find_author(body: &str) -> Option<Attribution> {
    if let Some(caps) = USER_LINK.captures_iter(body).last() {
        return Some(Attribution {
            sender: clean_user_name(&caps[1]),
            content: body.to_string(),
        });
    }
    if let Some(caps) = BARE_USER.captures_iter(body).last() {
        return Some(Attribution {
            sender: clean_user_name(&caps[1]),
            content: body.to_string(),
        });
    }
    let caps = BOLD_LEAD.captures(body)?;
    let name = caps
        .name("q")
        .or_else(|| caps.name("b"))
        .or_else(|| caps.name("s"))?;
    Some(Attribution {
        sender: normalize_sender(name.as_str()),
        content: body[caps.get(0).map_or(0, |m| m.end())..].to_string(),
    })
}

fn clean_user_name(raw: &str) -> String {
    normalize_sender(&raw.replace('_', " "))
}

fn signature_time(body: &str) -> Option<NaiveDateTime> {
    let caps = SIGNATURE.captures_iter(body).last()?;
    let stamp = format!("{} {}", &caps[1], &caps[2]);
    NaiveDateTime::parse_from_str(&stamp, "%H:%M %d %B %Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn senders(report: &ParseReport) -> Vec<&str> {
        report.messages.iter().map(|m| m.sender.as_str()).collect()
    }

    #[test]
    fn user_links_name_the_author() {
        let text = "Support. [[User:Alice_Smith|Alice]] 10:00, 1 January 2024 (UTC)\n\
                    :Oppose. [[משתמש:דנה|דנה]]\n";
        let report = parse(text);
        assert_eq!(senders(&report), vec!["Alice Smith", "דנה"]);
        assert_eq!(report.messages[0].depth, 0);
        assert_eq!(report.messages[1].depth, 1);
        assert_eq!(
            report.messages[0].timestamp,
            NaiveDateTime::parse_from_str("2024-01-01 10:00:00", "%Y-%m-%d %H:%M:%S").ok()
        );
        assert!(report.messages[1].timestamp.is_none());
    }

    #[test]
    fn last_link_is_the_signature() {
        let text = "As [[User:Bob]] said, agreed. [[User:Carol|Carol]] ([[User talk:Carol|talk]])\n";
        let report = parse(text);
        assert_eq!(senders(&report), vec!["Carol"]);
    }

    #[test]
    fn bold_lead_and_bare_user_markers() {
        let text = "'''Dana''': first\nsigned User:Eve\n<strong>Finn</strong> third\n";
        let report = parse(text);
        assert_eq!(senders(&report), vec!["Dana", "Eve", "Finn"]);
        assert_eq!(report.messages[0].content, "first");
        assert_eq!(report.messages[2].content, "third");
    }

    #[test]
    fn unmarked_lines_inherit_by_depth() {
        let text = "Root [[User:Alice]]\n\
                    ::continued at depth two\n\
                    :Reply [[User:Bob]]\n\
                    ::::deeper without marker\n\
                    Back at top level\n";
        let report = parse(text);
        // Line 2 keeps Alice; line 4 keeps Bob; line 5 goes back to the
        // last depth-0 message, which is Alice's.
        assert_eq!(senders(&report), vec!["Alice", "Alice", "Bob", "Bob", "Alice"]);
    }

    #[test]
    fn shallower_line_without_same_depth_keeps_current() {
        let text = "::Deep [[User:Alice]]\n:shallower text\n";
        let report = parse(text);
        assert_eq!(senders(&report), vec!["Alice", "Alice"]);
    }

    #[test]
    fn headings_reset_attribution() {
        let text = "Opening [[User:Alice]]\n== Next topic ==\norphan line\nNew [[User:Bob]]\n";
        let report = parse(text);
        assert_eq!(senders(&report), vec!["Alice", "Bob"]);
        assert_eq!(report.skipped_for(SkipReason::Heading), 1);
        assert_eq!(report.skipped_for(SkipReason::Unattributed), 1);
        assert_eq!(report.skipped[1].line_no, 3);
    }

    #[test]
    fn shallower_line_does_not_reach_into_previous_section() {
        let text = "Opening [[User:Alice]]\n== Next ==\n::Deep [[User:Bob]]\nshallow unmarked\n";
        let report = parse(text);
        assert_eq!(senders(&report), vec!["Alice", "Bob", "Bob"]);
        assert_eq!(report.messages[2].line_no, 4);
    }

    #[test]
    fn leading_text_without_context_is_unattributed() {
        let report = parse("intro paragraph\n");
        assert!(report.messages.is_empty());
        assert_eq!(report.skipped_for(SkipReason::Unattributed), 1);
    }
}
