//! Shared value types produced by the parser and consumed by the filter
//! pipeline and graph builder.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which transcript grammar a text was parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptFormat {
    /// `[D.M.YYYY, HH:MM:SS] Sender: message` chat exports.
    ChatExport,
    /// Wiki talk pages with `User:` links and colon indentation.
    TalkPage,
}

impl fmt::Display for TranscriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChatExport => f.write_str("chat_export"),
            Self::TalkPage => f.write_str("talk_page"),
        }
    }
}

/// Dominant script of a message or transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "he")]
    Hebrew,
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Hebrew when more than 15% of the characters are in the Hebrew
    /// block (U+0590..U+05FF), English otherwise.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let (hebrew, total) = text.chars().fold((0usize, 0usize), |(h, t), c| {
            (h + usize::from(('\u{0590}'..='\u{05FF}').contains(&c)), t + 1)
        });
        // hebrew / total > 0.15, kept in integers
        if hebrew * 100 > total * 15 {
            Self::Hebrew
        } else {
            Self::English
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hebrew => f.write_str("he"),
            Self::English => f.write_str("en"),
        }
    }
}

/// One attributed message from a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Parsed send time. Talk-page comments without a signature have none.
    pub timestamp: Option<NaiveDateTime>,
    /// Normalized sender identity. Never empty.
    pub sender: String,
    /// Message body.
    pub content: String,
    /// Detected from the body.
    pub language: Language,
    /// Leading-colon nesting depth (talk pages); 0 for chat exports.
    pub depth: usize,
    /// 1-based line number in the source text.
    pub line_no: usize,
    /// The source line, verbatim.
    pub raw_line: String,
}

impl Message {
    /// Number of characters in the body, as used by the length filters.
    #[must_use]
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Whether a sender identity is a phone number or a display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    Phone,
    Name,
}

impl IdentityKind {
    /// Classify a normalized sender string.
    ///
    /// Chat exports list unsaved contacts by their international number,
    /// which always starts with `+` once bidi marks are stripped.
    #[must_use]
    pub fn of(sender: &str) -> Self {
        let mut chars = sender.chars();
        match (chars.next(), chars.next()) {
            (Some('+'), Some(d)) if d.is_ascii_digit() => Self::Phone,
            _ => Self::Name,
        }
    }
}

/// Message count for one raw (pre-anonymization) sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStat {
    pub sender_id: String,
    pub message_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_numbers_are_classified_as_phone() {
        assert_eq!(IdentityKind::of("+972 50-123-4567"), IdentityKind::Phone);
        assert_eq!(IdentityKind::of("+1 555 0100"), IdentityKind::Phone);
    }

    #[test]
    fn display_names_are_classified_as_name() {
        assert_eq!(IdentityKind::of("Alice"), IdentityKind::Name);
        assert_eq!(IdentityKind::of("+"), IdentityKind::Name);
        assert_eq!(IdentityKind::of("+plus"), IdentityKind::Name);
    }

    #[test]
    fn language_follows_hebrew_share() {
        assert_eq!(Language::detect("שלום לכולם"), Language::Hebrew);
        assert_eq!(Language::detect("hello everyone"), Language::English);
        assert_eq!(Language::detect(""), Language::English);
        // 2 of 14 characters is under the threshold; 2 of 11 is over it.
        assert_eq!(Language::detect("abcdefghijk של"), Language::English);
        assert_eq!(Language::detect("abcdefgh של"), Language::Hebrew);
        assert_eq!(serde_json::to_value(Language::Hebrew).expect("json"), "he");
    }

    #[test]
    fn content_len_counts_characters_not_bytes() {
        let msg = Message {
            timestamp: None,
            sender: "Dana".into(),
            content: "שלום".into(),
            language: Language::Hebrew,
            depth: 0,
            line_no: 1,
            raw_line: String::new(),
        };
        assert_eq!(msg.content_len(), 4);
    }
}
