//! Transcript parsing.
//!
//! [`parse_transcript`] detects the transcript format and turns text into
//! [`Message`]s. Lines that carry no message are never fatal: each one is
//! recorded in the [`ParseReport`] with a [`SkipReason`] so callers can see
//! how much of a file was dropped and why.

mod chat;
mod talk;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::ParserConfig;
use crate::model::{Language, Message, TranscriptFormat};

/// Why a line produced no message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Chat line without a recognizable `[date, time]` header.
    NoHeader,
    /// Header matched but the date or time is impossible.
    InvalidTimestamp,
    /// Header matched but no `sender:` separator follows.
    NoSender,
    /// Sender was empty after normalization.
    EmptySender,
    /// Deleted message or omitted media placeholder.
    Omitted,
    /// Talk-page line with no sender marker and no prior context.
    Unattributed,
    /// Talk-page section heading.
    Heading,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoHeader => "no_header",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::NoSender => "no_sender",
            Self::EmptySender => "empty_sender",
            Self::Omitted => "omitted",
            Self::Unattributed => "unattributed",
            Self::Heading => "heading",
        };
        f.write_str(s)
    }
}

/// A non-blank line that produced no message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line_no: usize,
    pub reason: SkipReason,
}

/// Result of parsing one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    pub format: TranscriptFormat,
    /// Dominant language of the whole text.
    pub language: Language,
    /// Messages in source line order.
    pub messages: Vec<Message>,
    pub skipped: Vec<SkippedLine>,
    /// Number of lines in the input, blank ones included.
    pub total_lines: usize,
}

impl ParseReport {
    fn new(format: TranscriptFormat) -> Self {
        Self {
            format,
            language: Language::English,
            messages: Vec::new(),
            skipped: Vec::new(),
            total_lines: 0,
        }
    }

    fn skip(&mut self, line_no: usize, reason: SkipReason) {
        self.skipped.push(SkippedLine { line_no, reason });
    }

    /// How many lines were skipped for `reason`.
    #[must_use]
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }

    /// Skip totals per reason, omitting reasons that never occurred.
    #[must_use]
    pub fn skip_counts(&self) -> BTreeMap<SkipReason, usize> {
        let mut counts = BTreeMap::new();
        for skipped in &self.skipped {
            *counts.entry(skipped.reason).or_insert(0) += 1;
        }
        counts
    }
}

/// Detect the format and parse `text`.
#[instrument(skip_all, fields(bytes = text.len()))]
pub fn parse_transcript(text: &str, config: &ParserConfig) -> ParseReport {
    let format = detect_format(text, config.detect_lines);
    debug!(%format, "detected transcript format");
    parse_as(text, format)
}

/// Parse `text` with a known format.
pub fn parse_as(text: &str, format: TranscriptFormat) -> ParseReport {
    let mut report = match format {
        TranscriptFormat::ChatExport => parse_chat(text),
        TranscriptFormat::TalkPage => talk::parse(text),
    };
    report.language = Language::detect(text);
    if !report.skipped.is_empty() {
        warn!(
            skipped = report.skipped.len(),
            messages = report.messages.len(),
            "some transcript lines produced no message"
        );
    }
    report
}

/// Inspect the first `lines` lines and pick a grammar.
///
/// Any chat-export header wins; otherwise a `User:` / `משתמש:` marker means
/// a talk page; otherwise chat export.
#[must_use]
pub fn detect_format(text: &str, lines: usize) -> TranscriptFormat {
    let head: Vec<&str> = text.lines().take(lines).collect();
    if head.iter().any(|line| chat::looks_like_chat_line(line)) {
        return TranscriptFormat::ChatExport;
    }
    if head
        .iter()
        .any(|line| line.contains("User:") || line.contains("משתמש:"))
    {
        return TranscriptFormat::TalkPage;
    }
    TranscriptFormat::ChatExport
}

fn parse_chat(text: &str) -> ParseReport {
    let mut report = ParseReport::new(TranscriptFormat::ChatExport);
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        report.total_lines = line_no;
        if line.trim().is_empty() {
            continue;
        }
        match chat::parse_chat_line(line_no, line) {
            Ok(message) => report.messages.push(message),
            Err(reason) => report.skip(line_no, reason),
        }
    }
    report
}

const fn is_bidi_control(c: char) -> bool {
    matches!(
        c,
        '\u{200E}' | '\u{200F}' | '\u{061C}' | '\u{FEFF}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}'
    )
}

/// Drop leading bidi-control characters.
pub(crate) fn strip_bidi(line: &str) -> &str {
    line.trim_start_matches(is_bidi_control)
}

/// Canonical sender identity: no bidi controls anywhere, no leading `~`,
/// no surrounding whitespace.
#[must_use]
pub fn normalize_sender(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !is_bidi_control(*c)).collect();
    cleaned
        .trim()
        .trim_start_matches('~')
        .trim()
        .to_string()
}

/// Decode transcript bytes: UTF-8 with any BOM removed, falling back to
/// ISO-8859-1 when the bytes are not valid UTF-8.
#[must_use]
pub fn decode_transcript(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
