//! Chat-export line grammar.
//!
//! ```text
//! [01.01.2024, 10:00:00] Alice: hi
//! [1/1/24, 10:00:00 PM] ~ Bob: hello
//! 01/01/2024, 10:00 - +972 50-123-4567: media
//! [01.01.2024] Carol: date-only header
//! ```
//!
//! Dates are read day-first. Two-digit years are taken as 20xx. A header
//! without a time gets a midnight timestamp. An unbracketed header needs a
//! time, so prose that merely opens with a date is not mistaken for a
//! message.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};

use crate::model::{Language, Message};
use crate::parser::{SkipReason, normalize_sender, strip_bidi};

static CHAT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<open>\[)?(?P<date>\d{1,2}[./]\d{1,2}[./]\d{2,4})(?:,?\s+(?P<time>\d{1,2}:\d{2}(?::\d{2})?)(?:\s*(?P<ampm>[AaPp]\.?[Mm]\.?))?)?(?P<close>\])?(?:\s+-)?\s+(?P<rest>.+)$",
    )
    .expect("chat header regex is valid")
});

/// Body fragments that mark deleted messages and stripped attachments.
const OMITTED_MARKERS: &[&str] = &[
    "omitted",
    "הושמט",
    "this message was deleted",
    "you deleted this message",
    "הודעה זו נמחקה",
    "<attached:",
];

/// Whether `line` looks like a chat-export message header.
///
/// Used by format detection, so it requires a `sender:` part after the
/// timestamp and a time component.
pub(crate) fn looks_like_chat_line(line: &str) -> bool {
    let line = strip_bidi(line);
    CHAT_HEADER.captures(line.trim_start()).is_some_and(|caps| {
        is_header(&caps) && caps.name("time").is_some() && caps["rest"].contains(':')
    })
}

/// Bracketed `[date(, time)]`, or an unbracketed `date, time`.
fn is_header(caps: &Captures<'_>) -> bool {
    match (caps.name("open"), caps.name("close")) {
        (Some(_), Some(_)) => true,
        (None, None) => caps.name("time").is_some(),
        _ => false,
    }
}

/// Parse one chat-export line.
///
/// # Errors
///
/// Returns the [`SkipReason`] explaining why the line carries no message.
pub(crate) fn parse_chat_line(line_no: usize, raw: &str) -> Result<Message, SkipReason> {
    let line = strip_bidi(raw);
    let caps = CHAT_HEADER
        .captures(line.trim())
        .filter(is_header)
        .ok_or(SkipReason::NoHeader)?;

    let timestamp = parse_timestamp(&caps).ok_or(SkipReason::InvalidTimestamp)?;

    let (sender_part, body) = caps["rest"].split_once(':').ok_or(SkipReason::NoSender)?;
    let sender = normalize_sender(sender_part);
    if sender.is_empty() {
        return Err(SkipReason::EmptySender);
    }

    let content = body.trim().to_string();
    if is_omitted(&content) {
        return Err(SkipReason::Omitted);
    }

    Ok(Message {
        timestamp: Some(timestamp),
        sender,
        language: Language::detect(&content),
        content,
        depth: 0,
        line_no,
        raw_line: raw.to_string(),
    })
}

fn is_omitted(content: &str) -> bool {
    let lower = content.to_lowercase();
    OMITTED_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn parse_timestamp(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    let date = parse_day_first(&caps["date"])?;
    let time = match caps.name("time") {
        Some(t) => parse_clock(t.as_str(), caps.name("ampm").map(|m| m.as_str()))?,
        None => NaiveTime::MIN,
    };
    Some(date.and_time(time))
}

fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split(['.', '/']);
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year_raw = parts.next()?;
    let mut year: i32 = year_raw.parse().ok()?;
    if year_raw.len() <= 2 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_clock(raw: &str, ampm: Option<&str>) -> Option<NaiveTime> {
    let mut parts = raw.split(':');
    let mut hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next()?.parse().ok()?;
    let second: u32 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };

    if let Some(marker) = ampm {
        if hour == 0 || hour > 12 {
            return None;
        }
        let pm = marker.starts_with(['p', 'P']);
        hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}
