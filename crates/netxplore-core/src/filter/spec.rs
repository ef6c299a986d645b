//! Validated filter configuration.
//!
//! Callers hand over loosely-typed parameters ([`RawFilterParams`]: date and
//! time strings, comma-separated lists) exactly as they arrive from a query
//! string or command line. [`FilterSpec::from_params`] validates them once and
//! produces an immutable value that the pipeline reads without re-parsing.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Which end of the time-filtered sequence a `limit` keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitType {
    #[default]
    First,
    Last,
}

impl FromStr for LimitType {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            _ => Err(ParamError::InvalidLimitType(s.to_string())),
        }
    }
}

impl fmt::Display for LimitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Last => f.write_str("last"),
        }
    }
}

/// Unvalidated filter parameters as supplied by a caller.
///
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFilterParams {
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub limit: Option<usize>,
    pub limit_type: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub keywords: Option<String>,
    pub min_messages: Option<usize>,
    pub max_messages: Option<usize>,
    pub active_users: Option<usize>,
    pub selected_users: Option<String>,
    pub username: Option<String>,
    pub anonymize: bool,
}

/// Validated, immutable filter configuration for one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Inclusive lower time bound.
    pub start: Option<NaiveDateTime>,
    /// Inclusive upper time bound.
    pub end: Option<NaiveDateTime>,
    pub limit: Option<usize>,
    pub limit_type: LimitType,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Lowercased, trimmed, non-empty keywords. A message passes if any match.
    pub keywords: Vec<String>,
    pub min_messages: Option<usize>,
    pub max_messages: Option<usize>,
    pub active_users_top_k: Option<usize>,
    /// Lowercased allow-list of raw sender names.
    pub selected_users: Vec<String>,
    /// Only messages from this sender (case-insensitive).
    pub username: Option<String>,
    pub anonymize: bool,
}

impl FilterSpec {
    /// Validate raw parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] for malformed dates or times, a time without
    /// its date, an inverted time range or numeric bound, a zero `limit` or
    /// `active_users`, or an unknown `limit_type`.
    pub fn from_params(raw: &RawFilterParams) -> Result<Self, ParamError> {
        let start = resolve_bound(
            non_empty(raw.start_date.as_deref()),
            non_empty(raw.start_time.as_deref()),
            ("start_date", "start_time"),
            NaiveTime::MIN,
        )?;
        let end = resolve_bound(
            non_empty(raw.end_date.as_deref()),
            non_empty(raw.end_time.as_deref()),
            ("end_date", "end_time"),
            end_of_day(),
        )?;

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ParamError::InvertedRange { start, end });
            }
        }

        if raw.limit == Some(0) {
            return Err(ParamError::Zero { field: "limit" });
        }
        if raw.active_users == Some(0) {
            return Err(ParamError::Zero {
                field: "active_users",
            });
        }

        let limit_type = match non_empty(raw.limit_type.as_deref()) {
            Some(s) => s.parse()?,
            None => LimitType::default(),
        };

        check_bounds("length", raw.min_length, raw.max_length)?;
        check_bounds("messages", raw.min_messages, raw.max_messages)?;

        Ok(Self {
            start,
            end,
            limit: raw.limit,
            limit_type,
            min_length: raw.min_length,
            max_length: raw.max_length,
            keywords: split_list(raw.keywords.as_deref()),
            min_messages: raw.min_messages,
            max_messages: raw.max_messages,
            active_users_top_k: raw.active_users,
            selected_users: split_list(raw.selected_users.as_deref()),
            username: non_empty(raw.username.as_deref()).map(str::to_string),
            anonymize: raw.anonymize,
        })
    }

    /// Whether either time bound is set.
    #[must_use]
    pub const fn has_time_bounds(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Whether `ts` falls inside the configured inclusive range.
    #[must_use]
    pub fn contains_time(&self, ts: NaiveDateTime) -> bool {
        self.start.is_none_or(|start| ts >= start) && self.end.is_none_or(|end| ts <= end)
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn resolve_bound(
    date: Option<&str>,
    time: Option<&str>,
    fields: (&'static str, &'static str),
    default_time: NaiveTime,
) -> Result<Option<NaiveDateTime>, ParamError> {
    let (date_field, time_field) = fields;
    let Some(date) = date else {
        if time.is_some() {
            return Err(ParamError::TimeWithoutDate { field: time_field });
        }
        return Ok(None);
    };

    let date = parse_date(date, date_field)?;
    let time = match time {
        Some(t) => parse_time(t, time_field)?,
        None => default_time,
    };
    Ok(Some(date.and_time(time)))
}

/// Parse a `YYYY-MM-DD` date parameter.
///
/// # Errors
///
/// Returns [`ParamError::InvalidDate`] naming `field` on malformed input.
pub fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, ParamError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ParamError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Parse an `HH:MM` or `HH:MM:SS` time parameter.
///
/// # Errors
///
/// Returns [`ParamError::InvalidTime`] naming `field` on malformed input.
pub fn parse_time(value: &str, field: &'static str) -> Result<NaiveTime, ParamError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| ParamError::InvalidTime {
            field,
            value: value.to_string(),
        })
}

fn check_bounds(
    field: &'static str,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), ParamError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ParamError::InvertedBounds { field, min, max }),
        _ => Ok(()),
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("valid datetime")
    }

    #[test]
    fn empty_params_produce_unbounded_spec() {
        let spec = FilterSpec::from_params(&RawFilterParams::default()).expect("valid");
        assert_eq!(spec, FilterSpec::default());
        assert!(!spec.has_time_bounds());
    }

    #[test]
    fn dates_without_times_cover_whole_days() {
        let raw = RawFilterParams {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
            ..RawFilterParams::default()
        };
        let spec = FilterSpec::from_params(&raw).expect("valid");
        assert_eq!(spec.start, Some(dt("2024-01-01 00:00:00")));
        assert_eq!(spec.end, Some(dt("2024-01-31 23:59:59")));
    }

    #[test]
    fn short_and_long_times_are_accepted() {
        let raw = RawFilterParams {
            start_date: Some("2024-01-01".into()),
            start_time: Some("09:30".into()),
            end_date: Some("2024-01-01".into()),
            end_time: Some("17:45:10".into()),
            ..RawFilterParams::default()
        };
        let spec = FilterSpec::from_params(&raw).expect("valid");
        assert_eq!(spec.start, Some(dt("2024-01-01 09:30:00")));
        assert_eq!(spec.end, Some(dt("2024-01-01 17:45:10")));
    }

    #[test]
    fn malformed_date_is_rejected_with_field_name() {
        let raw = RawFilterParams {
            start_date: Some("01.01.2024".into()),
            ..RawFilterParams::default()
        };
        let err = FilterSpec::from_params(&raw).expect_err("should reject");
        assert!(matches!(
            err,
            ParamError::InvalidDate {
                field: "start_date",
                ..
            }
        ));
    }

    #[test]
    fn malformed_time_is_rejected() {
        let raw = RawFilterParams {
            end_date: Some("2024-01-01".into()),
            end_time: Some("25:00".into()),
            ..RawFilterParams::default()
        };
        assert!(matches!(
            FilterSpec::from_params(&raw),
            Err(ParamError::InvalidTime {
                field: "end_time",
                ..
            })
        ));
    }

    #[test]
    fn time_without_date_is_rejected() {
        let raw = RawFilterParams {
            start_time: Some("10:00".into()),
            ..RawFilterParams::default()
        };
        assert_eq!(
            FilterSpec::from_params(&raw),
            Err(ParamError::TimeWithoutDate {
                field: "start_time"
            })
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let raw = RawFilterParams {
            start_date: Some("2024-02-01".into()),
            end_date: Some("2024-01-01".into()),
            ..RawFilterParams::default()
        };
        assert!(matches!(
            FilterSpec::from_params(&raw),
            Err(ParamError::InvertedRange { .. })
        ));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let raw = RawFilterParams {
            limit: Some(0),
            ..RawFilterParams::default()
        };
        assert_eq!(
            FilterSpec::from_params(&raw),
            Err(ParamError::Zero { field: "limit" })
        );
    }

    #[test]
    fn limit_type_is_case_insensitive() {
        let raw = RawFilterParams {
            limit: Some(3),
            limit_type: Some("LAST".into()),
            ..RawFilterParams::default()
        };
        let spec = FilterSpec::from_params(&raw).expect("valid");
        assert_eq!(spec.limit_type, LimitType::Last);

        let bad = RawFilterParams {
            limit_type: Some("middle".into()),
            ..RawFilterParams::default()
        };
        assert!(matches!(
            FilterSpec::from_params(&bad),
            Err(ParamError::InvalidLimitType(_))
        ));
    }

    #[test]
    fn lists_are_trimmed_lowercased_and_blanks_dropped() {
        let raw = RawFilterParams {
            keywords: Some(" Hello, ,WORLD ".into()),
            selected_users: Some("Alice,bob,".into()),
            username: Some("   ".into()),
            ..RawFilterParams::default()
        };
        let spec = FilterSpec::from_params(&raw).expect("valid");
        assert_eq!(spec.keywords, vec!["hello", "world"]);
        assert_eq!(spec.selected_users, vec!["alice", "bob"]);
        assert_eq!(spec.username, None);
    }

    #[test]
    fn inverted_message_bounds_are_rejected() {
        let raw = RawFilterParams {
            min_messages: Some(5),
            max_messages: Some(2),
            ..RawFilterParams::default()
        };
        assert_eq!(
            FilterSpec::from_params(&raw),
            Err(ParamError::InvertedBounds {
                field: "messages",
                min: 5,
                max: 2
            })
        );
    }

    #[test]
    fn contains_time_is_inclusive() {
        let spec = FilterSpec {
            start: Some(dt("2024-01-01 10:00:00")),
            end: Some(dt("2024-01-01 10:05:00")),
            ..FilterSpec::default()
        };
        assert!(spec.contains_time(dt("2024-01-01 10:00:00")));
        assert!(spec.contains_time(dt("2024-01-01 10:05:00")));
        assert!(!spec.contains_time(dt("2024-01-01 10:05:01")));
        assert!(!spec.contains_time(dt("2024-01-01 09:59:59")));
    }
}
