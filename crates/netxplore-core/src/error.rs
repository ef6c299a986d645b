use std::fmt;
use std::io;
use std::path::PathBuf;

use chrono::NaiveDateTime;

/// Machine-readable error codes for callers that persist or relay failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidParameter,
    MissingParameter,
    UnknownAlgorithm,
    UnknownMetric,
    TranscriptNotFound,
    TranscriptReadFailed,
    NonConvergence,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidParameter => "E1002",
            Self::MissingParameter => "E1003",
            Self::UnknownAlgorithm => "E1004",
            Self::UnknownMetric => "E1005",
            Self::TranscriptNotFound => "E2001",
            Self::TranscriptReadFailed => "E2002",
            Self::NonConvergence => "E3001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidParameter => "Invalid analysis parameter",
            Self::MissingParameter => "Missing required parameter",
            Self::UnknownAlgorithm => "Unknown community algorithm",
            Self::UnknownMetric => "Unknown comparison metric",
            Self::TranscriptNotFound => "Transcript file not found",
            Self::TranscriptReadFailed => "Transcript file could not be read",
            Self::NonConvergence => "Iterative centrality did not converge",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in netxplore.toml and retry."),
            Self::InvalidParameter => {
                Some("Dates are YYYY-MM-DD, times HH:MM or HH:MM:SS, lists comma-separated.")
            }
            Self::MissingParameter => None,
            Self::UnknownAlgorithm => {
                Some("Use one of: louvain, girvan_newman, greedy_modularity.")
            }
            Self::UnknownMetric => Some(
                "Use one of: node_count, link_count, density, total_weight, average_degree.",
            ),
            Self::TranscriptNotFound => Some("Check the transcript path and retry."),
            Self::TranscriptReadFailed => Some("Check file permissions and retry."),
            Self::NonConvergence => Some(
                "Raise centrality.eigenvector_max_iter or pagerank_max_iter in netxplore.toml.",
            ),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A caller-supplied parameter was malformed, inconsistent, or missing.
///
/// Parameter errors reject the whole request; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("invalid {field} '{value}': expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("invalid {field} '{value}': expected HH:MM or HH:MM:SS")]
    InvalidTime { field: &'static str, value: String },

    #[error("{field} was given without the matching date")]
    TimeWithoutDate { field: &'static str },

    #[error("time range is empty: start {start} is after end {end}")]
    InvertedRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("{field} range is empty: minimum {min} exceeds maximum {max}")]
    InvertedBounds {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("invalid {field} '{value}': expected a non-negative integer")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("invalid limit_type '{0}': expected 'first' or 'last'")]
    InvalidLimitType(String),

    #[error("unknown community algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("unknown comparison metric '{0}'")]
    UnknownMetric(String),

    #[error("missing required parameter: {0}")]
    Missing(&'static str),
}

impl ParamError {
    /// The stable [`ErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownAlgorithm(_) => ErrorCode::UnknownAlgorithm,
            Self::UnknownMetric(_) => ErrorCode::UnknownMetric,
            Self::Missing(_) => ErrorCode::MissingParameter,
            _ => ErrorCode::InvalidParameter,
        }
    }
}

/// Errors that abort an analysis request.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The referenced transcript does not exist.
    #[error("transcript not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The transcript exists but could not be read.
    #[error("failed to read transcript {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Param(#[from] ParamError),
}

impl AnalysisError {
    /// The stable [`ErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::TranscriptNotFound,
            Self::Read { .. } => ErrorCode::TranscriptReadFailed,
            Self::Param(err) => err.code(),
        }
    }
}
