use netxplore_core::error::ErrorCode;

/// An iterative centrality measure gave up before converging.
///
/// These are partial-result errors: the other measures are still reported
/// and the failed one is left without scores.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum CentralityError {
    #[error("eigenvector centrality did not converge within {iterations} iterations")]
    Eigenvector { iterations: usize },

    #[error("pagerank did not converge within {iterations} iterations")]
    #[serde(rename = "pagerank")]
    PageRank { iterations: usize },
}

impl CentralityError {
    /// The stable [`ErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::NonConvergence
    }

    /// Name of the measure that failed.
    #[must_use]
    pub const fn metric(&self) -> &'static str {
        match self {
            Self::Eigenvector { .. } => "eigenvector",
            Self::PageRank { .. } => "pagerank",
        }
    }
}
