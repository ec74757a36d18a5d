use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One invocation of the verification procedure. Not persisted, not shared.
#[derive(Debug, Clone)]
pub struct SearchAttempt {
    pub query: String,
    pub max_wait: Duration,
}

impl SearchAttempt {
    pub fn new(query: impl Into<String>, max_wait: Duration) -> Self {
        Self {
            query: query.into(),
            max_wait,
        }
    }
}

/// Terminal classification of one search attempt.
///
/// `ResultsFound(0)` is unreachable: a zero-match response only arrives
/// through the empty-state branch, which classifies as `NoResultsFound`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum SearchOutcome {
    ResultsFound(usize),
    NoResultsFound,
    Failure(String),
}

impl SearchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SearchOutcome::Failure(_))
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchOutcome::ResultsFound(count) => write!(f, "results found ({count})"),
            SearchOutcome::NoResultsFound => write!(f, "no results found"),
            SearchOutcome::Failure(cause) => write!(f, "failure: {cause}"),
        }
    }
}

/// Record of one completed attempt, collected by the CLI for the run log.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    pub query: String,
    pub outcome: SearchOutcome,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub elapsed_ms: u64,
}
