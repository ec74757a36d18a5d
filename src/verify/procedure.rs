use crate::config::SelectorConfig;
use crate::core::{SearchPage, SearchResolution};
use crate::errors::VerifyError;
use crate::verify::{SearchAttempt, SearchOutcome};
use tracing::{info, warn};

/// The search-verification procedure: enter a query, trigger submission,
/// race the two terminal UI states, classify the outcome.
///
/// Every attempt yields exactly one [`SearchOutcome`]. Interaction errors
/// are contained here and reported as `Failure` so one query cannot abort a
/// batch; there are no internal retries.
pub struct SearchVerifier {
    selectors: SelectorConfig,
}

impl SearchVerifier {
    pub fn new(selectors: SelectorConfig) -> Self {
        Self { selectors }
    }

    /// Run one attempt against an authenticated page.
    ///
    /// The empty query is valid input and goes through the same path as any
    /// other; the album listing filters by substring, so `""` matches every
    /// album and classifies as `ResultsFound` on a non-empty listing.
    pub async fn run<P: SearchPage>(&self, page: &P, attempt: &SearchAttempt) -> SearchOutcome {
        match self.try_run(page, attempt).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(query = %attempt.query, error = %e, "search attempt failed");
                SearchOutcome::Failure(format!("error while searching for '{}': {e}", attempt.query))
            }
        }
    }

    async fn try_run<P: SearchPage>(
        &self,
        page: &P,
        attempt: &SearchAttempt,
    ) -> Result<SearchOutcome, VerifyError> {
        if !page
            .wait_for_visible(&self.selectors.search_input, attempt.max_wait)
            .await?
        {
            return Ok(SearchOutcome::Failure("search input not found".to_string()));
        }

        // fill_input clears first, so back-to-back attempts on one session
        // cannot cross-contaminate queries.
        page.fill_input(&self.selectors.search_input, &attempt.query)
            .await?;
        page.submit(&self.selectors.search_input).await?;
        info!(query = %attempt.query, "search term entered and search triggered");

        let resolution = page
            .await_search_resolution(
                &self.selectors.result_marker,
                &self.selectors.empty_marker,
                attempt.max_wait,
            )
            .await?;

        Ok(match resolution {
            SearchResolution::Results { count } => {
                info!(query = %attempt.query, count, "found search results");
                SearchOutcome::ResultsFound(count)
            }
            SearchResolution::Empty => {
                info!(query = %attempt.query, "no search results found, as expected");
                SearchOutcome::NoResultsFound
            }
            SearchResolution::TimedOut => {
                SearchOutcome::Failure("timeout waiting for search outcome".to_string())
            }
        })
    }
}
