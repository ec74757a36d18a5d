use crate::errors::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Tagged result of the search-outcome race: exactly one of the two page
/// states resolved it, or neither did before the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResolution {
    /// Result markers appeared. `count` is the number of markers present at
    /// the moment the race resolved; it is never zero on this branch.
    Results { count: usize },
    /// The explicit empty-state marker appeared.
    Empty,
    /// Neither state appeared within the deadline.
    TimedOut,
}

/// The capability set the verification procedure needs from a page.
///
/// This is intentionally narrow: wait for visibility, clear-and-fill,
/// submit, and one blocking race over the two terminal search states. The
/// procedure never touches a concrete driver API.
#[async_trait]
pub trait SearchPage: Send + Sync {
    /// Wait until an element matching `selector` is visible. Returns false
    /// if the deadline passes first.
    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Clear any prior content of the input, then write `text` into it.
    async fn fill_input(&self, selector: &str, text: &str) -> Result<()>;

    /// Trigger submission of the input's form, equivalent to pressing Enter.
    async fn submit(&self, selector: &str) -> Result<()>;

    /// Block until either a result marker or the empty-state marker is
    /// present, whichever happens first within `timeout`.
    ///
    /// Both conditions are raced in a single wait so a legitimate zero-match
    /// response is never mistaken for a stalled page.
    async fn await_search_resolution(
        &self,
        result_selector: &str,
        empty_selector: &str,
        timeout: Duration,
    ) -> Result<SearchResolution>;
}
