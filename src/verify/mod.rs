pub mod outcome;
pub mod procedure;

pub use outcome::{AttemptReport, SearchAttempt, SearchOutcome};
pub use procedure::SearchVerifier;
