pub mod browser;
pub mod config;
pub mod core;
pub mod errors;
pub mod verify;

pub use browser::{ChromeBrowser, LoginFlow, Session};
pub use config::{Config, Credentials};
pub use core::{BrowserTrait, SearchPage, SearchResolution};
pub use errors::VerifyError;
pub use verify::{AttemptReport, SearchAttempt, SearchOutcome, SearchVerifier};
