use crate::errors::{Result, VerifyError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub browser: BrowserConfig,
    pub wait: WaitConfig,
    pub selectors: SelectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Wait deadlines, in milliseconds so the config serializes flat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    pub login_timeout_ms: u64,
    pub search_timeout_ms: u64,
}

/// Selectors for the album app's pages. Defaults match the markup the
/// listing page actually renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub email_input: String,
    pub password_input: String,
    pub login_submit: String,
    pub landing_marker: String,
    pub albums_link_text: String,
    pub search_input: String,
    pub result_marker: String,
    pub empty_marker: String,
}

/// Already-resolved credential pair. The library never reads environment
/// variables itself; the caller supplies these.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            wait: WaitConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            user_agent: None,
            args: vec![],
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            login_timeout_ms: 20_000,
            search_timeout_ms: 30_000,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            email_input: "input[type='email']".to_string(),
            password_input: "input[type='password']".to_string(),
            login_submit: "button[type='submit']".to_string(),
            landing_marker: "h1".to_string(),
            albums_link_text: "Albums".to_string(),
            search_input: "input[type='text']".to_string(),
            result_marker: ".album-item".to_string(),
            empty_marker: ".no-results-message".to_string(),
        }
    }
}

impl WaitConfig {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }
}

/// Parse and validate the target base URL.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| VerifyError::Configuration(e.to_string()))?;
    if url.host_str().is_none() {
        return Err(VerifyError::Configuration(format!(
            "base URL has no host: {raw}"
        )));
    }
    Ok(url)
}
