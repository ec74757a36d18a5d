use crate::config::BrowserConfig;
use crate::core::BrowserTrait;
use crate::errors::{Result, VerifyError};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::Arc;

/// Chrome implementation of the browser seam, backed by `headless_chrome`.
pub struct ChromeBrowser {
    browser: Option<Browser>,
}

impl ChromeBrowser {
    pub fn new() -> Self {
        Self { browser: None }
    }
}

impl Default for ChromeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserTrait for ChromeBrowser {
    type TabHandle = Arc<Tab>;

    async fn launch(&mut self, config: &BrowserConfig) -> Result<()> {
        let window_size_arg = format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        );
        let user_agent_arg = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={ua}"));

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&window_size_arg),
        ];
        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }
        for arg in &config.args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .args(args)
            .build()
            .map_err(|e| VerifyError::LaunchFailed(e.to_string()))?;

        let browser =
            Browser::new(launch_options).map_err(|e| VerifyError::LaunchFailed(e.to_string()))?;

        self.browser = Some(browser);
        Ok(())
    }

    async fn new_tab(&self) -> Result<Self::TabHandle> {
        let browser = self.browser.as_ref().ok_or(VerifyError::SessionClosed)?;
        browser
            .new_tab()
            .map_err(|e| VerifyError::TabCreationFailed(e.to_string()))
    }

    async fn navigate(&self, tab: &Self::TabHandle, url: &str) -> Result<()> {
        let tab = Arc::clone(tab);
        let url = url.to_string();
        tokio::task::spawn_blocking(move || {
            tab.navigate_to(&url)
                .map_err(|e| VerifyError::NavigationFailed(e.to_string()))?;
            tab.wait_until_navigated()
                .map_err(|e| VerifyError::NavigationFailed(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| VerifyError::NavigationFailed(e.to_string()))?
    }

    async fn execute_script(&self, tab: &Self::TabHandle, script: &str) -> Result<Value> {
        let tab = Arc::clone(tab);
        let script = script.to_string();
        // Tab::evaluate blocks the calling thread. Run it off the runtime so
        // outer deadlines can abandon a wait whose page never answers.
        // await_promise so race scripts resolve to their settled value.
        let result = tokio::task::spawn_blocking(move || tab.evaluate(&script, true))
            .await
            .map_err(|e| VerifyError::JavaScriptFailed(e.to_string()))?
            .map_err(|e| VerifyError::JavaScriptFailed(e.to_string()))?;
        Ok(result.value.unwrap_or(Value::Null))
    }

    async fn current_url(&self, tab: &Self::TabHandle) -> Result<String> {
        Ok(tab.get_url())
    }

    async fn close(&mut self) -> Result<()> {
        self.browser = None;
        Ok(())
    }
}
