use crate::config::BrowserConfig;
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Narrow seam over a browser engine. Everything above this trait is
/// driver-agnostic.
#[async_trait]
pub trait BrowserTrait: Send + Sync {
    type TabHandle: Send + Sync;

    /// Launch the browser process.
    async fn launch(&mut self, config: &BrowserConfig) -> Result<()>;

    /// Open a new tab.
    async fn new_tab(&self) -> Result<Self::TabHandle>;

    /// Navigate the tab and wait for the load to settle.
    async fn navigate(&self, tab: &Self::TabHandle, url: &str) -> Result<()>;

    /// Evaluate JavaScript in the tab. Promise results are awaited and
    /// their resolved value returned.
    async fn execute_script(&self, tab: &Self::TabHandle, script: &str) -> Result<Value>;

    /// Current URL of the tab.
    async fn current_url(&self, tab: &Self::TabHandle) -> Result<String>;

    /// Tear down the browser process.
    async fn close(&mut self) -> Result<()>;
}
