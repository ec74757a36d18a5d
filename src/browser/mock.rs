use crate::config::BrowserConfig;
use crate::core::BrowserTrait;
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Observable side of a [`MockBrowser`]. Clone the `Arc` before handing the
/// browser to a session; the session takes ownership of the browser itself.
#[derive(Debug, Default)]
pub(crate) struct MockStats {
    pub(crate) current_url_calls: Mutex<usize>,
    pub(crate) closed: Mutex<bool>,
}

/// Browser double that replays canned script results in order.
pub(crate) struct MockBrowser {
    responses: Mutex<VecDeque<Value>>,
    url: String,
    pub(crate) stats: Arc<MockStats>,
}

impl MockBrowser {
    pub(crate) fn with_responses(responses: Vec<Value>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            url: "about:blank".to_string(),
            stats: Arc::new(MockStats::default()),
        }
    }

    pub(crate) fn at_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }
}

#[async_trait]
impl BrowserTrait for MockBrowser {
    type TabHandle = ();

    async fn launch(&mut self, _config: &BrowserConfig) -> Result<()> {
        Ok(())
    }

    async fn new_tab(&self) -> Result<()> {
        Ok(())
    }

    async fn navigate(&self, _tab: &(), _url: &str) -> Result<()> {
        Ok(())
    }

    async fn execute_script(&self, _tab: &(), _script: &str) -> Result<Value> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Value::Null))
    }

    async fn current_url(&self, _tab: &()) -> Result<String> {
        *self.stats.current_url_calls.lock().unwrap() += 1;
        Ok(self.url.clone())
    }

    async fn close(&mut self) -> Result<()> {
        *self.stats.closed.lock().unwrap() = true;
        Ok(())
    }
}
