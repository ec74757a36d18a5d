use crate::config::BrowserConfig;
use crate::core::{BrowserTrait, SearchPage, SearchResolution};
use crate::errors::{Result, VerifyError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Extra slack given to the Rust-side deadline so the in-page timer fires
/// first under normal conditions.
const WAIT_GRACE: Duration = Duration::from_secs(2);

/// One open browser connection driving one tab.
///
/// The session owns its browser exclusively for the duration of a run and
/// must be closed on every exit path. `close` is idempotent; any interaction
/// after it fails with [`VerifyError::SessionClosed`].
pub struct Session<B: BrowserTrait> {
    browser: Option<B>,
    tab: Option<B::TabHandle>,
    session_id: String,
}

impl<B: BrowserTrait> Session<B> {
    /// Launch the browser and open the tab this session will drive.
    pub async fn open(mut browser: B, config: &BrowserConfig) -> Result<Self> {
        browser.launch(config).await?;
        let tab = browser.new_tab().await?;
        let session_id = uuid::Uuid::new_v4().to_string();
        info!(session_id = %session_id, headless = config.headless, "browser session opened");

        Ok(Self {
            browser: Some(browser),
            tab: Some(tab),
            session_id,
        })
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }

    fn handles(&self) -> Result<(&B, &B::TabHandle)> {
        match (self.browser.as_ref(), self.tab.as_ref()) {
            (Some(browser), Some(tab)) => Ok((browser, tab)),
            _ => Err(VerifyError::SessionClosed),
        }
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        let (browser, tab) = self.handles()?;
        debug!(session_id = %self.session_id, url, "navigating");
        browser.navigate(tab, url).await
    }

    pub async fn current_url(&self) -> Result<String> {
        let (browser, tab) = self.handles()?;
        browser.current_url(tab).await
    }

    /// Click the first anchor whose trimmed text equals `text`.
    pub async fn click_link_by_text(&self, text: &str) -> Result<()> {
        let (browser, tab) = self.handles()?;
        let script = format!(
            r#"
            (function() {{
                const wanted = {text};
                const link = Array.from(document.querySelectorAll('a'))
                    .find(a => a.textContent.trim() === wanted);
                if (!link) return {{ success: false }};
                link.click();
                return {{ success: true }};
            }})()
            "#,
            text = js_string(text)?,
        );

        let result = browser.execute_script(tab, &script).await?;
        if bool_field(&result, "success") {
            Ok(())
        } else {
            Err(VerifyError::ElementNotFound(format!(
                "no link with text '{text}'"
            )))
        }
    }

    /// Close the session, tearing down the tab and browser process. Safe to
    /// call more than once.
    pub async fn close(&mut self) -> Result<()> {
        self.tab = None;
        if let Some(mut browser) = self.browser.take() {
            browser.close().await?;
            info!(session_id = %self.session_id, "browser session closed");
        }
        Ok(())
    }

    /// Run an in-page wait script with a Rust-side deadline backing it up.
    /// Elapsing the outer deadline yields `Value::Null`, which the callers
    /// classify the same way as the in-page timeout.
    async fn execute_wait_script(&self, script: &str, timeout: Duration) -> Result<Value> {
        let (browser, tab) = self.handles()?;
        match tokio::time::timeout(timeout + WAIT_GRACE, browser.execute_script(tab, script)).await
        {
            Ok(result) => result,
            Err(_) => Ok(Value::Null),
        }
    }
}

#[async_trait]
impl<B: BrowserTrait> SearchPage for Session<B> {
    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let script = format!(
            r#"
            (function() {{
                const selector = {selector};
                const isVisible = () => {{
                    const el = document.querySelector(selector);
                    if (!el) return false;
                    const rect = el.getBoundingClientRect();
                    return rect.width > 0 && rect.height > 0;
                }};
                return new Promise((resolve) => {{
                    if (isVisible()) {{
                        resolve({{ visible: true }});
                        return;
                    }}
                    const observer = new MutationObserver(() => {{
                        if (isVisible()) {{
                            observer.disconnect();
                            resolve({{ visible: true }});
                        }}
                    }});
                    observer.observe(document.documentElement, {{
                        childList: true,
                        subtree: true,
                        attributes: true
                    }});
                    setTimeout(() => {{
                        observer.disconnect();
                        resolve({{ visible: false }});
                    }}, {timeout_ms});
                }});
            }})()
            "#,
            selector = js_string(selector)?,
            timeout_ms = timeout.as_millis(),
        );

        let result = self.execute_wait_script(&script, timeout).await?;
        Ok(bool_field(&result, "visible"))
    }

    async fn fill_input(&self, selector: &str, text: &str) -> Result<()> {
        let (browser, tab) = self.handles()?;
        // The album app is a React SPA: write through the native value
        // setter so the controlled input sees the change.
        let script = format!(
            r#"
            (function() {{
                const el = document.querySelector({selector});
                if (!el) return {{ success: false, error: 'element not found' }};
                el.focus();
                const setter = Object.getOwnPropertyDescriptor(
                    window.HTMLInputElement.prototype, 'value'
                ).set;
                setter.call(el, '');
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                setter.call(el, {text});
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return {{ success: true, value: el.value }};
            }})()
            "#,
            selector = js_string(selector)?,
            text = js_string(text)?,
        );

        let result = browser.execute_script(tab, &script).await?;
        if bool_field(&result, "success") {
            debug!(session_id = %self.session_id, selector, "input filled");
            Ok(())
        } else {
            Err(VerifyError::ElementNotFound(format!(
                "cannot fill input {selector}: {}",
                str_field(&result, "error")
            )))
        }
    }

    async fn submit(&self, selector: &str) -> Result<()> {
        let (browser, tab) = self.handles()?;
        let script = format!(
            r#"
            (function() {{
                const el = document.querySelector({selector});
                if (!el) return {{ success: false, error: 'element not found' }};
                const key = {{ key: 'Enter', code: 'Enter', keyCode: 13, bubbles: true }};
                el.dispatchEvent(new KeyboardEvent('keydown', key));
                el.dispatchEvent(new KeyboardEvent('keypress', key));
                el.dispatchEvent(new KeyboardEvent('keyup', key));
                if (el.form && typeof el.form.requestSubmit === 'function') {{
                    el.form.requestSubmit();
                }}
                return {{ success: true }};
            }})()
            "#,
            selector = js_string(selector)?,
        );

        let result = browser.execute_script(tab, &script).await?;
        if bool_field(&result, "success") {
            Ok(())
        } else {
            Err(VerifyError::ElementNotFound(format!(
                "cannot submit {selector}: {}",
                str_field(&result, "error")
            )))
        }
    }

    async fn await_search_resolution(
        &self,
        result_selector: &str,
        empty_selector: &str,
        timeout: Duration,
    ) -> Result<SearchResolution> {
        // Both terminal states are raced inside one promise, and the marker
        // count is captured in the page at the instant the race resolves.
        let script = format!(
            r#"
            (function() {{
                const resultSel = {result_sel};
                const emptySel = {empty_sel};
                const check = () => {{
                    const count = document.querySelectorAll(resultSel).length;
                    if (count > 0) return {{ matched: 'results', count: count }};
                    if (document.querySelector(emptySel)) return {{ matched: 'empty' }};
                    return null;
                }};
                return new Promise((resolve) => {{
                    const initial = check();
                    if (initial) {{
                        resolve(initial);
                        return;
                    }}
                    const observer = new MutationObserver(() => {{
                        const state = check();
                        if (state) {{
                            observer.disconnect();
                            resolve(state);
                        }}
                    }});
                    observer.observe(document.documentElement, {{
                        childList: true,
                        subtree: true
                    }});
                    setTimeout(() => {{
                        observer.disconnect();
                        resolve({{ matched: null }});
                    }}, {timeout_ms});
                }});
            }})()
            "#,
            result_sel = js_string(result_selector)?,
            empty_sel = js_string(empty_selector)?,
            timeout_ms = timeout.as_millis(),
        );

        let result = self.execute_wait_script(&script, timeout).await?;
        match result.get("matched").and_then(Value::as_str) {
            Some("results") => {
                let count = result.get("count").and_then(Value::as_u64).unwrap_or(0) as usize;
                if count == 0 {
                    // The race must never claim results without markers.
                    return Err(VerifyError::Protocol(
                        "results branch resolved with zero markers".to_string(),
                    ));
                }
                Ok(SearchResolution::Results { count })
            }
            Some("empty") => Ok(SearchResolution::Empty),
            _ => Ok(SearchResolution::TimedOut),
        }
    }
}

/// Encode a Rust string as a JavaScript string literal.
fn js_string(s: &str) -> Result<String> {
    Ok(serde_json::to_string(s)?)
}

fn bool_field(value: &Value, field: &str) -> bool {
    value.get(field).and_then(Value::as_bool).unwrap_or(false)
}

fn str_field<'a>(value: &'a Value, field: &str) -> &'a str {
    value.get(field).and_then(Value::as_str).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::mock::MockBrowser;
    use crate::config::BrowserConfig;
    use serde_json::json;
    use std::time::Instant;

    /// Engine whose scripts stall far past any deadline, the way a wedged
    /// page whose timers never run does. Blocking work is offloaded the same
    /// way `ChromeBrowser::execute_script` offloads `Tab::evaluate`.
    struct StalledEngine;

    #[async_trait]
    impl BrowserTrait for StalledEngine {
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
            tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(6)))
                .await
                .unwrap();
            Ok(json!({ "visible": true, "matched": "results", "count": 1 }))
        }

        async fn current_url(&self, _tab: &()) -> Result<String> {
            Ok("about:blank".to_string())
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    async fn open_session(responses: Vec<Value>) -> Session<MockBrowser> {
        Session::open(
            MockBrowser::with_responses(responses),
            &BrowserConfig::default(),
        )
        .await
        .expect("session open")
    }

    #[tokio::test]
    async fn resolution_parses_results_branch() {
        let session = open_session(vec![json!({ "matched": "results", "count": 3 })]).await;
        let resolution = session
            .await_search_resolution(".album-item", ".no-results-message", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(resolution, SearchResolution::Results { count: 3 });
    }

    #[tokio::test]
    async fn resolution_parses_empty_branch() {
        let session = open_session(vec![json!({ "matched": "empty" })]).await;
        let resolution = session
            .await_search_resolution(".album-item", ".no-results-message", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(resolution, SearchResolution::Empty);
    }

    #[tokio::test]
    async fn resolution_with_zero_count_is_rejected() {
        let session = open_session(vec![json!({ "matched": "results", "count": 0 })]).await;
        let err = session
            .await_search_resolution(".album-item", ".no-results-message", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::Protocol(_)));
    }

    #[tokio::test]
    async fn null_resolution_is_a_timeout() {
        let session = open_session(vec![json!({ "matched": null })]).await;
        let resolution = session
            .await_search_resolution(".album-item", ".no-results-message", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(resolution, SearchResolution::TimedOut);
    }

    #[tokio::test]
    async fn interaction_after_close_fails() {
        let mut session = open_session(vec![]).await;
        session.close().await.unwrap();

        let err = session.navigate("http://localhost:3000").await.unwrap_err();
        assert!(matches!(err, VerifyError::SessionClosed));
        let err = session
            .fill_input("input[type='text']", "qui")
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::SessionClosed));
    }

    #[tokio::test]
    async fn close_is_idempotent_and_releases_the_browser() {
        let browser = MockBrowser::with_responses(vec![]);
        let stats = browser.stats.clone();
        let mut session = Session::open(browser, &BrowserConfig::default())
            .await
            .unwrap();
        session.close().await.unwrap();
        assert!(*stats.closed.lock().unwrap());
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn stalled_page_visibility_wait_ends_at_the_outer_deadline() {
        let session = Session::open(StalledEngine, &BrowserConfig::default())
            .await
            .unwrap();
        let started = Instant::now();
        let visible = session
            .wait_for_visible("input[type='text']", Duration::from_millis(100))
            .await
            .unwrap();
        let elapsed = started.elapsed();
        assert!(!visible, "a wait the page never answers must not report visible");
        assert!(
            elapsed < Duration::from_secs(4),
            "wait should end at deadline + grace, took {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn stalled_page_outcome_race_times_out_at_the_outer_deadline() {
        let session = Session::open(StalledEngine, &BrowserConfig::default())
            .await
            .unwrap();
        let started = Instant::now();
        let resolution = session
            .await_search_resolution(".album-item", ".no-results-message", Duration::from_millis(100))
            .await
            .unwrap();
        let elapsed = started.elapsed();
        assert_eq!(resolution, SearchResolution::TimedOut);
        assert!(
            elapsed < Duration::from_secs(4),
            "race should end at deadline + grace, took {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn fill_input_surfaces_missing_element() {
        let session =
            open_session(vec![json!({ "success": false, "error": "element not found" })]).await;
        let err = session
            .fill_input("input[type='text']", "qui")
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::ElementNotFound(_)));
    }

    #[test]
    fn js_string_escapes_quotes() {
        assert_eq!(js_string("it's").unwrap(), r#""it's""#);
        assert_eq!(js_string(r#"a"b"#).unwrap(), r#""a\"b""#);
    }
}
