use crate::config::{Credentials, SelectorConfig};
use crate::core::{BrowserTrait, SearchPage};
use crate::errors::{Result, VerifyError};
use crate::Session;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Session bootstrap: authenticate through the login form and land on the
/// album listing with the search input visible.
///
/// Unlike per-query verification failures, bootstrap errors are fatal to the
/// run and propagate to the caller.
pub struct LoginFlow {
    selectors: SelectorConfig,
    timeout: Duration,
}

impl LoginFlow {
    pub fn new(selectors: SelectorConfig, timeout: Duration) -> Self {
        Self { selectors, timeout }
    }

    /// Log in at `{base_url}/login` and navigate to the albums page.
    pub async fn run<B: BrowserTrait>(
        &self,
        session: &Session<B>,
        base_url: &Url,
        credentials: &Credentials,
    ) -> Result<()> {
        let login_url = base_url
            .join("login")
            .map_err(|e| VerifyError::Configuration(e.to_string()))?;
        session.navigate(login_url.as_str()).await?;

        if !session
            .wait_for_visible(&self.selectors.email_input, self.timeout)
            .await?
        {
            return Err(VerifyError::LoginFailed(format!(
                "email input {} never became visible",
                self.selectors.email_input
            )));
        }

        session
            .fill_input(&self.selectors.email_input, &credentials.email)
            .await?;
        session
            .fill_input(&self.selectors.password_input, &credentials.password)
            .await?;
        session.submit(&self.selectors.login_submit).await?;

        if !session
            .wait_for_visible(&self.selectors.landing_marker, self.timeout)
            .await?
        {
            return Err(VerifyError::LoginFailed(
                "home page did not load after submitting credentials".to_string(),
            ));
        }
        info!(session_id = %session.id(), "login successful, home page loaded");

        session
            .click_link_by_text(&self.selectors.albums_link_text)
            .await?;

        if !session
            .wait_for_visible(&self.selectors.search_input, self.timeout)
            .await?
        {
            return Err(VerifyError::LoginFailed(
                "albums page did not present a search input".to_string(),
            ));
        }
        let landed_on = session.current_url().await?;
        info!(session_id = %session.id(), url = %landed_on, "albums page loaded");

        Ok(())
    }
}
