use super::traits::PageSession;
use crate::config::Config;
use crate::error::SessionError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Page session backed by one headless Chrome tab, reused for every listing.
pub struct ChromeSession {
    // Dropping the browser kills the Chrome process.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    /// Launch Chrome and open the tab listings are loaded into.
    pub fn launch(config: &Config) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .args(vec![OsStr::new("--disable-blink-features=AutomationControlled")])
            .idle_browser_timeout(Duration::from_secs(600))
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;
        tab.set_user_agent(&config.user_agent, None, None)
            .context("Failed to set user agent")?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// CDP calls block, so they run on the blocking pool.
    async fn with_tab<T, F>(&self, f: F) -> Result<T, SessionError>
    where
        F: FnOnce(&Tab) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || f(&tab))
            .await?
            .map_err(|e| SessionError::Browser(e.to_string()))
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        debug!("Navigating to {}", url);
        let target = url.to_string();
        self.with_tab(move |tab| {
            tab.navigate_to(&target)?.wait_until_navigated()?;
            Ok(())
        })
        .await
        .map_err(|e| SessionError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn is_present(&self, selector: &str) -> bool {
        let selector = selector.to_string();
        self.with_tab(move |tab| Ok(tab.find_element(&selector).is_ok()))
            .await
            .unwrap_or(false)
    }

    async fn document(&self) -> Result<String, SessionError> {
        self.with_tab(|tab| {
            let result = tab.evaluate("document.documentElement.outerHTML", false)?;
            let html = result
                .value
                .as_ref()
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .context("Could not get HTML from page")?;
            debug!("Captured {} bytes of HTML", html.len());
            Ok(html)
        })
        .await
    }
}
