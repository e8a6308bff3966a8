use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures_util::stream::StreamExt;
use jobradar_core::ScrapingConfig;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Timing knobs for one fetch session.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Per-attempt navigation timeout
    pub nav_timeout: Duration,
    /// Navigation attempts before giving up
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub retry_delay: Duration,
    /// Wait after navigation before the first scroll
    pub settle_wait: Duration,
    /// Scroll-to-bottom cycles to trigger lazy loading
    pub scroll_cycles: u32,
    /// Pause after each scroll cycle
    pub scroll_pause: Duration,
}

impl FetchSettings {
    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self {
            nav_timeout: Duration::from_secs(config.nav_timeout_secs),
            max_attempts: config.max_attempts,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            settle_wait: Duration::from_secs(config.settle_wait_secs),
            scroll_cycles: config.scroll_cycles,
            scroll_pause: Duration::from_secs(config.scroll_pause_secs),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from_config(&ScrapingConfig::default())
    }
}

/// One page fetch: where to go and which language to present.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub accept_language: String,
}

/// A fetched, settled results page.
///
/// Holds the live browsing context so a diagnostic snapshot can still be
/// taken after extraction fails. Callers must `close()` in every path.
#[async_trait]
pub trait RenderedPage: Send + Sync {
    /// Final HTML after the settle phase.
    fn html(&self) -> &str;

    /// Write a PNG screenshot of the current page state.
    async fn snapshot(&self, path: &Path) -> Result<()>;

    /// Tear down the page and its browser process.
    async fn close(&self) -> Result<()>;
}

/// Seam between the orchestrator and the browser; tests substitute fakes.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Box<dyn RenderedPage>>;
}

/// Chromium-backed navigator. Each `fetch` launches a fresh headless
/// browser so sessions never share cookies or state across boards.
pub struct ChromiumNavigator {
    settings: FetchSettings,
}

impl ChromiumNavigator {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    async fn launch(&self) -> Result<(Browser, Page)> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .window_size(
                crate::fingerprint::VIEWPORT_WIDTH,
                crate::fingerprint::VIEWPORT_HEIGHT,
            )
            .build()
            .map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Drive the CDP event loop until the browser goes away
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        Ok((browser, page))
    }

    async fn apply_fingerprint(&self, page: &Page, fingerprint: &FingerprintConfig) -> Result<()> {
        let params = SetUserAgentOverrideParams::builder()
            .user_agent(&fingerprint.user_agent)
            .accept_language(&fingerprint.accept_language)
            .build()
            .map_err(BrowserError::ChromiumError)?;

        page.set_user_agent(params)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        Ok(())
    }

    async fn navigate_with_retry(&self, page: &Page, url: &str) -> Result<()> {
        let mut last_error = BrowserError::NavigationError("no attempts made".to_string());

        for attempt in 1..=self.settings.max_attempts {
            let result = tokio::time::timeout(self.settings.nav_timeout, async {
                page.goto(url).await?;
                page.wait_for_navigation().await?;
                Ok::<(), chromiumoxide::error::CdpError>(())
            })
            .await;

            match result {
                Ok(Ok(())) => {
                    debug!(url, attempt, "navigation succeeded");
                    return Ok(());
                }
                Ok(Err(e)) => {
                    warn!(url, attempt, error = %e, "navigation failed");
                    last_error = BrowserError::NavigationError(e.to_string());
                }
                Err(_) => {
                    warn!(
                        url,
                        attempt,
                        timeout_secs = self.settings.nav_timeout.as_secs(),
                        "navigation timed out"
                    );
                    last_error = BrowserError::Timeout(format!(
                        "navigation to {url} exceeded {}s",
                        self.settings.nav_timeout.as_secs()
                    ));
                }
            }

            if attempt < self.settings.max_attempts {
                tokio::time::sleep(self.settings.retry_delay).await;
            }
        }

        Err(last_error)
    }

    /// Let the page finish rendering: initial wait, then scroll cycles to
    /// trigger lazy-loaded result cards.
    async fn settle(&self, page: &Page) -> Result<()> {
        tokio::time::sleep(self.settings.settle_wait).await;

        for cycle in 1..=self.settings.scroll_cycles {
            page.evaluate("window.scrollTo(0, document.body.scrollHeight)")
                .await
                .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
            debug!(cycle, "scrolled to bottom");
            tokio::time::sleep(self.settings.scroll_pause).await;
        }

        Ok(())
    }
}

#[async_trait]
impl Navigator for ChromiumNavigator {
    async fn fetch(&self, request: &FetchRequest) -> Result<Box<dyn RenderedPage>> {
        let fingerprint = FingerprintConfig::desktop(request.accept_language.clone());

        let (browser, page) = self.launch().await?;
        let session = ChromiumPage::new(browser, page);

        // From here on the session owns the browser; tear it down on any
        // failure before handing it to the caller.
        let result = async {
            let page = session.page().await?;
            self.apply_fingerprint(&page, &fingerprint).await?;
            self.navigate_with_retry(&page, &request.url).await?;
            self.settle(&page).await?;

            page.content()
                .await
                .map_err(|e| BrowserError::ChromiumError(e.to_string()))
        }
        .await;

        match result {
            Ok(html) => {
                session.set_html(html);
                Ok(Box::new(session) as Box<dyn RenderedPage>)
            }
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    debug!(error = %close_err, "teardown after failed fetch");
                }
                Err(e)
            }
        }
    }
}

/// Live chromium page plus its owning browser process.
pub struct ChromiumPage {
    inner: Mutex<Option<(Browser, Page)>>,
    // Settled HTML, written exactly once at the end of the fetch
    html: std::sync::OnceLock<String>,
}

impl ChromiumPage {
    fn new(browser: Browser, page: Page) -> Self {
        Self {
            inner: Mutex::new(Some((browser, page))),
            html: std::sync::OnceLock::new(),
        }
    }

    async fn page(&self) -> Result<Page> {
        let guard = self.inner.lock().await;
        guard
            .as_ref()
            .map(|(_, page)| page.clone())
            .ok_or(BrowserError::PageClosed)
    }

    fn set_html(&self, html: String) {
        let _ = self.html.set(html);
    }
}

#[async_trait]
impl RenderedPage for ChromiumPage {
    fn html(&self) -> &str {
        self.html.get().map_or("", String::as_str)
    }

    async fn snapshot(&self, path: &Path) -> Result<()> {
        let page = self.page().await?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        let bytes = page
            .screenshot(params)
            .await
            .map_err(|e| BrowserError::SnapshotError(e.to_string()))?;

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| BrowserError::SnapshotError(e.to_string()))?;
        }

        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| BrowserError::SnapshotError(e.to_string()))?;

        debug!(path = %path.display(), "wrote diagnostic snapshot");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.inner.lock().await;

        if let Some((mut browser, page)) = guard.take() {
            if let Err(e) = page.close().await {
                debug!(error = %e, "page close failed");
            }
            if let Err(e) = browser.close().await {
                debug!(error = %e, "browser close failed");
            }
            // Reap the chromium child process
            let _ = browser.wait().await;
        }

        Ok(())
    }
}
