//! chromiumoxide-backed renderer.

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures_util::StreamExt;
use tokio::sync::Mutex;

use super::{PageRenderer, RenderConfig, RenderError};
use crate::fetch::UrlSpec;

const CONSENT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Headless Chrome/Chromium renderer using chromiumoxide.
///
/// One browser process is launched lazily and shared; every render opens and
/// closes its own tab. If the browser dies it is relaunched on the next call.
pub struct HeadlessRenderer {
    config: RenderConfig,
    browser: Mutex<Option<Arc<Browser>>>,
}

impl HeadlessRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config, browser: Mutex::new(None) }
    }

    /// Get the shared browser, launching it on first use.
    async fn browser(&self) -> Result<Arc<Browser>, RenderError> {
        let mut slot = self.browser.lock().await;
        if let Some(browser) = slot.as_ref() {
            return Ok(browser.clone());
        }

        let browser = Arc::new(self.launch().await?);
        *slot = Some(browser.clone());
        Ok(browser)
    }

    async fn launch(&self) -> Result<Browser, RenderError> {
        tracing::info!("launching headless browser");

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .request_timeout(self.config.navigation_timeout);

        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let (browser, mut handler) = Browser::launch(builder.build().map_err(RenderError::BrowserLaunch)?)
            .await
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                }
            }
            tracing::debug!("browser handler stopped");
        });

        Ok(browser)
    }

    /// Drop `stale` so the next call launches a fresh browser. A browser that
    /// another render already relaunched is left alone.
    async fn reset(&self, stale: &Arc<Browser>) {
        let mut slot = self.browser.lock().await;
        if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, stale)) {
            slot.take();
        }
    }

    /// Open a blank tab, relaunching the browser once if it has died.
    async fn open_tab(&self) -> Result<Page, RenderError> {
        let browser = self.browser().await?;
        let err = match browser.new_page("about:blank").await {
            Ok(page) => return Ok(page),
            Err(e) => e,
        };

        tracing::warn!("could not open tab, relaunching browser: {err}");
        self.reset(&browser).await;

        let browser = self.browser().await?;
        browser.new_page("about:blank").await.map_err(|e| {
            tracing::warn!("could not open tab after relaunch: {e}");
            RenderError::BrowserClosed
        })
    }

    /// Close the shared browser, if one is running and no render holds it.
    pub async fn shutdown(&self) {
        let Some(browser) = self.browser.lock().await.take() else { return };

        match Arc::try_unwrap(browser) {
            Ok(mut browser) => {
                if let Err(e) = browser.close().await {
                    tracing::warn!("failed to close browser: {e}");
                }
                browser.wait().await.ok();
                tracing::info!("browser shutdown complete");
            }
            Err(_) => tracing::debug!("browser still in use; it will exit when the last render finishes"),
        }
    }

    async fn capture(&self, page: &Page, url: &UrlSpec) -> Result<Vec<u8>, RenderError> {
        let timeout_ms = self.config.navigation_timeout.as_millis() as u64;

        tokio::time::timeout(self.config.navigation_timeout, page.goto(url.as_str()))
            .await
            .map_err(|_| RenderError::Timeout(timeout_ms))?
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        tokio::time::sleep(self.config.settle_delay).await;

        if self.dismiss_consent(page).await {
            tracing::debug!(url = %url, "dismissed consent overlay");
        } else {
            tracing::debug!(url = %url, "no consent overlay found or dismissable");
        }

        tokio::time::sleep(self.config.settle_delay).await;

        let params = PrintToPdfParams::builder()
            .landscape(false)
            .display_header_footer(false)
            .print_background(true)
            .prefer_css_page_size(true)
            .build();

        let pdf = tokio::time::timeout(self.config.navigation_timeout, page.pdf(params))
            .await
            .map_err(|_| RenderError::Timeout(timeout_ms))?
            .map_err(|e| RenderError::Print(e.to_string()))?;

        if pdf.is_empty() {
            return Err(RenderError::Print("empty PDF payload".into()));
        }

        Ok(pdf)
    }

    /// Click the first button whose text matches the consent pattern.
    ///
    /// Polls until `consent_timeout`; never fails the render.
    async fn dismiss_consent(&self, page: &Page) -> bool {
        let search = async {
            loop {
                if let Ok(buttons) = page.find_elements("button").await {
                    for button in buttons {
                        let label = button.inner_text().await.ok().flatten().unwrap_or_default();
                        if !self.config.is_consent_label(&label) {
                            continue;
                        }
                        match button.click().await {
                            Ok(_) => return true,
                            Err(e) => tracing::warn!(label = %label.trim(), "consent button click failed: {e}"),
                        }
                    }
                }
                tokio::time::sleep(CONSENT_POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(self.config.consent_timeout, search)
            .await
            .unwrap_or(false)
    }
}

/// Closes its tab when dropped, so a render abandoned mid-capture (request
/// cancelled, client gone) does not leave the tab open in the shared browser.
struct TabGuard(Option<Page>);

impl TabGuard {
    async fn close(mut self, url: &UrlSpec) {
        if let Some(page) = self.0.take()
            && let Err(e) = page.close().await
        {
            tracing::warn!(url = %url, "failed to close tab: {e}");
        }
    }
}

impl Drop for TabGuard {
    fn drop(&mut self) {
        let Some(page) = self.0.take() else { return };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no runtime to close abandoned tab");
            return;
        };

        tracing::debug!("closing tab of abandoned render");
        runtime.spawn(async move {
            if let Err(e) = page.close().await {
                tracing::warn!("failed to close abandoned tab: {e}");
            }
        });
    }
}

#[async_trait::async_trait]
impl PageRenderer for HeadlessRenderer {
    async fn render_pdf(&self, url: &UrlSpec) -> Result<Vec<u8>, RenderError> {
        url.to_url().map_err(|e| RenderError::Navigation(e.to_string()))?;

        let page = self.open_tab().await?;
        let tab = TabGuard(Some(page.clone()));

        let start = std::time::Instant::now();
        let result = self.capture(&page, url).await;

        tab.close(url).await;

        if let Ok(pdf) = &result {
            tracing::debug!(url = %url, bytes = pdf.len(), elapsed_ms = start.elapsed().as_millis() as u64, "rendered PDF");
        }

        result
    }
}
