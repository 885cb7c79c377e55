use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::listing::{decode_items, extraction_script, listing_url, presence_check, ProductRecord};
use crate::traits::{ListingSource, SourceLauncher};

/// Marker polling interval
const WAIT_POLL_INTERVAL_MS: u64 = 250;

static PROFILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Launches one headless Chrome per scrape
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    config: Arc<ScraperConfig>,
}

impl ChromeLauncher {
    pub fn new(config: Arc<ScraperConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SourceLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn ListingSource>, ScraperError> {
        let session = ChromeSession::launch(self.config.clone()).await?;
        Ok(Box::new(session))
    }
}

/// One browser instance with a single reusable page
pub struct ChromeSession {
    config: Arc<ScraperConfig>,
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    user_data_dir: PathBuf,
    extraction_script: String,
}

impl ChromeSession {
    /// Start the browser and open a blank page.
    pub async fn launch(config: Arc<ScraperConfig>) -> Result<Self, ScraperError> {
        info!("Launching browser...");

        let extraction_script = extraction_script(&config.selectors)?;
        let user_data_dir = unique_profile_dir();

        let mut builder = BrowserConfig::builder().user_data_dir(&user_data_dir);

        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .request_timeout(config.request_timeout)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        let browser_config = builder.build().map_err(ScraperError::BrowserInit)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // Drive CDP events in the background
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let mut session = Self {
            config,
            browser: Some(browser),
            page: None,
            handler_task: Some(handler_task),
            user_data_dir,
            extraction_script,
        };

        if let Err(e) = session.open_page().await {
            session.close().await?;
            return Err(e);
        }

        info!("Browser ready");
        Ok(session)
    }

    async fn open_page(&mut self) -> Result<(), ScraperError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("Browser not initialized".into()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.page = Some(page);
        Ok(())
    }

    fn get_page(&self) -> Result<&Page, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("Page not open".into()))
    }

    /// Poll until the listing item marker exists or `wait_timeout` elapses.
    async fn wait_for_items(&self, page: &Page) -> Result<(), ScraperError> {
        let selector = &self.config.selectors.item;
        let check = presence_check(selector)?;
        let timeout = self.config.wait_timeout;
        let start = Instant::now();

        loop {
            match page.evaluate(check.as_str()).await {
                Ok(result) => {
                    if result.into_value::<bool>().unwrap_or(false) {
                        debug!("Listing marker found after {:?}", start.elapsed());
                        return Ok(());
                    }
                }
                // The execution context can be replaced while the page settles
                Err(e) => debug!("Marker check failed: {}", e),
            }

            if start.elapsed() > timeout {
                return Err(ScraperError::Timeout(format!(
                    "'{}' did not appear within {}s",
                    selector,
                    timeout.as_secs()
                )));
            }

            sleep(Duration::from_millis(WAIT_POLL_INTERVAL_MS)).await;
        }
    }
}

#[async_trait]
impl ListingSource for ChromeSession {
    async fn fetch_page(
        &mut self,
        query: &str,
        page_index: u32,
    ) -> Result<Vec<ProductRecord>, ScraperError> {
        let page = self.get_page()?;
        let url = listing_url(
            &self.config.base_url_template,
            query,
            page_index,
            self.config.items_per_page,
        );
        info!("Scraping page {}: {}", page_index, url);

        page.goto(url.as_str())
            .await
            .map_err(|e| ScraperError::Navigation(format!("{}: {}", url, e)))?;

        self.wait_for_items(page).await?;

        let payload: String = page
            .evaluate(self.extraction_script.as_str())
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?
            .into_value()
            .map_err(|e| ScraperError::Extraction(format!("script returned no JSON: {}", e)))?;

        let records = decode_items(&payload)?;
        debug!("Page {} yielded {} records", page_index, records.len());
        Ok(records)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        info!("Closing browser...");

        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close page: {}", e);
            }
        }

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                debug!("Failed to wait for browser exit: {}", e);
            }
        }

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        if self.user_data_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.user_data_dir) {
                debug!("Failed to remove {:?}: {}", self.user_data_dir, e);
            }
        }

        info!("Browser closed");
        Ok(())
    }
}

fn unique_profile_dir() -> PathBuf {
    let unique_id = format!(
        "{}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos(),
        PROFILE_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    std::env::temp_dir().join(format!("listing-scraper-{}", unique_id))
}
