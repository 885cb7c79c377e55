use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::browser::ChromeLauncher;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::export::{export_file_name, write_workbook};
use crate::orchestrator;
use crate::traits::SourceLauncher;

/// Scrape request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub search_query: String,
    pub max_pages: u32,
}

impl ScrapeRequest {
    pub fn new(search_query: impl Into<String>, max_pages: u32) -> Self {
        Self {
            search_query: search_query.into(),
            max_pages,
        }
    }
}

/// Generated workbook, owned by the caller until it is streamed and removed
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub record_count: usize,
}

/// Scrape-and-export pipeline as a tower::Service
#[derive(Clone)]
pub struct ScraperService {
    config: Arc<ScraperConfig>,
    launcher: Arc<dyn SourceLauncher>,
}

impl ScraperService {
    /// Service backed by headless Chrome
    pub fn new(config: ScraperConfig) -> Self {
        let config = Arc::new(config);
        let launcher = Arc::new(ChromeLauncher::new(config.clone()));
        Self { config, launcher }
    }

    pub fn with_launcher(config: ScraperConfig, launcher: Arc<dyn SourceLauncher>) -> Self {
        Self {
            config: Arc::new(config),
            launcher,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ExportedFile;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!(
            "Scrape request received: query='{}', pages={}",
            req.search_query, req.max_pages
        );

        let config = self.config.clone();
        let launcher = self.launcher.clone();

        Box::pin(async move {
            let records = orchestrator::scrape(
                launcher.as_ref(),
                &req.search_query,
                req.max_pages,
                config.items_per_page,
            )
            .await?;

            let file_name = export_file_name(&req.search_query);
            let path = config.output_dir.join(&file_name);
            write_workbook(&records, &path)?;

            Ok(ExportedFile {
                path,
                file_name,
                record_count: records.len(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{ProductRecord, RawListingItem};
    use crate::traits::ListingSource;
    use async_trait::async_trait;

    struct FixedSource(usize);

    #[async_trait]
    impl ListingSource for FixedSource {
        async fn fetch_page(
            &mut self,
            _query: &str,
            _page_index: u32,
        ) -> Result<Vec<ProductRecord>, ScraperError> {
            Ok(vec![ProductRecord::from_raw(RawListingItem::default()); self.0])
        }

        async fn close(&mut self) -> Result<(), ScraperError> {
            Ok(())
        }
    }

    struct FixedLauncher(usize);

    #[async_trait]
    impl SourceLauncher for FixedLauncher {
        async fn launch(&self) -> Result<Box<dyn ListingSource>, ScraperError> {
            Ok(Box::new(FixedSource(self.0)))
        }
    }

    #[test]
    fn test_scrape_request_new() {
        let req = ScrapeRequest::new("notebook", 3);
        assert_eq!(req.search_query, "notebook");
        assert_eq!(req.max_pages, 3);
    }

    #[tokio::test]
    async fn test_call_exports_sanitized_file() {
        let dir = std::env::temp_dir().join(format!("listing-scraper-service-{}", std::process::id()));
        let config = ScraperConfig::default().with_output_dir(&dir);
        let mut service = ScraperService::with_launcher(config, Arc::new(FixedLauncher(7)));

        let exported = service
            .call(ScrapeRequest::new("silla gamer", 2))
            .await
            .unwrap();

        assert_eq!(exported.file_name, "silla_gamer.xlsx");
        assert_eq!(exported.path, dir.join("silla_gamer.xlsx"));
        assert_eq!(exported.record_count, 7);
        assert!(exported.path.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
