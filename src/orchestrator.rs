//! Sequential page loop over a [`ListingSource`]

use tracing::{info, warn};

use crate::error::ScraperError;
use crate::listing::ProductRecord;
use crate::traits::{ListingSource, SourceLauncher};

/// Fetch pages `1..=max_pages` in order and concatenate their records.
///
/// Stops after the first page returning fewer than `items_per_page` records.
pub async fn collect_pages(
    source: &mut dyn ListingSource,
    query: &str,
    max_pages: u32,
    items_per_page: usize,
) -> Result<Vec<ProductRecord>, ScraperError> {
    let mut all_records = Vec::new();

    for page_index in 1..=max_pages {
        let records = source.fetch_page(query, page_index).await?;
        let count = records.len();
        all_records.extend(records);

        if count < items_per_page {
            if count == 0 {
                warn!(
                    "Page {} returned no records, results for '{}' may be truncated",
                    page_index, query
                );
            } else {
                info!(
                    "Last page reached at page {} ({} < {} records)",
                    page_index, count, items_per_page
                );
            }
            break;
        }
    }

    Ok(all_records)
}

/// Launch a source, run [`collect_pages`] and close the source on every exit path.
pub async fn scrape(
    launcher: &dyn SourceLauncher,
    query: &str,
    max_pages: u32,
    items_per_page: usize,
) -> Result<Vec<ProductRecord>, ScraperError> {
    let mut source = launcher.launch().await?;

    let outcome = collect_pages(source.as_mut(), query, max_pages, items_per_page).await;

    if let Err(e) = source.close().await {
        warn!("Failed to release listing source: {}", e);
    }

    match &outcome {
        Ok(records) => info!("Scraped {} records for '{}'", records.len(), query),
        Err(e) => warn!("Scrape for '{}' aborted: {}", query, e),
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{ProductRecord, RawListingItem};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    fn records(page: u32, count: usize) -> Vec<ProductRecord> {
        (0..count)
            .map(|i| {
                ProductRecord::from_raw(RawListingItem {
                    title: Some(format!("p{}-{}", page, i)),
                    ..Default::default()
                })
            })
            .collect()
    }

    /// Returns a fixed record count per page, or fails on `fail_on`
    struct ScriptedSource {
        page_sizes: Vec<usize>,
        fail_on: Option<u32>,
        fetches: Arc<AtomicU32>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ListingSource for ScriptedSource {
        async fn fetch_page(
            &mut self,
            _query: &str,
            page_index: u32,
        ) -> Result<Vec<ProductRecord>, ScraperError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(page_index) {
                return Err(ScraperError::Timeout("marker never appeared".into()));
            }
            let size = self
                .page_sizes
                .get(page_index as usize - 1)
                .copied()
                .unwrap_or(0);
            Ok(records(page_index, size))
        }

        async fn close(&mut self) -> Result<(), ScraperError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ScriptedLauncher {
        page_sizes: Vec<usize>,
        fail_on: Option<u32>,
        fetches: Arc<AtomicU32>,
        closed: Arc<AtomicBool>,
    }

    impl ScriptedLauncher {
        fn new(page_sizes: Vec<usize>, fail_on: Option<u32>) -> Self {
            Self {
                page_sizes,
                fail_on,
                fetches: Arc::new(AtomicU32::new(0)),
                closed: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    #[async_trait]
    impl SourceLauncher for ScriptedLauncher {
        async fn launch(&self) -> Result<Box<dyn ListingSource>, ScraperError> {
            Ok(Box::new(ScriptedSource {
                page_sizes: self.page_sizes.clone(),
                fail_on: self.fail_on,
                fetches: self.fetches.clone(),
                closed: self.closed.clone(),
            }))
        }
    }

    #[tokio::test]
    async fn test_single_page_request_stops_at_max() {
        let launcher = ScriptedLauncher::new(vec![50, 10], None);
        let result = scrape(&launcher, "laptop", 1, 50).await.unwrap();

        assert_eq!(result.len(), 50);
        assert_eq!(launcher.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_page_stops_early() {
        let launcher = ScriptedLauncher::new(vec![50, 30, 50], None);
        let result = scrape(&launcher, "laptop", 3, 50).await.unwrap();

        assert_eq!(result.len(), 80);
        assert_eq!(launcher.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(result[0].title, "p1-0");
        assert_eq!(result[50].title, "p2-0");
        assert_eq!(result[79].title, "p2-29");
    }

    #[tokio::test]
    async fn test_full_pages_run_to_max() {
        let launcher = ScriptedLauncher::new(vec![50; 6], None);
        let result = scrape(&launcher, "laptop", 4, 50).await.unwrap();

        assert_eq!(result.len(), 200);
        assert_eq!(launcher.fetches.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_empty_page_stops() {
        let launcher = ScriptedLauncher::new(vec![50, 0, 50], None);
        let result = scrape(&launcher, "laptop", 3, 50).await.unwrap();

        assert_eq!(result.len(), 50);
        assert_eq!(launcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_pages_fetches_nothing() {
        let launcher = ScriptedLauncher::new(vec![50], None);
        let result = scrape(&launcher, "laptop", 0, 50).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(launcher.fetches.load(Ordering::SeqCst), 0);
        assert!(launcher.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_source_closed_on_success() {
        let launcher = ScriptedLauncher::new(vec![12], None);
        scrape(&launcher, "mate", 2, 50).await.unwrap();
        assert!(launcher.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_source_closed_on_failure() {
        let launcher = ScriptedLauncher::new(vec![50, 50, 50], Some(2));
        let err = scrape(&launcher, "mate", 3, 50).await.unwrap_err();

        assert!(matches!(err, ScraperError::Timeout(_)));
        assert!(launcher.closed.load(Ordering::SeqCst));
        assert_eq!(launcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_never_exceeds_max_pages() {
        for max_pages in 1..=5u32 {
            let launcher = ScriptedLauncher::new(vec![50; 10], None);
            scrape(&launcher, "x", max_pages, 50).await.unwrap();
            assert_eq!(launcher.fetches.load(Ordering::SeqCst), max_pages);
        }
    }
}
