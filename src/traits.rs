use async_trait::async_trait;

use crate::error::ScraperError;
use crate::listing::ProductRecord;

/// One open browsing context that can load listing pages
#[async_trait]
pub trait ListingSource: Send {
    /// Load the 1-based logical page and return its records in DOM order
    async fn fetch_page(
        &mut self,
        query: &str,
        page_index: u32,
    ) -> Result<Vec<ProductRecord>, ScraperError>;

    /// Release resources
    async fn close(&mut self) -> Result<(), ScraperError>;
}

/// Opens a fresh [`ListingSource`] per scrape
#[async_trait]
pub trait SourceLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn ListingSource>, ScraperError>;
}
