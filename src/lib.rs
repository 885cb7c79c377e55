//! Listing scraper library
//!
//! - Fetches MercadoLibre search result pages with headless Chrome
//! - Extracts product cards into [`ProductRecord`]s
//! - Exports them as a single-sheet xlsx served over HTTP
//!
//! # Usage
//!
//! ```rust,ignore
//! use listing_scraper::{ScrapeRequest, ScraperConfig, ScraperService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScraperConfig::new().with_output_dir("./exports");
//!     let mut service = ScraperService::new(config);
//!
//!     let exported = service
//!         .call(ScrapeRequest::new("notebook", 2))
//!         .await
//!         .unwrap();
//!     println!("{} records -> {:?}", exported.record_count, exported.path);
//! }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod export;
pub mod listing;
pub mod orchestrator;
pub mod server;
pub mod service;
pub mod traits;

pub use browser::{ChromeLauncher, ChromeSession};
pub use config::ScraperConfig;
pub use error::ScraperError;
pub use listing::{ProductRecord, RawListingItem, SelectorSet};
pub use service::{ExportedFile, ScrapeRequest, ScraperService};
pub use traits::{ListingSource, SourceLauncher};
