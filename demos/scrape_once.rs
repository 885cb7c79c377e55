use listing_scraper::{ScrapeRequest, ScraperConfig, ScraperService};
use tower::Service;

#[tokio::main]
async fn main() {
    // Logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Query and page count from the command line
    let mut args = std::env::args().skip(1);
    let query = args.next().unwrap_or_else(|| "notebook".to_string());
    let pages: u32 = args.next().and_then(|p| p.parse().ok()).unwrap_or(1);

    let config = ScraperConfig::from_env().with_headless(false); // visible browser for debugging
    let mut service = ScraperService::new(config);

    println!("=== Listing Scraper: '{}' ({} pages) ===", query, pages);

    match service.call(ScrapeRequest::new(query, pages)).await {
        Ok(exported) => {
            println!(
                "Done! {} records saved to {:?}",
                exported.record_count, exported.path
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
        }
    }
}
