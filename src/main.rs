use listing_scraper::{server, ScraperConfig, ScraperService};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ScraperConfig::from_env();
    server::run(ScraperService::new(config)).await
}
