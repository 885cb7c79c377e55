use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::listing::{SelectorSet, DEFAULT_BASE_URL, DEFAULT_ITEMS_PER_PAGE};

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Listing URL with `{query}` and `{offset}` placeholders
    pub base_url_template: String,
    pub items_per_page: usize,
    /// Page count used when a request omits `pages`
    pub default_pages: u32,
    pub selectors: SelectorSet,
    pub output_dir: PathBuf,
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    /// CDP request timeout
    pub request_timeout: Duration,
    /// How long to wait for the listing marker after navigation
    pub wait_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url_template: DEFAULT_BASE_URL.to_string(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            default_pages: 5,
            selectors: SelectorSet::default(),
            output_dir: PathBuf::from("./exports"),
            headless: true,
            chrome_executable: None,
            request_timeout: Duration::from_secs(60),
            wait_timeout: Duration::from_secs(30),
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(template) = lookup("SCRAPER_BASE_URL") {
            if template.contains("{query}") && template.contains("{offset}") {
                config.base_url_template = template;
            } else {
                warn!(
                    "SCRAPER_BASE_URL must contain {{query}} and {{offset}}, keeping {}",
                    config.base_url_template
                );
            }
        }
        if let Some(dir) = lookup("SCRAPER_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        config.chrome_executable = lookup("CHROME_PATH")
            .or_else(|| lookup("CHROMIUM_PATH"))
            .map(PathBuf::from);
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }

        config.items_per_page = match parsed(&lookup, "SCRAPER_ITEMS_PER_PAGE", config.items_per_page) {
            0 => {
                warn!(
                    "Ignoring invalid SCRAPER_ITEMS_PER_PAGE=0, using {}",
                    DEFAULT_ITEMS_PER_PAGE
                );
                DEFAULT_ITEMS_PER_PAGE
            }
            n => n,
        };
        config.headless = parsed(&lookup, "SCRAPER_HEADLESS", config.headless);
        config.port = parsed(&lookup, "PORT", config.port);
        config.wait_timeout = Duration::from_secs(parsed(
            &lookup,
            "SCRAPER_WAIT_TIMEOUT_SECS",
            config.wait_timeout.as_secs(),
        ));

        config
    }

    pub fn with_base_url(mut self, template: impl Into<String>) -> Self {
        self.base_url_template = template.into();
        self
    }

    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = items_per_page;
        self
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {:?}", key, raw, default);
            default
        }),
        None => default,
    }
}
