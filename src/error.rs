use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Browser initialization error: {0}")]
    BrowserInit(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("JavaScript evaluation error: {0}")]
    JavaScript(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("File I/O error: {0}")]
    FileIO(#[from] std::io::Error),
}
