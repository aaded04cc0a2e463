use chromiumoxide::error::CdpError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Browser error: {0}")]
    BrowserError(#[from] CdpError),

    #[error("Browser launch error: {0}")]
    LaunchError(String),

    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Timed out after {timeout_ms}ms waiting for: {selector}")]
    Timeout { selector: String, timeout_ms: u128 },

    #[error("Extraction error: {0}")]
    ExtractionError(String),
}

pub type ScraperResult<T> = Result<T, ScraperError>;
