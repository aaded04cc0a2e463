pub mod config;
mod crawler;
mod errors;

pub use config::ScrapeConfig;
pub use crawler::{Crawler, CONSENT_BUTTON, CONSENT_TEXT, PRODUCT_TITLE};
pub use errors::{ScraperError, ScraperResult};
