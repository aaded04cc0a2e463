pub mod browser;
pub mod core;
pub mod http;
pub mod parser;
pub mod record;
pub mod stats;
pub mod storage;

pub use browser::{BrowserSession, ChromiumSession, MockSession};
pub use core::{Crawler, ScrapeConfig, ScraperError, ScraperResult};
pub use http::AssetDownloader;
pub use parser::{ListingParser, ProductParser};
pub use record::{BomLine, Nameplate, ProductRecord};
pub use stats::StatsTracker;
pub use storage::DiskStorage;
