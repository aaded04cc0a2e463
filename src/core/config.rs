use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const CATALOG_URL: &str = "https://www.baldor.com/catalog";
pub const DEFAULT_CATEGORY: &str = "DC Motors";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Nameplate labels kept in a record when no other list is configured.
pub const DEFAULT_NAMEPLATE_KEYS: [&str; 4] = ["HP", "VOLTS", "RPM", "FRAME"];

/// Tile clicked when no target category is configured.
pub const FALLBACK_CATEGORY_INDEX: usize = 4;

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub catalog_url: Url,
    pub target_category: Option<String>,
    pub product_limit: usize,
    pub listing_skip: usize,
    pub output_dir: PathBuf,
    pub nameplate_keys: Vec<String>,
    pub wait_timeout: Duration,
    /// Seconds to pause between page interactions, drawn uniformly.
    pub pause_secs: RangeInclusive<f64>,
    pub consent_settle: Duration,
    pub user_agent: String,
    pub headless: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            catalog_url: Url::parse(CATALOG_URL).expect("catalog URL constant is valid"),
            target_category: Some(DEFAULT_CATEGORY.to_string()),
            product_limit: 5,
            listing_skip: 1,
            output_dir: PathBuf::from("output"),
            nameplate_keys: DEFAULT_NAMEPLATE_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            wait_timeout: Duration::from_secs(10),
            pause_secs: 2.0..=5.0,
            consent_settle: Duration::from_secs(4),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headless: true,
        }
    }
}

impl ScrapeConfig {
    pub fn with_catalog_url(mut self, url: Url) -> Self {
        self.catalog_url = url;
        self
    }

    pub fn with_target_category(mut self, category: Option<&str>) -> Self {
        self.target_category = category.map(str::to_string);
        self
    }

    pub fn with_product_limit(mut self, limit: usize) -> Self {
        self.product_limit = limit;
        self
    }

    pub fn with_listing_skip(mut self, skip: usize) -> Self {
        self.listing_skip = skip;
        self
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_nameplate_keys(mut self, keys: Vec<&str>) -> Self {
        self.nameplate_keys = keys.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Zero-length pauses, used when driving scripted sessions.
    pub fn without_pauses(mut self) -> Self {
        self.pause_secs = 0.0..=0.0;
        self.consent_settle = Duration::ZERO;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}
