use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::http::AssetReport;

#[derive(Debug, Clone, Serialize)]
pub struct ScrapingStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub products_found: usize,
    pub products_queued: usize,
    pub records_written: usize,
    pub assets_downloaded: usize,
    pub asset_failures: usize,
    pub bytes_downloaded: usize,
    pub unidentified_products: usize,
}

#[derive(Debug, Clone)]
pub struct StatsTracker {
    stats: Arc<RwLock<ScrapingStats>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(ScrapingStats {
                start_time: Utc::now(),
                end_time: None,
                products_found: 0,
                products_queued: 0,
                records_written: 0,
                assets_downloaded: 0,
                asset_failures: 0,
                bytes_downloaded: 0,
                unidentified_products: 0,
            })),
        }
    }

    /// `found` links on the listing page, of which `queued` will be scraped.
    pub fn record_listing(&self, found: usize, queued: usize) {
        let mut stats = self.stats.write();
        stats.products_found += found;
        stats.products_queued += queued;
    }

    pub fn record_written(&self, unidentified: bool) {
        let mut stats = self.stats.write();
        stats.records_written += 1;
        if unidentified {
            stats.unidentified_products += 1;
        }
    }

    pub fn record_assets(&self, report: &AssetReport) {
        let mut stats = self.stats.write();
        stats.assets_downloaded += report.saved;
        stats.asset_failures += report.failed;
        stats.bytes_downloaded += report.bytes;
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn get_stats(&self) -> ScrapingStats {
        self.stats.read().clone()
    }

    pub fn print_summary(&self) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        println!("\nScraping Statistics:");
        println!("===================");
        println!("Duration: {} seconds", duration.num_seconds());
        println!("Products Found: {}", stats.products_found);
        println!("Products Queued: {}", stats.products_queued);
        println!("Records Written: {}", stats.records_written);
        println!("Assets Downloaded: {}", stats.assets_downloaded);
        println!("Asset Failures: {}", stats.asset_failures);
        println!(
            "Data Downloaded: {:.2} MB",
            stats.bytes_downloaded as f64 / 1_000_000.0
        );
        if stats.unidentified_products > 0 {
            println!("Unidentified Products: {}", stats.unidentified_products);
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
