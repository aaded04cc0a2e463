pub mod downloader;

pub use downloader::{AssetDownloader, AssetReport, DownloadOutcome};
