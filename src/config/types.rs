use serde::Deserialize;

/// Main configuration structure for Chapterline
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Catalog origin, e.g. "https://truyenfull.vision/"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Listing path relative to the base URL, slash-terminated
    #[serde(rename = "listing-path")]
    pub listing_path: String,

    /// Maximum novels to process per logical crawl
    #[serde(rename = "max-novels")]
    pub max_novels: u32,

    /// Maximum chapter sequences probed per novel
    #[serde(rename = "max-chapters-per-novel")]
    pub max_chapters_per_novel: u32,

    /// Fixed delay between requests (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Placeholder for fields the source page does not provide
    #[serde(rename = "missing-info")]
    pub missing_info: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory of the dataset archive
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}
