use crate::storage::DEFAULT_MAX_ITEMS;
use serde::Deserialize;

/// Main configuration structure for Recruit-Scout
///
/// Every section is optional; a missing section takes its defaults, so an
/// empty file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

/// Where the listing comes from and which rows are kept
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Forum index page to scrape
    #[serde(rename = "index-url")]
    pub index_url: String,

    /// Origin that relative thread links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Substring the row's category label must contain
    #[serde(rename = "tag-marker")]
    pub tag_marker: String,

    /// UTC offset (hours) of the dates displayed on the listing
    #[serde(rename = "utc-offset-hours")]
    pub utc_offset_hours: i32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            index_url: "https://muchong.com/f-430-1-threadtype-11".to_string(),
            base_url: "https://muchong.com".to_string(),
            tag_marker: "招生".to_string(),
            utc_offset_hours: 8,
        }
    }
}

/// HTTP client behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Number of identity strings generated at startup
    #[serde(rename = "user-agent-pool-size")]
    pub user_agent_pool_size: usize,

    /// Whole-request timeout in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Optional Referer header sent with every request
    pub referer: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent_pool_size: 100,
            request_timeout_secs: 30,
            referer: None,
        }
    }
}

/// Persisted store location and retention
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the JSON store file
    pub path: String,

    /// Maximum number of items retained, newest first
    #[serde(rename = "max-items")]
    pub max_items: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "src/web/assets/source.json".to_string(),
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

/// Detail crawl behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of detail workers
    pub concurrency: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self { concurrency: 5 }
    }
}
