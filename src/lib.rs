//! Recruit-Scout: an incremental forum recruitment scraper
//!
//! This crate scrapes a forum listing page for graduate-recruitment threads,
//! merges them into a flat JSON store keyed by a URL digest, and enriches each
//! stored thread with the attributes and body of its detail page.

pub mod config;
pub mod crawler;
pub mod item;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Recruit-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Store file not found: {path}")]
    StoreMissing { path: String },

    #[error("Storage error for {path}: {message}")]
    Storage { path: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Detail worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Recruit-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use item::{Detail, ListingTimestamp, RecruitmentItem};
pub use storage::{merge_items, JsonStore};
pub use crate::url::{item_id, resolve_href};
