//! Crawler module for page fetching and extraction
//!
//! This module contains the scraping pipeline, including:
//! - HTTP fetching with a rotating identity pool and GBK decoding
//! - Listing and detail page extraction
//! - The bounded worker pool for detail pages
//! - Overall pipeline coordination

mod coordinator;
mod detail;
mod fetcher;
mod identity;
mod listing;
mod worker_pool;

pub use coordinator::{
    crawl_details, run_pipeline, Coordinator, DetailCrawlOutcome, ItemOutcome, ListingReport,
    PipelineSummary,
};
pub use detail::extract_detail;
pub use fetcher::{build_http_client, decode_page, Fetcher};
pub use identity::IdentityPool;
pub use listing::{extract_listing, extract_listing_entries, ListingEntry, ListingOptions};
pub use worker_pool::{run_pool, WorkQueue};
