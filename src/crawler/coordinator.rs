//! Crawler coordinator - pipeline orchestration
//!
//! This module drives the two phases of a run:
//! - Listing phase: fetch the index page, extract candidates, merge into the store
//! - Detail phase: enrich every stored item not yet `ok` with a bounded worker
//!   pool, then persist the full set
//!
//! The listing phase fails fast. The detail phase only fails on storage
//! errors; per-item failures are recorded as `ok: false` on the item.

use crate::config::Config;
use crate::crawler::detail::extract_detail;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::listing::{extract_listing_entries, ListingOptions};
use crate::crawler::worker_pool::run_pool;
use crate::item::{now_millis, sort_newest_first, RecruitmentItem};
use crate::storage::{merge_and_persist, JsonStore};
use crate::ScoutError;
use std::future::Future;
use std::sync::Arc;

/// What happened to one item during the detail phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Already `ok`; passed through without a fetch
    Skipped,
    /// Fetched and extracted
    Enriched,
    /// Fetch failed; marked `ok: false`
    Failed,
}

/// Counts reported by the listing phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingReport {
    /// Rows kept from the listing page
    pub scraped: usize,
    /// Kept rows whose date could not be read
    pub fallback_timestamps: usize,
    /// Items in the store after merging
    pub stored: usize,
}

/// Result of a detail crawl over the full item set
#[derive(Debug, Clone, Default)]
pub struct DetailCrawlOutcome {
    /// Every item, newest first
    pub items: Vec<RecruitmentItem>,
    pub skipped: usize,
    pub enriched: usize,
    pub failed: usize,
}

impl DetailCrawlOutcome {
    /// Items whose detail extraction has succeeded, this run or earlier
    pub fn successful(&self) -> Vec<RecruitmentItem> {
        self.items
            .iter()
            .filter(|item| item.is_enriched())
            .cloned()
            .collect()
    }
}

/// Counts reported by a full pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    pub listing: ListingReport,
    pub detail: DetailCrawlOutcome,
}

/// Enriches every item that is not yet `ok` using a fixed-size worker pool
///
/// Items already marked `ok: true` are passed through untouched. A failed
/// fetch marks its item `ok: false` and blanks its detail; it never aborts
/// the batch. The returned items are sorted newest first.
pub async fn crawl_details(
    fetcher: Arc<Fetcher>,
    items: Vec<RecruitmentItem>,
    concurrency: usize,
) -> Result<DetailCrawlOutcome, ScoutError> {
    crawl_items_with(items, concurrency, move |item| {
        let fetcher = Arc::clone(&fetcher);
        async move { enrich_item(&fetcher, item).await }
    })
    .await
}

/// Drives `enrich` over every item, one task per item
///
/// A panicking task only costs its own item, which is recorded as failed.
async fn crawl_items_with<F, Fut>(
    items: Vec<RecruitmentItem>,
    concurrency: usize,
    enrich: F,
) -> Result<DetailCrawlOutcome, ScoutError>
where
    F: Fn(RecruitmentItem) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (RecruitmentItem, ItemOutcome)> + Send + 'static,
{
    let pending = items.iter().filter(|item| !item.is_enriched()).count();
    tracing::info!(
        "Detail crawl: {} items, {} pending, {} workers",
        items.len(),
        pending,
        concurrency
    );

    let results = run_pool(items, concurrency, move |item| {
        let original = item.clone();
        let task = tokio::spawn(enrich(item));
        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Detail task for {} died: {}", original.url, e);
                    let mut item = original;
                    item.mark_failed();
                    (item, ItemOutcome::Failed)
                }
            }
        }
    })
    .await?;

    let mut outcome = DetailCrawlOutcome::default();
    for (item, result) in results {
        match result {
            ItemOutcome::Skipped => outcome.skipped += 1,
            ItemOutcome::Enriched => outcome.enriched += 1,
            ItemOutcome::Failed => outcome.failed += 1,
        }
        outcome.items.push(item);
    }
    sort_newest_first(&mut outcome.items);

    tracing::info!(
        "Detail crawl finished: {} enriched, {} failed, {} skipped",
        outcome.enriched,
        outcome.failed,
        outcome.skipped
    );

    Ok(outcome)
}

/// Fetches and extracts one item's detail page
async fn enrich_item(fetcher: &Fetcher, mut item: RecruitmentItem) -> (RecruitmentItem, ItemOutcome) {
    if item.is_enriched() {
        return (item, ItemOutcome::Skipped);
    }

    match fetcher.fetch_page(&item.url).await {
        Ok(html) => {
            let detail = extract_detail(&html);
            tracing::debug!(
                "Enriched {} ({} attributes, {} bytes of content)",
                item.url,
                detail.forum_mix.len(),
                detail.content.len()
            );
            item.mark_enriched(detail);
            (item, ItemOutcome::Enriched)
        }
        Err(e) => {
            tracing::warn!("Detail fetch failed for {}: {}", item.url, e);
            item.mark_failed();
            (item, ItemOutcome::Failed)
        }
    }
}

/// Main pipeline coordinator
pub struct Coordinator {
    config: Config,
    fetcher: Arc<Fetcher>,
    store: JsonStore,
    listing: ListingOptions,
}

impl Coordinator {
    /// Creates a coordinator with a freshly generated identity pool
    pub fn new(config: Config) -> Result<Self, ScoutError> {
        let fetcher = Fetcher::new(&config.fetch)?;
        Self::with_fetcher(config, fetcher)
    }

    /// Creates a coordinator around an existing fetcher
    pub fn with_fetcher(config: Config, fetcher: Fetcher) -> Result<Self, ScoutError> {
        let listing = ListingOptions::from_config(&config.source)?;
        let store = JsonStore::new(&config.store.path);

        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            store,
            listing,
        })
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    /// Fetches the listing page and merges its recruitment rows into the store
    pub async fn run_listing(&self) -> Result<ListingReport, ScoutError> {
        let index_url = &self.config.source.index_url;
        tracing::info!("Fetching listing {}", index_url);

        let html = self.fetcher.fetch_page(index_url).await?;
        let entries = extract_listing_entries(&html, &self.listing, now_millis());

        let scraped = entries.len();
        let fallback_timestamps = entries.iter().filter(|e| e.timestamp.is_fallback()).count();
        if fallback_timestamps > 0 {
            tracing::info!(
                "{} of {} listing rows had unreadable dates; scrape time used",
                fallback_timestamps,
                scraped
            );
        }

        let new_items = entries.into_iter().map(|entry| entry.item).collect();
        let merged = merge_and_persist(&self.store, new_items, self.config.store.max_items)?;

        Ok(ListingReport {
            scraped,
            fallback_timestamps,
            stored: merged.len(),
        })
    }

    /// Enriches stored items and writes the full set back
    ///
    /// # Errors
    ///
    /// * `ScoutError::StoreMissing` - there is no store file to crawl
    /// * `ScoutError::Storage` - the updated store could not be written
    pub async fn run_details(&self) -> Result<DetailCrawlOutcome, ScoutError> {
        if !self.store.exists() {
            return Err(ScoutError::StoreMissing {
                path: self.store.path().display().to_string(),
            });
        }

        let items = self.store.load();
        let outcome = crawl_details(
            Arc::clone(&self.fetcher),
            items,
            self.config.crawler.concurrency,
        )
        .await?;

        self.store.save(&outcome.items)?;
        Ok(outcome)
    }

    /// Runs the listing phase, then the detail phase
    pub async fn run(&self) -> Result<PipelineSummary, ScoutError> {
        let listing = self.run_listing().await?;
        let detail = self.run_details().await?;
        Ok(PipelineSummary { listing, detail })
    }
}

/// Runs a complete listing + detail pass
///
/// # Example
///
/// ```no_run
/// use recruit_scout::config::load_config;
/// use recruit_scout::crawler::run_pipeline;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("scout.toml"))?;
/// let summary = run_pipeline(config).await?;
/// println!("{} items enriched", summary.detail.enriched);
/// # Ok(())
/// # }
/// ```
pub async fn run_pipeline(config: Config) -> Result<PipelineSummary, ScoutError> {
    Coordinator::new(config)?.run().await
}
