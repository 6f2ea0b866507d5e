//! Statistics over the persisted store
//!
//! This module summarizes detail-crawl progress and tag distribution for the
//! `--stats` command.

use crate::item::RecruitmentItem;
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::BTreeMap;

/// Store statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Total number of stored items
    pub total_items: usize,

    /// Items whose detail has been extracted (`ok: true`)
    pub enriched: usize,

    /// Items whose last detail attempt failed (`ok: false`)
    pub failed: usize,

    /// Items never sent through the detail crawl
    pub untried: usize,

    /// Newest and oldest timestamps (ms), if any items exist
    pub newest: Option<i64>,
    pub oldest: Option<i64>,

    /// Item count per category label
    pub items_by_tag: BTreeMap<String, usize>,
}

/// Computes statistics over a loaded item set
pub fn compute_statistics(items: &[RecruitmentItem]) -> StoreStatistics {
    let mut stats = StoreStatistics {
        total_items: items.len(),
        ..Default::default()
    };

    for item in items {
        match item.ok {
            Some(true) => stats.enriched += 1,
            Some(false) => stats.failed += 1,
            None => stats.untried += 1,
        }

        *stats.items_by_tag.entry(item.tag.clone()).or_insert(0) += 1;
    }

    stats.newest = items.iter().map(|i| i.timestamp).max();
    stats.oldest = items.iter().map(|i| i.timestamp).min();
    stats
}

/// Renders epoch milliseconds in the given zone, e.g. `2024-03-15 08:30`
pub fn format_timestamp(ms: i64, offset: FixedOffset) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `offset` - Zone used to display dates
pub fn print_statistics(stats: &StoreStatistics, offset: FixedOffset) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Total items: {}", stats.total_items);
    if let (Some(newest), Some(oldest)) = (stats.newest, stats.oldest) {
        println!("  Newest: {}", format_timestamp(newest, offset));
        println!("  Oldest: {}", format_timestamp(oldest, offset));
    }
    println!();

    println!("Detail Crawl:");
    println!("  Enriched: {}", stats.enriched);
    println!("  Failed: {}", stats.failed);
    println!("  Untried: {}", stats.untried);
    println!();

    if !stats.items_by_tag.is_empty() {
        println!("Items by Tag:");
        let mut tag_counts: Vec<_> = stats.items_by_tag.iter().collect();
        tag_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (tag, count) in tag_counts {
            println!("  {}: {}", tag, count);
        }
        println!();
    }

    let success_rate = if stats.total_items > 0 {
        (stats.enriched as f64 / stats.total_items as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} items enriched)",
        success_rate, stats.enriched, stats.total_items
    );
}
