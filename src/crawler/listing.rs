//! Listing page extractor
//!
//! This module parses the forum index page and turns every thread row whose
//! category label carries the recruitment marker into a candidate item:
//! - Category label from `th.thread-name span > a.xmc_blue`
//! - Title and link from `th.thread-name a.a_subject`
//! - Displayed date from `td.by em`

use crate::config::SourceConfig;
use crate::item::{parse_listing_date, ListingTimestamp, RecruitmentItem};
use crate::url::{item_id, resolve_href};
use crate::{ConfigError, ScoutError};
use chrono::FixedOffset;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Settings the listing extractor needs, resolved from configuration
#[derive(Debug, Clone)]
pub struct ListingOptions {
    /// Origin relative thread links are resolved against
    pub base_url: Url,

    /// Substring a row's category label must contain to be kept
    pub tag_marker: String,

    /// Zone the displayed dates are written in
    pub utc_offset: FixedOffset,
}

impl ListingOptions {
    /// Resolves listing options from the `[source]` configuration section
    pub fn from_config(config: &SourceConfig) -> Result<Self, ScoutError> {
        let base_url = Url::parse(&config.base_url)?;
        let utc_offset = FixedOffset::east_opt(config.utc_offset_hours * 3600).ok_or_else(|| {
            ConfigError::Validation(format!(
                "utc_offset_hours out of range: {}",
                config.utc_offset_hours
            ))
        })?;

        Ok(Self {
            base_url,
            tag_marker: config.tag_marker.clone(),
            utc_offset,
        })
    }
}

/// A kept listing row together with how its timestamp was obtained
#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub item: RecruitmentItem,
    pub timestamp: ListingTimestamp,
}

struct ListingSelectors {
    row: Selector,
    thread_name: Selector,
    label: Selector,
    subject: Selector,
    date: Selector,
}

impl ListingSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            row: Selector::parse("tr.forum_list").ok()?,
            thread_name: Selector::parse("th.thread-name").ok()?,
            label: Selector::parse("span > a.xmc_blue").ok()?,
            subject: Selector::parse("a.a_subject").ok()?,
            date: Selector::parse("td.by em").ok()?,
        })
    }
}

/// Parses a listing page into candidate items
///
/// # Arguments
///
/// * `html` - The decoded listing page
/// * `options` - Base URL, tag marker and date zone
/// * `now_ms` - Scrape time, used for rows whose date cannot be read
///
/// # Example
///
/// ```
/// use recruit_scout::config::SourceConfig;
/// use recruit_scout::crawler::{extract_listing, ListingOptions};
///
/// let html = r#"<table><tr class="forum_list">
///   <th class="thread-name"><span><a class="xmc_blue">博士招生</a></span>
///   <a class="a_subject" href="/t-1-1">Hiring PhD students</a></th>
///   <td class="by"><em>2024-03-15</em></td></tr></table>"#;
/// let options = ListingOptions::from_config(&SourceConfig::default()).unwrap();
/// let items = extract_listing(html, &options, 0);
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].url, "https://muchong.com/t-1-1");
/// ```
pub fn extract_listing(html: &str, options: &ListingOptions, now_ms: i64) -> Vec<RecruitmentItem> {
    extract_listing_entries(html, options, now_ms)
        .into_iter()
        .map(|entry| entry.item)
        .collect()
}

/// Parses a listing page, keeping the timestamp provenance of each row
pub fn extract_listing_entries(
    html: &str,
    options: &ListingOptions,
    now_ms: i64,
) -> Vec<ListingEntry> {
    let Some(selectors) = ListingSelectors::new() else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut entries = Vec::new();
    let mut rows_seen = 0usize;

    for row in document.select(&selectors.row) {
        rows_seen += 1;
        if let Some(entry) = extract_row(row, &selectors, options, now_ms) {
            entries.push(entry);
        }
    }

    let fallbacks = entries.iter().filter(|e| e.timestamp.is_fallback()).count();
    tracing::debug!(
        "Listing: {} rows, {} kept, {} with fallback timestamps",
        rows_seen,
        entries.len(),
        fallbacks
    );

    entries
}

/// Extracts a single thread row, or None if it is not a recruitment post
fn extract_row(
    row: ElementRef<'_>,
    selectors: &ListingSelectors,
    options: &ListingOptions,
    now_ms: i64,
) -> Option<ListingEntry> {
    let thread_name = row.select(&selectors.thread_name).next()?;

    let tag = collect_text(thread_name.select(&selectors.label));
    if !tag.contains(&options.tag_marker) {
        return None;
    }

    let subject = thread_name.select(&selectors.subject).next()?;
    let title = subject.text().collect::<String>().trim().to_string();

    let href = subject.value().attr("href").unwrap_or("");
    let Some(url) = resolve_href(href, &options.base_url) else {
        tracing::debug!("Skipping row '{}' with unusable href '{}'", title, href);
        return None;
    };

    let date_text = collect_text(row.select(&selectors.date));
    let timestamp = parse_listing_date(&date_text, options.utc_offset, now_ms);
    if timestamp.is_fallback() {
        tracing::debug!("Unreadable date '{}' for {}, using scrape time", date_text, url);
    }

    let item = RecruitmentItem::new(item_id(&url), tag, title, url, timestamp.millis());
    Some(ListingEntry { item, timestamp })
}

/// Concatenates the text of every matched element, trimmed
fn collect_text<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    elements
        .flat_map(|element| element.text())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ListingOptions {
        ListingOptions::from_config(&SourceConfig::default()).unwrap()
    }

    fn row(tag: &str, href: &str, title: &str, date: &str) -> String {
        format!(
            r#"<tr class="forum_list">
                <th class="thread-name">
                    <span>[<a class="xmc_blue" href="/f-430-1-typeid-1">{tag}</a>]</span>
                    <a class="a_subject" href="{href}">{title}</a>
                </th>
                <td class="by"><cite>someone</cite><em>{date}</em></td>
            </tr>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            "<html><body><table>{}</table></body></html>",
            rows.concat()
        )
    }

    #[test]
    fn test_keeps_only_marked_rows() {
        let html = page(&[
            row("博士招生", "/t-1-1", "PhD openings", "2024-03-15"),
            row("学术交流", "/t-2-1", "Seminar", "2024-03-15"),
        ]);

        let items = extract_listing(&html, &options(), 0);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].tag, "博士招生");
        assert_eq!(items[0].title, "PhD openings");
        assert_eq!(items[0].url, "https://muchong.com/t-1-1");
        assert_eq!(items[0].id, item_id("https://muchong.com/t-1-1"));
        assert!(items[0].detail.is_none());
        assert!(items[0].ok.is_none());
    }

    #[test]
    fn test_title_is_trimmed() {
        let html = page(&[row("硕士招生", "/t-1-1", "\n   Masters   \n", "2024-03-15")]);
        let items = extract_listing(&html, &options(), 0);
        assert_eq!(items[0].title, "Masters");
    }

    #[test]
    fn test_absolute_href_kept() {
        let html = page(&[row("博士招生", "https://other.example.com/t-9", "T", "2024-03-15")]);
        let items = extract_listing(&html, &options(), 0);
        assert_eq!(items[0].url, "https://other.example.com/t-9");
    }

    #[test]
    fn test_parsed_timestamp() {
        let html = page(&[row("博士招生", "/t-1-1", "T", "2024-03-15")]);
        let entries = extract_listing_entries(&html, &options(), 0);
        assert_eq!(
            entries[0].timestamp,
            ListingTimestamp::Parsed(1_710_432_000_000)
        );
        assert_eq!(entries[0].item.timestamp, 1_710_432_000_000);
    }

    #[test]
    fn test_unparseable_date_uses_scrape_time() {
        let html = page(&[row("博士招生", "/t-1-1", "T", "昨天 10:00")]);
        let entries = extract_listing_entries(&html, &options(), 1_234);
        assert_eq!(entries[0].timestamp, ListingTimestamp::Fallback(1_234));
        assert_eq!(entries[0].item.timestamp, 1_234);
    }

    #[test]
    fn test_row_without_link_skipped() {
        let html = page(&[row("博士招生", "", "T", "2024-03-15")]);
        assert!(extract_listing(&html, &options(), 0).is_empty());
    }

    #[test]
    fn test_custom_marker() {
        let mut source = SourceConfig::default();
        source.tag_marker = "交流".to_string();
        let opts = ListingOptions::from_config(&source).unwrap();

        let html = page(&[
            row("博士招生", "/t-1-1", "A", "2024-03-15"),
            row("学术交流", "/t-2-1", "B", "2024-03-15"),
        ]);
        let items = extract_listing(&html, &opts, 0);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "B");
    }

    #[test]
    fn test_page_without_rows() {
        let html = "<html><body><p>maintenance</p></body></html>";
        assert!(extract_listing(html, &options(), 0).is_empty());
    }

    #[test]
    fn test_same_url_same_id_across_title_changes() {
        let a = extract_listing(&page(&[row("博士招生", "/t-1-1", "Old", "")]), &options(), 0);
        let b = extract_listing(&page(&[row("博士招生", "/t-1-1", "NEW", "")]), &options(), 0);
        assert_eq!(a[0].id, b[0].id);
    }
}
