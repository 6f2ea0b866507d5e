//! The persisted unit of the store
//!
//! A [`RecruitmentItem`] is created from a listing row without `detail` or
//! `ok`, merged into the store, and later enriched in place by the detail
//! crawler. Field names on disk match what the browsing UI reads.

mod timestamp;

pub use timestamp::{now_millis, parse_listing_date, ListingTimestamp};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Attribute label translations applied to `forumMix` keys
pub const FORUM_MIX_KEYS: &[(&str, &str)] = &[
    ("学校", "school"),
    ("专业", "major"),
    ("年级", "grade"),
    ("招生人数", "quota"),
    ("招生状态", "status"),
    ("联系方式", "contact"),
];

/// Maps a source-language attribute label to its canonical key
///
/// Labels without a translation pass through unchanged.
pub fn canonical_key(label: &str) -> &str {
    FORUM_MIX_KEYS
        .iter()
        .find(|(source, _)| *source == label)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(label)
}

/// Structured content of a thread's detail page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    /// Canonical attribute table (school, major, grade, quota, status, contact)
    #[serde(rename = "forumMix", default)]
    pub forum_mix: BTreeMap<String, String>,

    /// Body HTML with embedded images removed
    #[serde(default)]
    pub content: String,
}

/// A recruitment thread as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitmentItem {
    #[serde(default)]
    pub tag: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,

    pub id: String,

    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Detail>,

    /// `None` until the first detail attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,

    /// Fields this crate does not know about, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecruitmentItem {
    /// Creates an untried item from listing data
    pub fn new(
        id: impl Into<String>,
        tag: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            tag: tag.into(),
            title: title.into(),
            url: url.into(),
            id: id.into(),
            timestamp,
            detail: None,
            ok: None,
            extra: Map::new(),
        }
    }

    /// Returns true once detail extraction has succeeded
    pub fn is_enriched(&self) -> bool {
        self.ok == Some(true)
    }

    /// Returns true if a detail attempt was made and failed
    pub fn is_failed(&self) -> bool {
        self.ok == Some(false)
    }

    /// Returns true if no detail attempt has been made yet
    pub fn is_untried(&self) -> bool {
        self.ok.is_none()
    }

    /// Records a successful detail extraction
    pub fn mark_enriched(&mut self, detail: Detail) {
        self.detail = Some(detail);
        self.ok = Some(true);
    }

    /// Records a failed detail attempt, blanking any partial detail
    ///
    /// The blank detail is still written so readers can index
    /// `detail.forumMix` on every attempted item.
    pub fn mark_failed(&mut self) {
        self.detail = Some(Detail::default());
        self.ok = Some(false);
    }
}

/// Sorts items newest first; items with equal timestamps keep their order
pub fn sort_newest_first(items: &mut [RecruitmentItem]) {
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
