use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Date-time layouts seen in the listing's date cell
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Outcome of reading a listing row's displayed date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingTimestamp {
    /// The displayed date was understood
    Parsed(i64),
    /// The date was missing or unreadable; the scrape time stands in
    Fallback(i64),
}

impl ListingTimestamp {
    /// Milliseconds since the Unix epoch, whichever way they were obtained
    pub fn millis(&self) -> i64 {
        match self {
            Self::Parsed(ms) | Self::Fallback(ms) => *ms,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parses a displayed listing date into epoch milliseconds
///
/// Dates without an explicit zone are read in `offset`. Anything that does
/// not match a known layout becomes [`ListingTimestamp::Fallback`] carrying
/// `now_ms`, so an unreadable date sorts as the newest item.
pub fn parse_listing_date(raw: &str, offset: FixedOffset, now_ms: i64) -> ListingTimestamp {
    let raw = raw.trim();
    if raw.is_empty() {
        return ListingTimestamp::Fallback(now_ms);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return ListingTimestamp::Parsed(dt.timestamp_millis());
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });

    match naive.and_then(|n| offset.from_local_datetime(&n).single()) {
        Some(dt) => ListingTimestamp::Parsed(dt.timestamp_millis()),
        None => ListingTimestamp::Fallback(now_ms),
    }
}
