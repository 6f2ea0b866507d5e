use crate::item::{sort_newest_first, RecruitmentItem};
use crate::storage::JsonStore;
use crate::ScoutError;
use std::collections::HashSet;

/// Merges freshly scraped items into prior state
///
/// # Merge Rules
///
/// 1. Existing items are kept verbatim, including `detail` and `ok`
/// 2. A new item is added only if its id is not present yet (first write wins)
/// 3. The result is sorted newest first by `timestamp`; ties keep their order
/// 4. Only the first `max_items` survive
///
/// Because of rule 2 a re-scrape never refreshes the title, tag or timestamp
/// of a thread that is already stored.
///
/// # Example
///
/// ```
/// use recruit_scout::{merge_items, RecruitmentItem};
///
/// let existing = vec![RecruitmentItem::new("a", "t", "old", "u", 1)];
/// let new = vec![
///     RecruitmentItem::new("a", "t", "edited", "u", 1),
///     RecruitmentItem::new("b", "t", "fresh", "v", 2),
/// ];
/// let merged = merge_items(existing, new, 1000);
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged[0].id, "b");
/// assert_eq!(merged[1].title, "old");
/// ```
pub fn merge_items(
    existing: Vec<RecruitmentItem>,
    new: Vec<RecruitmentItem>,
    max_items: usize,
) -> Vec<RecruitmentItem> {
    let mut seen: HashSet<String> = HashSet::with_capacity(existing.len() + new.len());
    let mut merged = Vec::with_capacity(existing.len() + new.len());

    for item in existing.into_iter().chain(new) {
        if seen.insert(item.id.clone()) {
            merged.push(item);
        }
    }

    sort_newest_first(&mut merged);
    merged.truncate(max_items);
    merged
}

/// Loads the store, merges `new` into it and writes the result back
///
/// Returns the final persisted item set.
pub fn merge_and_persist(
    store: &JsonStore,
    new: Vec<RecruitmentItem>,
    max_items: usize,
) -> Result<Vec<RecruitmentItem>, ScoutError> {
    let existing = store.load();
    let existing_count = existing.len();
    let new_count = new.len();

    let merged = merge_items(existing, new, max_items);
    store.save(&merged)?;

    tracing::info!(
        "Merged {} scraped items into {} stored; store now holds {}",
        new_count,
        existing_count,
        merged.len()
    );

    Ok(merged)
}
