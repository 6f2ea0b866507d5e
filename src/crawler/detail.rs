//! Detail page extractor
//!
//! A thread page carries a structured attribute table (`div.forum_Mix`) and a
//! free-text body (`div.t_fsz`). Pages with a different layout produce an
//! empty [`Detail`] rather than an error.

use crate::item::{canonical_key, Detail};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Parses a detail page into its attribute table and image-free body
///
/// # Attribute rows
///
/// Only rows with exactly two cells are read. The first cell is the label,
/// with colons (ASCII and full-width) and all whitespace removed; the second
/// is the value, with whitespace runs collapsed. Rows with an empty label or
/// value are skipped. Labels are mapped to canonical keys.
///
/// # Body
///
/// The inner HTML of the first `div.t_fsz`, with every `<img>` removed.
///
/// # Example
///
/// ```
/// use recruit_scout::crawler::extract_detail;
///
/// let detail = extract_detail("<html><body><p>moved</p></body></html>");
/// assert!(detail.forum_mix.is_empty());
/// assert!(detail.content.is_empty());
/// ```
pub fn extract_detail(html: &str) -> Detail {
    let mut document = Html::parse_document(html);

    let forum_mix = extract_forum_mix(&document);
    let content = extract_content(&mut document).unwrap_or_default();

    Detail { forum_mix, content }
}

/// Reads the key/value rows of `div.forum_Mix table.adjust_table`
fn extract_forum_mix(document: &Html) -> BTreeMap<String, String> {
    let mut forum_mix = BTreeMap::new();

    let (Ok(container), Ok(row_selector), Ok(cell_selector)) = (
        Selector::parse("div.forum_Mix"),
        Selector::parse("table.adjust_table tr"),
        Selector::parse("td"),
    ) else {
        return forum_mix;
    };

    for mix in document.select(&container) {
        for row in mix.select(&row_selector) {
            let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();
            if cells.len() != 2 {
                continue;
            }

            let key = clean_label(&cells[0].text().collect::<String>());
            let value = collapse_whitespace(&cells[1].text().collect::<String>());

            if key.is_empty() || value.is_empty() {
                continue;
            }

            forum_mix.insert(canonical_key(&key).to_string(), value);
        }
    }

    forum_mix
}

/// Serializes the first `div.t_fsz` after detaching its images
fn extract_content(document: &mut Html) -> Option<String> {
    let body_selector = Selector::parse("div.t_fsz").ok()?;
    let img_selector = Selector::parse("img").ok()?;

    let (body_id, image_ids) = {
        let body = document.select(&body_selector).next()?;
        let images: Vec<_> = body.select(&img_selector).map(|img| img.id()).collect();
        (body.id(), images)
    };

    for id in image_ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    document
        .tree
        .get(body_id)
        .and_then(ElementRef::wrap)
        .map(|body| body.inner_html())
}

/// Removes colons and every whitespace character from a label cell
fn clean_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ':' && *c != '：' && !c.is_whitespace())
        .collect()
}

/// Replaces runs of two or more whitespace characters with one space, then trims
fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut run = String::new();

    for c in raw.chars() {
        if c.is_whitespace() {
            run.push(c);
            continue;
        }
        flush_run(&mut out, &mut run);
        out.push(c);
    }
    flush_run(&mut out, &mut run);

    out.trim().to_string()
}

fn flush_run(out: &mut String, run: &mut String) {
    if run.chars().count() >= 2 {
        out.push(' ');
    } else {
        out.push_str(run);
    }
    run.clear();
}
