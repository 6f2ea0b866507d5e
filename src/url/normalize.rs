use url::Url;

/// Resolves a listing href into the canonical absolute URL of a thread
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty hrefs
/// 2. Skip `javascript:`, `mailto:` and fragment-only links
/// 3. Join against the base origin (absolute hrefs are kept as-is by the join)
/// 4. Reject anything that is not HTTP(S) after resolution
/// 5. Remove the fragment
///
/// # Arguments
///
/// * `href` - The raw `href` attribute value
/// * `base` - The fixed origin relative links are resolved against
///
/// # Returns
///
/// * `Some(String)` - The canonical absolute URL
/// * `None` - The href cannot point at a thread page
///
/// # Examples
///
/// ```
/// use recruit_scout::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://muchong.com").unwrap();
/// let url = resolve_href(" /t-123-1 ", &base).unwrap();
/// assert_eq!(url, "https://muchong.com/t-123-1");
/// ```
pub fn resolve_href(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:") || href.starts_with("mailto:") {
        return None;
    }

    let mut url = base.join(href).ok()?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);
    Some(url.to_string())
}
