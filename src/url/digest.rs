use md5::{Digest, Md5};

/// Derives the stable item id from a canonical thread URL
///
/// The id is the lowercase hex MD5 of the URL bytes, the key existing stores
/// are already indexed by. It survives title edits and re-scrapes as long as
/// the thread URL does not change.
pub fn item_id(canonical_url: &str) -> String {
    hex::encode(Md5::digest(canonical_url.as_bytes()))
}
