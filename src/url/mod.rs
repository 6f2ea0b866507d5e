//! URL handling module for Recruit-Scout
//!
//! Thread links on the listing page are mostly relative. This module turns
//! them into canonical absolute URLs and derives the stable item id from
//! that canonical form.

mod digest;
mod normalize;

// Re-export main functions
pub use digest::item_id;
pub use normalize::resolve_href;
