//! Storage module for persisting recruitment items
//!
//! The store is a single pretty-printed JSON array that the browsing UI
//! imports directly. This module handles:
//! - Lenient loading (a missing or corrupt file reads as empty)
//! - Atomic rewrites through a sibling temp file
//! - Merging newly scraped items into prior state by id

mod json_store;
mod merge;

pub use json_store::JsonStore;
pub use merge::{merge_and_persist, merge_items};

/// Default number of items the store retains
pub const DEFAULT_MAX_ITEMS: usize = 1000;
