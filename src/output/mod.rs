//! Output module for reporting on the store
//!
//! The browsing UI reads the store file directly; this module only produces
//! the operator-facing summaries printed by the command line.

pub mod stats;

pub use stats::{compute_statistics, format_timestamp, print_statistics, StoreStatistics};
