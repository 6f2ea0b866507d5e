//! Rotating client identity pool
//!
//! The forum throttles repeated requests from one client fingerprint, so each
//! request carries a User-Agent drawn at random from a pool generated once
//! per process. The pool is never persisted.

use rand::seq::IndexedRandom;

/// Identity used when a pool is built empty
const FALLBACK_IDENTITY: &str = concat!("recruit-scout/", env!("CARGO_PKG_VERSION"));

/// A fixed set of User-Agent strings rotated per request
#[derive(Debug, Clone)]
pub struct IdentityPool {
    identities: Vec<String>,
}

impl IdentityPool {
    /// Generates `size` desktop Chrome identities
    pub fn generate(size: usize) -> Self {
        let identities = (0..size)
            .map(|_| ua_generator::ua::spoof_chrome_ua().to_string())
            .collect();
        Self { identities }
    }

    /// Builds a pool from explicit identity strings
    pub fn from_identities(identities: Vec<String>) -> Self {
        Self { identities }
    }

    /// Picks one identity pseudo-randomly
    pub fn pick(&self) -> &str {
        self.identities
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or(FALLBACK_IDENTITY)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
