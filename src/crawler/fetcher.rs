//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with timeouts and compression
//! - Stamping each request with an identity from the rotating pool
//! - Decoding response bytes as GBK, the forum's page encoding
//! - Classifying transport and status failures
//!
//! There is no retry here. The listing phase treats any error as fatal and
//! the detail phase records it on the item.

use crate::config::FetchConfig;
use crate::crawler::identity::IdentityPool;
use crate::ScoutError;
use reqwest::header::{REFERER, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

/// Fetches pages with a rotating identity and legacy decoding
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    identities: IdentityPool,
    referer: Option<String>,
}

impl Fetcher {
    /// Creates a fetcher with a freshly generated identity pool
    pub fn new(config: &FetchConfig) -> Result<Self, ScoutError> {
        let identities = IdentityPool::generate(config.user_agent_pool_size);
        Self::with_identities(config, identities)
    }

    /// Creates a fetcher that draws from the given identity pool
    pub fn with_identities(
        config: &FetchConfig,
        identities: IdentityPool,
    ) -> Result<Self, ScoutError> {
        let client = build_http_client(config)?;
        tracing::debug!("Identity pool ready with {} entries", identities.len());

        Ok(Self {
            client,
            identities,
            referer: config.referer.clone(),
        })
    }

    /// Fetches a page and returns its GBK-decoded text
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | DNS / connect / timeout / body read | `ScoutError::Http` |
    /// | Non-2xx status | `ScoutError::HttpStatus` |
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScoutError> {
        let mut request = self
            .client
            .get(url)
            .header(USER_AGENT, self.identities.pick());

        if let Some(referer) = &self.referer {
            request = request.header(REFERER, referer.as_str());
        }

        let response = request.send().await.map_err(|source| ScoutError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|source| ScoutError::Http {
            url: url.to_string(),
            source,
        })?;

        tracing::trace!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(decode_page(&bytes, url))
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed by reqwest's default policy; the User-Agent is set
/// per request rather than on the client.
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Decodes page bytes as GBK regardless of headers or BOM
///
/// Malformed sequences become U+FFFD; a warning is logged but the page is
/// still returned.
pub fn decode_page(bytes: &[u8], url: &str) -> String {
    let (text, had_errors) = encoding_rs::GBK.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::warn!("Page {} contained bytes that are not valid GBK", url);
    }
    text.into_owned()
}
