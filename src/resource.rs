//! Resource retrieval behind a narrow fetch seam.
//!
//! Repository files and URL artifacts are downloaded through the
//! [`ResourceFetcher`] trait so tests can substitute canned bytes for real
//! network access.

use std::io::Read;

use crate::error::KilnError;

pub trait ResourceFetcher: Send + Sync {
    /// Download `url` and return its raw bytes.
    fn download(&self, url: &str) -> Result<Vec<u8>, KilnError>;
}

/// Production fetcher backed by ureq.
pub struct HttpFetcher;

impl ResourceFetcher for HttpFetcher {
    fn download(&self, url: &str) -> Result<Vec<u8>, KilnError> {
        let mut bytes = Vec::new();
        ureq::get(url)
            .call()
            .map_err(|e| KilnError::Http(e.to_string()))?
            .body_mut()
            .as_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| KilnError::Http(e.to_string()))?;
        Ok(bytes)
    }
}
