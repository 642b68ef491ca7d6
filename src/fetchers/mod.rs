pub mod aqicn;
pub mod flickr;
pub mod unsplash;
pub mod websearch;

pub use aqicn::AqicnClient;
pub use flickr::FlickrSource;
pub use unsplash::UnsplashSource;
pub use websearch::WebSearchSource;

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One page of candidate results from an image source.
#[derive(Debug)]
pub enum SearchPage {
    /// Candidate payload URLs returned for this page
    Items(Vec<String>),
    /// The source has no further results for this query
    Exhausted,
    /// The source asked us to back off; the current query ends early
    RateLimited,
}

/// A queryable image source.
///
/// Concrete sources translate (district, page) into candidate payload URLs.
/// Malformed responses, non-200 statuses, and missing JSON keys are treated
/// as zero-result pages, never as errors that abort the enclosing task.
#[async_trait]
pub trait ImageSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search_page(&self, district: &str, page: u32) -> Result<SearchPage>;

    /// Download one candidate payload surfaced by `search_page`.
    async fn fetch_payload(&self, url: &str) -> Result<Vec<u8>>;
}

/// Round-robin rotation over a pool of API credentials.
///
/// Spreads rate-limit exposure across keys; each call hands out the next key
/// in sequence.
pub struct KeyRing {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl KeyRing {
    pub fn new(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(PipelineError::Config(
                "at least one API key is required".to_string(),
            ));
        }
        Ok(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn next_key(&self) -> &str {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        &self.keys[index % self.keys.len()]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Shared payload download used by the concrete sources.
///
/// Failures here are per-item: the caller logs and skips the candidate.
pub(crate) async fn download(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ring_rotates_round_robin() {
        let ring = KeyRing::new(vec!["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(ring.next_key(), "a");
        assert_eq!(ring.next_key(), "b");
        assert_eq!(ring.next_key(), "a");
    }

    #[test]
    fn test_key_ring_rejects_empty_pool() {
        assert!(KeyRing::new(vec![]).is_err());
    }
}
