use crate::error::Result;
use crate::fetchers::{ImageSource, KeyRing, SearchPage};
use crate::utils::constants::UNSPLASH_PAGE_SIZE;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::warn;

/// Unsplash keyed search API source.
pub struct UnsplashSource {
    client: reqwest::Client,
    keys: KeyRing,
}

impl UnsplashSource {
    pub fn new(keys: Vec<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            keys: KeyRing::new(keys)?,
        })
    }
}

#[async_trait]
impl ImageSource for UnsplashSource {
    fn name(&self) -> &'static str {
        "unsplash"
    }

    async fn search_page(&self, district: &str, page: u32) -> Result<SearchPage> {
        let url = format!(
            "https://api.unsplash.com/search/photos?query=sky,{}&per_page={}&page={}",
            district, UNSPLASH_PAGE_SIZE, page
        );

        let response = match self
            .client
            .get(&url)
            .header(
                "Authorization",
                format!("Client-ID {}", self.keys.next_key()),
            )
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(district, page, error = %e, "Unsplash request failed");
                return Ok(SearchPage::Exhausted);
            }
        };

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Ok(SearchPage::RateLimited);
        }
        if !response.status().is_success() {
            warn!(district, status = %response.status(), "Unsplash API error");
            return Ok(SearchPage::Exhausted);
        }

        let data: serde_json::Value = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                warn!(district, error = %e, "malformed Unsplash response body");
                return Ok(SearchPage::Exhausted);
            }
        };

        let results = match data.get("results").and_then(|r| r.as_array()) {
            Some(results) => results,
            None => {
                warn!(district, "Unsplash response missing results array");
                return Ok(SearchPage::Exhausted);
            }
        };

        if results.is_empty() {
            return Ok(SearchPage::Exhausted);
        }

        let urls = results
            .iter()
            .filter_map(|result| {
                result
                    .get("urls")
                    .and_then(|u| u.get("regular"))
                    .and_then(|u| u.as_str())
                    .map(str::to_string)
            })
            .collect();

        Ok(SearchPage::Items(urls))
    }

    async fn fetch_payload(&self, url: &str) -> Result<Vec<u8>> {
        crate::fetchers::download(&self.client, url).await
    }
}
