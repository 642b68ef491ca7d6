use crate::error::Result;
use crate::fetchers::{ImageSource, KeyRing, SearchPage};
use crate::utils::constants::FLICKR_PAGE_SIZE;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::warn;

/// Flickr tag-search API source.
///
/// Photo URLs are reassembled from the `server`/`id`/`secret` triple in each
/// search result, per the static CDN URL scheme.
pub struct FlickrSource {
    client: reqwest::Client,
    keys: KeyRing,
}

impl FlickrSource {
    pub fn new(keys: Vec<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            keys: KeyRing::new(keys)?,
        })
    }
}

#[async_trait]
impl ImageSource for FlickrSource {
    fn name(&self) -> &'static str {
        "flickr"
    }

    async fn search_page(&self, district: &str, page: u32) -> Result<SearchPage> {
        let url = format!(
            "https://api.flickr.com/services/rest/?method=flickr.photos.search\
             &api_key={}&tags=sky,{}&format=json&nojsoncallback=1&per_page={}&page={}",
            self.keys.next_key(),
            district,
            FLICKR_PAGE_SIZE,
            page
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(district, page, error = %e, "Flickr request failed");
                return Ok(SearchPage::Exhausted);
            }
        };

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Ok(SearchPage::RateLimited);
        }
        if !response.status().is_success() {
            warn!(district, status = %response.status(), "Flickr API error");
            return Ok(SearchPage::Exhausted);
        }

        let data: serde_json::Value = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                warn!(district, error = %e, "malformed Flickr response body");
                return Ok(SearchPage::Exhausted);
            }
        };

        let photos = match data
            .get("photos")
            .and_then(|p| p.get("photo"))
            .and_then(|p| p.as_array())
        {
            Some(photos) => photos,
            None => {
                warn!(district, "Flickr response missing photos array");
                return Ok(SearchPage::Exhausted);
            }
        };

        if photos.is_empty() {
            return Ok(SearchPage::Exhausted);
        }

        let urls = photos
            .iter()
            .filter_map(|photo| {
                let server = photo.get("server")?.as_str()?;
                let id = photo.get("id")?.as_str()?;
                let secret = photo.get("secret")?.as_str()?;
                Some(format!(
                    "https://live.staticflickr.com/{}/{}_{}.jpg",
                    server, id, secret
                ))
            })
            .collect();

        Ok(SearchPage::Items(urls))
    }

    async fn fetch_payload(&self, url: &str) -> Result<Vec<u8>> {
        crate::fetchers::download(&self.client, url).await
    }
}
