use crate::error::Result;
use crate::fetchers::{ImageSource, SearchPage};
use crate::utils::constants::WEBSEARCH_PAGE_SIZE;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::warn;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Unauthenticated scraped image search.
///
/// Pulls the result page HTML and extracts `src` attributes from `img` tags,
/// discarding inline data URIs and the search host's own assets.
pub struct WebSearchSource {
    client: reqwest::Client,
}

impl WebSearchSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for WebSearchSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for WebSearchSource {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn search_page(&self, district: &str, page: u32) -> Result<SearchPage> {
        let url = format!(
            "https://www.google.com/search?tbm=isch&q=sky+{}&start={}",
            district,
            page.saturating_sub(1) * WEBSEARCH_PAGE_SIZE
        );

        let response = match self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(district, page, error = %e, "search page request failed");
                return Ok(SearchPage::Exhausted);
            }
        };

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Ok(SearchPage::RateLimited);
        }
        if !response.status().is_success() {
            warn!(district, status = %response.status(), "search page error");
            return Ok(SearchPage::Exhausted);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(district, error = %e, "failed to read search page body");
                return Ok(SearchPage::Exhausted);
            }
        };

        let urls = extract_image_urls(&body);
        if urls.is_empty() {
            Ok(SearchPage::Exhausted)
        } else {
            Ok(SearchPage::Items(urls))
        }
    }

    async fn fetch_payload(&self, url: &str) -> Result<Vec<u8>> {
        crate::fetchers::download(&self.client, url).await
    }
}

/// Extract candidate image URLs from result-page HTML.
///
/// Inline data URIs and URLs hosted on the search engine itself are dropped;
/// they are thumbnails or UI chrome, not source images.
fn extract_image_urls(html: &str) -> Vec<String> {
    let mut urls = Vec::new();

    for chunk in html.split("src=\"").skip(1) {
        let Some(end) = chunk.find('"') else { continue };
        let candidate = &chunk[..end];

        if !candidate.starts_with("http") {
            continue;
        }
        if candidate.contains("google.com") || candidate.starts_with("data:") {
            continue;
        }

        urls.push(candidate.to_string());
    }

    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_image_urls() {
        let html = r#"
            <img src="https://example.com/a.jpg">
            <img src="data:image/png;base64,AAAA">
            <img src="https://www.google.com/logo.png">
            <img src="/relative/path.jpg">
            <img src="https://cdn.example.org/b.png" alt="x">
        "#;

        let urls = extract_image_urls(html);
        assert_eq!(
            urls,
            vec![
                "https://example.com/a.jpg".to_string(),
                "https://cdn.example.org/b.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_image_urls_empty_page() {
        assert!(extract_image_urls("<html><body>no images</body></html>").is_empty());
    }
}
