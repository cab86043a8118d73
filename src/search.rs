//! Web Search
//!
//! DuckDuckGo-backed implementation of the `SearchProvider` seam. One
//! query in, at most five `{title, href, body}` results out. No caching,
//! no deduplication, no retry.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Error, Result};
use crate::types::{SearchProvider, SearchResult};

/// Hard cap on results per call, regardless of how many the provider returns.
const MAX_RESULTS: usize = 5;

/// Search client against the DuckDuckGo HTML endpoint (no API key needed).
pub struct DuckDuckGoSearch {
    http: Client,
}

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        let http = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; Rishta/0.1)")
            .build()
            .unwrap_or_default();
        Self { http }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let encoded = urlencoding::encode(query);
        let url = format!("https://html.duckduckgo.com/html/?q={}", encoded);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::SearchProvider(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SearchProvider(format!(
                "provider returned {}",
                status
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::SearchProvider(format!("failed to read response: {}", e)))?;

        Ok(extract_results(&html))
    }
}

/// Extract up to `MAX_RESULTS` results from the DuckDuckGo HTML page,
/// in provider-returned order.
fn extract_results(html: &str) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for chunk in html.split("class=\"result__body\"").skip(1) {
        if results.len() >= MAX_RESULTS {
            break;
        }

        let title = chunk
            .split("class=\"result__a\"")
            .nth(1)
            .and_then(|s| s.split('>').nth(1))
            .and_then(|s| s.split('<').next())
            .unwrap_or("");

        let href = chunk
            .split("class=\"result__a\"")
            .nth(1)
            .and_then(|s| s.split("href=\"").nth(1))
            .and_then(|s| s.split('"').next())
            .unwrap_or("");

        let body = chunk
            .split("class=\"result__snippet\"")
            .nth(1)
            .and_then(|s| s.split('>').nth(1))
            .and_then(|s| s.split('<').next())
            .unwrap_or("");

        if title.is_empty() {
            continue;
        }

        results.push(SearchResult {
            title: html_decode(title),
            href: href.trim().to_string(),
            body: html_decode(body),
        });
    }

    results
}

/// Basic HTML entity decoding for titles and snippets.
fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_block(index: usize, title: &str, href: &str, body: &str) -> String {
        format!(
            "<div class=\"result__body\"><h2><a rel=\"nofollow\" class=\"result__a\" \
             href=\"{href}\">{title}</a></h2>\
             <a class=\"result__snippet\" href=\"{href}\">{body}</a>\
             <span class=\"result__url\"> example{index}.com </span></div>"
        )
    }

    fn page_with(n: usize) -> String {
        let mut html = String::from("<html><body>");
        for i in 0..n {
            html.push_str(&result_block(
                i,
                &format!("Title {}", i),
                &format!("https://example{}.com/profile", i),
                &format!("Snippet body {}", i),
            ));
        }
        html.push_str("</body></html>");
        html
    }

    #[test]
    fn test_extracts_title_href_and_body() {
        let results = extract_results(&page_with(2));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Title 0");
        assert_eq!(results[0].href, "https://example0.com/profile");
        assert_eq!(results[0].body, "Snippet body 0");
    }

    #[test]
    fn test_never_returns_more_than_five_results() {
        let results = extract_results(&page_with(9));
        assert_eq!(results.len(), MAX_RESULTS);
        // Provider order is preserved.
        assert_eq!(results[4].title, "Title 4");
    }

    #[test]
    fn test_empty_page_yields_empty_results() {
        assert!(extract_results("<html><body>nothing here</body></html>").is_empty());
    }

    #[test]
    fn test_entities_are_decoded() {
        let html = result_block(0, "Rishta &amp; Co", "https://x.test", "it&#39;s a match");
        let results = extract_results(&html);
        assert_eq!(results[0].title, "Rishta & Co");
        assert_eq!(results[0].body, "it's a match");
    }
}
