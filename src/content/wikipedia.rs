use super::{ContentSource, NO_CONTENT, NO_SUMMARY};
use crate::types::Article;
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Public MediaWiki query endpoint for English Wikipedia.
pub const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// Maximum number of search hits resolved into summaries.
pub const SEARCH_LIMIT: usize = 10;

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Sentences kept from each introductory extract.
const EXTRACT_SENTENCES: &str = "3";
/// Requested thumbnail edge length in pixels.
const THUMBNAIL_SIZE: &str = "500";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: HashMap<String, RawPage>,
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    /// Absent for missing/invalid pages (keyed "-1" etc.)
    pageid: Option<u64>,
    #[serde(default)]
    title: String,
    extract: Option<String>,
    thumbnail: Option<RawThumbnail>,
    fullurl: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawThumbnail {
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    pageid: u64,
}

// ============================================================================
// Normalization
// ============================================================================

fn into_article(page: RawPage) -> Option<Article> {
    let pageid = page.pageid?;
    let extract = page.extract.filter(|text| !text.is_empty());

    Some(Article {
        id: pageid.to_string(),
        title: page.title,
        summary: extract.clone().unwrap_or_else(|| NO_SUMMARY.to_string()),
        thumbnail: page.thumbnail.and_then(|t| t.source),
        url: page.fullurl.unwrap_or_default(),
        extract: extract.unwrap_or_else(|| NO_CONTENT.to_string()),
        viewed_at: None,
    })
}

/// Flatten the page map into articles ordered by page id.
fn normalize_pages(pages: HashMap<String, RawPage>) -> Vec<Article> {
    let mut pages: Vec<RawPage> = pages.into_values().collect();
    pages.sort_by_key(|page| page.pageid);
    pages.into_iter().filter_map(into_article).collect()
}

// ============================================================================
// Client
// ============================================================================

/// MediaWiki-backed [`ContentSource`].
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: reqwest::Client,
    endpoint: Url,
    /// Bound on each request, body read included.
    timeout: Duration,
}

impl WikipediaClient {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, ContentError> {
        let endpoint = Url::parse(endpoint)?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// Random articles, surfacing failures.
    pub async fn try_fetch_random(&self, count: usize) -> Result<Vec<Article>, ContentError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let limit = count.to_string();
        let url = self.summary_url(&[
            ("generator", "random"),
            ("grnnamespace", "0"),
            ("grnlimit", &limit),
        ]);

        let response = self.get(url).await?;
        let pages = response.query.unwrap_or_default().pages;
        let articles = normalize_pages(pages);
        tracing::debug!(requested = count, received = articles.len(), "Fetched random articles");
        Ok(articles)
    }

    /// Search, then resolve the hits into summaries with one batched request.
    pub async fn try_search(&self, query: &str) -> Result<Vec<Article>, ContentError> {
        let limit = SEARCH_LIMIT.to_string();
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("format", "json")
            .append_pair("list", "search")
            .append_pair("srsearch", query)
            .append_pair("srlimit", &limit)
            .append_pair("origin", "*");

        let hits = self.get(url).await?.query.unwrap_or_default().search;
        if hits.is_empty() {
            tracing::debug!(query = %query, "Search returned no hits");
            return Ok(Vec::new());
        }

        let page_ids = hits
            .iter()
            .take(SEARCH_LIMIT)
            .map(|hit| hit.pageid.to_string())
            .collect::<Vec<_>>()
            .join("|");
        let url = self.summary_url(&[("pageids", &page_ids)]);

        let pages = self.get(url).await?.query.unwrap_or_default().pages;
        let articles = normalize_pages(pages);
        tracing::debug!(query = %query, hits = hits.len(), received = articles.len(), "Search resolved");
        Ok(articles)
    }

    /// Build a query URL requesting extracts, thumbnails and canonical URLs.
    fn summary_url(&self, selector: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("action", "query")
                .append_pair("format", "json");
            for (key, value) in selector {
                pairs.append_pair(key, value);
            }
            pairs
                .append_pair("prop", "extracts|pageimages|info")
                .append_pair("exintro", "1")
                .append_pair("explaintext", "1")
                .append_pair("exsentences", EXTRACT_SENTENCES)
                .append_pair("piprop", "thumbnail")
                .append_pair("pithumbsize", THUMBNAIL_SIZE)
                .append_pair("inprop", "url")
                .append_pair("origin", "*");
        }
        url
    }

    async fn get(&self, url: Url) -> Result<QueryResponse, ContentError> {
        let fetch = async {
            let response = self.client.get(url).send().await.map_err(ContentError::Network)?;
            if !response.status().is_success() {
                return Err(ContentError::HttpStatus(response.status().as_u16()));
            }
            read_limited_bytes(response, MAX_RESPONSE_SIZE).await
        };

        let body = tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| ContentError::Timeout(self.timeout))?
            .map_err(|e| match e {
                ContentError::Network(e) if e.is_timeout() => ContentError::Timeout(self.timeout),
                other => other,
            })?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ContentSource for WikipediaClient {
    async fn fetch_random(&self, count: usize) -> Vec<Article> {
        self.try_fetch_random(count).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, count, "Error fetching random articles");
            Vec::new()
        })
    }

    async fn search(&self, query: &str) -> Vec<Article> {
        self.try_search(query).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, query = %query, "Error searching articles");
            Vec::new()
        })
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ContentError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ContentError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ContentError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> WikipediaClient {
        WikipediaClient::new(
            reqwest::Client::new(),
            &format!("{}/w/api.php", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn page(id: u64, title: &str, extract: Option<&str>, thumb: Option<&str>) -> serde_json::Value {
        let mut page = json!({
            "pageid": id,
            "ns": 0,
            "title": title,
            "fullurl": format!("https://en.wikipedia.org/wiki/{}", title),
        });
        if let Some(text) = extract {
            page["extract"] = json!(text);
        }
        if let Some(src) = thumb {
            page["thumbnail"] = json!({ "source": src, "width": 500, "height": 300 });
        }
        page
    }

    fn pages_body(pages: Vec<serde_json::Value>) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = pages
            .into_iter()
            .map(|p| (p["pageid"].to_string(), p))
            .collect();
        json!({ "batchcomplete": "", "query": { "pages": map } })
    }

    #[tokio::test]
    async fn test_random_sends_generator_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("generator", "random"))
            .and(query_param("grnlimit", "20"))
            .and(query_param("grnnamespace", "0"))
            .and(query_param("exsentences", "3"))
            .and(query_param("pithumbsize", "500"))
            .and(query_param("inprop", "url"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pages_body(vec![page(
                1,
                "Alpha",
                Some("Alpha is first."),
                None,
            )])))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client_for(&server).await.fetch_random(20).await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "1");
        assert_eq!(articles[0].title, "Alpha");
    }

    #[tokio::test]
    async fn test_normalization_placeholders_differ() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(pages_body(vec![page(7, "Bare", None, None)])),
            )
            .mount(&server)
            .await;

        let articles = client_for(&server).await.fetch_random(1).await;
        assert_eq!(articles[0].summary, NO_SUMMARY);
        assert_eq!(articles[0].extract, NO_CONTENT);
        assert_ne!(articles[0].summary, articles[0].extract);
    }

    #[tokio::test]
    async fn test_partial_result_not_padded_and_thumbnail_optional() {
        let server = MockServer::start().await;
        let mut pages = Vec::new();
        for id in 1..=18u64 {
            let thumb = if id == 5 { None } else { Some("https://upload.example/t.jpg") };
            pages.push(page(id, &format!("Page{}", id), Some("Text."), thumb));
        }
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pages_body(pages)))
            .mount(&server)
            .await;

        let articles = client_for(&server).await.fetch_random(20).await;
        assert_eq!(articles.len(), 18);
        let missing = articles.iter().find(|a| a.id == "5").unwrap();
        assert_eq!(missing.thumbnail, None);
        let present = articles.iter().find(|a| a.id == "6").unwrap();
        assert_eq!(present.thumbnail.as_deref(), Some("https://upload.example/t.jpg"));
    }

    #[tokio::test]
    async fn test_pages_ordered_by_numeric_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pages_body(vec![
                page(100, "Hundred", Some("x"), None),
                page(9, "Nine", Some("x"), None),
                page(42, "FortyTwo", Some("x"), None),
            ])))
            .mount(&server)
            .await;

        let ids: Vec<String> = client_for(&server)
            .await
            .fetch_random(3)
            .await
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["9", "42", "100"]);
    }

    #[tokio::test]
    async fn test_empty_extract_uses_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(pages_body(vec![page(3, "Empty", Some(""), None)])),
            )
            .mount(&server)
            .await;

        let articles = client_for(&server).await.fetch_random(1).await;
        assert_eq!(articles[0].summary, NO_SUMMARY);
    }

    #[tokio::test]
    async fn test_http_error_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.fetch_random(20).await.is_empty());
        assert!(matches!(
            client.try_fetch_random(20).await,
            Err(ContentError::HttpStatus(503))
        ));
    }

    #[tokio::test]
    async fn test_malformed_json_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.fetch_random(5).await.is_empty());
        assert!(matches!(
            client.try_fetch_random(5).await,
            Err(ContentError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_query_key_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "batchcomplete": "" })))
            .mount(&server)
            .await;

        let articles = client_for(&server).await.try_fetch_random(5).await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_search_resolves_hits_in_one_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .and(query_param("srsearch", "rust lang"))
            .and(query_param("srlimit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "search": [
                    { "ns": 0, "title": "Rust", "pageid": 11 },
                    { "ns": 0, "title": "Rust (programming language)", "pageid": 22 }
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("pageids", "11|22"))
            .and(query_param_is_missing("list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pages_body(vec![
                page(11, "Rust", Some("Iron oxide."), None),
                page(22, "Rust_(programming_language)", Some("A language."), Some("https://upload.example/r.png")),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client_for(&server).await.search("rust lang").await;
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].thumbnail.as_deref(), Some("https://upload.example/r.png"));
    }

    #[tokio::test]
    async fn test_search_without_hits_skips_second_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "query": { "search": [] } })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param_is_missing("list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pages_body(vec![])))
            .expect(0)
            .mount(&server)
            .await;

        assert!(client_for(&server).await.search("zzzzqx").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_on_detail_request_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "search": [{ "pageid": 1 }] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("pageids", "1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(client_for(&server).await.search("anything").await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_page_entries_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": { "pages": {
                    "-1": { "ns": 0, "title": "Nope", "missing": "" },
                    "8": { "pageid": 8, "title": "Eight", "extract": "Eight.", "fullurl": "https://e/8" }
                }}
            })))
            .mount(&server)
            .await;

        let articles = client_for(&server).await.fetch_random(2).await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "8");
    }

    #[tokio::test]
    async fn test_zero_count_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert!(client_for(&server).await.fetch_random(0).await.is_empty());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result =
            WikipediaClient::new(reqwest::Client::new(), "not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(ContentError::InvalidEndpoint(_))));
    }

    #[tokio::test]
    async fn test_configured_timeout_applies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "query": { "pages": {} } }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let timeout = Duration::from_millis(200);
        let client = WikipediaClient::new(
            reqwest::Client::new(),
            &format!("{}/w/api.php", server.uri()),
            timeout,
        )
        .unwrap();

        let err = client.try_fetch_random(3).await.unwrap_err();
        assert!(matches!(err, ContentError::Timeout(d) if d == timeout));
        assert!(client.fetch_random(3).await.is_empty());
    }

    #[test]
    fn test_timeout_message_reports_configured_value() {
        let err = ContentError::Timeout(Duration::from_secs(45));
        assert_eq!(err.to_string(), "Request timed out after 45s");
    }
}
