use crate::error::{ProviderError, Result};
use rabbithole_core::SearchResult;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Environment variable the API key is read from at startup.
pub const API_KEY_ENV: &str = "EXA_API_KEY";

/// Default base URL of the semantic search provider.
pub const DEFAULT_BASE_URL: &str = "https://api.exa.ai/";

/// Fixed result cap for find-similar lookups.
pub const SIMILAR_RESULT_CAP: usize = 3;

/// Fixed excerpt cap (characters) for find-similar lookups.
pub const SIMILAR_TEXT_MAX_CHARS: usize = 1500;

/// Client for the external semantic search provider.
///
/// Constructed explicitly and passed to whoever needs it (request handlers,
/// the TUI); there is no process-global instance. One client per process is
/// enough, the underlying pool is shared on clone.
#[derive(Debug, Clone)]
pub struct ExaClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl ExaClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_timeout(api_key, 10)
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout_secs: u64) -> Self {
        let http = Client::builder()
            .user_agent("Rabbithole/0.1 (https://github.com/bramble-dev/rabbithole)")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs / 2))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            api_key: api_key.into(),
        }
    }

    /// Point the client at a different provider endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Construct from the process environment. A missing or empty key is a
    /// constructor error, not a runtime panic.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(ProviderError::MissingApiKey(API_KEY_ENV)),
        }
    }

    /// Search the provider, requesting full text content alongside the
    /// ranked results. Empty queries are passed through unvalidated; the
    /// provider may itself reject them.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.post(
            "search",
            &SearchRequest {
                query,
                contents: SearchContents { text: true },
            },
        )
        .await
    }

    /// Find content similar to a URL: capped at 3 results and 1500-character
    /// excerpts, highlights enabled, results from the input URL's own domain
    /// excluded.
    pub async fn find_similar(&self, url: &str) -> Result<Vec<SearchResult>> {
        self.post(
            "findSimilar",
            &FindSimilarRequest {
                url,
                num_results: SIMILAR_RESULT_CAP,
                exclude_source_domain: true,
                contents: SimilarContents {
                    text: TextOptions {
                        max_characters: SIMILAR_TEXT_MAX_CHARS,
                    },
                    highlights: true,
                },
            },
        )
        .await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Vec<SearchResult>> {
        let endpoint = self
            .base_url
            .join(path)
            .map_err(|e| ProviderError::InvalidBaseUrl(e.to_string()))?;

        debug!("POST {}", endpoint);
        let response = self
            .http
            .post(endpoint)
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let wire: WireResponse = response.json().await?;
        Ok(wire.results.into_iter().map(WireResult::into_result).collect())
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    contents: SearchContents,
}

#[derive(Serialize)]
struct SearchContents {
    text: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FindSimilarRequest<'a> {
    url: &'a str,
    num_results: usize,
    exclude_source_domain: bool,
    contents: SimilarContents,
}

#[derive(Serialize)]
struct SimilarContents {
    text: TextOptions,
    highlights: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextOptions {
    max_characters: usize,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    results: Vec<WireResult>,
}

/// Provider record shape. Mapping to [`SearchResult`] is field renaming and
/// pass-through only; the id falls back to the URL when absent.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResult {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    url: String,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    favicon: Option<String>,
}

impl WireResult {
    fn into_result(self) -> SearchResult {
        SearchResult {
            id: self.id.unwrap_or_else(|| self.url.clone()),
            title: self.title.unwrap_or_else(|| self.url.clone()),
            url: self.url,
            published_date: self.published_date,
            author: self.author,
            score: self.score.unwrap_or(0.0),
            text: self.text,
            image: self.image,
            favicon: self.favicon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ExaClient {
        ExaClient::new("test-key")
            .with_base_url(Url::parse(&format!("{}/", server.uri())).unwrap())
    }

    #[tokio::test]
    async fn search_sends_query_with_text_contents() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(json!({
                "query": "rust borrow checker",
                "contents": { "text": true }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {
                        "id": "https://example.com/a",
                        "title": "Understanding the borrow checker",
                        "url": "https://example.com/a",
                        "publishedDate": "2024-04-15T00:00:00.000Z",
                        "author": "Jane Developer",
                        "score": 0.95,
                        "text": "The borrow checker enforces..."
                    },
                    {
                        "title": null,
                        "url": "https://example.com/b",
                        "score": 0.87
                    }
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let results = client_for(&mock_server)
            .search("rust borrow checker")
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "https://example.com/a");
        assert_eq!(results[0].author.as_deref(), Some("Jane Developer"));
        assert!((results[0].score - 0.95).abs() < f64::EPSILON);

        // Missing id and title fall back to the URL.
        assert_eq!(results[1].id, "https://example.com/b");
        assert_eq!(results[1].title, "https://example.com/b");
    }

    #[tokio::test]
    async fn find_similar_sends_fixed_caps_and_domain_exclusion() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/findSimilar"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(json!({
                "url": "https://example.com/article",
                "numResults": 3,
                "excludeSourceDomain": true,
                "contents": {
                    "text": { "maxCharacters": 1500 },
                    "highlights": true
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    { "url": "https://other.org/related", "title": "Related", "score": 0.88 }
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let results = client_for(&mock_server)
            .find_similar("https://example.com/article")
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://other.org/related");
    }

    #[tokio::test]
    async fn non_success_status_becomes_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).search("topic").await.unwrap_err();
        match err {
            ProviderError::ApiError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_results_field_maps_to_empty_list() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "requestId": "r1" })))
            .mount(&mock_server)
            .await;

        let results = client_for(&mock_server).search("topic").await.unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn from_env_requires_a_key() {
        unsafe { std::env::remove_var(API_KEY_ENV) };
        assert!(matches!(
            ExaClient::from_env(),
            Err(ProviderError::MissingApiKey(API_KEY_ENV))
        ));
    }
}
