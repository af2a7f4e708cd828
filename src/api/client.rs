use super::Persistence;
use crate::types::{Article, User, UserStats};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Backend address used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out")]
    Timeout,
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(e)
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct ArticlesEnvelope {
    #[serde(default)]
    articles: Vec<Article>,
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the backend, scoped to one session.
///
/// The session travels as a cookie (kept in the client's cookie store) and,
/// when configured, as a bearer token.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
    token: Option<SecretString>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base,
            token,
        })
    }

    /// `{base}/api/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let response = self.send(self.request(Method::GET, url)).await?;
        let body = response.bytes().await.map_err(ApiError::from_transport)?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post_empty(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::POST, url)).await?;
        Ok(())
    }

    /// Session lookup that keeps the failure reason.
    pub async fn try_current_session(&self) -> Result<Option<User>, ApiError> {
        let url = self.endpoint(&["auth", "me"])?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status().as_u16()));
        }
        let body = response.bytes().await.map_err(ApiError::from_transport)?;
        let envelope: SessionEnvelope = serde_json::from_slice(&body)?;
        Ok(envelope.user)
    }
}

#[async_trait]
impl Persistence for ApiClient {
    async fn current_session(&self) -> Option<User> {
        match self.try_current_session().await {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!(error = %e, "Session lookup failed; treating as anonymous");
                None
            }
        }
    }

    async fn like(&self, article_id: &str) -> Result<(), ApiError> {
        self.post_empty(&["articles", article_id, "like"]).await
    }

    async fn unlike(&self, article_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["articles", article_id, "like"])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn record_view(&self, article_id: &str) -> Result<(), ApiError> {
        self.post_empty(&["articles", article_id, "view"]).await
    }

    async fn save(&self, article: &Article) -> Result<(), ApiError> {
        let url = self.endpoint(&["articles"])?;
        self.send(self.request(Method::POST, url).json(article)).await?;
        tracing::debug!(article_id = %article.id, "Article saved");
        Ok(())
    }

    async fn liked(&self) -> Result<Vec<Article>, ApiError> {
        let envelope: ArticlesEnvelope = self.get_json(&["articles", "liked"]).await?;
        Ok(envelope.articles)
    }

    async fn history(&self) -> Result<Vec<Article>, ApiError> {
        let envelope: ArticlesEnvelope = self.get_json(&["articles", "history"]).await?;
        Ok(envelope.articles)
    }

    async fn stats(&self) -> Result<UserStats, ApiError> {
        self.get_json(&["user", "stats"]).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty(&["auth", "logout"]).await
    }

    fn login_url(&self) -> String {
        self.endpoint(&["auth", "login"])
            .map(String::from)
            .unwrap_or_else(|_| format!("{}/api/auth/login", self.base))
    }
}
