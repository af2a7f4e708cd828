//! In-memory adapters shared by unit tests.

use crate::api::{ApiError, Persistence};
use crate::content::ContentSource;
use crate::types::{Article, User, UserStats};
use async_trait::async_trait;
use std::sync::Mutex;

pub fn article(id: &str) -> Article {
    Article {
        id: id.to_string(),
        title: format!("Article {}", id),
        summary: "Summary".to_string(),
        thumbnail: None,
        url: format!("https://en.wikipedia.org/wiki/Article_{}", id),
        extract: "Extract".to_string(),
        viewed_at: None,
    }
}

pub fn user(name: &str) -> User {
    User {
        id: 1,
        email: Some(format!("{}@example.com", name)),
        username: Some(name.to_string()),
        created_at: None,
    }
}

/// Random batches of `count` numbered articles; a search returns one
/// article named after the query.
pub struct FixedContent;

#[async_trait]
impl ContentSource for FixedContent {
    async fn fetch_random(&self, count: usize) -> Vec<Article> {
        (0..count).map(|i| article(&i.to_string())).collect()
    }

    async fn search(&self, query: &str) -> Vec<Article> {
        vec![article(query)]
    }
}

/// Records every call. Mutations fail with HTTP 500 when `fail` is set.
#[derive(Default)]
pub struct RecordingBackend {
    pub fail: bool,
    pub session: Option<User>,
    pub liked: Vec<Article>,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingBackend {
    pub fn signed_in(name: &str) -> Self {
        Self {
            session: Some(user(name)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if self.fail {
            Err(ApiError::HttpStatus(500))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Persistence for RecordingBackend {
    async fn current_session(&self) -> Option<User> {
        self.session.clone()
    }
    async fn like(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("like {}", id))
    }
    async fn unlike(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("unlike {}", id))
    }
    async fn record_view(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("view {}", id))
    }
    async fn save(&self, article: &Article) -> Result<(), ApiError> {
        self.record(format!("save {}", article.id))
    }
    async fn liked(&self) -> Result<Vec<Article>, ApiError> {
        self.record("liked".to_string()).map(|_| self.liked.clone())
    }
    async fn history(&self) -> Result<Vec<Article>, ApiError> {
        self.record("history".to_string()).map(|_| Vec::new())
    }
    async fn stats(&self) -> Result<UserStats, ApiError> {
        Err(ApiError::HttpStatus(404))
    }
    async fn logout(&self) -> Result<(), ApiError> {
        self.record("logout".to_string())
    }
    fn login_url(&self) -> String {
        "http://localhost:5000/api/auth/login".to_string()
    }
}
