//! Persistence Adapter for the `/api` backend.
//!
//! Unlike the content source, failures here propagate to the caller, which
//! decides whether to surface them. The one exception is the session lookup,
//! where any failure simply means "anonymous".

mod client;

use crate::types::{Article, User, UserStats};
use async_trait::async_trait;

pub use client::{ApiClient, ApiError, DEFAULT_API_URL};

#[async_trait]
pub trait Persistence: Send + Sync {
    /// The signed-in user, or `None` when anonymous or on any error.
    async fn current_session(&self) -> Option<User>;

    async fn like(&self, article_id: &str) -> Result<(), ApiError>;
    async fn unlike(&self, article_id: &str) -> Result<(), ApiError>;
    async fn record_view(&self, article_id: &str) -> Result<(), ApiError>;

    /// Upsert the full article so later like/view calls can reference it.
    async fn save(&self, article: &Article) -> Result<(), ApiError>;

    /// The user's complete liked set.
    async fn liked(&self) -> Result<Vec<Article>, ApiError>;

    /// Viewed articles, most recent first, each carrying `viewed_at`.
    async fn history(&self) -> Result<Vec<Article>, ApiError>;

    async fn stats(&self) -> Result<UserStats, ApiError>;

    /// Invalidate the session server-side.
    async fn logout(&self) -> Result<(), ApiError>;

    /// Where the external sign-in handoff starts.
    fn login_url(&self) -> String;
}
