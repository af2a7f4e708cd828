//! Content Source Adapter.
//!
//! Read-only queries against the encyclopedia API, normalized into
//! [`Article`] records. Failures never escape this module: callers only
//! ever observe "no articles produced".

mod wikipedia;

use crate::types::Article;
use async_trait::async_trait;

pub use wikipedia::{ContentError, WikipediaClient, DEFAULT_ENDPOINT, SEARCH_LIMIT};

/// Placeholder used for `summary` when the source has no body text.
pub const NO_SUMMARY: &str = "No summary available.";
/// Placeholder used for `extract` when the source has no body text.
pub const NO_CONTENT: &str = "No content available.";

/// Source of article summaries.
///
/// Both operations swallow transport and decode errors and return an empty
/// list instead. A partial result is returned as-is, never padded.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Up to `count` unrelated random articles.
    async fn fetch_random(&self, count: usize) -> Vec<Article>;

    /// Summaries for the best matches of `query` (at most [`SEARCH_LIMIT`]).
    async fn search(&self, query: &str) -> Vec<Article>;
}
