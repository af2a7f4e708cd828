//! Feed Controller.
//!
//! Owns every piece of feed/session state and decides which network call to
//! make next. Transitions are synchronous: each operation mutates the state
//! in one step and hands back the [`Command`] (if any) the caller should
//! execute. Completed calls are folded back in through the `on_*` methods or
//! [`FeedController::apply`].

pub mod runner;

use crate::api::ApiError;
use crate::types::{Article, User};
use std::collections::HashSet;

pub use crate::content::SEARCH_LIMIT;

/// Articles requested for a fresh feed.
pub const INITIAL_BATCH: usize = 20;
/// Articles appended per load-more.
pub const MORE_BATCH: usize = 10;
/// Remaining distance (in scroll units) below which load-more fires.
pub const PREFETCH_THRESHOLD: u64 = 1500;
/// Scroll units spanned by one card; the viewport is exactly one card.
pub const CARD_EXTENT: u64 = 1000;

pub const NO_ARTICLES: &str = "No articles found.";
pub const SAVED_LOAD_FAILED: &str = "Unable to load saved articles.";
pub const REMOVE_FAILED: &str = "Could not remove saved article.";

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Browse,
    Saved,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Browse => ViewMode::Saved,
            ViewMode::Saved => ViewMode::Browse,
        }
    }
}

/// Snapshot of everything the presentation layer renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    pub view_mode: ViewMode,
    /// Browse feed. May contain the same id more than once.
    pub articles: Vec<Article>,
    /// Saved library, unique by id.
    pub saved_articles: Vec<Article>,
    pub liked_ids: HashSet<String>,
    pub session: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
    pub is_loading_more: bool,
    pub saved_loading: bool,
    pub has_scrolled: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Browse,
            articles: Vec::new(),
            saved_articles: Vec::new(),
            liked_ids: HashSet::new(),
            session: None,
            // The first feed load starts immediately.
            loading: true,
            error: None,
            is_loading_more: false,
            saved_loading: false,
            has_scrolled: false,
        }
    }
}

/// Batch sizes and prefetch distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub initial_batch: usize,
    pub more_batch: usize,
    pub prefetch_threshold: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            initial_batch: INITIAL_BATCH,
            more_batch: MORE_BATCH,
            prefetch_threshold: PREFETCH_THRESHOLD,
        }
    }
}

/// Scroll geometry of the browse feed, in abstract distance units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPosition {
    pub top: u64,
    pub viewport: u64,
    pub content: u64,
}

impl ScrollPosition {
    /// Geometry for a card deck of `cards` articles plus the trailing
    /// "more" page, with card `cursor` filling the viewport.
    pub fn for_card(cursor: usize, cards: usize) -> Self {
        Self {
            top: cursor as u64 * CARD_EXTENT,
            viewport: CARD_EXTENT,
            content: (cards as u64 + 1) * CARD_EXTENT,
        }
    }

    pub fn distance_from_bottom(&self) -> u64 {
        self.content
            .saturating_sub(self.top)
            .saturating_sub(self.viewport)
    }
}

// ============================================================================
// Commands
// ============================================================================

/// A network call requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchRandom { seq: u64, count: usize },
    Search { seq: u64, query: String },
    LoadMore { seq: u64, count: usize },
    FetchLiked,
    RemoveSaved { article: Article },
    Logout,
    CheckSession,
}

impl Command {
    /// Short name used for task labels and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::FetchRandom { .. } => "fetch_random",
            Command::Search { .. } => "search",
            Command::LoadMore { .. } => "load_more",
            Command::FetchLiked => "fetch_liked",
            Command::RemoveSaved { .. } => "remove_saved",
            Command::Logout => "logout",
            Command::CheckSession => "check_session",
        }
    }
}

/// Result of executing a [`Command`].
#[derive(Debug)]
pub enum CommandOutcome {
    FeedLoaded { seq: u64, articles: Vec<Article> },
    MoreLoaded { seq: u64, articles: Vec<Article> },
    LikedLoaded(Result<Vec<Article>, ApiError>),
    SavedRemoved {
        article: Article,
        result: Result<(), ApiError>,
    },
    LoggedOut(Result<(), ApiError>),
    Session(Option<User>),
}

/// What a completed feed request did to the browse list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Superseded by a newer request; ignored.
    Stale,
    /// Source produced nothing; error set, list untouched.
    Empty,
    Replaced,
}

// ============================================================================
// Controller
// ============================================================================

#[derive(Debug, Default)]
pub struct FeedController {
    state: FeedState,
    settings: FeedSettings,
    /// Sequence number of the latest feed request.
    seq: u64,
    /// Sequence number of the request whose results are on screen.
    displayed_seq: u64,
    initialized: bool,
}

impl FeedController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: FeedSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn current_seq(&self) -> u64 {
        self.seq
    }

    pub fn is_liked(&self, article_id: &str) -> bool {
        self.state.liked_ids.contains(article_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.session.is_some()
    }

    /// Startup: session check plus the first feed load.
    pub fn start(&mut self, query: Option<&str>) -> Vec<Command> {
        let mut commands = vec![Command::CheckSession];
        commands.extend(self.initial_load_with(query));
        commands
    }

    /// First random load. Only ever fires once.
    pub fn initial_load(&mut self) -> Option<Command> {
        self.initial_load_with(None)
    }

    /// First load, optionally as a search. Only ever fires once.
    pub fn initial_load_with(&mut self, query: Option<&str>) -> Option<Command> {
        if self.initialized {
            return None;
        }
        self.initialized = true;

        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => Some(self.begin_search(query)),
            None => Some(self.begin_random()),
        }
    }

    /// Replace the feed with search results. Blank queries are ignored.
    pub fn search(&mut self, query: &str) -> Option<Command> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.state.view_mode = ViewMode::Browse;
        Some(self.begin_search(query))
    }

    /// Replace the feed with a fresh random batch.
    pub fn randomize(&mut self) -> Option<Command> {
        self.state.view_mode = ViewMode::Browse;
        Some(self.begin_random())
    }

    fn begin_random(&mut self) -> Command {
        let seq = self.begin_feed_request();
        Command::FetchRandom {
            seq,
            count: self.settings.initial_batch,
        }
    }

    fn begin_search(&mut self, query: &str) -> Command {
        let seq = self.begin_feed_request();
        Command::Search {
            seq,
            query: query.to_string(),
        }
    }

    fn begin_feed_request(&mut self) -> u64 {
        self.seq += 1;
        self.state.loading = true;
        self.state.error = None;
        tracing::debug!(seq = self.seq, "Feed request issued");
        self.seq
    }

    pub fn on_feed_loaded(&mut self, seq: u64, articles: Vec<Article>) -> LoadOutcome {
        if seq != self.seq {
            tracing::debug!(
                expected = self.seq,
                got = seq,
                "Ignoring stale feed result (sequence mismatch)"
            );
            return LoadOutcome::Stale;
        }

        self.state.loading = false;
        if articles.is_empty() {
            self.state.error = Some(NO_ARTICLES.to_string());
            return LoadOutcome::Empty;
        }

        tracing::debug!(seq, count = articles.len(), "Feed replaced");
        self.state.articles = articles;
        self.displayed_seq = seq;
        self.state.has_scrolled = false;
        self.state.error = None;
        LoadOutcome::Replaced
    }

    /// Append another random batch, unless one is already in flight, the
    /// feed is empty or the saved view is showing.
    pub fn load_more(&mut self) -> Option<Command> {
        if self.state.is_loading_more
            || self.state.articles.is_empty()
            || self.state.view_mode != ViewMode::Browse
        {
            return None;
        }
        self.state.is_loading_more = true;
        // Tagged with the feed on screen, not a pending replacement.
        Some(Command::LoadMore {
            seq: self.displayed_seq,
            count: self.settings.more_batch,
        })
    }

    pub fn on_more_loaded(&mut self, seq: u64, articles: Vec<Article>) {
        self.state.is_loading_more = false;
        if seq != self.displayed_seq {
            tracing::debug!(
                expected = self.displayed_seq,
                got = seq,
                "Dropping load-more batch for a replaced feed"
            );
            return;
        }
        self.state.articles.extend(articles);
    }

    /// Scroll observer: may trigger a load-more.
    pub fn on_scroll(&mut self, position: ScrollPosition) -> Option<Command> {
        if self.state.view_mode != ViewMode::Browse {
            return None;
        }
        if !self.state.has_scrolled && position.top > 0 {
            self.state.has_scrolled = true;
        }
        if self.state.has_scrolled
            && position.distance_from_bottom() < self.settings.prefetch_threshold
            && !self.state.is_loading_more
        {
            return self.load_more();
        }
        None
    }

    /// Switch views. Browse state is kept as-is.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.state.view_mode = mode;
    }

    /// Apply a new session lookup result.
    ///
    /// Signing in fetches the liked set; signing out clears it locally.
    pub fn set_session(&mut self, session: Option<User>) -> Option<Command> {
        let was_present = self.state.session.is_some();
        let is_present = session.is_some();
        self.state.session = session;

        match (was_present, is_present) {
            (false, true) => {
                self.state.saved_loading = true;
                Some(Command::FetchLiked)
            }
            (true, false) => {
                self.clear_saved();
                None
            }
            _ => None,
        }
    }

    /// Explicit reload of the saved library.
    pub fn refresh_saved(&mut self) -> Option<Command> {
        self.state.session.as_ref()?;
        self.state.saved_loading = true;
        Some(Command::FetchLiked)
    }

    pub fn on_liked_loaded(&mut self, result: Result<Vec<Article>, ApiError>) {
        self.state.saved_loading = false;
        if self.state.session.is_none() {
            tracing::debug!("Ignoring liked set loaded after sign-out");
            return;
        }

        match result {
            Ok(articles) => {
                let mut seen = HashSet::with_capacity(articles.len());
                let saved: Vec<Article> = articles
                    .into_iter()
                    .filter(|a| seen.insert(a.id.clone()))
                    .collect();
                tracing::debug!(count = saved.len(), "Liked set loaded");
                self.state.liked_ids = seen;
                self.state.saved_articles = saved;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load liked articles");
                self.state.error = Some(SAVED_LOAD_FAILED.to_string());
            }
        }
    }

    /// Local mirror of a like/unlike that already succeeded remotely.
    pub fn like_toggle(&mut self, article_id: &str, liked: bool, article: &Article) {
        if liked {
            self.state.liked_ids.insert(article_id.to_string());
            if !self.state.saved_articles.iter().any(|a| a.id == article_id) {
                self.state.saved_articles.push(article.clone());
            }
        } else {
            self.state.liked_ids.remove(article_id);
            self.state.saved_articles.retain(|a| a.id != article_id);
        }
    }

    pub fn remove_saved(&self, article: &Article) -> Command {
        Command::RemoveSaved {
            article: article.clone(),
        }
    }

    pub fn on_remove_saved(&mut self, article: &Article, result: Result<(), ApiError>) {
        match result {
            Ok(()) => self.like_toggle(&article.id, false, article),
            Err(e) => {
                tracing::warn!(error = %e, article_id = %article.id, "Failed to remove saved article");
                self.state.error = Some(REMOVE_FAILED.to_string());
            }
        }
    }

    pub fn logout(&self) -> Command {
        Command::Logout
    }

    /// Local sign-out, whatever the server said.
    pub fn on_logged_out(&mut self, result: Result<(), ApiError>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "Logout request failed; clearing local session anyway");
        }
        self.state.session = None;
        self.clear_saved();
    }

    pub fn dismiss_error(&mut self) {
        self.state.error = None;
    }

    fn clear_saved(&mut self) {
        self.state.saved_articles.clear();
        self.state.liked_ids.clear();
        self.state.saved_loading = false;
    }

    /// Fold a completed command back in, returning any follow-up.
    pub fn apply(&mut self, outcome: CommandOutcome) -> Option<Command> {
        match outcome {
            CommandOutcome::FeedLoaded { seq, articles } => {
                self.on_feed_loaded(seq, articles);
                None
            }
            CommandOutcome::MoreLoaded { seq, articles } => {
                self.on_more_loaded(seq, articles);
                None
            }
            CommandOutcome::LikedLoaded(result) => {
                self.on_liked_loaded(result);
                None
            }
            CommandOutcome::SavedRemoved { article, result } => {
                self.on_remove_saved(&article, result);
                None
            }
            CommandOutcome::LoggedOut(result) => {
                self.on_logged_out(result);
                None
            }
            CommandOutcome::Session(session) => self.set_session(session),
        }
    }
}
