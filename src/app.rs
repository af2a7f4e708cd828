use crate::api::Persistence;
use crate::content::ContentSource;
use crate::controller::{
    Command, CommandOutcome, FeedController, FeedSettings, FeedState, LoadOutcome,
    ScrollPosition, ViewMode,
};
use crate::keybindings::{Context as KbContext, KeybindingRegistry};
use crate::theme::{StyleMap, ThemeVariant};
use crate::types::Article;
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use ratatui::style::Style;
use reqwest::redirect::Policy;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How long a status message stays on screen.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Redirect policy: at most 3 hops, no loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

/// Shared client for the content source.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .user_agent(concat!("wikifeed/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(timeout)
        .build()
}

// ============================================================================
// Events
// ============================================================================

/// Messages from background tasks to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// A controller command finished.
    Command(CommandOutcome),
    /// A card save/unsave press finished. `liked` is the requested state.
    SaveToggled {
        article: Article,
        liked: bool,
        result: Result<(), String>,
    },
    /// A read/open press finished (view recorded, browser launched).
    ReadFinished {
        article_id: String,
        result: Result<(), String>,
    },
    /// The sign-in page was handed to the browser.
    LoginOpened(Result<(), String>),
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state.
pub struct App {
    pub controller: FeedController,
    pub content: Arc<dyn ContentSource>,
    pub persistence: Arc<dyn Persistence>,

    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,
    pub keybindings: KeybindingRegistry,

    /// Browse card under view. `articles.len()` is the trailing "more" page.
    pub card_cursor: usize,
    pub saved_cursor: usize,

    pub search_mode: bool,
    pub search_input: String,

    /// Article ids with a save/unsave press in flight.
    pub working: HashSet<String>,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,

    pub show_help: bool,
    pub help_scroll_offset: usize,
}

impl App {
    pub fn new(
        content: Arc<dyn ContentSource>,
        persistence: Arc<dyn Persistence>,
        settings: FeedSettings,
    ) -> Self {
        Self {
            controller: FeedController::with_settings(settings),
            content,
            persistence,
            theme_variant: ThemeVariant::Dark,
            theme: StyleMap::from_palette(&ThemeVariant::Dark.palette()),
            keybindings: KeybindingRegistry::new(),
            card_cursor: 0,
            saved_cursor: 0,
            search_mode: false,
            search_input: String::new(),
            working: HashSet::new(),
            status_message: None,
            needs_redraw: true,
            show_help: false,
            help_scroll_offset: 0,
        }
    }

    pub fn state(&self) -> &FeedState {
        self.controller.state()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state().view_mode
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Switch to the other theme, returning its name.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    /// Keybinding context for the current mode.
    pub fn key_context(&self) -> KbContext {
        if self.search_mode {
            return KbContext::Search;
        }
        match self.view_mode() {
            ViewMode::Browse => KbContext::Browse,
            ViewMode::Saved => KbContext::Saved,
        }
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// The card under view, or `None` on the trailing page.
    pub fn current_article(&self) -> Option<&Article> {
        self.state().articles.get(self.card_cursor)
    }

    pub fn selected_saved(&self) -> Option<&Article> {
        self.state().saved_articles.get(self.saved_cursor)
    }

    /// Whether the trailing "more" page is under view.
    pub fn on_trailing_page(&self) -> bool {
        !self.state().articles.is_empty() && self.card_cursor >= self.state().articles.len()
    }

    pub fn scroll_position(&self) -> ScrollPosition {
        ScrollPosition::for_card(self.card_cursor, self.state().articles.len())
    }

    pub fn nav_down(&mut self) {
        match self.view_mode() {
            ViewMode::Browse => {
                let len = self.state().articles.len();
                if len > 0 {
                    self.card_cursor = self.card_cursor.saturating_add(1).min(len);
                }
            }
            ViewMode::Saved => {
                let len = self.state().saved_articles.len();
                if len > 0 {
                    self.saved_cursor = self.saved_cursor.saturating_add(1).min(len - 1);
                }
            }
        }
    }

    pub fn nav_up(&mut self) {
        match self.view_mode() {
            ViewMode::Browse => self.card_cursor = self.card_cursor.saturating_sub(1),
            ViewMode::Saved => self.saved_cursor = self.saved_cursor.saturating_sub(1),
        }
    }

    pub fn nav_first(&mut self) {
        match self.view_mode() {
            ViewMode::Browse => self.card_cursor = 0,
            ViewMode::Saved => self.saved_cursor = 0,
        }
    }

    /// Keep cursors inside their lists after the lists change.
    pub fn clamp_cursors(&mut self) {
        let cards = self.state().articles.len();
        self.card_cursor = self.card_cursor.min(cards);
        let saved = self.state().saved_articles.len();
        self.saved_cursor = self.saved_cursor.min(saved.saturating_sub(1));
    }

    /// Report the current card position to the controller.
    pub fn observe_scroll(&mut self) -> Option<Command> {
        let position = self.scroll_position();
        self.controller.on_scroll(position)
    }

    // ------------------------------------------------------------------------
    // Outcomes
    // ------------------------------------------------------------------------

    /// Fold a finished command into the controller, returning any follow-up.
    pub fn apply_outcome(&mut self, outcome: CommandOutcome) -> Option<Command> {
        let follow_up = match outcome {
            CommandOutcome::FeedLoaded { seq, articles } => {
                if self.controller.on_feed_loaded(seq, articles) == LoadOutcome::Replaced {
                    self.card_cursor = 0;
                }
                None
            }
            other => self.controller.apply(other),
        };
        self.clamp_cursors();
        self.needs_redraw = true;
        follow_up
    }

    /// Mark an article as having a save/unsave in flight.
    /// Returns `false` when one is already running for it.
    pub fn begin_working(&mut self, article_id: &str) -> bool {
        self.working.insert(article_id.to_string())
    }

    pub fn finish_working(&mut self, article_id: &str) {
        self.working.remove(article_id);
    }

    pub fn is_working(&self, article_id: &str) -> bool {
        self.working.contains(article_id)
    }

    // ------------------------------------------------------------------------
    // Search box
    // ------------------------------------------------------------------------

    pub fn enter_search(&mut self) {
        self.search_mode = true;
        self.search_input.clear();
    }

    pub fn exit_search(&mut self) {
        self.search_mode = false;
        self.search_input.clear();
    }

    /// Append a typed character, up to the length cap.
    pub fn push_search_char(&mut self, c: char) {
        if self.search_input.chars().count() < MAX_SEARCH_QUERY_LENGTH && !c.is_control() {
            self.search_input.push(c);
        }
    }

    pub fn pop_search_char(&mut self) {
        self.search_input.pop();
    }

    /// Submit the search box. Blank input keeps the box open and sends nothing.
    pub fn commit_search(&mut self) -> Option<Command> {
        let command = self.controller.search(&self.search_input)?;
        self.exit_search();
        Some(command)
    }

    // ------------------------------------------------------------------------
    // Status bar
    // ------------------------------------------------------------------------

    /// Set status message (auto-expires after 3 seconds).
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear the status message once expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{article, user, FixedContent, RecordingBackend};
    use pretty_assertions::assert_eq;
    use tokio::time;

    fn test_app() -> App {
        App::new(
            Arc::new(FixedContent),
            Arc::new(RecordingBackend::default()),
            FeedSettings::default(),
        )
    }

    fn loaded_app(ids: &[&str]) -> App {
        let mut app = test_app();
        let Some(Command::FetchRandom { seq, .. }) = app.controller.initial_load() else {
            panic!("expected an initial random load");
        };
        app.apply_outcome(CommandOutcome::FeedLoaded {
            seq,
            articles: ids.iter().map(|id| article(id)).collect(),
        });
        app
    }

    #[test]
    fn test_nav_empty_feed() {
        let mut app = test_app();
        app.nav_down();
        assert_eq!(app.card_cursor, 0);
        assert!(app.current_article().is_none());
        assert!(!app.on_trailing_page());
    }

    #[test]
    fn test_nav_reaches_trailing_page() {
        let mut app = loaded_app(&["1", "2"]);
        app.nav_down();
        assert_eq!(app.current_article().map(|a| a.id.as_str()), Some("2"));
        app.nav_down();
        assert!(app.on_trailing_page());
        app.nav_down();
        assert_eq!(app.card_cursor, 2);
        app.nav_first();
        assert_eq!(app.card_cursor, 0);
    }

    #[test]
    fn test_scroll_position_tracks_cursor() {
        let mut app = loaded_app(&["1", "2", "3"]);
        app.nav_down();
        assert_eq!(
            app.scroll_position(),
            ScrollPosition {
                top: 1000,
                viewport: 1000,
                content: 4000,
            }
        );
    }

    #[test]
    fn test_swiping_near_the_end_triggers_load_more() {
        let mut app = loaded_app(&["1", "2"]);
        // Distance 2000: not yet.
        assert_eq!(app.observe_scroll(), None);
        app.nav_down();
        // Distance 1000 after scrolling once.
        assert!(matches!(
            app.observe_scroll(),
            Some(Command::LoadMore { count: 10, .. })
        ));
        assert_eq!(app.observe_scroll(), None);
    }

    #[test]
    fn test_replaced_feed_resets_cursor() {
        let mut app = loaded_app(&["1", "2", "3"]);
        app.nav_down();
        app.nav_down();
        let Some(Command::FetchRandom { seq, .. }) = app.controller.randomize() else {
            panic!("expected a random load");
        };
        app.apply_outcome(CommandOutcome::FeedLoaded {
            seq,
            articles: vec![article("9")],
        });
        assert_eq!(app.card_cursor, 0);
        assert_eq!(app.current_article().map(|a| a.id.as_str()), Some("9"));
    }

    #[test]
    fn test_empty_result_keeps_cursor() {
        let mut app = loaded_app(&["1", "2"]);
        app.nav_down();
        let Some(Command::FetchRandom { seq, .. }) = app.controller.randomize() else {
            panic!("expected a random load");
        };
        app.apply_outcome(CommandOutcome::FeedLoaded {
            seq,
            articles: Vec::new(),
        });
        assert_eq!(app.card_cursor, 1);
        assert_eq!(app.state().error.as_deref(), Some("No articles found."));
    }

    #[test]
    fn test_saved_cursor_clamped_after_removal() {
        let mut app = test_app();
        app.controller.set_session(Some(user("reader")));
        app.apply_outcome(CommandOutcome::LikedLoaded(Ok(vec![
            article("1"),
            article("2"),
        ])));
        app.controller.set_view_mode(ViewMode::Saved);
        app.nav_down();
        app.nav_down();
        assert_eq!(app.saved_cursor, 1);

        app.apply_outcome(CommandOutcome::SavedRemoved {
            article: article("2"),
            result: Ok(()),
        });
        assert_eq!(app.saved_cursor, 0);
        assert_eq!(app.selected_saved().map(|a| a.id.as_str()), Some("1"));
    }

    #[test]
    fn test_blank_search_keeps_box_open() {
        let mut app = loaded_app(&["1"]);
        app.enter_search();
        app.push_search_char(' ');
        assert_eq!(app.commit_search(), None);
        assert!(app.search_mode);

        app.pop_search_char();
        for c in "rust".chars() {
            app.push_search_char(c);
        }
        assert!(matches!(
            app.commit_search(),
            Some(Command::Search { ref query, .. }) if query == "rust"
        ));
        assert!(!app.search_mode);
        assert!(app.search_input.is_empty());
    }

    #[test]
    fn test_search_input_capped() {
        let mut app = test_app();
        app.enter_search();
        for _ in 0..MAX_SEARCH_QUERY_LENGTH + 10 {
            app.push_search_char('x');
        }
        app.push_search_char('\n');
        assert_eq!(app.search_input.len(), MAX_SEARCH_QUERY_LENGTH);
    }

    #[test]
    fn test_key_context() {
        let mut app = test_app();
        assert_eq!(app.key_context(), KbContext::Browse);
        app.controller.set_view_mode(ViewMode::Saved);
        assert_eq!(app.key_context(), KbContext::Saved);
        app.enter_search();
        assert_eq!(app.key_context(), KbContext::Search);
    }

    #[test]
    fn test_working_set_rejects_double_press() {
        let mut app = test_app();
        assert!(app.begin_working("1"));
        assert!(!app.begin_working("1"));
        assert!(app.is_working("1"));
        app.finish_working("1");
        assert!(!app.is_working("1"));
    }

    #[test]
    fn test_cycle_theme() {
        let mut app = test_app();
        assert_eq!(app.cycle_theme(), "Light");
        assert_eq!(app.theme_variant, ThemeVariant::Light);
        assert_eq!(app.cycle_theme(), "Dark");
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Saved");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_status_not_expired_before_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Test");

        time::advance(Duration::from_millis(2999)).await;
        app.clear_expired_status();
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
    }
}
