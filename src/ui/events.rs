//! Background task event processing.
//!
//! Folds `AppEvent`s from spawned tasks back into application state and
//! spawns any follow-up command the controller asks for.

use crate::app::{App, AppEvent};
use tokio::sync::mpsc;

use super::helpers::spawn_command;

pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::Command(outcome) => {
            if let Some(follow_up) = app.apply_outcome(outcome) {
                spawn_command(app, follow_up, event_tx);
            }
        }
        AppEvent::SaveToggled {
            article,
            liked,
            result,
        } => {
            app.finish_working(&article.id);
            match result {
                Ok(()) => {
                    app.controller.like_toggle(&article.id, liked, &article);
                    app.clamp_cursors();
                    app.set_status(if liked { "Saved" } else { "Removed from saved" });
                }
                Err(e) => {
                    tracing::warn!(article_id = %article.id, liked, error = %e, "Error toggling like");
                    app.set_status(format!("Could not update saved state: {}", e));
                }
            }
        }
        AppEvent::ReadFinished { article_id, result } => match result {
            Ok(()) => tracing::debug!(article_id = %article_id, "Opened article"),
            Err(e) => {
                tracing::warn!(article_id = %article_id, error = %e, "Error recording view");
                app.set_status(format!("Could not open article: {}", e));
            }
        },
        AppEvent::LoginOpened(result) => match result {
            Ok(()) => app.set_status("Finish signing in, then press u to refresh"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open sign-in page");
                app.set_status(format!(
                    "Could not open browser. Sign in at {}",
                    app.persistence.login_url()
                ));
            }
        },
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Task panicked");
            app.set_status(format!("Internal error in {}: {}", task, error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{CommandOutcome, FeedSettings};
    use crate::testing::{article, user, FixedContent, RecordingBackend};
    use std::sync::Arc;

    fn test_app() -> App {
        App::new(
            Arc::new(FixedContent),
            Arc::new(RecordingBackend::default()),
            FeedSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_save_success_updates_liked_set() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(8);
        app.begin_working("1");

        handle_app_event(
            &mut app,
            AppEvent::SaveToggled {
                article: article("1"),
                liked: true,
                result: Ok(()),
            },
            &tx,
        );

        assert!(app.controller.is_liked("1"));
        assert_eq!(app.state().saved_articles.len(), 1);
        assert!(!app.is_working("1"));
    }

    #[tokio::test]
    async fn test_save_failure_leaves_controller_untouched() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(8);
        app.begin_working("1");

        handle_app_event(
            &mut app,
            AppEvent::SaveToggled {
                article: article("1"),
                liked: true,
                result: Err("HTTP 500".to_string()),
            },
            &tx,
        );

        assert!(!app.controller.is_liked("1"));
        assert!(app.state().error.is_none());
        assert!(!app.is_working("1"));
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_sign_in_spawns_liked_fetch() {
        let mut app = test_app();
        let (tx, mut rx) = mpsc::channel(8);

        handle_app_event(
            &mut app,
            AppEvent::Command(CommandOutcome::Session(Some(user("reader")))),
            &tx,
        );

        assert!(app.state().saved_loading);
        match rx.recv().await {
            Some(AppEvent::Command(CommandOutcome::LikedLoaded(Ok(articles)))) => {
                assert!(articles.is_empty())
            }
            other => panic!("expected liked set, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panic_reported_in_status() {
        let mut app = test_app();
        let (tx, _rx) = mpsc::channel(8);
        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: "search",
                error: "boom".to_string(),
            },
            &tx,
        );
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Internal error in search: boom");
    }
}
