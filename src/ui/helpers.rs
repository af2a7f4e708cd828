//! Background task spawning for the UI layer.
//!
//! Every network call runs in its own `tokio::spawn`ed task and reports back
//! over the `AppEvent` channel. Panics inside a task are caught and reported
//! as `AppEvent::TaskPanicked` instead of silently killing the task.

use crate::api::Persistence;
use crate::app::{App, AppEvent};
use crate::controller::{runner, Command};
use crate::types::Article;
use crate::util::open_in_browser;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else if let Some(e) = panic.downcast_ref::<Box<dyn std::error::Error + Send>>() {
                e.to_string()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent, name: &'static str) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, event = name, "Channel send failed (receiver dropped)");
    }
}

/// Spawn `work` under a panic catcher. Its event, if any, is sent on
/// completion; a panic is reported as `TaskPanicked { task }`.
fn spawn_task<F>(task: &'static str, tx: &mpsc::Sender<AppEvent>, work: F)
where
    F: Future<Output = Option<AppEvent>> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        match catch_task_panic(work).await {
            Ok(Some(event)) => send_event(&tx, event, task).await,
            Ok(None) => {}
            Err(panic_msg) => {
                tracing::error!(task, error = %panic_msg, "Background task panicked");
                send_event(
                    &tx,
                    AppEvent::TaskPanicked {
                        task,
                        error: panic_msg,
                    },
                    "TaskPanicked",
                )
                .await;
            }
        }
    });
}

/// Run a controller command in the background.
pub(super) fn spawn_command(app: &App, command: Command, tx: &mpsc::Sender<AppEvent>) {
    let task = command.name();
    let content = Arc::clone(&app.content);
    let persistence = Arc::clone(&app.persistence);
    tracing::debug!(task, "Spawning command");

    spawn_task(task, tx, async move {
        let outcome = runner::execute(command, content.as_ref(), persistence.as_ref()).await;
        Some(AppEvent::Command(outcome))
    });
}

pub(super) fn spawn_commands(
    app: &App,
    commands: impl IntoIterator<Item = Command>,
    tx: &mpsc::Sender<AppEvent>,
) {
    for command in commands {
        spawn_command(app, command, tx);
    }
}

/// Hand the sign-in page to the system browser.
pub(super) fn spawn_login(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let url = app.persistence.login_url();
    tracing::info!(url = %url, "Opening sign-in page");
    app.set_status("Opening sign-in page in your browser...");

    spawn_task("login", tx, async move {
        let result = tokio::task::spawn_blocking(move || open_in_browser(&url))
            .await
            .map_err(|e| e.to_string())
            .and_then(|r| r.map_err(|e| e.to_string()));
        Some(AppEvent::LoginOpened(result))
    });
}

/// Card save button: toggles the liked state remotely.
///
/// Anonymous users are sent to sign in. A second press while the first is
/// still running is ignored. Saving upserts the article before liking it.
pub(super) fn spawn_save_toggle(app: &mut App, article: Article, tx: &mpsc::Sender<AppEvent>) {
    if !app.controller.is_authenticated() {
        spawn_login(app, tx);
        return;
    }
    if !app.begin_working(&article.id) {
        tracing::debug!(article_id = %article.id, "Save already in progress, ignoring");
        return;
    }

    let liked = !app.controller.is_liked(&article.id);
    let persistence = Arc::clone(&app.persistence);

    spawn_task("save_toggle", tx, async move {
        let result = toggle_like(persistence.as_ref(), &article, liked)
            .await
            .map_err(|e| e.to_string());
        Some(AppEvent::SaveToggled {
            article,
            liked,
            result,
        })
    });
}

async fn toggle_like(
    persistence: &dyn Persistence,
    article: &Article,
    liked: bool,
) -> Result<(), crate::api::ApiError> {
    if liked {
        persistence.save(article).await?;
        persistence.like(&article.id).await
    } else {
        persistence.unlike(&article.id).await
    }
}

/// Card read button: save, record the view, then open the article.
///
/// Anonymous users are sent to sign in. Nothing is opened if either call fails.
pub(super) fn spawn_read(app: &mut App, article: Article, tx: &mpsc::Sender<AppEvent>) {
    if !app.controller.is_authenticated() {
        spawn_login(app, tx);
        return;
    }

    let persistence = Arc::clone(&app.persistence);
    spawn_task("read", tx, async move {
        let result = read_article(persistence.as_ref(), &article, true).await;
        Some(AppEvent::ReadFinished {
            article_id: article.id,
            result,
        })
    });
}

/// Saved-library open: record the view, then open. Failures are only logged.
pub(super) fn spawn_open_saved(app: &mut App, article: Article, tx: &mpsc::Sender<AppEvent>) {
    let persistence = Arc::clone(&app.persistence);
    spawn_task("open_saved", tx, async move {
        if let Err(e) = read_article(persistence.as_ref(), &article, false).await {
            tracing::warn!(article_id = %article.id, error = %e, "Failed to open saved article");
        }
        None
    });
}

async fn read_article(
    persistence: &dyn Persistence,
    article: &Article,
    save_first: bool,
) -> Result<(), String> {
    if save_first {
        persistence.save(article).await.map_err(|e| e.to_string())?;
    }
    persistence
        .record_view(&article.id)
        .await
        .map_err(|e| e.to_string())?;

    let url = article.url.clone();
    tokio::task::spawn_blocking(move || open_in_browser(&url))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}
