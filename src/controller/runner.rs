//! Executes controller commands against the two adapters.

use super::{Command, CommandOutcome};
use crate::api::Persistence;
use crate::content::ContentSource;

/// Run one command to completion.
///
/// Never fails: content errors are already swallowed by the source, and
/// persistence errors travel inside the outcome for the controller to judge.
pub async fn execute(
    command: Command,
    content: &dyn ContentSource,
    persistence: &dyn Persistence,
) -> CommandOutcome {
    match command {
        Command::FetchRandom { seq, count } => CommandOutcome::FeedLoaded {
            seq,
            articles: content.fetch_random(count).await,
        },
        Command::Search { seq, query } => CommandOutcome::FeedLoaded {
            seq,
            articles: content.search(&query).await,
        },
        Command::LoadMore { seq, count } => CommandOutcome::MoreLoaded {
            seq,
            articles: content.fetch_random(count).await,
        },
        Command::FetchLiked => CommandOutcome::LikedLoaded(persistence.liked().await),
        Command::RemoveSaved { article } => {
            let result = persistence.unlike(&article.id).await;
            CommandOutcome::SavedRemoved { article, result }
        }
        Command::Logout => CommandOutcome::LoggedOut(persistence.logout().await),
        Command::CheckSession => CommandOutcome::Session(persistence.current_session().await),
    }
}
