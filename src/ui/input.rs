//! Input handling for the TUI.
//!
//! Keys are resolved to actions through the keybinding registry using the
//! current context (search box, browse deck or saved library), then
//! dispatched here.

use crate::app::{App, AppEvent};
use crate::controller::{Command, ViewMode};
use crate::keybindings::Action as KbAction;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{
    spawn_command, spawn_login, spawn_open_saved, spawn_read, spawn_save_toggle,
};
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Help overlay captures all keys while visible
    if app.show_help {
        handle_help_input(app, code);
        return Action::Continue;
    }

    if app.search_mode {
        handle_search_input(app, code, modifiers, event_tx);
        return Action::Continue;
    }

    let context = app.key_context();
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };
    dispatch(app, action, event_tx)
}

/// Help overlay: j/k scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let max = app.keybindings.all_bindings().len();
            app.help_scroll_offset = (app.help_scroll_offset + 1).min(max);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
}

/// Search box: typed characters edit the query; Enter and Esc go through
/// the registry so they can be rebound.
fn handle_search_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match app.keybindings.action_for_key(code, modifiers, app.key_context()) {
        Some(KbAction::ExitSearch) => {
            app.exit_search();
            return;
        }
        Some(KbAction::CommitSearch) => {
            match app.commit_search() {
                Some(command) => spawn_command(app, command, event_tx),
                None => app.set_status("Type something to search"),
            }
            return;
        }
        _ => {}
    }

    match code {
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.push_search_char(c)
        }
        _ => {}
    }
}

fn dispatch(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::NavDown => {
            app.nav_down();
            if let Some(command) = app.observe_scroll() {
                spawn_command(app, command, event_tx);
            }
        }
        KbAction::NavUp => {
            app.nav_up();
            if let Some(command) = app.observe_scroll() {
                spawn_command(app, command, event_tx);
            }
        }
        KbAction::First => app.nav_first(),
        KbAction::Back => {
            if app.state().error.is_some() {
                app.controller.dismiss_error();
            } else if app.view_mode() == ViewMode::Saved {
                app.controller.set_view_mode(ViewMode::Browse);
            }
        }
        KbAction::ToggleView => {
            let next = app.view_mode().toggled();
            app.controller.set_view_mode(next);
        }
        KbAction::ShowBrowse => app.controller.set_view_mode(ViewMode::Browse),
        KbAction::ShowSaved => app.controller.set_view_mode(ViewMode::Saved),
        KbAction::Randomize => {
            if let Some(command) = app.controller.randomize() {
                spawn_command(app, command, event_tx);
            }
        }
        KbAction::EnterSearch => app.enter_search(),
        KbAction::Save => {
            if let Some(article) = app.current_article().cloned() {
                spawn_save_toggle(app, article, event_tx);
            }
        }
        KbAction::Read => {
            if let Some(article) = app.current_article().cloned() {
                spawn_read(app, article, event_tx);
            }
        }
        KbAction::Open => {
            if let Some(article) = app.selected_saved().cloned() {
                app.set_status(format!("Opening {}...", article.title));
                spawn_open_saved(app, article, event_tx);
            }
        }
        KbAction::Remove => {
            if let Some(article) = app.selected_saved().cloned() {
                let command = app.controller.remove_saved(&article);
                spawn_command(app, command, event_tx);
            }
        }
        KbAction::RefreshSaved => match app.controller.refresh_saved() {
            Some(command) => spawn_command(app, command, event_tx),
            None => app.set_status("Sign in to view your saved articles."),
        },
        KbAction::Login => {
            if app.controller.is_authenticated() {
                app.set_status("Already signed in");
            } else {
                spawn_login(app, event_tx);
            }
        }
        KbAction::Logout => {
            if app.controller.is_authenticated() {
                let command = app.controller.logout();
                spawn_command(app, command, event_tx);
                app.set_status("Signing out...");
            }
        }
        KbAction::CheckSession => {
            spawn_command(app, Command::CheckSession, event_tx);
            app.set_status("Checking sign-in status...");
        }
        KbAction::CycleTheme => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        // Only reachable from the search context.
        KbAction::ExitSearch | KbAction::CommitSearch => {}
    }
    Action::Continue
}
