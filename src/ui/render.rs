//! Render dispatch for the TUI.

use crate::app::App;
use crate::controller::ViewMode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{card, header, help, saved, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 10;

pub(super) const LOADING_FEED: &str = "Loading articles...";
pub(super) const TRY_AGAIN: &str = "[r] Try Again";

/// Which full-screen state, if any, replaces the normal layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Screen {
    /// First browse load, nothing to show yet.
    Loading,
    /// Browse load failed with nothing to show.
    Retry,
    Normal,
}

pub(super) fn screen_for(app: &App) -> Screen {
    let state = app.state();
    let empty_browse = state.articles.is_empty() && state.view_mode == ViewMode::Browse;
    if empty_browse && state.loading {
        Screen::Loading
    } else if empty_browse && state.error.is_some() {
        Screen::Retry
    } else {
        Screen::Normal
    }
}

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    match screen_for(app) {
        Screen::Loading => card::render_centered(f, app, area, LOADING_FEED, "card_body"),
        Screen::Retry => render_retry(f, app, area),
        Screen::Normal => render_main(f, app, area),
    }

    if app.show_help {
        help::render(f, app);
    }
}

fn render_main(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    header::render(f, app, chunks[0]);
    match app.view_mode() {
        ViewMode::Browse => card::render(f, app, chunks[1]),
        ViewMode::Saved => saved::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);
}

/// Error box with the retry key.
fn render_retry(f: &mut Frame, app: &App, area: Rect) {
    let error = app.state().error.as_deref().unwrap_or_default();
    let dialog = help::centered_rect(60, 30, area);
    let dialog = Rect {
        height: dialog.height.max(5).min(area.height),
        ..dialog
    };

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(error.to_string(), app.style("card_body"))),
        Line::from(""),
        Line::from(Span::styled(TRY_AGAIN, app.style("status_error"))),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border")),
        );
    f.render_widget(paragraph, dialog);
}
