//! Saved library: the signed-in user's liked articles as a selectable list.

use crate::app::App;
use crate::util::{one_line, strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::card::render_centered;

pub(super) const SIGN_IN_TO_VIEW: &str = "Sign in to view your saved articles.\n\nPress l to sign in";
pub(super) const LOADING_SAVED: &str = "Loading saved articles...";
pub(super) const NOTHING_SAVED: &str = "Nothing saved yet. Browse and press s to save articles.";

pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let state = app.state();
    if state.session.is_none() {
        render_centered(f, app, area, SIGN_IN_TO_VIEW, "card_body");
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    let heading = Line::from(vec![
        Span::styled("Saved articles", app.style("header_title")),
        Span::styled(
            format!("  ({})  [R] Refresh", state.saved_articles.len()),
            app.style("card_meta"),
        ),
    ]);
    f.render_widget(Paragraph::new(heading), chunks[0]);

    if state.saved_loading {
        render_centered(f, app, chunks[1], LOADING_SAVED, "card_body");
    } else if state.saved_articles.is_empty() {
        render_centered(f, app, chunks[1], NOTHING_SAVED, "card_meta");
    } else {
        render_list(f, app, chunks[1]);
    }
}

fn render_list(f: &mut Frame, app: &App, area: Rect) {
    // Border and highlight symbol.
    let text_width = (area.width as usize).saturating_sub(4);

    let items: Vec<ListItem> = app
        .state()
        .saved_articles
        .iter()
        .map(|article| {
            let title = strip_control_chars(&article.title);
            let summary = one_line(&strip_control_chars(article.display_text()));
            ListItem::new(vec![
                Line::from(Span::styled(
                    truncate_to_width(&title, text_width).into_owned(),
                    app.style("saved_title"),
                )),
                Line::from(Span::styled(
                    truncate_to_width(&summary, text_width).into_owned(),
                    app.style("saved_summary"),
                )),
                Line::from(""),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused")),
        )
        .highlight_style(app.style("saved_selected"))
        .highlight_symbol("▌ ");

    let mut list_state = ListState::default().with_selected(Some(app.saved_cursor));
    f.render_stateful_widget(list, area, &mut list_state);
}
