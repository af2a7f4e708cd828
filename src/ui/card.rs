//! Browse deck: one full-height article card at a time, followed by a
//! trailing page that either reports a load in progress or invites another
//! swipe.

use crate::app::App;
use crate::types::Article;
use crate::util::strip_control_chars;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Widest a card grows on large terminals.
const MAX_CARD_WIDTH: u16 = 100;

pub(super) const NO_ARTICLES_TO_DISPLAY: &str = "No articles to display";
pub(super) const LOADING_MORE: &str = "Loading more articles...";
pub(super) const SCROLL_FOR_MORE: &str = "Scroll down for more";
pub(super) const SIGN_IN_HINT: &str = "Sign in to save and track reads";

pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let state = app.state();
    if state.articles.is_empty() {
        render_centered(f, app, area, NO_ARTICLES_TO_DISPLAY, "card_meta");
        return;
    }

    match app.current_article() {
        Some(article) => render_card(f, app, article, card_area(area)),
        None if state.is_loading_more => render_centered(f, app, area, LOADING_MORE, "card_body"),
        None => render_centered(f, app, area, SCROLL_FOR_MORE, "card_meta"),
    }
}

/// Horizontally centered card column, capped at `MAX_CARD_WIDTH`.
fn card_area(area: Rect) -> Rect {
    let width = area.width.min(MAX_CARD_WIDTH);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn render_card(f: &mut Frame, app: &App, article: &Article, area: Rect) {
    let state = app.state();
    let position = format!(" {}/{} ", app.card_cursor + 1, state.articles.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("card_border"))
        .title(position);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            strip_control_chars(&article.title).into_owned(),
            app.style("card_title"),
        )),
        Line::from(""),
    ];

    // Remote text may contain line breaks; keep paragraph structure.
    for paragraph in strip_control_chars(&article.extract).lines() {
        lines.push(Line::from(Span::styled(
            paragraph.to_string(),
            app.style("card_body"),
        )));
    }
    lines.push(Line::from(""));

    if let Some(thumbnail) = &article.thumbnail {
        lines.push(Line::from(Span::styled(
            format!("Image: {}", strip_control_chars(thumbnail)),
            app.style("card_meta"),
        )));
    }
    lines.push(Line::from(Span::styled(
        strip_control_chars(&article.url).into_owned(),
        app.style("card_meta"),
    )));
    lines.push(Line::from(""));
    lines.push(action_line(app, article));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

/// "[Enter] Read article  [s] Save" plus the saved marker or sign-in hint.
fn action_line(app: &App, article: &Article) -> Line<'static> {
    let mut spans = vec![
        Span::styled("[Enter] Read article", app.style("card_body")),
        Span::raw("   "),
    ];

    if app.is_working(&article.id) {
        spans.push(Span::styled("Saving...", app.style("card_meta")));
    } else if app.controller.is_liked(&article.id) {
        spans.push(Span::styled("[s] ♥ Saved", app.style("card_saved")));
    } else {
        spans.push(Span::styled("[s] Save", app.style("card_body")));
    }

    if !app.controller.is_authenticated() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(SIGN_IN_HINT, app.style("card_hint")));
    }
    Line::from(spans)
}

/// A single message, vertically and horizontally centered.
pub(super) fn render_centered(f: &mut Frame, app: &App, area: Rect, text: &str, role: &str) {
    let lines: Vec<Line> = text.lines().map(|l| Line::from(l.to_string())).collect();
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let target = Rect {
        x: area.x,
        y: area.y + top,
        width: area.width,
        height: height.min(area.height),
    };
    f.render_widget(
        Paragraph::new(lines)
            .style(app.style(role))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        target,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_area_caps_width() {
        let area = Rect::new(0, 0, 200, 40);
        let card = card_area(area);
        assert_eq!(card.width, MAX_CARD_WIDTH);
        assert_eq!(card.x, 50);
    }

    #[test]
    fn test_card_area_narrow_terminal() {
        let area = Rect::new(0, 0, 60, 20);
        assert_eq!(card_area(area), area);
    }
}
