//! Header bar: app name, Browse/Saved tabs, search box and sign-in state.

use crate::app::App;
use crate::controller::ViewMode;
use crate::util::{display_width, strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const APP_NAME: &str = "WikiFeed";

pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(app.style("panel_border"));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width < 1 || inner.height < 1 {
        return;
    }

    let account = account_label(app);
    let account_width = (display_width(&account) + 1).min(inner.width as usize) as u16;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(account_width)])
        .split(inner);

    let tab = |label: &'static str, mode: ViewMode| {
        let role = if app.view_mode() == mode {
            "tab_active"
        } else {
            "tab_inactive"
        };
        Span::styled(label, app.style(role))
    };

    let mut spans = vec![
        Span::styled(APP_NAME, app.style("header_title")),
        Span::raw("  "),
        tab(" Browse ", ViewMode::Browse),
        Span::raw(" "),
        tab(" Saved ", ViewMode::Saved),
        Span::raw("  "),
    ];

    if app.search_mode {
        let budget = (chunks[0].width as usize).saturating_sub(40).max(8);
        let query = truncate_to_width(&app.search_input, budget).into_owned();
        spans.push(Span::styled(format!("Search: {}▏", query), app.style("search_box")));
    } else if app.view_mode() == ViewMode::Browse {
        spans.push(Span::styled("/ Search Wikipedia", app.style("card_meta")));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);
    f.render_widget(
        Paragraph::new(Span::styled(account, app.style("header_user"))),
        chunks[1],
    );
}

/// "name  [L] Log out" when signed in, "[l] Sign in" otherwise.
fn account_label(app: &App) -> String {
    match &app.state().session {
        Some(user) => {
            let name = strip_control_chars(user.display_name());
            format!("{}  [L] Log out", truncate_to_width(&name, 24))
        }
        None => "[l] Sign in".to_string(),
    }
}
