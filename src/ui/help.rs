//! Help overlay: live key bindings grouped by context, config overrides
//! included.

use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const SECTIONS: [(Context, &str); 4] = [
    (Context::Global, "General"),
    (Context::Browse, "Browse"),
    (Context::Saved, "Saved library"),
    (Context::Search, "Search box"),
];

/// Width of the key column.
const KEY_COLUMN: usize = 14;

pub(super) fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    let lines = help_lines(app);
    let visible = overlay.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible);
    let scroll = app.help_scroll_offset.min(max_scroll);

    let title = if max_scroll > 0 {
        format!(" Help {}/{}  j/k scroll, ? close ", scroll + 1, max_scroll + 1)
    } else {
        " Help  ? close ".to_string()
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(title),
        )
        .scroll((scroll as u16, 0));

    f.render_widget(Clear, overlay);
    f.render_widget(paragraph, overlay);
}

fn help_lines(app: &App) -> Vec<Line<'static>> {
    let bindings = app.keybindings.all_bindings();
    let mut lines = Vec::new();

    for (context, label) in SECTIONS {
        let mut section = bindings.iter().filter(|(c, ..)| *c == context).peekable();
        if section.peek().is_none() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            label,
            app.style("help_heading").add_modifier(Modifier::BOLD),
        )));
        for (_, key, _, description) in section {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<KEY_COLUMN$}", key), app.style("card_meta")),
                Span::styled(*description, app.style("card_body")),
            ]));
        }
    }
    lines
}

/// A centered rectangle covering the given percentage of `area`.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y) / 100) as u16;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
