use crate::app::App;
use crate::controller::ViewMode;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar.
///
/// Priority: transient status message, then the controller's error (with a
/// dismiss hint), then key hints for the current mode.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let (text, role): (Cow<'_, str>, &str) = if let Some((msg, _)) = &app.status_message {
        (Cow::Borrowed(msg.as_ref()), "status_bar")
    } else if let Some(error) = &app.state().error {
        (Cow::Owned(format!("{}  [Esc] dismiss", error)), "status_error")
    } else if app.search_mode {
        (
            Cow::Borrowed("Type to search | ESC cancel | ENTER search"),
            "status_bar",
        )
    } else {
        let hints = match app.view_mode() {
            ViewMode::Browse => "[j/k]swipe [s]ave [Enter]read [/]search [r]andom [Tab]saved [?]help [q]uit",
            ViewMode::Saved => "[j/k]move [Enter]open [d]remove [R]efresh [Tab]browse [?]help [q]uit",
        };
        (Cow::Borrowed(hints), "status_bar")
    };

    f.render_widget(Paragraph::new(text).style(app.style(role)), area);
}
