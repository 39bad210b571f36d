use crate::app::{App, LoadState};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.load_state == LoadState::Loading {
        Cow::Borrowed("Loading feed...")
    } else if app.gallery.overlay().is_open() {
        Cow::Borrowed("[Esc/x]close [o]pen in viewer")
    } else {
        Cow::Borrowed("[h/j/k/l]move [Space]more/less [Enter]image [o]pen [r]eload [?]help [q]uit")
    };

    f.render_widget(Paragraph::new(text).style(app.style("status_bar")), area);
}
