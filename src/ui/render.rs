//! Render functions for the TUI.
//!
//! Draws the page (header, card grid, footer, status bar), then the image
//! overlay and the help table on top when they are active.

use crate::app::App;
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{cards, help, overlay, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 30;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render function.
pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        app.click_targets.clear();
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

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    cards::render(f, app, chunks[1]);
    render_footer(f, app, chunks[2]);
    status::render(f, app, chunks[3]);

    if app.gallery.overlay().is_open() {
        overlay::render(f, app);
    }

    if app.show_help {
        help::render(f, app);
    }
}

/// Title and subtitle, centered, followed by a blank line.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;
    let title = strip_control_chars(&app.title);
    let subtitle = strip_control_chars(&app.subtitle);
    let lines = vec![
        Line::from(Span::styled(
            truncate_to_width(&title, width).into_owned(),
            app.style("header_title"),
        )),
        Line::from(Span::styled(
            truncate_to_width(&subtitle, width).into_owned(),
            app.style("header_subtitle"),
        )),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let text = app.footer_text();
    let text = truncate_to_width(&text, area.width as usize).into_owned();
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(app.style("footer")),
        area,
    );
}
