//! Enlarged-image overlay.
//!
//! Dims whatever is already drawn, then draws a centered panel showing the
//! image reference with a `✕` close control in its top-right corner. Any
//! click closes it, so no click regions are recorded.

use crate::app::{App, OVERLAY_TITLE};
use crate::util::{strip_control_chars, wrap_text};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const CLOSE_CONTROL: &str = " ✕ ";

pub fn render(f: &mut Frame, app: &App) {
    let Some(image) = app.gallery.overlay().image() else {
        return;
    };
    let area = f.area();

    // Backdrop
    f.buffer_mut().set_style(area, app.style("overlay_backdrop"));

    let panel = centered_rect(80, 80, area);
    if panel.width < 12 || panel.height < 5 {
        return;
    }
    f.render_widget(Clear, panel);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("overlay_border"))
        .title(format!(" {} ", OVERLAY_TITLE));
    let inner = block.inner(panel);

    let image = strip_control_chars(image);
    let resolved = app.source.resolve_image(&image);
    let mut lines: Vec<Line> = wrap_text(&resolved, inner.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, app.style("overlay_image"))))
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(o) Open in viewer  (Esc) Close",
        app.style("overlay_border"),
    )));

    // Vertically center the text block
    let pad = (inner.height as usize).saturating_sub(lines.len()) / 2;
    let mut padded = vec![Line::default(); pad];
    padded.extend(lines);

    f.render_widget(
        Paragraph::new(padded)
            .alignment(Alignment::Center)
            .block(block),
        panel,
    );

    let close_width = CLOSE_CONTROL.chars().count() as u16;
    let close = Rect::new(
        panel.x + panel.width.saturating_sub(close_width + 1),
        panel.y,
        close_width,
        1,
    );
    f.render_widget(
        Paragraph::new(Span::styled(CLOSE_CONTROL, app.style("overlay_close"))),
        close,
    );
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x.min(100)) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y.min(100)) / 100) as u16;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
