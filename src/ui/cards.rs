//! Card grid: one bordered card per entry, laid out in responsive columns.
//!
//! Each card shows, top to bottom: the image reference, the title, the
//! excerpt or full body, and a footer line with the credits on the left and
//! the show more / show less label on the right.

use crate::app::{App, ClickTarget};
use crate::feed::FeedEntry;
use crate::util::{display_width, strip_control_chars, truncate_to_width, wrap_text};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Marker in front of the image reference.
const IMAGE_MARKER: &str = "▣ ";
/// Marker in front of the credits.
const CREDITS_MARKER: &str = "📌 ";
/// Blank columns between cards.
const GUTTER: u16 = 1;

/// Number of card columns for a grid `width` cells wide.
pub(crate) fn columns_for_width(width: u16) -> usize {
    match width {
        0..=79 => 1,
        80..=119 => 2,
        _ => 3,
    }
}

/// Content of one card, laid out for a fixed inner width.
pub(crate) struct CardContent {
    pub lines: Vec<Line<'static>>,
    /// Line index and column span of the toggle label, if the card has one.
    pub toggle: Option<(usize, u16, u16)>,
}

impl CardContent {
    /// Height including the border.
    pub fn height(&self) -> u16 {
        u16::try_from(self.lines.len())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
    }
}

/// Lay out `entry` for a card whose inner width is `width`.
pub(crate) fn build_card(app: &App, entry: &FeedEntry, width: usize) -> CardContent {
    let mut lines = Vec::new();
    if width == 0 {
        return CardContent {
            lines,
            toggle: None,
        };
    }

    let image = strip_control_chars(&entry.image);
    let image_line = format!("{}{}", IMAGE_MARKER, image);
    lines.push(Line::from(Span::styled(
        truncate_to_width(&image_line, width).into_owned(),
        app.style("card_image"),
    )));

    let title = strip_control_chars(&entry.title);
    for line in wrap_text(&title, width) {
        lines.push(Line::from(Span::styled(line, app.style("card_title"))));
    }

    let body = entry.display_body(&app.policy);
    let body = strip_control_chars(&body);
    for line in wrap_text(&body, width) {
        lines.push(Line::from(Span::styled(line, app.style("card_body"))));
    }

    lines.push(Line::default());

    let credits = format!("{}{}", CREDITS_MARKER, strip_control_chars(&entry.credits));
    let mut credit_lines = wrap_text(&credits, width);
    let mut toggle = None;

    if let Some(label) = entry.toggle_label(&app.labels) {
        let label = truncate_to_width(label, width).into_owned();
        let label_width = display_width(&label);
        let last_width = credit_lines.last().map(|l| display_width(l)).unwrap_or(0);

        // Share the last credits line when both fit, otherwise give the label its own line
        let last = credit_lines.pop().unwrap_or_default();
        let (left, line_idx) = if last_width + 1 + label_width <= width {
            (last, lines.len() + credit_lines.len())
        } else {
            credit_lines.push(last);
            (String::new(), lines.len() + credit_lines.len())
        };
        for line in credit_lines.drain(..) {
            lines.push(Line::from(Span::styled(line, app.style("card_credits"))));
        }

        let left_width = display_width(&left);
        let pad = width.saturating_sub(left_width + label_width);
        lines.push(Line::from(vec![
            Span::styled(left, app.style("card_credits")),
            Span::raw(" ".repeat(pad)),
            Span::styled(label, app.style("card_toggle")),
        ]));

        let x = u16::try_from(left_width + pad).unwrap_or(u16::MAX);
        let w = u16::try_from(label_width).unwrap_or(u16::MAX);
        toggle = Some((line_idx, x, w));
    } else {
        for line in credit_lines {
            lines.push(Line::from(Span::styled(line, app.style("card_credits"))));
        }
    }

    CardContent { lines, toggle }
}

/// Split `area` into `columns` equal slots separated by a gutter.
fn column_slots(area: Rect, columns: usize) -> Vec<(u16, u16)> {
    let columns = columns.max(1) as u16;
    let gutters = GUTTER.saturating_mul(columns - 1);
    let usable = area.width.saturating_sub(gutters);
    let base = usable / columns;
    let extra = usable % columns;

    let mut x = area.x;
    (0..columns)
        .map(|c| {
            let w = base + u16::from(c < extra);
            let slot = (x, w);
            x = x.saturating_add(w).saturating_add(GUTTER);
            slot
        })
        .collect()
}

/// Render the grid into `area`, scrolling so the selected card stays visible.
///
/// Records the clickable regions of every drawn card in `app.click_targets`.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    app.click_targets.clear();
    if area.width < 4 || area.height < 3 {
        return;
    }

    let columns = columns_for_width(area.width);
    app.columns = columns;
    if app.gallery.is_empty() {
        app.scroll_row = 0;
        return;
    }

    let slots = column_slots(area, columns);
    let entries = app.gallery.snapshot();

    // Lay out every row up front; feeds are small
    let rows: Vec<Vec<CardContent>> = entries
        .chunks(columns)
        .map(|row| {
            row.iter()
                .zip(&slots)
                .map(|(entry, (_, w))| build_card(app, entry, w.saturating_sub(2) as usize))
                .collect()
        })
        .collect();
    let heights: Vec<u16> = rows
        .iter()
        .map(|row| row.iter().map(CardContent::height).max().unwrap_or(0))
        .collect();

    app.scroll_row = scroll_to_show(
        &heights,
        app.scroll_row,
        app.selected / columns,
        area.height,
    );

    let mut y = area.y;
    let bottom = area.y.saturating_add(area.height);
    for (row_idx, row) in rows.iter().enumerate().skip(app.scroll_row) {
        if y >= bottom {
            break;
        }
        let height = heights[row_idx].min(bottom - y);

        for (col, (card, (x, w))) in row.iter().zip(&slots).enumerate() {
            let index = row_idx * columns + col;
            let rect = Rect::new(*x, y, *w, height);
            render_card(f, app, card, index, rect);
        }

        y = y.saturating_add(heights[row_idx]);
    }
}

/// First row to draw so that `selected_row` fits in `height` lines.
fn scroll_to_show(heights: &[u16], current: usize, selected_row: usize, height: u16) -> usize {
    let Some(last) = heights.len().checked_sub(1) else {
        return 0;
    };
    let selected_row = selected_row.min(last);
    let mut first = current.min(selected_row);
    let needed = |first: usize| -> u32 {
        heights[first..=selected_row]
            .iter()
            .map(|&h| u32::from(h))
            .sum()
    };
    while first < selected_row && needed(first) > u32::from(height) {
        first += 1;
    }
    first
}

fn render_card(f: &mut Frame, app: &mut App, card: &CardContent, index: usize, rect: Rect) {
    let border = if index == app.selected {
        app.style("card_border_selected")
    } else {
        app.style("card_border")
    };
    let block = Block::default().borders(Borders::ALL).border_style(border);
    let inner = block.inner(rect);

    f.render_widget(Paragraph::new(card.lines.clone()).block(block), rect);

    app.click_targets.push((rect, ClickTarget::Card(index)));
    if inner.height > 0 {
        app.click_targets.push((
            Rect::new(inner.x, inner.y, inner.width, 1),
            ClickTarget::Image(index),
        ));
    }
    if let Some((line, x, w)) = card.toggle {
        if let Ok(line) = u16::try_from(line) {
            if line < inner.height {
                app.click_targets.push((
                    Rect::new(inner.x.saturating_add(x), inner.y + line, w, 1),
                    ClickTarget::Toggle(index),
                ));
            }
        }
    }
}
