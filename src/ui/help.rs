//! Help overlay: scrollable keybinding table.
//!
//! Lists the live bindings, config overrides included, grouped by context.

use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

use super::overlay::centered_rect;

/// Context display order for the help screen.
const CONTEXT_ORDER: [Context; 2] = [Context::Global, Context::Overlay];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let bindings = app.keybindings.all_bindings();
    let mut rows: Vec<Row> = Vec::new();

    for ctx in CONTEXT_ORDER {
        let ctx_bindings: Vec<_> = bindings.iter().filter(|(c, ..)| *c == ctx).collect();
        if ctx_bindings.is_empty() {
            continue;
        }

        rows.push(
            Row::new(vec![
                Line::from(Span::styled(
                    format!("-- {} --", ctx.label()),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ])
            .style(app.style("help_heading")),
        );

        for (_, key_str, _action, description) in ctx_bindings {
            rows.push(Row::new(vec![
                format!("  {}", key_str),
                description.to_string(),
            ]));
        }

        rows.push(Row::new(vec![String::new(), String::new()]));
    }
    rows.pop();

    let total_rows = rows.len();
    let visible_height = overlay.height.saturating_sub(3) as usize; // -2 border -1 header
    let max_scroll = total_rows.saturating_sub(visible_height);
    let scroll = app.help_scroll_offset.min(max_scroll);
    let visible_rows: Vec<Row> = rows.into_iter().skip(scroll).take(visible_height).collect();

    let title = if max_scroll > 0 {
        format!(
            " Help ({}/{}) ",
            scroll.saturating_add(1),
            max_scroll.saturating_add(1)
        )
    } else {
        " Help (? to close) ".to_string()
    };

    let widths = [Constraint::Length(16), Constraint::Min(20)];

    let table = Table::new(visible_rows, widths)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("overlay_border"))
                .title(title),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        )
        .style(app.style("help_body"));

    f.render_widget(table, overlay);

    if max_scroll > 0 && scroll < max_scroll {
        let hint = Line::from(Span::styled(
            " j/k to scroll, ? or Esc to close ",
            app.style("footer"),
        ));
        let hint_area = Rect {
            x: overlay.x + 1,
            y: overlay.y + overlay.height.saturating_sub(1),
            width: overlay.width.saturating_sub(2),
            height: 1,
        };
        f.render_widget(Paragraph::new(hint), hint_area);
    }
}
