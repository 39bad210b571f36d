//! Input handling for the TUI.
//!
//! Keys go through the keybinding registry in the context of the current
//! screen (card grid or image overlay). Mouse clicks are matched against the
//! regions recorded by the last frame.

use crate::app::{App, AppEvent, ClickTarget};
use crate::keybindings::Action as KbAction;
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;

use super::helpers::{open_image_externally, spawn_feed_load};
use super::Action;

/// Main key dispatch function.
pub fn handle_key(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Help overlay captures all keys when visible
    if app.show_help {
        return handle_help_input(app, code, modifiers);
    }

    let context = app.key_context();
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };
    tracing::trace!(?action, ?context, "Key action");

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::NavLeft => app.nav_left(),
        KbAction::NavRight => app.nav_right(),
        KbAction::ToggleExpand => {
            app.toggle_selected();
        }
        KbAction::OpenImage => {
            app.open_selected_image();
        }
        KbAction::CloseOverlay => app.close_overlay(),
        KbAction::OpenExternal => open_image_externally(app),
        KbAction::Reload => {
            app.prepare_reload();
            spawn_feed_load(app, event_tx);
        }
        KbAction::CycleTheme => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
    }
    Action::Continue
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Action::Quit,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// Handle a mouse event. Only left clicks and wheel scrolling do anything.
///
/// Returns whether the state changed.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) -> bool {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => handle_click(app, mouse.column, mouse.row),
        MouseEventKind::ScrollDown if !app.gallery.overlay().is_open() => {
            app.nav_down();
            true
        }
        MouseEventKind::ScrollUp if !app.gallery.overlay().is_open() => {
            app.nav_up();
            true
        }
        _ => false,
    }
}

fn handle_click(app: &mut App, column: u16, row: u16) -> bool {
    if app.show_help {
        app.show_help = false;
        return true;
    }

    // Backdrop, panel and close control all dismiss the overlay
    if app.gallery.overlay().is_open() {
        app.close_overlay();
        return true;
    }

    match app.click_target_at(column, row) {
        Some(ClickTarget::Image(index)) => {
            app.selected = index;
            app.open_image_at(index)
        }
        Some(ClickTarget::Toggle(index)) => {
            app.selected = index;
            app.toggle_at(index);
            true
        }
        Some(ClickTarget::Card(index)) => {
            app.selected = index;
            true
        }
        None => false,
    }
}
