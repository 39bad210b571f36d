//! Application event handling.
//!
//! Processes results from background tasks (the feed load) and applies them
//! to the app state.

use crate::app::{App, AppEvent};

/// Handle application events from background tasks.
pub fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::FeedLoaded { generation, result } => {
            app.apply_load_result(generation, result);
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            if task == "feed_load" {
                // The load never reports back; stop showing it as in flight
                app.load_handle = None;
                app.load_state = crate::app::LoadState::Failed;
            }
            app.set_status(format!("Internal error in {}", task));
        }
    }
}
