//! Helper functions for UI operations.
//!
//! Background task spawning and hand-off to the system image viewer.

use crate::app::{App, AppEvent};
use crate::feed::load;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of the task silently disappearing (caught by Tokio's runtime but not
/// handled), panics are converted to `Err(String)` containing the panic message.
///
/// # Example
///
/// ```ignore
/// tokio::spawn(async move {
///     match catch_task_panic(async { do_work().await }).await {
///         Ok(result) => handle_result(result),
///         Err(panic_msg) => {
///             let _ = tx.send(AppEvent::TaskPanicked { task: "work", error: panic_msg }).await;
///         }
///     }
/// });
/// ```
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn the feed load for a new generation.
///
/// Any load still in flight is aborted first. The result arrives as
/// `AppEvent::FeedLoaded` tagged with the generation, and the task handle is
/// kept on the app so dropping the app cancels it.
pub fn spawn_feed_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let generation = app.begin_load();
    let client = app.http_client.clone();
    let source = app.source.clone();
    let mirror = app.mirror.clone();
    let policy = app.policy;
    let tx = event_tx.clone();

    tracing::debug!(source = %source, generation, "Spawning feed load");

    app.load_handle = Some(tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(load(&client, &source, &mirror, &policy)).await {
            Ok(result) => {
                if let Err(e) = tx.send(AppEvent::FeedLoaded { generation, result }).await {
                    tracing::warn!(error = %e, event = "FeedLoaded", "Channel send failed (receiver dropped)");
                }
            }
            Err(panic_msg) => {
                tracing::error!(task = "feed_load", error = %panic_msg, "Background task panicked");
                let _ = tx_panic
                    .send(AppEvent::TaskPanicked {
                        task: "feed_load",
                        error: panic_msg,
                    })
                    .await;
            }
        }
    }));
}

/// Hand the current image to the system viewer (`o`).
pub(super) fn open_image_externally(app: &mut App) {
    let Some(target) = app.external_image_target() else {
        app.set_status("No image to open");
        return;
    };

    match open::that_detached(&target) {
        Ok(()) => {
            tracing::info!(target = %target, "Opened image in system viewer");
            app.set_status("Opened in viewer");
        }
        Err(e) => {
            tracing::warn!(target = %target, error = %e, "Failed to open image");
            app.set_status(format!("Failed to open: {}", e));
        }
    }
}
