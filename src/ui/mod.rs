//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard and mouse handling
//! - `events` - Background task event processing
//! - `render` - Page layout and overlay stacking
//! - `cards` - Card grid widget
//! - `overlay` - Enlarged-image overlay
//! - `help` - Keybinding table
//! - `status` - Status bar widget
//! - `helpers` - Task spawning and the external viewer

mod cards;
mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod overlay;
mod render;
mod status;

pub use events::handle_app_event;
pub use helpers::spawn_feed_load;
pub use input::{handle_key, handle_mouse};
pub use loop_runner::{run, Action};
pub use render::render;
