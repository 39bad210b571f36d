//! feria: a terminal gallery over a static feed of event cards.
//!
//! The feed is a JSON array of `{title, body, image, credits}` records. Each
//! record becomes a card whose long body sits behind a "show more" toggle;
//! any card's image can be enlarged in an overlay. The decorated list,
//! toggle state included, is mirrored to disk between sessions.

pub mod app;
pub mod config;
pub mod feed;
pub mod gallery;
pub mod keybindings;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;
