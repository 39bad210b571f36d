//! Utility functions for common operations.
//!
//! - **Text processing**: Unicode-aware width calculation, truncation and
//!   word wrapping for card layout, plus control-character stripping for
//!   text that comes straight from the feed.
//!
//! # Examples
//!
//! ```
//! use feria::util::{display_width, truncate_to_width, wrap_text};
//!
//! let width = display_width("Hola 世界"); // 5 + 2*2
//! assert_eq!(width, 9);
//!
//! let truncated = truncate_to_width("Procesión del Viernes Santo", 15);
//! assert_eq!(truncated, "Procesión de...");
//!
//! let lines = wrap_text("Danza de los Xantolos", 10);
//! assert_eq!(lines, vec!["Danza de", "los", "Xantolos"]);
//! ```

mod text;

pub use text::{display_width, strip_control_chars, truncate_to_width, wrap_text};
