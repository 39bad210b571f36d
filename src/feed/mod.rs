//! Static feed handling.
//!
//! - [`types`] - the untrusted `RawEntry` shape and the decorated `FeedEntry`
//! - [`truncate`] - the truncation policy behind "show more"
//! - [`loader`] - reading the feed (file or URL), mirror-first loading
//!
//! `decorate` is the only conversion from `RawEntry` to `FeedEntry`.
//!
//! # Example
//!
//! ```ignore
//! use feria::feed::{load, build_client, FeedSource, TruncationPolicy};
//! use feria::storage::CacheMirror;
//!
//! let source = FeedSource::parse("public/data.json")?;
//! let loaded = load(&build_client()?, &source, &CacheMirror::disabled(), &TruncationPolicy::default()).await?;
//! ```

mod loader;
mod truncate;
mod types;

pub use loader::{
    build_client, fetch_raw, load, parse_feed, FeedSource, LoadError, LoadOrigin, LoadedFeed,
};
pub use truncate::{TruncationPolicy, DEFAULT_CHAR_LIMIT, DEFAULT_WORD_LIMIT, ELLIPSIS};
pub use types::{decorate, FeedEntry, RawEntry, ToggleLabels};
