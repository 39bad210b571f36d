mod mirror;

pub use mirror::{CacheMirror, CACHE_KEY};
