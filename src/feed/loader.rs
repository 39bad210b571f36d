use futures::StreamExt;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::truncate::TruncationPolicy;
use super::types::{decorate, FeedEntry, RawEntry};
use crate::storage::CacheMirror;

/// Response bodies (and feed files) larger than this are rejected.
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Timeout for the single feed request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from reading and parsing the static feed.
///
/// All of them are the same failure from the page's point of view: the load
/// did not produce entries.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// Body exceeded the 10MB size limit
    #[error("Feed too large")]
    ResponseTooLarge,
    /// Local feed file could not be read
    #[error("Failed to read feed file: {0}")]
    Io(#[from] std::io::Error),
    /// Body is not a JSON array
    #[error("Parse error: {0}")]
    Parse(String),
    /// The configured source is empty or unusable
    #[error("Invalid feed source: {0}")]
    InvalidSource(String),
}

// ============================================================================
// Feed Source
// ============================================================================

/// Where the static feed lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(Url),
    File(PathBuf),
}

impl FeedSource {
    /// `http://` and `https://` strings are URLs; anything else is a path.
    pub fn parse(s: &str) -> Result<Self, LoadError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LoadError::InvalidSource("empty source".to_string()));
        }

        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(s).map_err(|e| LoadError::InvalidSource(e.to_string()))?;
            return Ok(Self::Url(url));
        }

        Ok(Self::File(PathBuf::from(s)))
    }

    /// Resolve an entry's image reference the way the page would.
    ///
    /// Absolute URLs are kept. Relative references are joined to the feed URL,
    /// or, for a local feed, taken relative to the feed file's directory (a
    /// leading `/` means that directory, like a site root).
    pub fn resolve_image(&self, image: &str) -> String {
        let image = image.trim();
        if image.is_empty() {
            return String::new();
        }
        if Url::parse(image).is_ok() {
            return image.to_string();
        }

        match self {
            Self::Url(base) => base
                .join(image)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| image.to_string()),
            Self::File(path) => {
                let root = path.parent().unwrap_or_else(|| Path::new(""));
                root.join(image.trim_start_matches('/'))
                    .to_string_lossy()
                    .into_owned()
            }
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Where the current entry list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Adopted verbatim from the cache mirror.
    Cache,
    /// Fetched from the static source and freshly decorated.
    Source,
}

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedFeed {
    pub entries: Vec<FeedEntry>,
    pub origin: LoadOrigin,
}

/// Build the HTTP client used for the feed request.
///
/// Limits redirects to 3 hops and rejects redirect loops.
pub fn build_client() -> Result<reqwest::Client, LoadError> {
    let policy = Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }
        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }
        tracing::debug!(to = %url, hop = attempt.previous().len() + 1, "Following redirect");
        attempt.follow()
    });

    let client = reqwest::Client::builder()
        .redirect(policy)
        .user_agent(concat!("feria/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Load the gallery entries.
///
/// A non-empty cache mirror is adopted verbatim, flags included, without
/// touching the source. Otherwise the source is read once and every record is
/// decorated with `policy`.
pub async fn load(
    client: &reqwest::Client,
    source: &FeedSource,
    mirror: &CacheMirror,
    policy: &TruncationPolicy,
) -> Result<LoadedFeed, LoadError> {
    if let Some(entries) = mirror.read() {
        tracing::info!(entries = entries.len(), "Using cached feed mirror");
        return Ok(LoadedFeed {
            entries,
            origin: LoadOrigin::Cache,
        });
    }

    let raw = fetch_raw(client, source).await?;
    let entries = decorate(raw, policy);
    tracing::info!(
        source = %source,
        entries = entries.len(),
        policy = %policy,
        "Loaded feed from source"
    );

    Ok(LoadedFeed {
        entries,
        origin: LoadOrigin::Source,
    })
}

/// Read the static feed once and parse its records. No retries.
pub async fn fetch_raw(
    client: &reqwest::Client,
    source: &FeedSource,
) -> Result<Vec<RawEntry>, LoadError> {
    let bytes = match source {
        FeedSource::Url(url) => fetch_url(client, url).await?,
        FeedSource::File(path) => read_file(path).await?,
    };
    parse_feed(&bytes)
}

/// Parse a feed document: a JSON array of records in source order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawEntry>, LoadError> {
    let document: Value =
        serde_json::from_slice(bytes).map_err(|e| LoadError::Parse(e.to_string()))?;

    match document {
        Value::Array(items) => Ok(items.into_iter().map(RawEntry::from_value).collect()),
        _ => Err(LoadError::Parse("expected a JSON array".to_string())),
    }
}

async fn fetch_url(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>, LoadError> {
    let response = tokio::time::timeout(REQUEST_TIMEOUT, client.get(url.as_str()).send())
        .await
        .map_err(|_| LoadError::Timeout)??;

    if !response.status().is_success() {
        return Err(LoadError::HttpStatus(response.status().as_u16()));
    }

    tokio::time::timeout(REQUEST_TIMEOUT, read_limited_bytes(response, MAX_FEED_SIZE))
        .await
        .map_err(|_| LoadError::Timeout)?
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, LoadError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(LoadError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(LoadError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

async fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    let meta = tokio::fs::metadata(path).await?;
    if meta.len() > MAX_FEED_SIZE as u64 {
        return Err(LoadError::ResponseTooLarge);
    }
    Ok(tokio::fs::read(path).await?)
}
