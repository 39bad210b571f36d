//! Best-effort on-disk mirror of the decorated feed.
//!
//! One fixed key (`feriaData.json`) holds the whole entry list as a flat JSON
//! array. Writes overwrite atomically; last writer wins, there is no
//! versioning or expiry. Read failures are treated as "no mirror".
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::feed::FeedEntry;

/// Storage key of the mirror (file stem inside the config directory).
pub const CACHE_KEY: &str = "feriaData";

/// Mirror files above this size are ignored rather than parsed.
const MAX_MIRROR_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct CacheMirror {
    path: Option<PathBuf>,
}

impl CacheMirror {
    /// Mirror stored as `<dir>/feriaData.json`.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: Some(dir.join(format!("{}.json", CACHE_KEY))),
        }
    }

    /// A mirror that never yields entries and never writes.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Read the mirrored entries.
    ///
    /// Returns `None` when the mirror is disabled, missing, empty, oversized
    /// or not valid JSON.
    pub fn read(&self) -> Option<Vec<FeedEntry>> {
        let path = self.path.as_deref()?;

        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > MAX_MIRROR_SIZE => {
                tracing::warn!(
                    path = %path.display(),
                    size = meta.len(),
                    "Cache mirror too large, ignoring"
                );
                return None;
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No cache mirror");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to stat cache mirror");
                return None;
            }
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read cache mirror");
                return None;
            }
        };

        match serde_json::from_str::<Vec<FeedEntry>>(&content) {
            Ok(entries) if entries.is_empty() => {
                tracing::debug!(path = %path.display(), "Cache mirror is empty");
                None
            }
            Ok(entries) => {
                tracing::debug!(path = %path.display(), entries = entries.len(), "Read cache mirror");
                Some(entries)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cache mirror is not valid JSON, ignoring");
                None
            }
        }
    }

    /// Overwrite the mirror with `entries`. Empty lists are never written.
    ///
    /// Fire-and-forget: failures are logged and otherwise ignored.
    pub fn write(&self, entries: &[FeedEntry]) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        if entries.is_empty() {
            return;
        }

        if let Err(e) = write_atomic(path, entries) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write cache mirror");
        }
    }

    /// Delete the mirror so the next load goes to the source.
    pub fn clear(&self) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        match std::fs::remove_file(path) {
            Ok(()) => tracing::info!(path = %path.display(), "Cleared cache mirror"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to clear cache mirror")
            }
        }
    }
}

/// Serialize and write with the write-to-temp-then-rename pattern, so a
/// reader never sees a half-written mirror.
fn write_atomic(path: &Path, entries: &[FeedEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }

    let json = serde_json::to_vec(entries).context("Failed to serialize entries")?;

    // Randomized suffix so a stale temp file from a crashed run never collides.
    use std::time::{SystemTime, UNIX_EPOCH};
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", suffix));

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| format!("Failed to create temporary file '{}'", temp_path.display()))?;

    temp_file.write_all(&json).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!("Failed to write '{}'", temp_path.display())
    })?;
    temp_file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!("Failed to sync '{}'", temp_path.display())
    })?;
    drop(temp_file);

    // On Windows, rename fails if the destination exists
    #[cfg(windows)]
    if path.exists() {
        std::fs::remove_file(path).with_context(|| {
            let _ = std::fs::remove_file(&temp_path);
            format!("Failed to replace '{}'", path.display())
        })?;
    }

    std::fs::rename(&temp_path, path).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}'",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("feria_mirror_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn entry(title: &str, expanded: bool) -> FeedEntry {
        FeedEntry {
            title: title.to_string(),
            body: "cuerpo".to_string(),
            image: "/img.png".to_string(),
            credits: "autor".to_string(),
            is_expanded: expanded,
            requires_expand: true,
        }
    }

    #[test]
    fn test_path_uses_fixed_key() {
        let mirror = CacheMirror::new(Path::new("/tmp/feria"));
        assert_eq!(
            mirror.path(),
            Some(Path::new("/tmp/feria/feriaData.json"))
        );
    }

    #[test]
    fn test_missing_file_reads_none() {
        let dir = temp_dir("missing");
        assert!(CacheMirror::new(&dir).read().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_then_read_preserves_flags_and_order() {
        let dir = temp_dir("write_read");
        let mirror = CacheMirror::new(&dir);
        let entries = vec![entry("uno", true), entry("dos", false)];

        mirror.write(&entries);

        assert_eq!(mirror.read(), Some(entries));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_list_is_not_written() {
        let dir = temp_dir("empty_write");
        let mirror = CacheMirror::new(&dir);
        mirror.write(&[entry("uno", false)]);
        mirror.write(&[]);

        // Previous content survives
        assert_eq!(mirror.read().map(|e| e.len()), Some(1));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_last_write_wins() {
        let dir = temp_dir("last_wins");
        let mirror = CacheMirror::new(&dir);
        mirror.write(&[entry("viejo", false)]);
        mirror.write(&[entry("nuevo", true), entry("otro", false)]);

        let read = mirror.read().unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].title, "nuevo");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_array_reads_none() {
        let dir = temp_dir("empty_array");
        let mirror = CacheMirror::new(&dir);
        std::fs::write(mirror.path().unwrap(), "[]").unwrap();
        assert!(mirror.read().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_file_reads_none() {
        let dir = temp_dir("corrupt");
        let mirror = CacheMirror::new(&dir);
        std::fs::write(mirror.path().unwrap(), "{not json").unwrap();
        assert!(mirror.read().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_reads_camel_case_written_by_browser() {
        let dir = temp_dir("camel");
        let mirror = CacheMirror::new(&dir);
        std::fs::write(
            mirror.path().unwrap(),
            r#"[{"title":"A","body":"b","image":"a.png","credits":"c","isExpanded":true,"requiresExpand":true}]"#,
        )
        .unwrap();
        let read = mirror.read().unwrap();
        assert!(read[0].is_expanded);
        assert!(read[0].requires_expand);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = temp_dir("clear");
        let mirror = CacheMirror::new(&dir);
        mirror.write(&[entry("uno", false)]);
        mirror.clear();
        assert!(mirror.read().is_none());
        // Clearing twice is harmless
        mirror.clear();
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_disabled_mirror_is_inert() {
        let mirror = CacheMirror::disabled();
        assert!(!mirror.is_enabled());
        mirror.write(&[entry("uno", false)]);
        assert!(mirror.read().is_none());
        assert!(mirror.path().is_none());
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let dir = temp_dir("nested").join("a").join("b");
        let mirror = CacheMirror::new(&dir);
        mirror.write(&[entry("uno", false)]);
        assert!(mirror.read().is_some());
        std::fs::remove_dir_all(std::env::temp_dir().join("feria_mirror_test_nested")).ok();
    }
}
