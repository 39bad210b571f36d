//! Configuration file parser for ~/.config/feria/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning for each so
//! typos do not go unnoticed.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::feed::{ToggleLabels, TruncationPolicy};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A key parsed but holds a value we cannot use.
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed location: a file path or an http(s) URL. CLI `--source` wins.
    pub source: Option<String>,

    /// Keep a mirror of the decorated feed between sessions.
    pub cache_enabled: bool,

    /// Truncation policy name: "chars" or "words".
    pub truncation: String,

    /// Threshold for the policy (150 chars / 30 words when unset).
    pub truncation_limit: Option<usize>,

    /// Page header title.
    pub title: String,

    /// Page header subtitle.
    pub subtitle: String,

    /// Footer text, shown after "© <year>".
    pub footer: String,

    /// Toggle caption while collapsed.
    pub show_more_label: String,

    /// Toggle caption while expanded.
    pub show_less_label: String,

    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let labels = ToggleLabels::default();
        Self {
            source: None,
            cache_enabled: true,
            truncation: "chars".to_string(),
            truncation_limit: None,
            title: "Feria de Semana Santa".to_string(),
            subtitle: "Descubre todas las actividades y eventos en Yahualica, Hidalgo – 2° A"
                .to_string(),
            footer: "Telesecundaria 92, Yahualica, Hidalgo".to_string(),
            show_more_label: labels.show_more,
            show_less_label: labels.show_less,
            theme: "dark".to_string(),
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Keys recognized in the config file.
    const KNOWN_KEYS: [&'static str; 11] = [
        "source",
        "cache_enabled",
        "truncation",
        "truncation_limit",
        "title",
        "subtitle",
        "footer",
        "show_more_label",
        "show_less_label",
        "theme",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        // Surface a bad policy name at startup rather than at first load
        config.truncation_policy()?;
        tracing::info!(path = %path.display(), theme = %config.theme, "Loaded configuration");
        Ok(config)
    }

    /// The truncation policy selected by `truncation` / `truncation_limit`.
    pub fn truncation_policy(&self) -> Result<TruncationPolicy, ConfigError> {
        TruncationPolicy::from_name(&self.truncation, self.truncation_limit).ok_or_else(|| {
            ConfigError::InvalidValue {
                key: "truncation",
                reason: format!("expected \"chars\" or \"words\", got \"{}\"", self.truncation),
            }
        })
    }

    /// Toggle captions.
    pub fn toggle_labels(&self) -> ToggleLabels {
        ToggleLabels {
            show_more: self.show_more_label.clone(),
            show_less: self.show_less_label.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("feria_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.source.is_none());
        assert!(config.cache_enabled);
        assert_eq!(config.truncation, "chars");
        assert_eq!(config.title, "Feria de Semana Santa");
        assert_eq!(config.show_more_label, "Ver más");
        assert_eq!(config.show_less_label, "Ver menos");
        assert_eq!(config.theme, "dark");
        assert!(config.keybindings.is_empty());
        assert_eq!(
            config.truncation_policy().unwrap(),
            TruncationPolicy::Chars { limit: 150 }
        );
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/feria_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert!(config.cache_enabled);
        cleanup(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config("partial", "theme = \"light\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "light");
        assert!(config.cache_enabled);
        assert_eq!(config.footer, "Telesecundaria 92, Yahualica, Hidalgo");
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
source = "https://example.com/data.json"
cache_enabled = false
truncation = "words"
truncation_limit = 25
title = "Fiesta"
subtitle = "Programa"
footer = "Escuela"
show_more_label = "Show more"
show_less_label = "Show less"
theme = "light"

[keybindings]
quit = "Ctrl+q"
toggle_expand = "m"
"#;
        let path = write_config("full", content);
        let config = Config::load(&path).unwrap();

        assert_eq!(config.source.as_deref(), Some("https://example.com/data.json"));
        assert!(!config.cache_enabled);
        assert_eq!(
            config.truncation_policy().unwrap(),
            TruncationPolicy::Words { limit: 25 }
        );
        assert_eq!(config.title, "Fiesta");
        assert_eq!(
            config.toggle_labels(),
            ToggleLabels {
                show_more: "Show more".to_string(),
                show_less: "Show less".to_string(),
            }
        );
        assert_eq!(
            config.keybindings.get("toggle_expand").map(String::as_str),
            Some("m")
        );
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_truncation_policy_rejected() {
        let path = write_config("bad_policy", "truncation = \"lines\"\n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "truncation",
                ..
            }
        ));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "theme = \"dark\"\ntotally_fake_key = 1\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "dark");
        cleanup(&path);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let path = write_config("wrongtype", "cache_enabled = \"yes\"\n");
        assert!(Config::load(&path).is_err());
        cleanup(&path);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }
}
