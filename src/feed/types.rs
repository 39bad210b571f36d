use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;

use super::truncate::TruncationPolicy;

// ============================================================================
// Raw Entry
// ============================================================================

/// One record exactly as it appears in the static feed.
///
/// The feed is not validated: missing or `null` fields become empty strings
/// and non-string values are kept as their JSON text, so a malformed record
/// renders as blank or garbled fields instead of failing the whole load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub body: String,
    #[serde(deserialize_with = "lenient_string")]
    pub image: String,
    #[serde(deserialize_with = "lenient_string")]
    pub credits: String,
}

impl RawEntry {
    /// Convert any JSON value into a record. Non-objects yield a blank record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            other => {
                tracing::debug!(kind = %json_kind(&other), "Feed record is not an object");
                Self::default()
            }
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Feed Entry
// ============================================================================

/// A displayable record decorated with its view flags.
///
/// Serialized with camelCase keys; this is the shape stored in the cache
/// mirror, so `isExpanded` survives between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedEntry {
    pub title: String,
    pub body: String,
    pub image: String,
    pub credits: String,
    /// Whether the full body is currently shown.
    pub is_expanded: bool,
    /// Fixed at load time from the body and the truncation policy.
    pub requires_expand: bool,
}

impl FeedEntry {
    /// Decorate a raw record: collapsed, with `requires_expand` derived once.
    pub fn decorate(raw: RawEntry, policy: &TruncationPolicy) -> Self {
        let requires_expand = policy.requires_expand(&raw.body);
        Self {
            title: raw.title,
            body: raw.body,
            image: raw.image,
            credits: raw.credits,
            is_expanded: false,
            requires_expand,
        }
    }

    /// Body text as it should currently be displayed.
    pub fn display_body(&self, policy: &TruncationPolicy) -> Cow<'_, str> {
        if self.is_expanded || !self.requires_expand {
            Cow::Borrowed(&self.body)
        } else {
            policy.excerpt(&self.body)
        }
    }

    /// Label for the toggle button, or `None` when the card has no button.
    pub fn toggle_label<'a>(&self, labels: &'a ToggleLabels) -> Option<&'a str> {
        if !self.requires_expand {
            return None;
        }
        Some(if self.is_expanded {
            labels.show_less.as_str()
        } else {
            labels.show_more.as_str()
        })
    }
}

/// Decorate every raw record, preserving source order.
pub fn decorate(raw: Vec<RawEntry>, policy: &TruncationPolicy) -> Vec<FeedEntry> {
    raw.into_iter()
        .map(|entry| FeedEntry::decorate(entry, policy))
        .collect()
}

/// Button captions for the expand toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleLabels {
    pub show_more: String,
    pub show_less: String,
}

impl Default for ToggleLabels {
    fn default() -> Self {
        Self {
            show_more: "Ver más".to_string(),
            show_less: "Ver menos".to_string(),
        }
    }
}
