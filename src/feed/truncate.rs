//! Truncation policy shared by the "needs a toggle" decision and the
//! collapsed excerpt, so the two can never disagree.

use std::borrow::Cow;
use std::fmt;

/// Marker appended to a collapsed excerpt.
pub const ELLIPSIS: &str = "...";

/// Character threshold of the current page revision.
pub const DEFAULT_CHAR_LIMIT: usize = 150;

/// Word threshold of the legacy revision (an assumed visible-line budget).
pub const DEFAULT_WORD_LIMIT: usize = 30;

/// How long a body may be before it is collapsed behind a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationPolicy {
    /// More than `limit` characters (Unicode scalar values) requires a toggle.
    Chars { limit: usize },
    /// More than `limit` whitespace-separated words requires a toggle.
    Words { limit: usize },
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self::Chars {
            limit: DEFAULT_CHAR_LIMIT,
        }
    }
}

impl fmt::Display for TruncationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chars { limit } => write!(f, "{} chars", limit),
            Self::Words { limit } => write!(f, "{} words", limit),
        }
    }
}

impl TruncationPolicy {
    /// Build a policy from its config name ("chars" / "words") and an
    /// optional limit. Returns `None` for an unknown name.
    pub fn from_name(name: &str, limit: Option<usize>) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "chars" | "characters" => Some(Self::Chars {
                limit: limit.unwrap_or(DEFAULT_CHAR_LIMIT),
            }),
            "words" => Some(Self::Words {
                limit: limit.unwrap_or(DEFAULT_WORD_LIMIT),
            }),
            _ => None,
        }
    }

    /// Whether `body` is long enough to need a "show more" toggle.
    pub fn requires_expand(&self, body: &str) -> bool {
        self.cut_point(body).is_some()
    }

    /// The collapsed form of `body`.
    ///
    /// Bodies within the limit are returned unchanged. Longer bodies are cut to
    /// a strict prefix and followed by [`ELLIPSIS`].
    pub fn collapse<'a>(&self, body: &'a str) -> Cow<'a, str> {
        match self.cut_point(body) {
            Some(cut) => Cow::Owned(format!("{}{}", &body[..cut], ELLIPSIS)),
            None => Cow::Borrowed(body),
        }
    }

    /// Collapsed form of a body already flagged as needing a toggle.
    ///
    /// Always a strict prefix followed by [`ELLIPSIS`], even when this policy
    /// would let the body through whole. Flags read back from the mirror may
    /// have been derived under a different policy.
    pub fn excerpt<'a>(&self, body: &'a str) -> Cow<'a, str> {
        let cut = self
            .cut_point(body)
            .unwrap_or_else(|| self.fallback_cut_point(body));
        Cow::Owned(format!("{}{}", &body[..cut], ELLIPSIS))
    }

    /// Proper-prefix cut for a body this policy considers short enough.
    fn fallback_cut_point(&self, body: &str) -> usize {
        let chars = body.chars().count();
        let keep = match *self {
            Self::Chars { limit } => limit.min(chars.saturating_sub(1)),
            Self::Words { .. } => {
                let words = body.split_whitespace().count();
                if words > 1 {
                    if let Some(cut) = word_cut_point(body, words - 1) {
                        return cut;
                    }
                }
                chars.saturating_sub(1)
            }
        };
        body.char_indices().nth(keep).map_or(0, |(idx, _)| idx)
    }

    /// Byte offset where the collapsed prefix ends, or `None` if the body fits.
    fn cut_point(&self, body: &str) -> Option<usize> {
        match *self {
            Self::Chars { limit } => body.char_indices().nth(limit).map(|(idx, _)| idx),
            Self::Words { limit } => word_cut_point(body, limit),
        }
    }
}

/// End of the `limit`-th word, if a further word follows it.
fn word_cut_point(body: &str, limit: usize) -> Option<usize> {
    let mut words = 0;
    let mut in_word = false;
    let mut last_word_end = 0;

    for (idx, c) in body.char_indices() {
        if c.is_whitespace() {
            if in_word {
                in_word = false;
                last_word_end = idx;
            }
        } else if !in_word {
            in_word = true;
            words += 1;
            if words > limit {
                return Some(last_word_end);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CHARS: TruncationPolicy = TruncationPolicy::Chars { limit: 150 };

    #[test]
    fn test_default_is_150_chars() {
        assert_eq!(TruncationPolicy::default(), CHARS);
    }

    #[test]
    fn test_chars_threshold_boundary() {
        assert!(!CHARS.requires_expand(&"x".repeat(150)));
        assert!(CHARS.requires_expand(&"x".repeat(151)));
        assert!(!CHARS.requires_expand(""));
    }

    #[test]
    fn test_chars_collapse_200() {
        let body = "x".repeat(200);
        let shown = CHARS.collapse(&body);
        assert_eq!(shown, format!("{}...", "x".repeat(150)));
    }

    #[test]
    fn test_chars_counts_scalars_not_bytes() {
        // 150 two-byte characters still fit
        let body = "ñ".repeat(150);
        assert!(!CHARS.requires_expand(&body));
        let longer = "ñ".repeat(151);
        assert_eq!(CHARS.collapse(&longer), format!("{}...", "ñ".repeat(150)));
    }

    #[test]
    fn test_short_body_not_collapsed() {
        let shown = CHARS.collapse("corto");
        assert!(matches!(shown, Cow::Borrowed("corto")));
    }

    #[test]
    fn test_words_threshold() {
        let policy = TruncationPolicy::Words { limit: 3 };
        assert!(!policy.requires_expand("uno dos tres"));
        assert!(!policy.requires_expand("  uno   dos tres  "));
        assert!(policy.requires_expand("uno dos tres cuatro"));
    }

    #[test]
    fn test_words_collapse_keeps_original_spacing() {
        let policy = TruncationPolicy::Words { limit: 2 };
        assert_eq!(policy.collapse("uno   dos\ttres"), "uno   dos...");
    }

    #[test]
    fn test_zero_limit_collapses_to_ellipsis() {
        let policy = TruncationPolicy::Words { limit: 0 };
        assert_eq!(policy.collapse("algo"), "...");
        let policy = TruncationPolicy::Chars { limit: 0 };
        assert_eq!(policy.collapse("algo"), "...");
        assert!(!policy.requires_expand(""));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(TruncationPolicy::from_name("chars", None), Some(CHARS));
        assert_eq!(
            TruncationPolicy::from_name("Words", None),
            Some(TruncationPolicy::Words { limit: 30 })
        );
        assert_eq!(
            TruncationPolicy::from_name("words", Some(12)),
            Some(TruncationPolicy::Words { limit: 12 })
        );
        assert_eq!(TruncationPolicy::from_name("lines", None), None);
    }

    #[test]
    fn test_excerpt_cuts_body_the_policy_lets_through() {
        // 31 words, 61 chars: too long for 30 words, short for 150 chars
        let body = vec!["a"; 31].join(" ");
        assert!(!CHARS.requires_expand(&body));

        let shown = CHARS.excerpt(&body);
        let prefix = shown.strip_suffix(ELLIPSIS).expect("ellipsis present");
        assert_eq!(prefix, &body[..60]);
    }

    #[test]
    fn test_excerpt_words_fallback_drops_last_word() {
        let policy = TruncationPolicy::Words { limit: 30 };
        assert_eq!(policy.excerpt("uno dos  tres"), "uno dos...");
        assert_eq!(policy.excerpt("palabra"), "palabr...");
        assert_eq!(policy.excerpt(""), "...");
    }

    #[test]
    fn test_excerpt_matches_collapse_when_policy_cuts() {
        let body = "x".repeat(200);
        assert_eq!(CHARS.excerpt(&body), CHARS.collapse(&body));
    }

    fn policies() -> impl Strategy<Value = TruncationPolicy> {
        prop_oneof![
            (0usize..200).prop_map(|limit| TruncationPolicy::Chars { limit }),
            (0usize..40).prop_map(|limit| TruncationPolicy::Words { limit }),
        ]
    }

    proptest! {
        #[test]
        fn collapsed_text_is_strict_prefix_plus_ellipsis(
            body in "[a-zA-Z áéñ\\n]{0,400}",
            policy in policies(),
        ) {
            let shown = policy.collapse(&body);
            if policy.requires_expand(&body) {
                let prefix = shown.strip_suffix(ELLIPSIS).expect("ellipsis present");
                prop_assert!(body.starts_with(prefix));
                prop_assert!(prefix.len() < body.len());
            } else {
                prop_assert_eq!(&*shown, body.as_str());
            }
        }

        #[test]
        fn excerpt_is_always_strict_prefix_plus_ellipsis(
            body in "[a-zA-Z áéñ\\n]{1,400}",
            policy in policies(),
        ) {
            let shown = policy.excerpt(&body);
            let prefix = shown.strip_suffix(ELLIPSIS).expect("ellipsis present");
            prop_assert!(body.starts_with(prefix));
            prop_assert!(prefix.len() < body.len());
        }

        #[test]
        fn chars_policy_matches_char_count(body in "\\PC{0,300}", limit in 0usize..300) {
            let policy = TruncationPolicy::Chars { limit };
            prop_assert_eq!(policy.requires_expand(&body), body.chars().count() > limit);
        }
    }
}
