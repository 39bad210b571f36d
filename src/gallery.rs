//! Gallery controller: the page's entry list and image overlay.
//!
//! All view-state changes go through [`Gallery::toggle_expand`],
//! [`Gallery::open_image`] and [`Gallery::close_image`]. The entry list is
//! never edited in place; every change swaps in a new list, so anything
//! holding the previous `Arc` can tell it changed.
use std::sync::Arc;

use crate::feed::FeedEntry;

/// The enlarged-image overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    Closed,
    /// Showing exactly one image reference.
    Open(String),
}

impl Overlay {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// The image currently shown, if any.
    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Open(image) => Some(image),
            Self::Closed => None,
        }
    }
}

/// Page-lifetime state: entries in source order plus the overlay target.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    entries: Arc<Vec<FeedEntry>>,
    overlay: Overlay,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<FeedEntry>) -> Self {
        Self {
            entries: Arc::new(entries),
            overlay: Overlay::Closed,
        }
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    /// Shared handle to the current list (changes identity on every update).
    pub fn snapshot(&self) -> Arc<Vec<FeedEntry>> {
        Arc::clone(&self.entries)
    }

    pub fn get(&self, index: usize) -> Option<&FeedEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the whole list (a completed load).
    pub fn replace_entries(&mut self, entries: Vec<FeedEntry>) {
        self.entries = Arc::new(entries);
    }

    /// Flip `is_expanded` of the entry at `index` and nothing else.
    ///
    /// Builds a new list rather than mutating the old one. Returns `false`
    /// (and leaves the list untouched) for an index past the end.
    pub fn toggle_expand(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }

        let toggled: Vec<FeedEntry> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                if i == index {
                    FeedEntry {
                        is_expanded: !entry.is_expanded,
                        ..entry.clone()
                    }
                } else {
                    entry.clone()
                }
            })
            .collect();

        self.entries = Arc::new(toggled);
        true
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Show `image` in the overlay, replacing any image already shown.
    pub fn open_image(&mut self, image: impl Into<String>) {
        self.overlay = Overlay::Open(image.into());
    }

    pub fn close_image(&mut self) {
        self.overlay = Overlay::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{decorate, RawEntry, TruncationPolicy};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn raw(title: &str, body_len: usize) -> RawEntry {
        RawEntry {
            title: title.to_string(),
            body: "x".repeat(body_len),
            image: format!("{}.png", title),
            credits: "c".to_string(),
        }
    }

    fn gallery(lens: &[usize]) -> Gallery {
        let raw = lens
            .iter()
            .enumerate()
            .map(|(i, len)| raw(&format!("e{}", i), *len))
            .collect();
        Gallery::with_entries(decorate(raw, &TruncationPolicy::default()))
    }

    #[test]
    fn test_toggle_flips_only_target() {
        let mut g = gallery(&[200, 10, 300]);
        assert!(g.toggle_expand(2));

        let flags: Vec<bool> = g.entries().iter().map(|e| e.is_expanded).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn test_toggle_produces_new_list() {
        let mut g = gallery(&[200]);
        let before = g.snapshot();
        g.toggle_expand(0);
        let after = g.snapshot();

        assert!(!Arc::ptr_eq(&before, &after));
        // The old list is untouched
        assert!(!before[0].is_expanded);
        assert!(after[0].is_expanded);
    }

    #[test]
    fn test_toggle_out_of_range_is_noop() {
        let mut g = gallery(&[200]);
        let before = g.snapshot();
        assert!(!g.toggle_expand(5));
        assert!(Arc::ptr_eq(&before, &g.snapshot()));
    }

    #[test]
    fn test_toggle_keeps_requires_expand() {
        let mut g = gallery(&[200, 10]);
        g.toggle_expand(0);
        g.toggle_expand(1);
        assert!(g.entries()[0].requires_expand);
        assert!(!g.entries()[1].requires_expand);
    }

    #[test]
    fn test_overlay_starts_closed() {
        let g = Gallery::new();
        assert_eq!(g.overlay(), &Overlay::Closed);
        assert!(g.is_empty());
    }

    #[test]
    fn test_open_replaces_previous_image() {
        let mut g = Gallery::new();
        g.open_image("a.png");
        g.open_image("b.png");
        assert_eq!(g.overlay(), &Overlay::Open("b.png".to_string()));
        assert_eq!(g.overlay().image(), Some("b.png"));
    }

    #[test]
    fn test_close_returns_to_closed() {
        let mut g = Gallery::new();
        g.open_image("a.png");
        g.close_image();
        assert!(!g.overlay().is_open());
        // Closing again stays closed
        g.close_image();
        assert_eq!(g.overlay(), &Overlay::Closed);
    }

    proptest! {
        #[test]
        fn double_toggle_restores_state(
            lens in prop::collection::vec(0usize..400, 1..12),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut g = gallery(&lens);
            let original = g.entries().to_vec();
            let i = pick.index(lens.len());

            g.toggle_expand(i);
            for (j, (now, before)) in g.entries().iter().zip(&original).enumerate() {
                prop_assert_eq!(now.requires_expand, before.requires_expand);
                if j == i {
                    prop_assert_eq!(now.is_expanded, !before.is_expanded);
                } else {
                    prop_assert_eq!(now.is_expanded, before.is_expanded);
                }
            }

            g.toggle_expand(i);
            prop_assert_eq!(g.entries(), original.as_slice());
        }

        #[test]
        fn overlay_holds_at_most_one_image(images in prop::collection::vec("[a-z]{1,8}\\.png", 1..10)) {
            let mut g = Gallery::new();
            for image in &images {
                g.open_image(image.clone());
                prop_assert_eq!(g.overlay().image(), Some(image.as_str()));
            }
            g.close_image();
            prop_assert_eq!(g.overlay(), &Overlay::Closed);
        }
    }
}
