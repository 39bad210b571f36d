use crate::config::Config;
use crate::feed::{
    build_client, FeedEntry, FeedSource, LoadError, LoadOrigin, LoadedFeed, ToggleLabels,
    TruncationPolicy,
};
use crate::gallery::{Gallery, Overlay};
use crate::keybindings::{Context as KbContext, KeybindingRegistry};
use crate::storage::CacheMirror;
use crate::theme::{StyleMap, ThemeVariant};
use anyhow::Result;
use chrono::Datelike;
use ratatui::layout::Rect;
use ratatui::style::Style;
use std::borrow::Cow;
use tokio::time::Instant;

/// How long a status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

/// Caption of the enlarged-image panel.
pub const OVERLAY_TITLE: &str = "Imagen expandida";

/// Progress of the current feed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No load started yet.
    Idle,
    Loading,
    Loaded(LoadOrigin),
    /// The last load failed; whatever was shown before stays.
    Failed,
}

/// A clickable region recorded during the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The image line of card `i`.
    Image(usize),
    /// The show more / show less label of card `i`.
    Toggle(usize),
    /// Anywhere else on card `i`.
    Card(usize),
}

/// Events from background tasks
pub enum AppEvent {
    /// A feed load finished.
    ///
    /// `generation` is the value of `App::load_generation` when the load was
    /// spawned; results from superseded loads are dropped.
    FeedLoaded {
        generation: u64,
        result: Result<LoadedFeed, LoadError>,
    },
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub http_client: reqwest::Client,
    pub source: FeedSource,
    pub mirror: CacheMirror,
    pub policy: TruncationPolicy,
    pub labels: ToggleLabels,

    // Page text
    pub title: String,
    pub subtitle: String,
    pub footer: String,

    // Theme
    pub theme_variant: ThemeVariant,
    /// Active style map for all UI rendering.
    pub theme: StyleMap,

    pub keybindings: KeybindingRegistry,

    /// Entries plus overlay target. Every page-state change goes through here.
    pub gallery: Gallery,
    pub load_state: LoadState,

    // Grid state
    pub selected: usize,
    /// First card row drawn at the top of the grid.
    pub scroll_row: usize,
    /// Columns used by the last frame.
    pub columns: usize,
    /// Clickable regions from the last frame, in draw order.
    pub click_targets: Vec<(Rect, ClickTarget)>,

    /// Status message with expiry. Cow avoids allocation for static literals
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    /// Whether the help overlay is currently displayed.
    pub show_help: bool,
    /// Scroll offset in the help screen for long keybinding lists.
    pub help_scroll_offset: usize,

    /// Generation counter for feed loads.
    ///
    /// Incremented each time a load is spawned. A `FeedLoaded` event whose
    /// generation does not match is ignored, so a slow initial load cannot
    /// overwrite the result of a later reload.
    pub load_generation: u64,

    /// Handle to the in-flight load task. Aborted when a new load starts and
    /// when the app is dropped.
    pub load_handle: Option<tokio::task::JoinHandle<()>>,
}

impl App {
    pub fn new(config: &Config, source: FeedSource, mirror: CacheMirror) -> Result<Self> {
        let http_client = build_client()?;
        let policy = config.truncation_policy()?;

        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        });

        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!("{}", warning);
        }

        Ok(Self {
            http_client,
            source,
            mirror,
            policy,
            labels: config.toggle_labels(),
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            footer: config.footer.clone(),
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            keybindings,
            gallery: Gallery::new(),
            load_state: LoadState::Idle,
            selected: 0,
            scroll_row: 0,
            columns: 1,
            click_targets: Vec::new(),
            status_message: None,
            needs_redraw: true,
            show_help: false,
            help_scroll_offset: 0,
            load_generation: 0,
            load_handle: None,
        })
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant. Returns its name for status display.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    /// Keybinding context for the current screen.
    pub fn key_context(&self) -> KbContext {
        if self.gallery.overlay().is_open() {
            KbContext::Overlay
        } else {
            KbContext::Global
        }
    }

    /// `© <year> <footer>`.
    pub fn footer_text(&self) -> String {
        format!("© {} {}", chrono::Local::now().year(), self.footer)
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Start a new load generation, aborting any load still in flight.
    ///
    /// Returns the generation the caller must tag its result with.
    pub fn begin_load(&mut self) -> u64 {
        if let Some(handle) = self.load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted previous feed load");
        }
        self.load_generation = self.load_generation.wrapping_add(1);
        self.load_state = LoadState::Loading;
        self.needs_redraw = true;
        self.load_generation
    }

    /// Drop the mirror so the next load reads the source again.
    pub fn prepare_reload(&mut self) {
        self.mirror.clear();
        self.gallery.close_image();
        tracing::info!(source = %self.source, "Reloading feed");
    }

    /// Adopt the outcome of a load.
    ///
    /// Returns `false` if the result belongs to a superseded load and was
    /// discarded. A failed load is logged and leaves the current entries
    /// alone (an empty grid on first mount).
    pub fn apply_load_result(
        &mut self,
        generation: u64,
        result: Result<LoadedFeed, LoadError>,
    ) -> bool {
        if generation != self.load_generation {
            tracing::debug!(
                generation,
                current = self.load_generation,
                "Discarding stale feed load"
            );
            return false;
        }
        self.load_handle = None;
        self.needs_redraw = true;

        match result {
            Ok(loaded) => {
                let count = loaded.entries.len();
                self.gallery.replace_entries(loaded.entries);
                self.load_state = LoadState::Loaded(loaded.origin);
                self.clamp_selection();
                self.persist();
                match loaded.origin {
                    LoadOrigin::Cache => self.set_status(format!("{} entries (cached)", count)),
                    LoadOrigin::Source => self.set_status(format!("{} entries", count)),
                }
            }
            Err(e) => {
                tracing::error!(source = %self.source, error = %e, "Error loading feed");
                self.load_state = LoadState::Failed;
            }
        }
        true
    }

    /// Mirror the current entry list. Empty lists are never written.
    fn persist(&self) {
        self.mirror.write(self.gallery.entries());
    }

    // ------------------------------------------------------------------------
    // Gallery actions
    // ------------------------------------------------------------------------

    pub fn selected_entry(&self) -> Option<&FeedEntry> {
        self.gallery.get(self.selected)
    }

    /// Flip "show more" on card `index`.
    ///
    /// Cards without a toggle label are left alone. Returns whether the list
    /// changed.
    pub fn toggle_at(&mut self, index: usize) -> bool {
        let has_toggle = self
            .gallery
            .get(index)
            .is_some_and(|entry| entry.requires_expand);
        if !has_toggle || !self.gallery.toggle_expand(index) {
            return false;
        }
        self.persist();
        self.needs_redraw = true;
        true
    }

    pub fn toggle_selected(&mut self) -> bool {
        self.toggle_at(self.selected)
    }

    /// Enlarge the image of card `index`.
    pub fn open_image_at(&mut self, index: usize) -> bool {
        let Some(image) = self.gallery.get(index).map(|e| e.image.clone()) else {
            return false;
        };
        tracing::debug!(index, image = %image, "Opening image overlay");
        self.gallery.open_image(image);
        self.needs_redraw = true;
        true
    }

    pub fn open_selected_image(&mut self) -> bool {
        self.open_image_at(self.selected)
    }

    pub fn close_overlay(&mut self) {
        if self.gallery.overlay().is_open() {
            self.gallery.close_image();
            self.needs_redraw = true;
        }
    }

    /// The image `o` hands to the system viewer: the overlay image if one is
    /// open, else the selected card's. Resolved against the feed source.
    pub fn external_image_target(&self) -> Option<String> {
        let image = match self.gallery.overlay() {
            Overlay::Open(image) => image.as_str(),
            Overlay::Closed => self.selected_entry()?.image.as_str(),
        };
        let resolved = self.source.resolve_image(image);
        (!resolved.is_empty()).then_some(resolved)
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn nav_down(&mut self) {
        let next = self.selected.saturating_add(self.columns.max(1));
        if next < self.gallery.len() {
            self.selected = next;
        }
    }

    pub fn nav_up(&mut self) {
        let columns = self.columns.max(1);
        if self.selected >= columns {
            self.selected -= columns;
        }
    }

    pub fn nav_left(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn nav_right(&mut self) {
        if self.selected + 1 < self.gallery.len() {
            self.selected += 1;
        }
    }

    /// Keep `selected` inside the entry list.
    pub fn clamp_selection(&mut self) {
        let max = self.gallery.len().saturating_sub(1);
        self.selected = self.selected.min(max);
    }

    /// Card hit by a click at (`column`, `row`) in the last frame.
    pub fn click_target_at(&self, column: u16, row: u16) -> Option<ClickTarget> {
        // Later regions are drawn on top, so search back to front
        self.click_targets
            .iter()
            .rev()
            .find(|(rect, _)| {
                column >= rect.x
                    && column < rect.x.saturating_add(rect.width)
                    && row >= rect.y
                    && row < rect.y.saturating_add(rect.height)
            })
            .map(|(_, target)| *target)
    }

    // ------------------------------------------------------------------------
    // Status bar
    // ------------------------------------------------------------------------

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// The load task never outlives the page.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted feed load task on App drop");
        }
    }
}
