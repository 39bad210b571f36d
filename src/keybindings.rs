//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are data, not match arms, so users can remap them from the
//! `[keybindings]` table in config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NavLeft,
    NavRight,
    ToggleExpand,
    OpenImage,
    CloseOverlay,
    OpenExternal,
    Reload,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Select card below",
            Self::NavUp => "Select card above",
            Self::NavLeft => "Select previous card",
            Self::NavRight => "Select next card",
            Self::ToggleExpand => "Show more / show less",
            Self::OpenImage => "Enlarge image",
            Self::CloseOverlay => "Close image",
            Self::OpenExternal => "Open image in system viewer",
            Self::Reload => "Clear cache and reload feed",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// The card grid.
    Global,
    /// The enlarged-image overlay. Modal: never falls back to Global.
    Overlay,
}

impl Context {
    /// Heading used in the help table.
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Gallery",
            Self::Overlay => "Image overlay",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "?"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Left", "Right", "Space"
/// - Modifier combos: "Ctrl+q"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    if let Some(num) = s.strip_prefix(['F', 'f']) {
        if let Ok(n) = num.parse::<u8>() {
            return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts (`q`
/// quits from the grid but only closes the overlay).
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.retain(|(ctx, k, _)| !(*ctx == context && *k == key));
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use KeyCode::*;

        // === Card grid ===
        let global = [
            (KeySpec::plain(Char('q')), Action::Quit),
            (KeySpec::ctrl('c'), Action::Quit),
            (KeySpec::plain(Char('j')), Action::NavDown),
            (KeySpec::plain(Down), Action::NavDown),
            (KeySpec::plain(Char('k')), Action::NavUp),
            (KeySpec::plain(Up), Action::NavUp),
            (KeySpec::plain(Char('h')), Action::NavLeft),
            (KeySpec::plain(Left), Action::NavLeft),
            (KeySpec::plain(Char('l')), Action::NavRight),
            (KeySpec::plain(Right), Action::NavRight),
            (KeySpec::plain(Char(' ')), Action::ToggleExpand),
            (KeySpec::plain(Enter), Action::OpenImage),
            (KeySpec::plain(Char('i')), Action::OpenImage),
            (KeySpec::plain(Char('o')), Action::OpenExternal),
            (KeySpec::plain(Char('r')), Action::Reload),
            (KeySpec::plain(Char('t')), Action::CycleTheme),
            (KeySpec::plain(Char('?')), Action::ShowHelp),
        ];
        for (key, action) in global {
            self.bind(Context::Global, key, action);
        }

        // === Image overlay ===
        let overlay = [
            (KeySpec::plain(Esc), Action::CloseOverlay),
            (KeySpec::plain(Char('x')), Action::CloseOverlay),
            (KeySpec::plain(Char('q')), Action::CloseOverlay),
            (KeySpec::plain(Enter), Action::CloseOverlay),
            (KeySpec::plain(Char('o')), Action::OpenExternal),
            (KeySpec::ctrl('c'), Action::Quit),
        ];
        for (key, action) in overlay {
            self.bind(Context::Overlay, key, action);
        }
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "toggle_expand").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). The new key
    /// replaces every existing binding of that action, in each context the
    /// action was bound in.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                if let Some(displaced) = self.lookup.get(&(ctx, key)).copied() {
                    warnings.push(format!(
                        "Key '{}' for '{}' replaces '{}' in {} context",
                        key_str,
                        action_name,
                        displaced.describe(),
                        ctx.label()
                    ));
                }
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Overlay lookups are modal; nothing from the grid leaks through.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        // Shifted punctuation ('?') arrives with SHIFT set on some terminals
        let modifiers = match code {
            KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        self.lookup
            .get(&(context, KeySpec::new(code, modifiers)))
            .copied()
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "nav_left" | "navleft" | "left" => Some(Action::NavLeft),
        "nav_right" | "navright" | "right" => Some(Action::NavRight),
        "toggle_expand" | "toggleexpand" | "toggle" => Some(Action::ToggleExpand),
        "open_image" | "openimage" | "enlarge" => Some(Action::OpenImage),
        "close_overlay" | "closeoverlay" | "close" => Some(Action::CloseOverlay),
        "open_external" | "openexternal" | "open" => Some(Action::OpenExternal),
        "reload" | "refresh" => Some(Action::Reload),
        "cycle_theme" | "cycletheme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(reg: &KeybindingRegistry, code: KeyCode, ctx: Context) -> Option<Action> {
        reg.action_for_key(code, KeyModifiers::NONE, ctx)
    }

    #[test]
    fn test_default_registry_has_quit() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            lookup(&reg, KeyCode::Char('q'), Context::Global),
            Some(Action::Quit)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('c'), KeyModifiers::CONTROL, Context::Global),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_default_nav_keys() {
        let reg = KeybindingRegistry::new();
        let cases = [
            (KeyCode::Char('j'), Action::NavDown),
            (KeyCode::Down, Action::NavDown),
            (KeyCode::Char('k'), Action::NavUp),
            (KeyCode::Up, Action::NavUp),
            (KeyCode::Char('h'), Action::NavLeft),
            (KeyCode::Left, Action::NavLeft),
            (KeyCode::Char('l'), Action::NavRight),
            (KeyCode::Right, Action::NavRight),
        ];
        for (code, action) in cases {
            assert_eq!(lookup(&reg, code, Context::Global), Some(action));
        }
    }

    #[test]
    fn test_gallery_actions() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            lookup(&reg, KeyCode::Char(' '), Context::Global),
            Some(Action::ToggleExpand)
        );
        assert_eq!(
            lookup(&reg, KeyCode::Enter, Context::Global),
            Some(Action::OpenImage)
        );
        assert_eq!(
            lookup(&reg, KeyCode::Char('i'), Context::Global),
            Some(Action::OpenImage)
        );
        assert_eq!(
            lookup(&reg, KeyCode::Char('r'), Context::Global),
            Some(Action::Reload)
        );
    }

    #[test]
    fn test_overlay_close_keys() {
        let reg = KeybindingRegistry::new();
        for code in [
            KeyCode::Esc,
            KeyCode::Char('x'),
            KeyCode::Char('q'),
            KeyCode::Enter,
        ] {
            assert_eq!(
                lookup(&reg, code, Context::Overlay),
                Some(Action::CloseOverlay),
                "{:?}",
                code
            );
        }
    }

    #[test]
    fn test_overlay_is_modal() {
        let reg = KeybindingRegistry::new();
        // Grid bindings do not leak into the overlay
        assert_eq!(lookup(&reg, KeyCode::Char('j'), Context::Overlay), None);
        assert_eq!(lookup(&reg, KeyCode::Char(' '), Context::Overlay), None);
        // But Ctrl+c still quits
        assert_eq!(
            reg.action_for_key(KeyCode::Char('c'), KeyModifiers::CONTROL, Context::Overlay),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_shifted_char_matches() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('?'), KeyModifiers::SHIFT, Context::Global),
            Some(Action::ShowHelp)
        );
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, KeyCode::F(12), Context::Global), None);
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("toggle_expand".to_string(), "m".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());

        assert_eq!(lookup(&reg, KeyCode::Char(' '), Context::Global), None);
        assert_eq!(
            lookup(&reg, KeyCode::Char('m'), Context::Global),
            Some(Action::ToggleExpand)
        );
    }

    #[test]
    fn test_override_preserves_contexts() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+q".to_string());
        assert!(reg.apply_overrides(&overrides).is_empty());

        // Quit lived in both contexts, so the new key works in both
        for ctx in [Context::Global, Context::Overlay] {
            assert_eq!(
                reg.action_for_key(KeyCode::Char('q'), KeyModifiers::CONTROL, ctx),
                Some(Action::Quit)
            );
        }
        assert_eq!(lookup(&reg, KeyCode::Char('q'), Context::Global), None);
        // The overlay's own 'q' (close) is untouched
        assert_eq!(
            lookup(&reg, KeyCode::Char('q'), Context::Overlay),
            Some(Action::CloseOverlay)
        );
    }

    #[test]
    fn test_override_onto_taken_key_displaces_old_binding() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("toggle_expand".to_string(), "q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("replaces"));

        assert_eq!(
            lookup(&reg, KeyCode::Char('q'), Context::Global),
            Some(Action::ToggleExpand)
        );
        // The help table only lists bindings that actually fire
        let q = format_key(&KeySpec::plain(KeyCode::Char('q')));
        let listed: Vec<Action> = reg
            .all_bindings()
            .into_iter()
            .filter(|(ctx, key, _, _)| *ctx == Context::Global && *key == q)
            .map(|(_, _, action, _)| action)
            .collect();
        assert_eq!(listed, vec![Action::ToggleExpand]);
        // Quit keeps its other key
        assert_eq!(
            reg.action_for_key(KeyCode::Char('c'), KeyModifiers::CONTROL, Context::Global),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_apply_overrides_unknown_action() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("nonexistent_action".to_string(), "q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Unknown action"));
    }

    #[test]
    fn test_apply_overrides_bad_key() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+Alt+Shift+Q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Cannot parse key"));
    }

    #[test]
    fn test_parse_key_string_named_keys() {
        assert_eq!(
            parse_key_string("Enter"),
            Some(KeySpec::plain(KeyCode::Enter))
        );
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(
            parse_key_string("space"),
            Some(KeySpec::plain(KeyCode::Char(' ')))
        );
    }

    #[test]
    fn test_parse_key_string_function_keys() {
        assert_eq!(parse_key_string("F1"), Some(KeySpec::plain(KeyCode::F(1))));
        assert_eq!(
            parse_key_string("F12"),
            Some(KeySpec::plain(KeyCode::F(12)))
        );
        assert_eq!(parse_key_string("F0"), None);
        assert_eq!(parse_key_string("F13"), None);
        // A lone 'f' is a plain character
        assert_eq!(
            parse_key_string("f"),
            Some(KeySpec::plain(KeyCode::Char('f')))
        );
    }

    #[test]
    fn test_parse_key_string_ctrl_and_chars() {
        assert_eq!(parse_key_string("Ctrl+d"), Some(KeySpec::ctrl('d')));
        assert_eq!(
            parse_key_string("ñ"),
            Some(KeySpec::plain(KeyCode::Char('ñ')))
        );
        assert_eq!(parse_key_string("qq"), None);
    }

    #[test]
    fn test_parse_action_name_aliases() {
        assert_eq!(parse_action_name("toggle"), Some(Action::ToggleExpand));
        assert_eq!(parse_action_name("Close"), Some(Action::CloseOverlay));
        assert_eq!(parse_action_name("refresh"), Some(Action::Reload));
        assert_eq!(parse_action_name("star"), None);
    }

    #[test]
    fn test_all_bindings_cover_both_contexts() {
        let reg = KeybindingRegistry::new();
        let bindings = reg.all_bindings();
        assert!(bindings.iter().any(|(c, ..)| *c == Context::Global));
        assert!(bindings.iter().any(|(c, ..)| *c == Context::Overlay));
        assert!(bindings
            .iter()
            .any(|(_, key, action, _)| key == "Space" && *action == Action::ToggleExpand));
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Char('q'))), "q");
        assert_eq!(format_key(&KeySpec::ctrl('c')), "Ctrl+c");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Enter)), "Enter");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }
}
