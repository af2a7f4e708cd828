//! Keybinding registry: maps actions to key events with config overrides.
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
    First,
    Back,
    ToggleView,
    ShowBrowse,
    ShowSaved,
    Randomize,
    EnterSearch,
    ExitSearch,
    CommitSearch,
    Save,
    Read,
    Open,
    Remove,
    RefreshSaved,
    Login,
    Logout,
    CheckSession,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Next card / item",
            Self::NavUp => "Previous card / item",
            Self::First => "Jump to first card / item",
            Self::Back => "Dismiss message / go back",
            Self::ToggleView => "Switch Browse / Saved",
            Self::ShowBrowse => "Show browse feed",
            Self::ShowSaved => "Show saved library",
            Self::Randomize => "New random feed / try again",
            Self::EnterSearch => "Search articles",
            Self::ExitSearch => "Cancel search",
            Self::CommitSearch => "Run search",
            Self::Save => "Save / unsave article",
            Self::Read => "Read article in browser",
            Self::Open => "Open saved article",
            Self::Remove => "Remove from saved",
            Self::RefreshSaved => "Refresh saved library",
            Self::Login => "Sign in (opens browser)",
            Self::Logout => "Sign out",
            Self::CheckSession => "Re-check sign-in status",
            Self::CycleTheme => "Switch dark / light theme",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context; determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Browse,
    Saved,
    Search,
}

// ============================================================================
// Key Spec
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

    const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Backspace", "Space"
/// - Modifier combos: "Ctrl+d"
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
        "home" => return Some(KeySpec::plain(KeyCode::Home)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::char(' ')),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        return (1..=12).contains(&n).then_some(KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::char(c)),
        _ => None,
    }
}

/// Format a KeySpec for the help screen.
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
        KeyCode::Home => "Home".to_string(),
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
/// The same key can map to different actions in different contexts; a
/// context-specific binding wins over the Global one.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen.
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
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Action::*;

        let global = [
            (KeySpec::char('q'), Quit),
            (KeySpec::char('j'), NavDown),
            (KeySpec::plain(KeyCode::Down), NavDown),
            (KeySpec::char('k'), NavUp),
            (KeySpec::plain(KeyCode::Up), NavUp),
            (KeySpec::char('g'), First),
            (KeySpec::plain(KeyCode::Home), First),
            (KeySpec::plain(KeyCode::Esc), Back),
            (KeySpec::plain(KeyCode::Tab), ToggleView),
            (KeySpec::char('1'), ShowBrowse),
            (KeySpec::char('2'), ShowSaved),
            (KeySpec::char('r'), Randomize),
            (KeySpec::char('/'), EnterSearch),
            (KeySpec::char('l'), Login),
            (KeySpec::char('L'), Logout),
            (KeySpec::char('u'), CheckSession),
            (KeySpec::char('t'), CycleTheme),
            (KeySpec::char('?'), ShowHelp),
        ];
        for (key, action) in global {
            self.bind(Context::Global, key, action);
        }

        // Browse feed cards
        self.bind(Context::Browse, KeySpec::char('s'), Save);
        self.bind(Context::Browse, KeySpec::char(' '), Save);
        self.bind(Context::Browse, KeySpec::plain(KeyCode::Enter), Read);
        self.bind(Context::Browse, KeySpec::char('o'), Read);

        // Saved library
        self.bind(Context::Saved, KeySpec::plain(KeyCode::Enter), Open);
        self.bind(Context::Saved, KeySpec::char('o'), Open);
        self.bind(Context::Saved, KeySpec::char('d'), Remove);
        self.bind(Context::Saved, KeySpec::char('R'), RefreshSaved);

        // Search box
        self.bind(Context::Search, KeySpec::plain(KeyCode::Esc), ExitSearch);
        self.bind(Context::Search, KeySpec::plain(KeyCode::Enter), CommitSearch);
    }

    /// Apply user overrides from the config `keybindings` table.
    ///
    /// Keys are action names ("quit", "randomize"), values are key strings
    /// ("q", "Ctrl+r", "F5"). The new key replaces every existing binding of
    /// the action, in the same contexts. Returns warnings for unknown
    /// actions or unparseable keys.
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

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
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

    /// Look up the action for a key, trying `context` first, then Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        // Terminals report uppercase letters with SHIFT set; the case is
        // already in the char.
        let modifiers = match code {
            KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            return self.lookup.get(&(Context::Global, key)).copied();
        }

        None
    }

    /// Keys bound to `action`, formatted for hints.
    pub fn keys_for(&self, action: Action) -> Vec<String> {
        self.bindings
            .iter()
            .filter(|(_, _, a)| *a == action)
            .map(|(_, key, _)| format_key(key))
            .collect()
    }

    /// Every binding as (context, key display, action, description).
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

/// Parse an action name from config.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "navdown" | "down" | "next" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" | "prev" => Some(Action::NavUp),
        "first" | "top" => Some(Action::First),
        "back" => Some(Action::Back),
        "toggle_view" | "toggleview" => Some(Action::ToggleView),
        "show_browse" | "showbrowse" | "browse" => Some(Action::ShowBrowse),
        "show_saved" | "showsaved" | "saved" => Some(Action::ShowSaved),
        "randomize" | "random" | "retry" => Some(Action::Randomize),
        "enter_search" | "entersearch" | "search" => Some(Action::EnterSearch),
        "exit_search" | "exitsearch" => Some(Action::ExitSearch),
        "commit_search" | "commitsearch" => Some(Action::CommitSearch),
        "save" | "like" => Some(Action::Save),
        "read" => Some(Action::Read),
        "open" => Some(Action::Open),
        "remove" | "unsave" => Some(Action::Remove),
        "refresh_saved" | "refreshsaved" | "refresh" => Some(Action::RefreshSaved),
        "login" | "sign_in" => Some(Action::Login),
        "logout" | "sign_out" => Some(Action::Logout),
        "check_session" | "checksession" | "session" => Some(Action::CheckSession),
        "cycle_theme" | "cycletheme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}
