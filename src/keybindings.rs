use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};
use tracing::warn;

// ─── Key binding infrastructure ────────────────────────────────────────

/// A key combination (key code + modifiers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Reverse-lookup map: KeyBind → Action, plus the display strings used by
/// the shortcut help screen.
pub struct ActionMap<A> {
    map: HashMap<KeyBind, A>,
    display: HashMap<A, Vec<String>>,
}

impl<A: Copy + Eq + Hash> ActionMap<A> {
    /// Build an `ActionMap` by merging user overrides on top of defaults.
    ///
    /// An action present in `overrides` loses all of its default keys. An
    /// override wins over a default claiming the same key. A key claimed by
    /// two overridden actions is bound to neither.
    pub fn build(
        defaults: &HashMap<A, Vec<String>>,
        overrides: &HashMap<A, Vec<String>>,
    ) -> Self {
        let mut map = HashMap::new();
        let mut display: HashMap<A, Vec<String>> = HashMap::new();

        for (action, key_strings) in defaults {
            if overrides.contains_key(action) {
                continue;
            }
            for bind in key_strings.iter().flat_map(|s| parse_key(s)) {
                map.insert(bind, *action);
            }
            display.insert(*action, display_keys(key_strings));
        }

        let mut claimed: HashMap<KeyBind, A> = HashMap::new();
        let mut conflicts: HashSet<KeyBind> = HashSet::new();
        for (action, key_strings) in overrides {
            for bind in key_strings.iter().flat_map(|s| parse_key(s)) {
                if let Some(other) = claimed.insert(bind, *action) {
                    if other != *action {
                        conflicts.insert(bind);
                    }
                }
            }
            display.insert(*action, display_keys(key_strings));
        }

        for (bind, action) in claimed {
            if conflicts.contains(&bind) {
                warn!(key = ?bind, "key bound to more than one action; ignoring it");
                map.remove(&bind);
                continue;
            }
            if map.insert(bind, action).is_some_and(|previous| previous != action) {
                warn!(key = ?bind, "override takes a key from a default binding");
            }
        }

        Self { map, display }
    }

    /// Formatted display strings for an action (e.g. `["Shift+?"]`).
    pub fn keys(&self, action: A) -> &[String] {
        self.display.get(&action).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// First display key for an action, or `""` when nothing is bound.
    pub fn first_key(&self, action: A) -> &str {
        self.keys(action).first().map(|s| s.as_str()).unwrap_or("")
    }

    pub fn keys_joined(&self, action: A, sep: &str) -> String {
        self.keys(action).join(sep)
    }

    /// Look up an action for the given key event.
    ///
    /// Ctrl, Alt and Meta do not stop a bound key from matching. Shift is
    /// only ignored for keys that are not characters, so `?` still needs it.
    pub fn lookup(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<A> {
        if let Some(action) = self.lookup_exact(code, modifiers) {
            return Some(action);
        }
        let loose = match code {
            KeyCode::Char(_) => modifiers & KeyModifiers::SHIFT,
            _ => KeyModifiers::NONE,
        };
        if loose == modifiers {
            return None;
        }
        self.lookup_exact(code, loose)
    }

    fn lookup_exact(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<A> {
        if let Some(action) = self.map.get(&KeyBind { code, modifiers }) {
            return Some(*action);
        }
        // Uppercase letters and some symbols arrive with SHIFT set.
        // Only the exact binding may claim them before falling back.
        if let KeyCode::Char(_) = code {
            if modifiers.contains(KeyModifiers::SHIFT) {
                let stripped = modifiers & !KeyModifiers::SHIFT;
                return self.map.get(&KeyBind { code, modifiers: stripped }).copied();
            }
        }
        None
    }
}

fn display_keys(key_strings: &[String]) -> Vec<String> {
    key_strings
        .iter()
        .filter(|s| !s.trim().starts_with("//"))
        .map(|s| format_key_display(s))
        .collect()
}

// ─── Key string parsing ────────────────────────────────────────────────

/// Parse a key string like `"shift+?"`, `"ctrl+k"`, `"n"`, `"esc"` into one
/// or more `KeyBind` values.
///
/// Alphabetic characters produce both lowercase and uppercase variants, so
/// `"n"` matches both `n` and `N`. Strings starting with `//` are comments
/// and yield nothing, as does an unknown key name.
pub fn parse_key(s: &str) -> Vec<KeyBind> {
    let trimmed = s.trim();
    if trimmed.starts_with("//") || trimmed.is_empty() {
        return Vec::new();
    }
    let s = trimmed.to_lowercase();
    let parts: Vec<&str> = s.split('+').collect();
    let (key_part, modifier_parts) = match parts.split_last() {
        Some((key, mods)) => (*key, mods),
        None => return Vec::new(),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in modifier_parts {
        match *part {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" => modifiers |= KeyModifiers::ALT,
            "meta" | "cmd" | "super" => modifiers |= KeyModifiers::SUPER,
            _ => {}
        }
    }

    let code = match key_part {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        f if f.len() > 1 && f.starts_with('f') => match f[1..].parse::<u8>() {
            Ok(n @ 1..=12) => KeyCode::F(n),
            _ => return Vec::new(),
        },
        k => {
            let mut chars = k.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => KeyCode::Char(ch),
                _ => return Vec::new(),
            }
        }
    };

    if let KeyCode::Char(ch) = code {
        if ch.is_ascii_alphabetic() {
            return vec![
                KeyBind { code: KeyCode::Char(ch.to_ascii_lowercase()), modifiers },
                KeyBind { code: KeyCode::Char(ch.to_ascii_uppercase()), modifiers },
            ];
        }
    }

    vec![KeyBind { code, modifiers }]
}

/// Format a key string for display: `"shift+?"` → `"Shift+?"`,
/// `"esc"` → `"Esc"`, `"n"` → `"N"`.
pub fn format_key_display(s: &str) -> String {
    let s = s.trim().to_lowercase();
    let parts: Vec<&str> = s.split('+').collect();
    let last = parts.len().saturating_sub(1);

    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i < last {
                match *part {
                    "ctrl" | "control" => "Ctrl".to_string(),
                    "shift" => "Shift".to_string(),
                    "alt" => "Alt".to_string(),
                    "meta" | "cmd" | "super" => "Meta".to_string(),
                    other => other.to_string(),
                }
            } else {
                match *part {
                    "esc" | "escape" => "Esc".to_string(),
                    "enter" | "return" => "Enter".to_string(),
                    "space" => "Space".to_string(),
                    "tab" => "Tab".to_string(),
                    "backspace" => "BkSp".to_string(),
                    "delete" | "del" => "Del".to_string(),
                    "pageup" => "PgUp".to_string(),
                    "pagedown" => "PgDn".to_string(),
                    other => {
                        let mut chars = other.chars();
                        match chars.next() {
                            Some(first) => first.to_uppercase().chain(chars).collect(),
                            None => String::new(),
                        }
                    }
                }
            }
        })
        .collect::<Vec<_>>()
        .join("+")
}

// ─── Shortcut command table ────────────────────────────────────────────

/// The fixed set of page-level shortcut actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutAction {
    FocusSearch,
    ShowHelp,
    CreateNew,
    EscapeCascade,
}

impl ShortcutAction {
    pub const ALL: [ShortcutAction; 4] = [
        ShortcutAction::FocusSearch,
        ShortcutAction::ShowHelp,
        ShortcutAction::CreateNew,
        ShortcutAction::EscapeCascade,
    ];

    /// Whether the action may fire while a text field has focus.
    pub fn guard_policy(self) -> GuardPolicy {
        match self {
            ShortcutAction::EscapeCascade => GuardPolicy::AlwaysAllowed,
            _ => GuardPolicy::BlockedInInput,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ShortcutAction::FocusSearch => "Focus search",
            ShortcutAction::ShowHelp => "Keyboard shortcuts help",
            ShortcutAction::CreateNew => "Create new (company or product)",
            ShortcutAction::EscapeCascade => "Close dialogs and menus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPolicy {
    AlwaysAllowed,
    BlockedInInput,
}

/// One row of the command table, as shown on the help screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBinding {
    pub action: ShortcutAction,
    pub guard_policy: GuardPolicy,
    pub keys: Vec<String>,
}

pub fn default_shortcut_keybindings() -> HashMap<ShortcutAction, Vec<String>> {
    let mut m = HashMap::new();
    m.insert(ShortcutAction::FocusSearch, vec!["//Focus the search field".into(), "/".into()]);
    m.insert(ShortcutAction::ShowHelp, vec!["//Open keyboard shortcuts help".into(), "shift+?".into()]);
    m.insert(ShortcutAction::CreateNew, vec!["//Create a company or product".into(), "n".into()]);
    m.insert(ShortcutAction::EscapeCascade, vec!["//Close open dialogs and menus".into(), "esc".into()]);
    m
}

/// User-editable keybinding overrides, stored under `keybindings` in settings.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeybindingsConfig {
    #[serde(default = "default_shortcut_keybindings")]
    pub shortcuts: HashMap<ShortcutAction, Vec<String>>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            shortcuts: default_shortcut_keybindings(),
        }
    }
}

/// Runtime command table.
pub struct Keybindings {
    shortcuts: ActionMap<ShortcutAction>,
}

impl Default for Keybindings {
    fn default() -> Self {
        Self::from_config(&KeybindingsConfig::default())
    }
}

impl Keybindings {
    pub fn from_config(config: &KeybindingsConfig) -> Self {
        Self {
            shortcuts: ActionMap::build(&default_shortcut_keybindings(), &config.shortcuts),
        }
    }

    pub fn action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<ShortcutAction> {
        self.shortcuts.lookup(code, modifiers)
    }

    pub fn keys(&self, action: ShortcutAction) -> &[String] {
        self.shortcuts.keys(action)
    }

    pub fn first_key(&self, action: ShortcutAction) -> &str {
        self.shortcuts.first_key(action)
    }

    pub fn keys_joined(&self, action: ShortcutAction, sep: &str) -> String {
        self.shortcuts.keys_joined(action, sep)
    }

    /// The command table in a stable order.
    pub fn command_table(&self) -> Vec<CommandBinding> {
        ShortcutAction::ALL
            .iter()
            .map(|&action| CommandBinding {
                action,
                guard_policy: action.guard_policy(),
                keys: self.keys(action).to_vec(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_key() {
        let binds = parse_key("n");
        assert_eq!(binds.len(), 2);
        assert!(binds.contains(&KeyBind { code: KeyCode::Char('n'), modifiers: KeyModifiers::NONE }));
        assert!(binds.contains(&KeyBind { code: KeyCode::Char('N'), modifiers: KeyModifiers::NONE }));
    }

    #[test]
    fn test_parse_comment_string() {
        assert!(parse_key("//Create a company").is_empty());
        assert!(parse_key("  // leading spaces  ").is_empty());
        assert!(parse_key("").is_empty());
    }

    #[test]
    fn test_parse_shifted_symbol() {
        let binds = parse_key("shift+?");
        assert_eq!(binds, vec![KeyBind { code: KeyCode::Char('?'), modifiers: KeyModifiers::SHIFT }]);
    }

    #[test]
    fn test_parse_special_keys() {
        assert_eq!(parse_key("esc")[0].code, KeyCode::Esc);
        assert_eq!(parse_key("Escape")[0].code, KeyCode::Esc);
        assert_eq!(parse_key("space")[0].code, KeyCode::Char(' '));
        assert_eq!(parse_key("f5")[0].code, KeyCode::F(5));
        assert_eq!(parse_key("/")[0].code, KeyCode::Char('/'));
    }

    #[test]
    fn test_parse_unknown_key_is_empty() {
        assert!(parse_key("f13").is_empty());
        assert!(parse_key("banana").is_empty());
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key_display("n"), "N");
        assert_eq!(format_key_display("shift+?"), "Shift+?");
        assert_eq!(format_key_display("esc"), "Esc");
        assert_eq!(format_key_display("ctrl+k"), "Ctrl+K");
        assert_eq!(format_key_display("/"), "/");
        assert_eq!(format_key_display("f1"), "F1");
    }

    #[test]
    fn test_default_command_table() {
        let kb = Keybindings::default();
        assert_eq!(kb.action(KeyCode::Char('/'), KeyModifiers::NONE), Some(ShortcutAction::FocusSearch));
        assert_eq!(kb.action(KeyCode::Char('?'), KeyModifiers::SHIFT), Some(ShortcutAction::ShowHelp));
        assert_eq!(kb.action(KeyCode::Char('n'), KeyModifiers::NONE), Some(ShortcutAction::CreateNew));
        assert_eq!(kb.action(KeyCode::Char('N'), KeyModifiers::SHIFT), Some(ShortcutAction::CreateNew));
        assert_eq!(kb.action(KeyCode::Esc, KeyModifiers::NONE), Some(ShortcutAction::EscapeCascade));
    }

    #[test]
    fn test_question_mark_requires_shift() {
        let kb = Keybindings::default();
        assert_eq!(kb.action(KeyCode::Char('?'), KeyModifiers::NONE), None);
    }

    #[test]
    fn test_held_modifiers_still_match() {
        let kb = Keybindings::default();
        assert_eq!(kb.action(KeyCode::Char('n'), KeyModifiers::CONTROL), Some(ShortcutAction::CreateNew));
        assert_eq!(kb.action(KeyCode::Char('n'), KeyModifiers::ALT), Some(ShortcutAction::CreateNew));
        assert_eq!(kb.action(KeyCode::Char('N'), KeyModifiers::SUPER | KeyModifiers::SHIFT), Some(ShortcutAction::CreateNew));
        assert_eq!(kb.action(KeyCode::Char('/'), KeyModifiers::CONTROL), Some(ShortcutAction::FocusSearch));
        assert_eq!(
            kb.action(KeyCode::Char('?'), KeyModifiers::CONTROL | KeyModifiers::SHIFT),
            Some(ShortcutAction::ShowHelp)
        );
        assert_eq!(kb.action(KeyCode::Char('?'), KeyModifiers::CONTROL), None);
        assert_eq!(kb.action(KeyCode::Esc, KeyModifiers::SHIFT), Some(ShortcutAction::EscapeCascade));
        assert_eq!(kb.action(KeyCode::Esc, KeyModifiers::CONTROL | KeyModifiers::ALT), Some(ShortcutAction::EscapeCascade));
    }

    #[test]
    fn test_exact_binding_wins_over_loose_match() {
        let mut config = KeybindingsConfig::default();
        config.shortcuts.insert(ShortcutAction::ShowHelp, vec!["ctrl+n".into()]);
        let kb = Keybindings::from_config(&config);
        assert_eq!(kb.action(KeyCode::Char('n'), KeyModifiers::CONTROL), Some(ShortcutAction::ShowHelp));
        assert_eq!(kb.action(KeyCode::Char('n'), KeyModifiers::ALT), Some(ShortcutAction::CreateNew));
    }

    #[test]
    fn test_conflicting_overrides_bind_neither() {
        let mut overrides = HashMap::new();
        overrides.insert(ShortcutAction::FocusSearch, vec!["k".to_string()]);
        overrides.insert(ShortcutAction::CreateNew, vec!["k".to_string(), "n".to_string()]);
        for _ in 0..8 {
            let map = ActionMap::build(&default_shortcut_keybindings(), &overrides);
            assert_eq!(map.lookup(KeyCode::Char('k'), KeyModifiers::NONE), None);
            assert_eq!(map.lookup(KeyCode::Char('n'), KeyModifiers::NONE), Some(ShortcutAction::CreateNew));
            assert_eq!(map.first_key(ShortcutAction::FocusSearch), "K");
        }
    }

    #[test]
    fn test_override_takes_key_from_default() {
        let mut overrides = HashMap::new();
        overrides.insert(ShortcutAction::FocusSearch, vec!["n".to_string()]);
        let map = ActionMap::build(&default_shortcut_keybindings(), &overrides);
        assert_eq!(map.lookup(KeyCode::Char('n'), KeyModifiers::NONE), Some(ShortcutAction::FocusSearch));
        assert_eq!(map.lookup(KeyCode::Char('/'), KeyModifiers::NONE), None);
    }

    #[test]
    fn test_override_replaces_defaults() {
        let mut config = KeybindingsConfig::default();
        config.shortcuts.insert(ShortcutAction::CreateNew, vec!["c".into()]);
        let kb = Keybindings::from_config(&config);

        assert_eq!(kb.action(KeyCode::Char('c'), KeyModifiers::NONE), Some(ShortcutAction::CreateNew));
        assert_eq!(kb.action(KeyCode::Char('n'), KeyModifiers::NONE), None);
        assert_eq!(kb.first_key(ShortcutAction::CreateNew), "C");
    }

    #[test]
    fn test_display_filters_comments() {
        let kb = Keybindings::default();
        assert_eq!(kb.keys(ShortcutAction::ShowHelp), &["Shift+?".to_string()]);
        assert_eq!(kb.keys_joined(ShortcutAction::EscapeCascade, " / "), "Esc");
    }

    #[test]
    fn test_command_table_guard_policies() {
        let table = Keybindings::default().command_table();
        assert_eq!(table.len(), 4);
        for row in &table {
            let expected = if row.action == ShortcutAction::EscapeCascade {
                GuardPolicy::AlwaysAllowed
            } else {
                GuardPolicy::BlockedInInput
            };
            assert_eq!(row.guard_policy, expected);
            assert!(!row.keys.is_empty());
        }
    }

    #[test]
    fn test_config_serialization() {
        let config = KeybindingsConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"create_new\""));
        let parsed: KeybindingsConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.shortcuts.len(), config.shortcuts.len());
    }

    #[test]
    fn test_config_missing_section_uses_defaults() {
        let parsed: KeybindingsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.shortcuts.len(), 4);
    }
}
