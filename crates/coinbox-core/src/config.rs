//! # Configuration Store
//!
//! (section, key)-addressed settings shared by every module.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Config Lookup                                        │
//! │                                                                         │
//! │  config.get("menu", "show_tab_bar")                                    │
//! │       │                                                                 │
//! │       ├── values   (loaded from the `config` table or set at runtime)  │
//! │       │     └── found? return it                                       │
//! │       │                                                                 │
//! │       └── defaults (registered by module metadata at startup)          │
//! │             └── found? return it, else None                            │
//! │                                                                         │
//! │  config.set(...) / config.remove(...)                                  │
//! │       └── recorded as a pending change                                 │
//! │             └── ConfigRepository::save writes only pending changes     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are `serde_json::Value`s. Booleans, strings and small integers are
//! typed "by convention": the typed accessors below are lenient the same way
//! the stored values have always been (a `"1"` string counts as true).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// A single configuration value.
pub type ConfigValue = Value;

// =============================================================================
// Well-Known Keys
// =============================================================================

/// Section and key names used by the base module.
pub mod keys {
    pub const APP: &str = "app";
    pub const FULLSCREEN: &str = "fullscreen";
    pub const FIRST_RUN: &str = "first_run";

    pub const MENU: &str = "menu";
    pub const SHOW_TAB_BAR: &str = "show_tab_bar";
    pub const SHOW_DISABLED_ITEMS: &str = "show_disabled_items";
    pub const SHOW_EMPTY_ROOT_ITEMS: &str = "show_empty_root_items";
    pub const TOOLBAR_STYLE: &str = "toolbar_style";

    pub const PRINTING: &str = "printing";
    pub const PRINTER_PREFIX: &str = "p.";
    pub const FUNCTION_PREFIX: &str = "f.";
    pub const DEFAULT_PRINTER: &str = "default";
    pub const FORCE_PREVIEW: &str = "force_preview";

    pub const MAIN_WINDOW: &str = "mainwindow";
    pub const STATE: &str = "state";
    pub const GEOMETRY: &str = "geometry";

    pub const LOCALE: &str = "locale";
    pub const LOCALE_DIR: &str = "localedir";
    pub const LANGUAGES: &str = "languages";
    pub const FALLBACK: &str = "fallback";
    pub const CODESET: &str = "codeset";
}

// =============================================================================
// Typed Settings
// =============================================================================

/// Toolbar button style (`menu.toolbar_style`).
///
/// The numeric code is what gets stored; the order is shared between the
/// main window and the menu config page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ToolbarStyle {
    #[default]
    FollowStyle,
    IconOnly,
    TextOnly,
    TextBesideIcon,
    TextUnderIcon,
}

impl ToolbarStyle {
    /// All styles, indexed by their stored code.
    pub const ALL: [ToolbarStyle; 5] = [
        ToolbarStyle::FollowStyle,
        ToolbarStyle::IconOnly,
        ToolbarStyle::TextOnly,
        ToolbarStyle::TextBesideIcon,
        ToolbarStyle::TextUnderIcon,
    ];

    /// Stored code of this style.
    pub fn code(self) -> i64 {
        match self {
            ToolbarStyle::FollowStyle => 0,
            ToolbarStyle::IconOnly => 1,
            ToolbarStyle::TextOnly => 2,
            ToolbarStyle::TextBesideIcon => 3,
            ToolbarStyle::TextUnderIcon => 4,
        }
    }

    /// Style for a stored code; anything unknown follows the platform style.
    pub fn from_code(code: i64) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    /// Label shown in the menu config page.
    pub fn label(self) -> &'static str {
        match self {
            ToolbarStyle::FollowStyle => "Follow Style",
            ToolbarStyle::IconOnly => "Icon Only",
            ToolbarStyle::TextOnly => "Text Only",
            ToolbarStyle::TextBesideIcon => "Text Beside Icon",
            ToolbarStyle::TextUnderIcon => "Text Under Icon",
        }
    }
}

/// Settings of the `menu` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuSettings {
    pub show_tab_bar: bool,
    pub show_disabled_items: bool,
    pub show_empty_root_items: bool,
    pub toolbar_style: ToolbarStyle,
}

/// Settings of the `locale` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocaleSettings {
    pub localedir: String,
    /// Languages by order of preference (e.g. `en-US`, `en-UK`).
    pub languages: Vec<String>,
    pub fallback: bool,
    pub codeset: String,
}

/// A change waiting to be persisted. `value == None` removes the key.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigChange {
    pub section: String,
    pub key: String,
    pub value: Option<Value>,
}

// =============================================================================
// Config
// =============================================================================

/// In-memory configuration store with defaults and change tracking.
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: BTreeMap<String, BTreeMap<String, Value>>,
    defaults: BTreeMap<String, BTreeMap<String, Value>>,
    pending: BTreeMap<(String, String), Option<Value>>,
    first_run: bool,
}

impl Config {
    /// Creates an empty store.
    pub fn new() -> Self {
        Config::default()
    }

    /// Registers default values for a section. Existing defaults for the
    /// same keys are replaced; explicit values are never touched.
    pub fn register_defaults<I, K>(&mut self, section: &str, entries: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let defaults = self.defaults.entry(section.to_string()).or_default();
        for (key, value) in entries {
            defaults.insert(key.into(), value);
        }
    }

    /// Replaces the explicit values with entries read from storage.
    ///
    /// An empty store means the application has never been set up, which
    /// is what first-run detection relies on.
    pub fn load_entries<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, String, Value)>,
    {
        self.values.clear();
        self.pending.clear();
        for (section, key, value) in entries {
            self.values.entry(section).or_default().insert(key, value);
        }
        self.first_run = self.values.is_empty();
    }

    // -------------------------------------------------------------------------
    // Raw access
    // -------------------------------------------------------------------------

    /// Looks a value up, falling back to registered defaults.
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.values
            .get(section)
            .and_then(|s| s.get(key))
            .or_else(|| self.defaults.get(section).and_then(|s| s.get(key)))
    }

    /// Sets a value. `Value::Null` is treated as a removal.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<Value>) {
        let value = value.into();
        if value.is_null() {
            self.remove(section, key);
            return;
        }
        self.values
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.clone());
        self.pending
            .insert((section.to_string(), key.to_string()), Some(value));
    }

    /// Removes an explicit value (defaults stay visible).
    pub fn remove(&mut self, section: &str, key: &str) {
        if let Some(values) = self.values.get_mut(section) {
            values.remove(key);
            if values.is_empty() {
                self.values.remove(section);
            }
        }
        self.pending
            .insert((section.to_string(), key.to_string()), None);
    }

    /// All keys visible in a section (explicit and default), sorted.
    pub fn keys(&self, section: &str) -> Vec<String> {
        let mut keys = BTreeSet::new();
        if let Some(values) = self.values.get(section) {
            keys.extend(values.keys().cloned());
        }
        if let Some(defaults) = self.defaults.get(section) {
            keys.extend(defaults.keys().cloned());
        }
        keys.into_iter().collect()
    }

    // -------------------------------------------------------------------------
    // Typed access
    // -------------------------------------------------------------------------

    /// Truthiness of a value: missing, `false`, `0`, `""` and `[]` are false.
    pub fn get_bool(&self, section: &str, key: &str) -> bool {
        match self.get(section, key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
        }
    }

    /// String value, if the stored value is a string.
    pub fn get_str(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).and_then(Value::as_str)
    }

    /// Integer value; numeric strings are accepted.
    pub fn get_i64(&self, section: &str, key: &str) -> Option<i64> {
        match self.get(section, key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// List of strings; a comma-separated string is split.
    pub fn get_str_list(&self, section: &str, key: &str) -> Vec<String> {
        match self.get(section, key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(s)) if !s.is_empty() => {
                s.split(',').map(|l| l.trim().to_string()).collect()
            }
            _ => Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Section helpers
    // -------------------------------------------------------------------------

    /// `app.fullscreen`.
    pub fn fullscreen(&self) -> bool {
        self.get_bool(keys::APP, keys::FULLSCREEN)
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.set(keys::APP, keys::FULLSCREEN, fullscreen);
    }

    /// The `menu` section.
    pub fn menu_settings(&self) -> MenuSettings {
        MenuSettings {
            show_tab_bar: self.get_bool(keys::MENU, keys::SHOW_TAB_BAR),
            show_disabled_items: self.get_bool(keys::MENU, keys::SHOW_DISABLED_ITEMS),
            show_empty_root_items: self.get_bool(keys::MENU, keys::SHOW_EMPTY_ROOT_ITEMS),
            toolbar_style: self
                .get_i64(keys::MENU, keys::TOOLBAR_STYLE)
                .map(ToolbarStyle::from_code)
                .unwrap_or_default(),
        }
    }

    pub fn set_menu_settings(&mut self, settings: MenuSettings) {
        self.set(keys::MENU, keys::SHOW_TAB_BAR, settings.show_tab_bar);
        self.set(keys::MENU, keys::SHOW_DISABLED_ITEMS, settings.show_disabled_items);
        self.set(keys::MENU, keys::SHOW_EMPTY_ROOT_ITEMS, settings.show_empty_root_items);
        self.set(keys::MENU, keys::TOOLBAR_STYLE, settings.toolbar_style.code());
    }

    /// The `locale` section.
    pub fn locale_settings(&self) -> LocaleSettings {
        LocaleSettings {
            localedir: self
                .get_str(keys::LOCALE, keys::LOCALE_DIR)
                .unwrap_or_default()
                .to_string(),
            languages: self.get_str_list(keys::LOCALE, keys::LANGUAGES),
            fallback: self.get_bool(keys::LOCALE, keys::FALLBACK),
            codeset: self
                .get_str(keys::LOCALE, keys::CODESET)
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn set_locale_settings(&mut self, settings: &LocaleSettings) {
        self.set(keys::LOCALE, keys::LOCALE_DIR, settings.localedir.as_str());
        self.set(keys::LOCALE, keys::LANGUAGES, settings.languages.clone());
        self.set(keys::LOCALE, keys::FALLBACK, settings.fallback);
        self.set(keys::LOCALE, keys::CODESET, settings.codeset.as_str());
    }

    /// Opaque (state, geometry) blobs saved by the main window.
    pub fn window_state(&self) -> (Option<String>, Option<String>) {
        (
            self.get_str(keys::MAIN_WINDOW, keys::STATE).map(str::to_string),
            self.get_str(keys::MAIN_WINDOW, keys::GEOMETRY).map(str::to_string),
        )
    }

    pub fn set_window_state(&mut self, state: &str, geometry: &str) {
        self.set(keys::MAIN_WINDOW, keys::STATE, state);
        self.set(keys::MAIN_WINDOW, keys::GEOMETRY, geometry);
    }

    /// `printing.force_preview`.
    pub fn force_preview(&self) -> bool {
        self.get_bool(keys::PRINTING, keys::FORCE_PREVIEW)
    }

    // -------------------------------------------------------------------------
    // First run
    // -------------------------------------------------------------------------

    /// Whether the loaded store was empty and setup never completed.
    pub fn is_first_run(&self) -> bool {
        self.first_run
            && self
                .get(keys::APP, keys::FIRST_RUN)
                .and_then(Value::as_bool)
                .unwrap_or(true)
    }

    /// Records that the first-run wizard completed.
    pub fn complete_first_run(&mut self) {
        self.set(keys::APP, keys::FIRST_RUN, false);
        self.first_run = false;
    }

    // -------------------------------------------------------------------------
    // Change tracking
    // -------------------------------------------------------------------------

    /// Changes made since the last load or save, in key order.
    pub fn pending_changes(&self) -> Vec<ConfigChange> {
        self.pending
            .iter()
            .map(|((section, key), value)| ConfigChange {
                section: section.clone(),
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Forgets pending changes after they were written.
    pub fn mark_saved(&mut self) {
        self.pending.clear();
    }

    /// Forgets the written changes only. A key set again after the
    /// snapshot was taken stays pending.
    pub fn mark_changes_saved(&mut self, changes: &[ConfigChange]) {
        for change in changes {
            let entry = (change.section.clone(), change.key.clone());
            if self.pending.get(&entry) == Some(&change.value) {
                self.pending.remove(&entry);
            }
        }
    }
}

// =============================================================================
// Shared Handle
// =============================================================================

/// Cloneable handle to the process-wide [`Config`].
///
/// ## Thread Safety
/// Everything runs on the UI thread; the `RwLock` keeps the handle `Sync`
/// so it can sit next to the other shared state wrappers.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Config>>,
}

impl ConfigHandle {
    /// Wraps a config.
    pub fn new(config: Config) -> Self {
        ConfigHandle {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Executes a function with read access to the config.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Config) -> R,
    {
        let config = self.inner.read().expect("Config lock poisoned");
        f(&config)
    }

    /// Executes a function with write access to the config.
    pub fn write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Config) -> R,
    {
        let mut config = self.inner.write().expect("Config lock poisoned");
        f(&mut config)
    }

    /// Copy of the current config.
    pub fn snapshot(&self) -> Config {
        self.read(Config::clone)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_fallbacks() {
        let mut config = Config::new();
        config.register_defaults("menu", [("show_tab_bar", json!(false))]);

        assert!(!config.get_bool("menu", "show_tab_bar"));

        config.set("menu", "show_tab_bar", true);
        assert!(config.get_bool("menu", "show_tab_bar"));

        config.remove("menu", "show_tab_bar");
        assert_eq!(config.get("menu", "show_tab_bar"), Some(&json!(false)));
    }

    #[test]
    fn test_truthiness() {
        let mut config = Config::new();
        config.set("a", "zero", 0);
        config.set("a", "one", 1);
        config.set("a", "empty", "");
        config.set("a", "text", "yes");

        assert!(!config.get_bool("a", "zero"));
        assert!(config.get_bool("a", "one"));
        assert!(!config.get_bool("a", "empty"));
        assert!(config.get_bool("a", "text"));
        assert!(!config.get_bool("a", "missing"));
    }

    #[test]
    fn test_toolbar_style_accepts_numeric_strings() {
        let mut config = Config::new();
        config.set("menu", "toolbar_style", "3");
        assert_eq!(
            config.menu_settings().toolbar_style,
            ToolbarStyle::TextBesideIcon
        );

        config.set("menu", "toolbar_style", 42);
        assert_eq!(config.menu_settings().toolbar_style, ToolbarStyle::FollowStyle);

        config.set("menu", "toolbar_style", "garbage");
        assert_eq!(config.menu_settings().toolbar_style, ToolbarStyle::FollowStyle);
    }

    #[test]
    fn test_pending_changes_track_sets_and_removals() {
        let mut config = Config::new();
        config.load_entries(vec![(
            "printing".to_string(),
            "p.kitchen".to_string(),
            json!({"name": "x"}),
        )]);
        assert!(!config.has_pending_changes());

        config.set("app", "fullscreen", true);
        config.remove("printing", "p.kitchen");

        let changes = config.pending_changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].section, "app");
        assert_eq!(changes[0].value, Some(json!(true)));
        assert_eq!(changes[1].key, "p.kitchen");
        assert_eq!(changes[1].value, None);

        config.mark_saved();
        assert!(!config.has_pending_changes());
    }

    #[test]
    fn test_mark_changes_saved_keeps_later_writes() {
        let mut config = Config::new();
        config.set("app", "fullscreen", true);
        config.set("menu", "show_tab_bar", true);
        let written = config.pending_changes();

        // changed again while the snapshot was being written
        config.set("app", "fullscreen", false);
        config.set("locale", "codeset", "UTF-8");
        config.mark_changes_saved(&written);

        let left = config.pending_changes();
        assert_eq!(left.len(), 2);
        assert_eq!(left[0].key, "fullscreen");
        assert_eq!(left[0].value, Some(json!(false)));
        assert_eq!(left[1].key, "codeset");
    }

    #[test]
    fn test_first_run_detection() {
        let mut config = Config::new();
        config.load_entries(Vec::new());
        assert!(config.is_first_run());

        config.complete_first_run();
        assert!(!config.is_first_run());

        let mut config = Config::new();
        config.load_entries(vec![("app".to_string(), "first_run".to_string(), json!(false))]);
        assert!(!config.is_first_run());
    }

    #[test]
    fn test_locale_round_trip() {
        let mut config = Config::new();
        let locale = LocaleSettings {
            localedir: "/usr/share/locale".to_string(),
            languages: vec!["en-US".to_string(), "fr".to_string()],
            fallback: true,
            codeset: "utf-8".to_string(),
        };
        config.set_locale_settings(&locale);
        assert_eq!(config.locale_settings(), locale);

        config.set("locale", "languages", "de, en");
        assert_eq!(config.locale_settings().languages, vec!["de", "en"]);
    }

    #[test]
    fn test_keys_merge_defaults() {
        let mut config = Config::new();
        config.register_defaults("printing", [("force_preview", json!(false))]);
        config.set("printing", "f.receipt", -1);

        assert_eq!(config.keys("printing"), vec!["f.receipt", "force_preview"]);
    }

    #[test]
    fn test_handle_shares_state() {
        let handle = ConfigHandle::new(Config::new());
        let other = handle.clone();

        other.write(|c| c.set_fullscreen(true));
        assert!(handle.read(Config::fullscreen));
    }
}
