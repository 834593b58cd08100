//! Runtime lookup service.
//!
//! A [`Localization`] owns the tables of the active language, one per sheet.
//! The default sheet is loaded by [`Localization::init`]; the other sheets by
//! [`Localization::load_all`] or [`Localization::load_sheet`]. Lookups never
//! fail: a key found nowhere comes back as `#!#key#!#`.

use crate::config::Settings;
use crate::error::Result;
use crate::language::Language;
use crate::metrics::LookupMetrics;
use crate::preferences::PreferenceStore;
use crate::sheet::Table;
use crate::store::AssetStore;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Wraps keys that have no translation.
pub const MISSING_MARKER: &str = "#!#";

/// Visible stand-in for a key that could not be found.
pub fn missing_key(key: &str) -> String {
    format!("{}{}{}", MISSING_MARKER, key, MISSING_MARKER)
}

/// Provides the table of one (language, sheet) pair.
pub trait SheetSource {
    fn load_sheet(&self, language: Language, sheet: &str) -> Result<Table>;
}

impl SheetSource for AssetStore {
    fn load_sheet(&self, language: Language, sheet: &str) -> Result<Table> {
        AssetStore::load_sheet(self, language, sheet)
    }
}

/// Handle returned by [`Localization::on_language_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(Language)>;

/// Pick the language for a new session.
///
/// Order: the persisted selection, then `system_language` when the settings
/// allow it, then the configured default. Candidates outside the allow-list
/// are skipped.
pub fn select_initial_language(
    settings: &Settings,
    preferences: &dyn PreferenceStore,
    system_language: Option<Language>,
) -> Language {
    if let Some(stored) = preferences.load_language() {
        if settings.is_allowed(stored) {
            return stored;
        }
        debug!("Stored language {} is no longer allowed", stored);
    }

    if settings.use_system_language {
        if let Some(system) = system_language.filter(|l| settings.is_allowed(*l)) {
            return system;
        }
    }

    settings.default_language
}

pub struct Localization {
    settings: Settings,
    source: Box<dyn SheetSource>,
    preferences: Box<dyn PreferenceStore>,
    current: Language,
    /// Sheet name to table, in load order
    storage: IndexMap<String, Table>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
    metrics: LookupMetrics,
}

impl Localization {
    pub fn new(
        settings: Settings,
        source: impl SheetSource + 'static,
        preferences: impl PreferenceStore + 'static,
    ) -> Self {
        let current = settings.default_language;
        Self {
            settings,
            source: Box::new(source),
            preferences: Box::new(preferences),
            current,
            storage: IndexMap::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
            metrics: LookupMetrics::new(),
        }
    }

    /// Select the session language and load the default sheet for it.
    pub fn init(&mut self, system_language: Option<Language>) -> Language {
        self.current = select_initial_language(&self.settings, self.preferences.as_ref(), system_language);
        self.storage.clear();

        let predefined = self.settings.predefined_sheet.clone();
        self.load_sheet(&predefined);

        info!("Localization initialized with {}", self.current);
        self.current
    }

    /// Load (or reload) one sheet for the current language.
    ///
    /// A missing or unreadable asset is logged and stored as an empty table,
    /// so its keys resolve through the fallback or the missing-key marker.
    /// Returns whether the asset was read.
    pub fn load_sheet(&mut self, sheet: &str) -> bool {
        let (table, loaded) = match self.source.load_sheet(self.current, sheet) {
            Ok(table) => {
                debug!("Loaded {} keys from {}/{}", table.len(), self.current, sheet);
                (table, true)
            }
            Err(e) => {
                warn!("Could not load sheet {} for {}: {}", sheet, self.current, e);
                (Table::new(), false)
            }
        };
        self.storage.insert(sheet.to_string(), table);
        loaded
    }

    /// Load every configured sheet that is not loaded yet, default sheet first.
    pub fn load_all(&mut self) {
        let mut pending = vec![self.settings.predefined_sheet.clone()];
        pending.extend(self.settings.sheets.iter().map(|s| s.name.clone()));

        for sheet in pending {
            if !self.storage.contains_key(&sheet) {
                self.load_sheet(&sheet);
            }
        }
    }

    /// Make `language` current, reload every sheet for it and notify listeners.
    ///
    /// A language outside the allow-list is replaced by the first allowed one.
    /// Returns the language actually selected.
    pub fn switch_language(&mut self, language: Language) -> Language {
        let language = if self.settings.is_allowed(language) {
            language
        } else {
            let fallback = self.settings.first_allowed();
            error!(
                "Language {} is not supported, falling back to {}",
                language, fallback
            );
            fallback
        };

        if let Err(e) = self.preferences.save_language(language) {
            warn!("Could not persist language {}: {}", language, e);
        }

        self.current = language;
        self.storage.clear();
        self.load_all();
        info!("Switched language to {}", language);

        for (_, listener) in &self.listeners {
            listener(language);
        }
        language
    }

    /// Call `listener` after every language switch.
    pub fn on_language_changed(&mut self, listener: impl Fn(Language) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Look `key` up in every loaded sheet, default sheet first.
    pub fn get(&self, key: &str) -> String {
        self.try_get(key, None)
            .map(str::to_string)
            .unwrap_or_else(|| missing_key(key))
    }

    /// Look `key` up in `sheet`, falling back to the default sheet.
    pub fn get_in(&self, key: &str, sheet: &str) -> String {
        self.try_get(key, Some(sheet))
            .map(str::to_string)
            .unwrap_or_else(|| missing_key(key))
    }

    /// Like [`Localization::get`] / [`Localization::get_in`] but `None` when
    /// the key is found nowhere.
    pub fn try_get(&self, key: &str, sheet: Option<&str>) -> Option<&str> {
        let predefined = self.settings.predefined_sheet.as_str();

        let found = match sheet {
            Some(sheet) => {
                if let Some(value) = self.lookup(sheet, key) {
                    self.metrics.record_hit();
                    Some(value)
                } else if sheet != predefined {
                    let value = self.lookup(predefined, key);
                    if value.is_some() {
                        self.metrics.record_fallback_hit();
                    }
                    value
                } else {
                    None
                }
            }
            None => {
                let value = self.lookup(predefined, key).or_else(|| {
                    self.storage
                        .iter()
                        .filter(|(name, _)| name.as_str() != predefined)
                        .find_map(|(_, table)| table.get(key).map(String::as_str))
                });
                if value.is_some() {
                    self.metrics.record_hit();
                }
                value
            }
        };

        if found.is_none() {
            self.metrics.record_miss();
        }
        found
    }

    fn lookup(&self, sheet: &str, key: &str) -> Option<&str> {
        self.storage
            .get(sheet)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }

    /// Drop every table and listener.
    pub fn teardown(&mut self) {
        self.storage.clear();
        self.listeners.clear();
        self.metrics.reset();
        debug!("Localization torn down");
    }

    pub fn current_language(&self) -> Language {
        self.current
    }

    pub fn is_loaded(&self, sheet: &str) -> bool {
        self.storage.contains_key(sheet)
    }

    pub fn loaded_sheets(&self) -> impl Iterator<Item = &str> {
        self.storage.keys().map(String::as_str)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn preferences(&self) -> &dyn PreferenceStore {
        self.preferences.as_ref()
    }

    pub fn metrics(&self) -> &LookupMetrics {
        &self.metrics
    }
}

/// A key, optionally scoped to a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRef {
    pub key: String,
    pub sheet: Option<String>,
}

impl KeyRef {
    pub fn new(key: impl Into<String>, sheet: Option<&str>) -> Self {
        Self {
            key: key.into(),
            sheet: sheet.map(str::to_string),
        }
    }

    /// Parse `key` or `key@sheet`.
    pub fn parse(value: &str) -> Self {
        match value.rsplit_once('@') {
            Some((key, sheet)) if !key.is_empty() && !sheet.is_empty() => KeyRef::new(key, Some(sheet)),
            _ => KeyRef::new(value, None),
        }
    }

    pub fn resolve(&self, localization: &Localization) -> String {
        match &self.sheet {
            Some(sheet) => localization.get_in(&self.key, sheet),
            None => localization.get(&self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetInfo;
    use crate::error::LocalizationError;
    use crate::preferences::MemoryPreferences;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    // ==================== Helpers ====================

    #[derive(Default)]
    struct MemorySource {
        tables: HashMap<(Language, String), Table>,
    }

    impl MemorySource {
        fn with(mut self, language: Language, sheet: &str, entries: &[(&str, &str)]) -> Self {
            let table = entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.tables.insert((language, sheet.to_string()), table);
            self
        }
    }

    impl SheetSource for MemorySource {
        fn load_sheet(&self, language: Language, sheet: &str) -> Result<Table> {
            self.tables
                .get(&(language, sheet.to_string()))
                .cloned()
                .ok_or_else(|| LocalizationError::UnknownSheet(format!("{}/{}", language, sheet)))
        }
    }

    fn french() -> Language {
        Language::from_name("French").unwrap()
    }

    fn create_test_settings() -> Settings {
        Settings {
            document_url: "https://docs.example.com".to_string(),
            sheets: vec![SheetInfo::new("Predefined", "0"), SheetInfo::new("Common", "1")],
            languages: vec![Language::ENGLISH, Language::SPANISH],
            ..Settings::default()
        }
    }

    fn create_source() -> MemorySource {
        MemorySource::default()
            .with(Language::ENGLISH, "Predefined", &[("title", "Game"), ("ok", "OK")])
            .with(Language::ENGLISH, "Common", &[("play", "Play"), ("ok", "Okay")])
            .with(Language::SPANISH, "Predefined", &[("title", "Juego"), ("ok", "Vale")])
            .with(Language::SPANISH, "Common", &[("play", "Jugar")])
    }

    fn create_localization() -> Localization {
        Localization::new(create_test_settings(), create_source(), MemoryPreferences::new())
    }

    // ==================== Initial Language Tests ====================

    #[test]
    fn test_initial_language_prefers_persisted() {
        let settings = create_test_settings();
        let prefs = MemoryPreferences::with_language(Language::SPANISH);
        assert_eq!(
            select_initial_language(&settings, &prefs, Some(Language::ENGLISH)),
            Language::SPANISH
        );
    }

    #[test]
    fn test_initial_language_skips_disallowed_persisted() {
        let settings = create_test_settings();
        let prefs = MemoryPreferences::with_language(french());
        assert_eq!(
            select_initial_language(&settings, &prefs, Some(Language::SPANISH)),
            Language::SPANISH
        );
    }

    #[test]
    fn test_initial_language_system_disabled() {
        let settings = Settings {
            use_system_language: false,
            ..create_test_settings()
        };
        assert_eq!(
            select_initial_language(&settings, &MemoryPreferences::new(), Some(Language::SPANISH)),
            Language::ENGLISH
        );
    }

    #[test]
    fn test_initial_language_system_not_allowed() {
        let settings = create_test_settings();
        assert_eq!(
            select_initial_language(&settings, &MemoryPreferences::new(), Some(french())),
            Language::ENGLISH
        );
    }

    // ==================== Init and Load Tests ====================

    #[test]
    fn test_init_loads_only_default_sheet() {
        let mut loc = create_localization();
        assert_eq!(loc.init(None), Language::ENGLISH);

        assert!(loc.is_loaded("Predefined"));
        assert!(!loc.is_loaded("Common"));
        assert_eq!(loc.get("title"), "Game");
    }

    #[test]
    fn test_load_all_keeps_configured_order() {
        let mut loc = create_localization();
        loc.init(None);
        loc.load_all();

        assert_eq!(loc.loaded_sheets().collect::<Vec<_>>(), vec!["Predefined", "Common"]);
    }

    #[test]
    fn test_missing_asset_yields_marker() {
        let source = MemorySource::default();
        let mut loc = Localization::new(create_test_settings(), source, MemoryPreferences::new());

        loc.init(None);
        assert!(loc.is_loaded("Predefined"));
        assert_eq!(loc.get("title"), "#!#title#!#");
    }

    // ==================== Lookup Tests ====================

    #[test]
    fn test_get_in_requested_sheet() {
        let mut loc = create_localization();
        loc.init(None);
        loc.load_all();

        assert_eq!(loc.get_in("ok", "Common"), "Okay");
        assert_eq!(loc.get_in("play", "Common"), "Play");
    }

    #[test]
    fn test_get_in_falls_back_to_default_sheet() {
        let mut loc = create_localization();
        loc.init(None);
        loc.load_all();

        assert_eq!(loc.get_in("title", "Common"), "Game");
        assert_eq!(loc.get_in("title", "NotASheet"), "Game");
    }

    #[test]
    fn test_get_unscoped_prefers_default_sheet() {
        let mut loc = create_localization();
        loc.init(None);
        loc.load_all();

        assert_eq!(loc.get("ok"), "OK");
        assert_eq!(loc.get("play"), "Play");
    }

    #[test]
    fn test_unknown_key_returns_marker() {
        let mut loc = create_localization();
        loc.init(None);
        loc.load_all();

        assert_eq!(loc.get("missingkey"), "#!#missingkey#!#");
        assert_eq!(loc.get_in("missingkey", "Common"), "#!#missingkey#!#");
        assert_eq!(loc.try_get("missingkey", None), None);
    }

    #[test]
    fn test_lookup_before_init_returns_marker() {
        let loc = create_localization();
        assert_eq!(loc.get("title"), "#!#title#!#");
    }

    #[test]
    fn test_metrics_track_lookups() {
        let mut loc = create_localization();
        loc.init(None);
        loc.load_all();

        loc.get_in("play", "Common");
        loc.get_in("title", "Common");
        loc.get("nope");

        assert_eq!(loc.metrics().hits(), 1);
        assert_eq!(loc.metrics().fallback_hits(), 1);
        assert_eq!(loc.metrics().misses(), 1);
    }

    // ==================== Switch Language Tests ====================

    #[test]
    fn test_switch_language_reloads_and_persists() {
        let mut loc = create_localization();
        loc.init(None);
        loc.load_all();

        assert_eq!(loc.switch_language(Language::SPANISH), Language::SPANISH);

        assert_eq!(loc.current_language(), Language::SPANISH);
        assert_eq!(loc.get("title"), "Juego");
        assert_eq!(loc.get_in("play", "Common"), "Jugar");
        assert!(loc.is_loaded("Common"));
        assert_eq!(loc.preferences().load_language(), Some(Language::SPANISH));
    }

    #[test]
    fn test_switch_language_notifies_listeners() {
        let mut loc = create_localization();
        loc.init(None);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        loc.on_language_changed(move |language| seen_clone.borrow_mut().push(language));

        loc.switch_language(Language::SPANISH);
        loc.switch_language(Language::ENGLISH);

        assert_eq!(*seen.borrow(), vec![Language::SPANISH, Language::ENGLISH]);
    }

    #[test]
    fn test_switch_to_disallowed_language_falls_back() {
        let mut loc = create_localization();
        loc.init(None);
        loc.switch_language(Language::SPANISH);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        loc.on_language_changed(move |language| seen_clone.borrow_mut().push(language));

        let selected = loc.switch_language(french());

        assert_eq!(selected, Language::ENGLISH);
        assert_eq!(loc.current_language(), Language::ENGLISH);
        assert_eq!(*seen.borrow(), vec![Language::ENGLISH]);
    }

    #[test]
    fn test_remove_listener() {
        let mut loc = create_localization();
        loc.init(None);
        let count = Rc::new(RefCell::new(0));
        let count_clone = count.clone();
        let id = loc.on_language_changed(move |_| *count_clone.borrow_mut() += 1);

        assert!(loc.remove_listener(id));
        assert!(!loc.remove_listener(id));
        loc.switch_language(Language::SPANISH);

        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_init_uses_language_persisted_by_switch() {
        let mut prefs = MemoryPreferences::new();
        prefs.save_language(Language::SPANISH).unwrap();
        let mut loc = Localization::new(create_test_settings(), create_source(), prefs);

        assert_eq!(loc.init(Some(Language::ENGLISH)), Language::SPANISH);
        assert_eq!(loc.get("ok"), "Vale");
    }

    // ==================== Teardown Tests ====================

    #[test]
    fn test_teardown_clears_everything() {
        let mut loc = create_localization();
        loc.init(None);
        loc.load_all();
        loc.on_language_changed(|_| panic!("listener should be gone"));
        loc.get("title");

        loc.teardown();

        assert_eq!(loc.loaded_sheets().count(), 0);
        assert_eq!(loc.metrics().report().lookups, 0);
        loc.switch_language(Language::SPANISH);
    }

    // ==================== KeyRef Tests ====================

    #[test]
    fn test_key_ref_parse() {
        assert_eq!(KeyRef::parse("play@Common"), KeyRef::new("play", Some("Common")));
        assert_eq!(KeyRef::parse("play"), KeyRef::new("play", None));
        assert_eq!(KeyRef::parse("mail@"), KeyRef::new("mail@", None));
    }

    #[test]
    fn test_key_ref_resolve() {
        let mut loc = create_localization();
        loc.init(None);
        loc.load_all();

        assert_eq!(KeyRef::new("play", Some("Common")).resolve(&loc), "Play");
        assert_eq!(KeyRef::new("title", None).resolve(&loc), "Game");
    }
}
