use crate::error::{LocalizationError, Result};
use crate::language::Language;
use crate::sheet::{DuplicatePolicy, SheetFormat};
use crate::store::AddressableMode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One remote tab of the shared document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub name: String,
    /// Tab id (`gid`) inside the document
    pub id: String,
}

impl SheetInfo {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Source
    pub document_url: String,
    pub sheets: Vec<SheetInfo>,
    pub format: SheetFormat,

    // Languages
    /// Allow-list: only these languages are persisted and selectable
    pub languages: Vec<Language>,
    pub default_language: Language,
    pub use_system_language: bool,

    // Sheets and output
    /// Sheet loaded eagerly and used as lookup fallback
    pub predefined_sheet: String,
    pub predefined_path: PathBuf,
    pub other_sheets_path: PathBuf,
    /// Addressable group for non-default sheets; `None` disables the catalog
    pub addressable_group: Option<String>,
    pub addressable_mode: AddressableMode,

    // Validation
    pub duplicate_policy: DuplicatePolicy,

    // Runtime
    pub preferences_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            document_url: String::new(),
            sheets: Vec::new(),
            format: SheetFormat::Csv,
            languages: vec![Language::ENGLISH],
            default_language: Language::ENGLISH,
            use_system_language: true,
            predefined_sheet: "Predefined".to_string(),
            predefined_path: PathBuf::from("localization/resources/languages"),
            other_sheets_path: PathBuf::from("localization/languages"),
            addressable_group: Some("Localization".to_string()),
            addressable_mode: AddressableMode::PerFile,
            duplicate_policy: DuplicatePolicy::Overwrite,
            preferences_file: PathBuf::from("localization/preferences.json"),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let defaults = Settings::default();

        Ok(Self {
            // Source
            document_url: std::env::var("LOCALIZATION_DOCUMENT_URL")
                .map_err(|_| LocalizationError::Env("LOCALIZATION_DOCUMENT_URL"))?,
            sheets: parse_sheets(
                &std::env::var("LOCALIZATION_SHEETS")
                    .map_err(|_| LocalizationError::Env("LOCALIZATION_SHEETS"))?,
            )?,
            format: match std::env::var("LOCALIZATION_FORMAT") {
                Ok(v) => v.parse()?,
                Err(_) => defaults.format,
            },

            // Languages
            languages: match std::env::var("LOCALIZATION_LANGUAGES") {
                Ok(v) => parse_languages(&v)?,
                Err(_) => defaults.languages,
            },
            default_language: match std::env::var("LOCALIZATION_DEFAULT_LANGUAGE") {
                Ok(v) => Language::from_name(&v)?,
                Err(_) => defaults.default_language,
            },
            use_system_language: std::env::var("LOCALIZATION_USE_SYSTEM_LANGUAGE")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.use_system_language),

            // Sheets and output
            predefined_sheet: std::env::var("LOCALIZATION_PREDEFINED_SHEET")
                .unwrap_or(defaults.predefined_sheet),
            predefined_path: std::env::var("LOCALIZATION_PREDEFINED_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.predefined_path),
            other_sheets_path: std::env::var("LOCALIZATION_OTHER_SHEETS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.other_sheets_path),
            addressable_group: match std::env::var("LOCALIZATION_ADDRESSABLE_GROUP") {
                Ok(v) if v.trim().is_empty() => None,
                Ok(v) => Some(v.trim().to_string()),
                Err(_) => defaults.addressable_group,
            },
            addressable_mode: match std::env::var("LOCALIZATION_ADDRESSABLE_MODE") {
                Ok(v) => v.parse()?,
                Err(_) => defaults.addressable_mode,
            },

            // Validation
            duplicate_policy: match std::env::var("LOCALIZATION_DUPLICATE_POLICY") {
                Ok(v) => v.parse()?,
                Err(_) => defaults.duplicate_policy,
            },

            // Runtime
            preferences_file: std::env::var("LOCALIZATION_PREFERENCES_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.preferences_file),
        })
    }

    /// Load from the JSON file named by `LOCALIZATION_SETTINGS_FILE` when set,
    /// otherwise from the environment.
    pub fn from_env_or_file() -> Result<Self> {
        match std::env::var("LOCALIZATION_SETTINGS_FILE") {
            Ok(path) => Settings::load(path),
            Err(_) => Settings::from_env(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Check the settings for mistakes that would make an update or a lookup
    /// session meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.document_url.trim().is_empty() {
            return Err(invalid("document URL is empty"));
        }
        if self.languages.is_empty() {
            return Err(invalid("language allow-list is empty"));
        }
        if self.languages.contains(&Language::UNKNOWN) {
            return Err(invalid("language allow-list contains Unknown"));
        }
        if !self.is_allowed(self.default_language) {
            return Err(invalid(&format!(
                "default language {} is not in the allow-list",
                self.default_language
            )));
        }

        let mut names = HashSet::new();
        for sheet in &self.sheets {
            if sheet.name.trim().is_empty() {
                return Err(invalid("sheet with an empty name"));
            }
            if !names.insert(sheet.name.as_str()) {
                return Err(invalid(&format!("sheet {} is listed twice", sheet.name)));
            }
        }

        if self.predefined_path.as_os_str().is_empty() || self.other_sheets_path.as_os_str().is_empty() {
            return Err(invalid("output paths must not be empty"));
        }
        if self.predefined_path == self.other_sheets_path {
            return Err(invalid("default and other sheet paths must differ"));
        }

        Ok(())
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetInfo> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// Export URL of one sheet.
    pub fn sheet_url(&self, sheet: &SheetInfo) -> String {
        format!("{}&gid={}", self.document_url, sheet.id)
    }

    pub fn is_allowed(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    /// First language of the allow-list, or the default language if the list is empty.
    pub fn first_allowed(&self) -> Language {
        self.languages
            .first()
            .copied()
            .unwrap_or(self.default_language)
    }
}

fn invalid(message: &str) -> LocalizationError {
    LocalizationError::InvalidSettings(message.to_string())
}

/// Parse `name:id,name:id`.
fn parse_sheets(value: &str) -> Result<Vec<SheetInfo>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .rsplit_once(':')
                .map(|(name, id)| SheetInfo::new(name.trim(), id.trim()))
                .filter(|sheet| !sheet.name.is_empty() && !sheet.id.is_empty())
                .ok_or_else(|| invalid(&format!("sheet entry '{}' is not name:id", entry)))
        })
        .collect()
}

fn parse_languages(value: &str) -> Result<Vec<Language>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Language::from_name)
        .collect()
}
