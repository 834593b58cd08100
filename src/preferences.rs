//! Storage for the last language the user picked.

use crate::error::Result;
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Where the selected language survives between sessions.
pub trait PreferenceStore {
    /// The persisted language, if any and if it still names a catalog language.
    fn load_language(&self) -> Option<Language>;

    fn save_language(&mut self, language: Language) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    last_language: Option<String>,
}

/// JSON file holding `{"last_language": "<Name>"}`.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Option<PreferenceFile> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Ignoring unreadable preferences {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

impl PreferenceStore for FilePreferences {
    fn load_language(&self) -> Option<Language> {
        let name = self.read()?.last_language?;
        match Language::from_name(&name) {
            Ok(language) => Some(language),
            Err(e) => {
                warn!("Ignoring stored language: {}", e);
                None
            }
        }
    }

    fn save_language(&mut self, language: Language) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = PreferenceFile {
            last_language: Some(language.name().to_string()),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

/// Non-persistent store, for tests and embedders that keep their own state.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    language: Option<Language>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(language: Language) -> Self {
        Self {
            language: Some(language),
        }
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load_language(&self) -> Option<Language> {
        self.language
    }

    fn save_language(&mut self, language: Language) -> Result<()> {
        self.language = Some(language);
        Ok(())
    }
}
