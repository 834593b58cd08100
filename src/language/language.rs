//! Language type: a catalog-validated language identifier.

use crate::error::{LocalizationError, Result};
use crate::language::{LanguageConfig, LanguageRegistry};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::error;

/// A language known to the catalog.
///
/// Only constructible from catalog entries, so every `Language` maps back to
/// a [`LanguageConfig`]. Serializes as its header name (e.g. `"English"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Language {
    name: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { name: "English" };
    pub const SPANISH: Language = Language { name: "Spanish" };
    pub const UNKNOWN: Language = Language { name: "Unknown" };

    /// Create a Language from a header name such as `"German"`.
    ///
    /// # Returns
    /// * `Ok(Language)` if the name is in the catalog
    /// * `Err(LocalizationError::UnknownLanguage)` otherwise
    pub fn from_name(name: &str) -> Result<Language> {
        LanguageRegistry::get()
            .get_by_name(name)
            .map(|config| Language { name: config.name })
            .ok_or_else(|| LocalizationError::UnknownLanguage(name.trim().to_string()))
    }

    /// Create a Language from its short code such as `"DE"`.
    pub fn from_code(code: &str) -> Result<Language> {
        LanguageRegistry::get()
            .get_by_code(code)
            .map(|config| Language { name: config.name })
            .ok_or_else(|| LocalizationError::UnknownLanguage(code.trim().to_string()))
    }

    /// Map a header name to a language, logging and defaulting to
    /// [`Language::UNKNOWN`] when the name is not in the catalog.
    pub fn parse_or_unknown(name: &str) -> Language {
        match Language::from_name(name) {
            Ok(language) => language,
            Err(e) => {
                error!("{}, defaulting to {}", e, Language::UNKNOWN);
                Language::UNKNOWN
            }
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn code(&self) -> &'static str {
        self.config().code
    }

    /// Full catalog entry for this language.
    ///
    /// # Panics
    /// Never in practice: a `Language` can only be built from catalog names.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_name(self.name)
            .expect("Language name should always be in the catalog")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Language::from_name(&name).map_err(serde::de::Error::custom)
    }
}
