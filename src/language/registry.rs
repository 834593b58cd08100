//! Language catalog: every language a sheet header may name.
//!
//! The catalog is immutable and shared through a `OnceLock` singleton. Which
//! of these languages are actually shipped is decided per project by the
//! allow-list in [`crate::config::Settings`].

use std::sync::OnceLock;

/// Metadata for one catalog language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Name used in sheet headers, settings and asset folders (e.g. "English")
    pub name: &'static str,

    /// Short code (e.g. "EN", "ZH_CN")
    pub code: &'static str,
}

/// Global language catalog singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global catalog, building it on first access.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: catalog(),
        })
    }

    /// Look a language up by its header name. Surrounding whitespace is ignored.
    pub fn get_by_name(&self, name: &str) -> Option<&LanguageConfig> {
        let name = name.trim();
        self.languages.iter().find(|lang| lang.name == name)
    }

    /// Look a language up by its short code, case-insensitively.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        let code = code.trim();
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
    }

    /// All catalog languages, `Unknown` included.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }
}

macro_rules! lang {
    ($name:literal, $code:literal) => {
        LanguageConfig {
            name: $name,
            code: $code,
        }
    };
}

fn catalog() -> Vec<LanguageConfig> {
    vec![
        lang!("Afrikaans", "AF"),
        lang!("Arabic", "AR"),
        lang!("Basque", "BA"),
        lang!("Belarusian", "BE"),
        lang!("Bulgarian", "BG"),
        lang!("Catalan", "CA"),
        lang!("Chinese", "ZH"),
        lang!("Czech", "CS"),
        lang!("Danish", "DA"),
        lang!("Dutch", "NL"),
        lang!("English", "EN"),
        lang!("Estonian", "ET"),
        lang!("Faroese", "FA"),
        lang!("Finnish", "FI"),
        lang!("French", "FR"),
        lang!("German", "DE"),
        lang!("Greek", "EL"),
        lang!("Hebrew", "HE"),
        lang!("Hungarian", "HU"),
        lang!("Icelandic", "IS"),
        lang!("Indonesian", "ID"),
        lang!("Italian", "IT"),
        lang!("Japanese", "JA"),
        lang!("Korean", "KO"),
        lang!("Latvian", "LA"),
        lang!("Lithuanian", "LT"),
        lang!("Norwegian", "NO"),
        lang!("Polish", "PL"),
        lang!("Portuguese", "PT"),
        lang!("Romanian", "RO"),
        lang!("Russian", "RU"),
        lang!("SerboCroatian", "SH"),
        lang!("Slovak", "SK"),
        lang!("Slovenian", "SL"),
        lang!("Spanish", "ES"),
        lang!("Swedish", "SW"),
        lang!("Thai", "TH"),
        lang!("Turkish", "TR"),
        lang!("Ukrainian", "UK"),
        lang!("Vietnamese", "VI"),
        lang!("ChineseSimplified", "ZH_CN"),
        lang!("ChineseTraditional", "ZH_TW"),
        lang!("Unknown", "N"),
    ]
}
