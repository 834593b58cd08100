//! On-disk translation assets.
//!
//! Each (language, sheet) pair is one JSON file at
//! `{dir}/{Language}/{sheet}.json`, where `dir` is the default-sheet folder for
//! the default sheet and the other-sheets folder for everything else. When an
//! addressable group is configured, non-default sheets are also listed in
//! `{other_sheets_path}/catalog.json` under an address.

use crate::config::Settings;
use crate::error::{LocalizationError, Result};
use crate::language::Language;
use crate::sheet::{SheetTables, Table};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

const CATALOG_FILE: &str = "catalog.json";
const ASSET_EXTENSION: &str = "json";

/// Granularity of addressable catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressableMode {
    /// One address per asset file: `{Language}/{sheet}`
    #[default]
    PerFile,
    /// One address per language folder: `{Language}`
    PerFolder,
}

impl FromStr for AddressableMode {
    type Err = LocalizationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_file" | "file" => Ok(AddressableMode::PerFile),
            "per_folder" | "folder" => Ok(AddressableMode::PerFolder),
            other => Err(LocalizationError::InvalidSettings(format!(
                "unknown addressable mode '{}' (expected per_file or per_folder)",
                other
            ))),
        }
    }
}

/// One persisted key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageData {
    pub key: String,
    pub value: String,
}

/// Persisted table of one (language, sheet) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationAsset {
    pub language: Language,
    pub sheet: String,
    pub values: Vec<LanguageData>,
}

impl TranslationAsset {
    pub fn from_table(language: Language, sheet: &str, table: &Table) -> Self {
        Self {
            language,
            sheet: sheet.to_string(),
            values: table
                .iter()
                .map(|(key, value)| LanguageData {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }

    pub fn into_table(self) -> Table {
        self.values
            .into_iter()
            .map(|data| (data.key, data.value))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub address: String,
    /// Relative to the catalog folder
    pub path: PathBuf,
}

/// Addressable group listing of non-default sheet assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub group: String,
    pub mode: AddressableMode,
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    fn upsert(&mut self, entry: CatalogEntry) {
        match self.entries.iter_mut().find(|e| e.address == entry.address) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn find(&self, address: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.address == address)
    }
}

/// Reads and writes translation assets for one project layout.
#[derive(Debug, Clone)]
pub struct AssetStore {
    predefined_sheet: String,
    predefined_path: PathBuf,
    other_sheets_path: PathBuf,
    addressable_group: Option<String>,
    addressable_mode: AddressableMode,
}

impl AssetStore {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            predefined_sheet: settings.predefined_sheet.clone(),
            predefined_path: settings.predefined_path.clone(),
            other_sheets_path: settings.other_sheets_path.clone(),
            addressable_group: settings.addressable_group.clone(),
            addressable_mode: settings.addressable_mode,
        }
    }

    fn is_predefined(&self, sheet: &str) -> bool {
        sheet == self.predefined_sheet
    }

    fn base_dir(&self, sheet: &str) -> &Path {
        if self.is_predefined(sheet) {
            &self.predefined_path
        } else {
            &self.other_sheets_path
        }
    }

    /// Whether `sheet` is resolved through the catalog.
    fn is_addressable(&self, sheet: &str) -> bool {
        !self.is_predefined(sheet) && self.addressable_group.is_some()
    }

    fn relative_path(language: Language, sheet: &str) -> PathBuf {
        Path::new(language.name()).join(format!("{}.{}", sheet, ASSET_EXTENSION))
    }

    pub fn asset_path(&self, language: Language, sheet: &str) -> PathBuf {
        self.base_dir(sheet).join(Self::relative_path(language, sheet))
    }

    /// Catalog address of an asset under the configured mode.
    pub fn address(&self, language: Language, sheet: &str) -> String {
        match self.addressable_mode {
            AddressableMode::PerFile => format!("{}/{}", language.name(), sheet),
            AddressableMode::PerFolder => language.name().to_string(),
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.other_sheets_path.join(CATALOG_FILE)
    }

    /// Delete both output folders so a full regeneration starts from nothing.
    pub fn clear(&self) -> Result<()> {
        for dir in [&self.predefined_path, &self.other_sheets_path] {
            if dir.exists() {
                info!("Removing stale assets in {}", dir.display());
                std::fs::remove_dir_all(dir)?;
            }
        }
        Ok(())
    }

    /// Like [`AssetStore::clear`], but the assets (and catalog entries) of the
    /// sheets in `keep` survive. Used when some sheets could not be refreshed.
    pub fn clear_except(&self, keep: &[String]) -> Result<()> {
        if keep.is_empty() {
            return self.clear();
        }

        for dir in [&self.predefined_path, &self.other_sheets_path] {
            if !dir.exists() {
                continue;
            }
            for language_dir in std::fs::read_dir(dir)? {
                let language_dir = language_dir?.path();
                if !language_dir.is_dir() {
                    continue;
                }

                for asset in std::fs::read_dir(&language_dir)? {
                    let asset = asset?.path();
                    if asset.is_dir() {
                        std::fs::remove_dir_all(&asset)?;
                    } else if !is_asset_of(&asset, keep) {
                        std::fs::remove_file(&asset)?;
                    }
                }

                if std::fs::read_dir(&language_dir)?.next().is_none() {
                    std::fs::remove_dir(&language_dir)?;
                }
            }
        }

        info!("Removed stale assets, kept {}", keep.join(", "));
        self.prune_catalog()
    }

    /// Drop catalog entries whose target no longer exists.
    fn prune_catalog(&self) -> Result<()> {
        let Some(mut catalog) = self.read_catalog()? else {
            return Ok(());
        };

        catalog
            .entries
            .retain(|entry| self.other_sheets_path.join(&entry.path).exists());

        if catalog.entries.is_empty() {
            std::fs::remove_file(self.catalog_path())?;
        } else {
            std::fs::write(self.catalog_path(), serde_json::to_string_pretty(&catalog)?)?;
        }
        Ok(())
    }

    /// Write one asset per language of `tables`, returning the written paths.
    pub fn write_sheet(&self, tables: &SheetTables) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(tables.tables.len());

        for (language, table) in &tables.tables {
            let path = self.asset_path(*language, &tables.sheet);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let asset = TranslationAsset::from_table(*language, &tables.sheet, table);
            std::fs::write(&path, serde_json::to_string_pretty(&asset)?)?;
            debug!("Wrote {} ({} keys)", path.display(), table.len());
            written.push(path);
        }

        if self.is_addressable(&tables.sheet) && !tables.tables.is_empty() {
            self.register(tables)?;
        }

        Ok(written)
    }

    fn register(&self, tables: &SheetTables) -> Result<()> {
        let Some(group) = &self.addressable_group else {
            return Ok(());
        };

        let mut catalog = match self.read_catalog()? {
            Some(catalog) if catalog.group == *group && catalog.mode == self.addressable_mode => catalog,
            _ => Catalog {
                group: group.clone(),
                mode: self.addressable_mode,
                entries: Vec::new(),
            },
        };

        for language in tables.languages() {
            let path = match self.addressable_mode {
                AddressableMode::PerFile => Self::relative_path(language, &tables.sheet),
                AddressableMode::PerFolder => PathBuf::from(language.name()),
            };
            catalog.upsert(CatalogEntry {
                address: self.address(language, &tables.sheet),
                path,
            });
        }

        std::fs::create_dir_all(&self.other_sheets_path)?;
        std::fs::write(self.catalog_path(), serde_json::to_string_pretty(&catalog)?)?;
        debug!(
            "Catalog {} now lists {} entries",
            catalog.group,
            catalog.entries.len()
        );
        Ok(())
    }

    pub fn read_catalog(&self) -> Result<Option<Catalog>> {
        let path = self.catalog_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Where to read the asset of (language, sheet) from.
    fn resolve(&self, language: Language, sheet: &str) -> Result<PathBuf> {
        if !self.is_addressable(sheet) {
            return Ok(self.asset_path(language, sheet));
        }

        let address = self.address(language, sheet);
        let catalog = self
            .read_catalog()?
            .ok_or_else(|| LocalizationError::UnknownSheet(address.clone()))?;
        let entry = catalog
            .find(&address)
            .ok_or_else(|| LocalizationError::UnknownSheet(address.clone()))?;

        let base = self.other_sheets_path.join(&entry.path);
        Ok(match catalog.mode {
            AddressableMode::PerFile => base,
            AddressableMode::PerFolder => base.join(format!("{}.{}", sheet, ASSET_EXTENSION)),
        })
    }

    /// Read the table of (language, sheet).
    pub fn load_sheet(&self, language: Language, sheet: &str) -> Result<Table> {
        let path = self.resolve(language, sheet)?;
        let contents = std::fs::read_to_string(&path)?;
        let asset: TranslationAsset = serde_json::from_str(&contents)?;
        Ok(asset.into_table())
    }
}

fn is_asset_of(path: &Path, sheets: &[String]) -> bool {
    path.extension().is_some_and(|ext| ext == ASSET_EXTENSION)
        && path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| sheets.iter().any(|sheet| sheet == stem))
}
