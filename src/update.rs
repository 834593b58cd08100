//! Fetch → parse → validate → write, for every configured sheet or just one.

use crate::config::{SheetInfo, Settings};
use crate::error::{LocalizationError, Result};
use crate::fetch::SheetFetcher;
use crate::sheet::{parse, TableBuilder, ValidationReport};
use crate::store::AssetStore;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome of one update run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateSummary {
    pub sheets_updated: Vec<String>,
    /// Sheets whose download failed; their previous assets are kept
    pub sheets_failed: Vec<String>,
    pub files_written: usize,
    pub report: ValidationReport,
}

impl UpdateSummary {
    /// Number of validation errors across all processed sheets.
    pub fn unresolved_errors(&self) -> usize {
        self.report.error_count()
    }
}

pub struct Updater<'a> {
    settings: &'a Settings,
    fetcher: SheetFetcher,
    store: AssetStore,
}

impl<'a> Updater<'a> {
    pub fn new(settings: &'a Settings, client: reqwest::Client) -> Self {
        Self {
            settings,
            fetcher: SheetFetcher::new(client),
            store: AssetStore::from_settings(settings),
        }
    }

    pub fn with_fetcher(mut self, fetcher: SheetFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Regenerate every configured sheet from scratch.
    ///
    /// All sheets are downloaded first. Then the output folders are wiped,
    /// except for the assets of sheets that could not be fetched, and the
    /// fresh assets are written.
    pub async fn update_all(&self, progress: &mut dyn FnMut(&str, Duration)) -> Result<UpdateSummary> {
        info!("Updating {} sheets", self.settings.sheets.len());

        let mut summary = UpdateSummary::default();
        let mut fetched = Vec::with_capacity(self.settings.sheets.len());
        for sheet in &self.settings.sheets {
            if let Some(data) = self.download(sheet, progress, &mut summary).await {
                fetched.push((sheet, data));
            }
        }

        self.store.clear_except(&summary.sheets_failed)?;

        for (sheet, data) in fetched {
            self.write(sheet, &data, &mut summary)?;
        }

        info!(
            "Update finished: {} sheets written, {} failed, {} files",
            summary.sheets_updated.len(),
            summary.sheets_failed.len(),
            summary.files_written
        );
        Ok(summary)
    }

    /// Regenerate one sheet, overwriting only its own assets.
    pub async fn update_sheet(
        &self,
        name: &str,
        progress: &mut dyn FnMut(&str, Duration),
    ) -> Result<UpdateSummary> {
        let sheet = self
            .settings
            .sheet(name)
            .ok_or_else(|| LocalizationError::UnknownSheet(name.to_string()))?;

        let mut summary = UpdateSummary::default();
        if let Some(data) = self.download(sheet, progress, &mut summary).await {
            self.write(sheet, &data, &mut summary)?;
        }
        Ok(summary)
    }

    /// Fetch one sheet; a failure is logged and recorded, not returned.
    async fn download(
        &self,
        sheet: &SheetInfo,
        progress: &mut dyn FnMut(&str, Duration),
        summary: &mut UpdateSummary,
    ) -> Option<String> {
        let url = self.settings.sheet_url(sheet);

        match self.fetcher.fetch(sheet, &url, progress).await {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Skipping sheet {}: {}", sheet.name, e);
                summary.sheets_failed.push(sheet.name.clone());
                None
            }
        }
    }

    fn write(&self, sheet: &SheetInfo, data: &str, summary: &mut UpdateSummary) -> Result<()> {
        let (written, report) = self.import_text(&sheet.name, data)?;
        summary.files_written += written.len();
        summary.sheets_updated.push(sheet.name.clone());
        summary.report.merge(report);
        info!("Finish loading {}", sheet.name);
        Ok(())
    }

    /// Parse already-downloaded export text for `sheet_name` and write its
    /// assets.
    pub fn import_text(&self, sheet_name: &str, data: &str) -> Result<(Vec<PathBuf>, ValidationReport)> {
        let rows = parse(data, self.settings.format)?;
        let mut report = ValidationReport::new();
        let tables = TableBuilder::new(&self.settings.languages, self.settings.duplicate_policy)
            .build(sheet_name, &rows, &mut report);

        let written = self.store.write_sheet(&tables)?;
        Ok((written, report))
    }
}
