//! Spreadsheet-driven localization.
//!
//! [`update::Updater`] downloads each configured sheet, turns it into one
//! key/value table per language and writes the tables to disk through
//! [`store::AssetStore`]. [`localization::Localization`] reads them back for
//! the active language and answers lookups.

pub mod config;
pub mod error;
pub mod fetch;
pub mod language;
pub mod localization;
pub mod metrics;
pub mod preferences;
pub mod retry;
pub mod sheet;
pub mod store;
pub mod time_format;
pub mod update;

pub use config::{Settings, SheetInfo};
pub use error::{LocalizationError, Result};
pub use language::Language;
pub use localization::{KeyRef, Localization};
