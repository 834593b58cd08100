//! Translation-table builder.
//!
//! Turns parsed rows into one key/value table per allowed language and checks
//! the tables against each other. The first row is the header: cell 0 is the
//! key column, every other non-empty cell names a language.

use crate::error::LocalizationError;
use crate::language::Language;
use crate::sheet::escape::unescape_xml;
use crate::sheet::report::{IssueKind, Severity, ValidationReport};
use crate::sheet::Table;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{debug, warn};

/// What to do when a key shows up on more than one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Later rows replace earlier ones; reported as a warning
    #[default]
    Overwrite,
    /// The first row wins; reported as a warning
    KeepFirst,
    /// The first row wins; reported as an error
    Reject,
}

impl DuplicatePolicy {
    fn severity(self) -> Severity {
        match self {
            DuplicatePolicy::Reject => Severity::Error,
            DuplicatePolicy::Overwrite | DuplicatePolicy::KeepFirst => Severity::Warning,
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = LocalizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(DuplicatePolicy::Overwrite),
            "keep_first" | "keep-first" => Ok(DuplicatePolicy::KeepFirst),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(LocalizationError::InvalidSettings(format!(
                "unknown duplicate policy '{}' (expected overwrite, keep_first or reject)",
                other
            ))),
        }
    }
}

/// Tables built from one sheet, keyed by language in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTables {
    pub sheet: String,
    pub tables: IndexMap<Language, Table>,
}

impl SheetTables {
    pub fn get(&self, language: Language) -> Option<&Table> {
        self.tables.get(&language)
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.tables.keys().copied()
    }
}

/// Builds [`SheetTables`] for the allowed languages of a project.
#[derive(Debug, Clone)]
pub struct TableBuilder<'a> {
    allowed: &'a [Language],
    policy: DuplicatePolicy,
}

impl<'a> TableBuilder<'a> {
    pub fn new(allowed: &'a [Language], policy: DuplicatePolicy) -> Self {
        Self { allowed, policy }
    }

    /// Build the tables for one sheet, recording every issue into `report`.
    ///
    /// Columns naming languages outside the allow-list are dropped without
    /// any report. Rows with an empty key are labels and are skipped.
    pub fn build(&self, sheet: &str, rows: &[Vec<String>], report: &mut ValidationReport) -> SheetTables {
        let mut result = SheetTables {
            sheet: sheet.to_string(),
            tables: IndexMap::new(),
        };

        let Some((header, body)) = rows.split_first() else {
            report.record(sheet, Severity::Error, IssueKind::NoLanguages);
            return result;
        };

        let columns = self.language_columns(sheet, header);
        if columns.is_empty() {
            report.record(sheet, Severity::Error, IssueKind::NoLanguages);
            return result;
        }

        let kept: Vec<(usize, Language)> = columns
            .into_iter()
            .filter(|(_, language)| self.allowed.contains(language))
            .collect();
        for (_, language) in &kept {
            result.tables.insert(*language, Table::new());
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for row in body {
            if row.len() < 2 {
                continue;
            }
            let key = row[0].as_str();
            if key.is_empty() {
                continue;
            }

            let duplicate = !seen.insert(key);
            if duplicate {
                report.record(
                    sheet,
                    self.policy.severity(),
                    IssueKind::DuplicateKey {
                        key: key.to_string(),
                    },
                );
            }

            for (column, language) in &kept {
                let Some(raw) = row.get(*column) else {
                    continue;
                };
                let Some(table) = result.tables.get_mut(language) else {
                    continue;
                };
                if table.contains_key(key) && self.policy != DuplicatePolicy::Overwrite {
                    continue;
                }

                let value = unescape_xml(raw);
                if value.is_empty() {
                    report.record(
                        sheet,
                        Severity::Warning,
                        IssueKind::EmptyValue {
                            language: *language,
                            key: key.to_string(),
                        },
                    );
                }
                table.insert(key.to_string(), value);
            }
        }

        check_missing_keys(sheet, &result, report);

        debug!(
            "Built sheet {}: {} languages, {} keys in reference language",
            sheet,
            result.tables.len(),
            result.tables.first().map(|(_, t)| t.len()).unwrap_or(0)
        );

        result
    }

    /// Header cells after the key column that name a language.
    fn language_columns(&self, sheet: &str, header: &[String]) -> Vec<(usize, Language)> {
        let mut columns: Vec<(usize, Language)> = Vec::new();
        for (index, cell) in header.iter().enumerate().skip(1) {
            let name = cell.trim();
            if name.is_empty() {
                continue;
            }
            let language = Language::parse_or_unknown(name);
            if language != Language::UNKNOWN && columns.iter().any(|(_, l)| *l == language) {
                warn!(
                    "Sheet {}: language {} appears in more than one column, keeping the first",
                    sheet, language
                );
                continue;
            }
            columns.push((index, language));
        }
        columns
    }
}

/// Compare every table against the first (reference) one, both ways.
fn check_missing_keys(sheet: &str, tables: &SheetTables, report: &mut ValidationReport) {
    let mut iter = tables.tables.iter();
    let Some((reference_language, reference)) = iter.next() else {
        return;
    };

    for (language, table) in iter {
        for key in table.keys() {
            if !reference.contains_key(key) {
                report.record(
                    sheet,
                    Severity::Error,
                    IssueKind::MissingKey {
                        language: *reference_language,
                        key: key.clone(),
                    },
                );
            }
        }
        for key in reference.keys() {
            if !table.contains_key(key) {
                report.record(
                    sheet,
                    Severity::Error,
                    IssueKind::MissingKey {
                        language: *language,
                        key: key.clone(),
                    },
                );
            }
        }
    }
}
