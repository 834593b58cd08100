//! Validation findings collected while building translation tables.
//!
//! Nothing here aborts a run: issues are logged when recorded and counted so
//! the caller can surface the number of unresolved errors.

use crate::language::Language;
use serde::Serialize;
use std::fmt;
use tracing::{error, warn};

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// The header row names no language columns
    NoLanguages,
    /// A key appears on more than one row
    DuplicateKey { key: String },
    /// A key has an empty cell for a language
    EmptyValue { language: Language, key: String },
    /// A key exists in another language's table but not in this one
    MissingKey { language: Language, key: String },
}

/// One finding for one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub sheet: String,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::NoLanguages => write!(f, "Sheet {} contains no languages", self.sheet),
            IssueKind::DuplicateKey { key } => {
                write!(f, "Sheet({}) duplicate key [{}]", self.sheet, key)
            }
            IssueKind::EmptyValue { language, key } => {
                write!(f, "Sheet({}) [{}] [{}] value is empty", self.sheet, language, key)
            }
            IssueKind::MissingKey { language, key } => {
                write!(f, "Sheet({}) [{}] [{}] key is missing", self.sheet, language, key)
            }
        }
    }
}

/// Every issue found during one or more sheet builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an issue at its severity and keep it.
    pub fn record(&mut self, sheet: &str, severity: Severity, kind: IssueKind) {
        let issue = Issue {
            sheet: sheet.to_string(),
            severity,
            kind,
        };
        match severity {
            Severity::Error => error!("{}", issue),
            Severity::Warning => warn!("{}", issue),
        }
        self.issues.push(issue);
    }

    /// Append the issues of another report without logging them again.
    pub fn merge(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
    }

    /// Number of unresolved errors
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
