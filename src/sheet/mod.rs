//! Sheet conversion: delimited text in, per-language translation tables out.
//!
//! - `parser`: CSV/TSV reading
//! - `escape`: XML entity unescaping for cell values
//! - `builder`: header handling, duplicate policy, cross-language key checks
//! - `report`: the issues found along the way

pub mod builder;
pub mod escape;
pub mod parser;
pub mod report;

use indexmap::IndexMap;

/// Key to localized string for one (language, sheet) pair, in sheet row order.
pub type Table = IndexMap<String, String>;

pub use builder::{DuplicatePolicy, SheetTables, TableBuilder};
pub use parser::{parse, SheetFormat};
pub use report::{Issue, IssueKind, Severity, ValidationReport};
