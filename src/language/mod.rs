//! Language catalog and the validated [`Language`] type.
//!
//! - `registry`: every language name a sheet header may use, with short codes
//! - `language`: `Language`, a `Copy` handle that can only name catalog entries

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
