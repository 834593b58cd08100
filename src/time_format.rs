use crate::localization::Localization;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Sheet holding the `TimerFormat.*` keys unless told otherwise.
pub const COMMON_SHEET: &str = "Common";

/// Largest unit a duration is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn key(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "TimerFormat.Seconds",
            TimeUnit::Minutes => "TimerFormat.Minutes",
            TimeUnit::Hours => "TimerFormat.Hours",
            TimeUnit::Days => "TimerFormat.Days",
        }
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(\d+)\}").expect("placeholder pattern is valid"))
}

/// Replace `{0}`, `{1}`, ... with `args`. Out-of-range placeholders stay as-is.
pub fn substitute(template: &str, args: &[u64]) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| args.get(index))
                .map(u64::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Format `seconds` with the localized template of `unit`.
///
/// `{0}` is the whole count of `unit` and `{1}` the remainder in the next
/// smaller unit. When the count is zero the next smaller unit is used instead.
pub fn format_time(localization: &Localization, unit: TimeUnit, seconds: u64, sheet: &str) -> String {
    let (leading, remainder, smaller) = match unit {
        TimeUnit::Seconds => (seconds, 0, None),
        TimeUnit::Minutes => (seconds / 60, seconds % 60, Some(TimeUnit::Seconds)),
        TimeUnit::Hours => (seconds / 3_600, (seconds / 60) % 60, Some(TimeUnit::Minutes)),
        TimeUnit::Days => (seconds / 86_400, (seconds / 3_600) % 24, Some(TimeUnit::Hours)),
    };

    match smaller {
        Some(smaller) if leading == 0 => format_time(localization, smaller, seconds, sheet),
        _ => substitute(&localization.get_in(unit.key(), sheet), &[leading, remainder]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SheetInfo, Settings};
    use crate::error::{LocalizationError, Result};
    use crate::language::Language;
    use crate::localization::SheetSource;
    use crate::preferences::MemoryPreferences;
    use crate::sheet::Table;

    struct CommonOnly;

    impl SheetSource for CommonOnly {
        fn load_sheet(&self, _language: Language, sheet: &str) -> Result<Table> {
            if sheet != COMMON_SHEET {
                return Err(LocalizationError::UnknownSheet(sheet.to_string()));
            }
            Ok([
                ("TimerFormat.Seconds", "{0}s"),
                ("TimerFormat.Minutes", "{0}m {1}s"),
                ("TimerFormat.Hours", "{0}h {1}m"),
                ("TimerFormat.Days", "{0}d {1}h"),
            ]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect())
        }
    }

    fn create_localization() -> Localization {
        let settings = Settings {
            document_url: "https://docs.example.com".to_string(),
            sheets: vec![SheetInfo::new("Common", "1")],
            ..Settings::default()
        };
        let mut loc = Localization::new(settings, CommonOnly, MemoryPreferences::new());
        loc.init(None);
        loc.load_all();
        loc
    }

    // ==================== Substitution Tests ====================

    #[test]
    fn test_substitute() {
        assert_eq!(substitute("{0}m {1}s", &[3, 7]), "3m 7s");
        assert_eq!(substitute("{1} before {0}", &[1, 2]), "2 before 1");
        assert_eq!(substitute("{2} stays", &[1]), "{2} stays");
        assert_eq!(substitute("no placeholders", &[1]), "no placeholders");
    }

    // ==================== Format Tests ====================

    #[test]
    fn test_format_each_unit() {
        let loc = create_localization();
        assert_eq!(format_time(&loc, TimeUnit::Seconds, 125, COMMON_SHEET), "125s");
        assert_eq!(format_time(&loc, TimeUnit::Minutes, 125, COMMON_SHEET), "2m 5s");
        assert_eq!(format_time(&loc, TimeUnit::Hours, 7_380, COMMON_SHEET), "2h 3m");
        assert_eq!(format_time(&loc, TimeUnit::Days, 93_600, COMMON_SHEET), "1d 2h");
    }

    #[test]
    fn test_zero_leading_unit_cascades() {
        let loc = create_localization();
        assert_eq!(format_time(&loc, TimeUnit::Days, 3_720, COMMON_SHEET), "1h 2m");
        assert_eq!(format_time(&loc, TimeUnit::Days, 59, COMMON_SHEET), "59s");
        assert_eq!(format_time(&loc, TimeUnit::Hours, 0, COMMON_SHEET), "0s");
    }

    #[test]
    fn test_missing_template_returns_marker() {
        let loc = create_localization();
        assert_eq!(
            format_time(&loc, TimeUnit::Seconds, 5, "Other"),
            "#!#TimerFormat.Seconds#!#"
        );
    }
}
