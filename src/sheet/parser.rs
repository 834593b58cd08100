//! Reading delimited sheet exports into rows and cells.
//!
//! Comma exports are quote-aware: a quoted cell may hold the delimiter, line
//! breaks and doubled quotes. Tab exports are never quoted, so a `"` inside a
//! tab-separated cell is kept as a literal character.

use crate::error::{LocalizationError, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Delimiter scheme of a sheet export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetFormat {
    /// Comma separated values
    #[default]
    Csv,
    /// Tab separated values
    Tsv,
}

impl SheetFormat {
    pub fn delimiter_byte(self) -> u8 {
        match self {
            SheetFormat::Csv => b',',
            SheetFormat::Tsv => b'\t',
        }
    }

    fn is_quoted(self) -> bool {
        matches!(self, SheetFormat::Csv)
    }
}

impl FromStr for SheetFormat {
    type Err = LocalizationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(SheetFormat::Csv),
            "tsv" => Ok(SheetFormat::Tsv),
            other => Err(LocalizationError::InvalidSettings(format!(
                "unknown sheet format '{}' (expected csv or tsv)",
                other
            ))),
        }
    }
}

/// Parse a whole export into rows of cells.
///
/// Rows may have any number of cells; a trailing delimiter yields a trailing
/// empty cell. Blank lines produce no row and CRLF line ends are accepted.
pub fn parse(data: &str, format: SheetFormat) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(format.delimiter_byte())
        .quoting(format.is_quoted())
        .from_reader(data.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn csv(data: &str) -> Vec<Vec<String>> {
        parse(data, SheetFormat::Csv).unwrap()
    }

    fn tsv(data: &str) -> Vec<Vec<String>> {
        parse(data, SheetFormat::Tsv).unwrap()
    }

    // ==================== Row Tests ====================

    #[test]
    fn test_rows_lf() {
        assert_eq!(csv("a,b\nc,d\n"), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_rows_crlf() {
        assert_eq!(csv("a,b\r\nc,d\r\n"), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_trailing_row_without_terminator() {
        assert_eq!(csv("a,b\nc"), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_quoted_newline_stays_in_cell() {
        assert_eq!(
            csv("key,\"line one\nline two\"\nnext,x"),
            vec![vec!["key", "line one\nline two"], vec!["next", "x"]]
        );
    }

    #[test]
    fn test_blank_lines_skipped() {
        assert_eq!(csv("a\n\n\r\nb"), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_empty_input() {
        assert!(csv("").is_empty());
    }

    // ==================== CSV Cell Tests ====================

    #[test]
    fn test_cells_simple() {
        assert_eq!(csv("key,Hello,Hola"), vec![vec!["key", "Hello", "Hola"]]);
    }

    #[test]
    fn test_quoted_delimiter() {
        assert_eq!(
            csv("key,\"Hello, world\",Hola"),
            vec![vec!["key", "Hello, world", "Hola"]]
        );
    }

    #[test]
    fn test_doubled_quotes_collapse() {
        assert_eq!(csv("key,\"say \"\"hi\"\"\""), vec![vec!["key", "say \"hi\""]]);
    }

    #[test]
    fn test_quote_inside_unquoted_cell_is_literal() {
        assert_eq!(csv("screen,5\" display"), vec![vec!["screen", "5\" display"]]);
    }

    #[test]
    fn test_trailing_empty_cell() {
        assert_eq!(csv("key,Hello,"), vec![vec!["key", "Hello", ""]]);
    }

    #[test]
    fn test_empty_key_cell() {
        assert_eq!(csv(",label"), vec![vec!["", "label"]]);
    }

    #[test]
    fn test_rows_of_different_widths() {
        assert_eq!(csv("a,b,c\nd"), vec![vec!["a", "b", "c"], vec!["d"]]);
    }

    #[test]
    fn test_multibyte_cells() {
        assert_eq!(csv("ключ,Привет,你好"), vec![vec!["ключ", "Привет", "你好"]]);
    }

    // ==================== TSV Tests ====================

    #[test]
    fn test_tsv_commas_are_text() {
        assert_eq!(tsv("key\tHello, world\tHola"), vec![vec!["key", "Hello, world", "Hola"]]);
    }

    #[test]
    fn test_tsv_stray_quote_does_not_swallow_rows() {
        let rows = tsv("Key\tEnglish\nscreen\t5\" display\nplay\tPlay\nquit\tQuit\n");

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], vec!["screen", "5\" display"]);
        assert_eq!(rows[3], vec!["quit", "Quit"]);
    }

    #[test]
    fn test_tsv_leading_quote_kept() {
        let rows = tsv("Key\tEnglish\nmotto\t\"Play\" now\n");
        assert_eq!(rows[1][1], "\"Play\" now");
    }

    #[test]
    fn test_tsv_trailing_empty_cell_and_crlf() {
        assert_eq!(tsv("key\tHello\t\r\n"), vec![vec!["key", "Hello", ""]]);
    }

    // ==================== Format Tests ====================

    #[test]
    fn test_sheet_format_from_str() {
        assert_eq!("csv".parse::<SheetFormat>().unwrap(), SheetFormat::Csv);
        assert_eq!(" TSV ".parse::<SheetFormat>().unwrap(), SheetFormat::Tsv);
        assert!("xlsx".parse::<SheetFormat>().is_err());
    }

    #[test]
    fn test_parse_full_document() {
        let rows = csv("Key,English,Spanish\r\nhello,Hello,Hola\r\nbye,\"Bye, bye\",Adiós");

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Key", "English", "Spanish"]);
        assert_eq!(rows[2], vec!["bye", "Bye, bye", "Adiós"]);
    }

    // ==================== Property Tests ====================

    proptest! {
        #[test]
        fn prop_quoted_value_roundtrips(value in "[a-zA-Z0-9 ,;\t\n\"']{0,24}") {
            let encoded = format!("\"{}\"", value.replace('"', "\"\""));
            let data = format!("Key,English\nsome.key,{}\n", encoded);

            let rows = csv(&data);

            prop_assert_eq!(rows.len(), 2);
            prop_assert_eq!(rows[1].len(), 2);
            prop_assert_eq!(&rows[1][1], &value);
        }

        #[test]
        fn prop_tsv_cells_split_on_every_tab(cells in proptest::collection::vec("[a-z0-9 \",]{1,8}", 1..6)) {
            let row = cells.join("\t");
            prop_assert_eq!(tsv(&row), vec![cells]);
        }
    }
}
