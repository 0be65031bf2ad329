//! Column-level date normalization.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use crf_model::{Cell, Column, DateOptions, ImputeBias, Table};

use super::lenient::{DateParser, LenientDateParser};
use super::partial::{PartialOutcome, apply_rules};
use super::{ParsedDate, only_date};
use crate::columns::push_column;

/// Complete datetime formats tried by the bulk path, most specific first.
const BULK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
];

/// Complete date formats tried by the bulk path.
const BULK_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d-%B-%Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d.%m.%Y",
    "%Y%m%d",
];

#[derive(Debug, Clone, Copy)]
enum BulkFormat {
    DateTime(&'static str),
    Date(&'static str),
}

impl BulkFormat {
    fn parse(self, value: &str) -> Option<ParsedDate> {
        let parsed = match self {
            Self::DateTime(format) => {
                ParsedDate::DateTime(NaiveDateTime::parse_from_str(value, format).ok()?)
            }
            Self::Date(format) => ParsedDate::Date(NaiveDate::parse_from_str(value, format).ok()?),
        };
        // Two-digit years are never accepted in bulk.
        (parsed.date().year() >= 1000).then(|| parsed.truncated())
    }

    fn infer(value: &str) -> Option<(Self, ParsedDate)> {
        BULK_DATETIME_FORMATS
            .iter()
            .map(|format| Self::DateTime(format))
            .chain(BULK_DATE_FORMATS.iter().map(|format| Self::Date(format)))
            .find_map(|format| format.parse(value).map(|parsed| (format, parsed)))
    }
}

/// Parses and imputes date columns.
///
/// Carries the date used for current-year imputation and ages, and the
/// parser used for values no partial-date rule matches.
#[derive(Clone)]
pub struct DateNormalizer {
    today: NaiveDate,
    parser: Arc<dyn DateParser>,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DateNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateNormalizer")
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

impl DateNormalizer {
    /// Normalizer using the local date and [`LenientDateParser`].
    pub fn new() -> Self {
        Self {
            today: Local::now().date_naive(),
            parser: Arc::new(LenientDateParser),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_parser(mut self, parser: impl DateParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Single-value fallback parse of a trimmed string.
    pub fn parse_str(&self, value: &str, bias: ImputeBias) -> Option<ParsedDate> {
        match apply_rules(value, bias, self.today) {
            PartialOutcome::Parsed(parsed) => Some(parsed.truncated()),
            PartialOutcome::Invalid => None,
            PartialOutcome::NoMatch => self
                .parser
                .parse(value, bias, self.today)
                .map(ParsedDate::truncated),
        }
    }

    /// Single-value fallback parse of a cell.
    ///
    /// Missing and blank cells become missing, dates pass through, and a
    /// value that cannot be parsed is returned unchanged.
    pub fn parse_cell(&self, cell: &Cell, bias: ImputeBias) -> Cell {
        match cell {
            Cell::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Cell::Missing;
                }
                match self.parse_str(trimmed, bias) {
                    Some(parsed) => parsed.into(),
                    None => {
                        tracing::debug!(value = %text, "wrong date format");
                        cell.clone()
                    }
                }
            }
            other => other.clone(),
        }
    }

    /// Strict bulk parse of a whole column with one inferred format.
    ///
    /// Returns `None` as soon as any text value does not match the format
    /// inferred from the first one.
    pub fn bulk_parse(&self, cells: &[Cell]) -> Option<Vec<Cell>> {
        let mut format: Option<BulkFormat> = None;
        cells
            .iter()
            .map(|cell| match cell {
                Cell::Missing => Some(Cell::Missing),
                Cell::Date(_) | Cell::DateTime(_) => Some(cell.clone()),
                Cell::Text(text) if text.trim().is_empty() => Some(Cell::Missing),
                Cell::Text(text) => {
                    let text = text.trim();
                    let parsed = match format {
                        Some(known) => known.parse(text)?,
                        None => {
                            let (inferred, parsed) = BulkFormat::infer(text)?;
                            format = Some(inferred);
                            parsed
                        }
                    };
                    Some(parsed.into())
                }
                Cell::Int(_) | Cell::Float(_) => None,
            })
            .collect()
    }

    /// Per-value fallback over a whole column.
    pub fn fallback_parse(&self, cells: &[Cell], bias: ImputeBias) -> Vec<Cell> {
        cells.iter().map(|cell| self.parse_cell(cell, bias)).collect()
    }

    /// Converts a column in place: bulk path first, per-value fallback if any
    /// value defeats it.
    ///
    /// An unknown column is logged and the table returned unchanged.
    pub fn convert_column(&self, table: Table, column: &str, options: &DateOptions) -> Table {
        let Some(source) = table.column(column) else {
            tracing::error!(column, "there is no such column in the data");
            return table;
        };
        let values = match self.bulk_parse(&source.values) {
            Some(values) => values,
            None => {
                tracing::debug!(column, "bulk date parse failed, parsing value by value");
                let bias = options.bias_for(column);
                let values = self.fallback_parse(&source.values, bias);
                let unparsed = values.iter().filter(|cell| cell.as_text().is_some()).count();
                if unparsed > 0 {
                    tracing::debug!(column, unparsed, "values left unparsed");
                }
                values
            }
        };
        let values = if options.only_date {
            values.into_iter().map(only_date).collect()
        } else {
            values
        };
        push_column(table, Column::new(column, values))
    }

    /// Converts a column with an explicit `strftime` format.
    ///
    /// Values that do not match are left as they are.
    pub fn convert_date_format(&self, table: Table, column: &str, format: &str, only: bool) -> Table {
        let Some(source) = table.column(column) else {
            tracing::error!(column, "there is no such column in the data");
            return table;
        };
        let values: Vec<Cell> = source
            .values
            .iter()
            .map(|cell| {
                let Cell::Text(text) = cell else {
                    return cell.clone();
                };
                let parsed = parse_with_format(text.trim(), format).map(ParsedDate::truncated);
                let converted = parsed.map_or_else(|| cell.clone(), Cell::from);
                if only { only_date(converted) } else { converted }
            })
            .collect();
        push_column(table, Column::new(column, values))
    }
}

fn parse_with_format(value: &str, format: &str) -> Option<ParsedDate> {
    if let Ok(dt) = DateTime::parse_from_str(value, format) {
        return Some(ParsedDate::DateTime(dt.naive_local()));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
        return Some(ParsedDate::DateTime(dt));
    }
    NaiveDate::parse_from_str(value, format)
        .ok()
        .map(ParsedDate::Date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> DateNormalizer {
        DateNormalizer::new().with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn d(y: i32, m: u32, day: u32) -> Cell {
        Cell::Date(NaiveDate::from_ymd_opt(y, m, day).unwrap())
    }

    #[test]
    fn bulk_accepts_uniform_iso_dates() {
        let cells = vec![Cell::text("2016-01-02"), Cell::Missing, Cell::text(" 2017-03-04 ")];
        assert_eq!(
            normalizer().bulk_parse(&cells),
            Some(vec![d(2016, 1, 2), Cell::Missing, d(2017, 3, 4)])
        );
    }

    #[test]
    fn bulk_rejects_partial_dates() {
        let cells = vec![Cell::text("2016-01-02"), Cell::text("2016")];
        assert_eq!(normalizer().bulk_parse(&cells), None);
        assert_eq!(normalizer().bulk_parse(&[Cell::text("30-May-70")]), None);
    }

    #[test]
    fn bulk_truncates_subseconds() {
        let cells = vec![Cell::text("2020-09-29T16:23:45.733")];
        let parsed = normalizer().bulk_parse(&cells).unwrap();
        assert_eq!(parsed[0].to_string(), "2020-09-29T16:23:45");
    }

    #[test]
    fn fallback_keeps_unparseable_text() {
        let cells = vec![Cell::text("garbage"), Cell::text("  "), Cell::text("UN UNK 2016")];
        assert_eq!(
            normalizer().fallback_parse(&cells, ImputeBias::Start),
            vec![Cell::text("garbage"), Cell::Missing, d(2016, 1, 1)]
        );
    }

    #[test]
    fn parse_cell_passes_dates_through() {
        let date = d(2020, 1, 10);
        assert_eq!(normalizer().parse_cell(&date, ImputeBias::End), date);
    }

    #[test]
    fn convert_date_format_is_best_effort() {
        let table = Table::new(vec![Column::from_text(
            "VISDAT",
            [Some("02.01.2016"), Some("2016-01-02"), None],
        )])
        .unwrap();
        let table = normalizer().convert_date_format(table, "VISDAT", "%d.%m.%Y", false);
        assert_eq!(
            table.values("VISDAT").unwrap(),
            &[d(2016, 1, 2), Cell::text("2016-01-02"), Cell::Missing]
        );
    }

    #[test]
    fn convert_date_format_with_time_and_only_date() {
        let table = Table::new(vec![Column::from_text(
            "TS",
            [Some("2016-01-02 10:11:12.5")],
        )])
        .unwrap();
        let table = normalizer().convert_date_format(table, "TS", "%Y-%m-%d %H:%M:%S%.f", true);
        assert_eq!(table.values("TS").unwrap(), &[d(2016, 1, 2)]);
    }
}
