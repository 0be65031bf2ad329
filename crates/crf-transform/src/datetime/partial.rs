//! Fixed partial-date rules.
//!
//! Rules are tried in order and the first match wins:
//!
//! | pattern                    | example                  | known components   |
//! |----------------------------|--------------------------|--------------------|
//! | `UN UNK YYYY`              | `UN UNK 2016`            | year               |
//! | `DDMONYYYY:HH:MM:SS.mmm`   | `29SEP2020:16:23:45.733` | full timestamp     |
//! | `DD---YYYY`, `DD/---/YYYY` | `02---2016`              | day, year          |
//! | `YYYY-----`, `YYYY/---/--` | `2018-----`              | year               |
//! | `DD/MON/----`              | `05/Jan/----`            | day, month         |
//! | `UN MON YYYY`              | `UN-FEB-2016`            | month, year        |
//! | `YYYY`                     | `2016`                   | year               |

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use crf_model::ImputeBias;
use regex::{Captures, Regex};

use super::ParsedDate;

/// Components recovered from a partial date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartialDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub time: Option<(u32, u32, u32)>,
}

impl PartialDate {
    /// Fills missing components.
    ///
    /// A missing year is the current year. A missing month or day is the
    /// first or last of its period depending on `bias`.
    pub fn impute(&self, bias: ImputeBias, today: NaiveDate) -> Option<ParsedDate> {
        let year = self.year.unwrap_or_else(|| today.year());
        let month = self.month.unwrap_or(match bias {
            ImputeBias::Start => 1,
            ImputeBias::End => 12,
        });
        let day = match (self.day, bias) {
            (Some(day), _) => day,
            (None, ImputeBias::Start) => 1,
            (None, ImputeBias::End) => last_day_of_month(year, month)?,
        };
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        match self.time {
            Some((hour, minute, second)) => date
                .and_hms_opt(hour, minute, second)
                .map(ParsedDate::DateTime),
            None => Some(ParsedDate::Date(date)),
        }
    }

    fn missing_components(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.year.is_none() {
            missing.push("year");
        }
        if self.month.is_none() {
            missing.push("month");
        }
        if self.day.is_none() {
            missing.push("day");
        }
        missing
    }
}

/// Result of running the partial-date rules over one string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialOutcome {
    NoMatch,
    Parsed(ParsedDate),
    /// A rule matched but its components do not form a calendar date.
    Invalid,
}

type Extract = fn(&Captures<'_>) -> Option<PartialDate>;

static RULES: LazyLock<Vec<(Regex, Extract)>> = LazyLock::new(|| {
    let rules: [(&str, Extract); 7] = [
        (r"^UN UNK (\d{4})$", |c| {
            Some(PartialDate {
                year: number(c, 1),
                ..PartialDate::default()
            })
        }),
        (
            r"^(\d{2})([A-Za-z]{3})(\d{4}):(\d{2}):(\d{2}):(\d{2})(?:\.\d+)?$",
            |c| {
                Some(PartialDate {
                    year: number(c, 3),
                    month: Some(month_from_name(&c[2])?),
                    day: number(c, 1),
                    time: Some((number(c, 4)?, number(c, 5)?, number(c, 6)?)),
                })
            },
        ),
        (r"^(\d{2})(?:---|[-/]---[-/])(\d{4})$", |c| {
            Some(PartialDate {
                year: number(c, 2),
                day: number(c, 1),
                ..PartialDate::default()
            })
        }),
        (r"^(\d{4})(?:-----|[-/]---[-/]--)$", |c| {
            Some(PartialDate {
                year: number(c, 1),
                ..PartialDate::default()
            })
        }),
        (r"^(\d{2})[-/]([A-Za-z]{3})[-/]----$", |c| {
            Some(PartialDate {
                month: Some(month_from_name(&c[2])?),
                day: number(c, 1),
                ..PartialDate::default()
            })
        }),
        (r"^UN[-/\s]([A-Za-z]{3})[-/\s](\d{4})$", |c| {
            Some(PartialDate {
                year: number(c, 2),
                month: Some(month_from_name(&c[1])?),
                ..PartialDate::default()
            })
        }),
        (r"^(\d{4})$", |c| {
            Some(PartialDate {
                year: number(c, 1),
                ..PartialDate::default()
            })
        }),
    ];
    rules
        .into_iter()
        .map(|(pattern, extract)| {
            (
                Regex::new(pattern).expect("Invalid partial date regex"),
                extract,
            )
        })
        .collect()
});

fn number<T: std::str::FromStr>(captures: &Captures<'_>, group: usize) -> Option<T> {
    captures.get(group)?.as_str().parse().ok()
}

/// Runs the partial-date rules over a trimmed value.
pub fn apply_rules(value: &str, bias: ImputeBias, today: NaiveDate) -> PartialOutcome {
    for (pattern, extract) in RULES.iter() {
        let Some(captures) = pattern.captures(value) else {
            continue;
        };
        let Some(partial) = extract(&captures) else {
            return PartialOutcome::Invalid;
        };
        let missing = partial.missing_components();
        if !missing.is_empty() {
            tracing::debug!(value, missing = ?missing, "imputing partial date");
        }
        return partial
            .impute(bias, today)
            .map_or(PartialOutcome::Invalid, PartialOutcome::Parsed);
    }
    PartialOutcome::NoMatch
}

/// Last day of a month, following leap-year rules.
pub(crate) fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|date| date.day())
}

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Month number from an English name or three-letter abbreviation.
pub(crate) fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    if lower == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .position(|month| *month == lower || (lower.len() == 3 && month.starts_with(&lower)))
        .map(|index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> PartialOutcome {
        PartialOutcome::Parsed(ParsedDate::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap()))
    }

    #[test]
    fn test_unknown_day_and_month() {
        assert_eq!(apply_rules("UN UNK 2016", ImputeBias::Start, today()), date(2016, 1, 1));
        assert_eq!(apply_rules("UN UNK 2016", ImputeBias::End, today()), date(2016, 12, 31));
    }

    #[test]
    fn test_timestamp() {
        let expected = NaiveDateTime::parse_from_str("2020-09-29 16:23:45", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(
            apply_rules("29SEP2020:16:23:45.733", ImputeBias::End, today()),
            PartialOutcome::Parsed(ParsedDate::DateTime(expected))
        );
    }

    #[test]
    fn test_day_and_year() {
        assert_eq!(apply_rules("02---2016", ImputeBias::End, today()), date(2016, 12, 2));
        assert_eq!(apply_rules("02/---/2016", ImputeBias::Start, today()), date(2016, 1, 2));
    }

    #[test]
    fn test_year_with_dashes() {
        assert_eq!(apply_rules("2018-----", ImputeBias::End, today()), date(2018, 12, 31));
        assert_eq!(apply_rules("2018/---/--", ImputeBias::Start, today()), date(2018, 1, 1));
    }

    #[test]
    fn test_day_and_month_use_current_year() {
        assert_eq!(apply_rules("05/Jan/----", ImputeBias::Start, today()), date(2024, 1, 5));
        assert_eq!(apply_rules("05-Dec-----", ImputeBias::End, today()), date(2024, 12, 5));
    }

    #[test]
    fn test_month_and_year_leap() {
        assert_eq!(apply_rules("UN FEB 2016", ImputeBias::End, today()), date(2016, 2, 29));
        assert_eq!(apply_rules("UN/FEB/2015", ImputeBias::End, today()), date(2015, 2, 28));
        assert_eq!(apply_rules("UN-FEB-2016", ImputeBias::Start, today()), date(2016, 2, 1));
    }

    #[test]
    fn test_bare_year() {
        assert_eq!(apply_rules("2016", ImputeBias::End, today()), date(2016, 12, 31));
    }

    #[test]
    fn test_matched_but_invalid() {
        assert_eq!(apply_rules("05/Xyz/----", ImputeBias::Start, today()), PartialOutcome::Invalid);
        assert_eq!(apply_rules("31/Feb/----", ImputeBias::Start, today()), PartialOutcome::Invalid);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(apply_rules("2016-01-02", ImputeBias::Start, today()), PartialOutcome::NoMatch);
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_from_name("Sep"), Some(9));
        assert_eq!(month_from_name("SEPT"), Some(9));
        assert_eq!(month_from_name("december"), Some(12));
        assert_eq!(month_from_name("de"), None);
    }
}
