//! General-purpose date parsing for values no partial-date rule matched.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveTime};
use crf_model::ImputeBias;
use regex::Regex;

use super::ParsedDate;
use super::partial::{PartialDate, month_from_name};

/// Parses one free-form date string.
///
/// Implementations must be pure per value so a column can be processed in
/// any order.
pub trait DateParser: Send + Sync {
    /// `bias` picks the day (or month) used when the value omits it; `today`
    /// supplies the year when the value omits it.
    fn parse(&self, value: &str, bias: ImputeBias, today: NaiveDate) -> Option<ParsedDate>;
}

/// Token-based parser for common human-written dates.
///
/// Accepts numeric dates in year-first, month-first, or day-first order
/// (month-first unless the first number cannot be a month), English month
/// and weekday names, ordinal suffixes, an optional time of day with
/// `AM`/`PM`, and a trailing timezone, which is dropped. A date with a
/// two-digit year or no year resolves to its nearest occurrence that is not
/// after `today`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientDateParser;

static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{1,2}):(\d{2})(?::(\d{2})(?:[.,]\d+)?)?(?:\s*(am|pm)\b)?(?:\s*(?:z|utc|gmt)\b|\s*[+-]\d{2}:?\d{2}\b)?",
    )
    .expect("Invalid time of day regex")
});

const WEEKDAYS: [&str; 17] = [
    "monday", "mon", "tuesday", "tue", "tues", "wednesday", "wed", "thursday", "thu", "thur",
    "thurs", "friday", "fri", "saturday", "sat", "sunday", "sun",
];

const FILLERS: [&str; 11] = [
    "t", "st", "nd", "rd", "th", "of", "at", "the", "z", "utc", "gmt",
];

#[derive(Debug, Clone, Copy)]
struct Number {
    value: u32,
    digits: usize,
}

impl DateParser for LenientDateParser {
    fn parse(&self, value: &str, bias: ImputeBias, today: NaiveDate) -> Option<ParsedDate> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        let (time, rest) = match TIME_OF_DAY.captures(value) {
            Some(captures) => {
                let span = captures.get(0)?;
                let mut hour: u32 = captures.get(1)?.as_str().parse().ok()?;
                let minute: u32 = captures.get(2)?.as_str().parse().ok()?;
                let second: u32 = match captures.get(3) {
                    Some(s) => s.as_str().parse().ok()?,
                    None => 0,
                };
                if let Some(meridiem) = captures.get(4) {
                    let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
                    hour = match (hour, pm) {
                        (12, false) => 0,
                        (h, true) if h < 12 => h + 12,
                        (h, _) => h,
                    };
                }
                let time = NaiveTime::from_hms_opt(hour, minute, second)?;
                let rest = format!("{} {}", &value[..span.start()], &value[span.end()..]);
                (Some(time), rest)
            }
            None => (None, value.to_string()),
        };

        let mut numbers = Vec::new();
        let mut month_name = None;
        for token in tokenize(&rest) {
            if let Some(first) = token.chars().next()
                && first.is_ascii_digit()
            {
                numbers.push(Number {
                    value: token.parse().ok()?,
                    digits: token.len(),
                });
                continue;
            }
            let lower = token.to_ascii_lowercase();
            if WEEKDAYS.contains(&lower.as_str()) || FILLERS.contains(&lower.as_str()) {
                continue;
            }
            let month = month_from_name(&lower)?;
            if month_name.replace(month).is_some() {
                return None;
            }
        }

        let (partial, rollback) = match month_name {
            Some(month) => with_month_name(month, &numbers, today)?,
            None => numeric_only(&numbers, today)?,
        };
        let mut date = partial.impute(bias, today)?;
        if rollback > 0
            && date.date() > today
            && let Some(year) = date.date().year().checked_sub(rollback)
        {
            date = PartialDate {
                year: Some(year),
                ..partial
            }
            .impute(bias, today)?;
        }
        Some(match time {
            Some(time) => ParsedDate::DateTime(date.date().and_time(time)),
            None => date,
        })
    }
}

/// Splits into runs of ASCII digits and runs of letters; anything else
/// separates tokens.
fn tokenize(value: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut current: Option<(usize, bool)> = None;
    for (index, ch) in value.char_indices() {
        let kind = if ch.is_ascii_digit() {
            Some(true)
        } else if ch.is_alphabetic() {
            Some(false)
        } else {
            None
        };
        if let Some((start, digits)) = current
            && kind != Some(digits)
        {
            tokens.push(&value[start..index]);
            current = None;
        }
        if current.is_none() {
            current = kind.map(|digits| (index, digits));
        }
    }
    if let Some((start, _)) = current {
        tokens.push(&value[start..]);
    }
    tokens
}

/// Years to step back when a date built from `number` as its year lands
/// after today.
fn rollback_for(number: Number) -> i32 {
    if number.digits <= 2 { 100 } else { 0 }
}

fn year_from(number: Number, today: NaiveDate) -> Option<i32> {
    match number.digits {
        4 => i32::try_from(number.value).ok(),
        1 | 2 => {
            let current = today.year();
            let year = current / 100 * 100 + number.value as i32;
            Some(if year > current { year - 100 } else { year })
        }
        _ => None,
    }
}

/// Builds the date components and the years to step back if the result
/// lands after today.
fn with_month_name(
    month: u32,
    numbers: &[Number],
    today: NaiveDate,
) -> Option<(PartialDate, i32)> {
    let (year, day, rollback) = match *numbers {
        [] => (None, None, 1),
        [a] if a.digits == 4 => (Some(year_from(a, today)?), None, 0),
        [a] if (1..=31).contains(&a.value) => (None, Some(a.value), 1),
        [a, b] if a.digits == 4 => (Some(year_from(a, today)?), Some(b.value), 0),
        [a, b] => (Some(year_from(b, today)?), Some(a.value), rollback_for(b)),
        _ => return None,
    };
    let partial = PartialDate {
        year,
        month: Some(month),
        day,
        time: None,
    };
    Some((partial, rollback))
}

fn numeric_only(numbers: &[Number], today: NaiveDate) -> Option<(PartialDate, i32)> {
    let (year, month, day, rollback) = match *numbers {
        [a] if a.digits == 8 => (
            Some((a.value / 10_000) as i32),
            Some(a.value / 100 % 100),
            Some(a.value % 100),
            0,
        ),
        [a] if a.digits == 4 => (Some(year_from(a, today)?), None, None, 0),
        [a, b] if a.digits == 4 => (Some(year_from(a, today)?), Some(b.value), None, 0),
        [a, b] if b.digits == 4 => (Some(year_from(b, today)?), Some(a.value), None, 0),
        [a, b] if a.value > 12 => (None, Some(b.value), Some(a.value), 1),
        [a, b] => (None, Some(a.value), Some(b.value), 1),
        [a, b, c] if a.digits == 4 || a.value > 31 => (
            Some(year_from(a, today)?),
            Some(b.value),
            Some(c.value),
            rollback_for(a),
        ),
        [a, b, c] if a.value > 12 => (
            Some(year_from(c, today)?),
            Some(b.value),
            Some(a.value),
            rollback_for(c),
        ),
        [a, b, c] => (
            Some(year_from(c, today)?),
            Some(a.value),
            Some(b.value),
            rollback_for(c),
        ),
        _ => return None,
    };
    if month.is_some_and(|m| !(1..=12).contains(&m)) {
        return None;
    }
    let partial = PartialDate {
        year,
        month,
        day,
        time: None,
    };
    Some((partial, rollback))
}
