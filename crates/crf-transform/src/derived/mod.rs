//! Day offsets, durations, ages, and other values computed from parsed
//! columns.

pub mod age;
pub mod duration;
pub mod studyday;
pub mod vitals;

use chrono::NaiveDateTime;
use crf_model::{Cell, ImputeBias};

use crate::datetime::DateNormalizer;

pub use age::{
    add_age_from_birth_date, add_age_from_birth_year, age_from_birth_date, age_from_birth_year,
};
pub use duration::{add_duration, day_delta};
pub use studyday::{
    STUDY_DAY_FORWARD_SHIFT, add_study_day, add_study_duration, calculate_study_day,
};
pub use vitals::{BmiColumns, add_bmi, add_ongoing, add_race};

/// Parses one endpoint with the single-value fallback parser.
///
/// Missing, blank, and unparseable values give `None`.
fn endpoint(normalizer: &DateNormalizer, cell: &Cell) -> Option<NaiveDateTime> {
    normalizer.parse_cell(cell, ImputeBias::Start).as_datetime()
}
