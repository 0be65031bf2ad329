//! Options for date normalization.

use serde::{Deserialize, Serialize};

/// Which end of an incomplete period a partial date is imputed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputeBias {
    /// First month of the year, first day of the month.
    #[default]
    Start,
    /// Last month of the year, last day of the month.
    End,
}

impl ImputeBias {
    /// Bias implied by a target column name.
    ///
    /// End-of-period columns (`--ENDTC`, `--ENDAT`) impute to the end; every
    /// other column imputes to the start.
    pub fn for_column(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        if upper.ends_with("ENDTC") || upper.ends_with("ENDAT") {
            Self::End
        } else {
            Self::Start
        }
    }

    pub fn is_start(self) -> bool {
        self == Self::Start
    }
}

impl From<bool> for ImputeBias {
    /// `true` means start-of-period.
    fn from(start: bool) -> Self {
        if start { Self::Start } else { Self::End }
    }
}

/// Options for converting a date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DateOptions {
    /// Explicit bias; derived from the column name when `None`.
    pub start: Option<ImputeBias>,
    /// Truncate results to the calendar date.
    pub only_date: bool,
}

impl DateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, start: impl Into<ImputeBias>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_only_date(mut self, only_date: bool) -> Self {
        self.only_date = only_date;
        self
    }

    /// The explicit bias, or the one implied by `column`.
    pub fn bias_for(&self, column: &str) -> ImputeBias {
        self.start.unwrap_or_else(|| ImputeBias::for_column(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_columns_default_to_end() {
        assert_eq!(ImputeBias::for_column("AEENDTC"), ImputeBias::End);
        assert_eq!(ImputeBias::for_column("CMENDAT"), ImputeBias::End);
        assert_eq!(ImputeBias::for_column("AESTDTC"), ImputeBias::Start);
        assert_eq!(ImputeBias::for_column("ENDTC_RAW"), ImputeBias::Start);
    }

    #[test]
    fn explicit_start_wins() {
        let options = DateOptions::new().with_start(true);
        assert_eq!(options.bias_for("AEENDTC"), ImputeBias::Start);
        assert_eq!(DateOptions::new().bias_for("AEENDTC"), ImputeBias::End);
    }
}
