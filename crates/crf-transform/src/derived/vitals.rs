//! Body mass index, ongoing flags, and collapsed race indicators.

use crf_model::{Cell, Column, Table};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::columns::push_column;
use crate::numeric::{cell_f64, round_to};

/// Column names read and written by [`add_bmi`].
///
/// Without unit columns heights are centimetres and weights kilograms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BmiColumns {
    pub height: String,
    pub weight: String,
    pub height_unit: Option<String>,
    pub weight_unit: Option<String>,
    pub output: String,
}

impl Default for BmiColumns {
    fn default() -> Self {
        Self {
            height: "HEIGHT".to_string(),
            weight: "WEIGHT".to_string(),
            height_unit: None,
            weight_unit: None,
            output: "BMI".to_string(),
        }
    }
}

/// Height in centimetres.
fn height_cm(value: f64, unit: &str) -> Option<f64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "cm" | "" => Some(value),
        "m" => Some(value * 100.0),
        "in" => Some(value * 2.54),
        _ => None,
    }
}

/// Weight in kilograms.
fn weight_kg(value: f64, unit: &str) -> Option<f64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "kg" | "" => Some(value),
        "lb" => Some(value * 0.453592),
        _ => None,
    }
}

/// Adds a BMI column rounded to one decimal.
///
/// Rows with a missing height or weight get a missing BMI; values that do
/// not parse as numbers are logged at error level and give missing.
pub fn add_bmi(table: Table, columns: &BmiColumns) -> Table {
    let (Some(heights), Some(weights)) = (table.column(&columns.height), table.column(&columns.weight)) else {
        tracing::error!(
            height = %columns.height,
            weight = %columns.weight,
            "height or weight column not found"
        );
        return table;
    };
    let unit = |name: &Option<String>, row: usize| -> String {
        name.as_deref()
            .and_then(|name| table.get(name, row))
            .map(ToString::to_string)
            .unwrap_or_default()
    };

    let mut failed = 0;
    let mut values = Vec::with_capacity(table.height());
    for (row, (height, weight)) in heights.values.iter().zip(&weights.values).enumerate() {
        if height.is_blank() || weight.is_blank() {
            values.push(Cell::Missing);
            continue;
        }
        let height = cell_f64(height).and_then(|v| height_cm(v, &unit(&columns.height_unit, row)));
        let weight = cell_f64(weight).and_then(|v| weight_kg(v, &unit(&columns.weight_unit, row)));
        match (height, weight) {
            (Some(height), Some(weight)) if height > 0.0 => {
                values.push(Cell::Float(round_to(weight / (0.01 * height).powi(2), 1)));
            }
            _ => {
                failed += 1;
                values.push(Cell::Missing);
            }
        }
    }
    if failed > 0 {
        tracing::error!(failed, "wrong weight or height format");
    }
    push_column(table, Column::new(columns.output.as_str(), values))
}

/// Adds `<prefix>ONGO`: `Y` where `<prefix>ENDTC` is missing or empty,
/// `N` otherwise.
pub fn add_ongoing(table: Table, prefix: &str) -> Table {
    let end = format!("{prefix}ENDTC");
    let Some(source) = table.column(&end) else {
        tracing::error!(column = %end, "end date column not found");
        return table;
    };
    let values: Vec<Cell> = source
        .values
        .iter()
        .map(|cell| Cell::text(if cell.is_empty_value() { "Y" } else { "N" }))
        .collect();
    push_column(table, Column::new(format!("{prefix}ONGO"), values))
}

fn is_set(cell: &Cell) -> bool {
    match cell {
        Cell::Missing => false,
        Cell::Text(text) => !matches!(text.trim(), "" | "0" | "0.0" | "nan"),
        Cell::Int(v) => *v != 0,
        Cell::Float(v) => *v != 0.0 && !v.is_nan(),
        Cell::Date(_) | Cell::DateTime(_) => true,
    }
}

/// Collapses indicator columns into `RACE`.
///
/// `races` maps an indicator column to its race label. One set indicator
/// gives its label, several give `MULTIPLE`, none gives missing. Indicator
/// columns absent from the table are skipped.
pub fn add_race(table: Table, races: &IndexMap<String, String>) -> Table {
    let present: Vec<(&[Cell], &str)> = races
        .iter()
        .filter_map(|(column, label)| {
            let values = table.column(column)?;
            Some((values.values.as_slice(), label.as_str()))
        })
        .collect();
    let values: Vec<Cell> = (0..table.height())
        .map(|row| {
            let mut set = present
                .iter()
                .filter(|(values, _)| values.get(row).is_some_and(is_set))
                .map(|(_, label)| *label);
            match (set.next(), set.next()) {
                (None, _) => Cell::Missing,
                (Some(label), None) => Cell::text(label),
                (Some(_), Some(_)) => Cell::text("MULTIPLE"),
            }
        })
        .collect();
    push_column(table, Column::new("RACE", values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_metric_default() {
        let table = Table::new(vec![
            Column::from_text("HEIGHT", [Some("175"), Some(""), Some("tall")]),
            Column::from_text("WEIGHT", [Some("70"), Some("80"), Some("90")]),
        ])
        .unwrap();
        let table = add_bmi(table, &BmiColumns::default());
        assert_eq!(
            table.values("BMI").unwrap(),
            &[Cell::Float(22.9), Cell::Missing, Cell::Missing]
        );
    }

    #[test]
    fn test_bmi_with_units() {
        let table = Table::new(vec![
            Column::from_text("HEIGHT", [Some("1.75"), Some("69")]),
            Column::from_text("HEIGHTU", [Some("m"), Some("IN")]),
            Column::from_text("WEIGHT", [Some("70"), Some("154")]),
            Column::from_text("WEIGHTU", [Some("kg"), Some("lb")]),
        ])
        .unwrap();
        let columns = BmiColumns {
            height_unit: Some("HEIGHTU".to_string()),
            weight_unit: Some("WEIGHTU".to_string()),
            ..BmiColumns::default()
        };
        let table = add_bmi(table, &columns);
        assert_eq!(
            table.values("BMI").unwrap(),
            &[Cell::Float(22.9), Cell::Float(22.7)]
        );
    }

    #[test]
    fn test_ongoing() {
        let table = Table::new(vec![Column::from_text(
            "AEENDTC",
            [Some("2020-01-01"), Some(""), None],
        )])
        .unwrap();
        let table = add_ongoing(table, "AE");
        assert_eq!(
            table.values("AEONGO").unwrap(),
            &[Cell::text("N"), Cell::text("Y"), Cell::text("Y")]
        );
    }

    #[test]
    fn test_ongoing_without_end_column() {
        let table = Table::with_height(2);
        assert_eq!(add_ongoing(table.clone(), "CM"), table);
    }

    #[test]
    fn test_race() {
        let table = Table::new(vec![
            Column::from_text("WHITE", [Some("1"), Some("1"), Some("0"), Some("nan")]),
            Column::from_text("ASIAN", [Some("0"), Some("1"), Some("1.0"), None]),
        ])
        .unwrap();
        let mut races = IndexMap::new();
        races.insert("WHITE".to_string(), "WHITE".to_string());
        races.insert("ASIAN".to_string(), "ASIAN".to_string());
        races.insert("OTHER".to_string(), "OTHER".to_string());
        let table = add_race(table, &races);
        assert_eq!(
            table.values("RACE").unwrap(),
            &[
                Cell::text("WHITE"),
                Cell::text("MULTIPLE"),
                Cell::text("ASIAN"),
                Cell::Missing
            ]
        );
    }
}
