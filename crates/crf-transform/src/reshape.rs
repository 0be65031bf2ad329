//! Wide-to-long reshaping.

use crf_model::{AttributeSource, Cell, Column, ModelError, Table, UnpivotColumnConfig, UnpivotSpec};
use indexmap::IndexMap;

use crate::error::Result;

/// Classic melt: one row per input row and value column, column-major.
///
/// `key_name` holds the source column name and `value_name` its value.
pub fn unpivot<S: AsRef<str>>(
    table: &Table,
    id_columns: &[S],
    value_columns: &[S],
    key_name: &str,
    value_name: &str,
) -> Result<Table> {
    let ids = table.select(id_columns)?;
    let height = table.height();
    let mut parts = Vec::with_capacity(value_columns.len());
    for source in value_columns {
        let source = source.as_ref();
        let values = table.values(source)?.to_vec();
        let mut part = ids.clone();
        part.with_column(Column::constant(key_name, &Cell::text(source), height))?;
        part.with_column(Column::new(value_name, values))?;
        parts.push(part);
    }
    if parts.is_empty() {
        return empty_long(&ids, key_name, value_name, &[]);
    }
    Ok(Table::concat(&parts))
}

/// Turns one value column into long rows with a fixed key label and
/// attribute columns.
///
/// Attributes beyond the configured ones are missing; configured attributes
/// beyond the attribute names are ignored.
pub fn unpivot2(
    table: &Table,
    spec: &UnpivotSpec,
    value: &str,
    config: &UnpivotColumnConfig,
) -> Result<Table> {
    let names = spec
        .attribute_columns
        .clone()
        .unwrap_or_else(|| default_attribute_names(config.attributes.len()));
    unpivot_one(table, spec, value, config, &names)
}

/// Applies [`unpivot2`] per configured source column and unions the results.
///
/// Every part shares one schema: id columns, key, value, and as many
/// attribute columns as the longest attribute list.
pub fn unpivot2_bulk(
    table: &Table,
    spec: &UnpivotSpec,
    config: &IndexMap<String, UnpivotColumnConfig>,
) -> Result<Table> {
    let names = spec.attribute_columns.clone().unwrap_or_else(|| {
        let widest = config.values().map(|c| c.attributes.len()).max().unwrap_or(0);
        default_attribute_names(widest)
    });
    let parts = config
        .iter()
        .map(|(value, column)| unpivot_one(table, spec, value, column, &names))
        .collect::<Result<Vec<_>>>()?;
    if parts.is_empty() {
        let ids = table.select(spec.id_columns.as_slice())?;
        return empty_long(&ids, &spec.key_column, &spec.value_column, &names);
    }
    Ok(Table::concat(&parts))
}

fn default_attribute_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("attr{i}")).collect()
}

fn unpivot_one(
    table: &Table,
    spec: &UnpivotSpec,
    value: &str,
    config: &UnpivotColumnConfig,
    names: &[String],
) -> Result<Table> {
    let source = table.values(value)?;
    for attribute in &config.attributes {
        if let AttributeSource::Column(column) = attribute
            && !table.contains(column)
        {
            return Err(ModelError::ColumnNotFound(column.clone()).into());
        }
    }

    let rows: Vec<Option<usize>> = source
        .iter()
        .enumerate()
        .filter(|(_, cell)| !spec.filter_empty || !cell.is_empty_value())
        .map(|(index, _)| Some(index))
        .collect();
    let pick = |values: &[Cell]| -> Vec<Cell> {
        rows.iter()
            .map(|row| row.and_then(|i| values.get(i).cloned()).unwrap_or_default())
            .collect()
    };

    let mut result = table.select(spec.id_columns.as_slice())?.take(&rows);
    let label = config.key.as_deref().unwrap_or(value);
    result.with_column(Column::constant(&spec.key_column, &Cell::text(label), rows.len()))?;
    result.with_column(Column::new(&spec.value_column, pick(source)))?;

    for (i, name) in names.iter().enumerate() {
        let values = match config.attributes.get(i) {
            Some(AttributeSource::Column(column)) => pick(table.values(column)?),
            Some(AttributeSource::Literal(literal)) => vec![literal.clone(); rows.len()],
            None => vec![Cell::Missing; rows.len()],
        };
        result.with_column(Column::new(name, values))?;
    }
    Ok(result)
}

fn empty_long(ids: &Table, key: &str, value: &str, attributes: &[String]) -> Result<Table> {
    let mut result = ids.take(&[]);
    result.with_column(Column::new(key, Vec::new()))?;
    result.with_column(Column::new(value, Vec::new()))?;
    for name in attributes {
        result.with_column(Column::new(name, Vec::new()))?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitals() -> Table {
        Table::new(vec![
            Column::from_text("USUBJID", [Some("S-1"), Some("S-2"), Some("S-3")]),
            Column::from_text("VISIT", [Some("SCR"), Some("W1"), Some("W2")]),
            Column::from_text("HEIGHT", [Some("170"), None, Some("")]),
            Column::from_text("WEIGHT", [Some("70"), Some("80"), Some("90")]),
        ])
        .unwrap()
    }

    #[test]
    fn melt_is_column_major() {
        let long = unpivot(&vitals(), &["USUBJID"], &["HEIGHT", "WEIGHT"], "TEST", "ORRES").unwrap();
        assert_eq!(long.height(), 6);
        assert_eq!(long.column_names(), vec!["USUBJID", "TEST", "ORRES"]);
        assert_eq!(long.get("TEST", 0), Some(&Cell::text("HEIGHT")));
        assert_eq!(long.get("TEST", 3), Some(&Cell::text("WEIGHT")));
        assert_eq!(long.get("USUBJID", 4), Some(&Cell::text("S-2")));
        assert_eq!(long.get("ORRES", 1), Some(&Cell::Missing));
    }

    #[test]
    fn melt_unknown_column_is_an_error() {
        assert!(unpivot(&vitals(), &["USUBJID"], &["NOPE"], "k", "v").is_err());
    }

    #[test]
    fn unpivot2_filters_empty_and_carries_attributes() {
        let config = UnpivotColumnConfig::new()
            .with_key("Height")
            .with_literal("cm")
            .with_column("VISIT");
        let long = unpivot2(&vitals(), &UnpivotSpec::new(["USUBJID"]), "HEIGHT", &config).unwrap();
        assert_eq!(long.height(), 1);
        assert_eq!(
            long.column_names(),
            vec!["USUBJID", "variable", "value", "attr1", "attr2"]
        );
        assert_eq!(long.get("variable", 0), Some(&Cell::text("Height")));
        assert_eq!(long.get("attr1", 0), Some(&Cell::text("cm")));
        assert_eq!(long.get("attr2", 0), Some(&Cell::text("SCR")));
    }

    #[test]
    fn unpivot2_keeps_empty_when_not_filtering() {
        let spec = UnpivotSpec::new(["USUBJID"]).with_filter_empty(false);
        let long = unpivot2(&vitals(), &spec, "HEIGHT", &UnpivotColumnConfig::new()).unwrap();
        assert_eq!(long.height(), 3);
        assert_eq!(long.get("variable", 0), Some(&Cell::text("HEIGHT")));
    }

    #[test]
    fn explicit_attribute_names_pad_and_truncate() {
        let config = UnpivotColumnConfig::new().with_literal("kg");
        let spec = UnpivotSpec::new(["USUBJID"]).with_attribute_columns(["UNIT", "METHOD"]);
        let long = unpivot2(&vitals(), &spec, "WEIGHT", &config).unwrap();
        assert_eq!(long.get("UNIT", 2), Some(&Cell::text("kg")));
        assert_eq!(long.get("METHOD", 2), Some(&Cell::Missing));
    }

    #[test]
    fn bulk_pads_shorter_attribute_lists() {
        let mut config = IndexMap::new();
        config.insert(
            "HEIGHT".to_string(),
            UnpivotColumnConfig::new().with_literal("cm").with_column("VISIT"),
        );
        config.insert("WEIGHT".to_string(), UnpivotColumnConfig::new().with_literal("kg"));
        let long = unpivot2_bulk(&vitals(), &UnpivotSpec::new(["USUBJID"]), &config).unwrap();
        assert_eq!(long.height(), 4);
        assert_eq!(
            long.column_names(),
            vec!["USUBJID", "variable", "value", "attr1", "attr2"]
        );
        assert_eq!(long.get("attr1", 1), Some(&Cell::text("kg")));
        assert_eq!(long.get("attr2", 3), Some(&Cell::Missing));
    }

    #[test]
    fn bulk_unknown_attribute_column_is_an_error() {
        let mut config = IndexMap::new();
        config.insert("HEIGHT".to_string(), UnpivotColumnConfig::new().with_column("NOPE"));
        assert!(unpivot2_bulk(&vitals(), &UnpivotSpec::new(["USUBJID"]), &config).is_err());
    }
}
