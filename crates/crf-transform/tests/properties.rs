//! Invariants over generated inputs.

use chrono::{Duration, NaiveDate};
use crf_model::{Cell, Column, Table, UnpivotColumnConfig, UnpivotSpec};
use crf_transform::derived::calculate_study_day;
use crf_transform::{unpivot, unpivot2_bulk};
use indexmap::IndexMap;
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 10).unwrap()
}

fn value_column(name: &str, cells: &[Option<String>]) -> Column {
    Column::new(name, cells.iter().cloned().map(Cell::from).collect())
}

fn optional_text() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-z0-9]{1,4}".prop_map(Some),
    ]
}

proptest! {
    #[test]
    fn study_day_is_never_zero(offset in -5000i64..5000, hour in 0u32..24) {
        let reference = base().and_hms_opt(0, 0, 0).unwrap();
        let event = (base() + Duration::days(offset)).and_hms_opt(hour, 0, 0).unwrap();
        let day = calculate_study_day(reference, event);
        prop_assert_ne!(day, 0);
        if offset >= 0 {
            prop_assert_eq!(day, offset + 1);
        } else {
            prop_assert_eq!(day, offset);
        }
    }

    #[test]
    fn melt_emits_rows_times_columns(rows in 0usize..20, width in 1usize..5) {
        let mut columns = vec![Column::new("ID", (0..rows).map(|i| Cell::Int(i as i64)).collect())];
        let names: Vec<String> = (0..width).map(|i| format!("V{i}")).collect();
        for name in &names {
            columns.push(Column::constant(name.as_str(), &Cell::text("x"), rows));
        }
        let table = Table::new(columns).unwrap();
        let long = unpivot(&table, &["ID".to_string()], &names, "variable", "value").unwrap();
        prop_assert_eq!(long.height(), rows * width);
        prop_assert_eq!(long.column_names(), vec!["ID", "variable", "value"]);
    }

    #[test]
    fn bulk_unpivot_keeps_one_row_per_present_value(
        a in prop::collection::vec(optional_text(), 0..15),
        attrs in 0usize..4,
    ) {
        let rows = a.len();
        let b: Vec<Option<String>> = a.iter().rev().cloned().collect();
        let table = Table::new(vec![
            Column::new("ID", (0..rows).map(|i| Cell::Int(i as i64)).collect()),
            value_column("A", &a),
            value_column("B", &b),
        ])
        .unwrap();

        let mut wide = UnpivotColumnConfig::new();
        for i in 0..attrs {
            wide = wide.with_literal(i as i64);
        }
        let mut config = IndexMap::new();
        config.insert("A".to_string(), wide);
        config.insert("B".to_string(), UnpivotColumnConfig::new());

        let long = unpivot2_bulk(&table, &UnpivotSpec::new(["ID"]), &config).unwrap();
        let present = |values: &[Option<String>]| {
            values.iter().filter(|v| v.as_deref().is_some_and(|s| !s.is_empty())).count()
        };
        prop_assert_eq!(long.height(), present(&a) + present(&b));
        prop_assert_eq!(long.width(), 3 + attrs);
    }
}
