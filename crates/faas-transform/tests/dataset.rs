//! Tests for dataset canonicalization.

use faas_model::{FaasError, SchemaError, ValidationError};
use faas_transform::{NamedTable, canonicalize_datasets, canonicalize_table};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;
use serde_json::json;

fn sales_table() -> NamedTable {
    let df = polars::df!(
        "data_tidy" => ["2020-01-01"],
        "sales" => [5i32],
        "promo" => [None::<i32>],
    )
    .unwrap();
    NamedTable::new("sales", df)
}

fn text_table(name: &str, columns: Vec<(&str, Vec<Option<&str>>)>) -> NamedTable {
    let cols: Vec<Column> = columns
        .into_iter()
        .map(|(column, values)| Series::new(column.into(), values).into_column())
        .collect();
    NamedTable::new(name, DataFrame::new(cols).unwrap())
}

#[test]
fn scenario_single_sparse_record() {
    let bundle = canonicalize_datasets(&[sales_table()], "data_tidy", Some("%Y-%m-%d")).unwrap();

    let labels: Vec<&str> = bundle.labels().collect();
    assert_eq!(labels, vec!["forecast_1_sales"]);

    let records = bundle.get("forecast_1_sales").unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].contains("promo"));

    insta::assert_json_snapshot!(bundle, @r#"
    {
      "forecast_1_sales": [
        {
          "data_tidy": "2020-01-01",
          "sales": 5
        }
      ]
    }
    "#);
}

#[test]
fn columns_are_reordered_date_then_target() {
    let table = text_table(
        "sales",
        vec![
            ("x1", vec![Some("a")]),
            ("sales", vec![Some("10")]),
            ("data_tidy", vec![Some("2020-01-01")]),
            ("x2", vec![Some("b")]),
        ],
    );
    let bundle = canonicalize_datasets(&[table], "data_tidy", None).unwrap();
    let record = &bundle.get("forecast_1_sales").unwrap()[0];
    let names: Vec<&str> = record.names().collect();
    assert_eq!(names, vec!["data_tidy", "sales", "x1", "x2"]);
}

#[test]
fn names_and_keys_are_sanitized() {
    let table = text_table(
        "preço",
        vec![
            ("data", vec![Some("2020-01-01")]),
            ("preço", vec![Some("1.5")]),
            ("promoção", vec![Some("sim")]),
        ],
    );
    let bundle = canonicalize_datasets(&[table], "data", None).unwrap();
    let records = bundle.get("forecast_1_preco").unwrap();
    assert_eq!(records[0].get("preco"), Some(&json!("1.5")));
    assert_eq!(records[0].get("promocao"), Some(&json!("sim")));
}

#[test]
fn positions_follow_input_order() {
    let tables = vec![
        text_table(
            "zeta",
            vec![("date", vec![Some("2020-01-01")]), ("zeta", vec![Some("1")])],
        ),
        text_table(
            "alpha",
            vec![("date", vec![Some("2020-01-01")]), ("alpha", vec![Some("2")])],
        ),
    ];
    let bundle = canonicalize_datasets(&tables, "date", Some("%Y-%m-%d")).unwrap();
    let labels: Vec<&str> = bundle.labels().collect();
    assert_eq!(labels, vec!["forecast_1_zeta", "forecast_2_alpha"]);
}

#[test]
fn missing_target_fails() {
    let table = text_table(
        "sales",
        vec![("date", vec![Some("2020-01-01")]), ("revenue", vec![Some("1")])],
    );
    let err = canonicalize_datasets(&[table], "date", None).unwrap_err();
    assert!(matches!(
        err,
        FaasError::Schema(SchemaError::MissingTargetColumn { ref dataset }) if dataset == "sales"
    ));
}

#[test]
fn missing_date_column_fails() {
    let table = text_table("sales", vec![("sales", vec![Some("1")])]);
    let err = canonicalize_datasets(&[table], "date", None).unwrap_err();
    assert!(matches!(
        err,
        FaasError::Schema(SchemaError::MissingDateColumn { .. })
    ));
}

#[test]
fn unparsable_dates_fail_with_format() {
    let table = text_table(
        "sales",
        vec![
            ("date", vec![Some("2020-01-01"), Some("January")]),
            ("sales", vec![Some("1"), Some("2")]),
        ],
    );
    let err = canonicalize_datasets(&[table], "date", Some("%Y-%m-%d")).unwrap_err();
    assert!(matches!(
        err,
        FaasError::Validation(ValidationError::DateParse { ref format, .. }) if format == "%Y-%m-%d"
    ));
}

#[test]
fn date_variable_may_be_the_target() {
    let table = text_table(
        "data",
        vec![
            ("x1", vec![Some("a"), Some("b")]),
            ("data", vec![Some("01/2020"), Some("02/2020")]),
        ],
    );
    let records = canonicalize_table(&table, "data", Some("%m/%Y")).unwrap();
    assert_eq!(records.len(), 2);
    let names: Vec<&str> = records[0].names().collect();
    assert_eq!(names, vec!["data", "x1"]);
    assert_eq!(records[1].get("data"), Some(&json!("02/2020")));
}

#[test]
fn yearly_and_monthly_formats_are_accepted() {
    let yearly = text_table(
        "sales",
        vec![
            ("ano", vec![Some("2019"), Some("2020")]),
            ("sales", vec![Some("1"), Some("2")]),
        ],
    );
    let bundle = canonicalize_datasets(&[yearly], "ano", Some("%Y")).unwrap();
    let records = bundle.get("forecast_1_sales").unwrap();
    assert_eq!(records[0].get("ano"), Some(&json!("2019")));

    let monthly = text_table(
        "sales",
        vec![
            ("mes", vec![Some("2020-11"), Some("2020-12")]),
            ("sales", vec![Some("1"), Some("2")]),
        ],
    );
    let bundle = canonicalize_datasets(&[monthly], "mes", Some("%Y-%m")).unwrap();
    let records = bundle.get("forecast_1_sales").unwrap();
    assert_eq!(records[1].get("mes"), Some(&json!("2020-12")));
}

#[test]
fn integer_years_are_accepted() {
    let df = polars::df!(
        "ano" => [2019i64, 2020],
        "sales" => [3i32, 4],
    )
    .unwrap();
    let bundle =
        canonicalize_datasets(&[NamedTable::new("sales", df)], "ano", Some("%Y")).unwrap();
    let records = bundle.get("forecast_1_sales").unwrap();
    assert_eq!(records[0].get("ano"), Some(&json!("2019")));
    assert_eq!(records[1].get("sales"), Some(&json!(4)));
}

#[test]
fn native_datetime_columns_are_rendered() {
    let stamps = [
        chrono::NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap(),
    ];
    let df = DataFrame::new(vec![
        Series::new("data_tidy".into(), &stamps[..]).into_column(),
        Series::new("sales".into(), &[9i32]).into_column(),
    ])
    .unwrap();
    let table = NamedTable::new("sales", df);

    let records = canonicalize_table(&table, "data_tidy", None).unwrap();
    assert_eq!(records[0].get("data_tidy"), Some(&json!("2020-03-01 06:00:00")));

    let records = canonicalize_table(&table, "data_tidy", Some("%Y-%m-%d")).unwrap();
    assert_eq!(records[0].get("data_tidy"), Some(&json!("2020-03-01")));
}

#[test]
fn input_tables_are_not_modified() {
    let table = sales_table();
    let before = table.data.clone();
    canonicalize_datasets(std::slice::from_ref(&table), "data_tidy", Some("%Y-%m-%d")).unwrap();
    assert!(table.data.equals_missing(&before));
    assert_eq!(table.column_names(), vec!["data_tidy", "sales", "promo"]);
}

#[test]
fn nan_values_are_omitted() {
    let df = polars::df!(
        "date" => ["2020-01-01", "2020-02-01"],
        "sales" => [1.5f64, f64::NAN],
    )
    .unwrap();
    let bundle = canonicalize_datasets(&[NamedTable::new("sales", df)], "date", None).unwrap();
    let records = bundle.get("forecast_1_sales").unwrap();
    assert_eq!(records[0].get("sales"), Some(&json!(1.5)));
    assert!(!records[1].contains("sales"));
}

proptest! {
    #[test]
    fn null_cells_never_emitted(
        rows in prop::collection::vec(
            (prop::option::of(-1000i64..1000), prop::option::of(-1000i64..1000)),
            1..30,
        )
    ) {
        let dates: Vec<String> = (0..rows.len())
            .map(|i| format!("2020-01-{:02}", (i % 28) + 1))
            .collect();
        let sales: Vec<Option<i64>> = rows.iter().map(|(s, _)| *s).collect();
        let promo: Vec<Option<i64>> = rows.iter().map(|(_, p)| *p).collect();
        let df = DataFrame::new(vec![
            Series::new("date".into(), dates).into_column(),
            Series::new("sales".into(), sales).into_column(),
            Series::new("promo".into(), promo).into_column(),
        ])
        .unwrap();

        let bundle = canonicalize_datasets(
            &[NamedTable::new("sales", df)],
            "date",
            Some("%Y-%m-%d"),
        )
        .unwrap();
        let records = bundle.get("forecast_1_sales").unwrap();
        prop_assert_eq!(records.len(), rows.len());
        for (record, (s, p)) in records.iter().zip(&rows) {
            prop_assert!(record.contains("date"));
            prop_assert_eq!(record.contains("sales"), s.is_some());
            prop_assert_eq!(record.contains("promo"), p.is_some());
            prop_assert!(record.iter().all(|(_, value)| !value.is_null()));
        }
    }

    #[test]
    fn bundle_has_one_positional_key_per_table(count in 1usize..12) {
        let tables: Vec<NamedTable> = (0..count)
            .map(|i| {
                let name = format!("series{i}");
                let df = DataFrame::new(vec![
                    Series::new("date".into(), ["2020-01-01"]).into_column(),
                    Series::new(name.as_str().into(), [i as i64]).into_column(),
                ])
                .unwrap();
                NamedTable::new(name, df)
            })
            .collect();

        let bundle = canonicalize_datasets(&tables, "date", None).unwrap();
        prop_assert_eq!(bundle.len(), count);
        for (k, label) in bundle.labels().enumerate() {
            prop_assert_eq!(label.to_string(), format!("forecast_{}_series{}", k + 1, k));
        }
    }
}
