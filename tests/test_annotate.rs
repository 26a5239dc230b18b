//! Integration test: row annotators

use catalog_features::annotate::{
    annotate, convert_dates, mark_inconsistent, mark_outliers, OutlierMarker,
};
use catalog_features::table::Table;
use polars::prelude::*;

#[test]
fn test_date_examples() {
    let table = Table::from_frame(
        df!("date_created" => &["2023-01-05", "not-a-date", "2015-09-05T20:42:53.000Z"]).unwrap(),
    );
    let out = convert_dates(&table).unwrap();
    let values: Vec<Option<f64>> = out.float_values("date_created_converted").unwrap();
    assert_eq!(values, vec![Some(20230105.0), None, Some(20150905.0)]);
}

#[test]
fn test_consistency_examples() {
    let table = Table::from_frame(df!("id" => &[None, Some(42i64)]).unwrap());
    let out = mark_inconsistent(&table).unwrap();
    assert_eq!(
        out.text_values("inconsistence_rule").unwrap(),
        vec![Some("Inconsistent".to_string()), Some("Consistent".to_string())]
    );
}

#[test]
fn test_outlier_label_from_exact_zscore() {
    let table = Table::from_frame(df!("price" => &[10.0, 12.0, 13.0, 1000.0]).unwrap());
    let values = table.float_values("price").unwrap();
    let z = OutlierMarker::zscores(&values).unwrap();
    let expected = if z[3].unwrap() > 3.0 { "High" } else { "Normal" };

    let out = mark_outliers(&table, "price", 3.0).unwrap();
    let labels = out.text_values("outlier_rule_for_price").unwrap();
    assert_eq!(labels[3].as_deref(), Some(expected));
    assert_eq!(labels[3].as_deref(), Some("Normal"));
}

#[test]
fn test_outlier_trichotomy() {
    let mut prices: Vec<f64> = (0..40).map(|i| 100.0 + (i % 7) as f64).collect();
    prices.push(5000.0);
    prices.push(-5000.0);
    let table = Table::from_frame(df!("price" => prices).unwrap());

    let out = mark_outliers(&table, "price", 3.0).unwrap();
    let labels = out.text_values("outlier_rule_for_price").unwrap();
    let z = OutlierMarker::zscores(&table.float_values("price").unwrap()).unwrap();
    for (label, z) in labels.iter().zip(z) {
        let label = label.as_deref().unwrap();
        assert!(["High", "Low", "Normal"].contains(&label));
        if z.unwrap().abs() <= 3.0 {
            assert_eq!(label, "Normal");
        }
    }
}

#[test]
fn test_zero_variance_is_normal() {
    let table = Table::from_frame(df!("sold_quantity" => &[3i64, 3, 3]).unwrap());
    let out = mark_outliers(&table, "sold_quantity", 3.0).unwrap();
    assert_eq!(
        out.text_values("outlier_rule_for_sold_quantity").unwrap(),
        vec![Some("Normal".to_string()); 3]
    );
}

#[test]
fn test_annotate_all() {
    let table = Table::from_frame(
        df!(
            "id" => &[Some(1i64), None, Some(3)],
            "price" => &[10.0, 20.0, 30.0],
            "base_price" => &[10.0, 20.0, 30.0],
            "sold_quantity" => &[0i64, 1, 5],
            "date_created" => &["2023-01-05", "2023-01-06", "bad"],
        )
        .unwrap(),
    );
    let out = annotate(&table, &OutlierMarker::default()).unwrap();
    for column in [
        "outlier_rule_for_price",
        "outlier_rule_for_base_price",
        "outlier_rule_for_sold_quantity",
        "inconsistence_rule",
        "date_created_converted",
    ] {
        assert!(out.contains(column), "missing {}", column);
    }
    assert_eq!(out.height(), 3);
    assert_eq!(table.width(), 5);
}
