//! Integration test: list and nested column flattening

use catalog_features::flatten::{
    classify_record, expand_column, flatten_list, flatten_nested, parse_literal, RecordShape,
};
use catalog_features::table::{ColumnKind, Table};
use polars::prelude::*;

fn raw_items() -> Table {
    Table::from_frame(
        df!(
            "id" => &[Some(1i64), Some(2), None],
            "tags" => &[
                Some("['good_quality_thumbnail', 'immediate_payment']"),
                Some("[]"),
                None,
            ],
            "variations" => &[
                Some("[{'attribute_combinations': [{'name': 'Talle', 'value_name': 'M'}], 'price': 1500, 'available_quantity': 2}]"),
                Some("[{'name': 'Marca', 'value_name': 'Acme'}, {'id': 'COLOR', 'value_struct': {'number': 10, 'unit': 'cm'}}]"),
                Some("not a literal"),
            ],
        )
        .unwrap(),
    )
}

#[test]
fn test_list_width_matches_longest_sequence() {
    let table = raw_items();
    let out = flatten_list(table.series("tags").unwrap()).unwrap();

    assert_eq!(out.width(), 2);
    assert_eq!(out.height(), 3);
    let first = out.text_values("tags_0").unwrap();
    assert_eq!(first[0].as_deref(), Some("good_quality_thumbnail"));
    assert_eq!(first[1], None);
    assert_eq!(first[2], None);
}

#[test]
fn test_list_prefix_preserved() {
    let series = Series::new(
        "pictures".into(),
        vec![Some("[1, 2, 3]"), Some("[4]"), Some("[5, None]")],
    );
    let out = flatten_list(&series).unwrap();
    assert_eq!(out.column_names(), vec!["pictures_0", "pictures_1", "pictures_2"]);
    assert_eq!(out.kind("pictures_0"), Some(ColumnKind::Numeric));
    assert_eq!(
        out.float_values("pictures_1").unwrap(),
        vec![Some(2.0), None, None]
    );
}

#[test]
fn test_nested_dispatch() {
    let table = raw_items();
    let out = flatten_nested(table.series("variations").unwrap()).unwrap();

    assert_eq!(
        out.column_names(),
        vec![
            "Talle",
            "price_1",
            "available_quantity_1",
            "Marca",
            "id_2",
            "value_struct_2.number",
            "value_struct_2.unit",
        ]
    );
    assert_eq!(out.height(), 3);
    assert_eq!(out.float_values("price_1").unwrap(), vec![Some(1500.0), None, None]);
    assert_eq!(out.text_values("Marca").unwrap()[1].as_deref(), Some("Acme"));
    assert!(!out.contains("name_1"));
}

#[test]
fn test_flatten_is_pure() {
    let table = raw_items();
    let a = flatten_nested(table.series("variations").unwrap()).unwrap();
    let b = flatten_nested(table.series("variations").unwrap()).unwrap();
    assert!(a.frame().equals_missing(b.frame()));

    let a = flatten_list(table.series("tags").unwrap()).unwrap();
    let b = flatten_list(table.series("tags").unwrap()).unwrap();
    assert!(a.frame().equals_missing(b.frame()));
}

#[test]
fn test_shape_exclusivity() {
    let attribute = parse_literal("{'name': 'Marca', 'value_name': 'Acme'}").unwrap();
    let generic = parse_literal("{'name': 'Marca'}").unwrap();
    assert!(matches!(
        classify_record(&attribute),
        Some(RecordShape::Attribute { .. })
    ));
    assert!(matches!(classify_record(&generic), Some(RecordShape::Generic(_))));
}

#[test]
fn test_literal_rejects_expressions() {
    assert!(parse_literal("__import__('os').system('ls')").is_err());
    assert!(parse_literal("[1 + 1]").is_err());
    assert!(parse_literal("[1, 'a', None, True, (2, 3)]").is_ok());
}

#[test]
fn test_expand_column_in_place() {
    let table = raw_items()
        .with_kind("tags", ColumnKind::RawList)
        .unwrap()
        .with_kind("variations", ColumnKind::RawNested)
        .unwrap();
    let table = expand_column(&table, "tags", None).unwrap();
    let table = expand_column(&table, "variations", None).unwrap();

    assert!(!table.contains("tags"));
    assert!(!table.contains("variations"));
    assert!(table.contains("tags_1"));
    assert!(table.contains("Marca"));
    assert_eq!(table.height(), 3);
}
