//! Nested record column expansion

use super::literal::{self, Literal};
use super::{records_to_table, Cell, FlatRecord};
use crate::error::Result;
use crate::table::Table;
use polars::prelude::*;

/// Shape of one record inside a nested list cell
///
/// Classification is evaluated once per record in declaration order, so a
/// record with `name`/`value_name` is always an attribute even when it also
/// carries `attribute_combinations`.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordShape<'a> {
    /// `{'name': .., 'value_name': ..}`
    Attribute {
        name: &'a Literal,
        value: &'a Literal,
    },
    /// `{'attribute_combinations': [..], 'price': .., 'available_quantity': ..}`
    Variation {
        combinations: &'a Literal,
        price: Option<&'a Literal>,
        available_quantity: Option<&'a Literal>,
    },
    /// Any other record; every field is kept
    Generic(&'a [(String, Literal)]),
}

/// Classify a record literal; non-records have no shape
pub fn classify_record(item: &Literal) -> Option<RecordShape<'_>> {
    let Literal::Record(fields) = item else {
        return None;
    };
    if let (Some(name), Some(value)) = (item.get("name"), item.get("value_name")) {
        return Some(RecordShape::Attribute { name, value });
    }
    if let Some(combinations) = item.get("attribute_combinations") {
        return Some(RecordShape::Variation {
            combinations,
            price: item.get("price"),
            available_quantity: item.get("available_quantity"),
        });
    }
    Some(RecordShape::Generic(fields))
}

/// Expand a column of record lists into one column per generated key
///
/// Keys are unioned across rows in first-seen order; rows lacking a key get
/// null. Cells that are not a non-empty list literal contribute an empty row.
pub fn flatten_nested(series: &Series) -> Result<Table> {
    let records: Vec<FlatRecord> = match series.dtype() {
        DataType::String => series.str()?.into_iter().map(parse_nested_cell).collect(),
        _ => vec![FlatRecord::new(); series.len()],
    };

    let table = records_to_table(&records)?;
    tracing::debug!(
        column = %series.name(),
        width = table.width(),
        rows = records.len(),
        "flattened nested column"
    );
    Ok(table)
}

/// Flattened mapping for one cell
pub(crate) fn parse_nested_cell(cell: Option<&str>) -> FlatRecord {
    let mut record = FlatRecord::new();
    let Some(text) = cell else {
        return record;
    };
    let items = match literal::parse(text.trim()) {
        Ok(Literal::List(items)) => items,
        Ok(_) => return record,
        Err(err) => {
            tracing::trace!(error = %err, "malformed nested literal treated as empty");
            return record;
        }
    };

    for (i, item) in items.iter().enumerate() {
        let position = i + 1;
        match classify_record(item) {
            Some(RecordShape::Attribute { name, value }) => {
                record.insert_literal(&name.render(), value);
            }
            Some(RecordShape::Variation {
                combinations,
                price,
                available_quantity,
            }) => {
                if let Literal::List(combos) = combinations {
                    for combo in combos {
                        match combo.get("name") {
                            Some(name) if name.is_truthy() => match combo.get("value_name") {
                                Some(value) => record.insert_literal(&name.render(), value),
                                None => record.insert(name.render(), Cell::Null),
                            },
                            _ => {}
                        }
                    }
                }
                if let Some(price) = price {
                    record.insert_literal(&format!("price_{}", position), price);
                }
                if let Some(quantity) = available_quantity {
                    record.insert_literal(&format!("available_quantity_{}", position), quantity);
                }
            }
            Some(RecordShape::Generic(fields)) => {
                for (key, value) in fields {
                    record.insert_literal(&format!("{}_{}", key, position), value);
                }
            }
            None => {}
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_attribute_wins_over_variation() {
        let lit = literal::parse(
            "{'name': 'Color', 'value_name': 'Red', 'attribute_combinations': []}",
        )
        .unwrap();
        assert!(matches!(
            classify_record(&lit),
            Some(RecordShape::Attribute { .. })
        ));
    }

    #[test]
    fn test_classify_generic_and_non_record() {
        let lit = literal::parse("{'name': 'Color', 'id': 3}").unwrap();
        assert!(matches!(classify_record(&lit), Some(RecordShape::Generic(f)) if f.len() == 2));
        assert!(classify_record(&Literal::Int(3)).is_none());
    }

    #[test]
    fn test_attribute_cell() {
        let record = parse_nested_cell(Some(
            "[{'name': 'Color', 'value_name': 'Red'}, {'name': 'Size', 'value_name': None}]",
        ));
        assert_eq!(record.get("Color"), Some(&Cell::Text("Red".into())));
        assert_eq!(record.get("Size"), Some(&Cell::Null));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_variation_cell_uses_one_based_positions() {
        let record = parse_nested_cell(Some(
            "[{'id': 7}, {'attribute_combinations': [{'name': 'Color', 'value_name': 'Blue'}, \
             {'name': '', 'value_name': 'x'}], 'price': 19.5, 'available_quantity': 3}]",
        ));
        assert_eq!(record.get("id_1"), Some(&Cell::Number(7.0)));
        assert_eq!(record.get("Color"), Some(&Cell::Text("Blue".into())));
        assert_eq!(record.get("price_2"), Some(&Cell::Number(19.5)));
        assert_eq!(record.get("available_quantity_2"), Some(&Cell::Number(3.0)));
        assert!(record.get("").is_none());
    }

    #[test]
    fn test_generic_never_emits_attribute_keys() {
        let record = parse_nested_cell(Some("[{'name': 'Color', 'value_name': 'Red'}]"));
        assert!(record.get("name_1").is_none());
        assert!(record.get("value_name_1").is_none());
    }

    #[test]
    fn test_empty_and_malformed_cells() {
        assert!(parse_nested_cell(None).is_empty());
        assert!(parse_nested_cell(Some("[]")).is_empty());
        assert!(parse_nested_cell(Some("[{'name': ")).is_empty());
        assert!(parse_nested_cell(Some("{'name': 'a', 'value_name': 'b'}")).is_empty());
    }

    #[test]
    fn test_flatten_nested_unions_keys() {
        let series = Series::new(
            "attributes".into(),
            vec![
                Some("[{'name': 'Color', 'value_name': 'Red'}]"),
                None,
                Some("[{'name': 'Weight', 'value_name': 2}]"),
            ],
        );
        let table = flatten_nested(&series).unwrap();
        assert_eq!(table.column_names(), vec!["Color", "Weight"]);
        assert_eq!(table.height(), 3);
        assert_eq!(
            table.float_values("Weight").unwrap(),
            vec![None, None, Some(2.0)]
        );
        assert_eq!(
            flatten_nested(&series).unwrap().column_names(),
            table.column_names()
        );
    }
}
