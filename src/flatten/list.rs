//! List column expansion

use super::literal::{self, Literal};
use super::{build_column, Cell};
use crate::error::Result;
use crate::table::Table;
use polars::prelude::*;

/// Expand a list-valued column into `{name}_0 .. {name}_(N-1)`
///
/// Each cell is classified as:
/// - null: empty sequence
/// - text shaped like `[...]`: parsed sequence, or empty when malformed
/// - a native polars list: its elements
/// - anything else: a one-element sequence holding the scalar
///
/// `N` is the longest sequence in the column; shorter rows are null-filled.
pub fn flatten_list(series: &Series) -> Result<Table> {
    let name = series.name().to_string();
    let rows = parse_rows(series)?;

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let columns = (0..width)
        .map(|i| {
            let cells: Vec<Cell> = rows
                .iter()
                .map(|row| row.get(i).cloned().unwrap_or(Cell::Null))
                .collect();
            build_column(&format!("{}_{}", name, i), &cells)
        })
        .collect();

    tracing::debug!(column = %name, width, rows = rows.len(), "flattened list column");
    Table::from_columns(rows.len(), columns)
}

fn parse_rows(series: &Series) -> Result<Vec<Vec<Cell>>> {
    match series.dtype() {
        DataType::String => Ok(series.str()?.into_iter().map(parse_text_cell).collect()),
        DataType::List(_) => Ok(series
            .list()?
            .into_iter()
            .map(|cell| match cell {
                Some(inner) => inner.iter().map(|av| Cell::from_any_value(&av)).collect(),
                None => Vec::new(),
            })
            .collect()),
        _ => Ok(series
            .iter()
            .map(|av| match Cell::from_any_value(&av) {
                Cell::Null => Vec::new(),
                cell => vec![cell],
            })
            .collect()),
    }
}

/// Sequence held by one text cell
pub(crate) fn parse_text_cell(cell: Option<&str>) -> Vec<Cell> {
    let Some(text) = cell else {
        return Vec::new();
    };
    let trimmed = text.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return vec![Cell::Text(text.to_string())];
    }
    match literal::parse(trimmed) {
        Ok(Literal::List(items)) => items.iter().map(Cell::from_literal).collect(),
        Ok(_) => Vec::new(),
        Err(err) => {
            tracing::trace!(error = %err, "malformed list literal treated as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_cell_variants() {
        assert!(parse_text_cell(None).is_empty());
        assert_eq!(
            parse_text_cell(Some("[1, 2")),
            vec![Cell::Text("[1, 2".into())]
        );
        assert!(parse_text_cell(Some("[oops]")).is_empty());
        assert_eq!(
            parse_text_cell(Some("free shipping")),
            vec![Cell::Text("free shipping".into())]
        );
        assert_eq!(
            parse_text_cell(Some(" ['a', 2] ")),
            vec![Cell::Text("a".into()), Cell::Number(2.0)]
        );
    }

    #[test]
    fn test_flatten_width_is_longest_row() {
        let series = Series::new(
            "tags".into(),
            vec![Some("['a', 'b', 'c']"), None, Some("['d']"), Some("[]")],
        );
        let table = flatten_list(&series).unwrap();
        assert_eq!(table.width(), 3);
        assert_eq!(table.height(), 4);
        assert_eq!(table.column_names(), vec!["tags_0", "tags_1", "tags_2"]);

        let second: Vec<Option<String>> = table.text_values("tags_1").unwrap();
        assert_eq!(second, vec![Some("b".into()), None, None, None]);
    }

    #[test]
    fn test_flatten_all_empty_has_no_columns() {
        let series = Series::new("tags".into(), vec![None::<&str>, Some("[]"), Some("[bad]")]);
        let table = flatten_list(&series).unwrap();
        assert_eq!(table.width(), 0);
        assert_eq!(table.height(), 3);
    }

    #[test]
    fn test_flatten_scalar_column_wraps_values() {
        let series = Series::new("qty".into(), vec![Some(3i64), None, Some(5)]);
        let table = flatten_list(&series).unwrap();
        assert_eq!(table.column_names(), vec!["qty_0"]);
        assert_eq!(
            table.float_values("qty_0").unwrap(),
            vec![Some(3.0), None, Some(5.0)]
        );
    }
}
