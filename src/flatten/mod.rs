//! Column flattening
//!
//! Turns one raw column holding list literals or lists of record literals
//! into a wide set of typed columns:
//! - [`flatten_list`]: `tags = "['a', 'b']"` becomes `tags_0`, `tags_1`, ...
//! - [`flatten_nested`]: `attributes = "[{'name': 'Color', 'value_name': 'Red'}]"`
//!   becomes one column per generated key (`Color`, `price_1`, ...)
//!
//! Both functions are pure functions of cell content. A malformed literal
//! never aborts the batch: the cell is treated as empty.

pub mod literal;
mod list;
mod nested;

pub use list::flatten_list;
pub use literal::{parse as parse_literal, Literal, LiteralError};
pub use nested::{classify_record, flatten_nested, RecordShape};

use crate::error::{CatalogError, Result};
use crate::table::{ColumnKind, Table};
use polars::prelude::*;
use std::collections::HashSet;

/// A scalar produced by flattening one cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Scalar view of a literal; containers are kept as their literal text
    pub fn from_literal(lit: &Literal) -> Self {
        match lit {
            Literal::None => Cell::Null,
            Literal::Int(i) => Cell::Number(*i as f64),
            Literal::Float(f) => Cell::Number(*f),
            Literal::Str(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.render()),
        }
    }

    /// Scalar view of a polars value
    pub fn from_any_value(av: &AnyValue<'_>) -> Self {
        if av.is_null() {
            return Cell::Null;
        }
        if let Some(s) = av.get_str() {
            return Cell::Text(s.to_string());
        }
        if let AnyValue::Boolean(b) = av {
            return Cell::Text(if *b { "True" } else { "False" }.to_string());
        }
        if av.dtype().is_primitive_numeric() {
            if let Some(f) = av.extract::<f64>() {
                return Cell::Number(f);
            }
        }
        Cell::Text(av.to_string())
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Number(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(format!("{}", *f as i64))
            }
            Cell::Number(f) => Some(literal::render_float(*f)),
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

/// Build one output column: numeric when every present value is a number
pub(crate) fn build_column(name: &str, cells: &[Cell]) -> (Series, ColumnKind) {
    let all_numeric = cells
        .iter()
        .all(|c| matches!(c, Cell::Null | Cell::Number(_)));

    if all_numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Cell::Number(f) => Some(*f),
                _ => None,
            })
            .collect();
        (Series::new(name.into(), values), ColumnKind::Numeric)
    } else {
        let values: Vec<Option<String>> = cells.iter().map(Cell::as_text).collect();
        (Series::new(name.into(), values), ColumnKind::Categorical)
    }
}

/// Per-row key/value mapping that remembers first-insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    entries: Vec<(String, Cell)>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a key
    pub fn insert(&mut self, key: impl Into<String>, value: Cell) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Insert a literal, expanding nested records into dotted keys
    pub fn insert_literal(&mut self, key: &str, value: &Literal) {
        match value {
            Literal::Record(fields) if !fields.is_empty() => {
                for (sub, v) in fields {
                    self.insert_literal(&format!("{}.{}", key, sub), v);
                }
            }
            other => self.insert(key, Cell::from_literal(other)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Union the rows' keys in first-seen order and null-fill missing keys
pub(crate) fn records_to_table(records: &[FlatRecord]) -> Result<Table> {
    let mut order: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key) {
                order.push(key.to_string());
            }
        }
    }

    let columns = order
        .iter()
        .map(|key| {
            let cells: Vec<Cell> = records
                .iter()
                .map(|r| r.get(key).cloned().unwrap_or(Cell::Null))
                .collect();
            build_column(key, &cells)
        })
        .collect();

    Table::from_columns(records.len(), columns)
}

/// Replace column `name` of `table` with its expansion
///
/// `kind` selects the flattener: [`ColumnKind::RawList`] or
/// [`ColumnKind::RawNested`]. When `kind` is `None` the column's own tag decides.
pub fn expand_column(table: &Table, name: &str, kind: Option<ColumnKind>) -> Result<Table> {
    let kind = match kind {
        Some(k) => k,
        None => table
            .kind(name)
            .ok_or_else(|| CatalogError::FeatureNotFound(name.to_string()))?,
    };
    let series = table.series(name)?;
    let expanded = match kind {
        ColumnKind::RawList => flatten_list(series)?,
        ColumnKind::RawNested => flatten_nested(series)?,
        other => {
            return Err(CatalogError::InvalidInput(format!(
                "column '{}' is tagged {:?}, not a list or nested column",
                name, other
            )))
        }
    };

    let mut out = table.clone();
    out.drop_column(name)?;
    out.hstack(expanded)?;
    tracing::debug!(column = name, width = out.width(), "expanded column");
    Ok(out)
}

/// Flatten list column `name` of `table` into a separate table
pub fn flatten_list_column(table: &Table, name: &str) -> Result<Table> {
    flatten_list(table.series(name)?)
}

/// Flatten nested column `name` of `table` into a separate table
pub fn flatten_nested_column(table: &Table, name: &str) -> Result<Table> {
    flatten_nested(table.series(name)?)
}
