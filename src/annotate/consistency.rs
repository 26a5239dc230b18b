//! Null-id consistency flag

use crate::error::Result;
use crate::table::{ColumnKind, Table};
use polars::prelude::*;

pub const ID_COLUMN: &str = "id";
pub const OUTPUT_COLUMN: &str = "inconsistence_rule";

/// Return a copy of `table` with `inconsistence_rule` appended
///
/// A row is `Inconsistent` when its `id` is null (or NaN), else `Consistent`.
pub fn mark_inconsistent(table: &Table) -> Result<Table> {
    let id = table.series(ID_COLUMN)?;
    let nan_mask: Vec<bool> = if id.dtype().is_float() {
        id.cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.is_some_and(f64::is_nan))
            .collect()
    } else {
        vec![false; id.len()]
    };

    let flags: Vec<&str> = id
        .is_null()
        .into_iter()
        .zip(nan_mask)
        .map(|(null, nan)| {
            if null.unwrap_or(true) || nan {
                "Inconsistent"
            } else {
                "Consistent"
            }
        })
        .collect();
    let inconsistent = flags.iter().filter(|f| **f == "Inconsistent").count();

    let mut out = table.clone();
    out.push_column(Series::new(OUTPUT_COLUMN.into(), flags), ColumnKind::Categorical)?;
    tracing::debug!(inconsistent, "applied consistency rule");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_id_is_inconsistent() {
        let table = Table::from_frame(df!("id" => &[None, Some(42i64)]).unwrap());
        let out = mark_inconsistent(&table).unwrap();
        assert_eq!(
            out.text_values(OUTPUT_COLUMN).unwrap(),
            vec![Some("Inconsistent".to_string()), Some("Consistent".to_string())]
        );
    }

    #[test]
    fn test_nan_id_is_inconsistent() {
        let table = Table::from_frame(df!("id" => &[f64::NAN, 1.0]).unwrap());
        let out = mark_inconsistent(&table).unwrap();
        assert_eq!(
            out.text_values(OUTPUT_COLUMN).unwrap()[0].as_deref(),
            Some("Inconsistent")
        );
    }

    #[test]
    fn test_missing_id_column() {
        let table = Table::from_frame(df!("price" => &[1.0]).unwrap());
        assert!(mark_inconsistent(&table).is_err());
    }
}
