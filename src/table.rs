//! Tagged tabular data
//!
//! A [`Table`] is a polars [`DataFrame`] plus an explicit [`ColumnKind`] tag for
//! every column. Tags are assigned once when data enters the crate and travel
//! with the table through flattening, annotation and feature engineering, so
//! no stage has to guess a column's role from its runtime dtype.

use crate::error::{CatalogError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic role of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    /// Text holding a list literal, e.g. `"['a', 'b']"`
    RawList,
    /// Text holding a list of record literals
    RawNested,
    /// Free-form date text
    DateText,
}

impl ColumnKind {
    /// Tag used when a frame is ingested without explicit tags
    pub fn from_dtype(dtype: &DataType) -> Self {
        if dtype.is_primitive_numeric() {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }
}

/// A data frame whose columns carry explicit kind tags
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    kinds: BTreeMap<String, ColumnKind>,
    height: usize,
}

impl Table {
    /// Wrap a frame, tagging every column from its dtype
    pub fn from_frame(frame: DataFrame) -> Self {
        let kinds = frame
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), ColumnKind::from_dtype(c.dtype())))
            .collect();
        let height = frame.height();
        Self {
            frame,
            kinds,
            height,
        }
    }

    /// A table with no columns and `height` rows
    pub fn empty(height: usize) -> Self {
        Self {
            frame: DataFrame::empty(),
            kinds: BTreeMap::new(),
            height,
        }
    }

    /// Build a table from already-tagged columns of equal length
    pub fn from_columns(height: usize, columns: Vec<(Series, ColumnKind)>) -> Result<Self> {
        let mut table = Self::empty(height);
        for (series, kind) in columns {
            table.push_column(series, kind)?;
        }
        Ok(table)
    }

    /// Override the tag of an existing column
    pub fn with_kind(mut self, name: &str, kind: ColumnKind) -> Result<Self> {
        self.set_kind(name, kind)?;
        Ok(self)
    }

    pub fn set_kind(&mut self, name: &str, kind: ColumnKind) -> Result<()> {
        match self.kinds.get_mut(name) {
            Some(k) => {
                *k = kind;
                Ok(())
            }
            None => Err(CatalogError::FeatureNotFound(name.to_string())),
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Column names in frame order
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.kinds.get(name).copied()
    }

    /// Names of columns whose tag satisfies `pred`, in frame order
    pub fn columns_where(&self, pred: impl Fn(ColumnKind) -> bool) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| self.kind(name).is_some_and(&pred))
            .collect()
    }

    pub fn series(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|c| c.as_materialized_series())
            .map_err(|_| CatalogError::FeatureNotFound(name.to_string()))
    }

    /// Column values as `f64`, casting integer and boolean columns
    pub fn float_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let casted = self.series(name)?.cast(&DataType::Float64)?;
        Ok(casted.f64()?.into_iter().collect())
    }

    /// Column values rendered as text, casting non-string columns
    pub fn text_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let casted = self.series(name)?.cast(&DataType::String)?;
        Ok(casted
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    /// Append a new column; its name must be free and its length must match
    pub fn push_column(&mut self, series: Series, kind: ColumnKind) -> Result<()> {
        let name = series.name().to_string();
        if self.contains(&name) {
            return Err(CatalogError::InvalidInput(format!(
                "column '{}' already exists",
                name
            )));
        }
        self.check_height(&series)?;
        self.frame.with_column(series)?;
        self.kinds.insert(name, kind);
        Ok(())
    }

    /// Replace an existing column in place, keeping its position
    pub fn replace_column(&mut self, series: Series, kind: ColumnKind) -> Result<()> {
        let name = series.name().to_string();
        if !self.contains(&name) {
            return Err(CatalogError::FeatureNotFound(name));
        }
        self.check_height(&series)?;
        self.frame.with_column(series)?;
        self.kinds.insert(name, kind);
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Result<()> {
        self.frame
            .drop_in_place(name)
            .map_err(|_| CatalogError::FeatureNotFound(name.to_string()))?;
        self.kinds.remove(name);
        Ok(())
    }

    /// Append every column of `other` to the right of this table
    pub fn hstack(&mut self, other: Table) -> Result<()> {
        if other.height != self.height {
            return Err(CatalogError::ShapeError {
                expected: format!("{} rows", self.height),
                actual: format!("{} rows", other.height),
            });
        }
        let Table { frame, kinds, .. } = other;
        for column in frame.get_columns() {
            let name = column.name().to_string();
            let kind = kinds.get(&name).copied().unwrap_or(ColumnKind::Categorical);
            self.push_column(column.as_materialized_series().clone(), kind)?;
        }
        Ok(())
    }

    fn check_height(&self, series: &Series) -> Result<()> {
        if series.len() != self.height {
            return Err(CatalogError::ShapeError {
                expected: format!("{} rows", self.height),
                actual: format!("{} rows in column '{}'", series.len(), series.name()),
            });
        }
        Ok(())
    }
}

impl From<DataFrame> for Table {
    fn from(frame: DataFrame) -> Self {
        Self::from_frame(frame)
    }
}
