//! Z-score outlier marking

use crate::error::Result;
use crate::table::{ColumnKind, Table};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Default σ threshold
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Label assigned to one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlierLabel {
    High,
    Low,
    Normal,
}

impl OutlierLabel {
    /// Classify a z-score; a missing or NaN score is `Normal`
    pub fn from_zscore(z: Option<f64>, threshold: f64) -> Self {
        match z {
            Some(z) if z > threshold => OutlierLabel::High,
            Some(z) if z < -threshold => OutlierLabel::Low,
            _ => OutlierLabel::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutlierLabel::High => "High",
            OutlierLabel::Low => "Low",
            OutlierLabel::Normal => "Normal",
        }
    }
}

impl std::fmt::Display for OutlierLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marks rows more than `threshold` sample standard deviations from the mean
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierMarker {
    threshold: f64,
}

impl Default for OutlierMarker {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl OutlierMarker {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Name of the column appended by [`OutlierMarker::mark`]
    pub fn output_name(column: &str) -> String {
        format!("outlier_rule_for_{}", column)
    }

    /// Z-score per row, or `None` for every row when the column is degenerate
    ///
    /// Degenerate means fewer than two non-null values or zero variance.
    pub fn zscores(values: &[Option<f64>]) -> Option<Vec<Option<f64>>> {
        let present: Vec<f64> = values
            .iter()
            .flatten()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();
        if present.len() < 2 {
            return None;
        }
        let n = present.len() as f64;
        let mean = present.iter().sum::<f64>() / n;
        let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std = var.sqrt();
        if std == 0.0 || !std.is_finite() {
            return None;
        }
        Some(
            values
                .iter()
                .map(|v| v.filter(|x| !x.is_nan()).map(|x| (x - mean) / std))
                .collect(),
        )
    }

    /// Labels for each value of a numeric column
    pub fn labels(&self, values: &[Option<f64>]) -> Vec<OutlierLabel> {
        match Self::zscores(values) {
            Some(z) => z
                .into_iter()
                .map(|z| OutlierLabel::from_zscore(z, self.threshold))
                .collect(),
            None => vec![OutlierLabel::Normal; values.len()],
        }
    }

    /// Return a copy of `table` with `outlier_rule_for_{column}` appended
    pub fn mark(&self, table: &Table, column: &str) -> Result<Table> {
        let values = table.float_values(column)?;
        if Self::zscores(&values).is_none() {
            tracing::debug!(column, "degenerate column for outlier marking, labelling all rows Normal");
        }
        let labels = self.labels(&values);
        let high = labels.iter().filter(|l| **l == OutlierLabel::High).count();
        let low = labels.iter().filter(|l| **l == OutlierLabel::Low).count();

        let series = Series::new(
            Self::output_name(column).into(),
            labels.iter().map(OutlierLabel::as_str).collect::<Vec<_>>(),
        );
        let mut out = table.clone();
        out.push_column(series, ColumnKind::Categorical)?;
        tracing::debug!(column, high, low, "marked outliers");
        Ok(out)
    }
}

/// Mark outliers in `column` with the given σ threshold
pub fn mark_outliers(table: &Table, column: &str, threshold: f64) -> Result<Table> {
    OutlierMarker::new(threshold).mark(table, column)
}
