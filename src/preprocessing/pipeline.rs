//! Fit/transform feature engineering pipeline

use super::binning::{BinningModel, OptimalBinning};
use super::config::FeatureEngineerConfig;
use super::schema::TrainedSchema;
use crate::error::{CatalogError, Result};
use crate::table::{ColumnKind, Table};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

/// What `fit` did to each column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub rows: usize,
    pub numeric_columns: Vec<String>,
    pub dropped_constant: Vec<String>,
    /// Columns dropped because binning failed, with the reason
    pub binning_failures: BTreeMap<String, String>,
    pub encoded_columns: Vec<String>,
    pub information_value: BTreeMap<String, f64>,
    /// Wall-clock seconds; not persisted
    #[serde(skip)]
    pub fit_time: f64,
}

/// What `transform` did to one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformReport {
    /// Columns absent from the trained schema, dropped from the output
    pub drifted_columns: Vec<String>,
    /// Category values unseen at fit, mapped through the unknown policy
    pub unseen_categories: usize,
}

/// Builds a [`FittedFeatures`] from a labelled training table
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    config: FeatureEngineerConfig,
}

impl FeatureEngineer {
    /// Create an engineer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FeatureEngineerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureEngineerConfig {
        &self.config
    }

    /// Fit on `table` against a 0/1 `target`; the table is left untouched
    pub fn fit(&self, table: &Table, target: &Series) -> Result<FittedFeatures> {
        self.fit_transform(table, target).map(|(fitted, _)| fitted)
    }

    /// Fit and return the fitted state with the encoded training table
    pub fn fit_transform(&self, table: &Table, target: &Series) -> Result<(FittedFeatures, Table)> {
        let start = Instant::now();
        self.config.validate()?;
        let target = binary_target(target, table.height())?;

        let mut df = table.clone();
        let mut report = FitReport {
            rows: df.height(),
            ..Default::default()
        };

        // Numeric imputation
        report.numeric_columns = df.columns_where(ColumnKind::is_numeric);
        impute_numeric(&mut df, &report.numeric_columns, self.config.sentinel)?;

        // Constant columns
        for name in df.column_names() {
            let constant = match df.kind(&name) {
                Some(ColumnKind::Numeric) => is_constant_numeric(&df, &name)?,
                _ => distinct_non_null(&df, &name)? <= 1,
            };
            if constant {
                df.drop_column(&name)?;
                tracing::debug!(column = %name, "dropped constant column");
                report.dropped_constant.push(name);
            }
        }

        // Per-column binning
        let categorical = df.columns_where(|k| !k.is_numeric());
        let inputs: Vec<(String, Vec<Option<String>>)> = categorical
            .into_iter()
            .map(|name| df.text_values(&name).map(|values| (name, values)))
            .collect::<Result<_>>()?;

        let binning = OptimalBinning::new(self.config.binning.clone());
        let fit_one = |(name, values): &(String, Vec<Option<String>>)| {
            (name.clone(), binning.fit(name, values, &target))
        };
        let fitted: Vec<(String, Result<BinningModel>)> = if self.config.parallel {
            inputs.par_iter().map(fit_one).collect()
        } else {
            inputs.iter().map(fit_one).collect()
        };

        let mut models = BTreeMap::new();
        for ((name, result), (_, values)) in fitted.into_iter().zip(&inputs) {
            match result {
                Ok(model) => {
                    let (scores, _) = model.transform(values, self.config.binning.unknown_policy)?;
                    df.replace_column(Series::new(name.as_str().into(), scores), ColumnKind::Numeric)?;
                    report
                        .information_value
                        .insert(name.clone(), model.information_value());
                    report.encoded_columns.push(name.clone());
                    models.insert(name, model);
                }
                Err(err) => {
                    if self.config.binning.quiet {
                        tracing::debug!(column = %name, error = %err, "dropping column");
                    } else {
                        tracing::warn!(column = %name, error = %err, "dropping column");
                    }
                    df.drop_column(&name)?;
                    let reason = match err {
                        CatalogError::BinningFailure { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    report.binning_failures.insert(name, reason);
                }
            }
        }

        let schema = TrainedSchema::new(
            df.column_names(),
            report.numeric_columns.clone(),
            report.dropped_constant.clone(),
        );
        report.fit_time = start.elapsed().as_secs_f64();
        tracing::info!(
            rows = report.rows,
            columns = schema.len(),
            pruned = report.dropped_constant.len(),
            encoded = report.encoded_columns.len(),
            failed = report.binning_failures.len(),
            "fitted feature engineer"
        );

        let fitted = FittedFeatures {
            config: self.config.clone(),
            schema,
            models,
            report,
        };
        Ok((fitted, df))
    }
}

/// Immutable state produced by [`FeatureEngineer::fit`]
///
/// `transform` only reads this state, so one instance can serve any number
/// of concurrent callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedFeatures {
    config: FeatureEngineerConfig,
    schema: TrainedSchema,
    models: BTreeMap<String, BinningModel>,
    report: FitReport,
}

impl FittedFeatures {
    pub fn schema(&self) -> &TrainedSchema {
        &self.schema
    }

    pub fn config(&self) -> &FeatureEngineerConfig {
        &self.config
    }

    /// Binning models keyed by column name
    pub fn models(&self) -> &BTreeMap<String, BinningModel> {
        &self.models
    }

    pub fn model(&self, column: &str) -> Option<&BinningModel> {
        self.models.get(column)
    }

    pub fn report(&self) -> &FitReport {
        &self.report
    }

    /// Reapply the fitted state to a new table
    pub fn transform(&self, table: &Table) -> Result<Table> {
        self.transform_with_report(table).map(|(out, _)| out)
    }

    /// Like [`FittedFeatures::transform`], also reporting drift and unseen values
    pub fn transform_with_report(&self, table: &Table) -> Result<(Table, TransformReport)> {
        let mut df = table.clone();
        let mut report = TransformReport::default();

        let numeric: Vec<String> = self
            .schema
            .numeric_columns()
            .iter()
            .filter(|name| df.contains(name))
            .cloned()
            .collect();
        impute_numeric(&mut df, &numeric, self.config.sentinel)?;

        for name in df.column_names() {
            if !self.schema.contains(&name) {
                df.drop_column(&name)?;
                tracing::debug!(column = %name, "dropped column unseen at fit");
                report.drifted_columns.push(name);
            }
        }

        for (name, model) in &self.models {
            if !df.contains(name) {
                continue;
            }
            let values = df.text_values(name)?;
            let (scores, unseen) = model.transform(&values, self.config.binning.unknown_policy)?;
            if unseen > 0 {
                tracing::debug!(column = %name, unseen, "mapped unseen categories to neutral score");
            }
            report.unseen_categories += unseen;
            df.replace_column(Series::new(name.as_str().into(), scores), ColumnKind::Numeric)?;
        }

        tracing::info!(
            rows = df.height(),
            columns = df.width(),
            drifted = report.drifted_columns.len(),
            unseen = report.unseen_categories,
            "transformed table"
        );
        Ok((df, report))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save the fitted state to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load a fitted state; a missing file means nothing was fitted
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::NotFitted(format!(
                "no fitted state at {}",
                path.display()
            )));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Check that `target` holds only 0/1 values and matches the row count
fn binary_target(target: &Series, height: usize) -> Result<Vec<bool>> {
    if target.len() != height {
        return Err(CatalogError::ShapeError {
            expected: format!("{} target values", height),
            actual: format!("{}", target.len()),
        });
    }
    let casted = target.cast(&DataType::Float64)?;
    casted
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Some(v) if v == 1.0 => Ok(true),
            Some(v) if v == 0.0 => Ok(false),
            other => Err(CatalogError::InvalidInput(format!(
                "target must be binary 0/1, got {:?} at row {}",
                other, i
            ))),
        })
        .collect()
}

/// Fill null and NaN cells of the given columns with `sentinel`
fn impute_numeric(df: &mut Table, columns: &[String], sentinel: f64) -> Result<()> {
    for name in columns {
        let filled: Vec<f64> = df
            .float_values(name)?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()).unwrap_or(sentinel))
            .collect();
        df.replace_column(Series::new(name.as_str().into(), filled), ColumnKind::Numeric)?;
    }
    Ok(())
}

/// Zero sample variance; fewer than two values never counts as constant
fn is_constant_numeric(df: &Table, name: &str) -> Result<bool> {
    let values: Vec<f64> = df.float_values(name)?.into_iter().flatten().collect();
    if values.len() < 2 {
        return Ok(false);
    }
    let first = values[0];
    Ok(values.iter().all(|v| *v == first))
}

fn distinct_non_null(df: &Table, name: &str) -> Result<usize> {
    let series = df.series(name)?.drop_nulls();
    Ok(series.n_unique()?)
}
