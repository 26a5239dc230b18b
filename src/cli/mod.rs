//! Catalog features CLI module
//!
//! Command-line interface for preparing training features, reapplying a
//! fitted state to new data and inspecting a saved state.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::annotate::{annotate, OutlierMarker, DEFAULT_THRESHOLD};
use crate::flatten::expand_column;
use crate::preprocessing::{FeatureEngineer, FeatureEngineerConfig, FittedFeatures};
use crate::table::{ColumnKind, Table};
use crate::utils::{DataLoader, DataSaver};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<18} {}", muted(key), val.white());
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "catalog-features")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Model-ready features from e-commerce item tables")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flatten, annotate and fit on a labelled training table
    Prepare {
        /// Training data file (CSV, JSON, or Parquet)
        #[arg(long)]
        train: PathBuf,

        /// Binary 0/1 target column
        #[arg(short, long)]
        target: String,

        /// Column holding list literals (repeatable)
        #[arg(long = "list")]
        list_columns: Vec<String>,

        /// Column holding lists of record literals (repeatable)
        #[arg(long = "nested")]
        nested_columns: Vec<String>,

        /// Feature engineer configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// σ threshold for outlier marking
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        sigma: f64,

        /// Encoded training table output
        #[arg(short, long)]
        output: PathBuf,

        /// Fitted state output (JSON)
        #[arg(short, long)]
        state: PathBuf,
    },

    /// Reapply a fitted state to new data
    Apply {
        /// Input data file (CSV, JSON, or Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// Fitted state written by `prepare`
        #[arg(short, long)]
        state: PathBuf,

        /// Column holding list literals (repeatable)
        #[arg(long = "list")]
        list_columns: Vec<String>,

        /// Column holding lists of record literals (repeatable)
        #[arg(long = "nested")]
        nested_columns: Vec<String>,

        /// σ threshold for outlier marking
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        sigma: f64,

        /// Encoded table output
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show the schema and binning models of a fitted state
    Inspect {
        /// Fitted state written by `prepare`
        #[arg(short, long)]
        state: PathBuf,
    },
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &Path) -> anyhow::Result<DataFrame> {
    Ok(DataLoader::new().load_auto(path)?)
}

/// Tag raw columns, expand list and nested columns, then annotate
pub fn prepare_table(
    df: DataFrame,
    list_columns: &[String],
    nested_columns: &[String],
    marker: &OutlierMarker,
) -> crate::Result<Table> {
    let mut table = Table::from_frame(df);
    for name in list_columns {
        table.set_kind(name, ColumnKind::RawList)?;
    }
    for name in nested_columns {
        table.set_kind(name, ColumnKind::RawNested)?;
    }
    if table.contains("date_created") {
        table.set_kind("date_created", ColumnKind::DateText)?;
    }

    for name in list_columns.iter().chain(nested_columns) {
        table = expand_column(&table, name, None)?;
    }
    annotate(&table, marker)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn cmd_prepare(
    train_path: &Path,
    target: &str,
    list_columns: &[String],
    nested_columns: &[String],
    config_path: Option<&Path>,
    sigma: f64,
    output_path: &Path,
    state_path: &Path,
) -> anyhow::Result<()> {
    section("Prepare");

    let config = match config_path {
        Some(path) => FeatureEngineerConfig::from_json_file(path)?,
        None => FeatureEngineerConfig::default(),
    };

    step_run("Loading data");
    let start = Instant::now();
    let mut df = load_data(train_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    let target_series = df
        .drop_in_place(target)
        .map_err(|_| anyhow::anyhow!("Target column '{}' not found", target))?
        .take_materialized_series();

    step_run("Flattening and annotating");
    let table = prepare_table(df, list_columns, nested_columns, &OutlierMarker::new(sigma))?;
    step_done(&format!("{} cols", table.width()));

    step_run("Fitting");
    let start = Instant::now();
    let (fitted, encoded) = FeatureEngineer::with_config(config).fit_transform(&table, &target_series)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run(&format!("Saving → {}", output_path.display()));
    let mut frame = encoded.into_frame();
    DataSaver::save_auto(&mut frame, output_path)?;
    step_done(&format!("{} rows × {} cols", frame.height(), frame.width()));

    step_run(&format!("Saving state → {}", state_path.display()));
    fitted.save(state_path)?;
    step_done("");

    let report = fitted.report();
    println!();
    kv("Numeric", &report.numeric_columns.len().to_string());
    kv("Pruned", &report.dropped_constant.len().to_string());
    kv("Encoded", &report.encoded_columns.len().to_string());
    kv("Binning failures", &report.binning_failures.len().to_string());
    for (column, reason) in &report.binning_failures {
        println!("    {} {}", column.yellow(), dim(reason));
    }
    println!();
    Ok(())
}

pub fn cmd_apply(
    data_path: &Path,
    state_path: &Path,
    list_columns: &[String],
    nested_columns: &[String],
    sigma: f64,
    output_path: &Path,
) -> anyhow::Result<()> {
    section("Apply");

    step_run("Loading state");
    let fitted = FittedFeatures::load(state_path)?;
    step_done(&format!("{} columns", fitted.schema().len()));

    step_run("Loading data");
    let df = load_data(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    step_run("Flattening and annotating");
    let table = prepare_table(df, list_columns, nested_columns, &OutlierMarker::new(sigma))?;
    step_done(&format!("{} cols", table.width()));

    step_run("Transforming");
    let start = Instant::now();
    let (out, report) = fitted.transform_with_report(&table)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run(&format!("Saving → {}", output_path.display()));
    let mut frame = out.into_frame();
    DataSaver::save_auto(&mut frame, output_path)?;
    step_done(&format!("{} rows × {} cols", frame.height(), frame.width()));

    println!();
    kv("Dropped (drift)", &report.drifted_columns.len().to_string());
    kv("Unseen categories", &report.unseen_categories.to_string());
    println!();
    Ok(())
}

pub fn cmd_inspect(state_path: &Path) -> anyhow::Result<()> {
    section("Fitted state");

    let fitted = FittedFeatures::load(state_path)?;
    let schema = fitted.schema();
    kv("File", &state_path.display().to_string());
    kv("Training rows", &fitted.report().rows.to_string());
    kv("Columns", &schema.len().to_string());
    kv("Pruned", &schema.pruned_columns().join(", "));
    kv("Sentinel", &fitted.config().sentinel.to_string());
    println!();

    println!("  {:<28} {:>6} {:>10}", muted("Column"), muted("Bins"), muted("IV"));
    println!("  {}", dim(&"─".repeat(46)));
    for column in schema.columns() {
        match fitted.model(column) {
            Some(model) => println!(
                "  {:<28} {:>6} {:>10.4}",
                column,
                model.n_bins(),
                model.information_value()
            ),
            None => println!("  {:<28} {:>6} {:>10}", column, dim("-"), dim("numeric")),
        }
    }
    println!();
    Ok(())
}
