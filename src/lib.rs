//! Catalog features - model-ready features from e-commerce item tables
//!
//! This crate turns a raw table of item records into a numeric table a
//! classifier can consume:
//! - Flattening of list and nested-record text columns
//! - Row annotations (outliers, null ids, normalized dates)
//! - A fit/transform feature engineer with constant pruning, sentinel
//!   imputation and monotonic weight-of-evidence binning
//!
//! # Modules
//!
//! - [`table`] - Data frame with explicit column kind tags
//! - [`flatten`] - List and nested column flattening
//! - [`annotate`] - Row annotators
//! - [`preprocessing`] - Feature engineer, binning engine, trained schema
//! - [`utils`] - File loading and saving
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data model
pub mod table;

// Column processing
pub mod flatten;
pub mod annotate;
pub mod preprocessing;

// Utilities
pub mod utils;

// Services
pub mod cli;

pub use error::{CatalogError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{CatalogError, Result};

    // Data model
    pub use crate::table::{ColumnKind, Table};

    // Flattening
    pub use crate::flatten::{
        expand_column, flatten_list, flatten_list_column, flatten_nested, flatten_nested_column,
        Literal, RecordShape,
    };

    // Annotation
    pub use crate::annotate::{
        annotate, convert_dates, mark_inconsistent, mark_outliers, OutlierLabel, OutlierMarker,
    };

    // Feature engineering
    pub use crate::preprocessing::{
        BinningConfig, BinningModel, FeatureEngineer, FeatureEngineerConfig, FittedFeatures,
        OptimalBinning, TrainedSchema, UnknownCategoryPolicy,
    };

    // Data loading
    pub use crate::utils::{DataLoader, DataSaver};
}
