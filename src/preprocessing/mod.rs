//! Feature engineering
//!
//! Fit/transform pipeline turning an annotated table into model-ready
//! numeric features:
//! - Sentinel imputation of numeric nulls
//! - Constant column pruning
//! - Optimal monotonic binning with weight-of-evidence encoding
//! - Schema-drift guard at transform time

mod binning;
mod config;
mod pipeline;
mod schema;

pub use binning::{Bin, BinningModel, OptimalBinning, NEUTRAL_WOE};
pub use config::{BinningConfig, FeatureEngineerConfig, UnknownCategoryPolicy, DEFAULT_SENTINEL};
pub use pipeline::{FeatureEngineer, FitReport, FittedFeatures, TransformReport};
pub use schema::TrainedSchema;
