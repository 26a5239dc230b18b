//! Feature engineering configuration

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Value written into null numeric cells
pub const DEFAULT_SENTINEL: f64 = -99999.0;

/// What `transform` does with a category value never seen during fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnknownCategoryPolicy {
    /// Map to the "other" score, WOE 0.0 (no evidence either way)
    #[default]
    Neutral,
    /// Fail the transform
    Error,
}

/// Configuration for the per-column binning engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningConfig {
    /// Minimum share of rows per bin, in `(0, 0.5]`
    pub min_bin_size: f64,

    /// Upper bound on the number of bins
    pub max_n_bins: Option<usize>,

    /// Policy for categories unseen at fit time
    pub unknown_policy: UnknownCategoryPolicy,

    /// Log binning failures at debug level instead of warn
    pub quiet: bool,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            min_bin_size: 0.05,
            max_n_bins: None,
            unknown_policy: UnknownCategoryPolicy::Neutral,
            quiet: false,
        }
    }
}

impl BinningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the minimum bin share
    pub fn with_min_bin_size(mut self, min_bin_size: f64) -> Self {
        self.min_bin_size = min_bin_size;
        self
    }

    /// Builder method to cap the number of bins
    pub fn with_max_n_bins(mut self, max_n_bins: usize) -> Self {
        self.max_n_bins = Some(max_n_bins);
        self
    }

    /// Builder method to set the unseen-category policy
    pub fn with_unknown_policy(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.unknown_policy = policy;
        self
    }

    /// Builder method to silence per-column failure warnings
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_bin_size > 0.0 && self.min_bin_size <= 0.5) {
            return Err(CatalogError::ConfigError(format!(
                "min_bin_size must be in (0, 0.5], got {}",
                self.min_bin_size
            )));
        }
        if self.max_n_bins.is_some_and(|n| n < 2) {
            return Err(CatalogError::ConfigError(
                "max_n_bins must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for [`FeatureEngineer`](super::FeatureEngineer)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureEngineerConfig {
    /// Value imputed into null numeric cells
    pub sentinel: f64,

    /// Binning engine settings
    pub binning: BinningConfig,

    /// Fit per-column binning models on the rayon pool
    pub parallel: bool,
}

impl Default for FeatureEngineerConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL,
            binning: BinningConfig::default(),
            parallel: true,
        }
    }
}

impl FeatureEngineerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the numeric sentinel
    pub fn with_sentinel(mut self, sentinel: f64) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Builder method to set the binning configuration
    pub fn with_binning(mut self, binning: BinningConfig) -> Self {
        self.binning = binning;
        self
    }

    /// Builder method to toggle parallel binning
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sentinel.is_finite() {
            return Err(CatalogError::ConfigError(
                "sentinel must be a finite number".to_string(),
            ));
        }
        self.binning.validate()
    }

    /// Read a configuration from a JSON file; absent fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| CatalogError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeatureEngineerConfig::default();
        assert_eq!(config.sentinel, -99999.0);
        assert_eq!(config.binning.min_bin_size, 0.05);
        assert_eq!(config.binning.unknown_policy, UnknownCategoryPolicy::Neutral);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = FeatureEngineerConfig::new()
            .with_sentinel(-1.0)
            .with_parallel(false)
            .with_binning(
                BinningConfig::new()
                    .with_max_n_bins(4)
                    .with_unknown_policy(UnknownCategoryPolicy::Error)
                    .quiet(true),
            );
        assert_eq!(config.sentinel, -1.0);
        assert!(!config.parallel);
        assert_eq!(config.binning.max_n_bins, Some(4));
        assert!(config.binning.quiet);
    }

    #[test]
    fn test_invalid_values() {
        assert!(BinningConfig::new().with_min_bin_size(0.0).validate().is_err());
        assert!(BinningConfig::new().with_max_n_bins(1).validate().is_err());
        assert!(FeatureEngineerConfig::new()
            .with_sentinel(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: FeatureEngineerConfig =
            serde_json::from_str(r#"{"binning": {"quiet": true}}"#).unwrap();
        assert!(config.binning.quiet);
        assert_eq!(config.sentinel, DEFAULT_SENTINEL);
    }
}
