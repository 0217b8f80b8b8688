use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::AggregationError;
use crate::pip::{DEFAULT_GRID_RESOLUTION, DEFAULT_SIGNIFICANCE_THRESHOLD};

/// Tunables for an aggregation run
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AggregationConfig {
    /// Grid cells per axis used by the overlap estimator
    pub grid_resolution: usize,
    /// Estimated ratios at or below this are discarded
    pub significance_threshold: f64,
    /// Spread target units across the rayon pool
    pub parallel: bool,
    /// Skip tracts whose envelope misses the unit envelope
    pub use_spatial_index: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            parallel: true,
            use_spatial_index: true,
        }
    }
}

impl AggregationConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: AggregationConfig =
            toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), AggregationError> {
        if self.grid_resolution == 0 {
            return Err(AggregationError::InvalidConfig(
                "grid_resolution must be at least 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.significance_threshold) {
            return Err(AggregationError::InvalidConfig(format!(
                "significance_threshold must be in [0, 1), got {}",
                self.significance_threshold
            )));
        }
        Ok(())
    }
}
