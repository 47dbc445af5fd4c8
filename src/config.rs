// src/config.rs

use crate::error::{PipelineError, Result};
use crate::forecast::config::ForecastConfig;
use crate::simulation::config::SimulationConfig;
use crate::strategy::implementations::{PolicyKind, LOW_STOCK_THRESHOLD};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    pub policy: PolicyKind,
    pub low_stock_threshold: u32,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }
}

/// Settings for a full pipeline run. Every section is optional in TOML.
///
/// ```toml
/// random_seed = 7
///
/// [simulation]
/// cycles = 5
///
/// [allocation]
/// policy = "threshold-matrix"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub simulation: SimulationConfig,
    pub forecast: ForecastConfig,
    pub allocation: AllocationConfig,
    /// Seed for the simulator's random source; OS entropy when absent.
    pub random_seed: Option<u64>,
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| PipelineError::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::Config {
            reason: format!("cannot read {:?}: {}", path, e),
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let fraction = self.forecast.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(PipelineError::Config {
                reason: format!("forecast.test_fraction must be in (0, 1), got {}", fraction),
            });
        }
        if self.forecast.rolling_window == 0 {
            return Err(PipelineError::Config {
                reason: "forecast.rolling_window must be at least 1".to_string(),
            });
        }
        if self.simulation.seed_stock_max <= self.simulation.seed_stock_min {
            return Err(PipelineError::Config {
                reason: format!(
                    "simulation seed range [{}, {}) is empty",
                    self.simulation.seed_stock_min, self.simulation.seed_stock_max
                ),
            });
        }
        Ok(())
    }
}
