// src/forecast/config.rs

use crate::forecast::features::DEFAULT_ROLLING_WINDOW;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub rolling_window: usize,
    /// Share of feature rows held out for the MAE/RMSE diagnostics.
    pub test_fraction: f64,
    pub split_seed: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            test_fraction: 0.2,
            split_seed: 42,
        }
    }
}
