// src/simulation/config.rs

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub cycles: usize,
    pub low_stock_threshold: u32,
    /// Upper bound (inclusive) of the per-cycle depletion draw.
    pub max_depletion: u32,
    // Fallback seeding range for catalogs without a stock column, [min, max)
    pub seed_stock_min: u32,
    pub seed_stock_max: u32,
    /// Pause between cycles when driven from the command line.
    pub cycle_interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cycles: 5,
            low_stock_threshold: 30,
            max_depletion: 5,
            seed_stock_min: 50,
            seed_stock_max: 200,
            cycle_interval_ms: 0,
        }
    }
}
