// src/pipeline.rs

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::forecast::regression::{forecast_demand, DemandForecast};
use crate::io::reporting::AllocationSummary;
use crate::model::records::{ProductRecord, SalesRecord, StockState};
use crate::simulation::engine::{CycleSnapshot, InventorySimulation};
use crate::strategy::engine::{AllocationEngine, JoinOutcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Everything one end-to-end run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub forecast: DemandForecast,
    pub history: Vec<CycleSnapshot>,
    pub final_stock: Vec<StockState>,
    pub allocation: JoinOutcome,
    pub summary: AllocationSummary,
}

/// Seeded RNG when a seed is given, OS entropy otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Forecast demand, run the inventory simulation to completion, then
/// allocate on the final snapshot and summarize.
pub fn run_pipeline<R: Rng>(
    config: &PipelineConfig,
    catalog: &[ProductRecord],
    sales: &[SalesRecord],
    rng: R,
) -> Result<PipelineOutput> {
    info!("Stage 1/3: demand forecast");
    let forecast = forecast_demand(sales, &config.forecast)?;

    info!("Stage 2/3: inventory simulation ({} cycles)", config.simulation.cycles);
    let mut simulation = InventorySimulation::from_catalog(config.simulation.clone(), catalog, rng);
    simulation.run();
    let history = std::mem::take(&mut simulation.history);
    let final_stock = simulation.into_snapshot();

    info!("Stage 3/3: allocation");
    let engine = AllocationEngine::from_kind(
        config.allocation.policy,
        config.allocation.low_stock_threshold,
    );
    let allocation = engine.evaluate(&final_stock, &forecast.predictions);
    let summary = AllocationSummary::from_decisions(&allocation.decisions);

    Ok(PipelineOutput {
        forecast,
        history,
        final_stock,
        allocation,
        summary,
    })
}
