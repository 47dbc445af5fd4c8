// src/simulation/engine.rs

use crate::model::records::{ProductRecord, StockState};
use crate::simulation::config::SimulationConfig;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::ops::ControlFlow;
use tracing::{debug, info, warn};

/// Lifecycle of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Initialized,
    /// The next cycle to execute.
    Running { cycle: usize },
    Completed,
}

/// A product at or below the low-stock threshold after a depletion step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockAlert {
    pub cycle: usize,
    pub product_id: String,
    pub current_stock: u32,
}

impl fmt::Display for LowStockAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Low Stock Alert: Product {} | Stock = {}",
            self.product_id, self.current_stock
        )
    }
}

/// Stock table and alerts emitted at the end of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSnapshot {
    pub cycle: usize,
    pub stock: Vec<StockState>,
    pub alerts: Vec<LowStockAlert>,
}

/// Steps per-product stock through a fixed number of random depletion cycles.
///
/// The simulation owns its stock table and its random source for the whole
/// run; pass a seeded RNG for reproducible runs.
pub struct InventorySimulation<R: Rng> {
    config: SimulationConfig,
    rng: R,
    stock: Vec<StockState>,
    state: SimulationState,
    pub history: Vec<CycleSnapshot>,
}

impl<R: Rng> InventorySimulation<R> {
    /// Builds the initial stock table from a product catalog.
    ///
    /// Products without a stock value are seeded with an independent draw
    /// from `[seed_stock_min, seed_stock_max)`.
    pub fn from_catalog(config: SimulationConfig, catalog: &[ProductRecord], mut rng: R) -> Self {
        let mut seeded = 0;
        let stock = catalog
            .iter()
            .map(|product| {
                let current_stock = match product.current_stock {
                    Some(stock) => stock,
                    None => {
                        seeded += 1;
                        seed_stock(&config, &mut rng)
                    }
                };
                StockState::new(product.product_id.clone(), current_stock)
            })
            .collect();

        if seeded > 0 {
            info!("Seeded random stock for {} products without a stock value", seeded);
        }

        Self::new(config, stock, rng)
    }

    pub fn new(config: SimulationConfig, stock: Vec<StockState>, rng: R) -> Self {
        Self {
            config,
            rng,
            stock,
            state: SimulationState::Initialized,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// The stock table as of the last completed cycle.
    pub fn snapshot(&self) -> &[StockState] {
        &self.stock
    }

    /// Moves an initialized simulation onto its first cycle.
    pub fn start(&mut self) {
        if self.state == SimulationState::Initialized {
            self.state = if self.config.cycles == 0 {
                SimulationState::Completed
            } else {
                SimulationState::Running { cycle: 1 }
            };
        }
    }

    /// Runs every remaining cycle.
    pub fn run(&mut self) {
        self.run_with(|_| ControlFlow::Continue(()));
    }

    /// Runs the remaining cycles, handing each snapshot to `observer` once it is
    /// complete. Returning `Break` stops scheduling further cycles.
    pub fn run_with<F>(&mut self, mut observer: F)
    where
        F: FnMut(&CycleSnapshot) -> ControlFlow<()>,
    {
        while let Some(snapshot) = self.step() {
            if observer(snapshot).is_break() {
                info!("Simulation stopped after cycle {}", snapshot.cycle);
                break;
            }
        }
    }

    /// Executes one depletion cycle. Returns `None` once the run is completed.
    pub fn step(&mut self) -> Option<&CycleSnapshot> {
        self.start();
        let cycle = match self.state {
            SimulationState::Running { cycle } => cycle,
            _ => return None,
        };

        for entry in &mut self.stock {
            let draw = self.rng.gen_range(0..=self.config.max_depletion);
            entry.current_stock = entry.current_stock.saturating_sub(draw);
        }

        let alerts: Vec<LowStockAlert> = self
            .stock
            .iter()
            .filter(|entry| entry.current_stock <= self.config.low_stock_threshold)
            .map(|entry| LowStockAlert {
                cycle,
                product_id: entry.product_id.clone(),
                current_stock: entry.current_stock,
            })
            .collect();

        for alert in &alerts {
            warn!("{}", alert);
        }
        debug!("Cycle {} snapshot: {:?}", cycle, self.stock);

        self.history.push(CycleSnapshot {
            cycle,
            stock: self.stock.clone(),
            alerts,
        });

        self.state = if cycle >= self.config.cycles {
            SimulationState::Completed
        } else {
            SimulationState::Running { cycle: cycle + 1 }
        };

        self.history.last()
    }

    /// All alerts raised so far, in cycle order.
    pub fn alerts(&self) -> impl Iterator<Item = &LowStockAlert> {
        self.history.iter().flat_map(|snapshot| snapshot.alerts.iter())
    }

    pub fn into_snapshot(self) -> Vec<StockState> {
        self.stock
    }
}

fn seed_stock<R: Rng>(config: &SimulationConfig, rng: &mut R) -> u32 {
    if config.seed_stock_max > config.seed_stock_min {
        rng.gen_range(config.seed_stock_min..config.seed_stock_max)
    } else {
        config.seed_stock_min
    }
}
