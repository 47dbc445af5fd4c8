//! Inventory-aware marketing allocation.
//!
//! Forecasts short-horizon demand from per-product sales history, simulates
//! stock depletion over discrete update cycles, and turns each product's
//! (stock, predicted demand) pair into a promotion, staffing and channel plan.

pub mod config;
pub mod error;
pub mod forecast;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod simulation;
pub mod strategy;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
