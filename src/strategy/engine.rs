// src/strategy/engine.rs

use crate::model::decision::AllocationDecision;
use crate::model::records::{ForecastResult, StockState};
use crate::strategy::implementations::PolicyKind;
use crate::strategy::traits::AllocationPolicy;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// Result of joining a stock snapshot with a demand forecast.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinOutcome {
    /// One decision per product present on both sides, in stock-snapshot order.
    pub decisions: Vec<AllocationDecision>,
    /// Products in the stock snapshot with no forecast.
    pub missing_demand: Vec<String>,
    /// Products with a forecast but no stock entry.
    pub missing_stock: Vec<String>,
}

/// Joins inventory and demand on product id and applies the configured policy.
#[derive(Debug)]
pub struct AllocationEngine {
    policy: Box<dyn AllocationPolicy>,
}

impl AllocationEngine {
    pub fn new(policy: Box<dyn AllocationPolicy>) -> Self {
        Self { policy }
    }

    pub fn from_kind(kind: PolicyKind, low_stock_threshold: u32) -> Self {
        Self::new(kind.build(low_stock_threshold))
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Inner join: products missing from either side are dropped and reported.
    ///
    /// If the forecast lists a product twice, the later row is used.
    pub fn evaluate(&self, stock: &[StockState], demand: &[ForecastResult]) -> JoinOutcome {
        let mut demand_by_product: HashMap<&str, f64> = HashMap::with_capacity(demand.len());
        for forecast in demand {
            if demand_by_product
                .insert(forecast.product_id.as_str(), forecast.predicted_demand)
                .is_some()
            {
                warn!(
                    "Duplicate forecast for product {}; using the last one",
                    forecast.product_id
                );
            }
        }

        let mut outcome = JoinOutcome::default();
        let mut stocked: HashSet<&str> = HashSet::with_capacity(stock.len());

        for entry in stock {
            stocked.insert(entry.product_id.as_str());
            match demand_by_product.get(entry.product_id.as_str()) {
                Some(&predicted_demand) => {
                    let allocation = self.policy.allocate(entry.current_stock, predicted_demand);
                    outcome.decisions.push(AllocationDecision::new(
                        entry.product_id.clone(),
                        entry.current_stock,
                        predicted_demand,
                        allocation,
                    ));
                }
                None => outcome.missing_demand.push(entry.product_id.clone()),
            }
        }

        let mut seen_missing: HashSet<&str> = HashSet::new();
        for forecast in demand {
            let id = forecast.product_id.as_str();
            if !stocked.contains(id) && seen_missing.insert(id) {
                outcome.missing_stock.push(forecast.product_id.clone());
            }
        }

        if !outcome.missing_demand.is_empty() {
            warn!(
                "Dropped {} products with no demand forecast: {:?}",
                outcome.missing_demand.len(),
                outcome.missing_demand
            );
        }
        if !outcome.missing_stock.is_empty() {
            warn!(
                "Dropped {} products with no stock entry: {:?}",
                outcome.missing_stock.len(),
                outcome.missing_stock
            );
        }
        info!(
            "Allocated {} products with the {} policy",
            outcome.decisions.len(),
            self.policy.name()
        );

        outcome
    }
}
