// src/strategy/traits.rs

use crate::model::decision::Allocation;
use std::fmt::Debug;

/// Maps a product's inventory and demand state to a marketing allocation.
///
/// Implementations are pure: the same inputs always give the same allocation,
/// so products can be evaluated in any order or in parallel.
pub trait AllocationPolicy: Debug + Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Decides the allocation for one product.
    ///
    /// # Arguments
    /// * `current_stock` - On-hand units from the inventory snapshot.
    /// * `predicted_demand` - Latest model forecast for the product; may be any real value.
    fn allocate(&self, current_stock: u32, predicted_demand: f64) -> Allocation;
}
