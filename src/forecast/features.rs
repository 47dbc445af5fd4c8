// src/forecast/features.rs

use crate::model::records::{FeatureRow, SalesRecord};
use std::collections::VecDeque;

/// Trailing window used by the demand model.
pub const DEFAULT_ROLLING_WINDOW: usize = 3;

/// Sorts a sales history by (product_id, date).
///
/// The sort is stable, so duplicate (product_id, date) rows keep their input
/// order and the later one wins any per-date lookup.
pub fn sort_sales(records: &mut [SalesRecord]) {
    records.sort_by(|a, b| {
        a.product_id
            .cmp(&b.product_id)
            .then_with(|| a.date.cmp(&b.date))
    });
}

/// Derives the rolling-average and lag-1 demand features for every record.
///
/// Rows are grouped per product in (product_id, date) order. At the start of a
/// product's series the rolling window shrinks to the rows available, and the
/// lag of the first row is 0.
pub fn build_features(records: &[SalesRecord], window: usize) -> Vec<FeatureRow> {
    let window = window.max(1);

    let mut sorted = records.to_vec();
    sort_sales(&mut sorted);

    let mut rows = Vec::with_capacity(sorted.len());
    let mut trailing: VecDeque<u32> = VecDeque::with_capacity(window);
    let mut trailing_sum: u64 = 0;
    let mut current_product: Option<&str> = None;

    for record in &sorted {
        if current_product != Some(record.product_id.as_str()) {
            trailing.clear();
            trailing_sum = 0;
            current_product = Some(record.product_id.as_str());
        }

        let lag_1_demand = trailing.back().copied().unwrap_or(0) as f64;

        if trailing.len() == window {
            if let Some(oldest) = trailing.pop_front() {
                trailing_sum -= oldest as u64;
            }
        }
        trailing.push_back(record.units_sold);
        trailing_sum += record.units_sold as u64;

        let rolling_avg_demand = trailing_sum as f64 / trailing.len() as f64;

        rows.push(FeatureRow {
            product_id: record.product_id.clone(),
            date: record.date,
            units_sold: record.units_sold,
            promotion: record.promotion,
            rolling_avg_demand,
            lag_1_demand,
        });
    }

    rows
}
