// src/model/records.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observed day of sales for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub product_id: String,
    pub date: NaiveDate,
    pub units_sold: u32,
    pub promotion: f64,
}

/// A sales record augmented with the engineered demand features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub product_id: String,
    pub date: NaiveDate,
    pub units_sold: u32,
    pub promotion: f64,

    // Trailing mean of units_sold, current row included
    pub rolling_avg_demand: f64,
    // units_sold of the previous row for the product, 0 on the first row
    pub lag_1_demand: f64,
}

impl FeatureRow {
    /// The regression inputs, in the order the demand model is trained on.
    pub fn feature_vector(&self) -> Vec<f64> {
        vec![self.rolling_avg_demand, self.lag_1_demand, self.promotion]
    }
}

/// Latest predicted demand for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub product_id: String,
    pub predicted_demand: f64,
}

/// A catalog entry. `current_stock` is absent when the catalog carries no
/// stock column; the simulator seeds those products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: String,
    #[serde(default)]
    pub current_stock: Option<u32>,
}

/// On-hand stock for a product at one point of the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockState {
    pub product_id: String,
    pub current_stock: u32,
}

impl StockState {
    pub fn new(product_id: impl Into<String>, current_stock: u32) -> Self {
        Self {
            product_id: product_id.into(),
            current_stock,
        }
    }
}
