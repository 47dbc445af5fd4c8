// src/io/tables.rs

//! CSV readers for the pipeline's input tables.
//!
//! Every reader takes a header row and trims whitespace around fields. A row
//! that fails to parse is reported as `InvalidInput` with its file line number
//! (the header is line 1).

use crate::error::{PipelineError, Result};
use crate::forecast::features::sort_sales;
use crate::model::records::{ForecastResult, ProductRecord, SalesRecord, StockState};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

const STOCK_COLUMN: &str = "current_stock";

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn read_table<T: DeserializeOwned, R: Read>(table: &'static str, reader: R) -> Result<Vec<T>> {
    let mut rdr = csv_reader(reader);
    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize().enumerate() {
        let row: T =
            result.map_err(|e| PipelineError::invalid(table, idx as u64 + 2, e.to_string()))?;
        rows.push(row);
    }
    Ok(rows)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(PipelineError::from)
}

/// Reads a product catalog. The `current_stock` column is optional; when it
/// is present every row must carry a value.
pub fn read_products<R: Read>(reader: R) -> Result<Vec<ProductRecord>> {
    let mut rdr = csv_reader(reader);
    let has_stock = rdr.headers()?.iter().any(|h| h == STOCK_COLUMN);

    let mut products = Vec::new();
    for (idx, result) in rdr.deserialize().enumerate() {
        let line = idx as u64 + 2;
        let product: ProductRecord =
            result.map_err(|e| PipelineError::invalid("product catalog", line, e.to_string()))?;
        if has_stock && product.current_stock.is_none() {
            return Err(PipelineError::invalid(
                "product catalog",
                line,
                format!("missing {} for product {}", STOCK_COLUMN, product.product_id),
            ));
        }
        products.push(product);
    }
    Ok(products)
}

/// Reads a sales history and returns it sorted by (product_id, date).
pub fn read_sales<R: Read>(reader: R) -> Result<Vec<SalesRecord>> {
    let mut sales: Vec<SalesRecord> = read_table("sales history", reader)?;
    for (idx, record) in sales.iter().enumerate() {
        if !record.promotion.is_finite() {
            return Err(PipelineError::invalid(
                "sales history",
                idx as u64 + 2,
                "promotion must be a finite number",
            ));
        }
    }
    sort_sales(&mut sales);
    Ok(sales)
}

pub fn read_inventory_snapshot<R: Read>(reader: R) -> Result<Vec<StockState>> {
    read_table("inventory snapshot", reader)
}

pub fn read_demand_predictions<R: Read>(reader: R) -> Result<Vec<ForecastResult>> {
    let demand: Vec<ForecastResult> = read_table("demand prediction", reader)?;
    for (idx, prediction) in demand.iter().enumerate() {
        if !prediction.predicted_demand.is_finite() {
            return Err(PipelineError::invalid(
                "demand prediction",
                idx as u64 + 2,
                format!(
                    "predicted_demand for {} must be a finite number",
                    prediction.product_id
                ),
            ));
        }
    }
    Ok(demand)
}

pub fn load_products(path: &Path) -> Result<Vec<ProductRecord>> {
    let products = read_products(open(path)?)?;
    info!("Loaded {} products from {:?}", products.len(), path);
    Ok(products)
}

pub fn load_sales(path: &Path) -> Result<Vec<SalesRecord>> {
    let sales = read_sales(open(path)?)?;
    info!("Loaded {} sales records from {:?}", sales.len(), path);
    Ok(sales)
}

pub fn load_inventory_snapshot(path: &Path) -> Result<Vec<StockState>> {
    let stock = read_inventory_snapshot(open(path)?)?;
    info!("Loaded stock for {} products from {:?}", stock.len(), path);
    Ok(stock)
}

pub fn load_demand_predictions(path: &Path) -> Result<Vec<ForecastResult>> {
    let demand = read_demand_predictions(open(path)?)?;
    info!("Loaded {} demand predictions from {:?}", demand.len(), path);
    Ok(demand)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_without_stock_column() {
        let csv = "product_id,category\nP1,shoes\nP2,hats\n";
        let products = read_products(csv.as_bytes()).unwrap();

        assert_eq!(products.len(), 2);
        assert!(products.iter().all(|p| p.current_stock.is_none()));
    }

    #[test]
    fn test_catalog_with_stock_column() {
        let csv = "product_id,current_stock\nP1, 40\nP2,120\n";
        let products = read_products(csv.as_bytes()).unwrap();

        assert_eq!(products[0].current_stock, Some(40));
        assert_eq!(products[1].current_stock, Some(120));
    }

    #[test]
    fn test_catalog_stock_column_with_blank_cell_is_invalid() {
        let csv = "product_id,current_stock\nP1,40\nP2,\n";
        let err = read_products(csv.as_bytes()).unwrap_err();

        assert!(matches!(err, PipelineError::InvalidInput { line: 3, .. }));
    }

    #[test]
    fn test_sales_are_sorted_on_read() {
        let csv = "product_id,date,units_sold,promotion\n\
                   B,2024-01-02,5,0\n\
                   A,2024-01-02,7,1\n\
                   A,2024-01-01,3,0\n";
        let sales = read_sales(csv.as_bytes()).unwrap();

        let order: Vec<(&str, u32)> = sales
            .iter()
            .map(|s| (s.product_id.as_str(), s.units_sold))
            .collect();
        assert_eq!(order, vec![("A", 3), ("A", 7), ("B", 5)]);
    }

    #[test]
    fn test_non_numeric_units_sold_is_invalid() {
        let csv = "product_id,date,units_sold,promotion\nA,2024-01-01,lots,0\n";
        let err = read_sales(csv.as_bytes()).unwrap_err();

        match err {
            PipelineError::InvalidInput { table, line, .. } => {
                assert_eq!(table, "sales history");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_stock_is_invalid() {
        let csv = "product_id,current_stock\nP1,-4\n";
        assert!(read_inventory_snapshot(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_reads_demand_predictions() {
        let csv = "product_id,predicted_demand\nP1,61.25\nP2,-3.5\n";
        let demand = read_demand_predictions(csv.as_bytes()).unwrap();

        assert_eq!(demand[0].predicted_demand, 61.25);
        assert_eq!(demand[1].predicted_demand, -3.5);
    }

    #[test]
    fn test_non_finite_demand_prediction_is_invalid() {
        let nan = "product_id,predicted_demand\nA,12\nB,NaN\n";
        let err = read_demand_predictions(nan.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidInput { table: "demand prediction", line: 3, .. }
        ));

        let inf = "product_id,predicted_demand\nA,inf\n";
        let err = read_demand_predictions(inf.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { line: 2, .. }));
    }
}
