// src/io/demand.rs

use crate::error::{PipelineError, Result};
use crate::model::records::{ProductRecord, SalesRecord};
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Normal};

/// Share of days a generated product runs a promotion.
const PROMOTION_RATE: f64 = 0.3;
/// Extra units a promotion day sells on average.
const PROMOTION_LIFT: f64 = 12.0;

/// Generates a daily sales history based on a Normal (Bell Curve) distribution.
///
/// Each product gets its own base level around `mean`, and promoted days sell
/// more. Samples are rounded and clamped at 0 since sales cannot be negative.
/// Fails when `std_dev` is negative or not finite.
///
/// # Arguments
/// * `products` - Product ids to generate a series for.
/// * `start` - Date of the first record.
/// * `days` - Length of each series.
/// * `mean` - The average units sold per day (e.g., 40.0).
/// * `std_dev` - Day-to-day volatility (e.g., 8.0).
pub fn generate_sales_history<R: Rng>(
    products: &[String],
    start: NaiveDate,
    days: usize,
    mean: f64,
    std_dev: f64,
    rng: &mut R,
) -> Result<Vec<SalesRecord>> {
    let bad = |e: rand_distr::NormalError| PipelineError::Config {
        reason: format!("invalid demand distribution: {}", e),
    };
    let noise = Normal::new(0.0, std_dev).map_err(bad)?;
    let base_spread = Normal::new(mean, std_dev).map_err(bad)?;
    let promoted = Bernoulli::new(PROMOTION_RATE).map_err(|e| PipelineError::Config {
        reason: format!("invalid promotion rate: {}", e),
    })?;

    let mut schedule = Vec::with_capacity(products.len() * days);

    for product_id in products {
        let base = base_spread.sample(rng).max(0.0);

        for day in 0..days {
            let promotion = if promoted.sample(rng) { 1.0 } else { 0.0 };
            let val = base + promotion * PROMOTION_LIFT + noise.sample(rng);

            let units_sold = if val.round() < 0.0 { 0 } else { val.round() as u32 };

            schedule.push(SalesRecord {
                product_id: product_id.clone(),
                date: start + Duration::days(day as i64),
                units_sold,
                promotion,
            });
        }
    }

    Ok(schedule)
}

/// Generates a catalog of `count` products named `P001`, `P002`, ...
///
/// With `with_stock` set, each product carries an initial stock drawn from
/// `[min_stock, max_stock)`; otherwise the stock column is left out and the
/// simulator seeds it.
pub fn generate_catalog<R: Rng>(
    count: usize,
    with_stock: bool,
    min_stock: u32,
    max_stock: u32,
    rng: &mut R,
) -> Vec<ProductRecord> {
    (1..=count)
        .map(|i| ProductRecord {
            product_id: format!("P{:03}", i),
            current_stock: if with_stock && max_stock > min_stock {
                Some(rng.gen_range(min_stock..max_stock))
            } else {
                None
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_history_covers_every_product_day() {
        let mut rng = StdRng::seed_from_u64(11);
        let products = vec!["A".to_string(), "B".to_string()];
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let history = generate_sales_history(&products, start, 10, 40.0, 8.0, &mut rng).unwrap();

        assert_eq!(history.len(), 20);
        assert_eq!(history[9].date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert!(history.iter().all(|r| r.promotion == 0.0 || r.promotion == 1.0));
    }

    #[test]
    fn test_negative_volatility_is_rejected() {
        let mut rng = StdRng::seed_from_u64(11);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let result = generate_sales_history(&["A".to_string()], start, 3, 40.0, -1.0, &mut rng);

        assert!(matches!(result, Err(PipelineError::Config { .. })));
    }

    #[test]
    fn test_catalog_stock_in_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let catalog = generate_catalog(20, true, 20, 150, &mut rng);

        assert_eq!(catalog[0].product_id, "P001");
        assert!(catalog
            .iter()
            .all(|p| matches!(p.current_stock, Some(s) if (20..150).contains(&s))));

        let bare = generate_catalog(3, false, 20, 150, &mut rng);
        assert!(bare.iter().all(|p| p.current_stock.is_none()));
    }
}
