// src/forecast/regression.rs

use crate::error::{PipelineError, Result};
use crate::forecast::config::ForecastConfig;
use crate::forecast::features::build_features;
use crate::model::records::{FeatureRow, ForecastResult, SalesRecord};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Held-out error of a fitted demand model. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl ErrorMetrics {
    fn from_predictions(predicted: &[f64], actual: &[f64], train_rows: usize) -> Self {
        let n = predicted.len().max(1) as f64;
        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        for (p, a) in predicted.iter().zip(actual) {
            let err = p - a;
            abs_sum += err.abs();
            sq_sum += err * err;
        }

        Self {
            mae: abs_sum / n,
            rmse: (sq_sum / n).sqrt(),
            train_rows,
            test_rows: predicted.len(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.mae.is_finite() && self.rmse.is_finite()
    }
}

/// Ordinary least squares over the fixed demand feature set.
pub struct DemandModel {
    model: LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl std::fmt::Debug for DemandModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemandModel").finish_non_exhaustive()
    }
}

impl DemandModel {
    /// Fits the model on a seeded 80/20 split and reports held-out error.
    ///
    /// The fitted model is always accepted; the metrics do not gate it.
    pub fn train(
        features: &[FeatureRow],
        config: &ForecastConfig,
    ) -> Result<(Self, ErrorMetrics)> {
        let n = features.len();
        let test_rows = ((n as f64) * config.test_fraction.clamp(0.0, 1.0)).ceil() as usize;
        let train_rows = n.saturating_sub(test_rows);

        if test_rows == 0 {
            return Err(PipelineError::fit(format!(
                "{} feature rows leave no held-out rows",
                n
            )));
        }
        if train_rows == 0 {
            return Err(PipelineError::fit(format!(
                "{} feature rows leave no training rows",
                n
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(config.split_seed);
        indices.shuffle(&mut rng);
        let (test_idx, train_idx) = indices.split_at(test_rows);

        let (x_train, y_train) = design(features, train_idx);
        let (x_test, y_test) = design(features, test_idx);

        // Constant target: report the held-out error of predicting that constant.
        let first = y_train[0];
        if y_train.iter().all(|&y| y == first) {
            let baseline = vec![first; y_test.len()];
            return Err(PipelineError::ModelFitFailure {
                reason: "units_sold has zero variance in the training split".to_string(),
                metrics: Some(ErrorMetrics::from_predictions(&baseline, &y_test, train_rows)),
            });
        }

        let x_train_m = DenseMatrix::from_2d_vec(&x_train)
            .map_err(|e| PipelineError::fit(format!("matrix error: {}", e)))?;
        let params = LinearRegressionParameters::default();
        let model = LinearRegression::fit(&x_train_m, &y_train, params)
            .map_err(|e| PipelineError::fit(format!("solver error: {}", e)))?;
        let model = Self { model };

        let predicted = model.predict_matrix(&x_test)?;
        let metrics = ErrorMetrics::from_predictions(&predicted, &y_test, train_rows);

        if !metrics.is_finite() {
            return Err(PipelineError::ModelFitFailure {
                reason: "fitted model produces non-finite predictions".to_string(),
                metrics: Some(metrics),
            });
        }

        info!(
            "Demand model trained on {} rows, held out {}: MAE {:.2}, RMSE {:.2}",
            metrics.train_rows, metrics.test_rows, metrics.mae, metrics.rmse
        );
        Ok((model, metrics))
    }

    /// Scores every feature row, in input order.
    pub fn predict(&self, features: &[FeatureRow]) -> Result<Vec<f64>> {
        if features.is_empty() {
            return Ok(Vec::new());
        }
        let x: Vec<Vec<f64>> = features.iter().map(FeatureRow::feature_vector).collect();
        self.predict_matrix(&x)
    }

    #[allow(clippy::ptr_arg)]
    fn predict_matrix(&self, x: &Vec<Vec<f64>>) -> Result<Vec<f64>> {
        let matrix = DenseMatrix::from_2d_vec(x)
            .map_err(|e| PipelineError::fit(format!("matrix error: {}", e)))?;
        self.model
            .predict(&matrix)
            .map_err(|e| PipelineError::fit(format!("prediction failed: {}", e)))
    }
}

fn design(features: &[FeatureRow], idx: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
    let x = idx.iter().map(|&i| features[i].feature_vector()).collect();
    let y = idx.iter().map(|&i| features[i].units_sold as f64).collect();
    (x, y)
}

/// Picks, per product, the prediction attached to its most recent date.
///
/// `predictions` must line up with `features`. When a product has several
/// rows on its latest date the last one in row order wins.
pub fn latest_predictions(features: &[FeatureRow], predictions: &[f64]) -> Vec<ForecastResult> {
    let mut latest: BTreeMap<&str, (NaiveDate, f64)> = BTreeMap::new();

    for (row, &predicted) in features.iter().zip(predictions) {
        match latest.get(row.product_id.as_str()) {
            Some((date, _)) if *date > row.date => {}
            _ => {
                latest.insert(row.product_id.as_str(), (row.date, predicted));
            }
        }
    }

    latest
        .into_iter()
        .map(|(product_id, (_, predicted_demand))| ForecastResult {
            product_id: product_id.to_string(),
            predicted_demand,
        })
        .collect()
}

/// Output of one forecasting run.
#[derive(Debug, Clone)]
pub struct DemandForecast {
    pub predictions: Vec<ForecastResult>,
    pub metrics: ErrorMetrics,
}

/// Features, one fit, full scoring, then the latest prediction per product.
pub fn forecast_demand(sales: &[SalesRecord], config: &ForecastConfig) -> Result<DemandForecast> {
    let features = build_features(sales, config.rolling_window);
    debug!("Built {} feature rows", features.len());

    let (model, metrics) = DemandModel::train(&features, config)?;
    let scored = model.predict(&features)?;
    let predictions = latest_predictions(&features, &scored);

    info!("Forecast ready for {} products", predictions.len());
    Ok(DemandForecast {
        predictions,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::demand::generate_sales_history;

    fn row(product: &str, day: u32, units: u32, rolling: f64, lag: f64) -> FeatureRow {
        FeatureRow {
            product_id: product.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            units_sold: units,
            promotion: 0.0,
            rolling_avg_demand: rolling,
            lag_1_demand: lag,
        }
    }

    fn sample_history() -> Vec<SalesRecord> {
        let mut rng = StdRng::seed_from_u64(7);
        let products: Vec<String> = (1..=4).map(|i| format!("P{}", i)).collect();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        generate_sales_history(&products, start, 30, 40.0, 8.0, &mut rng).unwrap()
    }

    #[test]
    fn test_train_reports_finite_metrics() {
        let features = build_features(&sample_history(), 3);
        let (_, metrics) = DemandModel::train(&features, &ForecastConfig::default()).unwrap();

        assert!(metrics.is_finite());
        assert_eq!(metrics.train_rows + metrics.test_rows, features.len());
        assert_eq!(metrics.test_rows, 24); // ceil(120 * 0.2)
        assert!(metrics.rmse >= metrics.mae);
    }

    #[test]
    fn test_split_is_deterministic() {
        let features = build_features(&sample_history(), 3);
        let (_, a) = DemandModel::train(&features, &ForecastConfig::default()).unwrap();
        let (_, b) = DemandModel::train(&features, &ForecastConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_variance_target_fails() {
        let features: Vec<FeatureRow> = (1..=10).map(|d| row("A", d, 5, 5.0, 5.0)).collect();
        let err = DemandModel::train(&features, &ForecastConfig::default()).unwrap_err();

        match err {
            PipelineError::ModelFitFailure { metrics, .. } => {
                let metrics = metrics.expect("zero-variance failure carries metrics");
                assert_eq!(metrics.train_rows, 8);
                assert_eq!(metrics.test_rows, 2);
                assert_eq!(metrics.mae, 0.0);
                assert_eq!(metrics.rmse, 0.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_constant_history_forecast_reports_metrics() {
        let sales: Vec<SalesRecord> = (1..=30)
            .flat_map(|d| {
                ["A", "B"].into_iter().map(move |p| SalesRecord {
                    product_id: p.to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                    units_sold: 10,
                    promotion: 0.0,
                })
            })
            .collect();

        let err = forecast_demand(&sales, &ForecastConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ModelFitFailure { metrics: Some(_), .. }
        ));
    }

    #[test]
    fn test_no_training_rows_fails() {
        let features = vec![row("A", 1, 5, 5.0, 0.0)];
        let err = DemandModel::train(&features, &ForecastConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::ModelFitFailure { metrics: None, .. }));
    }

    #[test]
    fn test_latest_prediction_per_product() {
        let features = vec![
            row("A", 1, 5, 5.0, 0.0),
            row("A", 2, 7, 6.0, 5.0),
            row("B", 1, 9, 9.0, 0.0),
            row("B", 1, 11, 10.0, 9.0),
        ];
        let latest = latest_predictions(&features, &[1.0, 2.0, 3.0, 4.0]);

        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].product_id, "A");
        assert_eq!(latest[0].predicted_demand, 2.0);
        // Same-date duplicate: last in row order wins
        assert_eq!(latest[1].predicted_demand, 4.0);
    }

    #[test]
    fn test_single_record_product_still_forecast() {
        let mut sales = sample_history();
        sales.push(SalesRecord {
            product_id: "LONELY".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            units_sold: 33,
            promotion: 1.0,
        });

        let forecast = forecast_demand(&sales, &ForecastConfig::default()).unwrap();
        let lonely = forecast
            .predictions
            .iter()
            .find(|p| p.product_id == "LONELY")
            .unwrap();

        assert!(lonely.predicted_demand.is_finite());
        assert_eq!(forecast.predictions.len(), 5);
    }
}
