// src/error.rs

use crate::forecast::regression::ErrorMetrics;
use thiserror::Error;

/// Errors surfaced by the forecasting and allocation pipeline.
///
/// Missing join keys and short sales histories are not errors: the allocation
/// join drops unmatched products and the feature builder shrinks its window.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid {table} input at line {line}: {reason}")]
    InvalidInput {
        table: &'static str,
        line: u64,
        reason: String,
    },

    #[error("Demand model fit failed: {reason}")]
    ModelFitFailure {
        reason: String,
        metrics: Option<ErrorMetrics>,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn invalid(table: &'static str, line: u64, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            table,
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn fit(reason: impl Into<String>) -> Self {
        Self::ModelFitFailure {
            reason: reason.into(),
            metrics: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
