// src/io/reporting.rs

use crate::error::Result;
use crate::model::decision::{AllocationDecision, MarketingChannel};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Aggregate view of a set of allocation decisions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AllocationSummary {
    pub total_products: usize,
    /// Mean promotion rounded to 2 decimals; `None` for an empty set.
    pub average_promotion: Option<f64>,
    pub total_manpower: u64,
    pub channel_distribution: BTreeMap<MarketingChannel, usize>,
}

impl AllocationSummary {
    /// Summarizes decisions. The result does not depend on input order.
    pub fn from_decisions<'a, I>(decisions: I) -> Self
    where
        I: IntoIterator<Item = &'a AllocationDecision>,
    {
        let mut summary = Self::default();
        let mut promotion_sum: u64 = 0;

        for decision in decisions {
            summary.total_products += 1;
            promotion_sum += decision.promotion_percentage as u64;
            summary.total_manpower += decision.manpower_required as u64;
            *summary
                .channel_distribution
                .entry(decision.marketing_channels)
                .or_insert(0) += 1;
        }

        if summary.total_products > 0 {
            let mean = promotion_sum as f64 / summary.total_products as f64;
            summary.average_promotion = Some((mean * 100.0).round() / 100.0);
        }
        summary
    }

    /// Summarizes only the decisions for `product_id`, or all of them for `None`.
    pub fn for_product(decisions: &[AllocationDecision], product_id: Option<&str>) -> Self {
        match product_id {
            Some(id) => Self::from_decisions(decisions.iter().filter(|d| d.product_id == id)),
            None => Self::from_decisions(decisions),
        }
    }
}

impl fmt::Display for AllocationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Products: {}", self.total_products)?;
        match self.average_promotion {
            Some(avg) => writeln!(f, "Average Promotion %: {:.2}%", avg)?,
            None => writeln!(f, "Average Promotion %: n/a")?,
        }
        writeln!(f, "Total Manpower Required: {}", self.total_manpower)?;
        writeln!(f, "Channel Distribution:")?;
        for (channel, count) in &self.channel_distribution {
            writeln!(f, "  {}: {}", channel, count)?;
        }
        Ok(())
    }
}

/// Serializes rows as CSV with a header row.
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes rows to a CSV file, replacing any previous content.
///
/// # Arguments
/// * `file_path` - The path to save the file (e.g., "data/inventory_status.csv").
/// * `rows` - Records to export, one CSV row each.
pub fn write_csv_file<T: Serialize>(file_path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut wtr = csv::Writer::from_path(file_path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    info!("Exported {} rows to {:?}", rows.len(), file_path);
    Ok(())
}
