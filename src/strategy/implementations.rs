// src/strategy/implementations.rs

use crate::model::decision::{Allocation, MarketingChannel};
use crate::strategy::traits::AllocationPolicy;
use serde::Deserialize;

/// Stock level at or below which promotion is suppressed.
pub const LOW_STOCK_THRESHOLD: u32 = 30;

// =========================================================================
// 1. Score-Based Policy
// =========================================================================

/// Blends demand and stock into one score and picks a tier from it.
///
/// Formula: Score = 0.6 * PredictedDemand + 0.4 * CurrentStock
///
/// Tiers are closed on their lower bound, so a score of exactly 80 lands in
/// the 80% tier. Low stock pauses promotion regardless of the score.
#[derive(Debug, Clone)]
pub struct ScoreBasedPolicy {
    low_stock_threshold: u32,
}

impl ScoreBasedPolicy {
    pub fn new() -> Self {
        Self::with_low_stock_threshold(LOW_STOCK_THRESHOLD)
    }

    pub fn with_low_stock_threshold(low_stock_threshold: u32) -> Self {
        Self {
            low_stock_threshold,
        }
    }

    pub fn score(current_stock: u32, predicted_demand: f64) -> f64 {
        // Integer weights keep exact tier boundaries exact in floating point
        (6.0 * predicted_demand + 4.0 * current_stock as f64) / 10.0
    }
}

impl Default for ScoreBasedPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocationPolicy for ScoreBasedPolicy {
    fn name(&self) -> &'static str {
        "score-based"
    }

    fn allocate(&self, current_stock: u32, predicted_demand: f64) -> Allocation {
        let score = Self::score(current_stock, predicted_demand);

        let (promotion_percentage, manpower_required, marketing_channels) =
            if current_stock <= self.low_stock_threshold {
                (0, 0, MarketingChannel::PauseAds)
            } else if score >= 80.0 {
                (80, 4, MarketingChannel::SocialMediaAndGoogleAds)
            } else if score >= 60.0 {
                (60, 3, MarketingChannel::SocialMedia)
            } else if score >= 40.0 {
                (40, 2, MarketingChannel::EmailMarketing)
            } else {
                (20, 1, MarketingChannel::BasicAds)
            };

        Allocation {
            promotion_percentage,
            manpower_required,
            marketing_channels,
        }
    }
}

// =========================================================================
// 2. Threshold-Matrix Policy
// =========================================================================

/// Picks a promotion level from a 2x2 matrix of (high demand?, high stock?),
/// then derives staffing and channels from the promotion level alone.
#[derive(Debug, Clone)]
pub struct ThresholdMatrixPolicy {
    low_stock_threshold: u32,
    high_demand: f64,
    high_stock: u32,
}

impl ThresholdMatrixPolicy {
    pub fn new() -> Self {
        Self::with_low_stock_threshold(LOW_STOCK_THRESHOLD)
    }

    pub fn with_low_stock_threshold(low_stock_threshold: u32) -> Self {
        Self {
            low_stock_threshold,
            high_demand: 60.0,
            high_stock: 100,
        }
    }

    pub fn promotion_percentage(&self, current_stock: u32, predicted_demand: f64) -> u8 {
        let high_demand = predicted_demand >= self.high_demand;
        let high_stock = current_stock >= self.high_stock;

        if current_stock <= self.low_stock_threshold {
            0
        } else {
            match (high_demand, high_stock) {
                (true, true) => 70,
                (true, false) => 40,
                (false, true) => 50,
                (false, false) => 20,
            }
        }
    }
}

impl Default for ThresholdMatrixPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Staffing band for a promotion level.
pub fn manpower_for_promotion(promotion_percentage: u8) -> u32 {
    match promotion_percentage {
        0 => 0,
        1..=25 => 1,
        26..=50 => 2,
        51..=70 => 3,
        _ => 4,
    }
}

/// Channel band for a promotion level.
pub fn channels_for_promotion(promotion_percentage: u8) -> MarketingChannel {
    match promotion_percentage {
        0 => MarketingChannel::NoPromotion,
        1..=25 => MarketingChannel::Email,
        26..=50 => MarketingChannel::EmailAndSocialMedia,
        51..=70 => MarketingChannel::SocialMediaAndOnlineAds,
        _ => MarketingChannel::OnlineAdsAndFieldMarketing,
    }
}

impl AllocationPolicy for ThresholdMatrixPolicy {
    fn name(&self) -> &'static str {
        "threshold-matrix"
    }

    fn allocate(&self, current_stock: u32, predicted_demand: f64) -> Allocation {
        let promotion_percentage = self.promotion_percentage(current_stock, predicted_demand);

        Allocation {
            promotion_percentage,
            manpower_required: manpower_for_promotion(promotion_percentage),
            marketing_channels: channels_for_promotion(promotion_percentage),
        }
    }
}

// =========================================================================
// Policy selection
// =========================================================================

/// Named allocation rule sets, selectable from configuration or the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    ScoreBased,
    ThresholdMatrix,
}

impl PolicyKind {
    pub fn build(self, low_stock_threshold: u32) -> Box<dyn AllocationPolicy> {
        match self {
            PolicyKind::ScoreBased => {
                Box::new(ScoreBasedPolicy::with_low_stock_threshold(low_stock_threshold))
            }
            PolicyKind::ThresholdMatrix => {
                Box::new(ThresholdMatrixPolicy::with_low_stock_threshold(low_stock_threshold))
            }
        }
    }
}
