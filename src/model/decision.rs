// src/model/decision.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outreach recommendation attached to an allocation.
///
/// The first five labels belong to the score-based policy, the rest to the
/// threshold-matrix policy. Serialized as the human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarketingChannel {
    #[serde(rename = "Pause Ads")]
    PauseAds,
    #[serde(rename = "Basic Ads")]
    BasicAds,
    #[serde(rename = "Email Marketing")]
    EmailMarketing,
    #[serde(rename = "Social Media")]
    SocialMedia,
    #[serde(rename = "Social Media + Google Ads")]
    SocialMediaAndGoogleAds,

    #[serde(rename = "NO PROMOTION")]
    NoPromotion,
    #[serde(rename = "Email")]
    Email,
    #[serde(rename = "Email, Social Media")]
    EmailAndSocialMedia,
    #[serde(rename = "Social Media, Online Ads")]
    SocialMediaAndOnlineAds,
    #[serde(rename = "Online Ads, Field Marketing")]
    OnlineAdsAndFieldMarketing,
}

impl MarketingChannel {
    pub fn label(&self) -> &'static str {
        match self {
            MarketingChannel::PauseAds => "Pause Ads",
            MarketingChannel::BasicAds => "Basic Ads",
            MarketingChannel::EmailMarketing => "Email Marketing",
            MarketingChannel::SocialMedia => "Social Media",
            MarketingChannel::SocialMediaAndGoogleAds => "Social Media + Google Ads",
            MarketingChannel::NoPromotion => "NO PROMOTION",
            MarketingChannel::Email => "Email",
            MarketingChannel::EmailAndSocialMedia => "Email, Social Media",
            MarketingChannel::SocialMediaAndOnlineAds => "Social Media, Online Ads",
            MarketingChannel::OnlineAdsAndFieldMarketing => "Online Ads, Field Marketing",
        }
    }
}

impl fmt::Display for MarketingChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The action a policy recommends for one (stock, demand) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub promotion_percentage: u8,
    pub manpower_required: u32,
    pub marketing_channels: MarketingChannel,
}

/// Final allocation row handed to reporting and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationDecision {
    pub product_id: String,
    pub current_stock: u32,
    pub predicted_demand: f64,
    pub promotion_percentage: u8,
    pub manpower_required: u32,
    pub marketing_channels: MarketingChannel,
}

impl AllocationDecision {
    pub fn new(
        product_id: impl Into<String>,
        current_stock: u32,
        predicted_demand: f64,
        allocation: Allocation,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            current_stock,
            predicted_demand,
            promotion_percentage: allocation.promotion_percentage,
            manpower_required: allocation.manpower_required,
            marketing_channels: allocation.marketing_channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_label() {
        assert_eq!(MarketingChannel::PauseAds.to_string(), "Pause Ads");
        assert_eq!(
            MarketingChannel::EmailAndSocialMedia.to_string(),
            "Email, Social Media"
        );
    }
}
