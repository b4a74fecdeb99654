use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{DashboardError, Result};

/// A tradable asset as known to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Unique identifier, stable across refreshes
    pub id: String,

    /// Display name
    pub name: String,

    /// Ticker symbol
    pub symbol: String,

    /// Spot price in USD, never negative
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Signed 24h price change in percent
    #[serde(with = "rust_decimal::serde::float")]
    pub price_change_24h: Decimal,

    /// Market capitalisation in USD, never negative
    #[serde(with = "rust_decimal::serde::float")]
    pub market_cap: Decimal,

    /// 24h traded volume in USD, never negative
    #[serde(with = "rust_decimal::serde::float")]
    pub volume_24h: Decimal,

    pub image_url: String,

    /// User favourite flag
    pub is_tracked: bool,

    /// User suppression flag, overridable by the "show hidden" view toggle
    pub is_hidden: bool,

    #[serde(default)]
    pub social_links: SocialLinks,

    pub website: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
}

impl TokenRecord {
    /// Check the per-record invariants: non-empty id and non-negative market figures
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DashboardError::InvalidToken(format!(
                "token '{}' has an empty id",
                self.name
            )));
        }

        let figures = [
            ("price", self.price),
            ("marketCap", self.market_cap),
            ("volume24h", self.volume_24h),
        ];
        for (field, value) in figures {
            if value < Decimal::ZERO {
                return Err(DashboardError::InvalidToken(format!(
                    "token '{}' has negative {}: {}",
                    self.id, field, value
                )));
            }
        }

        Ok(())
    }
}

/// Validate every record and reject collections where two records share an id
pub fn ensure_unique_ids(tokens: &[TokenRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tokens.len());
    for token in tokens {
        token.validate()?;
        if !seen.insert(token.id.as_str()) {
            return Err(DashboardError::InvalidToken(format!(
                "duplicate token id: {}",
                token.id
            )));
        }
    }
    Ok(())
}
