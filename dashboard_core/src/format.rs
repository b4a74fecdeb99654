use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Up,
    Down,
}

/// 24h change prepared for display: magnitude text plus arrow direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceChange {
    pub direction: ChangeDirection,
    pub display: String,
}

fn fixed(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", decimals as usize, rounded)
}

/// Format a USD amount with a B/M/K suffix, e.g. `$2.45B`
pub fn format_compact_usd(value: Decimal, decimals: u32) -> String {
    let units = [
        (Decimal::from(1_000_000_000u64), "B"),
        (Decimal::from(1_000_000u64), "M"),
        (Decimal::from(1_000u64), "K"),
    ];

    for (scale, suffix) in units {
        if value >= scale {
            return format!("${}{}", fixed(value / scale, decimals), suffix);
        }
    }

    format!("${}", fixed(value, decimals))
}

/// Spot prices are always shown with four decimals
pub fn format_price(price: Decimal) -> String {
    format!("${}", fixed(price, 4))
}

pub fn format_change(change: Decimal) -> PriceChange {
    let direction = if change >= Decimal::ZERO {
        ChangeDirection::Up
    } else {
        ChangeDirection::Down
    };

    PriceChange {
        direction,
        display: format!("{}%", change.abs().normalize()),
    }
}
