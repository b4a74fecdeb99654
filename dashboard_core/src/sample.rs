//! Fixed sample data the dashboard is seeded with until a live source is wired in.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::token::{SocialLinks, TokenRecord};
use crate::transactions::{Transaction, TransactionKind, TransactionStatus};

const HBAR_IMAGE: &str =
    "https://images.unsplash.com/photo-1622630998477-20aa696ecb05?w=128&h=128&fit=crop";
const STABLE_IMAGE: &str =
    "https://images.unsplash.com/photo-1621416894569-0f39ed31d247?w=128&h=128&fit=crop";

#[allow(clippy::too_many_arguments)]
fn sample_token(
    id: &str,
    name: &str,
    symbol: &str,
    price: Decimal,
    price_change_24h: Decimal,
    market_cap: Decimal,
    volume_24h: Decimal,
    image_url: &str,
    social_links: SocialLinks,
    website: &str,
) -> TokenRecord {
    TokenRecord {
        id: id.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        price,
        price_change_24h,
        market_cap,
        volume_24h,
        image_url: image_url.to_string(),
        is_tracked: false,
        is_hidden: false,
        social_links,
        website: website.to_string(),
    }
}

fn links(twitter: Option<&str>, telegram: Option<&str>, discord: Option<&str>) -> SocialLinks {
    SocialLinks {
        twitter: twitter.map(str::to_string),
        telegram: telegram.map(str::to_string),
        discord: discord.map(str::to_string),
    }
}

pub fn sample_tokens() -> Vec<TokenRecord> {
    let hbar = sample_token(
        "hbar",
        "Hedera",
        "HBAR",
        dec!(0.0721),
        dec!(5.2),
        dec!(2450000000),
        dec!(45000000),
        HBAR_IMAGE,
        links(
            Some("https://twitter.com/hedera"),
            Some("https://t.me/hederahashgraph"),
            Some("https://discord.com/invite/hedera"),
        ),
        "https://hedera.com",
    );

    let mut usdc = sample_token(
        "usdc",
        "USD Coin",
        "USDC",
        dec!(1.00),
        dec!(-0.1),
        dec!(45000000000),
        dec!(2100000000),
        STABLE_IMAGE,
        links(
            Some("https://twitter.com/circle"),
            None,
            Some("https://discord.com/invite/circle"),
        ),
        "https://www.circle.com/usdc",
    );
    usdc.is_tracked = true;

    let sauce = sample_token(
        "sauce",
        "SaucerSwap",
        "SAUCE",
        dec!(0.0154),
        dec!(8.7),
        dec!(14800000),
        dec!(1250000),
        HBAR_IMAGE,
        links(Some("https://twitter.com/SaucerSwapLabs"), None, None),
        "https://www.saucerswap.finance",
    );

    let mut hst = sample_token(
        "hst",
        "HeadStarter",
        "HST",
        dec!(0.0112),
        dec!(-3.4),
        dec!(2100000),
        dec!(86000),
        HBAR_IMAGE,
        links(Some("https://twitter.com/HeadStarterHQ"), Some("https://t.me/headstarter"), None),
        "https://headstarter.org",
    );
    hst.is_hidden = true;

    let pack = sample_token(
        "pack",
        "HashPack",
        "PACK",
        dec!(0.0276),
        dec!(1.9),
        dec!(9400000),
        dec!(310000),
        HBAR_IMAGE,
        links(Some("https://twitter.com/HashPackWallet"), None, None),
        "https://www.hashpack.app",
    );

    vec![hbar, usdc, sauce, hst, pack]
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

pub fn sample_transactions() -> Vec<Transaction> {
    vec![
        Transaction {
            id: "tx-001".to_string(),
            kind: TransactionKind::Send,
            amount: dec!(150.00),
            token: "HBAR".to_string(),
            to: "0.0.847264".to_string(),
            from: "0.0.123456".to_string(),
            timestamp: at(2024, 1, 15, 14, 30),
            status: TransactionStatus::Success,
            memo: "Payment for services".to_string(),
        },
        Transaction {
            id: "tx-002".to_string(),
            kind: TransactionKind::Receive,
            amount: dec!(500.00),
            token: "HBAR".to_string(),
            to: "0.0.123456".to_string(),
            from: "0.0.956732".to_string(),
            timestamp: at(2024, 1, 14, 9, 15),
            status: TransactionStatus::Success,
            memo: "Monthly revenue".to_string(),
        },
        Transaction {
            id: "tx-003".to_string(),
            kind: TransactionKind::Send,
            amount: dec!(75.50),
            token: "HBAR".to_string(),
            to: "0.0.384756".to_string(),
            from: "0.0.123456".to_string(),
            timestamp: at(2024, 1, 13, 18, 45),
            status: TransactionStatus::Success,
            memo: "Subscription renewal".to_string(),
        },
    ]
}
