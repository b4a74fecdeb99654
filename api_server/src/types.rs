use account_core::Theme;
use chrono::{DateTime, Utc};
use dashboard_core::{
    format_change, format_compact_usd, format_price, PriceChange, SortField, TokenRecord,
    ViewState,
};
use persistence_layer::{StorageHealthStatus, Wallet};
use serde::{Deserialize, Serialize};

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Standard API success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub storage: StorageHealthStatus,
    pub tokens_refreshing: bool,
}

/// Token list query parameters. Anything omitted falls back to the configured default view.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListQuery {
    pub search: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub category: Option<String>,
    pub show_hidden: Option<bool>,
}

/// Display strings for one table row
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDisplay {
    pub price: String,
    pub price_change: PriceChange,
    pub market_cap: String,
    pub volume_24h: String,
}

#[derive(Debug, Serialize)]
pub struct TokenRow {
    #[serde(flatten)]
    pub token: TokenRecord,
    pub display: TokenDisplay,
}

impl From<TokenRecord> for TokenRow {
    fn from(token: TokenRecord) -> Self {
        let display = TokenDisplay {
            price: format_price(token.price),
            price_change: format_change(token.price_change_24h),
            market_cap: format_compact_usd(token.market_cap, 2),
            volume_24h: format_compact_usd(token.volume_24h, 2),
        };
        Self { token, display }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListResponse {
    pub tokens: Vec<TokenRow>,
    pub view: ViewState,
    pub visible_count: usize,
    pub total_count: usize,
    pub is_refreshing: bool,
}

/// Flags of a token after a toggle
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenFlagsResponse {
    pub id: String,
    pub is_tracked: bool,
    pub is_hidden: bool,
}

/// Header click: the current view plus the column that was clicked
#[derive(Debug, Deserialize)]
pub struct SortRequest {
    #[serde(default)]
    pub view: Option<ViewState>,
    pub field: SortField,
}

#[derive(Debug, Deserialize)]
pub struct AddWalletRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct WalletListResponse {
    pub wallets: Vec<Wallet>,
    pub active: Option<Wallet>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordStrengthRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Successful form validation
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

#[derive(Debug, Deserialize)]
pub struct CustomThresholdRequest {
    pub value: u32,
}
