use account_core::{AcceptAllBackend, AccountError, AccountService, AuthStore, FormError, PreferencesStore};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use config_manager::{ConfigManager, ConfigurationError, DashboardConfig};
use dashboard_core::{sample, DashboardError, SampleTokenSource, TokenBook, Transaction, ViewState};
use persistence_layer::{
    store_from_config, ActivityLog, KeyValueStore, PersistenceError, WalletError, WalletStore,
};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod handlers;
mod types;

use handlers::*;
use types::*;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: DashboardConfig,
    pub default_view: ViewState,
    pub tokens: Arc<TokenBook>,
    pub transactions: Arc<Vec<Transaction>>,
    pub wallets: Arc<WalletStore>,
    pub activity: Arc<ActivityLog>,
    pub accounts: AccountService,
    pub preferences: Arc<PreferencesStore>,
    pub storage: Arc<dyn KeyValueStore>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire every store from configuration
    pub async fn build(config: DashboardConfig) -> Result<Self, ApiError> {
        config.validate()?;

        let storage = store_from_config(&config.storage).await?;
        let default_view = ViewState::from_config(&config.tokens)?;

        let source = Arc::new(SampleTokenSource::from_config(&config.tokens));
        let tokens = Arc::new(TokenBook::with_sample_data(source)?);

        let activity = Arc::new(ActivityLog::with_sample_data());
        let wallets = Arc::new(
            WalletStore::load(storage.clone(), &config.storage.wallet_key)
                .await?
                .with_activity_log(activity.clone()),
        );
        let preferences =
            Arc::new(PreferencesStore::load(storage.clone(), &config.storage.preferences_key).await?);

        let accounts = AccountService::new(
            Arc::new(AuthStore::new()),
            Arc::new(AcceptAllBackend::from_config(&config.auth)),
        );

        Ok(Self {
            config,
            default_view,
            tokens,
            transactions: Arc::new(sample::sample_transactions()),
            wallets,
            activity,
            accounts,
            preferences,
            storage,
            started_at: Instant::now(),
        })
    }
}

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error("Storage error: {0}")]
    Storage(#[from] PersistenceError),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Dashboard(DashboardError::InvalidViewParameter(_)) => StatusCode::BAD_REQUEST,
            ApiError::Dashboard(DashboardError::Refresh(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Dashboard(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Wallet(WalletError::InvalidAddress) => StatusCode::BAD_REQUEST,
            ApiError::Wallet(WalletError::AlreadyConnected) => StatusCode::CONFLICT,
            ApiError::Wallet(WalletError::Persistence(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Form(FormError::SignInFailed) => StatusCode::UNAUTHORIZED,
            ApiError::Form(_) => StatusCode::BAD_REQUEST,
            ApiError::Account(AccountError::Form(_)) => StatusCode::BAD_REQUEST,
            ApiError::Account(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Config(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            timestamp: chrono::Utc::now(),
        });

        (status, body).into_response()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,api_server=debug".into()),
        )
        .init();

    info!("Starting Ledger Dashboard API Server...");

    // Load configuration
    let config = ConfigManager::new()?.config().clone();
    info!("Configuration loaded successfully (storage backend: {})", config.storage.backend);

    let app_state = AppState::build(config.clone()).await?;
    info!("Stores initialized");

    let app = create_router(app_state).await;

    info!("🎯 API Server ready");
    info!("📋 Available endpoints:");
    info!("   • GET  /api/tokens - Filtered, sorted token list");
    info!("   • POST /api/tokens/:id/track | /api/tokens/:id/hide - Toggle user flags");
    info!("   • POST /api/tokens/refresh - Reload market data");
    info!("   • POST /api/view/sort - Apply a column header click");
    info!("   • GET  /api/wallets - Connected wallets");
    info!("   • GET  /api/activity - Account activity log");
    info!("   • GET  /api/transactions/export.csv - Transaction history as CSV");
    info!("   • GET  /health - Health check");

    // Bind and serve
    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the main application router
async fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/api/config", get(get_config))

        // Token view
        .route("/api/tokens", get(list_tokens))
        .route("/api/tokens/refresh", post(refresh_tokens))
        .route("/api/tokens/:id", get(get_token))
        .route("/api/tokens/:id/track", post(toggle_token_tracked))
        .route("/api/tokens/:id/hide", post(toggle_token_hidden))
        .route("/api/view/sort", post(sort_view))

        // Wallets
        .route("/api/wallets", get(list_wallets).post(add_wallet))
        .route("/api/wallets/active", get(get_active_wallet))
        .route("/api/wallets/:address", delete(remove_wallet))
        .route("/api/wallets/:address/activate", post(activate_wallet))
        .route("/api/wallets/:address/deactivate", post(deactivate_wallet))
        .route("/api/activity", get(list_activity))

        // Authentication
        .route("/api/auth/login", post(sign_in))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(sign_out))
        .route("/api/auth/status", get(auth_status))

        // Transactions
        .route("/api/transactions", get(list_transactions))
        .route("/api/transactions/export.csv", get(export_transactions_csv))

        // Account settings
        .route("/api/account/password/validate", post(check_password_change))
        .route("/api/account/password/strength", post(password_strength))
        .route("/api/account/email/validate", post(check_email))
        .route("/api/account/profile/validate", post(check_profile))

        // Preferences
        .route("/api/preferences", get(get_preferences).put(save_preferences))
        .route("/api/preferences/theme", put(set_theme))
        .route("/api/preferences/custom-threshold", put(set_custom_threshold))
        .route("/api/preferences/thresholds/:key/toggle", post(toggle_threshold))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state)
}
