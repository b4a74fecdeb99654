use crate::types::*;
use crate::{ApiError, AppState};
use account_core::{evaluate_password, validate_email, validate_password_change, validate_profile, Preferences, ProfileUpdate};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use dashboard_core::{export_csv, export_filename, filter_transactions, update_sort, ViewState};
use tracing::{debug, info};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage = state.storage.health_check().await;
    let status = if storage.connected { "healthy" } else { "degraded" };

    Json(SuccessResponse::new(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        storage,
        tokens_refreshing: state.tokens.is_refreshing(),
    }))
}

/// Get current configuration
pub async fn get_config(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(SuccessResponse::new(state.config.to_json_value())))
}

// =====================================
// Tokens
// =====================================

fn view_from_query(state: &AppState, query: TokenListQuery) -> Result<ViewState, ApiError> {
    let mut view = state.default_view.clone();

    if let Some(search) = query.search {
        view.search_text = search;
    }
    if let Some(field) = query.sort_field {
        view.sort_field = field.parse()?;
    }
    if let Some(order) = query.sort_order {
        view.sort_order = order.parse()?;
    }
    if let Some(category) = query.category {
        view.category_filter = category.parse()?;
    }
    if let Some(show_hidden) = query.show_hidden {
        view.show_hidden = show_hidden;
    }

    Ok(view)
}

/// List tokens through the view-model engine
pub async fn list_tokens(
    State(state): State<AppState>,
    Query(query): Query<TokenListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let view = view_from_query(&state, query)?;
    let (total_count, visible) = state.tokens.visible_with_total(&view).await;
    let tokens: Vec<TokenRow> = visible.into_iter().map(TokenRow::from).collect();

    Ok(Json(SuccessResponse::new(TokenListResponse {
        visible_count: tokens.len(),
        tokens,
        view,
        total_count,
        is_refreshing: state.tokens.is_refreshing(),
    })))
}

pub async fn get_token(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .tokens
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Token {} not found", id)))?;

    Ok(Json(SuccessResponse::new(TokenRow::from(token))))
}

async fn token_flags(state: &AppState, id: &str) -> Result<TokenFlagsResponse, ApiError> {
    let token = state
        .tokens
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Token {} not found", id)))?;

    Ok(TokenFlagsResponse {
        id: token.id,
        is_tracked: token.is_tracked,
        is_hidden: token.is_hidden,
    })
}

/// Flip the tracked flag of a token
pub async fn toggle_token_tracked(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.tokens.toggle_tracked(&id).await {
        return Err(ApiError::NotFound(format!("Token {} not found", id)));
    }
    Ok(Json(SuccessResponse::new(token_flags(&state, &id).await?)))
}

/// Flip the hidden flag of a token
pub async fn toggle_token_hidden(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.tokens.toggle_hidden(&id).await {
        return Err(ApiError::NotFound(format!("Token {} not found", id)));
    }
    Ok(Json(SuccessResponse::new(token_flags(&state, &id).await?)))
}

/// Reload market data; user flags survive the reload
pub async fn refresh_tokens(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    info!("🔄 Token refresh requested");
    let outcome = state.tokens.refresh().await?;
    Ok(Json(SuccessResponse::new(outcome)))
}

/// Apply a column header click to a view
pub async fn sort_view(
    State(state): State<AppState>,
    Json(request): Json<SortRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let current = request.view.unwrap_or_else(|| state.default_view.clone());
    let next = update_sort(&current, request.field);
    debug!(
        "Sort {} {:?} -> {} {:?}",
        current.sort_field, current.sort_order, next.sort_field, next.sort_order
    );
    Ok(Json(SuccessResponse::new(next)))
}

// =====================================
// Wallets
// =====================================

async fn wallet_list(state: &AppState) -> WalletListResponse {
    WalletListResponse {
        wallets: state.wallets.wallets().await,
        active: state.wallets.get_active_wallet().await,
    }
}

pub async fn list_wallets(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(SuccessResponse::new(wallet_list(&state).await)))
}

pub async fn add_wallet(
    State(state): State<AppState>,
    Json(request): Json<AddWalletRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let wallet = state.wallets.add_wallet(&request.address).await?;
    Ok(Json(SuccessResponse::new(wallet)))
}

pub async fn remove_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.wallets.remove_wallet(&address).await?;
    Ok(Json(SuccessResponse::new(wallet_list(&state).await)))
}

pub async fn activate_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.wallets.activate_wallet(&address).await?;
    Ok(Json(SuccessResponse::new(wallet_list(&state).await)))
}

pub async fn deactivate_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.wallets.deactivate_wallet(&address).await?;
    Ok(Json(SuccessResponse::new(wallet_list(&state).await)))
}

pub async fn get_active_wallet(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(SuccessResponse::new(state.wallets.get_active_wallet().await)))
}

/// Account activity, newest first
pub async fn list_activity(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(SuccessResponse::new(state.activity.entries().await)))
}

// =====================================
// Authentication
// =====================================

pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.accounts.sign_in(&request.email, &request.password).await?;
    Ok(Json(SuccessResponse::new(AuthStatusResponse {
        authenticated: state.accounts.auth().is_authenticated(),
    })))
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .accounts
        .register(&request.email, &request.password, &request.confirm_password)
        .await?;
    Ok(Json(SuccessResponse::new(AuthStatusResponse {
        authenticated: state.accounts.auth().is_authenticated(),
    })))
}

pub async fn sign_out(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.accounts.sign_out();
    Ok(Json(SuccessResponse::new(AuthStatusResponse {
        authenticated: false,
    })))
}

pub async fn auth_status(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(SuccessResponse::new(AuthStatusResponse {
        authenticated: state.accounts.auth().is_authenticated(),
    })))
}

// =====================================
// Transactions
// =====================================

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let search = query.search.unwrap_or_default();
    let transactions: Vec<_> = filter_transactions(&state.transactions, &search)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(SuccessResponse::new(transactions)))
}

/// Download the (optionally filtered) history as CSV
pub async fn export_transactions_csv(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let search = query.search.unwrap_or_default();
    let filtered = filter_transactions(&state.transactions, &search);
    let csv_content = export_csv(filtered)?;
    let filename = export_filename(Utc::now().date_naive());

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, csv_content))
}

// =====================================
// Account settings
// =====================================

pub async fn check_password_change(
    Json(request): Json<PasswordChangeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_password_change(
        &request.current_password,
        &request.new_password,
        &request.confirm_password,
    )?;
    Ok(Json(SuccessResponse::new(ValidationResponse { valid: true })))
}

pub async fn password_strength(
    Json(request): Json<PasswordStrengthRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(SuccessResponse::new(evaluate_password(&request.password))))
}

pub async fn check_email(Json(request): Json<EmailRequest>) -> Result<impl IntoResponse, ApiError> {
    validate_email(&request.email)?;
    Ok(Json(SuccessResponse::new(ValidationResponse { valid: true })))
}

pub async fn check_profile(Json(request): Json<ProfileUpdate>) -> Result<impl IntoResponse, ApiError> {
    validate_profile(&request)?;
    Ok(Json(SuccessResponse::new(ValidationResponse { valid: true })))
}

// =====================================
// Preferences
// =====================================

pub async fn get_preferences(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(SuccessResponse::new(state.preferences.get().await)))
}

pub async fn save_preferences(
    State(state): State<AppState>,
    Json(request): Json<Preferences>,
) -> Result<impl IntoResponse, ApiError> {
    let saved = state.preferences.save(request).await?;
    Ok(Json(SuccessResponse::new(saved)))
}

pub async fn toggle_threshold(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let prefs = state.preferences.toggle_threshold(&key).await?;
    Ok(Json(SuccessResponse::new(prefs)))
}

pub async fn set_theme(
    State(state): State<AppState>,
    Json(request): Json<ThemeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let prefs = state.preferences.set_theme(request.theme).await?;
    Ok(Json(SuccessResponse::new(prefs)))
}

pub async fn set_custom_threshold(
    State(state): State<AppState>,
    Json(request): Json<CustomThresholdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let prefs = state.preferences.set_custom_threshold(request.value).await?;
    Ok(Json(SuccessResponse::new(prefs)))
}
