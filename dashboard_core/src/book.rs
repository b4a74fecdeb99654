use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::sample::sample_tokens;
use crate::token::{ensure_unique_ids, TokenRecord};
use crate::view::{derive_visible_list, toggle_hidden, toggle_tracked, ViewState};
use crate::{DashboardError, Result};

/// Supplier of fresh token market data
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Fetch the full token collection
    async fn fetch_tokens(&self) -> Result<Vec<TokenRecord>>;
}

/// Serves the fixed sample set after an artificial delay
#[derive(Debug, Clone)]
pub struct SampleTokenSource {
    delay: Duration,
}

impl SampleTokenSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_config(config: &config_manager::TokenViewConfig) -> Self {
        Self::new(Duration::from_millis(config.refresh_delay_ms))
    }
}

#[async_trait]
impl TokenSource for SampleTokenSource {
    async fn fetch_tokens(&self) -> Result<Vec<TokenRecord>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(sample_tokens())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The fetched collection replaced the current one
    Applied { token_count: usize },
    /// A newer refresh was requested while this one was in flight; its result was dropped
    Superseded,
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Live token collection shared by every view of the process.
///
/// Reads always see a complete collection: toggles and refreshes build a new
/// `Vec` and swap it in under the write lock. Refreshes are last-request-wins.
pub struct TokenBook {
    tokens: RwLock<Vec<TokenRecord>>,
    source: Arc<dyn TokenSource>,
    latest_request: AtomicU64,
    in_flight: AtomicUsize,
}

impl TokenBook {
    pub fn new(tokens: Vec<TokenRecord>, source: Arc<dyn TokenSource>) -> Result<Self> {
        ensure_unique_ids(&tokens)?;
        info!("📒 Token book seeded with {} tokens", tokens.len());

        Ok(Self {
            tokens: RwLock::new(tokens),
            source,
            latest_request: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        })
    }

    /// Seed with the sample set
    pub fn with_sample_data(source: Arc<dyn TokenSource>) -> Result<Self> {
        Self::new(sample_tokens(), source)
    }

    pub async fn snapshot(&self) -> Vec<TokenRecord> {
        self.tokens.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<TokenRecord> {
        self.tokens.read().await.iter().find(|t| t.id == id).cloned()
    }

    /// Current visible list for `view`
    pub async fn visible(&self, view: &ViewState) -> Vec<TokenRecord> {
        self.visible_with_total(view).await.1
    }

    /// Collection size and visible list, both read from the same collection
    pub async fn visible_with_total(&self, view: &ViewState) -> (usize, Vec<TokenRecord>) {
        let tokens = self.tokens.read().await;
        let visible = derive_visible_list(&tokens, view).into_iter().cloned().collect();
        (tokens.len(), visible)
    }

    /// Flip the tracked flag; returns false when the id is unknown
    pub async fn toggle_tracked(&self, id: &str) -> bool {
        let mut tokens = self.tokens.write().await;
        let known = tokens.iter().any(|t| t.id == id);
        if known {
            *tokens = toggle_tracked(&tokens, id);
            debug!("Toggled tracked flag on {}", id);
        } else {
            debug!("Ignoring track toggle for unknown token {}", id);
        }
        known
    }

    /// Flip the hidden flag; returns false when the id is unknown
    pub async fn toggle_hidden(&self, id: &str) -> bool {
        let mut tokens = self.tokens.write().await;
        let known = tokens.iter().any(|t| t.id == id);
        if known {
            *tokens = toggle_hidden(&tokens, id);
            debug!("Toggled hidden flag on {}", id);
        } else {
            debug!("Ignoring hide toggle for unknown token {}", id);
        }
        known
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Fetch a fresh collection from the source and swap it in.
    ///
    /// User flags are carried over by id. A failed or invalid fetch leaves the
    /// current collection untouched. If another refresh starts before this one
    /// finishes, this one's result is dropped.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let request = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight::enter(&self.in_flight);
        debug!("🔄 Refresh #{} started", request);

        let incoming = self.source.fetch_tokens().await.map_err(|e| {
            warn!("Refresh #{} failed to fetch tokens: {}", request, e);
            match e {
                DashboardError::Refresh(msg) => DashboardError::Refresh(msg),
                other => DashboardError::Refresh(other.to_string()),
            }
        })?;

        if let Err(e) = ensure_unique_ids(&incoming) {
            warn!("Refresh #{} returned an invalid collection: {}", request, e);
            return Err(DashboardError::Refresh(e.to_string()));
        }

        let mut tokens = self.tokens.write().await;
        if self.latest_request.load(Ordering::SeqCst) != request {
            info!("Refresh #{} superseded by a newer request, dropping result", request);
            return Ok(RefreshOutcome::Superseded);
        }

        let merged = carry_over_flags(&tokens, incoming);
        let token_count = merged.len();
        *tokens = merged;

        info!("✅ Refresh #{} applied: {} tokens", request, token_count);
        Ok(RefreshOutcome::Applied { token_count })
    }
}

/// Keep the user's tracked/hidden choices for tokens that survive a refresh
fn carry_over_flags(current: &[TokenRecord], incoming: Vec<TokenRecord>) -> Vec<TokenRecord> {
    let flags: HashMap<&str, (bool, bool)> = current
        .iter()
        .map(|t| (t.id.as_str(), (t.is_tracked, t.is_hidden)))
        .collect();

    incoming
        .into_iter()
        .map(|mut token| {
            if let Some(&(tracked, hidden)) = flags.get(token.id.as_str()) {
                token.is_tracked = tracked;
                token.is_hidden = hidden;
            }
            token
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::CategoryFilter;
    use rust_decimal_macros::dec;

    struct ScriptedSource {
        calls: AtomicUsize,
        slow_first_call: Duration,
    }

    #[async_trait]
    impl TokenSource for ScriptedSource {
        async fn fetch_tokens(&self) -> Result<Vec<TokenRecord>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let mut tokens = sample_tokens();
            if call == 0 {
                tokio::time::sleep(self.slow_first_call).await;
                tokens.truncate(1);
            } else {
                tokens.truncate(2);
            }
            Ok(tokens)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TokenSource for FailingSource {
        async fn fetch_tokens(&self) -> Result<Vec<TokenRecord>> {
            Err(DashboardError::Refresh("upstream unavailable".to_string()))
        }
    }

    struct DuplicateSource;

    #[async_trait]
    impl TokenSource for DuplicateSource {
        async fn fetch_tokens(&self) -> Result<Vec<TokenRecord>> {
            let mut tokens = sample_tokens();
            tokens.push(tokens[0].clone());
            Ok(tokens)
        }
    }

    fn instant_book() -> TokenBook {
        TokenBook::with_sample_data(Arc::new(SampleTokenSource::new(Duration::ZERO))).unwrap()
    }

    #[tokio::test]
    async fn test_toggle_known_and_unknown() {
        let book = instant_book();
        assert!(book.toggle_tracked("hbar").await);
        assert!(book.get("hbar").await.unwrap().is_tracked);
        assert!(!book.toggle_tracked("nope").await);
        assert!(book.toggle_hidden("hbar").await);
        assert!(book.get("hbar").await.unwrap().is_hidden);
    }

    #[tokio::test]
    async fn test_visible_uses_view() {
        let book = instant_book();
        let view = ViewState {
            category_filter: CategoryFilter::Tracked,
            ..Default::default()
        };
        let visible = book.visible(&view).await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "usdc");
    }

    #[tokio::test]
    async fn test_visible_with_total_counts_hidden_tokens() {
        let book = instant_book();
        let (total, visible) = book.visible_with_total(&ViewState::default()).await;
        assert_eq!(total, book.snapshot().await.len());
        assert_eq!(visible, book.visible(&ViewState::default()).await);
        assert!(visible.len() < total);
    }

    #[tokio::test]
    async fn test_refresh_keeps_user_flags() {
        let book = instant_book();
        book.toggle_tracked("hbar").await;
        book.toggle_hidden("usdc").await;

        let outcome = book.refresh().await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Applied { token_count: 5 });

        let hbar = book.get("hbar").await.unwrap();
        let usdc = book.get("usdc").await.unwrap();
        assert!(hbar.is_tracked);
        assert!(usdc.is_hidden);
        assert!(usdc.is_tracked);
        assert!(!book.is_refreshing());
    }

    #[tokio::test]
    async fn test_last_refresh_wins() {
        let source = Arc::new(ScriptedSource {
            calls: AtomicUsize::new(0),
            slow_first_call: Duration::from_millis(300),
        });
        let book = Arc::new(TokenBook::new(vec![], source).unwrap());

        let slow = tokio::spawn({
            let book = book.clone();
            async move { book.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(book.is_refreshing());

        let fast = book.refresh().await.unwrap();
        assert_eq!(fast, RefreshOutcome::Applied { token_count: 2 });

        let slow = slow.await.unwrap().unwrap();
        assert_eq!(slow, RefreshOutcome::Superseded);
        assert_eq!(book.snapshot().await.len(), 2);
        assert!(!book.is_refreshing());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_collection() {
        let book = TokenBook::with_sample_data(Arc::new(FailingSource)).unwrap();
        let before = book.snapshot().await;
        let err = book.refresh().await.unwrap_err();
        assert!(matches!(err, DashboardError::Refresh(_)));
        assert_eq!(book.snapshot().await, before);
        assert!(!book.is_refreshing());
    }

    #[tokio::test]
    async fn test_invalid_refresh_rejected() {
        let book = TokenBook::with_sample_data(Arc::new(DuplicateSource)).unwrap();
        assert!(book.refresh().await.is_err());
        assert_eq!(book.snapshot().await.len(), 5);
    }

    #[test]
    fn test_new_rejects_negative_figures() {
        let mut tokens = sample_tokens();
        tokens[1].market_cap = dec!(-1);
        let source = Arc::new(SampleTokenSource::new(Duration::ZERO));
        assert!(TokenBook::new(tokens, source).is_err());
    }
}
