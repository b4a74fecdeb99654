use async_trait::async_trait;
use config_manager::AuthConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::forms::FormError;
use crate::{AccountError, Result};

/// Process-wide signed-in flag. Starts signed out and is not persisted.
#[derive(Debug, Default)]
pub struct AuthStore {
    authenticated: AtomicBool,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    pub fn login(&self) {
        self.authenticated.store(true, Ordering::SeqCst);
    }

    pub fn logout(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }
}

/// Credential check behind the sign-in and registration forms
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<()>;

    async fn register(&self, email: &str, password: &str) -> Result<()>;
}

/// Accepts any credentials after a fixed delay
#[derive(Debug, Clone)]
pub struct AcceptAllBackend {
    delay: Duration,
}

impl AcceptAllBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(Duration::from_millis(config.simulated_delay_ms))
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl AuthBackend for AcceptAllBackend {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<()> {
        self.pause().await;
        Ok(())
    }

    async fn register(&self, _email: &str, _password: &str) -> Result<()> {
        self.pause().await;
        Ok(())
    }
}

/// Sign-in, registration and sign-out flows over an [`AuthStore`]
#[derive(Clone)]
pub struct AccountService {
    auth: Arc<AuthStore>,
    backend: Arc<dyn AuthBackend>,
}

impl AccountService {
    pub fn new(auth: Arc<AuthStore>, backend: Arc<dyn AuthBackend>) -> Self {
        Self { auth, backend }
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> std::result::Result<(), FormError> {
        if email.is_empty() || password.is_empty() {
            return Err(FormError::MissingFields);
        }

        self.backend.sign_in(email, password).await.map_err(|e| {
            warn!("Sign-in failed: {}", e);
            FormError::SignInFailed
        })?;

        self.auth.login();
        info!("🔓 Signed in");
        Ok(())
    }

    /// Create an account and sign straight in
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> std::result::Result<(), FormError> {
        if password != confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        if email.is_empty() || password.is_empty() || confirm_password.is_empty() {
            return Err(FormError::MissingFields);
        }

        self.backend.register(email, password).await.map_err(|e| {
            warn!("Registration failed: {}", e);
            FormError::RegistrationFailed
        })?;

        self.auth.login();
        info!("🆕 Account created, signed in");
        Ok(())
    }

    pub fn sign_out(&self) {
        self.auth.logout();
        info!("🔒 Signed out");
    }
}

/// Backend that rejects everything, for exercising failure paths
#[derive(Debug, Clone, Default)]
pub struct RejectAllBackend;

#[async_trait]
impl AuthBackend for RejectAllBackend {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<()> {
        Err(AccountError::Backend("credentials rejected".to_string()))
    }

    async fn register(&self, _email: &str, _password: &str) -> Result<()> {
        Err(AccountError::Backend("registration closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(backend: Arc<dyn AuthBackend>) -> AccountService {
        AccountService::new(Arc::new(AuthStore::new()), backend)
    }

    fn accepting() -> AccountService {
        service(Arc::new(AcceptAllBackend::new(Duration::ZERO)))
    }

    #[test]
    fn test_auth_store_flag() {
        let store = AuthStore::new();
        assert!(!store.is_authenticated());
        store.login();
        store.login();
        assert!(store.is_authenticated());
        store.logout();
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_in_requires_both_fields() {
        let accounts = accepting();
        assert_eq!(
            accounts.sign_in("a@b.co", "").await,
            Err(FormError::MissingFields)
        );
        assert!(!accounts.auth().is_authenticated());

        accounts.sign_in("a@b.co", "secret").await.unwrap();
        assert!(accounts.auth().is_authenticated());

        accounts.sign_out();
        assert!(!accounts.auth().is_authenticated());
    }

    #[tokio::test]
    async fn test_register_checks_mismatch_first() {
        let accounts = accepting();
        assert_eq!(
            accounts.register("", "a", "b").await,
            Err(FormError::PasswordMismatch)
        );
        assert_eq!(
            accounts.register("", "pw", "pw").await,
            Err(FormError::MissingFields)
        );
        assert!(!accounts.auth().is_authenticated());

        accounts.register("a@b.co", "pw", "pw").await.unwrap();
        assert!(accounts.auth().is_authenticated());
    }

    #[tokio::test]
    async fn test_backend_failures_use_generic_messages() {
        let accounts = service(Arc::new(RejectAllBackend));
        let err = accounts.sign_in("a@b.co", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to sign in. Please try again.");

        let err = accounts.register("a@b.co", "pw", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to create account. Please try again.");
        assert!(!accounts.auth().is_authenticated());
    }
}
