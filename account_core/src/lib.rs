//! Account-side state and form rules: sign-in status, credential flows,
//! settings form validation and notification preferences.

use thiserror::Error;

pub mod auth;
pub mod forms;
pub mod password;
pub mod preferences;

pub use auth::{AcceptAllBackend, AccountService, AuthBackend, AuthStore, RejectAllBackend};
pub use forms::{validate_email, validate_password_change, validate_profile, FormError, ProfileUpdate};
pub use password::{evaluate_password, PasswordStrength};
pub use preferences::{NotificationThreshold, Preferences, PreferencesStore, Theme};

#[derive(Error, Debug)]
pub enum AccountError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("Authentication backend error: {0}")]
    Backend(String),
    #[error("Storage error: {0}")]
    Storage(#[from] persistence_layer::PersistenceError),
}

pub type Result<T> = std::result::Result<T, AccountError>;
