use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;

use crate::password::{has_digit, has_lowercase, has_special, has_uppercase, MIN_PASSWORD_LENGTH};

pub const MAX_NAME_LENGTH: usize = 50;

/// User-facing form failures. The `Display` text is shown verbatim.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Failed to sign in. Please try again.")]
    SignInFailed,
    #[error("Failed to create account. Please try again.")]
    RegistrationFailed,
    #[error("Current password is required")]
    CurrentPasswordRequired,
    #[error("New password is required")]
    NewPasswordRequired,
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("Password must include at least one uppercase letter")]
    MissingUppercase,
    #[error("Password must include at least one lowercase letter")]
    MissingLowercase,
    #[error("Password must include at least one number")]
    MissingNumber,
    #[error("Password must include at least one special character")]
    MissingSpecialCharacter,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be less than 50 characters")]
    NameTooLong,
    #[error("Invalid Twitter username format")]
    InvalidTwitter,
    #[error("Invalid Calaxy username format (3-30 characters, letters, numbers, - and _)")]
    InvalidCalaxy,
}

impl FormError {
    /// Form field the message belongs to
    pub fn field(&self) -> &'static str {
        match self {
            FormError::NameRequired | FormError::NameTooLong => "name",
            FormError::InvalidTwitter => "twitter",
            FormError::InvalidCalaxy => "calaxy",
            FormError::InvalidEmail => "email",
            FormError::CurrentPasswordRequired => "currentPassword",
            FormError::PasswordMismatch => "confirmPassword",
            FormError::MissingFields | FormError::SignInFailed | FormError::RegistrationFailed => "form",
            _ => "newPassword",
        }
    }
}

/// Profile form submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,

    #[serde(default)]
    pub twitter: String,

    #[serde(default)]
    pub calaxy: String,
}

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const TWITTER_PATTERN: &str = r"^@?[a-zA-Z0-9_]{1,15}$";
const CALAXY_PATTERN: &str = r"^[a-zA-Z0-9_-]{3,30}$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

fn twitter_regex() -> &'static Regex {
    static TWITTER: OnceLock<Regex> = OnceLock::new();
    TWITTER.get_or_init(|| Regex::new(TWITTER_PATTERN).expect("twitter pattern compiles"))
}

fn calaxy_regex() -> &'static Regex {
    static CALAXY: OnceLock<Regex> = OnceLock::new();
    CALAXY.get_or_init(|| Regex::new(CALAXY_PATTERN).expect("calaxy pattern compiles"))
}

pub fn validate_email(email: &str) -> Result<(), FormError> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(FormError::InvalidEmail)
    }
}

/// Check a password change form; the first failing rule wins
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<(), FormError> {
    if current.is_empty() {
        return Err(FormError::CurrentPasswordRequired);
    }
    if new.is_empty() {
        return Err(FormError::NewPasswordRequired);
    }
    if new.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(FormError::PasswordTooShort);
    }
    if !has_uppercase(new) {
        return Err(FormError::MissingUppercase);
    }
    if !has_lowercase(new) {
        return Err(FormError::MissingLowercase);
    }
    if !has_digit(new) {
        return Err(FormError::MissingNumber);
    }
    if !has_special(new) {
        return Err(FormError::MissingSpecialCharacter);
    }
    if new != confirm {
        return Err(FormError::PasswordMismatch);
    }
    Ok(())
}

/// Check a profile form. Social handles are optional; empty means unset.
pub fn validate_profile(profile: &ProfileUpdate) -> Result<(), FormError> {
    if profile.name.trim().is_empty() {
        return Err(FormError::NameRequired);
    }
    if profile.name.chars().count() > MAX_NAME_LENGTH {
        return Err(FormError::NameTooLong);
    }
    if !profile.twitter.is_empty() && !twitter_regex().is_match(&profile.twitter) {
        return Err(FormError::InvalidTwitter);
    }
    if !profile.calaxy.is_empty() && !calaxy_regex().is_match(&profile.calaxy) {
        return Err(FormError::InvalidCalaxy);
    }
    Ok(())
}
