use serde::Serialize;

pub const MIN_PASSWORD_LENGTH: usize = 8;

const LABELS: [&str; 6] = ["Very Weak", "Weak", "Fair", "Good", "Strong", "Very Strong"];

/// Strength meter reading for a candidate password
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    /// Number of satisfied checks, 0..=5
    pub score: u8,

    pub label: &'static str,
}

pub(crate) fn has_uppercase(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase())
}

pub(crate) fn has_lowercase(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
}

pub(crate) fn has_digit(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_digit())
}

pub(crate) fn has_special(password: &str) -> bool {
    password.chars().any(|c| !c.is_ascii_alphanumeric())
}

pub fn evaluate_password(password: &str) -> PasswordStrength {
    let checks = [
        password.chars().count() >= MIN_PASSWORD_LENGTH,
        has_uppercase(password),
        has_lowercase(password),
        has_digit(password),
        has_special(password),
    ];
    let score = checks.iter().filter(|passed| **passed).count();

    PasswordStrength {
        score: score as u8,
        label: LABELS[score.min(LABELS.len() - 1)],
    }
}
