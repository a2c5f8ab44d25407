// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Syntactic acceptance rules for signup fields.
//!
//! Input is checked as given: no trimming, no case folding. Lengths are
//! counted in characters.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

pub const MIN_USERNAME_LENGTH: usize = 4;
pub const MAX_USERNAME_LENGTH: usize = 20;
pub const MIN_EMAIL_LENGTH: usize = 7;
pub const MAX_EMAIL_LENGTH: usize = 35;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 120;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Possible validation errors, in the order they are checked
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("username length must be between {} and {} characters", MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH)]
    UsernameLength,

    #[error("email length must be between {} and {} characters", MIN_EMAIL_LENGTH, MAX_EMAIL_LENGTH)]
    EmailLength,

    #[error("password length must be between {} and {} characters", MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH)]
    PasswordLength,

    #[error("invalid email format")]
    EmailFormat,
}

impl ValidationError {
    /// Short reason tag, used as the public validation message
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::UsernameLength => "username length",
            ValidationError::EmailLength => "email length",
            ValidationError::PasswordLength => "password length",
            ValidationError::EmailFormat => "email format",
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

fn within(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    (min..=max).contains(&len)
}

/// Validate signup fields. The first failing rule wins.
pub fn validate_signup(username: &str, email: &str, password: &str) -> ValidationResult<()> {
    if !within(username, MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH) {
        return Err(ValidationError::UsernameLength);
    }
    if !within(email, MIN_EMAIL_LENGTH, MAX_EMAIL_LENGTH) {
        return Err(ValidationError::EmailLength);
    }
    if !within(password, MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH) {
        return Err(ValidationError::PasswordLength);
    }
    validate_email_format(email)
}

/// Check the basic `local@domain.tld` shape
pub fn validate_email_format(email: &str) -> ValidationResult<()> {
    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::EmailFormat)
    }
}
