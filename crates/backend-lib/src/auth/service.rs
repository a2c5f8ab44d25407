use crate::error::AppError;
use crate::models::{IdentityClaims, IdentityToken};
use async_trait::async_trait;

/// Credential lifecycle operations.
///
/// Every call is an independent request/response; nothing is kept between
/// calls apart from what the store persists.
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Register an account and return a token for it
    async fn signup(&self, username: &str, email: &str, password: &str) -> Result<IdentityToken, AppError>;

    /// Authenticate by username or email
    async fn login(&self, login: &str, password: &str) -> Result<IdentityToken, AppError>;

    /// Read-only probe, not a reservation
    async fn username_available(&self, username: &str) -> Result<bool, AppError>;

    /// Read-only probe, not a reservation
    async fn email_available(&self, email: &str) -> Result<bool, AppError>;

    /// Identity embedded in a token, if its signature verifies
    async fn authenticate_token(&self, token: &str) -> Result<IdentityClaims, AppError>;
}
