use crate::auth::{CredentialService, HashError, PasswordHasher, TokenCodec};
use crate::config::Settings;
use crate::error::AppError;
use crate::metrics as keys;
use crate::models::{Account, IdentityClaims, IdentityToken};
use crate::storage::{CredentialStore, StoreDeadline, StoreError, UniqueField};
use crate::validation::validate_signup;
use async_trait::async_trait;
use ::metrics::counter;
use std::sync::Arc;

/// Store-backed implementation of [`CredentialService`]
pub struct DefaultCredentials {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: TokenCodec,
    deadline: StoreDeadline,
}

impl DefaultCredentials {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: TokenCodec,
        deadline: StoreDeadline,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            deadline,
        }
    }

    /// Build the hasher, codec and deadline from validated settings
    pub fn from_settings(
        store: Arc<dyn CredentialStore>,
        settings: &Settings,
    ) -> Result<Self, HashError> {
        Ok(Self::new(
            store,
            PasswordHasher::new(settings.hash_cost)?,
            TokenCodec::new(settings.jwt_secret.as_bytes()),
            settings.store_deadline(),
        ))
    }

    fn store_failure(operation: &'static str, err: StoreError) -> AppError {
        if matches!(err, StoreError::Timeout) {
            counter!(keys::STORE_TIMEOUT).increment(1);
        }
        tracing::error!(operation, error = %err, "store call failed");
        AppError::Internal(format!("{operation} failed"))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        self.deadline
            .run(self.store.find_by_username(username))
            .await
            .map_err(|e| Self::store_failure("find_by_username", e))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        self.deadline
            .run(self.store.find_by_email(email))
            .await
            .map_err(|e| Self::store_failure("find_by_email", e))
    }

    fn issue(&self, account: &Account) -> Result<IdentityToken, AppError> {
        self.tokens.encode(account).map_err(|e| {
            tracing::error!(error = %e, "token encoding failed");
            AppError::Internal("token encoding failed".to_string())
        })
    }
}

#[async_trait]
impl CredentialService for DefaultCredentials {
    #[tracing::instrument(skip_all, fields(username = %username))]
    async fn signup(&self, username: &str, email: &str, password: &str) -> Result<IdentityToken, AppError> {
        validate_signup(username, email, password)?;

        // fast path for a friendly message; the store has the final say
        if self.find_by_username(username).await?.is_some() {
            counter!(keys::SIGNUP_CONFLICT).increment(1);
            return Err(AppError::username_taken());
        }
        if self.find_by_email(email).await?.is_some() {
            counter!(keys::SIGNUP_CONFLICT).increment(1);
            return Err(AppError::email_used());
        }

        let password_hash = self.hasher.hash(password).await.map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            AppError::Internal("password hashing failed".to_string())
        })?;
        let account = Account::new(username.to_owned(), email.to_owned(), password_hash);

        match self.deadline.run(self.store.insert(account.clone())).await {
            Ok(()) => {},
            Err(StoreError::DuplicateKey(UniqueField::Username)) => {
                tracing::info!("lost signup race on username");
                counter!(keys::SIGNUP_CONFLICT).increment(1);
                return Err(AppError::username_taken());
            },
            Err(StoreError::DuplicateKey(UniqueField::Email)) => {
                tracing::info!("lost signup race on email");
                counter!(keys::SIGNUP_CONFLICT).increment(1);
                return Err(AppError::email_used());
            },
            Err(e) => return Err(Self::store_failure("insert", e)),
        }

        let token = self.issue(&account)?;
        counter!(keys::SIGNUP_OK).increment(1);
        tracing::info!(account_id = %account.id, "account created");
        Ok(token)
    }

    #[tracing::instrument(skip_all)]
    async fn login(&self, login: &str, password: &str) -> Result<IdentityToken, AppError> {
        let found = self
            .deadline
            .run(self.store.find_by_username_or_email(login))
            .await
            .map_err(|e| Self::store_failure("find_by_username_or_email", e))?;

        let Some(account) = found else {
            self.hasher.verify_dummy(password).await;
            counter!(keys::LOGIN_REJECTED).increment(1);
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(&account.password_hash, password).await {
            counter!(keys::LOGIN_REJECTED).increment(1);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue(&account)?;
        counter!(keys::LOGIN_OK).increment(1);
        tracing::debug!(account_id = %account.id, "login succeeded");
        Ok(token)
    }

    async fn username_available(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.find_by_username(username).await?.is_none())
    }

    async fn email_available(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.find_by_email(email).await?.is_none())
    }

    async fn authenticate_token(&self, token: &str) -> Result<IdentityClaims, AppError> {
        match self.tokens.decode(token) {
            Ok(account) => Ok(account.claims()),
            Err(_) => {
                counter!(keys::TOKEN_REJECTED).increment(1);
                Err(AppError::InvalidToken)
            },
        }
    }
}
