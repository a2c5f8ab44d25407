// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core functionality for the blog auth service: account registration,
//! login and signed identity tokens.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod router;
pub mod storage;
pub mod validation;

use crate::auth::{CredentialService, DefaultCredentials, HashError};
use crate::config::Settings;
use crate::storage::CredentialStore;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Credential service
    pub auth: Arc<dyn CredentialService>,
    /// Settings the service was built from
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Build the default credential service over `store`
    pub fn new(store: Arc<dyn CredentialStore>, settings: Settings) -> Result<Self, HashError> {
        let auth = Arc::new(DefaultCredentials::from_settings(store, &settings)?);
        Ok(Self::with_service(auth, settings))
    }

    /// Use an already-built service
    pub fn with_service(auth: Arc<dyn CredentialService>, settings: Settings) -> Self {
        Self {
            auth,
            settings: Arc::new(settings),
        }
    }
}
