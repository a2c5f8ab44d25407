// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Credential lifecycle: hashing, tokens and the service tying them together.

pub mod password;
pub mod token;
mod service;
mod service_impl;

pub use password::{verify_password, HashError, PasswordHasher, DEFAULT_HASH_COST};
pub use token::{TokenCodec, TokenError};
pub use service::CredentialService;
pub use service_impl::DefaultCredentials;
