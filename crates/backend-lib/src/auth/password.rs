// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Params, Scrypt,
};
use std::{num::NonZeroUsize, sync::Arc, thread};
use thiserror::Error;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};
use zeroize::Zeroize;

/// Default scrypt work factor (`log2(N)`)
pub const DEFAULT_HASH_COST: u8 = 15;

const BLOCK_SIZE: u32 = 8;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

/// Plaintext used to build the dummy hash for unknown logins
const DUMMY_PLAINTEXT: &str = "dummy-password-for-timing";

#[derive(Error, Debug)]
pub enum HashError {
    #[error("invalid scrypt work factor: {0}")]
    InvalidCost(u8),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("hasher is shut down")]
    Closed(#[from] AcquireError),
}

/// Salted scrypt hashing with a work factor fixed at construction.
///
/// Each hash holds `128 * r * 2^cost` bytes while it runs, so the number of
/// hashes in flight is capped. Cloning is cheap; all clones share the same
/// parameters and the same cap.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: Arc<str>,
    slots: Arc<Semaphore>,
}

impl PasswordHasher {
    /// Build a hasher allowing one hash in flight per available CPU
    pub fn new(cost: u8) -> Result<Self, HashError> {
        let cpus = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::with_concurrency(cost, cpus)
    }

    /// Build a hasher with at most `limit` hashes in flight.
    /// Computes one hash up front for the timing dummy.
    pub fn with_concurrency(cost: u8, limit: usize) -> Result<Self, HashError> {
        let params = Params::new(cost, BLOCK_SIZE, PARALLELISM, OUTPUT_LEN)
            .map_err(|_| HashError::InvalidCost(cost))?;
        let dummy_hash = hash_with(&params, DUMMY_PLAINTEXT)?;
        Ok(Self {
            params,
            dummy_hash: dummy_hash.into(),
            slots: Arc::new(Semaphore::new(limit.max(1))),
        })
    }

    async fn slot(&self) -> Result<OwnedSemaphorePermit, HashError> {
        Ok(Arc::clone(&self.slots).acquire_owned().await?)
    }

    /// Hash on the blocking pool. The plaintext copy is wiped afterwards.
    pub async fn hash(&self, plain: &str) -> Result<String, HashError> {
        let permit = self.slot().await?;
        let params = self.params;
        let mut plain = plain.to_owned();
        tokio::task::spawn_blocking(move || {
            let hashed = hash_with(&params, &plain);
            plain.zeroize();
            drop(permit);
            hashed
        })
        .await?
    }

    /// Verify on the blocking pool. Any failure reads as a mismatch.
    pub async fn verify(&self, hash: &str, plain: &str) -> bool {
        let Ok(permit) = self.slot().await else {
            return false;
        };
        let hash = hash.to_owned();
        let mut plain = plain.to_owned();
        tokio::task::spawn_blocking(move || {
            let ok = verify_password(&hash, &plain);
            plain.zeroize();
            drop(permit);
            ok
        })
        .await
        .unwrap_or(false)
    }

    /// Spend the same effort as a real verification and always fail.
    pub async fn verify_dummy(&self, plain: &str) -> bool {
        let _ = self.verify(&self.dummy_hash, plain).await;
        false
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("log_n", &self.params.log_n())
            .field("free_slots", &self.slots.available_permits())
            .finish_non_exhaustive()
    }
}

fn hash_with(params: &Params, plain: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, *params, &salt)
        .map_err(|e| HashError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a PHC hash string
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}
