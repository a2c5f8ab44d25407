// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Account storage abstraction with in-memory and flat-file implementations.
//!
//! Uniqueness of usernames and emails is enforced here, at insert time.
//! Any check a caller makes beforehand is advisory only.
use crate::models::Account;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::{
    collections::HashMap,
    fmt,
    fs,
    future::Future,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use thiserror::Error;
use uuid::Uuid;

/// Deadline for a single store call before performance scaling
pub const BASE_STORE_TIMEOUT: Duration = Duration::from_secs(5);

const ACCOUNTS_DIR: &str = "accounts";

/// Field protected by a uniqueness constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Id,
    Username,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UniqueField::Id => "id",
            UniqueField::Username => "username",
            UniqueField::Email => "email",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate key on {0}")]
    DuplicateKey(UniqueField),

    #[error("store operation timed out")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt store: {0}")]
    Corrupt(String),

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Lookup and insert operations against the account table
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Account whose username or email equals `login`; username wins
    async fn find_by_username_or_email(&self, login: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Insert atomically, rejecting any id/username/email already present
    async fn insert(&self, account: Account) -> Result<(), StoreError>;
}

/// Primary and secondary keys over a set of accounts
#[derive(Debug, Default)]
struct AccountIndex {
    by_id: HashMap<Uuid, Account>,
    by_username: HashMap<String, Uuid>,
    by_email: HashMap<String, Uuid>,
}

impl AccountIndex {
    fn find_by_username(&self, username: &str) -> Option<Account> {
        self.by_username
            .get(username)
            .and_then(|id| self.by_id.get(id))
            .cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<Account> {
        self.by_email
            .get(email)
            .and_then(|id| self.by_id.get(id))
            .cloned()
    }

    fn find_by_username_or_email(&self, login: &str) -> Option<Account> {
        self.find_by_username(login)
            .or_else(|| self.find_by_email(login))
    }

    fn check_unique(&self, account: &Account) -> Result<(), StoreError> {
        if self.by_id.contains_key(&account.id) {
            return Err(StoreError::DuplicateKey(UniqueField::Id));
        }
        if self.by_username.contains_key(&account.username) {
            return Err(StoreError::DuplicateKey(UniqueField::Username));
        }
        if self.by_email.contains_key(&account.email) {
            return Err(StoreError::DuplicateKey(UniqueField::Email));
        }
        Ok(())
    }

    fn insert(&mut self, account: Account) -> Result<(), StoreError> {
        self.check_unique(&account)?;
        self.by_username.insert(account.username.clone(), account.id);
        self.by_email.insert(account.email.clone(), account.id);
        self.by_id.insert(account.id, account);
        Ok(())
    }

    fn len(&self) -> usize {
        self.by_id.len()
    }
}

/// Process-local store, mostly for tests and single-node setups
#[derive(Clone, Default)]
pub struct MemoryStore {
    index: Arc<Mutex<AccountIndex>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_username_or_email(&self, login: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.index.lock().find_by_username_or_email(login))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.index.lock().find_by_username(username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.index.lock().find_by_email(email))
    }

    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        // check and insert under a single lock acquisition
        self.index.lock().insert(account)
    }
}

/// Durable store keeping one JSON document per account.
///
/// Layout: `<root>/accounts/<id>.json`. The whole table is indexed in memory
/// on open; inserts are serialized and written with a temp-file rename.
#[derive(Clone)]
pub struct FlatFileStore {
    accounts_dir: PathBuf,
    index: Arc<RwLock<AccountIndex>>,
    writer: Arc<Mutex<()>>,
}

impl FlatFileStore {
    /// Open the database `name` under the location named by `url`.
    /// `url` is a filesystem path, optionally prefixed with `file://`.
    pub fn open(url: &str, name: &str) -> Result<Self, StoreError> {
        let base = url.strip_prefix("file://").unwrap_or(url);
        Self::new(Path::new(base).join(name))
    }

    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let accounts_dir = root.as_ref().join(ACCOUNTS_DIR);
        fs::create_dir_all(&accounts_dir)?;
        let index = load_index(&accounts_dir)?;
        tracing::debug!(path = %accounts_dir.display(), accounts = index.len(), "opened account store");
        Ok(Self {
            accounts_dir,
            index: Arc::new(RwLock::new(index)),
            writer: Arc::new(Mutex::new(())),
        })
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert_blocking(&self, account: Account) -> Result<(), StoreError> {
        let _writer = self.writer.lock();
        self.index.read().check_unique(&account)?;
        write_account(&self.accounts_dir, &account)?;
        self.index.write().insert(account)
    }
}

#[async_trait]
impl CredentialStore for FlatFileStore {
    async fn find_by_username_or_email(&self, login: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.index.read().find_by_username_or_email(login))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.index.read().find_by_username(username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.index.read().find_by_email(email))
    }

    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        // the blocking task runs to completion even if this future is dropped
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.insert_blocking(account)).await?
    }
}

fn load_index(accounts_dir: &Path) -> Result<AccountIndex, StoreError> {
    let mut index = AccountIndex::default();
    for entry in fs::read_dir(accounts_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let content = fs::read_to_string(&path)?;
        let account: Account = serde_json::from_str(&content)?;
        index.insert(account).map_err(|e| {
            StoreError::Corrupt(format!("{}: {e}", path.display()))
        })?;
    }
    Ok(index)
}

fn write_account(accounts_dir: &Path, account: &Account) -> Result<(), StoreError> {
    let path = accounts_dir.join(format!("{}.json", account.id));
    let tmp = accounts_dir.join(format!("{}.json.tmp", account.id));
    let json = serde_json::to_vec_pretty(account)?;

    let mut file = fs::File::create(&tmp)?;
    file.write_all(&json)?;
    file.sync_all()?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

/// Per-call deadline applied to every store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreDeadline {
    timeout: Duration,
}

impl StoreDeadline {
    /// Scale `base` by `performance` percent
    pub fn new(base: Duration, performance: u32) -> Self {
        let timeout = base
            .checked_mul(performance)
            .map_or(Duration::MAX, |scaled| scaled / 100);
        Self { timeout }
    }

    pub fn from_performance(performance: u32) -> Self {
        Self::new(BASE_STORE_TIMEOUT, performance)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a store call, turning an expired deadline into `StoreError::Timeout`
    pub async fn run<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}

impl Default for StoreDeadline {
    fn default() -> Self {
        Self::from_performance(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn account(username: &str, email: &str) -> Account {
        Account::new(username.to_string(), email.to_string(), "$scrypt$x".to_string())
    }

    #[tokio::test]
    async fn test_memory_store_lookups() {
        let store = MemoryStore::new();
        let alice = account("alice", "alice@example.com");
        store.insert(alice.clone()).await.unwrap();

        assert_eq!(store.find_by_username("alice").await.unwrap(), Some(alice.clone()));
        assert_eq!(store.find_by_email("alice@example.com").await.unwrap(), Some(alice.clone()));
        assert_eq!(store.find_by_username_or_email("alice").await.unwrap(), Some(alice.clone()));
        assert_eq!(
            store.find_by_username_or_email("alice@example.com").await.unwrap(),
            Some(alice)
        );
        assert_eq!(store.find_by_username("bob").await.unwrap(), None);
        // usernames are matched exactly as stored
        assert_eq!(store.find_by_username("Alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicates() {
        let store = MemoryStore::new();
        store.insert(account("alice", "alice@example.com")).await.unwrap();

        assert!(matches!(
            store.insert(account("alice", "other@example.com")).await,
            Err(StoreError::DuplicateKey(UniqueField::Username))
        ));
        assert!(matches!(
            store.insert(account("alice2", "alice@example.com")).await,
            Err(StoreError::DuplicateKey(UniqueField::Email))
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_username_preferred_over_email() {
        let store = MemoryStore::new();
        // bob's username happens to equal carol's email
        let carol = account("carol", "x@y.zz");
        let bob = account("x@y.zz", "bob@example.com");
        store.insert(carol).await.unwrap();
        store.insert(bob.clone()).await.unwrap();

        assert_eq!(store.find_by_username_or_email("x@y.zz").await.unwrap(), Some(bob));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_single_winner() {
        let dir = tempdir().unwrap();
        let store = FlatFileStore::new(dir.path()).unwrap();
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert(account("racer", &format!("racer{i}@example.com")))
                        .await
                })
            })
            .collect();

        let results = futures_util::future::join_all(tasks).await;
        let winners = results.iter().filter(|r| matches!(r, Ok(Ok(())))).count();
        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_shared_email_single_winner() {
        let dir = tempdir().unwrap();
        let flat = FlatFileStore::new(dir.path()).unwrap();
        let memory = MemoryStore::new();
        let stores: [Arc<dyn CredentialStore>; 2] =
            [Arc::new(flat.clone()), Arc::new(memory.clone())];

        for store in stores {
            let tasks: Vec<_> = (0..8)
                .map(|i| {
                    let store = Arc::clone(&store);
                    tokio::spawn(async move {
                        store
                            .insert(account(&format!("user{i}"), "same@example.com"))
                            .await
                    })
                })
                .collect();

            let mut winners = 0;
            for result in futures_util::future::join_all(tasks).await {
                match result.unwrap() {
                    Ok(()) => winners += 1,
                    Err(StoreError::DuplicateKey(UniqueField::Email)) => {},
                    Err(other) => panic!("unexpected error: {other}"),
                }
            }
            assert_eq!(winners, 1);
        }
        assert_eq!(flat.len(), 1);
        assert_eq!(memory.len(), 1);
    }

    #[tokio::test]
    async fn test_flat_file_store_persists() {
        let dir = tempdir().unwrap();
        let alice = account("alice", "alice@example.com");
        {
            let store = FlatFileStore::open(dir.path().to_str().unwrap(), "blog").unwrap();
            store.insert(alice.clone()).await.unwrap();
        }

        let url = format!("file://{}", dir.path().display());
        let reopened = FlatFileStore::open(&url, "blog").unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.find_by_username("alice").await.unwrap(), Some(alice));
        assert!(matches!(
            reopened.insert(account("alice", "new@example.com")).await,
            Err(StoreError::DuplicateKey(UniqueField::Username))
        ));
    }

    #[tokio::test]
    async fn test_flat_file_store_ignores_temp_files() {
        let dir = tempdir().unwrap();
        let accounts = dir.path().join(ACCOUNTS_DIR);
        fs::create_dir_all(&accounts).unwrap();
        fs::write(accounts.join("leftover.json.tmp"), b"{ half written").unwrap();

        let store = FlatFileStore::new(dir.path()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_flat_file_store_detects_duplicates_on_open() {
        let dir = tempdir().unwrap();
        let accounts = dir.path().join(ACCOUNTS_DIR);
        fs::create_dir_all(&accounts).unwrap();
        write_account(&accounts, &account("alice", "a1@example.com")).unwrap();
        write_account(&accounts, &account("alice", "a2@example.com")).unwrap();

        assert!(matches!(
            FlatFileStore::new(dir.path()),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_deadline_scaling() {
        assert_eq!(StoreDeadline::default().timeout(), Duration::from_secs(5));
        assert_eq!(
            StoreDeadline::from_performance(200).timeout(),
            Duration::from_secs(10)
        );
        assert_eq!(
            StoreDeadline::new(Duration::from_secs(10), 50).timeout(),
            Duration::from_secs(5)
        );
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let deadline = StoreDeadline::new(Duration::from_millis(10), 100);
        let result: Result<(), StoreError> = deadline
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(StoreError::Timeout)));
    }
}
