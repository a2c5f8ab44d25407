// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use crate::auth::DEFAULT_HASH_COST;
use crate::storage::StoreDeadline;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use thiserror::Error;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "blogauth.toml";
const JSON_CONFIG_FILE: &str = "blogauth.json";
const ENV_PREFIX: &str = "BLOGAUTH_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MIN_HASH_COST: u8 = 10;
const MAX_HASH_COST: u8 = 20;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("jwt_secret must not be empty")]
    MissingSecret,

    #[error("performance must be greater than zero")]
    ZeroPerformance,

    #[error("unknown log level: {0}")]
    LogLevel(String),

    #[error("hash_cost {0} is outside the supported range")]
    HashCost(u8),
}

/// Application settings
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Store location, a path optionally prefixed with `file://`
    pub database_url: String,
    /// Database name under `database_url`
    pub database_name: String,
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Percentage applied to every store deadline
    pub performance: u32,
    /// scrypt `log2(N)`
    pub hash_cost: u8,
    /// Log level
    pub log_level: String,
    /// CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9001)),
            database_url: "file://data".to_string(),
            database_name: "blog".to_string(),
            jwt_secret: String::new(),
            performance: 100,
            hash_cost: DEFAULT_HASH_COST,
            log_level: "info".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("database_name", &self.database_name)
            .field("jwt_secret", &"<redacted>")
            .field("performance", &self.performance)
            .field("hash_cost", &self.hash_cost)
            .field("log_level", &self.log_level)
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}

impl Settings {
    /// Load from `blogauth.toml`, `blogauth.json` and `BLOGAUTH_*` variables
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load with an explicit TOML file; missing files are skipped
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn figment(toml_path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(toml_path))
            .merge(Json::file(JSON_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.performance == 0 {
            return Err(ConfigError::ZeroPerformance);
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::LogLevel(self.log_level.clone()));
        }
        if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&self.hash_cost) {
            return Err(ConfigError::HashCost(self.hash_cost));
        }
        Ok(())
    }

    /// Deadline applied to each store call
    pub fn store_deadline(&self) -> StoreDeadline {
        StoreDeadline::from_performance(self.performance)
    }
}
