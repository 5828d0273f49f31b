//! Runner configuration.
//!
//! Layered in order: built-in defaults, an optional TOML file
//! (`--config` or `FUNNEL_CONFIG`), then `FUNNEL_*` environment variables.
//! The result is validated once at startup.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

pub const ENV_CONFIG: &str = "FUNNEL_CONFIG";
pub const ENV_STORE: &str = "FUNNEL_STORE";
pub const ENV_DATABASE_URL: &str = "FUNNEL_DATABASE_URL";
pub const ENV_REST_URL: &str = "FUNNEL_REST_URL";
pub const ENV_REST_API_KEY: &str = "FUNNEL_REST_API_KEY";
pub const ENV_RESULTS_TABLE: &str = "FUNNEL_RESULTS_TABLE";
pub const ENV_PERSIST_TIMEOUT_SECS: &str = "FUNNEL_PERSIST_TIMEOUT_SECS";
pub const ENV_LOG_JSON: &str = "FUNNEL_LOG_JSON";

pub const DEFAULT_RESULTS_TABLE: &str = "quiz_results";
pub const DEFAULT_PERSIST_TIMEOUT_SECS: u64 = 10;

static TABLE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("TABLE_NAME_RE regex should compile")
});

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("{key} is required when the results store is `{store}`")]
    MissingSetting { key: &'static str, store: StoreKind },

    #[error(
        "Invalid results table name {0:?}: expected lowercase letters, digits and underscores"
    )]
    InvalidTable(String),
}

impl ConfigError {
    fn invalid(key: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidValue {
            key,
            value: value.into(),
            reason,
        }
    }
}

/// Which results store backs persistence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Process-local; nothing survives the run.
    #[default]
    Memory,
    /// Direct PostgreSQL connection.
    Postgres,
    /// PostgREST-style HTTP endpoint.
    Rest,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
            Self::Rest => "rest",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "rest" | "postgrest" => Ok(Self::Rest),
            _ => Err(ConfigError::invalid(
                ENV_STORE,
                s,
                "expected memory, postgres or rest",
            )),
        }
    }
}

/// Shape of the optional TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    store: Option<StoreKind>,
    database_url: Option<String>,
    rest_url: Option<String>,
    rest_api_key: Option<String>,
    results_table: Option<String>,
    persist_timeout_secs: Option<u64>,
    log_json: Option<bool>,
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct FunnelConfig {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub rest_url: Option<String>,
    pub rest_api_key: Option<String>,
    pub results_table: String,
    pub persist_timeout: Duration,
    pub log_json: bool,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::Memory,
            database_url: None,
            rest_url: None,
            rest_api_key: None,
            results_table: DEFAULT_RESULTS_TABLE.to_string(),
            persist_timeout: Duration::from_secs(DEFAULT_PERSIST_TIMEOUT_SECS),
            log_json: false,
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for FunnelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunnelConfig")
            .field("store", &self.store)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("rest_url", &self.rest_url)
            .field("rest_api_key", &self.rest_api_key.as_ref().map(|_| "<redacted>"))
            .field("results_table", &self.results_table)
            .field("persist_timeout", &self.persist_timeout)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl FunnelConfig {
    /// Load from the process environment, reading `path` (or `FUNNEL_CONFIG`)
    /// as the TOML layer when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`FunnelConfig::load`] with an injectable environment lookup.
    pub fn load_with<F>(path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| lookup(ENV_CONFIG).map(PathBuf::from));
        if let Some(file) = file {
            config.apply_file(FileConfig::read(&file)?);
        }
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(store) = file.store {
            self.store = store;
        }
        if file.database_url.is_some() {
            self.database_url = file.database_url;
        }
        if file.rest_url.is_some() {
            self.rest_url = file.rest_url;
        }
        if file.rest_api_key.is_some() {
            self.rest_api_key = file.rest_api_key;
        }
        if let Some(table) = file.results_table {
            self.results_table = table;
        }
        if let Some(secs) = file.persist_timeout_secs {
            self.persist_timeout = Duration::from_secs(secs);
        }
        if let Some(json) = file.log_json {
            self.log_json = json;
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(store) = env(ENV_STORE) {
            self.store = store.parse()?;
        }
        if let Some(url) = env(ENV_DATABASE_URL) {
            self.database_url = Some(url);
        }
        if let Some(url) = env(ENV_REST_URL) {
            self.rest_url = Some(url);
        }
        if let Some(key) = env(ENV_REST_API_KEY) {
            self.rest_api_key = Some(key);
        }
        if let Some(table) = env(ENV_RESULTS_TABLE) {
            self.results_table = table.trim().to_string();
        }
        if let Some(secs) = env(ENV_PERSIST_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ConfigError::invalid(ENV_PERSIST_TIMEOUT_SECS, &secs, "expected whole seconds")
            })?;
            self.persist_timeout = Duration::from_secs(secs);
        }
        if let Some(json) = env(ENV_LOG_JSON) {
            self.log_json = parse_bool(ENV_LOG_JSON, &json)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !TABLE_NAME_RE.is_match(&self.results_table) {
            return Err(ConfigError::InvalidTable(self.results_table.clone()));
        }
        if self.persist_timeout.is_zero() {
            return Err(ConfigError::invalid(
                ENV_PERSIST_TIMEOUT_SECS,
                "0",
                "must be at least one second",
            ));
        }
        match self.store {
            StoreKind::Memory => {}
            StoreKind::Postgres if self.database_url.is_none() => {
                return Err(ConfigError::MissingSetting {
                    key: ENV_DATABASE_URL,
                    store: self.store,
                });
            }
            StoreKind::Postgres => {}
            StoreKind::Rest => {
                let url = self.rest_url.as_deref().ok_or(ConfigError::MissingSetting {
                    key: ENV_REST_URL,
                    store: self.store,
                })?;
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::invalid(
                        ENV_REST_URL,
                        url,
                        "expected an http(s) URL",
                    ));
                }
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected true or false")),
    }
}
