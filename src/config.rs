//! Configuration manager for bartr.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TRANSACTION_TIMEOUT_MS: u64 = 5_000;
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to swipe matching.
    #[serde(default)]
    pub matching: Matching,
    /// Related to logs, traces and metrics export.
    #[serde(default, skip_serializing)]
    pub telemetry: Telemetry,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_owned(),
            port: DEFAULT_PORT,
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            postgres: None,
            matching: Matching::default(),
            telemetry: Telemetry::default(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Which of the swiping user's items are checked for reciprocity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateScope {
    /// Every item the swiping user owns.
    #[default]
    All,
    /// Only owned items the swiping user has not swiped on themself.
    Unswiped,
}

/// Matching engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matching {
    #[serde(default)]
    pub candidate_scope: CandidateScope,
    /// Deadline of a single match transaction, in milliseconds.
    #[serde(default = "default_transaction_timeout")]
    pub transaction_timeout_ms: u64,
}

impl Default for Matching {
    fn default() -> Self {
        Self {
            candidate_scope: CandidateScope::default(),
            transaction_timeout_ms: DEFAULT_TRANSACTION_TIMEOUT_MS,
        }
    }
}

fn default_transaction_timeout() -> u64 {
    DEFAULT_TRANSACTION_TIMEOUT_MS
}

/// Telemetry configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// OTLP gRPC endpoint receiving traces and logs.
    pub otlp_endpoint: Option<String>,
    /// Expose Prometheus metrics on `/metrics`.
    #[serde(default)]
    pub metrics: bool,
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Parse the `config.yaml` file from the specified path or the default
    /// location.
    pub fn load(self) -> Result<Self, ConfigError> {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        let file = File::open(&file_path).map_err(|source| ConfigError::Open {
            path: file_path.clone(),
            source,
        })?;
        let mut config = serde_yaml::from_reader::<_, Configuration>(file)
            .map_err(|source| ConfigError::Parse {
                path: file_path.clone(),
                source,
            })?;

        // set app version.
        config.version = VERSION.to_owned();
        config.path = file_path;

        Ok(config)
    }

    /// Reads the configuration, falling back to defaults when it cannot be
    /// loaded.
    pub fn read(self) -> Arc<Self> {
        match self.load() {
            Ok(config) => Arc::new(config),
            Err(err) => Arc::new(Self::fallback(err)),
        }
    }

    /// Return a default configuration as fallback.
    pub fn fallback(err: ConfigError) -> Self {
        tracing::error!(error = %err, "`config.yaml` file could not be loaded");
        Self {
            version: VERSION.to_owned(),
            ..Default::default()
        }
    }
}

/// Configuration file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot open `{}`: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}
