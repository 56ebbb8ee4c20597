//! Configuration manager for Chatbrewery.
//!
//! Values are read from `config.yaml`, then overridden by environment
//! variables.

use std::env;
use std::fs::File;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("`{key}` must be a port number")]
    Port {
        key: &'static str,
        source: ParseIntError,
    },
    #[error("listen address is not an IP address")]
    Address(#[from] AddrParseError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// IP address the HTTP server binds to.
    pub address: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Install a Prometheus recorder and expose `/metrics`.
    pub metrics: bool,
    #[serde(skip_deserializing)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to PostgreSQL configuration.
    pub postgres: Postgres,
    /// Related to Argon2 configuration.
    #[serde(skip_serializing)]
    pub argon2: Option<Argon2>,
    /// Where pages and static files live.
    pub assets: Assets,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_CRATE_NAME").into(),
            address: "0.0.0.0".into(),
            port: 8080,
            metrics: false,
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            postgres: Postgres::default(),
            argon2: None,
            assets: Assets::default(),
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Postgres {
    /// Hostname of PostgreSQL instance.
    pub host: String,
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Username credential to connect.
    pub username: String,
    /// Password credential to connect.
    #[serde(skip_serializing)]
    pub password: String,
    /// Maximum pool connections.
    pub pool_size: u32,
}

impl Default for Postgres {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5432,
            database: crate::database::DEFAULT_DATABASE_NAME.into(),
            username: crate::database::DEFAULT_CREDENTIALS.into(),
            password: crate::database::DEFAULT_CREDENTIALS.into(),
            pool_size: crate::database::DEFAULT_POOL_SIZE,
        }
    }
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Argon2 {
    /// Memory used while hashing, in KiB.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
    /// Output hash length.
    pub hash_length: usize,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
            hash_length: 32,
        }
    }
}

/// Directories served or read by the web pages.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Assets {
    /// Directory holding `index.html`.
    pub templates: PathBuf,
    /// Served under `/static`.
    pub static_files: PathBuf,
    /// Served under `/images`.
    pub images: PathBuf,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            templates: "templates".into(),
            static_files: "static".into(),
            images: "images".into(),
        }
    }
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Running crate version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location, then applies environment overrides.
    pub fn read(self) -> Result<Arc<Self>, ConfigError> {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        let config = match File::open(&file_path) {
            Ok(file) => match serde_yaml::from_reader::<_, Configuration>(file) {
                Ok(mut config) => {
                    tracing::info!(path = %file_path.display(), "configuration loaded");
                    config.version = VERSION.to_owned();
                    config.path = file_path;
                    config
                },
                Err(err) => self.error(err),
            },
            Err(err) => self.error(err),
        };

        Ok(Arc::new(config.with_env()?))
    }

    /// Override values with `LISTEN_ADDRESS`, `PORT` and `POSTGRES_*`
    /// environment variables.
    pub fn with_env(mut self) -> Result<Self, ConfigError> {
        if let Some(address) = env_string("LISTEN_ADDRESS") {
            self.address = address;
        }
        if let Some(port) = env_port("PORT")? {
            self.port = port;
        }
        if let Some(host) = env_string("POSTGRES_HOST") {
            self.postgres.host = host;
        }
        if let Some(port) = env_port("POSTGRES_PORT")? {
            self.postgres.port = port;
        }
        if let Some(database) = env_string("POSTGRES_DATABASE") {
            self.postgres.database = database;
        }
        if let Some(username) = env_string("POSTGRES_USER") {
            self.postgres.username = username;
        }
        if let Some(password) = env_string("POSTGRES_PASSWORD") {
            self.postgres.password = password;
        }

        Ok(self)
    }

    /// Socket address the HTTP server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.address.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, path = %self.path.display(), "`config.yaml` file not usable, falling back to defaults");
        Self {
            path: self.path.clone(),
            ..Default::default()
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn env_port(key: &'static str) -> Result<Option<u16>, ConfigError> {
    env_string(key)
        .map(|value| {
            value
                .parse()
                .map_err(|source| ConfigError::Port { key, source })
        })
        .transpose()
}
