//! Server configuration from TOML.
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! max_workers = 64
//! log_filter = "info,stout=debug"
//!
//! [app]
//! upload_dir = "/var/lib/uploads"
//! jwt.ttl_minutes = 30
//! ```
//!
//! Every top-level key is optional. The `[app]` table is free-form and read
//! with [`Config::setting`].

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("setting `{key}`: {source}")]
    Setting { key: String, source: toml::de::Error },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// IP address to listen on.
    pub host: String,
    pub port: u16,
    /// Upper bound on requests being handled at once.
    pub max_workers: usize,
    /// `tracing-subscriber` `EnvFilter` directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Application settings.
    pub app: toml::Table,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            max_workers: 64,
            log_filter: "info".to_owned(),
            app: toml::Table::new(),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
        content.parse()
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("host `{}` is not an IP address", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Reads a value from `[app]` by dotted key (`"jwt.ttl_minutes"`).
    ///
    /// `Ok(None)` if the key is absent; an error if it is present but does not
    /// deserialize as `T`.
    pub fn setting<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let mut parts = key.split('.');
        let mut value = parts.next().and_then(|k| self.app.get(k));
        for k in parts {
            value = value.and_then(|v| v.get(k));
        }

        match value {
            None => Ok(None),
            Some(value) => value
                .clone()
                .try_into()
                .map(Some)
                .map_err(|source| ConfigError::Setting { key: key.to_owned(), source }),
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::Invalid("max_workers must be at least 1".to_owned()));
        }
        self.addr()?;
        Ok(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str::<Self>(s)?.validate()
    }
}
