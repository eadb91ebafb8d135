//! Layered client configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables with the `SKILLSWAP_` prefix (`__` separates
//!    sections, e.g. `SKILLSWAP_API__BASE_URL`)
//! 2. `skillswap.toml` in the working directory
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pagination::DEFAULT_PAGE_SIZE;

pub const CONFIG_FILE: &str = "skillswap.toml";
pub const ENV_PREFIX: &str = "SKILLSWAP_";
pub const DOTENV_FILE: &str = ".env";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to load dotenv file at {}: {source}", path.display())]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Route handed to the `Navigator` after a 401.
    pub login_route: String,
    /// When set, the bearer token is persisted here instead of in memory.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_route: "/login".to_string(),
            token_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PagingConfig {
    pub page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub paging: PagingConfig,
}

impl ClientConfig {
    /// Load from defaults, `skillswap.toml`, and `SKILLSWAP_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`ClientConfig::load`], reading `.env` from the working directory
    /// into the process first. A missing file is fine; a malformed one is not.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let path = Path::new(DOTENV_FILE);
        if path.exists() {
            dotenvy::from_path(path).map_err(|source| ConfigError::Dotenv {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Self::load()
    }

    /// The provider chain, exposed so callers can merge extra layers.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: format!("expected an http(s) URL, got '{url}'"),
            });
        }
        if self.paging.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "paging.page_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.auth.login_route.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "auth.login_route".to_string(),
                reason: "must start with '/'".to_string(),
            });
        }
        Ok(())
    }
}
