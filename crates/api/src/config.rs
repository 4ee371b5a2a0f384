use std::net::SocketAddr;

use thiserror::Error;

use stockledger_infra::StoreConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ApiConfigError {
    #[error("BIND_ADDR must be a socket address, got {0:?}")]
    BindAddr(String),

    #[error(transparent)]
    Store(#[from] stockledger_infra::ConfigError),
}

/// Process configuration for the API binary.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
}

impl ApiConfig {
    /// `BIND_ADDR` (default `0.0.0.0:8080`) plus the store variables read by
    /// [`StoreConfig::from_env`].
    pub fn from_env() -> Result<Self, ApiConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiConfigError> {
        let raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw
            .trim()
            .parse()
            .map_err(|_| ApiConfigError::BindAddr(raw.clone()))?;

        Ok(Self {
            bind_addr,
            store: StoreConfig::from_lookup(lookup)?,
        })
    }
}
