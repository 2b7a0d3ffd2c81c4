use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shorturl_store::StoreConfig;

use crate::error::{ServerError, ServerResult};

/// Longest URL accepted by the shorten endpoint, in bytes.
pub const DEFAULT_MAX_URL_LEN: usize = 2048;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Prefix for returned short links. Derived from the `Host` header when unset.
    pub base_url: Option<String>,
    pub max_url_len: usize,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            base_url: None,
            max_url_len: DEFAULT_MAX_URL_LEN,
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
