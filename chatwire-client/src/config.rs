//! Client-side configuration loading
//!
//! Reads the `[server]` and `[remotes]` tables from the shared config file.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use chatwire_utils::{ChatwireError, Result};

use crate::connection::{ConnectionConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT};

/// Default time to wait for a reply to a chat message
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Client configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server: ServerSection,
    /// Named shortcuts for `--addr`, e.g. `gpu-box = "tcp://10.0.0.7:7878"`
    pub remotes: HashMap<String, String>,
}

/// Which server to talk to and how patiently
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    pub response_timeout_ms: u64,
    pub await_welcome: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: DEFAULT_PORT,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT.as_millis() as u64,
            await_welcome: true,
        }
    }
}

impl ClientConfig {
    /// Load from the default config file
    ///
    /// Returns defaults if the file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        Self::load_from(&chatwire_utils::config_file())
    }

    /// Load from a specific path, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                tracing::debug!(
                    "Loaded config: server={}:{}, {} remote(s)",
                    config.server.host,
                    config.server.port,
                    config.remotes.len()
                );
                config
            }
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Read and parse a config file, reporting failures
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ChatwireError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| ChatwireError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve a remote alias to an address
    pub fn resolve_remote(&self, name: &str) -> Option<&str> {
        self.remotes.get(name).map(String::as_str)
    }

    /// Connection settings described by the `[server]` table
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(self.server.host.clone(), self.server.port)
            .with_connect_timeout(Duration::from_millis(self.server.connect_timeout_ms))
            .with_await_welcome(self.server.await_welcome)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.server.response_timeout_ms)
    }
}
