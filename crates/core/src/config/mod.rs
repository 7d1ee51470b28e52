//! Configuration module for gav
//!
//! Configuration can be loaded from a TOML file and/or environment variables.
//! Every section and field has a default, so an absent file is not an error.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use defaults::*;

/// Name of the config file picked up from the working directory
pub const LOCAL_CONFIG_FILE: &str = "gav.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where resource documents are read from
    #[serde(default)]
    pub data: DataConfig,

    /// File watcher configuration
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Configuration for the resource directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding YAML resource documents
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    /// File extensions treated as resource documents
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Descend into subdirectories (default: top level only)
    #[serde(default)]
    pub recursive: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            extensions: default_extensions(),
            recursive: false,
        }
    }
}

impl DataConfig {
    /// Whether a path carries one of the configured extensions
    pub fn has_resource_extension(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Configuration for file watching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Rebuild the graph when the data directory changes
    #[serde(default = "default_watch_enabled")]
    pub enabled: bool,

    /// Debounce time in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Patterns to ignore
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: default_watch_enabled(),
            debounce_ms: default_debounce_ms(),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Interval between keep-alive pings on event streams
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Allowed CORS origins (empty = disabled, ["*"] = all origins)
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Graph snapshots buffered per event-stream subscriber
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            keep_alive_secs: default_keep_alive_secs(),
            allowed_origins: default_allowed_origins(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.data.extensions.is_empty() {
            return Err(Error::config(
                "data.extensions must list at least one extension".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(Error::config(
                "server.port must be greater than 0".to_string(),
            ));
        }

        if self.server.keep_alive_secs == 0 {
            return Err(Error::config(
                "server.keep_alive_secs must be greater than 0".to_string(),
            ));
        }

        if self.server.broadcast_capacity == 0 {
            return Err(Error::config(
                "server.broadcast_capacity must be greater than 0".to_string(),
            ));
        }

        for pattern in &self.watcher.ignore_patterns {
            glob::Pattern::new(pattern).map_err(|e| {
                Error::config(format!("Invalid watcher ignore pattern '{pattern}': {e}"))
            })?;
        }

        Ok(())
    }
}
