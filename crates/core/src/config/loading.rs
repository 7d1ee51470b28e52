//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::{Path, PathBuf};

use super::defaults::*;
use super::{Config, LOCAL_CONFIG_FILE};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `GAV_` and use double underscores
    /// for nested values. For example:
    /// - `GAV_SERVER__PORT=8080`
    /// - `GAV_DATA__DIR=/srv/gateway-config`
    ///
    /// The unprefixed `DATA_DIR` and `PORT` variables are honoured as well and
    /// take precedence over everything else.
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        let builder = set_config_default(builder, "data.dir", DEFAULT_DATA_DIR)?;
        let builder = set_config_default(builder, "server.host", DEFAULT_SERVER_HOST)?;
        let mut builder =
            set_config_default(builder, "server.port", i64::from(DEFAULT_SERVER_PORT))?;

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("GAV")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(dir) = std::env::var("DATA_DIR") {
            builder = builder
                .set_override("data.dir", dir)
                .map_err(|e| Error::config(format!("Failed to set DATA_DIR: {e}")))?;
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                builder = builder
                    .set_override("server.port", i64::from(port_num))
                    .map_err(|e| Error::config(format!("Failed to set PORT: {e}")))?;
            }
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (`--config` path, else `./gav.toml` when present)
    /// 3. Environment variables (`GAV_*`, then `DATA_DIR` / `PORT`)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => PathBuf::from(LOCAL_CONFIG_FILE),
        };
        Self::from_file(&path)
    }
}
