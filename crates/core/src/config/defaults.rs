//! Default values and functions for configuration

use std::path::PathBuf;

// Default constants
pub(crate) const DEFAULT_DATA_DIR: &str = "data";
pub(crate) const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub(crate) const DEFAULT_SERVER_PORT: u16 = 4000;

pub(crate) fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

pub(crate) fn default_extensions() -> Vec<String> {
    vec!["yaml".to_string(), "yml".to_string()]
}

pub(crate) fn default_watch_enabled() -> bool {
    true
}

pub(crate) fn default_debounce_ms() -> u64 {
    250
}

pub(crate) fn default_ignore_patterns() -> Vec<String> {
    vec![
        "*.swp".to_string(),
        "*.tmp".to_string(),
        "*~".to_string(),
        ".#*".to_string(),
        "#*#".to_string(),
    ]
}

pub(crate) fn default_server_host() -> String {
    DEFAULT_SERVER_HOST.to_string()
}

pub(crate) fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

pub(crate) fn default_keep_alive_secs() -> u64 {
    30
}

pub(crate) fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

pub(crate) fn default_broadcast_capacity() -> usize {
    16
}
