//! Configuration types for the file watcher
//!
//! This module provides immutable configuration structures for controlling
//! which files are reported and how bursts of events are debounced.

use gav_core::config::{DataConfig, WatcherConfig as WatcherSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable configuration for the file watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Debounce window in milliseconds (default: 250ms)
    pub debounce_ms: u64,
    /// Patterns to ignore (glob patterns)
    pub ignore_patterns: Vec<String>,
    /// File extensions to report (empty means all)
    pub extensions: Vec<String>,
    /// Watch subdirectories as well (default: false)
    pub recursive: bool,
    /// Maximum number of events in queue (default: 1024)
    pub max_queue_size: usize,
    /// Maximum attempts to create the OS watcher (default: 3)
    pub max_init_retries: u32,
    /// Delay between init attempts in milliseconds (default: 500ms)
    pub retry_delay_ms: u64,
}

impl WatcherConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from builder
    pub fn builder() -> WatcherConfigBuilder {
        WatcherConfigBuilder::default()
    }

    /// Watcher configuration for a resource directory
    ///
    /// Reports only files the loader would read, at the depth it would read them.
    pub fn for_data_dir(settings: &WatcherSettings, data: &DataConfig) -> Self {
        Self::builder()
            .debounce_ms(settings.debounce_ms)
            .ignore_patterns(settings.ignore_patterns.clone())
            .extensions(data.extensions.clone())
            .recursive(data.recursive)
            .build()
    }

    /// Get the debounce duration
    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Get default ignore patterns for editor temporary files
    pub fn default_ignore_patterns() -> Vec<String> {
        vec![
            "*.tmp".to_string(),
            "*.tmp.*".to_string(), // VS Code temp files: file.yaml.tmp.12345.67890
            ".*.sw?".to_string(),  // Vim swap files: .file.swp, .file.swo
            "*.swp".to_string(),
            "*~".to_string(),
            "*.bak".to_string(),
            "#*#".to_string(), // Emacs auto-save files
            ".#*".to_string(), // Emacs lock files
            "4913".to_string(),
            ".DS_Store".to_string(),
        ]
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            ignore_patterns: Self::default_ignore_patterns(),
            extensions: vec!["yaml".to_string(), "yml".to_string()],
            recursive: false,
            max_queue_size: 1024,
            max_init_retries: 3,
            retry_delay_ms: 500,
        }
    }
}

/// Builder for WatcherConfig
#[derive(Debug, Default)]
pub struct WatcherConfigBuilder {
    config: WatcherConfig,
}

impl WatcherConfigBuilder {
    /// Set debounce window in milliseconds
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    /// Set ignore patterns
    pub fn ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.ignore_patterns = patterns;
        self
    }

    /// Add an ignore pattern
    pub fn add_ignore_pattern(mut self, pattern: String) -> Self {
        self.config.ignore_patterns.push(pattern);
        self
    }

    /// Set the reported file extensions
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.extensions = extensions;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.recursive = recursive;
        self
    }

    /// Set maximum queue size
    pub fn max_queue_size(mut self, size: usize) -> Self {
        self.config.max_queue_size = size;
        self
    }

    pub fn max_init_retries(mut self, retries: u32) -> Self {
        self.config.max_init_retries = retries;
        self
    }

    /// Build the configuration
    pub fn build(self) -> WatcherConfig {
        self.config
    }
}
