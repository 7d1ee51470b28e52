#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! File system watching for live graph rebuilds
//!
//! This crate watches the resource directory and reports changes to YAML
//! documents with:
//! - Per-path debouncing so an editor save produces one event
//! - Glob ignore patterns for editor temp and swap files
//! - Extension filtering so only resource documents are reported
//!
//! # Example
//!
//! ```no_run
//! use gav_watcher::{FileWatcher, WatcherConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WatcherConfig::builder().debounce_ms(250).build();
//! let mut watcher = FileWatcher::new(config)?;
//!
//! let mut events = watcher.watch("data").await?;
//! while let Some(change) = events.recv().await {
//!     println!("Resource file changed: {change}");
//! }
//! # Ok(())
//! # }
//! ```

// Private implementation modules
mod config;
mod debouncer;
mod events;
mod ignore;
mod watcher;

// Public exports - minimal API surface
pub use config::{WatcherConfig, WatcherConfigBuilder};
pub use debouncer::EventDebouncer;
pub use events::FileChange;
pub use ignore::IgnoreFilter;
pub use watcher::FileWatcher;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::WatcherConfig;
    pub use crate::events::FileChange;
    pub use crate::watcher::FileWatcher;
}
