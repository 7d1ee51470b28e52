//! Core file system watcher implementation
//!
//! This module provides the main file watcher using the notify crate.

use crate::{config::WatcherConfig, debouncer::EventDebouncer, events::FileChange, ignore::IgnoreFilter};
use gav_core::error::{Error, Result};
use notify::{
    Config as NotifyConfig, Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode,
    Watcher as NotifyWatcher,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Main file system watcher
pub struct FileWatcher {
    /// Configuration
    config: Arc<WatcherConfig>,
    /// Ignore filter
    ignore_filter: Arc<IgnoreFilter>,
    /// Active notify watcher
    watcher: Option<RecommendedWatcher>,
    /// Paths being watched
    watched_paths: Arc<RwLock<Vec<PathBuf>>>,
    /// Cancellation token for stopping background tasks
    cancellation_token: CancellationToken,
}

impl FileWatcher {
    /// Create a new file watcher
    pub fn new(config: WatcherConfig) -> Result<Self> {
        let ignore_filter = IgnoreFilter::builder()
            .patterns(config.ignore_patterns.clone())
            .include_extensions(&config.extensions)
            .build()
            .map_err(|e| Error::watcher(format!("Failed to create ignore filter: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            ignore_filter: Arc::new(ignore_filter),
            watcher: None,
            watched_paths: Arc::new(RwLock::new(Vec::new())),
            cancellation_token: CancellationToken::new(),
        })
    }

    /// Start watching a directory
    ///
    /// The returned receiver yields one debounced [`FileChange`] per burst of
    /// activity on each resource file. It closes when the watcher is stopped
    /// or dropped.
    pub async fn watch(&mut self, path: impl AsRef<Path>) -> Result<mpsc::Receiver<FileChange>> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(Error::watcher(format!(
                "Cannot watch {}: not a directory",
                path.display()
            )));
        }

        let (notify_tx, notify_rx) = mpsc::channel(self.config.max_queue_size);
        let (debounced_tx, debounced_rx) = mpsc::channel(self.config.max_queue_size);

        let debouncer = EventDebouncer::new(self.config.debounce_duration(), debounced_tx);
        self.start_event_processor(notify_rx, debouncer);

        let mut watcher = self.init_watcher_with_retry(notify_tx).await?;
        self.add_watch_path(&mut watcher, &path)?;

        self.watcher = Some(watcher);
        self.watched_paths.write().await.push(path);

        Ok(debounced_rx)
    }

    /// Initialize notify watcher with retry logic
    async fn init_watcher_with_retry(
        &self,
        tx: mpsc::Sender<NotifyEvent>,
    ) -> Result<RecommendedWatcher> {
        let max_attempts = self.config.max_init_retries.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;

            match Self::create_notify_watcher(tx.clone()) {
                Ok(watcher) => {
                    debug!("File watcher initialized");
                    return Ok(watcher);
                }
                Err(e) if attempts < max_attempts => {
                    warn!(
                        "Failed to initialize watcher (attempt {}/{}): {}",
                        attempts, max_attempts, e
                    );
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
                Err(e) => {
                    error!("Failed to initialize watcher after {} attempts", attempts);
                    return Err(Error::watcher(format!(
                        "Watcher initialization failed: {e}"
                    )));
                }
            }
        }
    }

    /// Create a notify watcher
    fn create_notify_watcher(tx: mpsc::Sender<NotifyEvent>) -> Result<RecommendedWatcher> {
        RecommendedWatcher::new(
            move |res: std::result::Result<NotifyEvent, notify::Error>| match res {
                Ok(event) => {
                    if let Err(e) = tx.try_send(event) {
                        warn!("Dropping notify event: {}", e);
                    }
                }
                Err(e) => {
                    error!("Notify error: {}", e);
                }
            },
            NotifyConfig::default(),
        )
        .map_err(|e| Error::watcher(format!("Failed to create watcher: {e}")))
    }

    /// Add a path to watch
    fn add_watch_path(&self, watcher: &mut RecommendedWatcher, path: &Path) -> Result<()> {
        let mode = if self.config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        watcher
            .watch(path, mode)
            .map_err(|e| Error::watcher(format!("Failed to watch path {path:?}: {e}")))?;

        info!(
            "Watching {} for resource changes (recursive: {})",
            path.display(),
            self.config.recursive
        );
        Ok(())
    }

    /// Start the event processor
    fn start_event_processor(
        &self,
        mut notify_rx: mpsc::Receiver<NotifyEvent>,
        debouncer: EventDebouncer,
    ) {
        let ignore_filter = Arc::clone(&self.ignore_filter);
        let cancel_token = self.cancellation_token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        debug!("Event processor cancelled");
                        // Deliver changes still inside their debounce window
                        debouncer.flush().await;
                        break;
                    }
                    event = notify_rx.recv() => {
                        let Some(event) = event else {
                            break;
                        };
                        trace!("Received notify event: {:?}", event);
                        for change in Self::convert_notify_event(&event, &ignore_filter) {
                            debouncer.process_event(change);
                        }
                    }
                }
            }
            debug!("Event processor stopped");
        });
    }

    /// Convert notify event to FileChanges for every relevant path it names
    fn convert_notify_event(event: &NotifyEvent, ignore_filter: &IgnoreFilter) -> Vec<FileChange> {
        event
            .paths
            .iter()
            .filter(|path| !ignore_filter.should_ignore(path))
            .filter_map(|path| match event.kind {
                EventKind::Create(_) => Some(FileChange::Created(path.clone())),
                // Renames and truncating writes both surface as modify; the
                // path's existence tells which side of the change we are on
                EventKind::Modify(_) if path.exists() => Some(FileChange::Modified(path.clone())),
                EventKind::Modify(_) | EventKind::Remove(_) => {
                    Some(FileChange::Deleted(path.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Stop watching all paths
    pub async fn stop(&mut self) -> Result<()> {
        self.cancellation_token.cancel();
        if self.watcher.take().is_some() {
            self.watched_paths.write().await.clear();
            info!("File watcher stopped");
        }
        Ok(())
    }

    /// Get currently watched paths
    pub async fn watched_paths(&self) -> Vec<PathBuf> {
        self.watched_paths.read().await.clone()
    }

    /// Check if a path is being watched
    pub async fn is_watching(&self, path: &Path) -> bool {
        self.watched_paths
            .read()
            .await
            .iter()
            .any(|p| path.starts_with(p))
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup_test_watcher() -> (TempDir, FileWatcher) {
        let temp_dir = TempDir::new().expect("test setup failed");
        let watcher = FileWatcher::new(WatcherConfig::default()).expect("test setup failed");
        (temp_dir, watcher)
    }

    fn notify_event(kind: EventKind, paths: &[&Path]) -> NotifyEvent {
        paths
            .iter()
            .fold(NotifyEvent::new(kind), |event, p| event.add_path(p.to_path_buf()))
    }

    #[tokio::test]
    async fn test_watcher_initialization() {
        let (_temp_dir, watcher) = setup_test_watcher();
        assert!(watcher.watched_paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_watch_path() {
        let (temp_dir, mut watcher) = setup_test_watcher();
        let _rx = watcher.watch(temp_dir.path()).await.expect("test setup failed");

        let watched = watcher.watched_paths().await;
        assert_eq!(watched, vec![temp_dir.path().to_path_buf()]);
        assert!(watcher.is_watching(&temp_dir.path().join("gw.yaml")).await);
        assert!(!watcher.is_watching(Path::new("/other/path")).await);

        watcher.stop().await.expect("stop failed");
        assert!(watcher.watched_paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_watch_missing_dir_fails() {
        let (temp_dir, mut watcher) = setup_test_watcher();
        let result = watcher.watch(temp_dir.path().join("absent")).await;
        assert!(matches!(result, Err(Error::Watcher(_))));
    }

    #[test]
    fn test_convert_notify_event() {
        let temp_dir = TempDir::new().expect("test setup failed");
        let existing = temp_dir.path().join("routes.yaml");
        std::fs::write(&existing, "").expect("test setup failed");
        let gone = temp_dir.path().join("old.yaml");
        let ignored = temp_dir.path().join("README.md");

        let filter = IgnoreFilter::builder()
            .include_extensions(&["yaml".to_string()])
            .build()
            .expect("test setup failed");

        let created = FileWatcher::convert_notify_event(
            &notify_event(EventKind::Create(CreateKind::File), &[&existing, &ignored]),
            &filter,
        );
        assert_eq!(created, vec![FileChange::Created(existing.clone())]);

        let modified = FileWatcher::convert_notify_event(
            &notify_event(EventKind::Modify(ModifyKind::Any), &[&existing, &gone]),
            &filter,
        );
        assert_eq!(
            modified,
            vec![
                FileChange::Modified(existing.clone()),
                FileChange::Deleted(gone.clone())
            ]
        );

        let removed = FileWatcher::convert_notify_event(
            &notify_event(EventKind::Remove(RemoveKind::File), &[&gone]),
            &filter,
        );
        assert_eq!(removed, vec![FileChange::Deleted(gone)]);

        let access = FileWatcher::convert_notify_event(
            &notify_event(EventKind::Access(notify::event::AccessKind::Any), &[&existing]),
            &filter,
        );
        assert!(access.is_empty());
    }
}
