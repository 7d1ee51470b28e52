//! Event debouncing
//!
//! Each path gets its own timer, started by the first event seen for it.
//! Events arriving before the timer fires are folded into the pending one,
//! and a single [`FileChange`] is emitted once the window closes.

use crate::events::{DebouncedEvent, FileChange};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, trace};

/// Manages debouncing of file system events
pub struct EventDebouncer {
    /// Debounce window duration
    debounce_duration: Duration,
    /// Map of paths to pending events
    pending_events: Arc<DashMap<PathBuf, DebouncedEvent>>,
    /// Channel to send debounced events
    output_tx: mpsc::Sender<FileChange>,
}

impl EventDebouncer {
    /// Create a new event debouncer
    pub fn new(debounce_duration: Duration, output_tx: mpsc::Sender<FileChange>) -> Self {
        Self {
            debounce_duration,
            pending_events: Arc::new(DashMap::new()),
            output_tx,
        }
    }

    /// Process an incoming event
    pub fn process_event(&self, event: FileChange) {
        let path = event.path().to_path_buf();

        self.pending_events
            .entry(path.clone())
            .and_modify(|e| {
                trace!("Updating pending event for {:?}", path);
                e.update(event.clone());
            })
            .or_insert_with(|| {
                trace!("New pending event for {:?}", path);
                self.schedule(path.clone());
                DebouncedEvent::new(event.clone())
            });
    }

    /// Emit the pending event for `path` once the window has elapsed
    fn schedule(&self, path: PathBuf) {
        let pending_events = Arc::clone(&self.pending_events);
        let output_tx = self.output_tx.clone();
        let debounce_duration = self.debounce_duration;

        tokio::spawn(async move {
            sleep(debounce_duration).await;

            if let Some((_, pending)) = pending_events.remove(&path) {
                debug!(
                    "Emitting {} (aggregated {} events over {:?})",
                    pending.event,
                    pending.occurrence_count,
                    pending.age()
                );
                let _ = output_tx.send(pending.event).await;
            }
        });
    }

    /// Force flush all pending events
    pub async fn flush(&self) {
        debug!("Flushing {} pending events", self.pending_events.len());

        let paths: Vec<PathBuf> = self
            .pending_events
            .iter()
            .map(|entry| entry.key().clone())
            .collect();

        for path in paths {
            if let Some((_, pending)) = self.pending_events.remove(&path) {
                let _ = self.output_tx.send(pending.event).await;
            }
        }
    }

    /// Get the number of pending events
    pub fn pending_count(&self) -> usize {
        self.pending_events.len()
    }
}
