//! File change event types
//!
//! This module defines the events reported for resource files and the
//! bookkeeping the debouncer keeps per pending path.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Represents a change to a resource file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was created
    Created(PathBuf),
    /// File was modified
    Modified(PathBuf),
    /// File was deleted
    Deleted(PathBuf),
}

impl FileChange {
    /// Get the path associated with this change
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Modified(path) | Self::Deleted(path) => path,
        }
    }

    /// Check if this is a structural change (create/delete)
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Deleted(_))
    }

    /// Fold a later event for the same path into this one
    ///
    /// A file created and then written within one window is still a creation.
    /// A file created and deleted within one window is reported as deleted.
    pub fn merge(self, later: FileChange) -> FileChange {
        match (self, later) {
            (Self::Created(path), Self::Modified(_)) => Self::Created(path),
            (_, later) => later,
        }
    }
}

impl fmt::Display for FileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created(path) => write!(f, "created {}", path.display()),
            Self::Modified(path) => write!(f, "modified {}", path.display()),
            Self::Deleted(path) => write!(f, "deleted {}", path.display()),
        }
    }
}

/// Event with debounce metadata
#[derive(Debug, Clone)]
pub(crate) struct DebouncedEvent {
    /// The file change event
    pub event: FileChange,
    /// When the event was first detected
    pub first_seen: Instant,
    /// Number of times this event was aggregated
    pub occurrence_count: u32,
}

impl DebouncedEvent {
    pub fn new(event: FileChange) -> Self {
        Self {
            event,
            first_seen: Instant::now(),
            occurrence_count: 1,
        }
    }

    /// Update the event with a new occurrence
    pub fn update(&mut self, event: FileChange) {
        self.event = self.event.clone().merge(event);
        self.occurrence_count += 1;
    }

    pub fn age(&self) -> Duration {
        self.first_seen.elapsed()
    }
}
