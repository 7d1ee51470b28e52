//! File ignore pattern matching
//!
//! Decides which paths under the watched directory are worth reporting:
//! glob ignore patterns are checked against both the file name and the
//! full path, then the extension must be one the loader reads.

use glob::{Pattern, PatternError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

/// Manages file ignore patterns and extension filtering
///
/// By default, ignores nothing.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    /// Glob patterns to ignore
    patterns: Arc<Vec<Pattern>>,
    /// Lower-cased extensions to report (empty means all)
    include_extensions: Arc<HashSet<String>>,
}

impl IgnoreFilter {
    /// Create a new ignore filter that ignores nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter from patterns
    pub fn from_patterns(patterns: &[String]) -> Result<Self, PatternError> {
        Self::builder().patterns(patterns.to_vec()).build()
    }

    /// Create with builder pattern
    pub fn builder() -> IgnoreFilterBuilder {
        IgnoreFilterBuilder::default()
    }

    /// Check if a path should be ignored
    pub fn should_ignore(&self, path: &Path) -> bool {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        let full_path = path.to_string_lossy();

        if let Some(pattern) = self
            .patterns
            .iter()
            .find(|p| p.matches(&file_name) || p.matches(&full_path))
        {
            trace!("Path {:?} matches ignore pattern {}", path, pattern.as_str());
            return true;
        }

        if self.include_extensions.is_empty() {
            return false;
        }

        let included = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.include_extensions.contains(&ext));
        if !included {
            trace!("Ignoring non-resource file: {:?}", path);
        }
        !included
    }
}

/// Builder for IgnoreFilter
#[derive(Debug, Default)]
pub struct IgnoreFilterBuilder {
    patterns: Vec<String>,
    include_extensions: HashSet<String>,
}

impl IgnoreFilterBuilder {
    /// Add a glob pattern to ignore
    pub fn add_pattern(mut self, pattern: String) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Add multiple patterns
    pub fn patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    /// Only report files with these extensions (will be converted to lowercase)
    pub fn include_extensions(mut self, extensions: &[String]) -> Self {
        self.include_extensions = extensions.iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Build the ignore filter
    pub fn build(self) -> Result<IgnoreFilter, PatternError> {
        let compiled_patterns = self
            .patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(IgnoreFilter {
            patterns: Arc::new(compiled_patterns),
            include_extensions: Arc::new(self.include_extensions),
        })
    }
}
