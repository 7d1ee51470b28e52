//! Loading resource documents from the filesystem

use crate::parse::parse_documents;
use gav_core::config::DataConfig;
use gav_core::error::{Error, Result, ResultExt};
use gav_core::ResourceSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Files under `config.dir` carrying a resource extension, sorted by path
///
/// Only the top level is listed unless `config.recursive` is set.
pub fn list_resource_files(config: &DataConfig) -> Result<Vec<PathBuf>> {
    if !config.dir.is_dir() {
        return Err(Error::config(format!(
            "Data path {} is not a directory",
            config.dir.display()
        )));
    }

    let max_depth = if config.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(&config.dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(Error::with_context(
                    format!("Failed to read data directory {}", config.dir.display()),
                    e,
                ));
            }
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {e}", config.dir.display());
                continue;
            }
        };

        if entry.file_type().is_file() && config.has_resource_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Load every resource document under the configured data directory
///
/// A missing directory yields an empty set; a path that exists but is not a
/// directory is an error. Files that cannot be read or are not valid YAML
/// are skipped with a warning.
pub fn load_dir(config: &DataConfig) -> Result<ResourceSet> {
    if !config.dir.exists() {
        warn!(
            "Data directory {} does not exist, using an empty resource set",
            config.dir.display()
        );
        return Ok(ResourceSet::new());
    }

    let files = list_resource_files(config)?;
    let mut resources = ResourceSet::new();
    let mut skipped = 0usize;

    for path in &files {
        match load_file(path) {
            Ok(set) => merge(&mut resources, set),
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                skipped += 1;
            }
        }
    }

    info!(
        "Loaded {} resources from {} files in {} ({} skipped)",
        resources.len(),
        files.len() - skipped,
        config.dir.display(),
        skipped
    );
    Ok(resources)
}

/// Load the resources in a single YAML file
pub fn load_file(path: &Path) -> Result<ResourceSet> {
    let text = std::fs::read_to_string(path)
        .context(format!("Failed to read {}", path.display()))?;
    let resources = parse_documents(&path.display().to_string(), &text)?;
    debug!("{}: {} resources", path.display(), resources.len());
    Ok(resources.into_iter().collect())
}

fn merge(into: &mut ResourceSet, from: ResourceSet) {
    into.gateways.extend(from.gateways);
    into.routes.extend(from.routes);
    into.services.extend(from.services);
    into.deployments.extend(from.deployments);
    into.stateful_sets.extend(from.stateful_sets);
    into.daemon_sets.extend(from.daemon_sets);
    into.gateway_classes.extend(from.gateway_classes);
    into.reference_grants.extend(from.reference_grants);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_merge_appends_in_order() {
        let mut a: ResourceSet = crate::parse_documents("a", "kind: Service\nmetadata: { name: one }\n")
            .unwrap()
            .into_iter()
            .collect();
        let b: ResourceSet = crate::parse_documents("b", "kind: Service\nmetadata: { name: two }\n")
            .unwrap()
            .into_iter()
            .collect();
        merge(&mut a, b);

        let names: Vec<_> = a.services.iter().map(|s| s.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn test_list_respects_recursion_flag() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("top.yaml"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/inner.yml"), "").unwrap();

        let mut config = DataConfig {
            dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        assert_eq!(list_resource_files(&config).unwrap().len(), 1);

        config.recursive = true;
        assert_eq!(list_resource_files(&config).unwrap().len(), 2);
    }
}
