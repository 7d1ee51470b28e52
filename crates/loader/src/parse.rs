//! Multi-document YAML parsing

use gav_core::error::{Error, Result};
use gav_core::Resource;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, warn};

/// `kind` of a kubectl-style wrapper whose `items` are resources
pub const LIST_KIND: &str = "List";

/// Parse every document in `text`, keeping the supported resources
///
/// `source` names the origin (usually a file path) in logs and errors.
/// Documents without a supported `kind` are skipped. A supported kind that
/// does not match its typed shape, has an empty name, or is a route with an
/// unnamed parent or backend reference, is skipped with a warning. Only invalid YAML fails the whole call.
pub fn parse_documents(source: &str, text: &str) -> Result<Vec<Resource>> {
    let mut resources = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = Value::deserialize(document)
            .map_err(|e| Error::parse(source, format!("document {index}: {e}")))?;
        collect(source, index, value, &mut resources);
    }

    debug!("Parsed {} resources from {source}", resources.len());
    Ok(resources)
}

fn collect(source: &str, index: usize, value: Value, out: &mut Vec<Resource>) {
    let Some(kind) = value.get("kind").and_then(Value::as_str).map(str::to_string) else {
        if !value.is_null() {
            debug!("Skipping document {index} in {source}: no kind");
        }
        return;
    };

    if kind == LIST_KIND {
        if let Value::Mapping(mut list) = value {
            if let Some(Value::Sequence(items)) = list.remove("items") {
                for item in items {
                    collect(source, index, item, out);
                }
            }
        }
        return;
    }

    if !Resource::is_known_kind(&kind) {
        debug!("Skipping document {index} in {source}: unsupported kind {kind}");
        return;
    }

    match serde_yaml::from_value::<Resource>(value) {
        Ok(resource) if resource.metadata().name.trim().is_empty() => {
            warn!("Skipping {kind} in {source} (document {index}): metadata.name is empty");
        }
        Ok(resource) => match resource.unnamed_ref() {
            Some(reference) => warn!(
                "Skipping {kind} {} in {source} (document {index}): {reference} without a name",
                resource.metadata().name
            ),
            None => out.push(resource),
        },
        Err(e) => {
            warn!("Skipping malformed {kind} in {source} (document {index}): {e}");
        }
    }
}
