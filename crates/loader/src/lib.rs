//! Resource loading for the Gateway API coverage analyzer
//!
//! Reads Kubernetes-style YAML documents from disk and files every
//! supported resource into a [`ResourceSet`] ready for the graph builder.
//! Malformed entries are dropped here, with a warning, so the builder only
//! ever sees well-formed resources.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod load;
mod parse;

pub use load::{list_resource_files, load_dir, load_file};
pub use parse::{parse_documents, LIST_KIND};

pub use gav_core::error::{Error, Result};
pub use gav_core::ResourceSet;
