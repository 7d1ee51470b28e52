#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! Core types and graph construction for the Gateway API coverage analyzer
//!
//! This crate turns a snapshot of Gateway API resources into a coverage
//! graph showing which routes attach to which gateways and listeners, which
//! backend services they resolve to, and which cross-namespace references a
//! ReferenceGrant would authorize. It provides:
//!
//! - **Resources**: typed Gateways, Routes, Services, workloads and grants
//! - **Graph**: the node/edge/coverage output model
//! - **Builder**: the pure [`build_graph`] function
//! - **Configuration**: layered settings for the loader, watcher and server
//! - **Error handling**: unified error types
//!

pub mod builder;
pub mod config;
pub mod error;
pub mod grants;
pub mod graph;
pub mod resources;

// Re-export main types for convenience
pub use builder::{build_coverage_graph, build_graph};
pub use config::{Config, DataConfig, ServerConfig, WatcherConfig};
pub use error::{Error, Result, ResultExt};
pub use grants::grant_allows;
pub use graph::{
    BackendResolution, CoverageGraph, CoverageSummary, EdgeData, EdgeType, GraphEdge, GraphNode,
    NodeData, NodeType, ResourceRef, RouteCoverageDetail,
};
pub use resources::{Resource, ResourceSet, Route, RouteKind, Workload, WorkloadKind};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::build_graph;
    pub use crate::config::Config;
    pub use crate::error::{Result, ResultExt};
    pub use crate::graph::CoverageGraph;
    pub use crate::resources::ResourceSet;
}
