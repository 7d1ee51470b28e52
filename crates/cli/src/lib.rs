//! Library interface for the gav CLI
//!
//! This module exposes the report rendering used by `gav summary` so it can be
//! tested without spawning the binary.

pub mod report;

pub use report::render_summary;
