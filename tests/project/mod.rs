//! Project tests
//!
//! - Pass selection over the import graph
//! - Snapshots published by the host
//! - Loading module files from disk

pub mod tests_host;
pub mod tests_loader;
pub mod tests_passes;
