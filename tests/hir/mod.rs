//! Semantic model tests
//!
//! - Duplicate definitions and the module name space
//! - Unresolved references and sibling checking
//! - Deferred classification across edits
//! - Configurable checks

pub mod tests_checks;
pub mod tests_scenarios;
