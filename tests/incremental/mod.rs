//! Incremental re-parsing tests
//!
//! - Edits inside one definition
//! - Edits across definition boundaries
//! - Escalation to a full re-parse
//! - Growth of the damage region

pub mod tests_edits;
pub mod tests_growth;
