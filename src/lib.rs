//! # ttcn-base
//!
//! Incremental semantic analysis for TTCN-3 style test description modules.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project     → Project, AnalysisHost snapshots, directory loading
//!   ↓
//! incremental → Damage regions, SyntaxDamage escalation, in-place reparse
//!   ↓
//! hir         → Assignments, scopes, resolution, classification, checks
//!   ↓
//! syntax      → Syntax elements with locations and boundary tokens
//!   ↓
//! parser      → Logos lexer, recursive-descent parser
//!   ↓
//! base        → Primitives (FileId, Identifier, Location, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → hir → incremental → project)
// ============================================================================

/// Foundation types: FileId, Identifier, Location
pub mod base;

/// Parser: Logos lexer, recursive-descent parser
pub mod parser;

/// Syntax elements produced by the parser
pub mod syntax;

/// High-level IR: semantic model, checks and diagnostics
pub mod hir;

/// Incremental re-parsing after edits
pub mod incremental;

/// Project management: files, passes, snapshots, loading
pub mod project;

// Re-export foundation types
pub use base::{FileId, Identifier, LineCol, LineIndex, Location, TextRange, TextSize};

// Re-export the entry points
pub use hir::{AnalysisConfig, CompilationTimeStamp, Diagnostic, Severity};
pub use incremental::{ReparseOutcome, SyntaxDamage, TextEdit};
pub use project::{AnalysisHost, PassReport, Project, ProjectError, ProjectLoader, ProjectSnapshot};
