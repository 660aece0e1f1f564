//! High-level IR (HIR): the semantic model and its checks.
//!
//! Parsed modules are lowered into per-module arenas of [`Assignment`]s and
//! [`Scope`]s owned by a [`Database`]. Checking is memoized per node with
//! [`CheckMemo`] stamps issued by a [`TimestampAuthority`]: a node already
//! checked at a pass stamp is skipped, so a pass only does work for nodes
//! that were re-created or have not been visited yet.
//!
//! ## Key Types
//!
//! - [`Database`]: every module of a project, by [`ModuleId`]
//! - [`Assignment`] / [`AssignmentKind`]: one named definition
//! - [`Scope`] / [`DuplicateIndex`]: lexical containers and their name index
//! - [`Resolver`]: name lookup through scopes, imports and builtins
//! - [`Classifier`]: deferred classification of ambiguous definitions
//! - [`Checker`]: the semantic checks of one pass
//! - [`DependencySelector`]: which modules a change forces to re-check
//!
//! ## Pass Layers
//!
//! ```text
//! lower_module(syntax)        ← arenas of assignments and scopes
//!     │
//!     ▼
//! ImportGraph / selector      ← invalidated modules + their importers
//!     │
//!     ▼
//! Checker::check_module(id)   ← uniqueness, resolution, classification
//!     │
//!     ▼
//! DiagnosticStore             ← findings keyed by the node that made them
//! ```

mod arena;
mod assignment;
mod builtins;
mod chain;
mod check;
mod classify;
mod config;
mod db;
mod dependencies;
mod diagnostics;
mod ids;
mod lower;
mod module;
mod resolve;
mod scope;
mod timestamp;
mod uniqueness;

pub use arena::{Arena, Id};
pub use assignment::{
    AmbiguousAssignment, AmbiguousForm, Assignment, AssignmentKind, BehaviourDefinition,
    ClassificationError, ClassificationState, KindTag, TypeDefinition, ValueDefinition,
    ValueOrigin, VariableDefinition,
};
pub use builtins::{builtin, builtin_names, is_builtin};
pub use chain::{ChainMark, CircularReference, ReferenceChain};
pub use check::Checker;
pub use classify::Classifier;
pub use config::{AnalysisConfig, NamingConventions};
pub use db::Database;
pub use dependencies::{DependencySelector, ImportGraph, check_order};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, DiagnosticOwner, DiagnosticSink, DiagnosticStore, OwnerSink,
    Pairing, RelatedInfo, Severity, codes,
};
pub use ids::{AssignmentId, AssignmentRef, ModuleId, ScopeId, ScopeRef};
pub use lower::{Lowerer, lower_module};
pub use module::{
    AttributesItem, ControlItem, DefinitionItem, GroupItem, ImportItem, Item, ModuleData,
};
pub use resolve::{ResolveResult, Resolver};
pub use scope::{BlockEntry, Scope, ScopeKind};
pub use timestamp::{CheckMemo, CompilationTimeStamp, TimestampAuthority};
pub use uniqueness::{DuplicateIndex, DuplicatePair};
