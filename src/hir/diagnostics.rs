//! Diagnostics: Semantic error reporting.
//!
//! Findings are never returned as `Err`: checks record them as
//! [`Diagnostic`] values. The [`DiagnosticStore`] keeps them per owner (a
//! file, module, scope or assignment) so re-checking one owner replaces
//! exactly the diagnostics that owner produced.

use std::sync::Arc;

use indexmap::IndexMap;
use text_size::{TextRange, TextSize};

use super::ids::{AssignmentRef, ModuleId, ScopeRef};
use crate::base::{FileId, LineIndex, Location, Shift};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

/// Role of a diagnostic in a duplicate-definition pair, so hosts can
/// render the two halves as linked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pairing {
    /// "first declared here"
    First,
    /// "declared again here"
    Repeated,
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: Location,
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub pairing: Option<Pairing>,
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub location: Location,
    pub message: Arc<str>,
}

impl RelatedInfo {
    pub fn new(location: Location, message: impl Into<Arc<str>>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

impl Diagnostic {
    pub fn new(severity: Severity, location: Location, message: impl Into<Arc<str>>) -> Self {
        Self {
            location,
            severity,
            code: None,
            message: message.into(),
            pairing: None,
            related: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(location: Location, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, location, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(location: Location, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, location, message)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn with_pairing(mut self, pairing: Pairing) -> Self {
        self.pairing = Some(pairing);
        self
    }

    /// `line:col: severity[code]: message`, 1-based for humans.
    pub fn render(&self, index: &LineIndex) -> String {
        let position = index.line_col(self.location.start());
        let code = self
            .code
            .as_deref()
            .map(|code| format!("[{code}]"))
            .unwrap_or_default();
        format!(
            "{}:{}: {}{}: {}",
            position.line + 1,
            position.col + 1,
            self.severity.label(),
            code,
            self.message
        )
    }
}

impl Shift for Diagnostic {
    fn shift(&mut self, delta: i64) {
        self.location.shift(delta);
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for semantic errors.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: Semantic analysis errors (resolution, kind checks, uniqueness)
/// - **W0001-W0099**: Warnings (conventions, shadowing)
pub mod codes {
    // ========================================================================
    // SEMANTIC ERRORS (E0001-E0099)
    // ========================================================================

    /// Undefined reference (name not found).
    pub const UNDEFINED_REFERENCE: &str = "E0001";
    /// Ambiguous reference (found through several imports).
    pub const AMBIGUOUS_REFERENCE: &str = "E0002";
    /// A reference resolved to an assignment of the wrong kind.
    pub const KIND_MISMATCH: &str = "E0003";
    /// Duplicate definition.
    pub const DUPLICATE_DEFINITION: &str = "E0004";
    /// Circular definition.
    pub const CIRCULAR_DEFINITION: &str = "E0007";
    /// Invalid import statement.
    pub const INVALID_IMPORT: &str = "E0014";
    /// Definition named like a predefined function.
    pub const RESERVED_IDENTIFIER: &str = "E0015";
    /// Ambiguous declaration that could not be classified.
    pub const UNRECOGNIZABLE_DECLARATION: &str = "E0016";
    /// Construct the engine does not analyse.
    pub const UNSUPPORTED_CONSTRUCT: &str = "E0017";
    /// Syntax error reported by the parser.
    pub const SYNTAX_ERROR: &str = "E0018";

    // ========================================================================
    // WARNINGS (W0001-W0099)
    // ========================================================================

    /// Naming convention violation.
    pub const NAMING_CONVENTION: &str = "W0003";
    /// Local definition hides a module-level one.
    pub const SHADOWED_DEFINITION: &str = "W0004";
}

// ============================================================================
// SINKS
// ============================================================================

/// Where checks send their findings.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A sink that keeps whatever it is given, in report order. Used where a
/// check runs detached from a [`DiagnosticStore`].
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        count(&self.diagnostics, Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        count(&self.diagnostics, Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.add(diagnostic);
    }
}

fn count<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>, severity: Severity) -> usize {
    diagnostics
        .into_iter()
        .filter(|d| d.severity == severity)
        .count()
}

// ============================================================================
// DIAGNOSTIC STORE
// ============================================================================

/// The node a diagnostic was produced for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticOwner {
    /// Parse errors of a file.
    File(FileId),
    /// Module-level findings: imports, group names.
    Module(ModuleId),
    /// Uniqueness findings of a scope.
    Scope(ScopeRef),
    /// Findings of an assignment's own check.
    Assignment(AssignmentRef),
    /// Findings of classifying an ambiguous assignment.
    Classification(AssignmentRef),
}

impl DiagnosticOwner {
    pub fn module(&self) -> Option<ModuleId> {
        match self {
            DiagnosticOwner::File(_) => None,
            DiagnosticOwner::Module(module) => Some(*module),
            DiagnosticOwner::Scope(scope) => Some(scope.module),
            DiagnosticOwner::Assignment(assignment)
            | DiagnosticOwner::Classification(assignment) => Some(assignment.module),
        }
    }
}

/// Diagnostics of the whole project, grouped by owner.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticStore {
    by_owner: IndexMap<DiagnosticOwner, Vec<Diagnostic>>,
}

impl DiagnosticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget what `owner` reported; done right before it is re-checked.
    pub fn clear(&mut self, owner: DiagnosticOwner) {
        self.by_owner.shift_remove(&owner);
    }

    pub fn report(&mut self, owner: DiagnosticOwner, diagnostic: Diagnostic) {
        self.by_owner.entry(owner).or_default().push(diagnostic);
    }

    /// A sink that files everything under `owner`.
    pub fn sink(&mut self, owner: DiagnosticOwner) -> OwnerSink<'_> {
        OwnerSink { store: self, owner }
    }

    pub fn owned_by(&self, owner: DiagnosticOwner) -> &[Diagnostic] {
        self.by_owner.get(&owner).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn all(&self) -> impl Iterator<Item = &Diagnostic> {
        self.by_owner.values().flatten()
    }

    /// Diagnostics located in `file`, in source order.
    pub fn for_file(&self, file: FileId) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = self
            .all()
            .filter(|d| d.location.file == file)
            .cloned()
            .collect();
        diagnostics.sort_by(|a, b| {
            a.location
                .start()
                .cmp(&b.location.start())
                .then_with(|| a.code.cmp(&b.code))
                .then_with(|| a.message.cmp(&b.message))
        });
        diagnostics
    }

    pub fn error_count(&self) -> usize {
        count(self.all(), Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        count(self.all(), Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn remove_module(&mut self, module: ModuleId) {
        self.by_owner
            .retain(|owner, _| owner.module() != Some(module));
    }

    /// Drop the diagnostics of owners that no longer exist.
    pub fn retain_owners(&mut self, mut live: impl FnMut(&DiagnosticOwner) -> bool) {
        self.by_owner.retain(|owner, _| live(owner));
    }

    /// Move diagnostics of `file` starting at or after `from` by `delta`.
    pub fn shift(&mut self, file: FileId, from: TextSize, delta: i64) {
        if delta == 0 {
            return;
        }
        for diagnostic in self.by_owner.values_mut().flatten() {
            if diagnostic.location.file == file && diagnostic.location.start() >= from {
                diagnostic.shift(delta);
            }
            for info in &mut diagnostic.related {
                if info.location.file == file && info.location.start() >= from {
                    info.location.shift(delta);
                }
            }
        }
    }

    /// Remove diagnostics of `file` that overlap `range`.
    pub fn remove_within(&mut self, file: FileId, range: TextRange) {
        for diagnostics in self.by_owner.values_mut() {
            diagnostics.retain(|d| !(d.location.file == file && d.location.overlaps(range)));
        }
        self.by_owner.retain(|_, diagnostics| !diagnostics.is_empty());
    }
}

/// [`DiagnosticSink`] view of the store for one owner.
pub struct OwnerSink<'a> {
    store: &'a mut DiagnosticStore,
    owner: DiagnosticOwner,
}

impl DiagnosticSink for OwnerSink<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.store.report(self.owner, diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::arena::Id;

    fn loc(file: u32, start: u32, end: u32) -> Location {
        Location::new(
            FileId::new(file),
            TextRange::new(TextSize::new(start), TextSize::new(end)),
        )
    }

    fn assignment(n: u32) -> DiagnosticOwner {
        DiagnosticOwner::Assignment(AssignmentRef::new(ModuleId::new(0), Id::from_raw(n, 0)))
    }

    #[test]
    fn test_diagnostic_with_code() {
        let diag = Diagnostic::error(loc(0, 0, 1), "test").with_code(codes::UNDEFINED_REFERENCE);
        assert_eq!(diag.code.as_deref(), Some("E0001"));
        assert_eq!(diag.severity, Severity::Error);
    }

    #[test]
    fn test_collector_counts() {
        let mut collector = DiagnosticCollector::new();
        collector.add(Diagnostic::error(loc(0, 0, 1), "error 1"));
        collector.add(Diagnostic::error(loc(0, 0, 1), "error 2"));
        collector.add(Diagnostic::warning(loc(0, 0, 1), "warning 1"));

        assert_eq!(collector.error_count(), 2);
        assert_eq!(collector.warning_count(), 1);
        assert!(collector.has_errors());
    }

    #[test]
    fn test_render() {
        let index = LineIndex::new("a\nbcd");
        let diag = Diagnostic::warning(loc(0, 3, 4), "careful").with_code(codes::NAMING_CONVENTION);
        assert_eq!(diag.render(&index), "2:2: warning[W0003]: careful");
    }

    #[test]
    fn test_store_clear_only_touches_owner() {
        let mut store = DiagnosticStore::new();
        store.report(assignment(1), Diagnostic::error(loc(0, 0, 1), "a"));
        store.sink(assignment(2)).report(Diagnostic::error(loc(0, 5, 6), "b"));
        store.clear(assignment(1));
        let left: Vec<_> = store.all().map(|d| d.message.to_string()).collect();
        assert_eq!(left, vec!["b"]);
        assert_eq!(store.owned_by(assignment(2)).len(), 1);
    }

    #[test]
    fn test_store_for_file_is_sorted() {
        let mut store = DiagnosticStore::new();
        store.report(assignment(1), Diagnostic::error(loc(0, 9, 10), "late"));
        store.report(assignment(2), Diagnostic::error(loc(0, 1, 2), "early"));
        store.report(assignment(3), Diagnostic::error(loc(1, 0, 1), "elsewhere"));
        let messages: Vec<_> = store
            .for_file(FileId::new(0))
            .into_iter()
            .map(|d| d.message.to_string())
            .collect();
        assert_eq!(messages, vec!["early", "late"]);
    }

    #[test]
    fn test_store_shift_and_remove_within() {
        let mut store = DiagnosticStore::new();
        store.report(
            assignment(1),
            Diagnostic::error(loc(0, 20, 25), "after")
                .with_related(RelatedInfo::new(loc(0, 2, 3), "before")),
        );
        store.report(assignment(2), Diagnostic::error(loc(0, 8, 9), "inside"));
        store.report(assignment(3), Diagnostic::error(loc(0, 3, 5), "adjacent"));
        store.remove_within(FileId::new(0), TextRange::new(5.into(), 10.into()));
        store.shift(FileId::new(0), TextSize::new(10), 4);
        let all: Vec<_> = store.all().cloned().collect();
        let messages: Vec<_> = all.iter().map(|d| d.message.to_string()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages.contains(&"adjacent".to_string()));
        let after = all.iter().find(|d| &*d.message == "after").unwrap();
        assert_eq!(after.location, loc(0, 24, 29));
        assert_eq!(after.related[0].location, loc(0, 2, 3));
    }

    #[test]
    fn test_store_retain_owners() {
        let mut store = DiagnosticStore::new();
        store.report(assignment(1), Diagnostic::error(loc(0, 0, 1), "a"));
        store.report(
            DiagnosticOwner::File(FileId::new(0)),
            Diagnostic::error(loc(0, 0, 1), "syntax"),
        );
        store.retain_owners(|owner| matches!(owner, DiagnosticOwner::File(_)));
        assert_eq!(store.error_count(), 1);
        store.remove_module(ModuleId::new(0));
        assert_eq!(store.error_count(), 1);
    }
}
