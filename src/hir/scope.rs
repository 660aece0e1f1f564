//! Scopes: the tree of named containers.
//!
//! Scopes live in a per-module arena. A scope owns its children by id and
//! points at its parent by id, so the tree has no owning cycles.

use text_size::TextSize;

use super::arena::Arena;
use super::assignment::Assignment;
use super::diagnostics::DiagnosticSink;
use super::ids::{AssignmentId, ScopeId, ScopeRef};
use super::timestamp::CompilationTimeStamp;
use super::uniqueness::DuplicateIndex;
use crate::base::{Identifier, Location, Shift};
use crate::syntax::ExprSyntax;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Module,
    /// Organisational only; its declarations are indexed by the module.
    Group,
    Component,
    Parameters,
    /// Statement block; forward references are not visible.
    Block,
}

/// One entry of a statement block, in source order.
#[derive(Clone, Debug)]
pub enum BlockEntry {
    Local(AssignmentId),
    Block(ScopeId),
    Expression(ExprSyntax),
}

impl Shift for BlockEntry {
    fn shift(&mut self, delta: i64) {
        if let BlockEntry::Expression(expr) = self {
            expr.shift(delta);
        }
    }
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Group name; other scopes are anonymous.
    pub identifier: Option<Identifier>,
    pub location: Location,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Insertion-ordered declarations.
    pub declarations: Vec<AssignmentId>,
    pub index: DuplicateIndex,
    /// Consulted before the parent: the component of a `runs on` clause.
    pub extension: Option<ScopeRef>,
    pub statements: Vec<BlockEntry>,
}

impl Scope {
    pub fn new(kind: ScopeKind, location: Location, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            identifier: None,
            location,
            parent,
            children: Vec::new(),
            declarations: Vec::new(),
            index: DuplicateIndex::new(),
            extension: None,
            statements: Vec::new(),
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.kind == ScopeKind::Group
    }

    pub fn invalidate_index(&mut self) {
        self.index.invalidate();
    }

    pub fn rebuild_index(&mut self, ts: CompilationTimeStamp, arena: &Arena<Assignment>) {
        self.index.rebuild(ts, &self.declarations, arena);
    }

    pub fn report_uniqueness(&self, arena: &Arena<Assignment>, sink: &mut dyn DiagnosticSink) {
        self.index.report(arena, sink);
    }

    /// Rebuild the index when it is stale for `ts`, then report.
    pub fn check_uniqueness(
        &mut self,
        ts: CompilationTimeStamp,
        arena: &Arena<Assignment>,
        sink: &mut dyn DiagnosticSink,
    ) {
        if !self.index.is_valid_for(ts) {
            self.rebuild_index(ts, arena);
        }
        self.report_uniqueness(arena, sink);
    }

    /// Find `name` among this scope's own declarations.
    ///
    /// `at` is the offset of the reference: block scopes only see
    /// declarations starting before it.
    pub fn lookup_local(
        &self,
        name: &str,
        at: TextSize,
        arena: &Arena<Assignment>,
    ) -> Option<AssignmentId> {
        if self.kind != ScopeKind::Block && self.index.built_at().is_some() {
            return self.index.get(name);
        }
        self.declarations.iter().copied().find(|&id| {
            arena.get(id).is_some_and(|assignment| {
                assignment.name() == name
                    && (self.kind != ScopeKind::Block || assignment.location.start() < at)
            })
        })
    }
}

impl Shift for Scope {
    fn shift(&mut self, delta: i64) {
        self.location.shift(delta);
        self.statements.shift(delta);
    }
}
