//! Duplicate-name index of a scope.
//!
//! Building and reporting are separate phases: the index is rebuilt only
//! when a structural change invalidated it, while its diagnostics can be
//! re-emitted whenever the owning scope's diagnostics were cleared.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::arena::Arena;
use super::assignment::Assignment;
use super::builtins;
use super::diagnostics::{codes, Diagnostic, DiagnosticSink, Pairing, RelatedInfo};
use super::ids::AssignmentId;
use super::timestamp::CompilationTimeStamp;
use crate::base::Location;

/// A later declaration reusing the name of an earlier one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DuplicatePair {
    pub first: AssignmentId,
    pub repeated: AssignmentId,
}

#[derive(Clone, Debug, Default)]
pub struct DuplicateIndex {
    /// First declaration per canonical name.
    first: FxHashMap<SmolStr, AssignmentId>,
    /// Later same-named declarations, in source order. Never promoted.
    duplicates: Vec<DuplicatePair>,
    /// Declarations named like a predefined function.
    reserved: Vec<AssignmentId>,
    built_at: Option<CompilationTimeStamp>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn built_at(&self) -> Option<CompilationTimeStamp> {
        self.built_at
    }

    /// The index is usable at `ts` once built at or before it.
    pub fn is_valid_for(&self, ts: CompilationTimeStamp) -> bool {
        self.built_at.is_some_and(|built| built <= ts)
    }

    /// Mark the index stale after the declaration list changed.
    pub fn invalidate(&mut self) {
        self.built_at = None;
    }

    pub fn get(&self, name: &str) -> Option<AssignmentId> {
        self.first.get(name).copied()
    }

    pub fn duplicates(&self) -> &[DuplicatePair] {
        &self.duplicates
    }

    pub fn reserved(&self) -> &[AssignmentId] {
        &self.reserved
    }

    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// Rebuild from `declarations` in source order; the first textual
    /// occurrence of a name wins its slot.
    pub fn rebuild(
        &mut self,
        ts: CompilationTimeStamp,
        declarations: &[AssignmentId],
        arena: &Arena<Assignment>,
    ) {
        self.first.clear();
        self.duplicates.clear();
        self.reserved.clear();
        for &id in declarations {
            let Some(assignment) = arena.get(id) else {
                tracing::warn!("[UNIQUENESS] declaration {:?} missing from arena", id);
                continue;
            };
            let name = assignment.identifier.key();
            if builtins::is_builtin(&name) {
                self.reserved.push(id);
            } else if let Some(&first) = self.first.get(&name) {
                self.duplicates.push(DuplicatePair { first, repeated: id });
            } else {
                self.first.insert(name, id);
            }
        }
        self.built_at = Some(ts);
        tracing::trace!(
            "[UNIQUENESS] rebuilt at {}: {} names, {} duplicates",
            ts,
            self.first.len(),
            self.duplicates.len()
        );
    }

    /// Emit the diagnostics of the last rebuild.
    pub fn report(&self, arena: &Arena<Assignment>, sink: &mut dyn DiagnosticSink) {
        for &id in &self.reserved {
            if let Some(assignment) = arena.get(id) {
                sink.report(reserved_identifier(assignment));
            }
        }
        for pair in &self.duplicates {
            let (Some(first), Some(repeated)) = (arena.get(pair.first), arena.get(pair.repeated))
            else {
                tracing::warn!("[UNIQUENESS] duplicate pair {:?} has a dead member", pair);
                continue;
            };
            report_duplicate_pair(
                sink,
                repeated.identifier.display(),
                first.location,
                repeated.location,
            );
        }
    }
}

fn reserved_identifier(assignment: &Assignment) -> Diagnostic {
    Diagnostic::error(
        assignment.location,
        format!(
            "`{}` is the name of a predefined function and cannot be redefined",
            assignment.identifier
        ),
    )
    .with_code(codes::RESERVED_IDENTIFIER)
}

/// The "first declared here" / "declared again here" diagnostic pair.
pub(crate) fn report_duplicate_pair(
    sink: &mut dyn DiagnosticSink,
    name: &str,
    first: Location,
    repeated: Location,
) {
    sink.report(
        Diagnostic::error(
            first,
            format!("duplicate definition with name `{name}` was first declared here"),
        )
        .with_code(codes::DUPLICATE_DEFINITION)
        .with_pairing(Pairing::First)
        .with_related(RelatedInfo::new(repeated, "declared again here")),
    );
    sink.report(
        Diagnostic::error(
            repeated,
            format!("duplicate definition with name `{name}` was declared here again"),
        )
        .with_code(codes::DUPLICATE_DEFINITION)
        .with_pairing(Pairing::Repeated)
        .with_related(RelatedInfo::new(first, "first declared here")),
    );
}
