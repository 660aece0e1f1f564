//! Name resolution: resolving references to their definitions.
//!
//! Lookup for a reference inside a scope:
//!
//! 1. the scope's own declarations, then its `runs on` component, then the
//!    parent chain up to the module scope (group scopes are skipped, their
//!    declarations are indexed by the module scope)
//! 2. imported modules, in import order; only public definitions are
//!    importable and an explicit import list restricts the names
//! 3. the predefined-function fallback scope
//!
//! Sibling and child scopes are never searched. The resolver does not
//! classify: a found ambiguous declaration is returned as is and the caller
//! classifies it through its own reference chain.

use text_size::TextSize;

use super::builtins;
use super::db::Database;
use super::ids::{AssignmentRef, ModuleId, ScopeId};
use super::module::ModuleData;
use crate::syntax::Reference;

// ============================================================================
// RESOLVE RESULT
// ============================================================================

/// Result of resolving a reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    /// Resolved to a single definition.
    Found(AssignmentRef),
    /// Resolved to a predefined function.
    Builtin(&'static str),
    /// Several imported modules provide the name.
    Ambiguous(Vec<AssignmentRef>),
    /// Could not resolve.
    NotFound,
}

impl ResolveResult {
    /// Get the single resolved definition, if any.
    pub fn found(&self) -> Option<AssignmentRef> {
        match self {
            ResolveResult::Found(target) => Some(*target),
            _ => None,
        }
    }

    /// Check if resolution was successful (definition or predefined name).
    pub fn is_found(&self) -> bool {
        matches!(self, ResolveResult::Found(_) | ResolveResult::Builtin(_))
    }

    /// Check if the result is ambiguous.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ResolveResult::Ambiguous(_))
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolves references appearing in one module.
pub struct Resolver<'a> {
    db: &'a Database,
    module: ModuleId,
}

impl<'a> Resolver<'a> {
    pub fn new(db: &'a Database, module: ModuleId) -> Self {
        Self { db, module }
    }

    /// Resolve `reference`, written inside `scope` of this module.
    pub fn resolve(&self, reference: &Reference, scope: ScopeId) -> ResolveResult {
        let name = reference.identifier.name();
        let at = reference.location.start();
        let Some(member) = &reference.member else {
            return self.resolve_name(name, at, scope);
        };
        // `a.b`: `a` as a definition first, then as a module name.
        match self.resolve_name(name, at, scope) {
            ResolveResult::NotFound => {}
            result => return result,
        }
        let Some(target) = self.visible_module(name) else {
            tracing::trace!("[RESOLVE] {} not found: {} is not a module", reference.display(), name);
            return ResolveResult::NotFound;
        };
        let result = if target == self.module {
            self.lookup_module_scope(target, member.name())
                .map_or(ResolveResult::NotFound, ResolveResult::Found)
        } else {
            self.lookup_imported(target, member.name(), true)
                .map_or(ResolveResult::NotFound, ResolveResult::Found)
        };
        tracing::trace!("[RESOLVE] {} -> {:?}", reference.display(), result);
        result
    }

    /// Resolve a simple name visible at offset `at` inside `scope`.
    pub fn resolve_name(&self, name: &str, at: TextSize, scope: ScopeId) -> ResolveResult {
        let Some(module) = self.db.module(self.module) else {
            tracing::warn!("[RESOLVE] module {} vanished during resolution", self.module);
            return ResolveResult::NotFound;
        };

        if let Some(found) = self.lookup_scope_chain(module, name, at, scope) {
            tracing::trace!("[RESOLVE] {} -> {:?} (scope chain)", name, found);
            return ResolveResult::Found(found);
        }

        let mut imported: Vec<AssignmentRef> = Vec::new();
        for import in module.imports() {
            if !import.selection.includes(name) {
                continue;
            }
            let Some(target) = self.db.module_by_name(import.module.identifier.name()) else {
                continue;
            };
            if target == self.module {
                continue;
            }
            if let Some(found) = self.lookup_imported(target, name, false) {
                if !imported.contains(&found) {
                    imported.push(found);
                }
            }
        }
        match imported.len() {
            0 => {}
            1 => {
                tracing::trace!("[RESOLVE] {} -> {:?} (import)", name, imported[0]);
                return ResolveResult::Found(imported[0]);
            }
            _ => {
                tracing::trace!("[RESOLVE] {} is ambiguous: {:?}", name, imported);
                return ResolveResult::Ambiguous(imported);
            }
        }

        if let Some(builtin) = builtins::builtin(name) {
            return ResolveResult::Builtin(builtin);
        }
        tracing::trace!("[RESOLVE] {} not found", name);
        ResolveResult::NotFound
    }

    fn lookup_scope_chain(
        &self,
        module: &ModuleData,
        name: &str,
        at: TextSize,
        scope: ScopeId,
    ) -> Option<AssignmentRef> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let Some(scope) = module.scopes.get(id) else {
                tracing::warn!("[RESOLVE] dangling scope {:?} in {}", id, self.module);
                return None;
            };
            if !scope.is_transparent() {
                if let Some(found) = scope.lookup_local(name, at, &module.assignments) {
                    return Some(AssignmentRef::new(self.module, found));
                }
            }
            if let Some(extension) = scope.extension {
                let found = self.db.module(extension.module).and_then(|owner| {
                    owner
                        .scopes
                        .get(extension.id)?
                        .lookup_local(name, at, &owner.assignments)
                });
                if let Some(found) = found {
                    return Some(AssignmentRef::new(extension.module, found));
                }
            }
            current = scope.parent;
        }
        None
    }

    fn lookup_module_scope(&self, target: ModuleId, name: &str) -> Option<AssignmentRef> {
        let module = self.db.module(target)?;
        let root = module.scopes.get(module.root)?;
        root.lookup_local(name, TextSize::new(0), &module.assignments)
            .map(|id| AssignmentRef::new(target, id))
    }

    /// A public module-scope definition of `target`. For qualified
    /// references the import clause naming `target` must also admit `name`.
    fn lookup_imported(&self, target: ModuleId, name: &str, check_selection: bool) -> Option<AssignmentRef> {
        if check_selection {
            let module = self.db.module(self.module)?;
            let target_name = self.db.module(target)?.name();
            let admitted = module.imports().iter().any(|import| {
                import.module.identifier.name() == target_name && import.selection.includes(name)
            });
            if !admitted {
                return None;
            }
        }
        let found = self.lookup_module_scope(target, name)?;
        let assignment = self.db.assignment(found)?;
        assignment.visibility.is_importable().then_some(found)
    }

    /// The module `name` refers to from here: this module or an import.
    fn visible_module(&self, name: &str) -> Option<ModuleId> {
        let module = self.db.module(self.module)?;
        if module.name() == name {
            return Some(self.module);
        }
        let imported = module
            .imports()
            .iter()
            .any(|import| import.module.identifier.name() == name);
        if imported { self.db.module_by_name(name) } else { None }
    }
}
