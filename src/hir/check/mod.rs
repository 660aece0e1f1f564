//! Semantic checking of modules.
//!
//! Every check is gated by the node's [`CheckMemo`]: a node already checked
//! at the pass stamp (or a newer one) is skipped before anything is
//! cleared or recursed into. A node that is re-checked first clears the
//! diagnostics it produced last time.
//!
//! Within a module the order is: imports, module-scope uniqueness, group
//! names, definitions in source order, control part.
//!
//! [`CheckMemo`]: super::timestamp::CheckMemo

mod blocks;
mod definitions;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::classify::Classifier;
use super::config::AnalysisConfig;
use super::db::Database;
use super::diagnostics::{codes, Diagnostic, DiagnosticOwner, DiagnosticStore, RelatedInfo};
use super::ids::{AssignmentRef, ModuleId, ScopeId, ScopeRef};
use super::module::ModuleData;
use super::timestamp::CompilationTimeStamp;
use super::uniqueness::report_duplicate_pair;
use crate::base::Location;
use text_size::TextRange;

/// Where a reference is checked: the scope it is written in and the node
/// its diagnostics belong to.
#[derive(Clone, Copy, Debug)]
struct Site {
    module: ModuleId,
    scope: ScopeId,
    owner: DiagnosticOwner,
}

pub struct Checker<'a> {
    db: &'a mut Database,
    store: &'a mut DiagnosticStore,
    config: &'a AnalysisConfig,
    ts: CompilationTimeStamp,
    selected: Option<&'a IndexSet<ModuleId>>,
}

impl<'a> Checker<'a> {
    pub fn new(
        db: &'a mut Database,
        store: &'a mut DiagnosticStore,
        config: &'a AnalysisConfig,
        ts: CompilationTimeStamp,
    ) -> Self {
        Self {
            db,
            store,
            config,
            ts,
            selected: None,
        }
    }

    /// Restrict re-analysis to `selected`; other modules are inspected
    /// read-only when their declarations are referenced.
    pub fn with_selection(mut self, selected: &'a IndexSet<ModuleId>) -> Self {
        self.selected = Some(selected);
        self
    }

    pub fn timestamp(&self) -> CompilationTimeStamp {
        self.ts
    }

    fn classifier(&mut self) -> Classifier<'_> {
        Classifier::new(self.db, self.store, self.selected)
    }

    fn report(&mut self, owner: DiagnosticOwner, diagnostic: Diagnostic) {
        self.store.report(owner, diagnostic);
    }

    // ========================================================================
    // MODULES
    // ========================================================================

    /// Check one module. Returns `false` when the memo skipped it.
    pub fn check_module(&mut self, id: ModuleId) -> bool {
        let Some(module) = self.db.module_mut(id) else {
            tracing::warn!("[CHECK] unknown module {}", id);
            return false;
        };
        if !module.memo.begin(self.ts) {
            tracing::trace!("[CHECK] module {} is current at {}", module.identifier, self.ts);
            return false;
        }
        tracing::debug!("[CHECK] module {} at {}", module.identifier, self.ts);
        let root = module.root;
        let definitions = module.definitions().to_vec();
        let control = module.control().map(|control| control.block);

        self.store.clear(DiagnosticOwner::Module(id));
        self.check_module_name(id);
        self.check_imports(id);
        self.check_scope_uniqueness(ScopeRef::new(id, root));
        self.check_group_names(id);
        for definition in definitions {
            self.check_assignment(AssignmentRef::new(id, definition));
        }
        if let Some(block) = control {
            self.check_block(ScopeRef::new(id, block), DiagnosticOwner::Module(id));
        }
        true
    }

    /// A module whose name is already taken by another file is reported at
    /// its header; imports of the name keep resolving to the first one.
    fn check_module_name(&mut self, id: ModuleId) {
        let Some(module) = self.db.module(id) else {
            return;
        };
        if self.db.is_name_owner(id) {
            return;
        }
        let header = Location::new(
            module.file,
            TextRange::new(module.location.start(), module.body.start()),
        );
        let mut diagnostic = Diagnostic::error(
            header,
            format!("module `{}` is already defined", module.identifier),
        )
        .with_code(codes::DUPLICATE_DEFINITION);
        let first = self
            .db
            .module_by_name(module.name())
            .and_then(|owner| self.db.module(owner));
        if let Some(first) = first {
            diagnostic = diagnostic.with_related(RelatedInfo::new(
                Location::new(first.file, TextRange::new(first.location.start(), first.body.start())),
                "first definition",
            ));
        }
        self.report(DiagnosticOwner::Module(id), diagnostic);
    }

    fn check_imports(&mut self, id: ModuleId) {
        let Some(module) = self.db.module(id) else {
            return;
        };
        let own_name = module.identifier.key();
        let mut found = Vec::new();
        for import in module.imports() {
            let name = import.module.identifier.name();
            if name == own_name.as_str() {
                found.push(
                    Diagnostic::error(import.module.location, format!("module `{name}` imports itself"))
                        .with_code(codes::INVALID_IMPORT),
                );
            } else if self.db.module_by_name(name).is_none() {
                found.push(
                    Diagnostic::error(
                        import.module.location,
                        format!("there is no module named `{}`", import.module.identifier),
                    )
                    .with_code(codes::INVALID_IMPORT),
                );
            }
        }
        for diagnostic in found {
            self.report(DiagnosticOwner::Module(id), diagnostic);
        }
    }

    /// Groups share the module's name space: sibling groups with one name,
    /// or a group named like a definition, form duplicate pairs.
    fn check_group_names(&mut self, id: ModuleId) {
        let Some(module) = self.db.module(id) else {
            return;
        };
        let mut pairs: Vec<(SmolStr, Location, Location)> = Vec::new();
        let mut seen: FxHashMap<SmolStr, Location> = FxHashMap::default();
        for group in module.groups() {
            let name = group.identifier.key();
            if let Some(definition) = definition_location(module, &name) {
                let (first, repeated) = ordered(definition, group.location);
                pairs.push((SmolStr::new(group.identifier.display()), first, repeated));
            } else if let Some(first) = seen.get(&name) {
                pairs.push((SmolStr::new(group.identifier.display()), *first, group.location));
            } else {
                seen.insert(name, group.location);
            }
        }
        let mut sink = self.store.sink(DiagnosticOwner::Module(id));
        for (name, first, repeated) in pairs {
            report_duplicate_pair(&mut sink, &name, first, repeated);
        }
    }

    // ========================================================================
    // SCOPES
    // ========================================================================

    fn check_scope_uniqueness(&mut self, target: ScopeRef) {
        let owner = DiagnosticOwner::Scope(target);
        self.store.clear(owner);
        let Some(module) = self.db.module_mut(target.module) else {
            return;
        };
        let ModuleData {
            scopes,
            assignments,
            ..
        } = module;
        match scopes.get_mut(target.id) {
            Some(scope) => scope.check_uniqueness(self.ts, assignments, &mut self.store.sink(owner)),
            None => tracing::warn!("[CHECK] dangling scope {:?}", target),
        }
    }
}

fn definition_location(module: &ModuleData, name: &str) -> Option<Location> {
    let root = module.scope(module.root)?;
    let id = root.index.get(name)?;
    module.assignment(id).map(|assignment| assignment.location)
}

/// `description` with its indefinite article: "a type", "an object".
fn indefinite(description: &str) -> String {
    let vowel = description.starts_with(['a', 'e', 'i', 'o', 'u']);
    format!("{} {description}", if vowel { "an" } else { "a" })
}

fn ordered(a: Location, b: Location) -> (Location, Location) {
    if a.start() <= b.start() { (a, b) } else { (b, a) }
}
