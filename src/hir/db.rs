//! The module database.
//!
//! Owns every [`ModuleData`] of a project. Module ids are never reused: a
//! module re-parsed from scratch is inserted under a fresh id, so any
//! handle into the discarded model stops resolving.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::assignment::Assignment;
use super::diagnostics::DiagnosticOwner;
use super::ids::{AssignmentRef, ModuleId, ScopeRef};
use super::module::ModuleData;
use super::scope::Scope;

#[derive(Clone, Debug, Default)]
pub struct Database {
    modules: Vec<Option<ModuleData>>,
    /// First live module per name.
    by_name: FxHashMap<SmolStr, ModuleId>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: ModuleData) -> ModuleId {
        let id = ModuleId::new(self.modules.len() as u32);
        let name = module.identifier.key();
        if self.by_name.contains_key(&name) {
            tracing::debug!("[DB] module name {} is already taken", name);
        } else {
            self.by_name.insert(name, id);
        }
        self.modules.push(Some(module));
        id
    }

    pub fn remove(&mut self, id: ModuleId) -> Option<ModuleData> {
        let module = self.modules.get_mut(id.raw() as usize)?.take()?;
        let name = module.identifier.key();
        if self.by_name.get(&name) == Some(&id) {
            self.by_name.remove(&name);
            // Hand the name to the next live module carrying it.
            let next = self
                .modules()
                .find(|(_, other)| other.name() == name.as_str())
                .map(|(next, _)| next);
            if let Some(next) = next {
                self.by_name.insert(name, next);
            }
        }
        Some(module)
    }

    pub fn module(&self, id: ModuleId) -> Option<&ModuleData> {
        self.modules.get(id.raw() as usize)?.as_ref()
    }

    pub fn module_mut(&mut self, id: ModuleId) -> Option<&mut ModuleData> {
        self.modules.get_mut(id.raw() as usize)?.as_mut()
    }

    pub fn module_by_name(&self, name: &str) -> Option<ModuleId> {
        self.by_name.get(name).copied()
    }

    /// Whether `id` owns its module name.
    pub fn is_name_owner(&self, id: ModuleId) -> bool {
        self.module(id)
            .is_some_and(|module| self.module_by_name(module.name()) == Some(id))
    }

    /// Live modules in insertion order.
    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &ModuleData)> {
        self.modules
            .iter()
            .enumerate()
            .filter_map(|(index, module)| Some((ModuleId::new(index as u32), module.as_ref()?)))
    }

    pub fn len(&self) -> usize {
        self.modules.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn assignment(&self, target: AssignmentRef) -> Option<&Assignment> {
        self.module(target.module)?.assignments.get(target.id)
    }

    pub fn assignment_mut(&mut self, target: AssignmentRef) -> Option<&mut Assignment> {
        self.module_mut(target.module)?.assignments.get_mut(target.id)
    }

    pub fn scope(&self, target: ScopeRef) -> Option<&Scope> {
        self.module(target.module)?.scopes.get(target.id)
    }

    /// Whether the node a diagnostic owner names still exists.
    pub fn contains_owner(&self, owner: &DiagnosticOwner) -> bool {
        match owner {
            DiagnosticOwner::File(_) => true,
            DiagnosticOwner::Module(module) => self.module(*module).is_some(),
            DiagnosticOwner::Scope(scope) => self.scope(*scope).is_some(),
            DiagnosticOwner::Assignment(assignment)
            | DiagnosticOwner::Classification(assignment) => {
                self.assignment(*assignment).is_some()
            }
        }
    }
}
