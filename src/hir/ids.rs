//! Handles for modules, assignments and scopes.
//!
//! Arena ids are local to one module; the `*Ref` forms pair them with the
//! owning [`ModuleId`] so they can cross module boundaries. Module ids are
//! never reused, so a reference into a discarded module stays dead.

use std::fmt;

use super::arena::Id;
use super::assignment::Assignment;
use super::scope::Scope;

pub type AssignmentId = Id<Assignment>;
pub type ScopeId = Id<Scope>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(u32);

impl ModuleId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// An assignment anywhere in the project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssignmentRef {
    pub module: ModuleId,
    pub id: AssignmentId,
}

impl AssignmentRef {
    pub fn new(module: ModuleId, id: AssignmentId) -> Self {
        Self { module, id }
    }
}

/// A scope anywhere in the project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeRef {
    pub module: ModuleId,
    pub id: ScopeId,
}

impl ScopeRef {
    pub fn new(module: ModuleId, id: ScopeId) -> Self {
        Self { module, id }
    }
}
