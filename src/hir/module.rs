//! Per-module semantic model.
//!
//! A [`ModuleData`] owns the module's assignment and scope arenas plus the
//! item list mirroring the syntax tree. Item lists are held behind `Arc`
//! and replaced copy-on-write, so a reader holding a clone never sees a
//! list mid-splice.

use std::sync::Arc;

use text_size::TextRange;

use super::arena::Arena;
use super::assignment::Assignment;
use super::ids::{AssignmentId, ScopeId};
use super::scope::Scope;
use super::timestamp::CheckMemo;
use crate::base::{FileId, Identifier, Location, Shift};
use crate::syntax::{Boundary, ImportSelection, Reference, Visibility};

// ============================================================================
// ITEMS
// ============================================================================

#[derive(Clone, Debug)]
pub enum Item {
    Definition(DefinitionItem),
    Group(GroupItem),
    Import(ImportItem),
    Control(ControlItem),
    Attributes(AttributesItem),
}

#[derive(Clone, Debug)]
pub struct DefinitionItem {
    pub identifier: Identifier,
    pub location: Location,
    pub assignment: AssignmentId,
    pub boundary: Boundary,
}

#[derive(Clone, Debug)]
pub struct GroupItem {
    pub identifier: Identifier,
    pub location: Location,
    /// Range strictly between the group braces.
    pub body: TextRange,
    pub visibility: Option<Visibility>,
    pub scope: ScopeId,
    pub items: Arc<Vec<Item>>,
    pub boundary: Boundary,
}

#[derive(Clone, Debug)]
pub struct ImportItem {
    pub location: Location,
    pub module: Reference,
    pub selection: ImportSelection,
    pub visibility: Option<Visibility>,
    pub boundary: Boundary,
}

#[derive(Clone, Debug)]
pub struct ControlItem {
    pub location: Location,
    pub block: ScopeId,
    pub boundary: Boundary,
}

#[derive(Clone, Debug)]
pub struct AttributesItem {
    pub location: Location,
    pub body: TextRange,
    pub boundary: Boundary,
}

impl Item {
    pub fn location(&self) -> Location {
        match self {
            Item::Definition(d) => d.location,
            Item::Group(g) => g.location,
            Item::Import(i) => i.location,
            Item::Control(c) => c.location,
            Item::Attributes(a) => a.location,
        }
    }

    pub fn boundary(&self) -> Boundary {
        match self {
            Item::Definition(d) => d.boundary,
            Item::Group(g) => g.boundary,
            Item::Import(i) => i.boundary,
            Item::Control(c) => c.boundary,
            Item::Attributes(a) => a.boundary,
        }
    }

    /// Whether `other` is the same kind of item.
    pub fn same_variant(&self, other: &Item) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

// ============================================================================
// MODULE DATA
// ============================================================================

#[derive(Clone, Debug)]
pub struct ModuleData {
    pub identifier: Identifier,
    pub file: FileId,
    pub location: Location,
    /// Range strictly between the module braces.
    pub body: TextRange,
    pub items: Arc<Vec<Item>>,
    pub assignments: Arena<Assignment>,
    pub scopes: Arena<Scope>,
    pub root: ScopeId,
    pub memo: CheckMemo,
}

impl ModuleData {
    pub fn name(&self) -> &str {
        self.identifier.name()
    }

    pub fn assignment(&self, id: AssignmentId) -> Option<&Assignment> {
        self.assignments.get(id)
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// Module-scope declarations in source order, groups flattened.
    pub fn definitions(&self) -> &[AssignmentId] {
        self.scopes
            .get(self.root)
            .map(|root| root.declarations.as_slice())
            .unwrap_or_default()
    }

    /// Import clauses in source order, including those inside groups.
    pub fn imports(&self) -> Vec<&ImportItem> {
        fn walk<'a>(items: &'a [Item], out: &mut Vec<&'a ImportItem>) {
            for item in items {
                match item {
                    Item::Import(import) => out.push(import),
                    Item::Group(group) => walk(&group.items, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.items, &mut out);
        out
    }

    /// Groups in source order, nested groups after their parent.
    pub fn groups(&self) -> Vec<&GroupItem> {
        fn walk<'a>(items: &'a [Item], out: &mut Vec<&'a GroupItem>) {
            for item in items {
                if let Item::Group(group) = item {
                    out.push(group);
                    walk(&group.items, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.items, &mut out);
        out
    }

    pub fn control(&self) -> Option<&ControlItem> {
        self.items.iter().find_map(|item| match item {
            Item::Control(control) => Some(control),
            _ => None,
        })
    }

    /// Recompute the declaration and child lists of the module scope and
    /// every group scope from the item tree, and mark their indexes stale.
    pub fn rebuild_declarations(&mut self) {
        let items = Arc::clone(&self.items);
        let mut flattened = Vec::new();
        let mut children = Vec::new();
        self.collect(&items, &mut flattened, &mut children);
        if let Some(root) = self.scopes.get_mut(self.root) {
            root.declarations = flattened;
            root.children = children;
            root.invalidate_index();
        }
    }

    fn collect(&mut self, items: &[Item], flattened: &mut Vec<AssignmentId>, children: &mut Vec<ScopeId>) {
        for item in items {
            match item {
                Item::Definition(definition) => {
                    flattened.push(definition.assignment);
                    if let Some(assignment) = self.assignments.get(definition.assignment) {
                        children.extend(assignment.kind.owned_scopes());
                    }
                }
                Item::Group(group) => {
                    children.push(group.scope);
                    let mut direct = Vec::new();
                    let mut group_children = Vec::new();
                    self.collect(&group.items, &mut direct, &mut group_children);
                    flattened.extend(direct.iter().copied());
                    if let Some(scope) = self.scopes.get_mut(group.scope) {
                        scope.declarations = direct;
                        scope.children = group_children;
                        scope.invalidate_index();
                    }
                }
                Item::Control(control) => children.push(control.block),
                Item::Import(_) | Item::Attributes(_) => {}
            }
        }
    }

    // ========================================================================
    // SHIFTING AND FREEING
    // ========================================================================

    /// Move an item and everything it owns by `delta`.
    pub fn shift_item(&mut self, item: &mut Item, delta: i64) {
        if delta == 0 {
            return;
        }
        match item {
            Item::Definition(definition) => {
                definition.location.shift(delta);
                self.shift_assignment(definition.assignment, delta);
            }
            Item::Group(group) => {
                group.location.shift(delta);
                group.body.shift(delta);
                if let Some(scope) = self.scopes.get_mut(group.scope) {
                    scope.shift(delta);
                }
                let items = Arc::make_mut(&mut group.items);
                for nested in items.iter_mut() {
                    self.shift_item(nested, delta);
                }
            }
            Item::Import(import) => {
                import.location.shift(delta);
                import.module.shift(delta);
            }
            Item::Control(control) => {
                control.location.shift(delta);
                self.shift_scope_tree(control.block, delta);
            }
            Item::Attributes(attributes) => {
                attributes.location.shift(delta);
                attributes.body.shift(delta);
            }
        }
    }

    fn shift_assignment(&mut self, id: AssignmentId, delta: i64) {
        let owned = match self.assignments.get_mut(id) {
            Some(assignment) => {
                assignment.shift(delta);
                assignment.kind.owned_scopes()
            }
            None => return,
        };
        for scope in owned {
            self.shift_scope_tree(scope, delta);
        }
    }

    fn shift_scope_tree(&mut self, id: ScopeId, delta: i64) {
        let (declarations, children) = match self.scopes.get_mut(id) {
            Some(scope) => {
                scope.shift(delta);
                (scope.declarations.clone(), scope.children.clone())
            }
            None => return,
        };
        for declaration in declarations {
            if let Some(assignment) = self.assignments.get_mut(declaration) {
                assignment.shift(delta);
            }
        }
        for child in children {
            self.shift_scope_tree(child, delta);
        }
    }

    /// Drop an item's assignments and scopes; their ids go dead.
    pub fn free_item(&mut self, item: &Item) {
        match item {
            Item::Definition(definition) => self.free_assignment(definition.assignment),
            Item::Group(group) => {
                self.scopes.remove(group.scope);
                for nested in group.items.iter() {
                    self.free_item(nested);
                }
            }
            Item::Control(control) => self.free_scope_tree(control.block),
            Item::Import(_) | Item::Attributes(_) => {}
        }
    }

    fn free_assignment(&mut self, id: AssignmentId) {
        if let Some(assignment) = self.assignments.remove(id) {
            for scope in assignment.kind.owned_scopes() {
                self.free_scope_tree(scope);
            }
        }
    }

    fn free_scope_tree(&mut self, id: ScopeId) {
        if let Some(scope) = self.scopes.remove(id) {
            for declaration in scope.declarations {
                self.assignments.remove(declaration);
            }
            for child in scope.children {
                self.free_scope_tree(child);
            }
        }
    }
}
