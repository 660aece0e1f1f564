//! Lowering syntax elements into the semantic model.
//!
//! Allocates assignments and scopes for parsed items. Used for whole
//! modules and, by the incremental re-parser, for re-parsed item runs.

use std::sync::Arc;

use super::arena::Arena;
use super::assignment::{
    AmbiguousAssignment, AmbiguousForm, Assignment, AssignmentKind, BehaviourDefinition,
    TypeDefinition, ValueDefinition, ValueOrigin, VariableDefinition,
};
use super::ids::{AssignmentId, ScopeId};
use super::module::{
    AttributesItem, ControlItem, DefinitionItem, GroupItem, ImportItem, Item, ModuleData,
};
use super::scope::{BlockEntry, Scope, ScopeKind};
use super::timestamp::CheckMemo;
use crate::base::Location;
use crate::syntax::{
    BlockSyntax, DefinitionKindSyntax, DefinitionSyntax, ItemSyntax, LocalKindSyntax, LocalSyntax,
    ModuleSyntax, ParamSyntax, StatementSyntax, TypeBodySyntax, Visibility,
};

/// Build the semantic model of a parsed module.
pub fn lower_module(syntax: ModuleSyntax) -> ModuleData {
    let mut assignments = Arena::new();
    let mut scopes = Arena::new();
    let root = scopes.alloc(Scope::new(ScopeKind::Module, syntax.location, None));
    let items = Lowerer::new(&mut assignments, &mut scopes).lower_items(syntax.items, root, None);
    let mut module = ModuleData {
        identifier: syntax.identifier,
        file: syntax.location.file,
        location: syntax.location,
        body: syntax.body,
        items: Arc::new(items),
        assignments,
        scopes,
        root,
        memo: CheckMemo::new(),
    };
    module.rebuild_declarations();
    tracing::debug!(
        "[LOWER] module {}: {} definitions",
        module.identifier,
        module.definitions().len()
    );
    module
}

pub struct Lowerer<'a> {
    assignments: &'a mut Arena<Assignment>,
    scopes: &'a mut Arena<Scope>,
}

impl<'a> Lowerer<'a> {
    pub fn new(assignments: &'a mut Arena<Assignment>, scopes: &'a mut Arena<Scope>) -> Self {
        Self {
            assignments,
            scopes,
        }
    }

    /// Lower items declared directly in `scope` (the module scope or a
    /// group scope). `inherited` is the visibility of the enclosing group.
    pub fn lower_items(
        &mut self,
        items: Vec<ItemSyntax>,
        scope: ScopeId,
        inherited: Option<Visibility>,
    ) -> Vec<Item> {
        items
            .into_iter()
            .map(|item| self.lower_item(item, scope, inherited))
            .collect()
    }

    fn lower_item(&mut self, item: ItemSyntax, scope: ScopeId, inherited: Option<Visibility>) -> Item {
        match item {
            ItemSyntax::Definition(definition) => {
                Item::Definition(self.lower_definition(definition, scope, inherited))
            }
            ItemSyntax::Group(group) => {
                let mut group_scope = Scope::new(ScopeKind::Group, group.location, Some(scope));
                group_scope.identifier = Some(group.identifier.clone());
                let group_scope = self.scopes.alloc(group_scope);
                let visibility = group.visibility.or(inherited);
                let items = self.lower_items(group.items, group_scope, visibility);
                Item::Group(GroupItem {
                    identifier: group.identifier,
                    location: group.location,
                    body: group.body,
                    visibility: group.visibility,
                    scope: group_scope,
                    items: Arc::new(items),
                    boundary: group.boundary,
                })
            }
            ItemSyntax::Import(import) => Item::Import(ImportItem {
                location: import.location,
                module: import.module,
                selection: import.selection,
                visibility: import.visibility.or(inherited),
                boundary: import.boundary,
            }),
            ItemSyntax::Control(control) => Item::Control(ControlItem {
                location: control.location,
                block: self.lower_block(control.body, scope),
                boundary: control.boundary,
            }),
            ItemSyntax::Attributes(attributes) => Item::Attributes(AttributesItem {
                location: attributes.location,
                body: attributes.body,
                boundary: attributes.boundary,
            }),
        }
    }

    fn lower_definition(
        &mut self,
        definition: DefinitionSyntax,
        scope: ScopeId,
        inherited: Option<Visibility>,
    ) -> DefinitionItem {
        let location = definition.location;
        let kind = match definition.kind {
            DefinitionKindSyntax::Type(body) => AssignmentKind::Type(match body {
                TypeBodySyntax::Subtype(ty) => TypeDefinition::Subtype(ty),
                TypeBodySyntax::Structured { kind, fields } => {
                    TypeDefinition::Structured { kind, fields }
                }
                TypeBodySyntax::Enumerated(items) => TypeDefinition::Enumerated(items),
                TypeBodySyntax::Component(locals) => {
                    let component = self
                        .scopes
                        .alloc(Scope::new(ScopeKind::Component, location, Some(scope)));
                    for local in locals {
                        let id = self.lower_local(local, component);
                        self.declare(component, id);
                    }
                    TypeDefinition::Component { scope: component }
                }
                TypeBodySyntax::Port { kind, messages } => TypeDefinition::Port { kind, messages },
            }),
            DefinitionKindSyntax::Const { ty, value } => AssignmentKind::Value(ValueDefinition {
                origin: ValueOrigin::Constant,
                ty: Some(ty),
                value: Some(value),
            }),
            DefinitionKindSyntax::ExternalConst { ty } => AssignmentKind::Value(ValueDefinition {
                origin: ValueOrigin::ExternalConstant,
                ty: Some(ty),
                value: None,
            }),
            DefinitionKindSyntax::ModulePar { ty, default } => {
                AssignmentKind::ModulePar { ty, default }
            }
            DefinitionKindSyntax::Template { ty, params, body } => {
                let params = (!params.is_empty()).then(|| self.lower_params(params, scope, location));
                AssignmentKind::Template { ty, params, body }
            }
            DefinitionKindSyntax::Function {
                params,
                runs_on,
                return_type,
                body,
            } => AssignmentKind::Function(self.lower_behaviour(
                params,
                scope,
                location,
                body,
                runs_on,
                None,
                return_type,
            )),
            DefinitionKindSyntax::ExternalFunction {
                params,
                return_type,
            } => AssignmentKind::ExternalFunction {
                params: self.lower_params(params, scope, location),
                return_type,
            },
            DefinitionKindSyntax::Altstep {
                params,
                runs_on,
                body,
            } => AssignmentKind::Altstep(self.lower_behaviour(
                params, scope, location, body, runs_on, None, None,
            )),
            DefinitionKindSyntax::Testcase {
                params,
                runs_on,
                system,
                body,
            } => AssignmentKind::Testcase(self.lower_behaviour(
                params, scope, location, body, runs_on, system, None,
            )),
            DefinitionKindSyntax::ObjectClass { body } => AssignmentKind::ObjectClass {
                alias: None,
                body: Some(body),
            },
            DefinitionKindSyntax::Alias { target } => {
                ambiguous(AmbiguousForm::Alias { target })
            }
            DefinitionKindSyntax::Governed { governor, value } => {
                ambiguous(AmbiguousForm::Governed { governor, value })
            }
            DefinitionKindSyntax::GovernedSet { governor, elements } => {
                ambiguous(AmbiguousForm::GovernedSet { governor, elements })
            }
        };
        let visibility = definition.visibility.or(inherited).unwrap_or_default();
        let assignment = self.assignments.alloc(Assignment::new(
            definition.identifier.clone(),
            location,
            scope,
            visibility,
            kind,
        ));
        DefinitionItem {
            identifier: definition.identifier,
            location,
            assignment,
            boundary: definition.boundary,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn lower_behaviour(
        &mut self,
        params: Vec<ParamSyntax>,
        scope: ScopeId,
        location: Location,
        body: BlockSyntax,
        runs_on: Option<crate::syntax::Reference>,
        system: Option<crate::syntax::Reference>,
        return_type: Option<crate::syntax::TypeSyntax>,
    ) -> BehaviourDefinition {
        let params = self.lower_params(params, scope, location);
        let body = self.lower_block(body, params);
        BehaviourDefinition {
            params,
            runs_on,
            system,
            return_type,
            body,
        }
    }

    fn lower_params(&mut self, params: Vec<ParamSyntax>, parent: ScopeId, location: Location) -> ScopeId {
        let scope = self
            .scopes
            .alloc(Scope::new(ScopeKind::Parameters, location, Some(parent)));
        for param in params {
            let id = self.assignments.alloc(Assignment::new(
                param.identifier,
                param.location,
                scope,
                Visibility::Public,
                AssignmentKind::FormalParameter {
                    ty: param.ty,
                    direction: param.direction,
                    template: param.template,
                    default: param.default,
                },
            ));
            self.declare(scope, id);
        }
        scope
    }

    fn lower_block(&mut self, block: BlockSyntax, parent: ScopeId) -> ScopeId {
        let scope = self
            .scopes
            .alloc(Scope::new(ScopeKind::Block, block.location, Some(parent)));
        let mut entries = Vec::with_capacity(block.statements.len());
        for statement in block.statements {
            match statement {
                StatementSyntax::Local(local) => {
                    let id = self.lower_local(local, scope);
                    self.declare(scope, id);
                    entries.push(BlockEntry::Local(id));
                }
                StatementSyntax::Block(nested) => {
                    let child = self.lower_block(nested, scope);
                    if let Some(scope) = self.scopes.get_mut(scope) {
                        scope.children.push(child);
                    }
                    entries.push(BlockEntry::Block(child));
                }
                StatementSyntax::Expression(expr) => entries.push(BlockEntry::Expression(expr)),
            }
        }
        if let Some(scope) = self.scopes.get_mut(scope) {
            scope.statements = entries;
        }
        if let Some(parent) = self.scopes.get_mut(parent) {
            if parent.kind == ScopeKind::Parameters {
                parent.children.push(scope);
            }
        }
        scope
    }

    fn lower_local(&mut self, local: LocalSyntax, scope: ScopeId) -> AssignmentId {
        let kind = match local.kind {
            LocalKindSyntax::Variable { ty, init, template } => {
                let variable = VariableDefinition { ty, init };
                if template {
                    AssignmentKind::VarTemplate(variable)
                } else {
                    AssignmentKind::Variable(variable)
                }
            }
            LocalKindSyntax::Const { ty, value } => AssignmentKind::Value(ValueDefinition {
                origin: ValueOrigin::Constant,
                ty: Some(ty),
                value: Some(value),
            }),
            LocalKindSyntax::Timer { duration } => AssignmentKind::Timer { duration },
            LocalKindSyntax::Port { ty } => AssignmentKind::Port { ty },
        };
        self.assignments.alloc(Assignment::new(
            local.identifier,
            local.location,
            scope,
            Visibility::Public,
            kind,
        ))
    }

    fn declare(&mut self, scope: ScopeId, id: AssignmentId) {
        if let Some(scope) = self.scopes.get_mut(scope) {
            scope.declarations.push(id);
        }
    }
}

fn ambiguous(form: AmbiguousForm) -> AssignmentKind {
    AssignmentKind::Ambiguous(AmbiguousAssignment::new(form))
}
