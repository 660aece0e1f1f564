//! Per-assignment checks.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::{indefinite, Checker, Site};
use crate::base::Location;
use crate::hir::assignment::{AssignmentKind, KindTag, TypeDefinition, ValueOrigin};
use crate::hir::chain::ReferenceChain;
use crate::hir::diagnostics::{codes, Diagnostic, DiagnosticOwner, RelatedInfo};
use crate::hir::ids::{AssignmentRef, ScopeRef};
use crate::hir::resolve::{ResolveResult, Resolver};
use crate::hir::scope::ScopeKind;
use crate::hir::uniqueness::report_duplicate_pair;
use crate::syntax::{PortKind, TypeSyntax};

impl Checker<'_> {
    /// Check one assignment, classifying it first when it is ambiguous.
    pub fn check_assignment(&mut self, target: AssignmentRef) {
        let Some(assignment) = self.db.assignment_mut(target) else {
            tracing::warn!("[CHECK] unknown assignment {:?}", target);
            return;
        };
        if !assignment.memo.begin(self.ts) {
            return;
        }
        let owner = DiagnosticOwner::Assignment(target);
        let ambiguous = assignment.as_ambiguous().is_some();
        self.store.clear(owner);

        if ambiguous {
            let mut chain = ReferenceChain::new();
            let ts = self.ts;
            self.classifier().classify(target, ts, &mut chain);
        }
        let Some(assignment) = self.db.assignment(target) else {
            return;
        };
        let kind = assignment.effective_kind().clone();
        let location = assignment.location;
        let site = Site {
            module: target.module,
            scope: assignment.scope,
            owner,
        };
        tracing::trace!("[CHECK] {} ({})", assignment.identifier, assignment.description());

        match kind {
            AssignmentKind::Type(definition) => self.check_type_definition(target, definition, location, site),
            AssignmentKind::Value(value) => {
                if let Some(ty) = &value.ty {
                    self.check_type(ty, site);
                }
                if let Some(expr) = &value.value {
                    self.check_expr(expr, site);
                }
            }
            AssignmentKind::ModulePar { ty, default } => {
                self.check_type(&ty, site);
                if let Some(default) = &default {
                    self.check_expr(default, site);
                }
            }
            AssignmentKind::Template { ty, params, body } => {
                self.check_type(&ty, site);
                let body_site = match params {
                    Some(params) => {
                        self.check_declarations(ScopeRef::new(target.module, params));
                        Site { scope: params, ..site }
                    }
                    None => site,
                };
                self.check_expr(&body, body_site);
            }
            AssignmentKind::Variable(variable) | AssignmentKind::VarTemplate(variable) => {
                self.check_type(&variable.ty, site);
                if let Some(init) = &variable.init {
                    self.check_expr(init, site);
                }
            }
            AssignmentKind::Timer { duration } => {
                if let Some(duration) = &duration {
                    self.check_expr(duration, site);
                }
            }
            AssignmentKind::Port { ty } => self.check_port_type(&ty, site),
            AssignmentKind::FormalParameter { ty, default, .. } => {
                self.check_type(&ty, site);
                if let Some(default) = &default {
                    self.check_expr(default, site);
                }
            }
            AssignmentKind::Function(behaviour)
            | AssignmentKind::Altstep(behaviour)
            | AssignmentKind::Testcase(behaviour) => {
                let component = behaviour
                    .runs_on
                    .as_ref()
                    .and_then(|runs_on| self.check_component(runs_on, site));
                self.set_extension(ScopeRef::new(target.module, behaviour.params), component);
                if let Some(system) = &behaviour.system {
                    self.check_component(system, site);
                }
                if let Some(return_type) = &behaviour.return_type {
                    self.check_type(return_type, site);
                }
                self.check_declarations(ScopeRef::new(target.module, behaviour.params));
                self.check_block(ScopeRef::new(target.module, behaviour.body), owner);
            }
            AssignmentKind::ExternalFunction {
                params,
                return_type,
            } => {
                if let Some(return_type) = &return_type {
                    self.check_type(return_type, site);
                }
                self.check_declarations(ScopeRef::new(target.module, params));
            }
            AssignmentKind::ObjectClass { .. } => {}
            AssignmentKind::Object { body, .. } => self.check_expr(&body, site),
            AssignmentKind::ObjectSet { elements, .. } => self.check_expr(&elements, site),
            // Erroneous classification, already reported.
            AssignmentKind::Ambiguous(_) => {}
        }

        self.check_naming(target);
        self.check_shadowing(target);
    }

    fn check_type_definition(
        &mut self,
        target: AssignmentRef,
        definition: TypeDefinition,
        location: Location,
        site: Site,
    ) {
        match definition {
            TypeDefinition::Subtype(ty) => {
                self.check_type(&ty, site);
                if matches!(ty, TypeSyntax::Reference(_)) {
                    self.check_alias_cycle(target);
                }
            }
            TypeDefinition::Structured { fields, .. } => {
                let mut seen: FxHashMap<SmolStr, Location> = FxHashMap::default();
                let mut duplicates = Vec::new();
                for field in &fields {
                    self.check_type(&field.ty, site);
                    match seen.get(field.identifier.name()) {
                        Some(first) => duplicates.push((field.identifier.to_string(), *first, field.location)),
                        None => {
                            seen.insert(field.identifier.key(), field.location);
                        }
                    }
                }
                let mut sink = self.store.sink(site.owner);
                for (name, first, repeated) in duplicates {
                    report_duplicate_pair(&mut sink, &name, first, repeated);
                }
            }
            TypeDefinition::Enumerated(items) => {
                let mut seen: Vec<&str> = Vec::new();
                for item in &items {
                    if seen.contains(&item.name()) {
                        self.report(
                            site.owner,
                            Diagnostic::error(location, format!("duplicate enumeration item `{item}`"))
                                .with_code(codes::DUPLICATE_DEFINITION),
                        );
                    } else {
                        seen.push(item.name());
                    }
                }
            }
            TypeDefinition::Component { scope } => {
                self.check_declarations(ScopeRef::new(target.module, scope));
            }
            TypeDefinition::Port { kind, messages } => {
                if kind != PortKind::Message {
                    let what = if kind == PortKind::Procedure { "procedure-based" } else { "mixed" };
                    self.report(
                        site.owner,
                        Diagnostic::new(
                            self.config.unsupported_construct_severity,
                            location,
                            format!("{what} port types are not supported"),
                        )
                        .with_code(codes::UNSUPPORTED_CONSTRUCT),
                    );
                }
                for message in &messages {
                    self.check_type(&message.ty, site);
                }
            }
            TypeDefinition::ValueSet { elements, .. } => self.check_expr(&elements, site),
        }
    }

    /// Follow `type A B` aliases; `target` on a cycle reports it.
    fn check_alias_cycle(&mut self, target: AssignmentRef) {
        let mut chain = ReferenceChain::new();
        let mut current = target;
        while let Some(assignment) = self.db.assignment(current) {
            if chain.push(current, assignment.identifier.display()).is_err() {
                break;
            }
            let AssignmentKind::Type(TypeDefinition::Subtype(TypeSyntax::Reference(reference))) =
                assignment.effective_kind()
            else {
                break;
            };
            match Resolver::new(self.db, current.module).resolve(reference, assignment.scope) {
                ResolveResult::Found(next) => current = next,
                _ => break,
            }
        }
        let Some(path) = chain.cycle_path(target) else {
            return;
        };
        let Some(location) = self.db.assignment(target).map(|assignment| assignment.location) else {
            return;
        };
        let diagnostic = Diagnostic::error(location, format!("circular definition: {path}"))
            .with_code(codes::CIRCULAR_DEFINITION);
        self.report(DiagnosticOwner::Assignment(target), diagnostic);
    }

    /// Uniqueness of a parameter or component scope, then each declaration.
    pub(super) fn check_declarations(&mut self, scope: ScopeRef) {
        self.check_scope_uniqueness(scope);
        let declarations = self
            .db
            .scope(scope)
            .map(|scope| scope.declarations.clone())
            .unwrap_or_default();
        for declaration in declarations {
            self.check_assignment(AssignmentRef::new(scope.module, declaration));
        }
    }

    fn set_extension(&mut self, params: ScopeRef, component: Option<ScopeRef>) {
        if let Some(scope) = self
            .db
            .module_mut(params.module)
            .and_then(|module| module.scopes.get_mut(params.id))
        {
            scope.extension = component;
        }
    }

    fn check_naming(&mut self, target: AssignmentRef) {
        if !self.config.naming.enabled {
            return;
        }
        let Some(assignment) = self.db.assignment(target) else {
            return;
        };
        if let AssignmentKind::Value(value) = &assignment.kind {
            if value.origin != ValueOrigin::Constant {
                return;
            }
        }
        let tag = assignment.kind.tag();
        let Some(prefix) = self.config.naming.prefix_for(tag) else {
            return;
        };
        if assignment.identifier.display().starts_with(prefix) {
            return;
        }
        let diagnostic = Diagnostic::warning(
            assignment.location,
            format!(
                "{} `{}` should start with `{}`",
                assignment.description(),
                assignment.identifier,
                prefix
            ),
        )
        .with_code(codes::NAMING_CONVENTION);
        self.report(DiagnosticOwner::Assignment(target), diagnostic);
    }

    /// Warn when a local, parameter or component definition hides a
    /// module-level definition.
    fn check_shadowing(&mut self, target: AssignmentRef) {
        if !self.config.report_shadowing {
            return;
        }
        let Some(module) = self.db.module(target.module) else {
            return;
        };
        let Some(assignment) = module.assignment(target.id) else {
            return;
        };
        let local = module.scope(assignment.scope).is_some_and(|scope| {
            matches!(
                scope.kind,
                ScopeKind::Block | ScopeKind::Parameters | ScopeKind::Component
            )
        });
        if !local {
            return;
        }
        let Some(shadowed) = module
            .scope(module.root)
            .and_then(|root| root.index.get(assignment.name()))
            .and_then(|id| module.assignment(id))
        else {
            return;
        };
        let diagnostic = Diagnostic::warning(
            assignment.location,
            format!(
                "`{}` shadows the module-level {} with the same name",
                assignment.identifier,
                shadowed.description()
            ),
        )
        .with_code(codes::SHADOWED_DEFINITION)
        .with_related(RelatedInfo::new(shadowed.location, "module-level definition"));
        self.report(DiagnosticOwner::Assignment(target), diagnostic);
    }

    /// A port definition needs a port type.
    fn check_port_type(&mut self, ty: &TypeSyntax, site: Site) {
        self.check_type(ty, site);
        let TypeSyntax::Reference(reference) = ty else {
            return;
        };
        let Some(target) = Resolver::new(self.db, site.module)
            .resolve(reference, site.scope)
            .found()
        else {
            return;
        };
        let Some(assignment) = self.db.assignment(target) else {
            return;
        };
        let kind = assignment.effective_kind();
        if kind.tag() == KindTag::Type && !matches!(kind, AssignmentKind::Type(TypeDefinition::Port { .. })) {
            let diagnostic = Diagnostic::error(
                reference.location,
                format!(
                    "port type expected: `{}` is {}",
                    reference.display(),
                    indefinite(kind.description())
                ),
            )
            .with_code(codes::KIND_MISMATCH);
            self.report(site.owner, diagnostic);
        }
    }
}
