//! Reference checks and statement blocks.

use super::{indefinite, Checker, Site};
use crate::hir::assignment::KindTag;
use crate::hir::chain::ReferenceChain;
use crate::hir::diagnostics::{codes, Diagnostic, DiagnosticOwner, RelatedInfo};
use crate::hir::ids::{AssignmentRef, ScopeRef};
use crate::hir::resolve::{ResolveResult, Resolver};
use crate::hir::scope::BlockEntry;
use crate::syntax::{ExprSyntax, Reference, TypeSyntax};

/// A reference after resolution and classification.
enum Resolved {
    /// `None` when the target is an erroneous ambiguous declaration.
    Assignment(AssignmentRef, Option<KindTag>),
    Builtin,
    /// Unresolved or ambiguous; already reported.
    Failed,
}

impl Checker<'_> {
    /// Resolve `reference` at `site`, reporting unresolved and ambiguous
    /// references, and classify the target if needed.
    fn resolve_checked(&mut self, reference: &Reference, site: Site) -> Resolved {
        let result = Resolver::new(self.db, site.module).resolve(reference, site.scope);
        match result {
            ResolveResult::Found(target) => {
                let mut chain = ReferenceChain::new();
                let ts = self.ts;
                let tag = self.classifier().classify(target, ts, &mut chain);
                Resolved::Assignment(target, tag)
            }
            ResolveResult::Builtin(_) => Resolved::Builtin,
            ResolveResult::Ambiguous(candidates) => {
                let mut diagnostic = Diagnostic::error(
                    reference.location,
                    format!("ambiguous reference `{}`", reference.display()),
                )
                .with_code(codes::AMBIGUOUS_REFERENCE);
                for candidate in candidates {
                    let Some(module) = self.db.module(candidate.module) else {
                        continue;
                    };
                    if let Some(assignment) = module.assignment(candidate.id) {
                        diagnostic = diagnostic.with_related(RelatedInfo::new(
                            assignment.location,
                            format!("candidate in module `{}`", module.identifier),
                        ));
                    }
                }
                self.report(site.owner, diagnostic);
                Resolved::Failed
            }
            ResolveResult::NotFound => {
                let diagnostic = Diagnostic::error(
                    reference.location,
                    format!("undefined reference `{}`", reference.display()),
                )
                .with_code(codes::UNDEFINED_REFERENCE);
                self.report(site.owner, diagnostic);
                Resolved::Failed
            }
        }
    }

    fn description(&self, target: AssignmentRef) -> &'static str {
        self.db
            .assignment(target)
            .map_or("definition", |assignment| assignment.description())
    }

    /// Every reference of a type must name a type.
    pub(super) fn check_type(&mut self, ty: &TypeSyntax, site: Site) {
        for reference in ty.references() {
            let found = match self.resolve_checked(reference, site) {
                Resolved::Assignment(target, Some(tag)) if !tag.is_type_like() => {
                    self.description(target)
                }
                Resolved::Builtin => "predefined function",
                _ => continue,
            };
            let diagnostic = Diagnostic::error(
                reference.location,
                format!(
                    "type reference expected: `{}` is {}",
                    reference.display(),
                    indefinite(found)
                ),
            )
            .with_code(codes::KIND_MISMATCH);
            self.report(site.owner, diagnostic);
        }
    }

    /// Expression references may name data, behaviour or types, but not
    /// information-object constructs.
    pub(super) fn check_expr(&mut self, expr: &ExprSyntax, site: Site) {
        for reference in &expr.references {
            let Resolved::Assignment(target, Some(tag)) = self.resolve_checked(reference, site) else {
                continue;
            };
            if tag.is_class_like() {
                let diagnostic = Diagnostic::error(
                    reference.location,
                    format!(
                        "`{}` is {} and cannot be used in an expression",
                        reference.display(),
                        indefinite(self.description(target))
                    ),
                )
                .with_code(codes::KIND_MISMATCH);
                self.report(site.owner, diagnostic);
            }
        }
    }

    /// A `runs on` or `system` clause; returns the component scope.
    pub(super) fn check_component(&mut self, reference: &Reference, site: Site) -> Option<ScopeRef> {
        let found = match self.resolve_checked(reference, site) {
            Resolved::Assignment(target, Some(_)) => {
                let scope = self
                    .db
                    .assignment(target)
                    .and_then(|assignment| assignment.effective_kind().component_scope());
                if let Some(scope) = scope {
                    return Some(ScopeRef::new(target.module, scope));
                }
                self.description(target)
            }
            Resolved::Builtin => "predefined function",
            _ => return None,
        };
        let diagnostic = Diagnostic::error(
            reference.location,
            format!(
                "component type expected: `{}` is {}",
                reference.display(),
                indefinite(found)
            ),
        )
        .with_code(codes::KIND_MISMATCH);
        self.report(site.owner, diagnostic);
        None
    }

    /// Uniqueness of the block, then its statements in source order.
    pub(super) fn check_block(&mut self, block: ScopeRef, owner: DiagnosticOwner) {
        self.check_scope_uniqueness(block);
        let Some(statements) = self.db.scope(block).map(|scope| scope.statements.clone()) else {
            return;
        };
        let site = Site {
            module: block.module,
            scope: block.id,
            owner,
        };
        for entry in statements {
            match entry {
                BlockEntry::Local(local) => self.check_assignment(AssignmentRef::new(block.module, local)),
                BlockEntry::Block(nested) => self.check_block(ScopeRef::new(block.module, nested), owner),
                BlockEntry::Expression(expr) => self.check_expr(&expr, site),
            }
        }
    }
}
