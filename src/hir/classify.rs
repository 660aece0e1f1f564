//! Deferred classification of ambiguous declarations.
//!
//! `X ::= Q`, `x G ::= rhs` and `X G ::= { ... }` can only be told apart
//! once the deciding reference (`Q` or `G`) is resolved. Candidates are
//! tried in a fixed order per production:
//!
//! | Production  | Candidates, in order       | Decided by                     |
//! |-------------|----------------------------|--------------------------------|
//! | Alias       | ObjectClass, Type, Value   | `Q` is a class / type / value  |
//! | Governed    | Object, Value              | `G` is a class / type          |
//! | GovernedSet | ObjectSet, Type (value set)| `G` is a class / type          |
//!
//! Exactly one matching candidate classifies the node. The outcome is
//! stamped and reused for any request not newer than the stamp; a
//! recomputed outcome that did not change keeps the existing
//! sub-assignment instance.

use indexmap::IndexSet;

use super::assignment::{
    AmbiguousForm, Assignment, AssignmentKind, ClassificationError, ClassificationState, KindTag,
    TypeDefinition, ValueDefinition, ValueOrigin,
};
use super::chain::ReferenceChain;
use super::db::Database;
use super::diagnostics::{codes, Diagnostic, DiagnosticOwner, DiagnosticStore};
use super::ids::{AssignmentRef, ModuleId};
use super::resolve::{ResolveResult, Resolver};
use super::timestamp::CompilationTimeStamp;
use crate::syntax::{ExprSyntax, TypeSyntax};

/// What the deciding reference turned out to be.
enum Target {
    Kind(KindTag),
    Failed(ClassificationError),
}

/// Classifies ambiguous declarations on behalf of a checking pass.
pub struct Classifier<'a> {
    db: &'a mut Database,
    store: &'a mut DiagnosticStore,
    /// Modules analysed by the current pass; the others are only inspected.
    selected: Option<&'a IndexSet<ModuleId>>,
}

impl<'a> Classifier<'a> {
    pub fn new(
        db: &'a mut Database,
        store: &'a mut DiagnosticStore,
        selected: Option<&'a IndexSet<ModuleId>>,
    ) -> Self {
        Self {
            db,
            store,
            selected,
        }
    }

    /// Classify `node` at `ts` and return its concrete kind.
    ///
    /// Returns the node's own tag when it is not ambiguous, and `None` when
    /// it is (or, through a cycle, is being found) erroneous.
    pub fn classify(
        &mut self,
        node: AssignmentRef,
        ts: CompilationTimeStamp,
        chain: &mut ReferenceChain,
    ) -> Option<KindTag> {
        let inspect_only = self
            .selected
            .is_some_and(|selected| !selected.contains(&node.module));
        let ts = if inspect_only {
            CompilationTimeStamp::BASE
        } else {
            ts
        };

        let (form, name, previous) = {
            let assignment = self.db.assignment(node)?;
            let Some(ambiguous) = assignment.as_ambiguous() else {
                return Some(assignment.tag());
            };
            if ambiguous.is_current(ts) {
                return ambiguous.classified_tag();
            }
            (
                ambiguous.form.clone(),
                assignment.identifier.to_string(),
                ambiguous.classified_tag(),
            )
        };

        let mark = chain.mark();
        if let Err(cycle) = chain.push(node, &name) {
            // The outer frame for `node` records the cycle.
            tracing::trace!("[CLASSIFY] re-entered {}: {}", name, cycle);
            return None;
        }
        tracing::trace!("[CLASSIFY] {} ({}) at {}", name, form.production(), ts);

        let report = !inspect_only;
        if report {
            self.store.clear(DiagnosticOwner::Classification(node));
        }
        if let Some(ambiguous) = self.db.assignment_mut(node).and_then(Assignment::as_ambiguous_mut) {
            ambiguous.state = ClassificationState::Classifying;
        }

        let target = self.classify_target(node, &form, ts, chain, report);
        let outcome = if let Some(path) = chain.cycle_path(node) {
            Err(ClassificationError::Circular(path.to_string()))
        } else {
            match target {
                Target::Kind(tag) => pick(&form, tag),
                Target::Failed(error) => Err(error),
            }
        };
        chain.rollback(mark);

        let result = self.store_outcome(node, &form, previous, outcome, ts, report);
        tracing::debug!("[CLASSIFY] {} -> {:?}", name, result);
        result
    }

    fn classify_target(
        &mut self,
        node: AssignmentRef,
        form: &AmbiguousForm,
        ts: CompilationTimeStamp,
        chain: &mut ReferenceChain,
        report: bool,
    ) -> Target {
        let reference = form.deciding_reference();
        let Some(scope) = self.db.assignment(node).map(|assignment| assignment.scope) else {
            return Target::Failed(ClassificationError::Unrecognizable);
        };
        let result = Resolver::new(self.db, node.module).resolve(reference, scope);
        match result {
            ResolveResult::Found(target) => match self.classify(target, ts, chain) {
                Some(tag) => Target::Kind(tag),
                None => Target::Failed(ClassificationError::ErroneousTarget(reference.display())),
            },
            // A predefined function is neither a class, a type nor a value.
            ResolveResult::Builtin(_) => Target::Kind(KindTag::Function),
            ResolveResult::Ambiguous(_) => {
                if report {
                    self.store.report(
                        DiagnosticOwner::Classification(node),
                        Diagnostic::error(
                            reference.location,
                            format!("ambiguous reference `{}`", reference.display()),
                        )
                        .with_code(codes::AMBIGUOUS_REFERENCE),
                    );
                }
                Target::Failed(ClassificationError::ErroneousTarget(reference.display()))
            }
            ResolveResult::NotFound => {
                Target::Failed(ClassificationError::UnresolvedTarget(reference.display()))
            }
        }
    }

    fn store_outcome(
        &mut self,
        node: AssignmentRef,
        form: &AmbiguousForm,
        previous: Option<KindTag>,
        outcome: Result<KindTag, ClassificationError>,
        ts: CompilationTimeStamp,
        report: bool,
    ) -> Option<KindTag> {
        let Some(assignment) = self.db.assignment_mut(node) else {
            tracing::error!("[CLASSIFY] {:?} vanished during classification", node);
            return None;
        };
        let (identifier, location, scope, visibility) = (
            assignment.identifier.clone(),
            assignment.location,
            assignment.scope,
            assignment.visibility,
        );
        let Some(ambiguous) = assignment.as_ambiguous_mut() else {
            return None;
        };
        ambiguous.classified_at = Some(ts);
        match outcome {
            Ok(tag) => {
                // A changed outcome gets a fresh sub-assignment.
                if previous != Some(tag) || ambiguous.resolved.is_none() {
                    ambiguous.resolved = Some(Box::new(Assignment::new(
                        identifier,
                        location,
                        scope,
                        visibility,
                        concrete(form, tag),
                    )));
                }
                ambiguous.state = ClassificationState::Classified(tag);
                Some(tag)
            }
            Err(error) => {
                let diagnostic = match &error {
                    ClassificationError::Unrecognizable | ClassificationError::Ambiguous(_) => Some(
                        Diagnostic::error(location, error.to_string())
                            .with_code(codes::UNRECOGNIZABLE_DECLARATION),
                    ),
                    ClassificationError::Circular(_) => Some(
                        Diagnostic::error(location, error.to_string())
                            .with_code(codes::CIRCULAR_DEFINITION),
                    ),
                    ClassificationError::UnresolvedTarget(name) => Some(
                        Diagnostic::error(
                            form.deciding_reference().location,
                            format!("undefined reference `{name}`"),
                        )
                        .with_code(codes::UNDEFINED_REFERENCE),
                    ),
                    ClassificationError::ErroneousTarget(_) => None,
                };
                ambiguous.resolved = None;
                ambiguous.state = ClassificationState::Erroneous(error);
                if let (true, Some(diagnostic)) = (report, diagnostic) {
                    self.store
                        .report(DiagnosticOwner::Classification(node), diagnostic);
                }
                None
            }
        }
    }
}

type Candidate = (KindTag, fn(KindTag) -> bool);

fn is_class(tag: KindTag) -> bool {
    tag == KindTag::ObjectClass
}

fn is_type(tag: KindTag) -> bool {
    tag == KindTag::Type
}

fn is_constant(tag: KindTag) -> bool {
    matches!(tag, KindTag::Value | KindTag::ModulePar)
}

const ALIAS: &[Candidate] = &[
    (KindTag::ObjectClass, is_class),
    (KindTag::Type, is_type),
    (KindTag::Value, is_constant),
];
const GOVERNED: &[Candidate] = &[(KindTag::Object, is_class), (KindTag::Value, is_type)];
const GOVERNED_SET: &[Candidate] = &[(KindTag::ObjectSet, is_class), (KindTag::Type, is_type)];

/// Candidates of a production, in priority order.
fn candidates(form: &AmbiguousForm) -> &'static [Candidate] {
    match form {
        AmbiguousForm::Alias { .. } => ALIAS,
        AmbiguousForm::Governed { .. } => GOVERNED,
        AmbiguousForm::GovernedSet { .. } => GOVERNED_SET,
    }
}

/// Evaluate every candidate; exactly one must match.
fn pick(form: &AmbiguousForm, target: KindTag) -> Result<KindTag, ClassificationError> {
    let matches: Vec<KindTag> = candidates(form)
        .iter()
        .filter(|(_, predicate)| predicate(target))
        .map(|(candidate, _)| *candidate)
        .collect();
    match matches.as_slice() {
        [] => Err(ClassificationError::Unrecognizable),
        [tag] => Ok(*tag),
        _ => Err(ClassificationError::Ambiguous(matches)),
    }
}

/// The concrete kind for `tag`, built from the ambiguous syntax.
fn concrete(form: &AmbiguousForm, tag: KindTag) -> AssignmentKind {
    match (form, tag) {
        (AmbiguousForm::Alias { target }, KindTag::ObjectClass) => AssignmentKind::ObjectClass {
            alias: Some(target.clone()),
            body: None,
        },
        (AmbiguousForm::Alias { target }, KindTag::Type) => {
            AssignmentKind::Type(TypeDefinition::Subtype(TypeSyntax::Reference(target.clone())))
        }
        (AmbiguousForm::Alias { target }, _) => AssignmentKind::Value(ValueDefinition {
            origin: ValueOrigin::Asn,
            ty: None,
            value: Some(ExprSyntax {
                location: target.location,
                references: vec![target.clone()],
            }),
        }),
        (AmbiguousForm::Governed { governor, value }, KindTag::Object) => AssignmentKind::Object {
            class: governor.clone(),
            body: value.clone(),
        },
        (AmbiguousForm::Governed { governor, value }, _) => AssignmentKind::Value(ValueDefinition {
            origin: ValueOrigin::Asn,
            ty: Some(TypeSyntax::Reference(governor.clone())),
            value: Some(value.clone()),
        }),
        (AmbiguousForm::GovernedSet { governor, elements }, KindTag::ObjectSet) => {
            AssignmentKind::ObjectSet {
                class: governor.clone(),
                elements: elements.clone(),
            }
        }
        (AmbiguousForm::GovernedSet { governor, elements }, _) => {
            AssignmentKind::Type(TypeDefinition::ValueSet {
                governor: governor.clone(),
                elements: elements.clone(),
            })
        }
    }
}
