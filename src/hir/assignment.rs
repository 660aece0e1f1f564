//! Assignments: every named declaration, as one closed enum.
//!
//! An [`Assignment`] carries what all declarations share (name, location,
//! owning scope, visibility and the check memo); [`AssignmentKind`] holds
//! the kind-specific payload. Declarations whose kind depends on what they
//! reference start out as [`AssignmentKind::Ambiguous`] and receive a
//! concrete sub-assignment during classification.

use thiserror::Error;

use super::ids::ScopeId;
use super::timestamp::{CheckMemo, CompilationTimeStamp};
use crate::base::{Identifier, Location, Shift};
use crate::syntax::{
    Direction, ExprSyntax, FieldSyntax, PortKind, PortMessageSyntax, Reference, StructuredKind,
    TypeSyntax, Visibility,
};

// ============================================================================
// ASSIGNMENT
// ============================================================================

#[derive(Clone, Debug)]
pub struct Assignment {
    pub identifier: Identifier,
    pub location: Location,
    /// Scope whose declaration list holds this assignment.
    pub scope: ScopeId,
    pub visibility: Visibility,
    pub memo: CheckMemo,
    pub kind: AssignmentKind,
}

impl Assignment {
    pub fn new(
        identifier: Identifier,
        location: Location,
        scope: ScopeId,
        visibility: Visibility,
        kind: AssignmentKind,
    ) -> Self {
        Self {
            identifier,
            location,
            scope,
            visibility,
            memo: CheckMemo::new(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        self.identifier.name()
    }

    /// The kind after classification: the sub-assignment's kind for a
    /// classified ambiguous declaration, the own kind otherwise.
    pub fn effective_kind(&self) -> &AssignmentKind {
        match &self.kind {
            AssignmentKind::Ambiguous(ambiguous) => match &ambiguous.resolved {
                Some(resolved) => &resolved.kind,
                None => &self.kind,
            },
            kind => kind,
        }
    }

    pub fn tag(&self) -> KindTag {
        self.effective_kind().tag()
    }

    pub fn description(&self) -> &'static str {
        self.effective_kind().description()
    }

    pub fn as_ambiguous(&self) -> Option<&AmbiguousAssignment> {
        match &self.kind {
            AssignmentKind::Ambiguous(ambiguous) => Some(ambiguous),
            _ => None,
        }
    }

    pub fn as_ambiguous_mut(&mut self) -> Option<&mut AmbiguousAssignment> {
        match &mut self.kind {
            AssignmentKind::Ambiguous(ambiguous) => Some(ambiguous),
            _ => None,
        }
    }
}

impl Shift for Assignment {
    fn shift(&mut self, delta: i64) {
        self.location.shift(delta);
        self.kind.shift(delta);
    }
}

// ============================================================================
// KINDS
// ============================================================================

#[derive(Clone, Debug)]
pub enum AssignmentKind {
    Type(TypeDefinition),
    /// `const`, `external const` and ASN.1 value assignments.
    Value(ValueDefinition),
    ModulePar {
        ty: TypeSyntax,
        default: Option<ExprSyntax>,
    },
    Template {
        ty: TypeSyntax,
        params: Option<ScopeId>,
        body: ExprSyntax,
    },
    Variable(VariableDefinition),
    VarTemplate(VariableDefinition),
    Timer {
        duration: Option<ExprSyntax>,
    },
    Port {
        ty: TypeSyntax,
    },
    FormalParameter {
        ty: TypeSyntax,
        direction: Direction,
        template: bool,
        default: Option<ExprSyntax>,
    },
    Function(BehaviourDefinition),
    ExternalFunction {
        params: ScopeId,
        return_type: Option<TypeSyntax>,
    },
    Altstep(BehaviourDefinition),
    Testcase(BehaviourDefinition),
    ObjectClass {
        /// Set when the class was classified from `X ::= Q`.
        alias: Option<Reference>,
        body: Option<Location>,
    },
    Object {
        class: Reference,
        body: ExprSyntax,
    },
    ObjectSet {
        class: Reference,
        elements: ExprSyntax,
    },
    Ambiguous(AmbiguousAssignment),
}

#[derive(Clone, Debug)]
pub enum TypeDefinition {
    /// `type integer T`, `type Other T`, `type record of E T`; also a
    /// classified `X ::= Q` alias.
    Subtype(TypeSyntax),
    Structured {
        kind: StructuredKind,
        fields: Vec<FieldSyntax>,
    },
    Enumerated(Vec<Identifier>),
    Component {
        scope: ScopeId,
    },
    Port {
        kind: PortKind,
        messages: Vec<PortMessageSyntax>,
    },
    /// A classified `X G ::= { ... }` whose governor is a type.
    ValueSet {
        governor: Reference,
        elements: ExprSyntax,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueOrigin {
    Constant,
    ExternalConstant,
    Asn,
}

#[derive(Clone, Debug)]
pub struct ValueDefinition {
    pub origin: ValueOrigin,
    pub ty: Option<TypeSyntax>,
    pub value: Option<ExprSyntax>,
}

#[derive(Clone, Debug)]
pub struct VariableDefinition {
    pub ty: TypeSyntax,
    pub init: Option<ExprSyntax>,
}

/// Function, altstep or testcase.
#[derive(Clone, Debug)]
pub struct BehaviourDefinition {
    pub params: ScopeId,
    pub runs_on: Option<Reference>,
    pub system: Option<Reference>,
    pub return_type: Option<TypeSyntax>,
    pub body: ScopeId,
}

/// Payload-free discriminant of [`AssignmentKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KindTag {
    Type,
    Value,
    ModulePar,
    Template,
    Variable,
    VarTemplate,
    Timer,
    Port,
    FormalParameter,
    Function,
    ExternalFunction,
    Altstep,
    Testcase,
    ObjectClass,
    Object,
    ObjectSet,
    Ambiguous,
}

impl KindTag {
    pub fn description(self) -> &'static str {
        match self {
            KindTag::Type => "type",
            KindTag::Value => "value",
            KindTag::ModulePar => "module parameter",
            KindTag::Template => "template",
            KindTag::Variable => "variable",
            KindTag::VarTemplate => "template variable",
            KindTag::Timer => "timer",
            KindTag::Port => "port",
            KindTag::FormalParameter => "formal parameter",
            KindTag::Function => "function",
            KindTag::ExternalFunction => "external function",
            KindTag::Altstep => "altstep",
            KindTag::Testcase => "testcase",
            KindTag::ObjectClass => "object class",
            KindTag::Object => "object",
            KindTag::ObjectSet => "object set",
            KindTag::Ambiguous => "assignment",
        }
    }

    pub fn is_type_like(self) -> bool {
        self == KindTag::Type
    }

    /// Usable as data inside expressions.
    pub fn is_value_like(self) -> bool {
        matches!(
            self,
            KindTag::Value
                | KindTag::ModulePar
                | KindTag::Template
                | KindTag::Variable
                | KindTag::VarTemplate
                | KindTag::Timer
                | KindTag::Port
                | KindTag::FormalParameter
        )
    }

    pub fn is_callable(self) -> bool {
        matches!(
            self,
            KindTag::Function | KindTag::ExternalFunction | KindTag::Altstep | KindTag::Testcase
        )
    }

    pub fn is_class_like(self) -> bool {
        matches!(self, KindTag::ObjectClass | KindTag::Object | KindTag::ObjectSet)
    }
}

impl AssignmentKind {
    pub fn tag(&self) -> KindTag {
        match self {
            AssignmentKind::Type(_) => KindTag::Type,
            AssignmentKind::Value(_) => KindTag::Value,
            AssignmentKind::ModulePar { .. } => KindTag::ModulePar,
            AssignmentKind::Template { .. } => KindTag::Template,
            AssignmentKind::Variable(_) => KindTag::Variable,
            AssignmentKind::VarTemplate(_) => KindTag::VarTemplate,
            AssignmentKind::Timer { .. } => KindTag::Timer,
            AssignmentKind::Port { .. } => KindTag::Port,
            AssignmentKind::FormalParameter { .. } => KindTag::FormalParameter,
            AssignmentKind::Function(_) => KindTag::Function,
            AssignmentKind::ExternalFunction { .. } => KindTag::ExternalFunction,
            AssignmentKind::Altstep(_) => KindTag::Altstep,
            AssignmentKind::Testcase(_) => KindTag::Testcase,
            AssignmentKind::ObjectClass { .. } => KindTag::ObjectClass,
            AssignmentKind::Object { .. } => KindTag::Object,
            AssignmentKind::ObjectSet { .. } => KindTag::ObjectSet,
            AssignmentKind::Ambiguous(_) => KindTag::Ambiguous,
        }
    }

    /// Human name used in messages.
    pub fn description(&self) -> &'static str {
        match self {
            AssignmentKind::Value(value) => match value.origin {
                ValueOrigin::Constant => "constant",
                ValueOrigin::ExternalConstant => "external constant",
                ValueOrigin::Asn => "value",
            },
            AssignmentKind::Type(TypeDefinition::Component { .. }) => "component type",
            AssignmentKind::Type(TypeDefinition::Port { .. }) => "port type",
            AssignmentKind::Type(TypeDefinition::ValueSet { .. }) => "value set",
            kind => kind.tag().description(),
        }
    }

    pub fn is_type_like(&self) -> bool {
        self.tag().is_type_like()
    }

    pub fn is_value_like(&self) -> bool {
        self.tag().is_value_like()
    }

    pub fn is_class_like(&self) -> bool {
        self.tag().is_class_like()
    }

    pub fn is_component_type(&self) -> bool {
        matches!(self, AssignmentKind::Type(TypeDefinition::Component { .. }))
    }

    /// The component scope of a component type.
    pub fn component_scope(&self) -> Option<ScopeId> {
        match self {
            AssignmentKind::Type(TypeDefinition::Component { scope }) => Some(*scope),
            _ => None,
        }
    }

    /// Root scopes created for this assignment; nested scopes hang below
    /// them (a behaviour body is a child of its parameter scope).
    pub fn owned_scopes(&self) -> Vec<ScopeId> {
        match self {
            AssignmentKind::Type(TypeDefinition::Component { scope }) => vec![*scope],
            AssignmentKind::Template {
                params: Some(params),
                ..
            }
            | AssignmentKind::ExternalFunction { params, .. } => vec![*params],
            AssignmentKind::Function(behaviour)
            | AssignmentKind::Altstep(behaviour)
            | AssignmentKind::Testcase(behaviour) => vec![behaviour.params],
            _ => Vec::new(),
        }
    }
}

impl Shift for AssignmentKind {
    fn shift(&mut self, delta: i64) {
        match self {
            AssignmentKind::Type(definition) => definition.shift(delta),
            AssignmentKind::Value(value) => {
                value.ty.shift(delta);
                value.value.shift(delta);
            }
            AssignmentKind::ModulePar { ty, default } => {
                ty.shift(delta);
                default.shift(delta);
            }
            AssignmentKind::Template { ty, body, .. } => {
                ty.shift(delta);
                body.shift(delta);
            }
            AssignmentKind::Variable(variable) | AssignmentKind::VarTemplate(variable) => {
                variable.ty.shift(delta);
                variable.init.shift(delta);
            }
            AssignmentKind::Timer { duration } => duration.shift(delta),
            AssignmentKind::Port { ty } => ty.shift(delta),
            AssignmentKind::FormalParameter { ty, default, .. } => {
                ty.shift(delta);
                default.shift(delta);
            }
            AssignmentKind::Function(behaviour)
            | AssignmentKind::Altstep(behaviour)
            | AssignmentKind::Testcase(behaviour) => {
                behaviour.runs_on.shift(delta);
                behaviour.system.shift(delta);
                behaviour.return_type.shift(delta);
            }
            AssignmentKind::ExternalFunction { return_type, .. } => return_type.shift(delta),
            AssignmentKind::ObjectClass { alias, body } => {
                alias.shift(delta);
                body.shift(delta);
            }
            AssignmentKind::Object { class, body } => {
                class.shift(delta);
                body.shift(delta);
            }
            AssignmentKind::ObjectSet { class, elements } => {
                class.shift(delta);
                elements.shift(delta);
            }
            AssignmentKind::Ambiguous(ambiguous) => {
                ambiguous.form.shift(delta);
                ambiguous.resolved.shift(delta);
            }
        }
    }
}

impl Shift for TypeDefinition {
    fn shift(&mut self, delta: i64) {
        match self {
            TypeDefinition::Subtype(ty) => ty.shift(delta),
            TypeDefinition::Structured { fields, .. } => fields.shift(delta),
            TypeDefinition::Enumerated(_) | TypeDefinition::Component { .. } => {}
            TypeDefinition::Port { messages, .. } => messages.shift(delta),
            TypeDefinition::ValueSet { governor, elements } => {
                governor.shift(delta);
                elements.shift(delta);
            }
        }
    }
}

// ============================================================================
// AMBIGUOUS DECLARATIONS
// ============================================================================

/// The syntactic shape of an ambiguous declaration.
#[derive(Clone, Debug)]
pub enum AmbiguousForm {
    /// `X ::= Q`
    Alias { target: Reference },
    /// `x G ::= rhs`
    Governed { governor: Reference, value: ExprSyntax },
    /// `X G ::= { ... }`
    GovernedSet {
        governor: Reference,
        elements: ExprSyntax,
    },
}

impl AmbiguousForm {
    /// The reference whose kind decides the classification.
    pub fn deciding_reference(&self) -> &Reference {
        match self {
            AmbiguousForm::Alias { target } => target,
            AmbiguousForm::Governed { governor, .. }
            | AmbiguousForm::GovernedSet { governor, .. } => governor,
        }
    }

    pub fn production(&self) -> &'static str {
        match self {
            AmbiguousForm::Alias { .. } => "alias",
            AmbiguousForm::Governed { .. } => "governed assignment",
            AmbiguousForm::GovernedSet { .. } => "governed set",
        }
    }
}

impl Shift for AmbiguousForm {
    fn shift(&mut self, delta: i64) {
        match self {
            AmbiguousForm::Alias { target } => target.shift(delta),
            AmbiguousForm::Governed { governor, value } => {
                governor.shift(delta);
                value.shift(delta);
            }
            AmbiguousForm::GovernedSet { governor, elements } => {
                governor.shift(delta);
                elements.shift(delta);
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("unrecognizable declaration")]
    Unrecognizable,
    #[error("ambiguous declaration: could be {}", describe(.0))]
    Ambiguous(Vec<KindTag>),
    #[error("circular definition: {0}")]
    Circular(String),
    #[error("cannot classify: `{0}` is not defined")]
    UnresolvedTarget(String),
    /// The deciding reference is itself erroneous; already reported there.
    #[error("cannot classify: `{0}` is erroneous")]
    ErroneousTarget(String),
}

fn describe(tags: &[KindTag]) -> String {
    tags.iter()
        .map(|tag| tag.description())
        .collect::<Vec<_>>()
        .join(" or ")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassificationState {
    Unclassified,
    Classifying,
    Classified(KindTag),
    Erroneous(ClassificationError),
}

#[derive(Clone, Debug)]
pub struct AmbiguousAssignment {
    pub form: AmbiguousForm,
    pub state: ClassificationState,
    /// Stamp of the last classification; reused for requests not newer.
    pub classified_at: Option<CompilationTimeStamp>,
    /// Concrete sub-assignment, owned by this node.
    pub resolved: Option<Box<Assignment>>,
}

impl AmbiguousAssignment {
    pub fn new(form: AmbiguousForm) -> Self {
        Self {
            form,
            state: ClassificationState::Unclassified,
            classified_at: None,
            resolved: None,
        }
    }

    pub fn is_erroneous(&self) -> bool {
        matches!(self.state, ClassificationState::Erroneous(_))
    }

    pub fn classified_tag(&self) -> Option<KindTag> {
        match self.state {
            ClassificationState::Classified(tag) => Some(tag),
            _ => None,
        }
    }

    /// Whether a classification at `ts` can reuse the cached outcome.
    pub fn is_current(&self, ts: CompilationTimeStamp) -> bool {
        self.classified_at.is_some_and(|at| at >= ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::hir::arena::Id;
    use text_size::TextRange;

    fn loc(start: u32, end: u32) -> Location {
        Location::new(FileId::new(0), TextRange::new(start.into(), end.into()))
    }

    fn reference(name: &str, start: u32) -> Reference {
        Reference::new(Identifier::new(name), loc(start, start + name.len() as u32))
    }

    fn ambiguous_alias(target: &str) -> Assignment {
        Assignment::new(
            Identifier::new("W"),
            loc(0, 10),
            Id::from_raw(0, 0),
            Visibility::Public,
            AssignmentKind::Ambiguous(AmbiguousAssignment::new(AmbiguousForm::Alias {
                target: reference(target, 6),
            })),
        )
    }

    #[test]
    fn test_descriptions() {
        let constant = AssignmentKind::Value(ValueDefinition {
            origin: ValueOrigin::Constant,
            ty: None,
            value: None,
        });
        assert_eq!(constant.description(), "constant");
        assert_eq!(constant.tag(), KindTag::Value);
        assert!(constant.is_value_like());
        let component = AssignmentKind::Type(TypeDefinition::Component {
            scope: Id::from_raw(1, 0),
        });
        assert_eq!(component.description(), "component type");
        assert!(component.is_component_type());
        assert!(component.is_type_like());
        assert_eq!(component.owned_scopes(), vec![Id::from_raw(1, 0)]);
    }

    #[test]
    fn test_effective_kind_follows_classification() {
        let mut w = ambiguous_alias("Q");
        assert_eq!(w.tag(), KindTag::Ambiguous);
        let resolved = Assignment::new(
            w.identifier.clone(),
            w.location,
            w.scope,
            w.visibility,
            AssignmentKind::ObjectClass {
                alias: Some(reference("Q", 6)),
                body: None,
            },
        );
        let ambiguous = w.as_ambiguous_mut().unwrap();
        ambiguous.resolved = Some(Box::new(resolved));
        ambiguous.state = ClassificationState::Classified(KindTag::ObjectClass);
        assert_eq!(w.tag(), KindTag::ObjectClass);
        assert!(w.effective_kind().is_class_like());
        assert_eq!(w.description(), "object class");
    }

    #[test]
    fn test_shift_reaches_nested_references() {
        let mut w = ambiguous_alias("Q");
        w.shift(4);
        assert_eq!(w.location, loc(4, 14));
        let target = w.as_ambiguous().unwrap().form.deciding_reference();
        assert_eq!(target.location, loc(10, 11));
    }

    #[test]
    fn test_error_messages() {
        let error = ClassificationError::Ambiguous(vec![KindTag::ObjectClass, KindTag::Type]);
        assert_eq!(
            error.to_string(),
            "ambiguous declaration: could be object class or type"
        );
        assert_eq!(
            ClassificationError::Unrecognizable.to_string(),
            "unrecognizable declaration"
        );
    }
}
