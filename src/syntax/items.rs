use text_size::TextRange;

use crate::base::{Identifier, Location};
use crate::parser::TokenSet;

use super::{BlockSyntax, Direction, ExprSyntax, Reference, TypeBodySyntax, TypeSyntax, Visibility};

/// A parsed `module Name { ... }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleSyntax {
    pub identifier: Identifier,
    pub location: Location,
    /// Range strictly between the module braces.
    pub body: TextRange,
    pub items: Vec<ItemSyntax>,
}

/// Tokens deciding whether text next to an element belongs to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Boundary {
    /// Tokens that, when they now follow the element, lexically extend it.
    pub extension: TokenSet,
    /// Tokens that, when they now precede the element, attach to it.
    pub prefixes: TokenSet,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemSyntax {
    Definition(DefinitionSyntax),
    Group(GroupSyntax),
    Import(ImportSyntax),
    Control(ControlSyntax),
    Attributes(AttributeSyntax),
}

impl ItemSyntax {
    pub fn location(&self) -> Location {
        match self {
            ItemSyntax::Definition(d) => d.location,
            ItemSyntax::Group(g) => g.location,
            ItemSyntax::Import(i) => i.location,
            ItemSyntax::Control(c) => c.location,
            ItemSyntax::Attributes(a) => a.location,
        }
    }

    pub fn boundary(&self) -> Boundary {
        match self {
            ItemSyntax::Definition(d) => d.boundary,
            ItemSyntax::Group(g) => g.boundary,
            ItemSyntax::Import(i) => i.boundary,
            ItemSyntax::Control(c) => c.boundary,
            ItemSyntax::Attributes(a) => a.boundary,
        }
    }
}

/// A module-level (or group-level) definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionSyntax {
    pub identifier: Identifier,
    pub location: Location,
    pub visibility: Option<Visibility>,
    pub kind: DefinitionKindSyntax,
    pub boundary: Boundary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefinitionKindSyntax {
    Type(TypeBodySyntax),
    Const {
        ty: TypeSyntax,
        value: ExprSyntax,
    },
    ExternalConst {
        ty: TypeSyntax,
    },
    ModulePar {
        ty: TypeSyntax,
        default: Option<ExprSyntax>,
    },
    Template {
        ty: TypeSyntax,
        params: Vec<ParamSyntax>,
        body: ExprSyntax,
    },
    Function {
        params: Vec<ParamSyntax>,
        runs_on: Option<Reference>,
        return_type: Option<TypeSyntax>,
        body: BlockSyntax,
    },
    ExternalFunction {
        params: Vec<ParamSyntax>,
        return_type: Option<TypeSyntax>,
    },
    Altstep {
        params: Vec<ParamSyntax>,
        runs_on: Option<Reference>,
        body: BlockSyntax,
    },
    Testcase {
        params: Vec<ParamSyntax>,
        runs_on: Option<Reference>,
        system: Option<Reference>,
        body: BlockSyntax,
    },
    /// `Name ::= CLASS { ... }`
    ObjectClass {
        body: Location,
    },
    /// `X ::= Q`
    Alias {
        target: Reference,
    },
    /// `x G ::= rhs`
    Governed {
        governor: Reference,
        value: ExprSyntax,
    },
    /// `X G ::= { ... }`
    GovernedSet {
        governor: Reference,
        elements: ExprSyntax,
    },
}

impl DefinitionKindSyntax {
    /// Syntactic description, available before any semantic analysis.
    pub fn description(&self) -> &'static str {
        match self {
            DefinitionKindSyntax::Type(_) => "type",
            DefinitionKindSyntax::Const { .. } => "constant",
            DefinitionKindSyntax::ExternalConst { .. } => "external constant",
            DefinitionKindSyntax::ModulePar { .. } => "module parameter",
            DefinitionKindSyntax::Template { .. } => "template",
            DefinitionKindSyntax::Function { .. } => "function",
            DefinitionKindSyntax::ExternalFunction { .. } => "external function",
            DefinitionKindSyntax::Altstep { .. } => "altstep",
            DefinitionKindSyntax::Testcase { .. } => "testcase",
            DefinitionKindSyntax::ObjectClass { .. } => "object class",
            DefinitionKindSyntax::Alias { .. }
            | DefinitionKindSyntax::Governed { .. }
            | DefinitionKindSyntax::GovernedSet { .. } => "assignment",
        }
    }
}

/// A formal parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSyntax {
    pub identifier: Identifier,
    pub location: Location,
    pub direction: Direction,
    pub template: bool,
    pub ty: TypeSyntax,
    pub default: Option<ExprSyntax>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSyntax {
    pub identifier: Identifier,
    pub location: Location,
    /// Range strictly between the group braces.
    pub body: TextRange,
    pub visibility: Option<Visibility>,
    pub items: Vec<ItemSyntax>,
    pub boundary: Boundary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportSelection {
    All,
    Names(Vec<Identifier>),
}

impl ImportSelection {
    pub fn includes(&self, name: &str) -> bool {
        match self {
            ImportSelection::All => true,
            ImportSelection::Names(names) => names.iter().any(|n| n.name() == name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSyntax {
    pub location: Location,
    pub visibility: Option<Visibility>,
    pub module: Reference,
    pub selection: ImportSelection,
    pub boundary: Boundary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlSyntax {
    pub location: Location,
    pub body: BlockSyntax,
    pub boundary: Boundary,
}

/// Module-level `with { ... }` attribute block; its content is opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSyntax {
    pub location: Location,
    pub body: TextRange,
    pub boundary: Boundary,
}
