use crate::base::{Identifier, Location, Shift};

use super::{LocalSyntax, Reference};

/// Visibility prefix of a module item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Friend,
}

impl Visibility {
    /// Whether other modules may import a definition with this visibility.
    ///
    /// Friend modules are not modelled, so friend definitions stay local.
    pub fn is_importable(self) -> bool {
        self == Visibility::Public
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Integer,
    Float,
    Boolean,
    Charstring,
    Bitstring,
    Octetstring,
    Hexstring,
    Verdicttype,
    Anytype,
    Default,
}

impl BuiltinType {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Integer => "integer",
            BuiltinType::Float => "float",
            BuiltinType::Boolean => "boolean",
            BuiltinType::Charstring => "charstring",
            BuiltinType::Bitstring => "bitstring",
            BuiltinType::Octetstring => "octetstring",
            BuiltinType::Hexstring => "hexstring",
            BuiltinType::Verdicttype => "verdicttype",
            BuiltinType::Anytype => "anytype",
            BuiltinType::Default => "default",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    RecordOf,
    SetOf,
}

/// A type as written in a type position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSyntax {
    Builtin {
        kind: BuiltinType,
        location: Location,
    },
    Reference(Reference),
    List {
        kind: ListKind,
        element: Box<TypeSyntax>,
        location: Location,
    },
}

impl TypeSyntax {
    pub fn location(&self) -> Location {
        match self {
            TypeSyntax::Builtin { location, .. } | TypeSyntax::List { location, .. } => *location,
            TypeSyntax::Reference(reference) => reference.location,
        }
    }

    /// Every reference mentioned by this type, outermost first.
    pub fn references(&self) -> Vec<&Reference> {
        match self {
            TypeSyntax::Builtin { .. } => Vec::new(),
            TypeSyntax::Reference(reference) => vec![reference],
            TypeSyntax::List { element, .. } => element.references(),
        }
    }
}

impl Shift for TypeSyntax {
    fn shift(&mut self, delta: i64) {
        match self {
            TypeSyntax::Builtin { location, .. } => location.shift(delta),
            TypeSyntax::Reference(reference) => reference.shift(delta),
            TypeSyntax::List {
                element, location, ..
            } => {
                element.shift(delta);
                location.shift(delta);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructuredKind {
    Record,
    Set,
    Union,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortKind {
    Message,
    Procedure,
    Mixed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    In,
    Out,
    Inout,
}

/// A field of a record, set or union type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSyntax {
    pub identifier: Identifier,
    pub location: Location,
    pub ty: TypeSyntax,
    pub optional: bool,
}

impl Shift for FieldSyntax {
    fn shift(&mut self, delta: i64) {
        self.location.shift(delta);
        self.ty.shift(delta);
    }
}

/// One message type of a port type, with its direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortMessageSyntax {
    pub direction: Direction,
    pub ty: TypeSyntax,
}

impl Shift for PortMessageSyntax {
    fn shift(&mut self, delta: i64) {
        self.ty.shift(delta);
    }
}

/// Right-hand side of a `type` definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeBodySyntax {
    /// `type integer Name`, `type Other Name`, `type record of T Name`
    Subtype(TypeSyntax),
    Structured {
        kind: StructuredKind,
        fields: Vec<FieldSyntax>,
    },
    Enumerated(Vec<Identifier>),
    Component(Vec<LocalSyntax>),
    Port {
        kind: PortKind,
        messages: Vec<PortMessageSyntax>,
    },
}
