use crate::base::{Identifier, Location, Shift};

use super::TypeSyntax;

/// A name used somewhere a definition is expected.
///
/// `a.b` is recorded with `member = Some(b)`: the resolver first tries `a`
/// as a definition and falls back to reading it as a module name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub identifier: Identifier,
    pub member: Option<Identifier>,
    pub location: Location,
}

impl Reference {
    pub fn new(identifier: Identifier, location: Location) -> Self {
        Self {
            identifier,
            member: None,
            location,
        }
    }

    /// `M.x` spelling for messages.
    pub fn display(&self) -> String {
        match &self.member {
            Some(member) => format!("{}.{}", self.identifier, member),
            None => self.identifier.to_string(),
        }
    }
}

impl Shift for Reference {
    fn shift(&mut self, delta: i64) {
        self.location.shift(delta);
    }
}

/// An opaque expression; only the references it mentions are kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExprSyntax {
    pub location: Location,
    pub references: Vec<Reference>,
}

impl Shift for ExprSyntax {
    fn shift(&mut self, delta: i64) {
        self.location.shift(delta);
        self.references.shift(delta);
    }
}

/// `{ ... }` statement block of a function, altstep, testcase or control part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockSyntax {
    pub location: Location,
    pub statements: Vec<StatementSyntax>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatementSyntax {
    Local(LocalSyntax),
    Block(BlockSyntax),
    Expression(ExprSyntax),
}

/// A block-local or component-local declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalSyntax {
    pub identifier: Identifier,
    pub location: Location,
    pub kind: LocalKindSyntax,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocalKindSyntax {
    Variable {
        ty: TypeSyntax,
        init: Option<ExprSyntax>,
        template: bool,
    },
    Const {
        ty: TypeSyntax,
        value: ExprSyntax,
    },
    Timer {
        duration: Option<ExprSyntax>,
    },
    Port {
        ty: TypeSyntax,
    },
}
