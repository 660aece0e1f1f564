//! Syntax elements produced by the parser.
//!
//! These are plain data: every element records its [`Location`] and, for
//! module items, the [`Boundary`] tokens the incremental re-parser uses to
//! decide whether an edit next to the element lexically extends it.
//!
//! [`Location`]: crate::base::Location

mod expr;
mod items;
mod types;

pub use expr::{BlockSyntax, ExprSyntax, LocalKindSyntax, LocalSyntax, Reference, StatementSyntax};
pub use items::{
    AttributeSyntax, Boundary, ControlSyntax, DefinitionKindSyntax, DefinitionSyntax, GroupSyntax,
    ImportSelection, ImportSyntax, ItemSyntax, ModuleSyntax, ParamSyntax,
};
pub use types::{
    BuiltinType, Direction, FieldSyntax, ListKind, PortKind, PortMessageSyntax, StructuredKind,
    TypeBodySyntax, TypeSyntax, Visibility,
};
