//! Recursive descent parser for TTCN-3 modules.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind and offsets
//!     ↓
//! Parser → ModuleSyntax / ItemSyntax (crate::syntax)
//!     ↓
//! HIR lowering → assignments and scopes
//! ```
//!
//! Whole files go through [`parse_module`], which recovers at item
//! boundaries. Incremental re-parsing uses [`parse_items`] on a text range
//! and fails on the first error so the caller can widen the range.

mod error;
mod grammar;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;
mod token_set;

pub use error::{ParseError, ParseResult};
pub use grammar::{parse_items, parse_module};
pub use lexer::{
    Lexer, Token, TokenKind, first_token_from, last_token_in, token_crosses, tokenize,
};
pub use token_set::{EXPRESSION_CONTINUATION, TokenSet, VISIBILITY};
