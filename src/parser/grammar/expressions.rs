//! Opaque expressions, statement blocks and local declarations.
//!
//! Expressions are not parsed into trees. The scanner only tracks delimiter
//! nesting to find where an expression ends and records the identifiers
//! that denote definitions.

use crate::base::{Identifier, Location};
use crate::parser::error::ParseError;
use crate::parser::lexer::TokenKind;
use crate::parser::parser::{PResult, Parser, closer_of, is_closer};
use crate::syntax::{
    BlockSyntax, ExprSyntax, LocalKindSyntax, LocalSyntax, Reference, StatementSyntax,
};

/// Where an expression appears; decides which tokens end it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ExprContext {
    /// Right-hand side of a module-level definition.
    Definition,
    /// Initialiser or default inside a list; a top-level `,` ends it.
    Argument,
    /// A statement inside a block.
    Statement,
}

/// Identifiers with a fixed meaning inside expressions.
const CONTEXTUAL_KEYWORDS: &[&str] = &[
    "length",
    "ifpresent",
    "complement",
    "pattern",
    "permutation",
    "superset",
    "subset",
    "infinity",
    "not_a_number",
    "getverdict",
    "running",
    "now",
    "interleave",
    "nowait",
];

/// Redirect keywords after `->`.
const REDIRECT_KEYWORDS: &[&str] = &["value", "sender", "param", "timestamp"];

impl Parser<'_> {
    pub(super) fn expression(&mut self, context: ExprContext) -> PResult<ExprSyntax> {
        let start = self.offset();
        let first = self.mark();
        let mut references = Vec::new();
        let mut stack: Vec<TokenKind> = Vec::new();
        loop {
            let Some(kind) = self.current() else {
                if !stack.is_empty() {
                    return Err(self.error("unclosed delimiter in expression"));
                }
                break;
            };
            if stack.is_empty() && self.advanced_since(first) && self.ends_expression(kind, context) {
                break;
            }
            if let Some(closer) = closer_of(kind) {
                if kind == TokenKind::LBrace
                    && stack.is_empty()
                    && context == ExprContext::Statement
                    && self.advanced_since(first)
                    && self.brace_starts_block()
                {
                    break;
                }
                stack.push(closer);
            } else if is_closer(kind) {
                match stack.pop() {
                    Some(expected) if expected == kind => {}
                    Some(_) => return Err(self.error(format!("unexpected {kind}"))),
                    None => break,
                }
            } else if kind == TokenKind::Ident {
                if let Some(reference) = self.expression_reference(&stack)? {
                    references.push(reference);
                    continue;
                }
            } else if kind == TokenKind::Error {
                return Err(self.error("invalid token"));
            } else if stack.is_empty()
                && context == ExprContext::Definition
                && matches!(kind, TokenKind::Assign | TokenKind::AsnAssign)
            {
                // A definition has exactly one assignment operator.
                return Err(self.error(format!("unexpected {kind}")));
            }
            self.bump();
        }
        if !self.advanced_since(first) {
            return Err(self.expected("an expression"));
        }
        Ok(ExprSyntax {
            location: self.location_from(start),
            references,
        })
    }

    fn ends_expression(&self, kind: TokenKind, context: ExprContext) -> bool {
        match kind {
            TokenKind::Semicolon => true,
            TokenKind::Comma => context == ExprContext::Argument,
            TokenKind::KwVar | TokenKind::KwTimer => true,
            TokenKind::Ident => {
                context == ExprContext::Definition
                    && (self.nth(1) == Some(TokenKind::AsnAssign)
                        || (self.nth(1) == Some(TokenKind::Ident)
                            && self.nth(2) == Some(TokenKind::AsnAssign)))
            }
            other => other.starts_item(),
        }
    }

    /// A `{` after these tokens is value notation, otherwise it opens a block.
    fn brace_starts_block(&self) -> bool {
        !matches!(
            self.previous(),
            Some(
                TokenKind::Assign
                    | TokenKind::KwReturn
                    | TokenKind::Comma
                    | TokenKind::Colon
                    | TokenKind::AsnAssign
            )
        )
    }

    /// Consume and return the reference at the cursor, or `None` when the
    /// identifier does not denote a definition (the cursor is left on it).
    fn expression_reference(&mut self, stack: &[TokenKind]) -> PResult<Option<Reference>> {
        let text = self.current_text();
        if self.previous() == Some(TokenKind::Dot) {
            return Ok(None);
        }
        if stack.contains(&TokenKind::RBrace) && self.nth(1) == Some(TokenKind::Assign) {
            return Ok(None);
        }
        if CONTEXTUAL_KEYWORDS.contains(&text) {
            return Ok(None);
        }
        if self.previous() == Some(TokenKind::Arrow) && REDIRECT_KEYWORDS.contains(&text) {
            return Ok(None);
        }
        self.reference().map(Some)
    }

    /// `{ statements }`
    pub(super) fn block(&mut self) -> PResult<BlockSyntax> {
        let start = self.offset();
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut statements = Vec::new();
        loop {
            match self.current() {
                None => return Err(self.error("unclosed block")),
                Some(TokenKind::RBrace) => {
                    self.bump();
                    break;
                }
                Some(TokenKind::Semicolon) => {
                    self.bump();
                }
                Some(TokenKind::KwVar | TokenKind::KwConst | TokenKind::KwTimer) => {
                    let mut locals = Vec::new();
                    self.local_declaration(&mut locals, false)?;
                    statements.extend(locals.into_iter().map(StatementSyntax::Local));
                }
                Some(TokenKind::LBrace) => statements.push(StatementSyntax::Block(self.block()?)),
                Some(TokenKind::KwFor) => {
                    statements.push(StatementSyntax::Block(self.for_statement()?));
                }
                Some(TokenKind::RParen | TokenKind::RBracket) => {
                    return Err(self.error(format!("unexpected {}", self.current_text())));
                }
                Some(_) => {
                    let expression = self.expression(ExprContext::Statement)?;
                    statements.push(StatementSyntax::Expression(expression));
                }
            }
        }
        Ok(BlockSyntax {
            location: self.location_from(start),
            statements,
        })
    }

    /// `for (init; condition; step) { body }` becomes a block holding the
    /// loop variable, the loop expressions and the body.
    fn for_statement(&mut self) -> PResult<BlockSyntax> {
        let start = self.offset();
        self.expect(TokenKind::KwFor, "`for`")?;
        self.expect(TokenKind::LParen, "`(`")?;
        let mut statements = Vec::new();
        if self.at(TokenKind::KwVar) {
            let mut locals = Vec::new();
            self.local_declaration(&mut locals, false)?;
            statements.extend(locals.into_iter().map(StatementSyntax::Local));
        } else {
            statements.push(StatementSyntax::Expression(
                self.expression(ExprContext::Argument)?,
            ));
        }
        self.expect(TokenKind::Semicolon, "`;`")?;
        statements.push(StatementSyntax::Expression(
            self.expression(ExprContext::Argument)?,
        ));
        self.expect(TokenKind::Semicolon, "`;`")?;
        statements.push(StatementSyntax::Expression(
            self.expression(ExprContext::Argument)?,
        ));
        self.expect(TokenKind::RParen, "`)`")?;
        statements.push(StatementSyntax::Block(self.block()?));
        Ok(BlockSyntax {
            location: self.location_from(start),
            statements,
        })
    }

    /// `var [template] T a [:= e], b`, `const T c := e`, `timer t [:= e]`,
    /// `port P p` (components only).
    pub(super) fn local_declaration(
        &mut self,
        out: &mut Vec<LocalSyntax>,
        allow_port: bool,
    ) -> PResult<()> {
        match self.current() {
            Some(TokenKind::KwVar) => {
                self.bump();
                let template = self.eat(TokenKind::KwTemplate);
                let ty = self.type_syntax()?;
                for Declarator {
                    identifier,
                    location,
                    init,
                } in self.declarators(true)?
                {
                    let ty = ty.clone();
                    out.push(LocalSyntax {
                        identifier,
                        location,
                        kind: LocalKindSyntax::Variable { ty, init, template },
                    });
                }
            }
            Some(TokenKind::KwConst) => {
                self.bump();
                let ty = self.type_syntax()?;
                for Declarator {
                    identifier,
                    location,
                    init,
                } in self.declarators(true)?
                {
                    let Some(value) = init else {
                        return Err(ParseError::new(
                            location,
                            "a constant needs an initial value",
                        ));
                    };
                    let ty = ty.clone();
                    out.push(LocalSyntax {
                        identifier,
                        location,
                        kind: LocalKindSyntax::Const { ty, value },
                    });
                }
            }
            Some(TokenKind::KwTimer) => {
                self.bump();
                for Declarator {
                    identifier,
                    location,
                    init,
                } in self.declarators(true)?
                {
                    out.push(LocalSyntax {
                        identifier,
                        location,
                        kind: LocalKindSyntax::Timer { duration: init },
                    });
                }
            }
            Some(TokenKind::KwPort) if allow_port => {
                self.bump();
                let ty = self.type_syntax()?;
                for Declarator {
                    identifier,
                    location,
                    ..
                } in self.declarators(false)?
                {
                    let ty = ty.clone();
                    out.push(LocalSyntax {
                        identifier,
                        location,
                        kind: LocalKindSyntax::Port { ty },
                    });
                }
            }
            _ => return Err(self.expected("a local definition")),
        }
        Ok(())
    }

    fn declarators(&mut self, allow_init: bool) -> PResult<Vec<Declarator>> {
        let mut declarators = Vec::new();
        loop {
            let start = self.offset();
            let (identifier, _) = self.expect_ident("a name")?;
            self.skip_array_dimensions()?;
            let init = if allow_init && self.eat(TokenKind::Assign) {
                Some(self.expression(ExprContext::Argument)?)
            } else {
                None
            };
            declarators.push(Declarator {
                identifier,
                location: self.location_from(start),
                init,
            });
            if !self.eat(TokenKind::Comma) {
                return Ok(declarators);
            }
        }
    }
}

/// One `name [:= init]` of a local declaration list.
struct Declarator {
    identifier: Identifier,
    location: Location,
    init: Option<ExprSyntax>,
}
