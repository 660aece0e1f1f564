use crate::base::Identifier;
use crate::parser::lexer::TokenKind;
use crate::parser::parser::{PResult, Parser};
use crate::syntax::{
    BuiltinType, DefinitionKindSyntax, Direction, FieldSyntax, ListKind, PortKind,
    PortMessageSyntax, Reference, StructuredKind, TypeBodySyntax, TypeSyntax,
};

impl Parser<'_> {
    /// `type ...` definition, returning the defined name.
    pub(super) fn type_definition(&mut self) -> PResult<(Identifier, DefinitionKindSyntax)> {
        self.expect(TokenKind::KwType, "`type`")?;
        let list_follows = self.nth(1) == Some(TokenKind::KwOf);
        let (identifier, body) = match self.current() {
            Some(TokenKind::KwRecord | TokenKind::KwSet | TokenKind::KwUnion) if !list_follows => {
                let kind = match self.current() {
                    Some(TokenKind::KwRecord) => StructuredKind::Record,
                    Some(TokenKind::KwSet) => StructuredKind::Set,
                    _ => StructuredKind::Union,
                };
                self.bump();
                let (identifier, _) = self.expect_ident("a type name")?;
                let fields = self.fields()?;
                (identifier, TypeBodySyntax::Structured { kind, fields })
            }
            Some(TokenKind::KwEnumerated) => {
                self.bump();
                let (identifier, _) = self.expect_ident("a type name")?;
                (identifier, TypeBodySyntax::Enumerated(self.enumeration()?))
            }
            Some(TokenKind::KwComponent) => {
                self.bump();
                let (identifier, _) = self.expect_ident("a type name")?;
                if self.at_contextual("extends") {
                    self.bump();
                    self.reference()?;
                }
                (identifier, TypeBodySyntax::Component(self.component_body()?))
            }
            Some(TokenKind::KwPort) => {
                self.bump();
                let (identifier, _) = self.expect_ident("a type name")?;
                let kind = match self.current() {
                    Some(TokenKind::KwMessage) => PortKind::Message,
                    Some(TokenKind::KwProcedure) => PortKind::Procedure,
                    Some(TokenKind::KwMixed) => PortKind::Mixed,
                    _ => return Err(self.expected("`message`, `procedure` or `mixed`")),
                };
                self.bump();
                let messages = self.port_body()?;
                (identifier, TypeBodySyntax::Port { kind, messages })
            }
            _ => {
                let ty = self.type_syntax()?;
                let (identifier, _) = self.expect_ident("a type name")?;
                self.skip_constraints()?;
                (identifier, TypeBodySyntax::Subtype(ty))
            }
        };
        Ok((identifier, DefinitionKindSyntax::Type(body)))
    }

    /// A type in a type position.
    pub(super) fn type_syntax(&mut self) -> PResult<TypeSyntax> {
        let start = self.offset();
        let builtin = match self.current() {
            Some(TokenKind::KwInteger) => Some(BuiltinType::Integer),
            Some(TokenKind::KwFloat) => Some(BuiltinType::Float),
            Some(TokenKind::KwBoolean) => Some(BuiltinType::Boolean),
            Some(TokenKind::KwCharstring) => Some(BuiltinType::Charstring),
            Some(TokenKind::KwBitstring) => Some(BuiltinType::Bitstring),
            Some(TokenKind::KwOctetstring) => Some(BuiltinType::Octetstring),
            Some(TokenKind::KwHexstring) => Some(BuiltinType::Hexstring),
            Some(TokenKind::KwVerdicttype) => Some(BuiltinType::Verdicttype),
            Some(TokenKind::KwAnytype) => Some(BuiltinType::Anytype),
            Some(TokenKind::KwDefault) => Some(BuiltinType::Default),
            _ => None,
        };
        if let Some(kind) = builtin {
            self.bump();
            return Ok(TypeSyntax::Builtin {
                kind,
                location: self.location_from(start),
            });
        }
        match self.current() {
            Some(TokenKind::KwRecord | TokenKind::KwSet) => {
                let kind = if self.at(TokenKind::KwRecord) {
                    ListKind::RecordOf
                } else {
                    ListKind::SetOf
                };
                self.bump();
                if self.at_contextual("length") {
                    self.bump();
                    self.skip_balanced()?;
                }
                self.expect(TokenKind::KwOf, "`of`")?;
                let element = self.type_syntax()?;
                Ok(TypeSyntax::List {
                    kind,
                    element: Box::new(element),
                    location: self.location_from(start),
                })
            }
            Some(TokenKind::Ident) => Ok(TypeSyntax::Reference(self.reference()?)),
            _ => Err(self.expected("a type")),
        }
    }

    /// `name` or `name.member`
    pub(super) fn reference(&mut self) -> PResult<Reference> {
        let start = self.offset();
        let (identifier, _) = self.expect_ident("a name")?;
        let member = if self.at(TokenKind::Dot) && self.nth(1) == Some(TokenKind::Ident) {
            self.bump();
            Some(self.expect_ident("a name")?.0)
        } else {
            None
        };
        Ok(Reference {
            identifier,
            member,
            location: self.location_from(start),
        })
    }

    /// Subtype constraints after a type name: `(1..10)`, `length(5)`.
    pub(super) fn skip_constraints(&mut self) -> PResult<()> {
        loop {
            if self.at(TokenKind::LParen) {
                self.skip_balanced()?;
            } else if self.at_contextual("length") && self.nth(1) == Some(TokenKind::LParen) {
                self.bump();
                self.skip_balanced()?;
            } else {
                return Ok(());
            }
        }
    }

    pub(super) fn skip_array_dimensions(&mut self) -> PResult<()> {
        while self.at(TokenKind::LBracket) {
            self.skip_balanced()?;
        }
        Ok(())
    }

    fn fields(&mut self) -> PResult<Vec<FieldSyntax>> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut fields = Vec::new();
        if self.eat(TokenKind::RBrace) {
            return Ok(fields);
        }
        loop {
            let start = self.offset();
            let ty = self.type_syntax()?;
            let (identifier, _) = self.expect_ident("a field name")?;
            self.skip_array_dimensions()?;
            self.skip_constraints()?;
            let optional = self.eat(TokenKind::KwOptional);
            fields.push(FieldSyntax {
                identifier,
                location: self.location_from(start),
                ty,
                optional,
            });
            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RBrace, "`}` closing the field list")?;
            return Ok(fields);
        }
    }

    fn enumeration(&mut self) -> PResult<Vec<Identifier>> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut items = Vec::new();
        loop {
            let (identifier, _) = self.expect_ident("an enumeration item")?;
            if self.at(TokenKind::LParen) {
                self.skip_balanced()?;
            }
            items.push(identifier);
            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RBrace, "`}` closing the enumeration")?;
            return Ok(items);
        }
    }

    fn component_body(&mut self) -> PResult<Vec<crate::syntax::LocalSyntax>> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut locals = Vec::new();
        loop {
            match self.current() {
                Some(TokenKind::RBrace) => {
                    self.bump();
                    return Ok(locals);
                }
                Some(TokenKind::Semicolon) => {
                    self.bump();
                }
                Some(
                    TokenKind::KwVar | TokenKind::KwConst | TokenKind::KwTimer | TokenKind::KwPort,
                ) => self.local_declaration(&mut locals, true)?,
                _ => return Err(self.expected("a component element")),
            }
        }
    }

    fn port_body(&mut self) -> PResult<Vec<PortMessageSyntax>> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut messages = Vec::new();
        loop {
            let direction = match self.current() {
                Some(TokenKind::RBrace) => {
                    self.bump();
                    return Ok(messages);
                }
                Some(TokenKind::Semicolon) => {
                    self.bump();
                    continue;
                }
                Some(TokenKind::KwIn) => Direction::In,
                Some(TokenKind::KwOut) => Direction::Out,
                Some(TokenKind::KwInout) => Direction::Inout,
                _ => return Err(self.expected("`in`, `out` or `inout`")),
            };
            self.bump();
            loop {
                let ty = self.type_syntax()?;
                messages.push(PortMessageSyntax { direction, ty });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
    }
}
