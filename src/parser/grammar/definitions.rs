use text_size::TextSize;

use super::expressions::ExprContext;
use crate::base::Identifier;
use crate::parser::lexer::TokenKind;
use crate::parser::parser::{PResult, Parser};
use crate::syntax::{
    Boundary, DefinitionKindSyntax, DefinitionSyntax, Direction, ParamSyntax, Reference,
    TypeSyntax, Visibility,
};

impl Parser<'_> {
    pub(super) fn definition(
        &mut self,
        start: TextSize,
        visibility: Option<Visibility>,
    ) -> PResult<DefinitionSyntax> {
        let (identifier, kind) = match self.current() {
            Some(TokenKind::KwType) => self.type_definition()?,
            Some(TokenKind::KwConst) => self.constant()?,
            Some(TokenKind::KwExternal) => self.external()?,
            Some(TokenKind::KwModulepar) => self.module_parameter()?,
            Some(TokenKind::KwTemplate) => self.template()?,
            Some(TokenKind::KwFunction) => self.function()?,
            Some(TokenKind::KwAltstep) => self.altstep()?,
            Some(TokenKind::KwTestcase) => self.testcase()?,
            Some(TokenKind::Ident) => self.asn_assignment()?,
            _ => return Err(self.expected("a module definition")),
        };
        let continuable = !matches!(
            kind,
            DefinitionKindSyntax::Function { .. }
                | DefinitionKindSyntax::Altstep { .. }
                | DefinitionKindSyntax::Testcase { .. }
                | DefinitionKindSyntax::ObjectClass { .. }
        );
        let extension = self.finish_item(true, continuable)?;
        let mut prefixes = Self::prefixes_for(visibility);
        match &kind {
            DefinitionKindSyntax::Const { .. } | DefinitionKindSyntax::Function { .. } => {
                prefixes = prefixes.with(TokenKind::KwExternal);
            }
            DefinitionKindSyntax::Alias { .. } if visibility.is_none() => {
                prefixes = prefixes.with(TokenKind::Ident);
            }
            _ => {}
        }
        Ok(DefinitionSyntax {
            identifier,
            location: self.location_from(start),
            visibility,
            kind,
            boundary: Boundary {
                extension,
                prefixes,
            },
        })
    }

    fn constant(&mut self) -> PResult<(Identifier, DefinitionKindSyntax)> {
        self.expect(TokenKind::KwConst, "`const`")?;
        let ty = self.type_syntax()?;
        let (identifier, _) = self.expect_ident("a constant name")?;
        self.skip_array_dimensions()?;
        self.expect(TokenKind::Assign, "`:=`")?;
        let value = self.expression(ExprContext::Definition)?;
        Ok((identifier, DefinitionKindSyntax::Const { ty, value }))
    }

    fn external(&mut self) -> PResult<(Identifier, DefinitionKindSyntax)> {
        self.expect(TokenKind::KwExternal, "`external`")?;
        match self.current() {
            Some(TokenKind::KwConst) => {
                self.bump();
                let ty = self.type_syntax()?;
                let (identifier, _) = self.expect_ident("a constant name")?;
                Ok((identifier, DefinitionKindSyntax::ExternalConst { ty }))
            }
            Some(TokenKind::KwFunction) => {
                self.bump();
                let (identifier, _) = self.expect_ident("a function name")?;
                let params = self.params()?;
                let return_type = self.return_clause()?;
                Ok((
                    identifier,
                    DefinitionKindSyntax::ExternalFunction {
                        params,
                        return_type,
                    },
                ))
            }
            _ => Err(self.expected("`const` or `function`")),
        }
    }

    fn module_parameter(&mut self) -> PResult<(Identifier, DefinitionKindSyntax)> {
        self.expect(TokenKind::KwModulepar, "`modulepar`")?;
        let ty = self.type_syntax()?;
        let (identifier, _) = self.expect_ident("a module parameter name")?;
        let default = if self.eat(TokenKind::Assign) {
            Some(self.expression(ExprContext::Definition)?)
        } else {
            None
        };
        Ok((identifier, DefinitionKindSyntax::ModulePar { ty, default }))
    }

    fn template(&mut self) -> PResult<(Identifier, DefinitionKindSyntax)> {
        self.expect(TokenKind::KwTemplate, "`template`")?;
        // restriction such as `(value)` or `(omit)`
        if self.at(TokenKind::LParen) {
            self.skip_balanced()?;
        }
        let ty = self.type_syntax()?;
        let (identifier, _) = self.expect_ident("a template name")?;
        let params = if self.at(TokenKind::LParen) {
            self.params()?
        } else {
            Vec::new()
        };
        let mut body_refs = Vec::new();
        if self.at_contextual("modifies") {
            self.bump();
            body_refs.push(self.reference()?);
        }
        self.expect(TokenKind::Assign, "`:=`")?;
        let mut body = self.expression(ExprContext::Definition)?;
        body_refs.append(&mut body.references);
        body.references = body_refs;
        Ok((identifier, DefinitionKindSyntax::Template { ty, params, body }))
    }

    fn function(&mut self) -> PResult<(Identifier, DefinitionKindSyntax)> {
        self.expect(TokenKind::KwFunction, "`function`")?;
        let (identifier, _) = self.expect_ident("a function name")?;
        let params = self.params()?;
        let mut runs_on = None;
        let mut return_type = None;
        loop {
            match self.current() {
                Some(TokenKind::KwRuns) => runs_on = Some(self.runs_on_clause()?),
                Some(TokenKind::KwMtc | TokenKind::KwSystem) => {
                    self.bump();
                    self.reference()?;
                }
                Some(TokenKind::KwReturn) => return_type = self.return_clause()?,
                _ => break,
            }
        }
        let body = self.block()?;
        Ok((
            identifier,
            DefinitionKindSyntax::Function {
                params,
                runs_on,
                return_type,
                body,
            },
        ))
    }

    fn altstep(&mut self) -> PResult<(Identifier, DefinitionKindSyntax)> {
        self.expect(TokenKind::KwAltstep, "`altstep`")?;
        let (identifier, _) = self.expect_ident("an altstep name")?;
        let params = self.params()?;
        let mut runs_on = None;
        loop {
            match self.current() {
                Some(TokenKind::KwRuns) => runs_on = Some(self.runs_on_clause()?),
                Some(TokenKind::KwMtc | TokenKind::KwSystem) => {
                    self.bump();
                    self.reference()?;
                }
                _ => break,
            }
        }
        let body = self.block()?;
        Ok((
            identifier,
            DefinitionKindSyntax::Altstep {
                params,
                runs_on,
                body,
            },
        ))
    }

    fn testcase(&mut self) -> PResult<(Identifier, DefinitionKindSyntax)> {
        self.expect(TokenKind::KwTestcase, "`testcase`")?;
        let (identifier, _) = self.expect_ident("a testcase name")?;
        let params = self.params()?;
        let mut runs_on = None;
        let mut system = None;
        loop {
            match self.current() {
                Some(TokenKind::KwRuns) => runs_on = Some(self.runs_on_clause()?),
                Some(TokenKind::KwSystem) => {
                    self.bump();
                    system = Some(self.reference()?);
                }
                _ => break,
            }
        }
        let body = self.block()?;
        Ok((
            identifier,
            DefinitionKindSyntax::Testcase {
                params,
                runs_on,
                system,
                body,
            },
        ))
    }

    fn runs_on_clause(&mut self) -> PResult<Reference> {
        self.expect(TokenKind::KwRuns, "`runs`")?;
        self.expect(TokenKind::KwOn, "`on`")?;
        self.reference()
    }

    fn return_clause(&mut self) -> PResult<Option<TypeSyntax>> {
        if !self.eat(TokenKind::KwReturn) {
            return Ok(None);
        }
        self.eat(TokenKind::KwTemplate);
        Ok(Some(self.type_syntax()?))
    }

    pub(super) fn params(&mut self) -> PResult<Vec<ParamSyntax>> {
        self.expect(TokenKind::LParen, "`(`")?;
        let mut params = Vec::new();
        if self.eat(TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let start = self.offset();
            let direction = match self.current() {
                Some(TokenKind::KwIn) => Direction::In,
                Some(TokenKind::KwOut) => Direction::Out,
                Some(TokenKind::KwInout) => Direction::Inout,
                _ => Direction::default(),
            };
            if matches!(
                self.current(),
                Some(TokenKind::KwIn | TokenKind::KwOut | TokenKind::KwInout)
            ) {
                self.bump();
            }
            let template = self.eat(TokenKind::KwTemplate);
            let ty = self.type_syntax()?;
            let (identifier, _) = self.expect_ident("a parameter name")?;
            self.skip_array_dimensions()?;
            let default = if self.eat(TokenKind::Assign) {
                Some(self.expression(ExprContext::Argument)?)
            } else {
                None
            };
            params.push(ParamSyntax {
                identifier,
                location: self.location_from(start),
                direction,
                template,
                ty,
                default,
            });
            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen, "`)`")?;
            return Ok(params);
        }
    }

    /// `Name ::= CLASS {...}`, `X ::= Q`, `x G ::= rhs`, `X G ::= {...}`
    fn asn_assignment(&mut self) -> PResult<(Identifier, DefinitionKindSyntax)> {
        let (identifier, _) = self.expect_ident("a name")?;
        if self.eat(TokenKind::AsnAssign) {
            if self.at(TokenKind::KwClass) {
                let start = self.offset();
                self.bump();
                if !self.at(TokenKind::LBrace) {
                    return Err(self.expected("`{`"));
                }
                self.skip_balanced()?;
                let body = self.location_from(start);
                return Ok((identifier, DefinitionKindSyntax::ObjectClass { body }));
            }
            let target = self.reference()?;
            return Ok((identifier, DefinitionKindSyntax::Alias { target }));
        }
        if self.at(TokenKind::Ident) {
            let governor = self.reference()?;
            self.expect(TokenKind::AsnAssign, "`::=`")?;
            let rhs = self.expression(ExprContext::Definition)?;
            let kind = if identifier.starts_uppercase() {
                DefinitionKindSyntax::GovernedSet {
                    governor,
                    elements: rhs,
                }
            } else {
                DefinitionKindSyntax::Governed {
                    governor,
                    value: rhs,
                }
            };
            return Ok((identifier, kind));
        }
        Err(self.expected("`::=`"))
    }
}

