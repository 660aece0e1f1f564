//! Grammar rules for TTCN-3 modules.
//!
//! - `mod.rs` - entry points, module and item dispatch, groups, imports,
//!   control part, attribute blocks
//! - `definitions` - constants, templates, behaviours, ASN.1 style assignments
//! - `types` - type references and `type` definitions
//! - `expressions` - opaque expressions, statement blocks, local declarations

mod definitions;
mod expressions;
mod types;

use text_size::{TextRange, TextSize};

use super::error::{ParseError, ParseResult};
use super::lexer::TokenKind;
use super::parser::{PResult, Parser};
use super::token_set::{TokenSet, VISIBILITY};
use crate::base::{FileId, Location};
use crate::syntax::{
    AttributeSyntax, Boundary, ControlSyntax, GroupSyntax, ImportSelection, ImportSyntax,
    ItemSyntax, ModuleSyntax, Visibility,
};

/// Parse a whole module file.
///
/// Errors inside items are recovered from at item boundaries, so a module
/// with a few broken definitions still yields the intact ones.
pub fn parse_module(file: FileId, text: &str) -> ParseResult<ModuleSyntax> {
    let range = TextRange::up_to(TextSize::of(text));
    let mut p = Parser::new(file, text, range, false);
    match p.module() {
        Ok(module) => {
            let errors = std::mem::take(&mut p.errors);
            if errors.is_empty() {
                ParseResult::ok(module)
            } else {
                ParseResult::ok_with_errors(module, errors)
            }
        }
        Err(error) => {
            let mut errors = std::mem::take(&mut p.errors);
            errors.push(error);
            ParseResult::err(errors)
        }
    }
}

/// Parse the module items found in `range` of `text`.
///
/// Used to re-parse a damaged region: the region must hold a sequence of
/// complete items, any error fails the whole call.
pub fn parse_items(file: FileId, text: &str, range: TextRange) -> Result<Vec<ItemSyntax>, ParseError> {
    let Some(slice) = text.get(std::ops::Range::<usize>::from(range)) else {
        return Err(ParseError::unbalanced(
            Location::new(file, range),
            "region is outside of the text",
        ));
    };
    let mut p = Parser::new(file, slice, range, true);
    let items = p.items_until_close()?;
    if !p.at_end() {
        return Err(p.error("unexpected `}`"));
    }
    Ok(items)
}

impl Parser<'_> {
    fn module(&mut self) -> PResult<ModuleSyntax> {
        let start = self.offset();
        self.expect(TokenKind::KwModule, "`module`")?;
        let (identifier, _) = self.expect_ident("a module name")?;
        if self.at_contextual("language") {
            self.bump();
            self.expect(TokenKind::Charstring, "a language string")?;
        }
        let open = self.expect(TokenKind::LBrace, "`{`")?;
        let items = self.items_until_close()?;
        let close = self.expect(TokenKind::RBrace, "`}` closing the module")?;
        let body = TextRange::new(open.range().end(), close.offset);
        if self.at(TokenKind::KwWith) && self.nth(1) == Some(TokenKind::LBrace) {
            self.bump();
            self.skip_balanced()?;
        }
        self.eat(TokenKind::Semicolon);
        let location = self.location_from(start);
        if !self.at_end() {
            let error = self.error("unexpected input after the module");
            self.errors.push(error);
        }
        Ok(ModuleSyntax {
            identifier,
            location,
            body,
            items,
        })
    }

    /// Items up to (not including) a closing `}` or the end of input.
    pub(super) fn items_until_close(&mut self) -> PResult<Vec<ItemSyntax>> {
        let mut items = Vec::new();
        while let Some(kind) = self.current() {
            match kind {
                TokenKind::RBrace => break,
                TokenKind::Semicolon => {
                    self.bump();
                }
                _ => {
                    let mark = self.mark();
                    match self.item() {
                        Ok(item) => items.push(item),
                        Err(error) if !self.strict => {
                            tracing::trace!("[PARSE] recovering after: {}", error.message);
                            self.errors.push(error);
                            self.reset(mark);
                            self.recover();
                        }
                        Err(error) => return Err(error),
                    }
                }
            }
        }
        Ok(items)
    }

    fn item(&mut self) -> PResult<ItemSyntax> {
        let start = self.offset();
        let visibility = self.visibility();
        match self.current() {
            Some(TokenKind::KwImport) => self.import(start, visibility).map(ItemSyntax::Import),
            Some(TokenKind::KwGroup) => self.group(start, visibility).map(ItemSyntax::Group),
            Some(TokenKind::KwControl) if visibility.is_none() => {
                self.control(start).map(ItemSyntax::Control)
            }
            Some(TokenKind::KwWith) if visibility.is_none() => {
                self.attributes(start).map(ItemSyntax::Attributes)
            }
            Some(_) => self
                .definition(start, visibility)
                .map(ItemSyntax::Definition),
            None => Err(self.expected("a module definition")),
        }
    }

    fn visibility(&mut self) -> Option<Visibility> {
        let visibility = match self.current()? {
            TokenKind::KwPublic => Visibility::Public,
            TokenKind::KwPrivate => Visibility::Private,
            TokenKind::KwFriend => Visibility::Friend,
            _ => return None,
        };
        self.bump();
        Some(visibility)
    }

    /// Optional `with { ... }` and `;` after an item, and the resulting
    /// extension starters.
    fn finish_item(&mut self, allow_with: bool, continuable: bool) -> PResult<TokenSet> {
        if allow_with && self.at(TokenKind::KwWith) && self.nth(1) == Some(TokenKind::LBrace) {
            self.bump();
            self.skip_balanced()?;
        }
        if self.eat(TokenKind::Semicolon) {
            return Ok(TokenSet::EMPTY);
        }
        let mut extension = TokenSet::new(&[TokenKind::Semicolon]);
        if allow_with {
            extension = extension.with(TokenKind::KwWith);
        }
        if continuable && self.previous() != Some(TokenKind::RBrace) {
            extension = extension.union(super::token_set::EXPRESSION_CONTINUATION);
        }
        Ok(extension)
    }

    fn prefixes_for(visibility: Option<Visibility>) -> TokenSet {
        if visibility.is_none() {
            VISIBILITY
        } else {
            TokenSet::EMPTY
        }
    }

    fn import(&mut self, start: TextSize, visibility: Option<Visibility>) -> PResult<ImportSyntax> {
        self.expect(TokenKind::KwImport, "`import`")?;
        self.expect(TokenKind::KwFrom, "`from`")?;
        let (name, name_location) = self.expect_ident("a module name")?;
        let module = crate::syntax::Reference::new(name, name_location);
        let selection = if self.eat(TokenKind::KwAll) {
            if self.at_contextual("except") && self.nth(1) == Some(TokenKind::LBrace) {
                self.bump();
                self.skip_balanced()?;
            }
            ImportSelection::All
        } else if self.at(TokenKind::LBrace) {
            self.import_list()?
        } else {
            return Err(self.expected("`all` or an import list"));
        };
        let extension = self.finish_item(true, false)?;
        Ok(ImportSyntax {
            location: self.location_from(start),
            visibility,
            module,
            selection,
            boundary: Boundary {
                extension,
                prefixes: Self::prefixes_for(visibility),
            },
        })
    }

    fn import_list(&mut self) -> PResult<ImportSelection> {
        self.expect(TokenKind::LBrace, "`{`")?;
        let mut names = Vec::new();
        let mut all = false;
        loop {
            match self.current() {
                None => return Err(self.expected("`}` closing the import list")),
                Some(TokenKind::RBrace) => {
                    self.bump();
                    break;
                }
                Some(TokenKind::Ident) => {
                    let (name, _) = self.expect_ident("a name")?;
                    names.push(name);
                }
                Some(TokenKind::KwAll) => {
                    self.bump();
                    all = true;
                }
                Some(
                    TokenKind::Comma
                    | TokenKind::Semicolon
                    | TokenKind::KwType
                    | TokenKind::KwConst
                    | TokenKind::KwTemplate
                    | TokenKind::KwFunction
                    | TokenKind::KwAltstep
                    | TokenKind::KwTestcase
                    | TokenKind::KwModulepar
                    | TokenKind::KwGroup,
                ) => {
                    self.bump();
                }
                Some(_) => return Err(self.expected("an imported name")),
            }
        }
        Ok(if all {
            ImportSelection::All
        } else {
            ImportSelection::Names(names)
        })
    }

    fn group(&mut self, start: TextSize, visibility: Option<Visibility>) -> PResult<GroupSyntax> {
        self.expect(TokenKind::KwGroup, "`group`")?;
        let (identifier, _) = self.expect_ident("a group name")?;
        let open = self.expect(TokenKind::LBrace, "`{`")?;
        let items = self.items_until_close()?;
        let close = self.expect(TokenKind::RBrace, "`}` closing the group")?;
        let body = TextRange::new(open.range().end(), close.offset);
        let extension = self.finish_item(true, false)?;
        Ok(GroupSyntax {
            identifier,
            location: self.location_from(start),
            body,
            visibility,
            items,
            boundary: Boundary {
                extension,
                prefixes: Self::prefixes_for(visibility),
            },
        })
    }

    fn control(&mut self, start: TextSize) -> PResult<ControlSyntax> {
        self.expect(TokenKind::KwControl, "`control`")?;
        let body = self.block()?;
        let extension = self.finish_item(true, false)?;
        Ok(ControlSyntax {
            location: self.location_from(start),
            body,
            boundary: Boundary {
                extension,
                prefixes: TokenSet::EMPTY,
            },
        })
    }

    fn attributes(&mut self, start: TextSize) -> PResult<AttributeSyntax> {
        self.expect(TokenKind::KwWith, "`with`")?;
        if !self.at(TokenKind::LBrace) {
            return Err(self.expected("`{`"));
        }
        let body = self.skip_balanced()?;
        let extension = self.finish_item(false, false)?;
        Ok(AttributeSyntax {
            location: self.location_from(start),
            body,
            boundary: Boundary {
                extension,
                prefixes: TokenSet::EMPTY,
            },
        })
    }
}
