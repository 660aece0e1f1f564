//! Logos-based lexer for TTCN-3 modules.
//!
//! Fast tokenization using the logos crate. Trivia (whitespace and comments)
//! is kept in the token stream so offsets stay exact; the parser skips it.

use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text))
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    base: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_base(input, TextSize::new(0))
    }

    /// Lex a slice of a larger text; offsets are reported relative to the
    /// larger text by adding `base`.
    pub fn with_base(input: &'a str, base: TextSize) -> Self {
        Self {
            inner: TokenKind::lexer(input),
            base: base.into(),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = self.inner.next()?.unwrap_or(TokenKind::Error);
        let text = self.inner.slice();
        let offset = TextSize::new(self.base + self.inner.span().start as u32);
        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Kind of the first non-trivia token at or after `offset`.
pub fn first_token_from(text: &str, offset: TextSize) -> Option<TokenKind> {
    let start = usize::from(offset).min(text.len());
    let slice = text.get(start..)?;
    Lexer::with_base(slice, offset)
        .find(|token| !token.kind.is_trivia())
        .map(|token| token.kind)
}

/// Kind of the last non-trivia token inside `range`.
pub fn last_token_in(text: &str, range: TextRange) -> Option<TokenKind> {
    let slice = text.get(std::ops::Range::<usize>::from(range))?;
    Lexer::with_base(slice, range.start())
        .filter(|token| !token.kind.is_trivia())
        .last()
        .map(|token| token.kind)
}

/// Whether the token that reaches `boundary`, lexing `text` from `from`,
/// runs across it.
pub fn token_crosses(text: &str, from: TextSize, boundary: TextSize) -> bool {
    let Some(slice) = text.get(usize::from(from)..) else {
        return false;
    };
    Lexer::with_base(slice, from)
        .map(|token| token.range())
        .find(|range| range.end() >= boundary)
        .is_some_and(|range| range.start() < boundary && boundary < range.end())
}

/// Token kinds. `Error` must stay the last variant so [`TokenSet`] can hold
/// every kind.
///
/// [`TokenSet`]: super::TokenSet
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"]|"")*""#)]
    Charstring,

    #[regex(r"'[0-9A-Fa-f]*'[BHObho]")]
    BitLiteral,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("::=")]
    AsnAssign,
    #[token(":=")]
    Assign,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Neq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("->")]
    Arrow,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("=")]
    Equals,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("&")]
    Amp,
    #[token("?")]
    Question,
    #[token("|")]
    Pipe,
    #[token("!")]
    Bang,
    #[token("@")]
    At,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("CLASS")]
    KwClass,
    #[token("module")]
    KwModule,
    #[token("import")]
    KwImport,
    #[token("from")]
    KwFrom,
    #[token("all")]
    KwAll,
    #[token("group")]
    KwGroup,
    #[token("control")]
    KwControl,
    #[token("with")]
    KwWith,
    #[token("type")]
    KwType,
    #[token("record")]
    KwRecord,
    #[token("set")]
    KwSet,
    #[token("union")]
    KwUnion,
    #[token("of")]
    KwOf,
    #[token("enumerated")]
    KwEnumerated,
    #[token("component")]
    KwComponent,
    #[token("port")]
    KwPort,
    #[token("message")]
    KwMessage,
    #[token("procedure")]
    KwProcedure,
    #[token("mixed")]
    KwMixed,
    #[token("in")]
    KwIn,
    #[token("out")]
    KwOut,
    #[token("inout")]
    KwInout,
    #[token("const")]
    KwConst,
    #[token("external")]
    KwExternal,
    #[token("modulepar")]
    KwModulepar,
    #[token("template")]
    KwTemplate,
    #[token("function")]
    KwFunction,
    #[token("altstep")]
    KwAltstep,
    #[token("testcase")]
    KwTestcase,
    #[token("runs")]
    KwRuns,
    #[token("on")]
    KwOn,
    #[token("system")]
    KwSystem,
    #[token("return")]
    KwReturn,
    #[token("var")]
    KwVar,
    #[token("timer")]
    KwTimer,
    #[token("public")]
    KwPublic,
    #[token("private")]
    KwPrivate,
    #[token("friend")]
    KwFriend,
    #[token("optional")]
    KwOptional,
    #[token("integer")]
    KwInteger,
    #[token("float")]
    KwFloat,
    #[token("boolean")]
    KwBoolean,
    #[token("charstring")]
    KwCharstring,
    #[token("bitstring")]
    KwBitstring,
    #[token("octetstring")]
    KwOctetstring,
    #[token("hexstring")]
    KwHexstring,
    #[token("verdicttype")]
    KwVerdicttype,
    #[token("anytype")]
    KwAnytype,
    #[token("default")]
    KwDefault,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("for")]
    KwFor,
    #[token("while")]
    KwWhile,
    #[token("do")]
    KwDo,
    #[token("log")]
    KwLog,
    #[token("setverdict")]
    KwSetverdict,
    #[token("pass")]
    KwPass,
    #[token("fail")]
    KwFail,
    #[token("inconc")]
    KwInconc,
    #[token("none")]
    KwNone,
    #[token("error")]
    KwError,
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,
    #[token("self")]
    KwSelf,
    #[token("mtc")]
    KwMtc,
    #[token("omit")]
    KwOmit,
    #[token("and")]
    KwAnd,
    #[token("or")]
    KwOr,
    #[token("not")]
    KwNot,
    #[token("xor")]
    KwXor,
    #[token("mod")]
    KwMod,
    #[token("rem")]
    KwRem,
    #[token("alt")]
    KwAlt,
    #[token("repeat")]
    KwRepeat,
    #[token("break")]
    KwBreak,
    #[token("continue")]
    KwContinue,
    #[token("stop")]
    KwStop,
    #[token("execute")]
    KwExecute,
    #[token("any")]
    KwAny,
    #[token("valueof")]
    KwValueof,
    #[token("create")]
    KwCreate,
    #[token("connect")]
    KwConnect,
    #[token("map")]
    KwMap,

    /// Unrecognised input.
    Error,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Keywords that may start a module item.
    pub fn starts_item(self) -> bool {
        matches!(
            self,
            TokenKind::KwImport
                | TokenKind::KwGroup
                | TokenKind::KwControl
                | TokenKind::KwWith
                | TokenKind::KwType
                | TokenKind::KwConst
                | TokenKind::KwExternal
                | TokenKind::KwModulepar
                | TokenKind::KwTemplate
                | TokenKind::KwFunction
                | TokenKind::KwAltstep
                | TokenKind::KwTestcase
                | TokenKind::KwPublic
                | TokenKind::KwPrivate
                | TokenKind::KwFriend
        )
    }

    pub fn is_visibility(self) -> bool {
        matches!(
            self,
            TokenKind::KwPublic | TokenKind::KwPrivate | TokenKind::KwFriend
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::Charstring => "string",
            TokenKind::BitLiteral => "bit string",
            TokenKind::AsnAssign => "`::=`",
            TokenKind::Assign => "`:=`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::Error => "invalid input",
            other => return write!(f, "{other:?}"),
        };
        f.write_str(text)
    }
}
