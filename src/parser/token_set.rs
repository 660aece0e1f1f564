use super::TokenKind;

const _: () = assert!((TokenKind::Error as u8) < 128);

/// A set of token kinds packed into a bit mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenSet(u128);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    pub const fn new(kinds: &[TokenKind]) -> TokenSet {
        let mut bits = 0u128;
        let mut i = 0;
        while i < kinds.len() {
            bits |= mask(kinds[i]);
            i += 1;
        }
        TokenSet(bits)
    }

    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }

    pub const fn with(self, kind: TokenKind) -> TokenSet {
        TokenSet(self.0 | mask(kind))
    }

    pub const fn contains(&self, kind: TokenKind) -> bool {
        self.0 & mask(kind) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

const fn mask(kind: TokenKind) -> u128 {
    1u128 << (kind as u8)
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenSet({:#x})", self.0)
    }
}

/// Visibility keywords.
pub const VISIBILITY: TokenSet = TokenSet::new(&[
    TokenKind::KwPublic,
    TokenKind::KwPrivate,
    TokenKind::KwFriend,
]);

/// Tokens that continue an expression when they follow it.
pub const EXPRESSION_CONTINUATION: TokenSet = TokenSet::new(&[
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Star,
    TokenKind::Slash,
    TokenKind::Amp,
    TokenKind::Dot,
    TokenKind::LBracket,
    TokenKind::LParen,
    TokenKind::EqEq,
    TokenKind::Neq,
    TokenKind::Lt,
    TokenKind::Gt,
    TokenKind::Le,
    TokenKind::Ge,
    TokenKind::KwAnd,
    TokenKind::KwOr,
    TokenKind::KwXor,
    TokenKind::KwMod,
    TokenKind::KwRem,
]);
