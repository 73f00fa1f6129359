use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Ident(&'a str),
    String(&'a str),
    Number(f64),
    Coerce(&'a str), // `<name>`
    // Path structure
    Root,    // `$`
    Current, // `@`
    Recurse, // `..`
    Dot,
    Star,
    FilterOpen, // `?(`
    MapOpen,    // `!(`
    // Operators
    Add,
    Sub,
    Div,
    Equal,
    StrictEqual,
    NotEqual,
    StrictNotEqual,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    And,
    Or,
    Not,
    // Punctations
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    Colon,
    Eof,
}

impl<'a> Token<'a> {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Ident(_) => TokenKind::Identifier,
            Token::String(_) => TokenKind::String,
            Token::Number(_) => TokenKind::Number,
            Token::Coerce(_) => TokenKind::Coerce,
            Token::Root => TokenKind::Root,
            Token::Current => TokenKind::Current,
            Token::Recurse => TokenKind::Recurse,
            Token::Dot => TokenKind::Dot,
            Token::Star => TokenKind::Star,
            Token::FilterOpen => TokenKind::FilterOpen,
            Token::MapOpen => TokenKind::MapOpen,
            Token::Add => TokenKind::Plus,
            Token::Sub => TokenKind::Minus,
            Token::Div => TokenKind::Slash,
            Token::Equal => TokenKind::Equal,
            Token::StrictEqual => TokenKind::StrictEqual,
            Token::NotEqual => TokenKind::NotEqual,
            Token::StrictNotEqual => TokenKind::StrictNotEqual,
            Token::GreaterThan => TokenKind::GreaterThan,
            Token::LessThan => TokenKind::LessThan,
            Token::GreaterEqual => TokenKind::GreaterEqual,
            Token::LessEqual => TokenKind::LessEqual,
            Token::And => TokenKind::And,
            Token::Or => TokenKind::Or,
            Token::Not => TokenKind::Not,
            Token::OpenParen => TokenKind::ParenOpen,
            Token::CloseParen => TokenKind::ParenClose,
            Token::OpenBracket => TokenKind::BracketOpen,
            Token::CloseBracket => TokenKind::BracketClose,
            Token::OpenBrace => TokenKind::BraceOpen,
            Token::CloseBrace => TokenKind::BraceClose,
            Token::Comma => TokenKind::Comma,
            Token::Colon => TokenKind::Colon,
            Token::Eof => TokenKind::Eof,
        }
    }

    /// Whether this token can end an operand. A `-` directly after such a
    /// token is a subtraction, never the sign of a number.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            Token::Ident(_)
                | Token::String(_)
                | Token::Number(_)
                | Token::Root
                | Token::Current
                | Token::CloseParen
                | Token::CloseBracket
                | Token::CloseBrace
        )
    }
}

/// The kind of a token, as named in parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    String,
    Number,
    Coerce,
    Root,
    Current,
    Recurse,
    Dot,
    Star,
    FilterOpen,
    MapOpen,
    Plus,
    Minus,
    Slash,
    Equal,
    StrictEqual,
    NotEqual,
    StrictNotEqual,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    And,
    Or,
    Not,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    BraceOpen,
    BraceClose,
    Comma,
    Colon,
    Eof,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Coerce => "coercion",
            TokenKind::Root => "root",
            TokenKind::Current => "current",
            TokenKind::Recurse => "recurse",
            TokenKind::Dot => "dot",
            TokenKind::Star => "star",
            TokenKind::FilterOpen => "filter-open",
            TokenKind::MapOpen => "map-open",
            TokenKind::Plus => "plus",
            TokenKind::Minus => "minus",
            TokenKind::Slash => "slash",
            TokenKind::Equal => "eq",
            TokenKind::StrictEqual => "strict-eq",
            TokenKind::NotEqual => "ne",
            TokenKind::StrictNotEqual => "strict-ne",
            TokenKind::GreaterThan => "gt",
            TokenKind::LessThan => "lt",
            TokenKind::GreaterEqual => "ge",
            TokenKind::LessEqual => "le",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::ParenOpen => "paren-open",
            TokenKind::ParenClose => "paren-close",
            TokenKind::BracketOpen => "bracket-open",
            TokenKind::BracketClose => "bracket-close",
            TokenKind::BraceOpen => "brace-open",
            TokenKind::BraceClose => "brace-close",
            TokenKind::Comma => "comma",
            TokenKind::Colon => "colon",
            TokenKind::Eof => "eof",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token slice usable as `nom` input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tokens<'a> {
    tokens: &'a [Token<'a>],
}

impl<'a> Tokens<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Tokens { tokens }
    }

    /// Kind of the next token; an exhausted slice reads as end of input.
    pub fn peek_kind(&self) -> TokenKind {
        self.tokens.first().map_or(TokenKind::Eof, Token::kind)
    }
}

use std::ops::Index;

impl<'a> Index<usize> for Tokens<'a> {
    type Output = Token<'a>;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.tokens[idx]
    }
}

use nom::InputLength;
use nom::InputTake;

impl<'a> InputLength for Token<'a> {
    fn input_len(&self) -> usize {
        1
    }
}

impl<'a> InputLength for Tokens<'a> {
    fn input_len(&self) -> usize {
        self.tokens.len()
    }
}

impl<'a> InputTake for Tokens<'a> {
    fn take(&self, count: usize) -> Self {
        Tokens {
            tokens: &self.tokens[0..count],
        }
    }

    fn take_split(&self, count: usize) -> (Self, Self) {
        let (prefix, suffix) = self.tokens.split_at(count);
        (Tokens { tokens: suffix }, Tokens { tokens: prefix })
    }
}

use nom::{InputIter, Needed};
use std::iter::Enumerate;
use std::slice::Iter;

impl<'a> InputIter for Tokens<'a> {
    type Item = &'a Token<'a>;
    type Iter = Enumerate<Iter<'a, Token<'a>>>;
    type IterElem = Iter<'a, Token<'a>>;

    fn iter_indices(&self) -> Self::Iter {
        self.tokens.iter().enumerate()
    }

    fn iter_elements(&self) -> Self::IterElem {
        self.tokens.iter()
    }

    fn position<P>(&self, pred: P) -> Option<usize>
    where
        P: Fn(Self::Item) -> bool,
    {
        self.tokens.iter().position(pred)
    }

    fn slice_index(&self, count: usize) -> Result<usize, Needed> {
        if self.tokens.len() >= count {
            Ok(count)
        } else {
            Err(Needed::new(count - self.tokens.len()))
        }
    }
}

use nom::Slice;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

impl<'a> Slice<Range<usize>> for Tokens<'a> {
    fn slice(&self, range: Range<usize>) -> Self {
        Tokens {
            tokens: &self.tokens[range],
        }
    }
}

impl<'a> Slice<RangeTo<usize>> for Tokens<'a> {
    fn slice(&self, range: RangeTo<usize>) -> Self {
        self.slice(0..range.end)
    }
}

impl<'a> Slice<RangeFrom<usize>> for Tokens<'a> {
    fn slice(&self, range: RangeFrom<usize>) -> Self {
        self.slice(range.start..self.tokens.len())
    }
}

impl<'a> Slice<RangeFull> for Tokens<'a> {
    fn slice(&self, _: RangeFull) -> Self {
        *self
    }
}
