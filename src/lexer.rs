use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{alpha1, char, digit1};
use nom::combinator::{map, opt, recognize};
use nom::error::{Error, ErrorKind};
use nom::sequence::{delimited, pair};
use nom::{AsChar, IResult};

use crate::error::PathError;
use crate::token::Token;

pub type Result<'a, O> = IResult<&'a str, O>;

macro_rules! map_val {
    ($c:expr, $t:expr) => {
        map($c, |_| $t)
    };
}

#[inline]
fn ident(input: &str) -> Result<'_, &str> {
    let first = alt((alpha1, tag("_")));
    let rest = take_while(|c: char| c.is_alphanum() || c == '_');
    recognize(pair(first, rest))(input)
}

#[inline]
fn identifier(input: &str) -> Result<'_, Token<'_>> {
    map(ident, Token::Ident)(input)
}

#[inline]
fn string(input: &str) -> Result<'_, Token<'_>> {
    let single = delimited(char('\''), take_while(|c: char| c != '\''), char('\''));
    let double = delimited(char('"'), take_while(|c: char| c != '"'), char('"'));
    map(alt((single, double)), Token::String)(input)
}

#[inline]
fn unsigned(input: &str) -> Result<'_, &str> {
    recognize(pair(digit1, opt(pair(char('.'), digit1))))(input)
}

/// Numbers carry their sign only where no operand precedes them, so that
/// `length-1` stays a subtraction.
fn number<'a>(signed: bool) -> impl Fn(&'a str) -> Result<'a, Token<'a>> {
    move |input: &'a str| {
        let (rest, text) = if signed {
            recognize(pair(opt(char('-')), unsigned))(input)?
        } else {
            unsigned(input)?
        };
        match text.parse::<f64>() {
            Ok(n) => Ok((rest, Token::Number(n))),
            Err(_) => Err(nom::Err::Error(Error::new(input, ErrorKind::Float))),
        }
    }
}

#[inline]
fn coercion(input: &str) -> Result<'_, Token<'_>> {
    map(delimited(char('<'), ident, char('>')), Token::Coerce)(input)
}

#[inline]
fn operations(input: &str) -> Result<'_, Token<'_>> {
    alt((
        map_val!(tag("==="), Token::StrictEqual),
        map_val!(tag("!=="), Token::StrictNotEqual),
        map_val!(tag("=="), Token::Equal),
        map_val!(tag("!="), Token::NotEqual),
        map_val!(tag("<="), Token::LessEqual),
        map_val!(tag(">="), Token::GreaterEqual),
        map_val!(tag("&&"), Token::And),
        map_val!(tag("||"), Token::Or),
        map_val!(char('<'), Token::LessThan),
        map_val!(char('>'), Token::GreaterThan),
        map_val!(char('+'), Token::Add),
        map_val!(char('-'), Token::Sub),
        map_val!(char('/'), Token::Div),
        map_val!(char('!'), Token::Not),
    ))(input)
}

#[inline]
fn punctations(input: &str) -> Result<'_, Token<'_>> {
    alt((
        map_val!(tag("?("), Token::FilterOpen),
        map_val!(tag("!("), Token::MapOpen),
        map_val!(tag(".."), Token::Recurse),
        map_val!(char('.'), Token::Dot),
        map_val!(char('$'), Token::Root),
        map_val!(char('@'), Token::Current),
        map_val!(char('*'), Token::Star),
        map_val!(char('('), Token::OpenParen),
        map_val!(char(')'), Token::CloseParen),
        map_val!(char('['), Token::OpenBracket),
        map_val!(char(']'), Token::CloseBracket),
        map_val!(char('{'), Token::OpenBrace),
        map_val!(char('}'), Token::CloseBrace),
        map_val!(char(','), Token::Comma),
        map_val!(char(':'), Token::Colon),
    ))(input)
}

#[inline]
fn token<'a>(signed: bool) -> impl Fn(&'a str) -> Result<'a, Token<'a>> {
    move |input: &'a str| {
        alt((
            string,
            number(signed),
            coercion,
            punctations,
            operations,
            identifier,
        ))(input)
    }
}

/// Splits a path expression into tokens, terminated by [`Token::Eof`].
///
/// Whitespace between tokens is skipped. The first character no rule accepts
/// aborts tokenizing with [`PathError::Lex`].
pub fn tokenize(input: &str) -> std::result::Result<Vec<Token<'_>>, PathError> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut rest = input;
    loop {
        rest = rest.trim_start();
        let Some(c) = rest.chars().next() else {
            break;
        };
        let signed = tokens.last().map_or(true, |t| !t.ends_operand());
        match token(signed)(rest) {
            Ok((remaining, t)) => {
                tokens.push(t);
                rest = remaining;
            }
            Err(_) => return Err(PathError::Lex(c)),
        }
    }
    tokens.push(Token::Eof);
    Ok(tokens)
}
