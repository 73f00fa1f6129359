use nom::branch::alt;
use nom::bytes::complete::take;
use nom::combinator::{cut, map, opt};
use nom::error::{ErrorKind, ParseError};
use nom::multi::{many0, separated_list0, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{Err, IResult, InputIter, Slice};

use crate::ast::{BinaryOp, Expr, Literal, Method, Number, Selector, Step, UnaryOp};
use crate::coerce::Coercion;
use crate::error::PathError;
use crate::token::{Token, TokenKind, Tokens};

/// Records the kind of the token no rule could accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unexpected(pub TokenKind);

impl<'a> ParseError<Tokens<'a>> for Unexpected {
    fn from_error_kind(input: Tokens<'a>, _kind: ErrorKind) -> Self {
        Unexpected(input.peek_kind())
    }

    fn append(_input: Tokens<'a>, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

pub type Result<'a, O> = IResult<Tokens<'a>, O, Unexpected>;

macro_rules! map_val {
    ($c:expr, $t:expr) => {
        map($c, |_| $t)
    };
}

fn unexpected<O>(input: Tokens<'_>) -> Result<'_, O> {
    Err(Err::Error(Unexpected(input.peek_kind())))
}

fn token<'a>(t: Token<'a>) -> impl Fn(Tokens<'a>) -> Result<'a, Token<'a>> {
    move |i: Tokens<'a>| match i.iter_elements().next() {
        Some(tt) if *tt == t => Ok((i.slice(1..), t.clone())),
        _ => unexpected(i),
    }
}

fn next(input: Tokens<'_>) -> Result<'_, Tokens<'_>> {
    take(1usize)(input)
}

fn ident(input: Tokens<'_>) -> Result<'_, &str> {
    let (i, ret) = next(input)?;
    match ret[0] {
        Token::Ident(s) => Ok((i, s)),
        _ => unexpected(input),
    }
}

fn string(input: Tokens<'_>) -> Result<'_, &str> {
    let (i, ret) = next(input)?;
    match ret[0] {
        Token::String(s) => Ok((i, s)),
        _ => unexpected(input),
    }
}

fn number(input: Tokens<'_>) -> Result<'_, Number> {
    let (i, ret) = next(input)?;
    match ret[0] {
        Token::Number(n) => Ok((i, n)),
        _ => unexpected(input),
    }
}

fn integer(input: Tokens<'_>) -> Result<'_, i64> {
    let (i, n) = number(input)?;
    if n.fract() == 0.0 {
        Ok((i, n as i64))
    } else {
        unexpected(input)
    }
}

// path grammar {{{
fn member(input: Tokens<'_>) -> Result<'_, Step> {
    alt((
        map(ident, |s| Step::Member(s.to_string())),
        map(string, |s| Step::Member(s.to_string())),
        map_val!(token(Token::Star), Step::Wildcard),
    ))(input)
}

fn range(input: Tokens<'_>) -> Result<'_, (Option<i64>, Option<i64>)> {
    pair(opt(integer), preceded(token(Token::Colon), opt(integer)))(input)
}

fn selector(input: Tokens<'_>) -> Result<'_, Selector> {
    alt((
        map(integer, Selector::Index),
        map(string, |s| Selector::Name(s.to_string())),
    ))(input)
}

/// `[n]` selects one element, a list of quoted keys builds a tuple, anything
/// else is a union.
fn selector_step(list: Vec<Selector>) -> Step {
    if let [Selector::Index(i)] = list[..] {
        return Step::Index(i);
    }
    let names: Option<Vec<String>> = list
        .iter()
        .map(|s| match s {
            Selector::Name(n) => Some(n.clone()),
            Selector::Index(_) => None,
        })
        .collect();
    match names {
        Some(names) => Step::ArrayConstruct(names),
        None => Step::Union(list),
    }
}

fn enclosed<'a>(open: Token<'a>) -> impl FnMut(Tokens<'a>) -> Result<'a, Expr> {
    preceded(
        token(open),
        cut(terminated(expression, token(Token::CloseParen))),
    )
}

fn bracket_body(input: Tokens<'_>) -> Result<'_, Step> {
    alt((
        map(enclosed(Token::FilterOpen), Step::Filter),
        map(enclosed(Token::MapOpen), Step::Map),
        map(enclosed(Token::OpenParen), Step::IndexExpr),
        map_val!(token(Token::Star), Step::Wildcard),
        map(range, |(start, end)| Step::Slice(start, end)),
        map(separated_list1(token(Token::Comma), selector), selector_step),
    ))(input)
}

fn bracket(input: Tokens<'_>) -> Result<'_, Step> {
    preceded(
        token(Token::OpenBracket),
        cut(terminated(bracket_body, token(Token::CloseBracket))),
    )(input)
}

fn brace(input: Tokens<'_>) -> Result<'_, Step> {
    let keys = separated_list1(token(Token::Comma), string);
    map(
        preceded(
            token(Token::OpenBrace),
            cut(terminated(keys, token(Token::CloseBrace))),
        ),
        |keys| Step::ObjectConstruct(keys.into_iter().map(str::to_string).collect()),
    )(input)
}

fn coercion(input: Tokens<'_>) -> Result<'_, Step> {
    let (i, ret) = next(input)?;
    match ret[0] {
        Token::Coerce(name) => match Coercion::from_name(name) {
            Some(c) => Ok((i, Step::Coerce(c))),
            None => Err(Err::Failure(Unexpected(TokenKind::Coerce))),
        },
        _ => unexpected(input),
    }
}

/// A trailing `..` with nothing to apply it to compiles to no step.
fn recurse(input: Tokens<'_>) -> Result<'_, Vec<Step>> {
    map(
        preceded(token(Token::Recurse), opt(alt((member, bracket, brace)))),
        |step| match step {
            Some(step) => vec![Step::Recurse, step],
            None => vec![],
        },
    )(input)
}

fn segment(input: Tokens<'_>) -> Result<'_, Vec<Step>> {
    alt((
        map(preceded(token(Token::Dot), cut(member)), |s| vec![s]),
        recurse,
        map(bracket, |s| vec![s]),
        map(brace, |s| vec![s]),
        map(coercion, |s| vec![s]),
    ))(input)
}

fn path(input: Tokens<'_>) -> Result<'_, Vec<Step>> {
    let (i, _) = token(Token::Root)(input)?;
    let (i, segments) = many0(segment)(i)?;
    let (i, _) = token(Token::Eof)(i)?;

    let mut steps = vec![Step::Root];
    steps.extend(segments.into_iter().flatten());
    Ok((i, steps))
}
// }}}

// expression grammar {{{
fn or_op(input: Tokens<'_>) -> Result<'_, BinaryOp> {
    map_val!(token(Token::Or), BinaryOp::Or)(input)
}

fn and_op(input: Tokens<'_>) -> Result<'_, BinaryOp> {
    map_val!(token(Token::And), BinaryOp::And)(input)
}

fn comparison_op(input: Tokens<'_>) -> Result<'_, BinaryOp> {
    alt((
        map_val!(token(Token::Equal), BinaryOp::Equal),
        map_val!(token(Token::StrictEqual), BinaryOp::StrictEqual),
        map_val!(token(Token::NotEqual), BinaryOp::NotEqual),
        map_val!(token(Token::StrictNotEqual), BinaryOp::StrictNotEqual),
        map_val!(token(Token::GreaterThan), BinaryOp::GreaterThan),
        map_val!(token(Token::LessThan), BinaryOp::LessThan),
        map_val!(token(Token::GreaterEqual), BinaryOp::GreaterEqual),
        map_val!(token(Token::LessEqual), BinaryOp::LessEqual),
    ))(input)
}

fn sum_op(input: Tokens<'_>) -> Result<'_, BinaryOp> {
    alt((
        map_val!(token(Token::Add), BinaryOp::Add),
        map_val!(token(Token::Sub), BinaryOp::Sub),
    ))(input)
}

fn product_op(input: Tokens<'_>) -> Result<'_, BinaryOp> {
    alt((
        map_val!(token(Token::Star), BinaryOp::Mul),
        map_val!(token(Token::Div), BinaryOp::Div),
    ))(input)
}

/// Left-associative chain of `operand (op operand)*`.
fn binary<'a>(
    operand: fn(Tokens<'a>) -> Result<'a, Expr>,
    op: fn(Tokens<'a>) -> Result<'a, BinaryOp>,
) -> impl Fn(Tokens<'a>) -> Result<'a, Expr> {
    move |input: Tokens<'a>| {
        let (i, first) = operand(input)?;
        let (i, rest) = many0(pair(op, cut(operand)))(i)?;
        let expr = rest.into_iter().fold(first, |lhs, (op, rhs)| {
            Expr::Binary(op, Box::new(lhs), Box::new(rhs))
        });
        Ok((i, expr))
    }
}

enum Suffix {
    Property(String),
    Call(Method, Vec<Expr>),
    Element(Expr),
}

fn call_args(input: Tokens<'_>) -> Result<'_, Vec<Expr>> {
    preceded(
        token(Token::OpenParen),
        cut(terminated(
            separated_list0(token(Token::Comma), expression),
            token(Token::CloseParen),
        )),
    )(input)
}

fn member_access(input: Tokens<'_>) -> Result<'_, Suffix> {
    let (i, name) = ident(input)?;
    let (i, args) = opt(call_args)(i)?;
    match args {
        None => Ok((i, Suffix::Property(name.to_string()))),
        Some(args) => match Method::from_name(name) {
            Some(method) => Ok((i, Suffix::Call(method, args))),
            None => Err(Err::Failure(Unexpected(TokenKind::Identifier))),
        },
    }
}

fn suffix(input: Tokens<'_>) -> Result<'_, Suffix> {
    alt((
        preceded(token(Token::Dot), cut(member_access)),
        map(
            preceded(
                token(Token::OpenBracket),
                cut(terminated(expression, token(Token::CloseBracket))),
            ),
            Suffix::Element,
        ),
    ))(input)
}

/// `true`, `false`, `null` or a conversion call such as `int(@.qty)`.
fn named(input: Tokens<'_>) -> Result<'_, Expr> {
    let (i, name) = ident(input)?;
    match name {
        "true" => Ok((i, Expr::Literal(Literal::Boolean(true)))),
        "false" => Ok((i, Expr::Literal(Literal::Boolean(false)))),
        "null" => Ok((i, Expr::Literal(Literal::Null))),
        _ => match Coercion::from_name(name) {
            Some(c) => {
                let (i, arg) = cut(delimited(
                    token(Token::OpenParen),
                    expression,
                    token(Token::CloseParen),
                ))(i)?;
                Ok((i, Expr::Coerce(c, Box::new(arg))))
            }
            None => Err(Err::Failure(Unexpected(TokenKind::Identifier))),
        },
    }
}

fn primary(input: Tokens<'_>) -> Result<'_, Expr> {
    alt((
        map_val!(token(Token::Current), Expr::Current),
        map_val!(token(Token::Root), Expr::Root),
        map(number, |n| Expr::Literal(Literal::Number(n))),
        map(string, |s| Expr::Literal(Literal::String(s.to_string()))),
        named,
        preceded(
            token(Token::OpenParen),
            cut(terminated(expression, token(Token::CloseParen))),
        ),
    ))(input)
}

fn postfix(input: Tokens<'_>) -> Result<'_, Expr> {
    let (i, target) = primary(input)?;
    let (i, suffixes) = many0(suffix)(i)?;
    let expr = suffixes
        .into_iter()
        .fold(target, |target, suffix| match suffix {
            Suffix::Property(name) => Expr::Property(Box::new(target), name),
            Suffix::Call(method, args) => Expr::Call(Box::new(target), method, args),
            Suffix::Element(index) => Expr::Element(Box::new(target), Box::new(index)),
        });
    Ok((i, expr))
}

fn unary(input: Tokens<'_>) -> Result<'_, Expr> {
    let negate = |e| Expr::Unary(UnaryOp::Not, Box::new(e));
    alt((
        map(preceded(token(Token::Sub), cut(unary)), |e| {
            Expr::Unary(UnaryOp::Neg, Box::new(e))
        }),
        map(preceded(token(Token::Not), cut(unary)), negate),
        map(enclosed(Token::MapOpen), negate),
        postfix,
    ))(input)
}

fn product(input: Tokens<'_>) -> Result<'_, Expr> {
    binary(unary, product_op)(input)
}

fn sum(input: Tokens<'_>) -> Result<'_, Expr> {
    binary(product, sum_op)(input)
}

fn comparison(input: Tokens<'_>) -> Result<'_, Expr> {
    let (i, lhs) = sum(input)?;
    let (i, rhs) = opt(pair(comparison_op, cut(sum)))(i)?;
    let expr = match rhs {
        Some((op, rhs)) => Expr::Binary(op, Box::new(lhs), Box::new(rhs)),
        None => lhs,
    };
    Ok((i, expr))
}

fn conjunction(input: Tokens<'_>) -> Result<'_, Expr> {
    binary(comparison, and_op)(input)
}

/// Body of `?( )`, `!( )` and `( )`.
pub fn expression(input: Tokens<'_>) -> Result<'_, Expr> {
    binary(conjunction, or_op)(input)
}
// }}}

/// Compiles a token sequence, which must end in [`Token::Eof`], into steps.
pub fn parse(tokens: &[Token]) -> std::result::Result<Vec<Step>, PathError> {
    match path(Tokens::new(tokens)) {
        Ok((_, steps)) => Ok(steps),
        Err(Err::Error(Unexpected(kind))) | Err(Err::Failure(Unexpected(kind))) => {
            Err(PathError::Parse(kind))
        }
        Err(Err::Incomplete(_)) => Err(PathError::Parse(TokenKind::Eof)),
    }
}


// vim: fdm=marker
