use thiserror::Error;

use crate::token::TokenKind;

/// Failure to compile a path expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// No lexical rule matches the character at the current position.
    #[error("Found no matching rule: {0}")]
    Lex(char),

    /// A token appeared where the grammar has no rule for it.
    #[error("Unknown token type: {0}")]
    Parse(TokenKind),
}
