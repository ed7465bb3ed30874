//! Formula error types

use thiserror::Error;

use crate::lexer::LexError;
use crate::parser::ParseError;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while turning formula text into an AST
///
/// The two variants have different pipeline consequences: a lexing failure
/// aborts the compilation, while a parse failure only degrades the affected
/// cell to a literal.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Tokenization failure
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    /// Grammar failure over a valid token stream
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}
