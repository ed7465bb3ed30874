//! Codegen error types

use thiserror::Error;

/// Result type for code generation
pub type CodegenResult<T> = std::result::Result<T, CodegenError>;

/// Errors that abort code generation
///
/// These are pipeline-fatal: they indicate a mismatch between the
/// configuration or the grammar and the emitter, not a data problem.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A configured input or output tab is not in the workbook
    #[error("unknown tab in configuration: {0}")]
    UnknownTab(String),

    /// An operator node carried an arity its symbol does not support
    #[error("operator '{symbol}' does not take {arity} operand(s)")]
    OperatorArity { symbol: String, arity: usize },

    /// A special-form function was called without its required argument
    #[error("function {0} requires at least one argument")]
    MissingArgument(String),
}
