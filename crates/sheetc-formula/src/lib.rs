//! # sheetc-formula
//!
//! The formula language for the sheetc spreadsheet compiler.
//!
//! This crate provides:
//! - Lexing (formula text → token stream)
//! - Parsing (token stream → AST)
//! - A canonical printer (AST → formula text)
//! - Reference normalization (raw references → canonical `Sheet!A1` ids)
//! - Dependency analysis (ASTs → graph, cycle set, evaluation order)
//! - Named-range expansion and referenced-sheet discovery (string-level
//!   passes over raw formula text)
//!
//! Nothing here evaluates a formula; evaluation happens in the code the
//! emitter generates.
//!
//! ## Example
//!
//! ```rust
//! use sheetc_formula::{parse_formula, to_formula};
//!
//! let ast = parse_formula("=SUM(A1:A10)+B1*2").unwrap();
//! assert_eq!(to_formula(&ast), "=(SUM(A1:A10)+(B1*2))");
//! ```

pub mod ast;
pub mod dependency;
pub mod discover;
pub mod error;
pub mod expand;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod printer;

pub use ast::{AstNode, OpSymbol};
pub use dependency::{DependencyGraph, DependencyNode, FormulaSet};
pub use discover::{missing_sheets, referenced_sheets};
pub use error::{FormulaError, FormulaResult};
pub use expand::expand_named_ranges;
pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use normalize::{is_range_reference, normalize_reference, split_reference};
pub use parser::{parse_formula, parse_tokens, ParseError};
pub use printer::to_formula;
