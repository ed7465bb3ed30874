//! # sheetc
//!
//! Compile a live spreadsheet into a self-contained source file that
//! reproduces its computed values.
//!
//! The pipeline is static: the generated program performs no spreadsheet
//! I/O. Formulas become ordered host-language assignments over a cell map,
//! cycles become `"#REF!"` sentinels, and a runtime helper block embedded
//! in the output reproduces spreadsheet semantics (error propagation,
//! range materialization, the function library).
//!
//! ## Example
//!
//! ```rust
//! use sheetc::prelude::*;
//!
//! let mut input = Sheet::new("Input");
//! input.insert(Cell::literal(0, 0, ScalarValue::Number(100.0)));
//!
//! let mut calc = Sheet::new("Calc");
//! calc.insert(Cell::with_formula(0, 0, ScalarValue::Number(10.0), "=Input!A1*0.1"));
//!
//! let mut workbook = Workbook::new();
//! workbook.add_sheet(input).unwrap();
//! workbook.add_sheet(calc).unwrap();
//!
//! let mut options = GenerateOptions::new(Target::TypeScript);
//! options.input_tabs = vec!["Input".into()];
//! options.output_tabs = vec!["Calc".into()];
//!
//! let output = compile(&workbook, &options).unwrap();
//! assert!(output.source.contains("export function calculate"));
//! ```

pub mod io;
pub mod pipeline;
pub mod prelude;

// Re-export pipeline types
pub use io::{load_config_json, load_workbook_json, InputError};
pub use pipeline::{compile, parse_workbook, CompileError, CompileOutput, CompileStats};

// Re-export core types
pub use sheetc_core::{
    Cell, CellAddress, Error, Result, ScalarValue, Sheet, Workbook, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use sheetc_formula::{
    expand_named_ranges, is_range_reference, missing_sheets, normalize_reference, parse_formula,
    referenced_sheets, split_reference, to_formula, AstNode, DependencyGraph, DependencyNode,
    FormulaError, FormulaSet, LexError, OpSymbol, ParseError, Token, TokenKind,
};

// Re-export codegen types
pub use sheetc_codegen::{generate, CodegenError, Emitter, GenerateOptions, Target};
