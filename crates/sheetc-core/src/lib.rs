//! # sheetc-core
//!
//! Core data structures for the sheetc spreadsheet compiler.
//!
//! This crate provides the fundamental types used throughout sheetc:
//! - [`ScalarValue`] - Literal cell values (numbers, strings, booleans)
//! - [`CellAddress`] - The single-cell coordinate behind canonical ids
//!   (ranges stay strings throughout the pipeline)
//! - [`Cell`], [`Sheet`], [`Workbook`] - The document structure handed to
//!   the compiler pipeline
//!
//! The workbook is built once from an external source (see the input
//! contract in the facade crate) and is read-only for the rest of the
//! pipeline: the parser, the dependency analyzer, and the code emitter all
//! borrow it.
//!
//! ## Example
//!
//! ```rust
//! use sheetc_core::{Workbook, Sheet, Cell, ScalarValue};
//!
//! let mut sheet = Sheet::new("Input");
//! sheet.insert(Cell::literal(0, 0, ScalarValue::Number(100.0)));
//! sheet.insert(Cell::with_formula(0, 1, ScalarValue::Number(10.0), "=A1*0.1"));
//!
//! let mut workbook = Workbook::new();
//! workbook.add_sheet(sheet).unwrap();
//! assert_eq!(workbook.sheet_index("Input"), Some(0));
//! ```

pub mod address;
pub mod cell;
pub mod error;
pub mod sheet;
pub mod value;
pub mod workbook;

pub use address::CellAddress;
pub use cell::Cell;
pub use error::{Error, Result};
pub use sheet::Sheet;
pub use value::ScalarValue;
pub use workbook::Workbook;

/// Maximum number of rows in a sheet (Google Sheets cell-count ceiling)
pub const MAX_ROWS: u32 = 10_000_000;

/// Maximum number of columns in a sheet (column `ZZZ`)
pub const MAX_COLS: u32 = 18_278;
