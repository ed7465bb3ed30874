//! The backend trait
//!
//! Both backends share one lowering driver (see [`crate::lower`]); this
//! trait is the seam where their surface syntax diverges. Methods that read
//! or write the generated program's cell map must keep the `cells.get`
//! spelling visible in their output: the safe-wrapper heuristic scans
//! emitted text for it.

use sheetc_core::ScalarValue;
use sheetc_formula::OpSymbol;

use crate::{GenerateOptions, Target};

/// A code emission backend
pub trait Emitter {
    /// Which target this backend emits
    fn target(&self) -> Target;

    /// File extension for the generated source (without the dot)
    fn file_extension(&self) -> &'static str;

    /// Indentation for statements inside `calculate`
    fn indent(&self) -> &'static str;

    /// A single-line comment
    fn comment(&self, text: &str) -> String;

    /// Everything before the runtime block: input/output record types for
    /// a typed target, standard-library imports otherwise
    fn preamble(&self, options: &GenerateOptions) -> String;

    /// The embedded runtime helper block, emitted verbatim
    fn runtime(&self) -> &'static str;

    /// The `calculate` signature plus the cell-map initialization
    fn open_calculate(&self) -> String;

    /// Closes `calculate` (empty for an indentation-scoped target)
    fn close_calculate(&self) -> String;

    /// One data-entry statement: initialize a cell from the input record,
    /// falling back to the generation-time literal
    fn input_default(&self, tab: &str, cell: &str, literal: &str) -> String;

    /// One ordered assignment: store an expression under a canonical id
    fn assign_cell(&self, id: &str, expr: &str) -> String;

    /// Read a single cell, yielding the absent sentinel when missing
    fn cell_read(&self, id: &str) -> String;

    /// Materialize a range through the runtime
    fn range_read(&self, id: &str) -> String;

    /// The expression naming the cell map (extra argument to INDIRECT)
    fn cells_map(&self) -> &'static str;

    /// Map a helper stem (snake_case) to the backend's surface name
    fn helper_name(&self, stem: &str) -> String;

    /// A quoted, escaped string literal
    fn string_literal(&self, content: &str) -> String {
        format!(
            "\"{}\"",
            content.replace('\\', "\\\\").replace('"', "\\\"")
        )
    }

    /// A boolean literal
    fn bool_literal(&self, value: bool) -> &'static str;

    /// A list literal (same bracket syntax on both current targets)
    fn list(&self, items: &[String]) -> String {
        format!("[{}]", items.join(", "))
    }

    /// A plain (unwrapped) binary operation
    fn binary_op(&self, op: OpSymbol, lhs: &str, rhs: &str) -> String;

    /// Unary negation
    fn unary_minus(&self, operand: &str) -> String {
        format!("(-{})", operand)
    }

    /// The postfix percent operator
    fn percent(&self, operand: &str) -> String {
        format!("({} / 100)", operand)
    }

    /// A conditional expression
    fn conditional(&self, cond: &str, then: &str, otherwise: &str) -> String;

    /// A function call
    fn call(&self, name: &str, args: &[String]) -> String {
        format!("{}({})", name, args.join(", "))
    }

    /// Unpack a sequence into the surrounding argument list
    fn spread(&self, expr: &str) -> String;

    /// Declare the output record over the configured tabs
    fn open_output(&self, tabs: &[String]) -> String;

    /// Copy one cell into the output record
    fn output_entry(&self, tab: &str, cell: &str) -> String;

    /// Return the output record
    fn return_output(&self) -> String;
}

/// Bake a literal value into target source text
pub fn scalar_literal(emitter: &dyn Emitter, value: &ScalarValue) -> String {
    match value {
        ScalarValue::Number(n) => format!("{}", n),
        ScalarValue::Bool(b) => emitter.bool_literal(*b).to_string(),
        ScalarValue::Text(s) => emitter.string_literal(s),
    }
}
